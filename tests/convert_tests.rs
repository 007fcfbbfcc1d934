//! End-to-end tests: decoded fixtures rendered to PDF, batch runs over a
//! folder, and the command-line binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_fs::prelude::*;
use lopdf::content::Content;
use lopdf::Document;
use predicates::prelude::*;

use eml2pdf::export::batch::{plan_batch, Batch, FileOutcome};
use eml2pdf::export::{render_pdf, RenderOptions};
use eml2pdf::model::message::MessageRecord;
use eml2pdf::parser::read_message;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Text shown on each page, one string per `Tj` operator.
fn page_texts(pdf: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let data = doc.get_page_content(page_id).unwrap();
            Content::decode(&data)
                .unwrap()
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| op.operands.first()?.as_str().ok())
                .map(|bytes| {
                    let units: Vec<u16> = bytes
                        .chunks_exact(2)
                        .map(|p| u16::from_be_bytes([p[0], p[1]]))
                        .collect();
                    String::from_utf16_lossy(&units)
                })
                .collect()
        })
        .collect()
}

fn all_text(pdf: &[u8]) -> Vec<String> {
    page_texts(pdf).into_iter().flatten().collect()
}

// ─── Rendering decoded fixtures ─────────────────────────────────────

#[test]
fn test_iso2022jp_renders_headers_then_body() {
    let record = read_message(fixture("iso2022jp.eml")).unwrap();
    let pdf = render_pdf(&record, &RenderOptions::default()).unwrap();
    assert!(pdf.starts_with(b"%PDF-1.4"));

    let texts = all_text(&pdf);
    let position = |needle: &str| {
        texts
            .iter()
            .position(|t| t == needle)
            .unwrap_or_else(|| panic!("{needle:?} not found in {texts:?}"))
    };

    let subject = position("会議のお知らせ");
    let from = position("From:");
    let date = position("Date:");
    let body = position("来週の会議は月曜日の十時からです。");
    assert!(subject < from && from < date && date < body);
    assert!(texts.iter().any(|t| t == "山田 太郎 <taro@example.jp>"));
    assert!(!texts.iter().any(|t| t == "Cc:"));
}

#[test]
fn test_cc_line_is_rendered_when_present() {
    let record = read_message(fixture("plain_ascii.eml")).unwrap();
    let texts = all_text(&render_pdf(&record, &RenderOptions::default()).unwrap());
    assert!(texts.iter().any(|t| t == "Cc:"));
    assert!(texts.iter().any(|t| t == "carol@example.com"));
}

#[test]
fn test_empty_body_renders_a_single_page() {
    let record = read_message(fixture("empty_body.eml")).unwrap();
    let pdf = render_pdf(&record, &RenderOptions::default()).unwrap();
    let pages = page_texts(&pdf);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0][0], "Nothing to say");
}

#[test]
fn test_long_body_spills_onto_more_pages_in_order() {
    let body: Vec<String> = (1..=200).map(|i| format!("第{i}行")).collect();
    let record = MessageRecord {
        subject: "長い本文".into(),
        from: "a@example.jp".into(),
        body: body.join("\n"),
        ..MessageRecord::default()
    };
    let pages = page_texts(&render_pdf(&record, &RenderOptions::default()).unwrap());
    assert!(pages.len() > 1);

    let rendered: Vec<String> = pages
        .into_iter()
        .flatten()
        .filter(|t| t.starts_with('第'))
        .collect();
    assert_eq!(rendered, body);
}

#[test]
fn test_unrenderable_characters_become_placeholder() {
    let record = MessageRecord {
        subject: "smile \u{1F600}".into(),
        body: "bell\u{7}".into(),
        ..MessageRecord::default()
    };
    let texts = all_text(&render_pdf(&record, &RenderOptions::default()).unwrap());
    assert!(texts.iter().any(|t| t == "smile \u{3013}"));
    assert!(texts.iter().any(|t| t == "bell\u{3013}"));
}

// ─── Batch over a folder ────────────────────────────────────────────

#[test]
fn test_batch_converts_every_fixture_except_the_broken_one() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.copy_from(fixtures_dir(), &["*.eml"]).unwrap();
    temp.child("notes.txt").write_str("not a message").unwrap();

    let plan = plan_batch(temp.path(), &temp.path().join("pdf_output")).unwrap();
    let eml_count = plan.files.len();
    assert_eq!(eml_count, 11);

    let batch = Batch::start(plan, RenderOptions::default()).unwrap();
    let summary = batch.run(&|_, _, _| {});

    assert_eq!(summary.total, eml_count);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, eml_count - 1);

    let failed: Vec<&FileOutcome> = summary.outcomes.iter().filter(|o| !o.is_success()).collect();
    assert_eq!(failed[0].file_name(), "broken.eml");

    temp.child("pdf_output").assert(predicate::path::is_dir());
    temp.child("pdf_output/iso2022jp.pdf")
        .assert(predicate::path::is_file());
    temp.child("pdf_output/euc_jp.pdf")
        .assert(predicate::path::is_file());
    temp.child("pdf_output/broken.pdf")
        .assert(predicate::path::missing());
    temp.child("pdf_output/notes.pdf")
        .assert(predicate::path::missing());
}

#[test]
fn test_batch_progress_counts_up_to_total() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.copy_from(fixtures_dir(), &["plain_ascii.eml", "raw_utf8.eml"])
        .unwrap();

    let plan = plan_batch(temp.path(), &temp.path().join("out")).unwrap();
    let seen = std::cell::RefCell::new(Vec::new());
    let summary = Batch::start(plan, RenderOptions::default())
        .unwrap()
        .run(&|done, total, _| seen.borrow_mut().push((done, total)));

    assert_eq!(*seen.borrow(), vec![(1, 2), (2, 2)]);
    assert_eq!(summary.succeeded, 2);
    assert!(summary.output_bytes > 0);
}

#[test]
fn test_rerun_overwrites_existing_pdf() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.copy_from(fixtures_dir(), &["plain_ascii.eml"]).unwrap();
    temp.child("out/plain_ascii.pdf").write_str("stale").unwrap();

    let plan = plan_batch(temp.path(), &temp.path().join("out")).unwrap();
    let summary = Batch::start(plan, RenderOptions::default())
        .unwrap()
        .run(&|_, _, _| {});
    assert_eq!(summary.succeeded, 1);

    let written = std::fs::read(temp.child("out/plain_ascii.pdf").path()).unwrap();
    assert!(written.starts_with(b"%PDF-1.4"));
    assert!(page_texts(&written)[0].contains(&"Quarterly report (draft)".to_string()));
}

// ─── Command-line binary ────────────────────────────────────────────

/// Run the binary with an isolated config and log folder.
fn eml2pdf(temp: &assert_fs::TempDir) -> Command {
    let config = temp.child("config.toml");
    let logs = temp.child("logs");
    config
        .write_str(&format!(
            "[general]\nlang = \"en\"\ncache_dir = {:?}\n",
            logs.path().display().to_string()
        ))
        .unwrap();

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_eml2pdf"));
    cmd.env("EML2PDF_CONFIG", config.path());
    cmd
}

#[test]
fn test_cli_missing_input_folder_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    let output = eml2pdf(&temp)
        .arg(temp.path().join("no-such-folder"))
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_cli_json_summary_and_success_exit_with_failures() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mail = temp.child("mail");
    mail.create_dir_all().unwrap();
    mail.copy_from(fixtures_dir(), &["plain_ascii.eml", "broken.eml"])
        .unwrap();

    let output = eml2pdf(&temp).arg(mail.path()).arg("--json").output().unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["succeeded"], 1);
    assert_eq!(summary["failed"], 1);
    let statuses: Vec<&str> = summary["outcomes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, ["failed", "converted"]);

    mail.child("pdf_output/plain_ascii.pdf")
        .assert(predicate::path::is_file());
}

#[test]
fn test_cli_explicit_output_folder() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mail = temp.child("mail");
    mail.create_dir_all().unwrap();
    mail.copy_from(fixtures_dir(), &["shift_jis_qp.eml"]).unwrap();
    let out = temp.child("pdfs");

    let output = eml2pdf(&temp)
        .arg(mail.path())
        .arg("-o")
        .arg(out.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    out.child("shift_jis_qp.pdf")
        .assert(predicate::path::is_file());
    mail.child("pdf_output").assert(predicate::path::missing());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1/1"));
}

#[test]
fn test_cli_warns_about_unusable_page_margins() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut cmd = eml2pdf(&temp);
    let config = temp.child("config.toml");
    let base = std::fs::read_to_string(config.path()).unwrap();
    config
        .write_str(&format!("{base}\n[page]\nmargin_left = 400.0\nmargin_right = 400.0\n"))
        .unwrap();

    let mail = temp.child("mail");
    mail.create_dir_all().unwrap();
    mail.copy_from(fixtures_dir(), &["plain_ascii.eml"]).unwrap();

    let output = cmd.arg(mail.path()).output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Page margins leave no room for text"));
    mail.child("pdf_output/plain_ascii.pdf")
        .assert(predicate::path::is_file());
}

#[test]
fn test_cli_init_config_refuses_to_overwrite() {
    let temp = assert_fs::TempDir::new().unwrap();
    let output = eml2pdf(&temp).arg("init-config").output().unwrap();
    assert!(!output.status.success());

    let output = eml2pdf(&temp)
        .arg("init-config")
        .arg("--force")
        .output()
        .unwrap();
    assert!(output.status.success());
    temp.child("config.toml")
        .assert(predicate::str::contains("[output]"))
        .assert(predicate::str::contains("dir_name = \"pdf_output\""))
        .assert(predicate::str::contains("lang = \"en\""));
}
