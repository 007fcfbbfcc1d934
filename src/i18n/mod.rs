//! Internationalization (i18n) module.
//!
//! Provides localized strings for the CLI, the terminal UI and the header
//! block of generated PDFs. English is the default language; Japanese is
//! available as an alternative.

use std::sync::OnceLock;

static CURRENT_LANG: OnceLock<Lang> = OnceLock::new();

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// English (default)
    En,
    /// Japanese
    Ja,
}

impl Lang {
    /// Parse a language code string (e.g. "en", "ja", "en_US", "ja_JP.UTF-8").
    /// Returns `None` for unrecognized codes.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.to_lowercase();
        let prefix = normalized.split(['_', '-', '.']).next().unwrap_or("");
        match prefix {
            "en" => Some(Self::En),
            "ja" | "jp" => Some(Self::Ja),
            _ => None,
        }
    }

    /// Return the ISO 639-1 code for this language.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ja => "ja",
        }
    }
}

/// Initialize the global language. Call once at startup.
/// If already initialized, this is a no-op.
pub fn set_lang(lang: Lang) {
    let _ = CURRENT_LANG.set(lang);
}

/// Get the currently configured language (defaults to English).
pub fn lang() -> Lang {
    CURRENT_LANG.get().copied().unwrap_or(Lang::En)
}

/// Detect language from `EML2PDF_LANG`, then `LC_MESSAGES`, then `LANG`.
pub fn detect_system_lang() -> Option<Lang> {
    std::env::var("EML2PDF_LANG")
        .ok()
        .and_then(|v| Lang::from_code(&v))
        .or_else(|| {
            std::env::var("LC_MESSAGES")
                .ok()
                .and_then(|v| Lang::from_code(&v))
        })
        .or_else(|| std::env::var("LANG").ok().and_then(|v| Lang::from_code(&v)))
}

/// Labels of the header block printed at the top of every PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfLabels {
    pub from: &'static str,
    pub to: &'static str,
    pub cc: &'static str,
    pub date: &'static str,
    /// Shown in place of an empty subject.
    pub no_subject: &'static str,
}

impl PdfLabels {
    /// Labels for an explicit language, independent of the global setting.
    pub fn for_lang(lang: Lang) -> Self {
        match lang {
            Lang::En => Self {
                from: "From",
                to: "To",
                cc: "Cc",
                date: "Date",
                no_subject: "(no subject)",
            },
            Lang::Ja => Self {
                from: "差出人",
                to: "宛先",
                cc: "CC",
                date: "日時",
                no_subject: "(件名なし)",
            },
        }
    }
}

/// Macro for defining translatable message functions.
/// Each function returns a `&'static str` based on the current language.
macro_rules! msg {
    ($name:ident, $en:expr, $ja:expr) => {
        /// Returns a localized string for the current language.
        pub fn $name() -> &'static str {
            match lang() {
                Lang::En => $en,
                Lang::Ja => $ja,
            }
        }
    };
}

// ── General ──────────────────────────────────────────────────────

msg!(app_name, "eml2pdf", "eml2pdf");
msg!(
    app_about,
    "eml2pdf \u{2014} Convert a folder of .eml email files to PDF.",
    "eml2pdf \u{2014} .eml ファイルを PDF に一括変換します。"
);
msg!(
    app_long_about,
    "eml2pdf \u{2014} Convert a folder of .eml email files to PDF.\nDecodes MIME headers and bodies in UTF-8, ISO-2022-JP, Shift_JIS,\nEUC-JP and more. Run without arguments for the interactive terminal UI.",
    "eml2pdf \u{2014} .eml ファイルを PDF に一括変換します。\nUTF-8、ISO-2022-JP、Shift_JIS、EUC-JP などのヘッダーと本文を復号します。\n引数なしで起動すると対話型の画面が開きます。"
);
msg!(
    app_after_help,
    "Examples:\n  eml2pdf ./mails\n  eml2pdf ./mails -o ./pdf\n  eml2pdf              (interactive)",
    "使い方の例:\n  eml2pdf ./mails\n  eml2pdf ./mails -o ./pdf\n  eml2pdf              (対話モード)"
);

// ── CLI help strings ─────────────────────────────────────────────

msg!(
    help_cmd_completions,
    "Generate shell completions",
    "シェル補完スクリプトを生成"
);
msg!(help_cmd_manpage, "Generate a man page", "man ページを生成");
msg!(
    help_cmd_init_config,
    "Write the current settings to the config file",
    "現在の設定を設定ファイルに書き出す"
);

// ── CLI output ───────────────────────────────────────────────────

msg!(
    err_input_not_found,
    "Input folder not found",
    "入力フォルダが見つかりません"
);
msg!(
    err_input_unreadable,
    "Input folder cannot be read",
    "入力フォルダを読み取れません"
);
msg!(msg_converting, "Converting", "変換中");
msg!(
    msg_no_eml_files,
    "No .eml files found",
    ".eml ファイルが見つかりません"
);
msg!(msg_summary_done, "Done", "完了");
msg!(msg_succeeded, "succeeded", "件成功");
msg!(msg_failed, "failed", "件エラー");
msg!(msg_total_files, "Files", "ファイル数");
msg!(msg_converted, "Converted", "成功");
msg!(msg_errors, "Errors", "エラー");
msg!(msg_output_size, "Output size", "出力サイズ");
msg!(msg_output_dir, "Output folder", "出力先");
msg!(msg_log_file, "Log file", "ログファイル");
msg!(msg_config_written, "Config written", "設定を書き出しました");
msg!(
    err_config_exists,
    "Config file already exists (use --force to overwrite)",
    "設定ファイルは既に存在します (上書きするには --force)"
);
msg!(
    err_config_path,
    "Could not determine the config file path",
    "設定ファイルの場所を決定できません"
);

// ── TUI ──────────────────────────────────────────────────────────

msg!(
    tui_title,
    " EML \u{2192} PDF batch converter ",
    " EML \u{2192} PDF 一括変換 "
);
msg!(tui_input_folder, " Input folder (.eml) ", " 入力フォルダ (.eml) ");
msg!(tui_output_folder, " Output folder (PDF) ", " 出力フォルダ (PDF) ");
msg!(tui_convert, "  Convert  ", "  変換開始  ");
msg!(tui_log, " Log ", " ログ ");
msg!(
    tui_status_idle,
    "Pick the folders and press Enter on Convert",
    "フォルダを選択して「変換開始」を押してください"
);
msg!(tui_status_processing, "processing", "件処理中");
msg!(
    tui_warn_no_input,
    "Please choose an input folder",
    "入力フォルダを選択してください"
);
msg!(
    tui_warn_no_output,
    "Please choose an output folder",
    "出力フォルダを選択してください"
);
msg!(tui_picker_title, " Choose folder ", " フォルダを選択 ");
msg!(tui_complete_title, " Complete ", " 完了 ");
msg!(tui_info_title, " Info ", " 情報 ");
msg!(tui_error_title, " Error ", " エラー ");
msg!(tui_hint_next, "next field", "次の項目");
msg!(tui_hint_pick, "pick folder", "フォルダ選択");
msg!(tui_hint_convert, "convert", "変換");
msg!(tui_hint_quit, "quit", "終了");
msg!(tui_hint_open, "open", "開く");
msg!(tui_hint_parent, "parent", "上へ");
msg!(tui_hint_choose, "choose this folder", "このフォルダを選択");
msg!(tui_hint_cancel, "cancel", "キャンセル");
msg!(tui_hint_close, "close", "閉じる");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_from_code() {
        assert_eq!(Lang::from_code("en"), Some(Lang::En));
        assert_eq!(Lang::from_code("ja"), Some(Lang::Ja));
        assert_eq!(Lang::from_code("en_US"), Some(Lang::En));
        assert_eq!(Lang::from_code("ja_JP.UTF-8"), Some(Lang::Ja));
        assert_eq!(Lang::from_code("fr"), None);
    }

    #[test]
    fn test_lang_code_roundtrip() {
        assert_eq!(Lang::from_code(Lang::En.code()), Some(Lang::En));
        assert_eq!(Lang::from_code(Lang::Ja.code()), Some(Lang::Ja));
    }

    #[test]
    fn test_pdf_labels_do_not_depend_on_global_lang() {
        assert_eq!(PdfLabels::for_lang(Lang::Ja).from, "差出人");
        assert_eq!(PdfLabels::for_lang(Lang::En).date, "Date");
    }

    #[test]
    fn test_messages_return_strings() {
        // Smoke test: all message functions return non-empty strings
        assert!(!app_name().is_empty());
        assert!(!app_about().is_empty());
        assert!(!err_input_not_found().is_empty());
        assert!(!tui_status_idle().is_empty());
    }
}
