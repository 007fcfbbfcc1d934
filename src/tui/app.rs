//! Global application state for the TUI (the "Model" in Elm architecture).

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Config;
use crate::error::ConvertError;
use crate::export::batch::{self, Batch, BatchSummary, FileOutcome};
use crate::export::RenderOptions;
use crate::i18n::{self, Lang};

/// Which form element currently has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Output,
    Convert,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Convert,
            Self::Convert => Self::Input,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Input => Self::Convert,
            Self::Output => Self::Input,
            Self::Convert => Self::Output,
        }
    }
}

/// Which path field a folder picker fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    Input,
    Output,
}

/// Directory browser listing the sub-folders of `dir`.
#[derive(Debug, Clone)]
pub struct FolderPicker {
    pub target: PickTarget,
    pub dir: PathBuf,
    /// Names of the sub-folders, sorted case-insensitively.
    pub entries: Vec<String>,
    pub selected: usize,
    /// Error from the last directory listing, if any.
    pub error: Option<String>,
}

impl FolderPicker {
    pub fn open(target: PickTarget, start: PathBuf) -> Self {
        let mut picker = Self {
            target,
            dir: start,
            entries: Vec::new(),
            selected: 0,
            error: None,
        };
        picker.refresh();
        picker
    }

    /// Re-read the sub-folders of the current directory.
    pub fn refresh(&mut self) {
        self.selected = 0;
        self.entries.clear();
        self.error = None;
        match std::fs::read_dir(&self.dir) {
            Ok(read) => {
                self.entries = read
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().is_dir())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect();
                self.entries.sort_by_key(|name| name.to_lowercase());
            }
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "Cannot list folder");
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Descend into the selected sub-folder.
    pub fn enter(&mut self) {
        if let Some(name) = self.entries.get(self.selected) {
            self.dir = self.dir.join(name);
            self.refresh();
        }
    }

    /// Go up to the parent folder, keeping the folder we came from selected.
    pub fn parent(&mut self) {
        let Some(parent) = self.dir.parent().map(Path::to_path_buf) else {
            return;
        };
        let came_from = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        self.dir = parent;
        self.refresh();
        if let Some(name) = came_from {
            if let Some(pos) = self.entries.iter().position(|e| *e == name) {
                self.selected = pos;
            }
        }
    }
}

/// Kind of modal message box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Complete,
    Info,
    Error,
}

/// A modal message box closed with Enter or Esc.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

/// One line of the conversion log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// `None` for plain lines, otherwise success or failure of a file.
    pub ok: Option<bool>,
    pub text: String,
}

/// Complete TUI state.
pub struct App {
    pub config: Config,
    pub lang: Lang,

    // ── Form ──────────────────────────────────
    pub input: String,
    pub output: String,
    /// The output field still holds the value derived from the input.
    output_auto: bool,
    pub focus: Focus,

    // ── Popups ────────────────────────────────
    pub picker: Option<FolderPicker>,
    pub notice: Option<Notice>,

    // ── Conversion ────────────────────────────
    pub batch: Option<Batch>,
    /// `(done, total)` of the running or last batch.
    pub progress: (usize, usize),
    pub log: Vec<LogLine>,
    /// Line shown under the progress gauge.
    pub status_line: String,

    // ── Lifecycle ─────────────────────────────
    pub should_quit: bool,
    /// Transient status message and the instant it was set.
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(config: Config, lang: Lang) -> Self {
        Self {
            config,
            lang,
            input: String::new(),
            output: String::new(),
            output_auto: false,
            focus: Focus::Input,
            picker: None,
            notice: None,
            batch: None,
            progress: (0, 0),
            log: Vec::new(),
            status_line: i18n::tui_status_idle().to_string(),
            should_quit: false,
            status_message: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.batch.is_some()
    }

    /// Set the input folder. The output field follows it with
    /// `<input>/pdf_output` until the user sets an output of their own.
    pub fn set_input(&mut self, value: String) {
        self.input = value;
        if self.output.is_empty() || self.output_auto {
            self.output = if self.input.trim().is_empty() {
                String::new()
            } else {
                Path::new(self.input.trim())
                    .join(&self.config.output.dir_name)
                    .display()
                    .to_string()
            };
            self.output_auto = !self.output.is_empty();
        }
    }

    pub fn set_output(&mut self, value: String) {
        self.output = value;
        self.output_auto = false;
    }

    /// Type a character into the focused path field.
    pub fn push_char(&mut self, c: char) {
        match self.focus {
            Focus::Input => {
                let mut value = self.input.clone();
                value.push(c);
                self.set_input(value);
            }
            Focus::Output => {
                let mut value = self.output.clone();
                value.push(c);
                self.set_output(value);
            }
            Focus::Convert => {}
        }
    }

    /// Delete the last character of the focused path field.
    pub fn pop_char(&mut self) {
        match self.focus {
            Focus::Input => {
                let mut value = self.input.clone();
                value.pop();
                self.set_input(value);
            }
            Focus::Output => {
                let mut value = self.output.clone();
                value.pop();
                self.set_output(value);
            }
            Focus::Convert => {}
        }
    }

    /// Open the folder picker for the focused field, starting at its current
    /// value when that is a folder, else the home folder.
    pub fn open_picker(&mut self) {
        let (target, current) = match self.focus {
            Focus::Output => (PickTarget::Output, self.output.trim()),
            _ => (PickTarget::Input, self.input.trim()),
        };
        let start = Some(PathBuf::from(current))
            .filter(|p| !current.is_empty() && p.is_dir())
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        self.picker = Some(FolderPicker::open(target, start));
    }

    /// Use the picker's current folder for its target field.
    pub fn choose_picked(&mut self) {
        if let Some(picker) = self.picker.take() {
            let value = picker.dir.display().to_string();
            match picker.target {
                PickTarget::Input => {
                    self.set_input(value);
                    self.focus = Focus::Output;
                }
                PickTarget::Output => {
                    self.set_output(value);
                    self.focus = Focus::Convert;
                }
            }
        }
    }

    fn show_notice(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            text: text.into(),
        });
    }

    /// Validate the form and start a batch. Files are converted by [`App::tick`].
    pub fn start_conversion(&mut self) {
        if self.is_busy() {
            return;
        }
        let input = self.input.trim().to_string();
        let output = self.output.trim().to_string();
        if input.is_empty() {
            self.show_notice(NoticeKind::Info, i18n::tui_warn_no_input());
            return;
        }
        if output.is_empty() {
            self.show_notice(NoticeKind::Info, i18n::tui_warn_no_output());
            return;
        }

        self.log.clear();
        self.progress = (0, 0);

        let plan = batch::plan_batch_matching(
            Path::new(&input),
            Path::new(&output),
            &self.config.output.extension,
        );
        let started = plan.and_then(|plan| {
            Batch::start(plan, RenderOptions::from_config(&self.config, self.lang))
        });

        match started {
            Ok(batch) => {
                self.progress = (0, batch.total());
                self.batch = Some(batch);
            }
            Err(e) => {
                let text = match &e {
                    ConvertError::InputFolderMissing(path) => {
                        format!("{}: {}", i18n::err_input_not_found(), path.display())
                    }
                    _ => e.to_string(),
                };
                self.log.push(LogLine {
                    ok: Some(false),
                    text: text.clone(),
                });
                self.status_line = text.clone();
                self.show_notice(NoticeKind::Error, text);
            }
        }
    }

    /// Called every tick: clears expired status messages and converts one
    /// file of the running batch.
    pub fn tick(&mut self) {
        if let Some((_, when)) = &self.status_message {
            if when.elapsed().as_secs() >= 5 {
                self.status_message = None;
            }
        }

        let Some(batch) = self.batch.as_mut() else {
            return;
        };

        if let Some(outcome) = batch.step() {
            self.progress = (batch.done(), batch.total());
            self.status_line = format!(
                "{} / {} {}",
                batch.done(),
                batch.total(),
                i18n::tui_status_processing()
            );
            self.log.push(log_line(&outcome));
        }

        if batch.is_finished() {
            if let Some(batch) = self.batch.take() {
                self.finish(batch.into_summary());
            }
        }
    }

    fn finish(&mut self, summary: BatchSummary) {
        let headline = summary.headline();
        self.status_line = headline.clone();
        self.log.push(LogLine {
            ok: None,
            text: String::new(),
        });
        self.log.push(LogLine {
            ok: None,
            text: headline.clone(),
        });
        self.log.push(LogLine {
            ok: None,
            text: format!("{}: {}", i18n::msg_output_dir(), summary.output_dir.display()),
        });

        if summary.total == 0 {
            self.show_notice(NoticeKind::Info, i18n::msg_no_eml_files());
        } else {
            self.show_notice(NoticeKind::Complete, headline);
        }
    }

    /// Set a transient status message that auto-clears after a few seconds.
    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some((msg.to_string(), Instant::now()));
    }
}

fn log_line(outcome: &FileOutcome) -> LogLine {
    match outcome {
        FileOutcome::Converted { .. } => LogLine {
            ok: Some(true),
            text: format!("\u{2713} {}", outcome.file_name()),
        },
        FileOutcome::Failed { error, .. } => LogLine {
            ok: Some(false),
            text: format!("\u{2717} {}  ({error})", outcome.file_name()),
        },
    }
}
