//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$EML2PDF_CONFIG` (environment variable)
//! 2. `~/.config/eml2pdf/config.toml` (Linux/macOS)
//!    `%APPDATA%\eml2pdf\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! The configuration is read once at startup and never mutated afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::i18n::Lang;
use crate::model::geometry::PageGeometry;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Where and what to convert.
    pub output: OutputConfig,
    /// Page size, margins and line metrics.
    pub page: PageGeometry,
    /// CID fonts used in the PDF.
    pub fonts: FontConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// UI and PDF label language. `None` follows the system locale.
    pub lang: Option<Lang>,
    /// Override the directory for log files.
    pub cache_dir: Option<PathBuf>,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Name of the default output folder created inside the input folder.
    pub dir_name: String,
    /// Extension (without dot, case-insensitive) of the files to convert.
    pub extension: String,
}

/// Non-embedded Adobe-Japan1 CID fonts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font for the subject and header lines.
    pub heading: String,
    /// Font for the body text.
    pub body: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            lang: None,
            cache_dir: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir_name: "pdf_output".to_string(),
            extension: "eml".to_string(),
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            heading: "HeiseiKakuGo-W5".to_string(),
            body: "HeiseiMin-W3".to_string(),
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// A problem met while loading the config file.
///
/// Loading happens before logging is set up, so issues are handed back to
/// the caller and reported with [`ConfigIssue::report`] once it is.
#[derive(Debug)]
pub enum ConfigIssue {
    /// The file exists but could not be read or parsed.
    Unreadable { path: PathBuf, error: anyhow::Error },
    /// The `[page]` table leaves no room for text.
    UnusablePage { path: PathBuf },
}

impl ConfigIssue {
    /// Log the issue as a warning.
    pub fn report(&self) {
        match self {
            Self::Unreadable { path, error } => tracing::warn!(
                path = %path.display(),
                error = %error,
                "Failed to load config, using defaults"
            ),
            Self::UnusablePage { path } => tracing::warn!(
                path = %path.display(),
                "Page margins leave no room for text, using default page"
            ),
        }
    }
}

/// Load configuration, searching standard locations.
///
/// Never fails: a missing file gives the defaults, an unreadable or invalid
/// one gives the defaults too, along with the issue to report.
pub fn load_config() -> (Config, Option<ConfigIssue>) {
    let Some(path) = config_file_path().filter(|p| p.exists()) else {
        return (Config::default(), None);
    };
    match read_config_file(&path) {
        Ok(cfg) => validate_config(cfg, path),
        Err(error) => (
            Config::default(),
            Some(ConfigIssue::Unreadable { path, error }),
        ),
    }
}

/// Replace a page geometry that leaves no text area with the default one.
fn validate_config(mut cfg: Config, path: PathBuf) -> (Config, Option<ConfigIssue>) {
    if page_is_usable(&cfg.page) {
        return (cfg, None);
    }
    cfg.page = PageGeometry::default();
    (cfg, Some(ConfigIssue::UnusablePage { path }))
}

/// `true` when the margins leave a non-empty text area.
pub fn page_is_usable(page: &PageGeometry) -> bool {
    page.text_width() > 0.0 && page.top() > page.bottom()
}

fn read_config_file(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("EML2PDF_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("eml2pdf").join("config.toml"))
}

/// Return the directory for log files.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("eml2pdf")
}

/// File name of the log written inside [`cache_dir`].
pub const LOG_FILE_NAME: &str = "eml2pdf.log";

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join(LOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.output.dir_name, "pdf_output");
        assert_eq!(cfg.output.extension, "eml");
        assert_eq!(cfg.fonts.heading, "HeiseiKakuGo-W5");
        assert_eq!(cfg.page, PageGeometry::default());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.output.dir_name, cfg.output.dir_name);
        assert_eq!(parsed.fonts.body, cfg.fonts.body);
        assert_eq!(parsed.page, cfg.page);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[general]
lang = "ja"

[page]
margin_left = 36.0

[output]
dir_name = "pdf"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.general.lang, Some(Lang::Ja));
        assert_eq!(cfg.page.margin_left, 36.0);
        assert_eq!(cfg.page.width, PageGeometry::default().width);
        assert_eq!(cfg.output.dir_name, "pdf");
        assert_eq!(cfg.output.extension, "eml");
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_read_config_file_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[output\ndir_name = 1").unwrap();
        assert!(read_config_file(&path).is_err());

        std::fs::write(&path, "[fonts]\nbody = \"KozMinPro-Regular\"\n").unwrap();
        let cfg = read_config_file(&path).unwrap();
        assert_eq!(cfg.fonts.body, "KozMinPro-Regular");
        assert_eq!(cfg.fonts.heading, "HeiseiKakuGo-W5");
    }

    #[test]
    fn test_default_page_is_usable() {
        assert!(page_is_usable(&PageGeometry::default()));
    }

    #[test]
    fn test_overlapping_margins_fall_back_to_default_page() {
        let mut cfg = Config::default();
        cfg.page.margin_left = 400.0;
        cfg.page.margin_right = 400.0;
        cfg.fonts.body = "KozMinPro-Regular".to_string();

        let (cfg, issue) = validate_config(cfg, PathBuf::from("config.toml"));
        assert!(matches!(issue, Some(ConfigIssue::UnusablePage { .. })));
        assert_eq!(cfg.page, PageGeometry::default());
        assert_eq!(cfg.fonts.body, "KozMinPro-Regular");

        let mut tall = Config::default();
        tall.page.margin_top = tall.page.height;
        let (_, issue) = validate_config(tall, PathBuf::from("config.toml"));
        assert!(issue.is_some());

        let (_, issue) = validate_config(Config::default(), PathBuf::from("config.toml"));
        assert!(issue.is_none());
    }

    #[test]
    fn test_log_file_inside_cache_dir() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/tmp/eml2pdf-test"));
        assert_eq!(
            log_file_path(&cfg),
            PathBuf::from("/tmp/eml2pdf-test/eml2pdf.log")
        );
    }
}
