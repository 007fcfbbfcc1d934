//! CLI entry point for `eml2pdf`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use eml2pdf::config::{self, Config};
use eml2pdf::error::ConvertError;
use eml2pdf::export::batch::{self, Batch, BatchSummary, FileOutcome};
use eml2pdf::export::RenderOptions;
use eml2pdf::i18n::{self, Lang};

#[derive(Parser)]
#[command(name = "eml2pdf", version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Folder containing the .eml files. Omit to start the terminal UI.
    #[arg(value_name = "INPUT_DIR")]
    input: Option<PathBuf>,

    /// Output folder (default: <INPUT_DIR>/pdf_output)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Language (en, ja). Defaults to the config file, then the system locale.
    #[arg(long, value_name = "LANG", global = true)]
    lang: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
    /// Write the current settings to the config file
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Read `--lang` from the raw arguments, before clap processes `--help`.
fn lang_from_args() -> Option<Lang> {
    let args: Vec<String> = std::env::args().collect();
    for (i, arg) in args.iter().enumerate() {
        if arg == "--lang" {
            if let Some(lang) = args.get(i + 1).and_then(|code| Lang::from_code(code)) {
                return Some(lang);
            }
        }
        if let Some(lang) = arg.strip_prefix("--lang=").and_then(Lang::from_code) {
            return Some(lang);
        }
    }
    None
}

/// Build a localized clap Command using i18n strings.
fn build_localized_command() -> clap::Command {
    Cli::command()
        .about(i18n::app_about())
        .long_about(i18n::app_long_about())
        .after_help(i18n::app_after_help())
        .mut_subcommand("completions", |s| s.about(i18n::help_cmd_completions()))
        .mut_subcommand("manpage", |s| s.about(i18n::help_cmd_manpage()))
        .mut_subcommand("init-config", |s| s.about(i18n::help_cmd_init_config()))
}

fn main() -> anyhow::Result<()> {
    let (config, config_issue) = config::load_config();

    // Language must be known before clap renders --help
    let lang = lang_from_args()
        .or(config.general.lang)
        .or_else(i18n::detect_system_lang)
        .unwrap_or(Lang::En);
    i18n::set_lang(lang);

    let matches = build_localized_command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let interactive = cli.command.is_none() && cli.input.is_none();
    setup_logging(log_level, &config, !interactive);
    if let Some(issue) = &config_issue {
        issue.report();
    }

    if let Some(code) = cli.lang.as_deref() {
        if Lang::from_code(code).is_none() {
            tracing::warn!(lang = code, "Unknown language, using {}", lang.code());
        }
    }

    match cli.command {
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
        Some(Commands::InitConfig { force }) => cmd_init_config(&config, force),
        None => match cli.input {
            Some(input) => cmd_convert(&input, cli.output, cli.json, &config, lang),
            None => eml2pdf::tui::run_tui(config, lang),
        },
    }
}

/// Set up tracing with an optional stderr layer and a log file in the cache
/// directory. The terminal UI logs to the file only.
fn setup_logging(level: &str, config: &Config, to_stderr: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer =
        to_stderr.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let log_dir = config::cache_dir(config);
    let file_layer = std::fs::create_dir_all(&log_dir).is_ok().then(|| {
        let file_appender = tracing_appender::rolling::never(&log_dir, config::LOG_FILE_NAME);
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "eml2pdf", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Write the loaded (or default) configuration to the config file.
fn cmd_init_config(config: &Config, force: bool) -> anyhow::Result<()> {
    let path = config::config_file_path()
        .ok_or_else(|| anyhow::anyhow!("{}", i18n::err_config_path()))?;
    if path.exists() && !force {
        anyhow::bail!("{}: {}", i18n::err_config_exists(), path.display());
    }
    config::save_config(config)?;
    println!("{}: {}", i18n::msg_config_written(), path.display());
    Ok(())
}

/// Convert every `.eml` file of `input` and print a summary.
///
/// Per-file failures are reported but do not change the exit code; a
/// missing or unreadable input folder does.
fn cmd_convert(
    input: &Path,
    output: Option<PathBuf>,
    json: bool,
    config: &Config,
    lang: Lang,
) -> anyhow::Result<()> {
    let output_dir = output.unwrap_or_else(|| input.join(&config.output.dir_name));

    let plan = match batch::plan_batch_matching(input, &output_dir, &config.output.extension) {
        Ok(plan) => plan,
        Err(ConvertError::InputFolderMissing(path)) => {
            anyhow::bail!("{}: {}", i18n::err_input_not_found(), path.display())
        }
        Err(ConvertError::FileUnreadable { path, source }) => {
            anyhow::bail!("{}: {}: {source}", i18n::err_input_unreadable(), path.display())
        }
        Err(e) => return Err(e.into()),
    };

    if plan.files.is_empty() && !json {
        eprintln!("  {}: {}", i18n::msg_no_eml_files(), input.display());
    }

    let batch = Batch::start(plan, RenderOptions::from_config(config, lang))?;

    let pb = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(batch.total() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} {} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {{wide_msg}}",
                i18n::msg_converting()
            ))?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let summary = batch.run(&|done, _total, outcome| {
        pb.set_position(done as u64);
        pb.set_message(outcome.file_name());
        if let FileOutcome::Failed { error, .. } = outcome {
            pb.println(format!("  \u{2717} {error}"));
        }
    });
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary_table(&summary, start.elapsed(), config);
    }

    Ok(())
}

/// Print the batch summary in a human-readable table.
fn print_summary_table(summary: &BatchSummary, elapsed: std::time::Duration, config: &Config) {
    use humansize::{format_size, BINARY};

    println!();
    println!("  {} ({elapsed:.2?})", summary.headline());
    println!();
    println!("  {:<20} {}", i18n::msg_total_files(), summary.total);
    println!("  {:<20} {}", i18n::msg_converted(), summary.succeeded);
    println!("  {:<20} {}", i18n::msg_errors(), summary.failed);
    println!(
        "  {:<20} {}",
        i18n::msg_output_size(),
        format_size(summary.output_bytes, BINARY)
    );
    println!(
        "  {:<20} {}",
        i18n::msg_output_dir(),
        summary.output_dir.display()
    );

    let failures: Vec<&FileOutcome> = summary.outcomes.iter().filter(|o| !o.is_success()).collect();
    if !failures.is_empty() {
        println!();
        for outcome in failures {
            if let FileOutcome::Failed { error, .. } = outcome {
                println!("    \u{2717} {:<30} {error}", outcome.file_name());
            }
        }
        println!();
        println!(
            "  {:<20} {}",
            i18n::msg_log_file(),
            config::log_file_path(config).display()
        );
    }
    println!();
}
