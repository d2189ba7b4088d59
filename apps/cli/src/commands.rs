//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use kbforge_core::{DetectProgress, DetectionOutcome, DocumentSummary, detect_tree};
use kbforge_shared::{AppConfig, DetectOptions, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// kbforge: merge scattered, loosely structured documents into one knowledge base.
#[derive(Parser)]
#[command(
    name = "kbforge",
    version,
    about = "Detect capabilities, workflows, and related entities across a document tree.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// How `detect` prints its result.
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable counts and problems.
    Summary,
    /// `{ knowledge, errors, fingerprint }` as pretty JSON.
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Detect entities under a directory (or in a single document).
    Detect {
        /// Root directory or document.
        root: PathBuf,

        /// Documents processed at once (defaults to the configured value).
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Output format.
        #[arg(short, long, value_enum, default_value = "summary")]
        format: OutputFormat,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "kbforge=info",
        1 => "kbforge=debug",
        _ => "kbforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `--format json` output stays machine-readable.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Detect {
            root,
            concurrency,
            format,
        } => cmd_detect(&root, concurrency, &format).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// detect
// ---------------------------------------------------------------------------

async fn cmd_detect(root: &Path, concurrency: Option<usize>, format: &OutputFormat) -> Result<()> {
    let config = load_config()?;
    let opts = detect_options(&config, concurrency);

    info!(root = %root.display(), concurrency = opts.concurrency, "detecting");

    let reporter = CliProgress::new()?;
    let outcome = detect_tree(root, &opts, &reporter)
        .await
        .wrap_err_with(|| format!("cannot walk {}", root.display()))?;

    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "knowledge": outcome.knowledge,
                "errors": outcome.errors,
                "fingerprint": outcome.knowledge.fingerprint()?,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Summary => print_summary(&outcome)?,
    }

    Ok(())
}

/// Config values, with CLI flags taking precedence.
fn detect_options(config: &AppConfig, concurrency: Option<usize>) -> DetectOptions {
    let opts = DetectOptions::from(config);
    match concurrency {
        Some(n) => opts.with_concurrency(n),
        None => opts,
    }
}

fn print_summary(outcome: &DetectionOutcome) -> Result<()> {
    let kb = &outcome.knowledge;

    println!();
    println!("  Documents:      {}", outcome.documents.len());
    for doc in &outcome.documents {
        let dialect = doc
            .dialect
            .map_or_else(|| "unreadable".to_string(), |d| d.to_string());
        println!("    {:<14} {} ({} records)", dialect, doc.path.display(), doc.entities);
    }
    println!();
    println!("  Capabilities:   {}", kb.capabilities.len());
    for (name, capability) in &kb.capabilities {
        println!("    {name}: {}", capability.capabilities.join(", "));
    }
    println!("  Workflows:      {}", kb.workflows.len());
    println!("  Triggers:       {}", kb.triggers.len());
    println!("  Quality checks: {}", kb.quality_checks.len());
    println!("  Recoveries:     {}", kb.recoveries.len());
    println!("  Command routes: {}", kb.command_routes.len());
    println!(
        "  Economics:      {}",
        if kb.economics.is_empty() { "unset" } else { "set" }
    );
    println!("  Fingerprint:    {}", kb.fingerprint()?);

    if !outcome.errors.is_empty() {
        println!();
        println!("  Problems ({}):", outcome.errors.len());
        for error in &outcome.errors {
            println!("    {error}");
        }
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        spinner.set_message("Detecting...");
        Ok(Self { spinner })
    }
}

impl DetectProgress for CliProgress {
    fn document_done(&self, summary: &DocumentSummary, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Merged [{current}/{total}] {}", summary.path.display()));
    }

    fn done(&self, outcome: &DetectionOutcome) {
        self.spinner.finish_and_clear();
        info!(
            documents = outcome.documents.len(),
            entities = outcome.knowledge.entity_count(),
            errors = outcome.errors.len(),
            "detection finished"
        );
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_detect_flags() {
        let cli = Cli::try_parse_from(["kbforge", "-vv", "detect", "docs", "-c", "2", "--format", "json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Detect {
                root,
                concurrency,
                format,
            } => {
                assert_eq!(root, PathBuf::from("docs"));
                assert_eq!(concurrency, Some(2));
                assert_eq!(format, OutputFormat::Json);
            }
            Command::Config { .. } => panic!("expected detect"),
        }
    }

    #[test]
    fn flag_overrides_configured_concurrency() {
        let config = AppConfig::default();
        assert_eq!(detect_options(&config, None).concurrency, config.detect.concurrency as usize);
        assert_eq!(detect_options(&config, Some(0)).concurrency, 1);
        assert_eq!(detect_options(&config, Some(16)).concurrency, 16);
    }
}
