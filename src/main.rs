//! logrows - Entry Point

use clap::Parser;
use logrows::model::{AppError, DedupStrategy, SortOrder};
use logrows::view::{ColorConfig, RowStyles};
use std::path::PathBuf;
use tracing::info;

/// Terminal log viewer with deduplication, sorting and a selection popover
#[derive(Parser, Debug)]
#[command(name = "logrows")]
#[command(version)]
#[command(about = "Virtualized terminal viewer for plain-text and JSON log lines")]
pub struct Args {
    /// Path to log file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Wrap long messages
    #[arg(short, long)]
    pub wrap: bool,

    /// Collapse consecutive duplicates: none, exact, numbers, signature
    #[arg(short, long)]
    pub dedup: Option<DedupStrategy>,

    /// Sort rows by timestamp: ascending, descending
    #[arg(short, long)]
    pub sort: Option<SortOrder>,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = logrows::config::load_config_with_precedence(args.config.clone())?;
        let merged = logrows::config::merge_config(config_file);
        let with_env = logrows::config::apply_env_overrides(merged);
        let wrap_override = args.wrap.then_some(true);
        logrows::config::apply_cli_overrides(with_env, wrap_override, args.dedup, args.sort)
    };

    logrows::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let input_source = logrows::source::detect_input_source(args.file.clone())?;
    let styles = RowStyles::with_color_config(ColorConfig::from_env_and_args(args.no_color));

    logrows::view::run_with_source(input_source, &config, styles)?;

    Ok(())
}
