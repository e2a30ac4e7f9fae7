use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use covtree::cli::{self, Format};
use covtree::render::RenderOptions;

/// covtree — Navigable HTML coverage reports that mirror the source tree.
#[derive(Parser)]
#[command(name = "covtree", version, about)]
struct Cli {
    /// Pre-parsed coverage profile (JSON list of files and blocks).
    #[arg(short, long, global = true, default_value = "cover.json")]
    input: PathBuf,

    /// Path prefix of the project root; files outside it are left out.
    #[arg(long, global = true, default_value = ".")]
    root: String,

    /// Cutlines as "safe,warning" percentages.
    #[arg(long, global = true, default_value = "70,40")]
    cutlines: String,

    /// Comma-separated path fragments to leave out of the report.
    #[arg(long, global = true, default_value = "")]
    ignores: String,

    /// Directory source files are read from.
    #[arg(long, global = true, default_value = ".")]
    source_dir: PathBuf,

    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the full report to stdout.
    Report {
        /// Output format.
        #[arg(long, value_enum, default_value = "html")]
        format: Format,

        /// Page title for HTML output.
        #[arg(long, default_value = "Coverage Report")]
        title: String,
    },

    /// Print per-directory and per-file coverage as a table.
    Summary,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli::load_config(&cli.root, &cli.cutlines, &cli.ignores)?;
    let report = cli::build_report(&cli.input, &config, &cli.source_dir)?;

    match cli.command {
        Commands::Report { format, title } => {
            let options = RenderOptions {
                title,
                generated_at: Some(chrono::Utc::now()),
            };
            let stdout = std::io::stdout();
            let mut out = std::io::BufWriter::new(stdout.lock());
            cli::cmd_report(&report, &format, &options, &mut out)?;
        }
        Commands::Summary => {
            let mut out = std::io::stdout().lock();
            out.write_all(cli::cmd_summary(&report).as_bytes())?;
        }
    }
    Ok(())
}
