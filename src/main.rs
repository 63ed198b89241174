//! # tagxref CLI
//!
//! The `tagxref` binary turns a GNU Global sqlite tag database and the source
//! tree it indexes into a hyperlinked LaTeX cross-reference document.
//!
//! ## Usage
//!
//! ```bash
//! tagxref --config ./tagxref.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tagxref render` | Annotate every source file and write the document |
//! | `tagxref lookup <symbol>` | Show where a symbol is declared and used |
//! | `tagxref stats` | Summarize the tag database |
//!
//! ## Examples
//!
//! ```bash
//! # Index the tree first
//! gtags --sqlite3
//!
//! # Render with defaults (./GTAGS etc. in the current directory)
//! tagxref render
//!
//! # Render without definition → usage links
//! tagxref render --no-reverse-links --output build/xref.tex
//!
//! # Inspect one symbol as JSON
//! tagxref lookup main --json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use tagxref::progress::ProgressMode;
use tagxref::{config, lookup, pipeline, stats};

/// tagxref: hyperlinked LaTeX cross-references from GNU Global tag databases.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means "use the defaults".
#[derive(Parser)]
#[command(
    name = "tagxref",
    about = "Render a GNU Global tag database into a hyperlinked LaTeX cross-reference",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./tagxref.toml")]
    config: PathBuf,

    /// Log level for diagnostics on stderr. `RUST_LOG` takes precedence.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Progress reporting on stderr. Defaults to `human` on a terminal.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Annotate the source tree and write the cross-reference document.
    ///
    /// Reads the path, definition and reference stores, links every usage to
    /// its definition and every definition back to its usages, then writes
    /// one LaTeX file. Nothing is written if any consistency check fails.
    Render {
        /// Output path. Overrides `[output] path`.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Do not link definitions back to their usages.
        #[arg(long)]
        no_reverse_links: bool,
    },

    /// Show where a symbol is declared and used.
    Lookup {
        /// Symbol name, exactly as indexed.
        symbol: String,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Summarize what the tag database contains.
    Stats,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let cfg = config::load_config(&cli.config)?;
    let progress = cli.progress.unwrap_or_else(ProgressMode::default_for_tty);

    match cli.command {
        Commands::Render {
            output,
            no_reverse_links,
        } => {
            let reverse_links = if no_reverse_links { Some(false) } else { None };
            pipeline::run_render(&cfg, output, reverse_links, progress).await?;
        }
        Commands::Lookup { symbol, json } => {
            lookup::run_lookup(&cfg, &symbol, json).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
