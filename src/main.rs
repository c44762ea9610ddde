//! # Hiscores CLI (`hiscores`)
//!
//! Fetches a player's hiscores, keeps a per-player history, and summarizes
//! or exports it.
//!
//! ## Usage
//!
//! ```bash
//! hiscores --config ./hiscores.toml [--player NAME] [--update] [--no-plot] [command]
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | *(none)* / `hiscores run` | Update if requested, then print the summary |
//! | `hiscores init` | Write a default config file |
//! | `hiscores config` | Print the config and the resolved options |
//! | `hiscores update` | Fetch and store a new snapshot only |
//! | `hiscores summary` | Print the summary of the stored history |
//! | `hiscores export` | Write one partitioned view as JSON or CSV |
//!
//! ## Examples
//!
//! ```bash
//! # First run generates ./hiscores.toml; edit it and run again
//! hiscores
//!
//! # Fetch today's stats without printing anything else
//! hiscores --player "Lynx Titan" --no-plot
//!
//! # Chart-ready kill count totals
//! hiscores export --view totals --format csv --output totals.csv
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hiscores_tracker::config::{self, Overrides};
use hiscores_tracker::export::{self, Format, View};
use hiscores_tracker::{summary, track, update};

/// Track an Old School RuneScape player's hiscores over time.
#[derive(Parser)]
#[command(
    name = "hiscores",
    about = "Track an Old School RuneScape player's hiscores over time",
    version,
    long_about = "Fetches a player's personal hiscores page, stores a snapshot in a per-player \
    CSV history whenever the stats changed, and summarizes skill progression and boss kill counts."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Generated with default settings if it does not exist.
    #[arg(long, global = true, default_value = "./hiscores.toml")]
    config: PathBuf,

    /// Player whose stats are fetched (overrides `player.name`).
    #[arg(long, global = true)]
    player: Option<String>,

    /// Fetch stats from the hiscores before doing anything else.
    #[arg(long, global = true)]
    update: bool,

    /// Only update the stats; do not print the summary. Implies --update.
    #[arg(long, global = true)]
    no_plot: bool,

    /// Answer yes to every confirmation prompt.
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    /// Read a saved hiscores page instead of fetching it.
    #[arg(long, global = true, value_name = "PATH")]
    from_html: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Update if requested, then print the summary (the default).
    Run,

    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration and the resolved options.
    Config,

    /// Fetch the player's stats and append them if they changed.
    Update,

    /// Print a summary of the stored history.
    Summary,

    /// Export one partitioned view of the stored history.
    Export {
        /// Which view to export.
        #[arg(long, value_enum)]
        view: View,

        /// Output format.
        #[arg(long, value_enum, default_value = "json")]
        format: Format,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Init { force }) = &cli.command {
        config::generate_config(&cli.config, *force)?;
        println!("Config file '{}' created.", cli.config.display());
        return Ok(());
    }

    if !cli.config.exists() {
        println!("Config file does not exist.");
        println!("Generating file using default parameters.");
        config::generate_config(&cli.config, false)?;
        println!(
            "Config file '{}' generated - please edit and re-run.",
            cli.config.display()
        );
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;
    let options = cfg.resolve(&Overrides {
        player: cli.player.clone(),
        update: cli.update,
        no_plot: cli.no_plot,
    })?;
    let from_html = cli.from_html.as_deref();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            track::run(&cfg, &options, from_html, cli.yes)?;
        }
        Commands::Init { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
        Commands::Config => {
            config::print_config(&cfg, &options);
        }
        Commands::Update => {
            update::run_update(&cfg, &options, from_html, cli.yes)?;
        }
        Commands::Summary => {
            summary::run_summary(&cfg, &options.player)?;
        }
        Commands::Export {
            view,
            format,
            output,
        } => {
            export::run_export(&cfg, &options.player, view, format, output.as_deref())?;
        }
    }

    Ok(())
}
