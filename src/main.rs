//! dbtlist CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

use output::OutputFormat;

#[derive(Parser)]
#[command(name = "dbtlist")]
#[command(about = "List dbt manifest nodes selected by state, tag, type or name", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $DBTLIST_CONFIG, then ./dbtlist.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the nodes of a manifest matching a selector
    List {
        /// Selector, e.g. 'state:modified+', 'tag:nightly', 'resource_type:model'
        #[arg(short, long)]
        select: Option<String>,

        /// Selector for nodes to leave out
        #[arg(long)]
        exclude: Option<String>,

        /// Comma-separated package names to keep
        #[arg(long)]
        packages: Option<String>,

        /// Baseline manifest for state selectors
        #[arg(long, value_name = "OLD_MANIFEST")]
        state: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Manifest to select from
        manifest: PathBuf,
    },
    /// Show nodes added, removed and modified between two manifests
    Diff {
        old_manifest: PathBuf,
        new_manifest: PathBuf,

        /// Print the diff as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show version
    Version,
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the selection.
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "dbtlist={log_level},dbtlist_core={log_level}"
                ))
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::List {
            select,
            exclude,
            packages,
            state,
            output,
            manifest,
        } => {
            let args = commands::ListArgs {
                select: select.or(config.defaults.select),
                exclude: exclude.or(config.defaults.exclude),
                packages: match packages {
                    Some(list) => config::split_packages(&list),
                    None => config.defaults.packages,
                },
                state,
                output: output.or(config.defaults.output).unwrap_or_default(),
                manifest,
            };
            commands::list(args, &mut std::io::stdout().lock())
        }
        Commands::Diff {
            old_manifest,
            new_manifest,
            json,
        } => commands::diff(&old_manifest, &new_manifest, json, &mut std::io::stdout().lock()),
        Commands::Version => {
            println!("dbtlist v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
