mod cmd;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cmd::{pick::PickArgs, serve::ServeArgs};
use rmf_core::config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "release-manager-finder",
    about = "Find the next release manager among the maintainers attending the VMA",
    version,
    propagate_version = true
)]
struct Cli {
    /// YAML config file (default: built-in RIOT-OS settings)
    #[arg(long, global = true, env = "RMF_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick the next release manager and print how it was decided
    Pick(PickArgs),

    /// Run the web form with GitHub login
    Serve(ServeArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve(_) => tracing::Level::INFO,
        Commands::Pick(_) => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = Config::load(cli.config.as_deref())
        .context("loading config")
        .and_then(|config| match cli.command {
            Commands::Pick(args) => cmd::pick::run(&config, args, cli.json),
            Commands::Serve(args) => cmd::serve::run(config, args),
        });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
