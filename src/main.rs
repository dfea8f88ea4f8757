use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::{Level, metadata::LevelFilter};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{extract::Extract, list::List};

mod commands;

fn main() -> Result<()> {
    color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .install()?;

    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Extract(extract) => extract.run(),
        Commands::List(list) => list.run(),
    }
}

fn setup_logging(verbose: bool) {
    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_target(cfg!(debug_assertions))
                .without_time(),
        )
        .with(indicatif_layer)
        .with(
            filter::Targets::new()
                .with_default(LevelFilter::WARN)
                .with_target(
                    env!("CARGO_CRATE_NAME"),
                    if verbose { Level::TRACE } else { Level::INFO },
                ),
        )
        .init();
}

#[derive(Parser)]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
struct Cli {
    #[arg(short = 'V', long, action = clap::builder::ArgAction::Version)]
    version: (),

    /// Log how each executable is parsed
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Extract(Extract),
    List(List),
}
