use anyhow::Context;
use clap::Parser;
use rt_config::ResearchConfig;

mod cli;
mod commands;
mod output;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("rtools error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(&cli.command, cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    let config = ResearchConfig::load_with_dotenv(flags.config.as_deref())
        .context("failed to load ResearchTools configuration")?;

    commands::dispatch::dispatch(cli.command, config, &flags).await
}

/// `RESEARCHTOOLS_LOG` wins over the flags. `serve` logs at info by default.
fn init_tracing(command: &cli::Commands, quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else if matches!(command, cli::Commands::Serve(_)) {
        "info"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("RESEARCHTOOLS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
