//! # releaser CLI Entry Point
//!
//! Parses arguments, installs logging, and dispatches to subcommands.

use clap::Parser;

/// Releaser, a caching mirror and install-script server for GitHub
/// releases.
#[derive(Parser, Debug)]
#[command(name = "releaser", version, about)]
struct Cli {
    /// Log filter directive, overridden by `RUST_LOG`.
    #[arg(long, global = true, env = "RELEASER_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "RELEASER_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Mirror releases and serve them over HTTP.
    Run(releaser_cli::run::RunArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    releaser_cli::logging::init(&cli.log_level, cli.log_json)?;

    match cli.command {
        Commands::Run(args) => releaser_cli::run::run(args).await,
    }
}
