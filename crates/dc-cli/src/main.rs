//! data_check CLI - run SQL checks against expected results

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod context;

use cli::{Cli, Commands};
use commands::common::ExitCode;
use commands::{generate, load, ping, run, sql};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("Failed to initialise logging: {}", e);
    }
}

async fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Run(args) => run::execute(args, &cli.global).await,
        Commands::Gen(args) => generate::execute(args, &cli.global).await,
        Commands::Load(args) => load::execute(args, &cli.global).await,
        Commands::Sql(args) => sql::execute(args, &cli.global).await,
        Commands::Ping(args) => ping::execute(args, &cli.global).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    if let Err(err) = dispatch(&cli).await {
        let code = match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => *code,
            None => {
                eprintln!("Error: {:#}", err);
                1
            }
        };
        std::process::exit(code);
    }
}
