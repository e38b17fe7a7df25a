//! CLI entry point - the composition root.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use openclaw_cli::{Cli, CliError, Commands, handlers};

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Run(args) => handlers::run::execute(&args).await,
        Commands::Paths(launch) => handlers::paths::execute(&launch),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before parsing so `env` arguments see them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(err) = dispatch(cli).await {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            eprintln!("Error: {cli_err}");
            std::process::exit(cli_err.exit_code());
        }
        return Err(err);
    }

    Ok(())
}
