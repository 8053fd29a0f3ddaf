// Entrypoint for the CLI application.
// - Parses arguments, sets up logging and loads the configuration once.
// - Builds the client from that configuration and runs a single command.
// - Any error is printed and turned into a non-zero exit status; a rejected
//   token also clears the saved credentials.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use emailctl::cli::{Cli, Commands};
use emailctl::client::Client;
use emailctl::commands;
use emailctl::config::Config;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    match run(cli, &config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            commands::handle_error(&err, &config_path);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config_path: &Path) -> anyhow::Result<()> {
    // version must work even with a broken config file
    if let Commands::Version = cli.command {
        commands::print_version();
        return Ok(());
    }

    let config = Config::load(config_path)?;
    let client =
        Client::new(&config).context("unable to initialize Postfix REST Server API client")?;
    commands::run(cli.command, &client, config_path)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "emailctl=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
