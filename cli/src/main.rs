mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ryu_core::RestClient;

use crate::cli::Cli;
use crate::error::CliError;

fn main() {
    let (debug, args) = cli::strip_debug_arg(std::env::args().collect());
    let cli = Cli::parse_from(args);

    if let Err(err) = run(cli, debug) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, debug: bool) {
    let filter = match verbosity {
        // debug mode echoes requests even when everything else is quiet
        0 if debug => "warn,ryu_core::echo=info",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli, debug: bool) -> Result<(), CliError> {
    let config = config::resolve(&cli.global, debug)?;
    init_tracing(cli.global.verbose, config.debug);
    tracing::debug!(endpoint = %config.endpoint, debug = config.debug, "resolved configuration");

    let client = RestClient::new(config);
    tracing::debug!(command = ?cli.command, "dispatching command");
    commands::dispatch(cli.command, &client, &mut std::io::stdout().lock())
}
