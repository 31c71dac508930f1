mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use syncthing_api::SyncthingClient;

use crate::cli::{Cli, Command, ConfigCommand};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Commands that must work even when the config file is broken
    match &cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "stcli", &mut std::io::stdout());
            return Ok(());
        }
        Command::Config(args) if matches!(args.command, ConfigCommand::Path) => {
            output::print_output(
                &syncthing_config::config_path().display().to_string(),
                cli.global.quiet,
            );
            return Ok(());
        }
        _ => {}
    }

    let cfg = syncthing_config::load_config()?;
    let format = config::resolve_output_format(&cli.global, &cfg);

    match cli.command {
        // Local commands don't need a daemon connection
        Command::Profiles(args) => commands::profiles::handle(args, cfg, &cli.global, format),

        cmd => {
            let client_config = config::build_client_config(&cli.global, &cfg)?;
            let client = SyncthingClient::new(&client_config)?;

            tracing::debug!(command = ?cmd, url = %client.base_url(), "dispatching command");
            commands::dispatch(cmd, &client, &cli.global, format).await
        }
    }
}
