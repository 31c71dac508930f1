//! Command dispatch: bridges CLI args -> API calls -> output formatting.

pub mod config_cmd;
pub mod errors;
pub mod events;
pub mod log;
pub mod profiles;
pub mod system;
pub mod util;

use syncthing_api::SyncthingClient;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Dispatch a daemon-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &SyncthingClient,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match cmd {
        Command::System(args) => system::handle(client, args, global, format).await,
        Command::Config(args) => config_cmd::handle(client, args, global, format).await,
        Command::Errors(args) => errors::handle(client, args, global, format).await,
        Command::Log => log::handle(client, global, format).await,
        Command::Events(args) => events::handle(client, args, global, format).await,
        // Profiles and Completions are handled before dispatch
        Command::Profiles(_) | Command::Completions(_) => Err(CliError::Config(
            "local command reached daemon dispatch".into(),
        )),
    }
}
