//! Recent daemon log lines.

use syncthing_api::SyncthingClient;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::errors::{EntryRow, entry_line};

pub async fn handle(
    client: &SyncthingClient,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let log = client.system().log().await?;
    let out = output::render_list(format, &log.messages, |e| EntryRow::from(e), entry_line)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
