//! Error list command handlers.

use tabled::Tabled;

use syncthing_api::SyncthingClient;
use syncthing_api::types::LogEntry;

use crate::cli::{ErrorsArgs, ErrorsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
pub(super) struct EntryRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&LogEntry> for EntryRow {
    fn from(e: &LogEntry) -> Self {
        Self {
            when: e.when.format("%Y-%m-%d %H:%M:%S").to_string(),
            message: e.message.clone(),
        }
    }
}

pub(super) fn entry_line(e: &LogEntry) -> String {
    format!("{} {}", e.when.to_rfc3339(), e.message)
}

pub async fn handle(
    client: &SyncthingClient,
    args: ErrorsArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let system = client.system();

    match args.command {
        ErrorsCommand::List => {
            let list = system.errors().await?;
            let out = output::render_list(format, &list.errors, |e| EntryRow::from(e), entry_line)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ErrorsCommand::Add { message } => {
            system.add_error(&message).await?;
            if !global.quiet {
                eprintln!("Error added");
            }
            Ok(())
        }

        ErrorsCommand::Clear => {
            if !util::confirm("Clear the daemon's error list?", "errors clear", global.yes)? {
                return Ok(());
            }
            system.clear_errors().await?;
            if !global.quiet {
                eprintln!("Errors cleared");
            }
            Ok(())
        }
    }
}
