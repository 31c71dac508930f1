//! Event command handlers.

use std::time::Duration;

use tabled::Tabled;
use tracing::warn;

use syncthing_api::{BackoffConfig, Event, EventQuery, SyncthingClient, WatchOptions};

use crate::cli::{EventsArgs, EventsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Type")]
    etype: String,
    #[tabled(rename = "Data")]
    data: String,
}

impl From<&Event> for EventRow {
    fn from(e: &Event) -> Self {
        Self {
            id: e.id,
            time: e.time.format("%H:%M:%S").to_string(),
            etype: e.event_type.to_string(),
            data: e.data.to_string(),
        }
    }
}

fn event_line(e: &Event) -> String {
    format!("{} {} {} {}", e.time.to_rfc3339(), e.id, e.event_type, e.data)
}

/// One event as a self-contained chunk of streaming output.
fn render_streamed(format: OutputFormat, event: &Event) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Json | OutputFormat::JsonCompact => serde_json::to_string(event)?,
        OutputFormat::Yaml => format!("---\n{}", serde_yaml::to_string(event)?.trim_end()),
        OutputFormat::Table | OutputFormat::Plain => event_line(event),
    })
}

pub async fn handle(
    client: &SyncthingClient,
    args: EventsArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        EventsCommand::List {
            types,
            since,
            limit,
        } => {
            let query = EventQuery {
                events: util::parse_event_types(&types),
                since,
                limit,
                timeout: Some(Duration::ZERO),
            };
            let events = client.events().fetch(&query).await?;
            let out = output::render_list(format, &events, |e| EventRow::from(e), event_line)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EventsCommand::Watch { types, retry } => {
            let options = if retry {
                WatchOptions::retry(BackoffConfig::default())
            } else {
                WatchOptions::default()
            };

            let quiet = global.quiet;
            let subscription = client
                .watch_with(util::parse_event_types(&types), options, move |event| {
                    match render_streamed(format, &event) {
                        Ok(line) => output::print_output(&line, quiet),
                        Err(e) => warn!(id = event.id, error = %e, "failed to render event"),
                    }
                    std::future::ready(())
                })
                .await?;

            if !quiet {
                eprintln!(
                    "Watching events after id {} (Ctrl-C to stop)",
                    subscription.initial_cursor()
                );
            }

            let cancel = subscription.cancel_token();
            tokio::select! {
                result = subscription.closed() => result.map_err(CliError::from),
                _ = tokio::signal::ctrl_c() => {
                    cancel.cancel();
                    Ok(())
                }
            }
        }
    }
}
