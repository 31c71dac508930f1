//! Shared helpers for command handlers.

use dialoguer::Confirm;
use syncthing_api::EventType;
use tracing::warn;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal the prompt cannot be shown, so the action is refused
/// with a hint to pass `--yes`.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|_| CliError::NonInteractiveRequiresYes {
            action: action.into(),
        })
}

/// Map a dialoguer / interactive I/O failure into `CliError`.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Parse `--type` values into event types.
///
/// Names this build does not know are still sent to the daemon.
pub fn parse_event_types(names: &[String]) -> Vec<EventType> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| {
            let ty = EventType::from_name(name);
            if matches!(ty, EventType::Other(_)) {
                warn!(event_type = name, "unknown event type, passing through");
            }
            ty
        })
        .collect()
}

/// `-` for empty strings in table cells.
pub fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".into()
    } else {
        value.to_owned()
    }
}
