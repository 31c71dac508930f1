//! CLI error types with miette diagnostics.
//!
//! Maps `syncthing_api::Error` and `ConfigError` into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use syncthing_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the daemon at {url}")]
    #[diagnostic(
        code(stcli::connection_failed),
        help(
            "Check that Syncthing is running and its GUI address is reachable.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(stcli::tls_error),
        help(
            "The daemon's GUI certificate is self-signed by default.\n\
             Use --insecure (-k) to accept it, or set ca_cert in your profile."
        )
    )]
    TlsError { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(stcli::auth_failed),
        help("Check the API key under Actions > Settings > General in the Syncthing GUI.")
    )]
    AuthFailed { message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(stcli::no_credentials),
        help(
            "Add one with: stcli profiles init\n\
             Or set the STCLI_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Daemon returned HTTP {status}: {message}")]
    #[diagnostic(code(stcli::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response from the daemon: {message}")]
    #[diagnostic(
        code(stcli::bad_response),
        help("Run with -vv to log the request, or check the daemon version.")
    )]
    BadResponse { message: String },

    #[error("Event subscription ended unexpectedly: {0}")]
    #[diagnostic(code(stcli::watch))]
    Watch(String),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(stcli::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(stcli::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: stcli profiles init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No daemon configured")]
    #[diagnostic(
        code(stcli::no_config),
        help(
            "Create a profile with: stcli profiles init\n\
             Or pass --url and --api-key. Config file: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("{0}")]
    #[diagnostic(code(stcli::config))]
    Config(String),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(stcli::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(stcli::timeout),
        help("Increase timeout with --timeout or check daemon responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(stcli::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(stcli::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── syncthing_api::Error → CliError mapping ─────────────────────────

impl From<syncthing_api::Error> for CliError {
    fn from(err: syncthing_api::Error) -> Self {
        use syncthing_api::Error as ApiErr;

        if err.is_unauthorized() {
            return Self::AuthFailed {
                message: err
                    .message()
                    .unwrap_or_else(|| "API key rejected".into()),
            };
        }

        match err {
            ApiErr::Transport(e) if e.is_timeout() => Self::Timeout { seconds: 0 },
            ApiErr::Transport(e) => Self::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string),
                source: Box::new(e),
            },
            ApiErr::InvalidUrl(e) => Self::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
            ApiErr::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            ApiErr::Tls(message) => Self::TlsError { message },
            ApiErr::InvalidApiKey => Self::Validation {
                field: "api_key".into(),
                reason: "not a valid HTTP header value".into(),
            },
            api @ ApiErr::Api { .. } => {
                let status = api.status().map_or(0, |s| s.as_u16());
                let message = api.message().unwrap_or_else(|| "no message".into());
                Self::ApiError { status, message }
            }
            ApiErr::Deserialization { message, .. } => Self::BadResponse { message },
            ApiErr::WatchTask(message) => Self::Watch(message),
        }
    }
}

// ── ConfigError → CliError mapping ──────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::ProfileNotFound { name } => Self::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_family() {
        let auth = CliError::NoCredentials {
            profile: "default".into(),
        };
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let usage = CliError::Validation {
            field: "url".into(),
            reason: "bad".into(),
        };
        assert_eq!(usage.exit_code(), exit_code::USAGE);

        assert_eq!(CliError::Timeout { seconds: 30 }.exit_code(), exit_code::TIMEOUT);
        assert_eq!(CliError::Watch("boom".into()).exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn api_timeout_maps_to_timeout() {
        let err: CliError = syncthing_api::Error::Timeout { timeout_secs: 75 }.into();
        assert!(matches!(err, CliError::Timeout { seconds: 75 }));
    }

    #[test]
    fn config_validation_keeps_field() {
        let err: CliError = ConfigError::Validation {
            field: "url".into(),
            reason: "expected http or https".into(),
        }
        .into();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "url"));
    }
}
