//! Flag overrides on top of `syncthing_config` profiles.
//!
//! The config crate resolves what the file and environment say; this module
//! layers `--url`, `--api-key`, `--insecure`, `--timeout` and `--output` on
//! top and produces the final `ClientConfig`.

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use syncthing_api::{ClientConfig, TlsMode, TransportConfig};
use syncthing_config::{self as config, Config, Defaults, Profile};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| cfg.default_profile_name().to_owned())
}

/// `--output`, then `defaults.output` from the config file, then table.
pub fn resolve_output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&cfg.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

/// Build a `ClientConfig` from the config file, profile, and CLI overrides.
pub fn build_client_config(global: &GlobalOpts, cfg: &Config) -> Result<ClientConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg.defaults, global);
    }

    // An explicitly requested profile must exist
    if global.profile.is_some() {
        return Err(profile_not_found(&profile_name, cfg));
    }

    // No profile: flags and env vars alone
    let url_str = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config::config_path().display().to_string(),
    })?;
    let url = config::validate_url(url_str)?;

    let api_key = global
        .api_key
        .clone()
        .map(SecretString::from)
        .ok_or(CliError::NoCredentials {
            profile: profile_name,
        })?;

    let tls = if global.insecure || cfg.defaults.insecure {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };

    Ok(ClientConfig {
        url,
        api_key,
        transport: TransportConfig {
            tls,
            timeout: Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout)),
            ..TransportConfig::default()
        },
    })
}

/// Translate a profile + global flags into a `ClientConfig`.
fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ClientConfig, CliError> {
    // 1. URL (flag > env > profile)
    let url = config::validate_url(global.url.as_deref().unwrap_or(&profile.url))?;

    // 2. API key (flag > profile chain)
    let api_key = match global.api_key {
        Some(ref key) => SecretString::from(key.clone()),
        None => config::resolve_api_key(profile, profile_name)?,
    };

    // 3. TLS
    let tls = if global.insecure {
        TlsMode::DangerAcceptInvalid
    } else {
        config::resolve_tls(profile, defaults)
    };

    // 4. Timeout
    let secs = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(defaults.timeout);

    Ok(ClientConfig {
        url,
        api_key,
        transport: TransportConfig {
            tls,
            timeout: Duration::from_secs(secs),
            ..TransportConfig::default()
        },
    })
}

pub fn profile_not_found(name: &str, cfg: &Config) -> CliError {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    CliError::ProfileNotFound {
        name: name.into(),
        available: if names.is_empty() {
            "(none)".into()
        } else {
            names.join(", ")
        },
    }
}
