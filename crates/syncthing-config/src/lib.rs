//! Shared configuration for stcli.
//!
//! TOML profiles, credential resolution (env + plaintext), and translation
//! to `syncthing_api::ClientConfig`. The CLI layers its flag overrides on
//! top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use syncthing_api::{ClientConfig, TlsMode, TransportConfig};

/// Fallback environment variable holding the API key.
pub const API_KEY_ENV: &str = "STCLI_API_KEY";

/// Prefix for environment overrides of config file keys.
pub const ENV_PREFIX: &str = "STCLI_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named daemon profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is requested explicitly.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// Look up a profile, falling back to the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name.unwrap_or_else(|| self.default_profile_name());
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    /// Seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named daemon profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Daemon GUI address (e.g., "http://127.0.0.1:8384").
    pub url: String,

    /// API key (plaintext; prefer an env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// PEM file to trust for an `https://` daemon, e.g. its `https-cert.pem`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override the global insecure TLS setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override the global timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "stcli", "stcli").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("stcli");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path, still layering `STCLI_*` env vars on top.
///
/// A missing file is not an error; defaults apply. Nested keys use a
/// double underscore: `STCLI_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve an API key from the credential chain (no CLI flag step).
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    // 3. Global env var
    if let Ok(val) = std::env::var(API_KEY_ENV) {
        return Ok(SecretString::from(val));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Parse and check a daemon URL.
pub fn validate_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected http or https, got '{other}'"),
        }),
    }
}

/// TLS mode for a profile: explicit insecure wins, then a pinned CA, then system roots.
pub fn resolve_tls(profile: &Profile, defaults: &Defaults) -> TlsMode {
    if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    }
}

/// Build a `ClientConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let url = validate_url(&profile.url)?;
    let api_key = resolve_api_key(profile, profile_name)?;
    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(ClientConfig {
        url,
        api_key,
        transport: TransportConfig {
            tls: resolve_tls(profile, defaults),
            timeout,
            ..TransportConfig::default()
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn profile(url: &str) -> Profile {
        Profile {
            url: url.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let cfg = load_config_from(&jail.directory().join("absent.toml")).unwrap();
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn file_profiles_are_loaded() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    default_profile = "nas"

                    [defaults]
                    output = "json"

                    [profiles.nas]
                    url = "https://nas.local:8384"
                    api_key_env = "NAS_SYNCTHING_KEY"
                    insecure = true
                "#,
            )?;
            let cfg = load_config_from(&jail.directory().join("config.toml")).unwrap();

            assert_eq!(cfg.defaults.output, "json");
            assert_eq!(cfg.defaults.timeout, 30);
            let (name, nas) = cfg.profile(None).unwrap();
            assert_eq!(name, "nas");
            assert_eq!(nas.url, "https://nas.local:8384");
            assert_eq!(nas.insecure, Some(true));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[defaults]\noutput = \"yaml\"\n")?;
            jail.set_env("STCLI_DEFAULTS__OUTPUT", "plain");
            jail.set_env("STCLI_DEFAULT_PROFILE", "laptop");

            let cfg = load_config_from(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(cfg.defaults.output, "plain");
            assert_eq!(cfg.default_profile_name(), "laptop");
            Ok(())
        });
    }

    #[test]
    fn unknown_profile_is_reported() {
        let cfg = Config::default();
        let err = cfg.profile(Some("missing")).unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound { name } if name == "missing"));
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), profile("http://127.0.0.1:8384"));
        save_config_to(&cfg, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[profiles.default]"));
        assert!(!written.contains("api_key"));

        let loaded: Config = toml::from_str(&written).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn api_key_env_wins_over_plaintext() {
        Jail::expect_with(|jail| {
            jail.set_env("MY_ST_KEY", "from-env");
            let p = Profile {
                api_key: Some("from-file".into()),
                api_key_env: Some("MY_ST_KEY".into()),
                ..profile("http://127.0.0.1:8384")
            };
            let key = resolve_api_key(&p, "default").unwrap();
            assert_eq!(key.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn plaintext_wins_over_global_env() {
        Jail::expect_with(|jail| {
            jail.set_env(API_KEY_ENV, "global");
            let p = Profile {
                api_key: Some("from-file".into()),
                api_key_env: Some("STCLI_TEST_UNSET_VAR".into()),
                ..profile("http://127.0.0.1:8384")
            };
            let key = resolve_api_key(&p, "default").unwrap();
            assert_eq!(key.expose_secret(), "from-file");
            Ok(())
        });
    }

    #[test]
    fn global_env_is_last_resort() {
        Jail::expect_with(|jail| {
            jail.set_env(API_KEY_ENV, "global");
            let key = resolve_api_key(&profile("http://127.0.0.1:8384"), "default").unwrap();
            assert_eq!(key.expose_secret(), "global");
            Ok(())
        });
    }

    #[test]
    fn rejects_non_http_url() {
        let err = validate_url("ftp://nas.local").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "url"));
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn tls_resolution_order() {
        let defaults = Defaults::default();
        let mut p = profile("https://nas.local:8384");
        assert_eq!(resolve_tls(&p, &defaults), TlsMode::System);

        p.ca_cert = Some(PathBuf::from("/etc/syncthing/https-cert.pem"));
        assert_eq!(
            resolve_tls(&p, &defaults),
            TlsMode::CustomCa(PathBuf::from("/etc/syncthing/https-cert.pem"))
        );

        let insecure_defaults = Defaults {
            insecure: true,
            ..Defaults::default()
        };
        assert_eq!(resolve_tls(&p, &insecure_defaults), TlsMode::DangerAcceptInvalid);

        p.insecure = Some(false);
        assert!(matches!(resolve_tls(&p, &insecure_defaults), TlsMode::CustomCa(_)));
    }

    #[test]
    fn profile_resolves_to_client_config() {
        let p = Profile {
            api_key: Some("abc123".into()),
            timeout: Some(5),
            ..profile("http://127.0.0.1:8384")
        };
        let cfg = profile_to_client_config(&p, "default", &Defaults::default()).unwrap();

        assert_eq!(cfg.url.as_str(), "http://127.0.0.1:8384/");
        assert_eq!(cfg.api_key.expose_secret(), "abc123");
        assert_eq!(cfg.transport.timeout, Duration::from_secs(5));
        assert_eq!(cfg.transport.tls, TlsMode::System);
    }
}
