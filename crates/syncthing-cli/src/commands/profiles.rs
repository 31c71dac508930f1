//! Profile management: list, init, use.
//!
//! Works on the local config file only; no daemon connection.

use dialoguer::{Input, Password};
use serde::Serialize;
use tabled::Tabled;

use syncthing_config::{self as config, Config, Profile};

use crate::cli::{GlobalOpts, OutputFormat, ProfilesArgs, ProfilesCommand};
use crate::config::profile_not_found;
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const DEFAULT_DAEMON_URL: &str = "http://127.0.0.1:8384";

/// What `profiles list` shows. Never carries the key itself.
#[derive(Debug, Serialize)]
struct ProfileSummary {
    name: String,
    url: String,
    api_key_source: &'static str,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "API key")]
    key: &'static str,
}

impl From<&ProfileSummary> for ProfileRow {
    fn from(p: &ProfileSummary) -> Self {
        Self {
            marker: if p.default { "*" } else { "" },
            name: p.name.clone(),
            url: p.url.clone(),
            key: p.api_key_source,
        }
    }
}

fn key_source(profile: &Profile) -> &'static str {
    if profile.api_key_env.is_some() {
        "env"
    } else if profile.api_key.is_some() {
        "config"
    } else {
        "none"
    }
}

fn summaries(cfg: &Config) -> Vec<ProfileSummary> {
    let default = cfg.default_profile_name();
    let mut list: Vec<ProfileSummary> = cfg
        .profiles
        .iter()
        .map(|(name, p)| ProfileSummary {
            name: name.clone(),
            url: p.url.clone(),
            api_key_source: key_source(p),
            default: name == default,
        })
        .collect();
    list.sort_by(|a, b| a.name.cmp(&b.name));
    list
}

pub fn handle(
    args: ProfilesArgs,
    mut cfg: Config,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        ProfilesCommand::List => {
            let list = summaries(&cfg);
            let out = output::render_list(
                format,
                &list,
                |p| ProfileRow::from(p),
                |p| p.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfilesCommand::Init {
            name,
            daemon_url,
            api_key_env,
        } => {
            let name = match name {
                Some(n) => n,
                None => Input::new()
                    .with_prompt("Profile name")
                    .default("default".to_owned())
                    .interact_text()
                    .map_err(prompt_err)?,
            };

            let url = match daemon_url {
                Some(u) => u,
                None => Input::new()
                    .with_prompt("Daemon URL")
                    .default(DEFAULT_DAEMON_URL.to_owned())
                    .interact_text()
                    .map_err(prompt_err)?,
            };
            config::validate_url(&url)?;

            // Env var name, else --api-key, else prompt
            let api_key = if api_key_env.is_some() {
                None
            } else if let Some(ref key) = global.api_key {
                Some(key.clone())
            } else {
                let key = Password::new()
                    .with_prompt("API key")
                    .interact()
                    .map_err(prompt_err)?;
                Some(key)
            };
            if api_key.as_deref().is_some_and(str::is_empty) {
                return Err(CliError::Validation {
                    field: "api_key".into(),
                    reason: "API key cannot be empty".into(),
                });
            }

            let profile = Profile {
                url,
                api_key,
                api_key_env,
                insecure: global.insecure.then_some(true),
                timeout: global.timeout,
                ..Profile::default()
            };

            // First profile, or one replacing a dangling default, becomes the default
            if !cfg.profiles.contains_key(cfg.default_profile_name()) {
                cfg.default_profile = Some(name.clone());
            }
            cfg.profiles.insert(name.clone(), profile);
            config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!(
                    "Profile '{name}' saved to {}",
                    config::config_path().display()
                );
            }
            Ok(())
        }

        ProfilesCommand::Use { name } => {
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}
