//! Daemon configuration command handlers.

use tabled::Tabled;

use syncthing_api::SyncthingClient;
use syncthing_api::types::{Config, ConfigInSync, DeviceConfiguration, FolderConfiguration};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct FolderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Type")]
    ftype: String,
    #[tabled(rename = "Devices")]
    devices: usize,
    #[tabled(rename = "Paused")]
    paused: String,
}

impl From<&FolderConfiguration> for FolderRow {
    fn from(f: &FolderConfiguration) -> Self {
        Self {
            id: f.id.clone(),
            label: util::or_dash(&f.label),
            path: f.path.clone(),
            ftype: util::or_dash(&f.folder_type),
            devices: f.devices.len(),
            paused: if f.paused { "yes" } else { "" }.into(),
        }
    }
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Device ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Addresses")]
    addresses: String,
    #[tabled(rename = "Introducer")]
    introducer: String,
    #[tabled(rename = "Paused")]
    paused: String,
}

impl From<&DeviceConfiguration> for DeviceRow {
    fn from(d: &DeviceConfiguration) -> Self {
        Self {
            id: d.device_id.clone(),
            name: util::or_dash(&d.name),
            addresses: d.addresses.join("\n"),
            introducer: if d.introducer { "yes" } else { "" }.into(),
            paused: if d.paused { "yes" } else { "" }.into(),
        }
    }
}

fn config_detail(cfg: &Config) -> String {
    let folders: Vec<FolderRow> = cfg.folders.iter().map(FolderRow::from).collect();
    let devices: Vec<DeviceRow> = cfg.devices.iter().map(DeviceRow::from).collect();
    format!(
        "Config version {}\n\nFolders\n{}\n\nDevices\n{}",
        cfg.version,
        output::render_table(&folders),
        output::render_table(&devices),
    )
}

pub async fn handle(
    client: &SyncthingClient,
    args: ConfigArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = client.system().config().await?;
            let out = output::render_single(format, &cfg, config_detail, |c| {
                c.folders
                    .iter()
                    .map(|f| f.id.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::InSync => {
            let in_sync = ConfigInSync {
                config_in_sync: client.system().is_config_in_sync().await?,
            };
            let out = output::render_single(
                format,
                &in_sync,
                |s| {
                    if s.config_in_sync {
                        "Configuration is in sync".into()
                    } else {
                        "Configuration changed; restart required".into()
                    }
                },
                |s| s.config_in_sync.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(
                &syncthing_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }
    }
}
