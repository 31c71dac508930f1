//! System command handlers.

use std::collections::HashMap;

use tabled::Tabled;

use syncthing_api::SyncthingClient;
use syncthing_api::types::{
    Connection, Connections, DebugFacilities, DiscoveryEntry, SystemStatus, UpgradeInfo,
    VersionInfo,
};

use crate::cli::{GlobalOpts, OutputFormat, SystemArgs, SystemCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ConnectionRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Connected")]
    connected: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Type")]
    ctype: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "In")]
    in_bytes: String,
    #[tabled(rename = "Out")]
    out_bytes: String,
}

impl ConnectionRow {
    fn new(device: &str, c: &Connection) -> Self {
        let connected = match (c.connected, c.paused) {
            (_, true) => "paused",
            (true, false) => "yes",
            (false, false) => "no",
        };
        Self {
            device: device.to_owned(),
            connected: connected.into(),
            address: util::or_dash(&c.address),
            ctype: util::or_dash(&c.connection_type),
            client: util::or_dash(&c.client_version),
            in_bytes: output::format_bytes(c.in_bytes_total),
            out_bytes: output::format_bytes(c.out_bytes_total),
        }
    }
}

#[derive(Tabled)]
struct DiscoveryRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Addresses")]
    addresses: String,
}

#[derive(Tabled)]
struct FacilityRow {
    #[tabled(rename = "Facility")]
    name: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct PathRow {
    #[tabled(rename = "Path")]
    path: String,
}

// ── Detail views ────────────────────────────────────────────────────

fn status_detail(s: &SystemStatus) -> String {
    let mut fields = vec![
        ("Device ID", s.my_id.clone()),
        ("Uptime", output::format_uptime(s.uptime)),
        ("Memory", output::format_bytes(s.sys)),
        ("Allocated", output::format_bytes(s.alloc)),
        ("Goroutines", s.goroutines.to_string()),
        ("CPU", format!("{:.1}%", s.cpu_percent)),
        ("GUI", util::or_dash(&s.gui_address_used)),
        (
            "Discovery",
            if s.discovery_enabled { "enabled" } else { "disabled" }.into(),
        ),
    ];
    if let Some(started) = s.start_time {
        fields.push(("Started", started.to_rfc3339()));
    }

    let mut listeners: Vec<_> = s.connection_service_status.iter().collect();
    listeners.sort_by(|a, b| a.0.cmp(b.0));
    for (addr, listener) in listeners {
        let state = listener
            .error
            .as_deref()
            .map_or_else(|| "ok".to_owned(), |e| format!("error: {e}"));
        fields.push(("Listener", format!("{addr} ({state})")));
    }

    let mut errors: Vec<_> = s.discovery_errors.iter().collect();
    errors.sort();
    for (method, err) in errors {
        fields.push(("Disco error", format!("{method}: {err}")));
    }
    output::render_fields(&fields)
}

fn version_detail(v: &VersionInfo) -> String {
    let mut fields = vec![
        ("Version", v.version.clone()),
        ("Codename", util::or_dash(&v.codename)),
        ("Platform", format!("{}-{}", v.os, v.arch)),
    ];
    if let Some(date) = v.date {
        fields.push(("Built", date.to_rfc3339()));
    }
    if !v.long_version.is_empty() {
        fields.push(("Long version", v.long_version.clone()));
    }
    output::render_fields(&fields)
}

fn upgrade_detail(u: &UpgradeInfo) -> String {
    let verdict = match (u.newer, u.major_version) {
        (false, _) => "up to date",
        (true, false) => "upgrade available",
        (true, true) => "major upgrade available",
    };
    output::render_fields(&[
        ("Running", u.running.clone()),
        ("Latest", u.latest.clone()),
        ("Status", verdict.into()),
    ])
}

fn connections_table(c: &Connections) -> String {
    let mut rows: Vec<ConnectionRow> = c
        .connections
        .iter()
        .map(|(id, conn)| ConnectionRow::new(id, conn))
        .collect();
    rows.sort_by(|a, b| a.device.cmp(&b.device));
    rows.push(ConnectionRow::new("(total)", &c.total));
    output::render_table(&rows)
}

fn discovery_table(d: &HashMap<String, DiscoveryEntry>) -> String {
    let mut rows: Vec<DiscoveryRow> = d
        .iter()
        .map(|(id, entry)| DiscoveryRow {
            device: id.clone(),
            addresses: entry.addresses.join("\n"),
        })
        .collect();
    rows.sort_by(|a, b| a.device.cmp(&b.device));
    output::render_table(&rows)
}

fn facilities_table(d: &DebugFacilities) -> String {
    let mut rows: Vec<FacilityRow> = d
        .facilities
        .iter()
        .map(|(name, description)| FacilityRow {
            name: name.clone(),
            enabled: if d.is_enabled(name) { "yes" } else { "" }.into(),
            description: description.clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    output::render_table(&rows)
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> String {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &SyncthingClient,
    args: SystemArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let system = client.system();

    match args.command {
        SystemCommand::Ping => {
            let ping = system.ping().await?;
            let out = output::render_single(format, &ping, |p| p.ping.clone(), |p| p.ping.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SystemCommand::Status => {
            let status = system.status().await?;
            let out = output::render_single(format, &status, status_detail, |s| s.my_id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SystemCommand::Version => {
            let version = system.version().await?;
            let out =
                output::render_single(format, &version, version_detail, |v| v.version.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SystemCommand::Upgrade => {
            let upgrade = system.upgrade().await?;
            let out =
                output::render_single(format, &upgrade, upgrade_detail, |u| u.latest.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SystemCommand::Connections => {
            let conns = system.connections().await?;
            let out = output::render_single(format, &conns, connections_table, |c| {
                sorted_keys(&c.connections)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SystemCommand::Discovery => {
            let disco = system.discovery().await?;
            let out = output::render_single(format, &disco, discovery_table, sorted_keys)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SystemCommand::Browse { current } => {
            let paths = system.browse(current.as_deref()).await?;
            let out = output::render_list(
                format,
                &paths,
                |p| PathRow { path: p.clone() },
                Clone::clone,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SystemCommand::Debug { enable, disable } => {
            let facilities = if enable.is_empty() && disable.is_empty() {
                system.debug().await?
            } else {
                system.set_debug(&enable, &disable).await?
            };
            let out = output::render_single(format, &facilities, facilities_table, |d| {
                d.enabled.clone().unwrap_or_default().join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SystemCommand::Restart => {
            if !util::confirm("Restart the Syncthing daemon?", "restart", global.yes)? {
                return Ok(());
            }
            system.restart().await?;
            if !global.quiet {
                eprintln!("Restart requested");
            }
            Ok(())
        }

        SystemCommand::Shutdown => {
            if !util::confirm(
                "Shut down the Syncthing daemon? It cannot be started again remotely.",
                "shutdown",
                global.yes,
            )? {
                return Ok(());
            }
            system.shutdown().await?;
            if !global.quiet {
                eprintln!("Shutdown requested");
            }
            Ok(())
        }

        SystemCommand::Reset { folder } => {
            let prompt = match folder {
                Some(ref id) => format!("Erase the index database of folder '{id}' and restart?"),
                None => "Erase the index database of ALL folders and restart?".into(),
            };
            if !util::confirm(&prompt, "reset", global.yes)? {
                return Ok(());
            }
            system.reset(folder.as_deref()).await?;
            if !global.quiet {
                eprintln!("Index reset requested");
            }
            Ok(())
        }

        SystemCommand::Pause { device } => {
            system.pause(&device).await?;
            if !global.quiet {
                eprintln!("Device {device} paused");
            }
            Ok(())
        }

        SystemCommand::Resume { device } => {
            system.resume(&device).await?;
            if !global.quiet {
                eprintln!("Device {device} resumed");
            }
            Ok(())
        }
    }
}
