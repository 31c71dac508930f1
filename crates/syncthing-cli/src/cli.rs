//! Clap derive structures for the `stcli` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// stcli -- command-line client for a Syncthing daemon
#[derive(Debug, Parser)]
#[command(
    name = "stcli",
    version,
    about = "Query and control a Syncthing daemon from the command line",
    long_about = "Talks to a running Syncthing daemon over its REST API.\n\n\
        Connection details come from a named profile in the config file,\n\
        from STCLI_* environment variables, or from the flags below.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Daemon profile to use
    #[arg(long, short = 'p', env = "STCLI_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Daemon GUI/API address (overrides profile), e.g. http://127.0.0.1:8384
    #[arg(long, short = 'u', env = "STCLI_URL", global = true)]
    pub url: Option<String>,

    /// REST API key
    #[arg(long, env = "STCLI_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "STCLI_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "STCLI_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "STCLI_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Daemon status, connections, and lifecycle
    #[command(alias = "sys")]
    System(SystemArgs),

    /// Inspect the daemon configuration
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Manage the daemon's error list
    Errors(ErrorsArgs),

    /// Show recent daemon log lines
    Log,

    /// Read and follow the daemon event log
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// Manage stcli connection profiles
    Profiles(ProfilesArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SYSTEM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SystemArgs {
    #[command(subcommand)]
    pub command: SystemCommand,
}

#[derive(Debug, Subcommand)]
pub enum SystemCommand {
    /// Check that the daemon answers
    Ping,

    /// Runtime status (device ID, uptime, memory, listeners)
    Status,

    /// Daemon version and build info
    Version,

    /// Check for an available upgrade
    Upgrade,

    /// Connection state per remote device
    #[command(alias = "conns")]
    Connections,

    /// Addresses learned through discovery
    Discovery,

    /// List directories under a path prefix
    Browse {
        /// Path prefix to complete
        current: Option<String>,
    },

    /// Show or toggle debug facilities
    Debug {
        /// Facilities to enable (comma-separated)
        #[arg(long, value_delimiter = ',')]
        enable: Vec<String>,

        /// Facilities to disable (comma-separated)
        #[arg(long, value_delimiter = ',')]
        disable: Vec<String>,
    },

    /// Restart the daemon
    Restart,

    /// Shut the daemon down
    Shutdown,

    /// Erase the index database and restart
    Reset {
        /// Only reset this folder
        #[arg(long)]
        folder: Option<String>,
    },

    /// Pause a remote device
    Pause {
        /// Device ID
        device: String,
    },

    /// Resume a remote device
    Resume {
        /// Device ID
        device: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / ERRORS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the daemon configuration (folders and devices as tables)
    Show,

    /// Whether the running configuration matches the saved one
    #[command(name = "insync", alias = "in-sync")]
    InSync,

    /// Print the stcli config file path
    Path,
}

#[derive(Debug, Args)]
pub struct ErrorsArgs {
    #[command(subcommand)]
    pub command: ErrorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ErrorsCommand {
    /// List current errors
    #[command(alias = "ls")]
    List,

    /// Append a message to the error list
    Add {
        /// Message text
        message: String,
    },

    /// Clear the error list
    Clear,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EVENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// List buffered events without waiting
    #[command(alias = "ls")]
    List {
        /// Event types to include (comma-separated)
        #[arg(long = "type", short = 't', value_delimiter = ',')]
        types: Vec<String>,

        /// Only events with a greater id
        #[arg(long)]
        since: Option<u64>,

        /// Max events
        #[arg(long, short = 'l')]
        limit: Option<u32>,
    },

    /// Print new events as they happen until interrupted
    Watch {
        /// Event types to include (comma-separated)
        #[arg(long = "type", short = 't', value_delimiter = ',')]
        types: Vec<String>,

        /// Keep polling with backoff after a failed request instead of exiting
        #[arg(long)]
        retry: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROFILES / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    pub command: ProfilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfilesCommand {
    /// List configured profiles
    #[command(alias = "ls")]
    List,

    /// Add or replace a profile, prompting for anything not given
    Init {
        /// Profile name
        #[arg(long)]
        name: Option<String>,

        /// Daemon address
        #[arg(long = "daemon-url")]
        daemon_url: Option<String>,

        /// Read the API key from this environment variable instead of storing it
        #[arg(long)]
        api_key_env: Option<String>,
    },

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
