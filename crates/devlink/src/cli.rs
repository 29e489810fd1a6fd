//! Clap derive structures for the `devlink` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// devlink -- manage device-to-user associations from the command line
#[derive(Debug, Parser)]
#[command(
    name = "devlink",
    version,
    about = "Manage device registration and device-to-user groups",
    long_about = "A CLI for registering devices and managing their user-group\n\
        associations, backed by a generic table-based data service.",
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
    /// Data-service profile to use
    #[arg(long, short = 'p', env = "DEVLINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Data-service root URL (overrides profile)
    #[arg(long, short = 'u', env = "DEVLINK_URL", global = true)]
    pub url: Option<String>,

    /// Database service name under /api/v2/
    #[arg(long, env = "DEVLINK_SERVICE", global = true)]
    pub service: Option<String>,

    /// Data-service API key
    #[arg(long, env = "DEVLINK_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DEVLINK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "DEVLINK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "DEVLINK_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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
    /// Register a device (create or update by MAC)
    #[command(alias = "reg")]
    Register(RegisterArgs),

    /// Manage device-to-user group membership
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Register ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Device MAC address (the device's natural key)
    #[arg(long, short = 'm')]
    pub mac: String,

    /// Additional attributes as KEY=VALUE pairs (values parsed as JSON
    /// when possible, stored as strings otherwise)
    #[arg(long = "attr", short = 'a', value_name = "KEY=VALUE")]
    pub attrs: Vec<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List the devices in a user's group
    #[command(alias = "ls")]
    List {
        /// User id (defaults to the profile's user_id)
        #[arg(long)]
        user: Option<i64>,
    },

    /// Add a registered device to a user's group
    Add {
        /// Device MAC address
        mac: String,

        /// User id (defaults to the profile's user_id)
        #[arg(long)]
        user: Option<i64>,
    },

    /// Remove a device from its group and delete its record
    #[command(alias = "rm")]
    Remove {
        /// Device MAC address
        mac: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive wizard to create a profile
    Init,

    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
