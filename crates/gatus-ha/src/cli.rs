//! Clap derive structures for the `gatus-ha` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// gatus-ha -- Gatus endpoint statuses as binary sensors
#[derive(Debug, Parser)]
#[command(
    name = "gatus-ha",
    version,
    about = "Expose Gatus endpoint health as connectivity sensors",
    long_about = "Polls one or more Gatus servers and publishes every monitored endpoint\n\
        as a connectivity binary sensor. Also manages the configured entries.",
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
    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "GATUS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Entry to use (defaults to `default_entry`)
    #[arg(long, short = 'e', env = "GATUS_ENTRY", global = true)]
    pub entry: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GATUS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, env = "GATUS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
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

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a Gatus server and store it as a new entry
    Add(AddArgs),

    /// Remove a configured entry
    #[command(alias = "rm")]
    Remove(RemoveArgs),

    /// List configured entries
    #[command(alias = "ls")]
    Entries,

    /// Probe an entry's server without fetching statuses
    Check(CheckArgs),

    /// Set up an entry once and print every sensor state
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Keep polling and print sensor state changes
    Watch(WatchArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Subcommand arguments ─────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Display name; its slug becomes the entry id
    pub name: String,

    /// Gatus root URL, e.g. https://status.example.com
    pub url: String,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k')]
    pub no_verify_ssl: bool,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Entry id
    pub id: String,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Probe this URL instead of a configured entry
    #[arg(long)]
    pub url: Option<String>,

    /// Accept invalid TLS certificates (with --url)
    #[arg(long, short = 'k', requires = "url")]
    pub no_verify_ssl: bool,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Only show sensors that are off or unavailable
    #[arg(long)]
    pub down: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Polling period in seconds (overrides the config file)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Exit after this many refresh cycles
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
