//! Clap derive structures for the `xfermon` CLI.
//!
//! Only depends on clap, clap_complete and humantime so `build.rs` can
//! include it to render man pages.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// xfermon -- watch transfer endpoints and pause many-file tasks
#[derive(Debug, Parser)]
#[command(
    name = "xfermon",
    version,
    about = "Watch transfer service endpoints and pause tasks that move too many small files",
    long_about = "Polls the active tasks touching one or more transfer endpoints, reports\n\
        the ones above the configured file-count thresholds, pauses destination\n\
        tasks with too many files and self-looping tasks, and notifies operators.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "XFERMON_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Transfer service API base URL (overrides profile)
    #[arg(long, env = "XFERMON_SERVICE_URL", global = true)]
    pub service_url: Option<String>,

    /// Access token (prefer the keyring or XFERMON_ACCESS_TOKEN)
    #[arg(long, global = true)]
    pub access_token: Option<String>,

    /// Endpoint id to monitor; repeatable, replaces the profile's list
    #[arg(long = "endpoint", short = 'e', value_name = "ID", global = true)]
    pub endpoints: Vec<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "XFERMON_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "XFERMON_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Decide and notify, but never send pause requests
    #[arg(long, global = true)]
    pub dry_run: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Console report / pretty table (default)
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Monitor continuously until interrupted (Ctrl-C / SIGTERM)
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Run a single cycle over every endpoint and exit
    Check,

    /// List active tasks touching the monitored endpoints
    #[command(alias = "ls")]
    Tasks,

    /// Inspect configuration and store credentials
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Sleep between cycles (e.g. "10m", "1h"); overrides profile
    #[arg(long, short = 'i', value_parser = parse_interval)]
    pub interval: Option<Duration>,

    /// Also write logs to a daily-rotated file at this path
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

fn parse_interval(raw: &str) -> Result<Duration, String> {
    let interval = humantime::parse_duration(raw).map_err(|e| e.to_string())?;
    if interval.is_zero() {
        return Err("interval must be greater than zero".into());
    }
    Ok(interval)
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the effective configuration (tokens redacted)
    Show,

    /// Store the active profile's access token in the system keyring.
    /// The token is read from stdin.
    SetToken,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
