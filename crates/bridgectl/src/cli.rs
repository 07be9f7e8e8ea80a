//! Clap derive structures for the `bridgectl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Compiled into `build.rs` as well, so it depends on clap alone.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// bridgectl -- console for ESP32 UART bridges
#[derive(Debug, Parser)]
#[command(
    name = "bridgectl",
    version,
    about = "Configure and monitor ESP32 UART bridges from the command line",
    long_about = "Reads the bridge configuration, keeps the five device roles and the\n\
        protocol mode consistent while you edit, saves, and follows the device\n\
        through its restart until it answers again.",
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
    /// Device profile to use
    #[arg(long, short = 'p', env = "BRIDGECTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device address (overrides profile), e.g. 192.168.4.1 or uart-bridge.local
    #[arg(long, short = 'd', env = "BRIDGECTL_DEVICE", global = true)]
    pub device: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BRIDGECTL_OUTPUT",
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

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BRIDGECTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

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

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show runtime status (uptime, WiFi link, traffic)
    #[command(alias = "st")]
    Status(WatchArgs),

    /// View and edit device settings
    Settings(SettingsArgs),

    /// Show the role options each device slot offers right now
    Roles,

    /// Show the device log
    Logs(LogsArgs),

    /// Inspect or clear the crash log
    Crash(CrashArgs),

    /// SBUS router status and control
    Sbus(SbusArgs),

    /// Traffic statistics
    Stats(StatsArgs),

    /// Push the local clock to the device
    TimeSync(TimeSyncArgs),

    /// Export or import a configuration backup
    Backup(BackupArgs),

    /// Restore factory settings (restarts the device)
    FactoryReset(RebootOpts),

    /// Upload a firmware image (restarts the device)
    #[command(alias = "fw")]
    Firmware(FirmwareArgs),

    /// Wait for a restarting device to answer again
    Wait(WaitArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Keep polling and print every update
    #[arg(long, short = 'w')]
    pub watch: bool,
}

/// Flags shared by every command that restarts the device.
#[derive(Debug, Args)]
pub struct RebootOpts {
    /// Return as soon as the device accepts the request
    #[arg(long)]
    pub no_wait: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SETTINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the settings relevant to the current roles
    #[command(alias = "get")]
    Show {
        /// Include fields hidden by the current roles
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Apply edits, save, and wait for the device to restart
    Set {
        /// Assignments such as device2Role=4 or baudrate=57600
        #[arg(value_name = "KEY=VALUE", required = true)]
        assignments: Vec<String>,

        /// Show the resulting changes without saving
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        reboot: RebootOpts,
    },

    /// Apply edits locally and report the result of validation
    Validate {
        #[arg(value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGS / CRASH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Keep polling and print new lines as they appear
    #[arg(long, short = 'f')]
    pub follow: bool,

    /// Only show the last N lines
    #[arg(long, short = 'n')]
    pub lines: Option<usize>,
}

#[derive(Debug, Args)]
pub struct CrashArgs {
    #[command(subcommand)]
    pub command: CrashCommand,
}

#[derive(Debug, Subcommand)]
pub enum CrashCommand {
    /// List recorded crashes
    #[command(alias = "ls")]
    List,

    /// Erase the crash log
    Clear,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SBUS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SbusArgs {
    #[command(subcommand)]
    pub command: SbusCommand,
}

#[derive(Debug, Subcommand)]
pub enum SbusCommand {
    /// Router mode, state and per-source health
    Status(WatchArgs),

    /// Select the active source
    Source {
        /// Source id (0-2)
        source: u8,
    },

    /// Switch between automatic and manual source selection
    Mode {
        #[arg(value_enum)]
        mode: SbusModeArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SbusModeArg {
    Auto,
    Manual,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATS / TIME
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommand,
}

#[derive(Debug, Subcommand)]
pub enum StatsCommand {
    /// Per-slot traffic counters
    Show,

    /// Zero the traffic counters
    Reset,
}

#[derive(Debug, Args)]
pub struct TimeSyncArgs {
    /// Unix seconds or RFC3339 time to send instead of the local clock
    #[arg(long)]
    pub at: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BACKUP / FIRMWARE / WAIT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BackupArgs {
    #[command(subcommand)]
    pub command: BackupCommand,
}

#[derive(Debug, Subcommand)]
pub enum BackupCommand {
    /// Download the full configuration
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },

    /// Restore a configuration backup (restarts the device)
    Import {
        /// Backup file produced by `backup export`
        file: PathBuf,

        #[command(flatten)]
        reboot: RebootOpts,
    },
}

#[derive(Debug, Args)]
pub struct FirmwareArgs {
    /// Firmware image (.bin)
    pub file: PathBuf,

    #[command(flatten)]
    pub reboot: RebootOpts,
}

#[derive(Debug, Args)]
pub struct WaitArgs {
    /// Address the device is expected to come back at
    #[arg(long)]
    pub alternate: Option<String>,

    /// Countdown before the first probe, in seconds
    #[arg(long)]
    pub wait: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key, e.g. device, alternate, timeout, max_rounds
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
