//! Clap derive structures for the `balloon` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// balloon -- deploy static sites to BitBalloon
#[derive(Debug, Parser)]
#[command(
    name = "balloon",
    version,
    about = "Deploy static sites to BitBalloon from the command line",
    long_about = "Manage BitBalloon sites and deploy finished static trees or zip archives.\n\n\
        Directory deploys only upload files whose content the service has not seen.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "BALLOON_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API endpoint URL (overrides profile)
    #[arg(long, short = 'e', env = "BALLOON_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// OAuth access token
    #[arg(long, env = "BALLOON_ACCESS_TOKEN", global = true, hide_env_values = true)]
    pub access_token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BALLOON_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "BALLOON_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "BALLOON_TIMEOUT", global = true)]
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage sites
    #[command(alias = "s")]
    Sites(SitesArgs),

    /// Deploy a directory or zip archive to a site
    #[command(alias = "d")]
    Deploy(DeployArgs),

    /// Wait until a site's latest deploy is live
    Wait(WaitArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Editable site metadata. Unset flags leave the current value alone.
#[derive(Debug, Default, Args)]
pub struct SiteFieldArgs {
    /// Site name (becomes <name>.bitballoon.com)
    #[arg(long)]
    pub name: Option<String>,

    /// Custom domain to serve the site from
    #[arg(long)]
    pub custom_domain: Option<String>,

    /// Password-protect the site (empty string removes protection)
    #[arg(long)]
    pub password: Option<String>,

    /// Email notified when a deploy finishes processing
    #[arg(long)]
    pub notification_email: Option<String>,
}

/// Exactly one deploy source.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Directory with the finished static site
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Prebuilt zip archive of the site
    #[arg(long, value_name = "FILE")]
    pub zip: Option<PathBuf>,
}

/// Readiness wait flags shared by deploy commands.
#[derive(Debug, Args)]
pub struct WaitOpts {
    /// Block until the deploy is live
    #[arg(long, short = 'w')]
    pub wait: bool,

    /// Seconds to wait for the deploy to go live (0 = 300)
    #[arg(long, value_name = "SECS", requires = "wait")]
    pub ready_timeout: Option<u64>,
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List sites
    #[command(alias = "ls")]
    List {
        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Sites per page
        #[arg(long)]
        per_page: Option<u32>,
    },

    /// Show one site
    Get {
        /// Site ID (defaults to the profile's site)
        site: Option<String>,
    },

    /// Create a site, optionally deploying into it
    Create {
        #[command(flatten)]
        fields: SiteFieldArgs,

        /// Deploy this directory after creating
        #[arg(long, value_name = "DIR", conflicts_with = "zip")]
        dir: Option<PathBuf>,

        /// Deploy this zip archive after creating
        #[arg(long, value_name = "FILE")]
        zip: Option<PathBuf>,

        #[command(flatten)]
        wait: WaitOpts,
    },

    /// Update site metadata without deploying
    Update {
        /// Site ID (defaults to the profile's site)
        site: Option<String>,

        #[command(flatten)]
        fields: SiteFieldArgs,
    },

    /// Delete a site
    #[command(alias = "rm")]
    Delete {
        /// Site ID
        site: String,
    },
}

// ── Deploy / Wait ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Site ID (defaults to the profile's site)
    pub site: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub wait: WaitOpts,

    /// Maximum concurrent file uploads
    #[arg(long, short = 'j', value_name = "N")]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Args)]
pub struct WaitArgs {
    /// Site ID (defaults to the profile's site)
    pub site: Option<String>,

    /// Seconds to wait before giving up (0 = 300)
    #[arg(long, short = 't', value_name = "SECS")]
    pub ready_timeout: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

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

    /// Set a profile value
    Set {
        /// Profile key (endpoint, site, access_token_env, timeout, ...)
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

    /// Store an access token in the system keyring
    SetToken {
        /// Profile to store it for (defaults to the active profile)
        profile_name: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
