//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use balloon_config::ConfigError;
use balloon_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    /// Interrupted by the user (128 + SIGINT).
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(balloon::connection_failed),
        help(
            "Check the endpoint and your network connection.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(balloon::request_timeout),
        help("Increase the per-request timeout with --timeout.")
    )]
    RequestTimeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(balloon::auth_failed),
        help(
            "Check the access token for profile '{profile}'.\n\
             Store a new one with: balloon config set-token {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No access token configured for profile '{profile}'")]
    #[diagnostic(
        code(balloon::no_credentials),
        help(
            "Configure one with: balloon config init\n\
             Or set the BALLOON_ACCESS_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} not found: {identifier}")]
    #[diagnostic(
        code(balloon::not_found),
        help("Run: balloon {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No site given")]
    #[diagnostic(
        code(balloon::no_site),
        help(
            "Pass a site ID, or set a default with: balloon config set site <ID>\n\
             List your sites with: balloon sites list"
        )
    )]
    NoSite,

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(balloon::api_error))]
    ApiError { code: String, message: String },

    // ── Local files ──────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(balloon::local_file))]
    LocalFile { message: String },

    // ── Readiness ────────────────────────────────────────────────────
    #[error("Site was not ready after {seconds}s")]
    #[diagnostic(
        code(balloon::ready_timeout),
        help(
            "The deploy may still finish. Check again with: balloon wait\n\
             Or raise the limit with --ready-timeout."
        )
    )]
    ReadyTimeout { seconds: u64 },

    #[error("Interrupted")]
    #[diagnostic(code(balloon::cancelled))]
    Cancelled,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(balloon::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(balloon::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: balloon config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(balloon::config),
        help("Config file: {path}")
    )]
    Config { message: String, path: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(balloon::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::RequestTimeout => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ReadyTimeout { .. } => exit_code::TIMEOUT,
            Self::Cancelled => exit_code::CANCELLED,
            Self::Validation { .. } | Self::NoSite | Self::NonInteractiveRequiresYes { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::RequestTimeout => CliError::RequestTimeout,

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "current".into(),
                message,
            },

            CoreError::NotFound { resource } => CliError::NotFound {
                resource_type: "site".into(),
                identifier: resource,
                list_command: "sites list".into(),
            },

            CoreError::Api { message, status } => CliError::ApiError {
                code: status.map_or_else(|| "unknown".into(), |s| s.to_string()),
                message,
            },

            local @ (CoreError::Io { .. } | CoreError::InvalidPath { .. }) => {
                CliError::LocalFile {
                    message: local.to_string(),
                }
            }

            CoreError::Timeout { timeout_secs } => CliError::ReadyTimeout {
                seconds: timeout_secs,
            },

            CoreError::Cancelled => CliError::Cancelled,

            CoreError::MissingSiteId => CliError::NoSite,

            CoreError::Config { message } => CliError::Config {
                message,
                path: String::new(),
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
                path: balloon_config::config_path().display().to_string(),
            },
        }
    }
}
