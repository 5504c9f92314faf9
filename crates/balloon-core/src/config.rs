// ── Runtime client configuration ──
//
// These types describe *how* to talk to the API and how deploys behave.
// They carry the access token and tuning knobs, but never touch disk.
// The CLI builds a `ClientConfig` and hands it in.

use std::time::Duration;

use balloon_api::transport::{TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

/// Poll interval of the readiness wait.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Readiness timeout used when the caller passes zero.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Uploads in flight at once during a directory deploy.
pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 4;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (staging endpoints with self-signed certs).
    DangerAcceptInvalid,
}

/// Knobs for the deploy engine and the readiness poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Maximum concurrent file uploads. `1` uploads in manifest order.
    pub upload_concurrency: usize,
    /// Delay between readiness polls.
    pub poll_interval: Duration,
    /// How long to wait for a deploy to go live. Zero means the default.
    pub ready_timeout: Duration,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }
}

impl DeployOptions {
    /// The readiness timeout with the zero-means-default rule applied.
    pub fn effective_ready_timeout(&self) -> Duration {
        if self.ready_timeout.is_zero() {
            DEFAULT_READY_TIMEOUT
        } else {
            self.ready_timeout
        }
    }
}

/// Configuration for one API endpoint.
///
/// Built by the CLI, passed to `SiteService` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., `https://www.bitballoon.com/api/v1/`).
    pub url: Url,
    /// OAuth access token.
    pub access_token: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Deploy and readiness tuning.
    pub deploy: DeployOptions,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            access_token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(120),
            deploy: DeployOptions::default(),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: tls_to_transport(&self.tls),
            timeout: self.timeout,
            access_token: self.access_token.clone(),
        }
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
