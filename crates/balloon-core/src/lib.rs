// balloon-core: Deploy synchronization engine between balloon-api and the CLI.

pub mod config;
pub mod deploy;
pub mod error;
pub mod events;
pub mod fingerprint;
pub mod poller;
pub mod service;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, DeployOptions, TlsVerification};
pub use deploy::{DeploySource, Deployment};
pub use error::CoreError;
pub use events::DeployEvent;
pub use fingerprint::{Manifest, fingerprint_dir};
pub use poller::{SiteStatusSource, wait_for_ready};
pub use service::SiteService;

// Wire types callers need alongside the service.
pub use balloon_api::{DeployInfo, ListOptions, READY_STATE, Site, SiteParams};
