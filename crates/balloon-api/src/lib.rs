// balloon-api: Async Rust client for the BitBalloon site hosting API

pub mod client;
pub mod error;
pub mod models;
pub mod sites;
pub mod transport;

pub use client::BalloonClient;
pub use error::Error;
pub use models::{DeployInfo, ListOptions, READY_STATE, Site, SiteParams};
pub use transport::{TlsMode, TransportConfig};
