// ── Site service ──
//
// The entry point consumers use. Wraps one `BalloonClient` together with
// the deploy tuning from `ClientConfig`, and an optional progress channel.
// Every method is a single awaited operation; nothing runs in the
// background once a call returns.

use std::sync::Arc;
use std::time::Duration;

use balloon_api::{BalloonClient, ListOptions, Site, SiteParams};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{ClientConfig, DeployOptions};
use crate::deploy::{self, DeploySource, Deployment};
use crate::error::CoreError;
use crate::events::{DeployEvent, Progress};
use crate::poller;

/// Cheaply cloneable handle for site management and deploys.
#[derive(Debug, Clone)]
pub struct SiteService {
    inner: Arc<ServiceInner>,
}

#[derive(Debug)]
struct ServiceInner {
    client: BalloonClient,
    options: DeployOptions,
    progress: Progress,
}

impl SiteService {
    /// Build the HTTP client described by `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let client = BalloonClient::new(config.url.as_str(), &config.transport())?;
        Ok(Self::from_client(client, config.deploy.clone()))
    }

    /// Wrap an already-built client.
    pub fn from_client(client: BalloonClient, options: DeployOptions) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                client,
                options,
                progress: Progress::default(),
            }),
        }
    }

    /// Send deploy and readiness progress to `tx`.
    #[must_use]
    pub fn with_progress(self, tx: mpsc::UnboundedSender<DeployEvent>) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                client: self.inner.client.clone(),
                options: self.inner.options.clone(),
                progress: Progress::new(Some(tx)),
            }),
        }
    }

    pub fn client(&self) -> &BalloonClient {
        &self.inner.client
    }

    pub fn options(&self) -> &DeployOptions {
        &self.inner.options
    }

    // ── Site management ──────────────────────────────────────────

    pub async fn list(&self, options: ListOptions) -> Result<Vec<Site>, CoreError> {
        Ok(self.inner.client.list_sites(options).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Site, CoreError> {
        Ok(self.inner.client.get_site(id).await?)
    }

    /// Re-fetch `site` by id into a fresh value.
    pub async fn refresh(&self, site: &Site) -> Result<Site, CoreError> {
        self.get(&site.id).await
    }

    pub async fn create(&self, params: &SiteParams) -> Result<Site, CoreError> {
        let site = self.inner.client.create_site(params).await?;
        info!(site = %site.id, url = %site.url, "site created");
        Ok(site)
    }

    /// Update metadata only; the deployed content is left alone.
    pub async fn update(&self, id: &str, params: &SiteParams) -> Result<Site, CoreError> {
        Ok(self.inner.client.update_site(id, params).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.inner.client.delete_site(id).await?;
        info!(site = id, "site deleted");
        Ok(())
    }

    // ── Deploys ──────────────────────────────────────────────────

    /// Push `source` into `site`, sending `site`'s metadata along.
    pub async fn deploy(&self, site: &Site, source: &DeploySource) -> Result<Deployment, CoreError> {
        deploy::run(
            &self.inner.client,
            site,
            source,
            self.inner.options.upload_concurrency,
            &self.inner.progress,
        )
        .await
    }

    /// Block until `site` is live. `timeout` overrides the configured one.
    pub async fn wait_for_ready(
        &self,
        site: &Site,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<Site, CoreError> {
        let options = &self.inner.options;
        let timeout = timeout.unwrap_or_else(|| options.effective_ready_timeout());
        debug!(site = %site.id, ?timeout, "readiness wait requested");

        poller::poll_until_ready(
            &self.inner.client,
            site,
            options.poll_interval,
            timeout,
            cancel,
            &self.inner.progress,
        )
        .await
    }
}
