// ── Readiness poller ──
//
// After a deploy the service processes the new content in the background.
// `wait_for_ready` refetches the site on a fixed interval until its state
// reads `current`. One `select!` owns every way the wait can end: the
// caller's cancellation token, the wall-clock deadline, a fetch error, or
// the ready state. Exactly one of those is returned and no tick runs after
// it, because the poll is a plain future owned by the caller.

use std::future::Future;
use std::time::Duration;

use balloon_api::{BalloonClient, Site};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{DEFAULT_POLL_INTERVAL, DEFAULT_READY_TIMEOUT};
use crate::error::CoreError;
use crate::events::{DeployEvent, Progress};

/// Anything that can fetch the current state of a site by id.
///
/// Implemented for [`BalloonClient`]; tests drive the poller with a
/// scripted source instead of a server.
pub trait SiteStatusSource {
    fn fetch_site(&self, id: &str) -> impl Future<Output = Result<Site, CoreError>> + Send;
}

impl SiteStatusSource for BalloonClient {
    async fn fetch_site(&self, id: &str) -> Result<Site, CoreError> {
        Ok(self.get_site(id).await?)
    }
}

/// Block until `site` reaches the ready state.
///
/// Returns the site as last fetched. A site that is already ready returns
/// at once without a request. A zero `timeout` means five minutes, a zero
/// `interval` means one second.
///
/// # Errors
///
/// [`CoreError::Timeout`] when the deadline passes first,
/// [`CoreError::Cancelled`] when `cancel` fires first, or the first fetch
/// error.
pub async fn wait_for_ready<S: SiteStatusSource + ?Sized>(
    source: &S,
    site: &Site,
    interval: Duration,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Site, CoreError> {
    poll_until_ready(source, site, interval, timeout, cancel, &Progress::default()).await
}

pub(crate) async fn poll_until_ready<S: SiteStatusSource + ?Sized>(
    source: &S,
    site: &Site,
    interval: Duration,
    timeout: Duration,
    cancel: &CancellationToken,
    progress: &Progress,
) -> Result<Site, CoreError> {
    if site.is_ready() {
        debug!(site = %site.id, "site already ready");
        return Ok(site.clone());
    }
    if site.id.is_empty() {
        return Err(CoreError::MissingSiteId);
    }

    let timeout = non_zero_or(timeout, DEFAULT_READY_TIMEOUT);
    let interval = non_zero_or(interval, DEFAULT_POLL_INTERVAL);

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    // First fetch one interval after entry, not immediately.
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(site = %site.id, timeout_secs = timeout.as_secs(), "waiting for site to become ready");
    let mut last_state = site.state.clone();

    loop {
        let current = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(site = %site.id, "readiness wait cancelled");
                return Err(CoreError::Cancelled);
            }
            () = &mut deadline => {
                info!(site = %site.id, state = %last_state, "readiness wait timed out");
                return Err(CoreError::Timeout { timeout_secs: timeout.as_secs() });
            }
            fetched = poll_once(source, &site.id, &mut ticker) => fetched?,
        };

        if current.state != last_state {
            info!(site = %site.id, state = %current.state, "site state is now {}", current.state);
            progress.emit(DeployEvent::StateChanged {
                state: current.state.clone(),
            });
            last_state.clone_from(&current.state);
        }

        if current.is_ready() {
            return Ok(current);
        }
    }
}

async fn poll_once<S: SiteStatusSource + ?Sized>(
    source: &S,
    id: &str,
    ticker: &mut Interval,
) -> Result<Site, CoreError> {
    ticker.tick().await;
    source.fetch_site(id).await
}

fn non_zero_or(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() { fallback } else { value }
}
