// Selective upload: send exactly the planned files, fail fast.
//
// Uploads run under a bounded concurrency limit. The first failure ends
// the whole batch: `try_for_each_concurrent` returns it immediately and
// drops every in-flight upload future, which aborts its request and closes
// its file. Pending uploads are never started.

use std::sync::atomic::{AtomicUsize, Ordering};

use balloon_api::BalloonClient;
use futures_util::stream::{self, TryStreamExt};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::events::{DeployEvent, Progress};
use crate::fingerprint::Manifest;

pub(crate) async fn upload_required(
    client: &BalloonClient,
    site_id: &str,
    manifest: &Manifest,
    plan: &[&str],
    concurrency: usize,
    progress: &Progress,
) -> Result<usize, CoreError> {
    let uploaded = AtomicUsize::new(0);
    let uploaded_ref = &uploaded;

    let result = stream::iter(plan.iter().copied().map(Ok::<_, CoreError>))
        .try_for_each_concurrent(concurrency.max(1), |relative| async move {
            debug!(path = relative, "uploading");
            progress.emit(DeployEvent::Uploading {
                path: relative.to_owned(),
            });

            client
                .upload_file(site_id, relative, &manifest.local_path(relative))
                .await?;

            uploaded_ref.fetch_add(1, Ordering::Relaxed);
            progress.emit(DeployEvent::Uploaded {
                path: relative.to_owned(),
            });
            Ok(())
        })
        .await;

    let done = uploaded.load(Ordering::Relaxed);
    if let Err(ref e) = result {
        warn!(
            uploaded = done,
            planned = plan.len(),
            error = %e,
            "upload failed, abandoning remaining files"
        );
    }
    result.map(|()| done)
}
