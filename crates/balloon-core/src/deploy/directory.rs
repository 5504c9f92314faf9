// Directory deploys: fingerprint the tree, submit the manifest, upload
// whatever the server reports as required.

use std::path::Path;

use balloon_api::{BalloonClient, Site};
use tracing::debug;

use super::{Deployment, upload_required};
use crate::error::CoreError;
use crate::events::{DeployEvent, Progress};
use crate::fingerprint::fingerprint_dir;

pub(super) async fn deploy(
    client: &BalloonClient,
    site: &Site,
    root: &Path,
    upload_concurrency: usize,
    progress: &Progress,
) -> Result<Deployment, CoreError> {
    // Hashing is blocking file I/O; keep it off the runtime threads.
    let owned_root = root.to_path_buf();
    let manifest = tokio::task::spawn_blocking(move || fingerprint_dir(&owned_root))
        .await
        .map_err(|e| CoreError::Internal(format!("fingerprint task failed: {e}")))??;
    progress.emit(DeployEvent::Fingerprinted {
        files: manifest.len(),
    });

    let info = client
        .submit_manifest(&site.id, &site.params(), manifest.files())
        .await?;

    let plan = manifest.required_paths(&info.required);
    debug!(
        required = info.required.len(),
        uploads = plan.len(),
        "manifest diff complete"
    );
    progress.emit(DeployEvent::DiffComplete {
        files: manifest.len(),
        uploads: plan.len(),
    });

    let uploaded =
        upload_required(client, &site.id, &manifest, &plan, upload_concurrency, progress).await?;

    Ok(Deployment {
        files: manifest.len(),
        uploaded,
        info,
    })
}
