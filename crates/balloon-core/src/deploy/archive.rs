// Archive deploys: one multipart request carrying the zip and the site
// metadata. There is no diff step, so nothing is fingerprinted or uploaded
// file by file.

use std::path::Path;

use balloon_api::{BalloonClient, DeployInfo, Site};
use tracing::debug;

use super::Deployment;
use crate::error::CoreError;
use crate::events::{DeployEvent, Progress};

pub(super) async fn deploy(
    client: &BalloonClient,
    site: &Site,
    path: &Path,
    progress: &Progress,
) -> Result<Deployment, CoreError> {
    let info = client
        .deploy_archive(&site.id, &site.params(), path)
        .await?
        .unwrap_or_else(|| {
            debug!(site = %site.id, "archive accepted without a deploy descriptor");
            DeployInfo {
                id: site.id.clone(),
                ..DeployInfo::default()
            }
        });

    progress.emit(DeployEvent::ArchiveSent {
        deploy_id: info.deploy_id.clone(),
    });

    Ok(Deployment {
        info,
        files: 0,
        uploaded: 0,
    })
}
