// ── Deploy engine ──
//
// A deploy pushes one source into one site. Directory sources go through
// fingerprint → manifest diff → selective upload; archive sources are sent
// whole in a single multipart request. Either way the result is the deploy
// descriptor the readiness poller keys off.

mod archive;
mod directory;
mod upload;

use std::path::{Path, PathBuf};

use balloon_api::{BalloonClient, DeployInfo, Site};
use serde::Serialize;
use tracing::info;

use crate::error::CoreError;
use crate::events::Progress;

pub(crate) use upload::upload_required;

/// What to deploy. One source per deploy; there is no precedence rule to
/// remember because both cannot be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploySource {
    /// A finished static tree, synchronized file by file.
    Directory(PathBuf),
    /// A prebuilt zip archive, sent in one request.
    Archive(PathBuf),
}

impl DeploySource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::Archive(path) => path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Directory(_) => "directory",
            Self::Archive(_) => "archive",
        }
    }
}

/// Outcome of a successful deploy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Deployment {
    /// Server-assigned identity of the deploy.
    pub info: DeployInfo,
    /// Files in the local manifest (zero for archives).
    pub files: usize,
    /// Files actually uploaded (zero for archives).
    pub uploaded: usize,
}

/// Run one deploy of `source` into `site`.
///
/// Rejects a site without an id before touching the filesystem or the
/// network. The first error from any step is returned and nothing after it
/// runs.
pub(crate) async fn run(
    client: &BalloonClient,
    site: &Site,
    source: &DeploySource,
    upload_concurrency: usize,
    progress: &Progress,
) -> Result<Deployment, CoreError> {
    if site.id.is_empty() {
        return Err(CoreError::MissingSiteId);
    }

    info!(site = %site.id, source = source.kind(), path = %source.path().display(), "deploying");

    let deployment = match source {
        DeploySource::Directory(root) => {
            directory::deploy(client, site, root, upload_concurrency, progress).await?
        }
        DeploySource::Archive(path) => archive::deploy(client, site, path, progress).await?,
    };

    info!(
        site = %site.id,
        deploy = %deployment.info.deploy_id,
        files = deployment.files,
        uploaded = deployment.uploaded,
        "deploy submitted"
    );
    Ok(deployment)
}
