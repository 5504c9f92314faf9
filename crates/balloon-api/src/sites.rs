// Site endpoints
//
// `GET/POST /sites`, `GET/PUT/DELETE /sites/{id}` and the per-file upload
// endpoint `PUT /sites/{id}/files/{path}`. Deploys reuse the site `PUT`
// with either a JSON manifest or a multipart archive body.

use std::collections::BTreeMap;
use std::path::Path;

use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;
use tracing::debug;
use url::Url;

use crate::client::{BalloonClient, OCTET_STREAM};
use crate::error::Error;
use crate::models::{DeployInfo, ListOptions, Site, SiteParams, SiteUpdate};

/// Multipart field carrying the archive.
pub const ARCHIVE_FIELD: &str = "zip";

impl BalloonClient {
    fn site_url(&self, id: &str) -> Result<Url, Error> {
        if id.is_empty() {
            return Err(Error::MissingSiteId);
        }
        self.url(["sites", id])
    }

    /// List sites visible to the token.
    ///
    /// `GET /sites?page=&per_page=`
    pub async fn list_sites(&self, options: ListOptions) -> Result<Vec<Site>, Error> {
        let url = self.url(["sites"])?;
        debug!(?options, "listing sites");
        self.get_with_params(url, &options.to_query_params()).await
    }

    /// Fetch a single site, including its current `state`.
    ///
    /// `GET /sites/{id}`
    pub async fn get_site(&self, id: &str) -> Result<Site, Error> {
        let url = self.site_url(id)?;
        self.get(url).await
    }

    /// Create a new, empty site.
    ///
    /// `POST /sites`
    pub async fn create_site(&self, params: &SiteParams) -> Result<Site, Error> {
        let url = self.url(["sites"])?;
        debug!(name = %params.name, "creating site");
        self.post(
            url,
            &SiteUpdate {
                params,
                files: None,
            },
        )
        .await
    }

    /// Update site metadata without touching its content.
    ///
    /// `PUT /sites/{id}` with no `files` key.
    pub async fn update_site(&self, id: &str, params: &SiteParams) -> Result<Site, Error> {
        let url = self.site_url(id)?;
        debug!(site = id, "updating site metadata");
        self.put(
            url,
            &SiteUpdate {
                params,
                files: None,
            },
        )
        .await
    }

    /// Delete a site.
    ///
    /// `DELETE /sites/{id}`
    pub async fn delete_site(&self, id: &str) -> Result<(), Error> {
        let url = self.site_url(id)?;
        debug!(site = id, "deleting site");
        self.delete(url).await
    }

    /// Submit the full file manifest along with the site metadata.
    ///
    /// `PUT /sites/{id}` with `files: { path: sha1 }`. The reply lists the
    /// digests the server still needs.
    pub async fn submit_manifest(
        &self,
        id: &str,
        params: &SiteParams,
        files: &BTreeMap<String, String>,
    ) -> Result<DeployInfo, Error> {
        let url = self.site_url(id)?;
        debug!(site = id, files = files.len(), "submitting manifest");
        self.put(
            url,
            &SiteUpdate {
                params,
                files: Some(files),
            },
        )
        .await
    }

    /// Stream one file's bytes to its deploy path.
    ///
    /// `PUT /sites/{id}/files/{relative/path}` as `application/octet-stream`.
    /// `relative_path` uses `/` separators; each component is encoded
    /// separately.
    pub async fn upload_file(
        &self,
        id: &str,
        relative_path: &str,
        local_path: &Path,
    ) -> Result<(), Error> {
        if id.is_empty() {
            return Err(Error::MissingSiteId);
        }
        let url = self.url(
            ["sites", id, "files"]
                .into_iter()
                .chain(relative_path.split('/')),
        )?;

        let file = open(local_path).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        self.put_stream(url, body, OCTET_STREAM).await
    }

    /// Deploy a prebuilt archive in a single multipart request.
    ///
    /// `PUT /sites/{id}` with a `zip` file part followed by one text part per
    /// metadata field. The archive is opened before any request is sent, so
    /// a missing file never reaches the network. Returns the deploy
    /// descriptor when the server sends one.
    pub async fn deploy_archive(
        &self,
        id: &str,
        params: &SiteParams,
        archive: &Path,
    ) -> Result<Option<DeployInfo>, Error> {
        let url = self.site_url(id)?;

        let file = open(archive).await?;
        let len = file
            .metadata()
            .await
            .map_err(|source| Error::Io {
                path: archive.to_path_buf(),
                source,
            })?
            .len();
        let file_name = archive
            .file_name()
            .map_or_else(|| "site.zip".into(), |n| n.to_string_lossy().into_owned());

        let part = Part::stream_with_length(
            reqwest::Body::wrap_stream(ReaderStream::new(file)),
            len,
        )
        .file_name(file_name)
        .mime_str("application/zip")?;

        let mut form = Form::new().part(ARCHIVE_FIELD, part);
        for (key, value) in params.fields() {
            form = form.text(key, value.to_owned());
        }

        debug!(site = id, bytes = len, "deploying archive");
        self.put_multipart(url, form).await
    }
}

async fn open(path: &Path) -> Result<tokio::fs::File, Error> {
    tokio::fs::File::open(path).await.map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
