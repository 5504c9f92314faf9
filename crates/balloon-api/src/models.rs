// Wire types for the sites API.
//
// Field names match the JSON the service emits. The service sends `null`
// for unset strings, which we fold into empty strings so callers never
// juggle `Option<String>` for plain metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The site `state` value that means processing finished and the deploy is live.
pub const READY_STATE: &str = "current";

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// A site as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_id: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub custom_domain: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub password: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notification_email: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub state: String,
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub claimed: bool,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub admin_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub deploy_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub screenshot_url: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Site {
    /// An identity stub, to be populated by a fetch.
    pub fn stub(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Whether the last deploy has finished processing.
    pub fn is_ready(&self) -> bool {
        self.state == READY_STATE
    }

    /// The mutable metadata of this site, ready to send back.
    pub fn params(&self) -> SiteParams {
        SiteParams {
            name: self.name.clone(),
            custom_domain: self.custom_domain.clone(),
            password: self.password.clone(),
            notification_email: self.notification_email.clone(),
        }
    }
}

/// The user-editable fields of a site.
///
/// Sent as JSON for create/update/manifest requests and as multipart
/// text fields for archive deploys. Empty strings are sent as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteParams {
    pub name: String,
    pub custom_domain: String,
    pub password: String,
    pub notification_email: String,
}

impl SiteParams {
    /// Field name / value pairs in wire order.
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("name", self.name.as_str()),
            ("custom_domain", self.custom_domain.as_str()),
            ("password", self.password.as_str()),
            ("notification_email", self.notification_email.as_str()),
        ]
    }
}

/// Body of a site `PUT`/`POST`. `files` is present only for manifest deploys.
#[derive(Debug, Serialize)]
pub(crate) struct SiteUpdate<'a> {
    #[serde(flatten)]
    pub params: &'a SiteParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<&'a BTreeMap<String, String>>,
}

/// The server's answer to a deploy request.
///
/// `required` lists the digests (from the submitted manifest) the server
/// does not have yet. Archive deploys leave it empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployInfo {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub deploy_id: String,
    #[serde(default, deserialize_with = "null_as_empty_vec")]
    pub required: Vec<String>,
}

fn null_as_empty_vec<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(d)?.unwrap_or_default())
}

/// Query parameters for `GET /sites`. Unset values are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListOptions {
    pub fn to_query_params(self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            params.push(("per_page", per_page.to_string()));
        }
        params
    }
}
