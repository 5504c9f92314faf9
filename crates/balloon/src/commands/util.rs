//! Shared helpers for command handlers.

use std::io::IsTerminal;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use balloon_core::{DeploySource, SiteParams};

use crate::cli::{SiteFieldArgs, SourceArgs};
use crate::error::CliError;

/// Pick the explicit site argument, else the profile default.
pub fn resolve_site_id(arg: Option<String>, default: Option<&str>) -> Result<String, CliError> {
    arg.or_else(|| default.map(str::to_owned))
        .filter(|id| !id.is_empty())
        .ok_or(CliError::NoSite)
}

/// Overlay the flags that were given onto existing metadata.
pub fn merge_fields(mut params: SiteParams, fields: SiteFieldArgs) -> SiteParams {
    if let Some(name) = fields.name {
        params.name = name;
    }
    if let Some(domain) = fields.custom_domain {
        params.custom_domain = domain;
    }
    if let Some(password) = fields.password {
        params.password = password;
    }
    if let Some(email) = fields.notification_email {
        params.notification_email = email;
    }
    params
}

/// Turn the `--dir` / `--zip` pair into a deploy source.
///
/// Clap enforces that at most one is set; `None` means neither was.
pub fn deploy_source(
    dir: Option<std::path::PathBuf>,
    zip: Option<std::path::PathBuf>,
) -> Option<DeploySource> {
    match (dir, zip) {
        (Some(dir), _) => Some(DeploySource::Directory(dir)),
        (None, Some(zip)) => Some(DeploySource::Archive(zip)),
        (None, None) => None,
    }
}

pub fn required_source(source: SourceArgs) -> Result<DeploySource, CliError> {
    deploy_source(source.dir, source.zip).ok_or_else(|| CliError::Validation {
        field: "source".into(),
        reason: "pass --dir or --zip".into(),
    })
}

/// Cancels its token on the first Ctrl-C. The listener task is aborted
/// when the guard is dropped.
pub struct CtrlCGuard {
    token: CancellationToken,
    listener: JoinHandle<()>,
}

impl CtrlCGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for CtrlCGuard {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

pub fn cancel_on_ctrl_c() -> CtrlCGuard {
    let token = CancellationToken::new();
    let trigger = token.clone();
    let listener = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received");
            trigger.cancel();
        }
    });
    CtrlCGuard { token, listener }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool, action: &str) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn explicit_site_beats_profile_default() {
        assert_eq!(
            resolve_site_id(Some("s2".into()), Some("s1")).unwrap(),
            "s2"
        );
        assert_eq!(resolve_site_id(None, Some("s1")).unwrap(), "s1");
        assert!(matches!(resolve_site_id(None, None), Err(CliError::NoSite)));
        assert!(matches!(
            resolve_site_id(Some(String::new()), None),
            Err(CliError::NoSite)
        ));
    }

    #[test]
    fn unset_fields_keep_current_values() {
        let current = SiteParams {
            name: "blog".into(),
            custom_domain: "www.example.com".into(),
            password: "secret".into(),
            notification_email: "ops@example.com".into(),
        };
        let merged = merge_fields(
            current,
            SiteFieldArgs {
                password: Some(String::new()),
                ..SiteFieldArgs::default()
            },
        );

        assert_eq!(merged.name, "blog");
        assert_eq!(merged.custom_domain, "www.example.com");
        assert_eq!(merged.password, "");
    }

    #[tokio::test]
    async fn dropping_the_guard_stops_the_listener() {
        let guard = cancel_on_ctrl_c();
        let token = guard.token().clone();
        let listener = guard.listener.abort_handle();
        assert!(!listener.is_finished());

        drop(guard);
        for _ in 0..100 {
            if listener.is_finished() {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert!(listener.is_finished());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn source_prefers_directory_flag() {
        assert_eq!(
            deploy_source(Some(PathBuf::from("public")), None),
            Some(DeploySource::Directory("public".into()))
        );
        assert_eq!(
            deploy_source(None, Some(PathBuf::from("site.zip"))),
            Some(DeploySource::Archive("site.zip".into()))
        );
        assert_eq!(deploy_source(None, None), None);
    }
}
