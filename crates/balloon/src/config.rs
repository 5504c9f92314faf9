//! CLI configuration: a thin wrapper around `balloon_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--endpoint, --access-token, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use balloon_core::{ClientConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use balloon_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Everything a command needs from configuration.
pub struct Resolved {
    pub client: ClientConfig,
    /// Default site id from the profile, if any.
    pub site: Option<String>,
    pub profile_name: String,
}

/// Translate config file + profile + global flags into a `ClientConfig`.
///
/// Flags win over profile values. Without a profile, the endpoint
/// defaults to the public service and the token must come from a flag or
/// `BALLOON_ACCESS_TOKEN`.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // Naming a profile that doesn't exist is an error; falling back
        // from the implicit default is not.
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => Profile::new(),
    };

    let endpoint = global.endpoint.as_deref().unwrap_or(&profile.endpoint);
    let url = balloon_config::parse_endpoint(endpoint)?;

    let access_token = match global.access_token {
        Some(ref token) => SecretString::from(token.clone()),
        None => balloon_config::resolve_access_token(&profile, &profile_name)?,
    };

    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        balloon_config::tls_verification(&profile, &cfg.defaults)
    };

    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(cfg.defaults.timeout);

    Ok(Resolved {
        client: ClientConfig {
            url,
            access_token: Some(access_token),
            tls,
            timeout: Duration::from_secs(timeout),
            deploy: balloon_config::deploy_options(&profile, &cfg.defaults),
        },
        site: profile.site.clone(),
        profile_name,
    })
}

/// Comma-separated profile names for help text.
pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}
