//! Command dispatch: bridges CLI args -> core service -> output formatting.

pub mod config_cmd;
pub mod deploy;
pub mod sites;
pub mod util;
pub mod wait;

use balloon_core::SiteService;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    service: &SiteService,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let default_site = resolved.site.as_deref();
    match cmd {
        Command::Sites(args) => sites::handle(service, args, default_site, global).await,
        Command::Deploy(args) => deploy::handle(service, args, default_site, global).await,
        Command::Wait(args) => wait::handle(service, args, default_site, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
