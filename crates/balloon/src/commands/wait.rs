//! Wait command handler.

use std::time::Duration;

use balloon_core::{Site, SiteService};
use tokio::sync::mpsc;

use crate::cli::{GlobalOpts, WaitArgs};
use crate::error::CliError;
use crate::output;
use crate::progress::DeployProgress;

use super::{sites, util};

pub async fn handle(
    service: &SiteService,
    args: WaitArgs,
    default_site: Option<&str>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let id = util::resolve_site_id(args.site, default_site)?;
    let site = service.get(&id).await?;

    let site = until_ready(
        service,
        &site,
        args.ready_timeout.map(Duration::from_secs),
        global,
    )
    .await?;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &site,
        |s| sites::detail(s, color),
        |s| s.state.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Poll until `site` is live, showing state changes. Ctrl-C cancels.
pub(super) async fn until_ready(
    service: &SiteService,
    site: &Site,
    timeout: Option<Duration>,
    global: &GlobalOpts,
) -> Result<Site, CliError> {
    let (tx, rx) = mpsc::unbounded_channel();
    let progress = DeployProgress::spawn(rx, global.quiet);
    let interrupt = util::cancel_on_ctrl_c();

    let tracked = service.clone().with_progress(tx);
    let result = tracked
        .wait_for_ready(site, timeout, interrupt.token())
        .await;
    drop(interrupt);
    drop(tracked);
    progress.finish().await;

    let ready = result?;
    output::status(
        format!("{} is live at {}", ready.id, ready.url),
        output::should_color(&global.color),
        global.quiet,
    );
    Ok(ready)
}
