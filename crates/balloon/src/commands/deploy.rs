//! Deploy command handler, shared with `sites create --dir/--zip`.

use std::time::Duration;

use balloon_core::{DeployOptions, DeploySource, Deployment, Site, SiteService};
use tokio::sync::mpsc;

use crate::cli::{DeployArgs, GlobalOpts, WaitOpts};
use crate::error::CliError;
use crate::output;
use crate::progress::DeployProgress;

use super::{util, wait};

pub async fn handle(
    service: &SiteService,
    args: DeployArgs,
    default_site: Option<&str>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let id = util::resolve_site_id(args.site, default_site)?;
    let source = util::required_source(args.source)?;

    let service = match args.concurrency {
        Some(n) => SiteService::from_client(
            service.client().clone(),
            DeployOptions {
                upload_concurrency: n.max(1),
                ..service.options().clone()
            },
        ),
        None => service.clone(),
    };

    // The deploy re-sends the site's metadata, so start from its current values.
    let site = service.refresh(&Site::stub(id)).await?;
    let deployment = run(&service, &site, &source, global).await?;

    let live = if args.wait.wait {
        Some(wait_after_deploy(&service, site, &args.wait, global).await?)
    } else {
        None
    };

    let out = output::render_single(
        &global.output,
        &deployment,
        |d| detail(d, live.as_ref()),
        |d| d.info.deploy_id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Run one deploy with a progress display.
pub(super) async fn run(
    service: &SiteService,
    site: &Site,
    source: &DeploySource,
    global: &GlobalOpts,
) -> Result<Deployment, CliError> {
    let (tx, rx) = mpsc::unbounded_channel();
    let progress = DeployProgress::spawn(rx, global.quiet);

    let tracked = service.clone().with_progress(tx);
    let result = tracked.deploy(site, source).await;
    drop(tracked);
    progress.finish().await;

    let deployment = result?;
    let color = output::should_color(&global.color);
    let summary = match source {
        DeploySource::Directory(_) => format!(
            "Deployed {} ({} files, {} uploaded)",
            site.id, deployment.files, deployment.uploaded
        ),
        DeploySource::Archive(path) => {
            format!("Deployed {} to {}", path.display(), site.id)
        }
    };
    output::status(summary, color, global.quiet);
    Ok(deployment)
}

/// Wait for a just-deployed site to go live.
pub(super) async fn wait_after_deploy(
    service: &SiteService,
    site: Site,
    opts: &WaitOpts,
    global: &GlobalOpts,
) -> Result<Site, CliError> {
    // The state fetched before the deploy says nothing about the new one.
    let pending = Site {
        state: String::new(),
        ..site
    };
    wait::until_ready(
        service,
        &pending,
        opts.ready_timeout.map(Duration::from_secs),
        global,
    )
    .await
}

fn detail(d: &Deployment, live: Option<&Site>) -> String {
    let mut pairs = vec![
        ("Site", d.info.id.clone()),
        ("Deploy", d.info.deploy_id.clone()),
    ];
    if d.files > 0 {
        pairs.push(("Files", d.files.to_string()));
        pairs.push(("Uploaded", d.uploaded.to_string()));
    }
    if let Some(site) = live {
        pairs.push(("State", site.state.clone()));
        pairs.push(("URL", site.url.clone()));
    }
    output::detail_lines(&pairs)
}
