//! Site command handlers.

use balloon_core::{ListOptions, Site, SiteParams, SiteService};
use tabled::Tabled;

use crate::cli::{GlobalOpts, SitesArgs, SitesCommand};
use crate::error::CliError;
use crate::output;

use super::{deploy, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&Site> for SiteRow {
    fn from(s: &Site) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            state: s.state.clone(),
            url: s.url.clone(),
            updated: s
                .updated_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Key/value detail view of one site.
pub(super) fn detail(s: &Site, color: bool) -> String {
    output::detail_lines(&[
        ("ID", s.id.clone()),
        ("Name", s.name.clone()),
        ("State", output::paint_state(&s.state, s.is_ready(), color)),
        ("URL", s.url.clone()),
        ("Custom domain", s.custom_domain.clone()),
        ("Admin", s.admin_url.clone()),
        ("Notify", s.notification_email.clone()),
        (
            "Password",
            if s.password.is_empty() {
                String::new()
            } else {
                "****".into()
            },
        ),
        ("Premium", if s.premium { "yes".into() } else { String::new() }),
        (
            "Created",
            s.created_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ),
        (
            "Updated",
            s.updated_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ),
    ])
}

fn print_site(site: &Site, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_single(&global.output, site, |s| detail(s, color), |s| s.id.clone());
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    service: &SiteService,
    args: SitesArgs,
    default_site: Option<&str>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        SitesCommand::List { page, per_page } => {
            let sites = service.list(ListOptions { page, per_page }).await?;
            let out = output::render_list(
                &global.output,
                &sites,
                |s| SiteRow::from(s),
                |s| s.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Get { site } => {
            let id = util::resolve_site_id(site, default_site)?;
            let site = service.get(&id).await?;
            print_site(&site, global);
            Ok(())
        }

        SitesCommand::Create {
            fields,
            dir,
            zip,
            wait,
        } => {
            let params = util::merge_fields(SiteParams::default(), fields);
            let mut site = service.create(&params).await?;
            output::status(format!("Created site {}", site.id), color, global.quiet);

            if let Some(source) = util::deploy_source(dir, zip) {
                deploy::run(service, &site, &source, global).await?;
                if wait.wait {
                    site = deploy::wait_after_deploy(service, site, &wait, global).await?;
                }
            }

            print_site(&site, global);
            Ok(())
        }

        SitesCommand::Update { site, fields } => {
            let id = util::resolve_site_id(site, default_site)?;
            let current = service.get(&id).await?;
            let params = util::merge_fields(current.params(), fields);
            if params == current.params() {
                output::status("Nothing to update", color, global.quiet);
                return Ok(());
            }

            let updated = service.update(&id, &params).await?;
            output::status(format!("Updated site {id}"), color, global.quiet);
            print_site(&updated, global);
            Ok(())
        }

        SitesCommand::Delete { site } => {
            if !util::confirm(
                &format!("Delete site '{site}'? This is destructive."),
                global.yes,
                "sites delete",
            )? {
                return Ok(());
            }
            service.delete(&site).await?;
            output::status(format!("Deleted site {site}"), color, global.quiet);
            Ok(())
        }
    }
}
