//! Terminal progress for deploys and readiness waits.
//!
//! Consumes `DeployEvent`s from the core service on a background task and
//! drives one indicatif bar on stderr:
//!
//! ```text
//! ⠋ Hashing    412 files
//! ⠙ Uploading  [=========>          ] 12/31 css/main.css
//! ⠹ Waiting    site state is now processing
//! ```

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use balloon_core::DeployEvent;

const TICK: Duration = Duration::from_millis(100);

pub struct DeployProgress {
    task: JoinHandle<()>,
}

impl DeployProgress {
    /// Start rendering events from `rx`. Nothing is drawn when `hidden`.
    pub fn spawn(mut rx: mpsc::UnboundedReceiver<DeployEvent>, hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            spinner()
        };

        let task = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                apply(&bar, event);
            }
            bar.finish_and_clear();
        });

        Self { task }
    }

    /// Wait for the renderer to drain. Every sender must be dropped first.
    pub async fn finish(self) {
        let _ = self.task.await;
    }
}

fn apply(bar: &ProgressBar, event: DeployEvent) {
    match event {
        DeployEvent::Fingerprinted { files } => {
            bar.set_prefix("Hashing");
            bar.set_message(format!("{files} files"));
        }
        DeployEvent::DiffComplete { files, uploads } => {
            if uploads == 0 {
                bar.set_prefix("Unchanged");
                bar.set_message(format!("all {files} files already deployed"));
            } else {
                bar.set_style(bar_style());
                bar.set_length(u64::try_from(uploads).unwrap_or(u64::MAX));
                bar.set_position(0);
                bar.set_prefix("Uploading");
            }
        }
        DeployEvent::Uploading { path } => bar.set_message(path),
        DeployEvent::Uploaded { .. } => bar.inc(1),
        DeployEvent::ArchiveSent { deploy_id } => {
            bar.set_prefix("Sent");
            bar.set_message(format!("archive (deploy {deploy_id})"));
        }
        DeployEvent::StateChanged { state } => {
            bar.set_style(spinner_style());
            bar.set_prefix("Waiting");
            bar.set_message(format!("site state is now {state}"));
        }
    }
}

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(spinner_style());
    bar.enable_steady_tick(TICK);
    bar
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix:<10.bold} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} {prefix:<10.bold} [{bar:25.cyan/dim}] {pos}/{len} {msg:.dim}",
    )
    .map_or_else(
        |_| ProgressStyle::default_bar(),
        |style| style.progress_chars("=> "),
    )
}
