// ── Deploy progress events ──
//
// Optional structured progress for long deploys. Errors still carry only
// the first failure; these events are how a caller learns that 12 of 40
// files went up before it happened.

use tokio::sync::mpsc;

/// One step of a deploy or readiness wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// The local tree was fingerprinted.
    Fingerprinted { files: usize },
    /// The server answered the manifest; `uploads` files must be sent.
    DiffComplete { files: usize, uploads: usize },
    /// An upload started.
    Uploading { path: String },
    /// An upload finished.
    Uploaded { path: String },
    /// The archive request completed.
    ArchiveSent { deploy_id: String },
    /// A readiness poll observed a new site state.
    StateChanged { state: String },
}

/// Fire-and-forget sender; a dropped receiver is not an error.
#[derive(Debug, Clone, Default)]
pub(crate) struct Progress {
    tx: Option<mpsc::UnboundedSender<DeployEvent>>,
}

impl Progress {
    pub(crate) fn new(tx: Option<mpsc::UnboundedSender<DeployEvent>>) -> Self {
        Self { tx }
    }

    pub(crate) fn emit(&self, event: DeployEvent) {
        if let Some(ref tx) = self.tx {
            let _ = tx.send(event);
        }
    }
}
