use async_trait::async_trait;
use cxls_workspace::DocumentIdentity;
use cxls_workspace::FileAssociation;
use cxls_workspace::TrackedDocuments;
use thiserror::Error;
use tokio::sync::watch;

/// Failure sending a notification to a session.
#[derive(Error, Debug)]
pub enum ForwardError {
    /// The session answered with a JSON-RPC error. The code is carried as
    /// received.
    #[error("{method} rejected by session (code {code}): {message}")]
    Rejected {
        method: &'static str,
        code: i64,
        message: String,
    },
    #[error("transport failure sending {method}")]
    Transport {
        method: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ForwardError {
    /// The JSON-RPC error code, if the session sent one.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            Self::Transport { .. } => None,
        }
    }
}

/// One workspace-scoped analysis session, as seen by the lifecycle
/// middleware.
///
/// Sessions are created and destroyed elsewhere; the middleware only routes
/// documents to them.
#[async_trait]
pub trait Session: Send + Sync {
    /// Human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Documents whose open has been routed to this session.
    fn tracked_documents(&self) -> &TrackedDocuments;

    /// Resolves once the session can accept notifications.
    async fn ready(&self);

    fn add_file_association(&self, association: FileAssociation);

    /// Tells the session its settings (including file associations) changed.
    fn send_settings_changed(&self);

    async fn send_did_open(&self, document: &DocumentIdentity) -> Result<(), ForwardError>;

    async fn send_visible_editors_changed(
        &self,
        editors: Vec<DocumentIdentity>,
    ) -> Result<(), ForwardError>;

    /// Session-internal close bookkeeping, run before the close is forwarded.
    fn on_did_close(&self, document: &DocumentIdentity);
}

/// Single-resolution readiness signal.
///
/// Once resolved it stays resolved; waiters arriving afterwards return
/// immediately.
#[derive(Debug)]
pub struct Readiness {
    sender: watch::Sender<bool>,
}

impl Readiness {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    pub fn resolve(&self) {
        self.sender.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        });
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.sender.borrow()
    }

    pub async fn wait(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives in `self`, so the channel cannot close under us
        let _ = receiver.wait_for(|ready| *ready).await;
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}
