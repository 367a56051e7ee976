//! Routes host document-lifecycle events to the owning session.
//!
//! Per URI a document moves `Untracked → Tracked → Untracked`. An open that
//! triggers reclassification takes a side branch instead: the URI is marked
//! pending, the host is asked to reopen it as C++, and it only becomes
//! tracked when that reopen arrives.
//!
//! Everything except the forwarded open runs synchronously with the event
//! that triggered it. The forwarded open waits for session readiness on a
//! spawned task, so tracking state is settled before the send happens.

use std::future::Future;
use std::sync::Arc;

use cxls_workspace::DocumentIdentity;
use cxls_workspace::LanguageId;
use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tower_lsp_server::ls_types::TextEdit;
use tracing::debug;
use tracing::instrument;
use tracing::warn;

use crate::classify;
use crate::classify::ClassificationHeuristic;
use crate::classify::Classification;
use crate::host;
use crate::host::Host;
use crate::registry::ClientRegistry;
use crate::session::Session;

/// Result of [`DocumentLifecycleInterceptor::did_open`].
#[derive(Debug)]
pub enum OpenOutcome {
    /// The document's language is outside the C/C++ family.
    Ignored,
    /// No session claims the document.
    OwnershipUnresolved,
    /// The resolved session declined ownership.
    OwnershipRejected,
    /// The document was already tracked; nothing was done.
    AlreadyTracked,
    /// A reclassification is in flight for this URI; nothing was done.
    PendingReclassification,
    /// The host was asked to reopen the document as C++. No open was
    /// forwarded.
    Reclassified,
    /// The document is tracked and its open is being forwarded once the
    /// session is ready.
    Forwarding(JoinHandle<()>),
    /// No Tokio runtime was available to forward the open; the document was
    /// left untracked.
    NoRuntime,
}

/// Result of [`DocumentLifecycleInterceptor::did_close`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    NotTracked,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    /// Rebind requested; the host has not closed the document yet.
    AwaitingClose,
    /// The host closed the document; the reopen has not arrived yet.
    Closed,
}

pub struct DocumentLifecycleInterceptor {
    registry: Arc<dyn ClientRegistry>,
    host: Arc<dyn Host>,
    heuristic: Arc<dyn ClassificationHeuristic>,
    pending: DashMap<String, Pending>,
}

impl DocumentLifecycleInterceptor {
    pub fn new(
        registry: Arc<dyn ClientRegistry>,
        host: Arc<dyn Host>,
        heuristic: Arc<dyn ClassificationHeuristic>,
    ) -> Self {
        Self {
            registry,
            host,
            heuristic,
            pending: DashMap::new(),
        }
    }

    /// Handles a host open. Safe to call again for the same document.
    ///
    /// Forwarding needs a Tokio runtime; without one the open is dropped and
    /// [`OpenOutcome::NoRuntime`] is returned.
    #[instrument(skip(self, document), fields(uri = document.key(), language = %document.language_id()))]
    pub fn did_open(&self, document: &DocumentIdentity) -> OpenOutcome {
        if !document.language_id().is_cpp_family() {
            self.clear_pending(document);
            return OpenOutcome::Ignored;
        }
        host::mark_cpp_content_present();

        let Some(session) = self.registry.resolve_owner(document.uri()) else {
            debug!("No session owns document");
            self.clear_pending(document);
            return OpenOutcome::OwnershipUnresolved;
        };

        if !self.registry.ownership_accepted(&session, document) {
            debug!(session = session.name(), "Session declined ownership");
            self.clear_pending(document);
            return OpenOutcome::OwnershipRejected;
        }

        let mut insisted_on_c = false;
        if let Some(pending) = self.pending.get(document.key()).map(|entry| *entry) {
            match (pending, document.language_id()) {
                (Pending::AwaitingClose, LanguageId::C) => {
                    debug!("Duplicate open while reclassification is pending");
                    return OpenOutcome::PendingReclassification;
                }
                (Pending::Closed, LanguageId::C) => {
                    debug!("Document reopened as C after reclassification; keeping C");
                    insisted_on_c = true;
                }
                _ => {}
            }
            self.pending.remove(document.key());
        }

        // Insert before any other side effect: a duplicate open arriving
        // from here on sees the document as tracked.
        let tracked = session.tracked_documents();
        if !tracked.insert(document.clone()) {
            debug!(session = session.name(), "Document already tracked");
            return OpenOutcome::AlreadyTracked;
        }

        if !insisted_on_c {
            let hint = self.heuristic.hint(document);
            let has_user_association = self.host.has_user_association(document.basename());
            if let Classification::Reclassify(association) =
                classify::resolve(document, hint, has_user_association)
            {
                debug!(
                    session = session.name(),
                    pattern = %association.pattern,
                    "Reclassifying document as C++"
                );
                let language = association.language.clone();
                tracked.remove(document.key());
                self.pending
                    .insert(document.key().to_string(), Pending::AwaitingClose);
                session.add_file_association(association);
                session.send_settings_changed();
                self.host.set_document_language(document, language);
                return OpenOutcome::Reclassified;
            }
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!(session = session.name(), "No Tokio runtime; open not forwarded");
            tracked.remove(document.key());
            return OpenOutcome::NoRuntime;
        };

        debug!(session = session.name(), "Tracking document");
        let host = Arc::clone(&self.host);
        let document = document.clone();
        OpenOutcome::Forwarding(runtime.spawn(async move {
            forward_open(session, host, document).await;
        }))
    }

    /// Handles a host will-save-wait-until.
    ///
    /// Untracked documents save unmodified without consulting `forward`;
    /// tracked documents get whatever `forward` returns.
    #[instrument(skip(self, document, forward), fields(uri = document.key()))]
    pub async fn will_save_wait_until<F, Fut>(
        &self,
        document: &DocumentIdentity,
        forward: F,
    ) -> Vec<TextEdit>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<TextEdit>>,
    {
        if !self.is_tracked(document) {
            debug!("Document not tracked; accepting save unmodified");
            return Vec::new();
        }
        forward().await
    }

    /// Handles a host close, calling `forward` once if the document was
    /// tracked.
    #[instrument(skip(self, document, forward), fields(uri = document.key()))]
    pub fn did_close<F>(&self, document: &DocumentIdentity, forward: F) -> CloseOutcome
    where
        F: FnOnce(&DocumentIdentity),
    {
        let session = self
            .registry
            .resolve_owner(document.uri())
            .filter(|session| session.tracked_documents().has(document.key()));

        let Some(session) = session else {
            if let Some(mut pending) = self.pending.get_mut(document.key()) {
                debug!("Close for document pending reclassification");
                *pending = Pending::Closed;
            }
            return CloseOutcome::NotTracked;
        };

        session.on_did_close(document);
        session.tracked_documents().remove(document.key());
        forward(document);
        debug!(session = session.name(), "Forwarded close");
        CloseOutcome::Closed
    }

    fn clear_pending(&self, document: &DocumentIdentity) {
        if self.pending.remove(document.key()).is_some() {
            debug!("Dropped pending reclassification");
        }
    }

    fn is_tracked(&self, document: &DocumentIdentity) -> bool {
        self.registry
            .resolve_owner(document.uri())
            .is_some_and(|session| session.tracked_documents().has(document.key()))
    }
}

async fn forward_open(session: Arc<dyn Session>, host: Arc<dyn Host>, document: DocumentIdentity) {
    session.ready().await;

    // The document may have been closed, or closed and reopened, while the
    // session was starting.
    if session.tracked_documents().get(document.key()).as_ref() != Some(&document) {
        debug!(
            session = session.name(),
            uri = document.key(),
            "Document no longer tracked; open not forwarded"
        );
        return;
    }

    if let Err(e) = session.send_did_open(&document).await {
        warn!(session = session.name(), uri = document.key(), error = %e, "Failed to forward open");
    }

    let editors: Vec<_> = host
        .visible_editors()
        .into_iter()
        .filter(|editor| editor.language_id().is_cpp_family())
        .collect();
    if let Err(e) = session.send_visible_editors_changed(editors).await {
        warn!(session = session.name(), error = %e, "Failed to forward visible editors");
    }
}
