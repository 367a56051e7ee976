use std::sync::Arc;
use std::sync::RwLock;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use cxls_workspace::paths::uri_to_path;
use cxls_workspace::DocumentIdentity;
use dashmap::DashMap;
use tower_lsp_server::ls_types::Uri;

use crate::session::Session;

/// Resolves which session owns a document.
pub trait ClientRegistry: Send + Sync {
    /// The session responsible for `uri`, if any.
    fn resolve_owner(&self, uri: &Uri) -> Option<Arc<dyn Session>>;

    /// Whether `session` may take ownership of `document`.
    fn ownership_accepted(&self, session: &Arc<dyn Session>, document: &DocumentIdentity) -> bool;
}

/// Multi-root registry: one session per workspace root, plus an optional
/// default session for files outside every root.
#[derive(Default)]
pub struct WorkspaceRegistry {
    roots: DashMap<Utf8PathBuf, Arc<dyn Session>>,
    fallback: RwLock<Option<Arc<dyn Session>>>,
}

impl WorkspaceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `session` for documents under `root`, replacing any session
    /// previously registered for the same root.
    pub fn add_session(&self, root: impl Into<Utf8PathBuf>, session: Arc<dyn Session>) {
        let root = root.into();
        tracing::debug!(%root, session = session.name(), "Registering session");
        self.roots.insert(root, session);
    }

    pub fn remove_session(&self, root: &Utf8Path) -> Option<Arc<dyn Session>> {
        self.roots.remove(root).map(|(_, session)| session)
    }

    pub fn set_fallback(&self, session: Option<Arc<dyn Session>>) {
        match self.fallback.write() {
            Ok(mut fallback) => *fallback = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }

    fn fallback(&self) -> Option<Arc<dyn Session>> {
        match self.fallback.read() {
            Ok(fallback) => fallback.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    #[must_use]
    pub fn sessions(&self) -> Vec<Arc<dyn Session>> {
        let mut sessions: Vec<_> = self
            .roots
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        sessions.extend(self.fallback());
        sessions
    }
}

impl ClientRegistry for WorkspaceRegistry {
    fn resolve_owner(&self, uri: &Uri) -> Option<Arc<dyn Session>> {
        let owner = uri_to_path(uri).and_then(|path| {
            self.roots
                .iter()
                .filter(|entry| path.starts_with(entry.key()))
                .max_by_key(|entry| entry.key().components().count())
                .map(|entry| Arc::clone(entry.value()))
        });

        owner.or_else(|| self.fallback())
    }

    fn ownership_accepted(&self, session: &Arc<dyn Session>, document: &DocumentIdentity) -> bool {
        self.resolve_owner(document.uri())
            .is_some_and(|owner| Arc::ptr_eq(&owner, session))
    }
}
