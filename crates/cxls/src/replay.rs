//! Drives the lifecycle interceptor from a recorded trace of editor events.
//!
//! The [`ReplayHost`] plays the editor: it remembers which documents are
//! open and honours rebind requests by queueing a close and a reopen. Each
//! [`ReplaySession`] stands in for a language session and writes what it
//! would have sent into a shared outbox.

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use anyhow::Context;
use anyhow::Result;
use async_trait::async_trait;
use camino::Utf8PathBuf;
use cxls_server::classify::ExtensionHeuristic;
use cxls_server::ClientRegistry;
use cxls_server::DocumentLifecycleInterceptor;
use cxls_server::ForwardError;
use cxls_server::Host;
use cxls_server::OpenOutcome;
use cxls_server::Readiness;
use cxls_server::Session;
use cxls_server::WorkspaceRegistry;
use cxls_workspace::DocumentIdentity;
use cxls_workspace::FileAssociation;
use cxls_workspace::FileAssociations;
use cxls_workspace::LanguageId;
use cxls_workspace::TrackedDocuments;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc;
use tower_lsp_server::ls_types::Uri;

/// One line of a trace file.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TraceEvent {
    Open { uri: String, language: String },
    WillSave { uri: String },
    Close { uri: String },
}

/// Parses a JSON-lines trace, skipping blank lines.
pub fn parse_trace(text: &str) -> Result<Vec<TraceEvent>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Malformed trace event on line {}", index + 1))
        })
        .collect()
}

/// A message a session would have put on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct Forwarded {
    pub session: String,
    pub method: &'static str,
    pub params: serde_json::Value,
}

type Outbox = mpsc::UnboundedSender<Forwarded>;

fn post(outbox: &Outbox, message: Forwarded) -> Result<(), ForwardError> {
    let method = message.method;
    outbox.send(message).map_err(|e| ForwardError::Transport {
        method,
        source: anyhow::anyhow!("outbox closed: {e}"),
    })
}

pub struct ReplaySession {
    name: String,
    tracked: TrackedDocuments,
    readiness: Readiness,
    associations: FileAssociations,
    outbox: Outbox,
}

impl ReplaySession {
    pub fn new(name: impl Into<String>, outbox: Outbox) -> Self {
        let readiness = Readiness::new();
        readiness.resolve();
        Self {
            name: name.into(),
            tracked: TrackedDocuments::new(),
            readiness,
            associations: FileAssociations::new(),
            outbox,
        }
    }
}

#[async_trait]
impl Session for ReplaySession {
    fn name(&self) -> &str {
        &self.name
    }

    fn tracked_documents(&self) -> &TrackedDocuments {
        &self.tracked
    }

    async fn ready(&self) {
        self.readiness.wait().await;
    }

    fn add_file_association(&self, association: FileAssociation) {
        self.associations.add(association);
    }

    fn send_settings_changed(&self) {
        let message = Forwarded {
            session: self.name.clone(),
            method: "workspace/didChangeConfiguration",
            params: json!({ "settings": { "files.associations": self.associations.to_map() } }),
        };
        if let Err(e) = post(&self.outbox, message) {
            tracing::warn!(session = %self.name, error = %e, "Failed to send settings");
        }
    }

    async fn send_did_open(&self, document: &DocumentIdentity) -> Result<(), ForwardError> {
        post(
            &self.outbox,
            Forwarded {
                session: self.name.clone(),
                method: "textDocument/didOpen",
                params: json!({
                    "textDocument": {
                        "uri": document.key(),
                        "languageId": document.language_id().as_str(),
                    }
                }),
            },
        )
    }

    async fn send_visible_editors_changed(
        &self,
        editors: Vec<DocumentIdentity>,
    ) -> Result<(), ForwardError> {
        let uris: Vec<&str> = editors.iter().map(DocumentIdentity::key).collect();
        post(
            &self.outbox,
            Forwarded {
                session: self.name.clone(),
                method: "cpptools/didChangeVisibleTextEditors",
                params: json!({ "visibleTextEditors": uris }),
            },
        )
    }

    fn on_did_close(&self, document: &DocumentIdentity) {
        tracing::debug!(session = %self.name, uri = document.key(), "Session closing document");
    }
}

/// Editor stand-in for a replay.
pub struct ReplayHost {
    settings: cxls_conf::Settings,
    open: Mutex<BTreeMap<String, DocumentIdentity>>,
    rebinds: mpsc::UnboundedSender<(DocumentIdentity, LanguageId)>,
}

impl ReplayHost {
    fn open_documents(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, DocumentIdentity>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn did_open(&self, document: &DocumentIdentity) {
        self.open_documents()
            .insert(document.key().to_string(), document.clone());
    }

    fn did_close(&self, uri: &str) -> Option<DocumentIdentity> {
        self.open_documents().remove(uri)
    }

    fn document(&self, uri: &str) -> Option<DocumentIdentity> {
        self.open_documents().get(uri).cloned()
    }
}

impl Host for ReplayHost {
    fn has_user_association(&self, basename: &str) -> bool {
        self.settings.has_file_association(basename)
    }

    fn set_document_language(&self, document: &DocumentIdentity, language: LanguageId) {
        if self.rebinds.send((document.clone(), language)).is_err() {
            tracing::warn!(uri = document.key(), "Replay finished; dropping rebind");
        }
    }

    fn visible_editors(&self) -> Vec<DocumentIdentity> {
        self.open_documents().values().cloned().collect()
    }
}

enum Step {
    Open(DocumentIdentity),
    WillSave(Uri),
    Close(Uri),
}

fn parse_uri(uri: &str) -> Result<Uri> {
    uri.parse()
        .map_err(|e| anyhow::anyhow!("Invalid URI `{uri}`: {e:?}"))
}

impl TryFrom<TraceEvent> for Step {
    type Error = anyhow::Error;

    fn try_from(event: TraceEvent) -> Result<Self> {
        Ok(match event {
            TraceEvent::Open { uri, language } => {
                Step::Open(DocumentIdentity::from_uri(parse_uri(&uri)?, language))
            }
            TraceEvent::WillSave { uri } => Step::WillSave(parse_uri(&uri)?),
            TraceEvent::Close { uri } => Step::Close(parse_uri(&uri)?),
        })
    }
}

pub struct Replay {
    registry: Arc<WorkspaceRegistry>,
    host: Arc<ReplayHost>,
    interceptor: DocumentLifecycleInterceptor,
    outbox: Outbox,
    inbox: mpsc::UnboundedReceiver<Forwarded>,
    rebinds: mpsc::UnboundedReceiver<(DocumentIdentity, LanguageId)>,
}

impl Replay {
    /// Sets up one session per workspace root plus a default session.
    pub fn new(workspaces: &[Utf8PathBuf], settings: cxls_conf::Settings) -> Self {
        let (outbox, inbox) = mpsc::unbounded_channel();
        let (rebind_tx, rebinds) = mpsc::unbounded_channel();

        let registry = Arc::new(WorkspaceRegistry::new());
        for root in workspaces {
            let session = ReplaySession::new(root.as_str(), outbox.clone());
            registry.add_session(root.clone(), Arc::new(session));
        }
        registry.set_fallback(Some(Arc::new(ReplaySession::new("default", outbox.clone()))));

        let heuristic = Arc::new(ExtensionHeuristic::from_settings(&settings));
        let host = Arc::new(ReplayHost {
            settings,
            open: Mutex::new(BTreeMap::new()),
            rebinds: rebind_tx,
        });
        let interceptor = DocumentLifecycleInterceptor::new(
            Arc::clone(&registry) as Arc<dyn ClientRegistry>,
            Arc::clone(&host) as Arc<dyn Host>,
            heuristic,
        );

        Self {
            registry,
            host,
            interceptor,
            outbox,
            inbox,
            rebinds,
        }
    }

    /// Feeds `events` through the interceptor, calling `emit` for every
    /// forwarded message in order.
    pub async fn run(
        &mut self,
        events: Vec<TraceEvent>,
        mut emit: impl FnMut(&Forwarded) -> Result<()>,
    ) -> Result<()> {
        let mut queue = events
            .into_iter()
            .map(Step::try_from)
            .collect::<Result<VecDeque<_>>>()?;

        while let Some(step) = queue.pop_front() {
            self.step(step).await;

            while let Ok((document, language)) = self.rebinds.try_recv() {
                queue.push_front(Step::Open(document.reopened_as(language)));
                queue.push_front(Step::Close(document.uri().clone()));
            }

            while let Ok(message) = self.inbox.try_recv() {
                emit(&message)?;
            }
        }

        Ok(())
    }

    async fn step(&self, step: Step) {
        match step {
            Step::Open(document) => {
                self.host.did_open(&document);
                if let OpenOutcome::Forwarding(handle) = self.interceptor.did_open(&document) {
                    if let Err(e) = handle.await {
                        tracing::warn!(uri = document.key(), error = %e, "Open forwarding task failed");
                    }
                }
            }
            Step::WillSave(uri) => {
                let document = self.identity(&uri);
                let session = self.owner_name(&uri);
                let outbox = self.outbox.clone();
                self.interceptor
                    .will_save_wait_until(&document, || async move {
                        let message = Forwarded {
                            session,
                            method: "textDocument/willSaveWaitUntil",
                            params: json!({ "textDocument": { "uri": uri.as_str() } }),
                        };
                        if let Err(e) = post(&outbox, message) {
                            tracing::warn!(error = %e, "Failed to forward will-save");
                        }
                        Vec::new()
                    })
                    .await;
            }
            Step::Close(uri) => {
                let document = self.identity(&uri);
                self.host.did_close(uri.as_str());
                let session = self.owner_name(&uri);
                self.interceptor.did_close(&document, |closed| {
                    let message = Forwarded {
                        session,
                        method: "textDocument/didClose",
                        params: json!({ "textDocument": { "uri": closed.key() } }),
                    };
                    if let Err(e) = post(&self.outbox, message) {
                        tracing::warn!(error = %e, "Failed to forward close");
                    }
                });
            }
        }
    }

    /// The identity the host holds for `uri`, or a bare one if it is not open.
    fn identity(&self, uri: &Uri) -> DocumentIdentity {
        self.host
            .document(uri.as_str())
            .unwrap_or_else(|| DocumentIdentity::from_uri(uri.clone(), "plaintext"))
    }

    fn owner_name(&self, uri: &Uri) -> String {
        self.registry
            .resolve_owner(uri)
            .map(|session| session.name().to_string())
            .unwrap_or_default()
    }
}
