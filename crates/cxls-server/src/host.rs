use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use cxls_workspace::DocumentIdentity;
use cxls_workspace::LanguageId;

static CPP_CONTENT_PRESENT: AtomicBool = AtomicBool::new(false);

/// Records that at least one C/C++ document has been opened in this process.
pub fn mark_cpp_content_present() {
    CPP_CONTENT_PRESENT.store(true, Ordering::Relaxed);
}

#[must_use]
pub fn cpp_content_present() -> bool {
    CPP_CONTENT_PRESENT.load(Ordering::Relaxed)
}

/// Editor primitives the lifecycle middleware calls back into.
pub trait Host: Send + Sync {
    /// Whether the user has associated `basename` with a language.
    fn has_user_association(&self, basename: &str) -> bool;

    /// Changes the declared language of an open document. The host closes
    /// the document and reopens it under `language`.
    fn set_document_language(&self, document: &DocumentIdentity, language: LanguageId);

    /// Documents shown in currently visible editors.
    fn visible_editors(&self) -> Vec<DocumentIdentity>;
}
