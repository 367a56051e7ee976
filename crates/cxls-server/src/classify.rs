//! Decides whether a document opened as C should be reopened as C++.
//!
//! Editors tag `.C` and `.H` files as C even though those extensions are
//! conventionally C++. [`resolve`] is the pure decision; the caller performs
//! every effect (association append, settings change, rebind).

use cxls_workspace::DocumentIdentity;
use cxls_workspace::FileAssociation;
use cxls_workspace::LanguageId;

/// What a content or name heuristic concluded about a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hint {
    /// The document looks like C++.
    CppLike,
    Inconclusive,
}

/// Outcome of [`resolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Pin the document to C++ with this association, then rebind it.
    Reclassify(FileAssociation),
    /// Leave the declared language alone.
    Defer,
}

/// Supplies the [`Hint`] for a document.
pub trait ClassificationHeuristic: Send + Sync {
    fn hint(&self, document: &DocumentIdentity) -> Hint;
}

/// Name-based heuristic: upper-case `.C` and `.H` files are C++.
#[derive(Clone, Copy, Debug)]
pub struct ExtensionHeuristic {
    enabled: bool,
}

impl ExtensionHeuristic {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    #[must_use]
    pub fn from_settings(settings: &cxls_conf::Settings) -> Self {
        Self::new(settings.auto_add_file_associations)
    }
}

impl Default for ExtensionHeuristic {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ClassificationHeuristic for ExtensionHeuristic {
    fn hint(&self, document: &DocumentIdentity) -> Hint {
        let path = document.path().as_str();
        if self.enabled && (path.ends_with(".C") || path.ends_with(".H")) {
            Hint::CppLike
        } else {
            Hint::Inconclusive
        }
    }
}

/// Chooses between reclassifying `document` as C++ and deferring.
///
/// Reclassifies only a document declared as C, hinted as C++, whose basename
/// the user has not associated with a language.
#[must_use]
pub fn resolve(document: &DocumentIdentity, hint: Hint, has_user_association: bool) -> Classification {
    if *document.language_id() != LanguageId::C || hint != Hint::CppLike {
        return Classification::Defer;
    }

    if has_user_association {
        tracing::debug!(
            basename = document.basename(),
            "User association exists; keeping declared language"
        );
        return Classification::Defer;
    }

    Classification::Reclassify(FileAssociation::for_document(document, LanguageId::Cpp))
}
