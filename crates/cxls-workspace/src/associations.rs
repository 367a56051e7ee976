use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::DocumentIdentity;
use crate::LanguageId;

/// Session-scoped override mapping a file pattern to a language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileAssociation {
    pub pattern: String,
    pub language: LanguageId,
}

impl FileAssociation {
    pub fn new(pattern: impl Into<String>, language: LanguageId) -> Self {
        Self {
            pattern: pattern.into(),
            language,
        }
    }

    /// The `basename@path` override pinning a single document to `language`.
    #[must_use]
    pub fn for_document(document: &DocumentIdentity, language: LanguageId) -> Self {
        Self::new(
            format!("{}@{}", document.basename(), document.path()),
            language,
        )
    }
}

/// Overrides a session has accumulated, at most one per pattern.
#[derive(Clone, Debug, Default)]
pub struct FileAssociations {
    inner: Arc<DashMap<String, LanguageId>>,
}

impl FileAssociations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an override; an existing entry for the same pattern wins.
    ///
    /// Returns `true` if the override was added.
    pub fn add(&self, association: FileAssociation) -> bool {
        match self.inner.entry(association.pattern) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(association.language);
                true
            }
        }
    }

    #[must_use]
    pub fn get(&self, pattern: &str) -> Option<LanguageId> {
        self.inner.get(pattern).map(|entry| entry.value().clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Pattern → language table in the shape sent with a settings change.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.inner
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().to_string()))
            .collect()
    }
}
