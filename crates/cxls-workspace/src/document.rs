use camino::Utf8Path;
use camino::Utf8PathBuf;
use tower_lsp_server::ls_types::Uri;

use crate::paths::uri_path_lossy;
use crate::LanguageId;

/// Host-produced identity of an open document.
///
/// Identities are never changed in place: a document whose declared language
/// changes is closed and reopened by the host, producing a new identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentIdentity {
    uri: Uri,
    language_id: LanguageId,
    path: Utf8PathBuf,
    basename: String,
}

impl DocumentIdentity {
    pub fn new(uri: Uri, language_id: impl Into<LanguageId>, path: Utf8PathBuf) -> Self {
        let basename = path.file_name().unwrap_or_default().to_string();
        Self {
            uri,
            language_id: language_id.into(),
            path,
            basename,
        }
    }

    /// Builds an identity whose path is derived from the URI.
    pub fn from_uri(uri: Uri, language_id: impl Into<LanguageId>) -> Self {
        let path = uri_path_lossy(&uri);
        Self::new(uri, language_id, path)
    }

    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Key used by every URI-indexed collection.
    #[must_use]
    pub fn key(&self) -> &str {
        self.uri.as_str()
    }

    #[must_use]
    pub fn language_id(&self) -> &LanguageId {
        &self.language_id
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    #[must_use]
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// The identity the host produces when it reopens this document under
    /// another language.
    #[must_use]
    pub fn reopened_as(&self, language_id: LanguageId) -> Self {
        Self {
            language_id,
            ..self.clone()
        }
    }
}
