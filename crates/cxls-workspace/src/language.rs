use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Language tag declared by the host for an open document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LanguageId {
    C,
    Cpp,
    CudaCpp,
    Other(String),
}

impl LanguageId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::CudaCpp => "cuda-cpp",
            Self::Other(tag) => tag,
        }
    }

    /// Whether documents in this language are routed to a session at all.
    #[must_use]
    pub fn is_cpp_family(&self) -> bool {
        matches!(self, Self::C | Self::Cpp | Self::CudaCpp)
    }
}

impl From<&str> for LanguageId {
    fn from(language_id: &str) -> Self {
        match language_id {
            "c" => Self::C,
            "cpp" => Self::Cpp,
            "cuda-cpp" => Self::CudaCpp,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for LanguageId {
    fn from(language_id: String) -> Self {
        Self::from(language_id.as_str())
    }
}

impl From<LanguageId> for String {
    fn from(language_id: LanguageId) -> Self {
        match language_id {
            LanguageId::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
