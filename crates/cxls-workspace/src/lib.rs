//! Document-side types shared by the lifecycle middleware.
//!
//! [`DocumentIdentity`] is what the host hands us on every lifecycle event,
//! [`TrackedDocuments`] is the per-session record of routed documents, and
//! [`FileAssociations`] holds the language overrides a session accumulates.

mod associations;
mod document;
mod language;
pub mod paths;
mod tracked;

pub use associations::FileAssociation;
pub use associations::FileAssociations;
pub use document::DocumentIdentity;
pub use language::LanguageId;
pub use tracked::TrackedDocuments;
