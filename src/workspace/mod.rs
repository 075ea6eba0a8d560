// Project and document bookkeeping
// - project.rs: script-file identity and version registry for one root
// - registry.rs: routes documents to their owning project by path prefix
// - document.rs: open text documents and the store keyed by URI
// - scan.rs: initial top-level source-file scan of a workspace root
pub mod document;
pub mod project;
pub mod registry;
pub mod scan;

pub use document::{DocumentStore, TextDocument};
pub use project::Project;
pub use registry::{ProjectId, ProjectRegistry};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("no version tracked for script file: {0}")]
    UnknownScriptFile(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),
}

/// Strips the `file://` scheme from a document URI, leaving the local path.
pub fn uri_to_path(uri: &str) -> &str {
    uri.strip_prefix("file://").unwrap_or(uri)
}
