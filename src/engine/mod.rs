//! Seam to the semantic analysis engine.
//!
//! The engine itself is an external collaborator; the server only consumes
//! this narrow query surface and feeds the engine a view of the owning
//! project's tracked files and versions.

use tracing::debug;

/// Project-side surface consumed by an engine: the tracked script files and
/// their version counters.
pub trait ScriptHost {
    fn script_files(&self) -> Vec<String>;
    fn script_version(&self, script_file: &str) -> anyhow::Result<u32>;
}

/// Short textual summary of whatever sits at a source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickInfo {
    /// Display parts in render order; the server concatenates them.
    pub display_parts: Vec<String>,
}

/// One engine instance is bound 1:1 to a project at initialize time and
/// queried in-process; calls block the dispatch loop by design.
pub trait AnalysisEngine: Send {
    /// Quick-info at a flat offset into a tracked script file, or `None`
    /// when the position holds nothing describable.
    fn quick_info_at(
        &self,
        host: &dyn ScriptHost,
        script_file: &str,
        offset: usize,
    ) -> anyhow::Result<Option<QuickInfo>>;
}

/// Builds the engine instance for a freshly registered project.
pub type EngineFactory = Box<dyn Fn(&dyn ScriptHost) -> anyhow::Result<Box<dyn AnalysisEngine>> + Send>;

/// Placeholder engine wired by the binary: answers every query with "no
/// information". Real analyzers are injected through the factory seam.
pub struct NoopEngine;

impl AnalysisEngine for NoopEngine {
    fn quick_info_at(
        &self,
        _host: &dyn ScriptHost,
        script_file: &str,
        offset: usize,
    ) -> anyhow::Result<Option<QuickInfo>> {
        debug!(script_file, offset, "noop engine has no quick-info");
        Ok(None)
    }
}

pub fn noop_factory() -> EngineFactory {
    Box::new(|_host| Ok(Box::new(NoopEngine)))
}
