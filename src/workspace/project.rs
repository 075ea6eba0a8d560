use std::collections::HashMap;

use indexmap::IndexSet;

use crate::engine::ScriptHost;
use crate::workspace::WorkspaceError;

/// File-identity and version registry for one workspace root.
///
/// Every stored path is root-relative: the root prefix and a single leading
/// separator are stripped on entry and on every query, so callers may pass
/// either form interchangeably.
#[derive(Debug)]
pub struct Project {
    root_path: String,
    script_files: IndexSet<String>,
    versions: HashMap<String, u32>,
}

impl Project {
    pub fn new(root_path: impl Into<String>, script_files: Vec<String>) -> Self {
        let mut project = Self {
            root_path: root_path.into(),
            script_files: IndexSet::new(),
            versions: HashMap::new(),
        };
        for file in script_files {
            project.add_script_file(&file);
        }
        project
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Tracked files in insertion order, root-relative.
    pub fn script_files(&self) -> impl Iterator<Item = &str> {
        self.script_files.iter().map(String::as_str)
    }

    /// No-op when the normalized path is already tracked; order of the
    /// existing entries never changes.
    pub fn add_script_file(&mut self, script_file: &str) {
        let script_file = self.normalize(script_file);
        if self.script_files.insert(script_file.clone()) {
            self.versions.insert(script_file, 0);
        }
    }

    /// No-op when the normalized path is not tracked. Removal preserves the
    /// insertion order of the remaining entries.
    pub fn remove_script_file(&mut self, script_file: &str) {
        let script_file = self.normalize(script_file);
        if self.script_files.shift_remove(&script_file) {
            self.versions.remove(&script_file);
        }
    }

    pub fn has_script_file(&self, script_file: &str) -> bool {
        self.script_files.contains(&self.normalize(script_file))
    }

    /// Version counter for a tracked file. Querying an unknown file is a
    /// contract violation, not a soft default.
    pub fn version_for(&self, script_file: &str) -> Result<u32, WorkspaceError> {
        let script_file = self.normalize(script_file);
        self.versions
            .get(&script_file)
            .copied()
            .ok_or(WorkspaceError::UnknownScriptFile(script_file))
    }

    /// Root-relative form of a path. Normalizing an already-relative path
    /// is a no-op.
    pub fn normalize(&self, script_file: &str) -> String {
        let stripped = script_file.strip_prefix(&self.root_path).unwrap_or(script_file);
        stripped.strip_prefix('/').unwrap_or(stripped).to_string()
    }
}

impl ScriptHost for Project {
    fn script_files(&self) -> Vec<String> {
        self.script_files.iter().cloned().collect()
    }

    fn script_version(&self, script_file: &str) -> anyhow::Result<u32> {
        Ok(self.version_for(script_file)?)
    }
}
