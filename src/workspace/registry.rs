use crate::workspace::{Project, WorkspaceError, uri_to_path};

/// Stable handle into the project arena. Everything that needs to refer to
/// a project holds one of these, never a project reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectId(usize);

/// Ordered list of projects; documents resolve to the first registered
/// project whose root is a path-prefix of theirs.
#[derive(Debug, Default)]
pub struct ProjectRegistry {
    projects: Vec<Project>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, project: Project) -> ProjectId {
        self.projects.push(project);
        ProjectId(self.projects.len() - 1)
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.get(id.0)
    }

    pub fn get_mut(&mut self, id: ProjectId) -> Option<&mut Project> {
        self.projects.get_mut(id.0)
    }

    /// Resolves a document URI to its owning project. Resolution order is
    /// registration order, not longest-prefix-match: the first project
    /// whose root prefixes the document's path wins.
    pub fn find_project_by_document(&self, uri: &str) -> Result<ProjectId, WorkspaceError> {
        let path = uri_to_path(uri);
        self.projects
            .iter()
            .position(|project| path.starts_with(project.root_path()))
            .map(ProjectId)
            .ok_or_else(|| WorkspaceError::ProjectNotFound(uri.to_string()))
    }
}
