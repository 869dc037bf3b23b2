use crate::ignore::is_generated_output;
use std::path::{Path, PathBuf};
use tracing::trace;

/// A change reported by the host for one or more paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    Saved(PathBuf),
    Created(Vec<PathBuf>),
    Deleted(Vec<PathBuf>),
    Renamed(Vec<(PathBuf, PathBuf)>),
}

impl WorkspaceEvent {
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            WorkspaceEvent::Saved(path) => vec![path.as_path()],
            WorkspaceEvent::Created(paths) | WorkspaceEvent::Deleted(paths) => {
                paths.iter().map(PathBuf::as_path).collect()
            }
            WorkspaceEvent::Renamed(pairs) => pairs
                .iter()
                .flat_map(|(from, to)| [from.as_path(), to.as_path()])
                .collect(),
        }
    }
}

/// The set of workspace roots known to the driver.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceSet {
    roots: Vec<PathBuf>,
}

impl WorkspaceSet {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        WorkspaceSet { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Innermost root containing `path`, if any.
    pub fn resolve(&self, path: &Path) -> Option<&Path> {
        self.roots
            .iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .map(PathBuf::as_path)
    }
}

/// Maps an event to the deduplicated list of workspaces that need regenerating.
/// Paths of generated snapshots never trigger a run.
pub fn affected_workspaces(event: &WorkspaceEvent, workspaces: &WorkspaceSet) -> Vec<PathBuf> {
    let mut affected: Vec<PathBuf> = Vec::new();
    for path in event.paths() {
        if is_generated_output(&path.to_string_lossy()) {
            trace!("Ignoring event for generated file {}", path.display());
            continue;
        }
        if let Some(root) = workspaces.resolve(path) {
            if !affected.iter().any(|r| r == root) {
                affected.push(root.to_path_buf());
            }
        }
    }
    affected
}
