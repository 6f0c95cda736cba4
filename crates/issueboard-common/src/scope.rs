//! Scope identifiers: which module, cycle, project or view owns a filter record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Workspace pseudo-views whose filters live in local persistence.
pub const VIRTUAL_VIEWS: [&str; 4] = ["all-issues", "assigned", "created", "subscribed"];

pub fn is_virtual_view(scope: &str) -> bool {
    VIRTUAL_VIEWS.contains(&scope)
}

/// Kind of scope a filter store serves. Selects the backing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Project,
    Module,
    Cycle,
    ProjectView,
    WorkspaceView,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Module => "module",
            Self::Cycle => "cycle",
            Self::ProjectView => "project_view",
            Self::WorkspaceView => "workspace_view",
        }
    }

    /// Whether scopes of this kind live under a project.
    pub fn requires_project(&self) -> bool {
        !matches!(self, Self::WorkspaceView)
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScopeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(Self::Project),
            "module" => Ok(Self::Module),
            "cycle" => Ok(Self::Cycle),
            "project_view" | "project-view" => Ok(Self::ProjectView),
            "workspace_view" | "workspace-view" => Ok(Self::WorkspaceView),
            _ => Err(format!("Invalid scope kind: {}", s)),
        }
    }
}

/// Location of one scope: the workspace, the owning project (if any) and the
/// scope identifier used as the store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeRef {
    pub workspace: String,
    pub project: Option<String>,
    pub scope: String,
}

impl ScopeRef {
    pub fn new(workspace: &str, project: Option<&str>, scope: &str) -> Self {
        Self {
            workspace: workspace.to_string(),
            project: project.map(str::to_string),
            scope: scope.to_string(),
        }
    }

    /// A scope nested in a project (module, cycle, project view).
    pub fn in_project(workspace: &str, project: &str, scope: &str) -> Self {
        Self::new(workspace, Some(project), scope)
    }

    /// A project scope: the project id is also the scope key.
    pub fn project(workspace: &str, project: &str) -> Self {
        Self::new(workspace, Some(project), project)
    }

    /// A workspace-level view (saved or virtual).
    pub fn workspace_view(workspace: &str, view: &str) -> Self {
        Self::new(workspace, None, view)
    }

    pub fn is_virtual_view(&self) -> bool {
        is_virtual_view(&self.scope)
    }

    pub fn has_scope(&self) -> bool {
        !self.scope.trim().is_empty()
    }
}

impl fmt::Display for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.project {
            Some(project) => write!(f, "{}/{}/{}", self.workspace, project, self.scope),
            None => write!(f, "{}/{}", self.workspace, self.scope),
        }
    }
}

/// How an issue collection re-fetch should present itself to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchMode {
    InitLoader,
    Mutation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_views() {
        assert!(ScopeRef::workspace_view("acme", "all-issues").is_virtual_view());
        assert!(ScopeRef::workspace_view("acme", "subscribed").is_virtual_view());
        assert!(!ScopeRef::workspace_view("acme", "9f1c").is_virtual_view());
    }

    #[test]
    fn test_scope_kind_accepts_both_separators() {
        assert_eq!("workspace-view".parse::<ScopeKind>().unwrap(), ScopeKind::WorkspaceView);
        assert_eq!("project_view".parse::<ScopeKind>().unwrap(), ScopeKind::ProjectView);
        assert!("team".parse::<ScopeKind>().is_err());
    }

    #[test]
    fn test_scope_ref_display() {
        assert_eq!(ScopeRef::in_project("acme", "p1", "m1").to_string(), "acme/p1/m1");
        assert_eq!(ScopeRef::workspace_view("acme", "assigned").to_string(), "acme/assigned");
        assert!(!ScopeRef::workspace_view("acme", "  ").has_scope());
    }
}
