//! Backing services for filter records, and the issue re-fetch hook.
//!
//! ```text
//!              FilterStore
//!                  │ fetch / patch
//!                  v
//!            FilterBackend ── Remote ─────────> RemoteFilterService (http.rs)
//!                  │
//!                  └── WorkspaceViews ─ virtual view ─> LocalFilterShim (local.rs)
//!                                     └ saved view ───> RemoteFilterService
//! ```
//!
//! The backend variant is picked once, when the store is built for a scope
//! kind. Test doubles implement the traits directly. Local shim calls do
//! file I/O, so they run on the blocking pool.

pub mod http;
pub mod local;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use issueboard_common::{FetchMode, FilterPatchBody, RawIssueFilters, ScopeKind, ScopeRef};

pub use http::HttpFilterService;
pub use local::JsonFileFilterShim;

/// Server-side filter storage for one scope kind.
#[async_trait]
pub trait RemoteFilterService: Send + Sync {
    async fn fetch(&self, scope: &ScopeRef) -> Result<RawIssueFilters>;

    /// Persist one record. The body carries exactly one of the three sections.
    async fn patch(&self, scope: &ScopeRef, body: &FilterPatchBody) -> Result<()>;
}

/// Client-side filter storage for workspace virtual views.
pub trait LocalFilterShim: Send + Sync {
    fn get(
        &self,
        store: ScopeKind,
        workspace: &str,
        project: Option<&str>,
        view: &str,
    ) -> Result<RawIssueFilters>;

    fn set(
        &self,
        store: ScopeKind,
        workspace: &str,
        project: Option<&str>,
        view: &str,
        body: &FilterPatchBody,
    ) -> Result<()>;
}

/// Re-fetch of an issue collection after its filters changed.
#[async_trait]
pub trait IssueRefetch: Send + Sync {
    async fn fetch_issues(&self, scope: &ScopeRef, mode: FetchMode) -> Result<()>;
}

/// Where a store reads and writes its records.
#[derive(Clone)]
pub enum FilterBackend {
    /// Every scope is server-backed (projects, modules, cycles, project views).
    Remote(Arc<dyn RemoteFilterService>),
    /// Virtual views go to the local shim, saved views to the server.
    WorkspaceViews {
        local: Arc<dyn LocalFilterShim>,
        remote: Arc<dyn RemoteFilterService>,
    },
}

impl FilterBackend {
    pub async fn fetch(&self, scope: &ScopeRef) -> Result<RawIssueFilters> {
        match self {
            Self::Remote(remote) => remote.fetch(scope).await,
            Self::WorkspaceViews { local, remote } => {
                if scope.is_virtual_view() {
                    let local = Arc::clone(local);
                    let scope = scope.clone();
                    tokio::task::spawn_blocking(move || {
                        local.get(
                            ScopeKind::WorkspaceView,
                            &scope.workspace,
                            scope.project.as_deref(),
                            &scope.scope,
                        )
                    })
                    .await
                    .context("Local filter read task failed")?
                } else {
                    remote.fetch(scope).await
                }
            }
        }
    }

    pub async fn patch(&self, scope: &ScopeRef, body: &FilterPatchBody) -> Result<()> {
        match self {
            Self::Remote(remote) => remote.patch(scope, body).await,
            Self::WorkspaceViews { local, remote } => {
                if scope.is_virtual_view() {
                    let local = Arc::clone(local);
                    let scope = scope.clone();
                    let body = body.clone();
                    tokio::task::spawn_blocking(move || {
                        local.set(
                            ScopeKind::WorkspaceView,
                            &scope.workspace,
                            scope.project.as_deref(),
                            &scope.scope,
                            &body,
                        )
                    })
                    .await
                    .context("Local filter write task failed")?
                } else {
                    remote.patch(scope, body).await
                }
            }
        }
    }

    /// `"local"` or `"remote"`, for log fields.
    pub fn target(&self, scope: &ScopeRef) -> &'static str {
        match self {
            Self::WorkspaceViews { .. } if scope.is_virtual_view() => "local",
            _ => "remote",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use issueboard_common::DisplayProperties;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::ThreadId;

    #[derive(Default)]
    struct CountingRemote {
        fetches: AtomicUsize,
        patches: AtomicUsize,
    }

    #[async_trait]
    impl RemoteFilterService for CountingRemote {
        async fn fetch(&self, _scope: &ScopeRef) -> Result<RawIssueFilters> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(RawIssueFilters::default())
        }

        async fn patch(&self, _scope: &ScopeRef, _body: &FilterPatchBody) -> Result<()> {
            self.patches.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingShim {
        calls: Mutex<Vec<String>>,
        threads: Mutex<Vec<ThreadId>>,
    }

    impl LocalFilterShim for RecordingShim {
        fn get(
            &self,
            store: ScopeKind,
            workspace: &str,
            _project: Option<&str>,
            view: &str,
        ) -> Result<RawIssueFilters> {
            self.threads.lock().unwrap().push(std::thread::current().id());
            self.calls
                .lock()
                .unwrap()
                .push(format!("get {} {} {}", store, workspace, view));
            Ok(RawIssueFilters::default())
        }

        fn set(
            &self,
            store: ScopeKind,
            workspace: &str,
            _project: Option<&str>,
            view: &str,
            body: &FilterPatchBody,
        ) -> Result<()> {
            self.threads.lock().unwrap().push(std::thread::current().id());
            self.calls.lock().unwrap().push(format!(
                "set {} {} {} {}",
                store,
                workspace,
                view,
                body.kind()
            ));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_workspace_backend_routes_virtual_views_locally() {
        let local = Arc::new(RecordingShim::default());
        let remote = Arc::new(CountingRemote::default());
        let backend = FilterBackend::WorkspaceViews {
            local: local.clone(),
            remote: remote.clone(),
        };

        let virtual_view = ScopeRef::workspace_view("acme", "assigned");
        let saved_view = ScopeRef::workspace_view("acme", "view-42");
        backend.fetch(&virtual_view).await.unwrap();
        backend.fetch(&saved_view).await.unwrap();
        let body = FilterPatchBody::DisplayProperties(DisplayProperties::default());
        backend.patch(&virtual_view, &body).await.unwrap();
        backend.patch(&saved_view, &body).await.unwrap();

        assert_eq!(remote.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(remote.patches.load(Ordering::SeqCst), 1);
        let calls = local.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                "get workspace_view acme assigned".to_string(),
                "set workspace_view acme assigned display_properties".to_string(),
            ]
        );
        assert_eq!(backend.target(&virtual_view), "local");
        assert_eq!(backend.target(&saved_view), "remote");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_local_shim_runs_off_the_runtime_thread() {
        let local = Arc::new(RecordingShim::default());
        let backend = FilterBackend::WorkspaceViews {
            local: local.clone(),
            remote: Arc::new(CountingRemote::default()),
        };
        let view = ScopeRef::workspace_view("acme", "created");
        backend.fetch(&view).await.unwrap();
        backend
            .patch(&view, &FilterPatchBody::DisplayProperties(DisplayProperties::default()))
            .await
            .unwrap();

        let runtime_thread = std::thread::current().id();
        let threads = local.threads.lock().unwrap();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|id| *id != runtime_thread));
    }

    #[tokio::test]
    async fn test_remote_backend_never_uses_local_routing() {
        let remote = Arc::new(CountingRemote::default());
        let backend = FilterBackend::Remote(remote.clone());
        // a module that happens to be named like a virtual view is still remote
        backend
            .fetch(&ScopeRef::in_project("acme", "p1", "assigned"))
            .await
            .unwrap();
        assert_eq!(remote.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(
            backend.target(&ScopeRef::in_project("acme", "p1", "assigned")),
            "remote"
        );
    }
}
