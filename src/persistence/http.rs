use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;

use issueboard_common::{FilterPatchBody, RawIssueFilters, ScopeKind, ScopeRef};

use super::RemoteFilterService;

const API_KEY_HEADER: &str = "X-API-Key";
const USER_AGENT: &str = "issueboard";

/// Filter service over the tracker's REST API. One instance per scope kind.
pub struct HttpFilterService {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    kind: ScopeKind,
}

impl HttpFilterService {
    pub fn new(
        kind: ScopeKind,
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;
        Ok(Self {
            client,
            base_url,
            api_key,
            kind,
        })
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Resource URL holding the filters of `scope`. Ids are percent-encoded
    /// as single path segments.
    pub fn endpoint(&self, scope: &ScopeRef) -> Result<Url> {
        let ws = scope.workspace.as_str();
        let id = scope.scope.as_str();
        let project = || {
            scope
                .project
                .as_deref()
                .with_context(|| format!("A project id is required for {} scopes", self.kind))
        };
        let segments = match self.kind {
            ScopeKind::Project => {
                vec!["workspaces", ws, "projects", project()?, "user-properties"]
            }
            ScopeKind::Module => vec![
                "workspaces",
                ws,
                "projects",
                project()?,
                "modules",
                id,
                "user-properties",
            ],
            ScopeKind::Cycle => vec![
                "workspaces",
                ws,
                "projects",
                project()?,
                "cycles",
                id,
                "user-properties",
            ],
            ScopeKind::ProjectView => {
                vec!["workspaces", ws, "projects", project()?, "views", id]
            }
            ScopeKind::WorkspaceView => vec!["workspaces", ws, "views", id],
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Base URL cannot hold a path: {}", self.base_url))?
            .pop_if_empty()
            .push("api")
            .extend(segments)
            // trailing slash
            .push("");
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }
}

#[async_trait]
impl RemoteFilterService for HttpFilterService {
    async fn fetch(&self, scope: &ScopeRef) -> Result<RawIssueFilters> {
        let url = self.endpoint(scope)?;
        tracing::debug!(%url, kind = %self.kind, "fetching filters");
        self.authorize(self.client.get(url.clone()))
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Filter fetch rejected by {}", url))?
            .json::<RawIssueFilters>()
            .await
            .context("Failed to parse filter response")
    }

    async fn patch(&self, scope: &ScopeRef, body: &FilterPatchBody) -> Result<()> {
        let url = self.endpoint(scope)?;
        tracing::debug!(%url, kind = %self.kind, section = %body.kind(), "patching filters");
        self.authorize(self.client.patch(url.clone()))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Filter patch rejected by {}", url))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(kind: ScopeKind) -> HttpFilterService {
        HttpFilterService::new(kind, "https://tracker.example.com/", None, Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_module_endpoint() {
        let url = service(ScopeKind::Module)
            .endpoint(&ScopeRef::in_project("acme", "p1", "m1"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://tracker.example.com/api/workspaces/acme/projects/p1/modules/m1/user-properties/"
        );
    }

    #[test]
    fn test_project_endpoint_uses_project_id() {
        let url = service(ScopeKind::Project)
            .endpoint(&ScopeRef::project("acme", "p1"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://tracker.example.com/api/workspaces/acme/projects/p1/user-properties/"
        );
    }

    #[test]
    fn test_workspace_view_endpoint() {
        let url = service(ScopeKind::WorkspaceView)
            .endpoint(&ScopeRef::workspace_view("acme", "v9"))
            .unwrap();
        assert_eq!(url.as_str(), "https://tracker.example.com/api/workspaces/acme/views/v9/");
    }

    #[test]
    fn test_project_scoped_kinds_require_project() {
        let err = service(ScopeKind::Cycle)
            .endpoint(&ScopeRef::workspace_view("acme", "c1"))
            .unwrap_err();
        assert!(err.to_string().contains("project id is required"));
    }

    #[test]
    fn test_ids_cannot_escape_their_path_segment() {
        let url = service(ScopeKind::WorkspaceView)
            .endpoint(&ScopeRef::workspace_view("acme", "../v9?x=1"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://tracker.example.com/api/workspaces/acme/views/..%2Fv9%3Fx=1/"
        );
        assert!(url.query().is_none());
    }

    #[test]
    fn test_base_url_path_prefix_is_kept() {
        let service = HttpFilterService::new(
            ScopeKind::Project,
            "https://example.com/tracker",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        let url = service.endpoint(&ScopeRef::project("acme", "p1")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/tracker/api/workspaces/acme/projects/p1/user-properties/"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result =
            HttpFilterService::new(ScopeKind::Project, "not a url", None, Duration::from_secs(5));
        assert!(result.is_err());
    }
}
