//! Filter commands: `issueboard filters show|set` and `issueboard params`.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use issueboard::config::Config;
use issueboard::filters::FilterStore;
use issueboard::persistence::{
    FilterBackend, HttpFilterService, IssueRefetch, JsonFileFilterShim,
};
use issueboard_common::{FetchMode, ScopeKind, ScopeRef};

use super::super::ScopeArgs;

/// The CLI holds no issue collection; a re-fetch is only reported.
struct ReportingRefetch;

#[async_trait]
impl IssueRefetch for ReportingRefetch {
    async fn fetch_issues(&self, scope: &ScopeRef, mode: FetchMode) -> Result<()> {
        tracing::info!(scope = %scope, ?mode, "issue re-fetch requested");
        Ok(())
    }
}

fn build_store(config: &Config, kind: ScopeKind) -> Result<FilterStore> {
    let remote = Arc::new(HttpFilterService::new(
        kind,
        &config.base_url(),
        config.api_key(),
        config.timeout(),
    )?);
    let backend = match kind {
        ScopeKind::WorkspaceView => FilterBackend::WorkspaceViews {
            local: Arc::new(JsonFileFilterShim::new(config.state_file())),
            remote,
        },
        _ => FilterBackend::Remote(remote),
    };
    Ok(FilterStore::new(kind, backend, Arc::new(ReportingRefetch)))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

pub async fn cmd_filters_show(config: &Config, args: &ScopeArgs) -> Result<()> {
    let scope = args.to_scope_ref()?;
    let store = build_store(config, args.kind)?;
    let filters = store.fetch_filters(&scope).await?;
    print_json(&filters)
}

pub async fn cmd_filters_set(
    config: &Config,
    args: &ScopeArgs,
    update: &str,
    payload: &str,
) -> Result<()> {
    let scope = args.to_scope_ref()?;
    let payload: serde_json::Value =
        serde_json::from_str(payload).context("Update payload is not valid JSON")?;
    let store = build_store(config, args.kind)?;

    store.fetch_filters(&scope).await?;
    store
        .update_filters_raw(Some(&scope), update, payload)
        .await?;
    print_json(&store.issue_filters(&scope.scope))
}

pub async fn cmd_params(config: &Config, args: &ScopeArgs) -> Result<()> {
    let scope = args.to_scope_ref()?;
    let store = build_store(config, args.kind)?;
    store.fetch_filters(&scope).await?;
    print_json(&store.applied_filters(&scope.scope))
}
