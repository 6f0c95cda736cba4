//! Per-scope filter state with optimistic updates and reconciliation.
//!
//! One `FilterStore` serves one scope kind. Records are keyed by the scope
//! identifier alone. Each scope moves through
//! `Unloaded -> Loaded -> (Reconciling -> Loaded)`: a successful fetch
//! installs a record, updates merge into it in place, and a rejected
//! persistence call triggers a fetch that resyncs the record with its
//! backing service before the error is returned.
//!
//! The table lock is only held for synchronous merges, never across an
//! `.await`, so a later update always observes an earlier update's commit.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use issueboard_common::{
    FetchMode, FilterPatchBody, FilterUpdate, FilterUpdateKind, IssueFilters, ScopeKind, ScopeRef,
};

use crate::errors::FilterError;
use crate::persistence::{FilterBackend, IssueRefetch};

use super::events::{EVENT_CHANNEL_CAPACITY, FilterEvent, publish};
use super::merge::{
    enforce_display_rules, merge_display_filters, merge_display_properties, merge_filters,
};
use super::normalize::normalize_issue_filters;
use super::params::{QueryParams, map_to_query_params};

/// Lifecycle position of one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    Unloaded,
    Loaded,
    Reconciling,
}

#[derive(Default)]
struct ScopeTable {
    filters: HashMap<String, IssueFilters>,
    reconciling: HashSet<String>,
}

pub struct FilterStore {
    kind: ScopeKind,
    backend: FilterBackend,
    refetch: Arc<dyn IssueRefetch>,
    table: Mutex<ScopeTable>,
    events: broadcast::Sender<FilterEvent>,
}

impl FilterStore {
    pub fn new(kind: ScopeKind, backend: FilterBackend, refetch: Arc<dyn IssueRefetch>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            kind,
            backend,
            refetch,
            table: Mutex::new(ScopeTable::default()),
            events,
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FilterEvent> {
        self.events.subscribe()
    }

    // Critical sections never panic midway, so a poisoned table is still consistent.
    fn table(&self) -> MutexGuard<'_, ScopeTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load a scope's filters from its backing service and install them.
    ///
    /// On failure nothing is installed: an unloaded scope stays unloaded and a
    /// loaded scope keeps its previous record.
    pub async fn fetch_filters(&self, scope: &ScopeRef) -> Result<IssueFilters, FilterError> {
        let target = self.backend.target(scope);
        debug!(scope = %scope.scope, kind = %self.kind, target, "fetching filters");
        let raw = self
            .backend
            .fetch(scope)
            .await
            .map_err(|e| FilterError::fetch(&scope.scope, e))?;
        let filters = normalize_issue_filters(&raw);
        self.table()
            .filters
            .insert(scope.scope.clone(), filters.clone());
        info!(scope = %scope.scope, kind = %self.kind, target, "filters loaded");
        publish(
            &self.events,
            FilterEvent::FiltersLoaded {
                scope: scope.scope.clone(),
            },
        );
        Ok(filters)
    }

    pub fn issue_filters(&self, scope: &str) -> Option<IssueFilters> {
        self.table().filters.get(scope).cloned()
    }

    /// Query parameters for the scope's current layout, or `None` when the
    /// scope is not loaded.
    pub fn applied_filters(&self, scope: &str) -> Option<QueryParams> {
        let table = self.table();
        let filters = table.filters.get(scope)?;
        map_to_query_params(
            &filters.filters,
            &filters.display_filters,
            filters.display_filters.layout.as_str(),
        )
    }

    pub fn scope_state(&self, scope: &str) -> ScopeState {
        let table = self.table();
        if table.reconciling.contains(scope) {
            ScopeState::Reconciling
        } else if table.filters.contains_key(scope) {
            ScopeState::Loaded
        } else {
            ScopeState::Unloaded
        }
    }

    /// Drop a scope's record. Returns whether one was present.
    pub fn remove_filters(&self, scope: &str) -> bool {
        let removed = self.table().filters.remove(scope).is_some();
        if removed {
            debug!(scope, kind = %self.kind, "filters removed");
            publish(
                &self.events,
                FilterEvent::FiltersRemoved {
                    scope: scope.to_string(),
                },
            );
        }
        removed
    }

    /// Merge a partial update into a loaded scope and persist the result.
    ///
    /// The merge is committed locally before the backing service is called.
    /// Updates for scopes that were never loaded, and empty patches, are
    /// ignored. A `Filters` update also starts an issue re-fetch for the scope.
    pub async fn update_filters(
        &self,
        scope: Option<&ScopeRef>,
        update: FilterUpdate,
    ) -> Result<(), FilterError> {
        let scope = match scope {
            Some(scope) if scope.has_scope() => scope,
            _ => return Err(FilterError::MissingScope),
        };
        let kind = update.kind();
        if update.is_empty() {
            debug!(scope = %scope.scope, %kind, "ignoring empty filter update");
            return Ok(());
        }

        let Some(body) = self.commit(&scope.scope, &update) else {
            debug!(scope = %scope.scope, %kind, "ignoring filter update before load");
            return Ok(());
        };
        publish(
            &self.events,
            FilterEvent::FiltersUpdated {
                scope: scope.scope.clone(),
                kind,
            },
        );

        if kind == FilterUpdateKind::Filters {
            self.spawn_refetch(scope);
        }

        let target = self.backend.target(scope);
        if let Err(e) = self.backend.patch(scope, &body).await {
            warn!(scope = %scope.scope, %kind, target, error = %e, "filter update rejected, reconciling");
            self.reconcile(scope).await;
            return Err(FilterError::patch(&scope.scope, e));
        }
        debug!(scope = %scope.scope, %kind, target, "filter update persisted");
        Ok(())
    }

    /// Like [`update_filters`](Self::update_filters), with the update given as a
    /// wire kind name and untyped payload. Unknown kinds are ignored.
    pub async fn update_filters_raw(
        &self,
        scope: Option<&ScopeRef>,
        kind: &str,
        payload: serde_json::Value,
    ) -> Result<(), FilterError> {
        match FilterUpdate::from_json(kind, payload) {
            Some(update) => self.update_filters(scope, update).await,
            None => {
                if scope.is_none_or(|s| !s.has_scope()) {
                    return Err(FilterError::MissingScope);
                }
                debug!(kind, "ignoring unrecognized filter update kind");
                Ok(())
            }
        }
    }

    /// Apply `update` to the stored record and return the full section to
    /// persist, or `None` when the scope is not loaded.
    fn commit(&self, scope: &str, update: &FilterUpdate) -> Option<FilterPatchBody> {
        let mut table = self.table();
        let current = table.filters.get_mut(scope)?;
        let body = match update {
            FilterUpdate::Filters(patch) => {
                merge_filters(&mut current.filters, patch);
                FilterPatchBody::Filters(current.filters.clone())
            }
            FilterUpdate::DisplayFilters(patch) => {
                merge_display_filters(&mut current.display_filters, patch);
                let rules = enforce_display_rules(&mut current.display_filters);
                if !rules.is_empty() {
                    debug!(scope, ?rules, "display rules applied");
                }
                FilterPatchBody::DisplayFilters(current.display_filters.clone())
            }
            FilterUpdate::DisplayProperties(patch) => {
                merge_display_properties(&mut current.display_properties, patch);
                FilterPatchBody::DisplayProperties(current.display_properties.clone())
            }
        };
        Some(body)
    }

    fn spawn_refetch(&self, scope: &ScopeRef) {
        let refetch = Arc::clone(&self.refetch);
        let scope = scope.clone();
        tokio::spawn(async move {
            if let Err(e) = refetch.fetch_issues(&scope, FetchMode::Mutation).await {
                warn!(scope = %scope.scope, error = %e, "issue re-fetch failed");
            }
        });
    }

    /// Resync a scope with its backing service. Failures are logged only.
    async fn reconcile(&self, scope: &ScopeRef) {
        self.table().reconciling.insert(scope.scope.clone());
        publish(
            &self.events,
            FilterEvent::ReconcileStarted {
                scope: scope.scope.clone(),
            },
        );
        let result = self.fetch_filters(scope).await;
        self.table().reconciling.remove(&scope.scope);
        if let Err(e) = result {
            warn!(scope = %scope.scope, kind = %self.kind, error = %e, "reconciliation failed");
            publish(
                &self.events,
                FilterEvent::ReconcileFailed {
                    scope: scope.scope.clone(),
                    error: e.to_string(),
                },
            );
        }
    }
}
