//! Typed errors for the filter engine.
//!
//! Pure computations (normalization, parameter mapping, grouping) never fail;
//! they degrade to defaults or empty results. Only the I/O-bound store
//! operations return `FilterError`.

use thiserror::Error;

/// Errors surfaced by `FilterStore` operations.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("A scope identifier is required to update filters")]
    MissingScope,

    #[error("Failed to {action} filters for scope '{scope}': {source}")]
    Persistence {
        scope: String,
        action: PersistAction,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FilterError {
    pub fn fetch(scope: &str, source: anyhow::Error) -> Self {
        Self::Persistence {
            scope: scope.to_string(),
            action: PersistAction::Fetch,
            source,
        }
    }

    pub fn patch(scope: &str, source: anyhow::Error) -> Self {
        Self::Persistence {
            scope: scope.to_string(),
            action: PersistAction::Patch,
            source,
        }
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}

/// The backing-service call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistAction {
    Fetch,
    Patch,
}

impl std::fmt::Display for PersistAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistAction::Fetch => write!(f, "fetch"),
            PersistAction::Patch => write!(f, "patch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_scope_is_matchable() {
        let err = FilterError::MissingScope;
        assert!(matches!(err, FilterError::MissingScope));
        assert!(!err.is_persistence());
    }

    #[test]
    fn patch_error_carries_scope_and_source() {
        let err = FilterError::patch("mod-1", anyhow::anyhow!("503 Service Unavailable"));
        match &err {
            FilterError::Persistence {
                scope,
                action,
                source,
            } => {
                assert_eq!(scope, "mod-1");
                assert_eq!(*action, PersistAction::Patch);
                assert!(source.to_string().contains("503"));
            }
            _ => panic!("Expected Persistence"),
        }
        let message = err.to_string();
        assert!(message.contains("patch"));
        assert!(message.contains("mod-1"));
    }

    #[test]
    fn fetch_error_reports_fetch_action() {
        let err = FilterError::fetch("all-issues", anyhow::anyhow!("timeout"));
        assert!(err.is_persistence());
        assert!(err.to_string().starts_with("Failed to fetch filters"));
    }

    #[test]
    fn other_converts_from_anyhow() {
        let err: FilterError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, FilterError::Other(_)));
    }

    #[test]
    fn filter_error_implements_std_error() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&FilterError::MissingScope);
    }
}
