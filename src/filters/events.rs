use serde::Serialize;
use tokio::sync::broadcast;

use issueboard_common::FilterUpdateKind;

/// Capacity of a store's event channel. Slow subscribers lag, they never block commits.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

// ── Filter store notifications ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum FilterEvent {
    FiltersLoaded {
        scope: String,
    },
    FiltersUpdated {
        scope: String,
        kind: FilterUpdateKind,
    },
    FiltersRemoved {
        scope: String,
    },
    ReconcileStarted {
        scope: String,
    },
    ReconcileFailed {
        scope: String,
        error: String,
    },
}

impl FilterEvent {
    pub fn scope(&self) -> &str {
        match self {
            Self::FiltersLoaded { scope }
            | Self::FiltersUpdated { scope, .. }
            | Self::FiltersRemoved { scope }
            | Self::ReconcileStarted { scope }
            | Self::ReconcileFailed { scope, .. } => scope,
        }
    }
}

/// Publish an event; having no subscribers is fine.
pub fn publish(tx: &broadcast::Sender<FilterEvent>, event: FilterEvent) {
    let _ = tx.send(event);
}
