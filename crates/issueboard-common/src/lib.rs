//! Shared domain types for the issueboard filter and grouping engine.
//!
//! | Module    | Contents                                                        |
//! |-----------|-----------------------------------------------------------------|
//! | `filters` | `FilterOptions`, `DisplayFilterOptions`, `DisplayProperties`, patches, wire bodies |
//! | `issue`   | `Issue`, `Priority`, `StateGroup` and the column source records  |
//! | `scope`   | `ScopeKind`, `ScopeRef`, virtual view tokens, `FetchMode`       |

pub mod filters;
pub mod issue;
pub mod scope;

pub use filters::{
    CalendarLayout, CalendarOptions, DisplayFilterOptions, DisplayFiltersPatch, DisplayProperties,
    DisplayPropertiesPatch, FilterOptions, FilterOptionsPatch, FilterPatchBody, FilterUpdate,
    FilterUpdateKind, GroupBy, IssueFilters, IssueTypeFilter, Layout, OrderBy, RawIssueFilters,
};
pub use issue::{Issue, Label, Member, Priority, ProjectSummary, State, StateGroup};
pub use scope::{FetchMode, ScopeKind, ScopeRef, VIRTUAL_VIEWS};
