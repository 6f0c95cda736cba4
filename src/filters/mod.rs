pub mod events;
pub mod merge;
pub mod normalize;
pub mod params;
pub mod store;

pub use events::FilterEvent;
pub use normalize::{
    normalize_display_filters, normalize_display_properties, normalize_filters,
    normalize_issue_filters,
};
pub use params::{ParamValue, QueryParams, map_to_query_params, params_for_layout};
pub use store::{FilterStore, ScopeState};
