//! Map a scope's filters to the flat query-parameter set an issue query sends.
//!
//! Each layout consumes a fixed subset of parameters: a calendar does not
//! sort, a spreadsheet does not group, and so on. Parameters outside the
//! layout's subset, and filters with no values, are left out.

use std::collections::BTreeMap;

use serde::Serialize;

use issueboard_common::{DisplayFilterOptions, FilterOptions, Layout};

/// One query-parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Flag(bool),
}

impl ParamValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Flag(flag) => write!(f, "{}", flag),
        }
    }
}

/// Applied filters: parameter name to value, ordered by name.
///
/// Serializes as a flat map, so it can be handed to `reqwest`'s `.query()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, ParamValue>);

impl QueryParams {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// `name=value` pairs joined by `&`, values as-is (no percent-encoding).
    pub fn to_query_string(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn insert(&mut self, name: &str, value: ParamValue) {
        self.0.insert(name.to_string(), value);
    }
}

const LIST_FILTERS: &[&str] = &[
    "priority",
    "state",
    "assignees",
    "mentions",
    "created_by",
    "labels",
    "start_date",
    "target_date",
];

const CALENDAR_FILTERS: &[&str] = &[
    "priority",
    "state",
    "assignees",
    "mentions",
    "created_by",
    "labels",
    "start_date",
];

/// Parameter names an issues query for `layout` consumes.
pub fn params_for_layout(layout: Layout) -> Vec<&'static str> {
    let (filters, display, extra): (&[&str], &[&str], &[&str]) = match layout {
        Layout::List => (
            LIST_FILTERS,
            &["group_by", "order_by", "type"],
            &["show_empty_groups", "sub_issue"],
        ),
        Layout::Kanban => (
            LIST_FILTERS,
            &["group_by", "sub_group_by", "order_by", "type"],
            &["show_empty_groups", "sub_issue"],
        ),
        Layout::Calendar => (CALENDAR_FILTERS, &["type"], &["sub_issue"]),
        Layout::Spreadsheet | Layout::GanttChart => {
            (LIST_FILTERS, &["order_by", "type"], &["sub_issue"])
        }
    };
    filters
        .iter()
        .chain(display)
        .chain(extra)
        .copied()
        .collect()
}

/// Build the applied filters for `layout`.
///
/// Returns `None` when `layout` is not a known layout name, meaning no query
/// should be issued.
pub fn map_to_query_params(
    filters: &FilterOptions,
    display_filters: &DisplayFilterOptions,
    layout: &str,
) -> Option<QueryParams> {
    let layout: Layout = layout.parse().ok()?;
    let accepted = params_for_layout(layout);
    let mut params = QueryParams::default();

    for (name, values) in filters.entries() {
        if let Some(values) = values
            && !values.is_empty()
            && accepted.contains(&name)
        {
            params.insert(name, ParamValue::Text(values.join(",")));
        }
    }

    let display_values = [
        (
            "group_by",
            display_filters
                .group_by
                .map(|g| ParamValue::Text(g.as_str().to_string())),
        ),
        (
            "sub_group_by",
            display_filters
                .sub_group_by
                .map(|g| ParamValue::Text(g.as_str().to_string())),
        ),
        (
            "order_by",
            Some(ParamValue::Text(display_filters.order_by.as_str().to_string())),
        ),
        (
            "type",
            display_filters
                .issue_type
                .map(|t| ParamValue::Text(t.as_str().to_string())),
        ),
        ("sub_issue", Some(ParamValue::Flag(display_filters.sub_issue))),
        (
            "show_empty_groups",
            Some(ParamValue::Flag(display_filters.show_empty_groups)),
        ),
    ];
    for (name, value) in display_values {
        if let Some(value) = value
            && accepted.contains(&name)
        {
            params.insert(name, value);
        }
    }

    if display_filters.layout == Layout::GanttChart {
        params.insert("start_target_date", ParamValue::Flag(true));
    }

    Some(params)
}
