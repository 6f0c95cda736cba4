//! Coerce raw filter payloads into complete, canonical records.
//!
//! Input comes from backing services or user input and may be missing,
//! partial or mistyped. Every function here returns a fully populated record:
//! missing or unusable values fall back to the dimension's default, unknown
//! keys are dropped. Normalizing a normalized value returns an equal value.

use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use issueboard_common::{
    CalendarLayout, CalendarOptions, DisplayFilterOptions, DisplayProperties, FilterOptions,
    GroupBy, IssueFilters, IssueTypeFilter, Layout, OrderBy, Priority, RawIssueFilters,
    StateGroup,
};

use super::merge::{clear_duplicate_sub_group, clear_orphan_sub_group};

pub fn normalize_filters(raw: Option<&Value>) -> FilterOptions {
    let mut filters = FilterOptions::default();
    let Some(map) = raw.and_then(Value::as_object) else {
        return filters;
    };

    for key in FilterOptions::KEYS {
        let raw = field(map, key).map(raw_tokens).unwrap_or_default();
        if let Some(slot) = filters.slot_mut(key) {
            *slot = clean_filter_tokens(key, raw);
        }
    }
    filters
}

/// Canonical value of one filter dimension.
///
/// Tokens are trimmed, empties dropped, duplicates removed keeping first
/// position, and the priority, state group and date dimensions keep only
/// tokens they recognize. `None` when nothing is left.
pub fn clean_filter_tokens<'a, I>(key: &str, raw: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tokens: Vec<String> = Vec::new();
    for token in raw.into_iter().map(str::trim).filter(|t| !t.is_empty()) {
        if accepts_token(key, token) && !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    (!tokens.is_empty()).then_some(tokens)
}

fn accepts_token(key: &str, token: &str) -> bool {
    match key {
        "priority" => Priority::from_str(token).is_ok(),
        "state_group" => StateGroup::from_str(token).is_ok(),
        "start_date" | "target_date" => is_date_token(token),
        _ => true,
    }
}

pub fn normalize_display_filters(raw: Option<&Value>) -> DisplayFilterOptions {
    let defaults = DisplayFilterOptions::default();
    let Some(map) = raw.and_then(Value::as_object) else {
        return defaults;
    };

    let mut display = DisplayFilterOptions {
        layout: parse_enum::<Layout>(map, "layout").unwrap_or(defaults.layout),
        group_by: parse_enum::<GroupBy>(map, "group_by"),
        sub_group_by: parse_enum::<GroupBy>(map, "sub_group_by"),
        order_by: parse_enum::<OrderBy>(map, "order_by").unwrap_or(defaults.order_by),
        issue_type: parse_enum::<IssueTypeFilter>(map, "type"),
        show_empty_groups: bool_field(map, "show_empty_groups")
            .unwrap_or(defaults.show_empty_groups),
        sub_issue: bool_field(map, "sub_issue").unwrap_or(defaults.sub_issue),
        start_target_date: bool_field(map, "start_target_date")
            .unwrap_or(defaults.start_target_date),
        calendar: normalize_calendar(field(map, "calendar")),
    };

    // Stored records may predate the grouping invariants; repair them here.
    clear_orphan_sub_group(&mut display);
    clear_duplicate_sub_group(&mut display);
    display
}

pub fn normalize_display_properties(raw: Option<&Value>) -> DisplayProperties {
    let mut properties = DisplayProperties::default();
    let Some(map) = raw.and_then(Value::as_object) else {
        return properties;
    };
    for key in DisplayProperties::KEYS {
        if let (Some(visible), Some(slot)) = (bool_field(map, key), properties.slot_mut(key)) {
            *slot = visible;
        }
    }
    properties
}

/// Run all three normalizers over a service response.
pub fn normalize_issue_filters(raw: &RawIssueFilters) -> IssueFilters {
    IssueFilters {
        filters: normalize_filters(raw.filters.as_ref()),
        display_filters: normalize_display_filters(raw.display_filters.as_ref()),
        display_properties: normalize_display_properties(raw.display_properties.as_ref()),
    }
}

fn normalize_calendar(raw: Option<&Value>) -> CalendarOptions {
    let defaults = CalendarOptions::default();
    let Some(map) = raw.and_then(Value::as_object) else {
        return defaults;
    };
    CalendarOptions {
        show_weekends: bool_field(map, "show_weekends").unwrap_or(defaults.show_weekends),
        layout: parse_enum::<CalendarLayout>(map, "layout").unwrap_or(defaults.layout),
    }
}

/// A present, non-null value.
fn field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn parse_enum<T: FromStr>(map: &Map<String, Value>, key: &str) -> Option<T> {
    field(map, key)
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}

fn bool_field(map: &Map<String, Value>, key: &str) -> Option<bool> {
    match field(map, key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

/// Accepts an array of strings or a comma-joined string. Non-strings are dropped.
fn raw_tokens(value: &Value) -> Vec<&str> {
    match value {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::String(joined) => joined.split(',').collect(),
        _ => Vec::new(),
    }
}

/// `YYYY-MM-DD;after|before` or a relative range such as `2_weeks;after;fromnow`.
fn is_date_token(token: &str) -> bool {
    let parts: Vec<&str> = token.split(';').collect();
    match parts.as_slice() {
        [date, relation] => {
            NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok() && is_relation(relation)
        }
        [span, relation, "fromnow"] => is_relative_span(span) && is_relation(relation),
        _ => false,
    }
}

fn is_relation(relation: &str) -> bool {
    matches!(relation, "after" | "before")
}

fn is_relative_span(span: &str) -> bool {
    match span.split_once('_') {
        Some((count, unit)) => {
            count.parse::<u32>().is_ok_and(|n| n > 0) && matches!(unit, "weeks" | "months")
        }
        None => false,
    }
}
