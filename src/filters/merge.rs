//! Per-record merge of partial updates, and the display-filter consistency rules.
//!
//! Merges are per key: a key present in the patch overwrites the current
//! value, everything else is kept. The record is never replaced wholesale.

use issueboard_common::{
    DisplayFilterOptions, DisplayFiltersPatch, DisplayProperties, DisplayPropertiesPatch,
    FilterOptions, FilterOptionsPatch, GroupBy, Layout,
};

use super::normalize::clean_filter_tokens;

/// A correction applied to merged display filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRule {
    /// `group_by` is null, so `sub_group_by` was cleared.
    OrphanSubGroupCleared,
    /// Kanban with `sub_group_by == group_by`, so `sub_group_by` was cleared.
    DuplicateSubGroupCleared,
    /// Kanban with no `group_by`, so it was set to `state`.
    KanbanGroupDefaulted,
}

/// Patched dimensions are cleaned the same way as loaded ones, so the merged
/// record is already canonical.
pub fn merge_filters(current: &mut FilterOptions, patch: &FilterOptionsPatch) {
    for (key, values) in patch.entries() {
        if let Some(slot) = current.slot_mut(key) {
            *slot = values.and_then(|values| {
                clean_filter_tokens(key, values.iter().map(String::as_str))
            });
        }
    }
}

pub fn merge_display_filters(current: &mut DisplayFilterOptions, patch: &DisplayFiltersPatch) {
    if let Some(layout) = patch.layout {
        current.layout = layout;
    }
    if let Some(group_by) = patch.group_by {
        current.group_by = group_by;
    }
    if let Some(sub_group_by) = patch.sub_group_by {
        current.sub_group_by = sub_group_by;
    }
    if let Some(order_by) = patch.order_by {
        current.order_by = order_by;
    }
    if let Some(issue_type) = patch.issue_type {
        current.issue_type = issue_type;
    }
    if let Some(show_empty_groups) = patch.show_empty_groups {
        current.show_empty_groups = show_empty_groups;
    }
    if let Some(sub_issue) = patch.sub_issue {
        current.sub_issue = sub_issue;
    }
    if let Some(start_target_date) = patch.start_target_date {
        current.start_target_date = start_target_date;
    }
    if let Some(calendar) = patch.calendar {
        current.calendar = calendar;
    }
}

pub fn merge_display_properties(current: &mut DisplayProperties, patch: &DisplayPropertiesPatch) {
    for (key, visible) in patch.entries() {
        if let Some(slot) = current.slot_mut(key) {
            *slot = visible;
        }
    }
}

/// Clear `sub_group_by` when there is no `group_by`.
pub fn clear_orphan_sub_group(display: &mut DisplayFilterOptions) -> bool {
    if display.group_by.is_none() && display.sub_group_by.is_some() {
        display.sub_group_by = None;
        return true;
    }
    false
}

/// Clear `sub_group_by` on kanban when it repeats `group_by`.
pub fn clear_duplicate_sub_group(display: &mut DisplayFilterOptions) -> bool {
    if display.layout == Layout::Kanban
        && display.sub_group_by.is_some()
        && display.group_by == display.sub_group_by
    {
        display.sub_group_by = None;
        return true;
    }
    false
}

/// Kanban boards always have columns: default `group_by` to `state`.
pub fn default_kanban_group(display: &mut DisplayFilterOptions) -> bool {
    if display.layout == Layout::Kanban && display.group_by.is_none() {
        display.group_by = Some(GroupBy::State);
        return true;
    }
    false
}

/// Apply the three consistency rules in order, each checked against the
/// result of the previous one. Returns the rules that changed something.
pub fn enforce_display_rules(display: &mut DisplayFilterOptions) -> Vec<DisplayRule> {
    let mut applied = Vec::new();
    if clear_orphan_sub_group(display) {
        applied.push(DisplayRule::OrphanSubGroupCleared);
    }
    if clear_duplicate_sub_group(display) {
        applied.push(DisplayRule::DuplicateSubGroupCleared);
    }
    if default_kanban_group(display) {
        applied.push(DisplayRule::KanbanGroupDefaulted);
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(layout: Layout, group_by: Option<GroupBy>, sub: Option<GroupBy>) -> DisplayFilterOptions {
        DisplayFilterOptions {
            layout,
            group_by,
            sub_group_by: sub,
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_filters_overwrites_only_present_keys() {
        let mut current = FilterOptions {
            priority: Some(vec!["high".into()]),
            labels: Some(vec!["l1".into()]),
            ..Default::default()
        };
        let patch = FilterOptionsPatch {
            priority: Some(Some(vec!["urgent".into(), "low".into()])),
            ..Default::default()
        };
        merge_filters(&mut current, &patch);
        assert_eq!(current.priority, Some(vec!["urgent".to_string(), "low".to_string()]));
        assert_eq!(current.labels, Some(vec!["l1".to_string()]));
    }

    #[test]
    fn test_merge_filters_null_or_empty_clears() {
        let mut current = FilterOptions {
            state: Some(vec!["s1".into()]),
            assignees: Some(vec!["u1".into()]),
            ..Default::default()
        };
        let patch = FilterOptionsPatch {
            state: Some(None),
            assignees: Some(Some(vec![])),
            ..Default::default()
        };
        merge_filters(&mut current, &patch);
        assert!(current.state.is_none());
        assert!(current.assignees.is_none());
    }

    #[test]
    fn test_merge_display_filters_keeps_absent_fields() {
        let mut current = display(Layout::List, Some(GroupBy::Priority), None);
        current.show_empty_groups = false;
        let patch = DisplayFiltersPatch {
            layout: Some(Layout::Spreadsheet),
            ..Default::default()
        };
        merge_display_filters(&mut current, &patch);
        assert_eq!(current.layout, Layout::Spreadsheet);
        assert_eq!(current.group_by, Some(GroupBy::Priority));
        assert!(!current.show_empty_groups);
    }

    #[test]
    fn test_merge_display_properties() {
        let mut current = DisplayProperties::default();
        let patch = DisplayPropertiesPatch {
            estimate: Some(false),
            ..Default::default()
        };
        merge_display_properties(&mut current, &patch);
        assert!(!current.estimate);
        assert!(current.assignee);
    }

    #[test]
    fn test_orphan_sub_group_rule() {
        let mut d = display(Layout::List, None, Some(GroupBy::State));
        assert_eq!(enforce_display_rules(&mut d), vec![DisplayRule::OrphanSubGroupCleared]);
        assert!(d.sub_group_by.is_none());
    }

    #[test]
    fn test_duplicate_sub_group_rule_only_on_kanban() {
        let mut kanban = display(Layout::Kanban, Some(GroupBy::State), Some(GroupBy::State));
        assert_eq!(
            enforce_display_rules(&mut kanban),
            vec![DisplayRule::DuplicateSubGroupCleared]
        );
        assert_eq!(kanban.group_by, Some(GroupBy::State));
        assert!(kanban.sub_group_by.is_none());

        let mut list = display(Layout::List, Some(GroupBy::State), Some(GroupBy::State));
        assert!(enforce_display_rules(&mut list).is_empty());
        assert_eq!(list.sub_group_by, Some(GroupBy::State));
    }

    #[test]
    fn test_kanban_without_group_defaults_to_state() {
        let mut d = display(Layout::Kanban, None, Some(GroupBy::Labels));
        let applied = enforce_display_rules(&mut d);
        assert_eq!(
            applied,
            vec![DisplayRule::OrphanSubGroupCleared, DisplayRule::KanbanGroupDefaulted]
        );
        assert_eq!(d.group_by, Some(GroupBy::State));
        assert!(d.sub_group_by.is_none());
    }

    #[test]
    fn test_list_to_kanban_transition() {
        let mut d = display(Layout::List, None, None);
        merge_display_filters(
            &mut d,
            &DisplayFiltersPatch {
                layout: Some(Layout::Kanban),
                ..Default::default()
            },
        );
        enforce_display_rules(&mut d);
        assert_eq!(d.layout, Layout::Kanban);
        assert_eq!(d.group_by, Some(GroupBy::State));
        assert!(d.sub_group_by.is_none());
    }

    #[test]
    fn test_rules_are_idempotent() {
        let mut d = display(Layout::Kanban, Some(GroupBy::Priority), Some(GroupBy::Priority));
        enforce_display_rules(&mut d);
        let once = d.clone();
        assert!(enforce_display_rules(&mut d).is_empty());
        assert_eq!(d, once);
    }
}
