//! Partition an issue collection into board columns and swimlanes.
//!
//! An issue lands in every column whose id matches its value on the grouping
//! dimension. Labels and assignees are multi-valued, so an issue can appear
//! in several columns; an issue with no labels (or no assignees) matches the
//! `"None"` column. Issues whose value matches no column are left out of the
//! grouped view. Within a column, issues keep their input order, and columns
//! keep the order of the column source.
//!
//! The engine does not deduplicate: callers pass each issue once.

pub mod columns;

use indexmap::IndexMap;
use serde::Serialize;

use issueboard_common::{GroupBy, Issue};

pub use columns::{ColumnIcon, ColumnSource, GroupingColumn, NONE_COLUMN_ID, ProjectColumns};

/// Column id to ordered issue ids.
pub type GroupedIssues = IndexMap<String, Vec<String>>;

/// Outer column id to its inner grouping.
pub type SubGroupedIssues = IndexMap<String, GroupedIssues>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "groups", rename_all = "snake_case")]
pub enum IssueGrouping {
    Ungrouped(Vec<String>),
    Grouped(GroupedIssues),
    SubGrouped(SubGroupedIssues),
}

impl IssueGrouping {
    /// Header count of an outer column: its issues, or for swimlanes the sum
    /// over its cells.
    pub fn group_count(&self, column: &str) -> usize {
        match self {
            Self::Ungrouped(_) => 0,
            Self::Grouped(groups) => groups.get(column).map_or(0, Vec::len),
            Self::SubGrouped(groups) => groups
                .get(column)
                .map_or(0, |cells| cells.values().map(Vec::len).sum()),
        }
    }

    /// Swimlane row total: issues in `sub_column` across every outer column.
    pub fn sub_group_count(&self, sub_column: &str) -> usize {
        match self {
            Self::SubGrouped(groups) => groups
                .values()
                .filter_map(|cells| cells.get(sub_column))
                .map(Vec::len)
                .sum(),
            _ => 0,
        }
    }

    /// Header counts for every outer column, in column order.
    pub fn group_counts(&self) -> IndexMap<String, usize> {
        let keys: Vec<&String> = match self {
            Self::Ungrouped(_) => Vec::new(),
            Self::Grouped(groups) => groups.keys().collect(),
            Self::SubGrouped(groups) => groups.keys().collect(),
        };
        keys.into_iter()
            .map(|key| (key.clone(), self.group_count(key)))
            .collect()
    }

    /// Number of placements. Counts an issue once per column it fans out to.
    pub fn placements(&self) -> usize {
        match self {
            Self::Ungrouped(ids) => ids.len(),
            Self::Grouped(groups) => groups.values().map(Vec::len).sum(),
            Self::SubGrouped(groups) => groups
                .values()
                .flat_map(|cells| cells.values())
                .map(Vec::len)
                .sum(),
        }
    }
}

/// Values of `issue` on `dimension`, as column ids.
pub fn dimension_values(issue: &Issue, dimension: GroupBy) -> Vec<&str> {
    match dimension {
        GroupBy::State => issue.state_id.as_deref().into_iter().collect(),
        GroupBy::StateGroup => issue.state_group.map(|g| g.as_str()).into_iter().collect(),
        GroupBy::Priority => vec![issue.priority.as_str()],
        GroupBy::Labels => multi_values(&issue.label_ids),
        GroupBy::Assignees => multi_values(&issue.assignee_ids),
        GroupBy::CreatedBy => issue.created_by.as_deref().into_iter().collect(),
        GroupBy::Project => vec![issue.project_id.as_str()],
    }
}

fn multi_values(ids: &[String]) -> Vec<&str> {
    if ids.is_empty() {
        vec![NONE_COLUMN_ID]
    } else {
        ids.iter().map(String::as_str).collect()
    }
}

fn matches(issue: &Issue, dimension: GroupBy, column: &GroupingColumn) -> bool {
    dimension_values(issue, dimension).contains(&column.id.as_str())
}

/// Partition `issues` by `group_by`, and within each column by `sub_group_by`.
///
/// Without `group_by` the issue ids are returned in input order and
/// `sub_group_by` is ignored. With `show_empty` every column (and for
/// swimlanes every cell) is present; without it, empty columns and cells are
/// left out.
pub fn group_issues(
    issues: &[Issue],
    group_by: Option<GroupBy>,
    sub_group_by: Option<GroupBy>,
    columns: &dyn ColumnSource,
    show_empty: bool,
) -> IssueGrouping {
    let Some(group_by) = group_by else {
        return IssueGrouping::Ungrouped(issues.iter().map(|i| i.id.clone()).collect());
    };
    let outer = columns.columns(group_by).unwrap_or_default();

    let Some(sub_group_by) = sub_group_by else {
        let refs: Vec<&Issue> = issues.iter().collect();
        return IssueGrouping::Grouped(partition(&refs, group_by, &outer, show_empty));
    };
    let inner = columns.columns(sub_group_by).unwrap_or_default();

    let mut grouped = SubGroupedIssues::new();
    for column in &outer {
        let members: Vec<&Issue> = issues
            .iter()
            .filter(|issue| matches(issue, group_by, column))
            .collect();
        let cells = partition(&members, sub_group_by, &inner, show_empty);
        if show_empty || cells.values().any(|ids| !ids.is_empty()) {
            grouped.insert(column.id.clone(), cells);
        }
    }
    IssueGrouping::SubGrouped(grouped)
}

fn partition(
    issues: &[&Issue],
    dimension: GroupBy,
    columns: &[GroupingColumn],
    show_empty: bool,
) -> GroupedIssues {
    let mut grouped = GroupedIssues::new();
    for column in columns {
        let ids: Vec<String> = issues
            .iter()
            .filter(|issue| matches(issue, dimension, column))
            .map(|issue| issue.id.clone())
            .collect();
        if show_empty || !ids.is_empty() {
            grouped.insert(column.id.clone(), ids);
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use issueboard_common::{Label, Priority, State, StateGroup};
    use proptest::prelude::*;

    fn state(id: &str, sequence: f64) -> State {
        State {
            id: id.to_string(),
            name: id.to_string(),
            group: StateGroup::Unstarted,
            color: String::new(),
            sequence,
        }
    }

    fn label(id: &str) -> Label {
        Label {
            id: id.to_string(),
            name: id.to_string(),
            color: String::new(),
        }
    }

    fn source() -> ProjectColumns {
        ProjectColumns {
            states: vec![state("s1", 1.0), state("s2", 2.0), state("s3", 3.0)],
            labels: vec![label("bug"), label("ui")],
            ..Default::default()
        }
    }

    fn grouped(grouping: IssueGrouping) -> GroupedIssues {
        match grouping {
            IssueGrouping::Grouped(groups) => groups,
            other => panic!("Expected Grouped, got {:?}", other),
        }
    }

    #[test]
    fn test_group_by_state_skips_empty_columns() {
        let issues = vec![
            Issue::new("a", "p1").with_state("s1"),
            Issue::new("b", "p1").with_state("s2"),
            Issue::new("c", "p1").with_state("s1"),
        ];
        let groups = grouped(group_issues(
            &issues,
            Some(GroupBy::State),
            None,
            &source(),
            false,
        ));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["s1"], vec!["a", "c"]);
        assert_eq!(groups["s2"], vec!["b"]);
        assert!(!groups.contains_key("s3"));
    }

    #[test]
    fn test_show_empty_keeps_every_column_in_order() {
        let issues = vec![Issue::new("a", "p1").with_state("s2")];
        let groups = grouped(group_issues(
            &issues,
            Some(GroupBy::State),
            None,
            &source(),
            true,
        ));
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["s1", "s2", "s3"]);
        assert!(groups["s1"].is_empty());
    }

    #[test]
    fn test_without_group_by_returns_input_order() {
        let issues = vec![Issue::new("z", "p1"), Issue::new("a", "p1")];
        let grouping = group_issues(&issues, None, Some(GroupBy::Priority), &source(), false);
        assert_eq!(
            grouping,
            IssueGrouping::Ungrouped(vec!["z".to_string(), "a".to_string()])
        );
        assert_eq!(grouping.placements(), 2);
    }

    #[test]
    fn test_labels_fan_out_and_unlabelled_go_to_none() {
        let issues = vec![
            Issue::new("a", "p1").with_labels(&["bug", "ui"]),
            Issue::new("b", "p1"),
            Issue::new("c", "p1").with_labels(&["ui"]),
        ];
        let groups = grouped(group_issues(
            &issues,
            Some(GroupBy::Labels),
            None,
            &source(),
            false,
        ));
        assert_eq!(groups["bug"], vec!["a"]);
        assert_eq!(groups["ui"], vec!["a", "c"]);
        assert_eq!(groups["None"], vec!["b"]);
    }

    #[test]
    fn test_unknown_values_are_dropped_from_grouped_view() {
        let issues = vec![
            Issue::new("a", "p1").with_state("archived"),
            Issue::new("b", "p1"),
            Issue::new("c", "p1").with_state("s3"),
        ];
        let groups = grouped(group_issues(
            &issues,
            Some(GroupBy::State),
            None,
            &source(),
            false,
        ));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["s3"], vec!["c"]);
    }

    #[test]
    fn test_sub_grouping_and_counts() {
        let issues = vec![
            Issue::new("a", "p1").with_state("s1").with_priority(Priority::Urgent),
            Issue::new("b", "p1").with_state("s1").with_priority(Priority::Low),
            Issue::new("c", "p1").with_state("s2").with_priority(Priority::Urgent),
            Issue::new("d", "p1").with_state("s1").with_priority(Priority::Urgent),
        ];
        let grouping = group_issues(
            &issues,
            Some(GroupBy::State),
            Some(GroupBy::Priority),
            &source(),
            false,
        );
        let IssueGrouping::SubGrouped(groups) = &grouping else {
            panic!("Expected SubGrouped");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["s1"]["urgent"], vec!["a", "d"]);
        assert_eq!(groups["s1"]["low"], vec!["b"]);
        assert!(!groups["s1"].contains_key("high"));
        assert_eq!(groups["s2"]["urgent"], vec!["c"]);

        assert_eq!(grouping.group_count("s1"), 3);
        assert_eq!(grouping.group_count("s3"), 0);
        assert_eq!(grouping.sub_group_count("urgent"), 3);
        assert_eq!(grouping.sub_group_count("low"), 1);
        assert_eq!(grouping.group_counts().get("s2"), Some(&1));
    }

    #[test]
    fn test_sub_grouping_show_empty_is_full_grid() {
        let issues = vec![Issue::new("a", "p1").with_state("s1")];
        let grouping = group_issues(
            &issues,
            Some(GroupBy::State),
            Some(GroupBy::Priority),
            &source(),
            true,
        );
        let IssueGrouping::SubGrouped(groups) = grouping else {
            panic!("Expected SubGrouped");
        };
        assert_eq!(groups.len(), 3);
        assert!(groups.values().all(|cells| cells.len() == 5));
        assert_eq!(groups["s1"]["none"], vec!["a"]);
    }

    #[test]
    fn test_grouping_serializes_with_kind_tag() {
        let issues = vec![Issue::new("a", "p1").with_priority(Priority::High)];
        let grouping = group_issues(&issues, Some(GroupBy::Priority), None, &source(), false);
        let json = serde_json::to_value(&grouping).unwrap();
        assert_eq!(json["kind"], "grouped");
        assert_eq!(json["groups"]["high"], serde_json::json!(["a"]));
    }

    fn issues_strategy() -> impl Strategy<Value = Vec<Issue>> {
        prop::collection::vec(prop::sample::select(vec!["s1", "s2", "s3", "s4"]), 0..40).prop_map(
            |states| {
                states
                    .into_iter()
                    .enumerate()
                    .map(|(n, s)| Issue::new(&format!("i{}", n), "p1").with_state(s))
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_state_grouping_is_complete_and_ordered(issues in issues_strategy(), show_empty in any::<bool>()) {
            let groups = grouped(group_issues(&issues, Some(GroupBy::State), None, &source(), show_empty));

            for issue in &issues {
                let state = issue.state_id.as_deref().unwrap();
                let hits = groups.values().filter(|ids| ids.contains(&issue.id)).count();
                if state == "s4" {
                    prop_assert_eq!(hits, 0);
                } else {
                    prop_assert_eq!(hits, 1);
                    prop_assert!(groups[state].contains(&issue.id));
                }
            }
            // input order survives within each column
            for ids in groups.values() {
                let positions: Vec<usize> = ids
                    .iter()
                    .map(|id| issues.iter().position(|i| &i.id == id).unwrap())
                    .collect();
                prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
            }
            if show_empty {
                prop_assert_eq!(groups.len(), 3);
            } else {
                prop_assert!(groups.values().all(|ids| !ids.is_empty()));
            }
        }
    }
}
