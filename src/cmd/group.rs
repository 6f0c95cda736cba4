//! `issueboard group`: partition an issue file into board columns.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use indexmap::IndexMap;
use issueboard::grouping::{IssueGrouping, ProjectColumns, group_issues};
use issueboard_common::{GroupBy, Issue};

#[derive(Serialize)]
struct GroupOutput {
    grouping: IssueGrouping,
    counts: IndexMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_group_counts: Option<IndexMap<String, usize>>,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {}", what, path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} file: {}", what, path.display()))
}

pub fn cmd_group(
    issues: &Path,
    columns: &Path,
    group_by: Option<GroupBy>,
    sub_group_by: Option<GroupBy>,
    show_empty: bool,
) -> Result<()> {
    let issues: Vec<Issue> = read_json(issues, "issues")?;
    let columns: ProjectColumns = read_json(columns, "columns")?;

    let grouping = group_issues(&issues, group_by, sub_group_by, &columns, show_empty);
    let sub_group_counts = match &grouping {
        IssueGrouping::SubGrouped(groups) => {
            let mut counts = IndexMap::new();
            for cells in groups.values() {
                for key in cells.keys() {
                    if !counts.contains_key(key) {
                        counts.insert(key.clone(), grouping.sub_group_count(key));
                    }
                }
            }
            Some(counts)
        }
        _ => None,
    };
    tracing::debug!(
        issues = issues.len(),
        placements = grouping.placements(),
        "issues grouped"
    );

    let output = GroupOutput {
        counts: grouping.group_counts(),
        sub_group_counts,
        grouping,
    };
    let json = serde_json::to_string_pretty(&output).context("Failed to serialize grouping")?;
    println!("{}", json);
    Ok(())
}
