use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use issueboard_common::{
    GroupBy, Label, Member, Priority, ProjectSummary, State, StateGroup,
};

/// Column id collecting issues with no label or no assignee.
pub const NONE_COLUMN_ID: &str = "None";

/// How a column header should be decorated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnIcon {
    StateGroup { group: StateGroup, color: String },
    Priority { priority: Priority },
    Color { color: String },
    Avatar { url: Option<String> },
    Emoji { emoji: Option<String> },
    None,
}

/// One value of a grouping dimension, materialized as a board column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupingColumn {
    pub id: String,
    pub name: String,
    pub icon: ColumnIcon,
    /// Partial issue body implied by dropping an issue into this column.
    pub payload: Value,
}

impl GroupingColumn {
    pub fn new(id: &str, name: &str, icon: ColumnIcon, payload: Value) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon,
            payload,
        }
    }
}

/// Ordered columns per grouping dimension.
pub trait ColumnSource {
    /// `None` when this source has nothing for `dimension`.
    fn columns(&self, dimension: GroupBy) -> Option<Vec<GroupingColumn>>;
}

/// Columns derived from one project's states, labels and members.
///
/// Deserializes from `{"states": [..], "labels": [..], "members": [..], "projects": [..]}`,
/// every list optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectColumns {
    #[serde(default)]
    pub states: Vec<State>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub projects: Vec<ProjectSummary>,
}

impl ProjectColumns {
    fn state_columns(&self) -> Vec<GroupingColumn> {
        let mut states: Vec<&State> = self.states.iter().collect();
        states.sort_by(|a, b| a.sequence.total_cmp(&b.sequence));
        states
            .into_iter()
            .map(|state| {
                GroupingColumn::new(
                    &state.id,
                    &state.name,
                    ColumnIcon::StateGroup {
                        group: state.group,
                        color: state.color.clone(),
                    },
                    json!({ "state_id": state.id }),
                )
            })
            .collect()
    }

    fn label_columns(&self) -> Vec<GroupingColumn> {
        let mut columns: Vec<GroupingColumn> = self
            .labels
            .iter()
            .map(|label| {
                GroupingColumn::new(
                    &label.id,
                    &label.name,
                    ColumnIcon::Color {
                        color: label.color.clone(),
                    },
                    json!({ "label_ids": [label.id] }),
                )
            })
            .collect();
        columns.push(GroupingColumn::new(
            NONE_COLUMN_ID,
            NONE_COLUMN_ID,
            ColumnIcon::None,
            json!({ "label_ids": [] }),
        ));
        columns
    }

    fn assignee_columns(&self) -> Vec<GroupingColumn> {
        let mut columns: Vec<GroupingColumn> = self
            .members
            .iter()
            .map(|member| {
                GroupingColumn::new(
                    &member.id,
                    &member.display_name,
                    ColumnIcon::Avatar {
                        url: member.avatar.clone(),
                    },
                    json!({ "assignee_ids": [member.id] }),
                )
            })
            .collect();
        columns.push(GroupingColumn::new(
            NONE_COLUMN_ID,
            NONE_COLUMN_ID,
            ColumnIcon::None,
            json!({ "assignee_ids": [] }),
        ));
        columns
    }

    fn creator_columns(&self) -> Vec<GroupingColumn> {
        self.members
            .iter()
            .map(|member| {
                GroupingColumn::new(
                    &member.id,
                    &member.display_name,
                    ColumnIcon::Avatar {
                        url: member.avatar.clone(),
                    },
                    json!({ "created_by": member.id }),
                )
            })
            .collect()
    }

    fn project_columns(&self) -> Vec<GroupingColumn> {
        self.projects
            .iter()
            .map(|project| {
                GroupingColumn::new(
                    &project.id,
                    &project.name,
                    ColumnIcon::Emoji {
                        emoji: project.emoji.clone(),
                    },
                    json!({ "project_id": project.id }),
                )
            })
            .collect()
    }
}

impl ColumnSource for ProjectColumns {
    fn columns(&self, dimension: GroupBy) -> Option<Vec<GroupingColumn>> {
        let columns = match dimension {
            GroupBy::State => self.state_columns(),
            GroupBy::StateGroup => state_group_columns(),
            GroupBy::Priority => priority_columns(),
            GroupBy::Labels => self.label_columns(),
            GroupBy::Assignees => self.assignee_columns(),
            GroupBy::CreatedBy => self.creator_columns(),
            GroupBy::Project => self.project_columns(),
        };
        Some(columns)
    }
}

/// Priority levels in severity order.
pub fn priority_columns() -> Vec<GroupingColumn> {
    Priority::ALL
        .into_iter()
        .map(|priority| {
            GroupingColumn::new(
                priority.as_str(),
                priority.title(),
                ColumnIcon::Priority { priority },
                json!({ "priority": priority.as_str() }),
            )
        })
        .collect()
}

/// State groups in workflow order.
pub fn state_group_columns() -> Vec<GroupingColumn> {
    StateGroup::ALL
        .into_iter()
        .map(|group| {
            GroupingColumn::new(
                group.as_str(),
                group.title(),
                ColumnIcon::StateGroup {
                    group,
                    color: String::new(),
                },
                json!({ "state_group": group.as_str() }),
            )
        })
        .collect()
}
