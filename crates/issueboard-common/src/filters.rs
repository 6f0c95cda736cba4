//! Filter, display-filter and display-property records.
//!
//! The three records together form an [`IssueFilters`], the unit persisted per
//! scope. Each record has a matching patch type whose fields are all optional:
//! a present key overwrites the current value, an absent key leaves it alone.
//! For nullable fields the patch uses `Option<Option<T>>` so that an explicit
//! JSON `null` (clear) is distinguishable from a missing key (keep).

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a present key (including `null`) as `Some(..)`.
///
/// Combined with `#[serde(default)]`, a missing key stays `None`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ── Enumerations ─────────────────────────────────────────────────────

/// Board layout of an issue view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    List,
    Kanban,
    Calendar,
    Spreadsheet,
    GanttChart,
}

impl Layout {
    pub const ALL: [Layout; 5] = [
        Layout::List,
        Layout::Kanban,
        Layout::Calendar,
        Layout::Spreadsheet,
        Layout::GanttChart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Kanban => "kanban",
            Self::Calendar => "calendar",
            Self::Spreadsheet => "spreadsheet",
            Self::GanttChart => "gantt_chart",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Self::List),
            "kanban" => Ok(Self::Kanban),
            "calendar" => Ok(Self::Calendar),
            "spreadsheet" => Ok(Self::Spreadsheet),
            "gantt_chart" => Ok(Self::GanttChart),
            _ => Err(format!("Invalid layout: {}", s)),
        }
    }
}

/// Issue field used as a partition key for boards and swimlanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    State,
    #[serde(rename = "state_detail.group")]
    StateGroup,
    Priority,
    Labels,
    Assignees,
    CreatedBy,
    Project,
}

impl GroupBy {
    pub const ALL: [GroupBy; 7] = [
        GroupBy::State,
        GroupBy::StateGroup,
        GroupBy::Priority,
        GroupBy::Labels,
        GroupBy::Assignees,
        GroupBy::CreatedBy,
        GroupBy::Project,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::StateGroup => "state_detail.group",
            Self::Priority => "priority",
            Self::Labels => "labels",
            Self::Assignees => "assignees",
            Self::CreatedBy => "created_by",
            Self::Project => "project",
        }
    }

    /// Whether an issue can carry several values on this dimension.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Self::Labels | Self::Assignees)
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "state" => Ok(Self::State),
            "state_detail.group" => Ok(Self::StateGroup),
            "priority" => Ok(Self::Priority),
            "labels" => Ok(Self::Labels),
            "assignees" => Ok(Self::Assignees),
            "created_by" => Ok(Self::CreatedBy),
            "project" => Ok(Self::Project),
            _ => Err(format!("Invalid group by: {}", s)),
        }
    }
}

/// Sort key for issue queries. Leading `-` means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderBy {
    #[default]
    #[serde(rename = "sort_order")]
    SortOrder,
    #[serde(rename = "-created_at")]
    CreatedAtDesc,
    #[serde(rename = "-updated_at")]
    UpdatedAtDesc,
    #[serde(rename = "start_date")]
    StartDate,
    #[serde(rename = "target_date")]
    TargetDate,
    #[serde(rename = "priority")]
    Priority,
    #[serde(rename = "-priority")]
    PriorityDesc,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SortOrder => "sort_order",
            Self::CreatedAtDesc => "-created_at",
            Self::UpdatedAtDesc => "-updated_at",
            Self::StartDate => "start_date",
            Self::TargetDate => "target_date",
            Self::Priority => "priority",
            Self::PriorityDesc => "-priority",
        }
    }
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sort_order" => Ok(Self::SortOrder),
            "-created_at" => Ok(Self::CreatedAtDesc),
            "-updated_at" => Ok(Self::UpdatedAtDesc),
            "start_date" => Ok(Self::StartDate),
            "target_date" => Ok(Self::TargetDate),
            "priority" => Ok(Self::Priority),
            "-priority" => Ok(Self::PriorityDesc),
            _ => Err(format!("Invalid order by: {}", s)),
        }
    }
}

/// Restricts a view to active or backlog issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueTypeFilter {
    Active,
    Backlog,
}

impl IssueTypeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Backlog => "backlog",
        }
    }
}

impl FromStr for IssueTypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "backlog" => Ok(Self::Backlog),
            _ => Err(format!("Invalid issue type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarLayout {
    #[default]
    Month,
    Week,
}

impl FromStr for CalendarLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(Self::Month),
            "week" => Ok(Self::Week),
            _ => Err(format!("Invalid calendar layout: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarOptions {
    pub show_weekends: bool,
    pub layout: CalendarLayout,
}

// ── Records ──────────────────────────────────────────────────────────

/// Accepted values per filter dimension. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub priority: Option<Vec<String>>,
    pub state: Option<Vec<String>>,
    pub state_group: Option<Vec<String>>,
    pub assignees: Option<Vec<String>>,
    pub mentions: Option<Vec<String>>,
    pub created_by: Option<Vec<String>>,
    pub labels: Option<Vec<String>>,
    pub start_date: Option<Vec<String>>,
    pub target_date: Option<Vec<String>>,
    pub project: Option<Vec<String>>,
    pub subscriber: Option<Vec<String>>,
}

impl FilterOptions {
    pub const KEYS: [&'static str; 11] = [
        "priority",
        "state",
        "state_group",
        "assignees",
        "mentions",
        "created_by",
        "labels",
        "start_date",
        "target_date",
        "project",
        "subscriber",
    ];

    /// Every dimension paired with its wire key, in `KEYS` order.
    pub fn entries(&self) -> [(&'static str, Option<&[String]>); 11] {
        [
            ("priority", self.priority.as_deref()),
            ("state", self.state.as_deref()),
            ("state_group", self.state_group.as_deref()),
            ("assignees", self.assignees.as_deref()),
            ("mentions", self.mentions.as_deref()),
            ("created_by", self.created_by.as_deref()),
            ("labels", self.labels.as_deref()),
            ("start_date", self.start_date.as_deref()),
            ("target_date", self.target_date.as_deref()),
            ("project", self.project.as_deref()),
            ("subscriber", self.subscriber.as_deref()),
        ]
    }

    /// Mutable access to a dimension by wire key.
    pub fn slot_mut(&mut self, key: &str) -> Option<&mut Option<Vec<String>>> {
        match key {
            "priority" => Some(&mut self.priority),
            "state" => Some(&mut self.state),
            "state_group" => Some(&mut self.state_group),
            "assignees" => Some(&mut self.assignees),
            "mentions" => Some(&mut self.mentions),
            "created_by" => Some(&mut self.created_by),
            "labels" => Some(&mut self.labels),
            "start_date" => Some(&mut self.start_date),
            "target_date" => Some(&mut self.target_date),
            "project" => Some(&mut self.project),
            "subscriber" => Some(&mut self.subscriber),
            _ => None,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.entries().iter().all(|(_, values)| values.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFilterOptions {
    pub layout: Layout,
    pub group_by: Option<GroupBy>,
    pub sub_group_by: Option<GroupBy>,
    pub order_by: OrderBy,
    #[serde(rename = "type")]
    pub issue_type: Option<IssueTypeFilter>,
    pub show_empty_groups: bool,
    pub sub_issue: bool,
    pub start_target_date: bool,
    pub calendar: CalendarOptions,
}

impl Default for DisplayFilterOptions {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            group_by: None,
            sub_group_by: None,
            order_by: OrderBy::default(),
            issue_type: None,
            show_empty_groups: true,
            sub_issue: false,
            start_target_date: false,
            calendar: CalendarOptions::default(),
        }
    }
}

/// Visibility of optional issue fields on cards and rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayProperties {
    pub assignee: bool,
    pub start_date: bool,
    pub due_date: bool,
    pub labels: bool,
    pub key: bool,
    pub priority: bool,
    pub state: bool,
    pub sub_issue_count: bool,
    pub link: bool,
    pub attachment_count: bool,
    pub estimate: bool,
    pub created_on: bool,
    pub updated_on: bool,
}

impl DisplayProperties {
    pub const KEYS: [&'static str; 13] = [
        "assignee",
        "start_date",
        "due_date",
        "labels",
        "key",
        "priority",
        "state",
        "sub_issue_count",
        "link",
        "attachment_count",
        "estimate",
        "created_on",
        "updated_on",
    ];

    pub fn slot_mut(&mut self, key: &str) -> Option<&mut bool> {
        match key {
            "assignee" => Some(&mut self.assignee),
            "start_date" => Some(&mut self.start_date),
            "due_date" => Some(&mut self.due_date),
            "labels" => Some(&mut self.labels),
            "key" => Some(&mut self.key),
            "priority" => Some(&mut self.priority),
            "state" => Some(&mut self.state),
            "sub_issue_count" => Some(&mut self.sub_issue_count),
            "link" => Some(&mut self.link),
            "attachment_count" => Some(&mut self.attachment_count),
            "estimate" => Some(&mut self.estimate),
            "created_on" => Some(&mut self.created_on),
            "updated_on" => Some(&mut self.updated_on),
            _ => None,
        }
    }
}

impl Default for DisplayProperties {
    fn default() -> Self {
        Self {
            assignee: true,
            start_date: true,
            due_date: true,
            labels: true,
            key: true,
            priority: true,
            state: true,
            sub_issue_count: true,
            link: true,
            attachment_count: true,
            estimate: true,
            created_on: true,
            updated_on: true,
        }
    }
}

/// The per-scope unit of persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFilters {
    pub filters: FilterOptions,
    pub display_filters: DisplayFilterOptions,
    pub display_properties: DisplayProperties,
}

// ── Patches ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptionsPatch {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub state: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub state_group: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub labels: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub target_date: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub project: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<Option<Vec<String>>>,
}

impl FilterOptionsPatch {
    /// Present keys paired with their new values, in `FilterOptions::KEYS` order.
    pub fn entries(&self) -> Vec<(&'static str, Option<&[String]>)> {
        [
            ("priority", &self.priority),
            ("state", &self.state),
            ("state_group", &self.state_group),
            ("assignees", &self.assignees),
            ("mentions", &self.mentions),
            ("created_by", &self.created_by),
            ("labels", &self.labels),
            ("start_date", &self.start_date),
            ("target_date", &self.target_date),
            ("project", &self.project),
            ("subscriber", &self.subscriber),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key, v.as_deref())))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFiltersPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Option<GroupBy>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub sub_group_by: Option<Option<GroupBy>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub issue_type: Option<Option<IssueTypeFilter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_empty_groups: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_issue: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_target_date: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<CalendarOptions>,
}

impl DisplayFiltersPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPropertiesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_issue_count: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_count: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<bool>,
}

impl DisplayPropertiesPatch {
    /// Present keys paired with their new values, in `DisplayProperties::KEYS` order.
    pub fn entries(&self) -> Vec<(&'static str, bool)> {
        [
            ("assignee", self.assignee),
            ("start_date", self.start_date),
            ("due_date", self.due_date),
            ("labels", self.labels),
            ("key", self.key),
            ("priority", self.priority),
            ("state", self.state),
            ("sub_issue_count", self.sub_issue_count),
            ("link", self.link),
            ("attachment_count", self.attachment_count),
            ("estimate", self.estimate),
            ("created_on", self.created_on),
            ("updated_on", self.updated_on),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Which record of an [`IssueFilters`] an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterUpdateKind {
    Filters,
    DisplayFilters,
    DisplayProperties,
}

impl FilterUpdateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filters => "filters",
            Self::DisplayFilters => "display_filters",
            Self::DisplayProperties => "display_properties",
        }
    }
}

impl fmt::Display for FilterUpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterUpdateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "filters" => Ok(Self::Filters),
            "display_filters" => Ok(Self::DisplayFilters),
            "display_properties" => Ok(Self::DisplayProperties),
            _ => Err(format!("Invalid filter update kind: {}", s)),
        }
    }
}

/// A partial update to one record of a scope's filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    Filters(FilterOptionsPatch),
    DisplayFilters(DisplayFiltersPatch),
    DisplayProperties(DisplayPropertiesPatch),
}

impl FilterUpdate {
    pub fn kind(&self) -> FilterUpdateKind {
        match self {
            Self::Filters(_) => FilterUpdateKind::Filters,
            Self::DisplayFilters(_) => FilterUpdateKind::DisplayFilters,
            Self::DisplayProperties(_) => FilterUpdateKind::DisplayProperties,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Filters(patch) => patch.is_empty(),
            Self::DisplayFilters(patch) => patch.is_empty(),
            Self::DisplayProperties(patch) => patch.is_empty(),
        }
    }

    /// Build an update from a wire kind name and a JSON payload.
    ///
    /// Returns `None` for an unknown kind. Keys whose value does not fit the
    /// kind's patch type are dropped one by one; the rest still apply. A
    /// payload that is not an object yields an empty patch.
    pub fn from_json(kind: &str, payload: serde_json::Value) -> Option<Self> {
        let kind = kind.parse::<FilterUpdateKind>().ok()?;
        Some(match kind {
            FilterUpdateKind::Filters => Self::Filters(parse_patch(payload)),
            FilterUpdateKind::DisplayFilters => Self::DisplayFilters(parse_patch(payload)),
            FilterUpdateKind::DisplayProperties => Self::DisplayProperties(parse_patch(payload)),
        })
    }
}

fn parse_patch<T: DeserializeOwned + Default>(payload: serde_json::Value) -> T {
    let serde_json::Value::Object(map) = payload else {
        return T::default();
    };
    let usable: serde_json::Map<String, serde_json::Value> = map
        .into_iter()
        .filter(|(key, value)| {
            let mut single = serde_json::Map::new();
            single.insert(key.clone(), value.clone());
            serde_json::from_value::<T>(serde_json::Value::Object(single)).is_ok()
        })
        .collect();
    serde_json::from_value(serde_json::Value::Object(usable)).unwrap_or_default()
}

// ── Wire shapes ──────────────────────────────────────────────────────

/// Filter payload as returned by a backing service, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIssueFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_filters: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_properties: Option<serde_json::Value>,
}

/// Body sent to a backing service after an update: exactly one full record.
///
/// Serializes as `{"filters": {..}}`, `{"display_filters": {..}}` or
/// `{"display_properties": {..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPatchBody {
    Filters(FilterOptions),
    DisplayFilters(DisplayFilterOptions),
    DisplayProperties(DisplayProperties),
}

impl FilterPatchBody {
    pub fn kind(&self) -> FilterUpdateKind {
        match self {
            Self::Filters(_) => FilterUpdateKind::Filters,
            Self::DisplayFilters(_) => FilterUpdateKind::DisplayFilters,
            Self::DisplayProperties(_) => FilterUpdateKind::DisplayProperties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layout_round_trips_wire_names() {
        for layout in Layout::ALL {
            assert_eq!(layout.as_str().parse::<Layout>().unwrap(), layout);
            let json = serde_json::to_value(layout).unwrap();
            assert_eq!(json, json!(layout.as_str()));
        }
        assert!("board".parse::<Layout>().is_err());
    }

    #[test]
    fn test_group_by_state_group_uses_dotted_name() {
        let json = serde_json::to_value(GroupBy::StateGroup).unwrap();
        assert_eq!(json, json!("state_detail.group"));
        let parsed: GroupBy = serde_json::from_value(json!("state_detail.group")).unwrap();
        assert_eq!(parsed, GroupBy::StateGroup);
    }

    #[test]
    fn test_display_filters_default_shows_empty_groups() {
        let defaults = DisplayFilterOptions::default();
        assert_eq!(defaults.layout, Layout::List);
        assert!(defaults.show_empty_groups);
        assert!(defaults.group_by.is_none());
        assert_eq!(defaults.order_by, OrderBy::SortOrder);
    }

    #[test]
    fn test_patch_distinguishes_null_from_missing() {
        let patch: DisplayFiltersPatch =
            serde_json::from_value(json!({"group_by": null, "layout": "kanban"})).unwrap();
        assert_eq!(patch.group_by, Some(None));
        assert_eq!(patch.sub_group_by, None);
        assert_eq!(patch.layout, Some(Layout::Kanban));
    }

    #[test]
    fn test_filter_patch_entries_only_lists_present_keys() {
        let patch: FilterOptionsPatch =
            serde_json::from_value(json!({"priority": ["high"], "labels": null})).unwrap();
        let entries = patch.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "priority");
        assert_eq!(entries[1], ("labels", None));
    }

    #[test]
    fn test_patch_body_serializes_single_section() {
        let body = FilterPatchBody::DisplayProperties(DisplayProperties::default());
        let json = serde_json::to_value(&body).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("display_properties"));
    }

    #[test]
    fn test_filter_update_from_json_unknown_kind() {
        assert!(FilterUpdate::from_json("sorting", json!({})).is_none());
        let update = FilterUpdate::from_json("display_filters", json!({"layout": "nope"})).unwrap();
        assert!(update.is_empty());
        assert_eq!(update.kind(), FilterUpdateKind::DisplayFilters);
    }

    #[test]
    fn test_filter_update_from_json_keeps_well_typed_keys() {
        let update = FilterUpdate::from_json(
            "display_filters",
            json!({"layout": "nope", "show_empty_groups": "true", "group_by": "priority"}),
        )
        .unwrap();
        let FilterUpdate::DisplayFilters(patch) = update else {
            panic!("expected a display filters update");
        };
        assert_eq!(patch.group_by, Some(Some(GroupBy::Priority)));
        assert_eq!(patch.layout, None);
        assert_eq!(patch.show_empty_groups, None);

        let update = FilterUpdate::from_json("filters", json!(["not", "an", "object"])).unwrap();
        assert!(update.is_empty());
    }
}
