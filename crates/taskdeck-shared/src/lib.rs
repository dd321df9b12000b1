pub mod due;
pub mod filters;
pub mod reorder;
pub mod selection;
pub mod validate;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_key(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrencePattern {
    pub fn as_key(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "none" => Some(Self::None),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDto {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: TaskPriority,
    pub due_date: Option<String>,
    pub category: Option<CategoryDto>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_pattern: RecurrencePattern,
    pub recurrence_end_date: Option<String>,
    pub estimated_minutes: Option<u32>,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub attachment_count: u32,
    #[serde(default)]
    pub position: u32,
    pub created_at: Option<String>,
    pub completed_at: Option<String>,
}

/// Body for task create and full update; one form serves both on the
/// client, so one payload serves both endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TodoPayload {
    pub title: String,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub priority: TaskPriority,
    pub due_date: Option<String>,
    pub estimated_minutes: Option<u32>,
    pub is_pinned: bool,
    pub is_recurring: bool,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_pattern: Option<RecurrencePattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderPayload {
    pub positions: BTreeMap<Uuid, u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Complete,
    Archive,
    Delete,
}

impl BulkAction {
    pub fn done_label(self) -> &'static str {
        match self {
            Self::Complete => "marked as complete",
            Self::Archive => "archived",
            Self::Delete => "deleted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkActionPayload {
    pub action: BulkAction,
    pub todo_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePayload {
    pub user_ids: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDto {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub full_name: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default = "default_theme")]
    pub theme_preference: String,
}

fn default_theme() -> String {
    "light".to_string()
}

impl UserDto {
    /// Avatar initials: first+last initial when both names are set,
    /// otherwise the first letter of the username.
    pub fn initials(&self) -> String {
        let first = self.first_name.chars().next();
        let last = self.last_name.chars().next();
        match (first, last) {
            (Some(f), Some(l)) => format!("{f}{l}").to_uppercase(),
            _ => self
                .username
                .chars()
                .next()
                .map(|ch| ch.to_uppercase().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfResponse {
    #[serde(rename = "csrfToken")]
    pub csrf_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
}

/// Partial profile update; absent fields are left untouched by the
/// backend, which lets the theme toggle push `theme_preference` alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_preference: Option<String>,
}

/// Error body of a non-2xx response. Field-keyed validation errors
/// (`{"username": ["taken"]}`) land in `fields` via the flatten.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl ApiErrorBody {
    pub fn from_message(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            message: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn summary(&self) -> &str {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("Request failed")
    }

    /// First message for a named field, whether the backend sent a list
    /// or a bare string.
    pub fn field_message(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Array(items) => items
                .first()
                .and_then(|item| item.as_str())
                .map(ToString::to_string),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: Uuid,
    pub comment: String,
    #[serde(default)]
    pub username: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentPayload {
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentDto {
    pub id: Uuid,
    pub filename: String,
    pub file_size: u64,
    pub uploaded_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDto {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub template_data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatePayload {
    pub name: String,
    pub description: String,
    pub template_data: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OverviewTotals {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub active: u32,
    #[serde(default)]
    pub overdue: u32,
    #[serde(default)]
    pub completion_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyActivity {
    pub day: String,
    #[serde(default)]
    pub created: u32,
    #[serde(default)]
    pub completed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySlice {
    #[serde(rename = "category__name")]
    pub name: Option<String>,
    #[serde(rename = "category__color")]
    pub color: Option<String>,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatsOverview {
    #[serde(default)]
    pub overview: OverviewTotals,
    #[serde(default)]
    pub daily_activity: Vec<DailyActivity>,
    #[serde(default)]
    pub categories: Vec<CategorySlice>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Created,
    Updated,
    Completed,
    Deleted,
    Shared,
    Commented,
    Attached,
}

impl ActivityAction {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Created => "➕",
            Self::Updated => "✏️",
            Self::Completed => "✅",
            Self::Deleted => "🗑️",
            Self::Shared => "🤝",
            Self::Commented => "💬",
            Self::Attached => "📎",
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Created => "Created task",
            Self::Updated => "Updated task",
            Self::Completed => "Completed task",
            Self::Deleted => "Deleted task",
            Self::Shared => "Shared task",
            Self::Commented => "Commented on",
            Self::Attached => "Attached file to",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub action: ActivityAction,
    pub todo_title: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesDto {
    #[serde(default = "default_view")]
    pub default_view: String,
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,
    #[serde(default)]
    pub show_completed: bool,
    #[serde(default)]
    pub default_priority: TaskPriority,
    #[serde(default)]
    pub email_reminders: bool,
    #[serde(default)]
    pub email_daily_summary: bool,
    #[serde(default)]
    pub email_weekly_summary: bool,
}

fn default_view() -> String {
    "list".to_string()
}

fn default_items_per_page() -> u32 {
    20
}

/// Todo list responses arrive either as a bare array or wrapped in a
/// paginated `{"results": [...]}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskListResponse {
    Paginated { results: Vec<TaskDto> },
    Plain(Vec<TaskDto>),
}

impl TaskListResponse {
    pub fn into_tasks(self) -> Vec<TaskDto> {
        match self {
            Self::Paginated { results } => results,
            Self::Plain(tasks) => tasks,
        }
    }
}

#[cfg(test)]
mod dto_tests {
    use super::*;

    #[test]
    fn task_deserializes_with_sparse_fields() {
        let raw = r#"{
            "id": "5f0c1f9e-3b60-4cbb-9f0a-4dca74a2d4f1",
            "title": "Buy milk",
            "priority": "high",
            "due_date": null,
            "category": null,
            "recurrence_end_date": null,
            "estimated_minutes": null,
            "created_at": null,
            "completed_at": null
        }"#;

        let task: TaskDto = serde_json::from_str(raw).expect("sparse task should parse");
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.priority.label(), "HIGH");
        assert!(task.due_date.is_none());
        assert!(!task.completed);
        assert!(task.tags.is_empty());
        assert_eq!(task.recurrence_pattern, RecurrencePattern::None);
    }

    #[test]
    fn task_list_response_unwraps_both_shapes() {
        let plain: TaskListResponse = serde_json::from_str("[]").expect("plain list");
        assert!(plain.into_tasks().is_empty());

        let paginated: TaskListResponse =
            serde_json::from_str(r#"{"results": []}"#).expect("paginated list");
        assert!(paginated.into_tasks().is_empty());
    }

    #[test]
    fn todo_payload_omits_recurrence_fields_unless_set() {
        let payload = TodoPayload {
            title: "Water plants".to_string(),
            description: String::new(),
            category_id: None,
            priority: TaskPriority::Low,
            due_date: None,
            estimated_minutes: None,
            is_pinned: false,
            is_recurring: false,
            tags: vec![],
            recurrence_pattern: None,
            recurrence_end_date: None,
        };

        let encoded = serde_json::to_string(&payload).expect("encode payload");
        assert!(!encoded.contains("recurrence_pattern"));

        let recurring = TodoPayload {
            is_recurring: true,
            recurrence_pattern: Some(RecurrencePattern::Weekly),
            ..payload
        };
        let encoded = serde_json::to_string(&recurring).expect("encode recurring payload");
        assert!(encoded.contains(r#""recurrence_pattern":"weekly""#));
    }

    #[test]
    fn error_body_prefers_field_lists() {
        let raw = r#"{"username": ["A user with that username already exists."]}"#;
        let body: ApiErrorBody = serde_json::from_str(raw).expect("field error body");
        assert_eq!(
            body.field_message("username").as_deref(),
            Some("A user with that username already exists.")
        );
        assert!(body.field_message("email").is_none());
        assert_eq!(body.summary(), "Request failed");
    }

    #[test]
    fn initials_fall_back_to_username() {
        let user = UserDto {
            id: 7,
            username: "dana".to_string(),
            email: "dana@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            full_name: None,
            bio: String::new(),
            theme_preference: "light".to_string(),
        };
        assert_eq!(user.initials(), "D");
        assert_eq!(user.display_name(), "dana");

        let named = UserDto {
            first_name: "Dana".to_string(),
            last_name: "Reyes".to_string(),
            full_name: Some("Dana Reyes".to_string()),
            ..user
        };
        assert_eq!(named.initials(), "DR");
        assert_eq!(named.display_name(), "Dana Reyes");
    }

    #[test]
    fn category_slice_reads_double_underscore_keys() {
        let raw = r##"{"category__name": "Errands", "category__color": "#6366f1", "total": 4}"##;
        let slice: CategorySlice = serde_json::from_str(raw).expect("category slice");
        assert_eq!(slice.name.as_deref(), Some("Errands"));
        assert_eq!(slice.total, 4);
    }
}
