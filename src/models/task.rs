use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a task.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low priority.
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
    /// Urgent priority.
    Urgent,
}

/// Represents the status of a task.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Todo,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed and under review.
    Review,
    /// Task is completed.
    Done,
}

/// Input structure for creating or updating a task.
/// Contains validation rules for its fields.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// The priority of the task.
    pub priority: Option<TaskPriority>,

    /// Optional due date for the task.
    pub due_date: Option<DateTime<Utc>>,

    /// The current status of the task. Defaults to `todo` when omitted.
    #[serde(default)]
    pub status: TaskStatus,
}

/// A task as stored in the task collection and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Identifier of the user who owns the task.
    pub user_id: i64,
}

/// Query parameters for filtering tasks when listing them.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Filter tasks by status.
    pub status: Option<TaskStatus>,
    /// Filter tasks by priority.
    pub priority: Option<TaskPriority>,
    /// Case-insensitive substring match against title or description.
    pub search: Option<String>,
}

impl Task {
    /// Creates a new `Task` owned by `user_id`, stamped with the current time.
    pub fn new(input: TaskInput, user_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: input.status,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
            user_id,
        }
    }

    /// Overwrites the user-editable fields and bumps `updated_at`.
    pub fn apply(&mut self, input: TaskInput) {
        self.title = input.title;
        self.description = input.description;
        self.priority = input.priority;
        self.status = input.status;
        self.due_date = input.due_date;
        self.updated_at = Utc::now();
    }

    pub fn matches(&self, query: &TaskQuery) -> bool {
        if query.status.is_some_and(|status| status != self.status) {
            return false;
        }
        if query.priority.is_some() && query.priority != self.priority {
            return false;
        }
        match query.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                self.title.to_lowercase().contains(&term)
                    || self
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}
