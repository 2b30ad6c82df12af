use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Task priority level. `Ord` follows urgency: Low < Medium < High.
/// Serialized capitalized (`"Low"`, `"Medium"`, `"High"`), matching stored
/// payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Parse a user-supplied priority name (case-insensitive)
    pub fn parse(s: &str) -> Option<Priority> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Parse a user-supplied status name (case-insensitive)
    pub fn parse(s: &str) -> Option<TaskStatus> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(TaskStatus::Pending),
            "in-progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// The character used inside the list checkbox `[ ]`
    pub fn checkbox_char(self) -> char {
        match self {
            TaskStatus::Pending => ' ',
            TaskStatus::InProgress => '>',
            TaskStatus::Completed => 'x',
        }
    }
}

/// A to-do item.
///
/// `status` is the source of truth for completion: `completed` is derived
/// (`status == Completed`) and every status change goes through
/// [`Task::set_status`], which keeps the two in lock-step. The flag is still
/// stored so persisted payloads stay self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique ID
    pub id: String,
    /// Task title text
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Derived: true iff `status == Completed`
    pub completed: bool,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    /// Owning user
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Tags, insertion order preserved for display
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub tags: IndexSet<String>,
}

impl Task {
    /// Create a pending, medium-priority task owned by `user_id`
    pub fn new(text: impl Into<String>, user_id: impl Into<String>) -> Self {
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            description: None,
            completed: false,
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            deadline: None,
            created_at: Utc::now(),
            user_id: user_id.into(),
            project: None,
            tags: IndexSet::new(),
        }
    }

    /// Set the status and re-derive the completion flag.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.completed = status == TaskStatus::Completed;
    }

    /// Toggle completion: pending/in-progress → completed, completed → pending.
    /// Uncompleting never restores in-progress.
    pub fn toggle_completion(&mut self) {
        if self.status == TaskStatus::Completed {
            self.set_status(TaskStatus::Pending);
        } else {
            self.set_status(TaskStatus::Completed);
        }
    }

    /// A task is overdue when its deadline is strictly before `today` and it
    /// is not completed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.deadline {
            Some(deadline) => deadline < today && !self.completed,
            None => false,
        }
    }
}
