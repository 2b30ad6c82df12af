use chrono::{NaiveDate, Utc};
use indexmap::IndexSet;
use uuid::Uuid;

use crate::model::task::{Priority, Task, TaskStatus};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
}

/// Caller-supplied fields for a new task. The id, creation timestamp, and
/// owner are assigned by `add_task`.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub text: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub deadline: Option<NaiveDate>,
    pub project: Option<String>,
    pub tags: IndexSet<String>,
}

impl NewTask {
    pub fn new(text: impl Into<String>) -> Self {
        NewTask {
            text: text.into(),
            description: None,
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            deadline: None,
            project: None,
            tags: IndexSet::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Task CRUD
// ---------------------------------------------------------------------------

/// Add a task owned by `user_id`. New tasks are prepended so the default
/// (newest-first) view shows them on top. Returns the assigned ID.
pub fn add_task(tasks: &mut Vec<Task>, new: NewTask, user_id: &str) -> String {
    let id = Uuid::new_v4().to_string();
    let task = Task {
        id: id.clone(),
        text: new.text,
        description: new.description,
        completed: new.status == TaskStatus::Completed,
        status: new.status,
        priority: new.priority,
        deadline: new.deadline,
        created_at: Utc::now(),
        user_id: user_id.to_string(),
        project: new.project,
        tags: new.tags,
    };
    tasks.insert(0, task);
    id
}

/// Replace a task wholesale, re-deriving the completion flag so an edited
/// payload cannot smuggle in a divergent `completed`.
pub fn update_task(tasks: &mut [Task], mut updated: Task) -> Result<(), TaskError> {
    updated.completed = updated.status == TaskStatus::Completed;
    let slot = tasks
        .iter_mut()
        .find(|t| t.id == updated.id)
        .ok_or_else(|| TaskError::NotFound(updated.id.clone()))?;
    *slot = updated;
    Ok(())
}

pub fn delete_task(tasks: &mut Vec<Task>, id: &str) -> Result<(), TaskError> {
    let before = tasks.len();
    tasks.retain(|t| t.id != id);
    if tasks.len() == before {
        return Err(TaskError::NotFound(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// State transitions
// ---------------------------------------------------------------------------

/// Toggle completion on a task. Returns the new status.
pub fn toggle_completion(tasks: &mut [Task], id: &str) -> Result<TaskStatus, TaskError> {
    let task = find_mut(tasks, id)?;
    task.toggle_completion();
    Ok(task.status)
}

pub fn set_status(tasks: &mut [Task], id: &str, status: TaskStatus) -> Result<(), TaskError> {
    let task = find_mut(tasks, id)?;
    task.set_status(status);
    Ok(())
}

// ---------------------------------------------------------------------------
// Reordering
// ---------------------------------------------------------------------------

/// Move the task `id` so it sits immediately before `before_id`, by identity
/// rather than by index: the caller may be looking at a filtered or sorted
/// view whose indices do not line up with the backing array.
pub fn move_task(tasks: &mut Vec<Task>, id: &str, before_id: &str) -> Result<(), TaskError> {
    if id == before_id {
        return Ok(());
    }
    let from = position(tasks, id)?;
    // Validate the target before mutating so a bad id cannot drop the task
    position(tasks, before_id)?;
    let moved = tasks.remove(from);
    let to = position(tasks, before_id)?;
    tasks.insert(to, moved);
    Ok(())
}

/// Move the task `id` to the front of the list.
pub fn move_task_to_top(tasks: &mut Vec<Task>, id: &str) -> Result<(), TaskError> {
    let from = position(tasks, id)?;
    let moved = tasks.remove(from);
    tasks.insert(0, moved);
    Ok(())
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Append a project name if not already present. Returns true when added.
pub fn add_project(projects: &mut Vec<String>, name: &str) -> bool {
    if projects.iter().any(|p| p == name) {
        return false;
    }
    projects.push(name.to_string());
    true
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn find_mut<'a>(tasks: &'a mut [Task], id: &str) -> Result<&'a mut Task, TaskError> {
    tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| TaskError::NotFound(id.to_string()))
}

fn position(tasks: &[Task], id: &str) -> Result<usize, TaskError> {
    tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| TaskError::NotFound(id.to_string()))
}
