use std::cmp::Ordering;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::task::{Priority, Task, TaskStatus};

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Task sort options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    /// Newest first (default)
    #[default]
    Created,
    /// Ascending by date; tasks without a deadline sort last
    Deadline,
    /// High > Medium > Low
    Priority,
    /// Incomplete before complete
    Completion,
}

impl SortOption {
    pub fn parse(s: &str) -> Option<SortOption> {
        match s.to_ascii_lowercase().as_str() {
            "created" => Some(SortOption::Created),
            "deadline" => Some(SortOption::Deadline),
            "priority" => Some(SortOption::Priority),
            "completion" => Some(SortOption::Completion),
            _ => None,
        }
    }
}

/// Sort a copy of `tasks` by the given option. All comparators are stable:
/// ties keep the input (insertion) order.
pub fn sort_tasks(tasks: &[Task], option: SortOption) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    match option {
        SortOption::Deadline => sorted.sort_by(|a, b| match (a.deadline, b.deadline) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => x.cmp(&y),
        }),
        SortOption::Priority => sorted.sort_by(|a, b| b.priority.cmp(&a.priority)),
        SortOption::Completion => sorted.sort_by(|a, b| a.completed.cmp(&b.completed)),
        SortOption::Created => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    sorted
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompletionFilter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl CompletionFilter {
    pub fn parse(s: &str) -> Option<CompletionFilter> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Some(CompletionFilter::All),
            "completed" => Some(CompletionFilter::Completed),
            "incomplete" => Some(CompletionFilter::Incomplete),
            _ => None,
        }
    }
}

/// Deadline buckets relative to "today". `Upcoming` spans today through the
/// next seven days inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeadlineFilter {
    #[default]
    All,
    Overdue,
    Today,
    Tomorrow,
    Upcoming,
    Later,
    NoDate,
}

impl DeadlineFilter {
    pub fn parse(s: &str) -> Option<DeadlineFilter> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Some(DeadlineFilter::All),
            "overdue" => Some(DeadlineFilter::Overdue),
            "today" => Some(DeadlineFilter::Today),
            "tomorrow" => Some(DeadlineFilter::Tomorrow),
            "upcoming" => Some(DeadlineFilter::Upcoming),
            "later" => Some(DeadlineFilter::Later),
            "no-date" => Some(DeadlineFilter::NoDate),
            _ => None,
        }
    }
}

/// Conjunction of task filters. A task must pass every populated field.
#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    pub completion: CompletionFilter,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project: Option<String>,
    pub tag: Option<String>,
    pub deadline: DeadlineFilter,
    /// Case-insensitive substring over text, description, and tags
    pub search: Option<String>,
}

impl TaskFilters {
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self.completion {
            CompletionFilter::Completed if !task.completed => return false,
            CompletionFilter::Incomplete if task.completed => return false,
            _ => {}
        }

        if let Some(status) = self.status
            && task.status != status
        {
            return false;
        }
        if let Some(priority) = self.priority
            && task.priority != priority
        {
            return false;
        }
        if let Some(project) = &self.project
            && task.project.as_deref() != Some(project.as_str())
        {
            return false;
        }
        if let Some(tag) = &self.tag
            && !task.tags.contains(tag.as_str())
        {
            return false;
        }

        if self.deadline != DeadlineFilter::All {
            match task.deadline {
                // Tasks without a deadline match only the no-date bucket
                None => {
                    if self.deadline != DeadlineFilter::NoDate {
                        return false;
                    }
                }
                Some(deadline) => {
                    let tomorrow = today + Duration::days(1);
                    let next_week = today + Duration::days(7);
                    let keep = match self.deadline {
                        DeadlineFilter::Overdue => deadline < today,
                        DeadlineFilter::Today => deadline == today,
                        DeadlineFilter::Tomorrow => deadline == tomorrow,
                        DeadlineFilter::Upcoming => deadline >= today && deadline <= next_week,
                        DeadlineFilter::Later => deadline > next_week,
                        DeadlineFilter::NoDate => false,
                        DeadlineFilter::All => true,
                    };
                    if !keep {
                        return false;
                    }
                }
            }
        }

        if let Some(query) = &self.search {
            let query = query.to_lowercase();
            return task.text.to_lowercase().contains(&query)
                || task
                    .description
                    .as_deref()
                    .unwrap_or("")
                    .to_lowercase()
                    .contains(&query)
                || task.tags.iter().any(|t| t.to_lowercase().contains(&query));
        }

        true
    }
}

/// Filter a copy of `tasks`, keeping input order.
pub fn filter_tasks(tasks: &[Task], filters: &TaskFilters, today: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| filters.matches(t, today))
        .cloned()
        .collect()
}

/// Tasks owned by `user_id`, in input order.
pub fn tasks_for_user(tasks: &[Task], user_id: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.user_id == user_id)
        .cloned()
        .collect()
}

/// All distinct tags across `tasks`, sorted for display.
pub fn all_tags(tasks: &[Task]) -> Vec<String> {
    let mut tags: Vec<String> = tasks
        .iter()
        .flat_map(|t| t.tags.iter().cloned())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

// ---------------------------------------------------------------------------
// Labels and tones
// ---------------------------------------------------------------------------

/// Human-readable deadline: "Today", "Tomorrow", "Overdue", a weekday name
/// within the next week, or "Jun 3".
pub fn deadline_label(deadline: NaiveDate, today: NaiveDate) -> String {
    if deadline == today {
        "Today".to_string()
    } else if deadline == today + Duration::days(1) {
        "Tomorrow".to_string()
    } else if deadline < today {
        "Overdue".to_string()
    } else if deadline <= today + Duration::days(7) {
        deadline.format("%A").to_string()
    } else {
        deadline.format("%b %-d").to_string()
    }
}

/// Severity bucket for badges. The presentation layer maps these to whatever
/// colors it likes; the library only classifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Info,
    Notice,
    Urgent,
    Success,
}

pub fn priority_tone(priority: Priority) -> Tone {
    match priority {
        Priority::Low => Tone::Info,
        Priority::Medium => Tone::Notice,
        Priority::High => Tone::Urgent,
    }
}

pub fn status_tone(status: TaskStatus) -> Tone {
    match status {
        TaskStatus::Pending => Tone::Neutral,
        TaskStatus::InProgress => Tone::Info,
        TaskStatus::Completed => Tone::Success,
    }
}

pub fn deadline_tone(deadline: NaiveDate, today: NaiveDate) -> Tone {
    if deadline < today {
        Tone::Urgent
    } else if deadline == today {
        Tone::Notice
    } else {
        Tone::Neutral
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub overdue: usize,
}

pub fn collect_stats(tasks: &[Task], today: NaiveDate) -> TaskStats {
    let mut stats = TaskStats::default();
    for task in tasks {
        stats.total += 1;
        match task.status {
            TaskStatus::Pending => stats.pending += 1,
            TaskStatus::InProgress => stats.in_progress += 1,
            TaskStatus::Completed => stats.completed += 1,
        }
        if task.is_overdue(today) {
            stats.overdue += 1;
        }
    }
    stats
}
