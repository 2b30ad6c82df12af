use chrono::NaiveDate;
use serde::Serialize;

use crate::model::task::Task;
use crate::model::user::User;
use crate::ops::view::{self, TaskStats};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskListJson<'a> {
    pub tasks: &'a [Task],
}

#[derive(Serialize)]
pub struct AddedJson<'a> {
    pub id: &'a str,
}

#[derive(Serialize)]
pub struct UserJson<'a> {
    pub user: &'a User,
}

#[derive(Serialize)]
pub struct ThemeJson<'a> {
    pub theme: &'a str,
}

#[derive(Serialize)]
pub struct ShareJson<'a> {
    pub link: &'a str,
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("error: could not serialize output: {}", e),
    }
}

// ---------------------------------------------------------------------------
// Plain-text rendering
// ---------------------------------------------------------------------------

/// One-line task rendering:
/// `[x] a1b2c3d4 Buy milk (High) due Tomorrow [Shopping] #errand`
pub fn task_line(task: &Task, today: NaiveDate) -> String {
    let mut line = format!(
        "[{}] {} {}",
        task.status.checkbox_char(),
        short_id(&task.id),
        task.text
    );
    line.push_str(&format!(" ({})", task.priority.label()));
    if let Some(deadline) = task.deadline {
        line.push_str(&format!(" due {}", view::deadline_label(deadline, today)));
    }
    if let Some(project) = &task.project {
        line.push_str(&format!(" [{}]", project));
    }
    for tag in &task.tags {
        line.push_str(&format!(" #{}", tag));
    }
    line
}

pub fn print_tasks(tasks: &[Task], today: NaiveDate) {
    if tasks.is_empty() {
        println!("No tasks found. Add a new task or change your filters.");
        return;
    }
    for task in tasks {
        println!("{}", task_line(task, today));
    }
}

pub fn print_task_detail(task: &Task, today: NaiveDate) {
    println!("{}", task.text);
    println!("  id:        {}", task.id);
    println!("  status:    {}", task.status.label());
    println!("  priority:  {}", task.priority.label());
    if let Some(description) = &task.description {
        println!("  notes:     {}", description);
    }
    if let Some(deadline) = task.deadline {
        println!(
            "  deadline:  {} ({})",
            deadline,
            view::deadline_label(deadline, today)
        );
    }
    if let Some(project) = &task.project {
        println!("  project:   {}", project);
    }
    if !task.tags.is_empty() {
        let tags: Vec<String> = task.tags.iter().map(|t| format!("#{}", t)).collect();
        println!("  tags:      {}", tags.join(" "));
    }
    println!("  created:   {}", task.created_at.format("%Y-%m-%d %H:%M"));
}

pub fn print_stats(stats: &TaskStats) {
    println!("total:       {}", stats.total);
    println!("pending:     {}", stats.pending);
    println!("in progress: {}", stats.in_progress);
    println!("completed:   {}", stats.completed);
    println!("overdue:     {}", stats.overdue);
}

pub fn print_user(user: &User) {
    println!("{} <{}>", user.name, user.email);
    if let Some(avatar) = &user.avatar {
        println!("avatar: {}", avatar);
    }
}

/// First eight characters of an ID, enough to disambiguate in a small list
pub fn short_id(id: &str) -> &str {
    if id.len() > 8 { &id[..8] } else { id }
}
