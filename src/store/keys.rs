//! Well-known store keys and their seeded defaults.
//!
//! The mixed `taskify-`/`trackApply-` prefixes are historical; renaming
//! them would orphan existing stores.

/// Ordered sequence of tasks (all users; views filter by `user_id`)
pub const TASKS: &str = "taskify-tasks";
/// Ordered sequence of project names
pub const PROJECTS: &str = "taskify-projects";
/// Single user record, or absent when logged out
pub const USER: &str = "taskify-user";
/// Color theme preference
pub const THEME: &str = "trackApply-theme";

/// Projects every fresh store starts with
pub fn default_projects() -> Vec<String> {
    vec!["Personal".into(), "Work".into(), "Shopping".into()]
}
