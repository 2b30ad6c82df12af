use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tsk", about = concat!("[*] taskify v", env!("CARGO_PKG_VERSION"), " - your tasks live in a folder"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different store directory
    #[arg(short = 'C', long = "store-dir", global = true)]
    pub store_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize (or re-seed) the task store
    Init,
    /// Add a task
    Add(AddArgs),
    /// List your tasks with filters and sorting
    List(ListArgs),
    /// Show task details
    Show(IdArg),
    /// Toggle a task's completion
    Toggle(IdArg),
    /// Change a task's status
    Status(StatusArgs),
    /// Edit a task's fields
    Edit(EditArgs),
    /// Delete a task
    Delete(IdArg),
    /// Reorder a task
    Mv(MvArgs),
    /// List projects, or add a new one
    Project(ProjectCmd),
    /// Log in with a mock account
    Login(LoginArgs),
    /// Register a mock account
    Register(RegisterArgs),
    /// Log out
    Logout,
    /// Show the current user
    Whoami,
    /// Show or set the color theme
    Theme(ThemeArgs),
    /// Show task statistics
    Stats,
    /// Generate a share link for your list (mock, no backing resource)
    Share(ShareArgs),
    /// Watch the store and report keys as other processes change them
    Watch(WatchArgs),
}

// ---------------------------------------------------------------------------
// Task command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub text: String,
    /// Longer description
    #[arg(long)]
    pub description: Option<String>,
    /// Priority (low, medium, high)
    #[arg(long)]
    pub priority: Option<String>,
    /// Initial status (pending, in-progress, completed)
    #[arg(long)]
    pub status: Option<String>,
    /// Deadline (YYYY-MM-DD)
    #[arg(long)]
    pub deadline: Option<String>,
    /// Project to file the task under (registered if new)
    #[arg(long)]
    pub project: Option<String>,
    /// Tag(s) to add (repeatable)
    #[arg(long)]
    pub tag: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Completion filter (all, completed, incomplete)
    #[arg(long)]
    pub filter: Option<String>,
    /// Filter by status (pending, in-progress, completed)
    #[arg(long)]
    pub status: Option<String>,
    /// Filter by priority (low, medium, high)
    #[arg(long)]
    pub priority: Option<String>,
    /// Filter by project
    #[arg(long)]
    pub project: Option<String>,
    /// Filter by tag
    #[arg(long)]
    pub tag: Option<String>,
    /// Deadline bucket (overdue, today, tomorrow, upcoming, later, no-date)
    #[arg(long)]
    pub deadline: Option<String>,
    /// Substring search over text, description, and tags
    #[arg(long)]
    pub search: Option<String>,
    /// Sort order (created, deadline, priority, completion)
    #[arg(long)]
    pub sort: Option<String>,
}

#[derive(Args)]
pub struct IdArg {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Task ID
    pub id: String,
    /// New status (pending, in-progress, completed)
    pub status: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: String,
    /// New task text
    #[arg(long)]
    pub text: Option<String>,
    /// New description
    #[arg(long)]
    pub description: Option<String>,
    /// New priority (low, medium, high)
    #[arg(long)]
    pub priority: Option<String>,
    /// New deadline (YYYY-MM-DD)
    #[arg(long)]
    pub deadline: Option<String>,
    /// Remove the deadline
    #[arg(long, conflicts_with = "deadline")]
    pub clear_deadline: bool,
    /// New project
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task ID
    pub id: String,
    /// Move before this task ID
    #[arg(long)]
    pub before: Option<String>,
    /// Move to the top of the list
    #[arg(long, conflicts_with = "before")]
    pub top: bool,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: Option<ProjectAction>,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects (default)
    List,
    /// Add a project
    Add(ProjectAddArgs),
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Project name
    pub name: String,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct LoginArgs {
    /// Email address
    pub email: String,
    /// Password (not validated beyond being non-empty; this is a mock)
    pub password: String,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Password (at least 8 characters)
    pub password: String,
}

// ---------------------------------------------------------------------------
// Settings and misc
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ThemeArgs {
    /// Theme to set (light, dark, system); omit to show the current theme
    pub theme: Option<String>,
}

#[derive(Args)]
pub struct ShareArgs {
    /// Origin to embed in the link
    #[arg(long, default_value = "https://taskify.local")]
    pub origin: String,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Poll interval in milliseconds
    #[arg(long, default_value = "200")]
    pub interval_ms: u64,
    /// Exit after the first batch of changes
    #[arg(long)]
    pub once: bool,
}
