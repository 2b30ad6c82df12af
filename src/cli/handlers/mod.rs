mod init;
pub use init::cmd_init;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{Local, NaiveDate};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::model::settings::Theme;
use crate::model::task::{Priority, Task, TaskStatus};
use crate::ops::session::Session;
use crate::ops::task_ops::{self, NewTask};
use crate::ops::view::{self, CompletionFilter, DeadlineFilter, SortOption, TaskFilters};
use crate::store::lock::StoreLock;
use crate::store::watcher::{StoreEvent, StoreWatcher};
use crate::store::{Store, keys};

/// Global override for the store directory (set by -C flag)
static STORE_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    let json = cli.json;

    if let Some(ref dir) = cli.store_dir {
        STORE_DIR_OVERRIDE.lock().unwrap().replace(PathBuf::from(dir));
    }

    match cli.command {
        Commands::Init => cmd_init(json),

        // Read commands
        Commands::List(args) => cmd_list(args, json),
        Commands::Show(args) => cmd_show(args, json),
        Commands::Stats => cmd_stats(json),
        Commands::Whoami => cmd_whoami(json),
        Commands::Share(args) => cmd_share(args, json),
        Commands::Watch(args) => cmd_watch(args),

        // Write commands
        Commands::Add(args) => cmd_add(args, json),
        Commands::Toggle(args) => cmd_toggle(args, json),
        Commands::Status(args) => cmd_status(args, json),
        Commands::Edit(args) => cmd_edit(args, json),
        Commands::Delete(args) => cmd_delete(args, json),
        Commands::Mv(args) => cmd_mv(args, json),
        Commands::Project(args) => cmd_project(args, json),

        // Session
        Commands::Login(args) => cmd_login(args, json),
        Commands::Register(args) => cmd_register(args, json),
        Commands::Logout => cmd_logout(json),

        // Settings
        Commands::Theme(args) => cmd_theme(args, json),
    }
}

// ---------------------------------------------------------------------------
// Store plumbing
// ---------------------------------------------------------------------------

/// The store directory: -C override, else XDG data dir.
pub(crate) fn store_dir() -> PathBuf {
    if let Some(dir) = STORE_DIR_OVERRIDE.lock().unwrap().clone() {
        return dir;
    }
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".local").join("share"));
    data_dir.join("taskify")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

fn open_store() -> Result<Store, Box<dyn Error>> {
    Ok(Store::open(store_dir())?)
}

fn require_user(store: &mut Store) -> Result<crate::model::user::User, Box<dyn Error>> {
    Session::new(store)
        .current_user()
        .ok_or_else(|| "not logged in (try `tsk login <email> <password>`)".into())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// Parse helpers
// ---------------------------------------------------------------------------

fn parse_priority(s: &str) -> Result<Priority, Box<dyn Error>> {
    Priority::parse(s)
        .ok_or_else(|| format!("invalid priority \"{s}\" — use low, medium, or high").into())
}

fn parse_status(s: &str) -> Result<TaskStatus, Box<dyn Error>> {
    TaskStatus::parse(s).ok_or_else(|| {
        format!("invalid status \"{s}\" — use pending, in-progress, or completed").into()
    })
}

fn parse_deadline(s: &str) -> Result<NaiveDate, Box<dyn Error>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid deadline \"{s}\" — use YYYY-MM-DD").into())
}

fn parse_theme(s: &str) -> Result<Theme, Box<dyn Error>> {
    Theme::parse(s)
        .ok_or_else(|| format!("invalid theme \"{s}\" — use light, dark, or system").into())
}

fn parse_sort(s: &str) -> Result<SortOption, Box<dyn Error>> {
    SortOption::parse(s).ok_or_else(|| {
        format!("invalid sort \"{s}\" — use created, deadline, priority, or completion").into()
    })
}

fn parse_completion_filter(s: &str) -> Result<CompletionFilter, Box<dyn Error>> {
    CompletionFilter::parse(s)
        .ok_or_else(|| format!("invalid filter \"{s}\" — use all, completed, or incomplete").into())
}

fn parse_deadline_filter(s: &str) -> Result<DeadlineFilter, Box<dyn Error>> {
    DeadlineFilter::parse(s).ok_or_else(|| {
        format!(
            "invalid deadline filter \"{s}\" — use overdue, today, tomorrow, upcoming, later, or no-date"
        )
        .into()
    })
}

/// Resolve a possibly-shortened task id against the user's tasks:
/// exact match first, then unique prefix.
fn resolve_id(tasks: &[Task], input: &str) -> Result<String, Box<dyn Error>> {
    if let Some(task) = tasks.iter().find(|t| t.id == input) {
        return Ok(task.id.clone());
    }
    let matches: Vec<&Task> = tasks.iter().filter(|t| t.id.starts_with(input)).collect();
    match matches.len() {
        1 => Ok(matches[0].id.clone()),
        0 => Err(format!("task not found: {input}").into()),
        n => Err(format!("ambiguous task id \"{input}\" ({n} matches)").into()),
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let mut store = open_store()?;
    let user = require_user(&mut store)?;
    let all_tasks: Vec<Task> = store.get_or_init(keys::TASKS, Vec::new());
    let mine = view::tasks_for_user(&all_tasks, &user.id);

    let filters = TaskFilters {
        completion: match args.filter.as_deref() {
            Some(s) => parse_completion_filter(s)?,
            None => CompletionFilter::All,
        },
        status: args.status.as_deref().map(parse_status).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        project: args.project,
        tag: args.tag,
        deadline: match args.deadline.as_deref() {
            Some(s) => parse_deadline_filter(s)?,
            None => DeadlineFilter::All,
        },
        search: args.search,
    };
    let sort = match args.sort.as_deref() {
        Some(s) => parse_sort(s)?,
        None => SortOption::Created,
    };

    let today = today();
    let visible = view::sort_tasks(&view::filter_tasks(&mine, &filters, today), sort);

    if json {
        print_json(&TaskListJson { tasks: &visible });
    } else {
        print_tasks(&visible, today);
    }
    Ok(())
}

fn cmd_show(args: IdArg, json: bool) -> Result<(), Box<dyn Error>> {
    let mut store = open_store()?;
    let user = require_user(&mut store)?;
    let all_tasks: Vec<Task> = store.get_or_init(keys::TASKS, Vec::new());
    let mine = view::tasks_for_user(&all_tasks, &user.id);
    let id = resolve_id(&mine, &args.id)?;
    let task = mine.iter().find(|t| t.id == id).expect("id just resolved");

    if json {
        print_json(task);
    } else {
        print_task_detail(task, today());
    }
    Ok(())
}

fn cmd_stats(json: bool) -> Result<(), Box<dyn Error>> {
    let mut store = open_store()?;
    let user = require_user(&mut store)?;
    let all_tasks: Vec<Task> = store.get_or_init(keys::TASKS, Vec::new());
    let mine = view::tasks_for_user(&all_tasks, &user.id);
    let stats = view::collect_stats(&mine, today());

    if json {
        print_json(&stats);
    } else {
        print_stats(&stats);
    }
    Ok(())
}

fn cmd_whoami(json: bool) -> Result<(), Box<dyn Error>> {
    let mut store = open_store()?;
    let user = require_user(&mut store)?;
    if json {
        print_json(&UserJson { user: &user });
    } else {
        print_user(&user);
    }
    Ok(())
}

fn cmd_share(args: ShareArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let link = crate::ops::share::share_link(&args.origin);
    if json {
        print_json(&ShareJson { link: &link });
    } else {
        println!("{}", link);
        println!("(mock link — there is nothing behind it)");
    }
    Ok(())
}

fn cmd_watch(args: WatchArgs) -> Result<(), Box<dyn Error>> {
    let mut store = open_store()?;
    // Track the well-known keys so external changes to them are applied
    let _: Vec<Task> = store.get_or_init(keys::TASKS, Vec::new());
    let _: Vec<String> = store.get_or_init(keys::PROJECTS, keys::default_projects());
    let _: Option<crate::model::user::User> = store.get_or_init(keys::USER, None);
    let _: Theme = store.get_or_init(keys::THEME, Theme::default());

    let watcher = StoreWatcher::start(store.dir())?;
    eprintln!("watching {} (ctrl-c to stop)", store.dir().display());

    loop {
        std::thread::sleep(Duration::from_millis(args.interval_ms));
        let mut changed = Vec::new();
        for event in watcher.poll() {
            let StoreEvent::Changed(keys) = event;
            changed.extend(keys);
        }
        if changed.is_empty() {
            continue;
        }
        changed.sort();
        changed.dedup();
        for key in store.apply_changes(&changed) {
            println!("{}", key);
        }
        if args.once {
            return Ok(());
        }
    }
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let _lock = StoreLock::acquire_default(&store_dir())?;
    let mut store = open_store()?;
    let user = require_user(&mut store)?;

    let mut new = NewTask::new(args.text);
    new.description = args.description;
    if let Some(s) = args.priority.as_deref() {
        new.priority = parse_priority(s)?;
    }
    if let Some(s) = args.status.as_deref() {
        new.status = parse_status(s)?;
    }
    if let Some(s) = args.deadline.as_deref() {
        new.deadline = Some(parse_deadline(s)?);
    }
    new.project = args.project.clone();
    new.tags = args.tag.into_iter().collect();

    let mut tasks: Vec<Task> = store.get_or_init(keys::TASKS, Vec::new());
    let id = task_ops::add_task(&mut tasks, new, &user.id);
    store.set(keys::TASKS, &tasks);

    if let Some(project) = &args.project {
        let mut projects: Vec<String> = store.get_or_init(keys::PROJECTS, keys::default_projects());
        if task_ops::add_project(&mut projects, project) {
            store.set(keys::PROJECTS, &projects);
        }
    }

    if json {
        print_json(&AddedJson { id: &id });
    } else {
        println!("added {}", short_id(&id));
    }
    Ok(())
}

/// Shared shape of the task write commands: lock, load, resolve, mutate, persist.
fn with_tasks<F>(input_id: &str, f: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut Vec<Task>, &str) -> Result<(), Box<dyn Error>>,
{
    let _lock = StoreLock::acquire_default(&store_dir())?;
    let mut store = open_store()?;
    let user = require_user(&mut store)?;

    let mut tasks: Vec<Task> = store.get_or_init(keys::TASKS, Vec::new());
    let mine = view::tasks_for_user(&tasks, &user.id);
    let id = resolve_id(&mine, input_id)?;
    f(&mut tasks, &id)?;
    store.set(keys::TASKS, &tasks);
    Ok(())
}

fn cmd_toggle(args: IdArg, json: bool) -> Result<(), Box<dyn Error>> {
    let mut new_status = TaskStatus::Pending;
    with_tasks(&args.id, |tasks, id| {
        new_status = task_ops::toggle_completion(tasks, id)?;
        Ok(())
    })?;
    if json {
        print_json(&serde_json::json!({ "status": new_status }));
    } else {
        println!("now {}", new_status.label());
    }
    Ok(())
}

fn cmd_status(args: StatusArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let status = parse_status(&args.status)?;
    with_tasks(&args.id, |tasks, id| {
        task_ops::set_status(tasks, id, status)?;
        Ok(())
    })?;
    if json {
        print_json(&serde_json::json!({ "status": status }));
    } else {
        println!("now {}", status.label());
    }
    Ok(())
}

fn cmd_edit(args: EditArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let EditArgs {
        id: input_id,
        text,
        description,
        priority,
        deadline,
        clear_deadline,
        project,
    } = args;
    let priority = priority.as_deref().map(parse_priority).transpose()?;
    let deadline = deadline.as_deref().map(parse_deadline).transpose()?;

    with_tasks(&input_id, |tasks, task_id| {
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .expect("id just resolved");
        if let Some(text) = text {
            task.text = text;
        }
        if let Some(description) = description {
            task.description = Some(description);
        }
        if let Some(priority) = priority {
            task.priority = priority;
        }
        if let Some(deadline) = deadline {
            task.deadline = Some(deadline);
        }
        if clear_deadline {
            task.deadline = None;
        }
        if let Some(project) = project {
            task.project = Some(project);
        }
        Ok(())
    })?;

    if json {
        print_json(&serde_json::json!({ "edited": true }));
    } else {
        println!("edited");
    }
    Ok(())
}

fn cmd_delete(args: IdArg, json: bool) -> Result<(), Box<dyn Error>> {
    with_tasks(&args.id, |tasks, id| {
        task_ops::delete_task(tasks, id)?;
        Ok(())
    })?;
    if json {
        print_json(&serde_json::json!({ "deleted": true }));
    } else {
        println!("deleted");
    }
    Ok(())
}

fn cmd_mv(args: MvArgs, json: bool) -> Result<(), Box<dyn Error>> {
    if !args.top && args.before.is_none() {
        return Err("nothing to do: pass --top or --before <ID>".into());
    }
    with_tasks(&args.id, |tasks, id| {
        if args.top {
            task_ops::move_task_to_top(tasks, id)?;
        } else if let Some(before) = &args.before {
            // The target must belong to the same user as the moved task, so
            // a short id cannot land on another user's task
            let owner = tasks
                .iter()
                .find(|t| t.id == id)
                .map(|t| t.user_id.clone())
                .expect("id just resolved");
            let mine = view::tasks_for_user(tasks, &owner);
            let target = resolve_id(&mine, before)?;
            task_ops::move_task(tasks, id, &target)?;
        }
        Ok(())
    })?;
    if json {
        print_json(&serde_json::json!({ "moved": true }));
    } else {
        println!("moved");
    }
    Ok(())
}

fn cmd_project(args: ProjectCmd, json: bool) -> Result<(), Box<dyn Error>> {
    match args.action {
        None | Some(ProjectAction::List) => {
            let mut store = open_store()?;
            let projects: Vec<String> =
                store.get_or_init(keys::PROJECTS, keys::default_projects());
            if json {
                print_json(&projects);
            } else {
                for project in &projects {
                    println!("{}", project);
                }
            }
        }
        Some(ProjectAction::Add(add)) => {
            let _lock = StoreLock::acquire_default(&store_dir())?;
            let mut store = open_store()?;
            let mut projects: Vec<String> =
                store.get_or_init(keys::PROJECTS, keys::default_projects());
            if task_ops::add_project(&mut projects, &add.name) {
                store.set(keys::PROJECTS, &projects);
                if !json {
                    println!("added project {}", add.name);
                }
            } else if !json {
                println!("project {} already exists", add.name);
            }
            if json {
                print_json(&projects);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Session commands
// ---------------------------------------------------------------------------

fn cmd_login(args: LoginArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let _lock = StoreLock::acquire_default(&store_dir())?;
    let mut store = open_store()?;
    let user = Session::new(&mut store).login(&args.email, &args.password)?;
    if json {
        print_json(&UserJson { user: &user });
    } else {
        println!("logged in as {} <{}>", user.name, user.email);
    }
    Ok(())
}

fn cmd_register(args: RegisterArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let _lock = StoreLock::acquire_default(&store_dir())?;
    let mut store = open_store()?;
    let user = Session::new(&mut store).register(&args.name, &args.email, &args.password)?;
    if json {
        print_json(&UserJson { user: &user });
    } else {
        println!("registered {} <{}>", user.name, user.email);
    }
    Ok(())
}

fn cmd_logout(json: bool) -> Result<(), Box<dyn Error>> {
    let _lock = StoreLock::acquire_default(&store_dir())?;
    let mut store = open_store()?;
    Session::new(&mut store).logout();
    if json {
        print_json(&serde_json::json!({ "logged_out": true }));
    } else {
        println!("logged out");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

fn cmd_theme(args: ThemeArgs, json: bool) -> Result<(), Box<dyn Error>> {
    let theme = match args.theme.as_deref() {
        Some(s) => {
            let theme = parse_theme(s)?;
            let _lock = StoreLock::acquire_default(&store_dir())?;
            let mut store = open_store()?;
            store.set(keys::THEME, &theme);
            theme
        }
        None => open_store()?.get_or_init(keys::THEME, Theme::default()),
    };
    if json {
        print_json(&ThemeJson {
            theme: theme.label(),
        });
    } else {
        println!("{}", theme.label());
    }
    Ok(())
}
