use std::error::Error;

use crate::cli::output::print_json;
use crate::model::settings::Theme;
use crate::model::task::Task;
use crate::store::{Store, keys};

/// Create the store directory and seed the well-known keys that are still
/// absent. Re-running against an existing store is harmless: present keys
/// keep their values.
pub fn cmd_init(json: bool) -> Result<(), Box<dyn Error>> {
    let dir = super::store_dir();
    let mut store = Store::open(&dir)?;

    let tasks: Vec<Task> = store.get_or_init(keys::TASKS, Vec::new());
    store.set(keys::TASKS, &tasks);

    let projects: Vec<String> = store.get_or_init(keys::PROJECTS, keys::default_projects());
    store.set(keys::PROJECTS, &projects);

    let theme: Theme = store.get_or_init(keys::THEME, Theme::default());
    store.set(keys::THEME, &theme);

    if json {
        print_json(&serde_json::json!({ "store": dir }));
    } else {
        println!("initialized task store at {}", dir.display());
    }
    Ok(())
}
