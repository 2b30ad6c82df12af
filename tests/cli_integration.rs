//! Integration tests for the `tsk` CLI.
//!
//! Each test creates a temp store directory, runs `tsk` as a subprocess
//! against it with `-C`, and verifies stdout and/or store file contents.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use taskify::store::lock::StoreLock;

/// Get the path to the built `tsk` binary.
fn tsk_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tsk");
    path
}

/// Run `tsk` against the given store dir, returning (stdout, stderr, success).
fn run_tsk(store_dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(tsk_bin())
        .arg("-C")
        .arg(store_dir)
        .args(args)
        .output()
        .expect("failed to run tsk");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `tsk` expecting success, return stdout.
fn run_tsk_ok(store_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_tsk(store_dir, args);
    if !success {
        panic!(
            "tsk {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// A logged-in store, ready for task commands.
fn logged_in_store() -> TempDir {
    let tmp = TempDir::new().unwrap();
    run_tsk_ok(tmp.path(), &["init"]);
    run_tsk_ok(
        tmp.path(),
        &["register", "Ada", "ada@example.com", "long enough password"],
    );
    tmp
}

fn list_json(store_dir: &Path, extra: &[&str]) -> serde_json::Value {
    let mut args = vec!["list", "--json"];
    args.extend_from_slice(extra);
    let stdout = run_tsk_ok(store_dir, &args);
    serde_json::from_str(&stdout).expect("list --json should emit valid JSON")
}

// ============================================================================
// Store lifecycle
// ============================================================================

#[test]
fn init_seeds_store_files() {
    let tmp = TempDir::new().unwrap();
    run_tsk_ok(tmp.path(), &["init"]);

    assert!(tmp.path().join("taskify-tasks.json").exists());
    assert!(tmp.path().join("taskify-projects.json").exists());
    assert!(tmp.path().join("trackApply-theme.json").exists());
}

#[test]
fn task_commands_require_login() {
    let tmp = TempDir::new().unwrap();
    run_tsk_ok(tmp.path(), &["init"]);

    let (_, stderr, success) = run_tsk(tmp.path(), &["list"]);
    assert!(!success);
    assert!(stderr.contains("not logged in"));
}

// ============================================================================
// Session
// ============================================================================

#[test]
fn register_then_whoami() {
    let tmp = logged_in_store();
    let stdout = run_tsk_ok(tmp.path(), &["whoami", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["user"]["name"], "Ada");
    assert_eq!(value["user"]["email"], "ada@example.com");
}

#[test]
fn register_rejects_short_password() {
    let tmp = TempDir::new().unwrap();
    run_tsk_ok(tmp.path(), &["init"]);
    let (_, stderr, success) = run_tsk(
        tmp.path(),
        &["register", "Ada", "ada@example.com", "short"],
    );
    assert!(!success);
    assert!(stderr.contains("at least 8 characters"));
}

#[test]
fn login_derives_name_from_email() {
    let tmp = TempDir::new().unwrap();
    run_tsk_ok(tmp.path(), &["init"]);
    let stdout = run_tsk_ok(tmp.path(), &["login", "grace@navy.mil", "whatever1", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["user"]["name"], "grace");
}

#[test]
fn logout_clears_session() {
    let tmp = logged_in_store();
    run_tsk_ok(tmp.path(), &["logout"]);
    assert!(!tmp.path().join("taskify-user.json").exists());

    let (_, stderr, success) = run_tsk(tmp.path(), &["whoami"]);
    assert!(!success);
    assert!(stderr.contains("not logged in"));
}

// ============================================================================
// Tasks
// ============================================================================

#[test]
fn add_and_list_newest_first() {
    let tmp = logged_in_store();
    run_tsk_ok(tmp.path(), &["add", "first task"]);
    run_tsk_ok(tmp.path(), &["add", "second task"]);

    let value = list_json(tmp.path(), &[]);
    let texts: Vec<&str> = value["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["second task", "first task"]);
}

#[test]
fn toggle_completes_then_uncompletes_to_pending() {
    let tmp = logged_in_store();
    let stdout = run_tsk_ok(tmp.path(), &["add", "flip me", "--json"]);
    let added: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let id = added["id"].as_str().unwrap().to_string();

    let stdout = run_tsk_ok(tmp.path(), &["toggle", &id, "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["status"], "completed");

    let stdout = run_tsk_ok(tmp.path(), &["toggle", &id, "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["status"], "pending");
}

#[test]
fn completion_filter_and_status_flag() {
    let tmp = logged_in_store();
    run_tsk_ok(tmp.path(), &["add", "open task"]);
    let stdout = run_tsk_ok(tmp.path(), &["add", "done task", "--json"]);
    let added: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let id = added["id"].as_str().unwrap().to_string();
    run_tsk_ok(tmp.path(), &["status", &id, "completed"]);

    let value = list_json(tmp.path(), &["--filter", "completed"]);
    let tasks = value["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["text"], "done task");
    assert_eq!(tasks[0]["completed"], true);

    let value = list_json(tmp.path(), &["--filter", "incomplete"]);
    let tasks = value["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["text"], "open task");
}

#[test]
fn priority_sort_orders_high_first() {
    let tmp = logged_in_store();
    run_tsk_ok(tmp.path(), &["add", "relax", "--priority", "low"]);
    run_tsk_ok(tmp.path(), &["add", "ship it", "--priority", "high"]);
    run_tsk_ok(tmp.path(), &["add", "tidy up", "--priority", "medium"]);

    let value = list_json(tmp.path(), &["--sort", "priority"]);
    let priorities: Vec<&str> = value["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["priority"].as_str().unwrap())
        .collect();
    assert_eq!(priorities, vec!["High", "Medium", "Low"]);
}

#[test]
fn deadline_filter_overdue() {
    let tmp = logged_in_store();
    run_tsk_ok(tmp.path(), &["add", "ancient", "--deadline", "2000-01-01"]);
    run_tsk_ok(tmp.path(), &["add", "distant", "--deadline", "2999-01-01"]);
    run_tsk_ok(tmp.path(), &["add", "undated"]);

    let value = list_json(tmp.path(), &["--deadline", "overdue"]);
    let tasks = value["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["text"], "ancient");
}

#[test]
fn edit_updates_fields() {
    let tmp = logged_in_store();
    let stdout = run_tsk_ok(tmp.path(), &["add", "draft", "--json"]);
    let added: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let id = added["id"].as_str().unwrap().to_string();

    run_tsk_ok(
        tmp.path(),
        &["edit", &id, "--text", "final", "--priority", "high"],
    );

    let value = list_json(tmp.path(), &[]);
    let task = &value["tasks"][0];
    assert_eq!(task["text"], "final");
    assert_eq!(task["priority"], "High");
}

#[test]
fn delete_removes_task() {
    let tmp = logged_in_store();
    let stdout = run_tsk_ok(tmp.path(), &["add", "doomed", "--json"]);
    let added: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let id = added["id"].as_str().unwrap().to_string();

    run_tsk_ok(tmp.path(), &["delete", &id]);
    let value = list_json(tmp.path(), &[]);
    assert!(value["tasks"].as_array().unwrap().is_empty());

    let (_, stderr, success) = run_tsk(tmp.path(), &["delete", &id]);
    assert!(!success);
    assert!(stderr.contains("task not found"));
}

#[test]
fn mv_reorders_tasks() {
    let tmp = logged_in_store();
    let stdout = run_tsk_ok(tmp.path(), &["add", "oldest", "--json"]);
    let added: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let oldest = added["id"].as_str().unwrap().to_string();
    run_tsk_ok(tmp.path(), &["add", "middle"]);
    run_tsk_ok(tmp.path(), &["add", "newest"]);

    run_tsk_ok(tmp.path(), &["mv", &oldest, "--top"]);

    // Default list order is newest-created first; mv changed the backing
    // order, so verify through the stored file order via sort-free JSON
    let value = list_json(tmp.path(), &["--sort", "completion"]);
    let texts: Vec<&str> = value["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["oldest", "newest", "middle"]);
}

#[test]
fn mv_before_ignores_other_users_tasks() {
    let tmp = TempDir::new().unwrap();
    run_tsk_ok(tmp.path(), &["init"]);

    run_tsk_ok(
        tmp.path(),
        &["register", "Ada", "ada@example.com", "long enough password"],
    );
    let stdout = run_tsk_ok(tmp.path(), &["add", "adas task", "--json"]);
    let added: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let theirs = added["id"].as_str().unwrap().to_string();
    run_tsk_ok(tmp.path(), &["logout"]);

    run_tsk_ok(
        tmp.path(),
        &["register", "Bea", "bea@example.com", "long enough password"],
    );
    let stdout = run_tsk_ok(tmp.path(), &["add", "beas task", "--json"]);
    let added: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let mine = added["id"].as_str().unwrap().to_string();

    // The target id exists in the store but belongs to the other user
    let (_, stderr, success) = run_tsk(tmp.path(), &["mv", &mine, "--before", &theirs]);
    assert!(!success);
    assert!(stderr.contains("task not found"));
}

#[test]
fn short_id_prefix_resolves() {
    let tmp = logged_in_store();
    let stdout = run_tsk_ok(tmp.path(), &["add", "prefixed", "--json"]);
    let added: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let id = added["id"].as_str().unwrap();

    run_tsk_ok(tmp.path(), &["toggle", &id[..8]]);
    let value = list_json(tmp.path(), &[]);
    assert_eq!(value["tasks"][0]["completed"], true);
}

// ============================================================================
// Projects, theme, stats, share
// ============================================================================

#[test]
fn projects_are_seeded_and_extendable() {
    let tmp = logged_in_store();
    let stdout = run_tsk_ok(tmp.path(), &["project"]);
    assert!(stdout.contains("Personal"));
    assert!(stdout.contains("Work"));
    assert!(stdout.contains("Shopping"));

    run_tsk_ok(tmp.path(), &["project", "add", "Garden"]);
    let stdout = run_tsk_ok(tmp.path(), &["project"]);
    assert!(stdout.contains("Garden"));
}

#[test]
fn add_with_new_project_registers_it() {
    let tmp = logged_in_store();
    run_tsk_ok(tmp.path(), &["add", "plant bulbs", "--project", "Garden"]);
    let stdout = run_tsk_ok(tmp.path(), &["project"]);
    assert!(stdout.contains("Garden"));
}

#[test]
fn theme_defaults_to_system_and_persists() {
    let tmp = TempDir::new().unwrap();
    run_tsk_ok(tmp.path(), &["init"]);

    assert_eq!(run_tsk_ok(tmp.path(), &["theme"]).trim(), "system");
    run_tsk_ok(tmp.path(), &["theme", "dark"]);
    assert_eq!(run_tsk_ok(tmp.path(), &["theme"]).trim(), "dark");
}

#[test]
fn theme_rejects_unknown_value() {
    let tmp = TempDir::new().unwrap();
    run_tsk_ok(tmp.path(), &["init"]);
    let (_, stderr, success) = run_tsk(tmp.path(), &["theme", "mauve"]);
    assert!(!success);
    assert!(stderr.contains("invalid theme"));
}

#[test]
fn stats_counts_statuses() {
    let tmp = logged_in_store();
    run_tsk_ok(tmp.path(), &["add", "open"]);
    run_tsk_ok(tmp.path(), &["add", "finished", "--status", "completed"]);
    run_tsk_ok(tmp.path(), &["add", "late", "--deadline", "2000-01-01"]);

    let stdout = run_tsk_ok(tmp.path(), &["stats", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["total"], 3);
    assert_eq!(value["completed"], 1);
    assert_eq!(value["pending"], 2);
    assert_eq!(value["overdue"], 1);
}

#[test]
fn theme_set_waits_on_the_store_lock() {
    let tmp = TempDir::new().unwrap();
    run_tsk_ok(tmp.path(), &["init"]);

    // Hold the write lock; the subprocess must time out rather than write
    let _lock = StoreLock::acquire_default(tmp.path()).unwrap();
    let (_, stderr, success) = run_tsk(tmp.path(), &["theme", "dark"]);
    assert!(!success);
    assert!(stderr.contains("could not acquire lock"));
}

#[test]
fn session_writes_wait_on_the_store_lock() {
    let tmp = TempDir::new().unwrap();
    run_tsk_ok(tmp.path(), &["init"]);

    let _lock = StoreLock::acquire_default(tmp.path()).unwrap();
    let (_, stderr, success) = run_tsk(
        tmp.path(),
        &["register", "Ada", "ada@example.com", "long enough password"],
    );
    assert!(!success);
    assert!(stderr.contains("could not acquire lock"));
}

#[test]
fn watch_reports_external_session_change() {
    let tmp = TempDir::new().unwrap();
    run_tsk_ok(tmp.path(), &["init"]);

    let mut child = Command::new(tsk_bin())
        .arg("-C")
        .arg(tmp.path())
        .args(["watch", "--once", "--interval-ms", "50"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn tsk watch");

    // Give the watcher time to come up, then log in from "elsewhere".
    // The login itself sleeps its cosmetic latency, adding margin.
    std::thread::sleep(Duration::from_millis(500));
    run_tsk_ok(tmp.path(), &["login", "ada@example.com", "long enough"]);

    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if child.try_wait().unwrap().is_some() {
            break;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            panic!("watch never reported the session change");
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("taskify-user"),
        "expected taskify-user in watch output, got: {stdout}"
    );
}

#[test]
fn share_emits_opaque_link() {
    let tmp = logged_in_store();
    let stdout = run_tsk_ok(tmp.path(), &["share", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let link = value["link"].as_str().unwrap();
    assert!(link.starts_with("https://taskify.local/shared/"));
}
