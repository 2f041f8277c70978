//! TaskDeck command-line interface.
//!
//! # Responsibility
//! - Map subcommands onto task store operations one-to-one.
//! - Resolve user-typed id prefixes against the live task list.
//! - Keep storage and invariant logic inside `taskdeck_core`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use taskdeck_core::{
    default_log_level, init_logging, open_db, Priority, SqliteTaskSlotRepository, Task, TaskFilter,
    TaskId, TaskStore,
};

const DB_FILE_NAME: &str = "taskdeck.sqlite3";
const SHORT_ID_LEN: usize = 8;

/// TaskDeck - personal task tracker
#[derive(Parser)]
#[command(name = "taskdeck", version, about)]
struct Cli {
    /// Data directory (database and logs)
    #[arg(long, env = "TASKDECK_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "TASKDECK_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task title
        title: String,

        /// Task priority
        #[arg(long, value_enum, default_value = "medium")]
        priority: PriorityArg,

        /// Due date
        #[arg(long, value_name = "YYYY-MM-DD")]
        due: Option<NaiveDate>,
    },

    /// List tasks
    List {
        /// Show only matching tasks
        #[arg(long, value_enum, default_value = "all")]
        filter: FilterArg,
    },

    /// Toggle a task between active and completed
    Done {
        /// Task id or unique id prefix
        id: String,
    },

    /// Rename a task
    Edit {
        /// Task id or unique id prefix
        id: String,

        /// New title
        title: String,
    },

    /// Remove a task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },

    /// Remove every task and reset storage to first-run state
    Clear,

    /// Show aggregate counts
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum PriorityArg {
    Low,
    Medium,
    High,
}

impl PriorityArg {
    fn to_core(self) -> Priority {
        match self {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Active,
    Completed,
}

impl FilterArg {
    fn to_core(self) -> TaskFilter {
        match self {
            FilterArg::All => TaskFilter::All,
            FilterArg::Active => TaskFilter::Active,
            FilterArg::Completed => TaskFilter::Completed,
        }
    }

    fn heading(self) -> &'static str {
        match self {
            FilterArg::All => "All tasks",
            FilterArg::Active => "Active tasks",
            FilterArg::Completed => "Completed tasks",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);

    if let Err(e) = &result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = resolve_data_dir(cli.data_dir.as_deref())?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory `{}`", data_dir.display()))?;

    let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
    let log_dir = data_dir.join("logs");
    let log_dir_str = log_dir
        .to_str()
        .context("data directory path is not valid UTF-8")?;
    if let Err(err) = init_logging(level, log_dir_str) {
        eprintln!("warning: logging disabled: {err}");
    }

    let conn = open_db(data_dir.join(DB_FILE_NAME)).context("failed to open task database")?;
    let repo = SqliteTaskSlotRepository::try_new(&conn)
        .context("task database is not ready for use")?;
    let mut store = TaskStore::hydrate(repo);

    match &cli.command {
        Commands::Add {
            title,
            priority,
            due,
        } => cmd_add(&mut store, title, *priority, *due),
        Commands::List { filter } => cmd_list(&store, *filter),
        Commands::Done { id } => cmd_done(&mut store, id),
        Commands::Edit { id, title } => cmd_edit(&mut store, id, title),
        Commands::Rm { id } => cmd_rm(&mut store, id),
        Commands::Clear => cmd_clear(&mut store),
        Commands::Stats => cmd_stats(&store),
    }
}

fn cmd_add(
    store: &mut TaskStore<SqliteTaskSlotRepository<'_>>,
    title: &str,
    priority: PriorityArg,
    due: Option<NaiveDate>,
) -> Result<()> {
    let task = store
        .add(title, priority.to_core(), due)
        .context("task title cannot be empty")?;
    println!("Added {}  {}", short_id(task.id), task.title);
    Ok(())
}

fn cmd_list(store: &TaskStore<SqliteTaskSlotRepository<'_>>, filter: FilterArg) -> Result<()> {
    let tasks = store.filtered(filter.to_core());

    if tasks.is_empty() {
        match filter {
            FilterArg::All => eprintln!("No tasks yet. Add your first one with `taskdeck add`."),
            FilterArg::Active => eprintln!("No active tasks."),
            FilterArg::Completed => eprintln!("No completed tasks yet."),
        }
        return Ok(());
    }

    println!("{} ({})", filter.heading(), tasks.len());
    println!(
        "{:<8}  {:<4}  {:<8}  {:<10}  {:<10}  {}",
        "ID", "DONE", "PRIORITY", "DUE", "CREATED", "TITLE"
    );
    println!("{}", "-".repeat(72));
    for task in tasks {
        let due = task
            .due_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8}  {:<4}  {:<8}  {:<10}  {:<10}  {}",
            short_id(task.id),
            if task.completed { "[x]" } else { "[ ]" },
            task.priority.as_str(),
            due,
            task.created_at.format("%Y-%m-%d"),
            task.title
        );
    }

    Ok(())
}

fn cmd_done(store: &mut TaskStore<SqliteTaskSlotRepository<'_>>, id: &str) -> Result<()> {
    let task_id = resolve_task_id(store.tasks(), id)?;
    let task = store.toggle(task_id).context("task not found")?;
    if task.completed {
        println!("Completed {}  {}", short_id(task.id), task.title);
    } else {
        println!("Reactivated {}  {}", short_id(task.id), task.title);
    }
    Ok(())
}

fn cmd_edit(
    store: &mut TaskStore<SqliteTaskSlotRepository<'_>>,
    id: &str,
    title: &str,
) -> Result<()> {
    let task_id = resolve_task_id(store.tasks(), id)?;
    let task = store
        .rename(task_id, title)
        .context("task title cannot be empty")?;
    println!("Renamed {}  {}", short_id(task.id), task.title);
    Ok(())
}

fn cmd_rm(store: &mut TaskStore<SqliteTaskSlotRepository<'_>>, id: &str) -> Result<()> {
    let task_id = resolve_task_id(store.tasks(), id)?;
    let task = store.remove(task_id).context("task not found")?;
    println!("Removed {}  {}", short_id(task.id), task.title);
    Ok(())
}

fn cmd_clear(store: &mut TaskStore<SqliteTaskSlotRepository<'_>>) -> Result<()> {
    let removed = store.clear_all();
    if removed == 0 {
        println!("No tasks to clear.");
    } else {
        println!("Cleared {removed} tasks.");
    }
    Ok(())
}

fn cmd_stats(store: &TaskStore<SqliteTaskSlotRepository<'_>>) -> Result<()> {
    let counts = store.counts();
    println!("Total:     {}", counts.all);
    println!("Active:    {}", counts.active);
    println!("Completed: {}", counts.completed);
    println!("Progress:  {}%", counts.completion_percent());
    Ok(())
}

fn resolve_data_dir(overridden: Option<&std::path::Path>) -> Result<PathBuf> {
    if let Some(dir) = overridden {
        return Ok(dir.to_path_buf());
    }
    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".taskdeck"));
    }
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(cwd.join(".taskdeck"))
}

/// Matches a user-typed id against the live list.
///
/// Accepts a full id or any unique prefix of one; ambiguity is an error so
/// a typo can never act on the wrong task.
fn resolve_task_id(tasks: &[Task], needle: &str) -> Result<TaskId> {
    let needle = needle.trim().to_ascii_lowercase();
    if needle.is_empty() {
        bail!("task id cannot be empty");
    }

    let matches: Vec<TaskId> = tasks
        .iter()
        .filter(|task| task.id.to_string().starts_with(&needle))
        .map(|task| task.id)
        .collect();

    match matches.as_slice() {
        [] => bail!("no task matches id `{needle}`"),
        [only] => Ok(*only),
        many => bail!(
            "id `{needle}` is ambiguous ({} matches); use more characters",
            many.len()
        ),
    }
}

fn short_id(id: TaskId) -> String {
    id.to_string().chars().take(SHORT_ID_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::{resolve_task_id, short_id};
    use taskdeck_core::{Priority, Task, TaskId};

    fn task_with_id(id: &str, title: &str) -> Task {
        let id = TaskId::parse_str(id).expect("test id should parse");
        Task::with_id(id, title, Priority::Medium, None)
    }

    #[test]
    fn resolve_accepts_full_id_and_unique_prefix() {
        let tasks = vec![
            task_with_id("aaaaaaaa-0000-4000-8000-000000000001", "first"),
            task_with_id("bbbbbbbb-0000-4000-8000-000000000002", "second"),
        ];

        let by_full = resolve_task_id(&tasks, "aaaaaaaa-0000-4000-8000-000000000001")
            .expect("full id should resolve");
        assert_eq!(by_full, tasks[0].id);

        let by_prefix = resolve_task_id(&tasks, "BBBB").expect("unique prefix should resolve");
        assert_eq!(by_prefix, tasks[1].id);
    }

    #[test]
    fn resolve_rejects_ambiguous_and_unknown_prefixes() {
        let tasks = vec![
            task_with_id("cccccccc-0000-4000-8000-000000000001", "first"),
            task_with_id("cccccccc-1111-4111-8111-000000000002", "second"),
        ];

        let ambiguous = resolve_task_id(&tasks, "cccc").expect_err("prefix is shared");
        assert!(ambiguous.to_string().contains("ambiguous"));

        let unknown = resolve_task_id(&tasks, "dddd").expect_err("prefix matches nothing");
        assert!(unknown.to_string().contains("no task matches"));
    }

    #[test]
    fn short_id_is_a_stable_prefix_of_the_full_id() {
        let task = task_with_id("12345678-aaaa-4aaa-8aaa-000000000001", "x");
        assert_eq!(short_id(task.id), "12345678");
    }
}
