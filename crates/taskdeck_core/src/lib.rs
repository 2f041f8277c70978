//! Core domain logic for TaskDeck.
//! This crate is the single source of truth for task-list invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    count_tasks, filter_tasks, Priority, Task, TaskCounts, TaskFilter, TaskId,
};
pub use repo::slot_repo::{
    RepoError, RepoResult, SqliteTaskSlotRepository, TaskSlotRepository, TASKS_SLOT_KEY,
};
pub use store::task_store::TaskStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
