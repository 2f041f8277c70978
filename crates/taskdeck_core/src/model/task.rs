//! Task domain model and pure derived views.
//!
//! # Responsibility
//! - Define the canonical task record persisted by the slot repository.
//! - Provide the pure list views (filter selection, aggregate counts) used
//!   by every presentation surface.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` is non-empty after trimming whenever a task enters the store.
//! - Serialized field names match the persisted slot layout exactly
//!   (camelCase, `dueDate` omitted when absent).
//!
//! # See also
//! - docs/architecture.md

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Urgency bucket attached to every task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Wire/display form, identical to the persisted value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Canonical task record.
///
/// The serde renames pin the wire shape of the persisted slot payload; the
/// in-memory shape and the stored shape never diverge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable id, assigned at creation, the sole lookup key.
    pub id: TaskId,
    /// Display text. Non-empty after trimming.
    pub title: String,
    /// Completion flag. Flipped by toggle, never inferred.
    pub completed: bool,
    /// Urgency bucket, `medium` unless the caller says otherwise.
    pub priority: Priority,
    /// Optional calendar due date. Omitted from the payload when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Creation timestamp. Display-only; list order is insertion order.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task with a generated stable id.
    ///
    /// # Invariants
    /// - `completed` starts as `false`.
    /// - `created_at` is captured once, here, and never rewritten.
    pub fn new(title: impl Into<String>, priority: Priority, due_date: Option<NaiveDate>) -> Self {
        Self::with_id(Uuid::new_v4(), title, priority, due_date)
    }

    /// Creates a task with a caller-provided stable id.
    ///
    /// Used by tests and import paths where identity already exists.
    pub fn with_id(
        id: TaskId,
        title: impl Into<String>,
        priority: Priority,
        due_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            completed: false,
            priority,
            due_date,
            created_at: Utc::now(),
        }
    }

    /// Returns whether this task still needs doing.
    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

/// Predicate for deriving a list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    /// Identity view.
    #[default]
    All,
    /// Tasks with `completed == false`.
    Active,
    /// Tasks with `completed == true`.
    Completed,
}

impl TaskFilter {
    fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => task.is_active(),
            Self::Completed => task.completed,
        }
    }
}

/// Aggregate counters over one task list.
///
/// `active + completed == all` holds for any list because `completed` is a
/// plain boolean: no task is in neither or both states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub all: usize,
    pub active: usize,
    pub completed: usize,
}

impl TaskCounts {
    /// Completed share in whole percent, rounded half-up. Empty list -> 0.
    pub fn completion_percent(&self) -> u32 {
        if self.all == 0 {
            return 0;
        }
        ((self.completed * 100 + self.all / 2) / self.all) as u32
    }
}

/// Selects the tasks matching `filter`, preserving list order.
///
/// Returns references only; the underlying records are never copied or
/// mutated by a view.
pub fn filter_tasks(tasks: &[Task], filter: TaskFilter) -> Vec<&Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

/// Counts tasks per completion state in one pass.
pub fn count_tasks(tasks: &[Task]) -> TaskCounts {
    let completed = tasks.iter().filter(|task| task.completed).count();
    TaskCounts {
        all: tasks.len(),
        active: tasks.len() - completed,
        completed,
    }
}

/// Normalizes a title according to the store contract.
///
/// Trims surrounding whitespace; returns `None` when nothing remains, which
/// callers treat as a silent rejection.
pub fn normalize_title(title: &str) -> Option<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_title, TaskCounts};

    #[test]
    fn normalize_title_trims_and_rejects_blank_input() {
        assert_eq!(normalize_title("  Buy milk  ").as_deref(), Some("Buy milk"));
        assert_eq!(normalize_title(""), None);
        assert_eq!(normalize_title("   \t "), None);
    }

    #[test]
    fn completion_percent_rounds_half_up_and_handles_empty() {
        let empty = TaskCounts::default();
        assert_eq!(empty.completion_percent(), 0);

        let third = TaskCounts { all: 3, active: 2, completed: 1 };
        assert_eq!(third.completion_percent(), 33);

        let half = TaskCounts { all: 2, active: 1, completed: 1 };
        assert_eq!(half.completion_percent(), 50);

        let two_thirds = TaskCounts { all: 3, active: 1, completed: 2 };
        assert_eq!(two_thirds.completion_percent(), 67);
    }
}
