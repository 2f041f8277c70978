//! Task store use-case service.
//!
//! # Responsibility
//! - Own the ordered in-memory task list for one session.
//! - Apply add/toggle/rename/remove/clear mutations with write-through flushes.
//! - Expose filtered views and aggregate counts for presentation callers.
//!
//! # Invariants
//! - The list is hydrated exactly once, at construction, before any mutation.
//! - New tasks are prepended; toggle and rename never reorder the list.
//! - Every effective mutation flushes the full list; no-ops never touch storage.
//! - Blank titles and unknown ids degrade to silent no-ops, never errors.
//!
//! # See also
//! - docs/architecture.md

use crate::model::task::{
    count_tasks, filter_tasks, normalize_title, Priority, Task, TaskCounts, TaskFilter, TaskId,
};
use crate::repo::slot_repo::TaskSlotRepository;
use chrono::NaiveDate;
use log::{info, warn};

/// In-memory task list with write-through persistence to one durable slot.
///
/// Construction doubles as hydration, so a store value is never observable
/// in a pre-hydration state. Memory stays authoritative for the session even
/// when a flush fails; the worst case is state that does not survive reload.
pub struct TaskStore<R: TaskSlotRepository> {
    repo: R,
    tasks: Vec<Task>,
}

impl<R: TaskSlotRepository> TaskStore<R> {
    /// Builds the store by reading the durable slot once.
    ///
    /// A missing slot hydrates as an empty list. An unreadable slot also
    /// hydrates as empty after a warning; startup never fails on storage.
    pub fn hydrate(repo: R) -> Self {
        let tasks = match repo.load() {
            Ok(Some(tasks)) => {
                info!(
                    "event=store_hydrate module=store status=ok source=slot count={}",
                    tasks.len()
                );
                tasks
            }
            Ok(None) => {
                info!("event=store_hydrate module=store status=ok source=empty count=0");
                Vec::new()
            }
            Err(err) => {
                warn!(
                    "event=store_hydrate module=store status=fallback error_code=slot_load_failed error={err}"
                );
                Vec::new()
            }
        };

        Self { repo, tasks }
    }

    /// Current task list, newest-first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up one task by id.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Creates a task from a title, prepends it, and flushes.
    ///
    /// Returns the created task, or `None` when the trimmed title is empty
    /// (the list and storage stay untouched).
    pub fn add(
        &mut self,
        title: &str,
        priority: Priority,
        due_date: Option<NaiveDate>,
    ) -> Option<Task> {
        let title = normalize_title(title)?;
        let task = Task::new(title, priority, due_date);
        self.tasks.insert(0, task.clone());
        self.flush();
        Some(task)
    }

    /// Flips the completed flag on the matching task and flushes.
    ///
    /// Returns the updated task, or `None` when the id is unknown.
    pub fn toggle(&mut self, id: TaskId) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.completed = !task.completed;
        let snapshot = task.clone();
        self.flush();
        Some(snapshot)
    }

    /// Replaces the title on the matching task and flushes.
    ///
    /// Returns the updated task, or `None` when the trimmed title is empty
    /// or the id is unknown; the existing title is kept in both cases.
    pub fn rename(&mut self, id: TaskId, new_title: &str) -> Option<Task> {
        let new_title = normalize_title(new_title)?;
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.title = new_title;
        let snapshot = task.clone();
        self.flush();
        Some(snapshot)
    }

    /// Removes the matching task and flushes.
    ///
    /// Returns the removed task, or `None` when the id is unknown.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        let removed = self.tasks.remove(index);
        self.flush();
        Some(removed)
    }

    /// Empties the list and deletes the slot row, returning the removed count.
    ///
    /// Deleting the slot (instead of writing `[]`) restores first-run state:
    /// the next hydration sees an absent slot, exactly as before any task
    /// was ever added.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();

        if let Err(err) = self.repo.clear() {
            warn!(
                "event=store_clear module=store status=error error_code=slot_clear_failed error={err}"
            );
        }

        removed
    }

    /// Borrowed view of tasks matching the filter, in list order.
    pub fn filtered(&self, filter: TaskFilter) -> Vec<&Task> {
        filter_tasks(&self.tasks, filter)
    }

    /// Aggregate counts over the current list.
    pub fn counts(&self) -> TaskCounts {
        count_tasks(&self.tasks)
    }

    fn flush(&self) {
        if let Err(err) = self.repo.save(&self.tasks) {
            warn!(
                "event=store_flush module=store status=error error_code=slot_save_failed error={err}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::slot_repo::{RepoResult, TaskSlotRepository};
    use std::cell::RefCell;
    use uuid::Uuid;

    /// Repository double that records calls instead of touching SQLite.
    #[derive(Default)]
    struct RecordingRepo {
        stored: RefCell<Option<Vec<Task>>>,
        saves: RefCell<u32>,
        clears: RefCell<u32>,
    }

    impl TaskSlotRepository for RecordingRepo {
        fn load(&self) -> RepoResult<Option<Vec<Task>>> {
            Ok(self.stored.borrow().clone())
        }

        fn save(&self, tasks: &[Task]) -> RepoResult<()> {
            *self.stored.borrow_mut() = Some(tasks.to_vec());
            *self.saves.borrow_mut() += 1;
            Ok(())
        }

        fn clear(&self) -> RepoResult<()> {
            *self.stored.borrow_mut() = None;
            *self.clears.borrow_mut() += 1;
            Ok(())
        }
    }

    #[test]
    fn add_prepends_and_flushes_once() {
        let store_repo = RecordingRepo::default();
        let mut store = TaskStore::hydrate(store_repo);

        store.add("first", Priority::Medium, None).expect("added");
        store.add("second", Priority::High, None).expect("added");

        assert_eq!(store.tasks()[0].title, "second");
        assert_eq!(store.tasks()[1].title, "first");
        assert_eq!(*store.repo.saves.borrow(), 2);
    }

    #[test]
    fn blank_add_is_a_no_op_without_flush() {
        let mut store = TaskStore::hydrate(RecordingRepo::default());

        assert!(store.add("   ", Priority::Medium, None).is_none());

        assert!(store.is_empty());
        assert_eq!(*store.repo.saves.borrow(), 0);
    }

    #[test]
    fn unknown_id_mutations_leave_list_and_storage_untouched() {
        let mut store = TaskStore::hydrate(RecordingRepo::default());
        store.add("keep me", Priority::Low, None).expect("added");
        let stranger = Uuid::new_v4();

        assert!(store.toggle(stranger).is_none());
        assert!(store.rename(stranger, "new title").is_none());
        assert!(store.remove(stranger).is_none());

        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].title, "keep me");
        assert_eq!(*store.repo.saves.borrow(), 1);
    }

    #[test]
    fn blank_rename_keeps_existing_title() {
        let mut store = TaskStore::hydrate(RecordingRepo::default());
        let task = store.add("original", Priority::Medium, None).expect("added");

        assert!(store.rename(task.id, "  ").is_none());

        assert_eq!(store.get(task.id).expect("still present").title, "original");
        assert_eq!(*store.repo.saves.borrow(), 1);
    }

    #[test]
    fn clear_all_deletes_the_slot_even_when_empty() {
        let mut store = TaskStore::hydrate(RecordingRepo::default());

        assert_eq!(store.clear_all(), 0);

        assert_eq!(*store.repo.clears.borrow(), 1);
        assert!(store.repo.stored.borrow().is_none());
    }

    #[test]
    fn toggle_flips_in_place_without_reordering() {
        let mut store = TaskStore::hydrate(RecordingRepo::default());
        let first = store.add("first", Priority::Medium, None).expect("added");
        store.add("second", Priority::Medium, None).expect("added");

        let toggled = store.toggle(first.id).expect("toggled");

        assert!(toggled.completed);
        assert_eq!(store.tasks()[1].id, first.id);
        let counts = store.counts();
        assert_eq!((counts.all, counts.active, counts.completed), (2, 1, 1));
    }
}
