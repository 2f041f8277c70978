//! Domain model for the task tracker.
//!
//! # Responsibility
//! - Define the canonical task shape shared by store, persistence and UI.
//! - Keep derived-view logic (filtering, counting) pure and storage-free.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Removal is real removal; there are no tombstones in this model.

pub mod task;
