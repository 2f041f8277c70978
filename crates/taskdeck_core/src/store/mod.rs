//! Session-scoped task store built on the persistence repositories.

pub mod task_store;
