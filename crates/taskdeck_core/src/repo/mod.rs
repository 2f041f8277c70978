//! Persistence repositories over the core database.

pub mod slot_repo;
