//! Storage contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the two durable storage capabilities the services consume.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - Both stores are whole-value, last-writer-wins by key.
//! - Repositories report faults; swallowing them is a service decision.

pub mod kv_store;
pub mod slot_repo;
