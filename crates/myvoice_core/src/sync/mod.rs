//! Canvas synchronization.
//!
//! # Responsibility
//! - Reconcile the saved drawing with a drawing widget whose readiness is
//!   only observable by polling.
//! - Gate stroke saves so startup can never overwrite an unapplied drawing.
//!
//! # Invariants
//! - The synchronizer is the only writer of the in-session drawing.
//! - At most one `load_paths` call per poll run.

pub mod canvas_sync;
pub mod surface;
