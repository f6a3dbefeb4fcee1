//! Timetable grid domain logic.
//!
//! Pure types and state transitions with no I/O: the editable grid and its
//! saved snapshot, per-slot status, week-wide propagation, workload counts,
//! and planning of the create/delete requests a save needs.

pub mod associations;
pub mod error;
pub mod grid;
pub mod normalize;
pub mod reconcile;
pub mod record;
pub mod slot;
pub mod status;
pub mod types;
pub mod week_fill;
pub mod workload;
