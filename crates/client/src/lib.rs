//! REST client for the school timetable backend.
//!
//! Provides the [`api::TimetableApi`] collaborator trait and its HTTP
//! implementation, session and configuration handling, reference data
//! loading, and execution of timetable saves.

pub mod api;
pub mod config;
pub mod loader;
pub mod save;
pub mod session;
