//! Planner service: one operation per generation call.
//!
//! Every operation builds its prompt, calls the [`Generator`](crate::generation::Generator)
//! once and maps any failure to a [`PlannerError`] whose `Display` is the
//! message shown to the teacher. The underlying cause is logged and kept as
//! the error source.

mod error;
mod service;

pub use error::{PlannerError, RefineFailure};
pub use service::LessonPlanner;
