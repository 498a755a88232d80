//! Text generation against a hosted language model.
//!
//! The [`Generator`] trait is the seam between the planner and the model
//! provider. [`GeminiClient`] is the production implementation; tests use a
//! scripted generator instead.
//!
//! ```text
//! LessonPlanner --GenerationRequest--> dyn Generator --> String
//!                                           |
//!                                     GeminiClient (POST :generateContent)
//! ```

pub mod gemini;
pub mod schema;
pub mod trait_def;
pub mod types;

pub use gemini::{GeminiClient, GeminiConfig};
pub use trait_def::Generator;
pub use types::{GenerationError, GenerationRequest};
