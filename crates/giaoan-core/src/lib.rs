//! Core library for the lesson-plan generator.
//!
//! Prompt construction, model access, the planner service, the text
//! formatter and renderers, document export, the access gate and the
//! workspace view-model that ties them together.

pub mod access;
pub mod catalog;
pub mod export;
pub mod format;
pub mod generation;
pub mod planner;
pub mod prompt;
pub mod workspace;
