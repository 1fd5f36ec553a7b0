// src/processing/mod.rs
pub mod engine;
pub mod formula;

// Re-export main components
pub use engine::AlbedoEngine;
pub use formula::{Formula, PostStep, FORMULAS};
