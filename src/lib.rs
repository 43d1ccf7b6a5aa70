//! Hexworld - chunked streaming and level-of-detail rendering for large hex maps

pub mod core;
pub mod terrain;
pub mod streaming;
pub mod render;
pub mod map;

pub use map::{MapConfig, MapManager, RenderOutcome};
