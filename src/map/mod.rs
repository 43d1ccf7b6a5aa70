//! Map orchestration: configuration, camera tracking and the map manager

pub mod config;
pub mod viewport;
pub mod manager;

pub use config::{MapConfig, WorldConfig};
pub use viewport::{Viewport, ViewportConfig, ViewportTracker};
pub use manager::{MapManager, MapStats, RenderOutcome};
