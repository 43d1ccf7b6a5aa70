//! Camera state and the chunk sets it implies
//!
//! World units are tile units: one tile is one unit wide. The visible box is
//! the camera center plus or minus half the screen size divided by the zoom,
//! clamped to the world.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;
use crate::streaming::spatial::{chunks_overlapping, ChunkCoord, TileBounds, WorldBounds};

/// Screen and zoom configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Screen width in pixels
    pub screen_width: u32,
    /// Screen height in pixels
    pub screen_height: u32,
    /// Smallest allowed zoom (pixels per world unit)
    pub min_zoom: f32,
    /// Largest allowed zoom
    pub max_zoom: f32,
    pub default_zoom: f32,
    /// Minimum time between two drawn frames
    pub min_frame_interval_ms: u64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            screen_width: 1280,
            screen_height: 720,
            min_zoom: 3.0,
            max_zoom: 64.0,
            default_zoom: 8.0,
            min_frame_interval_ms: 16,
        }
    }
}

impl ViewportConfig {
    /// Most chunks the required set can hold for this screen, reached at
    /// `min_zoom` with the visible box straddling chunk borders
    pub fn max_required_chunks(&self, chunk_size: i32) -> usize {
        let chunk_size = chunk_size.max(1) as f32;
        let span = |pixels: u32| {
            let tiles = (pixels as f32 / self.min_zoom).ceil();
            ((tiles + 2.0 * chunk_size) / chunk_size).ceil() as usize + 1
        };
        span(self.screen_width) * span(self.screen_height)
    }
}

/// Derived view of the world for one camera position
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Viewport {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub zoom: f32,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl Viewport {
    /// Compute the visible box for a camera; `zoom` must already be clamped
    pub fn new(center: Vec2, zoom: f32, screen_width: u32, screen_height: u32, world: &WorldBounds) -> Self {
        let half_w = screen_width as f32 / zoom * 0.5;
        let half_h = screen_height as f32 / zoom * 0.5;
        let (width, height) = (world.width as f32, world.height as f32);

        Self {
            min_x: (center.x - half_w).clamp(0.0, width),
            max_x: (center.x + half_w).clamp(0.0, width),
            min_y: (center.y - half_h).clamp(0.0, height),
            max_y: (center.y + half_h).clamp(0.0, height),
            center_x: center.x,
            center_y: center.y,
            zoom,
            screen_width,
            screen_height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x, self.center_y)
    }

    /// World position to screen pixels
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - Vec2::new(self.min_x, self.min_y)) * self.zoom
    }

    /// Screen pixels to world position
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen / self.zoom + Vec2::new(self.min_x, self.min_y)
    }

    /// Tiles touched by the visible box, or `None` if the box is empty
    pub fn tile_bounds(&self) -> Option<TileBounds> {
        if self.max_x <= self.min_x || self.max_y <= self.min_y {
            return None;
        }
        Some(TileBounds::new(
            self.min_x.floor() as i32,
            self.min_y.floor() as i32,
            self.max_x.ceil() as i32 - 1,
            self.max_y.ceil() as i32 - 1,
        ))
    }
}

/// Tracks the camera and derives the visible and required chunk sets
pub struct ViewportTracker {
    config: ViewportConfig,
    world: WorldBounds,
    chunk_size: i32,
    viewport: Viewport,
}

impl ViewportTracker {
    /// Create a tracker centered on the world at the default zoom
    pub fn new(config: ViewportConfig, world: WorldBounds, chunk_size: i32) -> Self {
        let center = Vec2::new(world.width as f32 * 0.5, world.height as f32 * 0.5);
        let zoom = config.default_zoom.clamp(config.min_zoom, config.max_zoom);
        let viewport = Viewport::new(center, zoom, config.screen_width, config.screen_height, &world);
        Self {
            config,
            world,
            chunk_size: chunk_size.max(1),
            viewport,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Move the camera. Zoom is clamped to the configured range and the
    /// center to the world; non-finite input leaves the camera unchanged.
    pub fn update(&mut self, center_x: f32, center_y: f32, zoom: f32) -> &Viewport {
        if !(center_x.is_finite() && center_y.is_finite() && zoom.is_finite()) {
            log::warn!("Ignoring non-finite camera update ({}, {}) zoom {}", center_x, center_y, zoom);
            return &self.viewport;
        }

        let zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        let center = Vec2::new(
            center_x.clamp(0.0, self.world.width as f32),
            center_y.clamp(0.0, self.world.height as f32),
        );
        self.viewport = Viewport::new(
            center,
            zoom,
            self.config.screen_width,
            self.config.screen_height,
            &self.world,
        );
        &self.viewport
    }

    /// Shift the camera by a world-space offset
    pub fn pan(&mut self, dx: f32, dy: f32) -> &Viewport {
        let v = self.viewport;
        self.update(v.center_x + dx, v.center_y + dy, v.zoom)
    }

    pub fn set_zoom(&mut self, zoom: f32) -> &Viewport {
        let v = self.viewport;
        self.update(v.center_x, v.center_y, zoom)
    }

    /// Change the screen size, keeping the camera where it is
    pub fn resize(&mut self, screen_width: u32, screen_height: u32) -> &Viewport {
        self.config.screen_width = screen_width.max(1);
        self.config.screen_height = screen_height.max(1);
        let v = self.viewport;
        self.update(v.center_x, v.center_y, v.zoom)
    }

    /// Chunks overlapping the visible box
    pub fn visible_chunks(&self) -> BTreeSet<ChunkCoord> {
        self.chunks_with_margin(0)
    }

    /// Chunks overlapping the visible box grown by one chunk on every side
    pub fn required_chunks(&self) -> BTreeSet<ChunkCoord> {
        self.chunks_with_margin(self.chunk_size)
    }

    fn chunks_with_margin(&self, margin: i32) -> BTreeSet<ChunkCoord> {
        let Some(bounds) = self
            .viewport
            .tile_bounds()
            .and_then(|b| b.expand(margin).clamp_to(&self.world))
        else {
            return BTreeSet::new();
        };
        chunks_overlapping(&bounds, self.chunk_size)
    }

    pub fn screen_to_world(&self, sx: f32, sy: f32) -> Vec2 {
        self.viewport.screen_to_world(Vec2::new(sx, sy))
    }

    pub fn world_to_screen(&self, wx: f32, wy: f32) -> Vec2 {
        self.viewport.world_to_screen(Vec2::new(wx, wy))
    }
}
