//! Map manager: the single entry point tying camera, store and renderer together

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::core::time::{FrameClock, FrameStats};
use crate::core::{Result, Vec2};
use crate::map::config::MapConfig;
use crate::map::viewport::{Viewport, ViewportTracker};
use crate::render::hex::tile_at;
use crate::render::lod_renderer::{FrameReport, LodRenderer};
use crate::render::style::StyleTable;
use crate::render::surface::DrawSurface;
use crate::streaming::priority::{ChunkPriority, ChunkPriorityQueue};
use crate::streaming::spatial::{ChunkCoord, TileBounds, WorldBounds};
use crate::streaming::store::{ChunkStore, StoreStats};
use crate::terrain::{Resource, Terrain, TerrainGenerator, Tile, TileSource};

/// Result of a render request
#[derive(Clone, Debug, PartialEq)]
pub enum RenderOutcome {
    Drawn(FrameReport),
    /// Skipped because the previous frame was too recent
    Throttled,
    /// The map has not been initialized yet
    NotReady,
}

impl RenderOutcome {
    pub fn report(&self) -> Option<&FrameReport> {
        match self {
            RenderOutcome::Drawn(report) => Some(report),
            _ => None,
        }
    }
}

/// Snapshot of map state for diagnostics
#[derive(Clone, Debug, Serialize)]
pub struct MapStats {
    pub initialized: bool,
    pub store: StoreStats,
    pub viewport: Viewport,
    pub frames: FrameStats,
    /// Loads scheduled by the last camera update
    pub scheduled_loads: usize,
    pub last_frame: Option<FrameReport>,
}

/// Owns the chunk store, the camera and the renderer for one map
pub struct MapManager<S> {
    config: MapConfig,
    world: WorldBounds,
    store: ChunkStore,
    tracker: ViewportTracker,
    renderer: LodRenderer,
    queue: ChunkPriorityQueue,
    clock: FrameClock,
    surface: S,
    initialized: bool,
    scheduled_loads: usize,
    last_frame: Option<FrameReport>,
}

impl<S: DrawSurface> MapManager<S> {
    /// Create a map generating tiles with the configured seed
    pub fn new(config: MapConfig, surface: S) -> Result<Self> {
        let source = Arc::new(TerrainGenerator::new(config.world.terrain_params()));
        Self::with_source(config, source, surface)
    }

    /// Create a map over a custom tile source
    pub fn with_source(config: MapConfig, source: Arc<dyn TileSource>, surface: S) -> Result<Self> {
        config.validate()?;

        let world = config.world.bounds();
        let chunk_size = config.streaming.chunk_size;
        let store = ChunkStore::new(world, &config.streaming, source);

        // The screen follows the surface
        let mut tracker = ViewportTracker::new(config.viewport.clone(), world, chunk_size);
        let (width, height) = surface.size();
        tracker.resize(width, height);

        let renderer = LodRenderer::new(config.lod.clone(), StyleTable::default(), world, chunk_size);
        let reach = config.lod.cull_distance + chunk_size as f32 * std::f32::consts::SQRT_2;
        let clock = FrameClock::new(
            Duration::from_millis(config.viewport.min_frame_interval_ms),
            Duration::from_secs_f32(config.lod.frame_budget_ms / 1000.0),
        );

        Ok(Self {
            config,
            world,
            store,
            tracker,
            renderer,
            queue: ChunkPriorityQueue::new(reach),
            clock,
            surface,
            initialized: false,
            scheduled_loads: 0,
            last_frame: None,
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn viewport(&self) -> &Viewport {
        self.tracker.viewport()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Replace the render style table
    pub fn set_style(&mut self, style: StyleTable) {
        self.renderer = LodRenderer::new(self.config.lod.clone(), style, self.world, self.config.streaming.chunk_size);
    }

    /// Center the camera on the start position and preload the chunks around it
    pub async fn initialize(&mut self, start_x: f32, start_y: f32) -> Result<()> {
        let zoom = self.tracker.viewport().zoom;
        self.tracker.update(start_x, start_y, zoom);
        self.store.set_required(self.wanted_chunks());

        let center = self.tracker.viewport().center();
        let loaded = self
            .store
            .preload(center.x, center.y, self.config.streaming.preload_radius)
            .await?;

        self.initialized = true;
        log::info!(
            "Map {}x{} initialized at ({:.0}, {:.0}), {} chunks preloaded",
            self.world.width,
            self.world.height,
            center.x,
            center.y,
            loaded
        );
        Ok(())
    }

    /// Move the camera, wait for every chunk the new view needs, then render
    pub async fn move_to(&mut self, x: f32, y: f32, zoom: f32) -> Result<RenderOutcome> {
        self.tracker.update(x, y, zoom);
        let wanted = self.wanted_chunks();
        self.store.set_required(wanted.iter().copied());
        self.store.preload_chunks(&wanted).await?;
        self.store.evict_expired();
        Ok(self.render())
    }

    /// Shift the camera without waiting for data
    pub fn pan(&mut self, dx: f32, dy: f32) -> RenderOutcome {
        self.tracker.pan(dx, dy);
        self.refresh_required();
        self.render()
    }

    /// Change zoom without waiting for data
    pub fn set_zoom(&mut self, zoom: f32) -> RenderOutcome {
        self.tracker.set_zoom(zoom);
        self.refresh_required();
        self.render()
    }

    /// Follow a screen size change
    pub fn resize(&mut self, width: u32, height: u32) -> RenderOutcome {
        self.tracker.resize(width, height);
        self.refresh_required();
        self.render()
    }

    /// Draw a frame unless throttled or not yet initialized. Never waits for
    /// chunk data.
    pub fn render(&mut self) -> RenderOutcome {
        if !self.initialized {
            return RenderOutcome::NotReady;
        }
        if !self.clock.try_begin() {
            return RenderOutcome::Throttled;
        }

        let viewport = *self.tracker.viewport();
        let report = self.renderer.render(&viewport, &self.store, &mut self.surface);
        self.clock.record(report.draw_time);
        self.last_frame = Some(report.clone());
        RenderOutcome::Drawn(report)
    }

    /// Required chunks close enough to the camera to ever be drawn, at most
    /// `max_loaded_chunks` of them with visible and nearby chunks kept first
    fn wanted_chunks(&self) -> BTreeSet<ChunkCoord> {
        let center = self.tracker.viewport().center();
        let chunk_size = self.config.streaming.chunk_size;
        let reach = self.config.lod.cull_distance + chunk_size as f32 * std::f32::consts::SQRT_2;
        let visible = self.tracker.visible_chunks();

        let mut ranked: Vec<ChunkPriority> = self
            .tracker
            .required_chunks()
            .into_iter()
            .map(|coord| ChunkPriority::calculate(coord, center, chunk_size, visible.contains(&coord)))
            .filter(|p| p.distance <= reach)
            .collect();

        let capacity = self.config.streaming.max_loaded_chunks;
        if ranked.len() > capacity {
            log::debug!("Required set of {} chunks capped at {}", ranked.len(), capacity);
            ranked.sort_unstable_by(|a, b| b.cmp(a));
            ranked.truncate(capacity);
        }
        ranked.into_iter().map(|p| p.coord).collect()
    }

    /// Protect the new required set and queue loads for what is missing,
    /// visible chunks first
    fn refresh_required(&mut self) {
        let wanted = self.wanted_chunks();
        let visible = self.tracker.visible_chunks();
        self.store.set_required(wanted.iter().copied());

        let store = &self.store;
        self.queue.update(
            self.tracker.viewport().center(),
            self.config.streaming.chunk_size,
            &wanted,
            &visible,
            |coord| store.is_resident(coord) || store.is_pending(coord),
        );

        self.scheduled_loads = self
            .queue
            .drain_ordered()
            .into_iter()
            .filter(|coord| self.store.request(*coord))
            .count();
        if self.scheduled_loads > 0 {
            log::debug!("Scheduled {} chunk loads", self.scheduled_loads);
        }
    }

    pub async fn get_tile(&self, x: i32, y: i32) -> Result<Tile> {
        Ok(self.store.get_tile(x, y).await?)
    }

    /// Every tile inside an inclusive rectangle, row-major
    pub async fn find_tiles_in_region(&self, bounds: TileBounds) -> Result<Vec<Tile>> {
        Ok(self
            .store
            .get_tiles_in_region(bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y)
            .await?)
    }

    /// Tiles carrying a resource, or only `resource` when given
    pub async fn find_resources_in_region(&self, bounds: TileBounds, resource: Option<Resource>) -> Result<Vec<Tile>> {
        let tiles = self.find_tiles_in_region(bounds).await?;
        Ok(tiles
            .into_iter()
            .filter(|t| match (t.resource, resource) {
                (Some(found), Some(wanted)) => found == wanted,
                (Some(_), None) => true,
                (None, _) => false,
            })
            .collect())
    }

    pub async fn find_terrain_in_region(&self, bounds: TileBounds, terrain: Terrain) -> Result<Vec<Tile>> {
        let tiles = self.find_tiles_in_region(bounds).await?;
        Ok(tiles.into_iter().filter(|t| t.terrain == terrain).collect())
    }

    /// Tile under a screen position, or `None` outside the world
    pub async fn handle_click(&self, sx: f32, sy: f32) -> Result<Option<Tile>> {
        let (x, y) = tile_at(self.tracker.screen_to_world(sx, sy));
        if !self.world.contains(x, y) {
            return Ok(None);
        }
        Ok(Some(self.store.get_tile(x, y).await?))
    }

    pub fn get_stats(&self) -> MapStats {
        MapStats {
            initialized: self.initialized,
            store: self.store.stats(),
            viewport: *self.tracker.viewport(),
            frames: self.clock.stats(),
            scheduled_loads: self.scheduled_loads,
            last_frame: self.last_frame.clone(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
