//! Level-of-detail chunk renderer
//!
//! Each frame enumerates the chunks under the viewport, drops those beyond
//! the cull distance and draws the rest at a tier picked by distance from the
//! viewport center. Rendering never waits for chunk data: chunks that are not
//! resident are requested and skipped for this frame.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::core::types::Vec2;
use crate::map::viewport::Viewport;
use crate::render::culling::ChunkCuller;
use crate::render::hex::{hex_corners, tile_center, HEX_RADIUS};
use crate::render::style::StyleTable;
use crate::render::surface::{DrawSurface, SurfaceError};
use crate::streaming::lod::{LodConfig, RenderTier};
use crate::streaming::spatial::{chunks_overlapping, ChunkCoord, WorldBounds};
use crate::streaming::{Chunk, ChunkStore};
use crate::terrain::{Terrain, Tile};

/// Where the renderer gets chunk data from
pub trait ChunkSource {
    /// A resident chunk, without waiting
    fn resident(&self, coord: ChunkCoord) -> Option<Arc<Chunk>>;

    /// Ask for a chunk to be loaded in the background
    fn request(&self, coord: ChunkCoord) -> bool;
}

impl ChunkSource for ChunkStore {
    fn resident(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        ChunkStore::resident(self, coord)
    }

    fn request(&self, coord: ChunkCoord) -> bool {
        ChunkStore::request(self, coord)
    }
}

/// Chunks drawn per tier in one frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub culled: usize,
}

impl TierCounts {
    fn record(&mut self, tier: RenderTier) {
        match tier {
            RenderTier::High => self.high += 1,
            RenderTier::Medium => self.medium += 1,
            RenderTier::Low => self.low += 1,
        }
    }
}

/// What a single frame did
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FrameReport {
    pub tiers: TierCounts,
    /// Visible chunks that were not resident and got requested
    pub missing: usize,
    /// Draw calls issued, including the clear
    pub primitives: usize,
    pub draw_time: Duration,
    /// The frame exceeded the frame budget
    pub slow: bool,
    /// Normal drawing failed and the fallback frame was drawn instead
    pub fallback: bool,
}

/// Renders chunks at distance-based detail tiers
pub struct LodRenderer {
    config: LodConfig,
    style: StyleTable,
    chunk_size: i32,
    culler: ChunkCuller,
}

impl LodRenderer {
    pub fn new(config: LodConfig, style: StyleTable, world: WorldBounds, chunk_size: i32) -> Self {
        Self {
            config,
            style,
            chunk_size: chunk_size.max(1),
            culler: ChunkCuller::new(world, chunk_size),
        }
    }

    pub fn config(&self) -> &LodConfig {
        &self.config
    }

    pub fn style(&self) -> &StyleTable {
        &self.style
    }

    /// Draw one frame. Always completes; drawing errors switch to the
    /// fallback frame and are reported in the returned [`FrameReport`].
    pub fn render<C, S>(&mut self, viewport: &Viewport, source: &C, surface: &mut S) -> FrameReport
    where
        C: ChunkSource + ?Sized,
        S: DrawSurface + ?Sized,
    {
        let start = Instant::now();
        let mut report = FrameReport::default();

        if let Err(e) = self.draw_frame(viewport, source, surface, &mut report) {
            log::error!("Frame render failed: {}; drawing fallback", e);
            report.fallback = true;
            if let Err(e) = self.draw_fallback(viewport, surface, &mut report) {
                log::error!("Fallback render failed: {}", e);
            }
        }

        report.draw_time = start.elapsed();
        let budget = Duration::from_secs_f32(self.config.frame_budget_ms.max(0.0) / 1000.0);
        if report.draw_time > budget {
            report.slow = true;
            log::warn!(
                "Slow frame: {:.2}ms (budget {:.2}ms), {} high / {} medium / {} low chunks",
                report.draw_time.as_secs_f32() * 1000.0,
                self.config.frame_budget_ms,
                report.tiers.high,
                report.tiers.medium,
                report.tiers.low
            );
        }
        report
    }

    fn draw_frame<C, S>(
        &mut self,
        viewport: &Viewport,
        source: &C,
        surface: &mut S,
        report: &mut FrameReport,
    ) -> Result<(), SurfaceError>
    where
        C: ChunkSource + ?Sized,
        S: DrawSurface + ?Sized,
    {
        surface.clear(self.style.background)?;
        report.primitives += 1;

        let Some(bounds) = viewport.tile_bounds() else {
            return Ok(());
        };
        let visible = chunks_overlapping(&bounds, self.chunk_size);

        let (tiered, culled) = self.culler.cull_and_sort(visible, viewport.center(), &self.config);
        report.tiers.culled = culled;

        for chunk_info in tiered {
            let Some(chunk) = source.resident(chunk_info.coord) else {
                source.request(chunk_info.coord);
                report.missing += 1;
                continue;
            };

            report.primitives += match chunk_info.tier {
                RenderTier::High => draw_high(&self.style, &chunk, viewport, surface)?,
                RenderTier::Medium => draw_medium(&self.style, &self.config, &chunk, viewport, surface)?,
                RenderTier::Low => draw_low(&self.style, &self.config, &chunk, viewport, surface)?,
            };
            report.tiers.record(chunk_info.tier);
        }
        Ok(())
    }

    /// Minimal frame: background, chunk grid lines, camera marker
    fn draw_fallback<S>(&self, viewport: &Viewport, surface: &mut S, report: &mut FrameReport) -> Result<(), SurfaceError>
    where
        S: DrawSurface + ?Sized,
    {
        let (width, height) = surface.size();
        let (width, height) = (width as f32, height as f32);
        surface.clear(self.style.background)?;
        report.primitives += 1;

        let step = self.chunk_size as f32;
        let first_x = (viewport.min_x / step).ceil() * step;
        let mut x = first_x;
        while x <= viewport.max_x {
            let sx = viewport.world_to_screen(Vec2::new(x, viewport.min_y)).x;
            surface.fill_rect(sx, 0.0, 1.0, height, self.style.grid)?;
            report.primitives += 1;
            x += step;
        }

        let first_y = (viewport.min_y / step).ceil() * step;
        let mut y = first_y;
        while y <= viewport.max_y {
            let sy = viewport.world_to_screen(Vec2::new(viewport.min_x, y)).y;
            surface.fill_rect(0.0, sy, width, 1.0, self.style.grid)?;
            report.primitives += 1;
            y += step;
        }

        let marker = viewport.world_to_screen(viewport.center());
        surface.fill_rect(marker.x - 4.0, marker.y - 4.0, 8.0, 8.0, self.style.camera_marker)?;
        report.primitives += 1;
        Ok(())
    }
}

fn project_hex(tile: &Tile, scale: f32, viewport: &Viewport) -> [Vec2; 6] {
    hex_corners(tile_center(tile.x, tile.y), HEX_RADIUS * scale).map(|p| viewport.world_to_screen(p))
}

/// Every visible tile as a full hexagon with overlays
fn draw_high<S>(style: &StyleTable, chunk: &Chunk, viewport: &Viewport, surface: &mut S) -> Result<usize, SurfaceError>
where
    S: DrawSurface + ?Sized,
{
    let Some(bounds) = viewport.tile_bounds() else {
        return Ok(0);
    };
    let zoom = viewport.zoom;
    let mut drawn = 0;

    for tile in chunk.tiles_in(&bounds) {
        surface.fill_polygon(&project_hex(tile, 1.0, viewport), style.terrain_color(tile.terrain))?;
        drawn += 1;

        let center = viewport.world_to_screen(tile_center(tile.x, tile.y));
        if tile.has_river {
            surface.fill_rect(center.x - 0.4 * zoom, center.y - 0.06 * zoom, 0.8 * zoom, 0.12 * zoom, style.river)?;
            drawn += 1;
        }
        if tile.has_road {
            surface.fill_rect(center.x - 0.06 * zoom, center.y - 0.4 * zoom, 0.12 * zoom, 0.8 * zoom, style.road)?;
            drawn += 1;
        }
        if let Some(improvement) = tile.improvement {
            let color = style.improvement_color(improvement);
            surface.fill_rect(center.x - 0.2 * zoom, center.y + 0.1 * zoom, 0.4 * zoom, 0.2 * zoom, color)?;
            drawn += 1;
        }
        if let Some(resource) = tile.resource {
            let marker = hex_corners(tile_center(tile.x, tile.y), HEX_RADIUS * 0.3).map(|p| viewport.world_to_screen(p));
            surface.fill_polygon(&marker, style.resource_color(resource))?;
            drawn += 1;
        }
    }
    Ok(drawn)
}

/// Every `medium_stride`-th tile on both axes as a shrunken hexagon
fn draw_medium<S>(
    style: &StyleTable,
    config: &LodConfig,
    chunk: &Chunk,
    viewport: &Viewport,
    surface: &mut S,
) -> Result<usize, SurfaceError>
where
    S: DrawSurface + ?Sized,
{
    let Some(bounds) = viewport.tile_bounds() else {
        return Ok(0);
    };
    let stride = config.medium_stride.max(1);
    let mut drawn = 0;

    for ly in (0..chunk.height).step_by(stride as usize) {
        for lx in (0..chunk.width).step_by(stride as usize) {
            let Some(tile) = chunk.local(lx, ly) else {
                continue;
            };
            if !bounds.contains(tile.x, tile.y) {
                continue;
            }
            surface.fill_polygon(
                &project_hex(tile, config.medium_scale, viewport),
                style.terrain_color(tile.terrain),
            )?;
            drawn += 1;
        }
    }
    Ok(drawn)
}

/// One flat rectangle in the chunk's dominant terrain color
fn draw_low<S>(
    style: &StyleTable,
    config: &LodConfig,
    chunk: &Chunk,
    viewport: &Viewport,
    surface: &mut S,
) -> Result<usize, SurfaceError>
where
    S: DrawSurface + ?Sized,
{
    let terrain = dominant_terrain(chunk, config.low_sample_stride);
    let origin = viewport.world_to_screen(Vec2::new(chunk.origin_x as f32, chunk.origin_y as f32));
    surface.fill_rect(
        origin.x,
        origin.y,
        chunk.width as f32 * viewport.zoom,
        chunk.height as f32 * viewport.zoom,
        style.terrain_color(terrain),
    )?;
    Ok(1)
}

/// Most frequent terrain among tiles sampled every `stride` tiles on both
/// axes; ties go to the terrain declared first
pub fn dominant_terrain(chunk: &Chunk, stride: i32) -> Terrain {
    let stride = stride.max(1) as usize;
    let mut counts = [0usize; Terrain::ALL.len()];

    for ly in (0..chunk.height).step_by(stride) {
        for lx in (0..chunk.width).step_by(stride) {
            if let Some(tile) = chunk.local(lx, ly) {
                counts[tile.terrain.index()] += 1;
            }
        }
    }

    let mut best = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = i;
        }
    }
    Terrain::ALL[best]
}
