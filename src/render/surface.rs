//! Drawing surface abstraction
//!
//! The renderer only ever issues three kinds of primitive. Anything that can
//! clear itself, fill an axis-aligned rectangle and fill a convex polygon in
//! screen pixels can be drawn on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::Vec2;

/// 8-bit RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Drawing failure
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SurfaceError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),

    #[error("non-finite coordinate in draw call")]
    NonFinite,

    #[error("surface backend error: {0}")]
    Backend(String),
}

/// Target for rendered frames
pub trait DrawSurface {
    /// Size in pixels (width, height)
    fn size(&self) -> (u32, u32);

    fn clear(&mut self, color: Color) -> Result<(), SurfaceError>;

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) -> Result<(), SurfaceError>;

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) -> Result<(), SurfaceError>;
}

/// One recorded draw call
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect { x: f32, y: f32, w: f32, h: f32, color: Color },
    Polygon { points: Vec<Vec2>, color: Color },
}

impl DrawCommand {
    /// Centroid of the primitive in screen space (`None` for clears)
    pub fn centroid(&self) -> Option<Vec2> {
        match self {
            DrawCommand::Clear(_) => None,
            DrawCommand::Rect { x, y, w, h, .. } => Some(Vec2::new(x + w * 0.5, y + h * 0.5)),
            DrawCommand::Polygon { points, .. } => {
                let sum: Vec2 = points.iter().copied().sum();
                Some(sum / points.len().max(1) as f32)
            }
        }
    }
}

/// Surface that records every draw call instead of rasterizing
///
/// Used by tests and headless tooling to inspect exactly what a frame drew.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
    /// When set, every polygon fill fails
    fail_polygons: bool,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            fail_polygons: false,
        }
    }

    /// A surface whose polygon fills always fail
    pub fn failing_polygons(width: u32, height: u32) -> Self {
        Self {
            fail_polygons: true,
            ..Self::new(width, height)
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop recorded commands, keeping the surface configuration
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn polygon_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polygon { .. }))
            .count()
    }

    pub fn rect_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { .. }))
            .count()
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) -> Result<(), SurfaceError> {
        self.commands.push(DrawCommand::Clear(color));
        Ok(())
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) -> Result<(), SurfaceError> {
        if !(x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite()) {
            return Err(SurfaceError::NonFinite);
        }
        self.commands.push(DrawCommand::Rect { x, y, w, h, color });
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) -> Result<(), SurfaceError> {
        if self.fail_polygons {
            return Err(SurfaceError::Backend("polygon fills disabled".into()));
        }
        if points.len() < 3 {
            return Err(SurfaceError::DegeneratePolygon(points.len()));
        }
        if !points.iter().all(|p| p.is_finite()) {
            return Err(SurfaceError::NonFinite);
        }
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
        Ok(())
    }
}
