//! Map rendering: draw surfaces, hex geometry and the LOD chunk renderer

pub mod surface;
pub mod hex;
pub mod style;
pub mod culling;
pub mod image_surface;
pub mod lod_renderer;

pub use surface::{Color, DrawCommand, DrawSurface, RecordingSurface, SurfaceError};
pub use hex::{hex_corners, tile_at, tile_center, HEX_RADIUS};
pub use style::StyleTable;
pub use culling::{ChunkCuller, TieredChunk};
pub use image_surface::ImageSurface;
pub use lod_renderer::{dominant_terrain, ChunkSource, FrameReport, LodRenderer, TierCounts};
