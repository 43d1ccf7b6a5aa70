//! Procedural terrain: tile data model, climate classification and generation

pub mod tile;
pub use tile::{Improvement, Resource, Terrain, Tile};

pub mod biome;
pub use biome::{BiomeMap, ClimateSample};

pub mod generator;
pub use generator::{generate_tile, improvement_for, GenerationError, TerrainGenerator, TerrainParams, TileSource};
