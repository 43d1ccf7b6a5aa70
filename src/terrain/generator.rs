//! Noise-based procedural tile generation

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::biome::{self, BiomeMap, ClimateSample};
use super::tile::{Improvement, Resource, Terrain, Tile};

const SALT_SPECIAL: u32 = 0x5EC1;
const SALT_RESOURCE: u32 = 0x4E50;
const SALT_RESOURCE_PICK: u32 = 0x91C4;
const SALT_RIVER: u32 = 0x1217;
const SALT_ROAD: u32 = 0x20AD;
const SALT_IMPROVEMENT: u32 = 0x1A9B;

/// Failure to produce a tile
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("noise produced a non-finite sample at ({x}, {y})")]
    NonFinite { x: i32, y: i32 },

    #[error("tile source failed at ({x}, {y}): {reason}")]
    Source { x: i32, y: i32, reason: String },
}

/// Anything that can produce the tile for a world cell.
///
/// Implementations must be deterministic: the same coordinates always yield
/// the same tile, independent of call order or thread.
pub trait TileSource: Send + Sync {
    fn generate(&self, x: i32, y: i32) -> Result<Tile, GenerationError>;
}

/// Parameters controlling tile generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub seed: u32,
    /// World height in tiles, used for the latitude gradient
    pub world_height: u32,
    pub elevation_scale: f64, // Horizontal scale of continents (larger = smoother)
    pub temperature_scale: f64,
    pub moisture_scale: f64,
    pub octaves: usize,       // FBM octaves (detail levels)
    pub persistence: f64,     // FBM persistence (0.5 typical)
    pub lacunarity: f64,      // FBM lacunarity (2.0 typical)
    pub latitude_weight: f64, // Share of temperature driven by latitude
    pub resource_chance: f64,
    pub river_chance: f64,
    pub road_chance: f64,
    /// Chance that a resource tile is already worked
    pub improvement_chance: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            world_height: 3000,
            elevation_scale: 80.0,
            temperature_scale: 400.0,
            moisture_scale: 120.0,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            latitude_weight: 0.6,
            resource_chance: 0.05,
            river_chance: 0.08,
            road_chance: 0.03,
            improvement_chance: 0.25,
        }
    }
}

/// Procedural tile generator using fractal Brownian motion (FBM) for
/// elevation and two Perlin fields for climate.
pub struct TerrainGenerator {
    params: TerrainParams,
    elevation: Fbm<Perlin>,
    biomes: BiomeMap,
}

impl TerrainGenerator {
    /// Create a new terrain generator with the given parameters
    pub fn new(params: TerrainParams) -> Self {
        let elevation = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves)
            .set_persistence(params.persistence)
            .set_lacunarity(params.lacunarity);

        let biomes = BiomeMap::new(
            params.seed,
            params.world_height,
            params.temperature_scale,
            params.moisture_scale,
            params.latitude_weight,
        );

        Self { params, elevation, biomes }
    }

    /// Create a generator with default parameters and the given seed
    pub fn with_seed(seed: u32) -> Self {
        Self::new(TerrainParams { seed, ..Default::default() })
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Elevation at a cell in [0, 1]
    pub fn elevation_at(&self, x: i32, y: i32) -> f64 {
        let nx = x as f64 / self.params.elevation_scale;
        let ny = y as f64 / self.params.elevation_scale;
        biome::normalize(self.elevation.get([nx, ny]))
    }

    /// All three climate channels for a cell
    pub fn sample(&self, x: i32, y: i32) -> ClimateSample {
        ClimateSample {
            elevation: self.elevation_at(x, y),
            temperature: self.biomes.temperature_at(x, y),
            moisture: self.biomes.moisture_at(x, y),
        }
    }

    fn build_tile(&self, x: i32, y: i32) -> Result<Tile, GenerationError> {
        let sample = self.sample(x, y);
        if !(sample.elevation.is_finite() && sample.temperature.is_finite() && sample.moisture.is_finite()) {
            return Err(GenerationError::NonFinite { x, y });
        }

        let seed = self.params.seed;
        let mut terrain = biome::classify(&sample);
        if terrain.is_ordinary_land() {
            if let Some(special) = biome::special_terrain(hash_unit(x, y, seed, SALT_SPECIAL)) {
                terrain = special;
            }
        }

        let resource = if hash_unit(x, y, seed, SALT_RESOURCE) < self.params.resource_chance {
            let candidates = biome::resource_candidates(terrain);
            let pick = (hash_unit(x, y, seed, SALT_RESOURCE_PICK) * candidates.len() as f64) as usize;
            candidates.get(pick.min(candidates.len() - 1)).copied()
        } else {
            None
        };

        let has_river = !terrain.is_water()
            && sample.moisture > 0.55
            && sample.elevation < biome::HILLS_LEVEL
            && hash_unit(x, y, seed, SALT_RIVER) < self.params.river_chance;

        let has_road = !terrain.is_water()
            && terrain != Terrain::Mountains
            && hash_unit(x, y, seed, SALT_ROAD) < self.params.road_chance;

        let improvement = resource
            .and_then(improvement_for)
            .filter(|_| hash_unit(x, y, seed, SALT_IMPROVEMENT) < self.params.improvement_chance);

        Ok(Tile::new(x, y, terrain)
            .with_resource(resource)
            .with_river(has_river)
            .with_road(has_road)
            .with_improvement(improvement))
    }
}

/// The improvement that works a resource, if any
pub fn improvement_for(resource: Resource) -> Option<Improvement> {
    match resource {
        Resource::Fish | Resource::Whales | Resource::Pearls => Some(Improvement::FishingBoats),
        Resource::Wheat => Some(Improvement::Farm),
        Resource::Horses | Resource::Cattle | Resource::Sheep => Some(Improvement::Pasture),
        Resource::Incense | Resource::Spices => Some(Improvement::Plantation),
        Resource::Lumber => Some(Improvement::LumberMill),
        Resource::Iron | Resource::Coal | Resource::Gold | Resource::Silver | Resource::Gems => {
            Some(Improvement::Mine)
        }
        Resource::Obsidian => Some(Improvement::Quarry),
        Resource::Oil | Resource::Furs | Resource::Deer => None,
    }
}

impl TileSource for TerrainGenerator {
    fn generate(&self, x: i32, y: i32) -> Result<Tile, GenerationError> {
        self.build_tile(x, y)
    }
}

/// One-shot generation for callers that only have a seed.
///
/// Builds a fresh generator per call; hold a [`TerrainGenerator`] for bulk work.
pub fn generate_tile(x: i32, y: i32, seed: u32) -> Result<Tile, GenerationError> {
    TerrainGenerator::with_seed(seed).generate(x, y)
}

/// Deterministic per-cell uniform value in [0, 1)
fn hash_unit(x: i32, y: i32, seed: u32, salt: u32) -> f64 {
    let mut h = (x as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (y as u32 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (((seed as u64) << 32) | salt as u64).wrapping_mul(0x1656_67B1_9E37_79F9);
    // splitmix64 finalizer
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^= h >> 31;
    (h >> 11) as f64 / (1u64 << 53) as f64
}
