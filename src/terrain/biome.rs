//! Biome classification from elevation, temperature and moisture

use noise::{NoiseFn, Perlin};

use super::tile::{Resource, Terrain};

/// Elevation below which a tile is open ocean
pub const OCEAN_LEVEL: f64 = 0.40;
/// Elevation below which a tile is shallow coast
pub const COAST_LEVEL: f64 = 0.45;
/// Elevation at or above which a tile is hills
pub const HILLS_LEVEL: f64 = 0.62;
/// Elevation at or above which a tile is mountains
pub const MOUNTAIN_LEVEL: f64 = 0.70;

/// Rare terrain rolled on ordinary land. Each entry owns its own slice of a
/// single uniform roll, in table order.
pub const SPECIAL_TERRAINS: [(Terrain, f64); 5] = [
    (Terrain::Volcano, 0.002),
    (Terrain::AncientRuins, 0.003),
    (Terrain::SacredPlains, 0.003),
    (Terrain::EnchantedMeadow, 0.002),
    (Terrain::Caves, 0.004),
];

/// Normalized climate sample for one cell, every channel in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimateSample {
    pub elevation: f64,
    pub temperature: f64,
    pub moisture: f64,
}

/// Temperature and moisture fields
pub struct BiomeMap {
    temperature_noise: Perlin,
    moisture_noise: Perlin,
    temp_scale: f64,
    moisture_scale: f64,
    /// World height used for the latitude gradient
    world_height: f64,
    /// How much of the temperature comes from latitude vs. noise
    latitude_weight: f64,
}

impl BiomeMap {
    /// Create new biome map with given seed
    pub fn new(seed: u32, world_height: u32, temp_scale: f64, moisture_scale: f64, latitude_weight: f64) -> Self {
        Self {
            temperature_noise: Perlin::new(seed.wrapping_add(1000)),
            moisture_noise: Perlin::new(seed.wrapping_add(2000)),
            temp_scale,
            moisture_scale,
            world_height: world_height.max(1) as f64,
            latitude_weight: latitude_weight.clamp(0.0, 1.0),
        }
    }

    /// Temperature at a cell (0 = polar, 1 = equatorial)
    pub fn temperature_at(&self, x: i32, y: i32) -> f64 {
        let noise = self
            .temperature_noise
            .get([x as f64 / self.temp_scale, y as f64 / self.temp_scale]);
        let noise = normalize(noise);

        // 1.0 on the equator row, 0.0 on the first and last rows
        let lat = 1.0 - ((2.0 * y as f64 / self.world_height) - 1.0).abs();
        let lat = lat.clamp(0.0, 1.0);

        lat * self.latitude_weight + noise * (1.0 - self.latitude_weight)
    }

    /// Moisture at a cell (0 = arid, 1 = saturated)
    pub fn moisture_at(&self, x: i32, y: i32) -> f64 {
        normalize(
            self.moisture_noise
                .get([x as f64 / self.moisture_scale, y as f64 / self.moisture_scale]),
        )
    }
}

/// Map a noise value in roughly [-1, 1] to [0, 1]
pub fn normalize(v: f64) -> f64 {
    ((v + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Primary terrain: elevation first, then temperature/moisture for land.
pub fn classify(sample: &ClimateSample) -> Terrain {
    let ClimateSample { elevation, temperature, moisture } = *sample;

    if elevation < OCEAN_LEVEL {
        return Terrain::Ocean;
    }
    if elevation < COAST_LEVEL {
        return Terrain::Coast;
    }
    if elevation >= MOUNTAIN_LEVEL {
        return Terrain::Mountains;
    }
    if elevation >= HILLS_LEVEL {
        return Terrain::Hills;
    }

    match (temperature, moisture) {
        (t, _) if t < 0.25 => Terrain::Tundra,
        (t, m) if t > 0.65 && m < 0.35 => Terrain::Desert,
        (_, m) if m > 0.62 => Terrain::Forest,
        (_, m) if m > 0.45 => Terrain::Grassland,
        _ => Terrain::Plains,
    }
}

/// Pick a special terrain for a uniform roll in [0, 1), if any.
pub fn special_terrain(roll: f64) -> Option<Terrain> {
    let mut threshold = 0.0;
    for (terrain, chance) in SPECIAL_TERRAINS {
        threshold += chance;
        if roll < threshold {
            return Some(terrain);
        }
    }
    None
}

/// Resources that may appear on a terrain
pub fn resource_candidates(terrain: Terrain) -> &'static [Resource] {
    match terrain {
        Terrain::Ocean => &[Resource::Fish, Resource::Whales, Resource::Pearls],
        Terrain::Coast => &[Resource::Fish, Resource::Pearls],
        Terrain::Plains => &[Resource::Wheat, Resource::Horses],
        Terrain::Grassland => &[Resource::Cattle, Resource::Sheep, Resource::Horses],
        Terrain::Desert => &[Resource::Oil, Resource::Incense],
        Terrain::Tundra => &[Resource::Furs, Resource::Deer, Resource::Oil],
        Terrain::Forest => &[Resource::Lumber, Resource::Furs, Resource::Deer, Resource::Spices],
        Terrain::Hills => &[Resource::Iron, Resource::Coal, Resource::Sheep],
        Terrain::Mountains => &[Resource::Gold, Resource::Silver, Resource::Gems],
        Terrain::Volcano => &[Resource::Obsidian],
        Terrain::AncientRuins => &[Resource::Gold, Resource::Gems],
        Terrain::SacredPlains => &[Resource::Incense, Resource::Wheat],
        Terrain::EnchantedMeadow => &[Resource::Gems, Resource::Spices],
        Terrain::Caves => &[Resource::Iron, Resource::Gems, Resource::Coal],
    }
}
