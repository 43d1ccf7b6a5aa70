//! Per-cell render styles

use serde::{Deserialize, Serialize};

use crate::render::surface::Color;
use crate::terrain::{Improvement, Resource, Terrain};

/// Colors for every terrain, resource and improvement plus frame chrome
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTable {
    /// Indexed by [`Terrain::index`]
    pub terrain: [Color; 14],
    pub resource: Color,
    pub strategic_resource: Color,
    pub improvement: Color,
    pub river: Color,
    pub road: Color,
    pub background: Color,
    pub grid: Color,
    pub camera_marker: Color,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            terrain: [
                Color::rgb(28, 64, 140),   // Ocean
                Color::rgb(64, 120, 190),  // Coast
                Color::rgb(186, 178, 96),  // Plains
                Color::rgb(98, 160, 62),   // Grassland
                Color::rgb(226, 204, 132), // Desert
                Color::rgb(196, 210, 214), // Tundra
                Color::rgb(34, 100, 42),   // Forest
                Color::rgb(140, 122, 82),  // Hills
                Color::rgb(120, 116, 112), // Mountains
                Color::rgb(170, 48, 20),   // Volcano
                Color::rgb(150, 110, 160), // AncientRuins
                Color::rgb(230, 220, 150), // SacredPlains
                Color::rgb(120, 220, 170), // EnchantedMeadow
                Color::rgb(60, 52, 48),    // Caves
            ],
            resource: Color::rgb(250, 210, 40),
            strategic_resource: Color::rgb(220, 90, 30),
            improvement: Color::rgb(150, 90, 40),
            river: Color::rgb(70, 140, 230),
            road: Color::rgb(110, 80, 50),
            background: Color::rgb(12, 14, 23),
            grid: Color::rgb(60, 64, 80),
            camera_marker: Color::rgb(255, 64, 64),
        }
    }
}

impl StyleTable {
    pub fn terrain_color(&self, terrain: Terrain) -> Color {
        self.terrain[terrain.index()]
    }

    /// Strategic resources (metals, fuel) stand out from bonus resources
    pub fn resource_color(&self, resource: Resource) -> Color {
        match resource {
            Resource::Iron | Resource::Coal | Resource::Oil | Resource::Horses | Resource::Obsidian => {
                self.strategic_resource
            }
            _ => self.resource,
        }
    }

    /// Extraction improvements are drawn in stone grey, the rest in `improvement`
    pub fn improvement_color(&self, improvement: Improvement) -> Color {
        match improvement {
            Improvement::Mine | Improvement::Quarry => Color::rgb(168, 168, 160),
            Improvement::FishingBoats => Color::rgb(236, 236, 228),
            _ => self.improvement,
        }
    }
}
