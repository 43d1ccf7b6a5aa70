//! Hex tile data: terrain, resources, improvements and yields

use serde::{Deserialize, Serialize};

/// Terrain types. The first nine are ordinary terrain, the last five are rare specials.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Terrain {
    Ocean,
    Coast,
    Plains,
    Grassland,
    Desert,
    Tundra,
    Forest,
    Hills,
    Mountains,
    Volcano,
    AncientRuins,
    SacredPlains,
    EnchantedMeadow,
    Caves,
}

impl Terrain {
    /// Every terrain, in declaration order
    pub const ALL: [Terrain; 14] = [
        Terrain::Ocean,
        Terrain::Coast,
        Terrain::Plains,
        Terrain::Grassland,
        Terrain::Desert,
        Terrain::Tundra,
        Terrain::Forest,
        Terrain::Hills,
        Terrain::Mountains,
        Terrain::Volcano,
        Terrain::AncientRuins,
        Terrain::SacredPlains,
        Terrain::EnchantedMeadow,
        Terrain::Caves,
    ];

    /// Index into [`Terrain::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_water(self) -> bool {
        matches!(self, Terrain::Ocean | Terrain::Coast)
    }

    /// Rare terrain placed by the special-terrain table
    pub fn is_special(self) -> bool {
        matches!(
            self,
            Terrain::Volcano
                | Terrain::AncientRuins
                | Terrain::SacredPlains
                | Terrain::EnchantedMeadow
                | Terrain::Caves
        )
    }

    /// Flat land biomes; the only terrain eligible to become a special
    pub fn is_ordinary_land(self) -> bool {
        matches!(
            self,
            Terrain::Plains | Terrain::Grassland | Terrain::Desert | Terrain::Tundra | Terrain::Forest
        )
    }

    /// Base (food, gold, action points) for a tile of this terrain
    pub fn base_yield(self) -> (i32, i32, i32) {
        match self {
            Terrain::Ocean => (1, 0, 1),
            Terrain::Coast => (2, 1, 1),
            Terrain::Plains => (2, 1, 1),
            Terrain::Grassland => (3, 0, 1),
            Terrain::Desert => (0, 1, 1),
            Terrain::Tundra => (1, 0, 1),
            Terrain::Forest => (1, 1, 2),
            Terrain::Hills => (1, 2, 2),
            Terrain::Mountains => (0, 2, 3),
            Terrain::Volcano => (0, 3, 3),
            Terrain::AncientRuins => (1, 4, 1),
            Terrain::SacredPlains => (3, 2, 1),
            Terrain::EnchantedMeadow => (4, 1, 1),
            Terrain::Caves => (0, 3, 2),
        }
    }
}

/// Strategic and luxury resources
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Fish,
    Whales,
    Pearls,
    Wheat,
    Horses,
    Cattle,
    Sheep,
    Oil,
    Incense,
    Furs,
    Deer,
    Lumber,
    Iron,
    Coal,
    Gold,
    Silver,
    Gems,
    Obsidian,
    Spices,
}

impl Resource {
    /// Extra (food, gold) granted by the resource
    pub fn bonus_yield(self) -> (i32, i32) {
        match self {
            Resource::Fish | Resource::Wheat | Resource::Cattle | Resource::Sheep | Resource::Deer => (1, 0),
            Resource::Whales | Resource::Furs | Resource::Lumber | Resource::Horses => (1, 1),
            Resource::Iron | Resource::Coal | Resource::Oil | Resource::Obsidian => (0, 1),
            Resource::Pearls | Resource::Incense | Resource::Spices | Resource::Silver => (0, 2),
            Resource::Gold | Resource::Gems => (0, 3),
        }
    }
}

/// Player-built tile improvements
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Improvement {
    Farm,
    Mine,
    LumberMill,
    Pasture,
    Plantation,
    FishingBoats,
    Quarry,
}

/// One hexagonal world cell
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    pub terrain: Terrain,
    pub resource: Option<Resource>,
    pub food: i32,
    pub gold: i32,
    pub action_points: i32,
    pub has_river: bool,
    pub has_road: bool,
    pub improvement: Option<Improvement>,
    pub is_visible: bool,
    pub is_explored: bool,
}

impl Tile {
    /// Create a bare tile with the terrain's base yields
    pub fn new(x: i32, y: i32, terrain: Terrain) -> Self {
        let (food, gold, action_points) = terrain.base_yield();
        Self {
            x,
            y,
            terrain,
            resource: None,
            food,
            gold,
            action_points,
            has_river: false,
            has_road: false,
            improvement: None,
            is_visible: false,
            is_explored: false,
        }
    }

    /// Attach a resource and apply its yield bonus
    pub fn with_resource(mut self, resource: Option<Resource>) -> Self {
        if let Some(old) = self.resource.take() {
            let (food, gold) = old.bonus_yield();
            self.food -= food;
            self.gold -= gold;
        }
        if let Some(res) = resource {
            let (food, gold) = res.bonus_yield();
            self.food += food;
            self.gold += gold;
        }
        self.resource = resource;
        self
    }

    /// Rivers add one food and one gold
    pub fn with_river(mut self, has_river: bool) -> Self {
        if has_river != self.has_river {
            let delta = if has_river { 1 } else { -1 };
            self.food += delta;
            self.gold += delta;
            self.has_river = has_river;
        }
        self
    }

    pub fn with_road(mut self, has_road: bool) -> Self {
        self.has_road = has_road;
        self
    }

    pub fn with_improvement(mut self, improvement: Option<Improvement>) -> Self {
        self.improvement = improvement;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_count() {
        assert_eq!(Terrain::ALL.len(), 14);
        for (i, t) in Terrain::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }

    #[test]
    fn test_terrain_categories_disjoint() {
        for t in Terrain::ALL {
            let cats = [t.is_water(), t.is_special(), t.is_ordinary_land()];
            assert!(cats.iter().filter(|c| **c).count() <= 1, "{:?}", t);
        }
        assert_eq!(Terrain::ALL.iter().filter(|t| t.is_special()).count(), 5);
    }

    #[test]
    fn test_tile_yields() {
        let tile = Tile::new(3, 4, Terrain::Grassland);
        assert_eq!((tile.food, tile.gold, tile.action_points), (3, 0, 1));

        let tile = tile.with_river(true).with_resource(Some(Resource::Gold));
        assert_eq!(tile.food, 4);
        assert_eq!(tile.gold, 4);

        // Replacing a resource removes the old bonus
        let tile = tile.with_resource(Some(Resource::Wheat));
        assert_eq!(tile.food, 5);
        assert_eq!(tile.gold, 1);

        let tile = tile.with_river(false).with_resource(None);
        assert_eq!((tile.food, tile.gold), (3, 0));
    }

    #[test]
    fn test_new_tile_defaults() {
        let tile = Tile::new(0, 0, Terrain::Ocean);
        assert!(tile.resource.is_none());
        assert!(tile.improvement.is_none());
        assert!(!tile.has_road && !tile.has_river);
        assert!(!tile.is_visible && !tile.is_explored);
    }
}
