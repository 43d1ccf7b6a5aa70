//! Map configuration: world, streaming, LOD and viewport sections

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::map::viewport::ViewportConfig;
use crate::streaming::budget::StreamingConfig;
use crate::streaming::lod::LodConfig;
use crate::streaming::spatial::WorldBounds;
use crate::terrain::TerrainParams;

/// World dimensions and generation seed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width in tiles
    pub width: i32,
    /// Height in tiles
    pub height: i32,
    pub seed: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 10_000,
            height: 3_000,
            seed: 12345,
        }
    }
}

impl WorldConfig {
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds::new(self.width, self.height)
    }

    /// Generator parameters for this world
    pub fn terrain_params(&self) -> TerrainParams {
        TerrainParams {
            seed: self.seed,
            world_height: self.height.max(1) as u32,
            ..Default::default()
        }
    }
}

/// Complete map configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub world: WorldConfig,
    pub streaming: StreamingConfig,
    pub lod: LodConfig,
    pub viewport: ViewportConfig,
}

impl MapConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Save as pretty-printed JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject configurations the store or renderer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.world.width <= 0 || self.world.height <= 0 {
            return Err(Error::Config(format!(
                "world size must be positive, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        if self.streaming.chunk_size <= 0 {
            return Err(Error::Config(format!(
                "chunk_size must be positive, got {}",
                self.streaming.chunk_size
            )));
        }
        if self.streaming.max_loaded_chunks == 0 {
            return Err(Error::Config("max_loaded_chunks must be at least 1".into()));
        }
        if self.streaming.preload_radius < 0 {
            return Err(Error::Config("preload_radius must not be negative".into()));
        }
        if !self.lod.is_valid() {
            return Err(Error::Config(format!(
                "LOD thresholds must increase ({} < {} <= {}) and strides must be positive",
                self.lod.high_distance, self.lod.medium_distance, self.lod.cull_distance
            )));
        }

        let vp = &self.viewport;
        if !(vp.min_zoom > 0.0 && vp.min_zoom <= vp.max_zoom && vp.max_zoom.is_finite()) {
            return Err(Error::Config(format!(
                "zoom range must be positive and ordered, got {}..{}",
                vp.min_zoom, vp.max_zoom
            )));
        }
        if vp.screen_width == 0 || vp.screen_height == 0 {
            return Err(Error::Config("screen size must be non-zero".into()));
        }

        // Required chunks are never evicted, so they must fit in the cache
        let required = vp.max_required_chunks(self.streaming.chunk_size);
        if required > self.streaming.max_loaded_chunks {
            return Err(Error::Config(format!(
                "a {}x{} screen at zoom {} needs up to {} chunks, more than max_loaded_chunks ({})",
                vp.screen_width, vp.screen_height, vp.min_zoom, required, self.streaming.max_loaded_chunks
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MapConfig::default();
        assert_eq!(config.world.width, 10_000);
        assert_eq!(config.world.height, 3_000);
        assert_eq!(config.streaming.chunk_size, 100);
        assert_eq!(config.streaming.max_loaded_chunks, 50);
        assert_eq!(config.streaming.cache_expiry_secs, 300);
        assert_eq!(config.streaming.eviction_headroom, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("map.json");

        let mut config = MapConfig::default();
        config.world.seed = 99;
        config.streaming.max_loaded_chunks = 40;
        config.lod.cull_distance = 1500.0;
        config.viewport.screen_width = 640;

        config.save(&path).unwrap();
        let loaded = MapConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MapConfig::from_json_str(r#"{"world": {"seed": 7}, "streaming": {"chunk_size": 200}}"#).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.width, 10_000);
        assert_eq!(config.streaming.chunk_size, 200);
        assert_eq!(config.streaming.max_loaded_chunks, 50);
        assert_eq!(config.lod, LodConfig::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = MapConfig::default();
        config.streaming.chunk_size = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = MapConfig::default();
        config.streaming.max_loaded_chunks = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = MapConfig::default();
        config.lod.medium_distance = 100.0; // below high_distance
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = MapConfig::default();
        config.viewport.min_zoom = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validation_rejects_unpinnable_view() {
        // At zoom 1 a 1280x720 screen needs 176 chunks
        let mut config = MapConfig::default();
        config.viewport.min_zoom = 1.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.streaming.max_loaded_chunks = 176;
        assert!(config.validate().is_ok());

        // Smaller chunks need more of them for the same screen
        let mut config = MapConfig::default();
        config.streaming.chunk_size = 50;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_json_reported() {
        assert!(matches!(MapConfig::from_json_str("{ not json"), Err(Error::ConfigParse(_))));
        let err = MapConfig::from_json_str(r#"{"streaming": {"chunk_size": -5}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(MapConfig::load(&dir.path().join("absent.json")), Err(Error::Io(_))));
    }
}
