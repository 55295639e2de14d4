//! Configuration for the water mask engine.

use serde::{Deserialize, Serialize};

/// Configuration for the water mask engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskConfig {
    /// EPSG code of the query coordinate reference system.
    pub source_epsg: u32,

    /// Tile edge length in pixels (square tiles).
    pub tile_size: usize,

    /// Maximum number of tiles held by each worker-local tile cache.
    pub max_cache_tiles: usize,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            // WGS84 lon/lat.
            source_epsg: 4326,
            tile_size: 256,
            max_cache_tiles: 4096,
        }
    }
}

impl MaskConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("WATER_MASK_SOURCE_EPSG") {
            if let Ok(code) = val.parse() {
                config.source_epsg = code;
            }
        }

        if let Ok(val) = std::env::var("WATER_MASK_TILE_SIZE") {
            if let Ok(size) = val.parse() {
                config.tile_size = size;
            }
        }

        if let Ok(val) = std::env::var("WATER_MASK_CACHE_TILES") {
            if let Ok(count) = val.parse() {
                config.max_cache_tiles = count;
            }
        }

        config
    }

    /// Set the query CRS EPSG code.
    pub fn with_source_epsg(mut self, code: u32) -> Self {
        self.source_epsg = code;
        self
    }

    /// Set the tile edge length in pixels.
    pub fn with_tile_size(mut self, size: usize) -> Self {
        self.tile_size = size;
        self
    }

    /// Set the per-cache tile bound.
    pub fn with_max_cache_tiles(mut self, count: usize) -> Self {
        self.max_cache_tiles = count;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.source_epsg == 0 {
            return Err("source_epsg must be > 0".to_string());
        }

        if self.tile_size == 0 {
            return Err("tile_size must be > 0".to_string());
        }

        if self.max_cache_tiles == 0 {
            return Err("max_cache_tiles must be > 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MaskConfig::default();
        assert_eq!(config.source_epsg, 4326);
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.max_cache_tiles, 4096);
    }

    #[test]
    fn test_config_validation() {
        let config = MaskConfig::default();
        assert!(config.validate().is_ok());

        assert!(MaskConfig::default().with_source_epsg(0).validate().is_err());
        assert!(MaskConfig::default().with_tile_size(0).validate().is_err());
        assert!(MaskConfig::default()
            .with_max_cache_tiles(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_env_overrides_and_fallbacks() {
        std::env::set_var("WATER_MASK_SOURCE_EPSG", "3857");
        std::env::set_var("WATER_MASK_TILE_SIZE", "128");
        std::env::set_var("WATER_MASK_CACHE_TILES", "64");

        let config = MaskConfig::from_env();
        assert_eq!(config.source_epsg, 3857);
        assert_eq!(config.tile_size, 128);
        assert_eq!(config.max_cache_tiles, 64);

        // Unparseable or unset variables fall back to the defaults
        // without disturbing the others.
        std::env::set_var("WATER_MASK_TILE_SIZE", "not-a-number");
        std::env::remove_var("WATER_MASK_CACHE_TILES");

        let config = MaskConfig::from_env();
        assert_eq!(config.source_epsg, 3857);
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.max_cache_tiles, 4096);

        std::env::remove_var("WATER_MASK_SOURCE_EPSG");
        std::env::remove_var("WATER_MASK_TILE_SIZE");

        let config = MaskConfig::from_env();
        assert_eq!(config.source_epsg, 4326);
        assert_eq!(config.tile_size, 256);
    }

    #[test]
    fn test_builder_setters() {
        let config = MaskConfig::default()
            .with_source_epsg(3857)
            .with_tile_size(128)
            .with_max_cache_tiles(64);

        assert_eq!(config.source_epsg, 3857);
        assert_eq!(config.tile_size, 128);
        assert_eq!(config.max_cache_tiles, 64);
    }
}
