use glam::UVec2;
use helio_core::{HelioError, Result};

/// Configuration for a [`LightGrid`](crate::LightGrid)
#[derive(Debug, Clone, PartialEq)]
pub struct LightGridConfig {
    /// Tile size in pixels. Grid dimensions are derived from this and the
    /// resolution, then clamped to the fixed grid capacity.
    pub tile_size: UVec2,
    /// Fan the binning passes out over rayon (needs the `rayon` feature)
    pub parallel: bool,
    /// Below this many lights the serial path is used even when `parallel` is set
    pub parallel_light_threshold: usize,
}

impl Default for LightGridConfig {
    fn default() -> Self {
        Self {
            tile_size: UVec2::new(128, 128),
            parallel: false,
            parallel_light_threshold: 256,
        }
    }
}

impl LightGridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tile_size(mut self, tile_size: UVec2) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_light_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_tile_size(self.tile_size)
    }

    /// True when a build over `light_count` lights should take the rayon path.
    #[cfg(feature = "rayon")]
    pub(crate) fn use_parallel(&self, light_count: usize) -> bool {
        self.parallel && light_count >= self.parallel_light_threshold
    }
}

pub(crate) fn validate_tile_size(tile_size: UVec2) -> Result<()> {
    if tile_size.x == 0 || tile_size.y == 0 {
        return Err(HelioError::InvalidConfiguration(format!(
            "tile size must be non-zero, got {}x{}",
            tile_size.x, tile_size.y
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let config = LightGridConfig::new()
            .with_tile_size(UVec2::new(16, 32))
            .with_parallel(true)
            .with_parallel_threshold(8);
        assert_eq!(config.tile_size, UVec2::new(16, 32));
        assert!(config.parallel);
        assert_eq!(config.parallel_light_threshold, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_tile_size_is_invalid() {
        let config = LightGridConfig::new().with_tile_size(UVec2::new(0, 16));
        assert!(matches!(
            config.validate(),
            Err(HelioError::InvalidConfiguration(_))
        ));
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_parallel_respects_threshold() {
        let config = LightGridConfig::new()
            .with_parallel(true)
            .with_parallel_threshold(100);
        assert!(!config.use_parallel(99));
        assert!(config.use_parallel(100));
        assert!(!LightGridConfig::new().use_parallel(100_000));
    }
}
