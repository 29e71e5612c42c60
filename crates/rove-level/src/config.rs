//! Level construction parameters.

use rove_zone::{ConfigError, ZoneConfig};

/// Configuration for a [`Level`](crate::Level).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelConfig {
    /// Zone backing every thinker and the sector array.
    pub zone: ZoneConfig,
    /// Seed for the level's random number generator.
    pub seed: u64,
}

impl LevelConfig {
    /// A level over `zone` with seed `0`.
    pub fn new(zone: ZoneConfig) -> Self {
        Self { zone, seed: 0 }
    }

    /// Builder: set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the zone parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.zone.validate()
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::new(ZoneConfig::default())
    }
}
