//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Streaming and meshing settings.
    pub world: WorldConfig,
    /// Server connection settings.
    pub network: NetworkConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Streaming, visibility, and remeshing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Visibility search radius in chunks.
    pub visibility_radius: u32,
    /// Extra chunks kept loaded beyond the visibility radius (hysteresis).
    pub buffer_chunks: u32,
    /// Maximum outstanding chunk requests.
    pub max_pending_chunks: usize,
    /// Maximum outstanding tile/column requests.
    pub max_pending_tiles: usize,
    /// Per-tick remesh time budget in milliseconds.
    pub remesh_budget_ms: f32,
    /// Take voxel data from the server; `false` generates locally.
    pub use_server_chunks: bool,
    /// Ask the server to regenerate chunks instead of using its cache.
    pub force_regenerate_chunks: bool,
    /// Seed for local generation when the server is not the source.
    pub world_seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            visibility_radius: 6,
            buffer_chunks: 2,
            max_pending_chunks: 4,
            max_pending_tiles: 4,
            remesh_budget_ms: 4.0,
            use_server_chunks: true,
            force_regenerate_chunks: false,
            world_seed: 0,
        }
    }
}

/// Server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Server host.
    pub server_address: String,
    /// Server port.
    pub server_port: u16,
    /// Connection timeout in seconds.
    pub timeout_seconds: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1".to_string(),
            server_port: 4025,
            timeout_seconds: 10,
        }
    }
}

/// Debug/development settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter override (empty uses the built-in default).
    pub log_level: String,
    /// Draw chunk boundaries.
    pub show_chunk_bounds: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: String::new(),
            show_chunk_bounds: false,
        }
    }
}

impl Config {
    /// Loads configuration from a RON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        ron::from_str(&text).map_err(ConfigError::Parse)
    }

    /// Loads from `path` if it exists, otherwise returns defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves configuration as pretty RON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(ConfigError::Serialize)?;
        std::fs::write(path, text).map_err(ConfigError::Write)
    }

    /// The default per-user config file location, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("loam").join("config.ron"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_protocol_constants() {
        let config = WorldConfig::default();
        assert_eq!(config.visibility_radius, 6);
        assert_eq!(config.buffer_chunks, 2);
        assert_eq!(config.max_pending_chunks, 4);
        assert_eq!(config.max_pending_tiles, 4);
        assert_eq!(config.remesh_budget_ms, 4.0);
        assert!(config.use_server_chunks);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.ron");
        let mut config = Config::default();
        config.world.visibility_radius = 9;
        config.network.server_port = 9000;
        config.save(&path).expect("save");

        let loaded = Config::load(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nope.ron");
        let config = Config::load_or_default(&path).expect("load_or_default");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config =
            ron::from_str("(world: (visibility_radius: 3))").expect("parse partial");
        assert_eq!(config.world.visibility_radius, 3);
        assert_eq!(config.world.max_pending_chunks, 4);
        assert_eq!(config.network, NetworkConfig::default());
    }
}
