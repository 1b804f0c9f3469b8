//! # Engine Configuration
//!
//! Serializable settings for the engine core, the renderer and the window
//! surface. Every struct has sensible defaults so a missing config file or a
//! partial one still produces a runnable setup.

use std::path::PathBuf;

use serde::{Serialize, Deserialize};

use super::{Config, ConfigError};

/// # Renderer Configuration
///
/// Capacities and pipeline shape for the multi-pass renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Number of progressively downsampled blur tiers used by the bloom pass
    pub bloom_tiers: usize,
    /// Capacity of each mesh category in the render queue
    pub max_renderable_meshes: usize,
    /// Capacity of the light list in the render queue
    pub max_lights: usize,
    /// Capacity of the text list in the render queue
    pub max_texts: usize,
    /// Maximum instances merged into a single batched draw
    pub instancing_max: u32,
    /// Sub-buffers allocated per uniform buffer chunk
    pub buffer_pool_chunk: u32,
    /// Uniform buffer offset alignment reported by the device
    pub ubo_alignment: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            bloom_tiers: 3,
            max_renderable_meshes: 4000,
            max_lights: 50,
            max_texts: 4000,
            instancing_max: 1024,
            buffer_pool_chunk: 50,
            ubo_alignment: 256,
        }
    }
}

impl RendererConfig {
    /// Set the number of bloom tiers
    pub fn with_bloom_tiers(mut self, tiers: usize) -> Self {
        self.bloom_tiers = tiers;
        self
    }

    /// Set the render queue mesh capacity
    pub fn with_max_renderable_meshes(mut self, max: usize) -> Self {
        self.max_renderable_meshes = max;
        self
    }

    /// Set the render queue light capacity
    pub fn with_max_lights(mut self, max: usize) -> Self {
        self.max_lights = max;
        self
    }

    /// Set the maximum number of instances per batch
    pub fn with_instancing_max(mut self, max: u32) -> Self {
        self.instancing_max = max;
        self
    }
}

/// # Window Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Back buffer width in pixels
    pub width: u32,
    /// Back buffer height in pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}

/// # Engine Configuration
///
/// Top-level settings loaded by the game at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log filter (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    /// Root of the archetype directory tree
    pub archetypes_dir: PathBuf,
    /// Directory scanned for `.mat` material descriptors
    pub materials_dir: PathBuf,
    /// Frames simulated by the headless loop
    pub frames: u32,
    /// Window / back buffer size
    pub window: WindowConfig,
    /// Renderer settings
    pub renderer: RendererConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            archetypes_dir: PathBuf::from("resources/archetypes"),
            materials_dir: PathBuf::from("resources/materials"),
            frames: 60,
            window: WindowConfig::default(),
            renderer: RendererConfig::default(),
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the archetype directory
    pub fn with_archetypes_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archetypes_dir = dir.into();
        self
    }

    /// Set the window size
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window = WindowConfig { width, height };
        self
    }

    /// Set the renderer configuration
    pub fn with_renderer(mut self, renderer: RendererConfig) -> Self {
        self.renderer = renderer;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        if self.renderer.bloom_tiers == 0 {
            return Err(ConfigError::Invalid("at least one bloom tier is required".into()));
        }
        if self.renderer.instancing_max == 0 || self.renderer.buffer_pool_chunk == 0 {
            return Err(ConfigError::Invalid("instancing and buffer pool sizes must be non-zero".into()));
        }
        if !self.renderer.ubo_alignment.is_power_of_two() {
            return Err(ConfigError::Invalid("ubo alignment must be a power of two".into()));
        }
        Ok(())
    }
}
