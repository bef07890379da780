//! Terrain and streaming configuration, loadable from RON.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ISO_LEVEL, DEFAULT_STREAM_RADIUS, DEFAULT_UPLOADS_PER_PASS, MAX_STREAM_RADIUS,
    MAX_VERTICAL_LAYERS,
};
use crate::error::SettingsError;

/// Height-field noise parameters. Immutable once handed to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainParams {
    /// Base seed mixed into every lattice hash.
    pub seed: u32,
    /// World units to noise units. Smaller = wider features.
    pub world_scale: f32,
    /// Maximum height deviation from `base_height`.
    pub amplitude: f32,
    /// Surface altitude where the noise sum is zero.
    pub base_height: f32,
    /// Number of FBM layers. 0 yields a flat surface at `base_height`.
    pub octaves: u32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude multiplier per octave.
    pub gain: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 1337,
            world_scale: 0.02,
            amplitude: 12.0,
            base_height: 8.0,
            octaves: 4,
            lacunarity: 2.0,
            gain: 0.5,
        }
    }
}

impl TerrainParams {
    /// Reject parameters that cannot produce a meaningful height field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        positive("world_scale", self.world_scale)?;
        positive("lacunarity", self.lacunarity)?;
        positive("gain", self.gain)?;
        finite("amplitude", self.amplitude)?;
        finite("base_height", self.base_height)?;
        Ok(())
    }
}

/// Which chunk layers along Y are kept resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalExtent {
    /// Fixed absolute layer range, independent of the camera height.
    Layers { min: i32, max: i32 },
    /// Layers relative to the camera's chunk layer.
    Around { below: u32, above: u32 },
}

impl Default for VerticalExtent {
    fn default() -> Self {
        VerticalExtent::Layers { min: 0, max: 0 }
    }
}

impl VerticalExtent {
    /// Inclusive layer range for a camera sitting in chunk layer `camera_cy`.
    /// Relative ranges saturate at the ends of the i32 key space.
    pub fn layers(&self, camera_cy: i32) -> (i32, i32) {
        match *self {
            VerticalExtent::Layers { min, max } => (min, max),
            VerticalExtent::Around { below, above } => (
                saturate(i64::from(camera_cy) - i64::from(below)),
                saturate(i64::from(camera_cy) + i64::from(above)),
            ),
        }
    }

    /// Number of layers kept resident; 0 for an inverted `Layers` range.
    pub fn layer_count(&self) -> u64 {
        match *self {
            VerticalExtent::Layers { min, max } => {
                (i64::from(max) - i64::from(min) + 1).max(0) as u64
            }
            VerticalExtent::Around { below, above } => u64::from(below) + u64::from(above) + 1,
        }
    }

    /// Shrink the extent to at most `max_layers` layers (at least one).
    /// `Layers` keeps its lower bound; `Around` gives up layers above first.
    pub fn clamped(self, max_layers: u32) -> Self {
        let max_layers = max_layers.max(1);
        if self.layer_count() <= u64::from(max_layers) {
            return self;
        }
        match self {
            VerticalExtent::Layers { min, .. } => VerticalExtent::Layers {
                min,
                max: saturate(i64::from(min) + i64::from(max_layers) - 1),
            },
            VerticalExtent::Around { below, above } => {
                let below = below.min(max_layers - 1);
                VerticalExtent::Around {
                    below,
                    above: above.min(max_layers - 1 - below),
                }
            }
        }
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Scheduler tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamerConfig {
    /// Horizontal neighborhood radius in chunks, used by hosts that don't pass one.
    #[serde(default = "default_radius")]
    pub radius: u32,
    /// Vertical layers kept resident.
    #[serde(default)]
    pub vertical: VerticalExtent,
    /// Mesh uploads allowed per `process_until` call.
    #[serde(default = "default_uploads_per_pass")]
    pub uploads_per_pass: u32,
    /// Density at which the surface is extracted.
    #[serde(default)]
    pub iso_level: f32,
    /// Worker threads for generation and meshing. 0 = one per core.
    #[serde(default)]
    pub worker_threads: usize,
}

fn default_radius() -> u32 {
    DEFAULT_STREAM_RADIUS
}

fn default_uploads_per_pass() -> u32 {
    DEFAULT_UPLOADS_PER_PASS
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_STREAM_RADIUS,
            vertical: VerticalExtent::default(),
            uploads_per_pass: DEFAULT_UPLOADS_PER_PASS,
            iso_level: DEFAULT_ISO_LEVEL,
            worker_threads: 0,
        }
    }
}

impl StreamerConfig {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.radius > MAX_STREAM_RADIUS {
            return Err(SettingsError::Invalid {
                field: "radius",
                reason: format!("{} exceeds maximum {}", self.radius, MAX_STREAM_RADIUS),
            });
        }
        if self.uploads_per_pass == 0 {
            return Err(SettingsError::Invalid {
                field: "uploads_per_pass",
                reason: "must be at least 1 or chunks never become render-ready".into(),
            });
        }
        if let VerticalExtent::Layers { min, max } = self.vertical {
            if min > max {
                return Err(SettingsError::Invalid {
                    field: "vertical",
                    reason: format!("min layer {min} above max layer {max}"),
                });
            }
        }
        if self.vertical.layer_count() > u64::from(MAX_VERTICAL_LAYERS) {
            return Err(SettingsError::Invalid {
                field: "vertical",
                reason: format!(
                    "{} layers exceeds maximum {}",
                    self.vertical.layer_count(),
                    MAX_VERTICAL_LAYERS
                ),
            });
        }
        finite("iso_level", self.iso_level)
    }
}

/// Complete settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub terrain: TerrainParams,
    #[serde(default)]
    pub streaming: StreamerConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.terrain.validate()?;
        self.streaming.validate()
    }
}

/// Parse and validate a settings RON string.
pub fn load_settings_from_str(ron_str: &str) -> Result<Settings, SettingsError> {
    let options = ron::Options::default();
    let settings: Settings = options
        .from_str(ron_str)
        .map_err(|e| SettingsError::Parse(e.to_string()))?;
    settings.validate()?;
    Ok(settings)
}

fn positive(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            field,
            reason: format!("must be finite and > 0, got {value}"),
        })
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            field,
            reason: format!("must be finite, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        Settings::default().validate().expect("defaults are valid");
    }

    #[test]
    fn test_load_full_settings() {
        let ron = r#"(
            terrain: (
                seed: 7,
                world_scale: 0.05,
                amplitude: 20.0,
                base_height: 4.0,
                octaves: 5,
                lacunarity: 2.0,
                gain: 0.45,
            ),
            streaming: (
                radius: 6,
                vertical: Around(below: 1, above: 2),
                uploads_per_pass: 2,
                iso_level: 0.0,
                worker_threads: 3,
            ),
        )"#;
        let settings = load_settings_from_str(ron).expect("valid settings");
        assert_eq!(settings.terrain.seed, 7);
        assert_eq!(settings.terrain.octaves, 5);
        assert_eq!(settings.streaming.radius, 6);
        assert_eq!(
            settings.streaming.vertical,
            VerticalExtent::Around { below: 1, above: 2 }
        );
        assert_eq!(settings.streaming.worker_threads, 3);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let settings = load_settings_from_str(include_str!("../../../config/default.ron"))
            .expect("shipped config parses");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_streaming_section_optional() {
        let ron = r#"(
            terrain: (
                seed: 1,
                world_scale: 0.02,
                amplitude: 12.0,
                base_height: 8.0,
                octaves: 4,
                lacunarity: 2.0,
                gain: 0.5,
            ),
        )"#;
        let settings = load_settings_from_str(ron).expect("valid settings");
        assert_eq!(settings.streaming, StreamerConfig::default());
    }

    #[test]
    fn test_malformed_ron_rejected() {
        let result = load_settings_from_str("(terrain: (seed: \"x\"))");
        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut settings = Settings::default();
        settings.terrain.world_scale = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.streaming.uploads_per_pass = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.streaming.vertical = VerticalExtent::Layers { min: 2, max: 1 };
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.streaming.radius = MAX_STREAM_RADIUS + 1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_oversized_vertical_extents_rejected() {
        let mut settings = Settings::default();
        settings.streaming.vertical = VerticalExtent::Layers {
            min: -2_000_000_000,
            max: 2_000_000_000,
        };
        assert!(settings.validate().is_err());

        settings.streaming.vertical = VerticalExtent::Around {
            below: u32::MAX,
            above: u32::MAX,
        };
        assert!(settings.validate().is_err());

        settings.streaming.vertical = VerticalExtent::Around {
            below: MAX_VERTICAL_LAYERS - 1,
            above: 0,
        };
        settings.validate().expect("exactly at the limit");
    }

    #[test]
    fn test_vertical_extent_saturates() {
        let around = VerticalExtent::Around {
            below: u32::MAX,
            above: u32::MAX,
        };
        assert_eq!(around.layers(0), (i32::MIN, i32::MAX));
        assert_eq!(around.layer_count(), 2 * u64::from(u32::MAX) + 1);
        let wide = VerticalExtent::Layers {
            min: i32::MIN,
            max: i32::MAX,
        };
        assert_eq!(wide.layer_count(), 1 << 32);
        assert_eq!(VerticalExtent::Layers { min: 3, max: 1 }.layer_count(), 0);
    }

    #[test]
    fn test_vertical_extent_clamped() {
        let wide = VerticalExtent::Layers {
            min: -2_000_000_000,
            max: 2_000_000_000,
        };
        assert_eq!(
            wide.clamped(4),
            VerticalExtent::Layers {
                min: -2_000_000_000,
                max: -1_999_999_997
            }
        );
        let around = VerticalExtent::Around { below: 10, above: 10 };
        assert_eq!(around.clamped(4), VerticalExtent::Around { below: 3, above: 0 });
        let small = VerticalExtent::Around { below: 1, above: 1 };
        assert_eq!(small.clamped(4), small);
    }

    #[test]
    fn test_vertical_extent_layers() {
        assert_eq!(VerticalExtent::default().layers(5), (0, 0));
        let around = VerticalExtent::Around { below: 1, above: 2 };
        assert_eq!(around.layers(-3), (-4, -1));
    }
}
