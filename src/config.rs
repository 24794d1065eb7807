//! Typed configuration mirroring the engine's JSON settings document. Every
//! key is optional on the wire (`serde(default)`); missing keys fall back
//! to the defaults documented below, in the same spirit as Python's
//! `set_if_defined` helper used by comparable tracking pipelines.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

fn default_mmp() -> usize {
    30
}

fn default_timeout() -> u32 {
    5
}

fn default_sample_bins() -> u32 {
    3
}

/// Histogram feature hyperparameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    pub channels: usize,
    pub bins: usize,
    pub range: (u32, u32),
    pub lr: f32,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            channels: 1,
            bins: 96,
            range: (64, 256),
            lr: 0.1,
        }
    }
}

/// HOG feature hyperparameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HogConfig {
    pub orientations: usize,
    pub cells_per_block: (u32, u32),
    pub lr: f32,
}

impl Default for HogConfig {
    fn default() -> Self {
        Self {
            orientations: 17,
            cells_per_block: (1, 1),
            lr: 0.2,
        }
    }
}

/// MOSSE filter hyperparameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MosseConfig {
    pub lr: f32,
    /// PSR threshold below which a prediction is rejected.
    pub psr_threshold: f32,
    /// Normaliser for the `compare` matching predicate (`max(psr)/norm`).
    pub compare_norm: f32,
    /// Random-affine-warp perturbation magnitude used at `initialise`.
    pub warp_perturbation: f32,
    pub warp_count: usize,
}

impl Default for MosseConfig {
    fn default() -> Self {
        Self {
            lr: 0.2,
            psr_threshold: 5.7,
            compare_norm: 11.4,
            warp_perturbation: 0.1,
            warp_count: 8,
        }
    }
}

/// Velocity feature hyperparameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    #[serde(default = "default_mmp")]
    pub mmp: usize,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self { mmp: default_mmp() }
    }
}

/// Overlap filter thresholds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct OverlapFilterConfig {
    pub iom: f32,
    pub cd: f32,
}

impl Default for OverlapFilterConfig {
    fn default() -> Self {
        Self { iom: 0.25, cd: 64.0 }
    }
}

/// One matcher weight set (global, or dead-tracker) plus its threshold and
/// maximum reservoir age.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WeightSetConfig {
    pub position: f32,
    pub velocity: f32,
    pub angle: f32,
    pub hog: f32,
    pub histogram: f32,
    pub mosse: f32,
    pub threshold: f32,
    pub max_death_time: u32,
    /// Nominal world diagonal used to normalise position/velocity
    /// distances, configurable rather than hard-coded.
    pub nominal_diagonal: f32,
}

impl WeightSetConfig {
    /// Default "global" weight set used for the out-of-scene reservoir.
    pub fn global_default() -> Self {
        Self {
            position: -0.3,
            velocity: -0.2,
            angle: 0.2,
            hog: 0.0,
            histogram: 0.4,
            mosse: 0.0,
            threshold: 0.45,
            max_death_time: 100,
            nominal_diagonal: (1200.0_f32 * 1200.0 + 1400.0 * 1400.0).sqrt(),
        }
    }

    /// Default "dead tracker" weight set used for the dead reservoir.
    pub fn dead_default() -> Self {
        Self {
            position: -0.4,
            velocity: -0.3,
            angle: 0.2,
            hog: 0.0,
            histogram: 0.4,
            mosse: 0.0,
            threshold: 0.35,
            max_death_time: 120,
            nominal_diagonal: (1200.0_f32 * 1200.0 + 1400.0 * 1400.0).sqrt(),
        }
    }
}

impl Default for WeightSetConfig {
    fn default() -> Self {
        Self::global_default()
    }
}

/// Which fields the tracer should emit, and the statuses to emit them for.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    pub enable_tracer: Vec<String>,
    pub trace_status: Vec<u8>,
    pub file_prefix: String,
}

/// Top-level configuration, deserialised from the engine's JSON settings
/// document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world_size: (u32, u32),
    pub scene_size: (u32, u32),
    pub overlapping: u32,
    pub scenes: usize,
    #[serde(default = "default_sample_bins")]
    pub sample_bins: u32,
    #[serde(default = "default_timeout")]
    pub tracker_timeout: u32,
    pub histogram: HistogramConfig,
    pub hog: HogConfig,
    pub mosse: MosseConfig,
    pub velocity: VelocityConfig,
    pub overlap_filter: OverlapFilterConfig,
    pub global_matcher: WeightSetConfig,
    pub dead_tracker_matcher: WeightSetConfig,
    pub tracer: TracerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world_size: (960, 1280),
            scene_size: (960, 1280),
            overlapping: 0,
            scenes: 1,
            sample_bins: default_sample_bins(),
            tracker_timeout: default_timeout(),
            histogram: HistogramConfig::default(),
            hog: HogConfig::default(),
            mosse: MosseConfig::default(),
            velocity: VelocityConfig::default(),
            overlap_filter: OverlapFilterConfig::default(),
            global_matcher: WeightSetConfig::global_default(),
            dead_tracker_matcher: WeightSetConfig::dead_default(),
            tracer: TracerConfig::default(),
        }
    }
}

impl Config {
    /// Loads and parses a configuration file. Malformed JSON or an unreadable
    /// path are fatal-at-startup errors.
    pub fn from_path(path: &Path) -> Result<Config> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigInvalid(format!("{}: {e}", path.display())))?;
        Self::from_str(&data)
    }

    pub fn from_str(data: &str) -> Result<Config> {
        serde_json::from_str(data).map_err(|e| Error::ConfigInvalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.sample_bins, 3);
        assert_eq!(cfg.tracker_timeout, 5);
        assert_eq!(cfg.velocity.mmp, 30);
        assert_eq!(cfg.histogram.bins, 96);
        assert_eq!(cfg.histogram.range, (64, 256));
        assert_eq!(cfg.hog.orientations, 17);
        assert_eq!(cfg.mosse.psr_threshold, 5.7);
        assert_eq!(cfg.overlap_filter.iom, 0.25);
        assert_eq!(cfg.overlap_filter.cd, 64.0);
        assert_eq!(cfg.global_matcher.threshold, 0.45);
        assert_eq!(cfg.dead_tracker_matcher.max_death_time, 120);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg = Config::from_str("{}").unwrap();
        assert_eq!(cfg.sample_bins, 3);
        assert_eq!(cfg.scenes, 1);
    }

    #[test]
    fn malformed_json_is_config_invalid() {
        let err = Config::from_str("{not json").unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid(_)));
    }

    #[test]
    fn partial_overrides_merge_with_defaults() {
        let cfg = Config::from_str(r#"{"sample_bins": 7, "overlapping": 10}"#).unwrap();
        assert_eq!(cfg.sample_bins, 7);
        assert_eq!(cfg.overlapping, 10);
        assert_eq!(cfg.tracker_timeout, 5);
    }
}
