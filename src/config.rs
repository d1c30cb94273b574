//! Engraving configuration.
//!
//! Lengths are given in staff spaces unless stated otherwise and are turned
//! into drawing units by [`crate::metrics::ConfigMetrics`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Document-wide engraving constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngravingConfig {
    /// Drawing units per half staff space at staff size 100
    #[serde(default = "default_unit")]
    pub unit: i32,

    /// Stem thickness
    #[serde(default = "default_stem_thickness")]
    pub stem_thickness: f64,

    /// Thickness of one beam line
    #[serde(default = "default_beam_thickness")]
    pub beam_thickness: f64,

    /// White gap between two beam lines
    #[serde(default = "default_beam_spacing")]
    pub beam_spacing: f64,

    /// Scale applied to cue-sized glyphs and beams
    #[serde(default = "default_cue_scale")]
    pub cue_scale: f64,

    /// Slopes with a smaller magnitude are flattened to zero
    #[serde(default = "default_beam_min_slope")]
    pub beam_min_slope: f64,

    /// Slopes are clamped to this magnitude
    #[serde(default = "default_beam_max_slope")]
    pub beam_max_slope: f64,

    #[serde(default = "default_notehead_black")]
    pub notehead_black: NoteheadMetrics,

    #[serde(default = "default_notehead_half")]
    pub notehead_half: NoteheadMetrics,

    #[serde(default = "default_notehead_whole")]
    pub notehead_whole: NoteheadMetrics,
}

/// Width and stem anchors of a notehead glyph, in staff spaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteheadMetrics {
    pub width: f64,
    /// Where an up-stem leaves the notehead (bottom right of the stem)
    pub stem_up_se: [f64; 2],
    /// Where a down-stem leaves the notehead (top left of the stem)
    pub stem_down_nw: [f64; 2],
}

impl Default for EngravingConfig {
    fn default() -> Self {
        Self {
            unit: default_unit(),
            stem_thickness: default_stem_thickness(),
            beam_thickness: default_beam_thickness(),
            beam_spacing: default_beam_spacing(),
            cue_scale: default_cue_scale(),
            beam_min_slope: default_beam_min_slope(),
            beam_max_slope: default_beam_max_slope(),
            notehead_black: default_notehead_black(),
            notehead_half: default_notehead_half(),
            notehead_whole: default_notehead_whole(),
        }
    }
}

impl EngravingConfig {
    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a config file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Load a config file, falling back to the defaults when it is missing
    /// or malformed.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load engraving config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

fn default_unit() -> i32 {
    90
}

fn default_stem_thickness() -> f64 {
    0.12
}

fn default_beam_thickness() -> f64 {
    0.5
}

fn default_beam_spacing() -> f64 {
    0.25
}

fn default_cue_scale() -> f64 {
    0.75
}

fn default_beam_min_slope() -> f64 {
    0.01
}

fn default_beam_max_slope() -> f64 {
    0.1
}

fn default_notehead_black() -> NoteheadMetrics {
    NoteheadMetrics {
        width: 1.18,
        stem_up_se: [1.18, 0.168],
        stem_down_nw: [0.0, -0.168],
    }
}

fn default_notehead_half() -> NoteheadMetrics {
    NoteheadMetrics {
        width: 1.18,
        stem_up_se: [1.18, 0.14],
        stem_down_nw: [0.0, -0.14],
    }
}

fn default_notehead_whole() -> NoteheadMetrics {
    NoteheadMetrics {
        width: 1.688,
        stem_up_se: [1.688, 0.0],
        stem_down_nw: [0.0, 0.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EngravingConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngravingConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let config = EngravingConfig::from_toml_str(
            "beam_max_slope = 0.25\n\n[notehead_black]\nwidth = 1.3\nstem_up_se = [1.3, 0.2]\nstem_down_nw = [0.0, -0.2]\n",
        )
        .unwrap();
        assert_eq!(config.beam_max_slope, 0.25);
        assert_eq!(config.notehead_black.width, 1.3);
        assert_eq!(config.unit, 90);
        assert_eq!(config.notehead_half, default_notehead_half());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = EngravingConfig::from_toml_str("unit = \"wide\"").unwrap_err();
        assert!(err.to_string().starts_with("invalid engraving config"));
    }
}
