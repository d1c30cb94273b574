//! Metrics provider: glyph and line sizes in drawing units.
//!
//! The geometry engine only reads metrics through the [`Metrics`] trait so a
//! host with real font data can plug in its own provider. [`ConfigMetrics`]
//! derives everything from an [`EngravingConfig`].

use crate::config::{EngravingConfig, NoteheadMetrics};
use crate::model::{Glyph, Point};

/// Read-only source of glyph and line metrics.
pub trait Metrics {
    /// Width of `glyph` at the given staff size.
    fn glyph_width(&self, glyph: Glyph, staff_size: i32, cue_size: bool) -> i32;

    /// Half a staff space at the given staff size.
    fn unit(&self, staff_size: i32) -> i32;

    /// One staff space.
    fn double_unit(&self, staff_size: i32) -> i32 {
        self.unit(staff_size) * 2
    }

    fn stem_width(&self, staff_size: i32) -> i32;

    /// Thickness of one beam line.
    fn beam_width(&self, staff_size: i32, cue_size: bool) -> i32;

    /// Gap between two beam lines.
    fn beam_white_width(&self, staff_size: i32, cue_size: bool) -> i32;

    /// Anchor where an up-stem leaves the notehead, relative to its center.
    fn stem_up_se(&self, glyph: Glyph, staff_size: i32, cue_size: bool) -> Point;

    /// Anchor where a down-stem leaves the notehead, relative to its center.
    fn stem_down_nw(&self, glyph: Glyph, staff_size: i32, cue_size: bool) -> Point;

    fn beam_min_slope(&self) -> f64;

    fn beam_max_slope(&self) -> f64;
}

/// [`Metrics`] computed from an [`EngravingConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConfigMetrics {
    config: EngravingConfig,
}

impl ConfigMetrics {
    pub fn new(config: EngravingConfig) -> Self {
        Self { config }
    }

    fn notehead(&self, glyph: Glyph) -> &NoteheadMetrics {
        match glyph {
            Glyph::NoteheadBlack => &self.config.notehead_black,
            Glyph::NoteheadHalf => &self.config.notehead_half,
            Glyph::NoteheadWhole => &self.config.notehead_whole,
        }
    }

    /// Convert staff spaces into drawing units.
    fn scaled(&self, staff_spaces: f64, staff_size: i32, cue_size: bool) -> i32 {
        let mut value = staff_spaces * self.double_unit(staff_size) as f64;
        if cue_size {
            value *= self.config.cue_scale;
        }
        value.round() as i32
    }

    fn anchor(&self, anchor: [f64; 2], staff_size: i32, cue_size: bool) -> Point {
        Point {
            x: self.scaled(anchor[0], staff_size, cue_size),
            y: self.scaled(anchor[1], staff_size, cue_size),
        }
    }
}

impl Metrics for ConfigMetrics {
    fn glyph_width(&self, glyph: Glyph, staff_size: i32, cue_size: bool) -> i32 {
        self.scaled(self.notehead(glyph).width, staff_size, cue_size)
    }

    fn unit(&self, staff_size: i32) -> i32 {
        self.config.unit * staff_size / 100
    }

    fn stem_width(&self, staff_size: i32) -> i32 {
        self.scaled(self.config.stem_thickness, staff_size, false)
    }

    fn beam_width(&self, staff_size: i32, cue_size: bool) -> i32 {
        self.scaled(self.config.beam_thickness, staff_size, cue_size)
    }

    fn beam_white_width(&self, staff_size: i32, cue_size: bool) -> i32 {
        self.scaled(self.config.beam_spacing, staff_size, cue_size)
    }

    fn stem_up_se(&self, glyph: Glyph, staff_size: i32, cue_size: bool) -> Point {
        self.anchor(self.notehead(glyph).stem_up_se, staff_size, cue_size)
    }

    fn stem_down_nw(&self, glyph: Glyph, staff_size: i32, cue_size: bool) -> Point {
        self.anchor(self.notehead(glyph).stem_down_nw, staff_size, cue_size)
    }

    fn beam_min_slope(&self) -> f64 {
        self.config.beam_min_slope
    }

    fn beam_max_slope(&self) -> f64 {
        self.config.beam_max_slope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_at_full_size() {
        let m = ConfigMetrics::default();
        assert_eq!(m.unit(100), 90);
        assert_eq!(m.double_unit(100), 180);
        assert_eq!(m.stem_width(100), 22);
        assert_eq!(m.beam_width(100, false), 90);
        assert_eq!(m.beam_white_width(100, false), 45);
        assert_eq!(m.glyph_width(Glyph::NoteheadHalf, 100, false), 212);
        assert_eq!(m.stem_up_se(Glyph::NoteheadBlack, 100, false), Point { x: 212, y: 30 });
        assert_eq!(m.stem_down_nw(Glyph::NoteheadBlack, 100, false), Point { x: 0, y: -30 });
    }

    #[test]
    fn cue_size_and_staff_size_shrink_metrics() {
        let m = ConfigMetrics::default();
        assert_eq!(m.glyph_width(Glyph::NoteheadHalf, 100, true), 159);
        assert_eq!(m.beam_width(100, true), 68);
        assert_eq!(m.unit(50), 45);
        assert_eq!(m.beam_width(50, false), 45);
    }
}
