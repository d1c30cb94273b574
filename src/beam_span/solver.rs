//! Geometry solver. Fits the beam line and places every stem.
//!
//! The pass runs in fixed steps: size the vertical offset of the beam from
//! the noteheads, fit a least-squares line through the provisional beam
//! points, clamp its slope, raise it until every stem is long enough, push
//! it past the staff center, then write each stem.

use serde::{Deserialize, Serialize};

use super::coords::{CoordRecord, SpanAggregates};
use crate::metrics::Metrics;
use crate::model::{Duration, Glyph, LayerElement, StaffContext, StemDirection};

/// Staff spaces between noteheads and beam for a span of one duration.
const VERTICAL_SHIFT_FACTOR: f64 = 3.0;
/// Extra staff spaces when durations change within the span.
const CHANGING_DUR_EXTRA: f64 = 0.5;
/// Units between noteheads and beam for cue-sized spans.
const CUE_SHIFT_UNITS: f64 = 5.0;

/// The straight line a span's beam follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamLine {
    pub stem_dir: StemDirection,
    /// Black plus white width of one beam level
    pub beam_width: i32,
    pub beam_width_black: i32,
    pub beam_width_white: i32,
    /// Offset of the provisional beam points from the noteheads
    pub vertical_shift: i32,
    pub starting_y: f64,
    pub slope: f64,
    /// Extra height needed so no stem is shorter than the provisional one
    pub vertical_boost: f64,
}

impl BeamLine {
    /// Height of the beam at drawing x `x`.
    pub fn y_at(&self, x: i32) -> f64 {
        self.starting_y + self.vertical_boost + self.slope * x as f64
    }
}

/// Vertical center of the staff: two staff spaces below the top line.
pub(crate) fn staff_center(staff: &StaffContext, metrics: &dyn Metrics) -> i32 {
    staff.drawing_y - metrics.double_unit(staff.size) * 2
}

/// Compute the beam line and every record's `y_beam`.
///
/// `coords` must be non-empty and already carry the `y` chosen by the
/// direction resolver.
pub(crate) fn solve(
    coords: &mut [CoordRecord],
    aggregates: &SpanAggregates,
    stem_dir: StemDirection,
    staff: &StaffContext,
    metrics: &dyn Metrics,
) -> BeamLine {
    let size = staff.size;
    let cue = aggregates.cue_size;

    let beam_width_black = metrics.beam_width(size, cue);
    let beam_width_white = metrics.beam_white_width(size, cue);
    let beam_width = beam_width_black + beam_width_white;

    let vertical_shift = vertical_shift(aggregates, beam_width, size, metrics) * stem_dir.sign();
    let stem_x = (metrics.glyph_width(Glyph::NoteheadHalf, size, cue) / 2
        - metrics.stem_width(size) / 2)
        * stem_dir.sign();

    for record in coords.iter_mut() {
        record.x += stem_x;
        record.y_beam = record.y + vertical_shift;
    }

    let (slope, starting_y) = fit_line(coords, metrics.beam_min_slope(), metrics.beam_max_slope());

    let mut line = BeamLine {
        stem_dir,
        beam_width,
        beam_width_black,
        beam_width_white,
        vertical_shift,
        starting_y,
        slope,
        vertical_boost: 0.0,
    };

    apply_min_stem_length(coords, &mut line);

    let margin = beam_width_black / 2 + metrics.unit(size) / 4;
    apply_staff_clearance(coords, &mut line, staff_center(staff, metrics), margin);

    line
}

/// Distance between the noteheads and the provisional beam, before the
/// direction sign is applied.
fn vertical_shift(
    aggregates: &SpanAggregates,
    beam_width: i32,
    staff_size: i32,
    metrics: &dyn Metrics,
) -> i32 {
    let shortest = aggregates.shortest_dur.unwrap_or(Duration::Eighth);
    let extra_beams = shortest.code() - Duration::Eighth.code();
    let base = (extra_beams * beam_width) as f64;

    let offset = if aggregates.cue_size {
        metrics.unit(staff_size) as f64 * CUE_SHIFT_UNITS
    } else {
        let double_unit = metrics.double_unit(staff_size) as f64;
        if aggregates.changing_dur {
            double_unit * (VERTICAL_SHIFT_FACTOR + CHANGING_DUR_EXTRA)
        } else {
            double_unit * VERTICAL_SHIFT_FACTOR
        }
    };

    (base + offset) as i32
}

/// Least-squares fit through (`x`, `y_beam`). Returns `(slope, starting_y)`.
pub(crate) fn fit_line(coords: &[CoordRecord], min_slope: f64, max_slope: f64) -> (f64, f64) {
    let n = coords.len() as f64;
    let (mut s_x, mut s_y, mut s_xy, mut s_x2) = (0.0, 0.0, 0.0, 0.0);
    for record in coords {
        let x = record.x as f64;
        let y = record.y_beam as f64;
        s_x += x;
        s_y += y;
        s_xy += x * y;
        s_x2 += x * x;
    }

    let numerator = n * s_xy - s_x * s_y;
    let denominator = n * s_x2 - s_x * s_x;
    let raw = if numerator == 0.0 || denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    };
    let slope = clamp_slope(raw, min_slope, max_slope);
    log::trace!("beam regression over {} points: raw slope {raw:.4}, clamped {slope:.4}", coords.len());

    let starting_y = if n > 0.0 { (s_y - slope * s_x) / n } else { 0.0 };
    (slope, starting_y)
}

pub(crate) fn clamp_slope(slope: f64, min_slope: f64, max_slope: f64) -> f64 {
    if slope.abs() < min_slope {
        0.0
    } else if slope.abs() > max_slope {
        max_slope.copysign(slope)
    } else {
        slope
    }
}

/// Raise (or lower, for down-stems) the line so it never cuts a stem shorter
/// than its provisional beam point, then place every record on it.
///
/// Beam points are truncated toward zero into drawing units.
fn apply_min_stem_length(coords: &mut [CoordRecord], line: &mut BeamLine) {
    for record in coords.iter() {
        let old = record.y_beam as f64;
        let expected = line.y_at(record.x);
        let too_short = match line.stem_dir {
            StemDirection::Up => old > expected,
            StemDirection::Down => old < expected,
        };
        if too_short {
            line.vertical_boost += old - expected;
        }
    }
    for record in coords.iter_mut() {
        record.y_beam = line.y_at(record.x) as i32;
    }
}

/// Shift the beam so that the stem closest to the staff center reaches it,
/// within `margin`.
fn apply_staff_clearance(
    coords: &mut [CoordRecord],
    line: &mut BeamLine,
    vertical_center: i32,
    margin: i32,
) {
    let Some(min_dist) = coords
        .iter()
        .map(|r| distance_past_center(r.y_beam, vertical_center, line.stem_dir))
        .min()
    else {
        return;
    };

    let deficit = min_dist + margin;
    if deficit >= 0 {
        return;
    }
    let shift = match line.stem_dir {
        StemDirection::Down => deficit,
        StemDirection::Up => -deficit,
    };
    line.starting_y += shift as f64;
    for record in coords.iter_mut() {
        record.y_beam += shift;
    }
}

/// Distance from the staff center to `y_beam`, positive toward the stem tip.
pub fn distance_past_center(y_beam: i32, vertical_center: i32, stem_dir: StemDirection) -> i32 {
    match stem_dir {
        StemDirection::Up => y_beam - vertical_center,
        StemDirection::Down => vertical_center - y_beam,
    }
}

/// Write the span direction and the stem geometry into every note and chord.
pub(crate) fn emit_stems(
    elements: &mut [LayerElement],
    coords: &[CoordRecord],
    line: &BeamLine,
    staff: &StaffContext,
    cue_size: bool,
    metrics: &dyn Metrics,
) {
    let size = staff.size;
    let stem_width = metrics.stem_width(size);

    for record in coords {
        let element = &mut elements[record.element.0];
        if !element.kind.is_stemmed() {
            continue;
        }
        element.drawing_stem_dir = Some(line.stem_dir);

        let glyph = element.dur.map_or(Glyph::NoteheadBlack, Duration::notehead);
        let (y1, y2) = match line.stem_dir {
            StemDirection::Up => (
                record.y_beam - stem_width,
                record.y_bottom + metrics.stem_up_se(glyph, size, cue_size).y,
            ),
            StemDirection::Down => (
                record.y_beam + stem_width,
                record.y_top + metrics.stem_down_nw(glyph, size, cue_size).y,
            ),
        };

        let (kind, drawing_x, drawing_y) = (element.kind, element.drawing_x, element.drawing_y);
        // Whole notes with a fingered tremolo have no stem.
        let Some(stem) = element.stem.as_mut() else {
            log::debug!("{} {:?} has no stem, skipping", kind.name(), record.element);
            continue;
        };
        stem.drawing_dir = Some(line.stem_dir);
        stem.drawing_x_rel = record.x - drawing_x;
        stem.drawing_y_rel = y2 - drawing_y;
        stem.drawing_len = y2 - y1;
    }
}
