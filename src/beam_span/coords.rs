//! Per-element coordinate records and span-wide aggregate flags.

use serde::{Deserialize, Serialize};

use crate::model::{Duration, ElementId, StemDirection};

/// Geometry snapshot of one element taking part in a beam span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordRecord {
    /// Stem x (drawing x until the solver adds the stem-base offset)
    pub x: i32,
    /// Notehead nearest the beam, used by the regression
    pub y: i32,
    /// Topmost notehead
    pub y_top: i32,
    /// Bottom-most notehead
    pub y_bottom: i32,
    /// Where the beam crosses this element's stem
    pub y_beam: i32,
    pub dur: Duration,
    /// Secondary beams broken at this element
    pub breaksec: u8,
    pub element: ElementId,
}

impl CoordRecord {
    pub(crate) fn new(element: ElementId, x: i32, y_top: i32, y_bottom: i32, dur: Duration) -> Self {
        Self {
            x,
            y: y_top,
            y_top,
            y_bottom,
            y_beam: 0,
            dur,
            breaksec: 0,
            element,
        }
    }

    /// Representative height used for the automatic stem direction.
    pub fn center(&self) -> i32 {
        (self.y_top + self.y_bottom) / 2
    }
}

/// Flags gathered while filtering, read by the resolver and the solver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanAggregates {
    pub has_chord: bool,
    /// Largest duration code seen
    pub shortest_dur: Option<Duration>,
    /// Two elements asked for different stem directions
    pub multiple_stem_dir: bool,
    /// Durations change within the span (or a secondary break is present)
    pub changing_dur: bool,
    /// Taken from the last element
    pub cue_size: bool,
    /// First explicit element direction, replaced by the resolved one
    pub stem_dir: Option<StemDirection>,
}
