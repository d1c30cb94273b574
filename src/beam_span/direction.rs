//! Stem-direction resolution for a whole span.

use super::coords::{CoordRecord, SpanAggregates};
use crate::model::StemDirection;

/// Pick one stem direction for the span and set every record's `y` to the
/// notehead nearest the beam.
///
/// The span override wins, then the first explicit element direction, then
/// the layer default. Otherwise the mean notehead height decides: below the
/// staff center gives up-stems.
pub(crate) fn resolve_stem_direction(
    coords: &mut [CoordRecord],
    aggregates: &mut SpanAggregates,
    span_override: Option<StemDirection>,
    layer_default: Option<StemDirection>,
    vertical_center: i32,
) -> StemDirection {
    let dir = span_override
        .or(aggregates.stem_dir)
        .or(layer_default)
        .unwrap_or_else(|| automatic_direction(coords, vertical_center));

    for record in coords.iter_mut() {
        record.y = match dir {
            StemDirection::Up => record.y_top,
            StemDirection::Down => record.y_bottom,
        };
    }

    aggregates.stem_dir = Some(dir);
    dir
}

fn automatic_direction(coords: &[CoordRecord], vertical_center: i32) -> StemDirection {
    if coords.is_empty() {
        return StemDirection::Down;
    }
    let sum: i64 = coords.iter().map(|c| c.center() as i64).sum();
    let avg = sum / coords.len() as i64;
    if avg < vertical_center as i64 {
        StemDirection::Up
    } else {
        StemDirection::Down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Duration, ElementId};

    fn record(y_top: i32, y_bottom: i32) -> CoordRecord {
        CoordRecord::new(ElementId(0), 0, y_top, y_bottom, Duration::Eighth)
    }

    #[test]
    fn low_notes_get_up_stems() {
        let mut coords = vec![record(-700, -700), record(-600, -600)];
        let mut agg = SpanAggregates::default();
        let dir = resolve_stem_direction(&mut coords, &mut agg, None, None, -360);
        assert_eq!(dir, StemDirection::Up);
        assert_eq!(agg.stem_dir, Some(StemDirection::Up));
    }

    #[test]
    fn chord_uses_its_midpoint_and_bottom_for_down_stems() {
        let mut coords = vec![record(0, -200)];
        let mut agg = SpanAggregates::default();
        let dir = resolve_stem_direction(&mut coords, &mut agg, None, None, -360);
        assert_eq!(dir, StemDirection::Down);
        assert_eq!(coords[0].y, -200);
    }

    #[test]
    fn priority_chain() {
        let mut coords = vec![record(-700, -700)];

        let mut agg = SpanAggregates {
            stem_dir: Some(StemDirection::Down),
            ..Default::default()
        };
        let dir = resolve_stem_direction(
            &mut coords,
            &mut agg,
            Some(StemDirection::Up),
            Some(StemDirection::Down),
            -360,
        );
        assert_eq!(dir, StemDirection::Up);

        let mut agg = SpanAggregates {
            stem_dir: Some(StemDirection::Down),
            ..Default::default()
        };
        let dir = resolve_stem_direction(&mut coords, &mut agg, None, Some(StemDirection::Up), -360);
        assert_eq!(dir, StemDirection::Down);

        let mut agg = SpanAggregates::default();
        let dir = resolve_stem_direction(&mut coords, &mut agg, None, Some(StemDirection::Down), -360);
        assert_eq!(dir, StemDirection::Down);
    }
}
