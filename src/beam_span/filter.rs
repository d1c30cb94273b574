//! Span filter. Picks the elements that join the beam and builds their
//! coordinate records and the aggregate flags in one pass.

use super::coords::{CoordRecord, SpanAggregates};
use crate::model::{ElementId, ElementKind, LayerElement};

/// Result of filtering a span's flattened content.
#[derive(Debug, Default)]
pub(crate) struct FilteredSpan {
    pub(crate) coords: Vec<CoordRecord>,
    pub(crate) aggregates: SpanAggregates,
}

/// Filter `content` (flattened, in time order) and build the records.
///
/// Rules, in order: skip non-layer elements, skip elements without a
/// duration, keep grace notes only when the first candidate is a grace note,
/// skip chord tones. Rests and spaces stay in the span; they count for the
/// durations and the line but never for the stem direction.
pub(crate) fn filter_span(elements: &[LayerElement], content: &[ElementId]) -> FilteredSpan {
    let mut out = FilteredSpan::default();
    let mut first_grace: Option<bool> = None;
    let mut last_dur = None;

    for &id in content {
        let element = &elements[id.0];
        if !element.kind.is_layer_element() {
            continue;
        }
        let Some(dur) = element.dur else {
            continue;
        };

        let grace_span = *first_grace.get_or_insert(element.grace);
        if element.grace && !grace_span {
            continue;
        }
        if is_chord_tone(elements, element) {
            continue;
        }

        let (y_top, y_bottom) = y_extremes(elements, element);
        let mut record = CoordRecord::new(id, element.drawing_x, y_top, y_bottom, dur);

        let agg = &mut out.aggregates;
        if element.is_chord() {
            agg.has_chord = true;
        }
        if let Some(count) = element.breaksec {
            agg.changing_dur = true;
            record.breaksec = count;
        }
        if let Some(dir) = element.explicit_stem_dir().filter(|_| element.kind.is_stemmed()) {
            match agg.stem_dir {
                None => agg.stem_dir = Some(dir),
                Some(prev) if prev != dir => agg.multiple_stem_dir = true,
                Some(_) => {}
            }
        }
        agg.shortest_dur = agg.shortest_dur.max(Some(dur));
        if last_dur.is_some_and(|last| last != dur) {
            agg.changing_dur = true;
        }
        last_dur = Some(dur);

        out.coords.push(record);
    }

    if let Some(last) = out.coords.last() {
        out.aggregates.cue_size = elements[last.element.0].cue_size;
    }
    out
}

fn is_chord_tone(elements: &[LayerElement], element: &LayerElement) -> bool {
    element.is_note()
        && element
            .parent
            .is_some_and(|p| elements[p.0].kind == ElementKind::Chord)
}

/// Top and bottom notehead of an element. Chords use their tones.
fn y_extremes(elements: &[LayerElement], element: &LayerElement) -> (i32, i32) {
    if element.is_chord() {
        let tones = element
            .children
            .iter()
            .map(|c| &elements[c.0])
            .filter(|c| c.is_note())
            .map(|c| c.drawing_y);
        let extremes = tones.fold(None, |acc: Option<(i32, i32)>, y| match acc {
            None => Some((y, y)),
            Some((top, bottom)) => Some((top.max(y), bottom.min(y))),
        });
        if let Some(extremes) = extremes {
            return extremes;
        }
    }
    (element.drawing_y, element.drawing_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Duration, StemDirection};

    fn ids(n: usize) -> Vec<ElementId> {
        (0..n).map(ElementId).collect()
    }

    #[test]
    fn clefs_and_annotations_are_skipped() {
        let elements = vec![
            LayerElement::new(ElementKind::Clef),
            LayerElement::rest(Duration::Eighth, 100, 0),
            LayerElement::note(Duration::Eighth, 200, -500),
            LayerElement::new(ElementKind::Annotation),
            LayerElement::note(Duration::Eighth, 300, -400),
        ];
        let out = filter_span(&elements, &ids(5));
        let kept: Vec<usize> = out.coords.iter().map(|c| c.element.0).collect();
        assert_eq!(kept, vec![1, 2, 4]);
        assert!(!out.aggregates.changing_dur);
    }

    #[test]
    fn shorter_rest_counts_for_durations() {
        let elements = vec![
            LayerElement::note(Duration::Eighth, 100, -500),
            LayerElement::rest(Duration::Sixteenth, 200, 0),
            LayerElement::note(Duration::Eighth, 300, -400),
        ];
        let out = filter_span(&elements, &ids(3));
        assert_eq!(out.coords.len(), 3);
        assert_eq!(out.aggregates.shortest_dur, Some(Duration::Sixteenth));
        assert!(out.aggregates.changing_dur);
    }

    #[test]
    fn rest_direction_is_ignored() {
        let elements = vec![
            LayerElement::rest(Duration::Eighth, 100, 0).with_stem_dir(StemDirection::Up),
            LayerElement::note(Duration::Eighth, 200, 0).with_stem_dir(StemDirection::Down),
        ];
        let out = filter_span(&elements, &ids(2));
        assert_eq!(out.aggregates.stem_dir, Some(StemDirection::Down));
        assert!(!out.aggregates.multiple_stem_dir);
    }

    #[test]
    fn note_without_duration_is_dropped() {
        let mut silent = LayerElement::note(Duration::Eighth, 100, 0);
        silent.dur = None;
        let elements = vec![silent, LayerElement::note(Duration::Eighth, 200, 0)];
        let out = filter_span(&elements, &ids(2));
        assert_eq!(out.coords.len(), 1);
        assert_eq!(out.coords[0].element, ElementId(1));
    }

    #[test]
    fn shortest_duration_is_running_maximum() {
        let elements = vec![
            LayerElement::note(Duration::Eighth, 100, 0),
            LayerElement::note(Duration::ThirtySecond, 200, 0),
            LayerElement::note(Duration::Sixteenth, 300, 0),
        ];
        let out = filter_span(&elements, &ids(3));
        assert_eq!(out.aggregates.shortest_dur, Some(Duration::ThirtySecond));
        assert!(out.aggregates.changing_dur);
    }

    #[test]
    fn first_explicit_direction_is_kept_on_conflict() {
        let elements = vec![
            LayerElement::note(Duration::Eighth, 100, 0),
            LayerElement::note(Duration::Eighth, 200, 0).with_stem_dir(StemDirection::Down),
            LayerElement::note(Duration::Eighth, 300, 0).with_stem_dir(StemDirection::Up),
        ];
        let out = filter_span(&elements, &ids(3));
        assert!(out.aggregates.multiple_stem_dir);
        assert_eq!(out.aggregates.stem_dir, Some(StemDirection::Down));
    }

    #[test]
    fn secondary_break_is_recorded() {
        let elements = vec![
            LayerElement::note(Duration::Sixteenth, 100, 0),
            LayerElement::note(Duration::Sixteenth, 200, 0).with_breaksec(1),
        ];
        let out = filter_span(&elements, &ids(2));
        assert_eq!(out.coords[1].breaksec, 1);
        assert!(out.aggregates.changing_dur);
    }

    #[test]
    fn cue_size_comes_from_last_element() {
        let elements = vec![
            LayerElement::note(Duration::Eighth, 100, 0).with_cue_size(),
            LayerElement::note(Duration::Eighth, 200, 0),
        ];
        assert!(!filter_span(&elements, &ids(2)).aggregates.cue_size);

        let elements = vec![
            LayerElement::note(Duration::Eighth, 100, 0),
            LayerElement::note(Duration::Eighth, 200, 0).with_cue_size(),
        ];
        assert!(filter_span(&elements, &ids(2)).aggregates.cue_size);
    }
}
