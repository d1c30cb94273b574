//! Beam span: an ordered group of notes and chords joined by one straight
//! beam, possibly crossing the usual beam boundaries.
//!
//! A [`BeamSpan`] owns its content as an arena of [`LayerElement`]s. Each
//! geometry pass flattens the content, filters it, resolves one stem
//! direction, fits the beam line and writes the result into the stems.

mod coords;
mod direction;
mod filter;
mod solver;

use serde::{Deserialize, Serialize};

use crate::error::{EngraveError, Result};
use crate::metrics::Metrics;
use crate::model::{
    accepted_by_span, ElementId, ElementKind, LayerElement, SpanContext, Stem, StemDirection,
};

pub use coords::{CoordRecord, SpanAggregates};
pub use solver::{distance_past_center, BeamLine};

/// Outcome of a geometry pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamGeometry {
    #[serde(flatten)]
    pub line: BeamLine,
    /// Staff center used for the direction and clearance decisions
    pub vertical_center: i32,
    /// One entry per participating element, in time order
    pub elements: Vec<ElementGeometry>,
}

/// Final placement of one element's stem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementGeometry {
    pub element: ElementId,
    /// Stem x in drawing units
    pub x: i32,
    pub y_beam: i32,
    pub stem: Option<Stem>,
}

#[derive(Debug, Clone, Default)]
pub struct BeamSpan {
    elements: Vec<LayerElement>,
    children: Vec<ElementId>,
    coords: Vec<CoordRecord>,
    aggregates: SpanAggregates,
    /// Explicit direction set on the span itself
    stem_dir: Option<StemDirection>,
    modified: bool,
}

impl BeamSpan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all content, records and flags.
    pub fn reset(&mut self) {
        self.clear_coords();
        self.elements.clear();
        self.children.clear();
        self.aggregates = SpanAggregates::default();
        self.stem_dir = None;
        self.modified = true;
    }

    /// Append a direct child to the span.
    pub fn add_child(&mut self, element: LayerElement) -> Result<ElementId> {
        if !accepted_by_span(element.kind) {
            log::error!("Adding '{}' to a 'beamspan'", element.kind.name());
            return Err(EngraveError::UnsupportedChild {
                child: element.kind.name(),
                parent: "beamspan",
            });
        }
        let id = self.insert(None, element);
        self.children.push(id);
        Ok(id)
    }

    /// Append `element` below `parent` (a chord tone, a note inside a beam
    /// or tuplet, a syllable under a note, ...).
    pub fn add_child_to(&mut self, parent: ElementId, element: LayerElement) -> Result<ElementId> {
        let parent_kind = self
            .elements
            .get(parent.0)
            .map(|p| p.kind)
            .ok_or(EngraveError::UnknownElement(parent))?;
        if !parent_kind.accepts(element.kind) {
            log::error!("Adding '{}' to a '{}'", element.kind.name(), parent_kind.name());
            return Err(EngraveError::UnsupportedChild {
                child: element.kind.name(),
                parent: parent_kind.name(),
            });
        }
        let id = self.insert(Some(parent), element);
        self.elements[parent.0].children.push(id);
        Ok(id)
    }

    fn insert(&mut self, parent: Option<ElementId>, mut element: LayerElement) -> ElementId {
        let id = ElementId(self.elements.len());
        element.parent = parent;
        element.children.clear();
        element.coord = None;
        self.elements.push(element);
        self.modified = true;
        id
    }

    pub fn element(&self, id: ElementId) -> Option<&LayerElement> {
        self.elements.get(id.0)
    }

    /// Mutable access for the layout pass; marks the span as modified.
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut LayerElement> {
        self.modified = true;
        self.elements.get_mut(id.0)
    }

    pub fn elements(&self) -> &[LayerElement] {
        &self.elements
    }

    /// Direct children, in insertion order.
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Every element, depth-first with parents before their children.
    pub fn content(&self) -> Vec<ElementId> {
        let mut order = Vec::with_capacity(self.elements.len());
        let mut stack: Vec<ElementId> = self.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.elements[id.0].children.iter().rev().copied());
        }
        order
    }

    /// Records built by the last geometry pass.
    pub fn element_coords(&self) -> &[CoordRecord] {
        &self.coords
    }

    pub fn aggregates(&self) -> &SpanAggregates {
        &self.aggregates
    }

    /// The record of `id` from the last pass, if it took part.
    pub fn coord_of(&self, id: ElementId) -> Option<&CoordRecord> {
        let index = self.elements.get(id.0)?.coord?;
        self.coords.get(index)
    }

    /// Force a stem direction for the whole span.
    pub fn set_stem_dir(&mut self, dir: Option<StemDirection>) {
        self.stem_dir = dir;
        self.modified = true;
    }

    /// True when content or layout changed since the last geometry pass.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_first_in_span(&self, id: ElementId) -> bool {
        let id = self.beamed_element(id);
        self.coords.first().is_some_and(|c| c.element == id)
    }

    pub fn is_last_in_span(&self, id: ElementId) -> bool {
        let id = self.beamed_element(id);
        self.coords.last().is_some_and(|c| c.element == id)
    }

    /// Chord tones are represented in the beam by their chord.
    fn beamed_element(&self, id: ElementId) -> ElementId {
        match self.elements.get(id.0) {
            Some(el) if el.is_note() => match el.parent {
                Some(p) if self.elements[p.0].kind == ElementKind::Chord => p,
                _ => id,
            },
            _ => id,
        }
    }

    /// Compute the beam line and write every participating stem.
    ///
    /// Returns `None`, leaving all elements untouched and building no records,
    /// when no note or chord takes part in the span.
    pub fn compute_geometry(
        &mut self,
        ctx: &SpanContext,
        metrics: &dyn Metrics,
    ) -> Option<BeamGeometry> {
        self.clear_coords();
        self.modified = false;

        let content = self.content();
        let filter::FilteredSpan {
            mut coords,
            mut aggregates,
        } = filter::filter_span(&self.elements, &content);

        let has_stems = coords
            .iter()
            .any(|record| self.elements[record.element.0].kind.is_stemmed());
        if !has_stems {
            log::debug!("Beam span with no notes or chords detected, skipping geometry");
            self.aggregates = SpanAggregates::default();
            return None;
        }

        let vertical_center = solver::staff_center(&ctx.staff, metrics);
        let stem_dir = direction::resolve_stem_direction(
            &mut coords,
            &mut aggregates,
            self.stem_dir,
            ctx.layer_stem_dir,
            vertical_center,
        );
        let line = solver::solve(&mut coords, &aggregates, stem_dir, &ctx.staff, metrics);
        solver::emit_stems(
            &mut self.elements,
            &coords,
            &line,
            &ctx.staff,
            aggregates.cue_size,
            metrics,
        );

        for (index, record) in coords.iter().enumerate() {
            self.elements[record.element.0].coord = Some(index);
        }
        self.coords = coords;
        self.aggregates = aggregates;

        let elements = self
            .coords
            .iter()
            .map(|record| ElementGeometry {
                element: record.element,
                x: record.x,
                y_beam: record.y_beam,
                stem: self.elements[record.element.0].stem.clone(),
            })
            .collect();

        Some(BeamGeometry {
            line,
            vertical_center,
            elements,
        })
    }

    /// Drop the records and the back-references pointing at them.
    fn clear_coords(&mut self) {
        for record in self.coords.drain(..) {
            if let Some(element) = self.elements.get_mut(record.element.0) {
                element.coord = None;
            }
        }
    }
}
