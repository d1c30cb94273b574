//! JSON description of a beam span, used for FFI data exchange.
//!
//! ```json
//! {
//!   "staff": { "drawing_y": 0 },
//!   "children": [
//!     { "kind": "note", "dur": "eighth", "drawing_x": 1000, "drawing_y": -720, "stem": {} },
//!     { "kind": "chord", "dur": "eighth", "drawing_x": 1600, "drawing_y": -630, "stem": {},
//!       "children": [
//!         { "kind": "note", "dur": "eighth", "drawing_x": 1600, "drawing_y": -630 },
//!         { "kind": "note", "dur": "eighth", "drawing_x": 1600, "drawing_y": -450 }
//!       ] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::beam_span::{BeamGeometry, BeamSpan, CoordRecord, SpanAggregates};
use crate::config::EngravingConfig;
use crate::error::Result;
use crate::metrics::ConfigMetrics;
use crate::model::{ElementId, LayerElement, SpanContext, StaffContext, StemDirection};

/// A span and everything needed to compute its geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanDocument {
    pub staff: StaffContext,
    /// Default stem direction of the enclosing layer
    #[serde(default)]
    pub layer_stem_dir: Option<StemDirection>,
    /// Direction forced on the span
    #[serde(default)]
    pub stem_dir: Option<StemDirection>,
    /// Engraving constants (defaults when absent)
    #[serde(default)]
    pub config: Option<EngravingConfig>,
    pub children: Vec<ElementNode>,
}

/// One element and its nested content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementNode {
    #[serde(flatten)]
    pub element: LayerElement,
    #[serde(default)]
    pub children: Vec<ElementNode>,
}

/// Result of computing a [`SpanDocument`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanReport {
    /// None when the span has no note or chord
    pub geometry: Option<BeamGeometry>,
    pub aggregates: SpanAggregates,
    pub coords: Vec<CoordRecord>,
}

impl SpanDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn context(&self) -> SpanContext {
        SpanContext {
            staff: self.staff,
            layer_stem_dir: self.layer_stem_dir,
        }
    }

    /// Build the span, validating the nesting of every element.
    pub fn build_span(&self) -> Result<BeamSpan> {
        let mut span = BeamSpan::new();
        span.set_stem_dir(self.stem_dir);
        for node in &self.children {
            let id = span.add_child(node.element.clone())?;
            add_nested(&mut span, id, &node.children)?;
        }
        Ok(span)
    }

    pub fn compute(&self) -> Result<SpanReport> {
        let metrics = ConfigMetrics::new(self.config.clone().unwrap_or_default());
        let mut span = self.build_span()?;
        let geometry = span.compute_geometry(&self.context(), &metrics);
        Ok(SpanReport {
            geometry,
            aggregates: span.aggregates().clone(),
            coords: span.element_coords().to_vec(),
        })
    }
}

fn add_nested(span: &mut BeamSpan, parent: ElementId, nodes: &[ElementNode]) -> Result<()> {
    for node in nodes {
        let id = span.add_child_to(parent, node.element.clone())?;
        add_nested(span, id, &node.children)?;
    }
    Ok(())
}
