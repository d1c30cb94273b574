//! engravelib: beam-span geometry engine for music engraving.
//!
//! Takes a group of notes and chords already placed by a layout pass and
//! computes one straight beam line plus the stem of every element.
//!
//! # Example
//! ```
//! use engravelib::{BeamSpan, ConfigMetrics, Duration, LayerElement, SpanContext, StaffContext};
//!
//! let mut span = BeamSpan::new();
//! span.add_child(LayerElement::note(Duration::Eighth, 1000, -720)).unwrap();
//! span.add_child(LayerElement::note(Duration::Eighth, 1600, -630)).unwrap();
//!
//! let ctx = SpanContext::new(StaffContext::new(0));
//! let geometry = span.compute_geometry(&ctx, &ConfigMetrics::default()).unwrap();
//! println!("slope {:.3}, {} stems", geometry.line.slope, geometry.elements.len());
//! ```

pub mod beam_span;
pub mod config;
pub mod document;
pub mod error;
pub mod metrics;
pub mod model;

#[cfg(target_os = "android")]
pub mod android;

pub use beam_span::{
    distance_past_center, BeamGeometry, BeamLine, BeamSpan, CoordRecord, ElementGeometry,
    SpanAggregates,
};
pub use config::EngravingConfig;
pub use document::{SpanDocument, SpanReport};
pub use error::{EngraveError, Result};
pub use metrics::{ConfigMetrics, Metrics};
pub use model::*;

/// Compute a span described as JSON and return the report as JSON.
/// Useful for passing data across FFI boundaries.
pub fn compute_span_json(json: &str) -> Result<String> {
    let document = SpanDocument::from_json(json)?;
    let report = document.compute()?;
    Ok(serde_json::to_string_pretty(&report)?)
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI for iOS (static library) and Android (JNI)
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Compute a JSON span document and return the JSON report as a C string.
/// The caller must free the returned string with `engravelib_free_string`.
///
/// Returns null when the input is not valid UTF-8 or not a valid document.
///
/// # Safety
/// `json` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn engravelib_compute_span(json: *const c_char) -> *mut c_char {
    if json.is_null() {
        return std::ptr::null_mut();
    }
    let c_str = unsafe { CStr::from_ptr(json) };
    let json_str = match c_str.to_str() {
        Ok(s) => s,
        Err(_) => return std::ptr::null_mut(),
    };

    match compute_span_json(json_str) {
        Ok(report) => CString::new(report).unwrap_or_default().into_raw(),
        Err(e) => {
            log::warn!("engravelib_compute_span failed: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Free a string previously returned by engravelib functions.
///
/// # Safety
/// `ptr` must be a string previously returned by an engravelib function, or null.
#[no_mangle]
pub unsafe extern "C" fn engravelib_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
