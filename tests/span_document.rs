//! JSON documents, the C ABI and config files.

use std::ffi::{CStr, CString};

use engravelib::{
    compute_span_json, engravelib_compute_span, engravelib_free_string, ConfigMetrics,
    EngraveError, EngravingConfig, Metrics, SpanDocument,
};
use pretty_assertions::assert_eq;
use serde_json::Value;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const TWO_EIGHTHS: &str = r#"{
    "staff": { "drawing_y": 0 },
    "children": [
        { "kind": "note", "dur": "eighth", "drawing_x": 1000, "drawing_y": -720, "stem": {} },
        { "kind": "note", "dur": "eighth", "drawing_x": 1600, "drawing_y": -630, "stem": {} }
    ]
}"#;

fn report(json: &str) -> Value {
    init_logger();
    let out = compute_span_json(json).expect("document should compute");
    serde_json::from_str(&out).unwrap()
}

#[test]
fn document_report_carries_line_and_stems() {
    let report = report(TWO_EIGHTHS);
    let geometry = &report["geometry"];

    assert_eq!(geometry["stem_dir"], "up");
    assert_eq!(geometry["slope"], 0.1);
    assert_eq!(geometry["vertical_center"], -360);
    assert_eq!(geometry["elements"][0]["y_beam"], -150);
    assert_eq!(geometry["elements"][1]["y_beam"], -90);
    assert_eq!(geometry["elements"][0]["stem"]["drawing_len"], -518);
    assert_eq!(geometry["elements"][1]["stem"]["drawing_len"], -488);
    assert_eq!(report["coords"].as_array().unwrap().len(), 2);
    assert_eq!(report["aggregates"]["shortest_dur"], "eighth");
}

#[test]
fn chord_tones_nest_under_their_chord() {
    let report = report(
        r#"{
            "staff": { "drawing_y": 0 },
            "children": [
                { "kind": "chord", "dur": "16th", "drawing_x": 1000, "drawing_y": -720, "stem": {},
                  "children": [
                    { "kind": "note", "dur": "16th", "drawing_x": 1000, "drawing_y": -720 },
                    { "kind": "note", "dur": "16th", "drawing_x": 1000, "drawing_y": -540 }
                  ] },
                { "kind": "note", "dur": "16th", "drawing_x": 1500, "drawing_y": -630, "stem": {} }
            ]
        }"#,
    );
    let coords = report["coords"].as_array().unwrap();
    assert_eq!(coords.len(), 2);
    assert_eq!(coords[0]["y_top"], -540);
    assert_eq!(coords[0]["y_bottom"], -720);
    assert_eq!(report["aggregates"]["has_chord"], true);
}

#[test]
fn forced_direction_and_layer_default() {
    let forced = report(
        r#"{
            "staff": { "drawing_y": 0 },
            "stem_dir": "down",
            "layer_stem_dir": "up",
            "children": [
                { "kind": "note", "dur": "eighth", "drawing_x": 1000, "drawing_y": -720, "stem": {} },
                { "kind": "note", "dur": "eighth", "drawing_x": 1600, "drawing_y": -630, "stem": {} }
            ]
        }"#,
    );
    assert_eq!(forced["geometry"]["stem_dir"], "down");

    let layered = report(
        r#"{
            "staff": { "drawing_y": 0 },
            "layer_stem_dir": "down",
            "children": [
                { "kind": "note", "dur": "eighth", "drawing_x": 1000, "drawing_y": -720, "stem": {} },
                { "kind": "note", "dur": "eighth", "drawing_x": 1600, "drawing_y": -630, "stem": {} }
            ]
        }"#,
    );
    assert_eq!(layered["geometry"]["stem_dir"], "down");
}

#[test]
fn rests_only_document_has_no_geometry() {
    let report = report(
        r#"{
            "staff": { "drawing_y": 0 },
            "children": [
                { "kind": "rest", "dur": "eighth", "drawing_x": 1000, "drawing_y": -360 },
                { "kind": "space", "dur": "eighth", "drawing_x": 1400 }
            ]
        }"#,
    );
    assert_eq!(report["geometry"], Value::Null);
    assert_eq!(report["coords"], Value::Array(vec![]));
}

#[test]
fn config_override_relaxes_the_slope_limit() {
    init_logger();
    let mut document = SpanDocument::from_json(TWO_EIGHTHS).unwrap();
    document.config = Some(EngravingConfig {
        beam_max_slope: 0.2,
        ..EngravingConfig::default()
    });
    let geometry = document.compute().unwrap().geometry.unwrap();
    assert_eq!(geometry.line.slope, 0.15);
    let y_beams: Vec<i32> = geometry.elements.iter().map(|e| e.y_beam).collect();
    assert_eq!(y_beams, vec![-180, -90]);
}

#[test]
fn malformed_json_is_rejected() {
    let err = compute_span_json("{ \"staff\": ").unwrap_err();
    assert!(matches!(err, EngraveError::Json(_)));
}

#[test]
fn annotation_at_top_level_is_rejected() {
    let err = compute_span_json(
        r#"{
            "staff": { "drawing_y": 0 },
            "children": [ { "kind": "annotation" } ]
        }"#,
    )
    .unwrap_err();
    assert!(matches!(err, EngraveError::UnsupportedChild { .. }));
}

#[test]
fn c_abi_round_trip() {
    let input = CString::new(TWO_EIGHTHS).unwrap();
    unsafe {
        let out = engravelib_compute_span(input.as_ptr());
        assert!(!out.is_null());
        let text = CStr::from_ptr(out).to_str().unwrap().to_owned();
        engravelib_free_string(out);
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["geometry"]["stem_dir"], "up");

        assert!(engravelib_compute_span(std::ptr::null()).is_null());
        let bad = CString::new("not json").unwrap();
        assert!(engravelib_compute_span(bad.as_ptr()).is_null());
        engravelib_free_string(std::ptr::null_mut());
    }
}

#[test]
fn config_file_feeds_metrics() {
    init_logger();
    let dir = std::env::temp_dir().join(format!("engravelib-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let path = dir.join("engraving.toml");
    std::fs::write(&path, "unit = 100\nbeam_max_slope = 0.2\n").unwrap();
    let metrics = ConfigMetrics::new(EngravingConfig::load_or_default(&path));
    assert_eq!(metrics.unit(100), 100);
    assert_eq!(metrics.double_unit(100), 200);
    assert_eq!(metrics.beam_max_slope(), 0.2);

    let broken = dir.join("broken.toml");
    std::fs::write(&broken, "unit = [").unwrap();
    assert_eq!(EngravingConfig::load_or_default(&broken), EngravingConfig::default());
    assert_eq!(
        EngravingConfig::load_or_default(dir.join("missing.toml")),
        EngravingConfig::default()
    );

    std::fs::remove_dir_all(&dir).unwrap();
}
