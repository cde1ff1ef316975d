//! Integration tests for the DSTV import pipeline, exercised through the
//! same `Engine` surface `main.rs` drives: register the plugin, call
//! `import`/`detect_format`, inspect the result envelope.

use steelcad_core::ErrorKind;
use steelcad_dstv::DstvPlugin;
use steelcad_engine::{Engine, EngineConfig, ImportOptions};

const IPE300_WITH_MARKING: &[u8] =
    b"ST\n- - - - S355 1 IPE300 I 2700 300 150 7.1 10.7\nSI\nv 200 150 10 0 PART-001\nEN\n";

const HSS_WITH_CONTOUR: &[u8] =
    b"ST\n- - - - S355 1 HSS51X51X4.8 M 2259.98 50.8 50.8 4.78 4.78\nAK\n0 0\n2260 0\n2260 50.8\n0 50.8\n0 0\nEN\n";

fn engine() -> Engine {
    let mut engine = Engine::new(EngineConfig::default());
    engine.register_format(Box::new(DstvPlugin::default())).expect("plugin registers cleanly");
    engine
}

#[test]
fn test_import_ibeam_with_marking_produces_scene_with_one_part() {
    let engine = engine();
    let result = engine.import(IPE300_WITH_MARKING, ImportOptions { format: Some("dstv".into()), ..Default::default() });

    assert!(result.success, "errors: {:?}", result.errors);
    let scene = result.scene.expect("successful import carries a scene");
    assert_eq!(scene.parts.len(), 1);
    assert_eq!(scene.parts[0].features.len(), 1);
    assert_eq!(result.metadata.format.as_deref(), Some("dstv"));
}

#[test]
fn test_import_auto_detects_dstv_from_content() {
    let engine = engine();
    let result = engine.import(HSS_WITH_CONTOUR, ImportOptions::default());

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.metadata.format.as_deref(), Some("dstv"));
}

#[test]
fn test_import_unknown_format_id_fails_with_usage_error() {
    let engine = engine();
    let result = engine.import(IPE300_WITH_MARKING, ImportOptions { format: Some("step".into()), ..Default::default() });

    assert!(!result.success);
    assert_eq!(result.errors[0].kind, ErrorKind::Usage);
    assert!(result.errors[0].message.contains("unknown format"));
}

#[test]
fn test_import_strict_mode_rejects_non_dstv_content() {
    let engine = engine();
    let result = engine.import(b"not a dstv file at all", ImportOptions { format: Some("dstv".into()), strict: true, ..Default::default() });

    assert!(!result.success);
}

#[test]
fn test_detect_format_identifies_dstv_file() {
    let engine = engine();
    let id = engine.detect_format(HSS_WITH_CONTOUR).expect("detection succeeds on a well-formed file");
    assert_eq!(id, "dstv");
}

#[test]
fn test_supported_formats_lists_dstv_with_import_capability() {
    let engine = engine();
    let formats = engine.supported_formats();
    let dstv = formats.iter().find(|f| f.id == "dstv").expect("dstv is registered");
    assert!(dstv.capabilities.import.geometry);
    assert!(dstv.capabilities.import.features);
}

#[test]
fn test_capabilities_lookup_returns_none_for_unregistered_format() {
    let engine = engine();
    assert!(engine.capabilities("step").is_none());
}
