//! End-to-end fixtures for the seed scenarios from spec.md §8, run against
//! the same `Engine` + `DstvPlugin` wiring a caller uses, not the internal
//! `ast`/`lexer` functions directly.

use steelcad_core::{ErrorKind, Face, FeatureKind, ProfileCategory};
use steelcad_dstv::DstvPlugin;
use steelcad_engine::{Engine, EngineConfig, ImportOptions};
use steelcad_pipeline::ProcessingContext;

fn engine() -> Engine {
    let mut engine = Engine::new(EngineConfig::default());
    engine.register_format(Box::new(DstvPlugin::default())).expect("plugin registers cleanly");
    engine
}

/// Scenario 1: minimal tube import with two holes on the web.
#[test]
fn test_scenario_minimal_tube_import() {
    let source = "ST\n- - - - S355 1 HSS51X51X4.8 M 2259.98 50.8 50.8 4.78 4.78\nBO\n89.01s 25.40 17.50\n174.93s 25.40 17.50\nEN\n";
    let result = engine().import(source.as_bytes(), ImportOptions { format: Some("dstv".into()), ..Default::default() });

    assert!(result.success, "errors: {:?}", result.errors);
    let scene = result.scene.unwrap();
    assert_eq!(scene.parts.len(), 1);
    let part = &scene.parts[0];
    assert_eq!(part.category(), ProfileCategory::HollowSquare);
    assert_eq!(part.features.len(), 2);
    for feature in &part.features {
        assert_eq!(feature.face, Face::Web);
        match &feature.kind {
            FeatureKind::Hole(h) => assert!((h.diameter - 17.50).abs() < 1e-6),
            other => panic!("expected a hole feature, got {other:?}"),
        }
    }
    let solid = part.solid.as_ref().expect("geometry stage runs by default");
    assert!(solid.vertex_count() > 3);
    let bbox = solid.bounding_box().unwrap();
    assert!((bbox.span_z() - 2259.98).abs() < 1.0);
}

/// Scenario 2: I-beam with a web marking.
#[test]
fn test_scenario_ibeam_with_marking() {
    let source = "ST\n- - - - S355 1 IPE300 I 2700 300 150 7.1 10.7\nSI\nv 200 150 10 0 PART-001\nEN\n";
    let result = engine().import(source.as_bytes(), ImportOptions { format: Some("dstv".into()), ..Default::default() });

    assert!(result.success, "errors: {:?}", result.errors);
    let scene = result.scene.unwrap();
    let part = &scene.parts[0];
    assert_eq!(part.category(), ProfileCategory::IBeam);
    assert_eq!(part.features.len(), 1);
    match &part.features[0].kind {
        FeatureKind::Marking(m) => {
            assert_eq!(m.text, "PART-001");
            assert_eq!(part.features[0].face, Face::Web);
        }
        other => panic!("expected a marking feature, got {other:?}"),
    }
}

/// Scenario 3: outer contour matching the input polyline.
#[test]
fn test_scenario_outer_contour() {
    let source = "ST\n- - - - S355 1 HSS51X51X4.8 M 2259.98 50.8 50.8 4.78 4.78\nAK\n0 0\n2260 0\n2260 50.8\n0 50.8\n0 0\nEN\n";
    let result = engine().import(source.as_bytes(), ImportOptions { format: Some("dstv".into()), ..Default::default() });

    assert!(result.success, "errors: {:?}", result.errors);
    let scene = result.scene.unwrap();
    let part = &scene.parts[0];
    assert_eq!(part.features.len(), 1);
    match &part.features[0].kind {
        FeatureKind::OuterContour(c) => assert_eq!(c.contour.segments.len(), 4),
        other => panic!("expected an outer contour feature, got {other:?}"),
    }
}

/// Scenario 4: missing ST is a fatal validation error, no partial scene.
#[test]
fn test_scenario_missing_st_fails_cleanly() {
    let source = "BO\n1 1 10\nEN\n";
    let result = engine().import(source.as_bytes(), ImportOptions { format: Some("dstv".into()), ..Default::default() });

    assert!(!result.success);
    assert!(result.scene.is_none());
    assert!(!result.errors.is_empty());
    assert_eq!(result.errors[0].kind, ErrorKind::Validation);
}

/// Scenario 5: auto-detection from content alone, unknown extension.
#[test]
fn test_scenario_auto_detection_from_content() {
    let source = b"ST\n- - - - S355 1 IPE300 I 2700 300 150 7.1 10.7\nEN\n";
    let engine = engine();

    let detected = engine.detect_format(source).unwrap();
    assert_eq!(detected, "dstv");

    let result = engine.import(
        source,
        ImportOptions { source_file: Some("foo.unknown".into()), ..Default::default() },
    );
    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.metadata.format.as_deref(), Some("dstv"));
}

/// Scenario 6: a slow plugin times out before its stage completes.
struct SlowPlugin;
impl steelcad_engine::FormatPlugin for SlowPlugin {
    fn id(&self) -> &str {
        "slow"
    }
    fn name(&self) -> &str {
        "slow"
    }
    fn version(&self) -> &str {
        "1.0.0"
    }
    fn extensions(&self) -> &[&str] {
        &[".slow"]
    }
    fn capabilities(&self) -> steelcad_engine::Capabilities {
        steelcad_engine::Capabilities::default()
    }
    fn validate(&self, _bytes: &[u8]) -> steelcad_engine::ValidationOutcome {
        steelcad_engine::ValidationOutcome::valid(1.0)
    }
    fn import(&self, _bytes: &[u8], _ctx: &mut ProcessingContext) -> Result<steelcad_core::Scene, steelcad_engine::EngineError> {
        std::thread::sleep(std::time::Duration::from_millis(100));
        Ok(steelcad_core::Scene::new())
    }
}

#[test]
fn test_scenario_timeout_reports_resource_error_with_no_scene() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.register_format(Box::new(SlowPlugin)).unwrap();

    let result = engine.import(b"anything", ImportOptions { format: Some("slow".into()), timeout_ms: Some(50), ..Default::default() });

    assert!(!result.success);
    assert!(result.scene.is_none());
    assert_eq!(result.errors[0].kind, ErrorKind::Resource);
    assert!(result.errors[0].message.contains("timed out"));
}

#[test]
fn test_validate_rejects_file_without_st_en_header() {
    let plugin = DstvPlugin::default();
    let outcome = plugin.validate(b"this is not a DSTV file\nno blocks here\n");
    assert!(!outcome.is_valid);
}
