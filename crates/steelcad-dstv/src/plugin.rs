//! Wires the DSTV lexer, block parser factory, and semantic stage into a
//! `steelcad_pipeline::Pipeline` of three stages, then exposes that
//! pipeline as a `steelcad_engine::FormatPlugin` (component I).

use serde::{Deserialize, Serialize};
use steelcad_core::{ErrorKind, Scene, StructuredError};
use steelcad_engine::{Capabilities, CapabilitySet, EngineError, FormatPlugin, ValidationOutcome};
use steelcad_features::FeatureError;
use steelcad_pipeline::{LogLevel, Pipeline, PipelineError, ProcessingContext, Stage};

use crate::ast::{self, ParsedBlock};
use crate::lexer::{tokenize, Token};

const SOURCE_KEY: &str = "dstv.source";
const TOKENS_KEY: &str = "dstv.tokens";
const BLOCKS_KEY: &str = "dstv.parsed_blocks";
const SCENE_KEY: &str = "dstv.scene";

/// Reads the source text out of shared data and tokenizes it, publishing
/// the token stream for the next stage.
struct LexStage;

impl Stage for LexStage {
    fn name(&self) -> &str {
        "lex"
    }

    fn description(&self) -> &str {
        "tokenizes the DSTV source into block headers, fields, and coordinates"
    }

    fn execute(&self, ctx: &mut ProcessingContext) -> Result<(), PipelineError> {
        let source: String = ctx.get_shared_data(SOURCE_KEY)?;
        let outcome = tokenize(&source);
        for err in &outcome.errors {
            ctx.add_warning(StructuredError::new(ErrorKind::Validation, err.to_string()));
        }
        ctx.add_log(LogLevel::Debug, format!("lexed {} tokens", outcome.tokens.len()), None);
        ctx.set_shared_data(TOKENS_KEY, outcome.tokens)?;
        Ok(())
    }
}

/// Groups the token stream into blocks and runs each through the block
/// parser factory. Keeps its own copy of the source text rather than
/// reconstructing it from tokens, since block parsing re-tokenizes
/// per-block via `ast::lex_and_parse_blocks` — a second lex pass over text
/// already small enough that the duplication costs nothing worth avoiding.
struct ParseBlocksStage {
    strict: bool,
    source: String,
}

impl Stage for ParseBlocksStage {
    fn name(&self) -> &str {
        "parse_blocks"
    }

    fn description(&self) -> &str {
        "groups tokens into blocks and runs the per-block-kind parser factory"
    }

    fn execute(&self, ctx: &mut ProcessingContext) -> Result<(), PipelineError> {
        let _tokens: Vec<Token> = ctx.get_shared_data(TOKENS_KEY)?;
        let (blocks, warnings) = ast::lex_and_parse_blocks(&self.source, self.strict)
            .map_err(|e| PipelineError::StageFailed { stage: self.name().to_string(), message: e.to_string() })?;
        for w in warnings {
            ctx.add_warning(StructuredError::new(ErrorKind::Validation, w));
        }
        ctx.add_log(LogLevel::Debug, format!("parsed {} blocks", blocks.len()), None);
        ctx.set_shared_data(BLOCKS_KEY, blocks)?;
        Ok(())
    }
}

/// Converts the ordered parsed-block list into the pivot scene.
struct SemanticStage {
    strict: bool,
    source_file: Option<String>,
}

impl Stage for SemanticStage {
    fn name(&self) -> &str {
        "semantic"
    }

    fn description(&self) -> &str {
        "converts parsed blocks into the pivot scene, enforcing ST/EN invariants"
    }

    fn execute(&self, ctx: &mut ProcessingContext) -> Result<(), PipelineError> {
        let blocks: Vec<ParsedBlock> = ctx.get_shared_data(BLOCKS_KEY)?;
        let outcome = ast::build_scene(&blocks, self.strict, self.source_file.clone())
            .map_err(|e| PipelineError::StageFailed { stage: self.name().to_string(), message: e.to_string() })?;
        for w in &outcome.warnings {
            ctx.add_warning(StructuredError::new(ErrorKind::Validation, w.clone()));
        }
        ctx.add_metric("feature_count", outcome.scene.total_features() as f64);
        ctx.set_shared_data(SCENE_KEY, outcome.scene)?;
        Ok(())
    }
}

/// Generates each part's base solid from its profile dimensions and applies
/// its declared features on top (components B and C), writing the result
/// back into `part.solid`. A part whose profile won't generate, or whose
/// feature application leaves a degenerate solid, is a Validation problem
/// in lenient mode (logged, part left without a solid) and fatal in strict
/// mode, matching the other two stages' `strict` branch.
struct GeometryStage {
    strict: bool,
    validate_geometry: bool,
}

impl Stage for GeometryStage {
    fn name(&self) -> &str {
        "geometry"
    }

    fn description(&self) -> &str {
        "generates each part's base solid and applies its declared features"
    }

    fn execute(&self, ctx: &mut ProcessingContext) -> Result<(), PipelineError> {
        if !self.validate_geometry {
            ctx.add_log(LogLevel::Debug, "geometry generation disabled by configuration", None);
            return Ok(());
        }

        let mut scene: Scene = ctx.get_shared_data(SCENE_KEY)?;

        for part in scene.parts.iter_mut() {
            let base_solid = match steelcad_geometry::generate(&part.dimensions, part.length_mm) {
                Ok(solid) => solid,
                Err(err) => {
                    let message = format!("part {}: {err}", part.id);
                    if self.strict {
                        return Err(PipelineError::StageFailed { stage: self.name().to_string(), message });
                    }
                    ctx.add_warning(StructuredError::new(ErrorKind::Validation, message));
                    continue;
                }
            };

            let outcome = steelcad_features::apply_features(part, base_solid);
            for err in &outcome.errors {
                let message = format!("part {}: {err}", part.id);
                if matches!(err, FeatureError::DegenerateResult(_)) {
                    return Err(PipelineError::StageFailed { stage: self.name().to_string(), message });
                }
                ctx.add_warning(StructuredError::new(ErrorKind::Validation, message));
            }
            part.solid = Some(outcome.solid);
        }

        ctx.add_log(LogLevel::Debug, format!("generated geometry for {} part(s)", scene.parts.len()), None);
        ctx.set_shared_data(SCENE_KEY, scene)?;
        Ok(())
    }
}

/// `ST` must appear within the first handful of lines of any valid DSTV
/// file; used by `validate` as a cheap, allocation-light confidence probe.
fn looks_like_dstv(bytes: &[u8]) -> f64 {
    let text = match std::str::from_utf8(bytes) {
        Ok(t) => t,
        Err(_) => return 0.0,
    };

    let mut saw_st = false;
    let mut saw_en = false;
    for line in text.lines().take(50) {
        let trimmed = line.trim();
        if trimmed == "ST" {
            saw_st = true;
        }
        if trimmed == "EN" {
            saw_en = true;
        }
    }

    match (saw_st, saw_en) {
        (true, true) => 0.95,
        (true, false) => 0.7,
        _ => 0.0,
    }
}

/// DSTV-plugin-specific configuration knobs (spec.md §6), distinct from
/// the engine-wide `EngineConfig`: these govern how this one plugin reads
/// its own input, not how the engine schedules or times out jobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DstvPluginConfig {
    pub strict_mode: bool,
    pub validate_geometry: bool,
    pub optimize_geometry: bool,
}

impl Default for DstvPluginConfig {
    fn default() -> Self {
        Self { strict_mode: false, validate_geometry: true, optimize_geometry: false }
    }
}

/// Format plugin for DSTV 7th-edition NC1 files.
#[derive(Debug, Clone, Copy, Default)]
pub struct DstvPlugin {
    pub config: DstvPluginConfig,
}

impl DstvPlugin {
    pub fn with_config(config: DstvPluginConfig) -> Self {
        Self { config }
    }
}

impl FormatPlugin for DstvPlugin {
    fn id(&self) -> &str {
        "dstv"
    }

    fn name(&self) -> &str {
        "DSTV NC1"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn extensions(&self) -> &[&str] {
        &[".nc", ".nc1"]
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            import: CapabilitySet { geometry: true, features: true, materials: true, properties: true, hierarchy: false, assemblies: false },
            export: None,
        }
    }

    fn validate(&self, bytes: &[u8]) -> ValidationOutcome {
        let confidence = looks_like_dstv(bytes);
        if confidence > 0.0 {
            ValidationOutcome::valid(confidence)
        } else {
            ValidationOutcome::invalid(vec![StructuredError::new(ErrorKind::Validation, "no ST/EN block header found in first 50 lines")])
        }
    }

    fn import(&self, bytes: &[u8], ctx: &mut ProcessingContext) -> Result<Scene, EngineError> {
        let source = String::from_utf8(bytes.to_vec())
            .map_err(|e| EngineError::Pipeline(PipelineError::StageFailed { stage: "lex".to_string(), message: e.to_string() }))?;

        let call_strict = matches!(ctx.option("strict"), Some(v) if v.as_bool().unwrap_or(false));
        let strict = call_strict || self.config.strict_mode;
        ctx.set_shared_data(SOURCE_KEY, &source).map_err(EngineError::Pipeline)?;

        let pipeline = Pipeline::new()
            .add_stage(LexStage)
            .add_stage(ParseBlocksStage { strict, source: source.clone() })
            .add_stage(SemanticStage { strict, source_file: ctx.source_file().map(|s| s.to_string()) })
            .add_stage(GeometryStage { strict, validate_geometry: self.config.validate_geometry });

        pipeline.execute(ctx)?;

        let mut scene: Scene = ctx
            .get_shared_data(SCENE_KEY)
            .map_err(|e| EngineError::Pipeline(PipelineError::StageFailed { stage: "semantic".to_string(), message: e.to_string() }))?;

        if self.config.optimize_geometry {
            for part in scene.parts.iter_mut() {
                if let Some(solid) = part.solid.as_mut() {
                    steelcad_geometry::weld_duplicate_vertices(solid, 1e-6);
                }
            }
        }

        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steelcad_pipeline::AbortSignal;

    fn minimal_tube() -> String {
        "ST\n- - - - S355 1 HSS51X51X4.8 M 2259.98 50.8 50.8 4.78 4.78\nBO\n89.01s 25.40 17.50\n174.93s 25.40 17.50\nEN\n".to_string()
    }

    #[test]
    fn test_validate_scores_high_confidence_for_dstv_text() {
        let plugin = DstvPlugin::default();
        let outcome = plugin.validate(minimal_tube().as_bytes());
        assert!(outcome.is_valid);
        assert!(outcome.confidence >= 0.9);
    }

    #[test]
    fn test_validate_rejects_non_dstv_text() {
        let plugin = DstvPlugin::default();
        let outcome = plugin.validate(b"not a dstv file at all\njust some text\n");
        assert!(!outcome.is_valid);
    }

    #[test]
    fn test_import_produces_scene_with_expected_part() {
        let plugin = DstvPlugin::default();
        let mut ctx = ProcessingContext::new(AbortSignal::new());
        let scene = plugin.import(minimal_tube().as_bytes(), &mut ctx).unwrap();
        assert_eq!(scene.parts.len(), 1);
        assert_eq!(scene.parts[0].features.len(), 2);
    }

    #[test]
    fn test_import_generates_a_solid_for_the_part_by_default() {
        let plugin = DstvPlugin::default();
        let mut ctx = ProcessingContext::new(AbortSignal::new());
        let scene = plugin.import(minimal_tube().as_bytes(), &mut ctx).unwrap();
        let solid = scene.parts[0].solid.as_ref().expect("geometry stage runs by default");
        assert!(solid.vertex_count() >= 4);
    }

    #[test]
    fn test_validate_geometry_false_skips_solid_generation() {
        let plugin = DstvPlugin::with_config(DstvPluginConfig { validate_geometry: false, ..Default::default() });
        let mut ctx = ProcessingContext::new(AbortSignal::new());
        let scene = plugin.import(minimal_tube().as_bytes(), &mut ctx).unwrap();
        assert!(scene.parts[0].solid.is_none());
    }

    #[test]
    fn test_optimize_geometry_welds_duplicate_vertices() {
        let plugin = DstvPlugin::with_config(DstvPluginConfig { optimize_geometry: true, ..Default::default() });
        let mut ctx = ProcessingContext::new(AbortSignal::new());
        let scene = plugin.import(minimal_tube().as_bytes(), &mut ctx).unwrap();
        let solid = scene.parts[0].solid.as_ref().unwrap();
        let naive = {
            let plain = DstvPlugin::default();
            let mut ctx2 = ProcessingContext::new(AbortSignal::new());
            plain.import(minimal_tube().as_bytes(), &mut ctx2).unwrap().parts[0].solid.clone().unwrap()
        };
        assert!(solid.vertices.len() <= naive.vertices.len());
    }

    #[test]
    fn test_import_fails_on_missing_start() {
        let plugin = DstvPlugin::default();
        let mut ctx = ProcessingContext::new(AbortSignal::new());
        let result = plugin.import(b"BO\n1 1 10\nEN\n", &mut ctx);
        assert!(result.is_err());
    }

    #[test]
    fn test_plugin_metadata() {
        let plugin = DstvPlugin::default();
        assert_eq!(plugin.id(), "dstv");
        assert_eq!(plugin.extensions(), &[".nc", ".nc1"]);
        assert!(plugin.capabilities().import.geometry);
    }

    #[test]
    fn test_export_unsupported() {
        let plugin = DstvPlugin::default();
        let mut ctx = ProcessingContext::new(AbortSignal::new());
        let err = plugin.export(&Scene::new(), &mut ctx).unwrap_err();
        assert!(matches!(err, EngineError::CapabilityMissing(_, "export")));
    }
}
