use std::sync::mpsc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use steelcad_core::{ErrorKind, StructuredError};
use steelcad_pipeline::{AbortSignal, ProcessingContext};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::jobs::JobSlots;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::plugin::{Capabilities, FormatInfo, FormatPlugin};
use crate::registry::FormatRegistry;
use crate::result::{ExportOptions, ExportResult, ImportMetadata, ImportOptions, ImportResult, ImportStats};

/// The format engine: owns the plugin registry, enforces the engine-wide
/// configuration (concurrency, timeouts, memory ceiling), and is the only
/// entry point callers use — the public API never throws, every outcome
/// is a result envelope.
pub struct Engine {
    registry: FormatRegistry,
    config: EngineConfig,
    metrics: EngineMetrics,
    slots: JobSlots,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let slots = JobSlots::new(config.max_concurrent_jobs);
        Self { registry: FormatRegistry::new(), config, metrics: EngineMetrics::new(), slots }
    }

    pub fn register_format(&mut self, plugin: Box<dyn FormatPlugin>) -> Result<(), EngineError> {
        self.registry.register_format(plugin)
    }

    pub fn unregister_format(&mut self, id: &str) -> Result<(), EngineError> {
        self.registry.unregister_format(id)
    }

    pub fn supported_formats(&self) -> Vec<FormatInfo> {
        self.registry.supported_formats()
    }

    pub fn capabilities(&self, id: &str) -> Option<Capabilities> {
        self.registry.capabilities(id)
    }

    pub fn detect_format(&self, bytes: &[u8]) -> Result<String, EngineError> {
        self.registry.detect_format(bytes, None, self.config.detection_confidence_threshold)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn import(&self, bytes: &[u8], options: ImportOptions) -> ImportResult {
        let start = Instant::now();
        let memory_limit_bytes = self.config.memory_limit_mb * 1024 * 1024;
        if bytes.len() as u64 > memory_limit_bytes {
            return ImportResult {
                success: false,
                scene: None,
                errors: vec![StructuredError::new(
                    ErrorKind::Resource,
                    format!("input size {} exceeds memory_limit_mb={}", bytes.len(), self.config.memory_limit_mb),
                )],
                warnings: Vec::new(),
                stats: ImportStats { file_size: bytes.len() as u64, ..Default::default() },
                metadata: ImportMetadata::default(),
            };
        }

        let _job_slot = self.slots.acquire();

        let extension = options.source_file.as_deref().and_then(|f| f.rsplit_once('.').map(|(_, e)| format!(".{e}")));
        let format_id = match options.format.clone() {
            Some(id) => id,
            None => {
                if !self.config.auto_detect {
                    return ImportResult {
                        success: false,
                        scene: None,
                        errors: vec![StructuredError::new(ErrorKind::Usage, "auto_detect disabled and no format given")],
                        warnings: Vec::new(),
                        stats: ImportStats { file_size: bytes.len() as u64, ..Default::default() },
                        metadata: ImportMetadata::default(),
                    };
                }
                match self.registry.detect_format(bytes, extension.as_deref(), self.config.detection_confidence_threshold) {
                    Ok(id) => id,
                    Err(err) => {
                        return ImportResult {
                            success: false,
                            scene: None,
                            errors: vec![StructuredError::new(ErrorKind::Usage, err.to_string())],
                            warnings: Vec::new(),
                            stats: ImportStats { file_size: bytes.len() as u64, ..Default::default() },
                            metadata: ImportMetadata::default(),
                        };
                    }
                }
            }
        };

        let Some(plugin) = self.registry.plugin(&format_id) else {
            return ImportResult {
                success: false,
                scene: None,
                errors: vec![StructuredError::new(ErrorKind::Usage, format!("unknown format: {format_id}"))],
                warnings: Vec::new(),
                stats: ImportStats { file_size: bytes.len() as u64, ..Default::default() },
                metadata: ImportMetadata::default(),
            };
        };

        let outcome = plugin.validate(bytes);
        let mut upfront_warnings = Vec::new();
        if !outcome.is_valid {
            if options.strict {
                return ImportResult {
                    success: false,
                    scene: None,
                    errors: outcome.errors,
                    warnings: outcome.warnings,
                    stats: ImportStats { file_size: bytes.len() as u64, ..Default::default() },
                    metadata: ImportMetadata { format: Some(format_id.clone()), plugin: Some(plugin.info()), ..Default::default() },
                };
            }
            upfront_warnings.extend(outcome.errors);
            upfront_warnings.extend(outcome.warnings);
        }

        let abort = AbortSignal::new();
        let mut ctx = ProcessingContext::new(abort.clone());
        if let Some(src) = &options.source_file {
            ctx = ctx.with_source_file(src.clone());
        }
        let mut ctx_options = std::collections::HashMap::new();
        ctx_options.insert("strict".to_string(), serde_json::Value::Bool(options.strict));
        ctx = ctx.with_options(ctx_options);
        for w in upfront_warnings {
            ctx.add_warning(w);
        }

        let timeout_ms = options.timeout_ms.unwrap_or(self.config.default_timeout_ms);
        let (tx, rx) = mpsc::channel();
        let worker_bytes = bytes.to_vec();
        let worker_plugin = plugin.clone();
        let mut worker_ctx = ctx;
        // Detached on purpose: a plain `thread::spawn` (not `thread::scope`)
        // lets `recv_timeout` below return as soon as the deadline passes,
        // independent of whether `worker_plugin.import` has finished.
        // `thread::scope` joins every spawned thread before it returns
        // control to the caller, which would make the timeout wait for a
        // hung or slow plugin anyway. `abort` below is the real
        // cancellation signal; the plugin is expected to poll it and
        // unwind, the channel recv only bounds *this call's* wall clock.
        std::thread::spawn(move || {
            let result = worker_plugin.import(&worker_bytes, &mut worker_ctx);
            let _ = tx.send((result, worker_ctx));
        });
        let import_outcome = rx.recv_timeout(Duration::from_millis(timeout_ms));

        let elapsed = start.elapsed();
        let result = match import_outcome {
            Ok((Ok(scene), ctx)) => {
                let total_elements = scene.total_features() as u64 + scene.parts.len() as u64;
                info!(format = %format_id, elapsed_ms = elapsed.as_millis() as u64, "import complete");
                ImportResult {
                    success: true,
                    scene: Some(scene),
                    errors: ctx.errors().to_vec(),
                    warnings: ctx.warnings().to_vec(),
                    stats: ImportStats {
                        total_elements,
                        imported_elements: total_elements,
                        failed_elements: 0,
                        processing_time_ms: elapsed.as_millis() as u64,
                        file_size: bytes.len() as u64,
                        memory_used: bytes.len() as u64,
                    },
                    metadata: ImportMetadata { format: Some(format_id.clone()), plugin: Some(plugin.info()), ..Default::default() },
                }
            }
            Ok((Err(engine_err), ctx)) => ImportResult {
                success: false,
                scene: None,
                errors: {
                    let mut errs = ctx.errors().to_vec();
                    errs.push(StructuredError::new(ErrorKind::Validation, engine_err.to_string()));
                    errs
                },
                warnings: ctx.warnings().to_vec(),
                stats: ImportStats {
                    processing_time_ms: elapsed.as_millis() as u64,
                    file_size: bytes.len() as u64,
                    ..Default::default()
                },
                metadata: ImportMetadata { format: Some(format_id.clone()), plugin: Some(plugin.info()), ..Default::default() },
            },
            Err(_timeout) => {
                abort.cancel();
                warn!(format = %format_id, timeout_ms, "import timed out");
                ImportResult {
                    success: false,
                    scene: None,
                    errors: vec![StructuredError::new(ErrorKind::Resource, format!("import timed out after {timeout_ms}ms"))],
                    warnings: Vec::new(),
                    stats: ImportStats {
                        processing_time_ms: elapsed.as_millis() as u64,
                        file_size: bytes.len() as u64,
                        ..Default::default()
                    },
                    metadata: ImportMetadata { format: Some(format_id.clone()), plugin: Some(plugin.info()), ..Default::default() },
                }
            }
        };

        if self.config.enable_metrics {
            self.metrics.record_import(&format_id, elapsed.as_secs_f64() * 1000.0, result.success);
        }
        result
    }

    pub fn export(&self, scene: &steelcad_core::Scene, format_id: &str, _options: ExportOptions) -> ExportResult {
        let start = Instant::now();
        let Some(plugin) = self.registry.plugin(format_id) else {
            return ExportResult {
                success: false,
                data: None,
                filename: None,
                errors: vec![StructuredError::new(ErrorKind::Usage, format!("unknown format: {format_id}"))],
                warnings: Vec::new(),
                stats: ImportStats::default(),
            };
        };

        let abort = AbortSignal::new();
        let mut ctx = ProcessingContext::new(abort);
        let result = match plugin.export(scene, &mut ctx) {
            Ok(data) => {
                if self.config.enable_metrics {
                    self.metrics.record_export(format_id);
                }
                ExportResult {
                    success: true,
                    data: Some(data),
                    filename: None,
                    errors: ctx.errors().to_vec(),
                    warnings: ctx.warnings().to_vec(),
                    stats: ImportStats {
                        processing_time_ms: start.elapsed().as_millis() as u64,
                        ..Default::default()
                    },
                }
            }
            Err(err) => ExportResult {
                success: false,
                data: None,
                filename: None,
                errors: vec![StructuredError::new(ErrorKind::Capability, err.to_string())],
                warnings: ctx.warnings().to_vec(),
                stats: ImportStats { processing_time_ms: start.elapsed().as_millis() as u64, ..Default::default() },
            },
        };
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{CapabilitySet, ValidationOutcome};
    use std::thread;
    use std::time::Duration as StdDuration;
    use steelcad_core::Scene;

    struct InstantPlugin;
    impl FormatPlugin for InstantPlugin {
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
            &[".nc1", ".nc"]
        }
        fn capabilities(&self) -> Capabilities {
            Capabilities { import: CapabilitySet { geometry: true, features: true, ..Default::default() }, export: None }
        }
        fn validate(&self, bytes: &[u8]) -> ValidationOutcome {
            if bytes.starts_with(b"ST") {
                ValidationOutcome::valid(0.95)
            } else {
                ValidationOutcome::invalid(vec![StructuredError::validation("missing ST")])
            }
        }
        fn import(&self, _bytes: &[u8], _ctx: &mut ProcessingContext) -> Result<Scene, EngineError> {
            Ok(Scene::new())
        }
    }

    /// Echoes whichever way the engine resolved `strict` back as an error
    /// message, so a test can assert the option actually reaches the plugin.
    struct StrictEchoPlugin;
    impl FormatPlugin for StrictEchoPlugin {
        fn id(&self) -> &str {
            "echo"
        }
        fn name(&self) -> &str {
            "echo"
        }
        fn version(&self) -> &str {
            "1.0.0"
        }
        fn extensions(&self) -> &[&str] {
            &[".echo"]
        }
        fn capabilities(&self) -> Capabilities {
            Capabilities::default()
        }
        fn validate(&self, _bytes: &[u8]) -> ValidationOutcome {
            ValidationOutcome::valid(1.0)
        }
        fn import(&self, _bytes: &[u8], ctx: &mut ProcessingContext) -> Result<Scene, EngineError> {
            let strict = matches!(ctx.option("strict"), Some(v) if v.as_bool().unwrap_or(false));
            if strict {
                Err(EngineError::Pipeline(steelcad_pipeline::PipelineError::StageFailed {
                    stage: "echo".to_string(),
                    message: "strict was set".to_string(),
                }))
            } else {
                Ok(Scene::new())
            }
        }
    }

    struct SlowPlugin;
    impl FormatPlugin for SlowPlugin {
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
        fn capabilities(&self) -> Capabilities {
            Capabilities::default()
        }
        fn validate(&self, _bytes: &[u8]) -> ValidationOutcome {
            ValidationOutcome::valid(1.0)
        }
        fn import(&self, _bytes: &[u8], ctx: &mut ProcessingContext) -> Result<Scene, EngineError> {
            thread::sleep(StdDuration::from_millis(100));
            if ctx.is_cancelled() {
                ctx.add_warning(StructuredError::resource("cancelled mid-sleep"));
            }
            Ok(Scene::new())
        }
    }

    fn engine_with(plugin: Box<dyn FormatPlugin>) -> Engine {
        let mut engine = Engine::new(EngineConfig::default());
        engine.register_format(plugin).unwrap();
        engine
    }

    #[test]
    fn test_import_succeeds_with_explicit_format() {
        let engine = engine_with(Box::new(InstantPlugin));
        let result = engine.import(b"ST\n...\nEN\n", ImportOptions { format: Some("dstv".into()), ..Default::default() });
        assert!(result.success);
        assert!(result.scene.is_some());
    }

    #[test]
    fn test_import_auto_detects_format() {
        let engine = engine_with(Box::new(InstantPlugin));
        let result = engine.import(b"ST\n...\nEN\n", ImportOptions::default());
        assert!(result.success);
        assert_eq!(result.metadata.format.as_deref(), Some("dstv"));
    }

    #[test]
    fn test_import_unknown_format_fails() {
        let engine = engine_with(Box::new(InstantPlugin));
        let result = engine.import(b"whatever", ImportOptions { format: Some("nope".into()), ..Default::default() });
        assert!(!result.success);
    }

    #[test]
    fn test_import_strict_mode_fails_on_invalid_content() {
        let engine = engine_with(Box::new(InstantPlugin));
        let result = engine.import(b"nope", ImportOptions { format: Some("dstv".into()), strict: true, ..Default::default() });
        assert!(!result.success);
    }

    #[test]
    fn test_import_forwards_strict_option_to_the_plugin_context() {
        let engine = engine_with(Box::new(StrictEchoPlugin));
        let strict_result = engine.import(b"anything", ImportOptions { format: Some("echo".into()), strict: true, ..Default::default() });
        assert!(!strict_result.success, "plugin should have observed strict=true through the processing context");

        let lenient_result = engine.import(b"anything", ImportOptions { format: Some("echo".into()), strict: false, ..Default::default() });
        assert!(lenient_result.success);
    }

    #[test]
    fn test_import_lenient_mode_downgrades_invalid_to_warning() {
        let engine = engine_with(Box::new(InstantPlugin));
        let result = engine.import(b"nope", ImportOptions { format: Some("dstv".into()), strict: false, ..Default::default() });
        assert!(result.success);
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_import_times_out() {
        let engine = engine_with(Box::new(SlowPlugin));
        let result = engine.import(
            b"anything",
            ImportOptions { format: Some("slow".into()), timeout_ms: Some(10), ..Default::default() },
        );
        assert!(!result.success);
        assert!(result.errors[0].message.contains("timed out"));
    }

    /// `SlowPlugin::import` sleeps 100ms; a 10ms timeout must return this
    /// call in well under that, not block on the worker thread finishing.
    #[test]
    fn test_import_times_out_without_waiting_for_the_slow_plugin_to_finish() {
        let engine = engine_with(Box::new(SlowPlugin));
        let started = std::time::Instant::now();
        let result = engine.import(
            b"anything",
            ImportOptions { format: Some("slow".into()), timeout_ms: Some(10), ..Default::default() },
        );
        let wall_clock = started.elapsed();
        assert!(!result.success);
        assert!(wall_clock < StdDuration::from_millis(80), "import() blocked for {wall_clock:?}, did not honor the timeout");
    }

    #[test]
    fn test_memory_limit_rejects_oversized_input() {
        let mut config = EngineConfig::default();
        config.memory_limit_mb = 0;
        let mut engine = Engine::new(config);
        engine.register_format(Box::new(InstantPlugin)).unwrap();
        let result = engine.import(b"ST\n...\nEN\n", ImportOptions { format: Some("dstv".into()), ..Default::default() });
        assert!(!result.success);
    }

    #[test]
    fn test_metrics_update_after_import() {
        let engine = engine_with(Box::new(InstantPlugin));
        engine.import(b"ST\n...\nEN\n", ImportOptions { format: Some("dstv".into()), ..Default::default() });
        let snapshot = engine.metrics();
        assert_eq!(snapshot.total_imports, 1);
    }
}
