use serde::{Deserialize, Serialize};
use steelcad_pipeline::LogLevel;

/// Engine-wide configuration knobs, constructed programmatically by the
/// caller (CLI or embedder) — there is no project file for this, unlike a
/// cabinet project's TOML: a DSTV import is a single-file, single-job
/// operation with no persistent project state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub auto_detect: bool,
    pub detection_confidence_threshold: f64,
    pub max_concurrent_jobs: usize,
    pub default_timeout_ms: u64,
    pub memory_limit_mb: u64,
    pub log_level: LogLevel,
    pub enable_metrics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_detect: true,
            detection_confidence_threshold: 0.8,
            max_concurrent_jobs: 4,
            default_timeout_ms: 30_000,
            memory_limit_mb: 500,
            log_level: LogLevel::Info,
            enable_metrics: true,
        }
    }
}
