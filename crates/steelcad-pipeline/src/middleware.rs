//! Middleware wraps the whole pipeline run (`before`/`after`) and
//! optionally each stage (`on_stage_start`/`on_stage_complete`/`on_error`).
//! Middleware runs in descending declared-priority order.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::Instant;

use serde_json::Value;

use crate::context::{LogLevel, ProcessingContext};
use crate::error::PipelineError;

pub trait Middleware: Send + Sync {
    fn name(&self) -> &str;

    fn priority(&self) -> i32 {
        0
    }

    fn before(&self, _ctx: &mut ProcessingContext) {}
    fn after(&self, _ctx: &mut ProcessingContext) {}
    fn on_stage_start(&self, _stage: &str, _ctx: &mut ProcessingContext) {}
    fn on_stage_complete(&self, _stage: &str, _ctx: &mut ProcessingContext) {}
    fn on_error(&self, _stage: &str, _error: &PipelineError, _ctx: &mut ProcessingContext) {}

    /// Called before a stage's `execute` runs. Returning `Some(snapshot)`
    /// tells the pipeline to restore `snapshot` as shared data and skip
    /// `execute` entirely; the default never short-circuits a stage.
    fn before_stage_execute(&self, _stage: &str, _ctx: &ProcessingContext) -> Option<HashMap<String, Value>> {
        None
    }
}

/// Writes a context log entry at the configured level on every stage
/// transition.
pub struct LoggingMiddleware {
    pub level: LogLevel,
}

impl LoggingMiddleware {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }
}

impl Middleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "logging"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn on_stage_start(&self, stage: &str, ctx: &mut ProcessingContext) {
        ctx.add_log(self.level, format!("stage '{stage}' starting"), None);
    }

    fn on_stage_complete(&self, stage: &str, ctx: &mut ProcessingContext) {
        ctx.add_log(self.level, format!("stage '{stage}' complete"), None);
    }

    fn on_error(&self, stage: &str, error: &PipelineError, ctx: &mut ProcessingContext) {
        ctx.add_log(LogLevel::Error, format!("stage '{stage}' failed: {error}"), None);
    }
}

/// Records per-stage wall-clock duration as a metric. Memory sampling is
/// not attempted since Rust has no portable cross-platform RSS read
/// without a dedicated crate; duration is the metric that matters for the
/// engine's running-average processing time.
pub struct MetricsMiddleware {
    starts: Mutex<HashMap<String, Instant>>,
}

impl Default for MetricsMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self { starts: Mutex::new(HashMap::new()) }
    }
}

impl Middleware for MetricsMiddleware {
    fn name(&self) -> &str {
        "metrics"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn on_stage_start(&self, stage: &str, _ctx: &mut ProcessingContext) {
        self.starts.lock().unwrap().insert(stage.to_string(), Instant::now());
    }

    fn on_stage_complete(&self, stage: &str, ctx: &mut ProcessingContext) {
        if let Some(start) = self.starts.lock().unwrap().remove(stage) {
            ctx.add_metric(format!("stage.{stage}.duration_ms"), start.elapsed().as_secs_f64() * 1000.0);
        }
    }
}

type Validator = Box<dyn Fn(&ProcessingContext) -> Result<(), String> + Send + Sync>;

/// Runs an optional validator before the pipeline starts and another
/// after it ends, surfacing failures as warnings rather than aborting —
/// validation middleware observes, it doesn't gate.
#[derive(Default)]
pub struct ValidationMiddleware {
    input_validator: Option<Validator>,
    output_validator: Option<Validator>,
}

impl ValidationMiddleware {
    pub fn new() -> Self {
        Self { input_validator: None, output_validator: None }
    }

    pub fn with_input_validator(mut self, validator: impl Fn(&ProcessingContext) -> Result<(), String> + Send + Sync + 'static) -> Self {
        self.input_validator = Some(Box::new(validator));
        self
    }

    pub fn with_output_validator(mut self, validator: impl Fn(&ProcessingContext) -> Result<(), String> + Send + Sync + 'static) -> Self {
        self.output_validator = Some(Box::new(validator));
        self
    }
}

impl Middleware for ValidationMiddleware {
    fn name(&self) -> &str {
        "validation"
    }

    fn priority(&self) -> i32 {
        200
    }

    fn before(&self, ctx: &mut ProcessingContext) {
        if let Some(validator) = &self.input_validator {
            if let Err(message) = validator(ctx) {
                ctx.add_log(LogLevel::Warn, format!("input validation: {message}"), None);
            }
        }
    }

    fn after(&self, ctx: &mut ProcessingContext) {
        if let Some(validator) = &self.output_validator {
            if let Err(message) = validator(ctx) {
                ctx.add_log(LogLevel::Warn, format!("output validation: {message}"), None);
            }
        }
    }
}

/// Keyed memoisation of stage outputs: before a stage runs, the cache is
/// checked against a hash of the context's current (pre-execute)
/// shared-data snapshot; a hit short-circuits the pipeline by restoring
/// the cached shared-data entries instead of calling the stage's
/// `execute`. A miss is remembered by input hash in `pending` so the
/// output can be stored under that same key once the stage actually runs
/// and `on_stage_complete` fires — keying the store by the *post*-execute
/// snapshot instead would hash a different value every time and the
/// cache would never hit on repeat input.
pub struct CacheMiddleware {
    entries: Mutex<HashMap<(String, u64), HashMap<String, Value>>>,
    pending: Mutex<HashMap<String, u64>>,
}

impl Default for CacheMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheMiddleware {
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()), pending: Mutex::new(HashMap::new()) }
    }

    fn hash_of(ctx: &ProcessingContext) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        // Stable enough for memoisation purposes: hash the serialized
        // shared-data snapshot, not pointer identity.
        if let Ok(serialized) = serde_json::to_string(ctx.shared_data_snapshot()) {
            serialized.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Returns the remembered shared-data snapshot for this stage+input
    /// hash, if the cache has one.
    pub fn lookup(&self, stage: &str, ctx: &ProcessingContext) -> Option<HashMap<String, Value>> {
        let key = (stage.to_string(), Self::hash_of(ctx));
        self.entries.lock().unwrap().get(&key).cloned()
    }

    pub fn store(&self, stage: &str, ctx: &ProcessingContext, output: HashMap<String, Value>) {
        let key = (stage.to_string(), Self::hash_of(ctx));
        self.entries.lock().unwrap().insert(key, output);
    }
}

impl Middleware for CacheMiddleware {
    fn name(&self) -> &str {
        "cache"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn before_stage_execute(&self, stage: &str, ctx: &ProcessingContext) -> Option<HashMap<String, Value>> {
        let input_hash = Self::hash_of(ctx);
        if let Some(cached) = self.entries.lock().unwrap().get(&(stage.to_string(), input_hash)).cloned() {
            return Some(cached);
        }
        self.pending.lock().unwrap().insert(stage.to_string(), input_hash);
        None
    }

    fn on_stage_complete(&self, stage: &str, ctx: &mut ProcessingContext) {
        if let Some(input_hash) = self.pending.lock().unwrap().remove(stage) {
            self.entries.lock().unwrap().insert((stage.to_string(), input_hash), ctx.shared_data_snapshot().clone());
        }
    }
}
