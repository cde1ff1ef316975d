//! Processing context: the mutable state threaded through a pipeline run,
//! accumulating errors, warnings, logs, metrics, and side data stages pass
//! between each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use steelcad_core::StructuredError;

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub elapsed_ms: u64,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StageInfo {
    pub index: usize,
    pub name: String,
    pub total: usize,
    pub started_at: Option<Instant>,
}

/// A cheaply-cloned cancellation flag shared between the caller (who may
/// trigger it from another thread or after a timeout) and the running
/// pipeline, which polls it between stages.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct ProcessingContext {
    start_time: Instant,
    abort: AbortSignal,
    source_file: Option<String>,
    options: HashMap<String, Value>,
    current_stage: Option<StageInfo>,
    progress: u8,
    errors: Vec<StructuredError>,
    warnings: Vec<StructuredError>,
    logs: Vec<LogEntry>,
    metrics: HashMap<String, f64>,
    shared_data: HashMap<String, Value>,
}

impl ProcessingContext {
    pub fn new(abort: AbortSignal) -> Self {
        Self {
            start_time: Instant::now(),
            abort,
            source_file: None,
            options: HashMap::new(),
            current_stage: None,
            progress: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            logs: Vec::new(),
            metrics: HashMap::new(),
            shared_data: HashMap::new(),
        }
    }

    pub fn with_source_file(mut self, path: impl Into<String>) -> Self {
        self.source_file = Some(path.into());
        self
    }

    pub fn with_options(mut self, options: HashMap<String, Value>) -> Self {
        self.options = options;
        self
    }

    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.abort.is_cancelled()
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn get_elapsed_time(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn add_error(&mut self, error: StructuredError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: StructuredError) {
        self.warnings.push(warning);
    }

    pub fn add_log(&mut self, level: LogLevel, message: impl Into<String>, data: Option<Value>) {
        self.logs.push(LogEntry {
            elapsed_ms: self.get_elapsed_time().as_millis() as u64,
            level,
            message: message.into(),
            data,
            stage: self.current_stage.as_ref().map(|s| s.name.clone()),
        });
    }

    pub fn add_metric(&mut self, key: impl Into<String>, value: f64) {
        self.metrics.insert(key.into(), value);
    }

    pub fn set_progress(&mut self, percent: u8) {
        self.progress = percent.min(100);
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn set_current_stage(&mut self, index: usize, name: impl Into<String>, total: usize) {
        self.current_stage = Some(StageInfo {
            index,
            name: name.into(),
            total,
            started_at: Some(Instant::now()),
        });
    }

    pub fn complete_current_stage(&mut self) -> Option<Duration> {
        self.current_stage.take().and_then(|s| s.started_at.map(|t| t.elapsed()))
    }

    pub fn current_stage_name(&self) -> Option<&str> {
        self.current_stage.as_ref().map(|s| s.name.as_str())
    }

    pub fn set_shared_data(&mut self, key: impl Into<String>, value: impl Serialize) -> Result<(), PipelineError> {
        let key = key.into();
        let json = serde_json::to_value(value)
            .map_err(|e| PipelineError::SharedDataShape(key.clone(), e.to_string()))?;
        self.shared_data.insert(key, json);
        Ok(())
    }

    pub fn get_shared_data<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<T, PipelineError> {
        let value = self
            .shared_data
            .get(key)
            .ok_or_else(|| PipelineError::MissingSharedData(key.to_string()))?;
        serde_json::from_value(value.clone())
            .map_err(|e| PipelineError::SharedDataShape(key.to_string(), e.to_string()))
    }

    pub fn has_shared_data(&self, key: &str) -> bool {
        self.shared_data.contains_key(key)
    }

    pub fn errors(&self) -> &[StructuredError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[StructuredError] {
        &self.warnings
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn metrics(&self) -> &HashMap<String, f64> {
        &self.metrics
    }

    pub fn shared_data_snapshot(&self) -> &HashMap<String, Value> {
        &self.shared_data
    }

    /// Overwrites shared data wholesale with a previously captured
    /// snapshot, used by cache middleware to replay a stage's recorded
    /// output instead of re-running it.
    pub fn restore_shared_data(&mut self, snapshot: HashMap<String, Value>) {
        self.shared_data = snapshot;
    }
}
