//! Format engine and plugin registry (components G/H): the public entry
//! point that resolves a format, enforces timeouts and concurrency, and
//! returns a uniform result envelope regardless of which plugin ran.

pub mod config;
pub mod engine;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod plugin;
pub mod registry;
pub mod result;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
pub use jobs::{JobSlotGuard, JobSlots};
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use plugin::{
    validate_plugin_schema, Capabilities, CapabilitySet, FormatInfo, FormatPlugin, PluginInfo,
    ValidationOutcome,
};
pub use registry::FormatRegistry;
pub use result::{ExportOptions, ExportResult, ImportMetadata, ImportOptions, ImportResult, ImportStats};
