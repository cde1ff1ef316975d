pub mod context;
pub mod error;
pub mod middleware;
pub mod stage;

pub use context::{AbortSignal, LogEntry, LogLevel, ProcessingContext, StageInfo};
pub use error::PipelineError;
pub use middleware::{CacheMiddleware, LoggingMiddleware, Middleware, MetricsMiddleware, ValidationMiddleware};
pub use stage::{Pipeline, Stage};
