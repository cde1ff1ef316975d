//! Staged execution: a pipeline is an ordered list of named stages, each a
//! function of the shared `ProcessingContext` to a (possibly failing) side
//! effect on that context — the next stage reads what the previous one
//! published to `shared_data`.

use steelcad_core::{ErrorKind, Location, StructuredError};

use crate::context::{LogLevel, ProcessingContext};
use crate::error::PipelineError;
use crate::middleware::Middleware;

/// One step of a pipeline. Implementors declare identity/timing metadata
/// and do their work in `execute`; `pre_validate`/`post_complete` are
/// optional hooks most stages don't need to override.
pub trait Stage: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn estimated_duration_ms(&self) -> Option<u64> {
        None
    }

    fn pre_validate(&self, _ctx: &mut ProcessingContext) -> Result<(), PipelineError> {
        Ok(())
    }

    fn execute(&self, ctx: &mut ProcessingContext) -> Result<(), PipelineError>;

    fn post_complete(&self, _ctx: &mut ProcessingContext) {}
}

/// Ordered list of stages executed under a shared context, with middleware
/// wrapped around the whole run and around each stage.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    middleware: Vec<Box<dyn Middleware>>,
    abort_on_error: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new(), middleware: Vec::new(), abort_on_error: true }
    }

    pub fn add_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn use_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    pub fn abort_on_error(mut self, abort: bool) -> Self {
        self.abort_on_error = abort;
        self
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs every stage in order. Cancellation is polled before each
    /// stage. A stage failure is recorded in the context; if
    /// `abort_on_error` is set (the default) execution stops and the
    /// error is returned to the caller, otherwise the pipeline continues
    /// with the next stage using whatever the last successful stage left
    /// in shared data.
    pub fn execute(&self, ctx: &mut ProcessingContext) -> Result<(), PipelineError> {
        let mut sorted_middleware: Vec<&Box<dyn Middleware>> = self.middleware.iter().collect();
        sorted_middleware.sort_by_key(|m| std::cmp::Reverse(m.priority()));

        for mw in &sorted_middleware {
            mw.before(ctx);
        }

        let total = self.stages.len();
        let mut result: Result<(), PipelineError> = Ok(());

        for (index, stage) in self.stages.iter().enumerate() {
            if ctx.is_cancelled() {
                result = Err(PipelineError::Cancelled { stage: stage.name().to_string() });
                break;
            }

            ctx.set_current_stage(index, stage.name(), total);
            ctx.set_progress(((index as f64 / total.max(1) as f64) * 100.0) as u8);

            for mw in &sorted_middleware {
                mw.on_stage_start(stage.name(), ctx);
            }

            let cached = sorted_middleware.iter().find_map(|mw| mw.before_stage_execute(stage.name(), ctx));
            let was_cached = cached.is_some();
            let stage_result = match cached {
                Some(snapshot) => {
                    ctx.restore_shared_data(snapshot);
                    Ok(())
                }
                None => stage.pre_validate(ctx).and_then(|_| stage.execute(ctx)),
            };

            match stage_result {
                Ok(()) => {
                    if !was_cached {
                        stage.post_complete(ctx);
                    }
                    for mw in &sorted_middleware {
                        mw.on_stage_complete(stage.name(), ctx);
                    }
                    ctx.complete_current_stage();
                }
                Err(err) => {
                    ctx.add_error(
                        StructuredError::new(ErrorKind::Internal, err.to_string())
                            .with_location(Location { block_kind: Some(stage.name().to_string()), ..Default::default() }),
                    );
                    for mw in &sorted_middleware {
                        mw.on_error(stage.name(), &err, ctx);
                    }
                    ctx.complete_current_stage();
                    if self.abort_on_error {
                        result = Err(err);
                        break;
                    } else {
                        ctx.add_log(LogLevel::Warn, format!("stage '{}' failed, continuing: {err}", stage.name()), None);
                    }
                }
            }
        }

        if result.is_ok() {
            ctx.set_progress(100);
        }

        for mw in &sorted_middleware {
            mw.after(ctx);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AbortSignal;
    use crate::middleware::CacheMiddleware;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct OkStage(&'static str);
    impl Stage for OkStage {
        fn name(&self) -> &str {
            self.0
        }
        fn execute(&self, ctx: &mut ProcessingContext) -> Result<(), PipelineError> {
            ctx.set_shared_data(self.0, true).unwrap();
            Ok(())
        }
    }

    struct FailingStage;
    impl Stage for FailingStage {
        fn name(&self) -> &str {
            "failing"
        }
        fn execute(&self, _ctx: &mut ProcessingContext) -> Result<(), PipelineError> {
            Err(PipelineError::StageFailed { stage: "failing".into(), message: "boom".into() })
        }
    }

    #[test]
    fn test_pipeline_runs_all_stages_in_order() {
        let pipeline = Pipeline::new().add_stage(OkStage("a")).add_stage(OkStage("b"));
        let mut ctx = ProcessingContext::new(AbortSignal::new());
        pipeline.execute(&mut ctx).unwrap();
        assert!(ctx.has_shared_data("a"));
        assert!(ctx.has_shared_data("b"));
        assert_eq!(ctx.progress(), 100);
    }

    #[test]
    fn test_pipeline_aborts_on_error_by_default() {
        let pipeline = Pipeline::new().add_stage(FailingStage).add_stage(OkStage("never"));
        let mut ctx = ProcessingContext::new(AbortSignal::new());
        let result = pipeline.execute(&mut ctx);
        assert!(result.is_err());
        assert!(!ctx.has_shared_data("never"));
        assert_eq!(ctx.errors().len(), 1);
    }

    #[test]
    fn test_pipeline_continues_when_abort_on_error_false() {
        let pipeline = Pipeline::new()
            .abort_on_error(false)
            .add_stage(FailingStage)
            .add_stage(OkStage("after"));
        let mut ctx = ProcessingContext::new(AbortSignal::new());
        let result = pipeline.execute(&mut ctx);
        assert!(result.is_ok());
        assert!(ctx.has_shared_data("after"));
    }

    struct CountingStage {
        name: &'static str,
        calls: Arc<AtomicUsize>,
    }
    impl Stage for CountingStage {
        fn name(&self) -> &str {
            self.name
        }
        fn execute(&self, ctx: &mut ProcessingContext) -> Result<(), PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ctx.set_shared_data("output", 42).unwrap();
            Ok(())
        }
    }

    #[test]
    fn test_cache_middleware_short_circuits_repeat_stage_execute() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .use_middleware(CacheMiddleware::new())
            .add_stage(CountingStage { name: "count", calls: calls.clone() });

        let mut ctx1 = ProcessingContext::new(AbortSignal::new());
        pipeline.execute(&mut ctx1).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctx1.get_shared_data::<i64>("output").unwrap(), 42);

        let mut ctx2 = ProcessingContext::new(AbortSignal::new());
        pipeline.execute(&mut ctx2).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1, "cache hit must skip stage.execute, not just record after it");
        assert_eq!(ctx2.get_shared_data::<i64>("output").unwrap(), 42);
    }

    #[test]
    fn test_pipeline_respects_cancellation() {
        let pipeline = Pipeline::new().add_stage(OkStage("a")).add_stage(OkStage("b"));
        let signal = AbortSignal::new();
        signal.cancel();
        let mut ctx = ProcessingContext::new(signal);
        let result = pipeline.execute(&mut ctx);
        assert!(matches!(result, Err(PipelineError::Cancelled { .. })));
    }
}
