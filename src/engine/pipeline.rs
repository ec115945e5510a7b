use tracing::debug;

use crate::error::AppError;
use crate::observability::metrics::Metrics;

/// One validation step. `Ok(())` hands the context to the next stage, an
/// error ends the request.
pub type Stage<C> = fn(&mut C) -> Result<(), AppError>;

/// Ordered validation stages in front of a terminal handler, all sharing one
/// request context.
pub struct Pipeline<'m, C> {
    resource: &'static str,
    metrics: &'m Metrics,
    stages: Vec<(&'static str, Stage<C>)>,
}

impl<'m, C> Pipeline<'m, C> {
    pub fn new(resource: &'static str, metrics: &'m Metrics) -> Self {
        Self {
            resource,
            metrics,
            stages: Vec::new(),
        }
    }

    pub fn stage(mut self, name: &'static str, stage: Stage<C>) -> Self {
        self.stages.push((name, stage));
        self
    }

    pub fn run<T>(
        self,
        ctx: &mut C,
        handler: impl FnOnce(&mut C) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        for (name, stage) in &self.stages {
            if let Err(err) = stage(ctx) {
                debug!(resource = self.resource, stage = *name, error = %err, "pipeline halted");
                self.metrics.observe_rejection(name);
                return Err(err);
            }
        }

        handler(ctx)
    }
}
