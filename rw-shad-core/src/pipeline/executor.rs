//! Pipeline execution engine.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::{NoopObserver, PipelineObserver, Step, StepOutput, StepPolicy, StepReport, StepState};
use crate::error::ShadError;

/// Ordered list of steps sharing one context
pub struct Pipeline<C: Send> {
    steps: Vec<Box<dyn Step<C>>>,
}

/// A completed run
#[derive(Debug)]
pub struct PipelineRun<C> {
    /// Context as left by the last step
    pub context: C,
    /// One report per step, in order
    pub reports: Vec<StepReport>,
}

/// A run stopped by a fatal step failure
#[derive(Debug, Error)]
#[error("{source}")]
pub struct PipelineError {
    /// Position of the failing step
    pub index: usize,
    /// Title of the failing step
    pub title: String,
    /// Error returned by the step
    pub source: ShadError,
    /// Reports of every step that reached a terminal state
    pub reports: Vec<StepReport>,
}

impl PipelineError {
    /// Exit code carried by the underlying error, if any
    pub fn exit_code(&self) -> Option<i32> {
        self.source.exit_code()
    }
}

impl<C: Send> Default for Pipeline<C> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<C: Send> Pipeline<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step to the pipeline
    pub fn add_step(mut self, step: impl Step<C> + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Titles of all steps, in order
    pub fn titles(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.title()).collect()
    }

    /// Run every step in order against `ctx`
    pub async fn run(&self, ctx: C) -> Result<PipelineRun<C>, PipelineError> {
        self.run_with_observer(ctx, &mut NoopObserver).await
    }

    /// Run every step in order, reporting each state transition to `observer`
    ///
    /// A step whose `enabled` predicate is false is skipped without running.
    /// The first fatal failure stops the run: later steps never execute and
    /// the context is dropped. Advisory failures are recorded and the run
    /// continues.
    pub async fn run_with_observer(
        &self,
        mut ctx: C,
        observer: &mut dyn PipelineObserver,
    ) -> Result<PipelineRun<C>, PipelineError> {
        info!("Starting pipeline with {} steps", self.steps.len());

        let mut reports = Vec::with_capacity(self.steps.len());

        for (idx, step) in self.steps.iter().enumerate() {
            if !step.enabled(&ctx) {
                debug!("Skipping step {}/{}: {}", idx + 1, self.steps.len(), step.title());
                let report = StepReport {
                    title: step.title().to_string(),
                    state: StepState::Skipped,
                    output: Vec::new(),
                };
                observer.on_transition(idx, &report);
                reports.push(report);
                continue;
            }

            info!("Running step {}/{}: {}", idx + 1, self.steps.len(), step.title());
            observer.on_transition(
                idx,
                &StepReport {
                    title: step.title().to_string(),
                    state: StepState::Running,
                    output: Vec::new(),
                },
            );

            let mut output = StepOutput::new();
            let result = step.run(&mut ctx, &mut output).await;
            let (title, lines) = output.into_parts();
            let title = title.unwrap_or_else(|| step.title().to_string());

            match result {
                Ok(()) => {
                    let report = StepReport {
                        title,
                        state: StepState::Succeeded,
                        output: lines,
                    };
                    observer.on_transition(idx, &report);
                    reports.push(report);
                }
                Err(e) if step.policy() == StepPolicy::Advisory => {
                    warn!("Advisory step '{}' failed, continuing: {}", title, e);
                    let mut lines = lines;
                    lines.push(e.to_string());
                    let report = StepReport {
                        title,
                        state: StepState::Tolerated,
                        output: lines,
                    };
                    observer.on_transition(idx, &report);
                    reports.push(report);
                }
                Err(e) => {
                    debug!("Step '{}' failed: {}", title, e);
                    let report = StepReport {
                        title: title.clone(),
                        state: StepState::Failed,
                        output: lines,
                    };
                    observer.on_transition(idx, &report);
                    reports.push(report);

                    return Err(PipelineError {
                        index: idx,
                        title,
                        source: e,
                        reports,
                    });
                }
            }
        }

        info!("Pipeline completed successfully");
        Ok(PipelineRun { context: ctx, reports })
    }
}
