//! Pipeline types and trait definitions.

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;

/// What a failing step does to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepPolicy {
    /// Failure stops the run
    #[default]
    Fatal,
    /// Failure is logged and the run continues
    Advisory,
}

/// Lifecycle of a step within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Pending,
    Running,
    /// `enabled` returned false, the action never ran
    Skipped,
    Succeeded,
    Failed,
    /// An advisory step failed and the run went on
    Tolerated,
}

impl StepState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StepState::Pending | StepState::Running)
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepState::Pending => "pending",
            StepState::Running => "running",
            StepState::Skipped => "skipped",
            StepState::Succeeded => "succeeded",
            StepState::Failed => "failed",
            StepState::Tolerated => "tolerated",
        };
        f.write_str(s)
    }
}

/// Output sink handed to a running step
///
/// Lines written here are kept with the step's report for display. A step can
/// also replace its own title.
#[derive(Debug, Clone, Default)]
pub struct StepOutput {
    lines: Vec<String>,
    title: Option<String>,
}

impl StepOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line of output
    pub fn write(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Replace the step title shown for this run
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Vec<String>) {
        (self.title, self.lines)
    }
}

/// What happened to one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub title: String,
    pub state: StepState,
    pub output: Vec<String>,
}

/// One unit of pipeline work over a shared context `C`
#[async_trait]
pub trait Step<C: Send>: Send + Sync {
    /// Display label
    fn title(&self) -> &str;

    /// Whether the step runs, given the context as left by earlier steps
    fn enabled(&self, _ctx: &C) -> bool {
        true
    }

    /// Failure policy of this step
    fn policy(&self) -> StepPolicy {
        StepPolicy::Fatal
    }

    /// Do the work
    async fn run(&self, ctx: &mut C, output: &mut StepOutput) -> Result<()>;
}

/// Receives every step state transition, in order
pub trait PipelineObserver: Send {
    fn on_transition(&mut self, index: usize, report: &StepReport);
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_transition(&mut self, _index: usize, _report: &StepReport) {}
}
