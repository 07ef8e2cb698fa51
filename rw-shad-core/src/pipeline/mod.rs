//! Sequential task pipeline with a shared mutable context.
//!
//! Steps run strictly in order against one context value:
//! 1. `enabled(ctx)` false → the step is skipped
//! 2. otherwise the step runs with an output sink
//! 3. success → next step
//! 4. failure of a fatal step → the run stops and the error is returned,
//!    annotated with the failing step; advisory failures are tolerated
//!
//! There is no retry and no rollback. Steps touch the filesystem and installed
//! packages, recovery is re-running the command.

mod executor;
mod types;

pub use executor::{Pipeline, PipelineError, PipelineRun};
pub use types::{NoopObserver, PipelineObserver, Step, StepOutput, StepPolicy, StepReport, StepState};
