pub mod context;
pub mod failure;
pub mod path;
pub mod process;
mod stream;

pub use context::{ContextError, ToolContext};
pub use failure::{describe_failure, ProcessFailure};
pub use process::{
    run_with_no_output, run_with_output, run_with_output_and_return, Captured, CommandRunner,
    Invocation, OutputPolicy, RunOutcome, SystemRunner,
};
