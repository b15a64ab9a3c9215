pub mod invocation;
pub mod process;

pub use invocation::{ExpectedOutput, ToolInvocation};
pub use process::{ExitOutcome, ExternalTool, ProcessTool, ToolOutput};
