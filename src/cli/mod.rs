mod command;
mod runner;

pub use command::{Command, RecordOp, ScriptSource};
pub use runner::{OutputMode, ScriptSummary, compile_request, run, run_script};
