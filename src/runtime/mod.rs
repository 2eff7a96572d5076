//! Processes the workspace reaches out to
//!
//! Both seams are traits so tests can substitute canned listings and record
//! executed command strings instead of spawning anything.

pub mod process;

pub use process::{CaseRunner, ShellRunner, StaticToolLister, ToolLister, UvToolLister};
