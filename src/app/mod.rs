//! 应用层：Workbench（控制器）与命令行宿主

pub mod shell;
pub mod workbench;

pub use shell::Shell;
pub use workbench::{KeyOutcome, Workbench};
