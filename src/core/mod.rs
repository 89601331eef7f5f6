//! 核心框架模块
//!
//! - Command: 语义命令
//! - Event: 按键定义

pub mod command;
pub mod event;

pub use command::Command;
pub use event::Key;
