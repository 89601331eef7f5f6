//! 文件系统 Provider
//!
//! - local: 本地磁盘
//! - memory: 内存实现（仅测试，`test-util` feature）

pub mod local;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use local::LocalFileSystem;
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryFileSystem;
