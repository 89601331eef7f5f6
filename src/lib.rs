//! mdnest - 本地 Markdown 文件管理器核心
//!
//! 模块结构：
//! - core: 命令与按键（Command, Key）
//! - models: 数据模型（FileTree, OpenFiles, NewFilePath）
//! - kernel: 无头内核（Action → Store → Effect）以及 services（ports + adapters）
//! - app: 应用层（Workbench, Shell）

pub mod app;
pub mod core;
pub mod kernel;
pub mod models;
