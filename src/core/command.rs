//! 命令系统：语义命令定义
//!
//! Command 只描述用户意图，不关心按键或输入来源。

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    // ==================== 工作区 ====================
    OpenRoot(PathBuf),
    RefreshTree,
    ToggleDir(String),

    // ==================== 文件操作 ====================
    NewFile(String),
    OpenFile(String),
    Save(String),
    SaveAll,

    // ==================== 标签页 ====================
    SwitchTab(String),
    CloseTab(String),

    // ==================== 系统操作 ====================
    Quit,

    // ==================== 扩展点 ====================
    Custom(String),
}

impl Command {
    pub fn name(&self) -> &str {
        match self {
            Command::OpenRoot(_) => "openRoot",
            Command::RefreshTree => "refreshTree",
            Command::ToggleDir(_) => "toggleDir",
            Command::NewFile(_) => "newFile",
            Command::OpenFile(_) => "openFile",
            Command::Save(_) => "save",
            Command::SaveAll => "saveAll",
            Command::SwitchTab(_) => "switchTab",
            Command::CloseTab(_) => "closeTab",
            Command::Quit => "quit",
            Command::Custom(name) => name.as_str(),
        }
    }

    /// Resolves payload-free commands by name; anything else becomes `Custom`.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "saveAll" | "save_all" => Command::SaveAll,
            "refreshTree" | "refresh_tree" => Command::RefreshTree,
            "quit" => Command::Quit,
            other => Command::Custom(other.to_string()),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Command::Custom(_))
    }
}
