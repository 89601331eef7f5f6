use crate::kernel::services::ports::{DirHandle, FileHandle};
use crate::models::{NewFilePath, PendingWrite};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// A user-visible message (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warn,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Effect {
    LoadRoot {
        request: u64,
        location: PathBuf,
    },
    LoadTree {
        epoch: u64,
        root: DirHandle,
    },
    ReadFile {
        epoch: u64,
        path: String,
        handle: FileHandle,
    },
    /// Written sequentially, one `FileSaved` per entry.
    WriteFiles {
        epoch: u64,
        batch: u64,
        writes: Vec<PendingWrite>,
    },
    CreateFile {
        epoch: u64,
        root: DirHandle,
        target: NewFilePath,
        initial_content: String,
    },
    WatchRoot(DirHandle),
    BindEditor {
        name: String,
        text: String,
    },
    UnbindEditor,
    Notify(Notice),
    SetStatus(String),
}
