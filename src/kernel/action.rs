use std::path::PathBuf;

use crate::kernel::services::ports::{DirHandle, FileHandle, Permission};
use crate::models::FileTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    Timer,
    Manual,
}

#[derive(Debug, Clone)]
pub enum Action {
    OpenRoot {
        location: PathBuf,
    },
    RootLoaded {
        request: u64,
        root: DirHandle,
        tree: FileTree,
    },
    RootLoadError {
        request: u64,
        location: PathBuf,
        error: String,
    },
    RefreshTree,
    TreeLoaded {
        epoch: u64,
        tree: FileTree,
    },
    TreeLoadError {
        epoch: u64,
        error: String,
    },
    ToggleDir {
        path: String,
    },
    OpenFile {
        path: String,
    },
    FileLoaded {
        epoch: u64,
        path: String,
        handle: FileHandle,
        content: String,
    },
    FileLoadError {
        epoch: u64,
        path: String,
        error: String,
    },
    CloseTab {
        path: String,
    },
    EditorContentChanged {
        text: String,
    },
    EditorClosed,
    SaveAll {
        trigger: SaveTrigger,
    },
    SaveFile {
        path: String,
    },
    FileSaved {
        epoch: u64,
        batch: u64,
        path: String,
        content: String,
        error: Option<String>,
    },
    NewFile {
        input: String,
        permission: Permission,
    },
    FileCreated {
        epoch: u64,
        path: String,
        handle: FileHandle,
        content: String,
        created: bool,
        tree: FileTree,
    },
    CreateFailed {
        epoch: u64,
        path: String,
        error: String,
    },
}
