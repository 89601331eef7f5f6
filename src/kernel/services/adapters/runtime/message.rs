use crate::kernel::services::ports::{DirHandle, FileHandle};
use crate::models::FileTree;
use std::path::PathBuf;

pub enum AppMessage {
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
    TreeLoaded {
        epoch: u64,
        tree: FileTree,
    },
    TreeLoadError {
        epoch: u64,
        error: String,
    },
    FileLoaded {
        epoch: u64,
        path: String,
        handle: FileHandle,
        content: String,
    },
    FileError {
        epoch: u64,
        path: String,
        error: String,
    },
    FileSaved {
        epoch: u64,
        batch: u64,
        path: String,
        content: String,
        error: Option<String>,
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
    AutosaveTick,
}
