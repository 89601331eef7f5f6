//! 文件系统 Port
//!
//! 内核只通过句柄访问宿主文件系统：枚举目录、读写文本、创建文件/目录、申请写权限。

use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, FileError>;

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("cannot create {}: {source}", path.display())]
    Create { path: PathBuf, source: io::Error },
    #[error("cannot list {}: {source}", path.display())]
    Enumerate { path: PathBuf, source: io::Error },
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("file no longer exists: {}", .0.display())]
    StaleHandle(PathBuf),
}

impl FileError {
    pub fn path(&self) -> &Path {
        match self {
            FileError::Read { path, .. }
            | FileError::Write { path, .. }
            | FileError::Create { path, .. }
            | FileError::Enumerate { path, .. } => path,
            FileError::NotADirectory(path) | FileError::StaleHandle(path) => path,
        }
    }
}

/// Opaque reference to a file owned by the adapter that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle {
    location: PathBuf,
}

impl FileHandle {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn name(&self) -> String {
        handle_name(&self.location)
    }
}

/// Opaque reference to a directory owned by the adapter that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirHandle {
    location: PathBuf,
}

impl DirHandle {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn name(&self) -> String {
        handle_name(&self.location)
    }
}

fn handle_name(location: &Path) -> String {
    location
        .file_name()
        .or_else(|| location.iter().next_back())
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryHandle {
    File(FileHandle),
    Directory(DirHandle),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub handle: EntryHandle,
}

impl DirEntry {
    pub fn file(name: impl Into<String>, handle: FileHandle) -> Self {
        Self {
            name: name.into(),
            handle: EntryHandle::File(handle),
        }
    }

    pub fn directory(name: impl Into<String>, handle: DirHandle) -> Self {
        Self {
            name: name.into(),
            handle: EntryHandle::Directory(handle),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self.handle {
            EntryHandle::File(_) => EntryKind::File,
            EntryHandle::Directory(_) => EntryKind::Directory,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedFile {
    pub handle: FileHandle,
    /// false when the file already existed.
    pub created: bool,
}

pub trait FileSystem: Send + Sync {
    /// Resolves a user-chosen location into a root handle.
    fn open_root(&self, location: &Path) -> Result<DirHandle>;

    /// Entries in adapter order; callers sort.
    fn enumerate(&self, dir: &DirHandle) -> Result<Vec<DirEntry>>;

    fn read_text(&self, file: &FileHandle) -> Result<String>;

    /// All-or-nothing replace. Must fail with `StaleHandle` instead of
    /// recreating a file that disappeared.
    fn write_text_atomic(&self, file: &FileHandle, text: &str) -> Result<()>;

    /// Idempotent.
    fn create_file(&self, dir: &DirHandle, name: &str) -> Result<CreatedFile>;

    /// Idempotent.
    fn create_directory(&self, dir: &DirHandle, name: &str) -> Result<DirHandle>;

    /// Must be called while handling a user-initiated command.
    fn request_write_permission(&self, root: &DirHandle) -> Permission;
}
