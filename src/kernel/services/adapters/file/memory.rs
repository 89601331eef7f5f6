//! 内存文件系统 Provider
//!
//! 不落盘的 FileSystem 实现：可注入读写失败、拒绝写权限，并统计读写次数。

use crate::kernel::services::ports::file::{
    CreatedFile, DirEntry, DirHandle, FileError, FileHandle, FileSystem, Permission, Result,
};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum MemNode {
    File(String),
    Dir,
}

#[derive(Default)]
struct Faults {
    reads: FxHashSet<PathBuf>,
    writes: FxHashSet<PathBuf>,
    write_panics: FxHashSet<PathBuf>,
    enumerates: FxHashSet<PathBuf>,
    deny_permission: bool,
}

pub struct MemoryFileSystem {
    nodes: Mutex<BTreeMap<PathBuf, MemNode>>,
    faults: Mutex<Faults>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

fn injected(kind: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("injected {kind} failure"))
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self {
            nodes: Mutex::new(BTreeMap::new()),
            faults: Mutex::new(Faults::default()),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Adds a file, creating missing parent directories.
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        self.insert_file(path, content);
        self
    }

    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        self.insert_dir(path);
        self
    }

    pub fn insert_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            self.insert_dir(parent);
        }
        self.lock_nodes()
            .insert(path, MemNode::File(content.to_string()));
    }

    pub fn insert_dir(&self, path: impl AsRef<Path>) {
        let mut nodes = self.lock_nodes();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(MemNode::Dir);
        }
    }

    /// Removes a node and everything below it.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.lock_nodes().retain(|p, _| !p.starts_with(path));
    }

    pub fn file_content(&self, path: impl AsRef<Path>) -> Option<String> {
        match self.lock_nodes().get(path.as_ref()) {
            Some(MemNode::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        matches!(self.lock_nodes().get(path.as_ref()), Some(MemNode::Dir))
    }

    pub fn fail_reads(&self, path: impl AsRef<Path>) {
        self.lock_faults().reads.insert(path.as_ref().to_path_buf());
    }

    pub fn fail_writes(&self, path: impl AsRef<Path>) {
        self.lock_faults().writes.insert(path.as_ref().to_path_buf());
    }

    /// The next write to `path` panics inside the adapter.
    pub fn panic_on_write(&self, path: impl AsRef<Path>) {
        self.lock_faults()
            .write_panics
            .insert(path.as_ref().to_path_buf());
    }

    pub fn fail_enumerate(&self, path: impl AsRef<Path>) {
        self.lock_faults()
            .enumerates
            .insert(path.as_ref().to_path_buf());
    }

    pub fn clear_faults(&self) {
        *self.lock_faults() = Faults::default();
    }

    pub fn deny_permission(&self, deny: bool) {
        self.lock_faults().deny_permission = deny;
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock_nodes(&self) -> std::sync::MutexGuard<'_, BTreeMap<PathBuf, MemNode>> {
        self.nodes.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemoryFileSystem {
    fn open_root(&self, location: &Path) -> Result<DirHandle> {
        match self.lock_nodes().get(location) {
            Some(MemNode::Dir) => Ok(DirHandle::new(location)),
            Some(MemNode::File(_)) => Err(FileError::NotADirectory(location.to_path_buf())),
            None => Err(FileError::Read {
                path: location.to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }

    fn enumerate(&self, dir: &DirHandle) -> Result<Vec<DirEntry>> {
        let path = dir.location();
        if self.lock_faults().enumerates.contains(path) {
            return Err(FileError::Enumerate {
                path: path.to_path_buf(),
                source: injected("enumerate"),
            });
        }

        let nodes = self.lock_nodes();
        if !matches!(nodes.get(path), Some(MemNode::Dir)) {
            return Err(FileError::NotADirectory(path.to_path_buf()));
        }

        let entries = nodes
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .filter_map(|(p, node)| {
                let name = p.file_name()?.to_string_lossy().to_string();
                Some(match node {
                    MemNode::File(_) => DirEntry::file(name, FileHandle::new(p.clone())),
                    MemNode::Dir => DirEntry::directory(name, DirHandle::new(p.clone())),
                })
            })
            // reverse name order so callers cannot rely on adapter ordering
            .rev()
            .collect();
        Ok(entries)
    }

    fn read_text(&self, file: &FileHandle) -> Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let path = file.location();
        if self.lock_faults().reads.contains(path) {
            return Err(FileError::Read {
                path: path.to_path_buf(),
                source: injected("read"),
            });
        }
        match self.lock_nodes().get(path) {
            Some(MemNode::File(content)) => Ok(content.clone()),
            _ => Err(FileError::Read {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }

    fn write_text_atomic(&self, file: &FileHandle, text: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let path = file.location();
        if self.lock_faults().write_panics.remove(path) {
            panic!("injected write panic for {}", path.display());
        }
        if self.lock_faults().writes.contains(path) {
            return Err(FileError::Write {
                path: path.to_path_buf(),
                source: injected("write"),
            });
        }
        let mut nodes = self.lock_nodes();
        match nodes.get_mut(path) {
            Some(MemNode::File(content)) => {
                *content = text.to_string();
                Ok(())
            }
            _ => Err(FileError::StaleHandle(path.to_path_buf())),
        }
    }

    fn create_file(&self, dir: &DirHandle, name: &str) -> Result<CreatedFile> {
        let path = dir.location().join(name);
        let mut nodes = self.lock_nodes();
        match nodes.get(&path) {
            Some(MemNode::File(_)) => Ok(CreatedFile {
                handle: FileHandle::new(path),
                created: false,
            }),
            Some(MemNode::Dir) => Err(FileError::Create {
                path,
                source: io::Error::from(io::ErrorKind::AlreadyExists),
            }),
            None => {
                nodes.insert(path.clone(), MemNode::File(String::new()));
                Ok(CreatedFile {
                    handle: FileHandle::new(path),
                    created: true,
                })
            }
        }
    }

    fn create_directory(&self, dir: &DirHandle, name: &str) -> Result<DirHandle> {
        let path = dir.location().join(name);
        let mut nodes = self.lock_nodes();
        match nodes.get(&path) {
            Some(MemNode::Dir) => Ok(DirHandle::new(path)),
            Some(MemNode::File(_)) => Err(FileError::Create {
                path,
                source: io::Error::from(io::ErrorKind::AlreadyExists),
            }),
            None => {
                nodes.insert(path.clone(), MemNode::Dir);
                Ok(DirHandle::new(path))
            }
        }
    }

    fn request_write_permission(&self, _root: &DirHandle) -> Permission {
        if self.lock_faults().deny_permission {
            Permission::Denied
        } else {
            Permission::Granted
        }
    }
}
