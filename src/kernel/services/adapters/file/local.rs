//! 本地文件系统 Provider
//!
//! 实现 FileSystem trait，操作本地磁盘；写入采用“临时文件 + rename”原子替换。

use crate::kernel::services::ports::file::{
    CreatedFile, DirEntry, DirHandle, FileError, FileHandle, FileSystem, Permission, Result,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const TEMP_SUFFIX: &str = ".mdnest-tmp";

pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}{TEMP_SUFFIX}"))
}

pub fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|s| s.to_string_lossy().ends_with(TEMP_SUFFIX))
}

fn write_atomic(path: &Path, text: &str) -> io::Result<()> {
    let tmp_path = temp_sibling(path);
    if let Err(e) = fs::write(&tmp_path, text).and_then(|_| fs::rename(&tmp_path, path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

impl FileSystem for LocalFileSystem {
    fn open_root(&self, location: &Path) -> Result<DirHandle> {
        let absolute = location
            .canonicalize()
            .map_err(|source| FileError::Read {
                path: location.to_path_buf(),
                source,
            })?;
        if !absolute.is_dir() {
            return Err(FileError::NotADirectory(absolute));
        }
        Ok(DirHandle::new(absolute))
    }

    fn enumerate(&self, dir: &DirHandle) -> Result<Vec<DirEntry>> {
        let path = dir.location();
        let enumerate_err = |source| FileError::Enumerate {
            path: path.to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(path).map_err(enumerate_err)? {
            let entry = entry.map_err(enumerate_err)?;
            let file_type = entry.file_type().map_err(enumerate_err)?;
            let name = entry.file_name().to_string_lossy().to_string();
            let entry_path = entry.path();

            if file_type.is_dir() {
                entries.push(DirEntry::directory(name, DirHandle::new(entry_path)));
            } else if file_type.is_file() {
                entries.push(DirEntry::file(name, FileHandle::new(entry_path)));
            } else if file_type.is_symlink() {
                // follow the link once; dangling links are skipped
                match fs::metadata(&entry_path) {
                    Ok(meta) if meta.is_dir() => {
                        entries.push(DirEntry::directory(name, DirHandle::new(entry_path)))
                    }
                    Ok(meta) if meta.is_file() => {
                        entries.push(DirEntry::file(name, FileHandle::new(entry_path)))
                    }
                    _ => {}
                }
            }
        }

        Ok(entries)
    }

    fn read_text(&self, file: &FileHandle) -> Result<String> {
        fs::read_to_string(file.location()).map_err(|source| FileError::Read {
            path: file.location().to_path_buf(),
            source,
        })
    }

    fn write_text_atomic(&self, file: &FileHandle, text: &str) -> Result<()> {
        let path = file.location();
        // replace the link target, not the link
        let target = match fs::canonicalize(path) {
            Ok(target) if target.is_file() => target,
            _ => return Err(FileError::StaleHandle(path.to_path_buf())),
        };
        write_atomic(&target, text).map_err(|source| FileError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn create_file(&self, dir: &DirHandle, name: &str) -> Result<CreatedFile> {
        let path = dir.location().join(name);
        let create_err = |source| FileError::Create {
            path: path.clone(),
            source,
        };

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(_) => Ok(CreatedFile {
                handle: FileHandle::new(path.clone()),
                created: true,
            }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_file() => {
                Ok(CreatedFile {
                    handle: FileHandle::new(path.clone()),
                    created: false,
                })
            }
            Err(e) => Err(create_err(e)),
        }
    }

    fn create_directory(&self, dir: &DirHandle, name: &str) -> Result<DirHandle> {
        let path = dir.location().join(name);
        match fs::create_dir(&path) {
            Ok(()) => Ok(DirHandle::new(path)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => {
                Ok(DirHandle::new(path))
            }
            Err(source) => Err(FileError::Create { path, source }),
        }
    }

    fn request_write_permission(&self, root: &DirHandle) -> Permission {
        match fs::metadata(root.location()) {
            Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => Permission::Granted,
            _ => Permission::Denied,
        }
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/file/local.rs"]
mod tests;
