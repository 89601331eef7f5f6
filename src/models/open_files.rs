//! 已打开文件表：路径 → 文件记录
//!
//! 每个路径至多一条记录（包括正在读取中的路径）；迭代顺序即插入顺序，也就是标签页顺序。

use crate::kernel::services::ports::{Confirmation, FileHandle};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone)]
pub struct OpenFileRecord {
    handle: FileHandle,
    content: String,
    saved_content: String,
}

impl OpenFileRecord {
    pub fn new(handle: FileHandle, content: String) -> Self {
        Self {
            handle,
            saved_content: content.clone(),
            content,
        }
    }

    pub fn handle(&self) -> &FileHandle {
        &self.handle
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn saved_content(&self) -> &str {
        &self.saved_content
    }

    /// Derived on every call; never cached.
    pub fn is_dirty(&self) -> bool {
        self.content != self.saved_content
    }
}

/// What `begin_open` decided for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenRequest {
    /// Already open; activate without re-reading.
    Activate,
    /// A read for this path is in flight.
    InFlight,
    /// Caller must read the file and call `finish_open`.
    Load,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CloseError {
    #[error("file is not open")]
    NotOpen,
    #[error("close cancelled: unsaved changes kept")]
    ConfirmationDeclined,
}

/// A snapshot handed to the writer; `content` is what lands on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub path: String,
    pub handle: FileHandle,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct OpenFiles {
    records: FxHashMap<String, OpenFileRecord>,
    order: Vec<String>,
    loading: FxHashSet<String>,
}

impl OpenFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_open(&mut self, path: &str) -> OpenRequest {
        if self.records.contains_key(path) {
            return OpenRequest::Activate;
        }
        if !self.loading.insert(path.to_string()) {
            return OpenRequest::InFlight;
        }
        OpenRequest::Load
    }

    /// Inserts the record for a completed read. Returns false (and leaves the
    /// existing record untouched) when the path is already open.
    pub fn finish_open(&mut self, path: &str, handle: FileHandle, content: String) -> bool {
        self.loading.remove(path);
        if self.records.contains_key(path) {
            return false;
        }
        self.records
            .insert(path.to_string(), OpenFileRecord::new(handle, content));
        self.order.push(path.to_string());
        true
    }

    pub fn abort_open(&mut self, path: &str) {
        self.loading.remove(path);
    }

    pub fn is_loading(&self, path: &str) -> bool {
        self.loading.contains(path)
    }

    pub fn has_loading(&self) -> bool {
        !self.loading.is_empty()
    }

    /// Replaces the content; returns the new dirty flag, or `None` if the path
    /// is not open.
    pub fn update(&mut self, path: &str, content: String) -> Option<bool> {
        let record = self.records.get_mut(path)?;
        record.content = content;
        Some(record.is_dirty())
    }

    /// Removes the record. A dirty record asks `confirm` first and stays open
    /// when declined.
    pub fn close(
        &mut self,
        path: &str,
        confirm: impl FnOnce(&OpenFileRecord) -> Confirmation,
    ) -> Result<OpenFileRecord, CloseError> {
        let record = self.records.get(path).ok_or(CloseError::NotOpen)?;
        if record.is_dirty() && confirm(record) == Confirmation::Declined {
            return Err(CloseError::ConfirmationDeclined);
        }

        self.order.retain(|p| p != path);
        self.records.remove(path).ok_or(CloseError::NotOpen)
    }

    /// Snapshot for a write, or `None` when there is nothing to persist.
    pub fn begin_persist(&self, path: &str) -> Option<PendingWrite> {
        let record = self.records.get(path)?;
        if !record.is_dirty() {
            return None;
        }
        Some(PendingWrite {
            path: path.to_string(),
            handle: record.handle.clone(),
            content: record.content.clone(),
        })
    }

    /// Records that `written` is now on disk. Edits made after the snapshot
    /// keep the record dirty.
    pub fn finish_persist(&mut self, path: &str, written: &str) -> bool {
        let Some(record) = self.records.get_mut(path) else {
            return false;
        };
        record.saved_content = written.to_string();
        true
    }

    pub fn get(&self, path: &str) -> Option<&OpenFileRecord> {
        self.records.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.records.contains_key(path)
    }

    pub fn is_dirty(&self, path: &str) -> bool {
        self.records.get(path).is_some_and(|r| r.is_dirty())
    }

    /// Tab order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The most recently opened path.
    pub fn last_path(&self) -> Option<&str> {
        self.order.last().map(String::as_str)
    }

    pub fn dirty_paths(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|p| self.is_dirty(p))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/open_files.rs"]
mod tests;
