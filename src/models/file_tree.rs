//! 文件树数据模型
//!
//! 只收录 markdown 文件和非隐藏目录；兄弟节点按“目录优先、名称次之”排序。

use crate::kernel::services::ports::{
    DirEntry, DirHandle, EntryHandle, EntryKind, FileHandle, FileResult, FileSystem, Settings,
};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{new_key_type, SlotMap};
use std::cmp::Ordering;
use std::fmt;

new_key_type! { pub struct NodeId; }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
}

impl From<EntryKind> for NodeKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::File => NodeKind::File,
            EntryKind::Directory => NodeKind::Dir,
        }
    }
}

#[derive(Debug)]
pub enum FileTreeError {
    ParentNotDirectory,
    NameExists,
    InvalidNodeId,
}

impl fmt::Display for FileTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileTreeError::ParentNotDirectory => write!(f, "parent is not a directory"),
            FileTreeError::NameExists => write!(f, "name already exists in parent"),
            FileTreeError::InvalidNodeId => write!(f, "invalid node id"),
        }
    }
}

impl std::error::Error for FileTreeError {}

/// Which directory entries make it into the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFilter {
    pub markdown_extension: String,
    pub hidden_marker: char,
}

impl TreeFilter {
    pub fn new(markdown_extension: impl Into<String>, hidden_marker: char) -> Self {
        let markdown_extension = markdown_extension.into();
        let markdown_extension = markdown_extension.trim_start_matches('.').to_string();
        Self {
            markdown_extension,
            hidden_marker,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.markdown_extension.as_str(), settings.hidden_marker)
    }

    /// `.md` for the default extension.
    pub fn suffix(&self) -> String {
        format!(".{}", self.markdown_extension)
    }

    pub fn is_markdown(&self, name: &str) -> bool {
        name.ends_with(&self.suffix())
    }

    pub fn is_hidden_dir(&self, name: &str) -> bool {
        name.starts_with(self.hidden_marker)
    }

    pub fn admits(&self, entry: &DirEntry) -> bool {
        match entry.kind() {
            EntryKind::Directory => !self.is_hidden_dir(&entry.name),
            EntryKind::File => self.is_markdown(&entry.name),
        }
    }
}

impl Default for TreeFilter {
    fn default() -> Self {
        Self::new("md", '.')
    }
}

/// Directories before files, then case-insensitive by name. Names that only
/// differ in case put the lowercase spelling first.
pub fn compare_entries(a_kind: NodeKind, a_name: &str, b_kind: NodeKind, b_name: &str) -> Ordering {
    match (a_kind, b_kind) {
        (NodeKind::Dir, NodeKind::File) => Ordering::Less,
        (NodeKind::File, NodeKind::Dir) => Ordering::Greater,
        _ => a_name
            .to_lowercase()
            .cmp(&b_name.to_lowercase())
            .then_with(|| b_name.cmp(a_name)),
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    name: String,
    path: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    handle: EntryHandle,
}

#[derive(Debug, Clone)]
pub struct FileTree {
    arena: SlotMap<NodeId, Node>,
    root: NodeId,
    expanded: FxHashSet<NodeId>,
    selected: Option<NodeId>,
    id_by_path: FxHashMap<String, NodeId>,
}

impl FileTree {
    pub fn new_with_root(root: DirHandle) -> Self {
        let mut arena = SlotMap::with_key();
        let root_id = arena.insert(Node {
            kind: NodeKind::Dir,
            name: root.name(),
            path: String::new(),
            parent: None,
            children: Vec::new(),
            handle: EntryHandle::Directory(root),
        });

        let mut expanded = FxHashSet::default();
        expanded.insert(root_id);

        Self {
            arena,
            root: root_id,
            expanded,
            selected: None,
            id_by_path: FxHashMap::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_name(&self) -> &str {
        self.arena
            .get(self.root)
            .map(|n| n.name.as_str())
            .unwrap_or_default()
    }

    /// Inserts a child at its sorted position. New directories start expanded.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        name: String,
        handle: EntryHandle,
    ) -> Result<NodeId, FileTreeError> {
        let kind = match &handle {
            EntryHandle::File(_) => NodeKind::File,
            EntryHandle::Directory(_) => NodeKind::Dir,
        };

        let (path, position) = {
            let parent_ro = self.arena.get(parent).ok_or(FileTreeError::InvalidNodeId)?;
            if parent_ro.kind != NodeKind::Dir {
                return Err(FileTreeError::ParentNotDirectory);
            }
            let siblings = &parent_ro.children;
            if siblings
                .iter()
                .filter_map(|id| self.arena.get(*id))
                .any(|n| n.name == name)
            {
                return Err(FileTreeError::NameExists);
            }
            let position = siblings.partition_point(|id| {
                self.arena.get(*id).is_some_and(|n| {
                    compare_entries(n.kind, &n.name, kind, &name) == Ordering::Less
                })
            });
            let path = if parent_ro.path.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", parent_ro.path, name)
            };
            (path, position)
        };

        let id = self.arena.insert(Node {
            kind,
            name,
            path: path.clone(),
            parent: Some(parent),
            children: Vec::new(),
            handle,
        });

        self.arena
            .get_mut(parent)
            .ok_or(FileTreeError::InvalidNodeId)?
            .children
            .insert(position, id);
        self.id_by_path.insert(path, id);
        if kind == NodeKind::Dir {
            self.expanded.insert(id);
        }

        Ok(id)
    }

    pub fn find(&self, path: &str) -> Option<NodeId> {
        if path.is_empty() {
            return Some(self.root);
        }
        self.id_by_path.get(path).copied()
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id).map(|n| n.name.as_str())
    }

    pub fn path(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id).map(|n| n.path.as_str())
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.arena.get(id).map(|n| n.kind)
    }

    pub fn is_dir(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Dir)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    pub fn child_names(&self, id: NodeId) -> Vec<&str> {
        self.children(id)
            .iter()
            .filter_map(|child| self.name(*child))
            .collect()
    }

    pub fn file_handle(&self, path: &str) -> Option<&FileHandle> {
        let id = self.id_by_path.get(path)?;
        match &self.arena.get(*id)?.handle {
            EntryHandle::File(handle) => Some(handle),
            EntryHandle::Directory(_) => None,
        }
    }

    pub fn file_count(&self) -> usize {
        self.arena
            .values()
            .filter(|n| n.kind == NodeKind::File)
            .count()
    }

    pub fn toggle_expand(&mut self, id: NodeId) {
        if self.is_dir(id) && !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    pub fn expand(&mut self, id: NodeId) {
        if self.is_dir(id) {
            self.expanded.insert(id);
        }
    }

    pub fn collapse(&mut self, id: NodeId) {
        self.expanded.remove(&id);
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    /// Returns false when `path` is not a directory in this tree.
    pub fn toggle_path(&mut self, path: &str) -> bool {
        match self.find(path) {
            Some(id) if id != self.root && self.is_dir(id) => {
                self.toggle_expand(id);
                true
            }
            _ => false,
        }
    }

    pub fn collapsed_paths(&self) -> Vec<String> {
        self.arena
            .iter()
            .filter(|(id, n)| n.kind == NodeKind::Dir && !self.expanded.contains(id))
            .map(|(_, n)| n.path.clone())
            .collect()
    }

    pub fn collapse_paths<'a>(&mut self, paths: impl IntoIterator<Item = &'a str>) {
        for path in paths {
            if let Some(id) = self.find(path) {
                if id != self.root {
                    self.collapse(id);
                }
            }
        }
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn selected_path(&self) -> Option<&str> {
        self.selected.and_then(|id| self.path(id))
    }

    /// Highlights the file at `path`; `None` or an unknown path clears the
    /// highlight. Returns whether the highlight moved.
    pub fn select_path(&mut self, path: Option<&str>) -> bool {
        let next = path
            .and_then(|p| self.find(p))
            .filter(|id| *id != self.root);
        let changed = next != self.selected;
        self.selected = next;
        changed
    }
}

#[derive(Debug, Clone)]
pub struct FileTreeRow {
    pub id: NodeId,
    pub depth: u16,
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub is_expanded: bool,
    pub is_selected: bool,
}

impl FileTree {
    /// Visible rows in display order; children of collapsed directories are skipped.
    pub fn flatten_for_view(&self) -> Vec<FileTreeRow> {
        let mut result = Vec::new();
        let mut stack: Vec<(NodeId, u16)> = vec![(self.root, 0)];

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };

            if id != self.root {
                result.push(FileTreeRow {
                    id,
                    depth,
                    name: node.name.clone(),
                    path: node.path.clone(),
                    is_dir: node.kind == NodeKind::Dir,
                    is_expanded: self.expanded.contains(&id),
                    is_selected: self.selected == Some(id),
                });
            }

            if self.expanded.contains(&id) {
                let child_depth = if id == self.root { 0 } else { depth + 1 };
                for child in node.children.iter().rev() {
                    stack.push((*child, child_depth));
                }
            }
        }

        result
    }
}

/// Walks `root` through the adapter. Any enumeration failure, including one in
/// a subdirectory, fails the whole build.
pub fn build_file_tree(
    fs: &dyn FileSystem,
    root: &DirHandle,
    filter: &TreeFilter,
) -> FileResult<FileTree> {
    let mut tree = FileTree::new_with_root(root.clone());
    let root_id = tree.root();
    populate(&mut tree, fs, root_id, root, filter)?;
    Ok(tree)
}

fn populate(
    tree: &mut FileTree,
    fs: &dyn FileSystem,
    parent: NodeId,
    dir: &DirHandle,
    filter: &TreeFilter,
) -> FileResult<()> {
    let entries = fs.enumerate(dir)?;
    for entry in entries {
        if !filter.admits(&entry) {
            continue;
        }

        let DirEntry { name, handle } = entry;
        let sub_dir = match &handle {
            EntryHandle::Directory(sub) => Some(sub.clone()),
            EntryHandle::File(_) => None,
        };

        let id = match tree.insert_child(parent, name, handle) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(dir = %dir.location().display(), error = %e, "skip tree entry");
                continue;
            }
        };

        if let Some(sub) = sub_dir {
            populate(tree, fs, id, &sub, filter)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/models/file_tree.rs"]
mod tests;
