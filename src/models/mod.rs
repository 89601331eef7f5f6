//! 数据模型层

pub mod file_tree;
pub mod new_file;
pub mod open_files;

pub use file_tree::{
    build_file_tree, compare_entries, FileTree, FileTreeError, FileTreeRow, NodeId, NodeKind,
    TreeFilter,
};
pub use new_file::{NewFilePath, NewFilePathError};
pub use open_files::{CloseError, OpenFileRecord, OpenFiles, OpenRequest, PendingWrite};
