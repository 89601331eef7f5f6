//! Service ports: traits + data contracts.

pub mod editor;
pub mod file;
pub mod prompt;
pub mod settings;

pub use editor::{EditorBridge, EditorEvent};
pub use file::{
    CreatedFile, DirEntry, DirHandle, EntryHandle, EntryKind, FileError, FileHandle, FileSystem,
    Permission, Result as FileResult,
};
pub use prompt::{Confirm, Confirmation, Notifier};
pub use settings::{KeybindingRule, Settings};
