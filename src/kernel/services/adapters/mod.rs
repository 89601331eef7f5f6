//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod file;
pub mod file_watcher;
pub mod keybinding;
pub mod paths;
pub mod runtime;
pub mod settings;

pub use file::LocalFileSystem;
#[cfg(any(test, feature = "test-util"))]
pub use file::MemoryFileSystem;
pub use file_watcher::WorkspaceWatcher;
pub use keybinding::KeybindingService;
pub use paths::{ensure_log_dir, get_app_data_dir, get_log_dir, get_settings_path};
pub use runtime::{AppMessage, AsyncRuntime};
pub use settings::{ensure_settings_file, load_settings, parse_keybinding};
