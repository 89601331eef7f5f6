//! 工作台模块：把宿主输入翻译成内核 Action，并执行内核产出的 Effect

use crate::core::Command;
use crate::kernel::services::adapters::{
    AppMessage, AsyncRuntime, KeybindingService, WorkspaceWatcher,
};
use crate::kernel::services::ports::{Confirm, EditorBridge, Notifier, Settings};
use crate::kernel::{Action as KernelAction, AppState, SaveTrigger, Store};
use crate::models::TreeFilter;
use std::time::Duration;

mod bridge;
mod input;
mod tick;

pub use input::KeyOutcome;

pub struct Workbench {
    store: Store,
    runtime: AsyncRuntime,
    editor: Box<dyn EditorBridge>,
    notifier: Box<dyn Notifier>,
    keybindings: KeybindingService,
    watcher: Option<WorkspaceWatcher>,
    watch_workspace: bool,
    should_quit: bool,
}

impl Workbench {
    pub fn new(
        runtime: AsyncRuntime,
        editor: Box<dyn EditorBridge>,
        confirm: Box<dyn Confirm>,
        notifier: Box<dyn Notifier>,
        settings: &Settings,
    ) -> Self {
        let state = AppState::new(TreeFilter::from_settings(settings));
        let mut keybindings = KeybindingService::new();
        keybindings.apply_rules(&settings.keybindings);

        if settings.autosave_interval_secs > 0 {
            runtime.spawn_autosave(Duration::from_secs(settings.autosave_interval_secs));
        } else {
            tracing::info!("autosave disabled");
        }

        Self {
            store: Store::new(state, confirm),
            runtime,
            editor,
            notifier,
            keybindings,
            watcher: None,
            watch_workspace: settings.watch_workspace,
            should_quit: false,
        }
    }

    pub fn handle_message(&mut self, msg: AppMessage) {
        let action = match msg {
            AppMessage::RootLoaded {
                request,
                root,
                tree,
            } => KernelAction::RootLoaded {
                request,
                root,
                tree,
            },
            AppMessage::RootLoadError {
                request,
                location,
                error,
            } => KernelAction::RootLoadError {
                request,
                location,
                error,
            },
            AppMessage::TreeLoaded { epoch, tree } => KernelAction::TreeLoaded { epoch, tree },
            AppMessage::TreeLoadError { epoch, error } => {
                KernelAction::TreeLoadError { epoch, error }
            }
            AppMessage::FileLoaded {
                epoch,
                path,
                handle,
                content,
            } => KernelAction::FileLoaded {
                epoch,
                path,
                handle,
                content,
            },
            AppMessage::FileError { epoch, path, error } => {
                KernelAction::FileLoadError { epoch, path, error }
            }
            AppMessage::FileSaved {
                epoch,
                batch,
                path,
                content,
                error,
            } => KernelAction::FileSaved {
                epoch,
                batch,
                path,
                content,
                error,
            },
            AppMessage::FileCreated {
                epoch,
                path,
                handle,
                content,
                created,
                tree,
            } => KernelAction::FileCreated {
                epoch,
                path,
                handle,
                content,
                created,
                tree,
            },
            AppMessage::CreateFailed { epoch, path, error } => {
                KernelAction::CreateFailed { epoch, path, error }
            }
            AppMessage::AutosaveTick => KernelAction::SaveAll {
                trigger: SaveTrigger::Timer,
            },
        };
        let _ = self.dispatch_kernel(action);
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn runtime(&self) -> &AsyncRuntime {
        &self.runtime
    }

    pub fn keybindings(&self) -> &KeybindingService {
        &self.keybindings
    }

    /// No root load, read, write or create is outstanding.
    pub fn is_idle(&self) -> bool {
        self.store.state().is_idle()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn run_command(&mut self, command: Command) -> bool {
        let action = match command {
            Command::OpenRoot(location) => KernelAction::OpenRoot { location },
            Command::RefreshTree => KernelAction::RefreshTree,
            Command::ToggleDir(path) => KernelAction::ToggleDir { path },
            Command::NewFile(input) => {
                let permission = self.request_write_permission();
                KernelAction::NewFile { input, permission }
            }
            Command::OpenFile(path) | Command::SwitchTab(path) => KernelAction::OpenFile { path },
            Command::Save(path) => KernelAction::SaveFile { path },
            Command::SaveAll => KernelAction::SaveAll {
                trigger: SaveTrigger::Manual,
            },
            Command::CloseTab(path) => KernelAction::CloseTab { path },
            Command::Quit => {
                self.should_quit = true;
                return true;
            }
            Command::Custom(name) => {
                tracing::debug!(command = %name, "no handler for command");
                return false;
            }
        };
        self.dispatch_kernel(action)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/app/workbench.rs"]
mod tests;
