use super::Workbench;
use crate::kernel::services::adapters::WorkspaceWatcher;
use crate::kernel::services::ports::{DirHandle, Permission};
use crate::kernel::{Action as KernelAction, Effect as KernelEffect};

impl Workbench {
    pub(super) fn dispatch_kernel(&mut self, action: KernelAction) -> bool {
        let result = self.store.dispatch(action);
        for effect in result.effects {
            self.run_effect(effect);
        }
        result.state_changed
    }

    fn run_effect(&mut self, effect: KernelEffect) {
        match effect {
            KernelEffect::LoadRoot { request, location } => {
                self.runtime.load_root(request, location)
            }
            KernelEffect::LoadTree { epoch, root } => self.runtime.load_tree(epoch, root),
            KernelEffect::ReadFile {
                epoch,
                path,
                handle,
            } => self.runtime.read_file(epoch, path, handle),
            KernelEffect::WriteFiles {
                epoch,
                batch,
                writes,
            } => self.runtime.write_files(epoch, batch, writes),
            KernelEffect::CreateFile {
                epoch,
                root,
                target,
                initial_content,
            } => self
                .runtime
                .create_file(epoch, root, target, initial_content),
            KernelEffect::WatchRoot(root) => self.watch_root(&root),
            KernelEffect::BindEditor { name, text } => self.editor.bind_document(&name, &text),
            KernelEffect::UnbindEditor => self.editor.unbind(),
            KernelEffect::Notify(notice) => self.notifier.notify(&notice),
            KernelEffect::SetStatus(text) => self.notifier.set_status(&text),
        }
    }

    fn watch_root(&mut self, root: &DirHandle) {
        self.watcher = None;
        if !self.watch_workspace {
            return;
        }
        match WorkspaceWatcher::new(root.location()) {
            Ok(watcher) => self.watcher = Some(watcher),
            Err(e) => {
                tracing::warn!(root = %root.location().display(), error = %e, "workspace watcher unavailable")
            }
        }
    }

    /// Asked on the caller's thread so the host can show its own prompt.
    pub(super) fn request_write_permission(&self) -> Permission {
        match self.store.state().session() {
            Some(session) => self
                .runtime
                .file_system()
                .request_write_permission(&session.root),
            None => Permission::Denied,
        }
    }
}
