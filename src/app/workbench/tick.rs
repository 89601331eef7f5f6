use super::Workbench;
use crate::kernel::Action as KernelAction;

impl Workbench {
    /// Polls background sources that are not routed through `AppMessage`
    /// (called by the main loop).
    pub fn tick(&mut self) -> bool {
        self.poll_workspace_watcher()
    }

    fn poll_workspace_watcher(&mut self) -> bool {
        let Some(watcher) = self.watcher.as_mut() else {
            return false;
        };
        if !watcher.drain_changes() {
            return false;
        }
        tracing::debug!(root = %watcher.root().display(), "workspace changed");
        self.dispatch_kernel(KernelAction::RefreshTree)
    }
}
