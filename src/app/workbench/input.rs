use super::Workbench;
use crate::core::event::Key;
use crate::kernel::services::ports::EditorEvent;
use crate::kernel::Action as KernelAction;

/// Whether the host should suppress its own handling of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    Ignored,
}

impl KeyOutcome {
    pub fn is_consumed(self) -> bool {
        self == KeyOutcome::Consumed
    }
}

impl Workbench {
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let Some(command) = self.keybindings.resolve(&key).cloned() else {
            return KeyOutcome::Ignored;
        };
        tracing::debug!(command = command.name(), "key bound");
        let _ = self.run_command(command);
        KeyOutcome::Consumed
    }

    pub fn handle_editor_event(&mut self, event: EditorEvent) -> bool {
        let action = match event {
            EditorEvent::ContentChanged(text) => KernelAction::EditorContentChanged { text },
            EditorEvent::UserClosedDocument => KernelAction::EditorClosed,
        };
        self.dispatch_kernel(action)
    }
}
