use crate::kernel::effect::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Declined,
}

/// Synchronous yes/no prompt, used when closing a tab with unsaved changes.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> Confirmation;
}

/// User-visible toasts and the status line.
pub trait Notifier {
    fn notify(&mut self, notice: &Notice);

    fn set_status(&mut self, text: &str);
}
