//! 编辑器桥接：单文档编辑器组件的边界契约

/// The embedded editor widget. At most one document is bound at a time.
pub trait EditorBridge {
    fn bind_document(&mut self, name: &str, text: &str);

    fn unbind(&mut self);
}

/// Notifications flowing from the editor back into the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    ContentChanged(String),
    /// Informational only; the tab stays open.
    UserClosedDocument,
}
