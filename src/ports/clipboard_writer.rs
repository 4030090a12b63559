use crate::domain::AppError;

/// Port for placing an exported report on the system clipboard.
pub trait ClipboardWriter {
    /// Replace the clipboard contents with `text`.
    fn write_text(&mut self, text: &str) -> Result<(), AppError>;
}
