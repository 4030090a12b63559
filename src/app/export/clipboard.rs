use crate::app::export::markdown::render_markdown;
use crate::app::session::Report;
use crate::domain::AppError;
use crate::ports::ClipboardWriter;

/// Copy the Markdown rendition of `report` through `clipboard`.
pub fn copy_markdown<C: ClipboardWriter + ?Sized>(
    report: &Report,
    clipboard: &mut C,
) -> Result<(), AppError> {
    let markdown = render_markdown(report)?;
    clipboard.write_text(&markdown)
}
