//! Report exporters.

mod clipboard;
mod html;
mod markdown;
mod pdf;
mod sections;

pub use clipboard::copy_markdown;
pub use html::{render_html, write_html};
pub use markdown::{export_filename, render_markdown, write_markdown};
pub use pdf::{ADVISORY_LINE, NON_LATIN_PLACEHOLDER, render_pdf, write_pdf};
pub use sections::{RenderedSection, report_sections, section_blocks};
