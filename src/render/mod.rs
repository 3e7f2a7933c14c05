//! Rendering module for converting OneNote page trees to Markdown.

mod context;
mod inline;
mod options;
mod outline;
mod stats;

pub use context::{ConversionContext, PendingFragment, TableState};
pub use inline::{clean_nbsp_artifacts, convert_spans, convert_text_run, extract_span_text, SpanStyle};
pub use options::{ListNumbering, RenderOptions};
pub use outline::{convert_page, page_title, ConvertedPage, OutlineConverter};
pub use stats::{ConversionStats, ExportReport, FailedPage};
