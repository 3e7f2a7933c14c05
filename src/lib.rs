//! # unonenote
//!
//! OneNote to Markdown conversion library for Rust.
//!
//! This library converts OneNote page documents (the outline XML model)
//! into Markdown files with YAML front matter, and mirrors a section's page
//! nesting into a matching directory tree.
//!
//! ## Quick Start
//!
//! ```
//! use unonenote::{convert_page_xml, RenderOptions};
//!
//! fn main() -> unonenote::Result<()> {
//!     let xml = r#"<one:Page xmlns:one="http://schemas.microsoft.com/office/onenote/2013/onenote">
//!       <one:QuickStyleDef index="0" name="PageTitle"/>
//!       <one:Title><one:OE quickStyleIndex="0"><one:T><![CDATA[Groceries]]></one:T></one:OE></one:Title>
//!     </one:Page>"#;
//!
//!     let page = convert_page_xml(xml, &RenderOptions::default())?;
//!     assert_eq!(page.artifact.relative_path, "Groceries.md");
//!     println!("{}", page.artifact.content());
//!     Ok(())
//! }
//! ```
//!
//! ## Exporting a section
//!
//! ```no_run
//! use unonenote::{DirectorySource, Exporter, FsWriter};
//!
//! let source = DirectorySource::open("notebook-export").unwrap();
//! let mut writer = FsWriter::new("markdown");
//! let report = Exporter::new(source)
//!     .export_section_by_name("Projects", &mut writer)
//!     .unwrap();
//! println!("{} pages written", report.pages_written.len());
//! ```
//!
//! ## Features
//!
//! - **Styles**: headings, citations and code from quick styles
//! - **Inline formatting**: bold, italic, underline, strikethrough, links
//! - **Lists and tags**: bullets, numbering, to-do checkboxes, tag glyphs
//! - **Tables**: pipe tables with a header separator
//! - **Images**: linked and written next to the page
//! - **Page nesting**: sub-pages exported into parent-named directories

pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod render;
pub mod sanitize;
pub mod source;
pub mod writer;

// Re-export commonly used types
pub use error::{Error, Result};
pub use export::{layout_section, Exporter, LayoutStep};
pub use model::{
    DocumentNode, MarkdownContent, NodeKind, PageArtifact, PageDescriptor, PageResource,
    QuickStyleDef, ResourceSource, StyleCatalog, TagDef, TagType,
};
pub use parser::parse_document;
pub use render::{
    convert_page, extract_span_text, ConversionStats, ConvertedPage, ExportReport,
    ListNumbering, RenderOptions,
};
pub use sanitize::sanitize_name;
pub use source::{DirectorySource, DocumentSource, HierarchyScope, MemorySource, ObjectKind};
pub use writer::{DirectoryStack, FsWriter, MemoryWriter, PageWriter};

use std::path::Path;

/// Convert a page XML document to Markdown.
///
/// The output file is named after the sanitized page title.
///
/// # Arguments
///
/// * `xml` - Page content XML
/// * `options` - Rendering options
pub fn convert_page_xml(xml: &str, options: &RenderOptions) -> Result<ConvertedPage> {
    let tree = parse_document(xml)?;
    convert_page(&tree, options, None)
}

/// Convert a page XML file to Markdown.
///
/// # Example
///
/// ```no_run
/// use unonenote::{convert_page_file, RenderOptions};
///
/// let page = convert_page_file("page.xml", &RenderOptions::default()).unwrap();
/// println!("{}", page.artifact.content());
/// ```
pub fn convert_page_file<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<ConvertedPage> {
    let xml = std::fs::read_to_string(path)?;
    convert_page_xml(&xml, options)
}

/// Convert a page XML document and return the full Markdown file content.
pub fn to_markdown(xml: &str, options: &RenderOptions) -> Result<String> {
    Ok(convert_page_xml(xml, options)?.artifact.content())
}
