//! Outline tree to Markdown conversion.
//!
//! [`OutlineConverter`] walks a page tree depth-first and appends Markdown
//! to an explicit output buffer. Block containers (pages, titles, outlines,
//! outline elements and their children lists, table cells) flush the
//! pending fragment when they end; other wrappers are transparent.

use std::mem;

use crate::error::{Error, Result};
use crate::model::{
    parse_timestamp, DocumentNode, MarkdownContent, NodeKind, PageArtifact, PageResource,
    ResourceSource, StyleCatalog, TagType,
};
use crate::sanitize::{sanitize_name, UNTITLED};

use super::context::ConversionContext;
use super::inline::{convert_text_run, extract_span_text};
use super::options::{ListNumbering, RenderOptions};
use super::stats::ConversionStats;

/// Result of converting one page.
#[derive(Debug, Clone)]
pub struct ConvertedPage {
    /// Finished page, ready for a writer
    pub artifact: PageArtifact,

    /// Images the body links to, relative to the page's directory
    pub resources: Vec<PageResource>,

    /// Statistics of this page
    pub stats: ConversionStats,
}

/// Recursive walker over one page tree.
pub struct OutlineConverter<'a> {
    ctx: ConversionContext<'a>,
}

impl<'a> OutlineConverter<'a> {
    /// Create a converter around a fresh page context.
    pub fn new(ctx: ConversionContext<'a>) -> Self {
        Self { ctx }
    }

    /// Convert `root` and return the raw body with the page's resources and statistics.
    pub fn convert(mut self, root: &DocumentNode) -> (String, Vec<PageResource>, ConversionStats) {
        let mut out = String::new();
        self.visit(root, 0, &mut out);
        let (resources, stats) = self.ctx.finish(&mut out);
        (out, resources, stats)
    }

    fn visit(&mut self, node: &DocumentNode, depth: usize, out: &mut String) {
        match node.kind() {
            NodeKind::OE => self.visit_element(node, depth, out),
            NodeKind::T => self.visit_text(node, out),
            NodeKind::Bullet => {
                if self.ctx.emit_item_marker(out, depth, "- ") {
                    self.ctx.stats.add_list_item();
                }
            }
            NodeKind::Number => {
                let marker = self.number_marker(node);
                if self.ctx.emit_item_marker(out, depth, &marker) {
                    self.ctx.stats.add_list_item();
                }
            }
            NodeKind::Tag => self.visit_tag(node, depth, out),
            NodeKind::Table => self.visit_table(node, depth, out),
            NodeKind::Column => self.ctx.table.column_count += 1,
            NodeKind::Row => self.visit_row(node, out),
            NodeKind::Image => self.visit_image(node, out),
            NodeKind::OEChildren => {
                self.visit_children(node, depth + 1, out);
                self.ctx.flush(out);
            }
            NodeKind::Page | NodeKind::Title | NodeKind::Outline | NodeKind::Cell => {
                self.visit_children(node, depth, out);
                self.ctx.flush(out);
            }
            NodeKind::QuickStyleDef | NodeKind::TagDef => {}
            NodeKind::Other => {
                log::trace!("Transparent node <{}>", node.name);
                self.visit_children(node, depth, out);
            }
        }
    }

    fn visit_children(&mut self, node: &DocumentNode, depth: usize, out: &mut String) {
        for child in &node.children {
            self.visit(child, depth, out);
        }
    }

    fn visit_element(&mut self, node: &DocumentNode, depth: usize, out: &mut String) {
        let content = if self.ctx.table.active {
            MarkdownContent::empty()
        } else {
            node.attr("quickStyleIndex")
                .and_then(|index| self.ctx.catalog().lookup_style(index))
                .map(|style| MarkdownContent::for_style(&style.name))
                .unwrap_or_default()
        };

        if content.text.starts_with('#') {
            self.ctx.stats.add_heading();
        }
        self.ctx.stats.add_paragraph();

        self.ctx.begin_element(out, content);
        self.visit_children(node, depth, out);
        self.ctx.flush(out);
    }

    fn visit_text(&mut self, node: &DocumentNode, out: &mut String) {
        let Some(raw) = node.text.as_deref() else {
            return;
        };
        let text = convert_text_run(raw);
        if text.is_empty() {
            return;
        }
        self.ctx.open_text(out);
        out.push_str(&text);
    }

    fn number_marker(&self, node: &DocumentNode) -> String {
        let ordinal = match self.ctx.options().list_numbering {
            ListNumbering::Fixed => None,
            ListNumbering::Source => node.attr("text").and_then(|text| {
                let digits: String = text
                    .trim()
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse::<u64>().ok()
            }),
        };
        format!("{}. ", ordinal.unwrap_or(1))
    }

    fn visit_tag(&mut self, node: &DocumentNode, depth: usize, out: &mut String) {
        let Some(tag_type) = node
            .attr("index")
            .and_then(|index| self.ctx.catalog().lookup_tag(index))
            .map(|def| def.tag_type)
        else {
            log::trace!("Tag without definition: {:?}", node.attr("index"));
            return;
        };

        match tag_type {
            TagType::ToDo => {
                let marker = if node.attr("completed") == Some("true") {
                    "- [x] "
                } else {
                    "- [ ] "
                };
                if self.ctx.emit_item_marker(out, depth, marker) {
                    self.ctx.stats.add_checkbox();
                }
            }
            other => {
                let marker = format!("- {} ", other.glyph());
                if self.ctx.emit_item_marker(out, depth, &marker) {
                    self.ctx.stats.add_tag();
                }
            }
        }
    }

    fn visit_table(&mut self, node: &DocumentNode, depth: usize, out: &mut String) {
        self.ctx.flush(out);
        let outer = mem::take(&mut self.ctx.table);
        self.ctx.table.active = true;
        self.ctx.stats.add_table();

        // The next element's own line break leaves one blank line after the rows.
        out.push('\n');
        self.visit_children(node, depth, out);

        self.ctx.table = outer;
    }

    fn visit_row(&mut self, node: &DocumentNode, out: &mut String) {
        if !self.ctx.table.active {
            self.visit_children(node, 0, out);
            return;
        }

        let mut cells = Vec::new();
        for child in &node.children {
            let mut buf = String::new();
            self.visit(child, 0, &mut buf);
            if child.kind() == NodeKind::Cell {
                cells.push(format_cell(&buf));
            }
        }

        let width = self.ctx.table.column_count.max(cells.len()).max(1);
        cells.resize(width, String::new());

        out.push_str("| ");
        out.push_str(&cells.join(" | "));
        out.push_str(" |\n");
        self.ctx.stats.add_row();

        if !self.ctx.table.header_consumed {
            out.push_str(&self.ctx.table.separator(width));
            self.ctx.table.header_consumed = true;
        }
    }

    fn visit_image(&mut self, node: &DocumentNode, out: &mut String) {
        if !self.ctx.options().extract_images {
            return;
        }

        let format = node.attr("format").unwrap_or("png");
        let source = if let Some(data) = node
            .descendants_named("Data")
            .into_iter()
            .find_map(|d| d.text.as_deref())
        {
            ResourceSource::Inline(data.to_string())
        } else if let Some(id) = node
            .descendants_named("CallbackID")
            .into_iter()
            .find_map(|c| c.attr("callbackID"))
        {
            ResourceSource::Callback(id.to_string())
        } else {
            log::warn!("Image without data or callback id skipped");
            return;
        };

        let link = self.ctx.add_image(source, format);
        self.ctx.begin_line(out);
        out.push_str(&link);
    }
}

fn format_cell(raw: &str) -> String {
    raw.trim()
        .replace('|', "\\|")
        .replace("\r\n", "\n")
        .replace('\n', "<br>")
}

/// Display title of a page: span text of the first title element.
///
/// Falls back to `Untitled` when the page has no title text.
pub fn page_title(page: &DocumentNode) -> String {
    let title = page
        .child(NodeKind::Title)
        .and_then(|t| t.find(NodeKind::OE))
        .map(|oe| extract_span_text(&oe.inner_text()))
        .map(|t| t.trim().to_string())
        .unwrap_or_default();

    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

/// Convert a page content tree into a [`ConvertedPage`].
///
/// `file_stem` names the output file and resource folder; without it the
/// sanitized page title is used.
///
/// # Example
///
/// ```
/// use unonenote::parser::parse_document;
/// use unonenote::render::{convert_page, RenderOptions};
///
/// let xml = r#"<one:Page xmlns:one="http://schemas.microsoft.com/office/onenote/2013/onenote">
///   <one:QuickStyleDef index="0" name="PageTitle"/>
///   <one:Title><one:OE quickStyleIndex="0"><one:T><![CDATA[Hello]]></one:T></one:OE></one:Title>
/// </one:Page>"#;
///
/// let page = parse_document(xml).unwrap();
/// let converted = convert_page(&page, &RenderOptions::default(), None).unwrap();
/// assert_eq!(converted.artifact.body, "# Hello\n");
/// assert_eq!(converted.artifact.relative_path, "Hello.md");
/// ```
pub fn convert_page(
    page: &DocumentNode,
    options: &RenderOptions,
    file_stem: Option<&str>,
) -> Result<ConvertedPage> {
    if page.kind() != NodeKind::Page {
        return Err(Error::DocumentFormat(format!(
            "expected <Page> root, found <{}>",
            page.name
        )));
    }

    let title = page_title(page);
    let stem = match file_stem {
        Some(stem) => sanitize_name(stem),
        None => sanitize_name(&title),
    };

    let catalog = StyleCatalog::from_document(page);
    let ctx = ConversionContext::new(catalog, options, stem.clone());
    let (raw, resources, stats) = OutlineConverter::new(ctx).convert(page);

    let mut body = raw.trim_start_matches('\n').trim_end().to_string();
    if !body.is_empty() {
        body.push('\n');
    }

    let mut artifact = PageArtifact::new(body, options.file_name(&stem)).with_title(title);
    artifact.include_frontmatter = options.include_frontmatter;
    if let Some(created) = page.attr("dateTime").and_then(parse_timestamp) {
        artifact = artifact.with_created(created);
    }
    if let Some(modified) = page.attr("lastModifiedTime").and_then(parse_timestamp) {
        artifact = artifact.with_modified(modified);
    }

    log::debug!(
        "Converted page '{}': {} paragraphs, {} headings, {} tables, {} images",
        stem,
        stats.paragraph_count,
        stats.heading_count,
        stats.table_count,
        stats.image_count
    );

    Ok(ConvertedPage {
        artifact,
        resources,
        stats,
    })
}
