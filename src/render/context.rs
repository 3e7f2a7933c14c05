//! Per-page conversion state.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::model::{extension_for_format, MarkdownContent, PageResource, ResourceSource, StyleCatalog};

use super::options::RenderOptions;
use super::stats::ConversionStats;

/// Characters escaped in image link targets.
const LINK_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'(')
    .add(b')')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'`');

/// The single deferred fragment of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingFragment {
    /// Style prefix of an outline element still waiting for its text
    Opening {
        /// A line break must precede whatever the element emits first
        line_break: bool,
        content: MarkdownContent,
    },
    /// Closing half of a paired style whose text has been emitted
    Closing(MarkdownContent),
}

/// Table sub-state of the walker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableState {
    pub active: bool,
    pub column_count: usize,
    pub header_consumed: bool,
}

impl TableState {
    /// Separator line placed under the header row.
    pub fn separator(&self, cells: usize) -> String {
        let mut line = String::from("|");
        for _ in 0..cells.max(1) {
            line.push_str(" --- |");
        }
        line.push('\n');
        line
    }
}

/// Mutable state of one page conversion.
///
/// Created per page and dropped afterwards; nothing carries over between pages.
#[derive(Debug)]
pub struct ConversionContext<'a> {
    catalog: StyleCatalog,
    options: &'a RenderOptions,
    pending: Option<PendingFragment>,
    pub(crate) table: TableState,
    item_marker_emitted: bool,
    resource_stem: String,
    resources: Vec<PageResource>,
    pub(crate) stats: ConversionStats,
}

impl<'a> ConversionContext<'a> {
    /// Create a context for one page.
    ///
    /// `resource_stem` names the page's resource folder (`<stem>_files`).
    pub fn new(
        catalog: StyleCatalog,
        options: &'a RenderOptions,
        resource_stem: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            options,
            pending: None,
            table: TableState::default(),
            item_marker_emitted: false,
            resource_stem: resource_stem.into(),
            resources: Vec::new(),
            stats: ConversionStats::new(),
        }
    }

    pub fn catalog(&self) -> &StyleCatalog {
        &self.catalog
    }

    pub fn options(&self) -> &RenderOptions {
        self.options
    }

    pub fn pending(&self) -> Option<&PendingFragment> {
        self.pending.as_ref()
    }

    pub fn stats(&self) -> &ConversionStats {
        &self.stats
    }

    /// Emit and clear the pending fragment.
    ///
    /// A closing half is written out. An opening that never received text
    /// only contributes its line break.
    pub fn flush(&mut self, out: &mut String) {
        match self.pending.take() {
            Some(PendingFragment::Closing(content)) => out.push_str(&content.text),
            Some(PendingFragment::Opening { line_break, .. }) => {
                if line_break {
                    out.push('\n');
                }
            }
            None => {}
        }
    }

    /// Start a new outline element with the given style fragment.
    ///
    /// The slot holds one fragment: anything still pending is flushed first.
    pub fn begin_element(&mut self, out: &mut String, content: MarkdownContent) {
        self.flush(out);
        self.item_marker_emitted = false;
        let line_break = !content.will_append_newline;
        self.pending = Some(PendingFragment::Opening {
            line_break,
            content,
        });
    }

    /// Emit the pending line break, keeping the style prefix pending.
    ///
    /// Outside any outline element the output is just moved to a fresh line.
    pub fn begin_line(&mut self, out: &mut String) {
        match self.pending {
            Some(PendingFragment::Opening {
                ref mut line_break, ..
            }) => {
                if *line_break {
                    out.push('\n');
                    *line_break = false;
                }
            }
            Some(PendingFragment::Closing(_)) => {}
            None => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
    }

    /// Emit the opening of the pending style ahead of a text run.
    ///
    /// A paired style leaves its closing half pending.
    pub fn open_text(&mut self, out: &mut String) {
        match self.pending.take() {
            Some(PendingFragment::Opening {
                line_break,
                content,
            }) => {
                if line_break {
                    out.push('\n');
                }
                out.push_str(&content.text);
                if content.is_paired {
                    self.pending = Some(PendingFragment::Closing(content));
                }
            }
            other => self.pending = other,
        }
    }

    /// Indentation in front of a list marker at `depth` (1 = top level).
    pub fn indent(&self, depth: usize) -> String {
        " ".repeat(self.options.indent_width * depth.saturating_sub(1))
    }

    /// Emit a list item marker for the current outline element.
    ///
    /// Only the first marker of an element is written. Returns whether it was.
    pub fn emit_item_marker(&mut self, out: &mut String, depth: usize, marker: &str) -> bool {
        if self.item_marker_emitted {
            return false;
        }
        self.begin_line(out);
        let indent = self.indent(depth);
        out.push_str(&indent);
        out.push_str(marker);
        self.item_marker_emitted = true;
        true
    }

    /// Register an image and return its Markdown link.
    pub fn add_image(&mut self, source: ResourceSource, format: &str) -> String {
        let number = self.resources.len() + 1;
        let file = format!("image{}.{}", number, extension_for_format(format));
        let relative_path = format!("{}_files/{}", self.resource_stem, file);
        let link = format!(
            "![image{}]({}_files/{})",
            number,
            utf8_percent_encode(&self.resource_stem, LINK_PATH),
            file
        );

        self.resources
            .push(PageResource::new(relative_path, source, format));
        self.stats.add_image();
        link
    }

    /// Resources registered so far.
    pub fn resources(&self) -> &[PageResource] {
        &self.resources
    }

    /// Finish the page, returning its resources and statistics.
    pub fn finish(mut self, out: &mut String) -> (Vec<PageResource>, ConversionStats) {
        self.flush(out);
        (self.resources, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(options: &RenderOptions) -> ConversionContext<'_> {
        ConversionContext::new(StyleCatalog::new(), options, "My Page")
    }

    #[test]
    fn test_heading_waits_for_text() {
        let options = RenderOptions::default();
        let mut ctx = context(&options);
        let mut out = String::new();

        ctx.begin_element(&mut out, MarkdownContent::single("## "));
        assert_eq!(out, "");

        ctx.open_text(&mut out);
        out.push_str("Heading");
        ctx.flush(&mut out);
        assert_eq!(out, "\n## Heading");
        assert!(ctx.pending().is_none());
    }

    #[test]
    fn test_paired_fragment_closes_on_flush() {
        let options = RenderOptions::default();
        let mut ctx = context(&options);
        let mut out = String::new();

        ctx.begin_element(&mut out, MarkdownContent::paired("`"));
        ctx.open_text(&mut out);
        out.push_str("code");
        ctx.open_text(&mut out);
        out.push_str(" more");
        assert!(matches!(ctx.pending(), Some(PendingFragment::Closing(_))));

        ctx.flush(&mut out);
        assert_eq!(out, "\n`code more`");
    }

    #[test]
    fn test_unconsumed_opening_keeps_line_break_only() {
        let options = RenderOptions::default();
        let mut ctx = context(&options);
        let mut out = String::new();

        ctx.begin_element(&mut out, MarkdownContent::single("# "));
        ctx.begin_element(&mut out, MarkdownContent::empty());
        ctx.open_text(&mut out);
        out.push_str("text");
        assert_eq!(out, "\n\ntext");
    }

    #[test]
    fn test_own_line_content_skips_break() {
        let options = RenderOptions::default();
        let mut ctx = context(&options);
        let mut out = String::new();

        ctx.begin_element(&mut out, MarkdownContent::single("> ").on_own_line());
        ctx.open_text(&mut out);
        assert_eq!(out, "> ");
    }

    #[test]
    fn test_one_marker_per_element() {
        let options = RenderOptions::default();
        let mut ctx = context(&options);
        let mut out = String::new();

        ctx.begin_element(&mut out, MarkdownContent::empty());
        assert!(ctx.emit_item_marker(&mut out, 2, "- [ ] "));
        assert!(!ctx.emit_item_marker(&mut out, 2, "- "));
        ctx.open_text(&mut out);
        out.push_str("task");
        assert_eq!(out, "\n  - [ ] task");

        ctx.begin_element(&mut out, MarkdownContent::empty());
        assert!(ctx.emit_item_marker(&mut out, 1, "1. "));
    }

    #[test]
    fn test_indent_width() {
        let options = RenderOptions::default().with_indent_width(4);
        let ctx = context(&options);
        assert_eq!(ctx.indent(1), "");
        assert_eq!(ctx.indent(3), "        ");
    }

    #[test]
    fn test_image_links() {
        let options = RenderOptions::default();
        let mut ctx = context(&options);

        let first = ctx.add_image(ResourceSource::Callback("r1".to_string()), "png");
        let second = ctx.add_image(ResourceSource::Inline("AAAA".to_string()), "jpeg");

        assert_eq!(first, "![image1](My%20Page_files/image1.png)");
        assert_eq!(second, "![image2](My%20Page_files/image2.jpg)");
        assert_eq!(ctx.resources()[1].relative_path, "My Page_files/image2.jpg");
        assert_eq!(ctx.stats().image_count, 2);
    }

    #[test]
    fn test_table_separator() {
        let table = TableState::default();
        assert_eq!(table.separator(2), "| --- | --- |\n");
        assert_eq!(table.separator(0), "| --- |\n");
    }
}
