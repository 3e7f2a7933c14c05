//! Rendering options and configuration.

/// Options for converting pages to Markdown.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Prefix each page with a YAML front matter block
    pub include_frontmatter: bool,

    /// How ordered list markers are numbered
    pub list_numbering: ListNumbering,

    /// Spaces per nesting level in front of list markers
    pub indent_width: usize,

    /// Link and persist images
    pub extract_images: bool,

    /// Extension of written page files (without the dot)
    pub file_extension: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Set the list numbering mode.
    pub fn with_list_numbering(mut self, numbering: ListNumbering) -> Self {
        self.list_numbering = numbering;
        self
    }

    /// Set the indentation width of nested list markers.
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Enable or disable image extraction.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Set the page file extension.
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.file_extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// File name for a page, e.g. `Plan.md`.
    pub fn file_name(&self, stem: &str) -> String {
        if self.file_extension.is_empty() {
            stem.to_string()
        } else {
            format!("{}.{}", stem, self.file_extension)
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_frontmatter: true,
            list_numbering: ListNumbering::Source,
            indent_width: 2,
            extract_images: true,
            file_extension: "md".to_string(),
        }
    }
}

/// Numbering of ordered list items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListNumbering {
    /// Use the ordinal recorded by the source, `1.` when it has none
    #[default]
    Source,
    /// Always `1.`, leaving the numbering to the Markdown renderer
    Fixed,
}
