//! Markdown fragments produced from style definitions.

/// A piece of Markdown whose placement may be deferred.
///
/// A paired fragment wraps the text that follows it: `text` opens the
/// run and the same `text` closes it once the outline element ends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkdownContent {
    /// Markup to emit
    pub text: String,

    /// Whether the markup must be repeated after the decorated text
    pub is_paired: bool,

    /// Whether the fragment already starts its own line
    pub will_append_newline: bool,
}

impl MarkdownContent {
    /// Content with no markup.
    pub fn empty() -> Self {
        Self::default()
    }

    /// One-sided markup such as a heading prefix.
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_paired: false,
            will_append_newline: false,
        }
    }

    /// Markup that opens and closes around the decorated text.
    pub fn paired(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_paired: true,
            will_append_newline: false,
        }
    }

    /// Mark the fragment as starting its own line.
    pub fn on_own_line(mut self) -> Self {
        self.will_append_newline = true;
        self
    }

    /// Markdown for a quick style name (`h1`, `p`, `cite`, ...).
    ///
    /// Unknown names render as plain content.
    pub fn for_style(name: &str) -> Self {
        match name {
            "PageTitle" => Self::single("# "),
            "h1" => Self::single("# "),
            "h2" => Self::single("## "),
            "h3" => Self::single("### "),
            "h4" => Self::single("#### "),
            "h5" => Self::single("##### "),
            "h6" => Self::single("###### "),
            "cite" => Self::paired("*"),
            "code" => Self::paired("`"),
            "blockquote" | "quote" => Self::single("> "),
            _ => Self::empty(),
        }
    }

    /// Whether there is no markup to emit.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
