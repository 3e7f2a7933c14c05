//! Inline span markup to Markdown conversion.
//!
//! Text runs carry HTML-like inline markup (`<span style='...'>`,
//! `<a href=...>`). The markup is parsed into a tree first, then each span
//! is wrapped according to its normalized style declarations.

use std::sync::OnceLock;

use regex::Regex;

const NBSP_ENTITY: &str = "&nbsp;";

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9]*)((?:[^>'"]|'[^']*'|"[^"]*")*?)(/?)>"#)
            .expect("valid regex")
    })
}

fn span_segment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<span[^>]*>(.*?)</span>").expect("valid regex"))
}

fn attr_regex(name: &str) -> Regex {
    Regex::new(&format!(
        r#"(?i)(?:^|\s){}\s*=\s*(?:'([^']*)'|"([^"]*)"|([^\s'"]+))"#,
        name
    ))
    .expect("valid regex")
}

fn style_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| attr_regex("style"))
}

fn href_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| attr_regex("href"))
}

/// Character styles read from a span's `style` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl SpanStyle {
    /// Parse a CSS declaration list such as `font-weight:bold; font-style: italic`.
    ///
    /// Declarations are normalized (case, whitespace) before matching and
    /// unrecognized ones are ignored.
    pub fn parse(declarations: &str) -> Self {
        let mut style = SpanStyle::default();

        for decl in declarations.split(';') {
            let normalized: String = decl
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase();
            let Some((prop, value)) = normalized.split_once(':') else {
                continue;
            };

            match prop {
                "font-weight" => {
                    style.bold = matches!(value, "bold" | "bolder")
                        || value.parse::<u32>().map(|w| w >= 600).unwrap_or(false);
                }
                "font-style" => style.italic = matches!(value, "italic" | "oblique"),
                "text-decoration" | "text-decoration-line" => {
                    if value.contains("underline") {
                        style.underline = true;
                    }
                    if value.contains("line-through") {
                        style.strikethrough = true;
                    }
                }
                _ => {}
            }
        }

        style
    }

    /// Whether no recognized style applies.
    pub fn is_plain(&self) -> bool {
        *self == SpanStyle::default()
    }

    /// Wrap text in the Markdown tokens for this style.
    ///
    /// Bold is always outermost and italic innermost, so bold + italic
    /// yields `***text***`. Surrounding whitespace stays outside the tokens
    /// and whitespace-only text is returned unwrapped.
    pub fn wrap(&self, text: &str) -> String {
        let (lead, core, trail) = split_edges(text);
        if self.is_plain() || core.is_empty() {
            return text.to_string();
        }

        let mut open = String::new();
        let mut close = String::new();
        if self.bold {
            open.push_str("**");
        }
        if self.strikethrough {
            open.push_str("~~");
        }
        if self.underline {
            open.push_str("<u>");
        }
        if self.italic {
            open.push('*');
            close.push('*');
        }
        if self.underline {
            close.push_str("</u>");
        }
        if self.strikethrough {
            close.push_str("~~");
        }
        if self.bold {
            close.push_str("**");
        }

        format!("{}{}{}{}{}", lead, open, core, close, trail)
    }
}

/// Split leading and trailing whitespace (including `&nbsp;`) off `text`.
fn split_edges(text: &str) -> (&str, &str, &str) {
    let mut start = 0;
    loop {
        let rest = &text[start..];
        if rest.starts_with(NBSP_ENTITY) {
            start += NBSP_ENTITY.len();
        } else if let Some(c) = rest.chars().next().filter(|c| c.is_whitespace()) {
            start += c.len_utf8();
        } else {
            break;
        }
    }

    let mut end = text.len();
    loop {
        let rest = &text[start..end];
        if rest.ends_with(NBSP_ENTITY) {
            end -= NBSP_ENTITY.len();
        } else if let Some(c) = rest.chars().next_back().filter(|c| c.is_whitespace()) {
            end -= c.len_utf8();
        } else {
            break;
        }
    }

    (&text[..start], &text[start..end], &text[end..])
}

#[derive(Debug)]
enum FrameKind {
    Root,
    Span(SpanStyle),
    Link(String),
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    buf: String,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            buf: String::new(),
        }
    }

    fn closes(&self, tag: &str) -> bool {
        matches!(
            (&self.kind, tag),
            (FrameKind::Span(_), "span") | (FrameKind::Link(_), "a")
        )
    }

    fn render(self) -> String {
        match self.kind {
            FrameKind::Root => self.buf,
            FrameKind::Span(style) => style.wrap(&self.buf),
            FrameKind::Link(href) => {
                let (lead, core, trail) = split_edges(&self.buf);
                let label = if core.is_empty() { href.as_str() } else { core };
                let target = if href.contains(char::is_whitespace) {
                    format!("<{}>", href)
                } else {
                    href.clone()
                };
                format!("{}[{}]({}){}", lead, label, target, trail)
            }
        }
    }
}

fn attr_value(re: &Regex, attrs: &str) -> Option<String> {
    re.captures(attrs).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string())
    })
}

/// Convert inline span markup into Markdown/HTML tokens.
///
/// Spans become `**bold**`, `*italic*`, `<u>underline</u>` and
/// `~~strikethrough~~` (nested deterministically), anchors become
/// `[text](href)`, `<br>` becomes a space. Unrelated tags pass through
/// untouched, and stray closing tags are dropped.
///
/// # Example
///
/// ```
/// use unonenote::render::convert_spans;
///
/// let md = convert_spans("<span style='font-style:italic;font-weight:bold'>Both</span>");
/// assert_eq!(md, "***Both***");
/// ```
pub fn convert_spans(input: &str) -> String {
    if !input.contains('<') {
        return input.to_string();
    }

    let mut stack = vec![Frame::new(FrameKind::Root)];
    let mut last = 0;

    for caps in tag_regex().captures_iter(input) {
        let Some(whole) = caps.get(0) else { continue };
        push_text(&mut stack, &input[last..whole.start()]);
        last = whole.end();

        let closing = !caps[1].is_empty();
        let tag = caps[2].to_ascii_lowercase();
        let attrs = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        let self_closing = !caps[4].is_empty();

        match (tag.as_str(), closing) {
            ("span", false) if !self_closing => {
                let style = attr_value(style_attr_regex(), attrs)
                    .map(|s| SpanStyle::parse(&s))
                    .unwrap_or_default();
                stack.push(Frame::new(FrameKind::Span(style)));
            }
            ("a", false) if !self_closing => {
                let href = attr_value(href_attr_regex(), attrs).unwrap_or_default();
                stack.push(Frame::new(FrameKind::Link(href)));
            }
            ("span", true) | ("a", true) => close_frame(&mut stack, &tag),
            ("br", _) => push_text(&mut stack, " "),
            ("span", false) | ("a", false) => {}
            _ => push_text(&mut stack, whole.as_str()),
        }
    }
    push_text(&mut stack, &input[last..]);

    while stack.len() > 1 {
        pop_into_parent(&mut stack);
    }
    stack.pop().map(Frame::render).unwrap_or_default()
}

fn push_text(stack: &mut [Frame], text: &str) {
    if let Some(top) = stack.last_mut() {
        top.buf.push_str(text);
    }
}

fn pop_into_parent(stack: &mut Vec<Frame>) {
    if let Some(frame) = stack.pop() {
        let rendered = frame.render();
        push_text(stack, &rendered);
    }
}

fn close_frame(stack: &mut Vec<Frame>, tag: &str) {
    let Some(pos) = stack.iter().rposition(|f| f.closes(tag)) else {
        return;
    };
    while stack.len() > pos {
        pop_into_parent(stack);
    }
}

/// Remove the `&nbsp;` left next to bold markers by the source.
///
/// The entity is dropped; a plain space replaces it only when it
/// separated two words.
pub fn clean_nbsp_artifacts(input: &str) -> String {
    let before = format!("{}**", NBSP_ENTITY);
    let after = format!("**{}", NBSP_ENTITY);

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    loop {
        let next_before = rest.find(&before);
        let next_after = rest.find(&after);
        let (pos, is_before) = match (next_before, next_after) {
            (Some(b), Some(a)) if a < b => (a, false),
            (Some(b), _) => (b, true),
            (None, Some(a)) => (a, false),
            (None, None) => break,
        };

        out.push_str(&rest[..pos]);
        let needs_space = if is_before {
            out.chars().next_back().is_some_and(|c| !c.is_whitespace())
        } else {
            rest[pos + after.len()..]
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace())
        };

        if is_before && needs_space {
            out.push(' ');
        }
        out.push_str("**");
        if !is_before && needs_space {
            out.push(' ');
        }
        rest = &rest[pos + before.len()..];
    }

    out.push_str(rest);
    out
}

/// Flatten a text run to one line of Markdown.
///
/// Line breaks become spaces, span markup is converted and the bold
/// marker artifacts are cleaned.
pub fn convert_text_run(raw: &str) -> String {
    let flattened = raw.replace("\r\n", " ").replace(['\n', '\r'], " ");
    clean_nbsp_artifacts(&convert_spans(&flattened))
}

/// Join the trimmed, non-empty inner texts of all `<span>` segments.
///
/// Input without any span segment is returned unchanged, so "no markup"
/// stays distinguishable from "markup with empty spans" (which yields "").
///
/// # Example
///
/// ```
/// use unonenote::render::extract_span_text;
///
/// assert_eq!(
///     extract_span_text("<span lang=en-US>Page 1 </span><span lang=he>עמוד</span>"),
///     "Page 1 עמוד"
/// );
/// assert_eq!(extract_span_text("No spans here"), "No spans here");
/// ```
pub fn extract_span_text(input: &str) -> String {
    let re = span_segment_regex();
    if !re.is_match(input) {
        return input.to_string();
    }

    re.captures_iter(input)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_styles() {
        assert_eq!(convert_spans("<span>Simple</span>"), "Simple");
        assert_eq!(
            convert_spans("<span style='font-weight:bold'>Bold</span>"),
            "**Bold**"
        );
        assert_eq!(
            convert_spans("<span style='font-style:italic'>Italic</span>"),
            "*Italic*"
        );
        assert_eq!(
            convert_spans("<span style='text-decoration:underline'>Underlined</span>"),
            "<u>Underlined</u>"
        );
        assert_eq!(
            convert_spans("<span style='text-decoration:line-through'>Gone</span>"),
            "~~Gone~~"
        );
    }

    #[test]
    fn test_bold_italic_any_order() {
        let expected = "***Bold Italic***";
        assert_eq!(
            convert_spans("<span style='font-weight:bold;font-style:italic'>Bold Italic</span>"),
            expected
        );
        assert_eq!(
            convert_spans("<span style='font-style:italic;font-weight:bold'>Bold Italic</span>"),
            expected
        );
        assert_eq!(
            convert_spans(
                "<span style=\"FONT-STYLE: italic ; font-weight : bold\">Bold Italic</span>"
            ),
            expected
        );
    }

    #[test]
    fn test_all_styles_nesting_order() {
        let md = convert_spans(
            "<span style='font-style:italic;text-decoration:underline line-through;font-weight:bold'>x</span>",
        );
        assert_eq!(md, "**~~<u>*x*</u>~~**");
    }

    #[test]
    fn test_whitespace_stays_outside_markers() {
        assert_eq!(
            convert_spans("Text <span style='font-weight:bold'> bold </span>end"),
            "Text  **bold** end"
        );
        assert_eq!(
            convert_spans("<span style='font-weight:bold'>   </span>"),
            "   "
        );
    }

    #[test]
    fn test_nested_spans() {
        let md = convert_spans(
            "<span style='font-weight:bold'>a <span style='font-style:italic'>b</span> c</span>",
        );
        assert_eq!(md, "**a *b* c**");
    }

    #[test]
    fn test_unknown_styles_and_attrs() {
        assert_eq!(
            convert_spans("<span lang=en-US style='color:#FF0000'>Red</span> text"),
            "Red text"
        );
        assert_eq!(convert_spans("<span lang=hu>Szia</span>"), "Szia");
    }

    #[test]
    fn test_links_and_breaks() {
        assert_eq!(
            convert_spans("See <a href=\"https://example.com\">the site</a>"),
            "See [the site](https://example.com)"
        );
        assert_eq!(convert_spans("one<br>two<br/>three"), "one two three");
    }

    #[test]
    fn test_unclosed_and_stray_tags() {
        assert_eq!(
            convert_spans("<span style='font-weight:bold'>open"),
            "**open**"
        );
        assert_eq!(convert_spans("stray</span> close"), "stray close");
        assert_eq!(convert_spans("a < b"), "a < b");
        assert_eq!(convert_spans("<b>kept</b>"), "<b>kept</b>");
    }

    #[test]
    fn test_span_style_parse() {
        assert!(SpanStyle::parse("font-weight:700").bold);
        assert!(!SpanStyle::parse("font-weight:normal").bold);
        assert!(SpanStyle::parse("font-style:oblique").italic);
        assert!(SpanStyle::parse("garbage;;:").is_plain());
    }

    #[test]
    fn test_clean_nbsp_artifacts() {
        assert_eq!(
            clean_nbsp_artifacts("Text with &nbsp;** bold markers"),
            "Text with ** bold markers"
        );
        assert_eq!(clean_nbsp_artifacts("word&nbsp;**b**"), "word **b**");
        assert_eq!(clean_nbsp_artifacts("**b**&nbsp;next"), "**b** next");
        assert_eq!(clean_nbsp_artifacts("**b**&nbsp;"), "**b**");
        assert_eq!(clean_nbsp_artifacts("no artifacts"), "no artifacts");
    }

    #[test]
    fn test_convert_text_run() {
        assert_eq!(convert_text_run("Text\nwith\r\nnewlines"), "Text with newlines");
        assert_eq!(
            convert_text_run("a&nbsp;<span style='font-weight:bold'>b</span>"),
            "a **b**"
        );
        assert_eq!(
            convert_text_run("a<span style='font-weight:bold'>&nbsp;b</span>"),
            "a **b**"
        );
    }

    #[test]
    fn test_extract_span_text() {
        let input = "<span lang=en-US>Page 1 </span><span style='direction:rtl;unicode-bidi:embed' lang=he>\u{05e2}\u{05de}\u{05d5}\u{05d3}</span>";
        assert_eq!(
            extract_span_text(input),
            "Page 1 \u{05e2}\u{05de}\u{05d5}\u{05d3}"
        );
    }

    #[test]
    fn test_extract_span_text_skips_blank_spans() {
        let input = "<span lang=en-US> </span><span lang=he>\u{05e2}\u{05de}\u{05d5}\u{05d3}</span>";
        assert_eq!(extract_span_text(input), "\u{05e2}\u{05de}\u{05d5}\u{05d3}");
        assert_eq!(extract_span_text("<span>  </span><span></span>"), "");
    }

    #[test]
    fn test_extract_span_text_without_spans() {
        assert_eq!(extract_span_text("Just plain text"), "Just plain text");
        assert_eq!(extract_span_text("  padded  "), "  padded  ");
        assert_eq!(extract_span_text(""), "");
    }

    #[test]
    fn test_extract_span_text_mixed() {
        let input = "<span style='font-weight:bold'>Bold text</span> and <span>normal text</span>";
        assert_eq!(extract_span_text(input), "Bold text normal text");
    }
}
