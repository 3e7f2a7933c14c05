//! Title to file-system name canonicalization.
//!
//! Page and section titles can carry markup remnants (`lang=he`,
//! `style='...'`, stray `span` tokens) when the source failed to escape
//! them. [`sanitize_name`] strips those and anything a file system rejects.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Name used when nothing usable is left.
pub const UNTITLED: &str = "Untitled";

/// Characters rejected by common file systems (Windows being the strictest).
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

struct Patterns {
    markup_tag: Regex,
    attr_single: Regex,
    attr_double: Regex,
    attr_bare: Regex,
    tag_token: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        markup_tag: Regex::new(r"</?[A-Za-z][\w:-]*(?:\s[^<>]*)?/?>").expect("valid regex"),
        attr_single: Regex::new(r"\b\w+\s*=\s*'[^']*'").expect("valid regex"),
        attr_double: Regex::new(r#"\b\w+\s*=\s*"[^"]*""#).expect("valid regex"),
        attr_bare: Regex::new(r"\b\w+\s*=\s*\S+").expect("valid regex"),
        tag_token: Regex::new(r"(?i)\b(span|spanspanstyle)\b").expect("valid regex"),
        whitespace: Regex::new(r"\s+").expect("valid regex"),
    })
}

/// Canonicalize a raw title into a file-system-safe name.
///
/// The result is never empty (falls back to `Untitled`) and
/// `sanitize_name(&sanitize_name(x)) == sanitize_name(x)`.
///
/// # Example
///
/// ```
/// use unonenote::sanitize::sanitize_name;
///
/// assert_eq!(sanitize_name("  Meeting notes lang=he "), "Meeting notes");
/// assert_eq!(sanitize_name("Q1/Q2: plan?"), "Q1_Q2_ plan_");
/// assert_eq!(sanitize_name("   "), "Untitled");
/// ```
pub fn sanitize_name(raw: &str) -> String {
    let mut current: String = raw.nfc().collect();

    // Each pass only removes or replaces characters, so this reaches a fixed point.
    loop {
        let next = sanitize_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if current.is_empty() {
        UNTITLED.to_string()
    } else {
        current
    }
}

fn sanitize_pass(input: &str) -> String {
    let p = patterns();

    let name = input.trim();
    let name = p.markup_tag.replace_all(name, " ");
    let name = p.attr_single.replace_all(&name, "");
    let name = p.attr_double.replace_all(&name, "");
    let name = p.attr_bare.replace_all(&name, "");
    let name = p.tag_token.replace_all(&name, "");
    let name = p.whitespace.replace_all(&name, " ");
    let name = name.replace(['<', '>'], "");

    let name: String = name
        .chars()
        .map(|c| {
            if ILLEGAL_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Trailing dots are dropped by Windows, and a name of only dots would
    // address the current or parent directory.
    name.trim_end_matches(['.', ' ']).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_unchanged() {
        assert_eq!(sanitize_name("Simple Page"), "Simple Page");
        assert_eq!(sanitize_name("Page with spaces"), "Page with spaces");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(sanitize_name(""), UNTITLED);
        assert_eq!(sanitize_name("   "), UNTITLED);
        assert_eq!(sanitize_name("<>"), UNTITLED);
    }

    #[test]
    fn test_attribute_remnants() {
        assert_eq!(sanitize_name("Notes lang=he"), "Notes");
        assert_eq!(
            sanitize_name("Draft style='direction:rtl' final"),
            "Draft final"
        );
        assert_eq!(sanitize_name(r#"Draft style="color:red" v2"#), "Draft v2");
    }

    #[test]
    fn test_tag_tokens_and_brackets() {
        assert_eq!(sanitize_name("<span>Heading</span>"), "Heading");
        assert_eq!(sanitize_name("Weekly<br/>Review"), "Weekly Review");
        assert_eq!(sanitize_name("Page<script>"), "Page");
        assert_eq!(sanitize_name("a < b"), "a b");
        assert_eq!(sanitize_name("SPAN Title"), "Title");
    }

    #[test]
    fn test_illegal_characters() {
        let names = [
            "Page:with:colons",
            "Page|with|pipes",
            "Page*with*asterisks",
            "Page?with?questions",
            "Page\"with\"quotes",
            "Page/with/slashes",
            "Page\\with\\backslashes",
            "Tab\there",
        ];
        for name in names {
            let sanitized = sanitize_name(name);
            for c in ['<', '>', ':', '|', '*', '?', '"', '/', '\\'] {
                assert!(!sanitized.contains(c), "{:?} kept {:?}", sanitized, c);
            }
            assert!(!sanitized.chars().any(char::is_control));
        }
        assert_eq!(sanitize_name("Page/with/slashes"), "Page_with_slashes");
    }

    #[test]
    fn test_dot_names() {
        assert_eq!(sanitize_name(".."), UNTITLED);
        assert_eq!(sanitize_name("."), UNTITLED);
        assert_eq!(sanitize_name(" . . "), UNTITLED);
        assert_eq!(sanitize_name("Notes..."), "Notes");
        assert_eq!(sanitize_name("v1.2 ."), "v1.2");
        assert_eq!(sanitize_name(".hidden"), ".hidden");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(sanitize_name("  a \t\n  b  "), "a b");
    }

    #[test]
    fn test_idempotence() {
        let samples = [
            "",
            "Simple",
            "sp<>an",
            "a<=b",
            "k ='x' =y",
            "x span=y",
            "<span lang=en-US>Page 1 </span>",
            "  Tasks: Q1 / Q2 ",
            "\u{05e2}\u{05de}\u{05d5}\u{05d3} lang=he",
            "e\u{0301}t\u{0301}e\u{0301}",
            "a = = b",
            "name=\"unterminated",
            "..",
            "a. .",
            "<b>x</b>.",
        ];
        for sample in samples {
            let once = sanitize_name(sample);
            assert_eq!(sanitize_name(&once), once, "not idempotent for {:?}", sample);
        }
    }
}
