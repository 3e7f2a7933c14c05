//! Page descriptors and finished page artifacts.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Front matter timestamp layout.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One entry of a section's flat page list.
///
/// Parents are not recorded; they are reconstructed from order and level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub id: String,
    /// Sanitized page name
    pub name: String,
    /// 1-based nesting depth
    pub level: u32,
}

impl PageDescriptor {
    /// Create a new descriptor.
    pub fn new(id: impl Into<String>, name: impl Into<String>, level: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level: level.max(1),
        }
    }
}

/// A converted page, ready for the writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageArtifact {
    /// Display title
    pub title: Option<String>,

    /// Markdown body without front matter
    pub body: String,

    /// File name relative to the writer's current directory
    pub relative_path: String,

    /// Page creation time (UTC)
    pub created_at: Option<NaiveDateTime>,

    /// Last modification time (UTC)
    pub modified_at: Option<NaiveDateTime>,

    /// Whether `content()` prefixes the front matter block
    pub include_frontmatter: bool,
}

impl PageArtifact {
    /// Create an artifact with a body and file name.
    pub fn new(body: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            title: None,
            body: body.into(),
            relative_path: relative_path.into(),
            created_at: None,
            modified_at: None,
            include_frontmatter: true,
        }
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the creation time.
    pub fn with_created(mut self, created: NaiveDateTime) -> Self {
        self.created_at = Some(created);
        self
    }

    /// Set the modification time.
    pub fn with_modified(mut self, modified: NaiveDateTime) -> Self {
        self.modified_at = Some(modified);
        self
    }

    /// Render the front matter block.
    ///
    /// Absent fields produce no line at all.
    pub fn frontmatter(&self) -> String {
        let mut fm = String::from("---\n");

        if let Some(ref title) = self.title {
            if !title.is_empty() {
                fm.push_str(&format!("title: \"{}\"\n", title.replace('"', "\\\"")));
            }
        }

        if let Some(created) = self.created_at {
            fm.push_str(&format!("created: {}\n", created.format(TIMESTAMP_FORMAT)));
        }

        if let Some(modified) = self.modified_at {
            fm.push_str(&format!("modified: {}\n", modified.format(TIMESTAMP_FORMAT)));
        }

        fm.push_str("---\n\n");
        fm
    }

    /// Full file content: front matter (if enabled) followed by the body.
    pub fn content(&self) -> String {
        if self.include_frontmatter {
            format!("{}{}", self.frontmatter(), self.body)
        } else {
            self.body.clone()
        }
    }
}

/// Parse a source timestamp into UTC.
///
/// Accepts RFC 3339 (`2023-01-01T10:00:00.000Z`) and offset-less ISO-8601
/// forms. Returns `None` for anything else.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}
