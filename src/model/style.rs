//! Per-page quick-style and tag definitions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::node::{DocumentNode, NodeKind};

/// A named paragraph style referenced by `OE.quickStyleIndex`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickStyleDef {
    pub index: String,
    /// Semantic style name (`h1`, `p`, `PageTitle`, ...)
    pub name: String,
}

/// Tag classification by the numeric `type` code of a `TagDef`.
///
/// The code is the position of the tag in the host's tag gallery and is
/// independent of the (localized) display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagType {
    ToDo,
    Important,
    Question,
    Critical,
    Idea,
    Other,
}

impl TagType {
    /// Classify a gallery type code.
    pub fn from_code(code: u32) -> Self {
        match code {
            // 26 and 27 are the priority variants of the to-do checkbox
            0 | 26 | 27 => TagType::ToDo,
            1 => TagType::Important,
            2 => TagType::Question,
            10 => TagType::Idea,
            12 => TagType::Critical,
            _ => TagType::Other,
        }
    }

    /// Marker glyph for non-checkbox tags.
    pub fn glyph(&self) -> &'static str {
        match self {
            TagType::Important => ":star:",
            TagType::Question => ":question:",
            TagType::Critical => ":exclamation:",
            TagType::Idea => ":bulb:",
            TagType::ToDo | TagType::Other => ":red_circle:",
        }
    }
}

/// A document-scoped tag definition referenced by `Tag.index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDef {
    pub index: String,
    pub tag_type: TagType,
    pub symbol: Option<String>,
    /// Display name, informational only
    pub name: Option<String>,
}

/// Style and tag definitions of one page, keyed by index.
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    styles: HashMap<String, QuickStyleDef>,
    tags: HashMap<String, TagDef>,
}

impl StyleCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a page tree for `QuickStyleDef` and `TagDef` nodes.
    ///
    /// Definitions without an `index` are ignored. A repeated index keeps
    /// the first definition.
    pub fn from_document(root: &DocumentNode) -> Self {
        let mut catalog = Self::new();
        catalog.scan(root);
        log::trace!(
            "Style catalog: {} quick styles, {} tags",
            catalog.styles.len(),
            catalog.tags.len()
        );
        catalog
    }

    fn scan(&mut self, node: &DocumentNode) {
        match node.kind() {
            NodeKind::QuickStyleDef => {
                if let (Some(index), Some(name)) = (node.attr("index"), node.attr("name")) {
                    self.add_style(QuickStyleDef {
                        index: index.to_string(),
                        name: name.to_string(),
                    });
                }
            }
            NodeKind::TagDef => {
                if let Some(index) = node.attr("index") {
                    let code = node
                        .attr("type")
                        .and_then(|t| t.trim().parse::<u32>().ok());
                    self.add_tag(TagDef {
                        index: index.to_string(),
                        tag_type: code.map(TagType::from_code).unwrap_or(TagType::Other),
                        symbol: node.attr("symbol").map(str::to_string),
                        name: node.attr("name").map(str::to_string),
                    });
                }
            }
            _ => {}
        }

        for child in &node.children {
            self.scan(child);
        }
    }

    /// Register a quick style.
    pub fn add_style(&mut self, def: QuickStyleDef) {
        self.styles.entry(def.index.clone()).or_insert(def);
    }

    /// Register a tag definition.
    pub fn add_tag(&mut self, def: TagDef) {
        self.tags.entry(def.index.clone()).or_insert(def);
    }

    /// Look up a quick style by index.
    pub fn lookup_style(&self, index: &str) -> Option<&QuickStyleDef> {
        self.styles.get(index)
    }

    /// Look up a tag definition by index.
    pub fn lookup_tag(&self, index: &str) -> Option<&TagDef> {
        self.tags.get(index)
    }

    /// Number of quick styles.
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Number of tag definitions.
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }
}
