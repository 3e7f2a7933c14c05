//! Generic OneNote document tree.

use serde::{Deserialize, Serialize};

/// Element kinds the converter gives meaning to.
///
/// Anything else is [`NodeKind::Other`] and is traversed transparently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Page,
    Title,
    Outline,
    OEChildren,
    OE,
    T,
    Bullet,
    Number,
    Tag,
    Table,
    Column,
    Row,
    Cell,
    Image,
    QuickStyleDef,
    TagDef,
    Other,
}

impl NodeKind {
    /// Classify a local element name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Page" => NodeKind::Page,
            "Title" => NodeKind::Title,
            "Outline" => NodeKind::Outline,
            "OEChildren" => NodeKind::OEChildren,
            "OE" => NodeKind::OE,
            "T" => NodeKind::T,
            "Bullet" => NodeKind::Bullet,
            "Number" => NodeKind::Number,
            "Tag" => NodeKind::Tag,
            "Table" => NodeKind::Table,
            "Column" => NodeKind::Column,
            "Row" => NodeKind::Row,
            "Cell" => NodeKind::Cell,
            "Image" => NodeKind::Image,
            "QuickStyleDef" => NodeKind::QuickStyleDef,
            "TagDef" => NodeKind::TagDef,
            _ => NodeKind::Other,
        }
    }
}

/// A named element of the source tree.
///
/// Attributes keep document order; `text` holds the element's own
/// character data (CDATA included), not that of its descendants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Local element name (namespace prefix stripped)
    pub name: String,

    /// Attributes in document order
    pub attributes: Vec<(String, String)>,

    /// Child elements in document order
    pub children: Vec<DocumentNode>,

    /// Character data directly inside this element
    pub text: Option<String>,
}

impl DocumentNode {
    /// Create an empty node with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Add a child element.
    pub fn with_child(mut self, child: DocumentNode) -> Self {
        self.children.push(child);
        self
    }

    /// Set the raw text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Kind of this node.
    pub fn kind(&self) -> NodeKind {
        NodeKind::from_name(&self.name)
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child of the given kind.
    pub fn child(&self, kind: NodeKind) -> Option<&DocumentNode> {
        self.children.iter().find(|c| c.kind() == kind)
    }

    /// First descendant (depth-first, pre-order) of the given kind, self excluded.
    pub fn find(&self, kind: NodeKind) -> Option<&DocumentNode> {
        for child in &self.children {
            if child.kind() == kind {
                return Some(child);
            }
            if let Some(found) = child.find(kind) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given local name, in document order.
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a DocumentNode> {
        let mut out = Vec::new();
        self.collect_named(name, &mut out);
        out
    }

    fn collect_named<'a>(&'a self, name: &str, out: &mut Vec<&'a DocumentNode>) {
        for child in &self.children {
            if child.name == name {
                out.push(child);
            }
            child.collect_named(name, out);
        }
    }

    /// Concatenated text of this node and all descendants.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(ref text) = self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DocumentNode {
        DocumentNode::new("Page")
            .with_attr("name", "Sample")
            .with_child(
                DocumentNode::new("Title").with_child(
                    DocumentNode::new("OE").with_child(DocumentNode::new("T").with_text("Hello")),
                ),
            )
            .with_child(
                DocumentNode::new("Outline").with_child(
                    DocumentNode::new("OEChildren")
                        .with_child(DocumentNode::new("OE").with_child(
                            DocumentNode::new("T").with_text(" world"),
                        )),
                ),
            )
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(NodeKind::from_name("OE"), NodeKind::OE);
        assert_eq!(NodeKind::from_name("Row"), NodeKind::Row);
        assert_eq!(NodeKind::from_name("InkDrawing"), NodeKind::Other);
    }

    #[test]
    fn test_attr_lookup() {
        let page = sample();
        assert_eq!(page.attr("name"), Some("Sample"));
        assert_eq!(page.attr("missing"), None);
    }

    #[test]
    fn test_find_and_inner_text() {
        let page = sample();
        let title = page.find(NodeKind::Title).unwrap();
        assert_eq!(title.inner_text(), "Hello");
        assert_eq!(page.inner_text(), "Hello world");
        assert_eq!(page.descendants_named("OE").len(), 2);
    }
}
