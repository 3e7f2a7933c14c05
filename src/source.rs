//! Document-source providers.
//!
//! A [`DocumentSource`] hands out hierarchy trees, page content trees and
//! embedded resource bytes. The exporter only talks to this trait, so a
//! live notebook store, an exported directory ([`DirectorySource`]) or an
//! in-memory fixture ([`MemorySource`]) are interchangeable.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::DocumentNode;
use crate::parser::{self, parse_document};

/// Kind of object in the notebook hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Notebook,
    SectionGroup,
    Section,
    Page,
}

impl ObjectKind {
    /// Element name used for this kind in hierarchy documents.
    pub fn element_name(&self) -> &'static str {
        match self {
            ObjectKind::Notebook => "Notebook",
            ObjectKind::SectionGroup => "SectionGroup",
            ObjectKind::Section => "Section",
            ObjectKind::Page => "Page",
        }
    }
}

/// How much of the hierarchy below an object a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HierarchyScope {
    /// The object alone
    SelfOnly,
    /// The object and its direct children
    Children,
    /// Notebooks directly below the object
    Notebooks,
    /// Everything down to sections (pages left out)
    Sections,
    /// The complete subtree, pages included
    #[default]
    Pages,
}

impl HierarchyScope {
    /// Cut a hierarchy subtree down to this scope.
    pub fn apply(&self, node: &DocumentNode) -> DocumentNode {
        let shallow = |n: &DocumentNode| DocumentNode {
            name: n.name.clone(),
            attributes: n.attributes.clone(),
            children: Vec::new(),
            text: n.text.clone(),
        };

        let mut out = shallow(node);
        match self {
            HierarchyScope::SelfOnly => {}
            HierarchyScope::Children => {
                out.children = node.children.iter().map(shallow).collect();
            }
            HierarchyScope::Notebooks => {
                out.children = node
                    .children
                    .iter()
                    .filter(|c| c.name == ObjectKind::Notebook.element_name())
                    .map(shallow)
                    .collect();
            }
            HierarchyScope::Sections => {
                out.children = node
                    .children
                    .iter()
                    .filter(|c| c.name != ObjectKind::Page.element_name())
                    .map(|c| self.apply(c))
                    .collect();
            }
            HierarchyScope::Pages => return node.clone(),
        }
        out
    }
}

/// Provider of notebook hierarchy and page content.
pub trait DocumentSource {
    /// Fetch the hierarchy below `id` (the store root when `None`), cut to `scope`.
    fn fetch_tree(&self, id: Option<&str>, scope: HierarchyScope) -> Result<DocumentNode>;

    /// Fetch the content tree of one page.
    fn fetch_page(&self, page_id: &str) -> Result<DocumentNode>;

    /// Fetch the raw bytes of a resource embedded in a page.
    fn fetch_resource(&self, page_id: &str, resource_id: &str) -> Result<Vec<u8>>;

    /// Resolve the id of the first object of `kind` named `name` within `scope`.
    fn resolve_id(&self, scope: HierarchyScope, kind: ObjectKind, name: &str) -> Result<String> {
        let tree = self.fetch_tree(None, scope)?;
        parser::find_id_by_name(&tree, kind, name).ok_or_else(|| {
            Error::ObjectNotFound(format!("{} named '{}'", kind.element_name(), name))
        })
    }

    /// Ordered `(id, name)` pairs of the direct children of `parent_id` of one kind.
    fn child_objects(&self, parent_id: &str, kind: ObjectKind) -> Result<Vec<(String, String)>> {
        let tree = self.fetch_tree(Some(parent_id), HierarchyScope::Children)?;
        Ok(parser::child_objects(&tree, kind))
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for &S {
    fn fetch_tree(&self, id: Option<&str>, scope: HierarchyScope) -> Result<DocumentNode> {
        (**self).fetch_tree(id, scope)
    }

    fn fetch_page(&self, page_id: &str) -> Result<DocumentNode> {
        (**self).fetch_page(page_id)
    }

    fn fetch_resource(&self, page_id: &str, resource_id: &str) -> Result<Vec<u8>> {
        (**self).fetch_resource(page_id, resource_id)
    }
}

fn scoped_tree(root: &DocumentNode, id: Option<&str>, scope: HierarchyScope) -> Result<DocumentNode> {
    let node = match id {
        None => root,
        Some(id) => parser::find_by_id(root, id)
            .ok_or_else(|| Error::ObjectNotFound(format!("object '{}'", id)))?,
    };
    Ok(scope.apply(node))
}

/// In-memory source for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    hierarchy: DocumentNode,
    pages: HashMap<String, DocumentNode>,
    resources: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// Create a source over a hierarchy tree.
    pub fn new(hierarchy: DocumentNode) -> Self {
        Self {
            hierarchy,
            ..Default::default()
        }
    }

    /// Create a source from hierarchy XML.
    pub fn from_xml(hierarchy_xml: &str) -> Result<Self> {
        Ok(Self::new(parse_document(hierarchy_xml)?))
    }

    /// Register a page content tree.
    pub fn with_page(mut self, page_id: impl Into<String>, page: DocumentNode) -> Self {
        self.pages.insert(page_id.into(), page);
        self
    }

    /// Register a page content document given as XML.
    pub fn with_page_xml(self, page_id: impl Into<String>, xml: &str) -> Result<Self> {
        let page = parse_document(xml)?;
        Ok(self.with_page(page_id, page))
    }

    /// Register resource bytes.
    pub fn with_resource(mut self, resource_id: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.resources.insert(resource_id.into(), bytes);
        self
    }

    /// Number of registered pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

impl DocumentSource for MemorySource {
    fn fetch_tree(&self, id: Option<&str>, scope: HierarchyScope) -> Result<DocumentNode> {
        scoped_tree(&self.hierarchy, id, scope)
    }

    fn fetch_page(&self, page_id: &str) -> Result<DocumentNode> {
        self.pages
            .get(page_id)
            .cloned()
            .ok_or_else(|| Error::ObjectNotFound(format!("page '{}'", page_id)))
    }

    fn fetch_resource(&self, _page_id: &str, resource_id: &str) -> Result<Vec<u8>> {
        self.resources
            .get(resource_id)
            .cloned()
            .ok_or_else(|| Error::ObjectNotFound(format!("resource '{}'", resource_id)))
    }
}

/// Source reading an exported notebook directory.
///
/// Layout:
///
/// ```text
/// <root>/hierarchy.xml
/// <root>/pages/<page id>.xml
/// <root>/resources/<resource id>
/// ```
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    hierarchy: DocumentNode,
}

impl DirectorySource {
    /// Hierarchy document name inside the root.
    pub const HIERARCHY_FILE: &'static str = "hierarchy.xml";

    /// Open an exported directory and parse its hierarchy document.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let xml = fs::read_to_string(root.join(Self::HIERARCHY_FILE))?;
        let hierarchy = parse_document(&xml)?;
        log::debug!("Opened notebook directory {}", root.display());
        Ok(Self { root, hierarchy })
    }

    /// Root directory of this source.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, dir: &str, id: &str, extension: Option<&str>) -> Result<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(Error::ObjectNotFound(format!("invalid id '{}'", id)));
        }
        let file = match extension {
            Some(ext) => format!("{}.{}", id, ext),
            None => id.to_string(),
        };
        let path = self.root.join(dir).join(file);
        if !path.is_file() {
            return Err(Error::ObjectNotFound(path.display().to_string()));
        }
        Ok(path)
    }
}

impl DocumentSource for DirectorySource {
    fn fetch_tree(&self, id: Option<&str>, scope: HierarchyScope) -> Result<DocumentNode> {
        scoped_tree(&self.hierarchy, id, scope)
    }

    fn fetch_page(&self, page_id: &str) -> Result<DocumentNode> {
        let path = self.entry_path("pages", page_id, Some("xml"))?;
        let xml = fs::read_to_string(path)?;
        parse_document(&xml)
    }

    fn fetch_resource(&self, _page_id: &str, resource_id: &str) -> Result<Vec<u8>> {
        let path = self.entry_path("resources", resource_id, None)?;
        Ok(fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HIERARCHY: &str = r#"<one:Notebooks xmlns:one="http://schemas.microsoft.com/office/onenote/2013/onenote">
  <one:Notebook name="Work" ID="nb1">
    <one:SectionGroup name="Archive" ID="sg1">
      <one:Section name="Old" ID="s2">
        <one:Page ID="p9" name="Legacy"/>
      </one:Section>
    </one:SectionGroup>
    <one:Section name="Projects" ID="s1">
      <one:Page ID="p1" name="Plan"/>
    </one:Section>
  </one:Notebook>
  <one:Notebook name="Home" ID="nb2"/>
</one:Notebooks>"#;

    #[test]
    fn test_scope_apply() {
        let root = parse_document(HIERARCHY).unwrap();

        let own = HierarchyScope::SelfOnly.apply(&root);
        assert!(own.children.is_empty());

        let notebooks = HierarchyScope::Notebooks.apply(&root);
        assert_eq!(notebooks.children.len(), 2);
        assert!(notebooks.children.iter().all(|c| c.children.is_empty()));

        let sections = HierarchyScope::Sections.apply(&root);
        assert!(sections.descendants_named("Page").is_empty());
        assert_eq!(sections.descendants_named("Section").len(), 2);

        let pages = HierarchyScope::Pages.apply(&root);
        assert_eq!(pages.descendants_named("Page").len(), 2);
    }

    #[test]
    fn test_memory_source_resolve_and_children() {
        let source = MemorySource::from_xml(HIERARCHY).unwrap();

        let id = source
            .resolve_id(HierarchyScope::Notebooks, ObjectKind::Notebook, "Work")
            .unwrap();
        assert_eq!(id, "nb1");

        let sections = source.child_objects("nb1", ObjectKind::Section).unwrap();
        assert_eq!(sections, vec![("s1".to_string(), "Projects".to_string())]);

        let groups = source.child_objects("nb1", ObjectKind::SectionGroup).unwrap();
        assert_eq!(groups, vec![("sg1".to_string(), "Archive".to_string())]);
    }

    #[test]
    fn test_memory_source_missing_objects() {
        let source = MemorySource::from_xml(HIERARCHY).unwrap();

        assert!(matches!(
            source.resolve_id(HierarchyScope::Notebooks, ObjectKind::Notebook, "Nope"),
            Err(Error::ObjectNotFound(_))
        ));
        assert!(matches!(
            source.fetch_tree(Some("missing"), HierarchyScope::Pages),
            Err(Error::ObjectNotFound(_))
        ));
        assert!(matches!(
            source.fetch_page("p1"),
            Err(Error::ObjectNotFound(_))
        ));
        assert!(matches!(
            source.fetch_resource("p1", "r1"),
            Err(Error::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_memory_source_pages_and_resources() {
        let source = MemorySource::from_xml(HIERARCHY)
            .unwrap()
            .with_page_xml("p1", "<one:Page xmlns:one=\"x\" ID=\"p1\"/>")
            .unwrap()
            .with_resource("r1", vec![1, 2, 3]);

        assert_eq!(source.page_count(), 1);
        assert_eq!(source.fetch_page("p1").unwrap().attr("ID"), Some("p1"));
        assert_eq!(source.fetch_resource("p1", "r1").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_directory_source() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hierarchy.xml"), HIERARCHY).unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        fs::create_dir_all(dir.path().join("resources")).unwrap();
        fs::write(
            dir.path().join("pages").join("p1.xml"),
            "<one:Page xmlns:one=\"x\" ID=\"p1\" name=\"Plan\"/>",
        )
        .unwrap();
        fs::write(dir.path().join("resources").join("img1"), [9u8, 8, 7]).unwrap();

        let source = DirectorySource::open(dir.path()).unwrap();
        assert_eq!(source.root(), dir.path());

        let page = source.fetch_page("p1").unwrap();
        assert_eq!(page.attr("name"), Some("Plan"));
        assert_eq!(source.fetch_resource("p1", "img1").unwrap(), vec![9, 8, 7]);

        let section = source.fetch_tree(Some("s1"), HierarchyScope::Pages).unwrap();
        assert_eq!(section.attr("name"), Some("Projects"));

        assert!(source.fetch_page("p9").is_err());
        assert!(source.fetch_page("../hierarchy").is_err());
    }

    #[test]
    fn test_directory_source_without_hierarchy() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            DirectorySource::open(dir.path()),
            Err(Error::Io(_))
        ));
    }
}
