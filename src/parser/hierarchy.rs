//! Queries over notebook hierarchy trees.

use crate::model::{DocumentNode, PageDescriptor};
use crate::sanitize::sanitize_name;
use crate::source::ObjectKind;

/// Flat, ordered page list of a section tree.
///
/// Pages without an `ID` are skipped; names are sanitized and a missing or
/// unparseable `pageLevel` counts as 1.
pub fn section_pages(section: &DocumentNode) -> Vec<PageDescriptor> {
    section
        .descendants_named(ObjectKind::Page.element_name())
        .into_iter()
        .filter_map(|page| {
            let id = page.attr("ID").filter(|id| !id.is_empty())?;
            let name = sanitize_name(page.attr("name").unwrap_or_default());
            let level = page
                .attr("pageLevel")
                .and_then(|l| l.trim().parse::<u32>().ok())
                .unwrap_or(1);
            Some(PageDescriptor::new(id, name, level))
        })
        .collect()
}

/// Direct children of `parent` of the given kind, as ordered `(id, name)` pairs.
pub fn child_objects(parent: &DocumentNode, kind: ObjectKind) -> Vec<(String, String)> {
    parent
        .children
        .iter()
        .filter(|c| c.name == kind.element_name())
        .filter_map(|c| {
            let id = c.attr("ID").filter(|id| !id.is_empty())?;
            Some((id.to_string(), c.attr("name").unwrap_or_default().to_string()))
        })
        .collect()
}

/// Find an element anywhere in the tree by its `ID` attribute.
pub fn find_by_id<'a>(root: &'a DocumentNode, id: &str) -> Option<&'a DocumentNode> {
    if root.attr("ID") == Some(id) {
        return Some(root);
    }
    root.children.iter().find_map(|c| find_by_id(c, id))
}

/// Find the id of the first object of `kind` whose name matches.
pub fn find_id_by_name(root: &DocumentNode, kind: ObjectKind, name: &str) -> Option<String> {
    root.descendants_named(kind.element_name())
        .into_iter()
        .chain(std::iter::once(root).filter(|r| r.name == kind.element_name()))
        .find(|n| n.attr("name") == Some(name))
        .and_then(|n| n.attr("ID"))
        .map(str::to_string)
}
