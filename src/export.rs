//! Page hierarchy export.
//!
//! Sections list their pages flat, each with a nesting level. [`layout_section`]
//! rebuilds the nesting from order and level alone and turns it into
//! directory push/pop steps; [`Exporter`] runs those steps against a
//! [`PageWriter`], converting each page on the way.

use crate::error::Result;
use crate::model::{PageDescriptor, ResourceSource};
use crate::parser::section_pages;
use crate::render::{convert_page, ConvertedPage, ExportReport, RenderOptions};
use crate::sanitize::sanitize_name;
use crate::source::{DocumentSource, HierarchyScope, ObjectKind};
use crate::writer::{DirectoryStack, PageWriter};

/// One step of a section export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutStep {
    /// Open a directory named after a parent page
    Push(String),
    /// Close the innermost directory
    Pop,
    /// Write the page at this index of the descriptor list
    Page(usize),
}

/// Nearest earlier page one level up, stopping at any shallower page.
fn find_parent(pages: &[PageDescriptor], index: usize) -> Option<usize> {
    let wanted = pages[index].level - 1;
    for j in (0..index).rev() {
        let level = pages[j].level;
        if level == wanted {
            return Some(j);
        }
        if level < wanted {
            return None;
        }
    }
    None
}

/// Turn a flat page list into directory steps.
///
/// Every page is written inside a directory named after its reconstructed
/// parent; a page never opens a directory for itself. A sub-page without
/// a parent is written at the section root. The returned steps are
/// balanced: every `Push` has a matching `Pop`.
///
/// # Example
///
/// ```
/// use unonenote::export::{layout_section, LayoutStep};
/// use unonenote::model::PageDescriptor;
///
/// let pages = vec![
///     PageDescriptor::new("1", "A", 1),
///     PageDescriptor::new("2", "B", 2),
/// ];
/// assert_eq!(
///     layout_section(&pages),
///     vec![
///         LayoutStep::Page(0),
///         LayoutStep::Push("A".to_string()),
///         LayoutStep::Page(1),
///         LayoutStep::Pop,
///     ]
/// );
/// ```
pub fn layout_section(pages: &[PageDescriptor]) -> Vec<LayoutStep> {
    let mut steps = Vec::with_capacity(pages.len() * 2);
    // (level, index) of open parent directories
    let mut stack: Vec<(u32, usize)> = Vec::new();

    for (i, page) in pages.iter().enumerate() {
        while stack.last().is_some_and(|&(level, _)| level >= page.level) {
            stack.pop();
            steps.push(LayoutStep::Pop);
        }

        if page.level > 1 {
            match find_parent(pages, i) {
                Some(parent) => {
                    if stack.last().map(|&(_, idx)| idx) != Some(parent) {
                        stack.push((pages[parent].level, parent));
                        steps.push(LayoutStep::Push(pages[parent].name.clone()));
                    }
                }
                None => {
                    log::warn!(
                        "Page '{}' (level {}) has no parent; writing it at the section root",
                        page.name,
                        page.level
                    );
                    while stack.pop().is_some() {
                        steps.push(LayoutStep::Pop);
                    }
                }
            }
        }

        steps.push(LayoutStep::Page(i));
    }

    while stack.pop().is_some() {
        steps.push(LayoutStep::Pop);
    }
    steps
}

/// Converts pages from a [`DocumentSource`] and writes them to a [`PageWriter`].
#[derive(Debug, Clone)]
pub struct Exporter<S: DocumentSource> {
    source: S,
    options: RenderOptions,
}

impl<S: DocumentSource> Exporter<S> {
    /// Create an exporter with default options.
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: RenderOptions::default(),
        }
    }

    /// Set the render options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and convert one page.
    ///
    /// `file_stem` names the output file; without it the page title is used.
    pub fn convert_page(&self, page_id: &str, file_stem: Option<&str>) -> Result<ConvertedPage> {
        let tree = self.source.fetch_page(page_id)?;
        convert_page(&tree, &self.options, file_stem)
    }

    /// Convert one page and write it into the writer's current directory.
    pub fn export_page<W: PageWriter + ?Sized>(
        &self,
        page_id: &str,
        writer: &mut W,
    ) -> Result<ExportReport> {
        let mut report = ExportReport::new();
        let converted = self.convert_page(page_id, None)?;
        self.write_converted(page_id, converted, writer, &mut report)?;
        Ok(report)
    }

    /// Export one section into a directory named after it.
    ///
    /// Sub-pages land in directories named after their parent pages. A page
    /// that fails is logged and recorded in the report; the rest of the
    /// section is still exported.
    pub fn export_section<W: PageWriter + ?Sized>(
        &self,
        section_id: &str,
        writer: &mut W,
    ) -> Result<ExportReport> {
        let tree = self.source.fetch_tree(Some(section_id), HierarchyScope::Pages)?;
        let name = sanitize_name(tree.attr("name").unwrap_or_default());
        let pages = section_pages(&tree);
        log::info!("Exporting section '{}' ({} pages)", name, pages.len());

        let mut report = ExportReport::new();
        let mut dirs = DirectoryStack::new(writer);
        dirs.push(&name)?;

        for step in layout_section(&pages) {
            match step {
                LayoutStep::Push(dir) => dirs.push(&dir)?,
                LayoutStep::Pop => {
                    dirs.pop();
                }
                LayoutStep::Page(i) => {
                    let page = &pages[i];
                    let result = self
                        .convert_page(&page.id, Some(&page.name))
                        .and_then(|converted| {
                            self.write_converted(&page.id, converted, dirs.writer(), &mut report)
                        });
                    if let Err(e) = result {
                        log::warn!("Skipping page '{}' ({}): {}", page.name, page.id, e);
                        report.record_failure(&page.id, &page.name, e);
                    }
                }
            }
        }

        Ok(report)
    }

    /// Export the first section with the given name.
    pub fn export_section_by_name<W: PageWriter + ?Sized>(
        &self,
        name: &str,
        writer: &mut W,
    ) -> Result<ExportReport> {
        let id = self
            .source
            .resolve_id(HierarchyScope::Sections, ObjectKind::Section, name)?;
        self.export_section(&id, writer)
    }

    /// Export a section group: nested groups first, then its sections.
    pub fn export_section_group<W: PageWriter + ?Sized>(
        &self,
        group_id: &str,
        writer: &mut W,
    ) -> Result<ExportReport> {
        let tree = self.source.fetch_tree(Some(group_id), HierarchyScope::SelfOnly)?;
        let name = sanitize_name(tree.attr("name").unwrap_or_default());
        log::info!("Exporting section group '{}'", name);

        let mut dirs = DirectoryStack::new(writer);
        dirs.push(&name)?;
        self.export_children(group_id, dirs.writer())
    }

    /// Export a notebook, resolved by name, into the writer's current directory.
    pub fn export_notebook<W: PageWriter + ?Sized>(
        &self,
        name: &str,
        writer: &mut W,
    ) -> Result<ExportReport> {
        let id = self
            .source
            .resolve_id(HierarchyScope::Notebooks, ObjectKind::Notebook, name)?;
        log::info!("Exporting notebook '{}'", name);
        self.export_children(&id, writer)
    }

    fn export_children<W: PageWriter + ?Sized>(
        &self,
        parent_id: &str,
        writer: &mut W,
    ) -> Result<ExportReport> {
        let mut report = ExportReport::new();
        for (id, _) in self.source.child_objects(parent_id, ObjectKind::SectionGroup)? {
            report.merge(self.export_section_group(&id, writer)?);
        }
        for (id, _) in self.source.child_objects(parent_id, ObjectKind::Section)? {
            report.merge(self.export_section(&id, writer)?);
        }
        Ok(report)
    }

    fn write_converted<W: PageWriter + ?Sized>(
        &self,
        page_id: &str,
        converted: ConvertedPage,
        writer: &mut W,
        report: &mut ExportReport,
    ) -> Result<()> {
        writer.write_page(&converted.artifact)?;
        report
            .pages_written
            .push(writer.display_path(&converted.artifact.relative_path));
        report.stats.merge(&converted.stats);

        for resource in &converted.resources {
            let bytes = match (&resource.source, resource.inline_bytes()) {
                (_, Ok(Some(bytes))) => bytes,
                (ResourceSource::Callback(id), Ok(None)) => {
                    match self.source.fetch_resource(page_id, id) {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            log::warn!("Resource {} of page {} unavailable: {}", id, page_id, e);
                            continue;
                        }
                    }
                }
                (_, Ok(None)) => continue,
                (_, Err(e)) => {
                    log::warn!("Resource {} undecodable: {}", resource.relative_path, e);
                    continue;
                }
            };

            match writer.write_resource(&resource.relative_path, &bytes) {
                Ok(()) => report.resources_written += 1,
                Err(e) => log::warn!("Failed to write {}: {}", resource.relative_path, e),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(spec: &[(&str, u32)]) -> Vec<PageDescriptor> {
        spec.iter()
            .enumerate()
            .map(|(i, (name, level))| PageDescriptor::new((i + 1).to_string(), *name, *level))
            .collect()
    }

    /// Resolve steps into the directory each page is written in.
    fn placements(pages: &[PageDescriptor]) -> Vec<String> {
        let mut dirs: Vec<String> = Vec::new();
        let mut out = Vec::new();
        for step in layout_section(pages) {
            match step {
                LayoutStep::Push(name) => dirs.push(name),
                LayoutStep::Pop => {
                    dirs.pop().expect("balanced steps");
                }
                LayoutStep::Page(i) => {
                    let mut path = dirs.clone();
                    path.push(pages[i].name.clone());
                    out.push(path.join("/"));
                }
            }
        }
        assert!(dirs.is_empty());
        out
    }

    #[test]
    fn test_nearest_parent_wins() {
        let pages = pages(&[("A", 1), ("B", 2), ("C", 2), ("D", 3)]);
        assert_eq!(placements(&pages), vec!["A", "A/B", "A/C", "A/C/D"]);
    }

    #[test]
    fn test_siblings_share_one_push() {
        let pages = pages(&[("A", 1), ("B", 2), ("C", 2)]);
        let steps = layout_section(&pages);
        let pushes = steps
            .iter()
            .filter(|s| matches!(s, LayoutStep::Push(_)))
            .count();
        assert_eq!(pushes, 1);
    }

    #[test]
    fn test_multi_level_drop() {
        let pages = pages(&[("A", 1), ("B", 2), ("C", 3), ("D", 4), ("E", 1), ("F", 2)]);
        assert_eq!(
            placements(&pages),
            vec!["A", "A/B", "A/B/C", "A/B/C/D", "E", "E/F"]
        );
    }

    #[test]
    fn test_return_to_shallower_parent() {
        let pages = pages(&[("A", 1), ("B", 2), ("C", 3), ("D", 2)]);
        assert_eq!(placements(&pages), vec!["A", "A/B", "A/B/C", "A/D"]);
    }

    #[test]
    fn test_orphans_anchor_at_root() {
        let pages = pages(&[("X", 2), ("A", 1), ("B", 2), ("Y", 4), ("Z", 5)]);
        assert_eq!(placements(&pages), vec!["X", "A", "A/B", "Y", "Y/Z"]);
    }

    #[test]
    fn test_same_name_parents_are_distinct() {
        let pages = pages(&[("Notes", 1), ("a", 2), ("Notes", 1), ("b", 2)]);
        let steps = layout_section(&pages);
        assert_eq!(
            steps,
            vec![
                LayoutStep::Page(0),
                LayoutStep::Push("Notes".to_string()),
                LayoutStep::Page(1),
                LayoutStep::Pop,
                LayoutStep::Page(2),
                LayoutStep::Push("Notes".to_string()),
                LayoutStep::Page(3),
                LayoutStep::Pop,
            ]
        );
    }

    #[test]
    fn test_empty_section() {
        assert!(layout_section(&[]).is_empty());
    }
}
