//! Output writers.
//!
//! A [`PageWriter`] keeps a cursor of open logical subdirectories and
//! persists pages and resources relative to it. [`DirectoryStack`] pairs
//! every push with a pop on all exit paths.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::PageArtifact;

/// Destination for converted pages.
pub trait PageWriter {
    /// Open a subdirectory below the current one.
    fn push_directory(&mut self, name: &str) -> Result<()>;

    /// Close the innermost open subdirectory.
    ///
    /// # Panics
    ///
    /// Panics when no directory is open.
    fn pop_directory(&mut self);

    /// Persist one page inside the current directory.
    fn write_page(&mut self, artifact: &PageArtifact) -> Result<()>;

    /// Persist raw bytes at a path relative to the current directory.
    fn write_resource(&mut self, relative_path: &str, bytes: &[u8]) -> Result<()>;

    /// Number of open subdirectories.
    fn depth(&self) -> usize;

    /// `/`-joined location of `relative_path` below the writer root.
    fn display_path(&self, relative_path: &str) -> String;
}

fn check_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("empty {} name", kind)));
    }
    Ok(())
}

fn check_directory_name(name: &str) -> Result<()> {
    check_name("directory", name)?;
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::InvalidArgument(format!(
            "directory name escapes its parent: {}",
            name
        )));
    }
    Ok(())
}

fn join_path(stack: &[String], name: &str) -> String {
    let mut parts: Vec<&str> = stack.iter().map(String::as_str).collect();
    parts.push(name);
    parts.join("/")
}

/// A page persisted by [`MemoryWriter`].
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenPage {
    /// `/`-joined path including open directories
    pub path: String,
    /// Full file content (front matter included when enabled)
    pub content: String,
}

/// Writer that records everything in memory.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    stack: Vec<String>,
    pages: Vec<WrittenPage>,
    resources: Vec<(String, Vec<u8>)>,
}

impl MemoryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages in write order.
    pub fn pages(&self) -> &[WrittenPage] {
        &self.pages
    }

    /// Paths of written pages, in write order.
    pub fn page_paths(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.path.as_str()).collect()
    }

    /// Content of the page written at `path`.
    pub fn page(&self, path: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|p| p.path == path)
            .map(|p| p.content.as_str())
    }

    /// Bytes of the resource written at `path`.
    pub fn resource(&self, path: &str) -> Option<&[u8]> {
        self.resources
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, b)| b.as_slice())
    }

    /// Number of resources written.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}

impl PageWriter for MemoryWriter {
    fn push_directory(&mut self, name: &str) -> Result<()> {
        check_directory_name(name)?;
        self.stack.push(name.to_string());
        Ok(())
    }

    fn pop_directory(&mut self) {
        if self.stack.pop().is_none() {
            panic!("pop_directory called without an open directory");
        }
    }

    fn write_page(&mut self, artifact: &PageArtifact) -> Result<()> {
        check_name("file", &artifact.relative_path)?;
        self.pages.push(WrittenPage {
            path: join_path(&self.stack, &artifact.relative_path),
            content: artifact.content(),
        });
        Ok(())
    }

    fn write_resource(&mut self, relative_path: &str, bytes: &[u8]) -> Result<()> {
        check_name("resource", relative_path)?;
        self.resources
            .push((join_path(&self.stack, relative_path), bytes.to_vec()));
        Ok(())
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn display_path(&self, relative_path: &str) -> String {
        join_path(&self.stack, relative_path)
    }
}

/// Writer persisting files below a root directory.
#[derive(Debug)]
pub struct FsWriter {
    root: PathBuf,
    stack: Vec<String>,
}

impl FsWriter {
    /// Create a writer rooted at `root` (created on first write).
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            stack: Vec::new(),
        }
    }

    /// Directory the next page lands in.
    pub fn current_dir(&self) -> PathBuf {
        self.stack.iter().fold(self.root.clone(), |p, d| p.join(d))
    }

    fn target(&self, relative_path: &str) -> Result<PathBuf> {
        let rel = Path::new(relative_path);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(Error::InvalidArgument(format!(
                "path escapes output directory: {}",
                relative_path
            )));
        }
        let path = self.current_dir().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(path)
    }
}

impl PageWriter for FsWriter {
    fn push_directory(&mut self, name: &str) -> Result<()> {
        check_directory_name(name)?;
        self.stack.push(name.to_string());
        fs::create_dir_all(self.current_dir())?;
        Ok(())
    }

    fn pop_directory(&mut self) {
        if self.stack.pop().is_none() {
            panic!("pop_directory called without an open directory");
        }
    }

    fn write_page(&mut self, artifact: &PageArtifact) -> Result<()> {
        check_name("file", &artifact.relative_path)?;
        let path = self.target(&artifact.relative_path)?;
        fs::write(&path, artifact.content())?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }

    fn write_resource(&mut self, relative_path: &str, bytes: &[u8]) -> Result<()> {
        check_name("resource", relative_path)?;
        let path = self.target(relative_path)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    fn display_path(&self, relative_path: &str) -> String {
        join_path(&self.stack, relative_path)
    }
}

/// Scoped directory cursor over a writer.
///
/// Every directory pushed through the guard is popped when the guard is
/// dropped, whatever path the caller leaves by.
pub struct DirectoryStack<'a, W: PageWriter + ?Sized> {
    writer: &'a mut W,
    pushed: usize,
}

impl<'a, W: PageWriter + ?Sized> DirectoryStack<'a, W> {
    /// Start a scope at the writer's current directory.
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer, pushed: 0 }
    }

    /// Open a subdirectory owned by this scope.
    pub fn push(&mut self, name: &str) -> Result<()> {
        self.writer.push_directory(name)?;
        self.pushed += 1;
        Ok(())
    }

    /// Close the innermost directory owned by this scope.
    ///
    /// Returns `false` when the scope owns no directory.
    pub fn pop(&mut self) -> bool {
        if self.pushed == 0 {
            return false;
        }
        self.writer.pop_directory();
        self.pushed -= 1;
        true
    }

    /// Close every directory owned by this scope.
    pub fn pop_all(&mut self) {
        while self.pop() {}
    }

    /// Directories currently owned by this scope.
    pub fn depth(&self) -> usize {
        self.pushed
    }

    /// The underlying writer.
    pub fn writer(&mut self) -> &mut W {
        self.writer
    }
}

impl<W: PageWriter + ?Sized> Drop for DirectoryStack<'_, W> {
    fn drop(&mut self) {
        self.pop_all();
    }
}
