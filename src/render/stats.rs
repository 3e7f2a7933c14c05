//! Conversion statistics and export reports.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Statistics collected while converting pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Number of styled headings emitted
    pub heading_count: u32,

    /// Number of outline elements visited
    pub paragraph_count: u32,

    /// Number of bullet and numbered list items
    pub list_item_count: u32,

    /// Number of to-do checkboxes
    pub checkbox_count: u32,

    /// Number of non-checkbox tags
    pub tag_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of table rows (header included)
    pub row_count: u32,

    /// Number of images linked
    pub image_count: u32,
}

impl ConversionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_heading(&mut self) {
        self.heading_count += 1;
    }

    pub fn add_paragraph(&mut self) {
        self.paragraph_count += 1;
    }

    pub fn add_list_item(&mut self) {
        self.list_item_count += 1;
    }

    pub fn add_checkbox(&mut self) {
        self.checkbox_count += 1;
    }

    pub fn add_tag(&mut self) {
        self.tag_count += 1;
    }

    pub fn add_table(&mut self) {
        self.table_count += 1;
    }

    pub fn add_row(&mut self) {
        self.row_count += 1;
    }

    pub fn add_image(&mut self) {
        self.image_count += 1;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ConversionStats) {
        self.heading_count += other.heading_count;
        self.paragraph_count += other.paragraph_count;
        self.list_item_count += other.list_item_count;
        self.checkbox_count += other.checkbox_count;
        self.tag_count += other.tag_count;
        self.table_count += other.table_count;
        self.row_count += other.row_count;
        self.image_count += other.image_count;
    }
}

/// A page the exporter had to skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedPage {
    pub id: String,
    pub name: String,
    pub error: String,
}

/// Outcome of a section, section-group or notebook export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReport {
    /// `/`-joined paths of written pages, relative to the writer root
    pub pages_written: Vec<String>,

    /// Pages that could not be converted or written
    pub pages_failed: Vec<FailedPage>,

    /// Number of resources persisted
    pub resources_written: u32,

    /// Merged statistics of all written pages
    pub stats: ConversionStats,
}

impl ExportReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every page was exported.
    pub fn is_success(&self) -> bool {
        self.pages_failed.is_empty()
    }

    /// Record a page failure.
    pub fn record_failure(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        error: impl ToString,
    ) {
        self.pages_failed.push(FailedPage {
            id: id.into(),
            name: name.into(),
            error: error.to_string(),
        });
    }

    /// Fold a nested report (e.g. of one section) into this one.
    pub fn merge(&mut self, other: ExportReport) {
        self.pages_written.extend(other.pages_written);
        self.pages_failed.extend(other.pages_failed);
        self.resources_written += other.resources_written;
        self.stats.merge(&other.stats);
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Render(e.to_string()))
    }
}
