//! Document model for OneNote page trees and conversion outputs.

mod content;
mod node;
mod page;
mod resource;
mod style;

pub use content::MarkdownContent;
pub use node::{DocumentNode, NodeKind};
pub use page::{parse_timestamp, PageArtifact, PageDescriptor};
pub use resource::{extension_for_format, PageResource, ResourceSource};
pub use style::{QuickStyleDef, StyleCatalog, TagDef, TagType};
