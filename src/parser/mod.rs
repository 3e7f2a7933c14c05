//! OneNote XML parsing module.

mod hierarchy;
mod xml;

pub use hierarchy::{child_objects, find_by_id, find_id_by_name, section_pages};
pub use xml::parse_document;
