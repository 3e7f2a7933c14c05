//! OneNote XML to [`DocumentNode`] tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::model::DocumentNode;

/// Parse a OneNote XML document (page or hierarchy) into a node tree.
///
/// Namespace prefixes are dropped from element and attribute names,
/// `xmlns` declarations are skipped, entities are resolved and CDATA is
/// kept verbatim. Whitespace-only text between elements is ignored.
pub fn parse_document(xml: &str) -> Result<DocumentNode> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<DocumentNode> = Vec::new();
    let mut root: Option<DocumentNode> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(start_node(&e)?),
            Event::Empty(e) => {
                let node = start_node(&e)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| Error::DocumentFormat("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(e) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                push_text(&mut stack, &raw, false)?;
            }
            Event::CData(e) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                push_text(&mut stack, &raw, true)?;
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                push_text(&mut stack, &resolve_entity(&entity), true)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::DocumentFormat(format!(
            "unclosed element <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| Error::DocumentFormat("no root element".to_string()))
}

fn start_node(e: &BytesStart<'_>) -> Result<DocumentNode> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut node = DocumentNode::new(name);

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let raw = String::from_utf8_lossy(&attr.value);
        let value = quick_xml::escape::unescape(&raw).map_err(quick_xml::Error::from)?;
        node.attributes
            .push((local_name(&key).to_string(), value.into_owned()));
    }

    Ok(node)
}

fn attach(
    stack: &mut [DocumentNode],
    root: &mut Option<DocumentNode>,
    node: DocumentNode,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(Error::DocumentFormat(format!(
            "multiple root elements (second: <{}>)",
            node.name
        )));
    }
    *root = Some(node);
    Ok(())
}

fn push_text(stack: &mut [DocumentNode], text: &str, significant: bool) -> Result<()> {
    let Some(current) = stack.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(Error::DocumentFormat(
            "text outside of the root element".to_string(),
        ));
    };

    match current.text {
        Some(ref mut existing) => existing.push_str(text),
        None if significant || !text.trim().is_empty() => current.text = Some(text.to_string()),
        None => {}
    }
    Ok(())
}

fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

fn resolve_entity(entity: &str) -> String {
    match entity {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "quot" => "\"".to_string(),
        "apos" => "'".to_string(),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok()
            } else {
                None
            };

            match code.and_then(char::from_u32) {
                Some(c) => c.to_string(),
                None => format!("&{};", entity),
            }
        }
    }
}
