//! XML text to [`Document`] using the quick-xml pull reader.

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::{debug, trace};

use crate::domain::document::{Attribute, Declaration, Document, Element, NodeId, NodeKind};
use crate::domain::error::{DomainError, DomainResult};

/// Parse a complete document held in memory.
///
/// Whitespace text is kept as-is so that everything the operator does not
/// touch is written back unchanged. Namespace declarations (`xmlns`,
/// `xmlns:prefix`) are recorded on the document in order of discovery.
pub fn parse_document(xml: &str) -> DomainResult<Document> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut doc = Document::new();
    let mut open: Vec<(NodeId, String)> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| malformed(reader.error_position(), e))?;
        let parent = open.last().map(|(id, _)| *id);

        match event {
            Event::Decl(decl) => {
                doc.declaration = declaration(&decl);
            }
            Event::DocType(text) => {
                doc.doctype = Some(lossy(&text).trim().to_string());
            }
            Event::Start(start) => {
                let element = element(&mut doc, &start, false, reader.buffer_position())?;
                let name = element.name.clone();
                let id = doc.append(parent, NodeKind::Element(element))?;
                open.push((id, name));
            }
            Event::Empty(start) => {
                let element = element(&mut doc, &start, true, reader.buffer_position())?;
                doc.append(parent, NodeKind::Element(element))?;
            }
            Event::End(end) => {
                let name = lossy(end.name().as_ref());
                match open.pop() {
                    Some((_, expected)) if expected == name => {}
                    _ => return Err(DomainError::UnexpectedClose(name)),
                }
            }
            Event::Text(text) => {
                push_text(&mut doc, parent, &lossy(&text), reader.buffer_position())?;
            }
            Event::GeneralRef(reference) => {
                let raw = format!("&{};", lossy(&reference));
                push_text(&mut doc, parent, &raw, reader.buffer_position())?;
            }
            Event::CData(data) => {
                let parent = parent.ok_or_else(|| DomainError::Malformed {
                    position: reader.buffer_position(),
                    message: "CDATA outside the root element".to_string(),
                })?;
                doc.append(Some(parent), NodeKind::CData(lossy(&data)))?;
            }
            Event::Comment(text) => {
                doc.append(parent, NodeKind::Comment(lossy(&text)))?;
            }
            Event::PI(pi) => {
                doc.append(parent, NodeKind::ProcessingInstruction(lossy(&pi)))?;
            }
            Event::Eof => break,
        }
    }

    if let Some((_, name)) = open.pop() {
        return Err(DomainError::Unclosed(name));
    }
    if doc.root().is_none() {
        return Err(DomainError::MissingRoot);
    }

    debug!(
        "parsed document: {} nodes, {} namespace declarations",
        doc.len(),
        doc.namespaces().len()
    );
    Ok(doc)
}

fn malformed(position: u64, err: impl std::fmt::Display) -> DomainError {
    DomainError::Malformed {
        position,
        message: err.to_string(),
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn declaration(decl: &BytesDecl<'_>) -> Declaration {
    let version = decl
        .version()
        .map(|v| lossy(&v))
        .unwrap_or_else(|_| Declaration::default().version);
    let standalone = decl.standalone().and_then(Result::ok).map(|s| lossy(&s));
    Declaration {
        version,
        standalone,
    }
}

fn element(
    doc: &mut Document,
    start: &BytesStart<'_>,
    self_closing: bool,
    position: u64,
) -> DomainResult<Element> {
    let mut element = Element::new(lossy(start.name().as_ref()));
    element.self_closing = self_closing;

    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(position, e))?;
        let name = lossy(attr.key.as_ref());
        let value = lossy(&attr.value);

        if name == "xmlns" {
            trace!("default namespace {}", value);
            doc.record_namespace("", value.clone());
        } else if let Some(prefix) = name.strip_prefix("xmlns:") {
            trace!("namespace {} -> {}", prefix, value);
            doc.record_namespace(prefix, value.clone());
        }
        element.attributes.push(Attribute { name, value });
    }
    Ok(element)
}

fn push_text(
    doc: &mut Document,
    parent: Option<NodeId>,
    raw: &str,
    position: u64,
) -> DomainResult<()> {
    match parent {
        Some(parent) => doc.push_text(parent, raw),
        // Whitespace around the root is regenerated by the writer
        None if raw.trim().is_empty() => Ok(()),
        None => Err(DomainError::Malformed {
            position,
            message: "text outside the root element".to_string(),
        }),
    }
}
