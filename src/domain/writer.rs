//! [`Document`] back to XML text.
//!
//! Names, attributes and text are written from their stored source form, so
//! prefixes and `xmlns` declarations come out exactly as they were parsed.
//! The output is always UTF-8 and carries a matching declaration.

use std::fmt::Write;

use crate::domain::document::{Document, NodeId, NodeKind};

/// Serialize the whole document, declaration first.
pub fn write_document(doc: &Document) -> String {
    let mut out = String::new();
    write_declaration(doc, &mut out);

    if let Some(doctype) = &doc.doctype {
        let _ = writeln!(out, "<!DOCTYPE {}>", doctype);
    }

    for &id in doc.top_level() {
        write_node(doc, id, &mut out);
        out.push('\n');
    }
    out
}

fn write_declaration(doc: &Document, out: &mut String) {
    let _ = write!(
        out,
        "<?xml version=\"{}\" encoding=\"UTF-8\"",
        doc.declaration.version
    );
    if let Some(standalone) = &doc.declaration.standalone {
        let _ = write!(out, " standalone=\"{}\"", standalone);
    }
    out.push_str("?>\n");
}

/// Serialize one node and its subtree.
pub fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    let Some(node) = doc.node(id) else {
        return;
    };

    match &node.kind {
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for attr in &element.attributes {
                // Raw values may contain the other quote character
                let quote = if attr.value.contains('"') { '\'' } else { '"' };
                let _ = write!(out, " {}={}{}{}", attr.name, quote, attr.value, quote);
            }
            if node.children.is_empty() && element.self_closing {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for &child in &node.children {
                write_node(doc, child, out);
            }
            let _ = write!(out, "</{}>", element.name);
        }
        NodeKind::Text(raw) => out.push_str(raw),
        NodeKind::CData(raw) => {
            let _ = write!(out, "<![CDATA[{}]]>", raw);
        }
        NodeKind::Comment(raw) => {
            let _ = write!(out, "<!--{}-->", raw);
        }
        NodeKind::ProcessingInstruction(raw) => {
            let _ = write!(out, "<?{}?>", raw);
        }
    }
}
