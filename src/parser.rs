use crate::{error::IngestError, model::Node};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use std::borrow::Cow;

/// Build a `Node` tree out of a raw XML document.
///
/// Only the first root element is kept. Entities that fail to unescape are
/// kept verbatim rather than failing the whole document.
pub fn parse_document(xml: &[u8]) -> Result<Node, IngestError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(open(&e)?),
            Event::Empty(e) => {
                let node = open(&e)?;
                close(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                if let Some(node) = stack.pop() {
                    close(&mut stack, &mut root, node);
                }
            }
            Event::Text(e) => {
                if let Some(top) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned().into());
                    top.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => (),
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(IngestError::Truncated(open.name.clone()));
    }
    root.ok_or(IngestError::EmptyPayload)
}

fn open(e: &BytesStart) -> Result<Node, IngestError> {
    let mut node = Node::new(&String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .unwrap_or_else(|_| Cow::Owned(String::from_utf8_lossy(&attr.value).into_owned()))
            .into_owned();
        node.attrs.push((key, value));
    }
    Ok(node)
}

fn close(stack: &mut Vec<Node>, root: &mut Option<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}
