//! Minimal namespace-aware element tree built on `quick-xml`.
//!
//! Benchmark extraction needs random access (sibling fallbacks, attribute
//! filters, "first child named X"), so the event stream is folded into a
//! small owned tree before any field is read. An element's `text` is the
//! character data that precedes its first child element, entities resolved.

use crate::error::{CklbError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::borrow::Cow;

/// One parsed XML element
#[derive(Debug, Clone, Default)]
pub(crate) struct Element {
    /// Resolved namespace URI, `None` when unqualified
    pub namespace: Option<String>,
    /// Local (unprefixed) name
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn open(namespace: Option<String>, start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| CklbError::invalid_xml(format!("<{name}>"), e.to_string()))?;
            let key = attr.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                continue;
            }
            let local = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned(), Cow::into_owned);
            attributes.push((local, value));
        }
        Ok(Self {
            namespace,
            name,
            attributes,
            ..Self::default()
        })
    }

    /// Whether this element is `{namespace}name`
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// Attribute value by local name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child `{namespace}name`
    pub fn child(&self, namespace: &str, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.is(namespace, name))
    }

    /// Every direct child `{namespace}name`, in document order
    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.is(namespace, name))
    }

    /// Descend through a chain of direct children
    pub fn path(&self, namespace: &str, names: &[&str]) -> Option<&Self> {
        names
            .iter()
            .try_fold(self, |current, name| current.child(namespace, name))
    }
}

/// Parse a complete document and return its root element.
pub(crate) fn parse_document(content: &str) -> Result<Element> {
    let mut reader = NsReader::from_str(content);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_resolved_event()
            .map(|(ns, event)| (resolved_namespace(&ns), event));

        match event {
            Ok((namespace, Event::Start(ref start))) => {
                stack.push(Element::open(namespace, start)?);
            }
            Ok((namespace, Event::Empty(ref start))) => {
                let element = Element::open(namespace, start)?;
                attach(element, &mut stack, &mut root)?;
            }
            Ok((_, Event::End(_))) => {
                let element = stack.pop().ok_or_else(|| {
                    CklbError::invalid_xml("document", "closing tag without opening tag")
                })?;
                attach(element, &mut stack, &mut root)?;
            }
            Ok((_, Event::Text(ref text))) => {
                if let Some(current) = stack.last_mut() {
                    if current.children.is_empty() {
                        let decoded = text
                            .unescape()
                            .map_or_else(|_| String::from_utf8_lossy(text).into_owned(), Cow::into_owned);
                        current.text.push_str(&decoded);
                    }
                }
            }
            Ok((_, Event::CData(ref data))) => {
                if let Some(current) = stack.last_mut() {
                    if current.children.is_empty() {
                        current.text.push_str(&String::from_utf8_lossy(data));
                    }
                }
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(CklbError::invalid_xml(
                    format!("byte {}", reader.buffer_position()),
                    e.to_string(),
                ));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(CklbError::invalid_xml(
            "document",
            format!("unexpected end of input inside <{}>", open.name),
        ));
    }

    root.ok_or_else(|| CklbError::invalid_xml("document", "no root element"))
}

fn resolved_namespace(result: &ResolveResult<'_>) -> Option<String> {
    match result {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        _ => None,
    }
}

fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(CklbError::invalid_xml("document", "multiple root elements"))
    }
}
