//! Owned XML element tree.
//!
//! Items are rendered into an [`Element`] value built in a single expression and
//! never mutated afterwards. Parsing materializes the whole document; there is no
//! streaming interface.

use crate::error::{ItemError, ItemResult};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

/// Deepest element nesting `parse` accepts. Readers and writers of the tree
/// recurse per level, so deeper documents are refused up front.
pub const MAX_DEPTH: usize = 128;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Appends an attribute; attributes are written in insertion order.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Text content directly inside this element, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn require_attr(&self, key: &str) -> ItemResult<&str> {
        self.attr(key).ok_or_else(|| {
            ItemError::xml(format!("<{}> is missing attribute '{}'", self.name, key))
        })
    }

    /// Walks down the first child matching each name in `path`.
    pub fn descend(&self, path: &[&str]) -> ItemResult<&Element> {
        let mut current = self;
        for (depth, name) in path.iter().enumerate() {
            current = current.child(name).ok_or_else(|| {
                let mut walked = vec![self.name.as_str()];
                walked.extend_from_slice(&path[..=depth]);
                ItemError::xml(format!("missing element {}", walked.join("/")))
            })?;
        }
        Ok(current)
    }

    /// Serializes the tree without an XML declaration.
    pub fn to_xml_string(&self) -> ItemResult<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| ItemError::XmlWrite(e.to_string()))
    }

    fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> ItemResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(write_error);
        }

        writer.write_event(Event::Start(start)).map_err(write_error)?;
        if let Some(text) = &self.text {
            writer
                .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
                .map_err(write_error)?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(write_error)
    }

    /// Parses a complete document (or fragment with a single root element).
    ///
    /// Element names are taken without namespace prefix; attribute keys are kept
    /// as written. Whitespace-only text between child elements is dropped.
    pub fn parse(input: &str) -> ItemResult<Element> {
        let mut reader = Reader::from_str(input);
        let mut stack: Vec<PendingElement> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    check_depth(stack.len())?;
                    stack.push(PendingElement::open(&start)?);
                }
                Event::Empty(start) => {
                    check_depth(stack.len())?;
                    let element = PendingElement::open(&start)?.close();
                    attach(element, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    let pending = stack
                        .pop()
                        .ok_or_else(|| ItemError::xml("unexpected closing tag"))?;
                    attach(pending.close(), &mut stack, &mut root)?;
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(cdata) => {
                    if let Some(top) = stack.last_mut() {
                        let raw = cdata.into_inner();
                        let text = std::str::from_utf8(&raw)
                            .map_err(|e| ItemError::xml(format!("CDATA is not UTF-8: {e}")))?;
                        top.text.push_str(text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(ItemError::xml("unexpected end of document"));
        }
        root.ok_or_else(|| ItemError::xml("document has no root element"))
    }
}

fn check_depth(open: usize) -> ItemResult<()> {
    if open >= MAX_DEPTH {
        return Err(ItemError::xml(format!(
            "elements are nested deeper than {MAX_DEPTH} levels"
        )));
    }
    Ok(())
}

fn write_error(err: quick_xml::Error) -> ItemError {
    ItemError::XmlWrite(err.to_string())
}

struct PendingElement {
    element: Element,
    text: String,
}

impl PendingElement {
    fn open(start: &BytesStart<'_>) -> ItemResult<Self> {
        let name = std::str::from_utf8(start.local_name().as_ref())
            .map_err(|e| ItemError::xml(format!("element name is not UTF-8: {e}")))?
            .to_string();

        let mut element = Element::new(name);
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ItemError::xml(e.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| ItemError::xml(format!("attribute name is not UTF-8: {e}")))?
                .to_string();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.push((key, value));
        }

        Ok(Self {
            element,
            text: String::new(),
        })
    }

    fn close(self) -> Element {
        let mut element = self.element;
        let mixed_whitespace = !element.children.is_empty() && self.text.trim().is_empty();
        if !self.text.is_empty() && !mixed_whitespace {
            element.text = Some(self.text);
        }
        element
    }
}

fn attach(
    element: Element,
    stack: &mut [PendingElement],
    root: &mut Option<Element>,
) -> ItemResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.element.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(ItemError::xml("document has more than one root element")),
    }
    Ok(())
}
