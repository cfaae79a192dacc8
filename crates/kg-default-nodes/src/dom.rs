//! Owned, mutable DOM tree handed to conversion rules.
//!
//! Rules receive `&mut Element` for the subtree they are asked about. The tree
//! only models what the import rules need: element names, attributes, text and
//! comments. Queries are by tag name, in document (pre-)order, mirroring
//! `querySelector` / `querySelectorAll` with a bare tag selector.

use smol_str::SmolStr;

/// Elements that never have children or an end tag when serialized.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text children are serialized without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    Element(Element),
    Text(String),
    Comment(String),
}

impl DomNode {
    pub fn text(text: impl Into<String>) -> Self {
        DomNode::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            DomNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            DomNode::Element(element) => Some(element),
            _ => None,
        }
    }

    fn append_text_content(&self, out: &mut String) {
        match self {
            DomNode::Element(element) => {
                for child in &element.children {
                    child.append_text_content(out);
                }
            }
            DomNode::Text(text) => out.push_str(text),
            DomNode::Comment(_) => {}
        }
    }
}

impl From<Element> for DomNode {
    fn from(element: Element) -> Self {
        DomNode::Element(element)
    }
}

/// What [`Element::rewrite_descendants`] should do with a visited element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Leave the element in place and keep walking into its children.
    Keep,
    /// Detach the element and its subtree.
    Remove,
    /// Swap the element (and its subtree) for another node.
    Replace(DomNode),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: SmolStr,
    attrs: Vec<(SmolStr, String)>,
    children: Vec<DomNode>,
}

impl Element {
    /// Create an element. Tag names are stored lowercased, like an HTML document does.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: SmolStr::new(name.as_ref().to_ascii_lowercase()),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<DomNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(DomNode::Text(text.into()))
    }

    pub fn tag_name(&self) -> &str {
        &self.name
    }

    /// Does this element have the given tag name? Case-insensitive.
    pub fn is(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref().to_ascii_lowercase();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((SmolStr::new(name), value)),
        }
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn children(&self) -> &[DomNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<DomNode> {
        &mut self.children
    }

    pub fn push_child(&mut self, child: impl Into<DomNode>) {
        self.children.push(child.into());
    }

    /// Direct element children, skipping text and comments (`Element.children`).
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(DomNode::as_element)
    }

    pub fn first_element_child(&self) -> Option<&Element> {
        self.element_children().next()
    }

    /// All descendant elements in document order, not including `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// First descendant with the given tag, like `querySelector(tag)`.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        self.descendants().find(|element| element.is(tag))
    }

    /// Every descendant with the given tag in document order, like `querySelectorAll(tag)`.
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.descendants().filter(move |element| element.is(tag))
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.find(tag).is_some()
    }

    /// Concatenated text of every descendant text node (`textContent`).
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.append_text_content(&mut out);
        }
        out
    }

    /// Serialized markup of the children (`innerHTML`).
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_node(&mut out, child, self.tag_name());
        }
        out
    }

    /// Serialized markup of the element itself (`outerHTML`).
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_element(&mut out, self);
        out
    }

    /// Detach every descendant element with the given tag. Matches nested inside
    /// a removed match go with it. Returns how many subtrees were detached.
    pub fn remove_descendants(&mut self, tag: &str) -> usize {
        let mut removed = 0;
        self.rewrite_descendants(&mut |element| {
            if element.is(tag) {
                removed += 1;
                Rewrite::Remove
            } else {
                Rewrite::Keep
            }
        });
        removed
    }

    /// Visit descendant elements in document order, letting `f` keep, remove or
    /// replace each one. Replaced or removed subtrees are not visited further.
    pub fn rewrite_descendants(&mut self, f: &mut impl FnMut(&Element) -> Rewrite) {
        let mut index = 0;
        while index < self.children.len() {
            let rewrite = match &self.children[index] {
                DomNode::Element(element) => f(element),
                _ => Rewrite::Keep,
            };
            match rewrite {
                Rewrite::Keep => {
                    if let DomNode::Element(element) = &mut self.children[index] {
                        element.rewrite_descendants(f);
                    }
                    index += 1;
                }
                Rewrite::Remove => {
                    self.children.remove(index);
                }
                Rewrite::Replace(node) => {
                    self.children[index] = node;
                    index += 1;
                }
            }
        }
    }
}

/// Pre-order iterator over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<&'a DomNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if let DomNode::Element(element) = node {
                self.stack.extend(element.children.iter().rev());
                return Some(element);
            }
        }
        None
    }
}

/// A parsed HTML fragment. The fragment's top-level nodes are the children of
/// a synthetic `<body>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    body: Element,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            body: Element::new("body"),
        }
    }
}

impl Document {
    pub fn from_body(body: Element) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Element {
        &mut self.body
    }

    pub fn into_body(self) -> Element {
        self.body
    }
}

fn write_node(out: &mut String, node: &DomNode, parent: &str) {
    match node {
        DomNode::Element(element) => write_element(out, element),
        DomNode::Text(text) => {
            if RAW_TEXT_ELEMENTS.contains(&parent) {
                out.push_str(text);
            } else {
                escape_text(out, text);
            }
        }
        DomNode::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
    }
}

fn write_element(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_attr(out, value);
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag_name()) {
        return;
    }

    for child in &element.children {
        write_node(out, child, element.tag_name());
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn escape_text(out: &mut String, text: &str) {
    push_with_nbsp(out, &html_escape::encode_text(text));
}

fn escape_attr(out: &mut String, value: &str) {
    push_with_nbsp(out, &html_escape::encode_double_quoted_attribute(value));
}

/// Non-breaking spaces serialize as `&nbsp;`, the way `innerHTML` writes them.
fn push_with_nbsp(out: &mut String, escaped: &str) {
    let mut parts = escaped.split('\u{a0}');
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    for part in parts {
        out.push_str("&nbsp;");
        out.push_str(part);
    }
}
