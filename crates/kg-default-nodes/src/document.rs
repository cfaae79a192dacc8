//! Document construction.
//!
//! Everything that turns markup into a [`Document`] goes through
//! [`CreateDocument`], so the importer and the sanitizer build their trees the
//! same way. Callers pass the factory explicitly.

use scraper::{ElementRef, Html, Node};

use crate::dom::{Document, DomNode, Element};

/// The capability to build a scratch document from an HTML string.
pub trait CreateDocument {
    /// Parse `html` as the body of a new document.
    fn create_document(&self, html: &str) -> Document;
}

impl<T: CreateDocument + ?Sized> CreateDocument for &T {
    fn create_document(&self, html: &str) -> Document {
        (**self).create_document(html)
    }
}

/// HTML5 fragment parsing backed by `scraper` (html5ever).
#[derive(Debug, Clone, Copy, Default)]
pub struct Html5Documents;

impl CreateDocument for Html5Documents {
    fn create_document(&self, html: &str) -> Document {
        let fragment = Html::parse_fragment(html);
        let mut body = Element::new("body");
        append_children(&mut body, fragment.root_element());
        Document::from_body(body)
    }
}

fn append_children(target: &mut Element, source: ElementRef<'_>) {
    for child in source.children() {
        match child.value() {
            Node::Text(text) => {
                let text: &str = text;
                target.push_child(DomNode::Text(text.to_owned()));
            }
            Node::Comment(comment) => {
                let comment: &str = comment;
                target.push_child(DomNode::Comment(comment.to_owned()));
            }
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    target.push_child(convert_element(element));
                }
            }
            _ => {}
        }
    }
}

fn convert_element(source: ElementRef<'_>) -> Element {
    let value = source.value();
    let mut element = Element::new(value.name());
    for (name, attr) in value.attrs() {
        element.set_attr(name, attr);
    }
    append_children(&mut element, source);
    element
}
