//! The import pipeline: walk a parsed fragment and turn it into nodes.
//!
//! Each element is offered to the conversion map. When every rule declines,
//! the importer walks into sectioning containers and into any element holding
//! a tag some rule is registered for, so nested blocks still reach their
//! rules. Any other element becomes a paragraph of its text.

use tracing::debug;

use crate::conversion::{ConversionContext, DomConversionMap};
use crate::dom::{Document, DomNode, Element};
use crate::nodes::codeblock::CodeBlockParser;
use crate::nodes::{CodeBlockPayload, KoenigNode, ParagraphNode};

/// Elements that only group other content and are walked into when no rule
/// claims them.
const CONTAINER_TAGS: &[&str] = &[
    "figure",
    "div",
    "section",
    "article",
    "main",
    "header",
    "footer",
    "aside",
    "blockquote",
    "ul",
    "ol",
    "li",
];

/// Rules for every default node.
pub fn default_conversions() -> DomConversionMap<KoenigNode> {
    CodeBlockParser::<KoenigNode>::new().dom_conversion_map()
}

/// Parse `html` with the context's document factory and import it.
pub fn import_html<N>(
    html: &str,
    conversions: &DomConversionMap<N>,
    ctx: &ConversionContext<'_>,
) -> Vec<N>
where
    N: From<ParagraphNode>,
{
    let mut document = ctx.documents.create_document(html);
    import_document(&mut document, conversions, ctx)
}

/// Import an already parsed document. Rules may mutate it.
pub fn import_document<N>(
    document: &mut Document,
    conversions: &DomConversionMap<N>,
    ctx: &ConversionContext<'_>,
) -> Vec<N>
where
    N: From<ParagraphNode>,
{
    let mut nodes = Vec::new();
    import_children(document.body_mut(), conversions, ctx, &mut nodes);
    debug!(nodes = nodes.len(), "imported document");
    nodes
}

fn import_children<N>(
    parent: &mut Element,
    conversions: &DomConversionMap<N>,
    ctx: &ConversionContext<'_>,
    nodes: &mut Vec<N>,
) where
    N: From<ParagraphNode>,
{
    for child in parent.children_mut() {
        match child {
            DomNode::Element(element) => import_element(element, conversions, ctx, nodes),
            DomNode::Text(text) => push_paragraph(text, ctx, nodes),
            DomNode::Comment(_) => {}
        }
    }
}

fn import_element<N>(
    element: &mut Element,
    conversions: &DomConversionMap<N>,
    ctx: &ConversionContext<'_>,
    nodes: &mut Vec<N>,
) where
    N: From<ParagraphNode>,
{
    if let Some(output) = conversions.convert(element, ctx) {
        nodes.push(output.node);
        return;
    }

    let nests_convertible = conversions.tags().any(|tag| element.contains_tag(tag));
    if nests_convertible || CONTAINER_TAGS.contains(&element.tag_name()) {
        import_children(element, conversions, ctx, nodes);
    } else {
        push_paragraph(&element.text_content(), ctx, nodes);
    }
}

fn push_paragraph<N>(text: &str, ctx: &ConversionContext<'_>, nodes: &mut Vec<N>)
where
    N: From<ParagraphNode>,
{
    let text = text.trim();
    if text.is_empty() || !ctx.options.paragraph_fallback {
        return;
    }
    nodes.push(N::from(ParagraphNode::new(text)));
}

/// Code block payloads found in `html`, ignoring everything else.
pub fn code_block_payloads(html: &str, ctx: &ConversionContext<'_>) -> Vec<CodeBlockPayload> {
    let conversions = CodeBlockParser::<Extracted>::new().dom_conversion_map();
    import_html(html, &conversions, ctx)
        .into_iter()
        .filter_map(|extracted| match extracted {
            Extracted::CodeBlock(payload) => Some(payload),
            Extracted::Other => None,
        })
        .collect()
}

/// Payloads kept as the rules produced them, so nothing is lost to a node
/// round trip.
enum Extracted {
    CodeBlock(CodeBlockPayload),
    Other,
}

impl From<CodeBlockPayload> for Extracted {
    fn from(payload: CodeBlockPayload) -> Self {
        Self::CodeBlock(payload)
    }
}

impl From<ParagraphNode> for Extracted {
    fn from(_: ParagraphNode) -> Self {
        Self::Other
    }
}
