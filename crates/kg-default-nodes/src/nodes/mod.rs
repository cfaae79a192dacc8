//! Node types produced by the import rules.

pub mod codeblock;
pub mod paragraph;

use serde_json::Value;

use crate::error::NodeError;
pub use codeblock::{CodeBlockNode, CodeBlockPayload};
pub use paragraph::ParagraphNode;

/// Every node the default import pipeline can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KoenigNode {
    CodeBlock(CodeBlockNode),
    Paragraph(ParagraphNode),
}

impl KoenigNode {
    pub fn node_type(&self) -> &'static str {
        match self {
            KoenigNode::CodeBlock(_) => CodeBlockNode::TYPE,
            KoenigNode::Paragraph(_) => ParagraphNode::TYPE,
        }
    }

    pub fn export_json(&self) -> Value {
        match self {
            KoenigNode::CodeBlock(node) => node.export_json(),
            KoenigNode::Paragraph(node) => node.export_json(),
        }
    }

    /// Dispatch on the `type` field to the matching node's importer.
    pub fn import_json(value: &Value) -> Result<Self, NodeError> {
        let node_type = value
            .as_object()
            .ok_or(NodeError::NotAnObject)?
            .get("type")
            .and_then(Value::as_str)
            .ok_or(NodeError::MissingType)?;
        match node_type {
            CodeBlockNode::TYPE => CodeBlockNode::import_json(value).map(KoenigNode::CodeBlock),
            ParagraphNode::TYPE => ParagraphNode::import_json(value).map(KoenigNode::Paragraph),
            other => Err(NodeError::UnknownType(other.to_owned())),
        }
    }

    pub fn as_code_block(&self) -> Option<&CodeBlockNode> {
        match self {
            KoenigNode::CodeBlock(node) => Some(node),
            _ => None,
        }
    }
}

impl From<CodeBlockPayload> for KoenigNode {
    fn from(payload: CodeBlockPayload) -> Self {
        KoenigNode::CodeBlock(CodeBlockNode::from(payload))
    }
}

impl From<CodeBlockNode> for KoenigNode {
    fn from(node: CodeBlockNode) -> Self {
        KoenigNode::CodeBlock(node)
    }
}

impl From<ParagraphNode> for KoenigNode {
    fn from(node: ParagraphNode) -> Self {
        KoenigNode::Paragraph(node)
    }
}

/// Check the `type` / `version` header shared by every exported node.
pub(crate) fn check_header(
    value: &Value,
    expected: &'static str,
    supported_version: u64,
) -> Result<(), NodeError> {
    let object = value.as_object().ok_or(NodeError::NotAnObject)?;
    let found = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(NodeError::MissingType)?;
    if found != expected {
        return Err(NodeError::WrongType {
            expected,
            found: found.to_owned(),
        });
    }
    if let Some(version) = object.get("version").and_then(Value::as_u64) {
        if version > supported_version {
            return Err(NodeError::UnsupportedVersion {
                node_type: expected,
                version,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_import_dispatches_on_type() {
        let node = KoenigNode::import_json(&json!({"type": "paragraph", "version": 1, "text": "hi"})).unwrap();
        assert_eq!(node, KoenigNode::Paragraph(ParagraphNode::new("hi")));
        assert_eq!(node.node_type(), "paragraph");
        assert!(node.as_code_block().is_none());

        let node = KoenigNode::import_json(&json!({"type": "codeblock", "code": "x"})).unwrap();
        assert_eq!(node.as_code_block().map(|c| c.code.as_str()), Some("x"));
    }

    #[test]
    fn test_import_rejects_unknown_type() {
        let err = KoenigNode::import_json(&json!({"type": "image"})).unwrap_err();
        assert!(matches!(err, NodeError::UnknownType(ref t) if t == "image"));
        let err = KoenigNode::import_json(&json!({"code": "x"})).unwrap_err();
        assert!(matches!(err, NodeError::MissingType));
    }

    #[test]
    fn test_export_round_trips_through_enum() {
        let nodes = vec![
            KoenigNode::from(CodeBlockPayload::new("a").with_caption("c")),
            KoenigNode::from(ParagraphNode::new("b")),
        ];
        for node in nodes {
            assert_eq!(KoenigNode::import_json(&node.export_json()).unwrap(), node);
        }
    }
}
