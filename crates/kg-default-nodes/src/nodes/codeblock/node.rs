use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::NodeError;
use crate::nodes::check_header;

/// Separator placed between caption fragments when a figure has several.
pub const CAPTION_SEPARATOR: &str = " / ";

/// Plain data pulled out of code block markup, before it becomes a node.
///
/// `language` and `caption` are only set when the markup carried them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlockPayload {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl CodeBlockPayload {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: None,
            caption: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Append a caption fragment, joining with [`CAPTION_SEPARATOR`].
    ///
    /// An empty caption so far is replaced rather than joined, so a leading
    /// empty fragment leaves no dangling separator.
    pub fn push_caption(&mut self, fragment: impl Into<String>) {
        let fragment = fragment.into();
        self.caption = Some(match self.caption.take() {
            Some(existing) if !existing.is_empty() => {
                format!("{existing}{CAPTION_SEPARATOR}{fragment}")
            }
            _ => fragment,
        });
    }
}

/// A code block card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeBlockNode {
    pub code: String,
    pub language: String,
    pub caption: String,
}

impl CodeBlockNode {
    pub const TYPE: &'static str = "codeblock";
    pub const VERSION: u64 = 1;

    pub fn new(payload: CodeBlockPayload) -> Self {
        Self {
            code: payload.code,
            language: payload.language.unwrap_or_default(),
            caption: payload.caption.unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn has_caption(&self) -> bool {
        !self.caption.is_empty()
    }

    /// Back to payload form; empty language and caption become absent.
    pub fn to_payload(&self) -> CodeBlockPayload {
        CodeBlockPayload {
            code: self.code.clone(),
            language: Some(self.language.clone()).filter(|l| !l.is_empty()),
            caption: Some(self.caption.clone()).filter(|c| !c.is_empty()),
        }
    }

    pub fn export_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".into(), Value::from(Self::TYPE));
        object.insert("version".into(), Value::from(Self::VERSION));
        object.insert("code".into(), Value::from(self.code.as_str()));
        object.insert("language".into(), Value::from(self.language.as_str()));
        object.insert("caption".into(), Value::from(self.caption.as_str()));
        Value::Object(object)
    }

    /// Rebuild a node from [`Self::export_json`] output. Missing fields default to empty.
    pub fn import_json(value: &Value) -> Result<Self, NodeError> {
        check_header(value, Self::TYPE, Self::VERSION)?;
        Ok(serde_json::from_value(value.clone())?)
    }
}

impl From<CodeBlockPayload> for CodeBlockNode {
    fn from(payload: CodeBlockPayload) -> Self {
        Self::new(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_caption_joins_fragments() {
        let mut payload = CodeBlockPayload::new("x");
        payload.push_caption("A");
        payload.push_caption("B");
        assert_eq!(payload.caption.as_deref(), Some("A / B"));
    }

    #[test]
    fn test_push_caption_after_empty_fragment() {
        let mut payload = CodeBlockPayload::new("x");
        payload.push_caption("");
        payload.push_caption("B");
        assert_eq!(payload.caption.as_deref(), Some("B"));

        let mut payload = CodeBlockPayload::new("x");
        payload.push_caption("A");
        payload.push_caption("");
        assert_eq!(payload.caption.as_deref(), Some("A / "));
    }

    #[test]
    fn test_payload_omits_absent_keys() {
        let payload = CodeBlockPayload::new("print(1)");
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({"code": "print(1)"}));
    }

    #[test]
    fn test_node_from_payload_defaults_to_empty() {
        let node = CodeBlockNode::from(CodeBlockPayload::new("ls").with_language("bash"));
        assert_eq!(node.language, "bash");
        assert_eq!(node.caption, "");
        assert!(!node.has_caption());
        assert!(!node.is_empty());
        assert!(CodeBlockNode::default().is_empty());
    }

    #[test]
    fn test_export_json() {
        let node = CodeBlockNode::new(
            CodeBlockPayload::new("fn main() {}\n")
                .with_language("rust")
                .with_caption("A <em>caption</em>"),
        );
        insta::assert_snapshot!(
            serde_json::to_string_pretty(&node.export_json()).unwrap(),
            @r#"
        {
          "type": "codeblock",
          "version": 1,
          "code": "fn main() {}\n",
          "language": "rust",
          "caption": "A <em>caption</em>"
        }
        "#
        );
    }

    #[test]
    fn test_import_json_round_trip() {
        let node = CodeBlockNode::new(CodeBlockPayload::new("x = 1").with_language("python"));
        let back = CodeBlockNode::import_json(&node.export_json()).unwrap();
        assert_eq!(back, node);
        assert_eq!(back.to_payload(), CodeBlockPayload::new("x = 1").with_language("python"));
    }

    #[test]
    fn test_import_json_fills_missing_fields() {
        let node = CodeBlockNode::import_json(&json!({"type": "codeblock", "code": "x"})).unwrap();
        assert_eq!(node.code, "x");
        assert_eq!(node.language, "");
    }

    #[test]
    fn test_import_json_rejects_other_types() {
        let err = CodeBlockNode::import_json(&json!({"type": "paragraph", "text": "x"})).unwrap_err();
        assert!(matches!(err, NodeError::WrongType { expected: "codeblock", .. }));

        let err = CodeBlockNode::import_json(&json!({"type": "codeblock", "version": 2})).unwrap_err();
        assert!(matches!(err, NodeError::UnsupportedVersion { version: 2, .. }));

        let err = CodeBlockNode::import_json(&json!(["codeblock"])).unwrap_err();
        assert!(matches!(err, NodeError::NotAnObject));
    }
}
