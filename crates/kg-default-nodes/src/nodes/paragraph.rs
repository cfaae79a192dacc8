use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::NodeError;
use crate::nodes::check_header;

/// Plain text the importer could not attach to a richer node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphNode {
    pub text: String,
}

impl ParagraphNode {
    pub const TYPE: &'static str = "paragraph";
    pub const VERSION: u64 = 1;

    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn export_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".into(), Value::from(Self::TYPE));
        object.insert("version".into(), Value::from(Self::VERSION));
        object.insert("text".into(), Value::from(self.text.as_str()));
        Value::Object(object)
    }

    pub fn import_json(value: &Value) -> Result<Self, NodeError> {
        check_header(value, Self::TYPE, Self::VERSION)?;
        Ok(serde_json::from_value(value.clone())?)
    }
}
