//! Errors for the fallible edges of the crate.
//!
//! Conversion rules never error; they decline. Only node JSON import/export can fail.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum NodeError {
    #[error("node json must be an object")]
    #[diagnostic(code(kg::node::not_object))]
    NotAnObject,

    #[error("node json has no `type` field")]
    #[diagnostic(code(kg::node::missing_type))]
    MissingType,

    #[error("unknown node type: {0}")]
    #[diagnostic(
        code(kg::node::unknown_type),
        help("known node types are `codeblock` and `paragraph`")
    )]
    UnknownType(String),

    #[error("expected a `{expected}` node, found `{found}`")]
    #[diagnostic(code(kg::node::wrong_type))]
    WrongType {
        expected: &'static str,
        found: String,
    },

    #[error("unsupported {node_type} node version {version}")]
    #[diagnostic(code(kg::node::unsupported_version))]
    UnsupportedVersion {
        node_type: &'static str,
        version: u64,
    },

    #[error("invalid node json: {0}")]
    #[diagnostic(code(kg::node::json))]
    Json(#[from] serde_json::Error),
}
