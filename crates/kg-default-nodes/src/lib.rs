//! kg-default-nodes: HTML import rules for the Koenig card editor.
//!
//! This crate provides:
//! - `Element` / `Document` - an owned DOM the rules inspect and mutate
//! - `CreateDocument` - the document factory shared by the importer and the cleaner
//! - `DomConversionMap` - priority-ordered, declinable conversion rules per tag
//! - `CodeBlockParser` - the `<figure>` and `<pre>` rules for code blocks
//! - `clean_basic_html` - the basic-HTML cleaner for captions
//! - `import_html` - the pipeline turning a fragment into nodes

pub mod clean_html;
pub mod config;
pub mod conversion;
pub mod document;
pub mod dom;
pub mod error;
pub mod import;
pub mod nodes;

pub use clean_html::{CleanBasicHtml, CleanBasicHtmlOptions, CleanBasicHtmlOverrides, clean_basic_html};
pub use config::ImportOptions;
pub use conversion::{
    ConversionContext, ConversionPriority, DomConversion, DomConversionMap, DomConversionOutput,
};
pub use document::{CreateDocument, Html5Documents};
pub use dom::{Document, DomNode, Element, Rewrite};
pub use error::NodeError;
pub use import::{code_block_payloads, default_conversions, import_document, import_html};
pub use nodes::codeblock::{CodeBlockParser, convert_figure, convert_pre, detect_language};
pub use nodes::{CodeBlockNode, CodeBlockPayload, KoenigNode, ParagraphNode};
