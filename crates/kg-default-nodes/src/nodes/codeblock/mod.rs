mod node;
mod parser;

pub use node::{CAPTION_SEPARATOR, CodeBlockNode, CodeBlockPayload};
pub use parser::{CodeBlockParser, convert_figure, convert_pre, detect_language};
