use serde::{Deserialize, Serialize};

use crate::clean_html::CleanBasicHtmlOptions;

/// Knobs for the import pipeline and the default-node rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Run every figure caption through the basic-HTML cleaner before joining.
    ///
    /// Off by default: captions are carried over as their raw inner markup.
    pub sanitize_captions: bool,
    /// Cleaner options used when `sanitize_captions` is on.
    pub caption_cleaning: CleanBasicHtmlOptions,
    /// Emit a paragraph for content no rule claimed. When off, unclaimed
    /// content is dropped.
    pub paragraph_fallback: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            sanitize_captions: false,
            caption_cleaning: CleanBasicHtmlOptions::default(),
            paragraph_fallback: true,
        }
    }
}

impl ImportOptions {
    pub fn sanitize_captions(mut self, sanitize: bool) -> Self {
        self.sanitize_captions = sanitize;
        self
    }

    pub fn paragraph_fallback(mut self, fallback: bool) -> Self {
        self.paragraph_fallback = fallback;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_take_defaults() {
        let options: ImportOptions = serde_json::from_str(r#"{"sanitize_captions": true}"#).unwrap();
        assert!(options.sanitize_captions);
        assert!(options.paragraph_fallback);
        assert_eq!(options.caption_cleaning, CleanBasicHtmlOptions::default());
    }

    #[test]
    fn test_default_keeps_raw_captions() {
        assert!(!ImportOptions::default().sanitize_captions);
    }
}
