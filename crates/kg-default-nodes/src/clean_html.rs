//! Basic HTML cleaning for short inline markup such as captions.
//!
//! The cleaner builds a scratch document through the [`CreateDocument`] it is
//! handed, so it always parses with the same DOM implementation as the content
//! being imported. The scratch document is dropped before returning.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::CreateDocument;
use crate::dom::{DomNode, Element, Rewrite};

static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s?/?>").unwrap());
static SPACING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\s|&nbsp;){2,}").unwrap());
static EDGE_NBSP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^&nbsp;|&nbsp;$").unwrap());

const ZERO_WIDTH_SPACE: char = '\u{200B}';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanBasicHtmlOptions {
    /// Keep `<br>` elements instead of turning them into spaces.
    pub allow_br: bool,
    /// Replace `<code>` elements with their text.
    pub remove_code_wrappers: bool,
    /// Return only the inner markup of the first top-level element.
    pub first_child_inner_content: bool,
}

/// Per-call changes to a cleaner's defaults. Unset fields keep the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanBasicHtmlOverrides {
    pub allow_br: Option<bool>,
    pub remove_code_wrappers: Option<bool>,
    pub first_child_inner_content: Option<bool>,
}

impl CleanBasicHtmlOverrides {
    pub fn allow_br(mut self, allow: bool) -> Self {
        self.allow_br = Some(allow);
        self
    }

    pub fn remove_code_wrappers(mut self, remove: bool) -> Self {
        self.remove_code_wrappers = Some(remove);
        self
    }

    pub fn first_child_inner_content(mut self, first_child: bool) -> Self {
        self.first_child_inner_content = Some(first_child);
        self
    }

    /// `base` with every set field replaced.
    pub fn apply(&self, base: CleanBasicHtmlOptions) -> CleanBasicHtmlOptions {
        CleanBasicHtmlOptions {
            allow_br: self.allow_br.unwrap_or(base.allow_br),
            remove_code_wrappers: self.remove_code_wrappers.unwrap_or(base.remove_code_wrappers),
            first_child_inner_content: self
                .first_child_inner_content
                .unwrap_or(base.first_child_inner_content),
        }
    }
}

impl From<CleanBasicHtmlOptions> for CleanBasicHtmlOverrides {
    fn from(options: CleanBasicHtmlOptions) -> Self {
        Self {
            allow_br: Some(options.allow_br),
            remove_code_wrappers: Some(options.remove_code_wrappers),
            first_child_inner_content: Some(options.first_child_inner_content),
        }
    }
}

/// Clean `input` using `documents` to build the scratch tree.
///
/// Returns an empty string when nothing but whitespace is left.
pub fn clean_basic_html(
    input: &str,
    options: &CleanBasicHtmlOptions,
    documents: &dyn CreateDocument,
) -> String {
    let mut html = Cow::Borrowed(input);
    if !options.allow_br || input == "<br>" {
        html = Cow::Owned(BR_RE.replace_all(&html, " ").into_owned());
    }

    let collapsed = SPACING_RE.replace_all(&html, " ");
    let trimmed = EDGE_NBSP_RE.replace_all(collapsed.trim(), "");
    let trimmed = trimmed.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut document = documents.create_document(trimmed);
    let body = document.body_mut();
    body.rewrite_descendants(&mut |element| blank_element_rewrite(element, options.allow_br));

    if options.remove_code_wrappers {
        body.rewrite_descendants(&mut |element| {
            if element.is("code") {
                Rewrite::Replace(DomNode::Text(element.text_content()))
            } else {
                Rewrite::Keep
            }
        });
    }

    if options.first_child_inner_content {
        if let Some(first) = body.first_element_child() {
            return first.inner_html().trim().to_owned();
        }
    }

    body.inner_html().trim().to_owned()
}

/// Elements with no visible text are dropped; ones holding only whitespace
/// collapse to a single space so neighbouring words stay apart.
fn blank_element_rewrite(element: &Element, allow_br: bool) -> Rewrite {
    if element.is("br") && allow_br {
        return Rewrite::Keep;
    }
    if element.is("img") || element.contains_tag("img") {
        return Rewrite::Keep;
    }

    let text = element.text_content();
    let visible = text.replace(ZERO_WIDTH_SPACE, "");
    if !visible.trim().is_empty() {
        return Rewrite::Keep;
    }

    if text.is_empty() {
        Rewrite::Remove
    } else {
        Rewrite::Replace(DomNode::text(" "))
    }
}

/// The cleaner bound to a document factory, with default options that
/// individual calls may override.
#[derive(Clone, Copy)]
pub struct CleanBasicHtml<'a> {
    documents: &'a dyn CreateDocument,
    defaults: CleanBasicHtmlOptions,
}

impl<'a> CleanBasicHtml<'a> {
    pub fn new(documents: &'a dyn CreateDocument) -> Self {
        Self {
            documents,
            defaults: CleanBasicHtmlOptions::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: CleanBasicHtmlOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Clean `html` with the defaults, changed by whichever `overrides` are set.
    pub fn clean(&self, html: &str, overrides: Option<&CleanBasicHtmlOverrides>) -> String {
        let options = match overrides {
            Some(overrides) => overrides.apply(self.defaults),
            None => self.defaults,
        };
        clean_basic_html(html, &options, self.documents)
    }
}

impl std::fmt::Debug for CleanBasicHtml<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanBasicHtml")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
