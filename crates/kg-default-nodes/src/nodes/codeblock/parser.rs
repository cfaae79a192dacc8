//! Import rules for code blocks.
//!
//! Editors serialize a captioned code block as
//! `<figure><pre><code>..</code></pre><figcaption>..</figcaption></figure>` and
//! an uncaptioned one as a bare `<pre><code>..</code></pre>`. The figure rule
//! only claims figures that carry a caption; everything else is left to the
//! `<pre>` rule so the two never both claim the same block.

use std::marker::PhantomData;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::node::CodeBlockPayload;
use crate::conversion::{ConversionContext, ConversionPriority, DomConversionMap, DomConversionOutput};
use crate::dom::Element;

static LANGUAGE_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)lang(?:uage)?-(.*?)(?:\s|$)").unwrap());

/// Language named by a `lang-*` / `language-*` class, checking the `<pre>`
/// classes before the `<code>` classes. Lowercased.
pub fn detect_language(pre_class: Option<&str>, code_class: Option<&str>) -> Option<String> {
    [pre_class, code_class]
        .into_iter()
        .flatten()
        .find_map(|class| LANGUAGE_CLASS_RE.captures(class))
        .map(|caps| caps[1].to_lowercase())
}

/// Figure rule: a `<figure>` wrapping `<pre><code>` plus at least one `<figcaption>`.
///
/// Every caption in the figure is collected in document order, joined with
/// `" / "`, and then removed from the tree so outer rules do not pick it up
/// again.
pub fn convert_figure(
    figure: &mut Element,
    ctx: &ConversionContext<'_>,
) -> Option<CodeBlockPayload> {
    if !figure.is("figure") {
        return None;
    }
    let Some(pre) = figure.find("pre") else {
        trace!("figure has no <pre>, declining");
        return None;
    };
    let Some(code) = pre.find("code") else {
        trace!("figure <pre> has no <code>, declining");
        return None;
    };
    if !figure.contains_tag("figcaption") {
        trace!("figure has no caption, leaving it to the <pre> rule");
        return None;
    }

    let mut payload = CodeBlockPayload::new(code.text_content());
    payload.language = detect_language(pre.attr("class"), code.attr("class"));

    let captions: Vec<String> = figure
        .find_all("figcaption")
        .map(Element::inner_html)
        .collect();
    // TODO: make caption cleaning unconditional once nothing downstream
    // depends on the raw caption markup.
    let cleaner = ctx
        .options
        .sanitize_captions
        .then(|| ctx.clean_basic_html());
    for caption in captions {
        match &cleaner {
            Some(cleaner) => payload.push_caption(cleaner.clean(&caption, None)),
            None => payload.push_caption(caption),
        }
    }
    let removed = figure.remove_descendants("figcaption");

    debug!(
        language = payload.language.as_deref(),
        captions = removed,
        "converted captioned code block"
    );
    Some(payload)
}

/// Pre rule: a `<pre>` whose first child element is a `<code>`.
pub fn convert_pre(pre: &Element) -> Option<CodeBlockPayload> {
    if !pre.is("pre") {
        return None;
    }
    let Some(code) = pre.first_element_child().filter(|child| child.is("code")) else {
        trace!("<pre> does not start with <code>, declining");
        return None;
    };

    let mut payload = CodeBlockPayload::new(code.text_content());
    payload.language = detect_language(pre.attr("class"), code.attr("class"));

    debug!(language = payload.language.as_deref(), "converted code block");
    Some(payload)
}

/// Registers the code block rules for any node type buildable from a payload.
pub struct CodeBlockParser<N> {
    _node: PhantomData<fn() -> N>,
}

impl<N> Default for CodeBlockParser<N> {
    fn default() -> Self {
        Self { _node: PhantomData }
    }
}

impl<N> CodeBlockParser<N>
where
    N: From<CodeBlockPayload> + 'static,
{
    pub const PRIORITY: ConversionPriority = ConversionPriority::DEFAULT_NODE;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn dom_conversion_map(&self) -> DomConversionMap<N> {
        let mut map = DomConversionMap::new();
        map.register("figure", Self::PRIORITY, |element, ctx| {
            convert_figure(element, ctx).map(|payload| DomConversionOutput::new(N::from(payload)))
        })
        .register("pre", Self::PRIORITY, |element, _| {
            convert_pre(element).map(|payload| DomConversionOutput::new(N::from(payload)))
        });
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportOptions;
    use crate::document::{CreateDocument, Html5Documents};
    use crate::nodes::codeblock::CodeBlockNode;

    /// First top-level element of the parsed fragment.
    fn element(html: &str) -> Element {
        Html5Documents
            .create_document(html)
            .into_body()
            .element_children()
            .next()
            .cloned()
            .unwrap()
    }

    fn run_figure(html: &str) -> (Option<CodeBlockPayload>, Element) {
        run_figure_with(html, &ImportOptions::default())
    }

    fn run_figure_with(html: &str, options: &ImportOptions) -> (Option<CodeBlockPayload>, Element) {
        let ctx = ConversionContext::new(&Html5Documents, options);
        let mut figure = element(html);
        let payload = convert_figure(&mut figure, &ctx);
        (payload, figure)
    }

    #[test]
    fn test_bare_pre_has_no_caption() {
        let payload = convert_pre(&element("<pre><code>let x = 1;</code></pre>")).unwrap();
        assert_eq!(payload, CodeBlockPayload::new("let x = 1;"));
        assert!(payload.caption.is_none());
    }

    #[test]
    fn test_code_text_is_verbatim() {
        let payload =
            convert_pre(&element("<pre><code>  if a &lt; b {\n\treturn;\n}  \n</code></pre>")).unwrap();
        assert_eq!(payload.code, "  if a < b {\n\treturn;\n}  \n");
    }

    #[test]
    fn test_figure_without_caption_declines() {
        let html = "<figure><pre><code>echo hi</code></pre></figure>";
        let (payload, figure) = run_figure(html);
        assert!(payload.is_none());

        let pre = figure.find("pre").unwrap();
        assert_eq!(convert_pre(pre), Some(CodeBlockPayload::new("echo hi")));
    }

    #[test]
    fn test_figure_with_caption() {
        let html = "<figure><pre><code>echo hi</code></pre><figcaption>Run <a href=\"/x\">this</a></figcaption></figure>";
        let (payload, _) = run_figure(html);
        assert_eq!(
            payload,
            Some(CodeBlockPayload::new("echo hi").with_caption("Run <a href=\"/x\">this</a>"))
        );
    }

    #[test]
    fn test_figure_joins_every_caption() {
        let html = "<figure><figcaption>A</figcaption><pre><code>x</code></pre><figcaption>B</figcaption></figure>";
        let (payload, _) = run_figure(html);
        assert_eq!(payload.unwrap().caption.as_deref(), Some("A / B"));
    }

    #[test]
    fn test_figure_removes_captions() {
        let html = "<figure><pre><code>x</code></pre><figcaption>A</figcaption><div><figcaption>B</figcaption></div></figure>";
        let (payload, figure) = run_figure(html);
        assert!(payload.is_some());
        assert!(!figure.contains_tag("figcaption"));
        assert!(figure.contains_tag("pre"));
    }

    #[test]
    fn test_declined_figure_is_left_alone() {
        let html = "<figure><img src=\"a.png\"><figcaption>Photo</figcaption></figure>";
        let (payload, figure) = run_figure(html);
        assert!(payload.is_none());
        assert!(figure.contains_tag("figcaption"));

        let (payload, _) = run_figure("<figure><pre>plain</pre><figcaption>c</figcaption></figure>");
        assert!(payload.is_none());
    }

    #[test]
    fn test_language_is_lowercased() {
        let payload =
            convert_pre(&element(r#"<pre class="LANGUAGE-Python"><code>pass</code></pre>"#)).unwrap();
        assert_eq!(payload.language.as_deref(), Some("python"));

        let (payload, _) = run_figure(
            r#"<figure><pre class="language-python"><code>pass</code></pre><figcaption>c</figcaption></figure>"#,
        );
        assert_eq!(payload.unwrap().language.as_deref(), Some("python"));
    }

    #[test]
    fn test_language_from_code_class() {
        let payload =
            convert_pre(&element(r#"<pre class="hljs"><code class="x lang-Rust other">fn f() {}</code></pre>"#))
                .unwrap();
        assert_eq!(payload.language.as_deref(), Some("rust"));
    }

    #[test]
    fn test_pre_class_wins_over_code_class() {
        let payload = convert_pre(&element(
            r#"<pre class="language-js"><code class="language-ts">x</code></pre>"#,
        ))
        .unwrap();
        assert_eq!(payload.language.as_deref(), Some("js"));
    }

    #[test]
    fn test_no_language_class() {
        let payload =
            convert_pre(&element(r#"<pre class="code"><code class="highlight">x</code></pre>"#)).unwrap();
        assert!(payload.language.is_none());
        assert_eq!(serde_json::to_value(&payload).unwrap(), serde_json::json!({"code": "x"}));
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language(Some("language-c++ line-numbers"), None).as_deref(), Some("c++"));
        assert_eq!(detect_language(None, Some("lang-html")).as_deref(), Some("html"));
        assert_eq!(detect_language(Some("language-"), None).as_deref(), Some(""));
        assert_eq!(detect_language(Some("slang"), Some("")), None);
        assert_eq!(detect_language(None, None), None);
    }

    #[test]
    fn test_pre_must_start_with_code() {
        assert!(convert_pre(&element("<pre>plain text</pre>")).is_none());
        assert!(convert_pre(&element("<pre></pre>")).is_none());
        assert!(convert_pre(&element("<pre><span>a</span><code>b</code></pre>")).is_none());
        // leading text is not an element, so <code> is still the first child
        let payload = convert_pre(&element("<pre>  <code>b</code></pre>")).unwrap();
        assert_eq!(payload.code, "b");
    }

    #[test]
    fn test_rules_reject_other_tags() {
        assert!(convert_pre(&element("<div><code>x</code></div>")).is_none());
        let (payload, _) = run_figure("<div><pre><code>x</code></pre><figcaption>c</figcaption></div>");
        assert!(payload.is_none());
    }

    #[test]
    fn test_captions_raw_by_default() {
        let html = "<figure><pre><code>x</code></pre><figcaption>  Two   spaces<span></span></figcaption></figure>";
        let (payload, _) = run_figure(html);
        assert_eq!(payload.unwrap().caption.as_deref(), Some("  Two   spaces<span></span>"));
    }

    #[test]
    fn test_captions_cleaned_when_enabled() {
        let html = "<figure><pre><code>x</code></pre><figcaption>  Two   spaces<span></span></figcaption><figcaption>b<br>c</figcaption></figure>";
        let options = ImportOptions::default().sanitize_captions(true);
        let (payload, _) = run_figure_with(html, &options);
        assert_eq!(payload.unwrap().caption.as_deref(), Some("Two spaces / b c"));
    }

    #[test]
    fn test_parser_builds_nodes() {
        let map = CodeBlockParser::<CodeBlockNode>::new().dom_conversion_map();
        let options = ImportOptions::default();
        let ctx = ConversionContext::new(&Html5Documents, &options);

        let mut pre = element(r#"<pre class="language-sh"><code>ls</code></pre>"#);
        let node = map.convert(&mut pre, &ctx).unwrap().node;
        assert_eq!(
            node,
            CodeBlockNode {
                code: "ls".into(),
                language: "sh".into(),
                caption: String::new(),
            }
        );

        let mut bare = element("<figure><pre><code>ls</code></pre></figure>");
        assert!(map.convert(&mut bare, &ctx).is_none());
        assert_eq!(map.conversions_for("figure")[0].priority(), ConversionPriority::DEFAULT_NODE);
    }
}
