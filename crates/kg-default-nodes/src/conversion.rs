//! DOM conversion rules.
//!
//! A rule looks at one element and either produces a node or declines with
//! `None`. Declining is not an error: it hands the element to the next rule
//! registered for the same tag, and after that to the importer's generic
//! fallback. Rules for a tag are tried highest priority first; rules of equal
//! priority keep their registration order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;
use tracing::trace;

use crate::clean_html::CleanBasicHtml;
use crate::config::ImportOptions;
use crate::document::CreateDocument;
use crate::dom::Element;

/// Priority of a conversion rule, `0..=4`. Higher is tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ConversionPriority(u8);

impl ConversionPriority {
    pub const MAX: u8 = 4;

    /// Priority of host fallbacks.
    pub const FALLBACK: Self = Self(0);
    /// Priority of the default-node parsers.
    pub const DEFAULT_NODE: Self = Self(1);

    /// Values above [`Self::MAX`] are clamped.
    pub const fn new(value: u8) -> Self {
        if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

/// State every rule can see: how to build scratch documents and the import options.
#[derive(Clone, Copy)]
pub struct ConversionContext<'a> {
    pub documents: &'a dyn CreateDocument,
    pub options: &'a ImportOptions,
}

impl<'a> ConversionContext<'a> {
    pub fn new(documents: &'a dyn CreateDocument, options: &'a ImportOptions) -> Self {
        Self { documents, options }
    }

    /// The basic-HTML cleaner, building its scratch documents with this
    /// context's factory.
    pub fn clean_basic_html(&self) -> CleanBasicHtml<'a> {
        CleanBasicHtml::new(self.documents).with_defaults(self.options.caption_cleaning)
    }
}

impl fmt::Debug for ConversionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionContext")
            .field("options", self.options)
            .finish_non_exhaustive()
    }
}

/// What a matching rule hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomConversionOutput<N> {
    pub node: N,
}

impl<N> DomConversionOutput<N> {
    pub fn new(node: N) -> Self {
        Self { node }
    }

    pub fn map<M>(self, f: impl FnOnce(N) -> M) -> DomConversionOutput<M> {
        DomConversionOutput { node: f(self.node) }
    }
}

pub type ConversionFn<N> = dyn Fn(&mut Element, &ConversionContext<'_>) -> Option<DomConversionOutput<N>>
    + Send
    + Sync;

/// One rule: a priority and the function deciding whether it applies.
pub struct DomConversion<N> {
    priority: ConversionPriority,
    conversion: Arc<ConversionFn<N>>,
}

impl<N> Clone for DomConversion<N> {
    fn clone(&self) -> Self {
        Self {
            priority: self.priority,
            conversion: Arc::clone(&self.conversion),
        }
    }
}

impl<N> fmt::Debug for DomConversion<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomConversion")
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

impl<N> DomConversion<N> {
    pub fn new<F>(priority: ConversionPriority, conversion: F) -> Self
    where
        F: Fn(&mut Element, &ConversionContext<'_>) -> Option<DomConversionOutput<N>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            priority,
            conversion: Arc::new(conversion),
        }
    }

    pub fn priority(&self) -> ConversionPriority {
        self.priority
    }

    pub fn apply(
        &self,
        element: &mut Element,
        ctx: &ConversionContext<'_>,
    ) -> Option<DomConversionOutput<N>> {
        (self.conversion)(element, ctx)
    }
}

/// Conversion rules keyed by lowercase tag name.
pub struct DomConversionMap<N> {
    rules: HashMap<SmolStr, Vec<DomConversion<N>>>,
}

impl<N> Default for DomConversionMap<N> {
    fn default() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }
}

impl<N> Clone for DomConversionMap<N> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<N> fmt::Debug for DomConversionMap<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.rules.iter()).finish()
    }
}

impl<N> DomConversionMap<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for `tag`.
    pub fn register<F>(&mut self, tag: &str, priority: ConversionPriority, conversion: F) -> &mut Self
    where
        F: Fn(&mut Element, &ConversionContext<'_>) -> Option<DomConversionOutput<N>>
            + Send
            + Sync
            + 'static,
    {
        self.insert(tag, DomConversion::new(priority, conversion))
    }

    /// Add an already built rule for `tag`, keeping the trial order sorted.
    pub fn insert(&mut self, tag: &str, conversion: DomConversion<N>) -> &mut Self {
        let rules = self
            .rules
            .entry(SmolStr::new(tag.to_ascii_lowercase()))
            .or_default();
        let at = rules
            .iter()
            .position(|existing| existing.priority < conversion.priority)
            .unwrap_or(rules.len());
        rules.insert(at, conversion);
        self
    }

    /// Fold another map's rules into this one. Rules from `other` go after
    /// rules of equal priority already present.
    pub fn merge(&mut self, other: DomConversionMap<N>) -> &mut Self {
        for (tag, rules) in other.rules {
            for rule in rules {
                self.insert(&tag, rule);
            }
        }
        self
    }

    /// Rules registered for `tag`, in the order they will be tried.
    pub fn conversions_for(&self, tag: &str) -> &[DomConversion<N>] {
        let tag = tag.to_ascii_lowercase();
        self.rules.get(tag.as_str()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(SmolStr::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Try every rule for the element's tag and return the first match.
    pub fn convert(
        &self,
        element: &mut Element,
        ctx: &ConversionContext<'_>,
    ) -> Option<DomConversionOutput<N>> {
        let rules = self.conversions_for(element.tag_name());
        for (index, rule) in rules.iter().enumerate() {
            if let Some(output) = rule.apply(element, ctx) {
                trace!(
                    tag = element.tag_name(),
                    priority = rule.priority().value(),
                    index,
                    "conversion matched"
                );
                return Some(output);
            }
        }
        if !rules.is_empty() {
            trace!(tag = element.tag_name(), tried = rules.len(), "every conversion declined");
        }
        None
    }
}
