//! Markup parsing into a small, owned node tree.
//!
//! The parser reduces a document to the hyperlinks the expander cares about,
//! each carrying its own attributes and text plus its immediate parent. The
//! result owns all of its data so it can be held across `.await` points,
//! unlike the `scraper` document it was built from.

use scraper::{ElementRef, Html};
use std::collections::HashMap;

/// An element of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupNode {
    tag: String,
    attributes: HashMap<String, String>,
    text: String,
}

impl MarkupNode {
    /// Creates a node with the given tag name.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Sets the visible text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Lowercase tag name, e.g. `p` or `a`.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// All attributes of the element.
    #[must_use]
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// A single attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Concatenated text of the element and all of its descendants.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    fn from_element(element: ElementRef<'_>) -> Self {
        let value = element.value();
        Self {
            tag: value.name().to_string(),
            attributes: value
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            text: element.text().collect(),
        }
    }
}

/// A hyperlink with non-empty text and an `href`, plus its parent element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperlinkNode {
    node: MarkupNode,
    parent: Option<MarkupNode>,
}

impl HyperlinkNode {
    /// Creates a hyperlink node.
    #[must_use]
    pub fn new(node: MarkupNode, parent: Option<MarkupNode>) -> Self {
        Self { node, parent }
    }

    /// The anchor element itself.
    #[must_use]
    pub fn node(&self) -> &MarkupNode {
        &self.node
    }

    /// The raw `href` attribute.
    #[must_use]
    pub fn href(&self) -> &str {
        self.node.attribute("href").unwrap_or_default()
    }

    /// The anchor text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.node.text()
    }

    /// The immediate parent element, if the anchor has one.
    #[must_use]
    pub fn parent(&self) -> Option<&MarkupNode> {
        self.parent.as_ref()
    }
}

/// A parsed document, reduced to its hyperlinks in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeTree {
    hyperlinks: Vec<HyperlinkNode>,
}

impl NodeTree {
    /// Creates a tree from hyperlink nodes.
    #[must_use]
    pub fn new(hyperlinks: Vec<HyperlinkNode>) -> Self {
        Self { hyperlinks }
    }

    /// All anchors with non-empty text and an `href`, in document order.
    #[must_use]
    pub fn hyperlinks(&self) -> &[HyperlinkNode] {
        &self.hyperlinks
    }

    /// Number of hyperlinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hyperlinks.len()
    }

    /// Whether the document has no hyperlinks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hyperlinks.is_empty()
    }
}

/// Protocol for markup parsing.
pub trait MarkupParser: Send + Sync {
    /// Parses raw markup into a node tree. Malformed markup never fails;
    /// it yields whatever structure could be recovered.
    fn parse(&self, raw: &str) -> NodeTree;
}

/// HTML parser backed by `scraper` (html5ever).
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Creates a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MarkupParser for HtmlParser {
    fn parse(&self, raw: &str) -> NodeTree {
        let document = Html::parse_document(raw);

        let hyperlinks = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| element.value().name() == "a" && element.value().attr("href").is_some())
            .filter(|element| element.text().any(|chunk| !chunk.trim().is_empty()))
            .map(|element| {
                let parent = element
                    .parent()
                    .and_then(ElementRef::wrap)
                    .map(MarkupNode::from_element);
                HyperlinkNode::new(MarkupNode::from_element(element), parent)
            })
            .collect();

        NodeTree::new(hyperlinks)
    }
}
