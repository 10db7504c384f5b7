//! Read-only view of an element node

use scraper::node::Element as ScraperElement;

/// An element of a [`Document`](super::Document), borrowed from the tree
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    inner: &'a ScraperElement,
}

impl<'a> Element<'a> {
    pub(super) fn new(inner: &'a ScraperElement) -> Self {
        Self { inner }
    }

    /// Local tag name, lowercase for HTML elements
    pub fn name(&self) -> &'a str {
        self.inner.name()
    }

    /// Get a non-namespaced attribute value
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.inner.attr(name)
    }

    /// Tokens of the `class` attribute in source order
    pub fn classes(&self) -> impl Iterator<Item = &'a str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}
