//! Mutable HTML document model
//!
//! A [`Document`] is the surface blocks and the bootstrapper work against:
//! the stylesheet links in `<head>`, the footer, and the section subtrees all
//! live here. It is always passed explicitly so each page is decorated in
//! isolation.
//!
//! The tree is the one `scraper` builds with html5ever. It is edited in place
//! and written back out with html5ever's serializer, so markup the pass never
//! touches (raw text elements, foreign content, namespaced attributes) comes
//! out the way the parser read it.

mod element;

pub use ego_tree::NodeId;
pub use element::Element;

use ego_tree::NodeRef;
use html5ever::serialize::{serialize, Serialize, SerializeOpts, TraversalScope};
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::{Element as ScraperElement, Text};
use html5ever::tendril::StrTendril;
use scraper::{ElementRef, Html, Node};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// An owned, mutable HTML tree
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse HTML text into a document
    ///
    /// Fragments get the implied `<html>`, `<head>` and `<body>`.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Serialize the document to HTML text
    pub fn to_html(&self) -> String {
        write_html(&self.html)
    }

    /// Serialize an element and its subtree; empty for other nodes
    pub fn node_html(&self, id: NodeId) -> String {
        self.node(id)
            .and_then(ElementRef::wrap)
            .map(|element| write_html(&element))
            .unwrap_or_default()
    }

    pub fn root(&self) -> NodeId {
        self.html.tree.root().id()
    }

    fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.orphan_element(name, Vec::new())
    }

    /// Create a detached element with a class attribute
    pub fn create_element_with_class(&mut self, name: &str, class: &str) -> NodeId {
        self.orphan_element(name, vec![attribute("class", class)])
    }

    fn orphan_element(&mut self, name: &str, attrs: Vec<Attribute>) -> NodeId {
        let name = QualName::new(
            None,
            Namespace::from(HTML_NAMESPACE),
            LocalName::from(name.to_ascii_lowercase()),
        );
        self.html
            .tree
            .orphan(Node::Element(ScraperElement::new(name, attrs)))
            .id()
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let text = Text {
            text: scraper::StrTendril::from_slice(text),
        };
        self.html.tree.orphan(Node::Text(text)).id()
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.node(child).is_none() {
            return;
        }
        if let Some(mut node) = self.html.tree.get_mut(parent) {
            node.append_id(child);
        }
    }

    /// Remove a node from its parent
    fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Remove every child of a node
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id) {
            self.detach(child);
        }
    }

    /// Replace the content of a node with a single text node
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        let text_id = self.create_text(text);
        self.append_child(id, text_id);
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|node| node.children().map(|child| child.id()).collect())
            .unwrap_or_default()
    }

    /// Get the element payload of a node, if it is an element
    pub fn element(&self, id: NodeId) -> Option<Element<'_>> {
        self.node(id)
            .and_then(|node| node.value().as_element())
            .map(Element::new)
    }

    /// Tag name of an element node
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name())
    }

    /// Get an attribute of an element node
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attr(name))
    }

    /// Set an attribute on an element node; no-op for other nodes
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(mut node) = self.html.tree.get_mut(id) else {
            return;
        };
        let Node::Element(element) = node.value() else {
            return;
        };

        let key = attribute_name(name);
        let mut attrs: Vec<Attribute> = element
            .attrs
            .iter()
            .map(|(attr_name, attr_value)| Attribute {
                name: attr_name.clone(),
                value: StrTendril::from_slice(attr_value),
            })
            .collect();
        match attrs.iter_mut().find(|attr| attr.name == key) {
            Some(attr) => attr.value = StrTendril::from_slice(value),
            None => attrs.push(Attribute {
                name: key,
                value: StrTendril::from_slice(value),
            }),
        }

        // Rebuilt rather than edited: the element caches its id and classes
        *element = ScraperElement::new(element.name.clone(), attrs);
    }

    /// All attached descendants of a node in document order, excluding the node itself
    fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|node| node.descendants().skip(1).map(|d| d.id()).collect())
            .unwrap_or_default()
    }

    /// First descendant element with the given tag name
    pub fn find_first(&self, from: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(from)
            .into_iter()
            .find(|&id| self.tag_name(id) == Some(tag))
    }

    /// All descendant elements matching a predicate
    pub fn find_all<F>(&self, from: NodeId, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Element<'_>) -> bool,
    {
        self.descendants(from)
            .into_iter()
            .filter(|&id| self.element(id).map(|e| predicate(&e)).unwrap_or(false))
            .collect()
    }

    /// Element whose `id` attribute equals `id`
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.descendants(self.root())
            .into_iter()
            .find(|&n| self.attr(n, "id") == Some(id))
    }

    /// Concatenated text of a node's subtree
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        node.descendants()
            .filter_map(|d| d.value().as_text())
            .map(|text| &**text)
            .collect()
    }

    pub fn head(&self) -> Option<NodeId> {
        self.find_first(self.root(), "head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.find_first(self.root(), "body")
    }

    /// `href` values of every stylesheet link in the document
    pub fn stylesheets(&self) -> Vec<String> {
        self.find_all(self.root(), |e| {
            e.name() == "link" && e.attr("rel") == Some("stylesheet")
        })
        .into_iter()
        .filter_map(|id| self.attr(id, "href").map(str::to_string))
        .collect()
    }

    /// Link a stylesheet in `<head>` unless a link with the same href exists
    ///
    /// Returns `true` when a link was inserted.
    pub fn ensure_stylesheet(&mut self, href: &str) -> bool {
        let exists = !self
            .find_all(self.root(), |e| e.name() == "link" && e.attr("href") == Some(href))
            .is_empty();
        if exists {
            return false;
        }

        let parent = self.head().unwrap_or_else(|| self.root());
        let link = self.create_element("link");
        self.set_attr(link, "rel", "stylesheet");
        self.set_attr(link, "href", href);
        self.append_child(parent, link);
        tracing::debug!("Linked stylesheet {}", href);
        true
    }

    /// Replace the children of `target` with copies of `source`'s children in `other`
    ///
    /// Used to roll a section back to a snapshot taken before a failed enhancement.
    pub fn restore_children(&mut self, target: NodeId, other: &Document, source: NodeId) {
        self.clear_children(target);
        let Some(source) = other.node(source) else {
            return;
        };
        for child in source.children() {
            self.copy_subtree(target, child);
        }
    }

    fn copy_subtree(&mut self, parent: NodeId, source: NodeRef<'_, Node>) {
        let id = self.html.tree.orphan(source.value().clone()).id();
        self.append_child(parent, id);
        for child in source.children() {
            self.copy_subtree(id, child);
        }
    }
}

fn attribute_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name))
}

fn attribute(name: &str, value: &str) -> Attribute {
    Attribute {
        name: attribute_name(name),
        value: StrTendril::from_slice(value),
    }
}

/// Serialize a node with html5ever
///
/// Pages are parsed with scripting enabled, which makes `<noscript>` content
/// raw text; it has to be written back unescaped.
fn write_html<T: Serialize>(node: &T) -> String {
    let opts = SerializeOpts {
        scripting_enabled: true,
        traversal_scope: TraversalScope::IncludeNode,
        create_missing_parent: true,
    };

    let mut buf = Vec::new();
    if let Err(e) = serialize(&mut buf, node, opts) {
        tracing::error!("Failed to serialize HTML: {}", e);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_structure() {
        let doc = Document::parse(
            r#"<!DOCTYPE html><html><head><title>T</title></head><body><main><div><div class="posts a">x</div></div></main></body></html>"#,
        );

        let main = doc.find_first(doc.root(), "main").unwrap();
        let wrapper = doc.find_first(main, "div").unwrap();
        let section = doc.children(wrapper)[0];

        let element = doc.element(section).unwrap();
        assert_eq!(element.classes().collect::<Vec<_>>(), vec!["posts", "a"]);
        assert_eq!(doc.text_content(section), "x");
    }

    #[test]
    fn test_parse_fragment_gets_implied_structure() {
        let doc = Document::parse("<p>hello</p>");
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
        assert_eq!(doc.text_content(doc.body().unwrap()), "hello");
    }

    #[test]
    fn test_round_trip_keeps_untouched_markup() {
        let page = concat!(
            r#"<!DOCTYPE html><html><head><title>A &amp; B</title>"#,
            r#"<noscript><link rel="stylesheet" href="/fallback.css"></noscript></head>"#,
            r#"<body><noscript><iframe src="https://www.example.com/ns?id=1&amp;x=2" height="0"></iframe></noscript>"#,
            r#"<template id="row"><p class="cell">x</p></template>"#,
            r##"<svg class="icon" viewBox="0 0 16 16"><use xlink:href="#icon-rss"></use></svg>"##,
            r#"<p title="a &amp; b">1 &lt; 2</p><br></body></html>"#,
        );

        let doc = Document::parse(page);
        assert_eq!(doc.to_html(), page);
        assert!(doc.stylesheets().is_empty());
    }

    #[test]
    fn test_noscript_survives_edits() {
        let mut doc = Document::parse(
            r#"<html><head><noscript><link rel="stylesheet" href="/fallback.css"></noscript></head><body></body></html>"#,
        );
        doc.ensure_stylesheet("/blocks/posts/posts.css");

        assert_eq!(
            doc.to_html(),
            r#"<html><head><noscript><link rel="stylesheet" href="/fallback.css"></noscript><link rel="stylesheet" href="/blocks/posts/posts.css"></head><body></body></html>"#
        );
    }

    #[test]
    fn test_set_attr_keeps_order_and_cached_lookups() {
        let mut doc = Document::parse(r#"<a href="/x" class="old" id="link">x</a>"#);
        let anchor = doc.element_by_id("link").unwrap();

        doc.set_attr(anchor, "class", "new");
        doc.set_attr(anchor, "data-smooth-scroll", "top");

        assert!(doc.element(anchor).unwrap().has_class("new"));
        assert_eq!(
            doc.node_html(anchor),
            r#"<a href="/x" class="new" id="link" data-smooth-scroll="top">x</a>"#
        );
    }

    #[test]
    fn test_ensure_stylesheet_is_idempotent() {
        let mut doc = Document::parse("<html><head></head><body></body></html>");
        assert!(doc.ensure_stylesheet("/blocks/posts/posts.css"));
        assert!(!doc.ensure_stylesheet("/blocks/posts/posts.css"));
        assert_eq!(doc.stylesheets(), vec!["/blocks/posts/posts.css"]);
    }

    #[test]
    fn test_ensure_stylesheet_respects_existing_markup() {
        let mut doc = Document::parse(
            r#"<html><head><link rel="stylesheet" href="/blocks/hero/hero.css"></head></html>"#,
        );
        assert!(!doc.ensure_stylesheet("/blocks/hero/hero.css"));
        assert_eq!(doc.stylesheets().len(), 1);
    }

    #[test]
    fn test_clear_and_append() {
        let mut doc = Document::parse("<div id=\"box\"><p>a</p><p>b</p></div>");
        let div = doc.element_by_id("box").unwrap();
        doc.clear_children(div);
        assert!(doc.children(div).is_empty());

        let span = doc.create_element_with_class("span", "note");
        doc.set_text(span, "hi & bye");
        doc.append_child(div, span);
        assert_eq!(
            doc.node_html(div),
            r#"<div id="box"><span class="note">hi &amp; bye</span></div>"#
        );
    }

    #[test]
    fn test_detached_nodes_are_not_descendants() {
        let mut doc = Document::parse("<div id=\"box\"><p>a</p></div>");
        let div = doc.element_by_id("box").unwrap();
        doc.clear_children(div);
        assert!(doc.find_first(doc.root(), "p").is_none());
        assert!(!doc.to_html().contains("<p>"));
    }

    #[test]
    fn test_restore_children() {
        let mut doc = Document::parse("<div id=\"box\"><p>keep <b>me</b></p></div>");
        let snapshot = doc.clone();
        let div = doc.element_by_id("box").unwrap();

        doc.set_text(div, "half-done");
        doc.restore_children(div, &snapshot, div);

        assert_eq!(doc.node_html(div), r#"<div id="box"><p>keep <b>me</b></p></div>"#);
    }

    #[test]
    fn test_element_by_id_ignores_empty() {
        let doc = Document::parse("<div id=\"\"></div>");
        assert!(doc.element_by_id("").is_none());
    }
}
