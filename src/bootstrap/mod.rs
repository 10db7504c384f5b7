//! Page bootstrapper
//!
//! Finds the block sections of a page, links each kind's stylesheet, runs the
//! registered behavior for the kind and then applies the page-wide touch-ups
//! (smooth scrolling for in-page anchors, footer copyright line).
//!
//! Every section is enhanced on its own: a missing or failing block is logged,
//! the section is rolled back to its original markup and the next section is
//! processed as usual.

mod section;

pub use section::{PageReport, SectionReport, SectionState};

use chrono::{Datelike, Local, NaiveDate};
use percent_encoding::percent_decode_str;

use crate::blocks::BlockRegistry;
use crate::config::{BlocksConfig, SiteConfig};
use crate::document::{Document, NodeId};

/// Element id of the injected smooth-scroll script
const SMOOTH_SCROLL_ID: &str = "blocks-smooth-scroll";

/// Click handler for anchors marked with `data-smooth-scroll`
const SMOOTH_SCROLL_SCRIPT: &str = r#"
(function() {
    document.querySelectorAll('a[data-smooth-scroll]').forEach(function(anchor) {
        anchor.addEventListener('click', function(e) {
            var target = document.getElementById(anchor.getAttribute('data-smooth-scroll'));
            if (target) {
                e.preventDefault();
                target.scrollIntoView({ behavior: 'smooth', block: 'start' });
            }
        });
    });
})();
"#;

/// Decorates pages with the blocks of a registry
pub struct Bootstrapper {
    registry: BlockRegistry,
    blocks: BlocksConfig,
    copyright_holder: String,
    /// Fixed date for the footer year; the local date at run time when unset
    today: Option<NaiveDate>,
}

impl Bootstrapper {
    /// Create a bootstrapper for the given registry and site
    pub fn new(registry: BlockRegistry, config: &SiteConfig) -> Self {
        Self {
            registry,
            blocks: config.blocks.clone(),
            copyright_holder: config.copyright_holder().to_string(),
            today: None,
        }
    }

    /// Use a fixed date for the footer year
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// Parse, decorate and serialize a page
    pub async fn decorate_html(&self, html: &str) -> (String, PageReport) {
        let mut doc = Document::parse(html);
        let report = self.run(&mut doc).await;
        (doc.to_html(), report)
    }

    /// Decorate every section of a page, then apply page-wide touch-ups
    pub async fn run(&self, doc: &mut Document) -> PageReport {
        let sections = self.discover_sections(doc);
        tracing::debug!("Discovered {} sections", sections.len());

        let mut report = PageReport::default();
        for section in sections {
            report.sections.push(self.enhance(doc, section).await);
        }

        report.anchors = bind_smooth_scroll(doc);
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        report.footer_stamped = stamp_footer(doc, today.year(), &self.copyright_holder);
        report
    }

    /// Sections are `div[class]` grandchildren of the content root, through a `div`
    pub fn discover_sections(&self, doc: &Document) -> Vec<NodeId> {
        let Some(root) = doc.find_first(doc.root(), &self.blocks.content_root) else {
            return Vec::new();
        };

        let mut sections = Vec::new();
        for wrapper in doc.children(root) {
            if doc.tag_name(wrapper) != Some("div") {
                continue;
            }
            for child in doc.children(wrapper) {
                let is_section = doc
                    .element(child)
                    .map(|e| e.name() == "div" && e.attr("class").is_some())
                    .unwrap_or(false);
                if is_section {
                    sections.push(child);
                }
            }
        }
        sections
    }

    /// Enhance one section with the block registered for its kind
    pub async fn enhance(&self, doc: &mut Document, section: NodeId) -> SectionReport {
        let kind = doc
            .element(section)
            .and_then(|e| e.classes().next())
            .map(str::to_string);

        let Some(kind) = kind else {
            return SectionReport {
                kind: None,
                state: SectionState::Raw,
                error: None,
            };
        };

        let mut state = SectionState::Raw.advance(SectionState::Enhancing);
        doc.ensure_stylesheet(&self.blocks.stylesheet_href(&kind));

        let result = match self.registry.resolve(&kind) {
            Ok(block) => {
                let snapshot = doc.clone();
                let result = block.decorate(doc, section).await;
                if result.is_err() {
                    doc.restore_children(section, &snapshot, section);
                }
                result
            }
            Err(e) => Err(e),
        };

        let error = match result {
            Ok(()) => {
                state = state.advance(SectionState::Enhanced);
                tracing::debug!("Decorated block: {}", kind);
                None
            }
            Err(e) => {
                state = state.advance(SectionState::Failed);
                tracing::error!("Failed to load block: {}: {}", kind, e);
                Some(e.to_string())
            }
        };

        SectionReport {
            kind: Some(kind),
            state,
            error,
        }
    }
}

/// Mark in-page anchors whose target exists and inject the click handler once
///
/// Returns the number of anchors bound.
fn bind_smooth_scroll(doc: &mut Document) -> usize {
    let anchors = doc.find_all(doc.root(), |e| {
        e.name() == "a" && e.attr("href").map(|h| h.starts_with('#')).unwrap_or(false)
    });

    let mut bound = 0;
    for anchor in anchors {
        let Some(href) = doc.attr(anchor, "href") else {
            continue;
        };
        let raw = &href[1..];
        let decoded = percent_decode_str(raw).decode_utf8_lossy().into_owned();

        let target = if doc.element_by_id(&decoded).is_some() {
            decoded
        } else if doc.element_by_id(raw).is_some() {
            raw.to_string()
        } else {
            continue;
        };

        doc.set_attr(anchor, "data-smooth-scroll", &target);
        bound += 1;
    }

    if bound > 0 && doc.element_by_id(SMOOTH_SCROLL_ID).is_none() {
        let parent = doc.body().unwrap_or_else(|| doc.root());
        let script = doc.create_element("script");
        doc.set_attr(script, "id", SMOOTH_SCROLL_ID);
        let code = doc.create_text(SMOOTH_SCROLL_SCRIPT);
        doc.append_child(script, code);
        doc.append_child(parent, script);
    }

    bound
}

/// Append `© {year} {holder}` to the footer unless it already has a copyright mark
fn stamp_footer(doc: &mut Document, year: i32, holder: &str) -> bool {
    let Some(footer) = doc.find_first(doc.root(), "footer") else {
        return false;
    };
    if doc.text_content(footer).contains('©') {
        return false;
    }

    let line = doc.create_element("p");
    doc.set_text(line, &format!("© {} {}", year, holder));
    doc.append_child(footer, line);
    true
}
