//! Post record model

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::helpers::parse_instant;

fn default_title() -> String {
    "Untitled".to_string()
}

/// Normalized metadata for one blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Post title
    #[serde(default = "default_title")]
    pub title: String,

    /// Short description shown under the title
    #[serde(default)]
    pub description: String,

    /// ISO-like publication date, empty when unknown
    #[serde(default)]
    pub date: String,

    /// URL path; link target and identity
    pub path: String,

    /// Teaser image URL
    #[serde(default)]
    pub image: String,
}

impl PostRecord {
    /// Create a record with default title and empty optional fields
    pub fn new(path: &str) -> Self {
        Self {
            title: default_title(),
            description: String::new(),
            date: String::new(),
            path: path.to_string(),
            image: String::new(),
        }
    }

    /// Order newest first; unparsable dates go after every valid one
    pub fn cmp_newest_first(&self, other: &Self) -> Ordering {
        let a = parse_instant(&self.date);
        let b = parse_instant(&other.date);
        // None < Some, so reversing puts invalid dates last
        b.cmp(&a)
    }
}

/// Stable sort, newest first
pub fn sort_newest_first(posts: &mut [PostRecord]) {
    posts.sort_by(|a, b| a.cmp_newest_first(b));
}
