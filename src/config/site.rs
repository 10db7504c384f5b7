//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::content::PostRecord;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,
    /// Copyright holder stamped into the footer; falls back to `author`
    pub copyright: Option<String>,

    // URL
    pub url: String,

    // Directory
    pub public_dir: String,

    #[serde(default)]
    pub blocks: BlocksConfig,
    #[serde(default)]
    pub posts: PostsConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            author: "John Doe".to_string(),
            copyright: None,

            url: "http://localhost:4000".to_string(),

            public_dir: "public".to_string(),

            blocks: BlocksConfig::default(),
            posts: PostsConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Name stamped into the footer copyright line
    pub fn copyright_holder(&self) -> &str {
        self.copyright.as_deref().unwrap_or(&self.author)
    }
}

/// Block discovery and asset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlocksConfig {
    /// URL prefix under which `<kind>/<kind>.css` lives
    pub path: String,
    /// Tag name of the element that holds the page sections
    pub content_root: String,
}

impl Default for BlocksConfig {
    fn default() -> Self {
        Self {
            path: "/blocks".to_string(),
            content_root: "main".to_string(),
        }
    }
}

impl BlocksConfig {
    /// Stylesheet href for a block kind
    pub fn stylesheet_href(&self, kind: &str) -> String {
        format!("{}/{kind}/{kind}.css", self.path.trim_end_matches('/'))
    }
}

/// Where the query index is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexSourceKind {
    /// Read `<public_dir><index>` from disk
    File,
    /// GET `<url><index>`
    Http,
}

/// Post listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostsConfig {
    /// Path of the query index, relative to the site root
    pub index: String,
    /// Only index entries under this path are posts
    pub prefix: String,
    pub source: IndexSourceKind,
    /// Request timeout for the HTTP source
    pub timeout_secs: u64,
    /// Seed list used when the index cannot be read
    pub fallback: Vec<PostRecord>,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            index: "/query-index.json".to_string(),
            prefix: "/posts/".to_string(),
            source: IndexSourceKind::File,
            timeout_secs: 10,
            fallback: default_fallback_posts(),
        }
    }
}

fn default_fallback_posts() -> Vec<PostRecord> {
    vec![
        PostRecord {
            title: "Getting Started with Blocks".to_string(),
            description: "How pages are split into sections and decorated one block at a time."
                .to_string(),
            date: "2025-01-15".to_string(),
            path: "/posts/getting-started-with-blocks".to_string(),
            image: String::new(),
        },
        PostRecord {
            title: "Writing a Posts Index".to_string(),
            description: "Publishing post metadata as a query index the site can list from."
                .to_string(),
            date: "2025-03-02".to_string(),
            path: "/posts/writing-a-posts-index".to_string(),
            image: String::new(),
        },
        PostRecord {
            title: "Hello World".to_string(),
            description: "The first post on this blog.".to_string(),
            date: "2024-11-20".to_string(),
            path: "/posts/hello-world".to_string(),
            image: String::new(),
        },
    ]
}
