//! Query index sources
//!
//! The query index is a generated JSON document listing every page of the
//! site. Only the shape is relied on here: a `data` array whose entries have a
//! `path` and some optional metadata.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{IndexSourceKind, SiteConfig};

/// Errors produced while reading the query index
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed index: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Index unavailable")]
    Unavailable,
}

/// The query index payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryIndex {
    pub data: Vec<IndexEntry>,
}

impl QueryIndex {
    /// Parse an index from JSON text
    pub fn from_json(s: &str) -> Result<Self, IndexError> {
        Ok(serde_json::from_str(s)?)
    }
}

/// One page of the query index
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexEntry {
    pub path: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    /// Unix seconds (number or numeric string) or a date string
    #[serde(default, rename = "lastModified")]
    pub last_modified: Option<serde_json::Value>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A place the query index can be read from
#[async_trait]
pub trait IndexSource: Send + Sync {
    /// Fetch and parse the index
    async fn fetch(&self) -> Result<QueryIndex, IndexError>;

    /// Human-readable location, for logs
    fn location(&self) -> String;
}

/// Reads the index over HTTP
pub struct HttpIndex {
    client: reqwest::Client,
    url: String,
}

impl HttpIndex {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, IndexError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl IndexSource for HttpIndex {
    async fn fetch(&self) -> Result<QueryIndex, IndexError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        QueryIndex::from_json(&body)
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}

/// Reads the index from a file in the public directory
pub struct FileIndex {
    path: PathBuf,
}

impl FileIndex {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl IndexSource for FileIndex {
    async fn fetch(&self) -> Result<QueryIndex, IndexError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        QueryIndex::from_json(&content)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// An in-memory index; `None` behaves like an unreachable endpoint
pub struct MemoryIndex(pub Option<QueryIndex>);

#[async_trait]
impl IndexSource for MemoryIndex {
    async fn fetch(&self) -> Result<QueryIndex, IndexError> {
        self.0.clone().ok_or(IndexError::Unavailable)
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Build the index source selected by the site configuration
pub fn from_config(
    config: &SiteConfig,
    public_dir: &Path,
) -> Result<Arc<dyn IndexSource>, IndexError> {
    let index = config.posts.index.trim_start_matches('/');
    match config.posts.source {
        IndexSourceKind::File => Ok(Arc::new(FileIndex::new(public_dir.join(index)))),
        IndexSourceKind::Http => {
            let url = format!("{}/{}", config.url.trim_end_matches('/'), index);
            let timeout = Duration::from_secs(config.posts.timeout_secs);
            Ok(Arc::new(HttpIndex::new(&url, timeout)?))
        }
    }
}
