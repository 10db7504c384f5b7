//! Post loader - turns the query index into sorted post records

use std::sync::Arc;

use super::index::{IndexEntry, IndexError, IndexSource};
use super::post::{sort_newest_first, PostRecord};
use crate::config::PostsConfig;
use crate::helpers::timestamp_to_date;

/// Loads post records from an index source, falling back to a seed list
pub struct PostLoader {
    source: Arc<dyn IndexSource>,
    prefix: String,
    fallback: Vec<PostRecord>,
}

impl PostLoader {
    /// Create a loader for the given source
    pub fn new(source: Arc<dyn IndexSource>, config: &PostsConfig) -> Self {
        Self {
            source,
            prefix: config.prefix.clone(),
            fallback: config.fallback.clone(),
        }
    }

    /// Fetch the posts, newest first
    ///
    /// Never fails: any problem reading the index is logged and the seed list
    /// is returned instead.
    pub async fn fetch_posts(&self) -> Vec<PostRecord> {
        match self.try_fetch().await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!(
                    "Failed to load query index from {}: {}; using fallback posts",
                    self.source.location(),
                    e
                );
                let mut posts = self.fallback.clone();
                sort_newest_first(&mut posts);
                posts
            }
        }
    }

    async fn try_fetch(&self) -> Result<Vec<PostRecord>, IndexError> {
        let index = self.source.fetch().await?;

        let mut posts: Vec<PostRecord> = index
            .data
            .into_iter()
            .filter(|entry| entry.path.starts_with(&self.prefix))
            .map(to_post_record)
            .collect();

        sort_newest_first(&mut posts);
        tracing::debug!("Loaded {} posts from {}", posts.len(), self.source.location());

        Ok(posts)
    }
}

/// Map an index entry to a post record, applying defaults
fn to_post_record(entry: IndexEntry) -> PostRecord {
    let date = non_empty(entry.date)
        .or_else(|| entry.last_modified.as_ref().and_then(last_modified_date))
        .unwrap_or_default();

    PostRecord {
        title: non_empty(entry.title).unwrap_or_else(|| "Untitled".to_string()),
        description: entry.description.unwrap_or_default(),
        date,
        path: entry.path,
        image: entry.image.unwrap_or_default(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Normalize a `lastModified` value to a date string
fn last_modified_date(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().and_then(timestamp_to_date),
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => match s.trim().parse::<i64>() {
            Ok(secs) => timestamp_to_date(secs),
            Err(_) => Some(s.clone()),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::index::{MemoryIndex, QueryIndex};

    fn loader(index: Option<&str>) -> PostLoader {
        let index = index.map(|s| QueryIndex::from_json(s).unwrap());
        PostLoader::new(Arc::new(MemoryIndex(index)), &PostsConfig::default())
    }

    #[tokio::test]
    async fn test_fetch_filters_and_sorts() {
        let loader = loader(Some(
            r#"{"data": [
                {"path": "/posts/old", "title": "Old", "date": "2023-05-01"},
                {"path": "/about", "title": "About", "date": "2030-01-01"},
                {"path": "/posts/new", "title": "New", "date": "2025-12-05"},
                {"path": "/postscript", "title": "Not a post", "date": "2025-01-01"},
                {"path": "/posts/mid", "date": "2024-02-02"}
            ]}"#,
        ));

        let posts = loader.fetch_posts().await;
        let paths: Vec<_> = posts.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["/posts/new", "/posts/mid", "/posts/old"]);
        assert_eq!(posts[1].title, "Untitled");
        assert!(posts.iter().all(|p| p.path.starts_with("/posts/")));
    }

    #[tokio::test]
    async fn test_last_modified_fallback() {
        let loader = loader(Some(
            r#"{"data": [
                {"path": "/posts/a", "lastModified": "1700000000"},
                {"path": "/posts/b", "date": "", "lastModified": 1600000000},
                {"path": "/posts/c", "date": "2020-01-01", "lastModified": "1700000000"}
            ]}"#,
        ));

        let posts = loader.fetch_posts().await;
        assert_eq!(posts[0].path, "/posts/a");
        assert_eq!(posts[0].date, "2023-11-14");
        assert_eq!(posts[1].date, "2020-09-13");
        assert_eq!(posts[2].date, "2020-01-01");
    }

    #[tokio::test]
    async fn test_unavailable_index_uses_sorted_fallback() {
        let posts = loader(None).fetch_posts().await;
        let fallback = PostsConfig::default().fallback;
        assert_eq!(posts.len(), fallback.len());

        let mut expected = fallback;
        sort_newest_first(&mut expected);
        assert_eq!(posts, expected);
        assert_eq!(posts[0].date, "2025-03-02");
    }

    #[tokio::test]
    async fn test_empty_index_is_not_a_failure() {
        let posts = loader(Some(r#"{"data": []}"#)).fetch_posts().await;
        assert!(posts.is_empty());
    }
}
