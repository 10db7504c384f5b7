//! Block behaviors
//!
//! A block is the behavior attached to one kind of page section. Kinds are
//! resolved through a [`BlockRegistry`] instead of by loading code at runtime,
//! so the set of known kinds is fixed when the registry is built.

pub mod posts;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::document::{Document, NodeId};

pub use posts::PostsBlock;

/// Errors raised while resolving or running a block
#[derive(Error, Debug)]
pub enum BlockError {
    #[error("No block registered for kind '{0}'")]
    NotFound(String),

    #[error("Block '{kind}' failed: {message}")]
    Failed { kind: String, message: String },
}

/// Behavior for one section kind
#[async_trait]
pub trait Block: Send + Sync {
    /// Enhance `section` in place
    async fn decorate(&self, doc: &mut Document, section: NodeId) -> Result<(), BlockError>;
}

/// Maps section kinds to their behavior
#[derive(Clone, Default)]
pub struct BlockRegistry {
    blocks: HashMap<String, Arc<dyn Block>>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block for a kind, replacing any previous registration
    pub fn register<B: Block + 'static>(&mut self, kind: &str, block: B) -> &mut Self {
        self.blocks.insert(kind.to_string(), Arc::new(block));
        self
    }

    /// Look up the block for a kind
    pub fn resolve(&self, kind: &str) -> Result<Arc<dyn Block>, BlockError> {
        self.blocks
            .get(kind)
            .cloned()
            .ok_or_else(|| BlockError::NotFound(kind.to_string()))
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<_> = self.blocks.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}
