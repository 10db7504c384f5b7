//! blocks-rs: block decoration for static sites
//!
//! Pages are split into sections whose first class name selects a block.
//! This crate links each block's stylesheet, runs the registered block
//! against its section and applies a few page-wide touch-ups. The built-in
//! `posts` block lists blog posts from the site's query index.

pub mod blocks;
pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod content;
pub mod document;
pub mod helpers;
pub mod server;

use anyhow::Result;
use std::path::Path;

use blocks::{BlockRegistry, PostsBlock};
use bootstrap::Bootstrapper;
use content::PostLoader;

/// A site on disk
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
}

impl Site {
    /// Create a site from a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            public_dir,
        })
    }

    /// Loader for the posts listed in the site's query index
    pub fn post_loader(&self) -> Result<PostLoader> {
        let source = content::index::from_config(&self.config, &self.public_dir)?;
        Ok(PostLoader::new(source, &self.config.posts))
    }

    /// Registry with every built-in block
    pub fn registry(&self) -> Result<BlockRegistry> {
        let mut registry = BlockRegistry::new();
        registry.register("posts", PostsBlock::new(self.post_loader()?));
        Ok(registry)
    }

    /// Bootstrapper using the built-in blocks
    pub fn bootstrapper(&self) -> Result<Bootstrapper> {
        Ok(Bootstrapper::new(self.registry()?, &self.config))
    }
}
