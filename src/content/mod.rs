//! Content module - post records and the query index they come from

pub mod index;
pub mod loader;
mod post;

pub use index::{IndexError, IndexSource, QueryIndex};
pub use loader::PostLoader;
pub use post::{sort_newest_first, PostRecord};
