//! The posts block: a chronological list of blog posts

use async_trait::async_trait;

use super::{Block, BlockError};
use crate::content::{PostLoader, PostRecord};
use crate::document::{Document, NodeId};
use crate::helpers::long_date;

/// Renders the site's posts into its section
pub struct PostsBlock {
    loader: PostLoader,
}

impl PostsBlock {
    pub fn new(loader: PostLoader) -> Self {
        Self { loader }
    }
}

#[async_trait]
impl Block for PostsBlock {
    async fn decorate(&self, doc: &mut Document, section: NodeId) -> Result<(), BlockError> {
        doc.clear_children(section);
        let posts = self.loader.fetch_posts().await;
        render(doc, section, &posts);
        Ok(())
    }
}

/// Replace the content of `section` with a list of `posts`, in the given order
pub fn render(doc: &mut Document, section: NodeId, posts: &[PostRecord]) {
    doc.clear_children(section);

    if posts.is_empty() {
        let notice = doc.create_element("p");
        doc.set_text(notice, "No posts found.");
        doc.append_child(section, notice);
        return;
    }

    let container = doc.create_element_with_class("div", "posts-container");

    for post in posts {
        let item = doc.create_element_with_class("article", "post-item");

        if !post.date.is_empty() {
            let date = doc.create_element_with_class("div", "post-date");
            doc.set_text(date, &long_date(&post.date));
            doc.append_child(item, date);
        }

        let heading = doc.create_element("h3");
        let link = doc.create_element("a");
        doc.set_attr(link, "href", &post.path);
        doc.set_text(link, &post.title);
        doc.append_child(heading, link);
        doc.append_child(item, heading);

        if !post.description.is_empty() {
            let excerpt = doc.create_element_with_class("p", "post-excerpt");
            doc.set_text(excerpt, &post.description);
            doc.append_child(item, excerpt);
        }

        doc.append_child(container, item);
    }

    doc.append_child(section, container);
}
