//! List the posts the posts block would render

use anyhow::Result;

use crate::helpers::long_date;
use crate::Site;

/// Print posts, newest first
pub async fn run(site: &Site) -> Result<()> {
    let loader = site.post_loader()?;
    let posts = loader.fetch_posts().await;

    println!("Posts ({}):", posts.len());
    for post in posts {
        let date = if post.date.is_empty() {
            "(no date)".to_string()
        } else {
            long_date(&post.date)
        };
        println!("  {} - {} [{}]", date, post.title, post.path);
    }

    Ok(())
}
