//! List blog content

use anyhow::Result;

use crate::content::tag_counts;
use crate::Blog;

/// List content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let posts = blog.posts().list_all(false)?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", posts.len());
            for post in &posts {
                let marker = if post.published { "" } else { " (draft)" };
                println!("  {} - {} [{}]{}", post.date, post.title, post.slug, marker);
            }
        }
        "draft" | "drafts" => {
            let drafts: Vec<_> = posts.iter().filter(|p| !p.published).collect();
            println!("Drafts ({}):", drafts.len());
            for post in drafts {
                println!("  {} - {} [{}]", post.date, post.title, post.slug);
            }
        }
        "tag" | "tags" => {
            let tags = tag_counts(&posts);
            println!("Tags ({}):", tags.len());
            for tag in tags {
                println!("  {} ({})", tag.tag, tag.count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, draft, tag",
                content_type
            );
        }
    }

    Ok(())
}
