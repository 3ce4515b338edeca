//! Create a new post from the command line

use anyhow::Result;

use crate::content::{is_valid_slug, NewPost, Post};
use crate::Blog;

/// Create a draft post titled `title`
///
/// The slug defaults to the slugified title; titles that slugify to nothing
/// (e.g. CJK only) get a `post-<timestamp>` slug instead.
pub fn run(blog: &Blog, title: &str, slug: Option<&str>) -> Result<Post> {
    let now = chrono::Local::now();
    let slug = match slug {
        Some(s) => s.to_string(),
        None => {
            let s = slug::slugify(title);
            if is_valid_slug(&s) {
                s
            } else {
                format!("post-{}", now.format("%Y%m%d%H%M%S"))
            }
        }
    };

    let post = blog.posts().create(NewPost {
        slug,
        title: title.to_string(),
        content: format!("# {}\n\nStart writing here.\n", title),
        date: Some(now.format("%Y-%m-%d").to_string()),
        published: Some(false),
        ..Default::default()
    })?;

    println!("Created: {:?}", blog.posts_dir.join(format!("{}.md", post.slug)));
    Ok(post)
}
