//! Content module - posts, pages, media and markdown processing

mod frontmatter;
pub mod markdown;
mod media;
mod pages;
mod post;
mod repository;

pub use frontmatter::{parse_date_string, FrontMatter};
pub use markdown::MarkdownRenderer;
pub use media::{
    content_type_for, sanitize_file_name, MediaFile, MediaStore, UploadedFile, ALLOWED_TYPES,
    MAX_UPLOAD_BYTES,
};
pub use pages::{Page, PageStore};
pub use post::{is_valid_slug, tag_counts, NewPost, Post, PostUpdate, TagCount};
pub use repository::{filter_by_tag, sort_by_date, PostRepository, DEFAULT_EXCERPT_LENGTH};
