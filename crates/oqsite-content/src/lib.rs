//! Markdown content for the oqsite build.
//!
//! Loads directories of Markdown files into content collections, renders them to
//! HTML with soft line breaks and bare-URL linking, and parses the YAML
//! frontmatter carried by template pages.

pub mod collection;
pub mod frontmatter;
pub mod render;

pub use collection::{
    load_collection, ContentCollection, ContentLoader, ContentRecord, IngestError, LoadOutcome,
};
pub use frontmatter::{extract_frontmatter, FrontmatterError, PageFrontmatter};
pub use render::{first_heading, render_markdown, MarkdownRenderer};
