//! Static site builder for oqsite.
//!
//! Renders minijinja pages and Markdown content collections into an output
//! tree, copies passthrough assets, and writes the hero scene bundle.

pub mod assets;
pub mod builder;
pub mod config;
pub mod data;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, CollectionSpec, Passthrough, StaticBuilder};
pub use config::{ConfigError, SiteConfig};
pub use data::{DataError, Highlights, SiteData, SiteInfo};
pub use templates::{PageContext, PageMeta, TemplateEngine};
