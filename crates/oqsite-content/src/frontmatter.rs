//! Frontmatter extraction and parsing for template pages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Parsed frontmatter from a page template.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PageFrontmatter {
    /// Page title
    #[serde(default)]
    pub title: Option<String>,

    /// Page description for meta tags
    #[serde(default)]
    pub description: Option<String>,

    /// Layout template wrapping the page body
    #[serde(default)]
    pub layout: Option<String>,

    /// Output path override, relative to the output directory
    #[serde(default)]
    pub permalink: Option<String>,

    /// Ordering hint for listings (lower = first)
    #[serde(default)]
    pub order: Option<i32>,

    /// Whether to list the page in sitemap.xml
    #[serde(default = "default_true")]
    pub sitemap: bool,

    /// Any other keys, exposed to templates as `page.data`
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

fn default_true() -> bool {
    true
}

impl Default for PageFrontmatter {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            layout: None,
            permalink: None,
            order: None,
            sitemap: true,
            extra: BTreeMap::new(),
        }
    }
}

/// Extract frontmatter from a page source.
///
/// Returns the parsed frontmatter and the remaining body after the frontmatter block.
pub fn extract_frontmatter(
    source: &str,
) -> Result<(Option<PageFrontmatter>, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    if !trimmed.starts_with("---") {
        return Ok((None, source));
    }

    let after_open = &trimmed[3..];
    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = after_open[..close_pos].trim();
    let remaining = &after_open[close_pos + 4..];

    // An empty block is valid and yields the defaults
    let frontmatter: PageFrontmatter = if yaml_content.is_empty() {
        PageFrontmatter::default()
    } else {
        serde_yaml::from_str(yaml_content)
            .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?
    };

    Ok((Some(frontmatter), remaining.trim_start()))
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_page_frontmatter() {
        let source = r#"---
title: Features
layout: page.html
permalink: features/index.html
hero: true
---

<h1>{{ page.title }}</h1>
"#;

        let (fm, body) = extract_frontmatter(source).unwrap();
        let fm = fm.unwrap();

        assert_eq!(fm.title.as_deref(), Some("Features"));
        assert_eq!(fm.layout.as_deref(), Some("page.html"));
        assert_eq!(fm.permalink.as_deref(), Some("features/index.html"));
        assert!(fm.sitemap);
        assert_eq!(fm.extra.get("hero"), Some(&serde_yaml::Value::Bool(true)));
        assert!(body.starts_with("<h1>"));
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, body) = extract_frontmatter(source).unwrap();

        assert!(fm.is_none());
        assert_eq!(body, source);
    }

    #[test]
    fn empty_block_uses_defaults() {
        let (fm, body) = extract_frontmatter("---\n---\nbody").unwrap();

        assert_eq!(fm, Some(PageFrontmatter::default()));
        assert_eq!(body, "body");
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let result = extract_frontmatter("---\ntitle: Test\n# No closing");

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let result = extract_frontmatter("---\ntitle: [invalid yaml\n---\n");

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }
}
