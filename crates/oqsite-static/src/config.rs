//! `site.toml` configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use oqsite_scene::SceneConfig;

use crate::builder::{BuildConfig, CollectionSpec, Passthrough};

/// Configuration file structure (site.toml).
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub dirs: DirsConfig,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default = "default_passthrough")]
    pub passthrough: Vec<Passthrough>,
    #[serde(default = "default_collections")]
    pub collections: Vec<CollectionSpec>,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub scene: SceneSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirsConfig {
    #[serde(default = "default_input")]
    pub input: String,
    #[serde(default = "default_output")]
    pub output: String,
    /// Layouts and partials, relative to the input directory
    #[serde(default = "default_includes")]
    pub includes: String,
    /// Data overrides, relative to the input directory
    #[serde(default = "default_data")]
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_template_formats")]
    pub template_formats: Vec<String>,
    #[serde(default = "default_minify")]
    pub minify: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Absolute site origin for sitemap entries, e.g. "https://openquality.dev"
    pub site_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_watch_targets")]
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub config: SceneConfig,
}

fn default_input() -> String {
    "src".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_includes() -> String {
    "_includes".to_string()
}
fn default_data() -> String {
    "_data".to_string()
}
fn default_template_formats() -> Vec<String> {
    vec!["html".to_string(), "md".to_string()]
}
fn default_minify() -> bool {
    true
}
fn default_true() -> bool {
    true
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_watch_targets() -> Vec<String> {
    vec![
        "content".to_string(),
        "src/assets/css/styles.css".to_string(),
    ]
}

fn default_passthrough() -> Vec<Passthrough> {
    vec![
        Passthrough::new("src/assets", "assets"),
        Passthrough::new("public", ""),
        Passthrough::new("CNAME", "CNAME"),
    ]
}

fn default_collections() -> Vec<CollectionSpec> {
    vec![
        CollectionSpec {
            name: "articles".to_string(),
            dir: PathBuf::from("content/articles"),
            layout: None,
        },
        CollectionSpec {
            name: "shorts".to_string(),
            dir: PathBuf::from("content/short"),
            layout: None,
        },
    ]
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::default_site()
    }
}

impl Default for DirsConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            includes: default_includes(),
            data: default_data(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            template_formats: default_template_formats(),
            minify: default_minify(),
            base_url: default_base_url(),
            site_url: None,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            targets: default_watch_targets(),
        }
    }
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            config: SceneConfig::default(),
        }
    }
}

/// Errors raised while loading site.toml.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl SiteConfig {
    /// Load configuration from `path` if it exists, otherwise use defaults.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default_site());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config = Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse site.toml contents.
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Defaults matching an empty site.toml.
    pub fn default_site() -> Self {
        Self {
            dirs: DirsConfig::default(),
            build: BuildSettings::default(),
            passthrough: default_passthrough(),
            collections: default_collections(),
            watch: WatchConfig::default(),
            scene: SceneSettings::default(),
        }
    }

    /// Paths the dev server watches, resolved against `root`.
    pub fn watch_paths(&self, root: &Path) -> Vec<PathBuf> {
        let mut paths = vec![root.join(&self.dirs.input)];
        paths.extend(self.collections.iter().map(|c| root.join(&c.dir)));
        paths.extend(self.watch.targets.iter().map(|t| root.join(t)));
        paths.sort();
        paths.dedup();
        paths
    }

    /// Build settings for a project rooted at `root`.
    pub fn to_build_config(&self, root: &Path) -> BuildConfig {
        BuildConfig {
            root: root.to_path_buf(),
            input_dir: PathBuf::from(&self.dirs.input),
            output_dir: PathBuf::from(&self.dirs.output),
            includes_dir: PathBuf::from(&self.dirs.includes),
            data_dir: PathBuf::from(&self.dirs.data),
            template_formats: self.build.template_formats.clone(),
            passthrough: self.passthrough.clone(),
            collections: self.collections.clone(),
            minify: self.build.minify,
            base_url: self.build.base_url.clone(),
            site_url: self.build.site_url.clone(),
            scene: self.scene.enabled.then(|| self.scene.config.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_matches_defaults() {
        let parsed = SiteConfig::parse("").unwrap();
        let defaults = SiteConfig::default_site();

        assert_eq!(parsed.dirs.input, "src");
        assert_eq!(parsed.dirs.output, "dist");
        assert_eq!(parsed.passthrough, defaults.passthrough);
        assert_eq!(parsed.collections, defaults.collections);
        assert_eq!(parsed.build.template_formats, vec!["html", "md"]);
        assert!(parsed.scene.enabled);
        assert_eq!(parsed.scene.config, SceneConfig::default());
    }

    #[test]
    fn parses_full_config() {
        let parsed = SiteConfig::parse(
            r#"
[dirs]
input = "site"
output = "public_html"

[build]
minify = false
site_url = "https://openquality.dev"

[[passthrough]]
from = "static"
to = "static"

[[collections]]
name = "articles"
dir = "posts"
layout = "article.html"

[watch]
targets = ["posts"]

[scene]
enabled = false
seed = 7
"#,
        )
        .unwrap();

        assert_eq!(parsed.dirs.input, "site");
        assert_eq!(parsed.dirs.includes, "_includes");
        assert!(!parsed.build.minify);
        assert_eq!(parsed.passthrough, vec![Passthrough::new("static", "static")]);
        assert_eq!(parsed.collections.len(), 1);
        assert_eq!(parsed.collections[0].layout.as_deref(), Some("article.html"));
        assert!(!parsed.scene.enabled);
        assert_eq!(parsed.scene.config.seed, 7);

        let build = parsed.to_build_config(Path::new("/project"));
        assert!(build.scene.is_none());
        assert_eq!(build.site_url.as_deref(), Some("https://openquality.dev"));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(SiteConfig::parse("[dirs\ninput = ").is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = SiteConfig::load(Path::new("/nonexistent/site.toml")).unwrap();

        assert_eq!(config.collections.len(), 2);
    }

    #[test]
    fn watch_paths_are_deduplicated() {
        let config = SiteConfig::default_site();
        let paths = config.watch_paths(Path::new("/p"));

        assert!(paths.contains(&PathBuf::from("/p/src")));
        assert!(paths.contains(&PathBuf::from("/p/content/articles")));
        assert!(paths.contains(&PathBuf::from("/p/content")));
        let mut unique = paths.clone();
        unique.dedup();
        assert_eq!(unique, paths);
    }
}
