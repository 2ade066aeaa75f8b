//! Static site builder.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Deserialize;
use walkdir::{DirEntry, WalkDir};

use oqsite_content::{
    extract_frontmatter, first_heading, ContentLoader, ContentRecord, FrontmatterError,
    IngestError, MarkdownRenderer, PageFrontmatter,
};
use oqsite_scene::{Scene, SceneConfig, SceneError, Viewport};

use crate::assets::AssetPipeline;
use crate::data::{DataError, SiteData};
use crate::templates::{PageContext, PageMeta, TemplateEngine};

/// A file or directory copied verbatim into the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Passthrough {
    /// Source path, relative to the project root
    pub from: PathBuf,
    /// Destination, relative to the output directory
    #[serde(default)]
    pub to: PathBuf,
}

impl Passthrough {
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A named content collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionSpec {
    /// Name exposed to templates as `collections.<name>`
    pub name: String,
    /// Directory of `*.md` files, relative to the project root
    pub dir: PathBuf,
    /// Layout used to emit one page per record
    #[serde(default)]
    pub layout: Option<String>,
}

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Project root; every other path is resolved against it
    pub root: PathBuf,

    /// Pages and templates
    pub input_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Layouts and partials, relative to the input directory
    pub includes_dir: PathBuf,

    /// Data overrides, relative to the input directory
    pub data_dir: PathBuf,

    /// File extensions treated as pages
    pub template_formats: Vec<String>,

    pub passthrough: Vec<Passthrough>,

    pub collections: Vec<CollectionSpec>,

    /// Minify the generated stylesheet
    pub minify: bool,

    /// Base URL for the site
    pub base_url: String,

    /// Absolute origin used in sitemap.xml
    pub site_url: Option<String>,

    /// Scene settings; `None` skips the hero scene assets
    pub scene: Option<SceneConfig>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            input_dir: PathBuf::from("src"),
            output_dir: PathBuf::from("dist"),
            includes_dir: PathBuf::from("_includes"),
            data_dir: PathBuf::from("_data"),
            template_formats: vec!["html".to_string(), "md".to_string()],
            passthrough: Vec::new(),
            collections: Vec::new(),
            minify: true,
            base_url: "/".to_string(),
            site_url: None,
            scene: Some(SceneConfig::default()),
        }
    }
}

impl BuildConfig {
    pub fn input_path(&self) -> PathBuf {
        self.root.join(&self.input_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    pub fn includes_path(&self) -> PathBuf {
        self.input_path().join(&self.includes_dir)
    }

    pub fn data_path(&self) -> PathBuf {
        self.input_path().join(&self.data_dir)
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated, including collection pages
    pub pages: usize,

    /// Records loaded across all collections
    pub records: usize,

    /// Files copied by passthrough rules
    pub copied: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read {path}: {message}")]
    ReadError { path: PathBuf, message: String },

    #[error("Invalid frontmatter in {path}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },

    #[error("Failed to render {name}: {message}")]
    TemplateError { name: String, message: String },

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("More than one page writes to {0}")]
    DuplicateOutput(PathBuf),

    #[error("Permalink {permalink:?} in {path} points outside the output directory")]
    InvalidPermalink { path: PathBuf, permalink: String },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageKind {
    /// Rendered as a template only
    Template,
    /// Rendered as a template, then as Markdown
    Markdown,
}

/// A page to be built.
#[derive(Debug)]
struct PageInfo {
    /// Path relative to the input directory
    relative_path: PathBuf,

    /// Output path
    output_path: PathBuf,

    /// URL path
    url: String,

    kind: PageKind,

    frontmatter: PageFrontmatter,

    /// Source after the frontmatter block
    body: String,
}

/// Read-only state shared by every page render.
struct RenderInputs {
    data: SiteData,
    collections: BTreeMap<String, Vec<ContentRecord>>,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
    markdown: MarkdownRenderer,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        let templates = TemplateEngine::with_includes(&config.includes_path());

        Self {
            config,
            templates,
            markdown: MarkdownRenderer::new(),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the static site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let output_dir = self.config.output_path();

        fs::create_dir_all(&output_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let data = SiteData::load(&self.config.data_path())?;
        let collections = self.load_collections()?;
        let records = collections.values().map(Vec::len).sum();
        let inputs = RenderInputs { data, collections };

        let pages = self.discover_pages()?;
        self.check_unique_outputs(&pages, &inputs)?;

        // Render pages in parallel
        let results: Vec<Result<(), BuildError>> = pages
            .par_iter()
            .map(|page| self.build_page(page, &inputs))
            .collect();

        for result in results {
            result?;
        }

        let mut sitemap_urls: Vec<String> = pages
            .iter()
            .filter(|p| p.frontmatter.sitemap)
            .map(|p| p.url.clone())
            .collect();

        if pages.is_empty() {
            tracing::info!("No pages found, rendering built-in landing page");
            self.build_landing(&inputs)?;
            sitemap_urls.push(self.config.base_url.clone());
        }

        let collection_urls = self.build_collection_pages(&inputs)?;
        let total_pages = pages.len().max(1) + collection_urls.len();
        sitemap_urls.extend(collection_urls);

        let copied = self.copy_passthrough()?;

        self.generate_assets()?;
        self.generate_sitemap(&sitemap_urls)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: total_pages,
            records,
            copied,
            duration_ms: duration.as_millis() as u64,
            output_dir,
        })
    }

    /// Load every configured collection. A missing directory yields an empty collection.
    fn load_collections(&self) -> Result<BTreeMap<String, Vec<ContentRecord>>, BuildError> {
        let loader = ContentLoader::new(&self.config.root);
        let mut collections = BTreeMap::new();

        for spec in &self.config.collections {
            let outcome = loader.load(&spec.name, &spec.dir)?;
            if outcome.is_missing() {
                tracing::debug!(
                    "Collection '{}' has no directory at {}",
                    spec.name,
                    spec.dir.display()
                );
            }

            let collection = outcome.into_collection();
            tracing::info!("Loaded {} records into '{}'", collection.len(), spec.name);
            collections.insert(spec.name.clone(), collection.records().to_vec());
        }

        Ok(collections)
    }

    /// Directories under the input directory that never hold pages.
    fn excluded_dirs(&self) -> Vec<PathBuf> {
        let mut excluded = vec![self.config.includes_path(), self.config.data_path()];
        excluded.extend(
            self.config
                .passthrough
                .iter()
                .map(|p| self.config.root.join(&p.from)),
        );
        excluded.push(self.config.output_path());
        excluded
    }

    /// Discover all pages in the input directory.
    fn discover_pages(&self) -> Result<Vec<PageInfo>, BuildError> {
        let input_dir = self.config.input_path();
        let mut pages = Vec::new();

        if !input_dir.exists() {
            tracing::warn!("Input directory not found: {}", input_dir.display());
            return Ok(pages);
        }

        let excluded = self.excluded_dirs();
        let keep = |entry: &DirEntry| {
            if entry.depth() == 0 {
                return true;
            }
            let hidden = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('_') || name.starts_with('.'));
            !hidden && !excluded.iter().any(|dir| entry.path() == dir)
        };

        for entry in WalkDir::new(&input_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(keep)
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !self.config.template_formats.iter().any(|f| f == ext) {
                continue;
            }

            let content = fs::read_to_string(path).map_err(|e| BuildError::ReadError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

            let (frontmatter, body) =
                extract_frontmatter(&content).map_err(|source| BuildError::Frontmatter {
                    path: path.to_path_buf(),
                    source,
                })?;

            let relative_path = path.strip_prefix(&input_dir).unwrap_or(path).to_path_buf();
            let frontmatter = frontmatter.unwrap_or_default();
            let output_path = self
                .calculate_output_path(&relative_path, &frontmatter)
                .ok_or_else(|| BuildError::InvalidPermalink {
                    path: path.to_path_buf(),
                    permalink: frontmatter.permalink.clone().unwrap_or_default(),
                })?;
            let url = self.path_to_url(&output_path);

            pages.push(PageInfo {
                kind: if ext == "md" {
                    PageKind::Markdown
                } else {
                    PageKind::Template
                },
                body: body.to_string(),
                relative_path,
                output_path,
                url,
                frontmatter,
            });
        }

        // Sort by order from frontmatter
        pages.sort_by_key(|p| p.frontmatter.order.unwrap_or(999));

        tracing::debug!("Discovered {} pages in {}", pages.len(), input_dir.display());
        Ok(pages)
    }

    /// Every page, the landing fallback and every collection page must write a distinct file.
    fn check_unique_outputs(
        &self,
        pages: &[PageInfo],
        inputs: &RenderInputs,
    ) -> Result<(), BuildError> {
        let landing = self.config.output_path().join("index.html");
        let mut seen = HashSet::new();

        let page_outputs = pages.iter().map(|p| p.output_path.clone());
        let fallback = pages.is_empty().then_some(landing);

        for output in page_outputs
            .chain(fallback)
            .chain(self.collection_outputs(inputs).map(|(_, _, path)| path))
        {
            if !seen.insert(output.clone()) {
                return Err(BuildError::DuplicateOutput(output));
            }
        }

        Ok(())
    }

    /// Output paths of collection records rendered through a layout.
    fn collection_outputs<'a>(
        &'a self,
        inputs: &'a RenderInputs,
    ) -> impl Iterator<Item = (&'a CollectionSpec, &'a ContentRecord, PathBuf)> + 'a {
        let output_dir = self.config.output_path();

        self.config
            .collections
            .iter()
            .filter(|spec| spec.layout.is_some())
            .filter_map(move |spec| inputs.collections.get(&spec.name).map(|records| (spec, records)))
            .flat_map(move |(spec, records)| {
                let output_dir = output_dir.clone();
                records.iter().map(move |record| {
                    let path = output_dir
                        .join(&spec.name)
                        .join(&record.slug)
                        .join("index.html");
                    (spec, record, path)
                })
            })
    }

    /// Calculate output path for a page. `None` when the permalink escapes the output directory.
    fn calculate_output_path(
        &self,
        relative: &Path,
        frontmatter: &PageFrontmatter,
    ) -> Option<PathBuf> {
        let output_dir = self.config.output_path();

        if let Some(permalink) = &frontmatter.permalink {
            let trimmed = permalink.trim_start_matches('/');
            let escapes = Path::new(trimmed)
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return None;
            }

            let target = output_dir.join(trimmed);
            // "about/" and "about" both become about/index.html; "404.html" stays a file
            return Some(
                if trimmed.is_empty() || trimmed.ends_with('/') || target.extension().is_none() {
                    target.join("index.html")
                } else {
                    target
                },
            );
        }

        let stem = relative
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("index");
        let parent = relative.parent().unwrap_or(Path::new(""));

        Some(if stem == "index" {
            // src/index.html -> dist/index.html
            output_dir.join(parent).join("index.html")
        } else {
            // src/features.html -> dist/features/index.html
            output_dir.join(parent).join(stem).join("index.html")
        })
    }

    /// Convert output path to URL.
    fn path_to_url(&self, path: &Path) -> String {
        let output_dir = self.config.output_path();
        let relative = path.strip_prefix(&output_dir).unwrap_or(path);

        let url_of = |p: &Path| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        };

        if relative.file_name().and_then(|f| f.to_str()) != Some("index.html") {
            return format!("{}{}", self.config.base_url, url_of(relative));
        }

        let url = relative.parent().map(url_of).unwrap_or_default();

        if url.is_empty() {
            self.config.base_url.clone()
        } else {
            format!("{}{}/", self.config.base_url, url)
        }
    }

    fn context<'a>(&'a self, inputs: &'a RenderInputs, page: PageMeta) -> PageContext<'a> {
        PageContext {
            site: &inputs.data.site,
            highlights: &inputs.data.highlights,
            collections: &inputs.collections,
            page,
            base_url: &self.config.base_url,
            scene_enabled: self.config.scene.is_some(),
            content: None,
            record: None,
        }
    }

    /// Build a single page.
    fn build_page(&self, page: &PageInfo, inputs: &RenderInputs) -> Result<(), BuildError> {
        let name = page.relative_path.to_string_lossy().replace('\\', "/");
        let fm = &page.frontmatter;

        let meta = PageMeta {
            title: fm
                .title
                .clone()
                .unwrap_or_else(|| inputs.data.site.title.clone()),
            description: fm.description.clone().unwrap_or_default(),
            url: page.url.clone(),
            data: fm.extra.clone(),
        };

        let mut context = self.context(inputs, meta);

        let rendered = self
            .templates
            .render_source(&name, &page.body, &context)
            .map_err(|e| template_error(&name, e))?;

        let body = match page.kind {
            PageKind::Markdown => {
                // Markdown pages without a title take their first heading
                if fm.title.is_none() {
                    if let Some(heading) = first_heading(&rendered) {
                        context.page.title = heading;
                    }
                }
                self.markdown.render(&rendered)
            }
            PageKind::Template => rendered,
        };

        let html = match &fm.layout {
            Some(layout) => {
                context.content = Some(body);
                self.templates
                    .render_layout(layout, &context)
                    .map_err(|e| template_error(layout, e))?
            }
            None => body,
        };

        write_output(&page.output_path, &html)?;
        tracing::debug!("Rendered {} -> {}", name, page.url);
        Ok(())
    }

    /// Render the built-in landing page as the site index.
    fn build_landing(&self, inputs: &RenderInputs) -> Result<(), BuildError> {
        let meta = PageMeta {
            title: inputs.data.site.title.clone(),
            description: inputs.data.site.description.clone(),
            url: self.config.base_url.clone(),
            ..Default::default()
        };

        let html = self
            .templates
            .render_layout("landing.html", &self.context(inputs, meta))
            .map_err(|e| template_error("landing.html", e))?;

        write_output(&self.config.output_path().join("index.html"), &html)
    }

    /// Emit one page per record for collections with a layout. Returns their URLs.
    fn build_collection_pages(&self, inputs: &RenderInputs) -> Result<Vec<String>, BuildError> {
        let targets: Vec<_> = self.collection_outputs(inputs).collect();

        targets
            .par_iter()
            .map(|(spec, record, output_path)| {
                let layout = spec.layout.as_deref().unwrap_or("article.html");
                let url = self.path_to_url(output_path);

                let meta = PageMeta {
                    title: record.title.clone(),
                    url: url.clone(),
                    ..Default::default()
                };
                let mut context = self.context(inputs, meta);
                context.content = Some(record.html.clone());
                context.record = Some(*record);

                let html = self
                    .templates
                    .render_layout(layout, &context)
                    .map_err(|e| template_error(layout, e))?;

                write_output(output_path, &html)?;
                Ok(url)
            })
            .collect()
    }

    /// Copy passthrough sources into the output tree. Missing sources are skipped.
    fn copy_passthrough(&self) -> Result<usize, BuildError> {
        let output_dir = self.config.output_path();
        let mut copied = 0;

        for rule in &self.config.passthrough {
            let from = self.config.root.join(&rule.from);
            if !from.exists() {
                tracing::debug!("Passthrough source {} not found, skipping", from.display());
                continue;
            }

            let to = if rule.to.as_os_str().is_empty() && from.is_file() {
                match from.file_name() {
                    Some(name) => output_dir.join(name),
                    None => output_dir.clone(),
                }
            } else {
                output_dir.join(&rule.to)
            };

            let count = AssetPipeline::copy_tree(&from, &to)
                .map_err(|e| BuildError::WriteError(format!("{}: {}", from.display(), e)))?;
            tracing::debug!("Copied {} files from {}", count, from.display());
            copied += count;
        }

        Ok(copied)
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_path().join("assets");
        fs::create_dir_all(&assets_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Failed to minify site.css: {}", e);
                css
            })
        } else {
            css
        };
        write_output(&assets_dir.join("site.css"), &css)?;

        if let Some(scene_config) = &self.config.scene {
            let scene = Scene::new(scene_config.clone(), Viewport::new(1280, 720))?;
            let json = serde_json::to_string(&scene.export())
                .map_err(|e| BuildError::WriteError(e.to_string()))?;

            write_output(&assets_dir.join("hero-scene.json"), &json)?;
            write_output(
                &assets_dir.join("hero-scene.js"),
                &AssetPipeline::generate_scene_js(),
            )?;
            tracing::debug!("Wrote hero scene with seed {}", scene_config.seed);
        }

        Ok(())
    }

    /// Generate sitemap.
    fn generate_sitemap(&self, urls: &[String]) -> Result<(), BuildError> {
        let origin = self
            .config
            .site_url
            .as_deref()
            .unwrap_or("")
            .trim_end_matches('/');

        let entries: Vec<String> = urls
            .iter()
            .map(|url| format!("  <url>\n    <loc>{}{}</loc>\n  </url>", origin, url))
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            entries.join("\n")
        );

        let output_dir = self.config.output_path();
        write_output(&output_dir.join("sitemap.xml"), &sitemap)?;

        // Also generate robots.txt
        let robots = format!(
            "User-agent: *\nAllow: /\nSitemap: {}{}sitemap.xml",
            origin, self.config.base_url
        );
        write_output(&output_dir.join("robots.txt"), &robots)
    }
}

fn template_error(name: &str, error: minijinja::Error) -> BuildError {
    BuildError::TemplateError {
        name: name.to_string(),
        message: format!("{:#}", error),
    }
}

fn write_output(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
    }
    fs::write(path, contents)
        .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn config(root: &Path) -> BuildConfig {
        BuildConfig {
            root: root.to_path_buf(),
            ..Default::default()
        }
    }

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn builds_simple_site() {
        let temp = tempdir().unwrap();
        write(
            temp.path(),
            "src/index.html",
            "---\ntitle: Home\n---\n<h1>{{ site.title }}</h1>",
        );

        let result = StaticBuilder::new(config(temp.path())).build().await.unwrap();

        assert_eq!(result.pages, 1);
        let html = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
        assert_eq!(html, "<h1>OpenQuality</h1>");
    }

    #[tokio::test]
    async fn renders_markdown_pages_through_layouts() {
        let temp = tempdir().unwrap();
        write(
            temp.path(),
            "src/about.md",
            "---\nlayout: page.html\ndescription: About us\n---\n# About {{ site.title }}\n\nVisit www.openquality.dev\nnow",
        );

        StaticBuilder::new(config(temp.path())).build().await.unwrap();

        let html = fs::read_to_string(temp.path().join("dist/about/index.html")).unwrap();
        assert!(html.contains("<title>About OpenQuality - OpenQuality</title>"));
        assert!(html.contains("<h1>About OpenQuality</h1>"));
        assert!(html.contains(r#"<a href="http://www.openquality.dev">www.openquality.dev</a><br />"#));
        assert!(html.contains(r#"content="About us""#));
    }

    #[tokio::test]
    async fn layouts_from_includes_take_precedence() {
        let temp = tempdir().unwrap();
        write(temp.path(), "src/_includes/plain.html", "[{{ content | safe }}]");
        write(temp.path(), "src/notes.md", "---\nlayout: plain.html\n---\nhi");

        StaticBuilder::new(config(temp.path())).build().await.unwrap();

        let html = fs::read_to_string(temp.path().join("dist/notes/index.html")).unwrap();
        assert_eq!(html, "[<p>hi</p>\n]");
        assert!(!temp.path().join("dist/_includes").exists());
    }

    #[tokio::test]
    async fn permalink_overrides_output_path() {
        let temp = tempdir().unwrap();
        write(temp.path(), "src/missing.html", "---\npermalink: /404.html\n---\nnot found");
        write(temp.path(), "src/guide.html", "---\npermalink: /docs/guide/\n---\nguide");

        StaticBuilder::new(config(temp.path())).build().await.unwrap();

        assert!(temp.path().join("dist/404.html").exists());
        assert!(temp.path().join("dist/docs/guide/index.html").exists());
    }

    #[tokio::test]
    async fn duplicate_outputs_are_rejected() {
        let temp = tempdir().unwrap();
        write(temp.path(), "src/a.html", "---\npermalink: /same/\n---\na");
        write(temp.path(), "src/b.html", "---\npermalink: /same/\n---\nb");

        let result = StaticBuilder::new(config(temp.path())).build().await;

        assert!(matches!(result, Err(BuildError::DuplicateOutput(_))));
    }

    #[tokio::test]
    async fn collection_pages_cannot_overwrite_pages() {
        let temp = tempdir().unwrap();
        write(temp.path(), "content/articles/first.md", "# First Post");
        write(temp.path(), "src/articles/first.html", "hand-written");

        let result = StaticBuilder::new(BuildConfig {
            collections: vec![CollectionSpec {
                name: "articles".to_string(),
                dir: PathBuf::from("content/articles"),
                layout: Some("article.html".to_string()),
            }],
            ..config(temp.path())
        })
        .build()
        .await;

        assert!(matches!(
            result,
            Err(BuildError::DuplicateOutput(path)) if path.ends_with("articles/first/index.html")
        ));
        assert!(!temp.path().join("dist/articles/first/index.html").exists());
    }

    #[tokio::test]
    async fn permalinks_cannot_leave_output_dir() {
        let temp = tempdir().unwrap();
        write(temp.path(), "src/escape.html", "---\npermalink: ../x.html\n---\nout");

        let result = StaticBuilder::new(config(temp.path())).build().await;

        assert!(matches!(
            result,
            Err(BuildError::InvalidPermalink { ref permalink, .. }) if permalink == "../x.html"
        ));
        assert!(!temp.path().join("x.html").exists());
    }

    #[tokio::test]
    async fn empty_input_renders_landing_page() {
        let temp = tempdir().unwrap();

        let result = StaticBuilder::new(config(temp.path())).build().await.unwrap();

        assert_eq!(result.pages, 1);
        let html = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
        assert!(html.contains("data-hero-canvas"));
        assert!(html.contains("Key Features"));
        assert!(temp.path().join("dist/assets/hero-scene.json").exists());
        assert!(temp.path().join("dist/assets/hero-scene.js").exists());
    }

    #[tokio::test]
    async fn collections_feed_templates_and_pages() {
        let temp = tempdir().unwrap();
        write(temp.path(), "content/articles/first.md", "# First Post\n\nBody");
        write(temp.path(), "content/articles/notes.txt", "ignored");
        write(
            temp.path(),
            "src/index.html",
            "{% for a in collections.articles %}{{ a.slug }}:{{ a.title }}{% endfor %}|{{ collections.shorts | length }}",
        );

        let builder = StaticBuilder::new(BuildConfig {
            collections: vec![
                CollectionSpec {
                    name: "articles".to_string(),
                    dir: PathBuf::from("content/articles"),
                    layout: Some("article.html".to_string()),
                },
                CollectionSpec {
                    name: "shorts".to_string(),
                    dir: PathBuf::from("content/short"),
                    layout: None,
                },
            ],
            ..config(temp.path())
        });

        let result = builder.build().await.unwrap();

        assert_eq!(result.records, 1);
        assert_eq!(result.pages, 2);
        assert_eq!(
            fs::read_to_string(temp.path().join("dist/index.html")).unwrap(),
            "first:First Post|0"
        );

        let article = fs::read_to_string(temp.path().join("dist/articles/first/index.html")).unwrap();
        assert!(article.contains("<h1>First Post</h1>"));
        assert!(article.contains("first.md"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unreadable_collection_file_aborts_build() {
        let temp = tempdir().unwrap();
        let articles = temp.path().join("content/articles");
        fs::create_dir_all(&articles).unwrap();
        std::os::unix::fs::symlink(articles.join("missing"), articles.join("bad.md")).unwrap();

        let builder = StaticBuilder::new(BuildConfig {
            collections: vec![CollectionSpec {
                name: "articles".to_string(),
                dir: PathBuf::from("content/articles"),
                layout: None,
            }],
            ..config(temp.path())
        });

        assert!(matches!(
            builder.build().await,
            Err(BuildError::Ingest(IngestError::Read { .. }))
        ));
    }

    #[tokio::test]
    async fn passthrough_copies_verbatim() {
        let temp = tempdir().unwrap();
        write(temp.path(), "src/index.html", "home");
        write(temp.path(), "src/assets/css/styles.css", "body  {  color: red }");
        write(temp.path(), "src/assets/page.html", "not a page");
        write(temp.path(), "public/logo.svg", "<svg/>");
        write(temp.path(), "CNAME", "openquality.dev");

        let builder = StaticBuilder::new(BuildConfig {
            passthrough: vec![
                Passthrough::new("src/assets", "assets"),
                Passthrough::new("public", ""),
                Passthrough::new("CNAME", "CNAME"),
                Passthrough::new("missing", "missing"),
            ],
            ..config(temp.path())
        });

        let result = builder.build().await.unwrap();
        let out = temp.path().join("dist");

        assert_eq!(result.copied, 4);
        assert_eq!(result.pages, 1);
        assert_eq!(
            fs::read_to_string(out.join("assets/css/styles.css")).unwrap(),
            "body  {  color: red }"
        );
        assert_eq!(fs::read_to_string(out.join("assets/page.html")).unwrap(), "not a page");
        assert!(!out.join("assets/page/index.html").exists());
        assert_eq!(fs::read_to_string(out.join("logo.svg")).unwrap(), "<svg/>");
        assert_eq!(fs::read_to_string(out.join("CNAME")).unwrap(), "openquality.dev");
    }

    #[tokio::test]
    async fn generates_sitemap_and_robots() {
        let temp = tempdir().unwrap();
        write(temp.path(), "src/index.html", "home");
        write(temp.path(), "src/features.html", "features");
        write(temp.path(), "src/hidden.html", "---\nsitemap: false\n---\nhidden");

        let builder = StaticBuilder::new(BuildConfig {
            site_url: Some("https://openquality.dev/".to_string()),
            ..config(temp.path())
        });
        builder.build().await.unwrap();

        let sitemap = fs::read_to_string(temp.path().join("dist/sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://openquality.dev/</loc>"));
        assert!(sitemap.contains("<loc>https://openquality.dev/features/</loc>"));
        assert!(!sitemap.contains("hidden"));

        let robots = fs::read_to_string(temp.path().join("dist/robots.txt")).unwrap();
        assert!(robots.ends_with("Sitemap: https://openquality.dev/sitemap.xml"));
    }

    #[tokio::test]
    async fn scene_can_be_disabled() {
        let temp = tempdir().unwrap();

        let builder = StaticBuilder::new(BuildConfig {
            scene: None,
            minify: false,
            ..config(temp.path())
        });
        builder.build().await.unwrap();

        let assets = temp.path().join("dist/assets");
        assert!(!assets.join("hero-scene.json").exists());
        assert!(fs::read_to_string(assets.join("site.css")).unwrap().contains("/* OpenQuality site theme */"));

        let html = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
        assert!(!html.contains("data-hero-canvas"));
    }

    #[tokio::test]
    async fn invalid_frontmatter_names_the_file() {
        let temp = tempdir().unwrap();
        write(temp.path(), "src/broken.md", "---\ntitle: [unclosed\n---\nbody");

        let err = StaticBuilder::new(config(temp.path())).build().await.unwrap_err();

        assert!(matches!(err, BuildError::Frontmatter { .. }));
        assert!(err.to_string().contains("broken.md"));
    }

    #[tokio::test]
    async fn malformed_data_override_aborts_build() {
        let temp = tempdir().unwrap();
        write(temp.path(), "src/_data/site.json", "{");

        let result = StaticBuilder::new(config(temp.path())).build().await;

        assert!(matches!(result, Err(BuildError::Data(_))));
    }

    #[test]
    fn computes_output_paths_and_urls() {
        let builder = StaticBuilder::new(config(Path::new("/p")));
        let fm = PageFrontmatter::default();

        let index = builder.calculate_output_path(Path::new("docs/index.md"), &fm).unwrap();
        assert_eq!(index, PathBuf::from("/p/dist/docs/index.html"));
        assert_eq!(builder.path_to_url(&index), "/docs/");

        let page = builder.calculate_output_path(Path::new("features.html"), &fm).unwrap();
        assert_eq!(page, PathBuf::from("/p/dist/features/index.html"));
        assert_eq!(builder.path_to_url(&page), "/features/");

        assert_eq!(builder.path_to_url(Path::new("/p/dist/index.html")), "/");
        assert_eq!(builder.path_to_url(Path::new("/p/dist/404.html")), "/404.html");
    }
}
