//! Content collections loaded from directories of Markdown files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::render::{first_heading, MarkdownRenderer};

/// One Markdown file, parsed and rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRecord {
    /// File name without the `.md` extension
    pub slug: String,

    /// First heading in the document, or the slug
    pub title: String,

    /// Unparsed source text
    pub raw: String,

    /// Rendered HTML
    pub html: String,

    /// Path of the source file relative to the loader root
    pub source_path: PathBuf,
}

/// An ordered group of records sourced from one directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContentCollection {
    name: String,
    dir: PathBuf,
    records: Vec<ContentRecord>,
}

impl ContentCollection {
    /// Create an empty collection.
    pub fn empty(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            records: Vec::new(),
        }
    }

    /// Collection name as exposed to templates.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source directory, relative to the loader root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Records in filesystem enumeration order.
    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    /// Look up a record by slug.
    pub fn get(&self, slug: &str) -> Option<&ContentRecord> {
        self.records.iter().find(|r| r.slug == slug)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a ContentCollection {
    type Item = &'a ContentRecord;
    type IntoIter = std::slice::Iter<'a, ContentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Outcome of loading a collection directory.
///
/// A missing directory is not an error by itself; callers decide whether it
/// means "no content" ([`LoadOutcome::into_collection`]) or a failed lookup
/// ([`LoadOutcome::require`]).
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The directory does not exist
    Missing { name: String, dir: PathBuf },

    /// The directory was scanned
    Loaded(ContentCollection),
}

impl LoadOutcome {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }

    /// Treat a missing directory as an empty collection.
    pub fn into_collection(self) -> ContentCollection {
        match self {
            Self::Missing { name, dir } => ContentCollection::empty(name, dir),
            Self::Loaded(collection) => collection,
        }
    }

    /// Treat a missing directory as an error.
    pub fn require(self) -> Result<ContentCollection, IngestError> {
        match self {
            Self::Missing { dir, .. } => Err(IngestError::MissingDirectory(dir)),
            Self::Loaded(collection) => Ok(collection),
        }
    }
}

/// Errors that can occur while loading content.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Content directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("Content path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to list {path}: {message}")]
    List { path: PathBuf, message: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Loads collections from directories under a root.
#[derive(Debug, Clone)]
pub struct ContentLoader {
    root: PathBuf,
    renderer: MarkdownRenderer,
}

impl ContentLoader {
    /// Create a loader resolving collection directories against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            renderer: MarkdownRenderer::new(),
        }
    }

    /// Load every `*.md` file directly inside `dir` (relative to the root).
    pub fn load(&self, name: &str, dir: &Path) -> Result<LoadOutcome, IngestError> {
        let absolute = self.root.join(dir);

        if !absolute.exists() {
            tracing::debug!("Content directory {} not found", absolute.display());
            return Ok(LoadOutcome::Missing {
                name: name.to_string(),
                dir: dir.to_path_buf(),
            });
        }

        if !absolute.is_dir() {
            return Err(IngestError::NotADirectory(absolute));
        }

        let mut records = Vec::new();

        for entry in WalkDir::new(&absolute).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| IngestError::List {
                path: absolute.clone(),
                message: e.to_string(),
            })?;
            let path = entry.path();

            if path.is_dir() || path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }

            let Some(slug) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };

            let bytes = fs::read(path).map_err(|source| IngestError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let raw = String::from_utf8_lossy(&bytes).into_owned();

            let html = self.renderer.render(&raw);
            let title = first_heading(&raw).unwrap_or_else(|| slug.clone());

            records.push(ContentRecord {
                source_path: dir.join(entry.file_name()),
                slug,
                title,
                raw,
                html,
            });
        }

        tracing::debug!("Loaded {} records into '{}'", records.len(), name);

        Ok(LoadOutcome::Loaded(ContentCollection {
            name: name.to_string(),
            dir: dir.to_path_buf(),
            records,
        }))
    }
}

/// Load a collection from `dir`, resolved against the working directory.
pub fn load_collection(name: &str, dir: &Path) -> Result<LoadOutcome, IngestError> {
    ContentLoader::new(".").load(name, dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn write_files(dir: &Path, files: &[(&str, &str)]) {
        fs::create_dir_all(dir).unwrap();
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    #[test]
    fn loads_only_markdown_files() {
        let temp = tempdir().unwrap();
        write_files(
            &temp.path().join("content/articles"),
            &[
                ("launch.md", "# Launch day\n\nWe shipped."),
                ("roadmap.md", "Next up"),
                ("release.notes.md", "dots"),
                ("cover.png", "not markdown"),
                ("draft.markdown", "other extension"),
                ("README", "no extension"),
            ],
        );
        fs::create_dir_all(temp.path().join("content/articles/nested.md")).unwrap();

        let loader = ContentLoader::new(temp.path());
        let collection = loader
            .load("articles", Path::new("content/articles"))
            .unwrap()
            .require()
            .unwrap();

        assert_eq!(collection.len(), 3);

        let slugs: HashSet<_> = collection.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, HashSet::from(["launch", "roadmap", "release.notes"]));

        let launch = collection.get("launch").unwrap();
        assert_eq!(launch.title, "Launch day");
        assert_eq!(launch.raw, "# Launch day\n\nWe shipped.");
        assert!(launch.html.contains("<h1>Launch day</h1>"));
        assert_eq!(launch.source_path, Path::new("content/articles/launch.md"));

        assert_eq!(collection.get("roadmap").unwrap().title, "roadmap");
    }

    #[test]
    fn missing_directory_is_not_an_error() {
        let temp = tempdir().unwrap();
        let loader = ContentLoader::new(temp.path());

        let outcome = loader.load("shorts", Path::new("content/short")).unwrap();
        assert!(outcome.is_missing());

        let collection = outcome.clone().into_collection();
        assert!(collection.is_empty());
        assert_eq!(collection.name(), "shorts");

        assert!(matches!(
            outcome.require(),
            Err(IngestError::MissingDirectory(_))
        ));
    }

    #[test]
    fn empty_directory_loads_empty_collection() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("short")).unwrap();

        let outcome = ContentLoader::new(temp.path())
            .load("shorts", Path::new("short"))
            .unwrap();

        assert!(!outcome.is_missing());
        assert!(outcome.into_collection().is_empty());
    }

    #[test]
    fn file_in_place_of_directory_is_an_error() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("content"), "oops").unwrap();

        let result = ContentLoader::new(temp.path()).load("articles", Path::new("content"));

        assert!(matches!(result, Err(IngestError::NotADirectory(_))));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_fatal() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("articles");
        fs::create_dir_all(&dir).unwrap();
        std::os::unix::fs::symlink(dir.join("gone.txt"), dir.join("dangling.md")).unwrap();

        let result = ContentLoader::new(temp.path()).load("articles", Path::new("articles"));

        assert!(matches!(result, Err(IngestError::Read { .. })));
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("articles");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("cafe.md"), b"Caf\xe9 notes").unwrap();

        let collection = ContentLoader::new(temp.path())
            .load("articles", Path::new("articles"))
            .unwrap()
            .require()
            .unwrap();

        let record = collection.get("cafe").unwrap();
        assert_eq!(record.raw, "Caf\u{fffd} notes");
        assert!(record.html.contains("notes"));
    }

    #[test]
    fn renders_with_soft_breaks() {
        let temp = tempdir().unwrap();
        write_files(&temp.path().join("short"), &[("hello.md", "Hello\nWorld")]);

        let collection = ContentLoader::new(temp.path())
            .load("shorts", Path::new("short"))
            .unwrap()
            .into_collection();

        assert!(collection.get("hello").unwrap().html.contains("<br />"));
    }
}
