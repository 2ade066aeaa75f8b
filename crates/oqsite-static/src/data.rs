//! Site copy supplied to every template.
//!
//! The built-in values are the OpenQuality marketing copy. A site can replace
//! either group by dropping `site.{json,yaml,yml}` or
//! `highlights.{json,yaml,yml}` into its data directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A primary navigation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub url: String,
    /// Opens off-site
    #[serde(default)]
    pub external: bool,
}

/// A footer link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterLink {
    pub label: String,
    pub url: String,
}

/// Site identity and navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub nav: Vec<NavLink>,
    #[serde(default)]
    pub footer_links: Vec<FooterLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemStatement {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemStatements {
    pub problem: ProblemStatement,
    pub solution: ProblemStatement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub icon: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCase {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audience {
    pub title: String,
    pub description: String,
    pub benefit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechItem {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsSection {
    pub title: String,
    pub body: String,
}

/// Marketing copy for the landing and feature pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlights {
    pub problem_statements: ProblemStatements,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub use_cases: Vec<UseCase>,
    #[serde(default)]
    pub audiences: Vec<Audience>,
    #[serde(default)]
    pub tech_stack: Vec<TechItem>,
    /// Shell lines shown in the quick-start block; blank lines separate steps
    #[serde(default)]
    pub quick_start: Vec<String>,
    #[serde(default)]
    pub docs_sections: Vec<DocsSection>,
}

/// All fixture data, built once per build and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteData {
    pub site: SiteInfo,
    pub highlights: Highlights,
}

/// Errors raised while loading data overrides.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Failed to read data file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse data file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

const DATA_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

impl SiteData {
    /// Built-in data with any overrides found in `data_dir` applied.
    pub fn load(data_dir: &Path) -> Result<Self, DataError> {
        let mut data = Self::builtin();

        if let Some(site) = load_override::<SiteInfo>(data_dir, "site")? {
            data.site = site;
        }
        if let Some(highlights) = load_override::<Highlights>(data_dir, "highlights")? {
            data.highlights = highlights;
        }

        Ok(data)
    }

    /// The OpenQuality site copy.
    pub fn builtin() -> Self {
        Self {
            site: builtin_site(),
            highlights: builtin_highlights(),
        }
    }
}

/// Load `<dir>/<stem>.<ext>` for the first extension that exists.
fn load_override<T: DeserializeOwned>(dir: &Path, stem: &str) -> Result<Option<T>, DataError> {
    for ext in DATA_EXTENSIONS {
        let path = dir.join(format!("{stem}.{ext}"));
        if !path.is_file() {
            continue;
        }

        let content = fs::read_to_string(&path).map_err(|e| DataError::Read {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let parsed = if ext == "json" {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };

        let value = parsed.map_err(|message| DataError::Parse {
            path: path.clone(),
            message,
        })?;

        tracing::info!("Loaded {} data from {}", stem, path.display());
        return Ok(Some(value));
    }

    Ok(None)
}

fn nav(label: &str, url: &str, external: bool) -> NavLink {
    NavLink {
        label: label.to_string(),
        url: url.to_string(),
        external,
    }
}

fn footer(label: &str, url: &str) -> FooterLink {
    FooterLink {
        label: label.to_string(),
        url: url.to_string(),
    }
}

fn builtin_site() -> SiteInfo {
    SiteInfo {
        title: "OpenQuality".to_string(),
        description: "Open-source test management platform focused on clarity, traceability, and actionable quality insights.".to_string(),
        nav: vec![
            nav("Home", "/", false),
            nav("Features", "/features/", false),
            nav("Use Cases", "/use-cases/", false),
            nav("Docs", "/docs/", false),
            nav("Get Started", "/get-started/", false),
            nav("GitHub", "https://github.com/open-quality", true),
        ],
        footer_links: vec![
            footer("GitHub", "https://github.com/open-quality"),
            footer("Documentation", "/docs/"),
            footer("Features", "/features/"),
            footer("Use Cases", "/use-cases/"),
        ],
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn feature(icon: &str, title: &str, description: &str) -> Feature {
    Feature {
        icon: icon.to_string(),
        title: title.to_string(),
        description: description.to_string(),
    }
}

fn use_case(title: &str, description: &str) -> UseCase {
    UseCase {
        title: title.to_string(),
        description: description.to_string(),
    }
}

fn audience(title: &str, description: &str, benefit: &str) -> Audience {
    Audience {
        title: title.to_string(),
        description: description.to_string(),
        benefit: benefit.to_string(),
    }
}

fn tech(label: &str, value: &str) -> TechItem {
    TechItem {
        label: label.to_string(),
        value: value.to_string(),
    }
}

fn docs(title: &str, body: &str) -> DocsSection {
    DocsSection {
        title: title.to_string(),
        body: body.to_string(),
    }
}

fn builtin_highlights() -> Highlights {
    Highlights {
        problem_statements: ProblemStatements {
            problem: ProblemStatement {
                title: "The Problem".to_string(),
                summary: "Modern software teams face scattered, unstructured, and invisible test data.".to_string(),
                bullets: strings(&[
                    "Test evidence lives in CI logs, chats, and spreadsheets",
                    "No historical view of pass rates or quality trends",
                    "Pricey enterprise tools charge $50-200 per user each month",
                    "Complex, inflexible workflows slow down engineering teams",
                ]),
            },
            solution: ProblemStatement {
                title: "The Solution".to_string(),
                summary: "OpenQuality centralizes execution data in a lightweight, self-hosted platform.".to_string(),
                bullets: strings(&[
                    "Complete visibility across every environment",
                    "Actionable insights backed by clean historical data",
                    "Zero licensing costs with permissive open source licensing",
                    "Fast deployments so you can own the stack in minutes",
                ]),
            },
        },
        features: vec![
            feature("🌌", "Environment-aware visibility", "Correlate builds, environments, and releases so every test has context."),
            feature("📈", "Quality insights", "Capture pass rates, flakiness, and regression fingerprints without extra work."),
            feature("🔗", "Universal integration", "REST API accepts payloads from GitHub Actions, Jenkins, GitLab, or any CLI."),
            feature("🚀", "Deploy in minutes", "Single binary plus PostgreSQL means no heavyweight infrastructure."),
            feature("💰", "Zero licensing costs", "Unlimited users and tests—perfect for startups and community teams."),
            feature("🔒", "Own your data", "Self-hosted by default, so compliance and audits stay in your control."),
        ],
        use_cases: vec![
            use_case("CI/CD integration", "Post execution payloads from any pipeline to keep a unified quality log."),
            use_case("Multi-environment testing", "Track identical suites across dev, staging, and prod to spot drifts early."),
            use_case("Regression analysis", "Identify brittle tests and surface failure trends that block releases."),
            use_case("Release confidence", "Check health snapshots before promoting artifacts downstream."),
            use_case("Compliance & audits", "Maintain immutable execution history for regulated industries."),
            use_case("Team collaboration", "Share curated dashboards with QA, platform, and product teams."),
        ],
        audiences: vec![
            audience("Product & Platform Teams", "Teams scaling testing beyond spreadsheets.", "Bring enterprise capability without vendor lock-in."),
            audience("DevOps & Infra", "Engineer quality checkpoints into delivery pipelines.", "APIs and CLI keep automation lightweight."),
            audience("Regulated Orgs", "Finance, healthcare, and aerospace teams with audit trails.", "Self-hosted with full control over retention."),
            audience("Open Source Projects", "Communities who need transparent quality signals.", "Zero cost and friendly contribution model."),
        ],
        tech_stack: vec![
            tech("Backend", "Golang + Echo framework"),
            tech("Frontend", "Vue 3 + Quasar framework"),
            tech("Database", "PostgreSQL powered by Bun ORM"),
            tech("CLI Tools", "Cobra with go-pretty rendering"),
        ],
        quick_start: strings(&[
            "# 1. Install dependencies",
            "make init",
            "",
            "# 2. Build BackOffice tool",
            "make build-bo",
            "",
            "# 3. Setup database",
            "make setup",
            "make migrate-example",
            "",
            "# 4. Run backend",
            "make run",
            "",
            "# 5. Run frontend (separate terminal)",
            "make dev-ui",
            "",
            "# Access at http://localhost:9000",
        ]),
        docs_sections: vec![
            docs("Architecture Overview", "Understand the service boundaries (core API, CLI, UI) and how deployments plug into your platform teams."),
            docs("API Reference", "Use the REST endpoints to push test results, environments, and execution metadata from any CI pipeline."),
            docs("Data Model & Storage", "Capture builds, suites, and runs with PostgreSQL schemas you can extend via migrations."),
            docs("Deployment Playbooks", "Choose between Docker Compose, Helm charts, or bare-metal scripts depending on your infra."),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_tables_are_complete() {
        let data = SiteData::builtin();

        assert_eq!(data.site.title, "OpenQuality");
        assert_eq!(data.site.nav.len(), 6);
        assert!(data.site.nav.iter().filter(|n| n.external).count() == 1);
        assert_eq!(data.site.footer_links.len(), 4);
        assert_eq!(data.highlights.features.len(), 6);
        assert_eq!(data.highlights.use_cases.len(), 6);
        assert_eq!(data.highlights.audiences.len(), 4);
        assert_eq!(data.highlights.tech_stack.len(), 4);
        assert_eq!(data.highlights.docs_sections.len(), 4);
        assert_eq!(data.highlights.problem_statements.problem.bullets.len(), 4);
    }

    #[test]
    fn quick_start_keeps_blank_separators() {
        let lines = SiteData::builtin().highlights.quick_start;

        assert_eq!(&lines[..3], ["# 1. Install dependencies", "make init", ""]);
        assert_eq!(lines.last().map(String::as_str), Some("# Access at http://localhost:9000"));
    }

    #[test]
    fn feature_copy_is_verbatim() {
        let data = SiteData::builtin();
        let licensing = data
            .highlights
            .features
            .iter()
            .find(|f| f.title == "Zero licensing costs")
            .unwrap();

        assert_eq!(
            licensing.description,
            "Unlimited users and tests\u{2014}perfect for startups and community teams."
        );
    }

    #[test]
    fn missing_data_dir_uses_builtin() {
        let temp = tempdir().unwrap();

        let data = SiteData::load(&temp.path().join("_data")).unwrap();

        assert_eq!(data, SiteData::builtin());
    }

    #[test]
    fn json_override_replaces_site() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("site.json"),
            r#"{"title": "QA Hub", "description": "Testing", "nav": [{"label": "Home", "url": "/"}]}"#,
        )
        .unwrap();

        let data = SiteData::load(temp.path()).unwrap();

        assert_eq!(data.site.title, "QA Hub");
        assert_eq!(data.site.nav.len(), 1);
        assert!(!data.site.nav[0].external);
        assert!(data.site.footer_links.is_empty());
        assert_eq!(data.highlights, SiteData::builtin().highlights);
    }

    #[test]
    fn yaml_override_replaces_highlights() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("highlights.yaml"),
            r#"
problem_statements:
  problem: { title: P, summary: S }
  solution: { title: Q, summary: T, bullets: [one] }
features:
  - { icon: "*", title: Fast, description: Very }
"#,
        )
        .unwrap();

        let data = SiteData::load(temp.path()).unwrap();

        assert_eq!(data.highlights.features.len(), 1);
        assert_eq!(data.highlights.problem_statements.solution.bullets, vec!["one"]);
        assert!(data.highlights.quick_start.is_empty());
    }

    #[test]
    fn malformed_override_is_an_error() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("site.json"), "{ not json").unwrap();

        assert!(matches!(
            SiteData::load(temp.path()),
            Err(DataError::Parse { .. })
        ));
    }
}
