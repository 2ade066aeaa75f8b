//! Template engine for rendering site pages.

use std::collections::BTreeMap;
use std::path::Path;

use minijinja::{path_loader, Environment};
use serde::Serialize;

use oqsite_content::ContentRecord;

use crate::data::{Highlights, SiteInfo};

/// Per-page values exposed as `page`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageMeta {
    /// Page title
    pub title: String,
    /// Meta description
    pub description: String,
    /// URL path of the rendered page
    pub url: String,
    /// Extra frontmatter keys
    pub data: BTreeMap<String, serde_yaml::Value>,
}

/// Context for rendering a page template.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext<'a> {
    /// Site identity and navigation
    pub site: &'a SiteInfo,
    /// Marketing copy
    pub highlights: &'a Highlights,
    /// Content records by collection name
    pub collections: &'a BTreeMap<String, Vec<ContentRecord>>,
    /// Current page
    pub page: PageMeta,
    /// Base URL
    pub base_url: &'a str,
    /// Whether the hero scene assets are emitted
    pub scene_enabled: bool,
    /// Rendered body, set when rendering a layout
    pub content: Option<String>,
    /// The record a collection page is rendered for
    pub record: Option<&'a ContentRecord>,
}

/// Template engine using minijinja.
///
/// Layouts and partials are looked up in the includes directory first and
/// fall back to the built-in set.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create an engine that only knows the built-in layouts.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_loader(|name| Ok(builtin_template(name).map(str::to_string)));
        Self { env }
    }

    /// Create an engine that loads layouts from `includes_dir` before the built-ins.
    pub fn with_includes(includes_dir: &Path) -> Self {
        let disk = path_loader(includes_dir);

        let mut env = Environment::new();
        env.set_loader(move |name| {
            if let Some(source) = disk(name)? {
                return Ok(Some(source));
            }
            Ok(builtin_template(name).map(str::to_string))
        });

        Self { env }
    }

    /// Render a named layout.
    pub fn render_layout(
        &self,
        layout: &str,
        context: &PageContext<'_>,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template(layout)?.render(context)
    }

    /// Render a page's own template source. `name` selects auto-escaping and
    /// appears in error messages.
    pub fn render_source(
        &self,
        name: &str,
        source: &str,
        context: &PageContext<'_>,
    ) -> Result<String, minijinja::Error> {
        self.env.render_named_str(name, source, context)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_template(name: &str) -> Option<&'static str> {
    match name {
        "base.html" => Some(BASE_TEMPLATE),
        "page.html" => Some(PAGE_TEMPLATE),
        "article.html" => Some(ARTICLE_TEMPLATE),
        "landing.html" => Some(LANDING_TEMPLATE),
        "nav.html" => Some(NAV_TEMPLATE),
        _ => None,
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% if page.title and page.title != site.title %}{{ page.title }} - {% endif %}{{ site.title }}</title>
  <meta name="description" content="{{ page.description or site.description }}">
  <link rel="icon" href="{{ base_url }}logo.svg">
  <link rel="stylesheet" href="{{ base_url }}assets/site.css">
</head>
<body>
  {% include "nav.html" %}
  <main>
    {% block content %}{% endblock %}
  </main>
  <footer class="footer">
    <div class="container">
      <div class="footer-content">
        <div class="footer-logo">
          <img src="{{ base_url }}logo.svg" alt="{{ site.title }}">
          <span>{{ site.title }}</span>
        </div>
        <div class="footer-links">
        {% for link in site.footer_links %}
          <a href="{{ link.url }}">{{ link.label }}</a>
        {% endfor %}
        </div>
      </div>
      <div class="footer-bottom">
        <p>MIT License | {{ site.description }}</p>
      </div>
    </div>
  </footer>
  {% if scene_enabled %}<script src="{{ base_url }}assets/hero-scene.js" defer></script>{% endif %}
</body>
</html>"##;

const NAV_TEMPLATE: &str = r##"<nav class="nav">
  <div class="container">
    <div class="nav-content">
      <a href="{{ base_url }}" class="logo">
        <img src="{{ base_url }}logo.svg" alt="{{ site.title }}">
        <span>{{ site.title }}</span>
      </a>
      <div class="nav-links">
      {% for item in site.nav %}
        <a href="{{ item.url }}"{% if item.url == page.url %} class="active"{% endif %}{% if item.external %} target="_blank" rel="noopener noreferrer"{% endif %}>{{ item.label }}</a>
      {% endfor %}
      </div>
    </div>
  </div>
</nav>"##;

const PAGE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="section">
  <div class="container">
    {% if page.title %}<h1 class="section-title">{{ page.title }}</h1>{% endif %}
    <div class="content">
      {{ content | safe }}
    </div>
  </div>
</section>
{% endblock %}"##;

const ARTICLE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="section article">
  <div class="container">
    <div class="content">
      {{ content | safe }}
    </div>
    {% if record %}<p class="article-source">Source: {{ record.source_path }}</p>{% endif %}
  </div>
</article>
{% endblock %}"##;

const LANDING_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="hero">
  {% if scene_enabled %}<div class="hero-3d" data-hero-canvas data-scene-src="{{ base_url }}assets/hero-scene.json"></div>{% endif %}
  <div class="container">
    <div class="hero-content">
      <h1>Open Source Test Management</h1>
      <p class="hero-subtitle">{{ site.description }}</p>
      <div class="hero-buttons">
        <a href="#get-started" class="btn btn-primary">Get Started</a>
        {% for item in site.nav if item.external %}<a href="{{ item.url }}" class="btn btn-secondary">View on {{ item.label }}</a>{% endfor %}
      </div>
    </div>
  </div>
</section>

<section class="section">
  <div class="container">
    <div class="grid-2">
    {% for statement in [highlights.problem_statements.problem, highlights.problem_statements.solution] %}
      <div>
        <h2>{{ statement.title }}</h2>
        <p class="text-large">{{ statement.summary }}</p>
        <ul class="feature-list">
        {% for bullet in statement.bullets %}
          <li>{{ bullet }}</li>
        {% endfor %}
        </ul>
      </div>
    {% endfor %}
    </div>
  </div>
</section>

<section id="features" class="section section-dark">
  <div class="container">
    <h2 class="section-title">Key Features</h2>
    <div class="grid-3">
    {% for feature in highlights.features %}
      <div class="feature-card" style="--delay: {{ loop.index0 }}">
        <div class="feature-icon">{{ feature.icon }}</div>
        <h3>{{ feature.title }}</h3>
        <p>{{ feature.description }}</p>
      </div>
    {% endfor %}
    </div>
  </div>
</section>

<section id="use-cases" class="section">
  <div class="container">
    <h2 class="section-title">Use Cases</h2>
    <div class="grid-2">
    {% for use_case in highlights.use_cases %}
      <div class="use-case-card" style="--delay: {{ loop.index0 }}">
        <h3>{{ use_case.title }}</h3>
        <p>{{ use_case.description }}</p>
      </div>
    {% endfor %}
    </div>
  </div>
</section>

<section class="section section-dark">
  <div class="container">
    <h2 class="section-title">Built For</h2>
    <div class="grid-2">
    {% for audience in highlights.audiences %}
      <div class="audience-card" style="--delay: {{ loop.index0 }}">
        <h3>{{ audience.title }}</h3>
        <p>{{ audience.description }}</p>
        <div class="benefit">{{ audience.benefit }}</div>
      </div>
    {% endfor %}
    </div>
  </div>
</section>

<section class="section">
  <div class="container">
    <h2 class="section-title">Tech Stack</h2>
    <div class="tech-stack">
    {% for item in highlights.tech_stack %}
      <div class="tech-item"><strong>{{ item.label }}:</strong> {{ item.value }}</div>
    {% endfor %}
    </div>
  </div>
</section>

{% if collections.articles %}
<section id="articles" class="section section-dark">
  <div class="container">
    <h2 class="section-title">Articles</h2>
    <div class="grid-2">
    {% for article in collections.articles %}
      <div class="article-card">
        <h3>{{ article.title }}</h3>
        <div class="content">{{ article.html | safe }}</div>
      </div>
    {% endfor %}
    </div>
  </div>
</section>
{% endif %}

<section id="get-started" class="section section-dark">
  <div class="container">
    <h2 class="section-title">Quick Start</h2>
    <div class="code-block">
      <pre><code>{{ highlights.quick_start | join("\n") }}</code></pre>
    </div>
    <div class="cta-buttons">
      {% for item in site.nav if item.external %}<a href="{{ item.url }}" class="btn btn-primary">View on {{ item.label }}</a>{% endfor %}
      <a href="{{ base_url }}docs/" class="btn btn-secondary">Read Documentation</a>
    </div>
  </div>
</section>

<section id="docs" class="section">
  <div class="container">
    <h2 class="section-title">Documentation</h2>
    <div class="grid-2">
    {% for section in highlights.docs_sections %}
      <div class="docs-card">
        <h3>{{ section.title }}</h3>
        <p>{{ section.body }}</p>
      </div>
    {% endfor %}
    </div>
  </div>
</section>
{% endblock %}"##;
