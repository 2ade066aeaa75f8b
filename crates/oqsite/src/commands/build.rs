//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use oqsite_static::{SiteConfig, StaticBuilder};

use crate::project_root;

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building site...");

    let site = SiteConfig::load(config_path)?;
    let mut config = site.to_build_config(&project_root(config_path));

    if let Some(output) = output {
        config.output_dir = output;
    }
    if let Some(minify) = minify {
        config.minify = minify;
    }

    let result = StaticBuilder::new(config)
        .build()
        .await
        .context("Build failed")?;

    tracing::info!(
        "Built {} pages from {} content records, copied {} files in {}ms",
        result.pages,
        result.records,
        result.copied,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
