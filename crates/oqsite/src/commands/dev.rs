//! Development server command.

use std::path::Path;

use anyhow::Result;
use oqsite_server::{DevServer, DevServerConfig};
use oqsite_static::SiteConfig;

use crate::project_root;

/// Run the dev server.
pub async fn run(config_path: &Path, port: u16, open: bool) -> Result<()> {
    tracing::info!("Starting development server on port {}", port);

    let site = SiteConfig::load(config_path)?;
    let root = project_root(config_path);

    let config = DevServerConfig {
        build: site.to_build_config(&root),
        watch_paths: site.watch_paths(&root),
        port,
        open,
        ..Default::default()
    };

    DevServer::new(config).start().await?;

    Ok(())
}
