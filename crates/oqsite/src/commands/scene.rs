//! Hero scene sampling command.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use oqsite_scene::{AnimationLoop, FrameSample, Scene, Viewport};
use oqsite_static::SiteConfig;

/// Frame interval for `--run`, roughly 60fps.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub struct SceneArgs {
    pub elapsed: Vec<f32>,
    pub seed: Option<u64>,
    pub width: u32,
    pub height: u32,
    pub export: bool,
    pub run: Option<f32>,
}

/// Run the scene command. Output is one JSON document per line on stdout.
pub async fn run(config_path: &Path, args: SceneArgs) -> Result<()> {
    let site = SiteConfig::load(config_path)?;

    let mut config = site.scene.config;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let scene = Scene::new(config, Viewport::new(args.width, args.height))
        .context("Failed to create scene")?;

    if args.export {
        let mut out = io::stdout().lock();
        serde_json::to_writer(&mut out, &scene.export())?;
        writeln!(out)?;
        return Ok(());
    }

    if let Some(seconds) = args.run {
        let duration = Duration::try_from_secs_f32(seconds).context("Invalid --run duration")?;

        let animation = AnimationLoop::start(Arc::new(scene), FRAME_INTERVAL, |frame: &FrameSample| {
            match serde_json::to_string(frame) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!("Failed to encode frame: {}", e),
            }
        })?;

        tokio::time::sleep(duration).await;
        let frames = animation.stop().await?;
        tracing::info!("Presented {} frames in {:.1}s", frames, seconds);
        return Ok(());
    }

    let samples = if args.elapsed.is_empty() {
        vec![0.0]
    } else {
        args.elapsed
    };

    let mut out = io::stdout().lock();
    for elapsed in samples {
        serde_json::to_writer(&mut out, &scene.frame_at(elapsed))?;
        writeln!(out)?;
    }

    Ok(())
}
