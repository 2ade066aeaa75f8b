//! oqsite CLI - builds and serves the OpenQuality site.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "oqsite")]
#[command(about = "Static site builder for the OpenQuality marketing site")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to site.toml config file
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Preview the built site
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve
        #[arg(short, long, default_value = "dist")]
        dir: PathBuf,
    },

    /// Build, serve, and rebuild on change with live reload
    Dev {
        /// Port to listen on
        #[arg(short, long, default_value = "7777")]
        port: u16,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Sample the hero scene as JSON
    Scene {
        /// Elapsed seconds to sample; repeatable
        #[arg(short = 't', long = "elapsed")]
        elapsed: Vec<f32>,

        /// Override the configured starfield seed
        #[arg(long)]
        seed: Option<u64>,

        /// Viewport width in CSS pixels
        #[arg(long, default_value = "1280")]
        width: u32,

        /// Viewport height in CSS pixels
        #[arg(long, default_value = "720")]
        height: u32,

        /// Print the full scene export instead of frame samples
        #[arg(long, conflicts_with_all = ["elapsed", "run"])]
        export: bool,

        /// Run the animation loop for this many seconds, printing every frame
        #[arg(long, value_name = "SECONDS")]
        run: Option<f32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // stdout is reserved for `scene` output
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build { output, no_minify } => {
            let minify = if no_minify { Some(false) } else { None };
            commands::build::run(&cli.config, output, minify).await?;
        }
        Commands::Serve { port, dir } => {
            commands::serve::run(port, dir).await?;
        }
        Commands::Dev { port, no_open } => {
            commands::dev::run(&cli.config, port, !no_open).await?;
        }
        Commands::Scene {
            elapsed,
            seed,
            width,
            height,
            export,
            run,
        } => {
            let args = commands::scene::SceneArgs {
                elapsed,
                seed,
                width,
                height,
                export,
                run,
            };
            commands::scene::run(&cli.config, args).await?;
        }
    }

    Ok(())
}

/// Directory relative paths in the config file are resolved against.
pub(crate) fn project_root(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_elapsed() {
        let cli = Cli::parse_from(["oqsite", "scene", "-t", "0", "--elapsed", "2.5", "--seed", "7"]);

        match cli.command {
            Commands::Scene { elapsed, seed, .. } => {
                assert_eq!(elapsed, vec![0.0, 2.5]);
                assert_eq!(seed, Some(7));
            }
            _ => panic!("expected scene command"),
        }
    }

    #[test]
    fn export_conflicts_with_samples() {
        assert!(Cli::try_parse_from(["oqsite", "scene", "--export", "-t", "1"]).is_err());
    }

    #[test]
    fn project_root_defaults_to_cwd() {
        assert_eq!(project_root(Path::new("site.toml")), PathBuf::from("."));
        assert_eq!(project_root(Path::new("web/site.toml")), PathBuf::from("web"));
    }
}
