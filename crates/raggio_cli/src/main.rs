//! Raggio command-line renderer.
//!
//! Builds one of the demo scenes, renders it and writes a PNG.

mod scenes;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use raggio_renderer::{render, render_progressive, Camera, RenderConfig};
use scenes::SceneKind;

#[derive(Parser, Debug)]
#[command(name = "raggio", version, about = "Monte-Carlo path tracer")]
struct Cli {
    /// Demo scene to render
    #[arg(long, value_enum, default_value_t = SceneKind::Cornell)]
    scene: SceneKind,

    /// JSON file with render settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// Samples per pixel, per pass
    #[arg(long)]
    spp: Option<u32>,

    /// Maximum bounce depth
    #[arg(long)]
    depth: Option<u32>,

    /// Worker threads (and row bands)
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Accumulation passes
    #[arg(long)]
    passes: Option<u32>,

    /// Rewrite the output image after every pass
    #[arg(long)]
    preview: bool,

    /// Image for the textured scene's globe
    #[arg(long)]
    texture: Option<PathBuf>,

    #[arg(long, short, default_value = "output.png")]
    output: PathBuf,
}

impl Cli {
    /// Settings from the config file (or defaults) with flag overrides.
    fn render_config(&self) -> Result<RenderConfig> {
        let mut config: RenderConfig = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => RenderConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(spp) = self.spp {
            config.samples_per_pixel = spp;
        }
        if let Some(depth) = self.depth {
            config.max_depth = depth;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(passes) = self.passes {
            config.passes = passes;
        }

        anyhow::ensure!(
            config.width > 0 && config.height > 0,
            "image size must be non-zero, got {}x{}",
            config.width,
            config.height
        );
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.render_config()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let demo = scenes::build(cli.scene, &mut rng, cli.texture.as_deref())?;
    let camera = Camera::new(&demo.camera.with_aspect_ratio(config.aspect_ratio()));

    let frame = if cli.preview {
        render_progressive(&camera, &demo.scene, &config, |frame| {
            if let Err(err) = frame.save_png(&cli.output) {
                log::warn!("Preview write failed: {err}");
            }
            true
        })?
    } else {
        render(&camera, &demo.scene, &config)?
    };

    frame
        .save_png(&cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    Ok(())
}
