//! Headless renderer: draws frames of the configured scene to PNG files

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use trapeze::rasterizer::{Image, Swapchain, Window};
use trapeze::world::{load_config, RenderConfig, Scene};

#[derive(Parser, Debug)]
#[command(name = "trapeze-snapshot", version)]
struct Args {
    /// Render configuration (RON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// OBJ mesh to draw instead of the configured one.
    #[arg(long)]
    mesh: Option<PathBuf>,

    /// Output PNG path. With more than one frame, the frame index is
    /// appended to the file stem.
    #[arg(long, default_value = "snapshot.png")]
    out: PathBuf,

    /// Number of frames to render.
    #[arg(long, default_value_t = 1)]
    frames: u64,

    /// Frames per second of simulated time.
    #[arg(long, default_value_t = 30.0)]
    fps: f32,

    /// Rasterize rows on this many worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

/// Collects nothing; frames are read back from the swapchain front buffer
struct Headless {
    presented: u64,
}

impl Window for Headless {
    fn present(&mut self, _image: &Image) {
        self.presented += 1;
    }
}

fn frame_path(out: &Path, frame: u64, total: u64) -> PathBuf {
    if total <= 1 {
        return out.to_path_buf();
    }
    let stem = out.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
    let ext = out.extension().and_then(|s| s.to_str()).unwrap_or("png");
    out.with_file_name(format!("{stem}_{frame:04}.{ext}"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("load config '{}'", path.display()))?,
        None => RenderConfig::default(),
    };
    if args.threads.is_some() {
        config.raster.threads = args.threads;
    }
    anyhow::ensure!(args.fps > 0.0, "--fps must be positive");

    let mut scene = Scene::from_config(&config, args.mesh.as_deref()).context("set up scene")?;
    let mut swapchain: Swapchain<Scene> = Swapchain::new(config.prop(), config.swapchain_buffers)?;
    swapchain.push_write_command(|image, scene: &mut Scene| scene.clear(image));
    swapchain.push_write_command(|image, scene: &mut Scene| {
        scene.draw(image);
    });

    let mut window = Headless { presented: 0 };
    let delta = 1.0 / args.fps;
    for frame in 0..args.frames {
        if frame > 0 {
            scene.advance(delta);
        }
        swapchain.acquire_and_write(&mut scene);
        swapchain.present(&mut window)?;

        let path = frame_path(&args.out, frame, args.frames);
        swapchain
            .front()
            .save_png(&path)
            .with_context(|| format!("write '{}'", path.display()))?;

        let stats = scene.last_stats;
        tracing::info!(
            frame,
            path = %path.display(),
            triangles = stats.triangles,
            culled = stats.culled,
            pixels = stats.pixels,
            "frame written"
        );
    }

    tracing::info!(frames = window.presented, "done");
    Ok(())
}
