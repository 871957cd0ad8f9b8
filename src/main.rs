//! Trapeze viewer: software-rasterized mesh in a macroquad window
//!
//! Controls:
//! - WASD / QE: move, right mouse drag: look
//! - C: cycle cull mode, P: toggle parallel rows
//! - Tab: toggle half-resolution rendering

use std::path::PathBuf;

use clap::Parser;
use macroquad::prelude as mq;
use trapeze::rasterizer::{CullMode, Image, ImageProp, RasterSettings, Swapchain, Window};
use trapeze::world::{load_config, RenderConfig, Scene};

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "trapeze", version)]
struct Args {
    /// Render configuration (RON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// OBJ mesh to show instead of the configured one.
    #[arg(long)]
    mesh: Option<PathBuf>,
}

fn window_conf() -> mq::Conf {
    mq::Conf {
        window_title: format!("Trapeze v{}", VERSION),
        window_width: 960,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Blits presented images into the macroquad window, letterboxed
struct MacroquadWindow;

impl Window for MacroquadWindow {
    fn present(&mut self, image: &Image) {
        let (Ok(tw), Ok(th)) = (u16::try_from(image.width()), u16::try_from(image.height())) else {
            tracing::warn!(width = image.width(), height = image.height(), "image too large to blit");
            return;
        };
        let (w, h) = (image.width() as f32, image.height() as f32);
        let texture = mq::Texture2D::from_rgba8(tw, th, image.as_bytes());
        texture.set_filter(mq::FilterMode::Nearest);

        let scale = (mq::screen_width() / w).min(mq::screen_height() / h);
        let (dw, dh) = (w * scale, h * scale);
        mq::draw_texture_ex(
            &texture,
            (mq::screen_width() - dw) * 0.5,
            (mq::screen_height() - dh) * 0.5,
            mq::WHITE,
            mq::DrawTextureParams {
                dest_size: Some(mq::vec2(dw, dh)),
                ..Default::default()
            },
        );
    }
}

fn next_cull(mode: CullMode) -> CullMode {
    match mode {
        CullMode::Cw => CullMode::Ccw,
        CullMode::Ccw => CullMode::None,
        CullMode::None => CullMode::Cw,
    }
}

fn update_camera(scene: &mut Scene, config: &RenderConfig, last_mouse: &mut (f32, f32)) {
    let dt = mq::get_frame_time();
    let speed = config.camera.move_speed * dt;

    let axis = |pos: mq::KeyCode, neg: mq::KeyCode| -> f32 {
        (mq::is_key_down(pos) as i32 - mq::is_key_down(neg) as i32) as f32
    };
    scene.camera.move_local(
        axis(mq::KeyCode::W, mq::KeyCode::S) * speed,
        axis(mq::KeyCode::D, mq::KeyCode::A) * speed,
        axis(mq::KeyCode::E, mq::KeyCode::Q) * speed,
    );

    let mouse = mq::mouse_position();
    if mq::is_mouse_button_down(mq::MouseButton::Right) {
        let rs = config.camera.rotate_speed;
        scene
            .camera
            .rotate(-(mouse.1 - last_mouse.1) * rs, (mouse.0 - last_mouse.0) * rs);
    }
    *last_mouse = mouse;
}

fn load_settings(args: &Args) -> RenderConfig {
    match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("failed to load {}: {e}, using defaults", path.display());
                RenderConfig::default()
            }
        },
        None => RenderConfig::default(),
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let config = load_settings(&args);

    let mut scene = match Scene::from_config(&config, args.mesh.as_deref()) {
        Ok(scene) => scene,
        Err(e) => {
            tracing::error!("failed to set up scene: {e}");
            return;
        }
    };

    let full = config.prop();
    let half = ImageProp::new((full.width / 2).max(1), (full.height / 2).max(1));
    let mut swapchain: Swapchain<Scene> = match Swapchain::new(full, config.swapchain_buffers) {
        Ok(chain) => chain,
        Err(e) => {
            tracing::error!("failed to create swapchain: {e}");
            return;
        }
    };
    swapchain.push_write_command(|image, scene: &mut Scene| scene.clear(image));
    swapchain.push_write_command(|image, scene: &mut Scene| {
        scene.draw(image);
    });

    let mut window = MacroquadWindow;
    let mut last_mouse = mq::mouse_position();
    let mut half_res = false;

    loop {
        if mq::is_key_pressed(mq::KeyCode::Escape) {
            break;
        }

        if mq::is_key_pressed(mq::KeyCode::Tab) {
            half_res = !half_res;
            if let Err(e) = swapchain.resize(if half_res { half } else { full }) {
                tracing::warn!("resize failed: {e}");
            }
        }

        if mq::is_key_pressed(mq::KeyCode::C) || mq::is_key_pressed(mq::KeyCode::P) {
            let current = scene.pipeline.settings();
            let settings = RasterSettings {
                cull: if mq::is_key_pressed(mq::KeyCode::C) { next_cull(current.cull) } else { current.cull },
                threads: if mq::is_key_pressed(mq::KeyCode::P) {
                    current.threads.xor(Some(4))
                } else {
                    current.threads
                },
                ..current.clone()
            };
            tracing::info!(cull = ?settings.cull, threads = ?settings.threads, "raster settings changed");
            if let Err(e) = scene.pipeline.set_settings(settings) {
                tracing::warn!("failed to apply settings: {e}");
            }
        }

        update_camera(&mut scene, &config, &mut last_mouse);
        scene.advance(mq::get_frame_time());

        mq::clear_background(mq::BLACK);
        swapchain.acquire_and_write(&mut scene);
        if let Err(e) = swapchain.present(&mut window) {
            tracing::warn!("present failed: {e}");
        }

        let stats = scene.last_stats;
        mq::draw_text(
            &format!(
                "{}x{}  tris {}  culled {}  split {}  traps {}  px {}  fps {}",
                swapchain.prop().width,
                swapchain.prop().height,
                stats.triangles,
                stats.culled,
                stats.split,
                stats.trapezoids,
                stats.pixels,
                mq::get_fps()
            ),
            10.0,
            20.0,
            18.0,
            mq::WHITE,
        );

        mq::next_frame().await
    }
}
