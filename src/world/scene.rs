//! A spinning, Lambert-lit mesh seen through a `Camera`
//!
//! Shared by the viewer and the snapshot tool: owns the pipeline and
//! re-binds its callbacks every frame with the current matrices.

use glam::{Mat3, Mat4, Vec3};

use crate::error::RenderResult;
use crate::rasterizer::{Color, DrawStats, FrameContext, Image, Pipeline};

use super::camera::Camera;
use super::config::RenderConfig;
use super::mesh::{load_obj, Mesh};

const AMBIENT: f32 = 0.2;

/// Diffuse term with an ambient floor, in [0, 1]
pub fn shade_intensity(normal: Vec3, light_dir: Vec3, ambient: f32) -> f32 {
    let diffuse = normal.normalize_or_zero().dot(light_dir).max(0.0);
    (ambient + (1.0 - ambient) * diffuse).clamp(0.0, 1.0)
}

pub struct Scene {
    pub pipeline: Pipeline,
    pub mesh: Mesh,
    pub camera: Camera,
    pub frame: FrameContext,
    pub clear_color: Color,
    pub albedo: Vec3,
    /// World space, pointing towards the light
    pub light_dir: Vec3,
    pub spin_speed: f32,
    pub last_stats: DrawStats,
}

impl Scene {
    pub fn new(pipeline: Pipeline, mesh: Mesh, camera: Camera) -> Self {
        Self {
            pipeline,
            mesh,
            camera,
            frame: FrameContext::default(),
            clear_color: Color::BLACK,
            albedo: Vec3::new(0.9, 0.75, 0.55),
            light_dir: Vec3::new(0.4, 0.8, 0.6).normalize(),
            spin_speed: 0.0,
            last_stats: DrawStats::default(),
        }
    }

    /// Pipeline, camera and mesh as described by `config`. An explicit
    /// `mesh` path overrides the configured one.
    pub fn from_config(config: &RenderConfig, mesh: Option<&std::path::Path>) -> RenderResult<Self> {
        config.validate()?;
        let pipeline = Pipeline::new(config.raster.clone())?;
        let mesh = match mesh.or(config.mesh.as_deref()) {
            Some(path) => load_obj(path)?,
            None => Mesh::cube(),
        };
        tracing::info!(
            triangles = mesh.triangle_count(),
            width = config.width,
            height = config.height,
            "scene ready"
        );
        let mut scene = Self::new(pipeline, mesh, Camera::from_config(&config.camera, config.aspect()));
        scene.clear_color = config.clear_color;
        scene.spin_speed = config.spin_speed;
        Ok(scene)
    }

    /// Model rotation at time `t`
    pub fn model(spin_speed: f32, t: f32) -> Mat4 {
        Mat4::from_rotation_y(spin_speed * t) * Mat4::from_rotation_x(0.5 * spin_speed * t)
    }

    pub fn advance(&mut self, delta: f32) {
        self.frame = self.frame.advance(delta);
    }

    pub fn clear(&self, image: &mut Image) {
        image.clear_color(self.clear_color);
    }

    /// Draw the mesh for the current frame over what is in `image`
    pub fn draw(&mut self, image: &mut Image) -> DrawStats {
        let view_proj = self.camera.view_projection();
        let spin = self.spin_speed;
        self.pipeline
            .set_vertex_changing(move |v, ctx| view_proj * Scene::model(spin, ctx.time) * v.position);

        // Light in model space so normals need no transform
        let to_model = Mat3::from_mat4(Scene::model(spin, self.frame.time)).transpose();
        let light = (to_model * self.light_dir).normalize_or_zero();
        let albedo = self.albedo;
        self.pipeline.set_pixel_shading(move |v| {
            let k = shade_intensity(v.normal, light, AMBIENT);
            (albedo * k).extend(1.0)
        });

        self.last_stats = self.pipeline.perform(image, &self.mesh, &self.frame);
        self.last_stats
    }
}
