use trapeze::error::RenderError;
use trapeze::rasterizer::{ClipMode, CullMode};
use trapeze::world::{config_to_string, load_config, load_config_from_str, save_config, RenderConfig, Scene};

#[test]
fn config_round_trips_through_ron() {
    let mut config = RenderConfig::default();
    config.width = 320;
    config.height = 200;
    config.raster.cull = CullMode::Ccw;
    config.raster.clip = ClipMode::Reject;
    config.camera.fov_deg = 75.0;
    config.spin_speed = 0.0;

    let text = config_to_string(&config).unwrap();
    let parsed = load_config_from_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn config_file_save_and_load() {
    let path = std::env::temp_dir().join(format!("trapeze-config-{}.ron", std::process::id()));
    let config = RenderConfig {
        swapchain_buffers: 3,
        ..RenderConfig::default()
    };
    save_config(&config, &path).unwrap();
    let loaded = load_config(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, config);
}

#[test]
fn missing_config_file_reports_path() {
    let err = load_config("no/such/config.ron").unwrap_err();
    assert!(matches!(err, RenderError::Io { .. }));
    assert!(err.to_string().contains("no/such/config.ron"));
}

#[test]
fn scene_from_config_uses_cube_by_default() {
    let config = load_config_from_str("(width: 32, height: 24, spin_speed: 2.0)").unwrap();
    let scene = Scene::from_config(&config, None).unwrap();
    assert_eq!(scene.mesh.triangle_count(), 12);
    assert_eq!(scene.spin_speed, 2.0);
    assert!((scene.camera.aspect - 32.0 / 24.0).abs() < 1e-6);
}

#[test]
fn scene_from_config_fails_on_missing_mesh() {
    let config = RenderConfig::default();
    let result = Scene::from_config(&config, Some(std::path::Path::new("missing.obj")));
    assert!(matches!(result, Err(RenderError::Io { .. })));
}
