use glam::Vec3;
use sphere_tracer::{
    backend::{gather_samples, Backend, CpuBackend, FlatScene, GpuBackend},
    camera::Camera,
    description::load_scene,
    render_frame,
    sampler::{sample, SUPERSAMPLE_OFFSETS},
    Color, Error, ImagePlane, Light, Material, RenderConfig, Scene, Sphere,
};

fn small_config(antialiasing: bool) -> RenderConfig {
    RenderConfig {
        width: 32,
        height: 24,
        antialiasing,
        ..RenderConfig::default()
    }
}

/// Two lit spheres in front of an eye on the -z axis.
fn lit_scene() -> Scene {
    let camera = Camera::new(Vec3::new(0.0, 0.0, -1.0));
    let plane = ImagePlane::in_front_of(camera.eye, 1.5, 1.0);
    Scene::new(camera, plane, Color::splat(0.2))
        .with_sphere(
            Sphere::new(
                Vec3::new(-4.0, 0.0, 30.0),
                6.0,
                Color::new(1.0, 0.0, 0.2),
                Material::new(0.1, 0.7, 0.5, 0.3, 8.0),
            )
            .unwrap(),
        )
        .with_sphere(
            Sphere::new(
                Vec3::new(8.0, 2.0, 40.0),
                5.0,
                Color::new(0.0, 0.4, 1.0),
                Material::new(0.2, 0.6, 0.4, 0.5, 12.0),
            )
            .unwrap(),
        )
        .with_light(Light::new(Vec3::new(-20.0, 20.0, 0.0), 0.9, 0.7))
        .with_light(Light::new(Vec3::new(20.0, -10.0, 10.0), 0.5, 0.3))
}

#[test]
fn empty_scene_is_black() {
    let frame = render_frame(&Scene::default(), &small_config(true)).unwrap();
    assert!(frame.pixels().iter().all(|pixel| *pixel == Color::BLACK));
}

#[test]
fn static_scene_renders_identically_twice() {
    let scene = lit_scene();
    let config = small_config(true);
    let first = render_frame(&scene, &config).unwrap();
    let second = render_frame(&scene, &config).unwrap();
    assert_eq!(first, second);
    assert!(first.pixels().iter().any(|pixel| *pixel != Color::BLACK));
}

#[test]
fn antialiased_pixel_is_mean_of_sub_samples() {
    let scene = lit_scene();
    let config = small_config(true);
    let frame = render_frame(&scene, &config).unwrap();

    for (x, y) in [(10, 12), (16, 12), (5, 3), (31, 23)] {
        let mean = SUPERSAMPLE_OFFSETS
            .iter()
            .map(|&offset| sample(&scene, &config, x, y, offset).unwrap())
            .fold(Color::BLACK, |acc, c| acc + c)
            * 0.25;
        let pixel = frame.get(x, config.height - 1 - y);
        assert!(
            pixel.abs_diff_eq(mean.clamp01(), 1e-6),
            "pixel ({x}, {y}) = {pixel:?}, mean {mean:?}"
        );
    }
}

/// A mirror sphere ahead of the eye and one behind it, both unlit so each
/// contributes exactly its ambient term.
fn facing_mirrors() -> Scene {
    let camera = Camera::new(Vec3::new(0.0, 0.0, -1.0));
    let plane = ImagePlane::in_front_of(camera.eye, 1.5, 1.0);
    Scene::new(camera, plane, Color::WHITE)
        .with_sphere(
            Sphere::new(
                Vec3::new(0.0, 0.0, 30.0),
                5.0,
                Color::BLACK,
                Material::new(0.2, 0.0, 0.0, 1.0, 1.0),
            )
            .unwrap(),
        )
        .with_sphere(
            Sphere::new(
                Vec3::new(0.0, 0.0, -30.0),
                5.0,
                Color::BLACK,
                Material::new(0.3, 0.0, 0.0, 1.0, 1.0),
            )
            .unwrap(),
        )
}

#[test]
fn reflection_weights_step_one_one_zero() {
    // the center ray bounces front -> back -> front; weights 1, 1, 0
    let config = RenderConfig {
        width: 2,
        height: 2,
        ..RenderConfig::default()
    };
    let frame = render_frame(&facing_mirrors(), &config).unwrap();
    let center = frame.get(1, 0);
    assert!(center.abs_diff_eq(Color::splat(0.5), 1e-5), "{center:?}");

    let shallow = RenderConfig {
        max_depth: 2,
        ..config
    };
    // depth 2 weighs the first hit 1 and the bounce 0
    let frame = render_frame(&facing_mirrors(), &shallow).unwrap();
    assert!(frame.get(1, 0).abs_diff_eq(Color::splat(0.2), 1e-5));
}

#[test]
fn cpu_backend_matches_render_frame() {
    let scene = lit_scene();
    let config = small_config(false);
    let mut backend = CpuBackend;
    assert_eq!(
        backend.render(&scene, &config).unwrap(),
        render_frame(&scene, &config).unwrap()
    );
}

#[test]
fn gathered_samples_match_cpu_frame() {
    let scene = lit_scene();
    let config = small_config(true);

    let mut samples = Vec::new();
    for offset in SUPERSAMPLE_OFFSETS {
        for y in 0..config.height {
            for x in 0..config.width {
                samples.push(sample(&scene, &config, x, y, offset).unwrap());
            }
        }
    }
    assert_eq!(
        gather_samples(&config, &samples),
        render_frame(&scene, &config).unwrap()
    );
}

#[test]
fn scene_file_renders() {
    let path = std::env::temp_dir().join(format!("sphere-tracer-scene-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{
            "camera": "0,0,-1",
            "plane": "1.5,1",
            "ambient_light_intensity": "0.2",
            "objects": [
                {
                    "position": "0,0,30",
                    "radius": "5",
                    "color_rgb": "255,0,0",
                    "material": { "ambient": "0.1", "diffuse": "0.7", "specular": "0.4", "reflectivity": "0.5", "albedo": "10" }
                }
            ],
            "lights": [ { "position": "10,10,0", "diffuse": "0.8", "specular": "0.6" } ],
            "render": { "width": 8, "height": 6 }
        }"#,
    )
    .unwrap();

    let (scene, config) = load_scene(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    let frame = render_frame(&scene, &config.unwrap()).unwrap();
    assert_eq!((frame.width(), frame.height()), (8, 6));
}

#[test]
fn missing_scene_file_is_an_io_error() {
    let result = load_scene("/definitely/not/here.json");
    assert!(matches!(result, Err(Error::Io(_))));
}

fn gpu_backend() -> Option<GpuBackend> {
    match pollster::block_on(GpuBackend::new()) {
        Ok(backend) => Some(backend),
        Err(err) => {
            eprintln!("skipping GPU test: {err}");
            None
        }
    }
}

#[test]
fn gpu_matches_cpu() {
    let Some(mut gpu) = gpu_backend() else {
        return;
    };
    let scene = lit_scene();

    for antialiasing in [false, true] {
        let config = small_config(antialiasing);
        let expected = render_frame(&scene, &config).unwrap();
        let actual = gpu.render(&scene, &config).unwrap();
        assert_eq!((actual.width(), actual.height()), (config.width, config.height));

        // silhouette and shadow edges may flip between implementations
        let mismatched = expected
            .pixels()
            .iter()
            .zip(actual.pixels())
            .filter(|(e, a)| !e.abs_diff_eq(**a, 2e-3))
            .count();
        assert!(
            mismatched * 100 <= expected.pixels().len(),
            "{mismatched} pixels differ (antialiasing {antialiasing})"
        );
    }
}

#[test]
fn gpu_renders_empty_scene_black() {
    let Some(mut gpu) = gpu_backend() else {
        return;
    };
    let frame = gpu.render(&Scene::default(), &small_config(true)).unwrap();
    assert!(frame.pixels().iter().all(|pixel| *pixel == Color::BLACK));
}

#[test]
fn gpu_rejects_depth_beyond_kernel_limit() {
    let Some(mut gpu) = gpu_backend() else {
        return;
    };
    let config = RenderConfig {
        max_depth: 9,
        ..small_config(false)
    };
    assert!(matches!(gpu.render(&lit_scene(), &config), Err(Error::GpuLimit(_))));
}

#[test]
fn flat_scene_counts_match_scene() {
    let flat = FlatScene::new(&lit_scene(), &small_config(true));
    assert_eq!(flat.header.sphere_count, 2);
    assert_eq!(flat.header.light_count, 2);
    assert_eq!(flat.work_items(), 32 * 24 * 4);
}

const PASSTHROUGH_PASS: &str = r#"
@group(0) @binding(3) var<storage, read_write> samples: array<vec4<f32>>;

@compute @workgroup_size(64)
fn main(
    @builtin(global_invocation_id) id: vec3<u32>,
    @builtin(num_workgroups) groups: vec3<u32>,
) {
    let item = id.x + id.y * groups.x * 64u;
    if (item >= arrayLength(&samples)) {
        return;
    }
    samples[item] = samples[item];
}
"#;

#[test]
fn passthrough_postprocess_leaves_frame_unchanged() {
    let (Some(mut plain), Some(gpu)) = (gpu_backend(), gpu_backend()) else {
        return;
    };
    let mut processed = gpu.with_postprocess(PASSTHROUGH_PASS).unwrap();
    let scene = lit_scene();
    let config = small_config(true);
    assert_eq!(
        processed.render(&scene, &config).unwrap(),
        plain.render(&scene, &config).unwrap()
    );
}

#[test]
fn postprocess_runs_after_tracing() {
    let Some(gpu) = gpu_backend() else {
        return;
    };
    let blackout = PASSTHROUGH_PASS.replace(
        "samples[item] = samples[item];",
        "samples[item] = vec4<f32>(0.0);",
    );
    let mut gpu = gpu.with_postprocess(&blackout).unwrap();
    let frame = gpu.render(&lit_scene(), &small_config(false)).unwrap();
    assert!(frame.pixels().iter().all(|pixel| *pixel == Color::BLACK));
}

#[test]
fn broken_postprocess_shader_is_an_error() {
    let Some(gpu) = gpu_backend() else {
        return;
    };
    let result = gpu.with_postprocess("fn main( {");
    assert!(matches!(result, Err(Error::Gpu(_))));
}
