use glam::Vec3;

use crate::config::RenderConfig;
use crate::error::Result;
use crate::math::Color;
use crate::scene::Scene;
use crate::tracer::trace;

/// Sub-pixel offsets of the antialiased mode, in pixel units.
pub const SUPERSAMPLE_OFFSETS: [(f32, f32); 4] = [(0.0, 0.0), (0.5, 0.0), (0.0, 0.5), (0.5, 0.5)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Primary ray through the image plane at pixel `(x, y)` shifted by `offset`.
/// The ray starts on the plane and points away from the eye.
pub fn primary_ray(scene: &Scene, config: &RenderConfig, x: u32, y: u32, offset: (f32, f32)) -> Ray {
    let alpha = (x as f32 + offset.0) / config.width as f32;
    let beta = (y as f32 + offset.1) / config.height as f32;
    let origin = scene.plane.point_at(alpha, beta);
    Ray {
        origin,
        direction: origin - scene.camera.eye,
    }
}

/// Color of one sub-sample, traced to the configured depth.
pub fn sample(scene: &Scene, config: &RenderConfig, x: u32, y: u32, offset: (f32, f32)) -> Result<Color> {
    let ray = primary_ray(scene, config, x, y, offset);
    trace(ray.direction, ray.origin, scene, config.max_depth, config.hit_epsilon)
}

/// Mean of the four sub-samples, clamped.
pub fn resolve_supersamples(samples: [Color; 4]) -> Color {
    let sum = samples
        .into_iter()
        .fold(Color::BLACK, |acc, sample| acc + sample);
    (sum * 0.25).clamp01()
}

/// Final color of pixel `(x, y)`: a single sample, or the four-sample average
/// when antialiasing is on.
pub fn pixel_color(scene: &Scene, config: &RenderConfig, x: u32, y: u32) -> Result<Color> {
    if !config.antialiasing {
        return sample(scene, config, x, y, SUPERSAMPLE_OFFSETS[0]);
    }

    let mut samples = [Color::BLACK; 4];
    for (slot, offset) in samples.iter_mut().zip(SUPERSAMPLE_OFFSETS) {
        *slot = sample(scene, config, x, y, offset)?;
    }
    Ok(resolve_supersamples(samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::scene::{ImagePlane, Material, Sphere};

    fn config(antialiasing: bool) -> RenderConfig {
        RenderConfig {
            width: 40,
            height: 20,
            antialiasing,
            ..RenderConfig::default()
        }
    }

    fn scene() -> Scene {
        let camera = Camera::default();
        Scene::new(camera, ImagePlane::in_front_of(camera.eye, 1.5, 1.0), Color::splat(1.0))
            .with_sphere(
                Sphere::new(
                    Vec3::new(0.0, 0.0, 10.0),
                    4.0,
                    Color::new(0.0, 1.0, 0.0),
                    Material::new(0.4, 0.0, 0.0, 1.0, 1.0),
                )
                .unwrap(),
            )
    }

    #[test]
    fn top_left_pixel_maps_to_first_corner() {
        let scene = scene();
        let ray = primary_ray(&scene, &config(false), 0, 0, (0.0, 0.0));
        assert_eq!(ray.origin, scene.plane.x1);
        assert_eq!(ray.direction, scene.plane.x1 - scene.camera.eye);
    }

    #[test]
    fn half_pixel_offset_moves_along_plane() {
        let scene = scene();
        let config = config(false);
        let base = primary_ray(&scene, &config, 10, 5, (0.0, 0.0));
        let shifted = primary_ray(&scene, &config, 10, 5, (0.5, 0.5));
        let next = primary_ray(&scene, &config, 11, 6, (0.0, 0.0));
        assert!(shifted.origin.abs_diff_eq((base.origin + next.origin) * 0.5, 1e-5));
    }

    #[test]
    fn antialiased_pixel_is_mean_of_subsamples() {
        let scene = scene();
        let config = config(true);
        for (x, y) in [(20, 10), (13, 4), (0, 0), (27, 15)] {
            let expected = SUPERSAMPLE_OFFSETS
                .map(|offset| sample(&scene, &config, x, y, offset).unwrap())
                .into_iter()
                .fold(Color::BLACK, |acc, c| acc + c)
                * 0.25;
            let actual = pixel_color(&scene, &config, x, y).unwrap();
            assert!(actual.abs_diff_eq(expected.clamp01(), 1e-6));
        }
    }

    #[test]
    fn single_sample_mode_uses_pixel_corner() {
        let scene = scene();
        let config = config(false);
        let direct = sample(&scene, &config, 20, 10, (0.0, 0.0)).unwrap();
        assert_eq!(pixel_color(&scene, &config, 20, 10).unwrap(), direct);
    }
}
