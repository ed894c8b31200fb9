use glam::Vec3;

use crate::error::Result;
use crate::intersection::{intersect_sphere, Hit};
use crate::math::{normalize, reflect, Color};
use crate::scene::{Light, Scene};

/// Constant share of the sphere's own color added to every shaded point.
pub const HUE_BLEED: f32 = 0.2;

/// Whether another sphere sits strictly between the hit point and `light`.
///
/// The ray direction is the full hit-to-light vector, so the light lies at `t = 1`.
pub fn in_shadow(hit: &Hit, light: &Light, scene: &Scene) -> bool {
    let to_light = light.position - hit.point;

    scene
        .spheres
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != hit.index)
        .any(|(_, sphere)| {
            intersect_sphere(hit.point, to_light, sphere).is_some_and(|t| 0.0 < t && t < 1.0)
        })
}

/// Local illumination at a hit: diffuse and specular per unshadowed light, then
/// ambient and hue bleed, clamped to `[0, 1]`.
pub fn shade(hit: &Hit, scene: &Scene) -> Result<Color> {
    let sphere = hit.sphere;
    let material = &sphere.material;
    let normal = outward_normal(hit.point, sphere.center)?;
    // not normalized
    let view = hit.point - scene.camera.unit_position();

    let mut color = Color::BLACK;

    for light in &scene.lights {
        if in_shadow(hit, light, scene) {
            continue;
        }

        let to_light = normalize(light.position - hit.point, "light direction")?;
        let diffuse_dot = to_light.dot(normal);
        if diffuse_dot < 0.0 {
            continue;
        }

        color += (light.diffuse * material.diffuse * diffuse_dot).clamp01();

        let reflected = reflect(to_light, normal);
        let specular_dot = reflected.dot(view).powf(material.albedo);
        color += (light.specular * material.specular * specular_dot).clamp01();
    }

    color += material.ambient * scene.ambient_light_intensity;
    color += sphere.color * HUE_BLEED;

    Ok(color.clamp01())
}

/// Unit outward normal at `point` on a sphere centred at `center`.
pub(crate) fn outward_normal(point: Vec3, center: Vec3) -> Result<Vec3> {
    normalize(point - center, "surface normal")
}
