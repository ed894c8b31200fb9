use glam::Vec3;

use crate::error::Result;
use crate::intersection::nearest_collision;
use crate::math::{normalize, reflect, Color};
use crate::scene::Scene;
use crate::shading::{outward_normal, shade};

/// Recursion depth every primary ray starts with.
pub const MAX_DEPTH: u32 = 3;

/// Reflection weight at `depth`: `depth / 2` in integer arithmetic, so the
/// falloff is stepped (`3 -> 1`, `2 -> 1`, `1 -> 0`).
pub fn depth_weight(depth: u32) -> f32 {
    (depth / 2) as f32
}

/// Color seen along `origin + t * direction`, following mirror bounces until
/// `depth` runs out or the ray escapes the scene.
pub fn trace(direction: Vec3, origin: Vec3, scene: &Scene, depth: u32, epsilon: f32) -> Result<Color> {
    if depth == 0 {
        return Ok(Color::BLACK);
    }

    let Some(hit) = nearest_collision(origin, direction, &scene.spheres, epsilon).hit() else {
        return Ok(Color::BLACK);
    };

    let local = shade(&hit, scene)?;
    let weight = hit.sphere.material.reflectivity * depth_weight(depth);
    let mut color = local * weight;

    let incoming = normalize(-direction, "incoming ray")?;
    let normal = outward_normal(hit.point, hit.sphere.center)?;
    let mirrored = reflect(incoming, normal);

    color += trace(mirrored, hit.point, scene, depth - 1, epsilon)?;

    Ok(color.clamp01())
}
