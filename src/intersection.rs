use glam::Vec3;

use crate::scene::Sphere;

/// Minimum accepted hit distance for the nearest-hit search, in world units.
///
/// Rejects self-intersections of camera rays. Reflection rays reuse the same
/// floor, which drops legitimate hits between spheres closer than this.
pub const HIT_EPSILON: f32 = 1.0;

/// Outcome of a nearest-hit query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collision<'a> {
    Hit(Hit<'a>),
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit<'a> {
    pub point: Vec3,
    /// Position of the sphere in the scene; used to exclude it from its own shadow test.
    pub index: usize,
    pub sphere: &'a Sphere,
}

impl<'a> Collision<'a> {
    pub fn hit(self) -> Option<Hit<'a>> {
        match self {
            Collision::Hit(hit) => Some(hit),
            Collision::Miss => None,
        }
    }
}

/// Ray parameter `t` of the ray `origin + t * direction` against `sphere`.
///
/// Returns `None` when the ray line misses. Otherwise the nearest forward root,
/// or the far root when the near one lies behind the origin (origin inside the
/// sphere). The far root may itself be negative.
pub fn intersect_sphere(origin: Vec3, direction: Vec3, sphere: &Sphere) -> Option<f32> {
    let oc = origin - sphere.center;
    let a = direction.dot(direction);
    let b = 2.0 * oc.dot(direction);
    let c = oc.dot(oc) - sphere.radius() * sphere.radius();

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t1 = (-b + root) / (2.0 * a);
    let t2 = (-b - root) / (2.0 * a);

    if t1.min(t2) < 0.0 {
        Some(t1.max(t2))
    } else {
        Some(t1.min(t2))
    }
}

/// Closest sphere hit with `t >= epsilon`. Ties keep the first sphere in scene order.
pub fn nearest_collision<'a>(
    origin: Vec3,
    direction: Vec3,
    spheres: &'a [Sphere],
    epsilon: f32,
) -> Collision<'a> {
    let mut closest_t = f32::INFINITY;
    let mut collision = Collision::Miss;

    for (index, sphere) in spheres.iter().enumerate() {
        let Some(t) = intersect_sphere(origin, direction, sphere) else {
            continue;
        };
        if t >= epsilon && t < closest_t {
            closest_t = t;
            collision = Collision::Hit(Hit {
                point: origin + direction * t,
                index,
                sphere,
            });
        }
    }

    collision
}
