use glam::Vec3;

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::math::{lerp, Color};

/// Per-frame displacement applied by [`Scene::tick`].
pub const TICK_DRIFT: Vec3 = Vec3::new(0.0, 0.3, -1.0);

/// Bilinear quad in world space. `x1`/`x2` form the top edge and `x3`/`x4` the
/// bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlane {
    pub x1: Vec3,
    pub x2: Vec3,
    pub x3: Vec3,
    pub x4: Vec3,
}

impl ImagePlane {
    pub fn new(x1: Vec3, x2: Vec3, x3: Vec3, x4: Vec3) -> Self {
        Self { x1, x2, x3, x4 }
    }

    /// Plane of the given half extents one unit in front of `eye`, facing +z.
    pub fn in_front_of(eye: Vec3, half_width: f32, half_height: f32) -> Self {
        let offset = eye + Vec3::Z;
        Self {
            x1: Vec3::new(half_width, half_height, 0.0) + offset,
            x2: Vec3::new(-half_width, half_height, 0.0) + offset,
            x3: Vec3::new(half_width, -half_height, 0.0) + offset,
            x4: Vec3::new(-half_width, -half_height, 0.0) + offset,
        }
    }

    /// World point at plane coordinates `(alpha, beta)`, both nominally in `[0, 1]`.
    pub fn point_at(&self, alpha: f32, beta: f32) -> Vec3 {
        let top = lerp(self.x1, self.x2, alpha);
        let bottom = lerp(self.x3, self.x4, alpha);
        lerp(top, bottom, beta)
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.x1 += offset;
        self.x2 += offset;
        self.x3 += offset;
        self.x4 += offset;
    }

    pub fn corners(&self) -> [Vec3; 4] {
        [self.x1, self.x2, self.x3, self.x4]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub reflectivity: Color,
    /// Specular exponent.
    pub albedo: f32,
}

impl Material {
    pub fn new(ambient: f32, diffuse: f32, specular: f32, reflectivity: f32, albedo: f32) -> Self {
        Self {
            ambient: Color::splat(ambient),
            diffuse: Color::splat(diffuse),
            specular: Color::splat(specular),
            reflectivity: Color::splat(reflectivity),
            albedo,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(0.1, 0.7, 0.5, 0.0, 8.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    radius: f32,
    pub color: Color,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, color: Color, material: Material) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::InvalidSphere { radius });
        }
        Ok(Self {
            center,
            radius,
            color,
            material,
        })
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 0.5,
            color: Color::WHITE,
            material: Material::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub diffuse: Color,
    pub specular: Color,
}

impl Light {
    pub fn new(position: Vec3, diffuse: f32, specular: f32) -> Self {
        Self {
            position,
            diffuse: Color::splat(diffuse),
            specular: Color::splat(specular),
        }
    }
}

/// Everything a frame render reads. Spheres and lights live in contiguous
/// arrays; a sphere's index is its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub camera: Camera,
    pub plane: ImagePlane,
    pub ambient_light_intensity: Color,
    pub spheres: Vec<Sphere>,
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn new(camera: Camera, plane: ImagePlane, ambient_light_intensity: Color) -> Self {
        Self {
            camera,
            plane,
            ambient_light_intensity,
            spheres: Vec::new(),
            lights: Vec::new(),
        }
    }

    pub fn with_sphere(mut self, sphere: Sphere) -> Self {
        self.spheres.push(sphere);
        self
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    /// Moves the eye and the image plane together so the view does not distort.
    pub fn translate_view(&mut self, offset: Vec3) {
        self.camera.eye += offset;
        self.plane.translate(offset);
    }

    /// Advances the physics by one frame: the most recently declared sphere drifts
    /// by [`TICK_DRIFT`].
    pub fn tick(&mut self) {
        if let Some(sphere) = self.spheres.last_mut() {
            sphere.center += TICK_DRIFT;
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        let camera = Camera::default();
        let plane = ImagePlane::in_front_of(camera.eye, 1.5, 1.0);
        Self::new(camera, plane, Color::splat(0.2))
    }
}
