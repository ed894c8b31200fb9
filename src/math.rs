use std::ops::{Add, AddAssign, Mul};

use glam::Vec3;

use crate::error::{Error, Result};

/// Unit vector of `v`. Zero-length and non-finite inputs are rejected instead of
/// turning into NaN further down the pipeline.
pub fn normalize(v: Vec3, context: &'static str) -> Result<Vec3> {
    v.try_normalize()
        .ok_or(Error::DegenerateVector { context })
}

/// Mirror `v` about the unit normal `n`: `2(v·n)n - v`.
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    n * (2.0 * v.dot(n)) - v
}

/// `(1 - t) * a + t * b`
pub fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}

/// Clamps to `[min, max]`. NaN collapses to `min`.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Same value on every channel; scene coefficients are scalars broadcast to RGB.
    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value)
    }

    pub fn clamp(self, min: f32, max: f32) -> Self {
        Self::new(
            clamp(self.r, min, max),
            clamp(self.g, min, max),
            clamp(self.b, min, max),
        )
    }

    pub fn clamp01(self) -> Self {
        self.clamp(0.0, 1.0)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn abs_diff_eq(self, other: Self, max_abs_diff: f32) -> bool {
        (self.r - other.r).abs() <= max_abs_diff
            && (self.g - other.g).abs() <= max_abs_diff
            && (self.b - other.b).abs() <= max_abs_diff
    }
}

impl From<[f32; 3]> for Color {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Componentwise product.
impl Mul for Color {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Mul<f32> for Color {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}
