//! JSON scene files.
//!
//! Numeric fields accept plain JSON numbers and arrays as well as the
//! comma-separated text form (`"0,0,-1"`, `"0.2"`) used by older scene files.

use std::path::Path;

use glam::Vec3;
use serde::Deserialize;

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::math::Color;
use crate::scene::{ImagePlane, Light, Material, Scene, Sphere};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Numbers {
    List(Vec<f32>),
    Text(String),
}

impl Numbers {
    /// Exactly `N` values, from either form.
    pub fn values<const N: usize>(&self) -> Result<[f32; N]> {
        let parsed = match self {
            Numbers::List(values) => values.clone(),
            Numbers::Text(text) => text
                .split(',')
                .map(|part| {
                    part.trim().parse::<f32>().map_err(|_| {
                        Error::SceneDescription(format!("{part:?} is not a number in {text:?}"))
                    })
                })
                .collect::<Result<Vec<f32>>>()?,
        };
        parsed.try_into().map_err(|parsed: Vec<f32>| {
            Error::SceneDescription(format!("expected {N} values, found {}", parsed.len()))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f32),
    Text(String),
}

impl Scalar {
    pub fn value(&self) -> Result<f32> {
        match self {
            Scalar::Number(value) => Ok(*value),
            Scalar::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| Error::SceneDescription(format!("{text:?} is not a number"))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialDescription {
    pub ambient: Scalar,
    pub diffuse: Scalar,
    pub specular: Scalar,
    pub reflectivity: Scalar,
    pub albedo: Scalar,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDescription {
    pub position: Numbers,
    pub radius: Scalar,
    /// Channels in `0..=255`.
    pub color_rgb: Numbers,
    pub material: MaterialDescription,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LightDescription {
    pub position: Numbers,
    pub diffuse: Scalar,
    pub specular: Scalar,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneDescription {
    pub camera: Numbers,
    /// Half width and half height of the image plane.
    pub plane: Numbers,
    pub ambient_light_intensity: Scalar,
    #[serde(default)]
    pub objects: Vec<ObjectDescription>,
    #[serde(default)]
    pub lights: Vec<LightDescription>,
    #[serde(default)]
    pub render: Option<RenderConfig>,
}

impl SceneDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn build(&self) -> Result<Scene> {
        let camera = Camera::new(Vec3::from(self.camera.values::<3>()?));
        let [half_width, half_height] = self.plane.values::<2>()?;
        let plane = ImagePlane::in_front_of(camera.eye, half_width, half_height);
        let ambient = Color::splat(self.ambient_light_intensity.value()?);

        let mut scene = Scene::new(camera, plane, ambient);
        for object in &self.objects {
            scene.spheres.push(object.build()?);
        }
        for light in &self.lights {
            scene.lights.push(light.build()?);
        }

        tracing::info!(
            spheres = scene.spheres.len(),
            lights = scene.lights.len(),
            "scene loaded"
        );
        Ok(scene)
    }
}

impl ObjectDescription {
    fn build(&self) -> Result<Sphere> {
        let [r, g, b] = self.color_rgb.values::<3>()?;
        let material = Material::new(
            self.material.ambient.value()?,
            self.material.diffuse.value()?,
            self.material.specular.value()?,
            self.material.reflectivity.value()?,
            self.material.albedo.value()?,
        );
        Sphere::new(
            Vec3::from(self.position.values::<3>()?),
            self.radius.value()?,
            Color::new(r / 255.0, g / 255.0, b / 255.0),
            material,
        )
    }
}

impl LightDescription {
    fn build(&self) -> Result<Light> {
        Ok(Light::new(
            Vec3::from(self.position.values::<3>()?),
            self.diffuse.value()?,
            self.specular.value()?,
        ))
    }
}

/// Reads a scene file and returns the scene plus its embedded render settings,
/// if any.
pub fn load_scene(path: impl AsRef<Path>) -> Result<(Scene, Option<RenderConfig>)> {
    into_parts(SceneDescription::from_path(path)?)
}

/// [`load_scene`] for a JSON document passed inline.
pub fn load_scene_str(json: &str) -> Result<(Scene, Option<RenderConfig>)> {
    into_parts(SceneDescription::from_json(json)?)
}

fn into_parts(description: SceneDescription) -> Result<(Scene, Option<RenderConfig>)> {
    let scene = description.build()?;
    Ok((scene, description.render))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT_SCENE: &str = r#"{
        "camera": "0,0,0",
        "plane": "1.5,1",
        "ambient_light_intensity": "0.2",
        "objects": [
            {
                "position": "0,0,30",
                "radius": "5",
                "color_rgb": "255,0,51",
                "material": {
                    "ambient": "0.1",
                    "diffuse": "0.7",
                    "specular": "0.4",
                    "reflectivity": "0.5",
                    "albedo": "10"
                }
            }
        ],
        "lights": [
            { "position": "10,-10,0", "diffuse": "0.8", "specular": "0.6" }
        ]
    }"#;

    #[test]
    fn text_fields_are_parsed() {
        let scene = SceneDescription::from_json(TEXT_SCENE).unwrap().build().unwrap();
        assert_eq!(scene.camera.eye, Vec3::ZERO);
        assert_eq!(scene.plane.x1, Vec3::new(1.5, 1.0, 1.0));
        assert_eq!(scene.plane.x4, Vec3::new(-1.5, -1.0, 1.0));
        assert_eq!(scene.ambient_light_intensity, Color::splat(0.2));

        let sphere = &scene.spheres[0];
        assert_eq!(sphere.center, Vec3::new(0.0, 0.0, 30.0));
        assert_eq!(sphere.radius(), 5.0);
        assert_eq!(sphere.color, Color::new(1.0, 0.0, 0.2));
        assert_eq!(sphere.material.reflectivity, Color::splat(0.5));
        assert_eq!(sphere.material.albedo, 10.0);

        let light = &scene.lights[0];
        assert_eq!(light.position, Vec3::new(10.0, -10.0, 0.0));
        assert_eq!(light.diffuse, Color::splat(0.8));
        assert_eq!(light.specular, Color::splat(0.6));
    }

    #[test]
    fn numeric_fields_and_render_block_are_parsed() {
        let json = r#"{
            "camera": [1, 2, 3],
            "plane": [2, 1],
            "ambient_light_intensity": 0.5,
            "render": { "width": 320, "height": 200 }
        }"#;
        let description = SceneDescription::from_json(json).unwrap();
        let scene = description.build().unwrap();
        assert_eq!(scene.camera.eye, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(scene.plane.x1, Vec3::new(3.0, 3.0, 4.0));
        assert!(scene.spheres.is_empty());
        assert!(scene.lights.is_empty());

        let render = description.render.unwrap();
        assert_eq!((render.width, render.height), (320, 200));
        assert_eq!(render.max_depth, 3);
    }

    #[test]
    fn malformed_values_are_reported() {
        let short = Numbers::Text("1,2".into());
        assert!(matches!(short.values::<3>(), Err(Error::SceneDescription(_))));
        let long = Numbers::List(vec![1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(long.values::<3>(), Err(Error::SceneDescription(_))));
        let not_a_number = Numbers::Text("1,x,3".into());
        assert!(matches!(not_a_number.values::<3>(), Err(Error::SceneDescription(_))));

        let garbage = Scalar::Text("bright".into());
        assert!(matches!(garbage.value(), Err(Error::SceneDescription(_))));
    }

    #[test]
    fn inline_document_loads_like_a_file() {
        let (scene, render) = load_scene_str(TEXT_SCENE).unwrap();
        assert_eq!(scene.spheres.len(), 1);
        assert_eq!(scene.lights.len(), 1);
        assert!(render.is_none());

        assert!(matches!(load_scene_str("{ not json"), Err(Error::Json(_))));
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let json = TEXT_SCENE.replace(r#""radius": "5""#, r#""radius": "0""#);
        let result = SceneDescription::from_json(&json).unwrap().build();
        assert!(matches!(result, Err(Error::InvalidSphere { .. })));
    }
}
