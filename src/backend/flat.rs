use crate::config::RenderConfig;
use crate::scene::Scene;

/// Uniform block read by every work item. Field order and padding match
/// `Header` in `trace.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FlatHeader {
    pub camera: [f32; 4],
    pub camera_unit: [f32; 4],
    pub plane: [[f32; 4]; 4],
    pub ambient: [f32; 4],
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub max_depth: u32,
    pub sphere_count: u32,
    pub light_count: u32,
    pub hit_epsilon: f32,
    pub _padding: u32,
}

/// Structure-of-arrays copy of a [`Scene`]: one array per attribute, indexed by
/// sphere or light. Every entry is a `vec4` so the arrays upload without
/// repacking.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatScene {
    pub header: FlatHeader,
    /// Center in `xyz`, radius in `w`.
    pub sphere_geometry: Vec<[f32; 4]>,
    pub sphere_color: Vec<[f32; 4]>,
    pub sphere_ambient: Vec<[f32; 4]>,
    pub sphere_diffuse: Vec<[f32; 4]>,
    pub sphere_specular: Vec<[f32; 4]>,
    /// Reflectivity in `xyz`, specular exponent in `w`.
    pub sphere_reflectivity: Vec<[f32; 4]>,
    pub light_position: Vec<[f32; 4]>,
    pub light_diffuse: Vec<[f32; 4]>,
    pub light_specular: Vec<[f32; 4]>,
}

fn vec4(v: impl Into<[f32; 3]>, w: f32) -> [f32; 4] {
    let [x, y, z] = v.into();
    [x, y, z, w]
}

impl FlatScene {
    pub fn new(scene: &Scene, config: &RenderConfig) -> Self {
        let header = FlatHeader {
            camera: vec4(scene.camera.eye, 1.0),
            camera_unit: vec4(scene.camera.unit_position(), 0.0),
            plane: scene.plane.corners().map(|corner| vec4(corner, 1.0)),
            ambient: vec4(scene.ambient_light_intensity.to_array(), 0.0),
            width: config.width,
            height: config.height,
            sample_count: config.samples_per_pixel(),
            max_depth: config.max_depth,
            sphere_count: scene.spheres.len() as u32,
            light_count: scene.lights.len() as u32,
            hit_epsilon: config.hit_epsilon,
            _padding: 0,
        };

        let spheres = &scene.spheres;
        let lights = &scene.lights;
        Self {
            header,
            sphere_geometry: spheres.iter().map(|s| vec4(s.center, s.radius())).collect(),
            sphere_color: spheres.iter().map(|s| vec4(s.color.to_array(), 0.0)).collect(),
            sphere_ambient: spheres
                .iter()
                .map(|s| vec4(s.material.ambient.to_array(), 0.0))
                .collect(),
            sphere_diffuse: spheres
                .iter()
                .map(|s| vec4(s.material.diffuse.to_array(), 0.0))
                .collect(),
            sphere_specular: spheres
                .iter()
                .map(|s| vec4(s.material.specular.to_array(), 0.0))
                .collect(),
            sphere_reflectivity: spheres
                .iter()
                .map(|s| vec4(s.material.reflectivity.to_array(), s.material.albedo))
                .collect(),
            light_position: lights.iter().map(|l| vec4(l.position, 1.0)).collect(),
            light_diffuse: lights.iter().map(|l| vec4(l.diffuse.to_array(), 0.0)).collect(),
            light_specular: lights
                .iter()
                .map(|l| vec4(l.specular.to_array(), 0.0))
                .collect(),
        }
    }

    /// Sphere arrays laid end to end: geometry, color, ambient, diffuse,
    /// specular, reflectivity. Never empty; a zero-sized binding is invalid, so an
    /// empty scene uploads one unused entry.
    pub fn sphere_table(&self) -> Vec<[f32; 4]> {
        concat_padded(&[
            &self.sphere_geometry,
            &self.sphere_color,
            &self.sphere_ambient,
            &self.sphere_diffuse,
            &self.sphere_specular,
            &self.sphere_reflectivity,
        ])
    }

    /// Light arrays laid end to end: position, diffuse, specular.
    pub fn light_table(&self) -> Vec<[f32; 4]> {
        concat_padded(&[&self.light_position, &self.light_diffuse, &self.light_specular])
    }

    pub fn work_items(&self) -> u64 {
        self.header.width as u64 * self.header.height as u64 * self.header.sample_count as u64
    }
}

fn concat_padded(sections: &[&Vec<[f32; 4]>]) -> Vec<[f32; 4]> {
    let mut table: Vec<[f32; 4]> = sections.iter().flat_map(|s| s.iter().copied()).collect();
    if table.is_empty() {
        table.push([0.0; 4]);
    }
    table
}
