use winit::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

use crate::scene::Scene;

/// Eye point every primary ray is cast from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera {
    pub eye: glam::Vec3,
}

impl Camera {
    pub fn new(eye: glam::Vec3) -> Self {
        Self { eye }
    }

    /// Unit direction of the eye position seen from the world origin, or zero
    /// when the eye sits on the origin.
    pub fn unit_position(&self) -> glam::Vec3 {
        self.eye.normalize_or_zero()
    }
}

/// Translates the view in response to keyboard input between frames.
pub struct CameraController {
    pub speed: f32,
}

impl CameraController {
    pub const SPEED: f32 = 1.0;

    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    pub fn offset_for(&self, keycode: VirtualKeyCode) -> Option<glam::Vec3> {
        let direction = match keycode {
            VirtualKeyCode::W => glam::Vec3::Z,
            VirtualKeyCode::S => glam::Vec3::NEG_Z,
            VirtualKeyCode::A => glam::Vec3::X,
            VirtualKeyCode::D => glam::Vec3::NEG_X,
            VirtualKeyCode::Space => glam::Vec3::NEG_Y,
            VirtualKeyCode::LShift => glam::Vec3::Y,
            _ => return None,
        };
        Some(direction * self.speed)
    }

    pub fn process_events(&self, scene: &mut Scene, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(keycode),
                        ..
                    },
                ..
            } => match self.offset_for(*keycode) {
                Some(offset) => {
                    scene.translate_view(offset);
                    tracing::debug!(?keycode, eye = ?scene.camera.eye, "camera moved");
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(Self::SPEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_position_of_origin_is_zero() {
        assert_eq!(Camera::default().unit_position(), glam::Vec3::ZERO);
        let camera = Camera::new(glam::Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(camera.unit_position(), glam::Vec3::NEG_Z);
    }

    #[test]
    fn keys_map_to_view_offsets() {
        let controller = CameraController::default();
        assert_eq!(controller.offset_for(VirtualKeyCode::W), Some(glam::Vec3::Z));
        assert_eq!(controller.offset_for(VirtualKeyCode::D), Some(glam::Vec3::NEG_X));
        assert_eq!(controller.offset_for(VirtualKeyCode::Space), Some(glam::Vec3::NEG_Y));
        assert_eq!(controller.offset_for(VirtualKeyCode::Q), None);

        let mut scene = Scene::default();
        let offset = controller.offset_for(VirtualKeyCode::LShift).unwrap();
        scene.translate_view(offset);
        assert_eq!(scene.camera.eye, glam::Vec3::Y);
    }
}
