//! Camera to view-vector conversion
//!
//! The camera looks down its local -Z axis with +Y up. Orientation is used
//! as given; a non-orthonormal matrix yields non-unit vectors.

use glam::{DMat3, DVec3, EulerRot};
use std::fmt;

/// Camera position and orientation in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: DVec3,
    pub orientation: DMat3,
}

impl CameraPose {
    pub fn new(position: DVec3, orientation: DMat3) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// From Euler angles in radians, applied X then Y then Z about the world axes
    pub fn from_euler(position: DVec3, rotation: DVec3) -> Self {
        let orientation = DMat3::from_euler(EulerRot::ZYX, rotation.z, rotation.y, rotation.x);
        Self::new(position, orientation)
    }
}

/// View point, direction and up vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewVectors {
    pub position: DVec3,
    pub direction: DVec3,
    pub up: DVec3,
}

impl ViewVectors {
    /// View options: `-vtv -vp x y z -vd dx dy dz -vu ux uy uz`
    pub fn options(&self) -> String {
        let (p, d, u) = (self.position, self.direction, self.up);
        format!(
            "-vtv -vp {} {} {} -vd {} {} {} -vu {} {} {}",
            p.x, p.y, p.z, d.x, d.y, d.z, u.x, u.y, u.z
        )
    }

    /// A view file line, prefixed with the program name view files carry
    pub fn view_file_line(&self) -> String {
        format!("rvu {}", self.options())
    }
}

impl fmt::Display for ViewVectors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.options())
    }
}

/// Derive the view vectors of a camera
pub fn compute_view(camera: &CameraPose) -> ViewVectors {
    ViewVectors {
        position: camera.position,
        direction: camera.orientation * DVec3::NEG_Z,
        up: camera.orientation * DVec3::Y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn assert_vec(a: DVec3, b: DVec3) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-12);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-12);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_orientation() {
        let view = compute_view(&CameraPose::new(DVec3::new(1.0, 2.0, 3.0), DMat3::IDENTITY));
        assert_vec(view.up, DVec3::Y);
        assert_vec(view.direction, DVec3::NEG_Z);
        assert_eq!(view.position, DVec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_upright_camera_looks_along_y() {
        // Rotated 90 degrees about X: looking horizontally, Z up
        let pose = CameraPose::from_euler(DVec3::ZERO, DVec3::new(FRAC_PI_2, 0.0, 0.0));
        let view = compute_view(&pose);
        assert_vec(view.direction, DVec3::Y);
        assert_vec(view.up, DVec3::Z);
    }

    #[test]
    fn test_euler_order_x_then_z() {
        // X by 90 then Z by 90: the horizontal view swings from +Y to -X
        let pose = CameraPose::from_euler(DVec3::ZERO, DVec3::new(FRAC_PI_2, 0.0, FRAC_PI_2));
        let view = compute_view(&pose);
        assert_vec(view.direction, DVec3::NEG_X);
        assert_vec(view.up, DVec3::Z);
    }

    #[test]
    fn test_no_renormalization() {
        let pose = CameraPose::new(DVec3::ZERO, DMat3::from_diagonal(DVec3::splat(2.0)));
        let view = compute_view(&pose);
        assert_vec(view.up, DVec3::new(0.0, 2.0, 0.0));
        assert_vec(view.direction, DVec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_options_format() {
        let view = compute_view(&CameraPose::new(DVec3::new(1.5, -2.0, 0.0), DMat3::IDENTITY));
        assert_eq!(
            view.options(),
            "-vtv -vp 1.5 -2 0 -vd 0 0 -1 -vu 0 1 0"
        );
        assert_eq!(view.view_file_line(), format!("rvu {}", view));
    }
}
