use std::f64::consts::{PI, TAU};

use nalgebra::{Rotation3, Vector3};

/// Viewing direction on the panorama sphere, in radians.
///
/// `yaw` is conventionally in `[0, 2pi)` and `pitch` in `[-pi/2, pi/2]`; other
/// values are accepted as-is. A camera at `(yaw, pitch)` looks at longitude
/// `yaw`, latitude `-pitch`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub yaw: f64,
    pub pitch: f64,
}

impl Orientation {
    pub fn new(yaw: f64, pitch: f64) -> Self {
        Orientation { yaw, pitch }
    }

    /// Orientation pointing at a pixel of a `pan_w` x `pan_h` equirectangular image.
    pub fn from_panorama_pixel(x: f64, y: f64, pan_w: usize, pan_h: usize) -> Self {
        Orientation {
            yaw: (x / pan_w as f64) * TAU,
            pitch: (0.5 - y / pan_h as f64) * PI,
        }
    }

    /// Rotation about the polar axis by `-yaw`.
    pub fn yaw_rotation(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::z_axis(), -self.yaw)
    }

    /// Rotation about the transverse axis by `-pitch`.
    pub fn pitch_rotation(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::y_axis(), -self.pitch)
    }

    /// Panorama frame to camera frame. Yaw is applied first, then pitch.
    pub fn to_camera(&self) -> Rotation3<f64> {
        self.pitch_rotation() * self.yaw_rotation()
    }

    /// Camera frame to panorama frame: pitch by `+pitch`, then yaw by `+yaw`.
    pub fn to_panorama(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::z_axis(), self.yaw)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.pitch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direction(lon: f64, lat: f64) -> Vector3<f64> {
        Vector3::new(lon.cos() * lat.cos(), lon.sin() * lat.cos(), lat.sin())
    }

    #[test]
    fn test_camera_axis_points_at_yaw_and_negated_pitch() {
        for &(yaw, pitch) in &[(0.0, 0.0), (1.2, 0.3), (4.0, -0.9), (PI, 1.4)] {
            let o = Orientation::new(yaw, pitch);
            let local = o.to_camera() * direction(yaw, -pitch);
            assert!((local - Vector3::x()).norm() < 1e-12, "{yaw} {pitch}: {local}");
        }
    }

    #[test]
    fn test_to_panorama_inverts_to_camera() {
        let o = Orientation::new(2.1, -0.4);
        let v = direction(0.7, 0.2);
        let back = o.to_panorama() * (o.to_camera() * v);
        assert!((back - v).norm() < 1e-12);
    }

    #[test]
    fn test_composition_order_matters() {
        let o = Orientation::new(1.0, 0.6);
        let swapped = o.yaw_rotation() * o.pitch_rotation();
        let v = direction(0.3, 0.5);
        assert!((swapped * v - o.to_camera() * v).norm() > 1e-3);
    }

    #[test]
    fn test_from_panorama_pixel() {
        let o = Orientation::from_panorama_pixel(360., 180., 720, 360);
        assert!((o.yaw - PI).abs() < 1e-12);
        assert!(o.pitch.abs() < 1e-12);

        let top = Orientation::from_panorama_pixel(0., 0., 720, 360);
        assert!((top.pitch - PI / 2.).abs() < 1e-12);
    }
}
