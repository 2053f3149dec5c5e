//! Sphere and tangent-plane geometry shared by the projectors.
//!
//! Panorama pixels map linearly onto longitude `[0, 2pi]` and latitude
//! `[-pi/2, pi/2]` over an `(n - 1)` grid, so the first and last columns both
//! sit on the seam and row 0 is the `-pi/2` pole.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use nalgebra::Vector3;

use crate::error::{ProjectionError, Result};

/// Half-angle field of view of a rectilinear image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aperture {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Aperture {
    /// Both half-angles must lie strictly inside `(0, pi/2)`.
    pub fn new(horizontal: f64, vertical: f64) -> Result<Self> {
        for angle in [horizontal, vertical] {
            if !(angle > 0. && angle < FRAC_PI_2) {
                return Err(ProjectionError::ApertureOutOfRange(angle));
            }
        }
        Ok(Aperture {
            horizontal,
            vertical,
        })
    }

    /// Aperture subtended by a `win_w` x `win_h` crop of a `pan_w` x `pan_h` panorama.
    pub fn from_window(win_w: usize, win_h: usize, pan_w: usize, pan_h: usize) -> Result<Self> {
        Self::new(
            (win_w as f64 / pan_w as f64) * PI,
            (win_h as f64 / pan_h as f64) * FRAC_PI_2,
        )
    }

    pub fn tangents(&self) -> (f64, f64) {
        (self.horizontal.tan(), self.vertical.tan())
    }
}

#[inline]
pub fn panorama_angles(col: usize, row: usize, width: usize, height: usize) -> (f64, f64) {
    let lon = (col as f64 / (width - 1) as f64) * TAU;
    let lat = (row as f64 / (height - 1) as f64 - 0.5) * PI;
    (lon, lat)
}

#[inline]
pub fn angles_to_direction(lon: f64, lat: f64) -> Vector3<f64> {
    Vector3::new(lon.cos() * lat.cos(), lon.sin() * lat.cos(), lat.sin())
}

#[inline]
pub fn panorama_direction(col: usize, row: usize, width: usize, height: usize) -> Vector3<f64> {
    let (lon, lat) = panorama_angles(col, row, width, height);
    angles_to_direction(lon, lat)
}

/// Longitude in `[0, 2pi)` and latitude of a unit direction.
#[inline]
pub fn direction_to_angles(v: &Vector3<f64>) -> (f64, f64) {
    let mut lon = v.y.atan2(v.x);
    if lon < 0. {
        lon += TAU;
    }
    (lon, v.z.clamp(-1., 1.).asin())
}

#[inline]
pub fn angles_to_panorama(lon: f64, lat: f64, width: usize, height: usize) -> (f64, f64) {
    (
        (lon / TAU) * (width - 1) as f64,
        (lat / PI + 0.5) * (height - 1) as f64,
    )
}

/// Gnomonic projection of a camera-frame direction onto a `src_w` x `src_h` image.
///
/// `None` when the direction is not in front of the camera (`x <= 0`). The
/// result may still fall outside the image; see [`in_source_bounds`].
#[inline]
pub fn project_to_plane(
    local: &Vector3<f64>,
    tangents: (f64, f64),
    src_w: usize,
    src_h: usize,
) -> Option<(f64, f64)> {
    if local.x <= 0. {
        return None;
    }
    let ux = ((local.y / local.x / tangents.0 + 1.) / 2.) * (src_w as f64 - 1.);
    let uy = ((local.z / local.x / tangents.1 + 1.) / 2.) * (src_h as f64 - 1.);
    Some((ux, uy))
}

/// Tangent-plane coordinates of a tile pixel, scaled by the aperture tangents.
#[inline]
pub fn tile_plane_coords(
    col: usize,
    row: usize,
    width: usize,
    height: usize,
    tangents: (f64, f64),
) -> (f64, f64) {
    (
        (2. * col as f64 / (width - 1) as f64 - 1.) * tangents.0,
        (2. * row as f64 / (height - 1) as f64 - 1.) * tangents.1,
    )
}

/// Inverse gnomonic projection: the unit camera-frame direction through `(u, v)`.
#[inline]
pub fn lift_from_plane(u: f64, v: f64) -> Vector3<f64> {
    Vector3::new(1., u, v).normalize()
}

/// Forward domain: `[0, w) x [0, h)`.
#[inline]
pub fn in_source_bounds(x: f64, y: f64, width: usize, height: usize) -> bool {
    x >= 0. && x < width as f64 && y >= 0. && y < height as f64
}

/// Inverse domain: `(0, w - 1) x (0, h - 1)`, open on both ends.
#[inline]
pub fn in_window_bounds(x: f64, y: f64, width: usize, height: usize) -> bool {
    x > 0. && x < (width - 1) as f64 && y > 0. && y < (height - 1) as f64
}
