//! Per-channel interpolation at fractional pixel coordinates.

use crate::buffer::ImageView;

/// Estimates one channel of `image` at `(x, y)`.
///
/// The projectors only call this with `x` in `[0, width)` and `y` in `[0, height)`,
/// so implementations must tolerate the last fractional column and row.
pub trait Sampler: Sync {
    fn sample(&self, image: &ImageView<'_>, channel: usize, x: f64, y: f64) -> u8;
}

impl<F> Sampler for F
where
    F: Fn(&ImageView<'_>, usize, f64, f64) -> u8 + Sync,
{
    fn sample(&self, image: &ImageView<'_>, channel: usize, x: f64, y: f64) -> u8 {
        self(image, channel, x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
}

impl Interpolation {
    pub const ALL: [Interpolation; 3] = [
        Interpolation::Nearest,
        Interpolation::Bilinear,
        Interpolation::Bicubic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Interpolation::Nearest => "Nearest",
            Interpolation::Bilinear => "Bilinear",
            Interpolation::Bicubic => "Bicubic",
        }
    }
}

impl Sampler for Interpolation {
    fn sample(&self, image: &ImageView<'_>, channel: usize, x: f64, y: f64) -> u8 {
        match self {
            Interpolation::Nearest => nearest(image, channel, x, y),
            Interpolation::Bilinear => bilinear(image, channel, x, y),
            Interpolation::Bicubic => bicubic(image, channel, x, y),
        }
    }
}

#[inline]
fn clamp_index(v: f64, len: usize) -> usize {
    (v.max(0.) as usize).min(len - 1)
}

#[inline]
fn to_byte(v: f64) -> u8 {
    v.round().clamp(0., 255.) as u8
}

pub fn nearest(img: &ImageView<'_>, channel: usize, x: f64, y: f64) -> u8 {
    let col = clamp_index(x.round(), img.width());
    let row = clamp_index(y.round(), img.height());
    img.get(col, row, channel)
}

pub fn bilinear(img: &ImageView<'_>, channel: usize, x: f64, y: f64) -> u8 {
    let (width, height) = (img.width(), img.height());
    let x1 = clamp_index(x, width);
    let y1 = clamp_index(y, height);
    let x2 = (x1 + 1).min(width - 1);
    let y2 = (y1 + 1).min(height - 1);
    let fx = (x - x1 as f64).clamp(0., 1.);
    let fy = (y - y1 as f64).clamp(0., 1.);

    let q = |col, row| f64::from(img.get(col, row, channel));
    let r1 = q(x1, y1) * (1. - fx) + q(x2, y1) * fx;
    let r2 = q(x1, y2) * (1. - fx) + q(x2, y2) * fx;
    to_byte(r1 * (1. - fy) + r2 * fy)
}

/// Keys cubic convolution kernel, a = -0.5.
fn cubic_weight(t: f64) -> f64 {
    let t = t.abs();
    if t <= 1. {
        (1.5 * t - 2.5) * t * t + 1.
    } else if t < 2. {
        ((-0.5 * t + 2.5) * t - 4.) * t + 2.
    } else {
        0.
    }
}

pub fn bicubic(img: &ImageView<'_>, channel: usize, x: f64, y: f64) -> u8 {
    let (width, height) = (img.width() as isize, img.height() as isize);
    let x0 = x.floor();
    let y0 = y.floor();
    let (fx, fy) = (x - x0, y - y0);

    let mut acc = 0.;
    for m in -1..=2isize {
        let row = (y0 as isize + m).clamp(0, height - 1) as usize;
        let wy = cubic_weight(fy - m as f64);
        for n in -1..=2isize {
            let col = (x0 as isize + n).clamp(0, width - 1) as usize;
            acc += f64::from(img.get(col, row, channel)) * cubic_weight(fx - n as f64) * wy;
        }
    }
    to_byte(acc)
}
