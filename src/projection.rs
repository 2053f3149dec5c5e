//! Equirectangular <-> gnomonic reprojection.
//!
//! Every entry point iterates destination pixels, row-parallel, and writes
//! only pixels whose geometry passes the domain tests. Everything else keeps
//! its pre-call value, so callers seed the destination beforehand.

use rayon::prelude::*;
use tracing::debug;

use crate::buffer::{ImageView, ImageViewMut};
use crate::error::{ProjectionError, Result};
use crate::orientation::Orientation;
use crate::sampler::Sampler;
use crate::sphere::{self, Aperture};

/// Channels written per pixel; any further channels are left alone.
pub const COLOR_CHANNELS: usize = 3;

/// Geometry of a rectilinear source placed on the sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardParams {
    pub orientation: Orientation,
    pub aperture: Aperture,
}

/// Geometry of a panorama crop feeding a rectilinear tile.
///
/// The window buffer is the `window.width() x window.height()` crop whose
/// top-left corner sits at `(window_x, window_y)` in a `panorama_width x
/// panorama_height` panorama. The tile looks at panorama pixel
/// `(sensor_x, sensor_y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseParams {
    pub panorama_width: usize,
    pub panorama_height: usize,
    pub window_x: usize,
    pub window_y: usize,
    pub sensor_x: f64,
    pub sensor_y: f64,
}

fn require_grid(role: &'static str, width: usize, height: usize) -> Result<()> {
    if width < 2 || height < 2 {
        return Err(ProjectionError::GridTooSmall {
            role,
            width,
            height,
        });
    }
    Ok(())
}

/// Walks a panorama and hands `write` each pixel that lands on the source,
/// with its fractional source coordinate. Returns the number of pixels handed out.
fn for_each_visible<F>(
    dest: &mut ImageViewMut<'_>,
    src_w: usize,
    src_h: usize,
    params: &ForwardParams,
    write: F,
) -> usize
where
    F: Fn(&mut [u8], f64, f64) + Sync,
{
    let (width, height, stride) = (dest.width(), dest.height(), dest.stride());
    let to_camera = params.orientation.to_camera();
    let tangents = params.aperture.tangents();

    dest.par_rows_mut()
        .enumerate()
        .map(|(row, line)| {
            let mut written = 0usize;
            for (col, pixel) in line.chunks_exact_mut(stride).enumerate() {
                let local = to_camera * sphere::panorama_direction(col, row, width, height);
                let Some((ux, uy)) = sphere::project_to_plane(&local, tangents, src_w, src_h)
                else {
                    continue;
                };
                if sphere::in_source_bounds(ux, uy, src_w, src_h) {
                    write(pixel, ux, uy);
                    written += 1;
                }
            }
            written
        })
        .sum()
}

fn check_forward(dest: &ImageViewMut<'_>, src: &ImageView<'_>) -> Result<()> {
    dest.require_channels(COLOR_CHANNELS)?;
    src.require_channels(COLOR_CHANNELS)?;
    require_grid("panorama", dest.width(), dest.height())
}

/// Paints a rectilinear `src` onto the equirectangular `dest`.
///
/// Returns the number of panorama pixels overwritten.
pub fn project_forward<S>(
    dest: &mut ImageViewMut<'_>,
    src: &ImageView<'_>,
    params: &ForwardParams,
    sampler: &S,
) -> Result<usize>
where
    S: Sampler + ?Sized,
{
    check_forward(dest, src)?;
    debug!(
        pano = ?(dest.width(), dest.height()),
        src = ?(src.width(), src.height()),
        ?params,
        "forward projection"
    );

    let written = for_each_visible(dest, src.width(), src.height(), params, |pixel, ux, uy| {
        for (channel, value) in pixel[..COLOR_CHANNELS].iter_mut().enumerate() {
            *value = sampler.sample(src, channel, ux, uy);
        }
    });

    debug!(written, "forward projection done");
    Ok(written)
}

/// Like [`project_forward`], but mixes into the existing panorama pixel with the
/// weight `mask / 255`, looked up at the truncated source coordinate.
///
/// `mask` must have the source footprint; its channel 0 is read.
pub fn project_forward_blend<S>(
    dest: &mut ImageViewMut<'_>,
    src: &ImageView<'_>,
    mask: &ImageView<'_>,
    params: &ForwardParams,
    sampler: &S,
) -> Result<usize>
where
    S: Sampler + ?Sized,
{
    check_forward(dest, src)?;
    if (mask.width(), mask.height()) != (src.width(), src.height()) {
        return Err(ProjectionError::MaskMismatch {
            mask_width: mask.width(),
            mask_height: mask.height(),
            width: src.width(),
            height: src.height(),
        });
    }
    debug!(
        pano = ?(dest.width(), dest.height()),
        src = ?(src.width(), src.height()),
        ?params,
        "blended forward projection"
    );

    let written = for_each_visible(dest, src.width(), src.height(), params, |pixel, ux, uy| {
        let bf = f64::from(mask.get(ux.trunc() as usize, uy.trunc() as usize, 0)) / 255.;
        for (channel, value) in pixel[..COLOR_CHANNELS].iter_mut().enumerate() {
            let sampled = f64::from(sampler.sample(src, channel, ux, uy));
            *value = (f64::from(*value) * (1. - bf) + sampled * bf) as u8;
        }
    });

    debug!(written, "blended forward projection done");
    Ok(written)
}

/// Renders the rectilinear tile seen from `params.sensor_*` out of a panorama crop.
///
/// The tile's aperture follows from the crop's share of the full panorama.
/// Returns the number of tile pixels written.
pub fn project_inverse<S>(
    dest: &mut ImageViewMut<'_>,
    window: &ImageView<'_>,
    params: &InverseParams,
    sampler: &S,
) -> Result<usize>
where
    S: Sampler + ?Sized,
{
    dest.require_channels(COLOR_CHANNELS)?;
    window.require_channels(COLOR_CHANNELS)?;
    require_grid("tile", dest.width(), dest.height())?;
    require_grid("panorama", params.panorama_width, params.panorama_height)?;

    let (pan_w, pan_h) = (params.panorama_width, params.panorama_height);
    let (win_w, win_h) = (window.width(), window.height());
    let orientation =
        Orientation::from_panorama_pixel(params.sensor_x, params.sensor_y, pan_w, pan_h);
    let aperture = Aperture::from_window(win_w, win_h, pan_w, pan_h)?;
    debug!(
        tile = ?(dest.width(), dest.height()),
        window = ?(win_w, win_h),
        ?params,
        ?orientation,
        ?aperture,
        "inverse projection"
    );

    let (width, height, stride) = (dest.width(), dest.height(), dest.stride());
    let to_panorama = orientation.to_panorama();
    let tangents = aperture.tangents();
    let (off_x, off_y) = (params.window_x as f64, params.window_y as f64);

    let written: usize = dest
        .par_rows_mut()
        .enumerate()
        .map(|(row, line)| {
            let mut written = 0usize;
            for (col, pixel) in line.chunks_exact_mut(stride).enumerate() {
                let (u, v) = sphere::tile_plane_coords(col, row, width, height, tangents);
                let global = to_panorama * sphere::lift_from_plane(u, v);
                let (lon, lat) = sphere::direction_to_angles(&global);
                let (px, py) = sphere::angles_to_panorama(lon, lat, pan_w, pan_h);
                let (dx, dy) = (px - off_x, py - off_y);
                if !sphere::in_window_bounds(dx, dy, win_w, win_h) {
                    continue;
                }
                for (channel, value) in pixel[..COLOR_CHANNELS].iter_mut().enumerate() {
                    *value = sampler.sample(window, channel, dx, dy);
                }
                written += 1;
            }
            written
        })
        .sum();

    debug!(written, "inverse projection done");
    Ok(written)
}
