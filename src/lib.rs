//! # gnomonic
//!
//! Pixel-accurate resampling between equirectangular panoramas and gnomonic
//! (rectilinear) images.
//!
//! - [`project_forward`] paints a rectilinear image taken at a known yaw/pitch
//!   into a panorama.
//! - [`project_forward_blend`] does the same through an alpha mask, mixing into
//!   what the panorama already holds.
//! - [`project_inverse`] renders the rectilinear tile seen in a direction from a
//!   crop of a panorama.
//!
//! Buffers are caller-owned and borrowed through [`ImageView`] / [`ImageViewMut`];
//! interpolation is any [`Sampler`], such as [`Interpolation::Bilinear`].
//!
//! ```no_run
//! use gnomonic::{project_forward, Aperture, ForwardParams, ImageView, ImageViewMut,
//!     Interpolation, Orientation};
//!
//! let photo = image::open("photo.jpg").unwrap().to_rgb8();
//! let mut pano = image::RgbImage::new(4096, 2048);
//! let params = ForwardParams {
//!     orientation: Orientation::new(1.2, -0.1),
//!     aperture: Aperture::new(0.6, 0.45).unwrap(),
//! };
//! project_forward(
//!     &mut ImageViewMut::from_image(&mut pano).unwrap(),
//!     &ImageView::from_image(&photo).unwrap(),
//!     &params,
//!     &Interpolation::Bicubic,
//! )
//! .unwrap();
//! ```

pub mod buffer;
pub mod error;
pub mod orientation;
pub mod projection;
pub mod sampler;
pub mod sphere;

pub use buffer::{ImageView, ImageViewMut};
pub use error::{ProjectionError, Result};
pub use orientation::Orientation;
pub use projection::{
    project_forward, project_forward_blend, project_inverse, ForwardParams, InverseParams,
    COLOR_CHANNELS,
};
pub use sampler::{Interpolation, Sampler};
pub use sphere::Aperture;
