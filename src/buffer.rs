//! Borrowed views over caller-owned, row-major, channel-interleaved pixels.
//!
//! Byte offset of `(col, row, channel)` is `stride * (width * row + col) + channel`.
//! Bytes past `width * height * stride` are never touched.

use image::{ImageBuffer, Pixel};
use rayon::prelude::*;

use crate::error::{ProjectionError, Result};

fn required_len(width: usize, height: usize, stride: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(ProjectionError::EmptyImage { width, height });
    }
    if stride == 0 {
        return Err(ProjectionError::StrideTooSmall {
            stride,
            required: 1,
        });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(stride))
        .ok_or(ProjectionError::SizeOverflow {
            width,
            height,
            stride,
        })
}

fn check_layout(len: usize, width: usize, height: usize, stride: usize) -> Result<usize> {
    let required = required_len(width, height, stride)?;
    if len < required {
        return Err(ProjectionError::BufferTooSmall {
            required,
            actual: len,
        });
    }
    Ok(required)
}

#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> ImageView<'a> {
    pub fn new(data: &'a [u8], width: usize, height: usize, stride: usize) -> Result<Self> {
        let required = check_layout(data.len(), width, height, stride)?;
        Ok(ImageView {
            data: &data[..required],
            width,
            height,
            stride,
        })
    }

    /// Views an `image` buffer; the stride is the pixel type's channel count.
    pub fn from_image<P>(img: &'a ImageBuffer<P, Vec<u8>>) -> Result<Self>
    where
        P: Pixel<Subpixel = u8>,
    {
        Self::new(
            img.as_raw(),
            img.width() as usize,
            img.height() as usize,
            P::CHANNEL_COUNT as usize,
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize, channel: usize) -> u8 {
        self.data[self.stride * (self.width * row + col) + channel]
    }

    pub(crate) fn require_channels(&self, required: usize) -> Result<()> {
        require_channels(self.stride, required)
    }
}

#[derive(Debug)]
pub struct ImageViewMut<'a> {
    data: &'a mut [u8],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> ImageViewMut<'a> {
    pub fn new(data: &'a mut [u8], width: usize, height: usize, stride: usize) -> Result<Self> {
        let required = check_layout(data.len(), width, height, stride)?;
        Ok(ImageViewMut {
            data: &mut data[..required],
            width,
            height,
            stride,
        })
    }

    pub fn from_image<P>(img: &'a mut ImageBuffer<P, Vec<u8>>) -> Result<Self>
    where
        P: Pixel<Subpixel = u8>,
    {
        let (width, height) = img.dimensions();
        Self::new(
            &mut **img,
            width as usize,
            height as usize,
            P::CHANNEL_COUNT as usize,
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn as_view(&self) -> ImageView<'_> {
        ImageView {
            data: &*self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }

    pub(crate) fn require_channels(&self, required: usize) -> Result<()> {
        require_channels(self.stride, required)
    }

    /// Rows as disjoint mutable slices, one per rayon task.
    pub(crate) fn par_rows_mut(&mut self) -> rayon::slice::ChunksMut<'_, u8> {
        let row_len = self.width * self.stride;
        self.data.par_chunks_mut(row_len)
    }
}

fn require_channels(stride: usize, required: usize) -> Result<()> {
    if stride < required {
        return Err(ProjectionError::StrideTooSmall { stride, required });
    }
    Ok(())
}
