use serde::{Deserialize, Serialize};

/// Errors raised when a raster buffer does not match its declared shape.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image buffer length (expected {expected} samples, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
}

/// Borrowed row-major f32 raster.
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [f32], // row-major, len = w*h
}

/// Owned row-major f32 raster. Raw strips, framelet copies and photometric
/// working buffers all use this type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StripImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl StripImage {
    /// Wrap an existing buffer, checking that it matches `width * height`.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, ImageError> {
        let expected = width
            .checked_mul(height)
            .ok_or(ImageError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn zeros(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0.0)
    }

    #[inline]
    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.view().get(x, y)
    }

    /// Largest finite sample, or `None` for an empty or all-NaN image.
    pub fn max_value(&self) -> Option<f32> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f32| m.max(v))))
    }
}

impl<'a> ImageView<'a> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    #[inline]
    pub fn row(&self, y: usize) -> Option<&'a [f32]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// View of the rows `[start, start + count)`.
    ///
    /// Returns `None` if the range leaves the image.
    pub fn rows(&self, start: usize, count: usize) -> Option<ImageView<'a>> {
        let end = start.checked_add(count)?;
        if end > self.height {
            return None;
        }
        Some(ImageView {
            width: self.width,
            height: count,
            data: &self.data[start * self.width..end * self.width],
        })
    }

    /// Copy the viewed samples into an owned raster.
    pub fn to_owned_image(&self) -> StripImage {
        StripImage {
            width: self.width,
            height: self.height,
            data: self.data.to_vec(),
        }
    }
}
