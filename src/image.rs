//! Image value types.
//!
//! The I/O core manipulates images only through the object-safe [`Image`]
//! capability; [`TypedImage`] is the concrete representation, one
//! instantiation per pixel-type × dimensionality pair. Its pixel type and
//! dimensionality are fixed at construction, which is exactly the tension
//! the binding strategy in [`crate::binding`] resolves against runtime
//! codec selection.

use std::any::Any;

use crate::error::{Error, Result};
use crate::pixel::{Pixel, PixelType};

/// Abstract image capability consumed by the I/O core.
pub trait Image: Send {
    /// Identity of the sample scalar type.
    fn pixel_type(&self) -> PixelType;

    /// Number of axes.
    fn dimension(&self) -> usize;

    /// Per-axis extents. Empty until the first [`Image::resize`].
    fn shape(&self) -> &[usize];

    /// Total number of samples.
    fn len(&self) -> usize;

    /// Whether the image holds no samples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resize the sample storage to the given per-axis extents.
    ///
    /// The number of extents must equal [`Image::dimension`], otherwise
    /// [`Error::BadSizeSpecification`] is returned and the storage is left
    /// untouched. New samples are zero-initialized.
    fn resize(&mut self, shape: &[usize]) -> Result<()>;

    /// Sample storage as raw bytes in host byte order.
    fn as_bytes(&self) -> &[u8];

    /// Mutable sample storage as raw bytes in host byte order.
    fn as_bytes_mut(&mut self) -> &mut [u8];

    /// Reverse the byte order of every sample in place.
    fn swap_byte_order(&mut self);

    /// Identity of the codec that last produced or validated this image.
    fn format_tag(&self) -> Option<&'static str>;

    /// Record the producing codec's identity.
    fn set_format_tag(&mut self, identity: &'static str);

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Concrete image with pixel type `P` and dimensionality `D`.
#[derive(Debug, Clone)]
pub struct TypedImage<P: Pixel, const D: usize> {
    shape: [usize; D],
    data: Vec<P>,
    format: Option<&'static str>,
}

/// One-dimensional image.
pub type Image1D<P> = TypedImage<P, 1>;
/// Two-dimensional image.
pub type Image2D<P> = TypedImage<P, 2>;
/// Three-dimensional image.
pub type Image3D<P> = TypedImage<P, 3>;
/// Four-dimensional image.
pub type Image4D<P> = TypedImage<P, 4>;

impl<P: Pixel, const D: usize> TypedImage<P, D> {
    /// Create an empty image with all extents zero.
    pub fn new() -> Self {
        Self {
            shape: [0; D],
            data: Vec::new(),
            format: None,
        }
    }

    /// Create an image with the given extents, zero-filled.
    pub fn with_shape(shape: [usize; D]) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![P::default(); len],
            format: None,
        }
    }

    /// Sample storage.
    pub fn data(&self) -> &[P] {
        &self.data
    }

    /// Mutable sample storage.
    pub fn data_mut(&mut self) -> &mut [P] {
        &mut self.data
    }

    /// Sample at a multi-axis index, row-major with axis 0 fastest.
    pub fn get(&self, index: [usize; D]) -> Option<P> {
        self.data.get(self.offset(index)?).copied()
    }

    /// Store a sample at a multi-axis index.
    pub fn put(&mut self, index: [usize; D], value: P) -> Result<()> {
        let offset = self
            .offset(index)
            .ok_or_else(|| Error::internal("index out of bounds"))?;
        self.data[offset] = value;
        Ok(())
    }

    fn offset(&self, index: [usize; D]) -> Option<usize> {
        let mut offset = 0;
        let mut stride = 1;
        for axis in 0..D {
            if index[axis] >= self.shape[axis] {
                return None;
            }
            offset += index[axis] * stride;
            stride *= self.shape[axis];
        }
        Some(offset)
    }
}

impl<P: Pixel, const D: usize> Default for TypedImage<P, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pixel, const D: usize> Image for TypedImage<P, D> {
    fn pixel_type(&self) -> PixelType {
        P::PIXEL_TYPE
    }

    fn dimension(&self) -> usize {
        D
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn resize(&mut self, shape: &[usize]) -> Result<()> {
        if shape.len() != D {
            return Err(Error::BadSizeSpecification {
                expected: D,
                got: shape.len(),
            });
        }
        self.shape.copy_from_slice(shape);
        let len = self.shape.iter().product();
        self.data.resize(len, P::default());
        Ok(())
    }

    fn as_bytes(&self) -> &[u8] {
        // Sound per the Pixel safety contract: P is a padding-free scalar.
        unsafe {
            std::slice::from_raw_parts(
                self.data.as_ptr().cast::<u8>(),
                self.data.len() * std::mem::size_of::<P>(),
            )
        }
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        unsafe {
            std::slice::from_raw_parts_mut(
                self.data.as_mut_ptr().cast::<u8>(),
                self.data.len() * std::mem::size_of::<P>(),
            )
        }
    }

    fn swap_byte_order(&mut self) {
        for sample in &mut self.data {
            *sample = sample.swap_bytes();
        }
    }

    fn format_tag(&self) -> Option<&'static str> {
        self.format
    }

    fn set_format_tag(&mut self, identity: &'static str) {
        self.format = Some(identity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
