//! Binding strategy: reconciling a read destination's prior type
//! information against the header-declared type.
//!
//! A destination comes in three shapes:
//!
//! 1. [`DetectTarget`] — type-erased and unallocated; whatever the codec
//!    declares is accepted.
//! 2. [`Strict`] — a pre-allocated image behind the abstract capability;
//!    both dimensionality and pixel type must match the header exactly.
//! 3. [`TypedImage`] — a concrete typed image; dimensionality must match
//!    strictly, a pixel-type mismatch decodes into a freshly instantiated
//!    image of the declared type and then stops with
//!    [`Error::ConversionNotImplemented`], since value conversion back into
//!    the typed destination is deliberately not implemented. Bytes are
//!    never reinterpreted.
//!
//! On success every variant guarantees the destination's shape equals the
//! header-declared shape and its format tag is the registered codec's
//! identity.

use crate::codec::ImageCodec;
use crate::error::{Error, Result};
use crate::image::{Image, TypedImage};
use crate::pixel::Pixel;

/// Decode callback handed to a target by the orchestrator. Runs the
/// selected codec's payload decode against the live stream.
pub type DecodeFn<'a> = dyn FnMut(&mut dyn Image) -> Result<()> + 'a;

/// A destination for a read operation.
///
/// Implemented for the three destination shapes; `codec` is the cloned
/// descriptor whose header has already been parsed, `identity` the
/// registered descriptor's identity to tag the destination with.
pub trait ReadTarget {
    /// Validate the destination against the header, allocate or resize as
    /// the variant dictates, run `decode`, and tag the destination.
    fn apply(
        &mut self,
        codec: &dyn ImageCodec,
        identity: &'static str,
        decode: &mut DecodeFn<'_>,
    ) -> Result<()>;
}

/// Type-erased, unallocated destination (binding variant 1).
#[derive(Default)]
pub struct DetectTarget {
    image: Option<Box<dyn Image>>,
}

impl DetectTarget {
    /// Create an empty target.
    pub fn new() -> Self {
        Self::default()
    }

    /// The decoded image, if a read succeeded.
    pub fn into_image(self) -> Option<Box<dyn Image>> {
        self.image
    }
}

impl ReadTarget for DetectTarget {
    fn apply(
        &mut self,
        codec: &dyn ImageCodec,
        identity: &'static str,
        decode: &mut DecodeFn<'_>,
    ) -> Result<()> {
        let mut image = codec.instantiate()?;
        image.resize(&codec.declared_shape()?)?;
        decode(image.as_mut())?;
        image.set_format_tag(identity);
        self.image = Some(image);
        Ok(())
    }
}

/// Strict pre-allocated destination (binding variant 2).
///
/// Dimension and pixel type must both match the header exactly; nothing is
/// allocated on a mismatch.
pub struct Strict<'a>(
    /// The pre-allocated destination image.
    pub &'a mut dyn Image,
);

impl ReadTarget for Strict<'_> {
    fn apply(
        &mut self,
        codec: &dyn ImageCodec,
        identity: &'static str,
        decode: &mut DecodeFn<'_>,
    ) -> Result<()> {
        let declared_dimension = codec.declared_dimension()?;
        if self.0.dimension() != declared_dimension {
            return Err(Error::BadDimension {
                expected: self.0.dimension(),
                declared: declared_dimension,
            });
        }
        let declared_type = codec.declared_pixel_type()?;
        if self.0.pixel_type() != declared_type {
            return Err(Error::MismatchedPixelType {
                expected: self.0.pixel_type(),
                declared: declared_type,
            });
        }
        self.0.resize(&codec.declared_shape()?)?;
        decode(&mut *self.0)?;
        self.0.set_format_tag(identity);
        Ok(())
    }
}

/// Tolerant typed destination (binding variant 3).
impl<P: Pixel, const D: usize> ReadTarget for TypedImage<P, D> {
    fn apply(
        &mut self,
        codec: &dyn ImageCodec,
        identity: &'static str,
        decode: &mut DecodeFn<'_>,
    ) -> Result<()> {
        let declared_dimension = codec.declared_dimension()?;
        if D != declared_dimension {
            return Err(Error::BadDimension {
                expected: D,
                declared: declared_dimension,
            });
        }
        let declared_type = codec.declared_pixel_type()?;
        if declared_type == P::PIXEL_TYPE {
            self.resize(&codec.declared_shape()?)?;
            decode(self)?;
            self.set_format_tag(identity);
            return Ok(());
        }

        // The declared type wins: decode into a substitute image of the
        // declared type, leaving the stream at the same position as the
        // success path. Converting its values into the typed destination
        // is the unimplemented part.
        let mut substitute = codec.instantiate()?;
        substitute.resize(&codec.declared_shape()?)?;
        decode(substitute.as_mut())?;
        Err(Error::ConversionNotImplemented {
            expected: P::PIXEL_TYPE,
            declared: declared_type,
        })
    }
}
