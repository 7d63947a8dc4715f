//! Inrimage codec.
//!
//! The richest bundled format: dimensionality 1 to 4, all ten scalar pixel
//! types, and explicit byte-order declaration in the header (`CPU=` key).
//! Payloads are raw samples; decode swaps byte order in place when the
//! producer's endianness differs from the host's.

mod header;

use std::io::{Read, Write};

use tracing::trace;

use crate::codec::ImageCodec;
use crate::error::{Error, Result};
use crate::image::{Image, TypedImage};
use crate::pixel::PixelType;

use header::InrHeader;

/// Inrimage reader/writer.
#[derive(Debug, Clone, Default)]
pub struct InrCodec {
    header: Option<InrHeader>,
}

impl InrCodec {
    /// Create a codec with no parsed header.
    pub fn new() -> Self {
        Self::default()
    }

    fn header(&self) -> Result<&InrHeader> {
        self.header
            .as_ref()
            .ok_or_else(|| Error::internal("inr header accessed before parse"))
    }
}

impl ImageCodec for InrCodec {
    fn identity(&self) -> &'static str {
        "inr"
    }

    fn known_suffixes(&self) -> &'static [&'static str] {
        &["inr"]
    }

    fn known_from_prefix(&self, prefix: &[u8]) -> bool {
        prefix.starts_with(header::MAGIC)
    }

    fn known_for_image(&self, image: &dyn Image) -> bool {
        // A zero extent would encode a header our own parser rejects.
        (1..=4).contains(&image.dimension())
            && image.shape().iter().all(|&extent| extent > 0)
    }

    fn parse_header(&mut self, reader: &mut dyn Read) -> Result<()> {
        let header = InrHeader::parse(reader)?;
        trace!(
            extents = ?header.extents,
            pixel_type = %header.pixel_type,
            "inr header parsed"
        );
        self.header = Some(header);
        Ok(())
    }

    fn declared_pixel_type(&self) -> Result<PixelType> {
        Ok(self.header()?.pixel_type)
    }

    fn declared_dimension(&self) -> Result<usize> {
        Ok(self.header()?.dimension())
    }

    fn declared_shape(&self) -> Result<Vec<usize>> {
        Ok(self.header()?.shape())
    }

    fn instantiate(&self) -> Result<Box<dyn Image>> {
        let header = self.header()?;
        new_image(header.dimension(), header.pixel_type)
    }

    fn decode(&self, reader: &mut dyn Read, image: &mut dyn Image) -> Result<()> {
        let header = self.header()?;
        reader.read_exact(image.as_bytes_mut())?;
        if !header.endianness.is_native() {
            image.swap_byte_order();
        }
        Ok(())
    }

    fn encode(&self, writer: &mut dyn Write, image: &dyn Image) -> Result<()> {
        let dimension = image.dimension();
        if !(1..=4).contains(&dimension) {
            return Err(Error::UnknownDimension { dimension });
        }
        let mut extents = [1usize; 4];
        extents[..dimension].copy_from_slice(image.shape());
        let header = InrHeader {
            extents,
            pixel_type: image.pixel_type(),
            endianness: crate::pixel::Endianness::native(),
        };
        writer.write_all(&header.render())?;
        writer.write_all(image.as_bytes())?;
        Ok(())
    }

    fn clone_codec(&self) -> Box<dyn ImageCodec> {
        Box::new(self.clone())
    }
}

/// Allocate an empty image for a (dimension, pixel type) pair.
fn new_image(dimension: usize, pixel_type: PixelType) -> Result<Box<dyn Image>> {
    match dimension {
        1 => Ok(new_typed::<1>(pixel_type)),
        2 => Ok(new_typed::<2>(pixel_type)),
        3 => Ok(new_typed::<3>(pixel_type)),
        4 => Ok(new_typed::<4>(pixel_type)),
        dimension => Err(Error::UnknownDimension { dimension }),
    }
}

fn new_typed<const D: usize>(pixel_type: PixelType) -> Box<dyn Image> {
    match pixel_type {
        PixelType::U8 => Box::new(TypedImage::<u8, D>::new()),
        PixelType::I8 => Box::new(TypedImage::<i8, D>::new()),
        PixelType::U16 => Box::new(TypedImage::<u16, D>::new()),
        PixelType::I16 => Box::new(TypedImage::<i16, D>::new()),
        PixelType::U32 => Box::new(TypedImage::<u32, D>::new()),
        PixelType::I32 => Box::new(TypedImage::<i32, D>::new()),
        PixelType::U64 => Box::new(TypedImage::<u64, D>::new()),
        PixelType::I64 => Box::new(TypedImage::<i64, D>::new()),
        PixelType::F32 => Box::new(TypedImage::<f32, D>::new()),
        PixelType::F64 => Box::new(TypedImage::<f64, D>::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{Image2D, Image3D};
    use std::io::Cursor;

    #[test]
    fn encode_then_parse_header_agrees() {
        let image = Image3D::<i16>::with_shape([6, 5, 4]);
        let mut bytes = Vec::new();
        InrCodec::new().encode(&mut bytes, &image).unwrap();

        let mut codec = InrCodec::new();
        codec.parse_header(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(codec.declared_dimension().unwrap(), 3);
        assert_eq!(codec.declared_shape().unwrap(), vec![6, 5, 4]);
        assert_eq!(codec.declared_pixel_type().unwrap(), PixelType::I16);
    }

    #[test]
    fn decode_fills_resized_image() {
        let mut source = Image2D::<u8>::with_shape([4, 2]);
        for (i, sample) in source.data_mut().iter_mut().enumerate() {
            *sample = i as u8;
        }
        let mut bytes = Vec::new();
        InrCodec::new().encode(&mut bytes, &source).unwrap();

        let mut codec = InrCodec::new();
        let mut cursor = Cursor::new(&bytes);
        codec.parse_header(&mut cursor).unwrap();
        let mut dest = Image2D::<u8>::new();
        dest.resize(&codec.declared_shape().unwrap()).unwrap();
        codec.decode(&mut cursor, &mut dest).unwrap();
        assert_eq!(dest.data(), source.data());
    }

    #[test]
    fn truncated_payload_is_an_io_error() {
        let image = Image2D::<u32>::with_shape([8, 8]);
        let mut bytes = Vec::new();
        InrCodec::new().encode(&mut bytes, &image).unwrap();
        bytes.truncate(bytes.len() - 16);

        let mut codec = InrCodec::new();
        let mut cursor = Cursor::new(&bytes);
        codec.parse_header(&mut cursor).unwrap();
        let mut dest = Image2D::<u32>::new();
        dest.resize(&codec.declared_shape().unwrap()).unwrap();
        assert!(matches!(
            codec.decode(&mut cursor, &mut dest),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn instantiates_declared_type_and_dimension() {
        let image = Image3D::<f64>::with_shape([2, 3, 4]);
        let mut bytes = Vec::new();
        InrCodec::new().encode(&mut bytes, &image).unwrap();

        let mut codec = InrCodec::new();
        codec.parse_header(&mut Cursor::new(&bytes)).unwrap();
        let fresh = codec.instantiate().unwrap();
        assert_eq!(fresh.pixel_type(), PixelType::F64);
        assert_eq!(fresh.dimension(), 3);
        assert_eq!(fresh.len(), 0);
    }
}
