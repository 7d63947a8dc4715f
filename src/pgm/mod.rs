//! Binary PGM (`P5`) codec.
//!
//! Two-dimensional grayscale images. A `maxval` up to 255 maps to `u8`
//! samples; up to 65535 maps to `u16` samples stored big-endian in the
//! file, per the netpbm convention. Header tokens may be separated by
//! whitespace and `#` comment lines.

use std::io::{Read, Write};

use tracing::trace;

use crate::codec::ImageCodec;
use crate::error::{Error, Result};
use crate::image::{Image, Image2D};
use crate::pixel::{Endianness, Pixel, PixelType};

const MAGIC: &[u8; 2] = b"P5";
const MAX_SAMPLE_VALUE: u32 = 65_535;

#[derive(Debug, Clone, Copy)]
struct PgmHeader {
    width: usize,
    height: usize,
    maxval: u32,
}

impl PgmHeader {
    fn pixel_type(&self) -> PixelType {
        if self.maxval <= u8::MAX as u32 {
            PixelType::U8
        } else {
            PixelType::U16
        }
    }
}

/// Raw (binary) PGM reader/writer.
#[derive(Debug, Clone, Default)]
pub struct PgmCodec {
    header: Option<PgmHeader>,
}

impl PgmCodec {
    /// Create a codec with no parsed header.
    pub fn new() -> Self {
        Self::default()
    }

    fn header(&self) -> Result<&PgmHeader> {
        self.header
            .as_ref()
            .ok_or_else(|| Error::internal("pgm header accessed before parse"))
    }
}

impl ImageCodec for PgmCodec {
    fn identity(&self) -> &'static str {
        "pgm"
    }

    fn known_suffixes(&self) -> &'static [&'static str] {
        &["pgm"]
    }

    fn known_from_prefix(&self, prefix: &[u8]) -> bool {
        prefix.len() > 2
            && prefix.starts_with(MAGIC)
            && (prefix[2].is_ascii_whitespace() || prefix[2] == b'#')
    }

    fn known_for_image(&self, image: &dyn Image) -> bool {
        // A zero extent would encode a header our own parser rejects.
        image.dimension() == 2
            && matches!(image.pixel_type(), PixelType::U8 | PixelType::U16)
            && image.shape().iter().all(|&extent| extent > 0)
    }

    fn parse_header(&mut self, reader: &mut dyn Read) -> Result<()> {
        let mut magic = [0u8; 2];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(Error::BadHeader { format: "pgm" });
        }

        let width = read_number(reader)? as usize;
        let height = read_number(reader)? as usize;
        let maxval = read_number(reader)?;
        if width == 0 || height == 0 || maxval == 0 || maxval > MAX_SAMPLE_VALUE {
            return Err(Error::BadHeader { format: "pgm" });
        }
        // read_number consumed the single whitespace byte terminating the
        // header; the payload starts here.

        trace!(width, height, maxval, "pgm header parsed");
        self.header = Some(PgmHeader {
            width,
            height,
            maxval,
        });
        Ok(())
    }

    fn declared_pixel_type(&self) -> Result<PixelType> {
        Ok(self.header()?.pixel_type())
    }

    fn declared_dimension(&self) -> Result<usize> {
        self.header()?;
        Ok(2)
    }

    fn declared_shape(&self) -> Result<Vec<usize>> {
        let header = self.header()?;
        Ok(vec![header.width, header.height])
    }

    fn instantiate(&self) -> Result<Box<dyn Image>> {
        Ok(match self.header()?.pixel_type() {
            PixelType::U16 => Box::new(Image2D::<u16>::new()),
            _ => Box::new(Image2D::<u8>::new()),
        })
    }

    fn decode(&self, reader: &mut dyn Read, image: &mut dyn Image) -> Result<()> {
        match self.header()?.pixel_type() {
            PixelType::U8 => decode_samples::<u8>(reader, image),
            _ => decode_samples::<u16>(reader, image),
        }
    }

    fn encode(&self, writer: &mut dyn Write, image: &dyn Image) -> Result<()> {
        let shape = image.shape();
        if image.dimension() != 2 || shape.len() != 2 {
            return Err(Error::NonMatchingFormatOnWrite { format: "pgm" });
        }
        let (width, height) = (shape[0], shape[1]);
        match image.pixel_type() {
            PixelType::U8 => {
                write!(writer, "P5\n{width} {height}\n255\n")?;
                encode_samples::<u8>(writer, image)
            }
            PixelType::U16 => {
                write!(writer, "P5\n{width} {height}\n65535\n")?;
                encode_samples::<u16>(writer, image)
            }
            _ => Err(Error::NonMatchingFormatOnWrite { format: "pgm" }),
        }
    }

    fn clone_codec(&self) -> Box<dyn ImageCodec> {
        Box::new(self.clone())
    }
}

fn decode_samples<P: Pixel>(reader: &mut dyn Read, image: &mut dyn Image) -> Result<()> {
    let image = image
        .as_any_mut()
        .downcast_mut::<Image2D<P>>()
        .ok_or_else(|| Error::internal("pgm decode destination has the wrong type"))?;
    P::read_payload(reader, image.data_mut(), Endianness::Big)?;
    Ok(())
}

fn encode_samples<P: Pixel>(writer: &mut dyn Write, image: &dyn Image) -> Result<()> {
    let image = image
        .as_any()
        .downcast_ref::<Image2D<P>>()
        .ok_or_else(|| Error::internal("pgm encode source has the wrong type"))?;
    P::write_payload(writer, image.data(), Endianness::Big)?;
    Ok(())
}

/// Read one ASCII unsigned integer, skipping leading whitespace and `#`
/// comment lines, consuming the single byte that terminates the digits.
fn read_number(reader: &mut dyn Read) -> Result<u32> {
    let mut byte = next_token_byte(reader)?;
    if !byte.is_ascii_digit() {
        return Err(Error::BadHeader { format: "pgm" });
    }
    let mut value: u32 = 0;
    while byte.is_ascii_digit() {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add((byte - b'0') as u32))
            .ok_or(Error::BadHeader { format: "pgm" })?;
        byte = read_byte(reader)?;
    }
    if !byte.is_ascii_whitespace() {
        return Err(Error::BadHeader { format: "pgm" });
    }
    Ok(value)
}

fn next_token_byte(reader: &mut dyn Read) -> Result<u8> {
    loop {
        let byte = read_byte(reader)?;
        if byte == b'#' {
            // Comment runs to the end of the line.
            loop {
                if read_byte(reader)? == b'\n' {
                    break;
                }
            }
        } else if !byte.is_ascii_whitespace() {
            return Ok(byte);
        }
    }
}

fn read_byte(reader: &mut dyn Read) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(bytes: &[u8]) -> Result<PgmCodec> {
        let mut codec = PgmCodec::new();
        codec.parse_header(&mut Cursor::new(bytes))?;
        Ok(codec)
    }

    #[test]
    fn parses_plain_header() {
        let codec = parse(b"P5\n7 3\n255\n").unwrap();
        assert_eq!(codec.declared_shape().unwrap(), vec![7, 3]);
        assert_eq!(codec.declared_pixel_type().unwrap(), PixelType::U8);
        assert_eq!(codec.declared_dimension().unwrap(), 2);
    }

    #[test]
    fn parses_header_with_comments() {
        let codec = parse(b"P5\n# made by hand\n# second remark\n4 2\n# depth\n65535\n").unwrap();
        assert_eq!(codec.declared_shape().unwrap(), vec![4, 2]);
        assert_eq!(codec.declared_pixel_type().unwrap(), PixelType::U16);
    }

    #[test]
    fn header_consumes_exactly_the_header_region() {
        let mut cursor = Cursor::new(b"P5\n2 1\n255\nXY".to_vec());
        let mut codec = PgmCodec::new();
        codec.parse_header(&mut cursor).unwrap();
        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"XY");
    }

    #[test]
    fn rejects_bad_magic_and_bad_numbers() {
        assert!(matches!(
            parse(b"P6\n2 2\n255\n"),
            Err(Error::BadHeader { format: "pgm" })
        ));
        assert!(matches!(
            parse(b"P5\n0 2\n255\n"),
            Err(Error::BadHeader { format: "pgm" })
        ));
        assert!(matches!(
            parse(b"P5\n2 2\n70000\n"),
            Err(Error::BadHeader { format: "pgm" })
        ));
        assert!(matches!(
            parse(b"P5\nwide 2\n255\n"),
            Err(Error::BadHeader { format: "pgm" })
        ));
    }

    #[test]
    fn declared_accessors_fail_before_parse() {
        let codec = PgmCodec::new();
        assert!(matches!(
            codec.declared_pixel_type(),
            Err(Error::UnexpectedInternal(_))
        ));
    }

    #[test]
    fn prefix_predicate_requires_magic_and_separator() {
        let codec = PgmCodec::new();
        assert!(codec.known_from_prefix(b"P5\n320 200 255 ..............."));
        assert!(codec.known_from_prefix(b"P5#comment....................."));
        assert!(!codec.known_from_prefix(b"P6\n............................"));
        assert!(!codec.known_from_prefix(b"P55............................"));
    }

    #[test]
    fn sixteen_bit_payload_is_big_endian() {
        let mut image = Image2D::<u16>::with_shape([2, 1]);
        image.data_mut().copy_from_slice(&[0x0102, 0x0304]);
        let mut out = Vec::new();
        PgmCodec::new().encode(&mut out, &image).unwrap();
        assert!(out.starts_with(b"P5\n2 1\n65535\n"));
        assert_eq!(&out[out.len() - 4..], &[0x01, 0x02, 0x03, 0x04]);
    }
}
