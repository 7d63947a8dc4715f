//! Pixel type identity and scalar payload I/O.
//!
//! Pixel types are identified by the [`PixelType`] enum, assigned once at
//! compile time. Identity comparison is a plain enum comparison and stays
//! valid across dynamically loaded codecs, unlike `TypeId` which is not
//! guaranteed stable across compilation units.

use std::fmt;
use std::io::{self, Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

/// Identity tag for a pixel's scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelType {
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 64-bit integer.
    U64,
    /// Signed 64-bit integer.
    I64,
    /// 32-bit IEEE float.
    F32,
    /// 64-bit IEEE float.
    F64,
}

impl PixelType {
    /// Size of one sample in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            PixelType::U8 | PixelType::I8 => 1,
            PixelType::U16 | PixelType::I16 => 2,
            PixelType::U32 | PixelType::I32 | PixelType::F32 => 4,
            PixelType::U64 | PixelType::I64 | PixelType::F64 => 8,
        }
    }

    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            PixelType::U8 => "u8",
            PixelType::I8 => "i8",
            PixelType::U16 => "u16",
            PixelType::I16 => "i16",
            PixelType::U32 => "u32",
            PixelType::I32 => "i32",
            PixelType::U64 => "u64",
            PixelType::I64 => "i64",
            PixelType::F32 => "f32",
            PixelType::F64 => "f64",
        }
    }

    /// Whether the type is a float type.
    pub fn is_float(&self) -> bool {
        matches!(self, PixelType::F32 | PixelType::F64)
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order of sample data on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

impl Endianness {
    /// Byte order of the host.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    /// Whether this is the host byte order.
    pub fn is_native(&self) -> bool {
        *self == Self::native()
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A scalar usable as a pixel sample.
///
/// # Safety
///
/// Implementations must be plain-old-data scalars with no padding and no
/// invalid bit patterns; [`crate::image::TypedImage`] exposes its sample
/// storage as raw bytes on that basis. The trait is sealed so only the
/// primitives below implement it.
pub unsafe trait Pixel:
    sealed::Sealed + Copy + Default + PartialEq + Send + Sync + fmt::Debug + 'static
{
    /// Identity tag of this scalar type.
    const PIXEL_TYPE: PixelType;

    /// Reverse the byte order of one sample.
    fn swap_bytes(self) -> Self;

    /// Read `dst.len()` samples with the given byte order.
    fn read_payload<R: Read + ?Sized>(
        reader: &mut R,
        dst: &mut [Self],
        endian: Endianness,
    ) -> io::Result<()>;

    /// Write all samples with the given byte order.
    fn write_payload<W: Write + ?Sized>(
        writer: &mut W,
        src: &[Self],
        endian: Endianness,
    ) -> io::Result<()>;
}

macro_rules! impl_pixel {
    ($ty:ty, $tag:expr, $swap:expr, $read:ident, $write:ident) => {
        impl sealed::Sealed for $ty {}

        unsafe impl Pixel for $ty {
            const PIXEL_TYPE: PixelType = $tag;

            fn swap_bytes(self) -> Self {
                let swap: fn($ty) -> $ty = $swap;
                swap(self)
            }

            fn read_payload<R: Read + ?Sized>(
                reader: &mut R,
                dst: &mut [Self],
                endian: Endianness,
            ) -> io::Result<()> {
                match endian {
                    Endianness::Little => reader.$read::<LittleEndian>(dst),
                    Endianness::Big => reader.$read::<BigEndian>(dst),
                }
            }

            fn write_payload<W: Write + ?Sized>(
                writer: &mut W,
                src: &[Self],
                endian: Endianness,
            ) -> io::Result<()> {
                for &sample in src {
                    match endian {
                        Endianness::Little => writer.$write::<LittleEndian>(sample)?,
                        Endianness::Big => writer.$write::<BigEndian>(sample)?,
                    }
                }
                Ok(())
            }
        }
    };
}

// u8/i8 have no byte order; byteorder's endian-parameterized readers start
// at 16 bits, so these two are spelled out.
impl sealed::Sealed for u8 {}

unsafe impl Pixel for u8 {
    const PIXEL_TYPE: PixelType = PixelType::U8;

    fn swap_bytes(self) -> Self {
        self
    }

    fn read_payload<R: Read + ?Sized>(
        reader: &mut R,
        dst: &mut [Self],
        _endian: Endianness,
    ) -> io::Result<()> {
        reader.read_exact(dst)
    }

    fn write_payload<W: Write + ?Sized>(
        writer: &mut W,
        src: &[Self],
        _endian: Endianness,
    ) -> io::Result<()> {
        writer.write_all(src)
    }
}

impl sealed::Sealed for i8 {}

unsafe impl Pixel for i8 {
    const PIXEL_TYPE: PixelType = PixelType::I8;

    fn swap_bytes(self) -> Self {
        self
    }

    fn read_payload<R: Read + ?Sized>(
        reader: &mut R,
        dst: &mut [Self],
        _endian: Endianness,
    ) -> io::Result<()> {
        reader.read_i8_into(dst)
    }

    fn write_payload<W: Write + ?Sized>(
        writer: &mut W,
        src: &[Self],
        _endian: Endianness,
    ) -> io::Result<()> {
        for &sample in src {
            writer.write_i8(sample)?;
        }
        Ok(())
    }
}

impl_pixel!(u16, PixelType::U16, u16::swap_bytes, read_u16_into, write_u16);
impl_pixel!(i16, PixelType::I16, i16::swap_bytes, read_i16_into, write_i16);
impl_pixel!(u32, PixelType::U32, u32::swap_bytes, read_u32_into, write_u32);
impl_pixel!(i32, PixelType::I32, i32::swap_bytes, read_i32_into, write_i32);
impl_pixel!(u64, PixelType::U64, u64::swap_bytes, read_u64_into, write_u64);
impl_pixel!(i64, PixelType::I64, i64::swap_bytes, read_i64_into, write_i64);
impl_pixel!(
    f32,
    PixelType::F32,
    |v: f32| f32::from_bits(v.to_bits().swap_bytes()),
    read_f32_into,
    write_f32
);
impl_pixel!(
    f64,
    PixelType::F64,
    |v: f64| f64::from_bits(v.to_bits().swap_bytes()),
    read_f64_into,
    write_f64
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn sizes_match_rust_scalars() {
        assert_eq!(PixelType::U8.size_bytes(), 1);
        assert_eq!(PixelType::I16.size_bytes(), 2);
        assert_eq!(PixelType::F32.size_bytes(), 4);
        assert_eq!(PixelType::F64.size_bytes(), 8);
    }

    #[test]
    fn native_endianness_is_consistent() {
        assert!(Endianness::native().is_native());
    }

    #[test]
    fn u16_payload_roundtrip_both_orders() {
        let src: Vec<u16> = vec![0x0102, 0xA0B0, 0xFFFF];
        for endian in [Endianness::Little, Endianness::Big] {
            let mut bytes = Vec::new();
            u16::write_payload(&mut bytes, &src, endian).unwrap();
            let mut dst = vec![0u16; src.len()];
            u16::read_payload(&mut Cursor::new(&bytes), &mut dst, endian).unwrap();
            assert_eq!(src, dst);
        }
    }

    #[test]
    fn big_endian_u16_layout() {
        let mut bytes = Vec::new();
        u16::write_payload(&mut bytes, &[0x0102], Endianness::Big).unwrap();
        assert_eq!(bytes, [0x01, 0x02]);
    }

    #[test]
    fn float_swap_roundtrips() {
        let v = 1234.5f32;
        assert_eq!(v.swap_bytes().swap_bytes(), v);
    }
}
