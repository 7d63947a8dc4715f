//! Inrimage header parsing and writing.
//!
//! An Inrimage header is ASCII text in 256-byte blocks. It opens with the
//! magic `#INRIMAGE-4#{`, carries `KEY=value` lines (`XDIM`..`VDIM`,
//! `TYPE`, `PIXSIZE`, `CPU`), and the final block ends with `##}\n`.

use std::io::Read;

use crate::error::{Error, Result};
use crate::pixel::{Endianness, PixelType};

/// Magic tag opening every Inrimage header.
pub(super) const MAGIC: &[u8] = b"#INRIMAGE-4#{";
/// Header block granularity in bytes.
pub(super) const BLOCK_SIZE: usize = 256;
/// Terminator occupying the last bytes of the final block.
const TERMINATOR: &[u8] = b"##}\n";
/// Upper bound on header blocks, to stop on corrupt streams.
const MAX_BLOCKS: usize = 16;

/// CPU names written by little-endian producers.
const LITTLE_CPUS: [&str; 3] = ["decm", "alpha", "pc"];
/// CPU names written by big-endian producers.
const BIG_CPUS: [&str; 2] = ["sun", "sgi"];

/// Sample description: `TYPE=` wire category plus `PIXSIZE=` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SampleCategory {
    Unsigned,
    Signed,
    Float,
}

impl SampleCategory {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "unsigned fixed" => Some(SampleCategory::Unsigned),
            "signed fixed" => Some(SampleCategory::Signed),
            "float" => Some(SampleCategory::Float),
            _ => None,
        }
    }

    pub(super) fn of(pixel_type: PixelType) -> Self {
        match pixel_type {
            PixelType::U8 | PixelType::U16 | PixelType::U32 | PixelType::U64 => {
                SampleCategory::Unsigned
            }
            PixelType::I8 | PixelType::I16 | PixelType::I32 | PixelType::I64 => {
                SampleCategory::Signed
            }
            PixelType::F32 | PixelType::F64 => SampleCategory::Float,
        }
    }

    pub(super) fn wire_name(&self) -> &'static str {
        match self {
            SampleCategory::Unsigned => "unsigned fixed",
            SampleCategory::Signed => "signed fixed",
            SampleCategory::Float => "float",
        }
    }
}

/// Parsed Inrimage header.
#[derive(Debug, Clone)]
pub(super) struct InrHeader {
    /// Extents for X, Y, Z, V; trailing axes of a lower-dimensional image
    /// hold 1.
    pub extents: [usize; 4],
    pub pixel_type: PixelType,
    pub endianness: Endianness,
}

impl InrHeader {
    /// Dimensionality: the highest axis with an extent above one (at
    /// least 1).
    pub fn dimension(&self) -> usize {
        (1..4)
            .rev()
            .find(|&axis| self.extents[axis] > 1)
            .map(|axis| axis + 1)
            .unwrap_or(1)
    }

    /// Extents of the meaningful axes.
    pub fn shape(&self) -> Vec<usize> {
        self.extents[..self.dimension()].to_vec()
    }

    /// Parse a header from the stream, consuming exactly the 256-byte
    /// blocks it occupies.
    pub fn parse(reader: &mut dyn Read) -> Result<Self> {
        let mut text = Vec::new();
        for _ in 0..MAX_BLOCKS {
            let mut block = [0u8; BLOCK_SIZE];
            reader.read_exact(&mut block)?;
            text.extend_from_slice(&block);
            if block.ends_with(TERMINATOR) {
                return Self::parse_text(&text);
            }
        }
        Err(Error::BadHeader { format: "inr" })
    }

    fn parse_text(text: &[u8]) -> Result<Self> {
        if !text.starts_with(MAGIC) {
            return Err(Error::BadHeader { format: "inr" });
        }
        let text = std::str::from_utf8(text).map_err(|_| Error::BadHeader { format: "inr" })?;

        let mut extents = [0usize; 4];
        let mut seen = [false; 4];
        let mut category = None;
        let mut pixsize_bits = None;
        let mut cpu = None;

        for line in text.lines().skip(1) {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "XDIM" => extents[0] = parse_extent(value, &mut seen[0])?,
                "YDIM" => extents[1] = parse_extent(value, &mut seen[1])?,
                "ZDIM" => extents[2] = parse_extent(value, &mut seen[2])?,
                "VDIM" => extents[3] = parse_extent(value, &mut seen[3])?,
                "TYPE" => category = SampleCategory::parse(value),
                "PIXSIZE" => {
                    let bits = value
                        .strip_suffix("bits")
                        .map(str::trim)
                        .unwrap_or(value)
                        .parse::<u32>()
                        .map_err(|_| Error::BadHeader { format: "inr" })?;
                    pixsize_bits = Some(bits);
                }
                "CPU" => cpu = Some(value.to_string()),
                // SCALE and vendor keys are ignored.
                _ => {}
            }
        }

        if !seen.iter().all(|&s| s) {
            return Err(Error::BadHeader { format: "inr" });
        }
        let (Some(pixsize_bits), Some(cpu)) = (pixsize_bits, cpu) else {
            return Err(Error::BadHeader { format: "inr" });
        };

        let endianness = if LITTLE_CPUS.contains(&cpu.as_str()) {
            Endianness::Little
        } else if BIG_CPUS.contains(&cpu.as_str()) {
            Endianness::Big
        } else {
            return Err(Error::BadHeader { format: "inr" });
        };

        let pixel_type = match (category, pixsize_bits) {
            (Some(SampleCategory::Unsigned), 8) => PixelType::U8,
            (Some(SampleCategory::Unsigned), 16) => PixelType::U16,
            (Some(SampleCategory::Unsigned), 32) => PixelType::U32,
            (Some(SampleCategory::Unsigned), 64) => PixelType::U64,
            (Some(SampleCategory::Signed), 8) => PixelType::I8,
            (Some(SampleCategory::Signed), 16) => PixelType::I16,
            (Some(SampleCategory::Signed), 32) => PixelType::I32,
            (Some(SampleCategory::Signed), 64) => PixelType::I64,
            (Some(SampleCategory::Float), 32) => PixelType::F32,
            (Some(SampleCategory::Float), 64) => PixelType::F64,
            (category, bits) => {
                let description = match category {
                    Some(category) => format!("{} {} bits", category.wire_name(), bits),
                    None => format!("unrecognized type, {bits} bits"),
                };
                return Err(Error::UnknownPixelType {
                    description,
                    format: "inr",
                });
            }
        };

        Ok(Self {
            extents,
            pixel_type,
            endianness,
        })
    }

    /// Render the header as 256-byte-aligned text, native byte order.
    pub fn render(&self) -> Vec<u8> {
        let cpu = match Endianness::native() {
            Endianness::Little => "decm",
            Endianness::Big => "sun",
        };
        let mut text = format!(
            "{}\nXDIM={}\nYDIM={}\nZDIM={}\nVDIM={}\nTYPE={}\nPIXSIZE={} bits\nSCALE=2**0\nCPU={}\n",
            std::str::from_utf8(MAGIC).unwrap_or("#INRIMAGE-4#{"),
            self.extents[0],
            self.extents[1],
            self.extents[2],
            self.extents[3],
            SampleCategory::of(self.pixel_type).wire_name(),
            self.pixel_type.size_bytes() * 8,
            cpu,
        )
        .into_bytes();

        let total = (text.len() + TERMINATOR.len()).div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
        text.resize(total - TERMINATOR.len(), b'\n');
        text.extend_from_slice(TERMINATOR);
        text
    }
}

fn parse_extent(value: &str, seen: &mut bool) -> Result<usize> {
    let extent = value
        .parse::<usize>()
        .map_err(|_| Error::BadHeader { format: "inr" })?;
    if extent == 0 {
        return Err(Error::BadHeader { format: "inr" });
    }
    *seen = true;
    Ok(extent)
}
