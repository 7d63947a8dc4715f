//! Format-agnostic image I/O.
//!
//! This crate reads and writes images across an open, externally
//! extensible set of binary encodings without hardcoding per-format logic
//! anywhere in the core. Codecs implement the [`ImageCodec`] contract and
//! are installed into a [`Registry`]; reads select a codec by sniffing the
//! stream's leading bytes, writes by the image's format tag or an explicit
//! format name.
//!
//! Two usage modes:
//!
//! - the caller knows nothing about the file: [`Registry::read_new`]
//!   detects the encoding, allocates a correctly-typed image, and returns
//!   it behind the abstract [`Image`] capability;
//! - the caller holds a pre-allocated image: [`Registry::read`] with a
//!   [`Strict`] target checks the file against the image's pixel type and
//!   dimensionality exactly, while a [`TypedImage`] destination tolerates
//!   a pixel-type mismatch up to the (unimplemented) conversion boundary.
//!
//! ## Example
//!
//! ```no_run
//! use imageio::{ImageSource, Registry};
//!
//! # fn main() -> imageio::Result<()> {
//! let registry = Registry::with_defaults();
//! # let file: &[u8] = &[];
//! let mut source = ImageSource::new(file);
//! let image = registry.read_new(&mut source)?;
//! println!("{}D {} image, shape {:?}, read as {:?}",
//!     image.dimension(), image.pixel_type(), image.shape(), image.format_tag());
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Register every codec before sharing the [`Registry`]; afterwards the
//! catalogue is read-only and reads/writes may run from any number of
//! threads. Each operation parses headers on a private clone of the
//! selected codec, so no in-progress state is ever shared. The
//! [`Registry::set_format`] override is the one piece of ambient mutable
//! state; prefer the per-call [`Registry::read_as`] /
//! [`Registry::write_as`] entry points in concurrent code.

#![warn(missing_docs)]

mod binding;
mod codec;
mod error;
mod image;
mod io;
mod pixel;
mod registry;
mod stream;

#[cfg(feature = "inr")]
pub mod inr;

#[cfg(feature = "pgm")]
pub mod pgm;

pub use binding::{DecodeFn, DetectTarget, ReadTarget, Strict};
pub use codec::ImageCodec;
pub use error::{Error, Result};
pub use image::{Image, Image1D, Image2D, Image3D, Image4D, TypedImage};
pub use pixel::{Endianness, Pixel, PixelType};
pub use registry::{FormatSelector, Registry};
pub use stream::{ImageSource, MAGIC_PREFIX_LEN};
