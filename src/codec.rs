//! The codec descriptor contract.
//!
//! One [`ImageCodec`] implementation exists per supported file encoding.
//! A codec is registered once per process and cloned per invocation: the
//! orchestrator never parses a header on the registered instance, so many
//! reads can run concurrently through one registration without sharing
//! in-progress header state.
//!
//! Call order on a clone is fixed: [`ImageCodec::parse_header`] first, then
//! any of the `declared_*` accessors, [`ImageCodec::instantiate`] and
//! [`ImageCodec::decode`]. The `declared_*` accessors are meaningless
//! before a successful parse and must fail with
//! [`crate::Error::UnexpectedInternal`] if reached.

use std::io::{Read, Write};

use crate::error::Result;
use crate::image::Image;
use crate::pixel::PixelType;

/// One pluggable encoder/decoder for a single file encoding.
pub trait ImageCodec: Send + Sync {
    /// Identity name of the format (e.g. `"pgm"`). Expected unique across
    /// the registry.
    fn identity(&self) -> &'static str;

    /// Whether the format takes part in content sniffing. A format whose
    /// magic is weak enough to produce false positives opts out and is
    /// only reachable by explicit selection.
    fn autodetectable(&self) -> bool {
        true
    }

    /// File-name suffixes this format claims, without the leading dot.
    fn known_suffixes(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether the leading bytes of a stream look like this format.
    ///
    /// Pure and non-consuming; `prefix` holds
    /// [`crate::stream::MAGIC_PREFIX_LEN`] bytes.
    fn known_from_prefix(&self, prefix: &[u8]) -> bool;

    /// Whether this codec can encode the image's pixel type and
    /// dimensionality.
    fn known_for_image(&self, image: &dyn Image) -> bool;

    /// Parse the header, consuming exactly the header region.
    ///
    /// Called only on a clone, and only after [`ImageCodec::known_from_prefix`]
    /// accepted the stream (or an explicit format selection bypassed
    /// sniffing).
    fn parse_header(&mut self, reader: &mut dyn Read) -> Result<()>;

    /// Pixel type declared by the parsed header.
    fn declared_pixel_type(&self) -> Result<PixelType>;

    /// Dimensionality declared by the parsed header.
    fn declared_dimension(&self) -> Result<usize>;

    /// Per-axis extents declared by the parsed header.
    fn declared_shape(&self) -> Result<Vec<usize>>;

    /// Allocate an image of the declared pixel type and dimensionality,
    /// shape unset.
    fn instantiate(&self) -> Result<Box<dyn Image>>;

    /// Decode the payload into an image already resized to the declared
    /// shape, normalizing byte order if the source endianness differs from
    /// the host.
    fn decode(&self, reader: &mut dyn Read, image: &mut dyn Image) -> Result<()>;

    /// Encode the image, header and payload.
    fn encode(&self, writer: &mut dyn Write, image: &dyn Image) -> Result<()>;

    /// Independent copy for one read/write invocation.
    fn clone_codec(&self) -> Box<dyn ImageCodec>;
}
