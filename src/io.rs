//! Read/write orchestration.
//!
//! The end-to-end read algorithm: peek the magic prefix, select a codec
//! (override, explicit name, or in-order content sniff), clone it, parse
//! the header on the clone, run the binding strategy for the destination
//! shape, decode, tag. Writes select by override or the image's format tag
//! and never guess a writer from the pixel type alone.

use std::io::{Read, Write};

use tracing::debug;

use crate::binding::{DetectTarget, ReadTarget};
use crate::codec::ImageCodec;
use crate::error::{Error, Result};
use crate::image::Image;
use crate::registry::Registry;
use crate::stream::ImageSource;

impl Registry {
    /// Read an image from `source` into `target`, selecting the codec by
    /// format override or content sniffing.
    ///
    /// Non-autodetectable codecs are skipped during sniffing; exhausting
    /// the registry fails [`Error::UnknownFileFormat`]. When an override is
    /// active, a prefix that its predicate rejects fails
    /// [`Error::BadFormat`] (and a non-sticky override is consumed either
    /// way).
    ///
    /// Selection failures only peek the prefix and leave the stream
    /// readable, so a caller can retry with [`Registry::read_as`]. Header
    /// and payload failures latch the stream into its failed state.
    pub fn read<R, T>(&self, source: &mut ImageSource<R>, target: &mut T) -> Result<()>
    where
        R: Read,
        T: ReadTarget + ?Sized,
    {
        let prefix = *source.peek_prefix()?;

        if let Some(codec) = self.take_override() {
            if !codec.known_from_prefix(&prefix) {
                return Err(Error::BadFormat {
                    format: codec.identity(),
                });
            }
            debug!(format = codec.identity(), "format override selected codec");
            return read_with(codec.as_ref(), source, target);
        }

        for codec in self.codecs() {
            if codec.autodetectable() && codec.known_from_prefix(&prefix) {
                debug!(format = codec.identity(), "content sniff selected codec");
                return read_with(codec.as_ref(), source, target);
            }
        }

        Err(Error::UnknownFileFormat { name: None })
    }

    /// Read with an explicitly named format, bypassing sniffing and any
    /// override. The prefix is still verified against the codec's
    /// predicate; a mismatch fails [`Error::BadFormat`] with the stream
    /// left readable.
    pub fn read_as<R, T>(
        &self,
        name: &str,
        source: &mut ImageSource<R>,
        target: &mut T,
    ) -> Result<()>
    where
        R: Read,
        T: ReadTarget + ?Sized,
    {
        let codec = self.by_name(name)?;
        let prefix = *source.peek_prefix()?;
        if !codec.known_from_prefix(&prefix) {
            return Err(Error::BadFormat {
                format: codec.identity(),
            });
        }
        read_with(codec.as_ref(), source, target)
    }

    /// Read into a freshly allocated image of whatever type the file
    /// declares (binding variant 1).
    pub fn read_new<R: Read>(&self, source: &mut ImageSource<R>) -> Result<Box<dyn Image>> {
        let mut target = DetectTarget::new();
        self.read(source, &mut target)?;
        target
            .into_image()
            .ok_or_else(|| Error::internal("detect target produced no image"))
    }

    /// Write an image, selecting the codec by format override or the
    /// image's own format tag.
    ///
    /// An untagged image with no active override fails
    /// [`Error::NoCodecCanWriteThisImage`]: several codecs may encode the
    /// same pixel type, so the writer is never guessed.
    pub fn write<W: Write>(&self, writer: &mut W, image: &dyn Image) -> Result<()> {
        let codec = match self.take_override() {
            Some(codec) => codec,
            None => match image.format_tag() {
                Some(tag) => self.by_name(tag)?,
                None => return Err(Error::NoCodecCanWriteThisImage),
            },
        };
        write_with(codec.as_ref(), writer, image)
    }

    /// Write with an explicitly named format.
    pub fn write_as<W: Write>(
        &self,
        name: &str,
        writer: &mut W,
        image: &dyn Image,
    ) -> Result<()> {
        let codec = self.by_name(name)?;
        write_with(codec.as_ref(), writer, image)
    }
}

/// Parse the header on a private clone, then hand the decode step to the
/// binding target. Any failure from here on leaves the source poisoned.
fn read_with<R, T>(
    codec: &dyn ImageCodec,
    source: &mut ImageSource<R>,
    target: &mut T,
) -> Result<()>
where
    R: Read,
    T: ReadTarget + ?Sized,
{
    let identity = codec.identity();
    let mut clone = codec.clone_codec();

    if let Err(err) = clone.parse_header(&mut *source) {
        source.poison();
        return Err(match err {
            Error::Io(_) => Error::BadHeader { format: identity },
            other => other,
        });
    }

    let clone = clone.as_ref();
    let mut decode = |image: &mut dyn Image| -> Result<()> {
        clone.decode(&mut *source, image).map_err(|err| match err {
            Error::Io(_) => Error::BadData { format: identity },
            other => other,
        })
    };
    let result = target.apply(clone, identity, &mut decode);
    if result.is_err() {
        source.poison();
    }
    result
}

fn write_with<W: Write>(codec: &dyn ImageCodec, writer: &mut W, image: &dyn Image) -> Result<()> {
    if !codec.known_for_image(image) {
        return Err(Error::NonMatchingFormatOnWrite {
            format: codec.identity(),
        });
    }
    // Clone for symmetry with the read path; encoders may keep
    // per-invocation state just like header parsers.
    codec.clone_codec().encode(writer, image)
}
