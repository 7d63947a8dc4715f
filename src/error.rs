//! Error types for the image I/O subsystem.
//!
//! Every failure surfaces as one variant of [`Error`]; calling code is
//! expected to branch on the variant, not on the message text.

use thiserror::Error;

use crate::pixel::PixelType;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Image I/O errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Internal invariant violation. Seeing this is a bug in a codec or in
    /// the orchestrator, not in calling code.
    #[error("Unexpected internal error: {0}")]
    UnexpectedInternal(String),

    /// I/O failure on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream does not match the explicitly requested format.
    #[error("Unable to read the input as a {format} image file")]
    BadFormat {
        /// Identity of the requested format.
        format: &'static str,
    },

    /// A file name without any `.suffix` part was used for suffix resolution.
    #[error("No identifiable suffix in name {name}")]
    NoSuffixInName {
        /// The offending file name.
        name: String,
    },

    /// The selected codec cannot encode this image's pixel type/dimension.
    #[error("Unable to save the image in the {format} format")]
    NonMatchingFormatOnWrite {
        /// Identity of the refusing format.
        format: &'static str,
    },

    /// Header parsing failed or the stream ended inside the header.
    #[error("Bad {format} file header")]
    BadHeader {
        /// Identity of the format whose header was being parsed, or `"?"`
        /// when no codec had been selected yet.
        format: &'static str,
    },

    /// Payload decoding failed or the stream ended inside the payload.
    #[error("Bad {format} file data")]
    BadData {
        /// Identity of the decoding format.
        format: &'static str,
    },

    /// The header declares a dimensionality other than the destination's.
    #[error("Incoming image is not of dimension {expected} (header declares {declared})")]
    BadDimension {
        /// Dimensionality of the destination image.
        expected: usize,
        /// Dimensionality declared by the file header.
        declared: usize,
    },

    /// A codec encountered a dimensionality it has no representation for.
    #[error("Image is of unknown dimension {dimension}")]
    UnknownDimension {
        /// The unsupported dimensionality.
        dimension: usize,
    },

    /// A shape of the wrong arity was supplied to a resize.
    #[error("Size specification is not of dimension {expected} (got {got} extents)")]
    BadSizeSpecification {
        /// Dimensionality of the image being resized.
        expected: usize,
        /// Number of extents supplied.
        got: usize,
    },

    /// A codec encountered a pixel description it has no type for.
    #[error("Unknown pixel type ({description}) for format {format}")]
    UnknownPixelType {
        /// Wire-level description of the pixel type.
        description: String,
        /// Identity of the format.
        format: &'static str,
    },

    /// The header's pixel type is not the destination's.
    #[error("Incoming pixel type ({declared}) is not that of the destination image ({expected})")]
    MismatchedPixelType {
        /// Pixel type of the destination image.
        expected: PixelType,
        /// Pixel type declared by the file header.
        declared: PixelType,
    },

    /// No registered codec recognized the stream, or no codec has the
    /// requested identity.
    #[error("{}", unknown_format_message(.name))]
    UnknownFileFormat {
        /// The requested identity, if resolution was by name.
        name: Option<String>,
    },

    /// No registered codec claims the file name's suffix.
    #[error("Unknown {suffix} suffix")]
    UnknownFileSuffix {
        /// The unclaimed suffix.
        suffix: String,
    },

    /// No format could be determined for the named file.
    #[error("Unknown format for file {name}")]
    UnknownFormatForNamedFile {
        /// The file name.
        name: String,
    },

    /// The image carries no format tag and no override is active.
    #[error("No codec is able to write this type of image")]
    NoCodecCanWriteThisImage,

    /// A codec with the same identity is already registered.
    #[error("Format identity {identity} is already registered")]
    AlreadyRegisteredIdentity {
        /// The duplicated identity.
        identity: &'static str,
    },

    /// Cross-pixel-type value conversion was reached. Deliberately
    /// unimplemented: the destination keeps its type and the caller must
    /// read into a type-erased destination instead.
    #[error("Automatic pixel conversion from {declared} to {expected} is not implemented")]
    ConversionNotImplemented {
        /// Pixel type of the typed destination.
        expected: PixelType,
        /// Pixel type declared by the file header.
        declared: PixelType,
    },
}

impl Error {
    /// Shorthand for [`Error::UnexpectedInternal`].
    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        Error::UnexpectedInternal(msg.into())
    }
}

fn unknown_format_message(name: &Option<String>) -> String {
    match name {
        Some(name) => format!("Unknown {name} format"),
        None => "Unknown file format".to_string(),
    }
}
