//! Codec registry and format override.
//!
//! The registry is an owned value populated by explicit
//! [`Registry::register`] calls at startup; there is no self-registration
//! through static initializers. Registration happens single-threaded before
//! the registry is shared, after which every operation takes `&self` and
//! the catalogue is effectively immutable.
//!
//! Insertion order is priority order: content sniffing and suffix
//! resolution try codecs in the order they were registered.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::codec::ImageCodec;
use crate::error::{Error, Result};

/// How [`Registry::set_format`] names a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSelector<'a> {
    /// Clear any active override and return to autodetection.
    Default,
    /// Select by registered identity name.
    Name(&'a str),
    /// Select by the suffix of a file name (split at the last `.`).
    Suffix(&'a str),
}

struct Override {
    codec: Arc<dyn ImageCodec>,
    sticky: bool,
}

/// Process-wide catalogue of installed codecs.
///
/// The format override held here is an opt-in compatibility shim for
/// callers ported from stream-manipulator style APIs; new code should
/// prefer the explicit [`Registry::read_as`] / [`Registry::write_as`]
/// entry points, which carry the format per call and cannot race.
///
/// [`Registry::read_as`]: crate::Registry::read_as
/// [`Registry::write_as`]: crate::Registry::write_as
pub struct Registry {
    codecs: Vec<Arc<dyn ImageCodec>>,
    current: Mutex<Option<Override>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            codecs: Vec::new(),
            current: Mutex::new(None),
        }
    }

    /// Create a registry with the bundled codecs installed.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        #[cfg(feature = "pgm")]
        registry
            .register(Arc::new(crate::pgm::PgmCodec::new()))
            .unwrap_or_else(|_| unreachable!("pgm registered twice"));
        #[cfg(feature = "inr")]
        registry
            .register(Arc::new(crate::inr::InrCodec::new()))
            .unwrap_or_else(|_| unreachable!("inr registered twice"));
        registry
    }

    /// Append a codec. Identity names must be unique; a duplicate fails
    /// with [`Error::AlreadyRegisteredIdentity`] and leaves the registry
    /// unchanged.
    pub fn register(&mut self, codec: Arc<dyn ImageCodec>) -> Result<()> {
        let identity = codec.identity();
        if self.codecs.iter().any(|c| c.identity() == identity) {
            return Err(Error::AlreadyRegisteredIdentity { identity });
        }
        info!(
            format = identity,
            autodetectable = codec.autodetectable(),
            suffixes = ?codec.known_suffixes(),
            "image codec registered"
        );
        self.codecs.push(codec);
        Ok(())
    }

    /// Registered identities, in priority order.
    pub fn formats(&self) -> Vec<&'static str> {
        self.codecs.iter().map(|c| c.identity()).collect()
    }

    /// Number of registered codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Whether no codec is registered.
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    pub(crate) fn codecs(&self) -> &[Arc<dyn ImageCodec>] {
        &self.codecs
    }

    /// Resolve a codec by its identity name.
    pub fn by_name(&self, name: &str) -> Result<Arc<dyn ImageCodec>> {
        self.codecs
            .iter()
            .find(|c| c.identity() == name)
            .cloned()
            .ok_or_else(|| Error::UnknownFileFormat {
                name: Some(name.to_string()),
            })
    }

    /// Resolve a codec from a file name's suffix.
    ///
    /// The suffix is everything after the last `.`; a name without one
    /// fails [`Error::NoSuffixInName`], an unclaimed suffix
    /// [`Error::UnknownFileSuffix`].
    pub fn by_suffix(&self, filename: &str) -> Result<Arc<dyn ImageCodec>> {
        let (_, suffix) = filename
            .rsplit_once('.')
            .ok_or_else(|| Error::NoSuffixInName {
                name: filename.to_string(),
            })?;
        self.codecs
            .iter()
            .find(|c| c.known_suffixes().contains(&suffix))
            .cloned()
            .ok_or_else(|| Error::UnknownFileSuffix {
                suffix: suffix.to_string(),
            })
    }

    /// Resolve a codec for a named file, reporting the failure against the
    /// file name rather than the bare suffix.
    pub fn for_named_file(&self, filename: &str) -> Result<Arc<dyn ImageCodec>> {
        self.by_suffix(filename).map_err(|err| match err {
            Error::UnknownFileSuffix { .. } => Error::UnknownFormatForNamedFile {
                name: filename.to_string(),
            },
            other => other,
        })
    }

    /// Pin format selection to one codec, bypassing sniffing.
    ///
    /// A non-sticky override is consumed by the next read or write; a
    /// sticky one persists until replaced or cleared with
    /// [`FormatSelector::Default`].
    pub fn set_format(&self, selector: FormatSelector<'_>, sticky: bool) -> Result<()> {
        let codec = match selector {
            FormatSelector::Default => {
                *self.current.lock() = None;
                return Ok(());
            }
            FormatSelector::Name(name) => self.by_name(name)?,
            FormatSelector::Suffix(filename) => self.by_suffix(filename)?,
        };
        *self.current.lock() = Some(Override { codec, sticky });
        Ok(())
    }

    /// The active override, clearing it as a side effect when non-sticky.
    pub(crate) fn take_override(&self) -> Option<Arc<dyn ImageCodec>> {
        let mut current = self.current.lock();
        match current.as_ref() {
            Some(ov) if ov.sticky => Some(ov.codec.clone()),
            Some(_) => current.take().map(|ov| ov.codec),
            None => None,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
