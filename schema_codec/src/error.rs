//! Error types.
//!
//! Mirrors the error-kind taxonomy of the source system: every failure mode
//! the registry, codec, or store can produce is one variant here, and the
//! core never tries to recover from one internally.

use std::fmt::{self, Display, Formatter};

pub type Result<I> = std::result::Result<I, Error>;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    error: Box<dyn std::error::Error + Send + Sync>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ErrorKind {
    /// Underlying store or stream I/O error.
    Io,
    /// Bit reader hit EOF, an invalid variable-int width, or an out-of-range
    /// length prefix.
    CorruptStream,
    /// The static type of a field or top-level value has no codec branch.
    UnsupportedType,
    /// The type descriptor provider could not read/write a field,
    /// instantiate a value, or resolve a type name.
    ReflectionAccess,
    /// A payload referenced a compact id the store has no reverse mapping
    /// for.
    UnknownCompactId,
    /// The store held a reverse mapping but the schema bytes it points to
    /// are missing or fail to decode.
    CorruptStore,
    /// The schema's `class_name` does not resolve in the current
    /// environment (here: does not match the requested `Record::TYPE_NAME`).
    UnknownClass,
    /// `instantiate` failed because the current type has no default
    /// constructor, or it failed.
    NoDefaultConstructor,
    /// Anything else.
    Other,
}

impl Error {
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error { kind, error: error.into() }
    }

    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Other, error)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, error)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match *self {
            ErrorKind::Io => "I/O error",
            ErrorKind::CorruptStream => "corrupt bit stream",
            ErrorKind::UnsupportedType => "unsupported type",
            ErrorKind::ReflectionAccess => "reflection/descriptor access error",
            ErrorKind::UnknownCompactId => "unknown compact id",
            ErrorKind::CorruptStore => "corrupt schema store entry",
            ErrorKind::UnknownClass => "unknown class",
            ErrorKind::NoDefaultConstructor => "no default constructor",
            ErrorKind::Other => "error",
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self.kind, f)?;
        f.write_str(": ")?;
        Display::fmt(&self.error, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.error)
    }
}

macro_rules! error {
    ($k:ident, $($e:tt)*) => {
        $crate::error::Error::new(
            $crate::error::ErrorKind::$k,
            format!($($e)*),
        )
    };
}

macro_rules! bail {
    ($($e:tt)*) => { return Err(error!($($e)*)) };
}

macro_rules! ensure {
    ($c:expr, $($e:tt)*) => {
        if !$c {
            bail!($($e)*);
        }
    };
}

pub(crate) use bail;
pub(crate) use ensure;
pub(crate) use error;
