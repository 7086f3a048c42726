//! The crate-wide error type.

use core::fmt::{self, Display};

/// The kind of failure behind an [`Error`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A byte encoding had the wrong length, an unrecognized prefix, or
    /// malformed DER framing.
    InvalidEncoding,
    /// A point was not on the curve, or was the identity where forbidden.
    InvalidPoint,
    /// A scalar was zero, or `>= n`, where that is forbidden.
    InvalidScalar,
    /// Attempted to invert zero.
    NonInvertible,
    /// No square root exists for the given field element.
    NotOnCurveSquareRoot,
    /// The configured randomness source failed or was unavailable.
    RandomSourceFailure,
}

impl ErrorKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidEncoding => "invalid encoding",
            Self::InvalidPoint => "invalid point",
            Self::InvalidScalar => "invalid scalar",
            Self::NonInvertible => "value is not invertible",
            Self::NotOnCurveSquareRoot => "no square root exists for this value",
            Self::RandomSourceFailure => "random number generator failed",
        }
    }
}

/// An error returned by a fallible operation in this crate.
///
/// Never carries secret material: every variant is a fixed discriminant,
/// with no field or scalar value attached.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Error(ErrorKind);

impl Error {
    /// Returns the kind of failure this error represents.
    pub const fn kind(&self) -> ErrorKind {
        self.0
    }

    pub(crate) const fn new(kind: ErrorKind) -> Self {
        Self(kind)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl core::error::Error for Error {}

/// The crate-wide result type.
pub type Result<T> = core::result::Result<T, Error>;
