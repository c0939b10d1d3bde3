use alloc::borrow::Cow;
use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;

/// Status code of a failed operation.
///
/// The numeric values are stable; they are what travels through the
/// address-translation bridge when an error crosses domains.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, thiserror::Error)]
#[repr(i32)]
pub enum ErrorKind {
    /// Allocation or another system resource failed.
    #[error("System error")]
    System = 1,
    /// The feature is not available in this build or for this dump.
    #[error("Unimplemented feature")]
    NotImplemented = 2,
    /// The requested data is not stored in the dump file.
    #[error("Data is not stored in the dump file")]
    NoData = 3,
    /// Malformed dump content (bad version string, bad page size, short page...).
    #[error("Corrupted file data")]
    Corrupt = 4,
    /// An argument or attribute type did not fit the operation.
    #[error("Invalid value")]
    Invalid = 5,
    /// The attribute does not exist or has no value.
    #[error("No such attribute key")]
    NoKey = 6,
    /// Generic failure reported by the address-translation subsystem.
    #[error("Address translation error")]
    Addrxlat = 9,
}

impl ErrorKind {
    /// Numeric status code (always positive; success is `Ok(())`).
    #[inline]
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Map a numeric status code back to its kind.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            1 => Self::System,
            2 => Self::NotImplemented,
            3 => Self::NoData,
            4 => Self::Corrupt,
            5 => Self::Invalid,
            6 => Self::NoKey,
            9 => Self::Addrxlat,
            _ => return None,
        })
    }
}

/// Error of a dump operation: a status code plus a descriptive message.
///
/// Messages accumulate from the inside out. The innermost failure creates the
/// error; every caller that knows more about the situation prepends its own
/// context with [`Error::context`].
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prepend `what` to the message, keeping the status code.
    #[must_use]
    pub fn context(self, what: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: Cow::Owned(format!("{what}: {}", self.message)),
        }
    }

    /// Replace the status code, keeping the message.
    #[must_use]
    pub fn with_kind(self, kind: ErrorKind) -> Self {
        Self { kind, ..self }
    }

    /// Shorthand for an allocation failure of `size` bytes of `what`.
    #[must_use]
    pub fn alloc(what: impl fmt::Display, size: usize) -> Self {
        Self::new(
            ErrorKind::System,
            format!("Cannot allocate {what} ({size} bytes)"),
        )
    }

    /// Consume the error and return its message.
    #[must_use]
    pub fn into_message(self) -> String {
        self.message.into_owned()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind, kind.to_string())
    }
}

impl From<alloc::collections::TryReserveError> for Error {
    fn from(err: alloc::collections::TryReserveError) -> Self {
        Self::new(ErrorKind::System, err.to_string())
    }
}

/// Context helpers on [`Result`].
pub trait ResultExt<T> {
    /// Prepend `what` to the error message, if any.
    ///
    /// # Errors
    /// Passes the original error through with the extra context.
    fn context(self, what: impl fmt::Display) -> Result<T>;

    /// Like [`context`](Self::context), but only builds the message on failure.
    ///
    /// # Errors
    /// Passes the original error through with the extra context.
    fn with_context<D, F>(self, f: F) -> Result<T>
    where
        D: fmt::Display,
        F: FnOnce() -> D;
}

impl<T> ResultExt<T> for Result<T> {
    #[inline]
    fn context(self, what: impl fmt::Display) -> Self {
        self.map_err(|e| e.context(what))
    }

    #[inline]
    fn with_context<D, F>(self, f: F) -> Self
    where
        D: fmt::Display,
        F: FnOnce() -> D,
    {
        self.map_err(|e| e.context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for kind in [
            ErrorKind::System,
            ErrorKind::NotImplemented,
            ErrorKind::NoData,
            ErrorKind::Corrupt,
            ErrorKind::Invalid,
            ErrorKind::NoKey,
            ErrorKind::Addrxlat,
        ] {
            assert_eq!(ErrorKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ErrorKind::from_code(0), None);
        assert_eq!(ErrorKind::from_code(7), None);
    }

    #[test]
    fn context_prepends_and_keeps_kind() {
        let err = Error::new(ErrorKind::Corrupt, "Invalid kernel version: abc")
            .context("Cannot get linux.version_code");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(
            err.to_string(),
            "Cannot get linux.version_code: Invalid kernel version: abc"
        );
    }

    #[test]
    fn result_ext_is_lazy_on_success() {
        let ok: Result<u32> = Ok(7);
        let out = ok.with_context(|| -> &'static str { panic!("must not be built") });
        assert_eq!(out, Ok(7));
    }

    #[test]
    fn kind_converts_with_default_message() {
        let err = Error::from(ErrorKind::NoData);
        assert_eq!(err.message(), "Data is not stored in the dump file");
    }

    #[test]
    fn alloc_message_names_size() {
        let err = Error::alloc("page cache", 4096);
        assert_eq!(err.kind(), ErrorKind::System);
        assert_eq!(err.message(), "Cannot allocate page cache (4096 bytes)");
    }
}
