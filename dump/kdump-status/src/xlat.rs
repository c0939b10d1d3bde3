//! # Address-Translation Domain
//!
//! The status codes and error state of the external address-translation
//! subsystem, as seen from the dump reader. Only the boundary is modelled
//! here: the subsystem reports failures as an [`XlatStatus`] and leaves the
//! matching message in its [`XlatContext`].

use crate::ErrorKind;
use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;

/// Status code in the address-translation domain.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum XlatStatus {
    Ok,
    NotImplemented,
    NotPresent,
    Invalid,
    NoMemory,
    /// No data available; kept distinct from the generic failures.
    NoData,
    NoMethod,
    /// A status borrowed from the dump reader's domain.
    ///
    /// Raw values below zero carry the negated [`ErrorKind::code`].
    Custom(ErrorKind),
}

impl XlatStatus {
    /// Raw numeric code as used on the translation side.
    #[must_use]
    pub const fn to_raw(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::NotImplemented => 1,
            Self::NotPresent => 2,
            Self::Invalid => 3,
            Self::NoMemory => 4,
            Self::NoData => 5,
            Self::NoMethod => 6,
            Self::Custom(kind) => -kind.code(),
        }
    }

    /// Decode a raw numeric code. Unknown codes decode as [`XlatStatus::Invalid`].
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Ok,
            1 => Self::NotImplemented,
            2 => Self::NotPresent,
            3 => Self::Invalid,
            4 => Self::NoMemory,
            5 => Self::NoData,
            6 => Self::NoMethod,
            r if r < 0 => match ErrorKind::from_code(r.wrapping_neg()) {
                Some(kind) => Self::Custom(kind),
                None => Self::Invalid,
            },
            _ => Self::Invalid,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Error state of an address-translation context.
#[derive(Debug, Default, Clone)]
pub struct XlatContext {
    err: Option<String>,
}

impl XlatContext {
    #[must_use]
    pub const fn new() -> Self {
        Self { err: None }
    }

    /// Record an error message and return `status` unchanged.
    ///
    /// A message already present is kept as the tail of the new one, the same
    /// way [`Error::context`](crate::Error::context) accumulates messages.
    pub fn set_err(&mut self, status: XlatStatus, msg: impl Into<Cow<'static, str>>) -> XlatStatus {
        let msg = msg.into();
        self.err = Some(match self.err.take() {
            Some(prev) if !prev.is_empty() => format!("{msg}: {prev}"),
            _ => msg.into_owned(),
        });
        status
    }

    /// The pending error message, if any.
    #[must_use]
    pub fn err(&self) -> Option<&str> {
        self.err.as_deref()
    }

    /// Take the pending message out, leaving the context clean.
    pub fn take_err(&mut self) -> Option<String> {
        self.err.take()
    }

    pub fn clear_err(&mut self) {
        self.err = None;
    }
}

/// A symbolic request from the translation subsystem to the dump reader.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum XlatSym<'a> {
    /// Value of a kernel symbol.
    Value(&'a str),
    /// Size of a kernel type.
    Sizeof(&'a str),
    /// Offset of a field within a kernel type.
    Offsetof(&'a str, &'a str),
    /// Value of a CPU register (of the first CPU).
    Reg(&'a str),
}

impl XlatSym<'_> {
    /// The primary name of the request.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Value(n) | Self::Sizeof(n) | Self::Offsetof(n, _) | Self::Reg(n) => *n,
        }
    }
}
