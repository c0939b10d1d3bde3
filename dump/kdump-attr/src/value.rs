use alloc::borrow::Cow;
use core::fmt;

/// Declared type of an attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttrKind {
    /// A container for other attributes.
    Directory,
    /// An unsigned number.
    Number,
    /// A raw (untranslated) address.
    Address,
    /// A string.
    String,
}

impl AttrKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::Number => "number",
            Self::Address => "address",
            Self::String => "string",
        }
    }
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum AttrValue {
    Directory,
    Number(u64),
    Address(u64),
    String(Cow<'static, str>),
}

impl AttrValue {
    #[must_use]
    pub const fn kind(&self) -> AttrKind {
        match self {
            Self::Directory => AttrKind::Directory,
            Self::Number(_) => AttrKind::Number,
            Self::Address(_) => AttrKind::Address,
            Self::String(_) => AttrKind::String,
        }
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_address(&self) -> Option<u64> {
        match self {
            Self::Address(a) => Some(*a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<u64> for AttrValue {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<&'static str> for AttrValue {
    fn from(s: &'static str) -> Self {
        Self::String(Cow::Borrowed(s))
    }
}

impl From<alloc::string::String> for AttrValue {
    fn from(s: alloc::string::String) -> Self {
        Self::String(Cow::Owned(s))
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Directory => f.write_str("<directory>"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Address(a) => write!(f, "{a:#x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Where a value came from.
///
/// An [`Explicit`](Origin::Explicit) value was set on purpose (by the user or
/// by parsing a fact stated in the dump); a [`Default`](Origin::Default)
/// value was filled in from an architecture or format default, or computed.
/// A default never replaces an explicit value, while an explicit value always
/// replaces a default.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Origin {
    Default,
    Explicit,
}

/// Observable state of an attribute's value slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttrState {
    /// No value.
    Unset,
    /// A current value.
    Set,
    /// A value (possibly not yet computed) waiting to be revalidated on the
    /// next read.
    Stale,
}
