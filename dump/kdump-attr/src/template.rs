use crate::{AttrId, AttrKind, AttrValue, Origin};
use alloc::borrow::Cow;
use core::fmt;
use kdump_status::Result;

/// Change hooks attached to an attribute template.
///
/// All hooks receive the owning context mutably and may read or write other
/// attributes through it. Every method defaults to doing nothing.
pub trait AttrOps<C>: Sync {
    /// Runs before a new value is committed.
    ///
    /// The hook may rewrite `value` in place. Returning an error rejects the
    /// write and leaves the attribute as it was.
    ///
    /// # Errors
    /// Any error rejects the write.
    fn pre_set(&self, ctx: &mut C, attr: AttrId, value: &mut AttrValue, origin: Origin) -> Result<()> {
        let _ = (ctx, attr, value, origin);
        Ok(())
    }

    /// Runs after a new value has been committed.
    ///
    /// # Errors
    /// The error is returned from the write; the value stays committed.
    fn post_set(&self, ctx: &mut C, attr: AttrId) -> Result<()> {
        let _ = (ctx, attr);
        Ok(())
    }

    /// Recomputes a stale value on read.
    ///
    /// A successful hook must have set the attribute again (typically with
    /// [`Origin::Default`]) or cleared it.
    ///
    /// # Errors
    /// The error is returned from the read; the attribute stays stale.
    fn revalidate(&self, ctx: &mut C, attr: AttrId) -> Result<()> {
        let _ = (ctx, attr);
        Ok(())
    }
}

/// Static description of an attribute: its key, type and hooks.
///
/// Global templates are `static` items; templates created at run time (see
/// [`Dict::add_template`](crate::Dict::add_template)) are owned by the
/// attribute that uses them.
pub struct Template<C: 'static> {
    pub key: Cow<'static, str>,
    pub kind: AttrKind,
    pub ops: Option<&'static dyn AttrOps<C>>,
}

impl<C: 'static> Template<C> {
    #[must_use]
    pub const fn new(key: &'static str, kind: AttrKind) -> Self {
        Self {
            key: Cow::Borrowed(key),
            kind,
            ops: None,
        }
    }

    #[must_use]
    pub const fn directory(key: &'static str) -> Self {
        Self::new(key, AttrKind::Directory)
    }

    #[must_use]
    pub const fn with_ops(mut self, ops: &'static dyn AttrOps<C>) -> Self {
        self.ops = Some(ops);
        self
    }

    /// A hook-less template with a key built at run time.
    #[must_use]
    pub fn dynamic(key: impl Into<Cow<'static, str>>, kind: AttrKind) -> Self {
        Self {
            key: key.into(),
            kind,
            ops: None,
        }
    }
}

impl<C: 'static> Clone for Template<C> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            kind: self.kind,
            ops: self.ops,
        }
    }
}

impl<C: 'static> fmt::Debug for Template<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Template")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("has_ops", &self.ops.is_some())
            .finish()
    }
}
