use crate::dict::Slot;
use crate::{AttrId, AttrKind, AttrValue, Dict, Origin};
use alloc::borrow::Cow;
use alloc::format;
use kdump_status::{Error, ErrorKind, Result, ResultExt};

/// A context that owns a [`Dict`] whose hooks operate on the context itself.
///
/// The provided methods implement the write protocol: type checking, origin
/// precedence, `pre_set`/`post_set` hooks and lazy revalidation of stale
/// values. Hooks receive `&mut Self` and may recurse into these methods.
pub trait AttrHost: Sized + 'static {
    fn dict(&self) -> &Dict<Self>;
    fn dict_mut(&mut self) -> &mut Dict<Self>;

    /// Set an attribute.
    ///
    /// - A [`Origin::Default`] write never replaces a current
    ///   [`Origin::Explicit`] value; it succeeds without effect.
    /// - Writing the value the attribute already holds runs no hooks. An
    ///   explicit write may still upgrade the origin of an equal default.
    /// - Otherwise `pre_set` runs first and may rewrite or reject the value;
    ///   then the value is committed and `post_set` runs.
    ///
    /// # Errors
    /// - [`ErrorKind::Invalid`] if the value does not match the declared type.
    /// - Any error returned by a hook, with the attribute path as context.
    fn set_attr(&mut self, id: AttrId, mut value: AttrValue, origin: Origin) -> Result<()> {
        let dict = self.dict();
        let tmpl = dict.template(id);
        if value.kind() != tmpl.kind {
            return Err(Error::new(
                ErrorKind::Invalid,
                format!(
                    "Type mismatch for {}: expected {}, got {}",
                    dict.path(id),
                    tmpl.kind,
                    value.kind()
                ),
            ));
        }
        let ops = tmpl.ops;

        let unchanged = match dict.slot(id) {
            Slot::Set {
                value: cur,
                origin: cur_origin,
            } => {
                if origin < *cur_origin {
                    log::trace!("keeping explicit {} = {cur}", dict.path(id));
                    return Ok(());
                }
                *cur == value
            }
            Slot::Unset | Slot::Stale { .. } => false,
        };
        if unchanged {
            self.dict_mut().commit(id, value, origin);
            return Ok(());
        }

        if let Some(ops) = ops {
            ops.pre_set(self, id, &mut value, origin)
                .with_context(|| format!("Cannot set {}", self.dict().path(id)))?;

            // The cascade may already have stored this exact value.
            if let Slot::Set {
                value: cur,
                origin: cur_origin,
            } = self.dict().slot(id)
                && *cur == value
                && *cur_origin == origin
            {
                return Ok(());
            }
        }

        log::trace!("{} = {value}", self.dict().path(id));
        self.dict_mut().commit(id, value, origin);

        if let Some(ops) = ops {
            ops.post_set(self, id)
                .with_context(|| format!("Cannot set {}", self.dict().path(id)))?;
        }
        Ok(())
    }

    /// Mark an attribute stale so that the next read revalidates it.
    ///
    /// An unset attribute becomes a pending one: reading it derives the
    /// value through the `revalidate` hook.
    fn invalidate_attr(&mut self, id: AttrId) {
        log::trace!("invalidating {}", self.dict().path(id));
        self.dict_mut().mark_stale(id);
    }

    /// Make sure a stale attribute is current.
    ///
    /// # Errors
    /// - [`ErrorKind::NoData`] if the attribute has no value.
    /// - [`ErrorKind::Invalid`] if the `revalidate` hook left it stale.
    /// - Any error returned by the hook, with the attribute path as context.
    ///
    /// # Panics
    /// If the attribute's `revalidate` hook reads the attribute itself.
    fn validate_attr(&mut self, id: AttrId) -> Result<()> {
        match self.dict().slot(id) {
            Slot::Set { .. } => return Ok(()),
            Slot::Unset => {
                return Err(Error::new(
                    ErrorKind::NoData,
                    format!("{} has no value", self.dict().path(id)),
                ));
            }
            Slot::Stale { .. } => {}
        }

        let dict = self.dict();
        let path = dict.path(id);
        let Some(ops) = dict.template(id).ops else {
            return Err(Error::new(
                ErrorKind::Invalid,
                format!("{path} is stale and cannot be revalidated"),
            ));
        };

        log::trace!("revalidating {path}");
        let reentered = self.dict_mut().set_revalidating(id, true);
        assert!(!reentered, "recursive revalidation of {path}");
        let res = ops.revalidate(self, id);
        self.dict_mut().set_revalidating(id, false);
        res.with_context(|| format!("Cannot revalidate {path}"))?;

        if matches!(self.dict().slot(id), Slot::Stale { .. }) {
            return Err(Error::new(
                ErrorKind::Invalid,
                format!("{path} was not revalidated"),
            ));
        }
        Ok(())
    }

    /// Read an attribute, revalidating it first if needed.
    ///
    /// # Errors
    /// As [`AttrHost::validate_attr`], except that an unset attribute reads
    /// as `Ok(None)`.
    fn get_attr(&mut self, id: AttrId) -> Result<Option<AttrValue>> {
        if !self.dict().is_set(id) {
            return Ok(None);
        }
        self.validate_attr(id)?;
        Ok(self.dict().value(id).cloned())
    }

    /// Read a number attribute.
    ///
    /// # Errors
    /// As [`AttrHost::get_attr`]; [`ErrorKind::Invalid`] for a non-number.
    fn get_number(&mut self, id: AttrId) -> Result<Option<u64>> {
        match self.get_attr(id)? {
            None => Ok(None),
            Some(AttrValue::Number(n)) => Ok(Some(n)),
            Some(other) => Err(type_error(self.dict(), id, &other, AttrKind::Number)),
        }
    }

    /// Read an address attribute.
    ///
    /// # Errors
    /// As [`AttrHost::get_attr`]; [`ErrorKind::Invalid`] for a non-address.
    fn get_address(&mut self, id: AttrId) -> Result<Option<u64>> {
        match self.get_attr(id)? {
            None => Ok(None),
            Some(AttrValue::Address(a)) => Ok(Some(a)),
            Some(other) => Err(type_error(self.dict(), id, &other, AttrKind::Address)),
        }
    }

    /// Read a string attribute.
    ///
    /// # Errors
    /// As [`AttrHost::get_attr`]; [`ErrorKind::Invalid`] for a non-string.
    fn get_string(&mut self, id: AttrId) -> Result<Option<Cow<'static, str>>> {
        match self.get_attr(id)? {
            None => Ok(None),
            Some(AttrValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(type_error(self.dict(), id, &other, AttrKind::String)),
        }
    }

    /// # Errors
    /// As [`AttrHost::set_attr`].
    fn set_number(&mut self, id: AttrId, n: u64, origin: Origin) -> Result<()> {
        self.set_attr(id, AttrValue::Number(n), origin)
    }

    /// # Errors
    /// As [`AttrHost::set_attr`].
    fn set_address(&mut self, id: AttrId, addr: u64, origin: Origin) -> Result<()> {
        self.set_attr(id, AttrValue::Address(addr), origin)
    }

    /// # Errors
    /// As [`AttrHost::set_attr`].
    fn set_string(
        &mut self,
        id: AttrId,
        s: impl Into<Cow<'static, str>>,
        origin: Origin,
    ) -> Result<()> {
        self.set_attr(id, AttrValue::String(s.into()), origin)
    }

    /// Set the attribute at a full dotted path.
    ///
    /// # Errors
    /// [`ErrorKind::NoKey`] if the path does not exist; otherwise as
    /// [`AttrHost::set_attr`].
    fn set_path(&mut self, path: &str, value: AttrValue, origin: Origin) -> Result<()> {
        let id = self.dict().require(path)?;
        self.set_attr(id, value, origin)
    }

    /// Read the attribute at a full dotted path.
    ///
    /// # Errors
    /// [`ErrorKind::NoKey`] if the path does not exist; otherwise as
    /// [`AttrHost::get_attr`].
    fn get_path(&mut self, path: &str) -> Result<Option<AttrValue>> {
        let id = self.dict().require(path)?;
        self.get_attr(id)
    }
}

fn type_error<C: 'static>(dict: &Dict<C>, id: AttrId, got: &AttrValue, want: AttrKind) -> Error {
    Error::new(
        ErrorKind::Invalid,
        format!("{} holds a {}, not a {want}", dict.path(id), got.kind()),
    )
}
