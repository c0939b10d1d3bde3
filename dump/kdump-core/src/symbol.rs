//! Symbol requests from the address translation side.

use crate::Context;
use alloc::format;
use kdump_attr::{AttrHost, AttrId, AttrValue};
use kdump_status::{Error, ErrorKind, Result, ResultExt, XlatStatus, XlatSym, bridge};

impl Context {
    /// Answer a symbolic request of the translation subsystem.
    ///
    /// On failure the message is left in [`Context::xlat_ctx`], as the
    /// translation side expects.
    ///
    /// # Errors
    /// - [`XlatStatus::NoData`] if the symbol, type or register is unknown
    ///   or has no value.
    /// - [`XlatStatus::NotImplemented`] for an unsupported OS or a value that
    ///   is not numeric.
    /// - The callback's failure, converted with
    ///   [`bridge::kdump_to_addrxlat`].
    pub fn xlat_sym(&mut self, sym: XlatSym<'_>) -> core::result::Result<u64, XlatStatus> {
        log::trace!("symbol request {sym:?}");
        let base = match sym {
            XlatSym::Value(name) => {
                // The callback may re-enter the context; nothing is borrowed.
                let Some(cb) = self.sym_cb.clone() else {
                    return Err(self.xlat.set_err(XlatStatus::NoData, "NULL callback"));
                };
                return match (*cb)(self, name) {
                    Ok(val) => Ok(val),
                    res @ Err(_) => Err(bridge::kdump_to_addrxlat(&mut self.xlat, res)),
                };
            }
            XlatSym::Sizeof(_) => self.ostype_dir(false)?,
            XlatSym::Offsetof(..) => self.ostype_dir(true)?,
            XlatSym::Reg(_) => match self.dict().lookup("cpu.0.reg") {
                Some(dir) => dir,
                None => return Err(self.xlat.set_err(XlatStatus::NoData, "No registers")),
            },
        };

        let (attr, what) = match sym {
            XlatSym::Offsetof(ty, field) => {
                let ty = self.sym_child(base, ty, "Symbol")?;
                (self.sym_child(ty, field, "Field")?, "Field")
            }
            other => (self.sym_child(base, other.name(), "Symbol")?, "Symbol"),
        };

        let value = self.dict().value(attr).map(|value| match value {
            AttrValue::Number(n) | AttrValue::Address(n) => Some(*n),
            AttrValue::Directory | AttrValue::String(_) => None,
        });
        match value {
            Some(Some(n)) => Ok(n),
            Some(None) => Err(self
                .xlat
                .set_err(XlatStatus::NotImplemented, "Unhandled attribute type")),
            None => Err(self
                .xlat
                .set_err(XlatStatus::NoData, format!("{what} has no value"))),
        }
    }

    /// `<ostype>.vmcoreinfo.SIZE` (or `.OFFSET`) of the dumped OS.
    fn ostype_dir(&mut self, offsets: bool) -> core::result::Result<AttrId, XlatStatus> {
        let keys = *self.keys();
        let ostype = self.dict().value(keys.ostype).and_then(AttrValue::as_str);
        let dir = match (ostype, offsets) {
            (Some("linux"), false) => Some(keys.linux_size),
            (Some("linux"), true) => Some(keys.linux_offset),
            (Some("xen"), false) => Some(keys.xen_size),
            (Some("xen"), true) => Some(keys.xen_offset),
            _ => None,
        };
        dir.ok_or_else(|| self.xlat.set_err(XlatStatus::NotImplemented, "Unsupported OS"))
    }

    /// A child of `dir` that holds a (valid) value.
    fn sym_child(
        &mut self,
        dir: AttrId,
        name: &str,
        what: &str,
    ) -> core::result::Result<AttrId, XlatStatus> {
        let Some(attr) = self.dict().lookup_child(dir, name) else {
            return Err(self
                .xlat
                .set_err(XlatStatus::NoData, format!("{what} not found")));
        };
        if self.validate_attr(attr).is_err() {
            return Err(self
                .xlat
                .set_err(XlatStatus::NoData, format!("{what} has no value")));
        }
        Ok(attr)
    }

    /// Resolve a kernel symbol through the symbol callback.
    ///
    /// # Errors
    /// - [`ErrorKind::NoData`] if no callback is installed or the symbol is
    ///   unknown.
    /// - Any other failure of the callback.
    pub fn get_symbol_val(&mut self, name: &str) -> Result<u64> {
        if self.sym_cb.is_none() {
            return Err(Error::new(ErrorKind::NoData, "NULL callback"));
        }

        self.xlat_sym(XlatSym::Value(name)).or_else(|status| {
            let err = bridge::addrxlat_to_kdump(&mut self.xlat, status)
                .err()
                .unwrap_or_else(|| Error::from(ErrorKind::Addrxlat));
            Err(err).with_context(|| format!("Cannot resolve \"{name}\""))
        })
    }
}
