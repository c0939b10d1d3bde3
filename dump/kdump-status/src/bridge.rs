//! # Status Bridge
//!
//! Conversions between the dump reader's [`Result`] and the
//! address-translation subsystem's [`XlatStatus`].
//!
//! Each direction moves the message along with the status: converting from
//! the translation domain drains the [`XlatContext`] error state into the
//! returned [`Error`]; converting into it consumes the [`Error`] and leaves
//! its message in the [`XlatContext`]. Success never touches either state.

use crate::{Error, ErrorKind, Result, XlatContext, XlatStatus};

/// Translate an address-translation status into a dump [`Result`].
///
/// - [`XlatStatus::Ok`] becomes `Ok(())`.
/// - [`XlatStatus::Custom`] gives back the dump status it carries.
/// - [`XlatStatus::NoData`] becomes [`ErrorKind::NoData`].
/// - Everything else becomes [`ErrorKind::Addrxlat`].
///
/// # Errors
/// Any status other than [`XlatStatus::Ok`], with the message taken from
/// (and cleared in) `xctx`.
pub fn addrxlat_to_kdump(xctx: &mut XlatContext, status: XlatStatus) -> Result<()> {
    let kind = match status {
        XlatStatus::Ok => return Ok(()),
        XlatStatus::Custom(kind) => kind,
        XlatStatus::NoData => ErrorKind::NoData,
        _ => ErrorKind::Addrxlat,
    };

    let msg = xctx.take_err().unwrap_or_default();
    Err(Error::new(kind, msg))
}

/// Translate a dump [`Result`] into an address-translation status.
///
/// [`ErrorKind::NoData`] maps to [`XlatStatus::NoData`]; every other kind
/// travels as [`XlatStatus::Custom`] so that it can be restored on the way
/// back. The error message is stored in `xctx`.
pub fn kdump_to_addrxlat<T>(xctx: &mut XlatContext, result: Result<T>) -> XlatStatus {
    let err = match result {
        Ok(_) => return XlatStatus::Ok,
        Err(err) => err,
    };

    let status = match err.kind() {
        ErrorKind::NoData => XlatStatus::NoData,
        kind => XlatStatus::Custom(kind),
    };
    xctx.set_err(status, err.into_message())
}
