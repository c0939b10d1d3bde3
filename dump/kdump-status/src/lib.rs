//! # Dump Status Codes and Error Bridge
//!
//! Every fallible operation of the dump reader returns [`Result`], carrying an
//! [`Error`] made of an [`ErrorKind`] (the status code) and a human-readable
//! message. Call sites add context as the error travels up, so a failure deep
//! inside a cascade reads like
//!
//! ```text
//! Cannot set arch.page_size: Invalid page size: 3000
//! ```
//!
//! ## Two error domains
//!
//! The address-translation subsystem keeps its own status codes
//! ([`XlatStatus`]) and stores its last error message in an [`XlatContext`].
//! The [`bridge`] functions convert between the two domains:
//!
//! | This library | Address translation |
//! |--------------|---------------------|
//! | `Ok(())` | [`XlatStatus::Ok`] |
//! | [`ErrorKind::NoData`] | [`XlatStatus::NoData`] |
//! | any other kind `k` | [`XlatStatus::Custom(k)`](XlatStatus::Custom) |
//! | [`ErrorKind::Addrxlat`] | any other translation status |
//!
//! "No data" is kept distinct from generic failure in both directions, and
//! the message text moves with the status.
//!
//! ```rust
//! # use kdump_status::*;
//! let mut xctx = XlatContext::new();
//! let err = Error::new(ErrorKind::NoData, "symbol not found");
//! let status = bridge::kdump_to_addrxlat(&mut xctx, Err::<(), _>(err));
//! assert_eq!(status, XlatStatus::NoData);
//!
//! let back = bridge::addrxlat_to_kdump(&mut xctx, status).unwrap_err();
//! assert_eq!(back.kind(), ErrorKind::NoData);
//! assert_eq!(back.message(), "symbol not found");
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

pub mod bridge;
mod error;
mod xlat;

pub use error::{Error, ErrorKind, Result, ResultExt};
pub use xlat::{XlatContext, XlatStatus, XlatSym};
