//! # Dump Page Codecs
//!
//! Stateless transforms used when materialising pages of a crash dump:
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`cksum32`] | Accumulating 32-bit checksum with end-around carry. |
//! | [`uncompress_rle`] | Zero-escaped run-length decoding. |
//! | [`uncompress_page_gzip`] | DEFLATE (zlib stream) decompression of exactly one page. |
//!
//! None of them perform I/O; the caller owns both the source bytes and the
//! destination buffer.
//!
//! ## Features
//!
//! - `zlib` *(default)*: enables the DEFLATE page decompressor through
//!   `flate2`. Without it, [`uncompress_page_gzip`] reports
//!   [`ErrorKind::NotImplemented`](kdump_status::ErrorKind::NotImplemented).
//!
//! ```rust
//! # use kdump_codecs::*;
//! let mut out = [0u8; 8];
//! let n = uncompress_rle(&mut out, &[0x41, 0x00, 0x03, 0x42, 0x00, 0x00]).unwrap();
//! assert_eq!(&out[..n], b"ABBB\0");
//!
//! assert_eq!(cksum32(&[0, 0, 0, 1], 0), 1);
//! ```

#![cfg_attr(not(any(test, doctest, feature = "zlib")), no_std)]

extern crate alloc;

mod cksum;
mod gzip;
mod rle;

pub use cksum::cksum32;
pub use gzip::{uncompress_page_gzip, uncompress_page_gzip_to_vec};
pub use rle::{RleError, uncompress_rle};
