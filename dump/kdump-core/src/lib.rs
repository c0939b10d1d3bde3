//! # Kernel Dump Metadata
//!
//! [`Context`] holds what is known about one kernel crash dump: the machine
//! architecture, page geometry, kernel and Xen versions, the kernel's UTS
//! record and per-CPU register values. Format parsers discover these facts
//! in whatever order the dump format stores them and push them in as
//! attribute writes; the derived attributes follow automatically.
//!
//! | Attribute | Derived from / effect |
//! |-----------|-----------------------|
//! | `arch.name` | pointer size, PTE value size, default page size, architecture init |
//! | `linux.uts.machine` | `arch.name`, unless already set |
//! | `arch.page_size` | `arch.page_shift`; cache reallocation, architecture init |
//! | `arch.page_shift` | `arch.page_size` |
//! | `linux.version_code` | parsed from `linux.uts.release` when read |
//! | `xen.version_code` | packed from `xen.version.{major,minor}` when read |
//!
//! ```rust
//! use kdump_attr::Origin;
//! use kdump_core::Context;
//!
//! let mut ctx = Context::new().unwrap();
//! ctx.set_arch_name("x86_64", Origin::Default).unwrap();
//! assert_eq!(ctx.page_size().unwrap(), Some(4096));
//! assert_eq!(ctx.ptr_size().unwrap(), Some(8));
//!
//! ctx.set_page_size(8192, Origin::Explicit).unwrap();
//! assert_eq!(ctx.page_shift().unwrap(), Some(13));
//! ```
//!
//! Values carry an [`Origin`](kdump_attr::Origin): architecture defaults
//! never replace facts that were stated explicitly.
//!
//! ## Features
//! - `zlib` (default): DEFLATE page decompression in
//!   [`Context::uncompress_page`].

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

mod arch;
mod context;
mod gattr;
mod hooks;
pub mod regs;
mod symbol;
mod uts;
mod version;

pub use arch::{Arch, ByteOrder};
pub use context::{ArchInit, ArchOps, Context, FormatOps, SymbolFn};
pub use gattr::GlobalKeys;
pub use regs::{RegDef, RegWidth, RegWord};
pub use uts::{UTS_FIELD_LEN, UTS_LEN, UTS_RECORD_LEN, UTS_SYSNAME, Utsname, uts_str};
pub use version::{KernelVersion, linux_version_code, xen_version_code};
