//! # Attribute Dictionary
//!
//! A tree of typed attributes addressed by dotted paths (`arch.page_size`,
//! `cpu.0.reg.rip`). Each attribute is created from a [`Template`] that fixes
//! its key, its [`AttrKind`] and, optionally, a set of [`AttrOps`] hooks:
//!
//! - `pre_set` validates or rewrites a value before it is stored,
//! - `post_set` propagates a stored value to dependent attributes,
//! - `revalidate` recomputes a value that was marked stale.
//!
//! Hooks get the whole owning context, so they can cascade into other
//! attributes. The context type implements [`AttrHost`], which provides the
//! write protocol on top of the plain [`Dict`] storage.
//!
//! Values also carry an [`Origin`]: defaults never replace explicitly set
//! values, and writing an unchanged value runs no hooks, which keeps mutually
//! dependent attributes from ping-ponging.
//!
//! ```rust
//! use kdump_attr::*;
//!
//! struct Ctx(Dict<Ctx>);
//! impl AttrHost for Ctx {
//!     fn dict(&self) -> &Dict<Self> { &self.0 }
//!     fn dict_mut(&mut self) -> &mut Dict<Self> { &mut self.0 }
//! }
//!
//! static SIZE: Template<Ctx> = Template::new("size", AttrKind::Number);
//!
//! let mut ctx = Ctx(Dict::new());
//! let root = ctx.dict().root();
//! let size = ctx.dict_mut().add_static(root, &SIZE).unwrap();
//!
//! ctx.set_number(size, 4096, Origin::Explicit).unwrap();
//! ctx.set_number(size, 512, Origin::Default).unwrap();
//! assert_eq!(ctx.get_number(size).unwrap(), Some(4096));
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

mod dict;
mod host;
mod template;
mod value;

pub use dict::{AttrId, Dict};
pub use host::AttrHost;
pub use template::{AttrOps, Template};
pub use value::{AttrKind, AttrState, AttrValue, Origin};
