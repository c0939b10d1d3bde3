//! Derivation cascades between the global attributes.

use crate::arch::{Arch, ByteOrder};
use crate::version::{KernelVersion, xen_version_code};
use crate::Context;
use alloc::format;
use kdump_attr::{AttrHost, AttrId, AttrOps, AttrValue, Origin};
use kdump_status::{Error, ErrorKind, Result, ResultExt};

/// `arch.name`: select the architecture and derive its geometry.
pub struct ArchName;

impl AttrOps<Context> for ArchName {
    fn post_set(&self, ctx: &mut Context, attr: AttrId) -> Result<()> {
        let name = ctx.get_string(attr)?.unwrap_or_default();
        let arch = Arch::from_name(&name);
        ctx.reset_arch(arch);

        let keys = *ctx.keys();
        let Some(arch) = arch else {
            log::warn!("unknown architecture {name:?}");
            clear_default(ctx, keys.ptr_size);
            clear_default(ctx, keys.pteval_size);
            return Ok(());
        };
        log::debug!("selected architecture {arch}");

        ctx.set_number(keys.ptr_size, arch.ptr_size(), Origin::Default)?;
        let ptr_size = ctx.get_number(keys.ptr_size)?.unwrap_or_else(|| arch.ptr_size());
        ctx.set_number(keys.pteval_size, ptr_size, Origin::Default)?;

        if !is_explicit(ctx, keys.page_size)
            && !is_explicit(ctx, keys.page_shift)
            && let Some(shift) = arch.default_page_shift()
        {
            ctx.set_page_shift(shift, Origin::Default)?;
        }

        // Initialization happens once the page size settles.
        if ctx.dict().is_set(keys.page_size) && !ctx.arch_init().is_done() {
            ctx.do_arch_init()?;
        }
        Ok(())
    }
}

fn is_explicit(ctx: &Context, attr: AttrId) -> bool {
    ctx.dict().origin(attr) == Some(Origin::Explicit)
}

/// The value of `attr` if it was set explicitly.
fn explicit_number(ctx: &Context, attr: AttrId) -> Option<u64> {
    if is_explicit(ctx, attr) {
        ctx.dict().value(attr).and_then(AttrValue::as_number)
    } else {
        None
    }
}

/// Forget a value derived from a previous selection.
fn clear_default(ctx: &mut Context, attr: AttrId) {
    if ctx.dict().origin(attr) == Some(Origin::Default) {
        ctx.dict_mut().clear(attr);
    }
}

/// `linux.uts.machine`: guess the architecture if nothing else named it.
pub struct UtsMachine;

impl AttrOps<Context> for UtsMachine {
    fn post_set(&self, ctx: &mut Context, attr: AttrId) -> Result<()> {
        let arch_name = ctx.keys().arch_name;
        if ctx.dict().is_set(arch_name) {
            return Ok(());
        }

        let machine = ctx.get_string(attr)?.unwrap_or_default();
        match Arch::from_machine(&machine) {
            Some(arch) => ctx.set_string(arch_name, arch.as_str(), Origin::Default),
            None => {
                log::warn!("cannot map machine {machine:?} to an architecture");
                Ok(())
            }
        }
    }
}

/// `arch.byte_order`: only big (0) and little (1) endian exist.
pub struct ByteOrderHook;

impl AttrOps<Context> for ByteOrderHook {
    fn pre_set(&self, _: &mut Context, _: AttrId, value: &mut AttrValue, _: Origin) -> Result<()> {
        let raw = value.as_number().unwrap_or(u64::MAX);
        match ByteOrder::from_raw(raw) {
            Some(_) => Ok(()),
            None => Err(Error::new(ErrorKind::Invalid, format!("Invalid byte order: {raw}"))),
        }
    }

    fn post_set(&self, ctx: &mut Context, attr: AttrId) -> Result<()> {
        let order = ctx.get_number(attr)?.and_then(ByteOrder::from_raw);
        ctx.cache_byte_order(order);
        Ok(())
    }
}

/// `arch.page_size`: must be a power of two; keeps `arch.page_shift` in step.
pub struct PageSize;

impl AttrOps<Context> for PageSize {
    fn pre_set(&self, ctx: &mut Context, _: AttrId, value: &mut AttrValue, origin: Origin) -> Result<()> {
        let size = value.as_number().unwrap_or(0);
        if !size.is_power_of_two() {
            return Err(Error::new(ErrorKind::Corrupt, format!("Invalid page size: {size}")));
        }

        let shift_attr = ctx.keys().page_shift;
        if origin == Origin::Default
            && let Some(shift) = explicit_number(ctx, shift_attr)
        {
            // An explicit page shift decides the page size.
            *value = AttrValue::Number(1 << shift);
            return Ok(());
        }
        ctx.set_page_shift(size.trailing_zeros(), origin)
    }

    fn post_set(&self, ctx: &mut Context, _: AttrId) -> Result<()> {
        ctx.realloc_caches()?;
        if ctx.dict().is_set(ctx.keys().arch_name) && !ctx.arch_init().is_done() {
            ctx.do_arch_init()?;
        }
        Ok(())
    }
}

/// `arch.page_shift`: keeps `arch.page_size` in step.
pub struct PageShift;

impl AttrOps<Context> for PageShift {
    fn pre_set(&self, ctx: &mut Context, _: AttrId, value: &mut AttrValue, origin: Origin) -> Result<()> {
        let shift = value.as_number().unwrap_or(u64::MAX);
        if shift >= u64::from(u64::BITS) {
            return Err(Error::new(ErrorKind::Corrupt, format!("Invalid page shift: {shift}")));
        }

        let size_attr = ctx.keys().page_size;
        if origin == Origin::Default
            && let Some(size) = explicit_number(ctx, size_attr)
        {
            // An explicit page size decides the page shift.
            *value = AttrValue::Number(size.trailing_zeros().into());
        }
        Ok(())
    }

    fn post_set(&self, ctx: &mut Context, attr: AttrId) -> Result<()> {
        let Some(shift) = ctx.get_number(attr)? else {
            return Ok(());
        };
        let origin = ctx.dict().origin(attr).unwrap_or(Origin::Default);
        log::debug!("page shift {shift} ({origin:?})");
        ctx.set_page_size(1 << shift, origin)
    }
}

/// `linux.uts.release` and `linux.uts.version`: the version code is stale.
pub struct LinuxVer;

impl AttrOps<Context> for LinuxVer {
    fn post_set(&self, ctx: &mut Context, _: AttrId) -> Result<()> {
        let code = ctx.keys().linux_version_code;
        ctx.invalidate_attr(code);
        Ok(())
    }
}

/// `linux.version_code`: parsed from `linux.uts.release` when read.
pub struct LinuxVersionCode;

impl AttrOps<Context> for LinuxVersionCode {
    fn revalidate(&self, ctx: &mut Context, attr: AttrId) -> Result<()> {
        let release = ctx.keys().uts_release;
        let release = ctx
            .get_string(release)
            .context("Cannot get Linux release")?
            .ok_or_else(|| Error::new(ErrorKind::NoData, "Linux release is not known"))?;

        let ver = KernelVersion::parse(&release)?;
        match ctx.dict().stale_value(attr).and_then(AttrValue::as_number) {
            Some(prev) if prev != ver.code() => {
                log::debug!("Linux {ver} from release {release:?} (was {prev:#x})");
            }
            _ => log::trace!("Linux {ver} from release {release:?}"),
        }
        ctx.set_number(attr, ver.code(), Origin::Default)
    }
}

/// `xen.version.major` and `xen.version.minor`: the version code is stale.
pub struct XenVer;

impl AttrOps<Context> for XenVer {
    fn post_set(&self, ctx: &mut Context, _: AttrId) -> Result<()> {
        let code = ctx.keys().xen_version_code;
        ctx.invalidate_attr(code);
        Ok(())
    }
}

/// `xen.version_code`: packed from the Xen major and minor version.
pub struct XenVersionCode;

impl AttrOps<Context> for XenVersionCode {
    fn revalidate(&self, ctx: &mut Context, attr: AttrId) -> Result<()> {
        let keys = *ctx.keys();
        let major = ctx
            .get_number(keys.xen_major)
            .context("Cannot get Xen major")?
            .ok_or_else(|| Error::new(ErrorKind::NoData, "Xen major version is not known"))?;
        let minor = ctx
            .get_number(keys.xen_minor)
            .context("Cannot get Xen minor")?
            .ok_or_else(|| Error::new(ErrorKind::NoData, "Xen minor version is not known"))?;

        ctx.set_number(attr, xen_version_code(major, minor), Origin::Default)
    }
}
