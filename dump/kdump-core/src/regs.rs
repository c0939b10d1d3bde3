//! # CPU Register Bank
//!
//! Register values end up in numeric attributes under `cpu.<n>.reg`, one per
//! register, named by a table of templates. A dump format parser describes
//! where the registers sit in its raw per-CPU blob with a list of
//! [`RegDef`]s and hands both to [`Context::set_cpu_regs`]:
//!
//! ```rust
//! use kdump_attr::{AttrHost, Origin};
//! use kdump_core::{ByteOrder, Context, regs};
//!
//! let mut ctx = Context::new().unwrap();
//! ctx.set_byte_order(ByteOrder::Little, Origin::Explicit).unwrap();
//!
//! let mut blob = [0u8; 27 * 8];
//! blob[16 * 8..17 * 8].copy_from_slice(&0xffff_ffff_8100_0000u64.to_le_bytes());
//! ctx.set_cpu_regs(0, &regs::X86_64_PRSTATUS_REGS, &blob, regs::X86_64_PRSTATUS_DEFS)
//!     .unwrap();
//!
//! let rip = ctx.dict().lookup("cpu.0.reg.rip").unwrap();
//! assert_eq!(ctx.get_number(rip).unwrap(), Some(0xffff_ffff_8100_0000));
//! ```

use crate::Context;
use crate::arch::ByteOrder;
use alloc::format;
use kdump_attr::{AttrHost, AttrId, AttrKind, Origin, Template};
use kdump_status::{Error, ErrorKind, Result, ResultExt};

/// Sealed trait pattern to restrict `RegWord` impls to the supported widths.
mod sealed {
    pub trait Sealed {}
}

/// A register word of one of the supported widths (16, 32 or 64 bits).
pub trait RegWord: sealed::Sealed + Copy {
    /// Width in bytes.
    const SIZE: usize;

    /// Reinterpret `SIZE` bytes of dump memory without converting them.
    fn from_raw(bytes: &[u8]) -> Self;

    /// Convert a value in dump byte order to a host-order number.
    fn to_host(self, order: ByteOrder) -> u64;
}

macro_rules! reg_word {
    ($($ty:ty),*) => {$(
        impl sealed::Sealed for $ty {}
        impl RegWord for $ty {
            const SIZE: usize = size_of::<$ty>();

            fn from_raw(bytes: &[u8]) -> Self {
                let mut buf = [0u8; size_of::<$ty>()];
                buf.copy_from_slice(&bytes[..Self::SIZE]);
                <$ty>::from_ne_bytes(buf)
            }

            fn to_host(self, order: ByteOrder) -> u64 {
                u64::from(match order {
                    ByteOrder::Big => <$ty>::from_be(self),
                    ByteOrder::Little => <$ty>::from_le(self),
                })
            }
        }
    )*};
}

reg_word!(u16, u32, u64);

/// Width of the registers in one [`RegDef`] group.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RegWidth {
    W16,
    W32,
    W64,
}

impl RegWidth {
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::W16 => 16,
            Self::W32 => 32,
            Self::W64 => 64,
        }
    }

    #[must_use]
    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }
}

/// A run of equally sized registers in a raw register blob.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RegDef {
    pub width: RegWidth,
    /// Byte offset of the first register in the blob.
    pub offset: usize,
    /// Number of consecutive registers.
    pub count: usize,
    /// Index of the first register's template in the name table.
    pub regidx: usize,
}

const fn reg(name: &'static str) -> Template<Context> {
    Template::new(name, AttrKind::Number)
}

/// x86-64 `elf_prstatus.pr_reg` register names.
pub static X86_64_PRSTATUS_REGS: [Template<Context>; 27] = [
    reg("r15"),
    reg("r14"),
    reg("r13"),
    reg("r12"),
    reg("rbp"),
    reg("rbx"),
    reg("r11"),
    reg("r10"),
    reg("r9"),
    reg("r8"),
    reg("rax"),
    reg("rcx"),
    reg("rdx"),
    reg("rsi"),
    reg("rdi"),
    reg("orig_rax"),
    reg("rip"),
    reg("cs"),
    reg("eflags"),
    reg("rsp"),
    reg("ss"),
    reg("fs_base"),
    reg("gs_base"),
    reg("ds"),
    reg("es"),
    reg("fs"),
    reg("gs"),
];

/// x86-64 `elf_prstatus.pr_reg` layout.
pub const X86_64_PRSTATUS_DEFS: &[RegDef] = &[RegDef {
    width: RegWidth::W64,
    offset: 0,
    count: 27,
    regidx: 0,
}];

/// IA-32 `elf_prstatus.pr_reg` register names.
pub static IA32_PRSTATUS_REGS: [Template<Context>; 17] = [
    reg("ebx"),
    reg("ecx"),
    reg("edx"),
    reg("esi"),
    reg("edi"),
    reg("ebp"),
    reg("eax"),
    reg("ds"),
    reg("es"),
    reg("fs"),
    reg("gs"),
    reg("orig_eax"),
    reg("eip"),
    reg("cs"),
    reg("eflags"),
    reg("esp"),
    reg("ss"),
];

/// IA-32 `elf_prstatus.pr_reg` layout.
pub const IA32_PRSTATUS_DEFS: &[RegDef] = &[RegDef {
    width: RegWidth::W32,
    offset: 0,
    count: 17,
    regidx: 0,
}];

impl Context {
    /// Get or create `cpu.<cpu>.reg`.
    fn cpu_regs_dir(&mut self, cpu: u32) -> Result<AttrId> {
        let cpu_dir = self.keys().cpu;
        self.dict_mut()
            .create_path(cpu_dir, &format!("{cpu}.reg"))
            .with_context(|| format!("Cannot allocate CPU {cpu} registers"))
    }

    fn set_cpu_reg(
        &mut self,
        cpu: u32,
        dir: AttrId,
        tmpl: &'static Template<Context>,
        val: u64,
    ) -> Result<()> {
        let attr = self
            .dict_mut()
            .add_static(dir, tmpl)
            .with_context(|| format!("Cannot allocate CPU {cpu} register {}", tmpl.key))?;
        self.set_number(attr, val, Origin::Default)
            .with_context(|| format!("Cannot set CPU {cpu} register {}", tmpl.key))
    }

    /// Write registers given as raw dump-order words, one per template.
    ///
    /// # Errors
    /// - [`ErrorKind::Invalid`] if there are more values than templates.
    /// - [`ErrorKind::NoData`] if the byte order is not known.
    /// - The first register that cannot be created or set; the remaining
    ///   registers are not written.
    pub fn set_cpu_regs_words<W: RegWord>(
        &mut self,
        cpu: u32,
        tmpls: &'static [Template<Context>],
        regs: &[W],
    ) -> Result<()> {
        if regs.len() > tmpls.len() {
            return Err(Error::new(
                ErrorKind::Invalid,
                format!(
                    "CPU {cpu}: {} register values but only {} names",
                    regs.len(),
                    tmpls.len()
                ),
            ));
        }
        let order = self
            .require_byte_order()
            .with_context(|| format!("Cannot set CPU {cpu} registers"))?;

        let dir = self.cpu_regs_dir(cpu)?;
        for (tmpl, &raw) in tmpls.iter().zip(regs) {
            self.set_cpu_reg(cpu, dir, tmpl, raw.to_host(order))?;
        }
        Ok(())
    }

    /// # Errors
    /// As [`Context::set_cpu_regs_words`].
    pub fn set_cpu_regs16(
        &mut self,
        cpu: u32,
        tmpls: &'static [Template<Context>],
        regs: &[u16],
    ) -> Result<()> {
        self.set_cpu_regs_words(cpu, tmpls, regs)
    }

    /// # Errors
    /// As [`Context::set_cpu_regs_words`].
    pub fn set_cpu_regs32(
        &mut self,
        cpu: u32,
        tmpls: &'static [Template<Context>],
        regs: &[u32],
    ) -> Result<()> {
        self.set_cpu_regs_words(cpu, tmpls, regs)
    }

    /// # Errors
    /// As [`Context::set_cpu_regs_words`].
    pub fn set_cpu_regs64(
        &mut self,
        cpu: u32,
        tmpls: &'static [Template<Context>],
        regs: &[u64],
    ) -> Result<()> {
        self.set_cpu_regs_words(cpu, tmpls, regs)
    }

    /// Write all register groups in `defs` from a raw register blob.
    ///
    /// # Errors
    /// - [`ErrorKind::Corrupt`] if a group lies outside `data`.
    /// - [`ErrorKind::Invalid`] if a group refers to templates beyond the
    ///   end of `tmpls`.
    /// - As [`Context::set_cpu_regs_words`].
    pub fn set_cpu_regs(
        &mut self,
        cpu: u32,
        tmpls: &'static [Template<Context>],
        data: &[u8],
        defs: &[RegDef],
    ) -> Result<()> {
        for def in defs {
            let names = def
                .regidx
                .checked_add(def.count)
                .and_then(|end| tmpls.get(def.regidx..end))
                .ok_or_else(|| {
                    Error::new(
                        ErrorKind::Invalid,
                        format!(
                            "Register names {}..+{} out of range ({} defined)",
                            def.regidx,
                            def.count,
                            tmpls.len()
                        ),
                    )
                })?;

            let raw = def
                .count
                .checked_mul(def.width.bytes())
                .and_then(|len| def.offset.checked_add(len))
                .and_then(|end| data.get(def.offset..end))
                .ok_or_else(|| {
                    Error::new(
                        ErrorKind::Corrupt,
                        format!(
                            "CPU {cpu} register data too short: {} x {}-bit at offset {} of {} bytes",
                            def.count,
                            def.width.bits(),
                            def.offset,
                            data.len()
                        ),
                    )
                })?;

            match def.width {
                RegWidth::W16 => self.set_cpu_regs_raw::<u16>(cpu, names, raw)?,
                RegWidth::W32 => self.set_cpu_regs_raw::<u32>(cpu, names, raw)?,
                RegWidth::W64 => self.set_cpu_regs_raw::<u64>(cpu, names, raw)?,
            }
        }
        Ok(())
    }

    fn set_cpu_regs_raw<W: RegWord>(
        &mut self,
        cpu: u32,
        tmpls: &'static [Template<Context>],
        raw: &[u8],
    ) -> Result<()> {
        let order = self
            .require_byte_order()
            .with_context(|| format!("Cannot set CPU {cpu} registers"))?;

        let dir = self.cpu_regs_dir(cpu)?;
        for (tmpl, bytes) in tmpls.iter().zip(raw.chunks_exact(W::SIZE)) {
            self.set_cpu_reg(cpu, dir, tmpl, W::from_raw(bytes).to_host(order))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_conversion() {
        let raw = 0x1122_3344u32.to_be_bytes();
        assert_eq!(u32::from_raw(&raw).to_host(ByteOrder::Big), 0x1122_3344);
        assert_eq!(u32::from_raw(&raw).to_host(ByteOrder::Little), 0x4433_2211);

        let raw = 0xBEEFu16.to_le_bytes();
        assert_eq!(u16::from_raw(&raw).to_host(ByteOrder::Little), 0xBEEF);
    }

    #[test]
    fn layouts_match_their_tables() {
        for (defs, names) in [
            (X86_64_PRSTATUS_DEFS, X86_64_PRSTATUS_REGS.len()),
            (IA32_PRSTATUS_DEFS, IA32_PRSTATUS_REGS.len()),
        ] {
            let total: usize = defs.iter().map(|d| d.count).sum();
            assert_eq!(total, names);
        }
        assert_eq!(X86_64_PRSTATUS_REGS[16].key, "rip");
        assert_eq!(IA32_PRSTATUS_REGS[12].key, "eip");
    }
}
