use core::fmt;
use core::str::FromStr;
use kdump_status::{Error, ErrorKind};

/// A known dump architecture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Arch {
    Aarch64,
    Alpha,
    Arm,
    Ia32,
    Ia64,
    Mips,
    Ppc,
    Ppc64,
    S390,
    S390x,
    X86_64,
}

impl Arch {
    pub const ALL: [Self; 11] = [
        Self::Aarch64,
        Self::Alpha,
        Self::Arm,
        Self::Ia32,
        Self::Ia64,
        Self::Mips,
        Self::Ppc,
        Self::Ppc64,
        Self::S390,
        Self::S390x,
        Self::X86_64,
    ];

    /// Canonical name, as stored in `arch.name`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aarch64 => "aarch64",
            Self::Alpha => "alpha",
            Self::Arm => "arm",
            Self::Ia32 => "ia32",
            Self::Ia64 => "ia64",
            Self::Mips => "mips",
            Self::Ppc => "ppc",
            Self::Ppc64 => "ppc64",
            Self::S390 => "s390",
            Self::S390x => "s390x",
            Self::X86_64 => "x86_64",
        }
    }

    /// Look up a canonical name. Anything else is an unknown architecture.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    /// Map a kernel `utsname.machine` string to an architecture.
    #[must_use]
    pub fn from_machine(machine: &str) -> Option<Self> {
        Some(match machine {
            "alpha" => Self::Alpha,
            "ia64" => Self::Ia64,
            "mips" => Self::Mips,
            "ppc" => Self::Ppc,
            "ppc64" | "ppc64le" => Self::Ppc64,
            "s390" => Self::S390,
            "s390x" => Self::S390x,
            "i386" | "i586" | "i686" => Self::Ia32,
            "x86_64" => Self::X86_64,
            "arm64" | "aarch64" => Self::Aarch64,
            m if m.starts_with("arm") => Self::Arm,
            _ => return None,
        })
    }

    /// Native pointer size in bytes.
    #[must_use]
    pub const fn ptr_size(self) -> u64 {
        match self {
            Self::Alpha | Self::Ia64 | Self::Ppc64 | Self::S390x | Self::X86_64 => 8,
            Self::Aarch64 | Self::Arm | Self::Ia32 | Self::Mips | Self::Ppc | Self::S390 => 4,
        }
    }

    /// Page shift to assume when the dump does not say.
    ///
    /// `None` where the page size varies between kernel builds.
    #[must_use]
    pub const fn default_page_shift(self) -> Option<u32> {
        match self {
            Self::Alpha => Some(13),
            Self::Arm | Self::Mips | Self::S390 | Self::S390x | Self::Ia32 | Self::X86_64 => {
                Some(12)
            }
            Self::Aarch64 | Self::Ia64 | Self::Ppc | Self::Ppc64 => None,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            Error::new(
                ErrorKind::Invalid,
                alloc::format!("Unknown architecture: {s}"),
            )
        })
    }
}

/// Byte order of the dumped machine, as stored in `arch.byte_order`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u64)]
pub enum ByteOrder {
    Big = 0,
    Little = 1,
}

impl ByteOrder {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Option<Self> {
        match raw {
            0 => Some(Self::Big),
            1 => Some(Self::Little),
            _ => None,
        }
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self as u64
    }

    /// Byte order of the machine running this code.
    #[must_use]
    pub const fn host() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Big => "big endian",
            Self::Little => "little endian",
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip() {
        for arch in Arch::ALL {
            assert_eq!(Arch::from_name(arch.as_str()), Some(arch));
            assert_eq!(arch.as_str().parse::<Arch>().unwrap(), arch);
        }
        assert_eq!(Arch::from_name(""), None);
        assert_eq!(Arch::from_name("vax"), None);
    }

    #[test]
    fn machine_mapping() {
        assert_eq!(Arch::from_machine("i686"), Some(Arch::Ia32));
        assert_eq!(Arch::from_machine("ppc64le"), Some(Arch::Ppc64));
        assert_eq!(Arch::from_machine("arm64"), Some(Arch::Aarch64));
        assert_eq!(Arch::from_machine("armv7l"), Some(Arch::Arm));
        assert_eq!(Arch::from_machine("x86_64"), Some(Arch::X86_64));
        assert_eq!(Arch::from_machine("riscv64"), None);
        assert_eq!(Arch::from_machine("x86"), None);
    }

    #[test]
    fn geometry_defaults() {
        assert_eq!(Arch::X86_64.ptr_size(), 8);
        assert_eq!(Arch::Aarch64.ptr_size(), 4);
        assert_eq!(Arch::Alpha.default_page_shift(), Some(13));
        assert_eq!(Arch::Ppc64.default_page_shift(), None);
    }

    #[test]
    fn byte_order_codes() {
        assert_eq!(ByteOrder::from_raw(0), Some(ByteOrder::Big));
        assert_eq!(ByteOrder::from_raw(1), Some(ByteOrder::Little));
        assert_eq!(ByteOrder::from_raw(2), None);
        assert_eq!(ByteOrder::Little.raw(), 1);
    }
}
