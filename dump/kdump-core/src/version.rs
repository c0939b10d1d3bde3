use alloc::format;
use core::fmt;
use kdump_status::{Error, ErrorKind, Result};

/// A Linux kernel version triplet.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct KernelVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl KernelVersion {
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse the leading `major[.minor[.patch]]` of a kernel release string.
    ///
    /// Missing components are zero and anything after the last parsed
    /// component (`-rc1`, `-generic`, ...) is ignored.
    ///
    /// # Errors
    /// [`ErrorKind::Corrupt`] if the string does not start with a number, or
    /// a `.` separator is not followed by a number.
    pub fn parse(release: &str) -> Result<Self> {
        let bad = || Error::new(ErrorKind::Corrupt, format!("Invalid kernel version: {release}"));

        let mut rest = release;
        let mut parts = [0u64; 3];
        for (i, part) in parts.iter_mut().enumerate() {
            if i > 0 {
                match rest.strip_prefix('.') {
                    Some(tail) => rest = tail,
                    None => break,
                }
            }
            let (num, tail) = split_number(rest).ok_or_else(bad)?;
            *part = num;
            rest = tail;
        }

        let [major, minor, patch] = parts;
        Ok(Self::new(major, minor, patch))
    }

    /// Packed `KERNEL_VERSION(major, minor, patch)` code.
    #[must_use]
    pub const fn code(self) -> u64 {
        linux_version_code(self.major, self.minor, self.patch)
    }
}

impl fmt::Display for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Split a leading decimal number off `s`.
fn split_number(s: &str) -> Option<(u64, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, tail) = s.split_at(end);
    if digits.is_empty() {
        return None;
    }
    let num = digits
        .bytes()
        .fold(0u64, |n, d| n.saturating_mul(10).saturating_add(u64::from(d - b'0')));
    Some((num, tail))
}

/// Pack a Linux version; minor and patch saturate at 255.
#[must_use]
pub const fn linux_version_code(major: u64, minor: u64, patch: u64) -> u64 {
    let minor = if minor > 255 { 255 } else { minor };
    let patch = if patch > 255 { 255 } else { patch };
    (major << 16) + (minor << 8) + patch
}

/// Pack a Xen version; minor saturates at `0xffff`.
#[must_use]
pub const fn xen_version_code(major: u64, minor: u64) -> u64 {
    let minor = if minor > 0xffff { 0xffff } else { minor };
    (major << 16) | minor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_triplet() {
        let v = KernelVersion::parse("5.10.7").unwrap();
        assert_eq!(v, KernelVersion::new(5, 10, 7));
        assert_eq!(v.code(), 0x0005_0A07);
    }

    #[test]
    fn missing_components_are_zero() {
        assert_eq!(KernelVersion::parse("4.19").unwrap(), KernelVersion::new(4, 19, 0));
        assert_eq!(KernelVersion::parse("3").unwrap(), KernelVersion::new(3, 0, 0));
    }

    #[test]
    fn suffix_is_ignored() {
        let v = KernelVersion::parse("6.1.0-13-amd64").unwrap();
        assert_eq!(v, KernelVersion::new(6, 1, 0));
        assert_eq!(KernelVersion::parse("4.19-rc1").unwrap(), KernelVersion::new(4, 19, 0));
    }

    #[test]
    fn malformed() {
        for s in ["abc", "", ".1", "5.", "5.x", "5.10.", "5.10.y"] {
            let err = KernelVersion::parse(s).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Corrupt, "{s:?}");
        }
        assert_eq!(
            KernelVersion::parse("abc").unwrap_err().message(),
            "Invalid kernel version: abc"
        );
    }

    #[test]
    fn codes_preserve_ordering() {
        assert!(linux_version_code(4, 19, 0) < linux_version_code(5, 0, 0));
        assert!(linux_version_code(5, 4, 255) < linux_version_code(5, 5, 0));
        assert_eq!(linux_version_code(4, 4, 302), linux_version_code(4, 4, 255));
        assert_eq!(xen_version_code(4, 11), 0x0004_000B);
        assert_eq!(xen_version_code(1, 0x1_0000), 0x0001_FFFF);
    }
}
