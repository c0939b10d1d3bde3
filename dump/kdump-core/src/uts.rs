//! Kernel `struct new_utsname`.

use crate::Context;
use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use kdump_attr::{AttrHost, Origin};
use kdump_status::{Error, ErrorKind, Result, ResultExt};

/// Maximum string length of a field, without the terminating NUL.
pub const UTS_LEN: usize = 64;
/// Size of one field in the raw record.
pub const UTS_FIELD_LEN: usize = UTS_LEN + 1;
/// Size of the raw record.
pub const UTS_RECORD_LEN: usize = 6 * UTS_FIELD_LEN;
/// `sysname` of every Linux kernel.
pub const UTS_SYSNAME: &str = "Linux";

/// Raw UTS record as found in the dumped kernel image.
#[derive(Clone, Eq, PartialEq)]
pub struct Utsname {
    pub sysname: [u8; UTS_FIELD_LEN],
    pub nodename: [u8; UTS_FIELD_LEN],
    pub release: [u8; UTS_FIELD_LEN],
    pub version: [u8; UTS_FIELD_LEN],
    pub machine: [u8; UTS_FIELD_LEN],
    pub domainname: [u8; UTS_FIELD_LEN],
}

impl Utsname {
    /// Split a raw record into its fields.
    ///
    /// # Errors
    /// [`ErrorKind::Corrupt`] if `raw` is shorter than [`UTS_RECORD_LEN`].
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let raw = raw.get(..UTS_RECORD_LEN).ok_or_else(|| {
            Error::new(
                ErrorKind::Corrupt,
                format!("UTS record too short: {} bytes", raw.len()),
            )
        })?;

        let mut fields = raw.chunks_exact(UTS_FIELD_LEN).map(|chunk| {
            let mut field = [0u8; UTS_FIELD_LEN];
            field.copy_from_slice(chunk);
            field
        });
        let mut next = || fields.next().unwrap_or([0; UTS_FIELD_LEN]);
        Ok(Self {
            sysname: next(),
            nodename: next(),
            release: next(),
            version: next(),
            machine: next(),
            domainname: next(),
        })
    }

    /// Whether this plausibly is a Linux UTS record.
    ///
    /// Every field but `domainname` must be NUL-terminated within its width,
    /// release, version and machine must not be empty, and the system name
    /// must be `"Linux"`.
    #[must_use]
    pub fn looks_sane(&self) -> bool {
        let terminated = [
            &self.sysname,
            &self.nodename,
            &self.release,
            &self.version,
            &self.machine,
        ]
        .iter()
        .all(|f| f[UTS_LEN] == 0);

        terminated
            && self.release[0] != 0
            && self.version[0] != 0
            && self.machine[0] != 0
            && uts_str(&self.sysname) == UTS_SYSNAME
    }
}

impl core::fmt::Debug for Utsname {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Utsname")
            .field("sysname", &uts_str(&self.sysname))
            .field("nodename", &uts_str(&self.nodename))
            .field("release", &uts_str(&self.release))
            .field("version", &uts_str(&self.version))
            .field("machine", &uts_str(&self.machine))
            .field("domainname", &uts_str(&self.domainname))
            .finish()
    }
}

/// The string in a UTS field: at most [`UTS_LEN`] bytes, up to the first NUL.
#[must_use]
pub fn uts_str(field: &[u8]) -> Cow<'_, str> {
    let field = &field[..field.len().min(UTS_LEN)];
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end])
}

impl Context {
    /// Store a UTS record in `linux.uts.*`.
    ///
    /// A field is written if it is non-empty or its attribute has no value
    /// yet, so an empty field never wipes out a known value.
    ///
    /// # Errors
    /// The first failing write, naming the attribute.
    pub fn set_uts(&mut self, uts: &Utsname) -> Result<()> {
        let keys = *self.keys();
        let fields = [
            (keys.uts_sysname, &uts.sysname),
            (keys.uts_nodename, &uts.nodename),
            (keys.uts_release, &uts.release),
            (keys.uts_version, &uts.version),
            (keys.uts_machine, &uts.machine),
            (keys.uts_domainname, &uts.domainname),
        ];

        for (attr, raw) in fields {
            if raw[0] != 0 || !self.dict().is_set(attr) {
                let value = String::from(uts_str(raw));
                self.set_string(attr, value, Origin::Default)
                    .with_context(|| format!("Cannot set attribute {}", self.dict().path(attr)))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: [&[u8]; 6]) -> [u8; UTS_RECORD_LEN] {
        let mut raw = [0u8; UTS_RECORD_LEN];
        for (i, f) in fields.iter().enumerate() {
            let at = i * UTS_FIELD_LEN;
            raw[at..at + f.len()].copy_from_slice(f);
        }
        raw
    }

    #[test]
    fn sane_record() {
        let raw = record([b"Linux", b"host", b"5.10.7", b"#1 SMP", b"x86_64", b""]);
        let uts = Utsname::from_bytes(&raw).unwrap();
        assert!(uts.looks_sane());
        assert_eq!(uts_str(&uts.release), "5.10.7");
        assert_eq!(uts_str(&uts.domainname), "");
    }

    #[test]
    fn insane_records() {
        let raw = record([b"Linux", b"host", b"", b"#1", b"x86_64", b""]);
        assert!(!Utsname::from_bytes(&raw).unwrap().looks_sane());

        let raw = record([b"Hurd", b"host", b"0.9", b"#1", b"i686", b""]);
        assert!(!Utsname::from_bytes(&raw).unwrap().looks_sane());

        let raw = record([b"Linux", &[b'n'; UTS_FIELD_LEN], b"5.1", b"#1", b"arm", b""]);
        assert!(!Utsname::from_bytes(&raw).unwrap().looks_sane());
    }

    #[test]
    fn unterminated_field_is_truncated() {
        let raw = record([b"Linux", &[b'n'; UTS_FIELD_LEN], b"5.1", b"#1", b"arm", b""]);
        let uts = Utsname::from_bytes(&raw).unwrap();
        assert_eq!(uts_str(&uts.nodename).len(), UTS_LEN);
    }

    #[test]
    fn short_record_is_corrupt() {
        let err = Utsname::from_bytes(&[0u8; 100]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupt);
    }
}
