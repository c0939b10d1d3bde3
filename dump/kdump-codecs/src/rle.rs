use kdump_status::{Error, ErrorKind};

/// Failure of [`uncompress_rle`].
///
/// Both variants report how many bytes had been written to the destination
/// when decoding stopped; nothing past that point was touched.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RleError {
    #[error("RLE output overflows destination after {written} bytes")]
    Overflow { written: usize },
    #[error("RLE input truncated after {written} output bytes")]
    Truncated { written: usize },
}

impl RleError {
    /// Bytes written before the failure.
    #[must_use]
    pub const fn written(self) -> usize {
        match self {
            Self::Overflow { written } | Self::Truncated { written } => written,
        }
    }
}

impl From<RleError> for Error {
    fn from(err: RleError) -> Self {
        Self::new(ErrorKind::Corrupt, alloc::format!("{err}"))
    }
}

/// Decode a zero-escaped run-length stream into `dst`.
///
/// Every byte is copied verbatim except `0x00`, which starts an escape:
///
/// - `00 00` is a literal zero byte;
/// - `00 n b` (with `n > 0`) is `n` copies of `b`.
///
/// `dst.len()` is an upper bound on the output, not its exact size; the
/// number of bytes actually produced is returned.
///
/// # Errors
/// - [`RleError::Overflow`] if the output does not fit into `dst`.
/// - [`RleError::Truncated`] if the input ends inside an escape sequence.
pub fn uncompress_rle(dst: &mut [u8], src: &[u8]) -> Result<usize, RleError> {
    let mut out = 0usize;
    let mut input = src.iter().copied();

    while let Some(byte) = input.next() {
        if byte == 0 {
            let cnt = input.next().ok_or(RleError::Truncated { written: out })?;
            if cnt != 0 {
                let cnt = usize::from(cnt);
                let end = out + cnt;
                if end > dst.len() {
                    return Err(RleError::Overflow { written: out });
                }
                let fill = input.next().ok_or(RleError::Truncated { written: out })?;
                dst[out..end].fill(fill);
                out = end;
                continue;
            }
        }

        let slot = dst.get_mut(out).ok_or(RleError::Overflow { written: out })?;
        *slot = byte;
        out += 1;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_runs_and_escaped_zero() {
        let mut dst = [0xEEu8; 16];
        let n = uncompress_rle(&mut dst, &[0x41, 0x00, 0x03, 0x42, 0x00, 0x00]).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&dst[..n], b"ABBB\0");
        assert!(dst[n..].iter().all(|&b| b == 0xEE));
    }

    #[test]
    fn empty_input() {
        let mut dst = [0u8; 4];
        assert_eq!(uncompress_rle(&mut dst, &[]), Ok(0));
    }

    #[test]
    fn exact_fit() {
        let mut dst = [0u8; 4];
        assert_eq!(uncompress_rle(&mut dst, &[0x00, 0x04, 0x7F]), Ok(4));
        assert_eq!(dst, [0x7F; 4]);
    }

    #[test]
    fn run_overflow_leaves_tail_untouched() {
        let mut dst = [0xEEu8; 3];
        let err = uncompress_rle(&mut dst, &[0x41, 0x00, 0x03, 0x42]).unwrap_err();
        assert_eq!(err, RleError::Overflow { written: 1 });
        assert_eq!(dst, [0x41, 0xEE, 0xEE]);
    }

    #[test]
    fn literal_overflow() {
        let mut dst = [0u8; 2];
        let err = uncompress_rle(&mut dst, b"abc").unwrap_err();
        assert_eq!(err, RleError::Overflow { written: 2 });
    }

    #[test]
    fn truncated_escapes() {
        let mut dst = [0u8; 8];
        assert_eq!(
            uncompress_rle(&mut dst, &[0x41, 0x00]),
            Err(RleError::Truncated { written: 1 })
        );
        assert_eq!(
            uncompress_rle(&mut dst, &[0x00, 0x02]),
            Err(RleError::Truncated { written: 0 })
        );
    }

    #[test]
    fn converts_to_corrupt() {
        let err = Error::from(RleError::Truncated { written: 3 });
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(err.message(), "RLE input truncated after 3 output bytes");
    }
}
