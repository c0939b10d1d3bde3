use alloc::vec::Vec;
use kdump_status::{Error, Result};

/// Decompress one page from a zlib-wrapped DEFLATE stream.
///
/// The page size is `dst.len()`; the stream must inflate to exactly that many
/// bytes.
///
/// # Errors
/// - [`ErrorKind::Corrupt`](kdump_status::ErrorKind::Corrupt) for a damaged
///   stream, a stream that needs a preset dictionary, or an uncompressed size
///   other than `dst.len()`.
/// - [`ErrorKind::NotImplemented`](kdump_status::ErrorKind::NotImplemented)
///   if the crate was built without the `zlib` feature.
#[cfg(feature = "zlib")]
pub fn uncompress_page_gzip(dst: &mut [u8], src: &[u8]) -> Result<()> {
    use flate2::{Decompress, FlushDecompress, Status};
    use kdump_status::ErrorKind;

    let mut z = Decompress::new(true);
    let status = z.decompress(src, dst, FlushDecompress::Finish).map_err(|e| {
        let msg = if e.needs_dictionary().is_some() {
            alloc::format!("Decompression failed: preset dictionary required")
        } else {
            alloc::format!("Decompression failed: {e}")
        };
        Error::new(ErrorKind::Corrupt, msg)
    })?;

    let page_size = dst.len() as u64;
    match status {
        Status::StreamEnd if z.total_out() == page_size => Ok(()),
        Status::StreamEnd => Err(Error::new(
            ErrorKind::Corrupt,
            alloc::format!("Wrong uncompressed size: {}", z.total_out()),
        )),
        Status::Ok | Status::BufError if z.total_out() == page_size => {
            log::debug!("zlib stream continues past a {page_size}-byte page");
            Err(Error::new(
                ErrorKind::Corrupt,
                alloc::format!("Decompression failed: data exceeds page size {page_size}"),
            ))
        }
        Status::Ok | Status::BufError => Err(Error::new(
            ErrorKind::Corrupt,
            alloc::format!(
                "Decompression failed: truncated stream after {} bytes",
                z.total_out()
            ),
        )),
    }
}

/// Decompress one page when DEFLATE support is compiled out.
///
/// # Errors
/// Always [`ErrorKind::NotImplemented`](kdump_status::ErrorKind::NotImplemented).
#[cfg(not(feature = "zlib"))]
pub fn uncompress_page_gzip(_dst: &mut [u8], _src: &[u8]) -> Result<()> {
    Err(Error::new(
        kdump_status::ErrorKind::NotImplemented,
        "Unsupported compression method: zlib",
    ))
}

/// Like [`uncompress_page_gzip`], but allocates the `page_size` destination.
///
/// # Errors
/// [`ErrorKind::System`](kdump_status::ErrorKind::System) if the page buffer
/// cannot be allocated; otherwise as [`uncompress_page_gzip`].
pub fn uncompress_page_gzip_to_vec(src: &[u8], page_size: usize) -> Result<Vec<u8>> {
    let mut page = Vec::new();
    page.try_reserve_exact(page_size)
        .map_err(|_| Error::alloc("page buffer", page_size))?;
    page.resize(page_size, 0);
    uncompress_page_gzip(&mut page, src)?;
    Ok(page)
}

#[cfg(all(test, feature = "zlib"))]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use kdump_status::ErrorKind;
    use std::io::Write;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn exact_page() {
        let page = pattern(4096);
        let mut dst = vec![0u8; 4096];
        uncompress_page_gzip(&mut dst, &deflate(&page)).unwrap();
        assert_eq!(dst, page);
    }

    #[test]
    fn short_output_is_corrupt() {
        let mut dst = vec![0u8; 4096];
        let err = uncompress_page_gzip(&mut dst, &deflate(&pattern(1000))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(err.message(), "Wrong uncompressed size: 1000");
    }

    #[test]
    fn long_output_is_corrupt() {
        let mut dst = vec![0u8; 1024];
        let err = uncompress_page_gzip(&mut dst, &deflate(&pattern(4096))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupt);
    }

    #[test]
    fn garbage_is_corrupt() {
        let mut dst = vec![0u8; 512];
        let err = uncompress_page_gzip(&mut dst, b"definitely not zlib").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert!(err.message().starts_with("Decompression failed"));
    }

    #[test]
    fn truncated_stream_is_corrupt() {
        let packed = deflate(&pattern(4096));
        let mut dst = vec![0u8; 4096];
        let err = uncompress_page_gzip(&mut dst, &packed[..packed.len() / 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Corrupt);
    }

    #[test]
    fn to_vec_allocates_the_page() {
        let page = pattern(2048);
        assert_eq!(uncompress_page_gzip_to_vec(&deflate(&page), 2048).unwrap(), page);
    }
}
