use kdump_codecs::{RleError, cksum32, uncompress_rle};

#[test]
fn rle_reports_produced_length_for_oversized_destination() {
    let src = [0x41, 0x00, 0x03, 0x42, 0x00, 0x00];
    let mut dst = [0u8; 4096];
    let n = uncompress_rle(&mut dst, &src).unwrap();
    assert_eq!(&dst[..n], &[0x41, 0x42, 0x42, 0x42, 0x00]);
}

#[test]
fn rle_destination_too_small_for_run() {
    let src = [0x41, 0x00, 0x03, 0x42, 0x00, 0x00];
    let mut dst = [0u8; 2];
    let err = uncompress_rle(&mut dst, &src).unwrap_err();
    assert_eq!(err, RleError::Overflow { written: 1 });
    assert_eq!(err.written(), 1);
    assert_eq!(dst, [0x41, 0x00]);
}

#[test]
fn rle_input_ending_on_escape_fails() {
    let mut dst = [0u8; 8];
    assert!(matches!(
        uncompress_rle(&mut dst, &[0x00]),
        Err(RleError::Truncated { written: 0 })
    ));
}

#[test]
fn checksum_is_deterministic_and_chainable() {
    let page: Vec<u8> = (0u32..1024).flat_map(u32::to_be_bytes).collect();
    let a = cksum32(&page, 0);
    let b = cksum32(&page, 0);
    assert_eq!(a, b);

    let chained = cksum32(&page[512..], cksum32(&page[..512], 0));
    assert_eq!(chained, a);
}

#[cfg(feature = "zlib")]
#[test]
fn gzip_page_round_trip_through_flate2() {
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    let page = vec![0x5Au8; 8192];
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::best());
    enc.write_all(&page).unwrap();
    let packed = enc.finish().unwrap();

    let mut out = vec![0u8; 8192];
    kdump_codecs::uncompress_page_gzip(&mut out, &packed).unwrap();
    assert_eq!(out, page);
}

#[cfg(not(feature = "zlib"))]
#[test]
fn gzip_page_reports_not_implemented() {
    let mut out = [0u8; 16];
    let err = kdump_codecs::uncompress_page_gzip(&mut out, &[]).unwrap_err();
    assert_eq!(err.kind(), kdump_status::ErrorKind::NotImplemented);
}
