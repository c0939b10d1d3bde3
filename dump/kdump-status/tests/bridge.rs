use kdump_status::bridge::{addrxlat_to_kdump, kdump_to_addrxlat};
use kdump_status::{Error, ErrorKind, XlatContext, XlatStatus};

#[test]
fn nodata_round_trips_as_nodata() {
    let mut xctx = XlatContext::new();

    let err = Error::new(ErrorKind::NoData, "No registers");
    let st = kdump_to_addrxlat(&mut xctx, Err::<(), _>(err));
    assert_eq!(st, XlatStatus::NoData);
    assert_eq!(xctx.err(), Some("No registers"));

    let back = addrxlat_to_kdump(&mut xctx, st).unwrap_err();
    assert_eq!(back.kind(), ErrorKind::NoData);
    assert_eq!(back.message(), "No registers");

    // Both error states are drained by now.
    assert_eq!(xctx.err(), None);
}

#[test]
fn dump_kinds_survive_the_translation_domain() {
    for kind in [
        ErrorKind::System,
        ErrorKind::NotImplemented,
        ErrorKind::Corrupt,
        ErrorKind::Invalid,
        ErrorKind::NoKey,
    ] {
        let mut xctx = XlatContext::new();
        let st = kdump_to_addrxlat(&mut xctx, Err::<(), _>(Error::new(kind, "boom")));
        assert_eq!(st, XlatStatus::Custom(kind));

        // Through the raw integer, as a foreign callback would return it.
        let st = XlatStatus::from_raw(st.to_raw());
        let back = addrxlat_to_kdump(&mut xctx, st).unwrap_err();
        assert_eq!(back.kind(), kind);
        assert_eq!(back.message(), "boom");
    }
}

#[test]
fn translation_nodata_is_not_generic() {
    let mut xctx = XlatContext::new();
    let st = xctx.set_err(XlatStatus::NoData, "Page not present");
    let err = addrxlat_to_kdump(&mut xctx, st).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoData);

    let st = xctx.set_err(XlatStatus::NotPresent, "Page not present");
    let err = addrxlat_to_kdump(&mut xctx, st).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Addrxlat);
}
