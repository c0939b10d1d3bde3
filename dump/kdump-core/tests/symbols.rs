use kdump_attr::{AttrHost, AttrKind, Origin};
use kdump_core::regs::X86_64_PRSTATUS_REGS;
use kdump_core::*;
use kdump_status::{Error, ErrorKind, XlatStatus, XlatSym};
use std::sync::Arc;

fn with_symbols() -> Context {
    let mut ctx = Context::new().unwrap();
    ctx.set_symbol_callback(Some(Arc::new(|ctx: &mut Context, name: &str| match name {
        "init_task" => Ok(0xffff_ffff_8201_0000),
        "alias" => ctx.get_symbol_val("init_task"),
        "broken" => Err(Error::new(ErrorKind::Corrupt, "bad symbol table")),
        _ => Err(Error::new(ErrorKind::NoData, "no such symbol")),
    })));
    ctx
}

#[test]
fn symbol_values_come_from_the_callback() {
    let mut ctx = with_symbols();
    assert_eq!(ctx.get_symbol_val("init_task").unwrap(), 0xffff_ffff_8201_0000);
    assert_eq!(ctx.get_symbol_val("alias").unwrap(), 0xffff_ffff_8201_0000);
    assert_eq!(ctx.xlat_ctx().err(), None);
}

#[test]
fn callback_errors_survive_the_round_trip() {
    let mut ctx = with_symbols();
    let err = ctx.get_symbol_val("jiffies").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoData);
    assert_eq!(err.message(), "Cannot resolve \"jiffies\": no such symbol");
    assert_eq!(ctx.xlat_ctx().err(), None);

    let err = ctx.get_symbol_val("broken").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Corrupt);
    assert!(err.message().ends_with("bad symbol table"));
}

#[test]
fn missing_callback() {
    let mut ctx = Context::new().unwrap();
    let err = ctx.get_symbol_val("init_task").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoData);
    assert_eq!(err.message(), "NULL callback");

    assert_eq!(ctx.xlat_sym(XlatSym::Value("init_task")), Err(XlatStatus::NoData));
    assert_eq!(ctx.xlat_ctx().err(), Some("NULL callback"));
}

#[test]
fn xlat_value_request_keeps_message_in_context() {
    let mut ctx = with_symbols();
    assert_eq!(ctx.xlat_sym(XlatSym::Value("jiffies")), Err(XlatStatus::NoData));
    assert_eq!(ctx.xlat_ctx().err(), Some("no such symbol"));

    ctx.xlat_ctx_mut().clear_err();
    assert_eq!(
        ctx.xlat_sym(XlatSym::Value("broken")),
        Err(XlatStatus::Custom(ErrorKind::Corrupt))
    );
}

#[test]
fn sizes_and_offsets_follow_ostype() {
    let mut ctx = Context::new().unwrap();
    let size = ctx
        .dict_mut()
        .add_template("linux.vmcoreinfo.SIZE.page", AttrKind::Number)
        .unwrap();
    ctx.set_number(size, 64, Origin::Explicit).unwrap();
    ctx.dict_mut()
        .add_template("linux.vmcoreinfo.OFFSET.list_head", AttrKind::Directory)
        .unwrap();
    let next = ctx
        .dict_mut()
        .add_template("linux.vmcoreinfo.OFFSET.list_head.next", AttrKind::Number)
        .unwrap();
    ctx.set_number(next, 0, Origin::Explicit).unwrap();
    ctx.dict_mut()
        .add_template("linux.vmcoreinfo.OFFSET.list_head.prev", AttrKind::Number)
        .unwrap();

    assert_eq!(ctx.xlat_sym(XlatSym::Sizeof("page")), Err(XlatStatus::NotImplemented));
    assert_eq!(ctx.xlat_ctx_mut().take_err().as_deref(), Some("Unsupported OS"));

    let ostype = ctx.keys().ostype;
    ctx.set_string(ostype, "linux", Origin::Explicit).unwrap();
    assert_eq!(ctx.xlat_sym(XlatSym::Sizeof("page")), Ok(64));
    assert_eq!(ctx.xlat_sym(XlatSym::Offsetof("list_head", "next")), Ok(0));

    assert_eq!(ctx.xlat_sym(XlatSym::Sizeof("task_struct")), Err(XlatStatus::NoData));
    assert_eq!(ctx.xlat_ctx_mut().take_err().as_deref(), Some("Symbol not found"));

    assert_eq!(
        ctx.xlat_sym(XlatSym::Offsetof("list_head", "prev")),
        Err(XlatStatus::NoData)
    );
    assert_eq!(ctx.xlat_ctx_mut().take_err().as_deref(), Some("Field has no value"));

    assert_eq!(
        ctx.xlat_sym(XlatSym::Offsetof("list_head", "first")),
        Err(XlatStatus::NoData)
    );
    assert_eq!(ctx.xlat_ctx_mut().take_err().as_deref(), Some("Field not found"));

    ctx.set_string(ostype, "xen", Origin::Explicit).unwrap();
    assert_eq!(ctx.xlat_sym(XlatSym::Sizeof("page")), Err(XlatStatus::NoData));
}

#[test]
fn register_requests_read_cpu_zero() {
    let mut ctx = Context::new().unwrap();
    assert_eq!(ctx.xlat_sym(XlatSym::Reg("rip")), Err(XlatStatus::NoData));
    assert_eq!(ctx.xlat_ctx_mut().take_err().as_deref(), Some("No registers"));

    ctx.set_byte_order(ByteOrder::Little, Origin::Explicit).unwrap();
    ctx.set_cpu_regs64(0, &X86_64_PRSTATUS_REGS[16..17], &[0xffff_ffff_8100_0000u64.to_le()])
        .unwrap();
    assert_eq!(ctx.xlat_sym(XlatSym::Reg("rip")), Ok(0xffff_ffff_8100_0000));

    assert_eq!(ctx.xlat_sym(XlatSym::Reg("cr3")), Err(XlatStatus::NoData));
}

#[test]
fn non_numeric_symbol_is_not_implemented() {
    let mut ctx = Context::new().unwrap();
    let name = ctx
        .dict_mut()
        .add_template("linux.vmcoreinfo.SIZE.name", AttrKind::String)
        .unwrap();
    ctx.set_string(name, "page", Origin::Explicit).unwrap();
    let ostype = ctx.keys().ostype;
    ctx.set_string(ostype, "linux", Origin::Explicit).unwrap();

    assert_eq!(ctx.xlat_sym(XlatSym::Sizeof("name")), Err(XlatStatus::NotImplemented));
    assert_eq!(
        ctx.xlat_ctx_mut().take_err().as_deref(),
        Some("Unhandled attribute type")
    );
}
