//! Global attributes every dump context carries.

use crate::Context;
use crate::hooks;
use kdump_attr::{AttrId, AttrKind, Dict, Template};
use kdump_status::Result;

type Tmpl = Template<Context>;

static FILE: Tmpl = Template::directory("file");
static FILE_DESCRIPTION: Tmpl = Template::new("description", AttrKind::String);

static ARCH: Tmpl = Template::directory("arch");
static ARCH_NAME: Tmpl = Template::new("name", AttrKind::String).with_ops(&hooks::ArchName);
static BYTE_ORDER: Tmpl = Template::new("byte_order", AttrKind::Number).with_ops(&hooks::ByteOrderHook);
static PTR_SIZE: Tmpl = Template::new("ptr_size", AttrKind::Number);
static PAGE_SIZE: Tmpl = Template::new("page_size", AttrKind::Number).with_ops(&hooks::PageSize);
static PAGE_SHIFT: Tmpl = Template::new("page_shift", AttrKind::Number).with_ops(&hooks::PageShift);
static PTEVAL_SIZE: Tmpl = Template::new("pteval_size", AttrKind::Number);

static LINUX: Tmpl = Template::directory("linux");
static UTS: Tmpl = Template::directory("uts");
static UTS_SYSNAME: Tmpl = Template::new("sysname", AttrKind::String);
static UTS_NODENAME: Tmpl = Template::new("nodename", AttrKind::String);
static UTS_RELEASE: Tmpl = Template::new("release", AttrKind::String).with_ops(&hooks::LinuxVer);
static UTS_VERSION: Tmpl = Template::new("version", AttrKind::String).with_ops(&hooks::LinuxVer);
static UTS_MACHINE: Tmpl = Template::new("machine", AttrKind::String).with_ops(&hooks::UtsMachine);
static UTS_DOMAINNAME: Tmpl = Template::new("domainname", AttrKind::String);
static LINUX_VERSION_CODE: Tmpl =
    Template::new("version_code", AttrKind::Number).with_ops(&hooks::LinuxVersionCode);

static VMCOREINFO: Tmpl = Template::directory("vmcoreinfo");
static VMCOREINFO_SIZE: Tmpl = Template::directory("SIZE");
static VMCOREINFO_OFFSET: Tmpl = Template::directory("OFFSET");

static XEN: Tmpl = Template::directory("xen");
static XEN_VERSION: Tmpl = Template::directory("version");
static XEN_MAJOR: Tmpl = Template::new("major", AttrKind::Number).with_ops(&hooks::XenVer);
static XEN_MINOR: Tmpl = Template::new("minor", AttrKind::Number).with_ops(&hooks::XenVer);
static XEN_VERSION_CODE: Tmpl =
    Template::new("version_code", AttrKind::Number).with_ops(&hooks::XenVersionCode);

static ADDRXLAT: Tmpl = Template::directory("addrxlat");
static OSTYPE: Tmpl = Template::new("ostype", AttrKind::String);

static CPU: Tmpl = Template::directory("cpu");

/// Handles of the global attributes.
#[derive(Debug, Copy, Clone)]
pub struct GlobalKeys {
    pub file_description: AttrId,
    pub arch_name: AttrId,
    pub byte_order: AttrId,
    pub ptr_size: AttrId,
    pub page_size: AttrId,
    pub page_shift: AttrId,
    pub pteval_size: AttrId,
    pub uts_sysname: AttrId,
    pub uts_nodename: AttrId,
    pub uts_release: AttrId,
    pub uts_version: AttrId,
    pub uts_machine: AttrId,
    pub uts_domainname: AttrId,
    pub linux_version_code: AttrId,
    pub linux_size: AttrId,
    pub linux_offset: AttrId,
    pub xen_major: AttrId,
    pub xen_minor: AttrId,
    pub xen_version_code: AttrId,
    pub xen_size: AttrId,
    pub xen_offset: AttrId,
    pub ostype: AttrId,
    pub cpu: AttrId,
}

pub(crate) fn populate(dict: &mut Dict<Context>) -> Result<GlobalKeys> {
    let root = dict.root();

    let file = dict.add_static(root, &FILE)?;
    let arch = dict.add_static(root, &ARCH)?;
    let linux = dict.add_static(root, &LINUX)?;
    let uts = dict.add_static(linux, &UTS)?;
    let linux_vmcoreinfo = dict.add_static(linux, &VMCOREINFO)?;
    let xen = dict.add_static(root, &XEN)?;
    let xen_version = dict.add_static(xen, &XEN_VERSION)?;
    let xen_vmcoreinfo = dict.add_static(xen, &VMCOREINFO)?;
    let addrxlat = dict.add_static(root, &ADDRXLAT)?;

    Ok(GlobalKeys {
        file_description: dict.add_static(file, &FILE_DESCRIPTION)?,
        arch_name: dict.add_static(arch, &ARCH_NAME)?,
        byte_order: dict.add_static(arch, &BYTE_ORDER)?,
        ptr_size: dict.add_static(arch, &PTR_SIZE)?,
        page_size: dict.add_static(arch, &PAGE_SIZE)?,
        page_shift: dict.add_static(arch, &PAGE_SHIFT)?,
        pteval_size: dict.add_static(arch, &PTEVAL_SIZE)?,
        uts_sysname: dict.add_static(uts, &UTS_SYSNAME)?,
        uts_nodename: dict.add_static(uts, &UTS_NODENAME)?,
        uts_release: dict.add_static(uts, &UTS_RELEASE)?,
        uts_version: dict.add_static(uts, &UTS_VERSION)?,
        uts_machine: dict.add_static(uts, &UTS_MACHINE)?,
        uts_domainname: dict.add_static(uts, &UTS_DOMAINNAME)?,
        linux_version_code: dict.add_static(linux, &LINUX_VERSION_CODE)?,
        linux_size: dict.add_static(linux_vmcoreinfo, &VMCOREINFO_SIZE)?,
        linux_offset: dict.add_static(linux_vmcoreinfo, &VMCOREINFO_OFFSET)?,
        xen_major: dict.add_static(xen_version, &XEN_MAJOR)?,
        xen_minor: dict.add_static(xen_version, &XEN_MINOR)?,
        xen_version_code: dict.add_static(xen, &XEN_VERSION_CODE)?,
        xen_size: dict.add_static(xen_vmcoreinfo, &VMCOREINFO_SIZE)?,
        xen_offset: dict.add_static(xen_vmcoreinfo, &VMCOREINFO_OFFSET)?,
        ostype: dict.add_static(addrxlat, &OSTYPE)?,
        cpu: dict.add_static(root, &CPU)?,
    })
}
