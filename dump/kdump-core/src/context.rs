use crate::arch::{Arch, ByteOrder};
use crate::gattr::{self, GlobalKeys};
use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use kdump_attr::{AttrHost, AttrKind, AttrValue, Dict, Origin};
use kdump_status::{Error, ErrorKind, Result, ResultExt, XlatContext};

/// Architecture-specific setup.
///
/// An implementation is registered per [`Arch`] with
/// [`Context::register_arch_ops`]. Architectures without a registered table
/// simply have no custom operations.
pub trait ArchOps: Send + Sync {
    /// Runs once per architecture selection, after the byte order, pointer
    /// size and page geometry are known and the caches are sized.
    ///
    /// # Errors
    /// Returned from the attribute write that triggered initialization.
    fn init(&self, ctx: &mut Context) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Removes the attributes `init` created. Runs when the architecture
    /// changes.
    fn attr_cleanup(&self, ctx: &mut Context) {
        let _ = ctx;
    }
}

/// Callbacks into the dump format driver.
pub trait FormatOps: Send + Sync {
    /// Resize caches whose geometry depends on the page size.
    ///
    /// # Errors
    /// Returned from the page size write.
    fn realloc_caches(&self, ctx: &mut Context) -> Result<()> {
        let _ = ctx;
        Ok(())
    }
}

/// One-shot architecture initialization state.
///
/// Reset to [`Uninitialized`](ArchInit::Uninitialized) whenever `arch.name`
/// changes; the table used by the last initialization is kept so that it can
/// clean up after itself.
#[derive(Clone, Default)]
pub enum ArchInit {
    #[default]
    Uninitialized,
    Initialized(Option<Arc<dyn ArchOps>>),
}

impl ArchInit {
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Initialized(_))
    }
}

impl fmt::Debug for ArchInit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("Uninitialized"),
            Self::Initialized(ops) => f
                .debug_tuple("Initialized")
                .field(&ops.as_ref().map(|_| "ArchOps"))
                .finish(),
        }
    }
}

/// Resolves a kernel symbol name to its value.
///
/// The callback receives the context and may read or write attributes
/// through it.
pub type SymbolFn = dyn Fn(&mut Context, &str) -> Result<u64> + Send + Sync;

/// Metadata of one open dump file.
///
/// All attribute access goes through the [`AttrHost`] methods. The context
/// is not synchronized; callers serialize access to it.
pub struct Context {
    dict: Dict<Self>,
    keys: GlobalKeys,
    arch: Option<Arch>,
    arch_init: ArchInit,
    arch_ops: BTreeMap<Arch, Arc<dyn ArchOps>>,
    format_ops: Option<Arc<dyn FormatOps>>,
    byte_order: Option<ByteOrder>,
    pub(crate) xlat: XlatContext,
    pub(crate) sym_cb: Option<Arc<SymbolFn>>,
}

impl AttrHost for Context {
    fn dict(&self) -> &Dict<Self> {
        &self.dict
    }

    fn dict_mut(&mut self) -> &mut Dict<Self> {
        &mut self.dict
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Context")
            .field("arch", &self.arch)
            .field("arch_init", &self.arch_init)
            .field("byte_order", &self.byte_order)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Create a context with all global attributes present and unset.
    ///
    /// # Errors
    /// [`ErrorKind::System`] if the attribute tree cannot be allocated.
    pub fn new() -> Result<Self> {
        let mut dict = Dict::new();
        let keys = gattr::populate(&mut dict).context("Cannot create global attributes")?;
        Ok(Self {
            dict,
            keys,
            arch: None,
            arch_init: ArchInit::Uninitialized,
            arch_ops: BTreeMap::new(),
            format_ops: None,
            byte_order: None,
            xlat: XlatContext::new(),
            sym_cb: None,
        })
    }

    /// Handles of the global attributes.
    #[must_use]
    pub const fn keys(&self) -> &GlobalKeys {
        &self.keys
    }

    /// The architecture selected by `arch.name`, if it is a known one.
    #[must_use]
    pub const fn arch(&self) -> Option<Arch> {
        self.arch
    }

    #[must_use]
    pub const fn arch_init(&self) -> &ArchInit {
        &self.arch_init
    }

    /// Byte order from `arch.byte_order`.
    #[must_use]
    pub const fn byte_order(&self) -> Option<ByteOrder> {
        self.byte_order
    }

    pub(crate) const fn cache_byte_order(&mut self, order: Option<ByteOrder>) {
        self.byte_order = order;
    }

    /// Byte order, reported as an error if it is still unknown.
    ///
    /// # Errors
    /// [`ErrorKind::NoData`] if `arch.byte_order` is not set.
    pub fn require_byte_order(&self) -> Result<ByteOrder> {
        self.byte_order
            .ok_or_else(|| Error::new(ErrorKind::NoData, "Byte order is not known"))
    }

    pub fn register_arch_ops(&mut self, arch: Arch, ops: Arc<dyn ArchOps>) {
        self.arch_ops.insert(arch, ops);
    }

    pub fn set_format_ops(&mut self, ops: Option<Arc<dyn FormatOps>>) {
        self.format_ops = ops;
    }

    /// Install the symbol resolver used by [`Context::get_symbol_val`] and
    /// symbol requests from the translation side.
    pub fn set_symbol_callback(&mut self, cb: Option<Arc<SymbolFn>>) {
        self.sym_cb = cb;
    }

    /// Error state of the translation domain.
    #[must_use]
    pub const fn xlat_ctx(&self) -> &XlatContext {
        &self.xlat
    }

    pub const fn xlat_ctx_mut(&mut self) -> &mut XlatContext {
        &mut self.xlat
    }

    /// Forget the previous architecture and its initialization.
    pub(crate) fn reset_arch(&mut self, arch: Option<Arch>) {
        if let ArchInit::Initialized(Some(ops)) = core::mem::take(&mut self.arch_init) {
            log::debug!("cleaning up after {:?}", self.arch);
            ops.attr_cleanup(self);
        }
        self.arch = arch;
    }

    /// Run architecture initialization and mark it done.
    pub(crate) fn do_arch_init(&mut self) -> Result<()> {
        let ops = self.arch.and_then(|arch| self.arch_ops.get(&arch).cloned());
        self.arch_init = ArchInit::Initialized(ops.clone());
        log::debug!(
            "initializing {:?} ({} custom operations)",
            self.arch,
            if ops.is_some() { "with" } else { "no" }
        );
        match ops {
            Some(ops) => ops.init(self).context("Cannot initialize architecture"),
            None => Ok(()),
        }
    }

    pub(crate) fn realloc_caches(&mut self) -> Result<()> {
        match self.format_ops.clone() {
            Some(ops) => {
                log::debug!("reallocating caches");
                ops.realloc_caches(self).context("Cannot reallocate caches")
            }
            None => Ok(()),
        }
    }

    /// Set `arch.name`.
    ///
    /// # Errors
    /// As [`AttrHost::set_attr`].
    pub fn set_arch_name(&mut self, name: impl Into<Cow<'static, str>>, origin: Origin) -> Result<()> {
        self.set_string(self.keys.arch_name, name, origin)
    }

    /// # Errors
    /// As [`AttrHost::get_attr`].
    pub fn arch_name(&mut self) -> Result<Option<Cow<'static, str>>> {
        self.get_string(self.keys.arch_name)
    }

    /// # Errors
    /// As [`AttrHost::set_attr`].
    pub fn set_byte_order(&mut self, order: ByteOrder, origin: Origin) -> Result<()> {
        self.set_number(self.keys.byte_order, order.raw(), origin)
    }

    /// Set `arch.page_size`; `arch.page_shift` follows.
    ///
    /// # Errors
    /// [`ErrorKind::Corrupt`] unless `size` is a power of two; otherwise as
    /// [`AttrHost::set_attr`].
    pub fn set_page_size(&mut self, size: u64, origin: Origin) -> Result<()> {
        self.set_number(self.keys.page_size, size, origin)
    }

    /// # Errors
    /// As [`AttrHost::get_attr`].
    pub fn page_size(&mut self) -> Result<Option<u64>> {
        self.get_number(self.keys.page_size)
    }

    /// Set `arch.page_shift`; `arch.page_size` follows.
    ///
    /// # Errors
    /// [`ErrorKind::Corrupt`] for a shift of 64 or more; otherwise as
    /// [`AttrHost::set_attr`].
    pub fn set_page_shift(&mut self, shift: u32, origin: Origin) -> Result<()> {
        self.set_number(self.keys.page_shift, shift.into(), origin)
    }

    /// # Errors
    /// As [`AttrHost::get_attr`].
    pub fn page_shift(&mut self) -> Result<Option<u64>> {
        self.get_number(self.keys.page_shift)
    }

    /// # Errors
    /// As [`AttrHost::get_attr`].
    pub fn ptr_size(&mut self) -> Result<Option<u64>> {
        self.get_number(self.keys.ptr_size)
    }

    /// `linux.version_code`, derived from `linux.uts.release` on demand.
    ///
    /// # Errors
    /// [`ErrorKind::Corrupt`] for a malformed release; otherwise as
    /// [`AttrHost::get_attr`].
    pub fn linux_version_code(&mut self) -> Result<Option<u64>> {
        self.get_number(self.keys.linux_version_code)
    }

    /// `xen.version_code`, derived from the Xen major and minor version.
    ///
    /// # Errors
    /// As [`AttrHost::get_attr`].
    pub fn xen_version_code(&mut self) -> Result<Option<u64>> {
        self.get_number(self.keys.xen_version_code)
    }

    /// Set `file.description` to a fixed format name.
    ///
    /// # Errors
    /// As [`AttrHost::set_attr`].
    pub fn set_file_description(&mut self, name: &'static str) -> Result<()> {
        self.set_string(self.keys.file_description, name, Origin::Default)
            .context("Cannot set file description")
    }

    /// Version code of the dumped operating system, `0` if unknown.
    ///
    /// The OS is named by `addrxlat.ostype`; its version is read from the
    /// `version_code` attribute in the directory of the same name.
    ///
    /// # Errors
    /// - [`ErrorKind::NotImplemented`] if `addrxlat.ostype` does not name an
    ///   OS directory.
    /// - [`ErrorKind::Invalid`] if that `version_code` is not a number.
    /// - Any other failure to read the attributes involved.
    pub fn os_version_code(&mut self) -> Result<u64> {
        let ostype = match self.get_string(self.keys.ostype) {
            Ok(Some(ostype)) => ostype,
            Ok(None) => return Ok(0),
            Err(e) if e.kind() == ErrorKind::NoData => return Ok(0),
            Err(e) => return Err(e.context("Cannot get OS type")),
        };

        let dir = match self.dict().lookup_raw(&ostype) {
            Some(dir) if self.dict().kind(dir) == AttrKind::Directory => dir,
            _ => {
                return Err(Error::new(
                    ErrorKind::NotImplemented,
                    format!("Unknown operating system type: {ostype}"),
                ));
            }
        };
        let Some(attr) = self.dict().lookup_child(dir, "version_code") else {
            return Ok(0);
        };

        match self.get_attr(attr) {
            Ok(Some(AttrValue::Number(ver))) => Ok(ver),
            Ok(None) => Ok(0),
            Ok(Some(_)) => Err(Error::new(
                ErrorKind::Invalid,
                format!("Attribute {ostype}.version_code is not a number"),
            )),
            Err(e) if e.kind() == ErrorKind::NoData => Ok(0),
            Err(e) => Err(e.context(format!("Cannot get {ostype}.version_code"))),
        }
    }

    /// Decompress one DEFLATE-compressed page of the current page size.
    ///
    /// # Errors
    /// - [`ErrorKind::NoData`] if the page size is not known yet.
    /// - As [`kdump_codecs::uncompress_page_gzip_to_vec`].
    pub fn uncompress_page(&mut self, src: &[u8]) -> Result<Vec<u8>> {
        let page_size = self
            .page_size()?
            .ok_or_else(|| Error::new(ErrorKind::NoData, "Page size is not known"))?;
        let page_size = usize::try_from(page_size).map_err(|_| {
            Error::new(
                ErrorKind::System,
                format!("Page size {page_size} exceeds the address space"),
            )
        })?;
        kdump_codecs::uncompress_page_gzip_to_vec(src, page_size)
    }
}
