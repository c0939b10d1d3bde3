use crate::{AttrKind, AttrState, AttrValue, Origin, Template};
use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use kdump_status::{Error, ErrorKind, Result};

/// Handle of an attribute in a [`Dict`].
///
/// Handles stay valid until the attribute (or one of its ancestors) is
/// [removed](Dict::remove); a removed handle's slot may be reused.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct AttrId(usize);

#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Unset,
    Set { value: AttrValue, origin: Origin },
    Stale { value: Option<AttrValue>, origin: Origin },
}

struct Node<C: 'static> {
    name: Cow<'static, str>,
    tmpl: Cow<'static, Template<C>>,
    parent: Option<AttrId>,
    children: BTreeMap<Cow<'static, str>, AttrId>,
    slot: Slot,
    revalidating: bool,
}

/// Arena-backed attribute tree.
///
/// The dictionary only stores nodes; writes that run hooks go through
/// [`AttrHost`](crate::AttrHost).
pub struct Dict<C: 'static> {
    nodes: Vec<Option<Node<C>>>,
    free: Vec<usize>,
}

impl<C: 'static> Default for Dict<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> Dict<C> {
    /// Create a dictionary holding only the (unnamed) root directory.
    #[must_use]
    pub fn new() -> Self {
        let root = Node {
            name: Cow::Borrowed(""),
            tmpl: Cow::Owned(Template::dynamic("", AttrKind::Directory)),
            parent: None,
            children: BTreeMap::new(),
            slot: Slot::Unset,
            revalidating: false,
        };
        Self {
            nodes: alloc::vec![Some(root)],
            free: Vec::new(),
        }
    }

    #[must_use]
    pub const fn root(&self) -> AttrId {
        AttrId(0)
    }

    #[track_caller]
    fn node(&self, id: AttrId) -> &Node<C> {
        match self.nodes.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("stale attribute handle {id:?}"),
        }
    }

    #[track_caller]
    fn node_mut(&mut self, id: AttrId) -> &mut Node<C> {
        match self.nodes.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("stale attribute handle {id:?}"),
        }
    }

    /// Whether `id` still refers to a live attribute.
    #[must_use]
    pub fn contains(&self, id: AttrId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    #[must_use]
    pub fn template(&self, id: AttrId) -> &Template<C> {
        &self.node(id).tmpl
    }

    #[must_use]
    pub fn kind(&self, id: AttrId) -> AttrKind {
        self.node(id).tmpl.kind
    }

    #[must_use]
    pub fn name(&self, id: AttrId) -> &str {
        &self.node(id).name
    }

    #[must_use]
    pub fn parent(&self, id: AttrId) -> Option<AttrId> {
        self.node(id).parent
    }

    /// Full dotted path of `id`, e.g. `cpu.0.reg.rip`. The root is `""`.
    #[must_use]
    pub fn path(&self, id: AttrId) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(id);
        while let Some(at) = cur {
            let node = self.node(at);
            if node.parent.is_some() {
                parts.push(&*node.name);
            }
            cur = node.parent;
        }
        parts.reverse();
        parts.join(".")
    }

    /// Children of a directory in key order.
    pub fn children(&self, dir: AttrId) -> impl Iterator<Item = (&str, AttrId)> + '_ {
        self.node(dir).children.iter().map(|(k, &v)| (&**k, v))
    }

    #[must_use]
    pub fn state(&self, id: AttrId) -> AttrState {
        match self.node(id).slot {
            Slot::Unset => AttrState::Unset,
            Slot::Set { .. } => AttrState::Set,
            Slot::Stale { .. } => AttrState::Stale,
        }
    }

    /// Whether the attribute holds a value (current or stale).
    #[must_use]
    pub fn is_set(&self, id: AttrId) -> bool {
        !matches!(self.node(id).slot, Slot::Unset)
    }

    /// The current value, without revalidation. Stale values are not exposed.
    #[must_use]
    pub fn value(&self, id: AttrId) -> Option<&AttrValue> {
        match &self.node(id).slot {
            Slot::Set { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The value a stale attribute held before it was invalidated.
    ///
    /// `None` unless the attribute is stale and had a value.
    #[must_use]
    pub fn stale_value(&self, id: AttrId) -> Option<&AttrValue> {
        match &self.node(id).slot {
            Slot::Stale { value, .. } => value.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn origin(&self, id: AttrId) -> Option<Origin> {
        match self.node(id).slot {
            Slot::Unset => None,
            Slot::Set { origin, .. } | Slot::Stale { origin, .. } => Some(origin),
        }
    }

    pub(crate) fn slot(&self, id: AttrId) -> &Slot {
        &self.node(id).slot
    }

    /// Find a direct child of `dir` by name.
    #[must_use]
    pub fn lookup_child(&self, dir: AttrId, name: &str) -> Option<AttrId> {
        self.node(dir).children.get(name).copied()
    }

    /// Resolve a dotted path relative to `dir`, regardless of value state.
    #[must_use]
    pub fn lookup_raw_in(&self, dir: AttrId, path: &str) -> Option<AttrId> {
        if path.is_empty() {
            return Some(dir);
        }
        path.split('.')
            .try_fold(dir, |at, seg| self.lookup_child(at, seg))
    }

    /// Resolve a dotted path from the root, regardless of value state.
    #[must_use]
    pub fn lookup_raw(&self, path: &str) -> Option<AttrId> {
        self.lookup_raw_in(self.root(), path)
    }

    /// Resolve a dotted path from the root; only attributes holding a value
    /// are found.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<AttrId> {
        self.lookup_raw(path).filter(|&id| self.is_set(id))
    }

    /// Resolve `path`, reporting a missing attribute as [`ErrorKind::NoKey`].
    ///
    /// # Errors
    /// [`ErrorKind::NoKey`] if no attribute exists at `path`.
    pub fn require(&self, path: &str) -> Result<AttrId> {
        self.lookup_raw(path)
            .ok_or_else(|| Error::new(ErrorKind::NoKey, format!("No such key: {path}")))
    }

    /// Get or create the child `name` of `dir` using `tmpl`.
    ///
    /// An existing child is returned as-is when its type matches.
    ///
    /// # Errors
    /// - [`ErrorKind::Invalid`] if `dir` is not a directory, or an existing
    ///   child has a different type.
    /// - [`ErrorKind::System`] if the node cannot be allocated.
    pub fn child(
        &mut self,
        dir: AttrId,
        name: impl Into<Cow<'static, str>>,
        tmpl: Cow<'static, Template<C>>,
    ) -> Result<AttrId> {
        let name = name.into();
        if self.kind(dir) != AttrKind::Directory {
            return Err(Error::new(
                ErrorKind::Invalid,
                format!("{} is a leaf attribute", self.path(dir)),
            ));
        }

        if let Some(existing) = self.lookup_child(dir, &name) {
            let kind = self.kind(existing);
            return if kind == tmpl.kind {
                Ok(existing)
            } else {
                Err(Error::new(
                    ErrorKind::Invalid,
                    format!(
                        "Type conflict for {}: {kind} vs {}",
                        self.path(existing),
                        tmpl.kind
                    ),
                ))
            };
        }

        let node = Node {
            name: name.clone(),
            tmpl,
            parent: Some(dir),
            children: BTreeMap::new(),
            slot: Slot::Unset,
            revalidating: false,
        };
        let id = if let Some(idx) = self.free.pop() {
            self.nodes[idx] = Some(node);
            AttrId(idx)
        } else {
            self.nodes.try_reserve(1)?;
            self.nodes.push(Some(node));
            AttrId(self.nodes.len() - 1)
        };
        self.node_mut(dir).children.insert(name, id);
        log::trace!("created attribute {}", self.path(id));
        Ok(id)
    }

    /// Create an attribute from a static template under `dir`, named after
    /// the template key.
    ///
    /// # Errors
    /// As [`Dict::child`].
    pub fn add_static(&mut self, dir: AttrId, tmpl: &'static Template<C>) -> Result<AttrId> {
        self.child(dir, tmpl.key.clone(), Cow::Borrowed(tmpl))
    }

    /// Walk a dotted path below `dir`, creating missing segments as
    /// directories. Returns the last directory.
    ///
    /// # Errors
    /// As [`Dict::child`].
    pub fn create_path(&mut self, dir: AttrId, path: &str) -> Result<AttrId> {
        let mut at = dir;
        for seg in path.split('.').filter(|s| !s.is_empty()) {
            let tmpl = Template::dynamic(String::from(seg), AttrKind::Directory);
            at = self.child(at, String::from(seg), Cow::Owned(tmpl))?;
        }
        Ok(at)
    }

    /// Register a hook-less attribute of `kind` at a full dotted path.
    ///
    /// Registering the same path with the same type again returns the
    /// existing attribute.
    ///
    /// # Errors
    /// - [`ErrorKind::Invalid`] if the path exists with another type, or the
    ///   parent is not a directory.
    /// - [`ErrorKind::NoKey`] if the parent directory does not exist.
    pub fn add_template(&mut self, path: &str, kind: AttrKind) -> Result<AttrId> {
        if let Some(existing) = self.lookup_raw(path) {
            let have = self.kind(existing);
            return if have == kind {
                Ok(existing)
            } else {
                Err(Error::new(
                    ErrorKind::Invalid,
                    format!("Type conflict with existing template {path}: {have} vs {kind}"),
                ))
            };
        }

        let (parent_path, key) = path.rsplit_once('.').unwrap_or(("", path));
        if key.is_empty() {
            return Err(Error::new(ErrorKind::Invalid, format!("Empty key in {path}")));
        }
        let parent = self
            .lookup_raw(parent_path)
            .ok_or_else(|| Error::new(ErrorKind::NoKey, format!("No such path: {parent_path}")))?;
        if self.kind(parent) != AttrKind::Directory {
            return Err(Error::new(
                ErrorKind::Invalid,
                format!("Path is a leaf attribute: {parent_path}"),
            ));
        }

        let key = String::from(key);
        let tmpl = Template::dynamic(key.clone(), kind);
        self.child(parent, key, Cow::Owned(tmpl))
    }

    /// Store a value and mark all ancestor directories as present.
    pub(crate) fn commit(&mut self, id: AttrId, value: AttrValue, origin: Origin) {
        self.node_mut(id).slot = Slot::Set { value, origin };
        let mut cur = self.parent(id);
        while let Some(dir) = cur {
            let node = self.node_mut(dir);
            if matches!(node.slot, Slot::Set { .. }) {
                break;
            }
            node.slot = Slot::Set {
                value: AttrValue::Directory,
                origin: Origin::Default,
            };
            cur = node.parent;
        }
    }

    pub(crate) fn mark_stale(&mut self, id: AttrId) {
        let node = self.node_mut(id);
        node.slot = match core::mem::replace(&mut node.slot, Slot::Unset) {
            Slot::Unset => Slot::Stale {
                value: None,
                origin: Origin::Default,
            },
            Slot::Set { value, origin } => Slot::Stale {
                value: Some(value),
                origin,
            },
            stale @ Slot::Stale { .. } => stale,
        };
    }

    /// Returns the previous flag.
    pub(crate) fn set_revalidating(&mut self, id: AttrId, on: bool) -> bool {
        core::mem::replace(&mut self.node_mut(id).revalidating, on)
    }

    /// Unset `id` and everything below it. The attributes themselves remain.
    pub fn clear(&mut self, id: AttrId) {
        let mut stack = alloc::vec![id];
        while let Some(at) = stack.pop() {
            let node = self.node_mut(at);
            node.slot = Slot::Unset;
            stack.extend(node.children.values().copied());
        }
    }

    /// Delete `id` and its whole subtree. Removing the root only clears it.
    pub fn remove(&mut self, id: AttrId) {
        let Some(parent) = self.parent(id) else {
            let children: Vec<_> = self.node(id).children.values().copied().collect();
            for child in children {
                self.remove(child);
            }
            self.node_mut(id).slot = Slot::Unset;
            return;
        };

        log::trace!("removing attribute {}", self.path(id));
        let name = self.node(id).name.clone();
        self.node_mut(parent).children.remove(&name);

        let mut stack = alloc::vec![id];
        while let Some(at) = stack.pop() {
            if let Some(node) = self.nodes[at.0].take() {
                stack.extend(node.children.into_values());
                self.free.push(at.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type D = Dict<()>;

    static NUM: Template<()> = Template::new("num", AttrKind::Number);

    #[test]
    fn root_path_is_empty() {
        let d = D::new();
        assert_eq!(d.path(d.root()), "");
        assert_eq!(d.lookup_raw(""), Some(d.root()));
    }

    #[test]
    fn create_path_is_idempotent() {
        let mut d = D::new();
        let root = d.root();
        let a = d.create_path(root, "cpu.3.reg").unwrap();
        let b = d.create_path(root, "cpu.3.reg").unwrap();
        assert_eq!(a, b);
        assert_eq!(d.path(a), "cpu.3.reg");
        assert_eq!(d.children(d.lookup_raw("cpu").unwrap()).count(), 1);
    }

    #[test]
    fn child_type_conflict() {
        let mut d = D::new();
        let root = d.root();
        d.add_static(root, &NUM).unwrap();
        let err = d
            .child(root, "num", Cow::Owned(Template::dynamic("num", AttrKind::String)))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn leaf_cannot_have_children() {
        let mut d = D::new();
        let root = d.root();
        let num = d.add_static(root, &NUM).unwrap();
        let err = d.create_path(num, "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn add_template_rules() {
        let mut d = D::new();
        d.create_path(d.root(), "linux.vmcoreinfo").unwrap();

        let id = d.add_template("linux.vmcoreinfo.PAGESIZE", AttrKind::String).unwrap();
        assert_eq!(d.add_template("linux.vmcoreinfo.PAGESIZE", AttrKind::String).unwrap(), id);

        let conflict = d.add_template("linux.vmcoreinfo.PAGESIZE", AttrKind::Number);
        assert_eq!(conflict.unwrap_err().kind(), ErrorKind::Invalid);

        let missing = d.add_template("xen.nothing.here", AttrKind::Number);
        assert_eq!(missing.unwrap_err().kind(), ErrorKind::NoKey);

        let leaf = d.add_template("linux.vmcoreinfo.PAGESIZE.x", AttrKind::Number);
        assert_eq!(leaf.unwrap_err().kind(), ErrorKind::Invalid);
    }

    #[test]
    fn commit_instantiates_parents() {
        let mut d = D::new();
        let dir = d.create_path(d.root(), "a.b").unwrap();
        let leaf = d.add_static(dir, &NUM).unwrap();
        assert_eq!(d.lookup("a.b.num"), None);
        assert!(d.lookup_raw("a.b.num").is_some());

        d.commit(leaf, AttrValue::Number(7), Origin::Explicit);
        assert_eq!(d.lookup("a.b.num"), Some(leaf));
        assert_eq!(d.state(d.lookup_raw("a").unwrap()), AttrState::Set);
        assert_eq!(d.value(leaf), Some(&AttrValue::Number(7)));
    }

    #[test]
    fn stale_values_are_hidden() {
        let mut d = D::new();
        let root = d.root();
        let leaf = d.add_static(root, &NUM).unwrap();
        d.commit(leaf, AttrValue::Number(1), Origin::Explicit);
        d.mark_stale(leaf);
        assert_eq!(d.state(leaf), AttrState::Stale);
        assert_eq!(d.value(leaf), None);
        assert_eq!(d.stale_value(leaf), Some(&AttrValue::Number(1)));
        assert_eq!(d.origin(leaf), Some(Origin::Explicit));

        let pending = d.add_template("pending", AttrKind::Number).unwrap();
        d.mark_stale(pending);
        assert_eq!(d.state(pending), AttrState::Stale);
        assert_eq!(d.stale_value(pending), None);
    }

    #[test]
    fn clear_and_remove() {
        let mut d = D::new();
        let dir = d.create_path(d.root(), "x").unwrap();
        let leaf = d.add_static(dir, &NUM).unwrap();
        d.commit(leaf, AttrValue::Number(1), Origin::Default);

        d.clear(dir);
        assert!(!d.is_set(leaf));
        assert!(d.contains(leaf));

        d.remove(dir);
        assert!(!d.contains(leaf));
        assert_eq!(d.lookup_raw("x"), None);

        let again = d.create_path(d.root(), "y").unwrap();
        assert_eq!(d.path(again), "y");
    }
}
