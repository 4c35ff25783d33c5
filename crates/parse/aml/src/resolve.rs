//! Textual path resolution against a [`NamespaceStore`].
//!
//! Each strategy converts the path with [`NamePath::convert`] and hands the
//! namestring to the store. A miss is `None`, never an error: optional
//! objects such as `_CID` are routinely absent.

use crate::name::NamePath;
use crate::namespace::{NamespaceStore, NodeId};

/// Looks up `name` below `parent` without climbing scopes.
pub fn resolve_child<S: NamespaceStore + ?Sized>(
    store: &S,
    parent: NodeId,
    name: &str,
) -> Option<NodeId> {
    let path = NamePath::convert(name);
    store.exists(parent, &path.value)
}

/// Looks up `name` in `parent` and then in each enclosing scope up to the
/// root; the closest definition wins.
pub fn resolve_search<S: NamespaceStore + ?Sized>(
    store: &S,
    parent: NodeId,
    name: &str,
) -> Option<NodeId> {
    let path = NamePath::convert(name);
    store.search(parent, &path.value)
}

/// Resolves a full path, honouring `\` and `^` prefixes.
///
/// A path with no prefix is anchored at `parent` with
/// [`NamePath::RELATIVE_MARKER`], so it never falls back to the search rule.
pub fn resolve_path<S: NamespaceStore + ?Sized>(
    store: &S,
    parent: NodeId,
    path: &str,
) -> Option<NodeId> {
    let mut path = NamePath::convert(path);
    if path.prefix.is_empty() {
        path.prefix.push(NamePath::RELATIVE_MARKER);
    }
    store.find(parent, &path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{Namespace, Object};
    use crate::testing::seg;

    struct Fixture {
        ns: Namespace,
        sb: NodeId,
        pci: NodeId,
        lpc: NodeId,
        root_sta: NodeId,
        pci_sta: NodeId,
    }

    /// `\_STA`, `\_SB_.PCI0._STA`, `\_SB_.PCI0.LPCB`.
    fn fixture() -> Fixture {
        let mut ns = Namespace::new();
        let root_sta = ns.add_child(NodeId::ROOT, seg("_STA"), Object::method(0, 0..0));
        let sb = ns.add_child(NodeId::ROOT, seg("_SB_"), Object::Scope);
        let pci = ns.add_child(sb, seg("PCI0"), Object::Device);
        let pci_sta = ns.add_child(pci, seg("_STA"), Object::method(0, 0..0));
        let lpc = ns.add_child(pci, seg("LPCB"), Object::Device);
        Fixture {
            ns,
            sb,
            pci,
            lpc,
            root_sta,
            pci_sta,
        }
    }

    #[test]
    fn child_lookup_does_not_climb() {
        let f = fixture();
        assert_eq!(resolve_child(&f.ns, f.pci, "_STA"), Some(f.pci_sta));
        assert_eq!(resolve_child(&f.ns, f.lpc, "_STA"), None);
        assert_eq!(resolve_child(&f.ns, NodeId::ROOT, "_SB.PCI0.LPCB"), Some(f.lpc));
    }

    #[test]
    fn search_prefers_closest_scope() {
        let f = fixture();
        assert_eq!(resolve_search(&f.ns, f.lpc, "_STA"), Some(f.pci_sta));
        assert_eq!(resolve_search(&f.ns, f.sb, "_STA"), Some(f.root_sta));
        assert_eq!(resolve_search(&f.ns, f.lpc, "_INI"), None);
    }

    #[test]
    fn path_resolution_handles_prefixes() {
        let f = fixture();
        assert_eq!(resolve_path(&f.ns, f.lpc, "\\_SB.PCI0"), Some(f.pci));
        assert_eq!(resolve_path(&f.ns, f.lpc, "^_STA"), Some(f.pci_sta));
        assert_eq!(resolve_path(&f.ns, f.sb, "PCI0.LPCB"), Some(f.lpc));
        assert_eq!(resolve_path(&f.ns, f.lpc, "\\"), Some(NodeId::ROOT));
    }

    #[test]
    fn relative_path_never_searches() {
        let f = fixture();
        // `_STA` exists in an enclosing scope but not below LPCB.
        assert_eq!(resolve_path(&f.ns, f.lpc, "_STA"), None);
    }
}
