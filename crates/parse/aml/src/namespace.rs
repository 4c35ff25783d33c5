//! The AML namespace tree.
//!
//! [`NamespaceStore`] is the contract the resolver, walker and evaluator rely
//! on: five link accessors plus object access, with the ACPI lookup rules
//! (`exists`, `search`, `find`) provided on top. [`Namespace`] is an arena
//! implementation addressed by [`NodeId`] handles.
//!
//! The tree has exactly one root, created with the store. Parent links are
//! back-references used for upward traversal only; the arena owns every node.

use alloc::vec::Vec;
use core::ops::Range;

use bitflags::bitflags;

use crate::name::{NameSeg, NamePath, PARENT_PREFIX_CHAR, ROOT_CHAR};
use crate::value::Value;

/// Handle to a node inside a namespace store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node of an arena [`Namespace`].
    pub const ROOT: Self = Self(0);

    /// Returns the arena index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

bitflags! {
    /// The AML `MethodFlags` byte of a `DefMethod`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodFlags: u8 {
        /// Number of declared arguments (0-7).
        const ARG_COUNT  = 0b0000_0111;
        /// The method is serialized.
        const SERIALIZED = 0b0000_1000;
        /// Synchronization level (0-15).
        const SYNC_LEVEL = 0b1111_0000;
    }
}

impl MethodFlags {
    /// Builds the flags byte for a method.
    #[must_use]
    pub const fn new(arg_count: u8, serialized: bool, sync_level: u8) -> Self {
        let serialized = if serialized { Self::SERIALIZED.bits() } else { 0 };
        Self::from_bits_retain((arg_count & 0x07) | serialized | ((sync_level & 0x0F) << 4))
    }

    /// Returns the declared argument count.
    #[must_use]
    pub const fn arg_count(self) -> u8 {
        self.bits() & Self::ARG_COUNT.bits()
    }

    /// Returns `true` if the method is serialized.
    #[must_use]
    pub const fn is_serialized(self) -> bool {
        self.contains(Self::SERIALIZED)
    }

    /// Returns the synchronization level.
    #[must_use]
    pub const fn sync_level(self) -> u8 {
        self.bits() >> 4
    }
}

/// Descriptor of a `Field` or `IndexField` unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldUnit {
    /// Operation region (`Field`) or index register (`IndexField`).
    pub source: NodeId,
    /// Data register of an `IndexField`.
    pub data: Option<NodeId>,
    /// Offset of the first bit of the unit.
    pub bit_offset: u64,
    /// Width of the unit in bits.
    pub bit_len: u64,
    /// Raw `FieldFlags` byte (access type, lock rule, update rule).
    pub flags: u8,
}

/// An object attached to a namespace node.
#[derive(Debug, PartialEq)]
pub enum Object {
    /// A `DefScope`, including the root.
    Scope,
    /// A `DefDevice`.
    Device,
    /// A control method and the bytecode range of its body.
    Method {
        /// Declared flags, including the argument count.
        flags: MethodFlags,
        /// Byte range of the method's term list.
        body: Range<usize>,
    },
    /// A `DefName` holding a data object.
    Name(Value),
    /// A `DefField` unit.
    Field(FieldUnit),
    /// A `DefIndexField` unit.
    IndexField(FieldUnit),
    /// A `DefProcessor`.
    Processor {
        /// ACPI processor ID.
        id: u8,
    },
    /// A `DefPowerRes`.
    PowerResource,
    /// A `DefThermalZone`.
    ThermalZone,
    /// A `DefMutex`.
    Mutex,
    /// A `DefEvent`.
    Event,
    /// A `DefOpRegion`.
    OpRegion,
}

impl Object {
    /// Builds a non-serialized method object.
    #[must_use]
    pub const fn method(arg_count: u8, body: Range<usize>) -> Self {
        Self::Method {
            flags: MethodFlags::new(arg_count, false, 0),
            body,
        }
    }

    /// Returns the ACPI object type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Scope => "Scope",
            Self::Device => "Device",
            Self::Method { .. } => "Method",
            Self::Name(value) => value.type_name(),
            Self::Field(_) | Self::IndexField(_) => "FieldUnit",
            Self::Processor { .. } => "Processor",
            Self::PowerResource => "PowerResource",
            Self::ThermalZone => "ThermalZone",
            Self::Mutex => "Mutex",
            Self::Event => "Event",
            Self::OpRegion => "OperationRegion",
        }
    }
}

/// Storage contract for the namespace tree.
///
/// Implementors provide the tree links and object access; the ACPI lookup
/// rules are provided methods. A store is read without synchronization, so
/// callers must not mutate it during a lookup or walk.
pub trait NamespaceStore {
    /// Returns the single root node.
    fn root(&self) -> NodeId;

    /// Returns the parent of `node`, or `None` for the root.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the first child of `node`.
    fn first_child(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the next sibling of `node`.
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the name segment of `node`.
    fn name(&self, node: NodeId) -> NameSeg;

    /// Returns the object attached to `node`.
    fn object(&self, node: NodeId) -> &Object;

    /// Returns the object attached to `node`, mutably.
    fn object_mut(&mut self, node: NodeId) -> &mut Object;

    /// Returns the immediate child of `parent` named `name`.
    fn child_named(&self, parent: NodeId, name: NameSeg) -> Option<NodeId> {
        let mut child = self.first_child(parent);
        while let Some(node) = child {
            if self.name(node) == name {
                return Some(node);
            }
            child = self.next_sibling(node);
        }
        None
    }

    /// Looks up an encoded namestring below `parent`, one child per segment.
    ///
    /// An empty namestring names `parent` itself. No scope climbing is done.
    fn exists(&self, parent: NodeId, value: &[u8]) -> Option<NodeId> {
        value.chunks(4).try_fold(parent, |node, chunk| {
            self.child_named(node, NameSeg::from_bytes(chunk)?)
        })
    }

    /// Applies the ACPI search rule: the closest enclosing scope of `parent`
    /// (including `parent` itself) that defines `value` wins.
    fn search(&self, parent: NodeId, value: &[u8]) -> Option<NodeId> {
        let mut scope = Some(parent);
        while let Some(node) = scope {
            if let Some(found) = self.exists(node, value) {
                return Some(found);
            }
            scope = self.parent(node);
        }
        None
    }

    /// Resolves a converted path against `parent`.
    ///
    /// `\` jumps to the root and `^` moves one scope up (failing above the
    /// root); any other marker anchors at the current scope. A path without
    /// any prefix marker follows the search rule when it is a single segment.
    fn find(&self, parent: NodeId, path: &NamePath) -> Option<NodeId> {
        let mut scope = parent;
        for &marker in &path.prefix {
            match marker {
                ROOT_CHAR => scope = self.root(),
                PARENT_PREFIX_CHAR => scope = self.parent(scope)?,
                _ => {}
            }
        }

        if path.is_unanchored() && path.value.len() == 4 {
            self.search(scope, &path.value)
        } else {
            self.exists(scope, &path.value)
        }
    }
}

/// Arena storage for a single namespace node.
#[derive(Debug)]
struct NodeData {
    name: NameSeg,
    object: Object,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next: Option<NodeId>,
}

/// An arena-backed namespace tree.
///
/// Children keep their insertion order, which is the order in which the
/// defining bytecode declared them.
#[derive(Debug)]
pub struct Namespace {
    nodes: Vec<NodeData>,
}

impl Namespace {
    /// Creates a namespace containing only the root scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: alloc::vec![NodeData {
                name: NameSeg::ROOT,
                object: Object::Scope,
                parent: None,
                first_child: None,
                last_child: None,
                next: None,
            }],
        }
    }

    /// Appends a node named `name` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this namespace.
    pub fn add_child(&mut self, parent: NodeId, name: NameSeg, object: Object) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name,
            object,
            parent: Some(parent),
            first_child: None,
            last_child: None,
            next: None,
        });

        match self.nodes[parent.0].last_child.replace(id) {
            Some(prev) => self.nodes[prev.0].next = Some(id),
            None => self.nodes[parent.0].first_child = Some(id),
        }
        id
    }

    /// Returns the number of nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the namespace holds nothing but the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceStore for Namespace {
    fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].first_child
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].next
    }

    fn name(&self, node: NodeId) -> NameSeg {
        self.nodes[node.0].name
    }

    fn object(&self, node: NodeId) -> &Object {
        &self.nodes[node.0].object
    }

    fn object_mut(&mut self, node: NodeId) -> &mut Object {
        &mut self.nodes[node.0].object
    }
}
