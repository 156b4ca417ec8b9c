// id.rs — Stable identifiers for compiler artifacts
//
// Dense, deterministic IDs allocated in source/creation order. Nodes and
// edges of the unrolled graph hold these instead of owning pointers; bindings
// are arena-indexed so that every edge citing the same parameter table shares
// one `BindingId` (the tying relation).

use serde::Serialize;

/// Stable identifier for an unrolled node (variable instance at a position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

/// Stable identifier for an unrolled edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeId(pub u32);

/// Index of a shared parameter binding in the binding arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BindingId(pub u32);

/// Allocator for stable IDs. Produces monotonically increasing IDs in
/// allocation (creation) order, ensuring deterministic assignment.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next_node: u32,
    next_edge: u32,
    next_binding: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    pub fn alloc_edge(&mut self) -> EdgeId {
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        id
    }

    pub fn alloc_binding(&mut self) -> BindingId {
        let id = BindingId(self.next_binding);
        self.next_binding += 1;
        id
    }
}
