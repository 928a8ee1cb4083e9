//! Opaque identifiers minted only by a hierarchy's builder.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::node::NodeId;

static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

/// Mint a fresh epoch tag, one per [`crate::hierarchy::Hierarchy`] instance.
///
/// Tagging identifiers with their owning hierarchy's epoch is what makes
/// them "not comparable across process runs": two hierarchies built from
/// identical input in the same process still produce identifiers that
/// compare unequal, because each hierarchy mints its own epoch.
pub(crate) fn next_epoch() -> u64 {
    NEXT_EPOCH.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
pub(crate) fn reset_epoch_counter_for_tests() {
    NEXT_EPOCH.store(1, Ordering::SeqCst);
}

/// An opaque, globally unique handle to one findable node.
///
/// Only a hierarchy's builder mints identifiers; once assigned, an
/// identifier is immutable for the hierarchy's lifetime (invariant 6).
/// Identifiers are never serialized — the file representation re-mints them
/// on decode (see [`crate::file_repr`]).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier {
    node: NodeId,
    epoch: u64,
}

impl Identifier {
    pub(crate) fn new(node: NodeId, epoch: u64) -> Self {
        Self { node, epoch }
    }

    /// The node this identifier addresses. Exposed crate-externally so
    /// collaborators that hold an `Identifier` can look up the node it
    /// names without going through `Hierarchy::lookup` twice.
    pub fn node_id(self) -> NodeId {
        self.node
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier(#{}@{})", self.node.index(), self.epoch)
    }
}
