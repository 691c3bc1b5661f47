//! Stable node keys shared by every Lectern crate.
//!
//! Document nodes live in an arena owned by the host document. The rest of
//! the system refers to them only through [`NodeId`], a generational key: once
//! a node is removed from its arena the key stops resolving, which is how
//! stale references are detected.

use slotmap::new_key_type;

new_key_type! {
    /// A unique identifier for a node in a document arena.
    ///
    /// `NodeId`s stay valid while the tree around them changes and become
    /// invalid once the node is removed. A removed key is never handed out
    /// again for a different node.
    pub struct NodeId;
}

impl NodeId {
    /// Convert the NodeId to a raw u64 value.
    ///
    /// This is useful for interop with hosts that need a numeric handle.
    /// The raw value can be converted back using [`NodeId::from_raw`].
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create a NodeId from a raw u64 value.
    ///
    /// This does not check that the node exists in any arena.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}
