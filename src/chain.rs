// model = "claude-opus-4-5"
// created = "2026-08-05"
// modified = "2026-08-07"
// driver = "Isaac Clayton"

//! The version chain: one node per accepted modification.
//!
//! A chain is the ground truth for a document's history. Every accepted
//! delta appends one node, with a dense, strictly increasing version
//! number. Nodes are held in an arena keyed by version, and all
//! cross-node references are plain version numbers resolved on demand —
//! the aggregation engine rewrites links in place, and index-based
//! references keep that safe.
//!
//! Each node carries a rolling blake3 history hash and the author's
//! signature over it, so a store can authenticate any prefix of history
//! without replaying it.
//!
//! Far links are the skip-list shortcut edges the aggregation engine
//! maintains. A forward link is either a `Reservation` (a window opened
//! here and has not resolved yet) or `Resolved` (the achieved span,
//! which a forced flush can leave shorter than the nominal one). A
//! backward link is always created resolved and carries the composed
//! operation for its span.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::key::Hash;
use crate::key::KeyPair;
use crate::key::KeyPub;
use crate::key::Signature;
use crate::key::hash;

/// A position in the chain: dense, strictly increasing, starting at 0.
pub type Version = u64;

/// A skip-list shortcut edge pointing forward in history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FarForwardLink {
    /// A window opened at this node and is still unresolved. The
    /// distance is the owning level's nominal span, `base^(level+1)`.
    Reservation { distance: u64 },
    /// The window resolved. The distance is the real achieved span,
    /// smaller than nominal only when produced by a forced flush.
    Resolved { distance: u64, target: Version },
}

impl FarForwardLink {
    /// The link's current distance, nominal or achieved.
    pub fn distance(&self) -> u64 {
        return match self {
            FarForwardLink::Reservation { distance } => *distance,
            FarForwardLink::Resolved { distance, .. } => *distance,
        };
    }
}

/// A skip-list shortcut edge pointing backward in history, carrying the
/// composed operation for its span. Always created resolved.
#[derive(Clone, Debug)]
pub struct FarBackwardLink<O> {
    pub distance: u64,
    pub source: Version,
    pub op: O,
}

/// One version of the document: a node in the chain.
#[derive(Clone, Debug)]
pub struct VersionNode<O> {
    pub version: Version,
    pub author: KeyPub,
    pub timestamp: u64,
    pub prev: Option<Version>,
    pub next: Option<Version>,
    /// The raw single-step operation from the prior version.
    /// `None` only at a chain's first node.
    pub op: Option<O>,
    /// Rolling hash over the predecessor's hash and this node's header.
    pub history_hash: Hash,
    /// The author's signature over `history_hash`.
    pub signature: Signature,
    pub forward_links: SmallVec<[FarForwardLink; 2]>,
    pub backward_links: SmallVec<[FarBackwardLink<O>; 2]>,
}

impl<O> VersionNode<O> {
    /// Check the author's signature over the history hash.
    pub fn verify(&self) -> bool {
        return self.author.verify(&self.history_hash.0, &self.signature);
    }

    /// Add a forward link. Returns true if it was not already present.
    pub fn add_forward_link(&mut self, link: FarForwardLink) -> bool {
        if self.forward_links.contains(&link) {
            return false;
        }
        self.forward_links.push(link);
        return true;
    }

    /// Add a backward link. Returns true if no link with the same
    /// source and distance was already present.
    pub fn add_backward_link(&mut self, link: FarBackwardLink<O>) -> bool {
        let exists = self
            .backward_links
            .iter()
            .any(|l| l.source == link.source && l.distance == link.distance);
        if exists {
            return false;
        }
        self.backward_links.push(link);
        return true;
    }

    /// Find an unresolved reservation by its nominal distance.
    ///
    /// Resolved links are skipped even when their achieved distance
    /// happens to match: a resolved link's distance can differ from the
    /// nominal one it replaced, so reservations are the only reliable
    /// window-start markers.
    pub fn find_reservation(&self, nominal: u64) -> Option<usize> {
        return self.forward_links.iter().position(|l| {
            matches!(l, FarForwardLink::Reservation { distance } if *distance == nominal)
        });
    }

    /// Replace a forward link in place, returning the old link.
    pub fn replace_forward_link(&mut self, index: usize, link: FarForwardLink) -> FarForwardLink {
        return std::mem::replace(&mut self.forward_links[index], link);
    }

    /// Look up a forward link by its current distance.
    pub fn forward_link_at(&self, distance: u64) -> Option<&FarForwardLink> {
        return self.forward_links.iter().find(|l| l.distance() == distance);
    }

    /// Look up a backward link by its distance.
    pub fn backward_link_at(&self, distance: u64) -> Option<&FarBackwardLink<O>> {
        return self.backward_links.iter().find(|l| l.distance == distance);
    }
}

/// An append-only chain of versions, held in an arena keyed by version.
#[derive(Clone)]
pub struct Chain<O> {
    nodes: FxHashMap<Version, VersionNode<O>>,
    head: Option<Version>,
}

impl<O> Chain<O> {
    /// Create a new empty chain.
    pub fn new() -> Chain<O> {
        return Chain {
            nodes: FxHashMap::default(),
            head: None,
        };
    }

    /// Number of versions in the chain.
    pub fn len(&self) -> u64 {
        return self.nodes.len() as u64;
    }

    /// True if no version has been appended yet.
    pub fn is_empty(&self) -> bool {
        return self.nodes.is_empty();
    }

    /// The most recent version, if any.
    pub fn head(&self) -> Option<Version> {
        return self.head;
    }

    /// Get a node by version.
    pub fn node(&self, version: Version) -> Option<&VersionNode<O>> {
        return self.nodes.get(&version);
    }

    /// Get a mutable node by version.
    pub fn node_mut(&mut self, version: Version) -> Option<&mut VersionNode<O>> {
        return self.nodes.get_mut(&version);
    }

    /// Start the chain: version 0, carrying no step operation.
    pub fn begin(&mut self, author: &KeyPair, timestamp: u64) -> Version {
        assert!(self.is_empty(), "chain already started");
        let history_hash = chain_hash(None, 0, timestamp, &author.key_pub);
        let signature = author.sign(&history_hash.0);
        self.nodes.insert(0, VersionNode {
            version: 0,
            author: author.key_pub.clone(),
            timestamp,
            prev: None,
            next: None,
            op: None,
            history_hash,
            signature,
            forward_links: SmallVec::new(),
            backward_links: SmallVec::new(),
        });
        self.head = Some(0);
        return 0;
    }

    /// Append one accepted modification, producing the next version.
    pub fn append(&mut self, author: &KeyPair, timestamp: u64, op: O) -> Version {
        let prev = self.head.expect("append to an empty chain; call begin first");
        let version = prev + 1;
        let prev_hash = self.nodes[&prev].history_hash.clone();
        let history_hash = chain_hash(Some(&prev_hash), version, timestamp, &author.key_pub);
        let signature = author.sign(&history_hash.0);
        self.nodes.insert(version, VersionNode {
            version,
            author: author.key_pub.clone(),
            timestamp,
            prev: Some(prev),
            next: None,
            op: Some(op),
            history_hash,
            signature,
            forward_links: SmallVec::new(),
            backward_links: SmallVec::new(),
        });
        if let Some(node) = self.nodes.get_mut(&prev) {
            node.next = Some(version);
        }
        self.head = Some(version);
        return version;
    }
}

impl<O> Default for Chain<O> {
    fn default() -> Self {
        return Self::new();
    }
}

/// Rolling history hash: predecessor hash, then the node header.
fn chain_hash(prev: Option<&Hash>, version: Version, timestamp: u64, author: &KeyPub) -> Hash {
    let mut buf = Vec::with_capacity(32 + 8 + 8 + 32);
    if let Some(prev) = prev {
        buf.extend_from_slice(&prev.0);
    }
    buf.extend_from_slice(&version.to_le_bytes());
    buf.extend_from_slice(&timestamp.to_le_bytes());
    buf.extend_from_slice(&author.0);
    return hash(&buf);
}
