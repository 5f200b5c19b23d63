// model = "claude-opus-4-5"
// created = "2026-08-05"
// modified = "2026-08-07"
// driver = "Isaac Clayton"

//! Incremental skip-link aggregation over the version chain.
//!
//! Replaying every single-step operation to rebuild an old snapshot, or
//! to compute the net effect of a large range, stops scaling once a
//! chain grows to many thousands of versions. This module builds a
//! multi-level skip-list index alongside the chain as versions are
//! appended: each index entry is a far link carrying the pre-composed
//! operation for its span, so any two indexed versions can be bridged
//! in O(log_B N) steps instead of O(N).
//!
//! The engine is synchronous and single-threaded. The storage layer
//! appends a node, then calls [`Aggregator::add_node`] under its own
//! per-fragment write serialization; sealing a history segment calls
//! [`Aggregator::complete`]. The engine answers through the [`Sink`]
//! with zero or more link writes per call. It only adds links or
//! resolves placeholders in place — it never deletes.

pub mod aggregator;
pub mod jump;
pub mod level;

pub use aggregator::Aggregator;
pub use jump::Jump;
pub use level::Level;

use crate::chain::FarBackwardLink;
use crate::chain::FarForwardLink;
use crate::chain::Version;

/// The engine's only channel to the storage layer.
///
/// Methods are fire-and-forget notifications: they must not fail, block,
/// or re-enter the engine. Writes are additive or in-place-replace only.
pub trait Sink<O> {
    /// A version node passed through the aggregator.
    fn write_node(&mut self, version: Version);

    /// A new backward link was added at `version`.
    fn write_far_backward_link(&mut self, version: Version, link: &FarBackwardLink<O>);

    /// A new forward link (reservation) was added at `version`.
    fn write_far_forward_link(&mut self, version: Version, link: &FarForwardLink);

    /// A forward link at `version` was replaced in place.
    fn rewrite_far_forward_link(
        &mut self,
        version: Version,
        old: &FarForwardLink,
        new: &FarForwardLink,
    );
}

/// A sink that drops every notification, for callers that only want the
/// in-memory chain indexed.
pub struct NullSink;

impl<O> Sink<O> for NullSink {
    fn write_node(&mut self, _version: Version) {}
    fn write_far_backward_link(&mut self, _version: Version, _link: &FarBackwardLink<O>) {}
    fn write_far_forward_link(&mut self, _version: Version, _link: &FarForwardLink) {}
    fn rewrite_far_forward_link(
        &mut self,
        _version: Version,
        _old: &FarForwardLink,
        _new: &FarForwardLink,
    ) {
    }
}

/// Error returned when an aggregator is configured with invalid limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The branching base must be at least 2.
    BaseTooSmall,
    /// At least one skip-list level is required.
    NoLevels,
}
