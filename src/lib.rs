// model = "claude-opus-4-5"
// created = "2026-08-05"
// modified = "2026-08-07"
// driver = "Isaac Clayton"

//! Swell - Skip-link history aggregation for collaborative documents.
//!
//! Every accepted edit to a shared document appends one node to a
//! version chain. Swell builds a multi-level skip-list index alongside
//! the chain: far links carrying pre-composed operations that summarize
//! whole spans of history, so old snapshots can be reached in
//! O(log N) composed hops instead of O(N) replayed steps.
//!
//! # Quick Start
//!
//! ```
//! use swell::agg::{Aggregator, NullSink};
//! use swell::chain::Chain;
//! use swell::delta::TextDelta;
//! use swell::key::KeyPair;
//!
//! let author = KeyPair::generate();
//! let mut chain = Chain::new();
//! let mut agg = Aggregator::new(4, 2, NullSink).unwrap();
//!
//! let genesis = chain.begin(&author, 0);
//! agg.add_node(&mut chain, genesis);
//!
//! for i in 1..=4u64 {
//!     let delta = TextDelta::new().insert(b"a");
//!     let version = chain.append(&author, i, delta);
//!     agg.add_node(&mut chain, version);
//! }
//!
//! // Four steps composed into one far link spanning versions 0..4.
//! let link = chain.node(4).unwrap().backward_link_at(4).unwrap();
//! assert_eq!(link.source, 0);
//! assert_eq!(link.op.apply(b""), Some(b"aaaa".to_vec()));
//! ```

pub mod agg;
pub mod chain;
pub mod delta;
pub mod key;
