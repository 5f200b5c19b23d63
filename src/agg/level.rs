// model = "claude-opus-4-5"
// created = "2026-08-05"
// modified = "2026-08-07"
// driver = "Isaac Clayton"

//! One skip-list level's accumulation window.
//!
//! A level collects incoming jumps until it holds exactly `base` of
//! them, then emits a single aggregated jump to the level above and
//! starts over. A forced flush can emit early with fewer than `base`
//! pending jumps. During recovery, a level's true pending state is
//! rebuilt directly from already-persisted per-step operations instead
//! of being replayed through the levels below.

use crate::chain::Chain;
use crate::chain::Version;
use crate::delta::Compose;

use super::jump::Jump;

/// One level's window: pending jumps not yet emitted upward.
pub struct Level<O> {
    base: u64,
    level: usize,
    pending: Vec<Jump<O>>,
}

impl<O: Compose> Level<O> {
    /// A fresh level with an empty window.
    pub fn new(base: u64, level: usize) -> Level<O> {
        return Level {
            base,
            level,
            pending: Vec::new(),
        };
    }

    /// Accept one incoming jump. Emits the aggregated window once it
    /// holds exactly `base` jumps, else nothing.
    pub fn add_jump(&mut self, jump: Jump<O>) -> Option<Jump<O>> {
        self.pending.push(jump);
        if self.pending.len() as u64 == self.base {
            let out = Jump::aggregate(&self.pending, self.level);
            self.pending.clear();
            return Some(out);
        }
        return None;
    }

    /// Force-flush the window, even short. Emits nothing if empty.
    pub fn complete(&mut self) -> Option<Jump<O>> {
        if self.pending.is_empty() {
            return None;
        }
        let out = Jump::aggregate(&self.pending, self.level);
        self.pending.clear();
        return Some(out);
    }

    /// The source of the oldest pending jump. This is the level's
    /// recorded window source, used to evaluate boundary breaks.
    pub fn source_version(&self) -> Option<Version> {
        return self.pending.first().and_then(|j| j.source);
    }

    /// Number of jumps currently pending.
    pub fn pending_len(&self) -> usize {
        return self.pending.len();
    }

    /// Rebuild a level's true pending state from persisted per-step
    /// operations across `(start, end]`, grouping `base^level` raw steps
    /// at a time. Recovery-only; never used in normal forward operation.
    ///
    /// The caller must have validated that every version in the range is
    /// present in the chain with its step operation, and that the range
    /// length divides evenly into `base^level` groups.
    pub fn rebuild(base: u64, level: usize, start: Version, end: Version, chain: &Chain<O>) -> Level<O> {
        return Level {
            base,
            level,
            pending: rebuild_jumps(chain, base, level, start, end),
        };
    }
}

/// Jumps spanning `base^level` raw steps each, covering `(start, end]`,
/// built by recursively grouping the level below.
fn rebuild_jumps<O: Compose>(
    chain: &Chain<O>,
    base: u64,
    level: usize,
    start: Version,
    end: Version,
) -> Vec<Jump<O>> {
    if level == 0 {
        return (start + 1..=end)
            .map(|v| {
                let node = chain.node(v).expect("chain node missing during rebuild");
                let op = node.op.clone().expect("step operation missing during rebuild");
                return Jump::step(v - 1, v, op);
            })
            .collect();
    }
    let below = rebuild_jumps(chain, base, level - 1, start, end);
    return below
        .chunks(base as usize)
        .map(|group| Jump::aggregate(group, level - 1))
        .collect();
}
