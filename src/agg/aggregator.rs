// model = "claude-opus-4-5"
// created = "2026-08-05"
// modified = "2026-08-07"
// driver = "Isaac Clayton"

//! The aggregation orchestrator.
//!
//! An aggregator owns one window per skip-list level and threads each
//! appended version through them: a raw single-step jump enters level 0,
//! and every window that fills emits one composed jump to the level
//! above. Far links materialize on the chain as windows open (forward
//! reservations) and close (resolved forward links plus backward links
//! carrying the composed operation).
//!
//! State is lazy: a freshly constructed aggregator has no levels at all.
//! The first `add_node` either recovers the true window state from
//! reservations already persisted on the chain, or — when the chain
//! cannot be validated all the way down — roots brand-new windows at the
//! current node and lets the orphaned tail of history stay unresolved.
//! `complete` flushes every window and returns to the lazy state.

use crate::chain::Chain;
use crate::chain::FarBackwardLink;
use crate::chain::FarForwardLink;
use crate::chain::Version;
use crate::delta::Compose;

use super::ConfigError;
use super::Sink;
use super::jump::Jump;
use super::level::Level;

/// Builds the skip-link index for one fragment's version chain.
///
/// Callers must serialize `add_node` and `complete` per fragment, call
/// `add_node` exactly once per appended version in order, and never
/// re-enter the engine from the sink. Separate fragments get separate
/// aggregators sharing nothing.
pub struct Aggregator<O, S> {
    base: u64,
    max_levels: usize,
    aggregate_by_author: bool,
    time_interval: Option<u64>,
    levels: Option<Vec<Level<O>>>,
    pub sink: S,
}

impl<O: Compose, S: Sink<O>> Aggregator<O, S> {
    /// A new aggregator with `max_levels` windows of `base` jumps each.
    pub fn new(base: u64, max_levels: usize, sink: S) -> Result<Aggregator<O, S>, ConfigError> {
        if base < 2 {
            return Err(ConfigError::BaseTooSmall);
        }
        if max_levels < 1 {
            return Err(ConfigError::NoLevels);
        }
        return Ok(Aggregator {
            base,
            max_levels,
            aggregate_by_author: false,
            time_interval: None,
            levels: None,
            sink,
        });
    }

    /// Break windows whenever a node's author differs from the open
    /// window's author. Settable at any time.
    pub fn set_aggregate_by_author(&mut self, on: bool) {
        self.aggregate_by_author = on;
    }

    /// Break windows whenever a node's timestamp is at least this far
    /// past the open window's timestamp. Settable at any time.
    pub fn set_time_interval(&mut self, interval: Option<u64>) {
        self.time_interval = interval;
    }

    /// A level's nominal span: `base^(level+1)` raw steps.
    fn nominal(&self, level: usize) -> u64 {
        return self.base.pow(level as u32 + 1);
    }

    /// Process one appended version, in order, exactly once.
    pub fn add_node(&mut self, chain: &mut Chain<O>, version: Version) {
        let mut produced: Vec<Jump<O>> = Vec::new();

        if self.levels.is_none() {
            match self.recover(chain, version) {
                Some(levels) => self.levels = Some(levels),
                None => {
                    // Nothing to resume: root fresh windows here. The
                    // node's own step op belongs to the orphaned tail.
                    self.levels = Some(self.fresh_levels());
                    for level in 0..self.max_levels {
                        produced.push(Jump::placeholder(version, level));
                    }
                }
            }
        }

        if produced.is_empty() && self.boundary_broken(chain, version) {
            // Flush everything open, then re-root at this node. The
            // flushed span excludes the node that broke the boundary.
            let flushed = self.flush_levels();
            for jump in &flushed {
                self.materialize(chain, jump);
            }
            self.levels = Some(self.fresh_levels());
            for level in 0..self.max_levels {
                produced.push(Jump::placeholder(version, level));
            }
        }

        if produced.is_empty() {
            // Normal cascade: a raw step enters level 0 and each closed
            // window feeds the level above.
            let node = chain.node(version).expect("version not in chain");
            let source = node.prev.expect("node has no previous version");
            let op = node.op.clone().expect("node has no step operation");
            let mut jump = Some(Jump::step(source, version, op));
            let levels = self.levels.as_mut().expect("levels exist while active");
            for (index, level) in levels.iter_mut().enumerate() {
                let Some(j) = jump.take() else { break };
                if let Some(out) = level.add_jump(j) {
                    produced.push(out.clone());
                    produced.push(Jump::placeholder(version, index));
                    jump = Some(out);
                }
            }
        }

        self.sink.write_node(version);
        for jump in &produced {
            self.materialize(chain, jump);
        }
    }

    /// Flush all open windows and return to the lazy state. Idempotent;
    /// safe with nothing pending. Fresh windows re-open on the next
    /// `add_node`.
    pub fn complete(&mut self, chain: &mut Chain<O>) {
        let produced = self.flush_levels();
        for jump in &produced {
            self.materialize(chain, jump);
        }
        self.levels = None;
    }

    fn fresh_levels(&self) -> Vec<Level<O>> {
        return (0..self.max_levels).map(|l| Level::new(self.base, l)).collect();
    }

    /// Whether the node breaks the open window's author or time span.
    /// Evaluated against the outermost level's recorded window source;
    /// with nothing recorded there yet, no boundary can break.
    fn boundary_broken(&self, chain: &Chain<O>, version: Version) -> bool {
        if !self.aggregate_by_author && self.time_interval.is_none() {
            return false;
        }
        let levels = match &self.levels {
            Some(levels) => levels,
            None => return false,
        };
        let top = levels.last().expect("at least one level");
        let source = match top.source_version() {
            Some(source) => source,
            None => return false,
        };
        let source = chain.node(source).expect("window source not in chain");
        let node = chain.node(version).expect("version not in chain");

        if self.aggregate_by_author && node.author != source.author {
            return true;
        }
        if let Some(interval) = self.time_interval {
            if node.timestamp.saturating_sub(source.timestamp) >= interval {
                return true;
            }
        }
        return false;
    }

    /// Cascade a forced flush bottom-up, once: each level absorbs the
    /// carry from below if there is one, and whatever it emits — by
    /// closing exactly or by its own short flush — carries upward.
    fn flush_levels(&mut self) -> Vec<Jump<O>> {
        let mut produced = Vec::new();
        let levels = match self.levels.as_mut() {
            Some(levels) => levels,
            None => return produced,
        };
        let mut carry: Option<Jump<O>> = None;
        for level in levels.iter_mut() {
            let emitted = match carry.take() {
                Some(jump) => match level.add_jump(jump) {
                    Some(out) => Some(out),
                    None => level.complete(),
                },
                None => level.complete(),
            };
            if let Some(out) = emitted {
                produced.push(out.clone());
                carry = Some(out);
            }
        }
        return produced;
    }

    /// Write the links a jump implies.
    ///
    /// A composition resolves its source's reservation and records a
    /// backward link carrying the composed operation. A placeholder
    /// opens a reservation at its target. A pass-through writes nothing;
    /// its operations only carry upward in memory.
    fn materialize(&mut self, chain: &mut Chain<O>, jump: &Jump<O>) {
        if jump.aggregated {
            let source = jump.source.expect("aggregated jump without a source");
            let target = jump.target;
            let distance = target - source;
            let op = jump.ops.first().cloned().expect("aggregated jump without an operation");

            let back = FarBackwardLink { distance, source, op };
            let node = chain.node_mut(target).expect("target not in chain");
            if node.add_backward_link(back.clone()) {
                self.sink.write_far_backward_link(target, &back);
            }

            let nominal = self.nominal(jump.level);
            let node = chain.node_mut(source).expect("source not in chain");
            let index = node.find_reservation(nominal).unwrap_or_else(|| {
                panic!(
                    "no open reservation of distance {} at version {}: \
                     the chain and the aggregator disagree",
                    nominal, source,
                );
            });
            let new = FarForwardLink::Resolved { distance, target };
            let old = node.replace_forward_link(index, new.clone());
            self.sink.rewrite_far_forward_link(source, &old, &new);
        } else if jump.source.is_none() {
            let nominal = self.nominal(jump.level);
            let link = FarForwardLink::Reservation { distance: nominal };
            let node = chain.node_mut(jump.target).expect("target not in chain");
            if node.add_forward_link(link.clone()) {
                self.sink.write_far_forward_link(jump.target, &link);
            }
        }
    }

    /// Try to rebuild true window state from the chain.
    ///
    /// Walks backward from the node's predecessor, matching unresolved
    /// reservations bottom-up against each level's nominal span. Only
    /// candidates aligned to the level's granularity and within its span
    /// bound count; the first match per level is its window start. Any
    /// break — severed chain, span bound exceeded, missing step op —
    /// discards all findings: recovery is all or nothing.
    fn recover(&self, chain: &Chain<O>, version: Version) -> Option<Vec<Level<O>>> {
        let node = chain.node(version).expect("version not in chain");
        let anchor = node.prev?;

        let mut starts: Vec<Version> = Vec::with_capacity(self.max_levels);
        let mut upper = anchor;
        for level in 0..self.max_levels {
            let span = self.base.pow(level as u32);
            let nominal = span * self.base;
            let mut cursor = Some(upper);
            let mut found = None;
            while let Some(v) = cursor {
                let node = chain.node(v)?;
                let distance = upper - v;
                if distance >= nominal {
                    break;
                }
                if distance % span == 0 && node.find_reservation(nominal).is_some() {
                    found = Some(v);
                    break;
                }
                cursor = node.prev;
            }
            let start = found?;
            starts.push(start);
            upper = start;
        }

        // Every step in the deepest pending range must be replayable.
        let deepest = *starts.last().expect("at least one level");
        for v in deepest + 1..=anchor {
            let node = chain.node(v)?;
            node.op.as_ref()?;
        }

        let mut levels = Vec::with_capacity(self.max_levels);
        let mut end = anchor;
        for (level, &start) in starts.iter().enumerate() {
            levels.push(Level::rebuild(self.base, level, start, end, chain));
            end = start;
        }
        return Some(levels);
    }
}

impl<O, S> std::fmt::Debug for Aggregator<O, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return f
            .debug_struct("Aggregator")
            .field("base", &self.base)
            .field("max_levels", &self.max_levels)
            .field("aggregate_by_author", &self.aggregate_by_author)
            .field("time_interval", &self.time_interval)
            .field("active", &self.levels.is_some())
            .finish();
    }
}
