// model = "claude-opus-4-5"
// created = "2026-08-05"
// modified = "2026-08-07"
// driver = "Isaac Clayton"

//! Jumps: candidate spans moving up through the skip-list levels.
//!
//! A jump describes a proposed or resolved span of history. Jumps are
//! ephemeral — they exist only while cascading between levels and are
//! never persisted. What distinguishes them is the `aggregated` tag: a
//! genuine composition earns far links when materialized, while a
//! pass-through only carries its operations to the next level in memory.

use crate::chain::Version;
use crate::delta::Compose;

/// A proposed or resolved span of history.
#[derive(Clone, Debug)]
pub struct Jump<O> {
    /// The node the span starts at. Absent only for fresh placeholder
    /// markers not yet tied to an earlier node.
    pub source: Option<Version>,
    /// The node the span ends at.
    pub target: Version,
    /// The operations covering the span, oldest first. A single element
    /// once composed; possibly several while merely concatenated.
    pub ops: Vec<O>,
    /// The skip-list level this jump was produced at.
    pub level: usize,
    /// True for a genuine composition, false for a pass-through.
    pub aggregated: bool,
}

impl<O: Compose> Jump<O> {
    /// A raw single-step jump: one node to its successor.
    pub fn step(source: Version, target: Version, op: O) -> Jump<O> {
        return Jump {
            source: Some(source),
            target,
            ops: vec![op],
            level: 0,
            aggregated: false,
        };
    }

    /// A fresh placeholder marking where a level's window opens.
    pub fn placeholder(target: Version, level: usize) -> Jump<O> {
        return Jump {
            source: None,
            target,
            ops: Vec::new(),
            level,
            aggregated: false,
        };
    }

    /// Merge consecutive jumps' operations into one semantically
    /// equivalent operation. An empty operand list composes to the
    /// explicit no-op.
    pub fn compose(jumps: &[Jump<O>], level: usize) -> Jump<O> {
        let first = jumps.first().expect("compose of no jumps");
        let last = jumps.last().expect("compose of no jumps");
        let ops: Vec<O> = jumps.iter().flat_map(|j| j.ops.iter().cloned()).collect();
        return Jump {
            source: first.source,
            target: last.target,
            ops: vec![O::compose(&ops)],
            level,
            aggregated: true,
        };
    }

    /// Chain consecutive jumps' operations without merging them.
    pub fn concatenate(jumps: &[Jump<O>], level: usize) -> Jump<O> {
        let first = jumps.first().expect("concatenate of no jumps");
        let last = jumps.last().expect("concatenate of no jumps");
        let ops: Vec<O> = jumps.iter().flat_map(|j| j.ops.iter().cloned()).collect();
        return Jump {
            source: first.source,
            target: last.target,
            ops,
            level,
            aggregated: false,
        };
    }

    /// Compose when there is something to merge, else pass through.
    pub fn aggregate(jumps: &[Jump<O>], level: usize) -> Jump<O> {
        if jumps.len() > 1 {
            return Jump::compose(jumps, level);
        }
        return Jump::concatenate(jumps, level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the raw versions it covers; composition concatenates.
    #[derive(Clone, Debug, PartialEq)]
    struct Trace(Vec<Version>);

    impl Compose for Trace {
        fn noop() -> Trace {
            return Trace(Vec::new());
        }
        fn compose(ops: &[Trace]) -> Trace {
            return Trace(ops.iter().flat_map(|t| t.0.iter().copied()).collect());
        }
    }

    fn steps(range: std::ops::RangeInclusive<Version>) -> Vec<Jump<Trace>> {
        return range.map(|v| Jump::step(v - 1, v, Trace(vec![v]))).collect();
    }

    #[test]
    fn compose_merges_ops_and_spans_endpoints() {
        let jumps = steps(1..=4);
        let out = Jump::compose(&jumps, 0);
        assert_eq!(out.source, Some(0));
        assert_eq!(out.target, 4);
        assert_eq!(out.ops, vec![Trace(vec![1, 2, 3, 4])]);
        assert!(out.aggregated);
    }

    #[test]
    fn compose_of_placeholders_is_noop() {
        // Placeholders carry no operations; composing them still yields
        // an explicit no-op operation, not an empty ops list.
        let jumps = vec![
            Jump::<Trace>::placeholder(3, 0),
            Jump::<Trace>::placeholder(3, 0),
        ];
        let out = Jump::compose(&jumps, 0);
        assert_eq!(out.ops, vec![Trace::noop()]);
    }

    #[test]
    fn concatenate_keeps_ops_unmerged() {
        let jumps = steps(1..=3);
        let out = Jump::concatenate(&jumps, 1);
        assert_eq!(out.ops, vec![Trace(vec![1]), Trace(vec![2]), Trace(vec![3])]);
        assert!(!out.aggregated);
        assert_eq!(out.level, 1);
    }

    #[test]
    fn aggregate_composes_when_more_than_one() {
        let jumps = steps(1..=2);
        assert!(Jump::aggregate(&jumps, 0).aggregated);
    }

    #[test]
    fn aggregate_passes_single_jump_through() {
        let jumps = steps(1..=1);
        let out = Jump::aggregate(&jumps, 0);
        assert!(!out.aggregated);
        assert_eq!(out.source, Some(0));
        assert_eq!(out.target, 1);
    }
}
