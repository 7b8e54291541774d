//! Common interface of every selection-and-routing algorithm.

use crate::exact::BruteForceSolver;
use crate::heuristics::{StreamingRatioHeuristic, StreamingRatioSpreadHeuristic, SubsetMstHeuristic};
use crate::instance::DeliveryInstance;
use crate::path::DeliveryPath;
use serde::{Deserialize, Serialize};

/// An algorithm that picks and orders a subset of an instance's tasks.
///
/// Implementations never fail: an empty universe or a non-positive capacity
/// yields the empty path. The returned path borrows the instance's distance
/// cache.
pub trait DeliverySolver {
    fn solve<'a>(&self, instance: &'a DeliveryInstance) -> DeliveryPath<'a>;
    fn name(&self) -> &str;
}

/// Keep `candidate` if it strictly outranks `best`.
pub(crate) fn keep_best<'a>(best: &mut DeliveryPath<'a>, candidate: DeliveryPath<'a>) -> bool {
    if candidate.outranks(best) {
        *best = candidate;
        true
    } else {
        false
    }
}

/// The algorithms shipped with the crate.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SolverKind {
    BruteForce,
    SubsetMst,
    StreamingRatio,
    StreamingRatioSpread,
}

impl SolverKind {
    pub fn all() -> [SolverKind; 4] {
        [
            SolverKind::BruteForce,
            SolverKind::SubsetMst,
            SolverKind::StreamingRatio,
            SolverKind::StreamingRatioSpread,
        ]
    }

    pub fn build(&self) -> Box<dyn DeliverySolver> {
        match self {
            SolverKind::BruteForce => Box::new(BruteForceSolver::new()),
            SolverKind::SubsetMst => Box::new(SubsetMstHeuristic::new()),
            SolverKind::StreamingRatio => Box::new(StreamingRatioHeuristic::new()),
            SolverKind::StreamingRatioSpread => Box::new(StreamingRatioSpreadHeuristic::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SolverKind::BruteForce => "BruteForce",
            SolverKind::SubsetMst => "SubsetMst",
            SolverKind::StreamingRatio => "StreamingRatio",
            SolverKind::StreamingRatioSpread => "StreamingRatioSpread",
        }
    }
}
