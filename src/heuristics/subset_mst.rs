//! Subset enumeration with spanning-tree routing.
//!
//! Same search space as the brute force, but each feasible subset is ordered
//! by the spanning-tree router instead of by permutation search, which drops
//! the factorial term: O(2^n * n^2).

use crate::instance::{DeliveryInstance, Task};
use crate::path::{total_weight, DeliveryPath};
use crate::solver::{keep_best, DeliverySolver};
use itertools::Itertools;

/// Subset + MST heuristic.
///
/// Subset sizes are tried in increasing order, and enumeration stops at the
/// first size for which no subset fits the capacity. Weights are positive, so
/// every larger subset contains an infeasible one and cannot fit either.
pub struct SubsetMstHeuristic {
    /// Stop at the first subset size with no feasible subset
    pub early_stop: bool,
}

impl SubsetMstHeuristic {
    pub fn new() -> Self {
        SubsetMstHeuristic { early_stop: true }
    }

    /// Variant that enumerates every subset size.
    pub fn exhaustive() -> Self {
        SubsetMstHeuristic { early_stop: false }
    }
}

impl Default for SubsetMstHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliverySolver for SubsetMstHeuristic {
    fn solve<'a>(&self, instance: &'a DeliveryInstance) -> DeliveryPath<'a> {
        let distances = &instance.distances;
        let mut best = DeliveryPath::empty(distances);
        let n = instance.len();
        if n == 0 || instance.capacity <= 0.0 {
            return best;
        }

        for size in 1..=n {
            let mut any_feasible = false;
            for combo in (0..n).combinations(size) {
                let subset: Vec<Task> = combo.iter().map(|&i| instance.tasks[i]).collect();
                if total_weight(&subset) > instance.capacity {
                    continue;
                }
                any_feasible = true;
                keep_best(&mut best, DeliveryPath::routed(distances, &subset));
            }

            if !any_feasible && self.early_stop {
                log::debug!("{}: no subset of size {} fits, stopping", self.name(), size);
                break;
            }
        }

        best
    }

    fn name(&self) -> &str {
        if self.early_stop {
            "SubsetMst"
        } else {
            "SubsetMst-Exhaustive"
        }
    }
}
