//! Streaming density heuristic.
//!
//! One pass over the tasks in descending value/weight order. Each task is
//! admitted, then the lowest-density members are evicted until the admitted
//! weight fits again. Every intermediate admitted set is routed and scored,
//! and the best one seen is kept: a half-filled set can beat the final,
//! fully packed one.

use super::streaming::{density_order, AdmittedSet, StepRecord, StreamOutcome};
use crate::instance::DeliveryInstance;
use crate::path::DeliveryPath;
use crate::solver::{keep_best, DeliverySolver};

pub struct StreamingRatioHeuristic;

impl StreamingRatioHeuristic {
    pub fn new() -> Self {
        StreamingRatioHeuristic
    }

    /// Run the pass and keep the per-step history.
    pub fn run<'a>(&self, instance: &'a DeliveryInstance) -> StreamOutcome<'a> {
        let mut outcome = StreamOutcome::empty(instance);
        if instance.is_empty() || instance.capacity <= 0.0 {
            return outcome;
        }

        let distances = &instance.distances;
        let mut admitted = AdmittedSet::new();

        for (position, task) in density_order(&instance.tasks).into_iter().enumerate() {
            admitted.admit(position, task);
            while admitted.weight() > instance.capacity {
                if admitted.evict_lowest_density().is_none() {
                    break;
                }
            }

            let candidate = DeliveryPath::routed(distances, &admitted.tasks());
            let candidate_profit = candidate.profit();
            if keep_best(&mut outcome.best, candidate) {
                log::debug!(
                    "{}: step {} improved best to {:.3} with {} tasks",
                    self.name(),
                    position + 1,
                    candidate_profit,
                    admitted.len()
                );
            }

            outcome.steps.push(StepRecord {
                processed: position + 1,
                admitted: admitted.len(),
                admitted_weight: admitted.weight(),
                candidate_profit,
                best_profit: outcome.best.profit(),
                pruned: 0,
            });
        }

        outcome
    }
}

impl Default for StreamingRatioHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliverySolver for StreamingRatioHeuristic {
    fn solve<'a>(&self, instance: &'a DeliveryInstance) -> DeliveryPath<'a> {
        self.run(instance).best
    }

    fn name(&self) -> &str {
        "StreamingRatio"
    }
}
