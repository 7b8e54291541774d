//! Streaming density heuristic with outlier pruning.
//!
//! Extends the plain streaming pass with a "spread" per admitted task: the
//! sum of its distances to every other admitted task. After capacity is
//! enforced, the task with the largest spread is tentatively dropped and the
//! reduced set re-routed; the drop is kept only when the reduced path strictly
//! outranks the current one, and the first non-improving drop ends the step.

use super::streaming::{density_order, AdmittedSet, StepRecord, StreamOutcome};
use crate::geometry::DistanceCache;
use crate::instance::{DeliveryInstance, Task};
use crate::path::DeliveryPath;
use crate::solver::{keep_best, DeliverySolver};
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Outlier pruning configuration
#[derive(Debug, Clone)]
pub struct RatioSpreadConfig {
    /// Pruning only runs while more than this many tasks are admitted
    pub prune_floor: usize,
}

impl Default for RatioSpreadConfig {
    fn default() -> Self {
        RatioSpreadConfig { prune_floor: 0 }
    }
}

/// Running sum of distances from each admitted task to the others.
#[derive(Debug, Clone, Default)]
pub struct SpreadTracker {
    spread: BTreeMap<usize, f64>,
}

impl SpreadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for `task` joining the set; call before admitting it.
    pub fn add(
        &mut self,
        distances: &DistanceCache,
        admitted: &AdmittedSet,
        position: usize,
        task: &Task,
    ) {
        let mut own = 0.0;
        for (member_pos, member) in admitted.iter() {
            let d = distances.distance(&task.point, &member.point);
            if let Some(s) = self.spread.get_mut(&member_pos) {
                *s += d;
            }
            own += d;
        }
        self.spread.insert(position, own);
    }

    /// Account for `task` leaving the set; call after removing it.
    pub fn remove(
        &mut self,
        distances: &DistanceCache,
        admitted: &AdmittedSet,
        position: usize,
        task: &Task,
    ) {
        self.spread.remove(&position);
        for (member_pos, member) in admitted.iter() {
            if let Some(s) = self.spread.get_mut(&member_pos) {
                *s -= distances.distance(&task.point, &member.point);
            }
        }
    }

    /// Recompute every spread from the admitted set.
    pub fn rebuild(&mut self, distances: &DistanceCache, admitted: &AdmittedSet) {
        self.spread.clear();
        for (pos, task) in admitted.iter() {
            let total: f64 = admitted
                .iter()
                .filter(|(other, _)| *other != pos)
                .map(|(_, other)| distances.distance(&task.point, &other.point))
                .sum();
            self.spread.insert(pos, total);
        }
    }

    /// Position with the largest spread; the earliest admitted wins ties.
    pub fn furthest(&self) -> Option<usize> {
        self.spread
            .iter()
            .max_by_key(|(pos, s)| (OrderedFloat(**s), Reverse(**pos)))
            .map(|(&pos, _)| pos)
    }

    pub fn get(&self, position: usize) -> Option<f64> {
        self.spread.get(&position).copied()
    }

    pub fn len(&self) -> usize {
        self.spread.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spread.is_empty()
    }
}

pub struct StreamingRatioSpreadHeuristic {
    pub config: RatioSpreadConfig,
}

impl StreamingRatioSpreadHeuristic {
    pub fn new() -> Self {
        StreamingRatioSpreadHeuristic {
            config: RatioSpreadConfig::default(),
        }
    }

    pub fn with_config(config: RatioSpreadConfig) -> Self {
        StreamingRatioSpreadHeuristic { config }
    }

    /// Run the pass and keep the per-step history.
    pub fn run<'a>(&self, instance: &'a DeliveryInstance) -> StreamOutcome<'a> {
        let mut outcome = StreamOutcome::empty(instance);
        if instance.is_empty() || instance.capacity <= 0.0 {
            return outcome;
        }

        let distances = &instance.distances;
        let mut admitted = AdmittedSet::new();
        let mut spread = SpreadTracker::new();

        for (position, task) in density_order(&instance.tasks).into_iter().enumerate() {
            spread.add(distances, &admitted, position, &task);
            admitted.admit(position, task);

            while admitted.weight() > instance.capacity {
                let Some((evicted_pos, evicted)) = admitted.evict_lowest_density() else {
                    break;
                };
                spread.remove(distances, &admitted, evicted_pos, &evicted);
            }

            let mut candidate = DeliveryPath::routed(distances, &admitted.tasks());
            let pruned = self.prune_outliers(distances, &mut admitted, &mut spread, &mut candidate);

            let candidate_profit = candidate.profit();
            if keep_best(&mut outcome.best, candidate) {
                log::debug!(
                    "{}: step {} improved best to {:.3} with {} tasks ({} pruned)",
                    self.name(),
                    position + 1,
                    candidate_profit,
                    admitted.len(),
                    pruned
                );
            }

            outcome.steps.push(StepRecord {
                processed: position + 1,
                admitted: admitted.len(),
                admitted_weight: admitted.weight(),
                candidate_profit,
                best_profit: outcome.best.profit(),
                pruned,
            });
        }

        outcome
    }

    /// Drop the furthest task while doing so strictly improves the candidate.
    /// Returns the number of tasks dropped.
    fn prune_outliers<'a>(
        &self,
        distances: &'a DistanceCache,
        admitted: &mut AdmittedSet,
        spread: &mut SpreadTracker,
        candidate: &mut DeliveryPath<'a>,
    ) -> usize {
        let mut pruned = 0;
        while admitted.len() > self.config.prune_floor {
            let Some(outlier) = spread.furthest() else {
                break;
            };
            let reduced = DeliveryPath::routed(distances, &admitted.tasks_without(outlier));
            if !reduced.outranks(candidate) {
                break;
            }

            *candidate = reduced;
            admitted.remove(outlier);
            spread.rebuild(distances, admitted);
            pruned += 1;
        }
        pruned
    }
}

impl Default for StreamingRatioSpreadHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliverySolver for StreamingRatioSpreadHeuristic {
    fn solve<'a>(&self, instance: &'a DeliveryInstance) -> DeliveryPath<'a> {
        self.run(instance).best
    }

    fn name(&self) -> &str {
        "StreamingRatioSpread"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::heuristics::ratio::StreamingRatioHeuristic;
    use crate::instance::GeneratorConfig;

    /// A tight cluster plus one dense but remote task.
    fn create_test_instance() -> DeliveryInstance {
        let tasks = vec![
            Task::new(0, 100.0, 1.0, Point::new(0.0, 0.0)).unwrap(),
            Task::new(1, 100.0, 1.0, Point::new(0.0, 0.1)).unwrap(),
            Task::new(2, 100.0, 1.0, Point::new(0.1, 0.0)).unwrap(),
            Task::new(3, 120.0, 1.0, Point::new(5.0, 5.0)).unwrap(),
        ];
        DeliveryInstance::new("cluster", tasks, 100.0).unwrap()
    }

    #[test]
    fn test_prunes_remote_task() {
        let instance = create_test_instance();
        let outcome = StreamingRatioSpreadHeuristic::new().run(&instance);

        let mut ids = outcome.best.task_ids();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);
        // Prim attaches (0,0), (0,0.1), then (0.1,0).
        let expected = 3.0 - 2.0 * (0.1 + 0.02f64.sqrt());
        assert!((outcome.best.profit() - expected).abs() < 1e-9);
        assert_eq!(outcome.steps[1].pruned, 1);
        assert_eq!(outcome.steps[1].admitted, 1);
    }

    #[test]
    fn test_beats_plain_ratio_on_outlier() {
        let instance = create_test_instance();
        let plain = StreamingRatioHeuristic::new().solve(&instance);
        let pruned = StreamingRatioSpreadHeuristic::new().solve(&instance);

        assert_eq!(plain.task_ids(), vec![3]);
        assert!(pruned.outranks(&plain));
    }

    #[test]
    fn test_prune_floor_disables_pruning() {
        let instance = create_test_instance();
        let config = RatioSpreadConfig { prune_floor: 10 };
        let outcome = StreamingRatioSpreadHeuristic::with_config(config).run(&instance);

        assert!(outcome.steps.iter().all(|s| s.pruned == 0));
        assert_eq!(outcome.best.task_ids(), vec![3]);
    }

    #[test]
    fn test_incremental_spread_matches_rebuild() {
        let config = GeneratorConfig {
            count: 25,
            seed: 11,
            ..Default::default()
        };
        let instance = DeliveryInstance::generate(&config, 1000.0);
        let distances = &instance.distances;

        let mut admitted = AdmittedSet::new();
        let mut spread = SpreadTracker::new();
        for (pos, task) in instance.tasks.iter().enumerate() {
            spread.add(distances, &admitted, pos, task);
            admitted.admit(pos, *task);
            if pos % 3 == 2 {
                if let Some((evicted_pos, evicted)) = admitted.evict_lowest_density() {
                    spread.remove(distances, &admitted, evicted_pos, &evicted);
                }
            }
        }

        let mut rebuilt = SpreadTracker::new();
        rebuilt.rebuild(distances, &admitted);
        assert_eq!(spread.len(), admitted.len());
        for (pos, _) in admitted.iter() {
            let a = spread.get(pos).unwrap();
            let b = rebuilt.get(pos).unwrap();
            assert!((a - b).abs() < 1e-9, "position {}", pos);
        }
    }

    #[test]
    fn test_feasible_and_monotone_on_random_instances() {
        for seed in 0..8 {
            for &(n, capacity) in &[(10usize, 100.0), (40, 300.0), (120, 2000.0)] {
                let config = GeneratorConfig {
                    count: n,
                    seed,
                    ..Default::default()
                };
                let instance = DeliveryInstance::generate(&config, capacity);
                let outcome = StreamingRatioSpreadHeuristic::new().run(&instance);

                assert!(outcome.best.weight() <= capacity);
                for pair in outcome.steps.windows(2) {
                    assert!(pair[1].best_profit >= pair[0].best_profit);
                }
                for step in &outcome.steps {
                    assert!(step.admitted_weight <= capacity + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_overweight_and_degenerate() {
        let heavy = vec![Task::new(0, 500.0, 300.0, Point::new(1.0, 1.0)).unwrap()];
        let instance = DeliveryInstance::new("heavy", heavy, 250.0).unwrap();
        assert!(StreamingRatioSpreadHeuristic::new().solve(&instance).is_empty());

        let empty = DeliveryInstance::new("empty", Vec::new(), 250.0).unwrap();
        assert!(StreamingRatioSpreadHeuristic::new().solve(&empty).is_empty());

        let mut instance = create_test_instance();
        for capacity in [0.0, -5.0] {
            instance.capacity = capacity;
            let outcome = StreamingRatioSpreadHeuristic::new().run(&instance);
            assert!(outcome.best.is_empty());
            assert!(outcome.steps.is_empty());
        }
    }
}
