//! Exhaustive solver: every feasible subset, every ordering.
//!
//! For each non-empty subset that fits the capacity, the shortest ordering
//! is taken as the subset's representative (collected value does not depend
//! on order, travel cost does), and the representatives compete under the
//! path ranking. Cost is O(2^n * n!), so this is a ground-truth oracle for
//! small inputs only; bounding n is the caller's job.

use crate::geometry::DistanceCache;
use crate::instance::{DeliveryInstance, Task};
use crate::path::{route_length, total_weight, DeliveryPath};
use crate::solver::{keep_best, DeliverySolver};
use itertools::Itertools;

/// Brute force configuration
#[derive(Debug, Clone)]
pub struct BruteForceConfig {
    /// Log a warning when asked to solve more tasks than this
    pub warn_above: usize,
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        BruteForceConfig { warn_above: 12 }
    }
}

/// Outcome of an exhaustive run
#[derive(Debug, Clone)]
pub struct ExactResult<'a> {
    /// Best path found
    pub path: DeliveryPath<'a>,
    /// Subsets within capacity
    pub feasible_subsets: u64,
    /// Subsets skipped for exceeding capacity
    pub infeasible_subsets: u64,
    /// Orderings whose length was evaluated
    pub permutations: u64,
}

pub struct BruteForceSolver {
    pub config: BruteForceConfig,
}

impl BruteForceSolver {
    pub fn new() -> Self {
        BruteForceSolver {
            config: BruteForceConfig::default(),
        }
    }

    pub fn with_config(config: BruteForceConfig) -> Self {
        BruteForceSolver { config }
    }

    pub fn solve_with_stats<'a>(&self, instance: &'a DeliveryInstance) -> ExactResult<'a> {
        let distances = &instance.distances;
        let mut result = ExactResult {
            path: DeliveryPath::empty(distances),
            feasible_subsets: 0,
            infeasible_subsets: 0,
            permutations: 0,
        };

        let n = instance.len();
        if n == 0 || instance.capacity <= 0.0 {
            return result;
        }
        if n > self.config.warn_above {
            log::warn!(
                "brute force on {} tasks enumerates 2^{} subsets with factorial orderings each",
                n,
                n
            );
        }

        for size in 1..=n {
            for combo in (0..n).combinations(size) {
                let subset: Vec<Task> = combo.iter().map(|&i| instance.tasks[i]).collect();
                if total_weight(&subset) > instance.capacity {
                    result.infeasible_subsets += 1;
                    continue;
                }
                result.feasible_subsets += 1;

                let (candidate, evaluated) = shortest_ordering_counted(distances, &subset);
                result.permutations += evaluated;
                keep_best(&mut result.path, candidate);
            }
        }

        log::debug!(
            "brute force: {} feasible subsets, {} skipped, {} orderings, best profit {:.3}",
            result.feasible_subsets,
            result.infeasible_subsets,
            result.permutations,
            result.path.profit()
        );
        result
    }
}

impl Default for BruteForceSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliverySolver for BruteForceSolver {
    fn solve<'a>(&self, instance: &'a DeliveryInstance) -> DeliveryPath<'a> {
        self.solve_with_stats(instance).path
    }

    fn name(&self) -> &str {
        "BruteForce"
    }
}

/// The shortest visiting order of `tasks`, by full permutation search.
/// The first ordering found wins among equal lengths.
pub fn shortest_ordering<'a>(distances: &'a DistanceCache, tasks: &[Task]) -> DeliveryPath<'a> {
    shortest_ordering_counted(distances, tasks).0
}

fn shortest_ordering_counted<'a>(
    distances: &'a DistanceCache,
    tasks: &[Task],
) -> (DeliveryPath<'a>, u64) {
    let mut best_order = tasks.to_vec();
    let mut best_length = f64::INFINITY;
    let mut evaluated = 0u64;

    // Orderings arrive lexicographically by input position, identity first.
    for perm in tasks.iter().copied().permutations(tasks.len()) {
        evaluated += 1;
        let length = route_length(distances, &perm);
        if length < best_length {
            best_length = length;
            best_order = perm;
        }
    }

    (DeliveryPath::new(distances, best_order), evaluated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::instance::GeneratorConfig;

    fn create_test_instance(scale: f64) -> DeliveryInstance {
        let tasks = vec![
            Task::new(0, 100.0 * scale, 50.0, Point::new(0.0, 0.0)).unwrap(),
            Task::new(1, 80.0 * scale, 40.0, Point::new(1.0, 0.0)).unwrap(),
            Task::new(2, 60.0 * scale, 30.0, Point::new(0.0, 1.0)).unwrap(),
        ];
        DeliveryInstance::new("triangle", tasks, 250.0).unwrap()
    }

    /// Best profit over every capacity-feasible sequence of distinct tasks.
    fn oracle_profit(instance: &DeliveryInstance) -> f64 {
        fn dfs(
            instance: &DeliveryInstance,
            used: &mut Vec<bool>,
            seq: &mut Vec<Task>,
            weight: f64,
            best: &mut f64,
        ) {
            let profit = DeliveryPath::new(&instance.distances, seq.clone()).profit();
            if profit > *best {
                *best = profit;
            }
            for i in 0..instance.len() {
                let task = instance.tasks[i];
                if !used[i] && weight + task.weight() <= instance.capacity {
                    used[i] = true;
                    seq.push(task);
                    dfs(instance, used, seq, weight + task.weight(), best);
                    seq.pop();
                    used[i] = false;
                }
            }
        }

        let mut best = f64::NEG_INFINITY;
        let mut used = vec![false; instance.len()];
        dfs(instance, &mut used, &mut Vec::new(), 0.0, &mut best);
        best
    }

    #[test]
    fn test_shortest_ordering_of_triangle() {
        let instance = create_test_instance(1.0);
        let path = shortest_ordering(&instance.distances, &instance.tasks);

        assert!((path.length() - 2.0).abs() < 1e-12);
        assert_eq!(path.tasks()[1].id, 0);
        assert!((path.profit() - (2.4 - 4.0)).abs() < 1e-9);
    }

    #[test]
    fn test_triangle_prefers_single_task_when_travel_dominates() {
        let instance = create_test_instance(1.0);
        let path = BruteForceSolver::new().solve(&instance);

        assert_eq!(path.task_ids(), vec![0]);
        assert!((path.profit() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_triangle_selects_all_when_value_dominates() {
        let instance = create_test_instance(10.0);
        let path = BruteForceSolver::new().solve(&instance);

        assert_eq!(path.len(), 3);
        assert!((path.weight() - 120.0).abs() < 1e-12);
        assert!((path.length() - 2.0).abs() < 1e-12);
        assert!((path.profit() - (24.0 - 4.0)).abs() < 1e-9);
    }

    #[test]
    fn test_matches_exhaustive_oracle() {
        for seed in 0..6 {
            for &n in &[5usize, 6, 7, 8] {
                let config = GeneratorConfig {
                    count: n,
                    seed,
                    ..Default::default()
                };
                let instance = DeliveryInstance::generate(&config, 100.0);
                let result = BruteForceSolver::new().solve_with_stats(&instance);

                assert!(result.path.weight() <= instance.capacity);
                assert!(
                    (result.path.profit() - oracle_profit(&instance)).abs() < 1e-9,
                    "seed {} n {}",
                    seed,
                    n
                );
                assert_eq!(
                    result.feasible_subsets + result.infeasible_subsets,
                    (1u64 << n) - 1
                );
            }
        }
    }

    #[test]
    fn test_overweight_task_gives_empty_path() {
        let tasks = vec![Task::new(0, 500.0, 300.0, Point::new(0.0, 0.0)).unwrap()];
        let instance = DeliveryInstance::new("heavy", tasks, 250.0).unwrap();
        let path = BruteForceSolver::new().solve(&instance);
        assert!(path.is_empty());
        assert_eq!(path.profit(), 0.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        let empty = DeliveryInstance::new("empty", Vec::new(), 250.0).unwrap();
        assert!(BruteForceSolver::new().solve(&empty).is_empty());

        let mut instance = create_test_instance(1.0);
        instance.capacity = 0.0;
        assert!(BruteForceSolver::new().solve(&instance).is_empty());
        instance.capacity = -10.0;
        assert!(BruteForceSolver::new().solve(&instance).is_empty());
    }

    #[test]
    fn test_counts_every_ordering() {
        let instance = create_test_instance(1.0);
        let result = BruteForceSolver::new().solve_with_stats(&instance);
        // 3 singletons, 3 pairs, 1 triple: 3*1 + 3*2 + 1*6
        assert_eq!(result.feasible_subsets, 7);
        assert_eq!(result.permutations, 15);
    }
}
