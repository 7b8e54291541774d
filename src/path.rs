//! Ordered delivery paths and their scoring.
//!
//! A path's length, weight and profit are computed on first access and cached
//! inside the path. Paths expose no way to mutate their task sequence, so a
//! cached metric can never go stale; build a new path instead.

use crate::geometry::DistanceCache;
use crate::instance::Task;
use crate::routing;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::cmp::Ordering;

/// Currency normalisation applied to collected value.
pub const VALUE_SCALE: f64 = 0.01;
/// Travel is charged per unit length in both directions.
pub const TRAVEL_COST_FACTOR: f64 = 2.0;

/// Sum of distances between consecutive tasks.
pub fn route_length(distances: &DistanceCache, tasks: &[Task]) -> f64 {
    tasks
        .windows(2)
        .map(|pair| distances.distance(&pair[0].point, &pair[1].point))
        .sum()
}

/// Sum that depends only on the multiset of terms, never on their order.
///
/// Terms are added smallest first, so any two sequences holding the same
/// values produce bit-identical totals.
pub fn canonical_sum(terms: impl IntoIterator<Item = f64>) -> f64 {
    let mut terms: Vec<f64> = terms.into_iter().collect();
    terms.sort_unstable_by_key(|&t| OrderedFloat(t));
    terms.iter().sum()
}

/// Total weight of `tasks`. Every capacity check goes through this, so a
/// set judged feasible keeps the same weight once it becomes a path.
pub fn total_weight<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> f64 {
    canonical_sum(tasks.into_iter().map(Task::weight))
}

/// Ranking comparator: higher profit wins, then lower weight.
///
/// Equivalent to comparing `(profit, -weight)` tuples.
pub fn compare_paths(a: &DeliveryPath<'_>, b: &DeliveryPath<'_>) -> Ordering {
    a.rank_key().cmp(&b.rank_key())
}

/// An ordered sequence of tasks with memoized metrics.
#[derive(Debug, Clone)]
pub struct DeliveryPath<'c> {
    tasks: Vec<Task>,
    distances: &'c DistanceCache,
    length: OnceCell<f64>,
    weight: OnceCell<f64>,
    profit: OnceCell<f64>,
}

impl<'c> DeliveryPath<'c> {
    /// The path that delivers nothing: profit 0, weight 0.
    pub fn empty(distances: &'c DistanceCache) -> Self {
        Self::new(distances, Vec::new())
    }

    /// A path visiting `tasks` in the given order.
    pub fn new(distances: &'c DistanceCache, tasks: Vec<Task>) -> Self {
        DeliveryPath {
            tasks,
            distances,
            length: OnceCell::new(),
            weight: OnceCell::new(),
            profit: OnceCell::new(),
        }
    }

    /// A path over an unordered task set, ordered by the spanning-tree router.
    pub fn routed(distances: &'c DistanceCache, tasks: &[Task]) -> Self {
        Self::new(distances, routing::mst_order(distances, tasks))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Travel distance along the path; 0 for fewer than two tasks.
    pub fn length(&self) -> f64 {
        *self
            .length
            .get_or_init(|| route_length(self.distances, &self.tasks))
    }

    /// Total weight carried.
    pub fn weight(&self) -> f64 {
        *self
            .weight
            .get_or_init(|| total_weight(&self.tasks))
    }

    /// Scaled collected value minus round-trip travel cost.
    pub fn profit(&self) -> f64 {
        *self.profit.get_or_init(|| {
            let value = canonical_sum(self.tasks.iter().map(|t| t.value() * VALUE_SCALE));
            value - TRAVEL_COST_FACTOR * self.length()
        })
    }

    /// Unscaled sum of task values.
    pub fn value(&self) -> f64 {
        canonical_sum(self.tasks.iter().map(Task::value))
    }

    /// Whether the path's weight is within `capacity`.
    pub fn fits(&self, capacity: f64) -> bool {
        self.weight() <= capacity
    }

    /// Ordering key; larger is better.
    pub fn rank_key(&self) -> (OrderedFloat<f64>, OrderedFloat<f64>) {
        (OrderedFloat(self.profit()), OrderedFloat(-self.weight()))
    }

    pub fn cmp_rank(&self, other: &DeliveryPath<'_>) -> Ordering {
        compare_paths(self, other)
    }

    /// Strictly better than `other` under the ranking.
    pub fn outranks(&self, other: &DeliveryPath<'_>) -> bool {
        self.cmp_rank(other) == Ordering::Greater
    }

    pub fn task_ids(&self) -> Vec<usize> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    pub fn summary(&self, algorithm: &str, computation_time: f64) -> PathSummary {
        PathSummary {
            algorithm: algorithm.to_string(),
            tasks: self.task_ids(),
            length: self.length(),
            weight: self.weight(),
            value: self.value(),
            profit: self.profit(),
            computation_time,
        }
    }
}

impl std::fmt::Display for DeliveryPath<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Path ({} tasks)", self.len())?;
        writeln!(f, "  Profit: {:.2}", self.profit())?;
        writeln!(f, "  Length: {:.3}", self.length())?;
        writeln!(f, "  Weight: {:.1}", self.weight())?;
        for task in &self.tasks {
            writeln!(
                f,
                "\t#{:<4} value={:<6} weight={:<5} at ({:.3}, {:.3})",
                task.id,
                task.value(),
                task.weight(),
                task.point.x,
                task.point.y
            )?;
        }
        Ok(())
    }
}

/// Serializable snapshot of a path's outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSummary {
    /// Algorithm that produced the path
    pub algorithm: String,
    /// Task ids in visiting order
    pub tasks: Vec<usize>,
    pub length: f64,
    pub weight: f64,
    pub value: f64,
    pub profit: f64,
    /// Computation time in seconds
    pub computation_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn task(id: usize, value: f64, weight: f64, x: f64, y: f64) -> Task {
        Task::new(id, value, weight, Point::new(x, y)).unwrap()
    }

    #[test]
    fn test_weight_independent_of_order() {
        let cache = DistanceCache::new();
        let heavy_first = vec![
            task(0, 1.0, 0.3, 0.0, 0.0),
            task(1, 1.0, 0.2, 1.0, 0.0),
            task(2, 1.0, 0.1, 2.0, 0.0),
        ];
        let light_first: Vec<Task> = heavy_first.iter().rev().copied().collect();

        let a = DeliveryPath::new(&cache, heavy_first.clone());
        let b = DeliveryPath::new(&cache, light_first);
        assert_eq!(a.weight().to_bits(), b.weight().to_bits());
        assert_eq!(a.weight().to_bits(), total_weight(&heavy_first).to_bits());
        assert_eq!(a.fits(0.6), b.fits(0.6));
    }

    #[test]
    fn test_empty_path() {
        let cache = DistanceCache::new();
        let path = DeliveryPath::empty(&cache);
        assert_eq!(path.length(), 0.0);
        assert_eq!(path.weight(), 0.0);
        assert_eq!(path.profit(), 0.0);
    }

    #[test]
    fn test_degenerate_lengths() {
        let cache = DistanceCache::new();
        let single = DeliveryPath::new(&cache, vec![task(0, 100.0, 10.0, 5.0, 5.0)]);
        assert_eq!(single.length(), 0.0);
        assert!((single.profit() - 1.0).abs() < 1e-12);

        let pair = DeliveryPath::new(
            &cache,
            vec![task(0, 100.0, 10.0, 0.0, 0.0), task(1, 50.0, 5.0, 3.0, 4.0)],
        );
        assert!((pair.length() - 5.0).abs() < 1e-12);
        assert!((pair.weight() - 15.0).abs() < 1e-12);
        assert!((pair.profit() - (1.5 - 10.0)).abs() < 1e-12);
    }

    #[test]
    fn test_coincident_tasks_cost_nothing() {
        let cache = DistanceCache::new();
        let a = task(0, 70.0, 3.0, 2.0, 2.0);
        let b = task(1, 30.0, 4.0, 2.0, 2.0);

        for order in [vec![a, b], vec![b, a]] {
            let path = DeliveryPath::new(&cache, order);
            assert_eq!(path.length(), 0.0);
            assert!((path.profit() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_length_follows_order() {
        let cache = DistanceCache::new();
        let a = task(0, 1.0, 1.0, 0.0, 0.0);
        let b = task(1, 1.0, 1.0, 1.0, 0.0);
        let c = task(2, 1.0, 1.0, 2.0, 0.0);

        assert!((DeliveryPath::new(&cache, vec![a, b, c]).length() - 2.0).abs() < 1e-12);
        assert!((DeliveryPath::new(&cache, vec![a, c, b]).length() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_profit_dominates_weight() {
        let cache = DistanceCache::new();
        let richer_heavier = DeliveryPath::new(&cache, vec![task(0, 200.0, 40.0, 0.0, 0.0)]);
        let poorer_lighter = DeliveryPath::new(&cache, vec![task(1, 100.0, 1.0, 0.0, 0.0)]);

        assert!(richer_heavier.outranks(&poorer_lighter));
        assert_eq!(compare_paths(&poorer_lighter, &richer_heavier), Ordering::Less);
    }

    #[test]
    fn test_equal_profit_prefers_lighter() {
        let cache = DistanceCache::new();
        let light = DeliveryPath::new(&cache, vec![task(0, 100.0, 10.0, 0.0, 0.0)]);
        let heavy = DeliveryPath::new(&cache, vec![task(1, 100.0, 30.0, 9.0, 9.0)]);

        assert!(light.outranks(&heavy));
        assert!(!heavy.outranks(&light));
        assert_eq!(light.cmp_rank(&light.clone()), Ordering::Equal);
    }

    #[test]
    fn test_empty_path_ranks_below_positive_profit() {
        let cache = DistanceCache::new();
        let empty = DeliveryPath::empty(&cache);
        let path = DeliveryPath::new(&cache, vec![task(0, 5.0, 50.0, 0.0, 0.0)]);
        assert!(path.outranks(&empty));
    }

    #[test]
    fn test_sorting_with_comparator() {
        let cache = DistanceCache::new();
        let mut paths = vec![
            DeliveryPath::new(&cache, vec![task(0, 100.0, 30.0, 0.0, 0.0)]),
            DeliveryPath::new(&cache, vec![task(1, 300.0, 30.0, 0.0, 0.0)]),
            DeliveryPath::new(&cache, vec![task(2, 100.0, 10.0, 0.0, 0.0)]),
            DeliveryPath::empty(&cache),
        ];
        paths.sort_by(compare_paths);
        let ids: Vec<Vec<usize>> = paths.iter().map(|p| p.task_ids()).collect();
        assert_eq!(ids, vec![vec![], vec![0], vec![2], vec![1]]);
    }

    #[test]
    fn test_summary() {
        let cache = DistanceCache::new();
        let path = DeliveryPath::new(
            &cache,
            vec![task(4, 100.0, 10.0, 0.0, 0.0), task(2, 100.0, 10.0, 0.0, 1.0)],
        );
        let summary = path.summary("Test", 0.5);
        assert_eq!(summary.tasks, vec![4, 2]);
        assert!((summary.value - 200.0).abs() < 1e-12);
        assert!((summary.profit - 0.0).abs() < 1e-12);
    }
}
