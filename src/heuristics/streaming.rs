//! Bookkeeping shared by the streaming density heuristics.
//!
//! Tasks arrive in descending density order. The admitted set keeps them in a
//! min-heap on density so the least valuable task per unit weight is evicted
//! first whenever the capacity is exceeded.

use crate::instance::{DeliveryInstance, Task};
use crate::path::{total_weight, DeliveryPath};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

/// Heap key of an admitted task. The heap pops the lowest density first,
/// and among equal densities the task admitted last.
pub type EvictionKey = Reverse<(OrderedFloat<f64>, Reverse<usize>)>;

/// Key extraction for the eviction heap.
pub fn eviction_key(position: usize, task: &Task) -> EvictionKey {
    Reverse((OrderedFloat(task.density()), Reverse(position)))
}

/// Tasks sorted by descending density. The sort is stable, so equal
/// densities keep their instance order and runs are reproducible.
pub fn density_order(tasks: &[Task]) -> Vec<Task> {
    let mut stream = tasks.to_vec();
    stream.sort_by(|a, b| OrderedFloat(b.density()).cmp(&OrderedFloat(a.density())));
    stream
}

/// The in-capacity subset a streaming heuristic currently holds, keyed by
/// stream position.
#[derive(Debug, Clone, Default)]
pub struct AdmittedSet {
    heap: BinaryHeap<EvictionKey>,
    members: BTreeMap<usize, Task>,
    weight: f64,
}

impl AdmittedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, position: usize, task: Task) {
        self.heap.push(eviction_key(position, &task));
        self.members.insert(position, task);
        self.refresh_weight();
    }

    /// Remove and return the lowest-density member.
    pub fn evict_lowest_density(&mut self) -> Option<(usize, Task)> {
        let Reverse((_, Reverse(position))) = self.heap.pop()?;
        let task = self.members.remove(&position)?;
        self.refresh_weight();
        Some((position, task))
    }

    /// Remove a specific member regardless of its density.
    pub fn remove(&mut self, position: usize) -> Option<Task> {
        let task = self.members.remove(&position)?;
        self.heap
            .retain(|&Reverse((_, Reverse(p)))| p != position);
        self.refresh_weight();
        Some(task)
    }

    /// Recomputed from the members on every change so it matches the
    /// weight of a path built from them exactly.
    fn refresh_weight(&mut self) {
        self.weight = total_weight(self.members.values());
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members with their stream positions, in admission order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Task)> + '_ {
        self.members.iter().map(|(&p, t)| (p, t))
    }

    /// Members in admission order.
    pub fn tasks(&self) -> Vec<Task> {
        self.members.values().copied().collect()
    }

    /// Members in admission order, leaving one out.
    pub fn tasks_without(&self, position: usize) -> Vec<Task> {
        self.members
            .iter()
            .filter(|(p, _)| **p != position)
            .map(|(_, t)| *t)
            .collect()
    }
}

/// What a streaming heuristic saw after processing one task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Tasks consumed from the stream so far
    pub processed: usize,
    /// Size of the admitted set after eviction and pruning
    pub admitted: usize,
    pub admitted_weight: f64,
    /// Profit of this step's candidate path
    pub candidate_profit: f64,
    /// Best profit recorded up to and including this step
    pub best_profit: f64,
    /// Outliers dropped by local search in this step
    pub pruned: usize,
}

/// Result of a streaming run with its per-step history
#[derive(Debug, Clone)]
pub struct StreamOutcome<'a> {
    pub best: DeliveryPath<'a>,
    pub steps: Vec<StepRecord>,
}

impl<'a> StreamOutcome<'a> {
    pub(crate) fn empty(instance: &'a DeliveryInstance) -> Self {
        StreamOutcome {
            best: DeliveryPath::empty(&instance.distances),
            steps: Vec::new(),
        }
    }
}
