//! Spanning-tree router.
//!
//! Orders an unordered task set by the sequence in which Prim's algorithm
//! attaches tasks to a minimum spanning tree of the complete distance graph.
//! The result is a cheap stand-in for a short Hamiltonian path, not an
//! optimal one: O(n^2) to build the graph, O(n^2 log n) for queue traffic.

use crate::geometry::DistanceCache;
use crate::instance::Task;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Frontier edge: cost, insertion sequence (tie-break), target index.
type FrontierEdge = Reverse<(OrderedFloat<f64>, u64, usize)>;

/// Index of the task the traversal starts from: smallest x, first on ties.
pub fn start_index(tasks: &[Task]) -> Option<usize> {
    tasks
        .iter()
        .enumerate()
        .min_by_key(|(_, t)| OrderedFloat(t.point.x))
        .map(|(i, _)| i)
}

/// Visit every task exactly once in Prim attachment order.
///
/// Sets of at most two tasks are returned unchanged.
pub fn mst_order(distances: &DistanceCache, tasks: &[Task]) -> Vec<Task> {
    let n = tasks.len();
    if n <= 2 {
        return tasks.to_vec();
    }

    let mut graph = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i + 1..n {
            let d = distances.distance(&tasks[i].point, &tasks[j].point);
            graph[i][j] = d;
            graph[j][i] = d;
        }
    }

    let Some(start) = start_index(tasks) else {
        return Vec::new();
    };

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut frontier: BinaryHeap<FrontierEdge> = BinaryHeap::with_capacity(n * 2);
    let mut seq = 0u64;

    let mut attach = |from: usize,
                      visited: &mut [bool],
                      order: &mut Vec<Task>,
                      frontier: &mut BinaryHeap<FrontierEdge>| {
        visited[from] = true;
        order.push(tasks[from]);
        for to in 0..n {
            if !visited[to] {
                frontier.push(Reverse((OrderedFloat(graph[from][to]), seq, to)));
                seq += 1;
            }
        }
    };

    attach(start, &mut visited, &mut order, &mut frontier);

    while let Some(Reverse((_, _, to))) = frontier.pop() {
        if visited[to] {
            continue;
        }
        attach(to, &mut visited, &mut order, &mut frontier);
        if order.len() == n {
            break;
        }
    }

    order
}

/// Total weight of the spanning tree Prim builds over `tasks`.
pub fn mst_weight(distances: &DistanceCache, tasks: &[Task]) -> f64 {
    let n = tasks.len();
    if n < 2 {
        return 0.0;
    }
    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    best[0] = 0.0;
    let mut total = 0.0;

    for _ in 0..n {
        let mut u = usize::MAX;
        for v in 0..n {
            if !in_tree[v] && (u == usize::MAX || best[v] < best[u]) {
                u = v;
            }
        }
        in_tree[u] = true;
        total += best[u];
        for v in 0..n {
            if !in_tree[v] {
                let d = distances.distance(&tasks[u].point, &tasks[v].point);
                if d < best[v] {
                    best[v] = d;
                }
            }
        }
    }
    total
}
