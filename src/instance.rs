//! Delivery tasks and problem instances.
//!
//! A task binds a profit-bearing item (value, weight) to a location. An
//! instance is the immutable task universe plus the capacity limit and the
//! distance cache every algorithm run shares.

use crate::error::{Error, Result};
use crate::geometry::{DistanceCache, Point};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::ops::RangeInclusive;
use std::path::Path;

/// Revenue and capacity consumption of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub value: f64,
    pub weight: f64,
}

/// An item bound to a location: the unit of selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Position of the task in its instance
    pub id: usize,
    pub item: Item,
    pub point: Point,
}

impl Task {
    /// Build a task, rejecting weights that would break density ordering
    /// and capacity eviction.
    pub fn new(id: usize, value: f64, weight: f64, point: Point) -> Result<Self> {
        let task = Task {
            id,
            item: Item { value, weight },
            point,
        };
        task.validate()?;
        Ok(task)
    }

    pub fn validate(&self) -> Result<()> {
        if self.item.weight <= 0.0 || !self.item.weight.is_finite() {
            return Err(Error::InvalidWeight {
                task: self.id,
                weight: self.item.weight,
            });
        }
        if !self.item.value.is_finite() {
            return Err(Error::invalid_input(format!(
                "task {} has non-finite value {}",
                self.id, self.item.value
            )));
        }
        if !self.point.x.is_finite() || !self.point.y.is_finite() {
            return Err(Error::invalid_input(format!(
                "task {} has non-finite coordinates ({}, {})",
                self.id, self.point.x, self.point.y
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.item.value
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.item.weight
    }

    /// Value per unit of weight.
    #[inline]
    pub fn density(&self) -> f64 {
        self.item.value / self.item.weight
    }
}

/// Parameters of the random task generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub count: usize,
    pub seed: u64,
    pub value_range: RangeInclusive<u32>,
    pub weight_range: RangeInclusive<u32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            count: 20,
            seed: 42,
            value_range: 5..=200,
            weight_range: 1..=50,
        }
    }
}

/// A task universe with its capacity limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryInstance {
    pub name: String,
    /// Maximum total weight of a selection
    pub capacity: f64,
    pub tasks: Vec<Task>,
    /// Memoized pairwise distances, shared by every run on this instance
    #[serde(skip)]
    pub distances: DistanceCache,
}

impl DeliveryInstance {
    pub fn new(name: impl Into<String>, tasks: Vec<Task>, capacity: f64) -> Result<Self> {
        let instance = DeliveryInstance {
            name: name.into(),
            capacity,
            tasks,
            distances: DistanceCache::new(),
        };
        instance.validate()?;
        Ok(instance)
    }

    /// Check every task and the capacity. A non-positive capacity is legal
    /// (nothing fits); a NaN capacity is not.
    pub fn validate(&self) -> Result<()> {
        if self.capacity.is_nan() {
            return Err(Error::invalid_input("capacity is NaN"));
        }
        for task in &self.tasks {
            task.validate()?;
        }
        Ok(())
    }

    /// Generate `config.count` random tasks. Coordinates are uniform over
    /// `[0, log10(count))` on both axes so density grows slowly with size.
    pub fn generate(config: &GeneratorConfig, capacity: f64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let extent = if config.count > 1 {
            (config.count as f64).log10()
        } else {
            0.0
        };

        let tasks = (0..config.count)
            .map(|id| {
                let value = rng.gen_range(config.value_range.clone()) as f64;
                let weight = rng.gen_range(config.weight_range.clone()).max(1) as f64;
                let point = Point::new(rng.gen::<f64>() * extent, rng.gen::<f64>() * extent);
                Task {
                    id,
                    item: Item { value, weight },
                    point,
                }
            })
            .collect();

        DeliveryInstance {
            name: format!("random-n{}-s{}", config.count, config.seed),
            capacity,
            tasks,
            distances: DistanceCache::new(),
        }
    }

    /// Load an instance from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let instance: DeliveryInstance = serde_json::from_reader(reader)?;
        instance.validate()?;
        Ok(instance)
    }

    /// Write the instance as pretty JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Distance between the locations of tasks `i` and `j`.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances
            .distance(&self.tasks[i].point, &self.tasks[j].point)
    }

    pub fn total_weight(&self) -> f64 {
        self.tasks.iter().map(Task::weight).sum()
    }

    pub fn total_value(&self) -> f64 {
        self.tasks.iter().map(Task::value).sum()
    }

    pub fn statistics(&self) -> InstanceStatistics {
        let n = self.tasks.len();
        let mut distances: Vec<f64> = Vec::new();
        for i in 0..n {
            for j in i + 1..n {
                distances.push(self.distance(i, j));
            }
        }
        let avg_distance = if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        };
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);
        let avg_density = if n == 0 {
            0.0
        } else {
            self.tasks.iter().map(Task::density).sum::<f64>() / n as f64
        };
        let total_weight = self.total_weight();

        InstanceStatistics {
            name: self.name.clone(),
            num_tasks: n,
            capacity: self.capacity,
            total_value: self.total_value(),
            total_weight,
            avg_density,
            avg_distance,
            max_distance,
            capacity_ratio: if total_weight > 0.0 {
                self.capacity / total_weight
            } else {
                0.0
            },
        }
    }
}

/// Summary figures about an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub num_tasks: usize,
    pub capacity: f64,
    pub total_value: f64,
    pub total_weight: f64,
    pub avg_density: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
    /// Capacity divided by the weight of all tasks
    pub capacity_ratio: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Tasks: {}", self.num_tasks)?;
        writeln!(f, "  Capacity: {:.2}", self.capacity)?;
        writeln!(f, "  Total value: {:.2}", self.total_value)?;
        writeln!(f, "  Total weight: {:.2}", self.total_weight)?;
        writeln!(f, "  Capacity / total weight: {:.1}%", self.capacity_ratio * 100.0)?;
        writeln!(f, "  Avg density: {:.3}", self.avg_density)?;
        writeln!(f, "  Avg distance: {:.3}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.3}", self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_rejects_non_positive_weight() {
        let p = Point::new(0.0, 0.0);
        assert!(matches!(
            Task::new(0, 10.0, 0.0, p),
            Err(Error::InvalidWeight { task: 0, .. })
        ));
        assert!(matches!(
            Task::new(3, 10.0, -2.0, p),
            Err(Error::InvalidWeight { task: 3, .. })
        ));
        assert!(Task::new(1, 10.0, f64::NAN, p).is_err());
        assert!(Task::new(2, 10.0, 4.0, Point::new(f64::INFINITY, 0.0)).is_err());
    }

    #[test]
    fn test_density() {
        let task = Task::new(0, 120.0, 40.0, Point::new(1.0, 1.0)).unwrap();
        assert!((task.density() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_instance_validates_tasks() {
        let bad = Task {
            id: 0,
            item: Item { value: 1.0, weight: 0.0 },
            point: Point::new(0.0, 0.0),
        };
        assert!(DeliveryInstance::new("bad", vec![bad], 10.0).is_err());
        assert!(DeliveryInstance::new("empty", Vec::new(), -5.0).is_ok());
    }

    #[test]
    fn test_generate_is_reproducible() {
        let config = GeneratorConfig {
            count: 30,
            seed: 7,
            ..Default::default()
        };
        let a = DeliveryInstance::generate(&config, 250.0);
        let b = DeliveryInstance::generate(&config, 250.0);

        assert_eq!(a.tasks, b.tasks);
        assert_eq!(a.len(), 30);
        let extent = 30f64.log10();
        for (i, task) in a.tasks.iter().enumerate() {
            assert_eq!(task.id, i);
            assert!(task.validate().is_ok());
            assert!((5.0..=200.0).contains(&task.value()));
            assert!((1.0..=50.0).contains(&task.weight()));
            assert!(task.point.x >= 0.0 && task.point.x < extent);
            assert!(task.point.y >= 0.0 && task.point.y < extent);
        }
    }

    #[test]
    fn test_generate_single_task() {
        let config = GeneratorConfig {
            count: 1,
            ..Default::default()
        };
        let instance = DeliveryInstance::generate(&config, 10.0);
        assert_eq!(instance.len(), 1);
        assert_eq!(instance.tasks[0].point, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_json_round_trip_revalidates() {
        let json = r#"{"name":"x","capacity":10.0,"tasks":[
            {"id":0,"item":{"value":5.0,"weight":-1.0},"point":{"x":0.0,"y":0.0}}]}"#;
        let instance: DeliveryInstance = serde_json::from_str(json).unwrap();
        assert!(instance.validate().is_err());
    }

    #[test]
    fn test_statistics() {
        let tasks = vec![
            Task::new(0, 100.0, 50.0, Point::new(0.0, 0.0)).unwrap(),
            Task::new(1, 80.0, 40.0, Point::new(3.0, 4.0)).unwrap(),
        ];
        let instance = DeliveryInstance::new("stats", tasks, 45.0).unwrap();
        let stats = instance.statistics();

        assert_eq!(stats.num_tasks, 2);
        assert!((stats.total_value - 180.0).abs() < 1e-12);
        assert!((stats.avg_distance - 5.0).abs() < 1e-12);
        assert!((stats.max_distance - 5.0).abs() < 1e-12);
        assert!((stats.avg_density - 2.0).abs() < 1e-12);
        assert!((stats.capacity_ratio - 0.5).abs() < 1e-12);
    }
}
