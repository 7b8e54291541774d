//! Delivery selection library
//!
//! Chooses a subset of delivery tasks whose total weight fits a capacity and
//! orders it so that collected value minus round-trip travel cost is as high
//! as possible.
//!
//! # Features
//!
//! - Path model with memoized length, weight and profit and a total ranking
//! - Spanning-tree (Prim) router for approximate visiting orders
//! - Exact brute-force solver over subsets and permutations
//! - Subset enumeration + spanning-tree heuristic
//! - Streaming value-density heuristics, with and without outlier pruning
//! - Benchmarking and SVG visualization tools
//!
//! # Example
//!
//! ```no_run
//! use delivery_mkp::instance::{DeliveryInstance, GeneratorConfig};
//! use delivery_mkp::heuristics::StreamingRatioSpreadHeuristic;
//! use delivery_mkp::solver::DeliverySolver;
//!
//! let config = GeneratorConfig { count: 200, ..Default::default() };
//! let instance = DeliveryInstance::generate(&config, 2000.0);
//!
//! let path = StreamingRatioSpreadHeuristic::new().solve(&instance);
//! println!("profit: {:.2}, capacity used: {:.1}%",
//!     path.profit(), path.weight() / instance.capacity * 100.0);
//! ```

pub mod benchmark;
pub mod error;
pub mod exact;
pub mod geometry;
pub mod heuristics;
pub mod instance;
pub mod path;
pub mod routing;
pub mod solver;
pub mod visualization;

pub use error::{Error, Result};
pub use instance::{DeliveryInstance, Task};
pub use path::DeliveryPath;
pub use solver::DeliverySolver;
