//! Statistical utilities for monitoring evolution runs.
//!
//! This crate provides:
//!
//! - **Descriptive statistics**: min, max, mean, median, variance and standard deviation
//!   of a set of fitness values
//! - **Fitness history**: trackers that follow the best fitness across generations and
//!   report its running mean
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`history`]: Best-fitness trackers over all or the last `n` generations
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use neurocar_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Tracking the best fitness
//!
//! ```
//! use neurocar_stats::history::{FitnessHistory, WindowedBest};
//!
//! let mut history = WindowedBest::new(2);
//! history.record(0, 1.0);
//! history.record(1, 3.0);
//! let record = history.record(2, 5.0);
//! assert_eq!(record.mean, 4.0);
//! ```

pub mod descriptive;
pub mod history;
