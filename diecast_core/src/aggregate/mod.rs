//! Aggregation across every registered source adapter.
//!
//! This module provides:
//! - `Aggregator`: fans one query out to all adapters concurrently and merges
//!   their listings in completion order
//! - `AggregateOutcome`: the merged listings plus per-source timing
//!
//! # Example
//!
//! ```ignore
//! use diecast_core::{build_registry, render, Aggregator, AggregatorSettings, DiecastConfig};
//!
//! let config = DiecastConfig::load(None)?;
//! let renderer = render::build_renderer(&config.render)?;
//! let registry = build_registry(&config, renderer)?;
//! let aggregator = Aggregator::new(registry, AggregatorSettings::from(&config.aggregator));
//! let listings = aggregator.search("porsche 911").await?;
//! ```

mod engine;
mod types;

pub use engine::{Aggregator, AggregatorSettings};
pub use types::{AggregateOutcome, SourceReport};
