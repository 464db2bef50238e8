//! # Weighted Selection Module
//!
//! This module turns a live endpoint list and a weight table into one
//! probabilistic choice. The selector is stateless across calls: every
//! selection rebuilds the partition from the current live set, draws one
//! uniform sample, and maps it to an endpoint. Selection probability is the
//! endpoint's weight divided by the summed weights of the live set.
//!
//! Randomness comes through the [`RandomSource`] trait so tests can pin the
//! draw; production code uses [`ThreadRngSource`] over `rand::thread_rng`.

use metrics::counter;
use rand::Rng;
use tracing::{debug, warn};

use crate::core::error::{PickerError, PickerResult};
use crate::core::types::{Endpoint, WeightTable};
use crate::selection::partition::Partition;

/// Source of uniform draws from [0, 1)
pub trait RandomSource: Send + Sync {
    /// Produce one uniform sample in [0, 1)
    fn sample(&self) -> f64;
}

/// Default random source backed by the thread-local RNG
///
/// Each call draws independently; no state is carried between selections.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Weighted random selector over a live endpoint list
///
/// The weight table is fixed at construction and never mutated afterwards.
/// The live set arrives fresh with every call, so a node that dropped out of
/// the registry simply stops appearing in the partition.
pub struct WeightedSelector {
    weights: WeightTable,
}

impl WeightedSelector {
    /// Create a selector over an immutable weight table
    pub fn new(weights: WeightTable) -> Self {
        Self { weights }
    }

    /// Select one endpoint from the live set, biased by weight
    pub fn select(
        &self,
        live: &[Endpoint],
        random: &dyn RandomSource,
    ) -> PickerResult<Endpoint> {
        if live.is_empty() {
            counter!("picker_selection_failures").increment(1);
            return Err(PickerError::selection(
                "cannot select from an empty live set",
            ));
        }

        let partition = Partition::build(live, &self.weights)?;
        let draw = random.sample();

        match partition.locate(draw) {
            Some(endpoint) => {
                counter!("picker_selections").increment(1);

                debug!(
                    endpoint = %endpoint,
                    draw = draw,
                    live_nodes = live.len(),
                    "Selected endpoint by weight"
                );

                Ok(endpoint.clone())
            }
            None => {
                counter!("picker_selection_failures").increment(1);
                warn!(
                    draw = draw,
                    live_nodes = live.len(),
                    "No partition interval matched the draw"
                );
                Err(PickerError::selection(format!(
                    "no interval matched draw {}",
                    draw
                )))
            }
        }
    }
}
