//! # Partition Module
//!
//! This module builds the unit-interval partition that drives weighted
//! selection. Each live endpoint receives a half-open share of [0, 1)
//! proportional to its configured weight; a uniform draw then lands in
//! exactly one share.
//!
//! ## Algorithm
//!
//! 1. Sum the weights of the live endpoints that have one
//! 2. Walk the live set in registry order, assigning each endpoint
//!    `[lower, lower + weight/sum)` and advancing the lower bound
//! 3. Check the final upper bound landed on 1.0 within tolerance
//!
//! An endpoint without a configured weight gets a zero-width share: it stays
//! in the partition (so ordering is undisturbed) but no draw can land in it.

use crate::core::error::{PickerError, PickerResult};
use crate::core::types::{Endpoint, WeightTable};

/// Allowed floating-point drift on the final upper bound
const UPPER_BOUND_TOLERANCE: f64 = 1e-9;

/// Half-open share `[lower, upper)` of the unit interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    /// Whether a draw lands in this interval
    ///
    /// Half-open: a value exactly on a boundary belongs to the interval it
    /// lower-bounds, never the one it upper-bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value < self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Ordered partition of [0, 1) across a live endpoint set
#[derive(Debug, Clone)]
pub struct Partition {
    entries: Vec<(Endpoint, Interval)>,
}

impl Partition {
    /// Build the partition for a live set against a weight table
    ///
    /// Fails with a configuration error when a live endpoint carries an
    /// unusable weight or when none of the live endpoints carries any weight
    /// at all, and with a selection error when the live set is empty or the
    /// accumulated bounds drift off 1.0.
    pub fn build(live: &[Endpoint], weights: &WeightTable) -> PickerResult<Self> {
        if live.is_empty() {
            return Err(PickerError::selection("cannot partition an empty live set"));
        }

        let mut weight_sum = 0.0;
        for endpoint in live {
            if let Some(weight) = weights.weight_of(endpoint) {
                if !weight.is_finite() || weight <= 0.0 {
                    return Err(PickerError::config(format!(
                        "weight for '{}' must be a positive finite number, got: {}",
                        endpoint, weight
                    )));
                }
                weight_sum += weight;
            }
        }

        if weight_sum <= 0.0 {
            return Err(PickerError::config(
                "no live endpoint carries a weight; nothing is selectable",
            ));
        }

        let mut entries = Vec::with_capacity(live.len());
        let mut lower = 0.0;
        for endpoint in live {
            let width = weights.weight_of(endpoint).unwrap_or(0.0) / weight_sum;
            let upper = lower + width;
            entries.push((endpoint.clone(), Interval { lower, upper }));
            lower = upper;
        }

        if (lower - 1.0).abs() > UPPER_BOUND_TOLERANCE {
            return Err(PickerError::selection(format!(
                "partition upper bound ended at {} instead of 1.0",
                lower
            )));
        }

        Ok(Self { entries })
    }

    /// Find the endpoint whose interval contains the draw
    ///
    /// Linear scan over the ordered entries. Cluster live sets are tens of
    /// members, so nothing fancier is warranted.
    pub fn locate(&self, value: f64) -> Option<&Endpoint> {
        self.entries
            .iter()
            .find(|(_, interval)| interval.contains(value))
            .map(|(endpoint, _)| endpoint)
    }

    /// Iterate over `(endpoint, interval)` pairs in partition order
    pub fn intervals(&self) -> impl Iterator<Item = (&Endpoint, &Interval)> {
        self.entries
            .iter()
            .map(|(endpoint, interval)| (endpoint, interval))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
