// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The polynomial map itself.
//!
//! A map of dimension D and order k carries D blocks of coefficients,
//! one per output coordinate, each block holding one weight for every
//! term of the basis (see `terms`).  Advancing a state means computing
//! its basis once and taking the dot product of that basis with each
//! block in turn.  Summation runs left to right over the terms, always,
//! so two evaluations of the same state produce the same bits no matter
//! which kernel asked for them.

use crate::errors::{AttractorError, Result};
use crate::terms::{basis_size, fill_terms, Order};

/// Smallest and largest dimensions the pipeline knows how to label.
pub const MIN_DIMENSION: usize = 2;
/// See `MIN_DIMENSION`.
pub const MAX_DIMENSION: usize = 10;

/// A polynomial map with a validated coefficient vector.  Once built it
/// is immutable and can be shared between threads.
#[derive(Clone, Debug, PartialEq)]
pub struct PolynomialMap {
    dimension: usize,
    order: Order,
    coefficients: Vec<f64>,
}

impl PolynomialMap {
    /// Builds a map, failing if the coefficient vector is not exactly
    /// `dimension * basis_size(dimension, order)` long.
    pub fn new(dimension: usize, order: Order, coefficients: Vec<f64>) -> Result<Self> {
        if dimension < MIN_DIMENSION || dimension > MAX_DIMENSION {
            return Err(AttractorError::InvalidDimension(dimension));
        }
        let terms = basis_size(dimension, order);
        let expected = dimension * terms;
        if coefficients.len() != expected {
            return Err(AttractorError::CoefficientCount {
                expected,
                dimension,
                terms,
                found: coefficients.len(),
            });
        }
        Ok(PolynomialMap {
            dimension,
            order,
            coefficients,
        })
    }

    /// Number of coordinates in a state.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The polynomial order.
    pub fn order(&self) -> Order {
        self.order
    }

    /// Number of basis terms per output coordinate.
    pub fn terms(&self) -> usize {
        basis_size(self.dimension, self.order)
    }

    /// The flat coefficient vector, block by block.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// A scratch buffer sized for this map's basis.  Callers that step
    /// the map in a loop allocate one of these once and reuse it.
    pub fn scratch(&self) -> Vec<f64> {
        vec![0.0; self.terms()]
    }

    /// Computes the image of `state` into `next`, using `scratch` to hold
    /// the basis.  All three slices must be sized for this map; a
    /// mis-sized slice panics.
    #[inline]
    pub fn step_into(&self, state: &[f64], scratch: &mut [f64], next: &mut [f64]) {
        assert_eq!(state.len(), self.dimension, "state has the wrong dimension");
        assert_eq!(next.len(), self.dimension, "next state has the wrong dimension");
        assert_eq!(scratch.len(), self.terms(), "scratch has the wrong length");
        fill_terms(state, self.order, scratch);
        for (block, out) in self
            .coefficients
            .chunks(scratch.len())
            .zip(next.iter_mut())
        {
            let mut acc = 0.0;
            for (c, t) in block.iter().zip(scratch.iter()) {
                acc += c * t;
            }
            *out = acc;
        }
    }

    /// Allocating, one-off version of `step_into`.  Fails if `state`
    /// doesn't have one coordinate per dimension.
    pub fn step(&self, state: &[f64]) -> Result<Vec<f64>> {
        if state.len() != self.dimension {
            return Err(AttractorError::InvalidConfig(format!(
                "state has {} coordinates, map has {}",
                state.len(),
                self.dimension
            )));
        }
        let mut scratch = self.scratch();
        let mut next = vec![0.0; self.dimension];
        self.step_into(state, &mut scratch, &mut next);
        Ok(next)
    }
}
