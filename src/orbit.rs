// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Orbits: the sequence of states a map visits from a starting point.
//!
//! States are stored flat and step-major (`x0 y0 z0 x1 y1 z1 ...`), the
//! same layout a compute kernel hands back.

use crate::errors::{AttractorError, Result};
use crate::map::PolynomialMap;

/// How an orbit run ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OrbitStatus {
    /// Ran every requested step.
    Complete,
    /// Left the escape radius on the given (zero-based) step.
    Escaped(usize),
    /// A coordinate became NaN or infinite on the given step.
    Overflow(usize),
}

/// An append-only record of visited states.
#[derive(Clone, Debug)]
pub struct Orbit {
    dimension: usize,
    points: Vec<f64>,
    status: OrbitStatus,
}

impl Orbit {
    /// Wraps a flat, step-major buffer.
    pub fn from_flat(dimension: usize, points: Vec<f64>, status: OrbitStatus) -> Self {
        debug_assert_eq!(points.len() % dimension, 0);
        Orbit {
            dimension,
            points,
            status,
        }
    }

    /// Number of coordinates per state.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of recorded states.
    pub fn len(&self) -> usize {
        self.points.len() / self.dimension
    }

    /// Describes that nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// How the run ended.
    pub fn status(&self) -> OrbitStatus {
        self.status
    }

    /// True when the orbit left the escape radius.
    pub fn escaped(&self) -> bool {
        match self.status {
            OrbitStatus::Escaped(_) => true,
            _ => false,
        }
    }

    /// True when the orbit went non-finite.
    pub fn overflowed(&self) -> bool {
        match self.status {
            OrbitStatus::Overflow(_) => true,
            _ => false,
        }
    }

    /// The state recorded at step `i`.
    pub fn point(&self, i: usize) -> &[f64] {
        &self.points[i * self.dimension..(i + 1) * self.dimension]
    }

    /// The last recorded state, if any.
    pub fn last(&self) -> Option<&[f64]> {
        if self.is_empty() {
            None
        } else {
            Some(self.point(self.len() - 1))
        }
    }

    /// The raw step-major buffer.
    pub fn as_flat(&self) -> &[f64] {
        &self.points
    }

    /// Every value of one coordinate, in step order.
    pub fn axis(&self, axis: usize) -> Vec<f64> {
        assert!(axis < self.dimension);
        self.points
            .iter()
            .skip(axis)
            .step_by(self.dimension)
            .cloned()
            .collect()
    }

    /// Drops the first `steps` states, the transient before the orbit
    /// settles onto the attractor.
    pub fn discard_transient(mut self, steps: usize) -> Self {
        let steps = steps.min(self.len());
        self.points.drain(..steps * self.dimension);
        self
    }
}

/// Iterates `map` `steps` times from `start`, recording every state
/// after the start itself.
///
/// With a positive `escape_radius` the run stops as soon as the squared
/// norm of a state exceeds the squared radius; pass 0.0 to disable the
/// test, as renders do.  A run always stops on the first non-finite
/// state.  In both cases the offending state is the last one recorded.
pub fn run_orbit(
    map: &PolynomialMap,
    start: &[f64],
    steps: usize,
    escape_radius: f64,
) -> Result<Orbit> {
    let d = map.dimension();
    if start.len() != d {
        return Err(AttractorError::InvalidConfig(format!(
            "start state has {} coordinates, map has {}",
            start.len(),
            d
        )));
    }

    let limit = escape_radius * escape_radius;
    let mut points = vec![0.0; d * steps];
    let mut scratch = map.scratch();
    let mut state = start.to_vec();
    let mut status = OrbitStatus::Complete;
    let mut recorded = steps;

    for (t, next) in points.chunks_mut(d).enumerate() {
        map.step_into(&state, &mut scratch, next);
        state.copy_from_slice(next);

        if next.iter().any(|v| !v.is_finite()) {
            status = OrbitStatus::Overflow(t);
            recorded = t + 1;
            break;
        }
        if escape_radius > 0.0 && next.iter().fold(0.0, |acc, v| acc + v * v) > limit {
            status = OrbitStatus::Escaped(t);
            recorded = t + 1;
            break;
        }
    }

    points.truncate(recorded * d);
    Ok(Orbit::from_flat(d, points, status))
}
