// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The cheap "is this worth rendering" test.
//!
//! Orbits that settle onto a fixed point, a line, or a short cycle
//! touch only a handful of cells of a coarse grid; orbits on a strange
//! attractor smear across a good fraction of it.  So: fit a window
//! around a short orbit's first two axes, histogram the points onto a
//! small grid, and accept when enough cells were hit.

use log::debug;

use crate::planes::PlaneMapper;

/// Default coarse grid width.
pub const DEFAULT_GRID_WIDTH: usize = 320;
/// Default coarse grid height.
pub const DEFAULT_GRID_HEIGHT: usize = 180;
/// Default fill threshold, in percent of cells.
pub const DEFAULT_THRESHOLD: f64 = 1.5;

/// The occupancy test and its knobs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DensityFilter {
    /// Grid columns.
    pub width: usize,
    /// Grid rows.
    pub height: usize,
    /// Percentage of cells that must be hit, exclusive.
    pub threshold: f64,
    /// Margin handed to the window fit.
    pub margin: f64,
}

impl Default for DensityFilter {
    fn default() -> Self {
        DensityFilter {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            threshold: DEFAULT_THRESHOLD,
            margin: crate::planes::DEFAULT_MARGIN,
        }
    }
}

impl DensityFilter {
    /// Percentage of grid cells the points land in.  Returns `None` when
    /// any point can't be placed on the grid (a NaN, typically), which
    /// callers treat as a rejection.
    pub fn fill(&self, xs: &[f64], ys: &[f64]) -> Option<f64> {
        let plane = PlaneMapper::fit(xs, ys, self.width, self.height, self.margin);
        let mut grid = vec![0u32; plane.len()];
        for (x, y) in xs.iter().zip(ys.iter()) {
            let offset = plane.point_to_offset(*x, *y)?;
            grid[offset] += 1;
        }
        let filled = grid.iter().filter(|c| **c > 0).count();
        Some(100.0 * filled as f64 / grid.len() as f64)
    }

    /// Whether the points fill strictly more than `threshold` percent of
    /// the grid.
    pub fn accepts(&self, xs: &[f64], ys: &[f64]) -> bool {
        match self.fill(xs, ys) {
            Some(fill) => {
                debug!("density: {:.2}% of cells filled", fill);
                fill > self.threshold
            }
            None => {
                debug!("density: orbit left the grid");
                false
            }
        }
    }
}
