// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The two hot loops of the pipeline, behind one interface.
//!
//! Everything else in a render is bookkeeping; nearly all of the time
//! goes into iterating the map ten million times and into adding ten
//! million weighted deposits into the image.  A `Kernel` does those
//! two things.  `ReferenceKernel` does them in the plainest way on one
//! thread.  `ThreadedKernel` iterates the same way (an orbit can't be
//! split) but partitions the deposits across threads, each accumulating
//! into a private plane, and sums the planes afterwards.  Addition
//! doesn't care about order, apart from the last bits of rounding.

use crate::errors::Result;
use crate::map::PolynomialMap;
use crate::orbit::{run_orbit, Orbit};

/// Per-point pixel cells and channel weights, ready to be summed into
/// an image.  All five vectors are the same length.
#[derive(Clone, Debug, Default)]
pub struct Deposits {
    /// Image row of each point.
    pub rows: Vec<usize>,
    /// Image column of each point.
    pub columns: Vec<usize>,
    /// Red, green and blue weight of each point.
    pub weights: [Vec<f64>; 3],
}

impl Deposits {
    /// Empty deposits with room for `n` points.
    pub fn with_capacity(n: usize) -> Self {
        Deposits {
            rows: Vec::with_capacity(n),
            columns: Vec::with_capacity(n),
            weights: [
                Vec::with_capacity(n),
                Vec::with_capacity(n),
                Vec::with_capacity(n),
            ],
        }
    }

    /// Records one point.
    #[inline]
    pub fn push(&mut self, row: usize, column: usize, rgb: [f64; 3]) {
        self.rows.push(row);
        self.columns.push(column);
        for (channel, w) in self.weights.iter_mut().zip(rgb.iter()) {
            channel.push(*w);
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Describes that there's nothing to deposit.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Adds the points in `range` into a row-major `height` x `width` x 3
    /// buffer.  Points whose cell lies outside the buffer are dropped.
    fn sum_into(
        &self,
        buffer: &mut [f64],
        width: usize,
        height: usize,
        range: std::ops::Range<usize>,
    ) {
        for i in range {
            if self.rows[i] >= height || self.columns[i] >= width {
                continue;
            }
            let pos = 3 * (self.rows[i] * width + self.columns[i]);
            buffer[pos] += self.weights[0][i];
            buffer[pos + 1] += self.weights[1][i];
            buffer[pos + 2] += self.weights[2][i];
        }
    }
}

/// The compute capability the pipeline runs on.
pub trait Kernel: Sync {
    /// Iterates `map` from `start` for `steps` steps, with the same
    /// semantics as `orbit::run_orbit`, and must produce the same bits.
    fn evaluate_orbit(
        &self,
        map: &PolynomialMap,
        start: &[f64],
        steps: usize,
        escape_radius: f64,
    ) -> Result<Orbit>;

    /// Sums the deposits into a fresh `height` x `width` x 3 buffer.
    /// Deposits outside the frame are dropped.
    fn accumulate_image(&self, width: usize, height: usize, deposits: &Deposits) -> Vec<f64>;
}

/// Single-threaded, in-process kernel.
#[derive(Copy, Clone, Debug, Default)]
pub struct ReferenceKernel;

impl Kernel for ReferenceKernel {
    fn evaluate_orbit(
        &self,
        map: &PolynomialMap,
        start: &[f64],
        steps: usize,
        escape_radius: f64,
    ) -> Result<Orbit> {
        run_orbit(map, start, steps, escape_radius)
    }

    fn accumulate_image(&self, width: usize, height: usize, deposits: &Deposits) -> Vec<f64> {
        let mut buffer = vec![0.0; width * height * 3];
        deposits.sum_into(&mut buffer, width, height, 0..deposits.len());
        buffer
    }
}

/// Kernel that splits accumulation over a fixed number of threads.
#[derive(Copy, Clone, Debug)]
pub struct ThreadedKernel {
    threads: usize,
}

impl ThreadedKernel {
    /// A kernel using `threads` workers (at least one).
    pub fn new(threads: usize) -> Self {
        ThreadedKernel {
            threads: threads.max(1),
        }
    }
}

/// Given a collection of planes of `plane` values each in a contiguous
/// block, merge them all into a single plane.
pub(crate) fn render_merge(regions: &[f64], plane: usize) -> Vec<f64> {
    let mut ret = vec![0.0; plane];
    for region in regions.chunks(plane) {
        for (r, v) in ret.iter_mut().zip(region.iter()) {
            *r += v;
        }
    }
    ret
}

impl Kernel for ThreadedKernel {
    fn evaluate_orbit(
        &self,
        map: &PolynomialMap,
        start: &[f64],
        steps: usize,
        escape_radius: f64,
    ) -> Result<Orbit> {
        run_orbit(map, start, steps, escape_radius)
    }

    fn accumulate_image(&self, width: usize, height: usize, deposits: &Deposits) -> Vec<f64> {
        let plane = width * height * 3;
        if self.threads == 1 || deposits.len() < self.threads || plane == 0 {
            return ReferenceKernel.accumulate_image(width, height, deposits);
        }

        let share = (deposits.len() + self.threads - 1) / self.threads;
        let mut allocation = vec![0.0; plane * self.threads];
        crossbeam::scope(|spawner| {
            for (n, region) in allocation.chunks_mut(plane).enumerate() {
                let start = (n * share).min(deposits.len());
                let end = (start + share).min(deposits.len());
                spawner.spawn(move |_| deposits.sum_into(region, width, height, start..end));
            }
        })
        .expect("accumulation thread panicked");
        render_merge(&allocation, plane)
    }
}

/// The kernel a thread count calls for.
pub fn kernel_for(threads: usize) -> Box<dyn Kernel> {
    if threads > 1 {
        Box::new(ThreadedKernel::new(threads))
    } else {
        Box::new(ReferenceKernel)
    }
}
