// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turning a long orbit into pictures.
//!
//! Plotting plain point density gives a flat, noisy image: the orbit
//! races through some parts of the attractor and dawdles in others, and
//! the dawdling is where the structure is.  So every point deposits a
//! little color into the pixel it lands in, and each channel's deposit
//! is weighted by how *slowly* the orbit was moving along one axis at
//! that step (red for the horizontal axis, green for the vertical,
//! blue for depth), then scaled by a depth term so nearer sheets of the
//! attractor shade over farther ones:
//!
//! ```text
//! zalpha  = alpha_min + (1 - alpha_min) * (z - zmin) / zrange
//! deposit = (1 - dx / max_dx) * alpha * zalpha
//! ```
//!
//! After accumulation every channel is clipped to 1.0.

use std::time::Instant;

use log::{debug, info, warn};
use num::clamp;

use crate::config::Config;
use crate::errors::{AttractorError, Result};
use crate::kernel::{Deposits, Kernel};
use crate::map::PolynomialMap;
use crate::orbit::OrbitStatus;
use crate::planes::{AxisRange, PlaneMapper, Pixel};

/// Names given to the axes of an orbit, in order.
pub const AXIS_NAMES: [&str; 10] = ["x", "y", "z", "u", "v", "w", "q", "r", "s", "t"];

/// Three axes of an orbit picked out for one picture: two laid out
/// across the image and one used for depth.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    /// Axis across the image.
    pub x: usize,
    /// Axis down the image.
    pub y: usize,
    /// Depth axis.
    pub z: usize,
}

impl Projection {
    /// Name of the plane, e.g. "xz".
    pub fn label(&self) -> String {
        format!("{}{}", AXIS_NAMES[self.x], AXIS_NAMES[self.y])
    }
}

/// The pictures to take of an orbit of the given dimension.  Three
/// dimensional orbits get the three coordinate planes, each shaded by
/// the remaining axis.  Anything else gets one picture per axis, walking
/// a window of three consecutive axes around the dimensions.
pub fn projections(dimension: usize) -> Vec<Projection> {
    if dimension == 3 {
        return vec![
            Projection { x: 0, y: 1, z: 2 },
            Projection { x: 0, y: 2, z: 1 },
            Projection { x: 1, y: 2, z: 0 },
        ];
    }
    (0..dimension)
        .map(|i| Projection {
            x: i % dimension,
            y: (i + 1) % dimension,
            z: (i + 2) % dimension,
        })
        .collect()
}

/// A finished picture: `height` rows of `width` RGB pixels, each
/// channel in [0, 1].
#[derive(Clone, Debug)]
pub struct Image {
    /// The projection plane this is a picture of.
    pub label: String,
    /// Columns.
    pub width: usize,
    /// Rows.
    pub height: usize,
    /// Row-major RGB triples.
    pub channels: Vec<f64>,
}

impl Image {
    /// The RGB triple at a pixel.
    pub fn pixel(&self, pixel: &Pixel) -> &[f64] {
        let pos = 3 * (pixel.1 * self.width + pixel.0);
        &self.channels[pos..pos + 3]
    }

    /// Pixels with any color at all.
    pub fn lit_pixels(&self) -> usize {
        self.channels
            .chunks(3)
            .filter(|rgb| rgb.iter().any(|c| *c > 0.0))
            .count()
    }
}

/// Step-to-step movement along one axis: `|v[t] - v[t-1]|` for every
/// step after the first, and the largest of them.
pub fn motion(values: &[f64]) -> (Vec<f64>, f64) {
    let deltas: Vec<f64> = values.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    let max = deltas.iter().cloned().fold(0.0, f64::max);
    (deltas, max)
}

/// The slowness weight of one movement.  An axis that never moves is
/// treated as moving as slowly as possible.
#[inline]
fn slowness(delta: f64, max: f64) -> f64 {
    if max > 0.0 {
        1.0 - delta / max
    } else {
        1.0
    }
}

/// Clips every channel to at most 1.0 (and at least 0.0).
pub fn clip(channels: &mut [f64]) {
    for c in channels.iter_mut() {
        *c = clamp(*c, 0.0, 1.0);
    }
}

/// Output geometry and shading for one render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rasterizer {
    /// Image columns.
    pub width: usize,
    /// Image rows.
    pub height: usize,
    /// Per-point alpha.
    pub alpha: f64,
    /// Depth alpha of the farthest points.
    pub alpha_min: f64,
    /// Margin around the fitted window.
    pub margin: f64,
}

impl Rasterizer {
    /// The rasterizer a configuration describes.
    pub fn from_config(config: &Config) -> Self {
        Rasterizer {
            width: config.width,
            height: config.height,
            alpha: config.alpha,
            alpha_min: config.alpha_min,
            margin: config.margin,
        }
    }

    /// Works out where every point after the first lands and what it
    /// deposits there.  Points outside the frame are dropped.
    pub fn deposits(&self, xs: &[f64], ys: &[f64], zs: &[f64]) -> Result<Deposits> {
        let n = xs.len().min(ys.len()).min(zs.len());
        if n < 2 {
            return Err(AttractorError::EmptyOrbit(n));
        }
        let (xs, ys, zs) = (&xs[..n], &ys[..n], &zs[..n]);

        let plane = PlaneMapper::fit(xs, ys, self.width, self.height, self.margin);
        let depth = AxisRange::of(zs);
        debug!(
            "window x {:.3}+{:.3}, y {:.3}+{:.3}, depth {:.3}+{:.3}",
            plane.window.x.min,
            plane.window.x.range,
            plane.window.y.min,
            plane.window.y.range,
            depth.min,
            depth.range
        );

        let (dxs, mdx) = motion(xs);
        let (dys, mdy) = motion(ys);
        let (dzs, mdz) = motion(zs);

        let mut deposits = Deposits::with_capacity(n - 1);
        let mut dropped = 0;
        for t in 1..n {
            let Pixel(column, row) = match plane.point_to_pixel(xs[t], ys[t]) {
                Some(pixel) => pixel,
                None => {
                    dropped += 1;
                    continue;
                }
            };
            let zalpha = self.alpha_min + (1.0 - self.alpha_min) * depth.normalize(zs[t]);
            let scale = self.alpha * zalpha;
            deposits.push(
                row,
                column,
                [
                    slowness(dxs[t - 1], mdx) * scale,
                    slowness(dys[t - 1], mdy) * scale,
                    slowness(dzs[t - 1], mdz) * scale,
                ],
            );
        }
        if dropped > 0 {
            debug!("{} points fell outside the frame", dropped);
        }
        Ok(deposits)
    }

    /// Renders one projection of a set of axes.
    pub fn rasterize(
        &self,
        kernel: &dyn Kernel,
        label: &str,
        xs: &[f64],
        ys: &[f64],
        zs: &[f64],
    ) -> Result<Image> {
        let deposits = self.deposits(xs, ys, zs)?;
        let mut channels = kernel.accumulate_image(self.width, self.height, &deposits);
        clip(&mut channels);
        Ok(Image {
            label: label.to_string(),
            width: self.width,
            height: self.height,
            channels,
        })
    }
}

/// Runs the render-length orbit of `map`, drops the transient, and
/// pictures every projection plane.  Fails with `Overflow` when the
/// orbit goes non-finite anywhere along the way.
pub fn render_attractor(
    config: &Config,
    kernel: &dyn Kernel,
    map: &PolynomialMap,
) -> Result<Vec<Image>> {
    let started = Instant::now();
    let orbit = kernel.evaluate_orbit(map, &config.start, config.render_iterations, 0.0)?;
    if let OrbitStatus::Overflow(step) = orbit.status() {
        warn!("orbit overflowed after {} of {} steps", step, config.render_iterations);
        return Err(AttractorError::Overflow(step));
    }
    let elapsed = started.elapsed().as_secs_f64();
    info!(
        "Finished iteration: {:.1} sec | {:.0} iterations per second",
        elapsed,
        config.render_iterations as f64 / elapsed.max(1e-9)
    );

    let orbit = orbit.discard_transient(config.transient_steps());
    let rasterizer = Rasterizer::from_config(config);
    projections(map.dimension())
        .iter()
        .map(|p| -> Result<Image> {
            let started = Instant::now();
            let image = rasterizer.rasterize(
                kernel,
                &p.label(),
                &orbit.axis(p.x),
                &orbit.axis(p.y),
                &orbit.axis(p.z),
            )?;
            debug!(
                "rendered plane {} in {:.2} sec",
                image.label,
                started.elapsed().as_secs_f64()
            );
            Ok(image)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::ReferenceKernel;

    fn small() -> Rasterizer {
        Rasterizer {
            width: 16,
            height: 9,
            alpha: 0.5,
            alpha_min: 0.25,
            margin: 1.1,
        }
    }

    #[test]
    fn three_dimensions_get_coordinate_planes() {
        let labels: Vec<String> = projections(3).iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["xy", "xz", "yz"]);
        assert_eq!(projections(3)[1].z, 1);
    }

    #[test]
    fn other_dimensions_rotate_a_window() {
        let p = projections(5);
        assert_eq!(p.len(), 5);
        assert_eq!(p[3], Projection { x: 3, y: 4, z: 0 });
        assert_eq!(p[4].label(), "vx");
        assert_eq!(projections(2)[1], Projection { x: 1, y: 0, z: 1 });
    }

    #[test]
    fn motion_measures_consecutive_steps() {
        let (d, max) = motion(&[0.0, 1.0, -1.0, -0.5]);
        assert_eq!(d, vec![1.0, 2.0, 0.5]);
        assert_eq!(max, 2.0);
    }

    #[test]
    fn clip_bounds_channels() {
        let mut c = vec![-0.5, 0.5, 1.5, 12.0];
        clip(&mut c);
        assert_eq!(c, vec![0.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn deposits_skip_first_point_and_weight_by_slowness() {
        let xs = [0.0, 1.0, 3.0];
        let ys = [0.0, 1.0, 3.0];
        let zs = [0.0, 0.0, 1.0];
        let d = small().deposits(&xs, &ys, &zs).unwrap();
        assert_eq!(d.len(), 2);
        // Step one moved half as far as step two, at the shallowest depth.
        assert!((d.weights[0][0] - 0.5 * 0.5 * 0.25).abs() < 1e-12);
        // Step two is the fastest step, so it deposits nothing.
        assert_eq!(d.weights[0][1], 0.0);
    }

    #[test]
    fn constant_axes_deposit_fully() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [5.0, 5.0, 5.0];
        let zs = [1.0, 1.0, 1.0];
        let d = small().deposits(&xs, &ys, &zs).unwrap();
        assert_eq!(d.len(), 2);
        assert!(d.weights[1].iter().all(|w| (*w - 0.5 * 0.25).abs() < 1e-12));
        assert!(d.weights[2].iter().all(|w| (*w - 0.5 * 0.25).abs() < 1e-12));
    }

    #[test]
    fn too_short_orbits_are_refused() {
        assert!(small().deposits(&[1.0], &[1.0], &[1.0]).is_err());
    }

    #[test]
    fn channels_are_clipped_after_accumulation() {
        let n = 5000;
        let xs: Vec<f64> = (0..n).map(|i| (i as f64 * 0.7).sin()).collect();
        let ys: Vec<f64> = (0..n).map(|i| (i as f64 * 1.3).cos()).collect();
        let zs: Vec<f64> = (0..n).map(|i| (i as f64 * 0.1).sin()).collect();
        let image = small()
            .rasterize(&ReferenceKernel, "xy", &xs, &ys, &zs)
            .unwrap();
        assert_eq!(image.channels.len(), 16 * 9 * 3);
        assert!(image.channels.iter().all(|c| *c >= 0.0 && *c <= 1.0));
        assert!(image.channels.iter().any(|c| *c == 1.0));
        assert!(image.lit_pixels() > 0);
    }
}
