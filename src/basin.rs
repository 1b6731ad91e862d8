// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time basins.
//!
//! The attractor search throws away maps whose orbits run off to
//! infinity.  The ones that take their time about it are interesting in
//! their own right: start an orbit at every pixel of the plane instead
//! of at the origin, count how long each takes to leave a radius, and
//! the picture of those counts shows the basin the map's bounded orbits
//! live in, with all its fractal edges.
//!
//! Each pixel gets three channels: the number of steps taken (red) and
//! the magnitude of the first two coordinates where it stopped (green,
//! blue).  Each channel is then scaled by its own maximum.

use std::ops::Range;
use std::sync::{Arc, Mutex};

use itertools::iproduct;
use log::{debug, info};
use rand::Rng;

use crate::config::Config;
use crate::errors::{AttractorError, Result};
use crate::kernel::{render_merge, Kernel};
use crate::map::PolynomialMap;
use crate::orbit::OrbitStatus;
use crate::planes::{Pixel, PlaneMapper, Window};
use crate::render::Image;
use crate::search::sample_map;
use crate::seed::seed_of;

type PixelType = Arc<Mutex<itertools::Product<Range<usize>, Range<usize>>>>;

/// Which escaping maps are worth a basin picture: those whose orbit
/// from the start state escapes, but not too soon.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EscapeWindow {
    /// Orbits escaping before this step are rejected.
    pub low: usize,
    /// Orbits still bounded at this step are rejected.
    pub high: usize,
    /// The escape radius.
    pub radius: f64,
}

impl Default for EscapeWindow {
    fn default() -> Self {
        EscapeWindow {
            low: 100,
            high: 1000,
            radius: 1000.0,
        }
    }
}

/// A map whose orbit escaped inside the window, and when.
#[derive(Clone, Debug)]
pub struct Escaping {
    /// The map.
    pub map: PolynomialMap,
    /// Its seed.
    pub seed: String,
    /// Step on which the orbit left the radius.
    pub escape_step: usize,
}

/// Samples maps of the configured shape until `config.attractor_count`
/// escape inside `window` (or `config.max_attempts` run out).
pub fn find_escaping<R: Rng>(
    config: &Config,
    kernel: &dyn Kernel,
    rng: &mut R,
    window: EscapeWindow,
) -> Result<Vec<Escaping>> {
    config.validate()?;
    if window.low >= window.high || !(window.radius > 0.0) {
        return Err(AttractorError::InvalidConfig(format!(
            "escape window {}..{} with radius {} is empty",
            window.low, window.high, window.radius
        )));
    }

    let mut found = vec![];
    let mut attempts = 0;
    while found.len() < config.attractor_count
        && config.max_attempts.map_or(true, |cap| attempts < cap)
    {
        attempts += 1;
        let map = sample_map(config, rng)?;
        let orbit = kernel.evaluate_orbit(&map, &config.start, window.high, window.radius)?;
        if let OrbitStatus::Escaped(step) = orbit.status() {
            if step >= window.low {
                let seed = seed_of(&map);
                info!("Saved coefficients {} (escaped on step {})", seed, step);
                found.push(Escaping {
                    map,
                    seed,
                    escape_step: step,
                });
            }
        }
    }
    debug!("{} attempts for {} escaping maps", attempts, found.len());
    Ok(found)
}

/// Takes a map and renders how long orbits started across a window of
/// its first two axes take to escape.
pub struct BasinRenderer {
    plane: PlaneMapper,
    max_iterations: usize,
    radius: f64,
}

impl BasinRenderer {
    /// Requires the width and height of the image, the horizontal
    /// extent of the window (the vertical extent follows from the
    /// aspect ratio, centered on zero), the most steps to follow each
    /// orbit, and the escape radius.
    pub fn new(
        width: usize,
        height: usize,
        xmin: f64,
        xmax: f64,
        max_iterations: usize,
        radius: f64,
    ) -> Result<Self> {
        if width < 2 || height < 2 {
            return Err(AttractorError::InvalidConfig(format!(
                "basin of {}x{} is too small",
                width, height
            )));
        }
        if !(xmax > xmin) {
            return Err(AttractorError::InvalidConfig(
                "The left edge is not to the left of the right edge.".to_string(),
            ));
        }
        let yrng = height as f64 / width as f64 * (xmax - xmin);
        Ok(BasinRenderer {
            plane: PlaneMapper::new(
                width,
                height,
                Window::from_corners(xmin, -yrng / 2.0, xmax, yrng / 2.0),
            ),
            max_iterations,
            radius,
        })
    }

    /// Follows one orbit from the point under `pixel` and returns its
    /// unscaled channels.
    fn escape(&self, map: &PolynomialMap, pixel: &Pixel, scratch: &mut [f64]) -> [f64; 3] {
        let (x, y) = self.plane.pixel_to_point(pixel);
        let mut state = vec![0.0; map.dimension()];
        state[0] = x;
        state[1] = y;
        let mut next = state.clone();
        let limit = self.radius * self.radius;

        let mut i = 0;
        while state.iter().map(|v| v * v).sum::<f64>() < limit && i < self.max_iterations {
            map.step_into(&state, scratch, &mut next);
            state.copy_from_slice(&next);
            i += 1;
        }
        let finite = |v: f64| if v.is_finite() { v.abs() } else { 0.0 };
        [i as f64, finite(state[0]), finite(state[1])]
    }

    fn plot(&self, map: &PolynomialMap, pixel: Pixel, buffer: &mut [f64], scratch: &mut [f64]) {
        let rgb = self.escape(map, &pixel, scratch);
        let pos = 3 * (pixel.1 * self.plane.integral_plane.0 + pixel.0);
        buffer[pos..pos + 3].copy_from_slice(&rgb);
    }

    /// Scales each channel by its own maximum.
    fn normalize(&self, mut channels: Vec<f64>) -> Image {
        for k in 0..3 {
            let max = channels
                .iter()
                .skip(k)
                .step_by(3)
                .cloned()
                .fold(0.0, f64::max);
            if max > 0.0 {
                for c in channels.iter_mut().skip(k).step_by(3) {
                    *c /= max;
                }
            }
        }
        Image {
            label: "basin".to_string(),
            width: self.plane.integral_plane.0,
            height: self.plane.integral_plane.1,
            channels,
        }
    }

    /// The main function for single-threaded rendering.
    pub fn basin_single(&self, map: &PolynomialMap) -> Image {
        let mut buffer = vec![0.0; self.plane.len() * 3];
        let mut scratch = map.scratch();
        for (column, row) in iproduct!(0..self.plane.integral_plane.0, 0..self.plane.integral_plane.1)
        {
            self.plot(map, Pixel(column, row), &mut buffer, &mut scratch);
        }
        self.normalize(buffer)
    }

    /// A multi-threaded version of the render function that takes a
    /// thread count.  Threads pull pixels off a shared queue, each
    /// writing into its own plane.
    pub fn basin(&self, map: &PolynomialMap, threads: usize) -> Image {
        if threads <= 1 {
            return self.basin_single(map);
        }
        let plane = self.plane.len() * 3;
        let mut allocation = vec![0.0; plane * threads];
        crossbeam::scope(|spawner| {
            let regions: Vec<&mut [f64]> = allocation.chunks_mut(plane).collect();
            let pixels: PixelType = Arc::new(Mutex::new(iproduct!(
                0..self.plane.integral_plane.0,
                0..self.plane.integral_plane.1
            )));
            for region in regions {
                let pixels = pixels.clone();
                spawner.spawn(move |_| {
                    let mut scratch = map.scratch();
                    loop {
                        let pixel = { pixels.lock().unwrap().next() };
                        match pixel {
                            Some((column, row)) => {
                                self.plot(map, Pixel(column, row), region, &mut scratch)
                            }
                            None => break,
                        }
                    }
                });
            }
        })
        .expect("basin thread panicked");
        self.normalize(render_merge(&allocation, plane))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::ReferenceKernel;
    use crate::terms::Order;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn squaring() -> PolynomialMap {
        // x' = x^2, y' = y^2: points inside the unit square stay, the
        // rest run away.
        let mut c = vec![0.0; 12];
        c[4] = 1.0;
        c[6 + 5] = 1.0;
        PolynomialMap::new(2, Order::Quadratic, c).unwrap()
    }

    #[test]
    fn window_must_run_left_to_right() {
        assert!(BasinRenderer::new(16, 9, 1.0, -1.0, 10, 10.0).is_err());
        assert!(BasinRenderer::new(16, 9, -4.0, 4.0, 10, 10.0).is_ok());
    }

    #[test]
    fn inside_points_run_the_full_count() {
        let renderer = BasinRenderer::new(9, 9, -4.0, 4.0, 50, 100.0).unwrap();
        let map = squaring();
        let mut scratch = map.scratch();
        // Pixel 4 of 9 across [-4, 4] is the origin.
        let center = renderer.escape(&map, &Pixel(4, 4), &mut scratch);
        assert_eq!(center[0], 50.0);
        let corner = renderer.escape(&map, &Pixel(0, 0), &mut scratch);
        assert!(corner[0] < 5.0);
    }

    #[test]
    fn channels_are_scaled_to_one() {
        let renderer = BasinRenderer::new(9, 9, -4.0, 4.0, 50, 100.0).unwrap();
        let image = renderer.basin_single(&squaring());
        assert_eq!(image.channels.len(), 9 * 9 * 3);
        assert!(image.channels.iter().all(|c| *c >= 0.0 && *c <= 1.0));
        assert_eq!(image.pixel(&Pixel(4, 4))[0], 1.0);
    }

    #[test]
    fn threaded_basin_matches_single() {
        let renderer = BasinRenderer::new(12, 8, -3.0, 3.0, 40, 50.0).unwrap();
        let map = squaring();
        let single = renderer.basin_single(&map);
        let threaded = renderer.basin(&map, 3);
        assert_eq!(single.channels, threaded.channels);
    }

    #[test]
    fn escaping_maps_escape_inside_the_window() {
        let mut config = Config::for_shape(2, Order::Quadratic);
        config.attractor_count = 1;
        config.max_attempts = Some(200_000);
        let mut rng = StdRng::seed_from_u64(11);
        let window = EscapeWindow {
            low: 5,
            high: 1000,
            radius: 1000.0,
        };
        let found = find_escaping(&config, &ReferenceKernel, &mut rng, window).unwrap();
        for e in &found {
            assert!(e.escape_step >= 5 && e.escape_step < 1000);
        }
    }

    #[test]
    fn empty_escape_window_is_refused() {
        let config = Config::for_shape(2, Order::Quadratic);
        let mut rng = StdRng::seed_from_u64(11);
        let window = EscapeWindow {
            low: 10,
            high: 10,
            radius: 10.0,
        };
        assert!(find_escaping(&config, &ReferenceKernel, &mut rng, window).is_err());
    }
}
