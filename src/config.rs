// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The knobs of a search-and-render run.
//!
//! A `Config` is built once (by the binaries, from the command line)
//! and handed by reference to every stage.  Nothing in the library
//! mutates it.

use crate::density::DensityFilter;
use crate::errors::{AttractorError, Result};
use crate::map::{MAX_DIMENSION, MIN_DIMENSION};
use crate::terms::Order;

/// Parameters for finding and rendering attractors.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Coordinates per state.  Default: 3
    pub dimension: usize,
    /// Polynomial order.  Default: cubic
    pub order: Order,
    /// Steps per search candidate.  Default: 2000
    pub search_iterations: usize,
    /// Steps per render.  Default: 10,000,000
    pub render_iterations: usize,
    /// Fraction of the render steps dropped before rasterizing.  Default: 0.01
    pub transient_fraction: f64,
    /// How many attractors to find.  Default: 5
    pub attractor_count: usize,
    /// Give up the search after this many candidates.  Default: never
    pub max_attempts: Option<usize>,
    /// Output image width.  Default: 3200
    pub width: usize,
    /// Output image height.  Default: 1800
    pub height: usize,
    /// Per-point alpha.  Default: 0.025
    pub alpha: f64,
    /// Alpha given to the farthest points.  Default: 0.25
    pub alpha_min: f64,
    /// Margin around the fitted window.  Default: 1.1
    pub margin: f64,
    /// Coarse grid width for the density test.  Default: 320
    pub density_width: usize,
    /// Coarse grid height for the density test.  Default: 180
    pub density_height: usize,
    /// Percentage of coarse cells a candidate must fill.  Default: 1.5
    pub density_threshold: f64,
    /// Search candidates leaving this radius are discarded.  Default: 10
    pub escape_radius: f64,
    /// Where every orbit starts.  Default: the origin
    pub start: Vec<f64>,
    /// Worker threads for search and accumulation.  Default: 1
    pub threads: usize,
    /// Fixed RNG seed for reproducible searches.  Default: none
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dimension: 3,
            order: Order::Cubic,
            search_iterations: 2000,
            render_iterations: 10_000_000,
            transient_fraction: 0.01,
            attractor_count: 5,
            max_attempts: None,
            width: 3200,
            height: 1800,
            alpha: 0.025,
            alpha_min: 0.25,
            margin: crate::planes::DEFAULT_MARGIN,
            density_width: crate::density::DEFAULT_GRID_WIDTH,
            density_height: crate::density::DEFAULT_GRID_HEIGHT,
            density_threshold: crate::density::DEFAULT_THRESHOLD,
            escape_radius: 10.0,
            start: vec![0.0; 3],
            threads: 1,
            rng_seed: None,
        }
    }
}

fn invalid<T>(msg: String) -> Result<T> {
    Err(AttractorError::InvalidConfig(msg))
}

impl Config {
    /// The defaults, reshaped for another dimension and order.  The
    /// start state follows the dimension.
    pub fn for_shape(dimension: usize, order: Order) -> Self {
        Config {
            dimension,
            order,
            start: vec![0.0; dimension],
            ..Config::default()
        }
    }

    /// Number of leading render steps dropped as transient.
    pub fn transient_steps(&self) -> usize {
        (self.transient_fraction * self.render_iterations as f64) as usize
    }

    /// The density test these settings describe.
    pub fn density_filter(&self) -> DensityFilter {
        DensityFilter {
            width: self.density_width,
            height: self.density_height,
            threshold: self.density_threshold,
            margin: self.margin,
        }
    }

    /// Checks that the settings describe a run that can happen.
    pub fn validate(&self) -> Result<()> {
        if self.dimension < MIN_DIMENSION || self.dimension > MAX_DIMENSION {
            return Err(AttractorError::InvalidDimension(self.dimension));
        }
        if self.start.len() != self.dimension {
            return invalid(format!(
                "start state has {} coordinates for a {}-dimensional map",
                self.start.len(),
                self.dimension
            ));
        }
        if self.search_iterations < 2 {
            return invalid("search needs at least 2 iterations".to_string());
        }
        if self.width < 2 || self.height < 2 {
            return invalid(format!("image of {}x{} is too small", self.width, self.height));
        }
        if self.density_width < 2 || self.density_height < 2 {
            return invalid(format!(
                "density grid of {}x{} is too small",
                self.density_width, self.density_height
            ));
        }
        if !(self.transient_fraction >= 0.0 && self.transient_fraction < 1.0) {
            return invalid(format!(
                "transient fraction must be in [0, 1), got {}",
                self.transient_fraction
            ));
        }
        if self.render_iterations < self.transient_steps() + 2 {
            return invalid(format!(
                "{} render iterations leave nothing after the transient",
                self.render_iterations
            ));
        }
        if !(self.alpha > 0.0) {
            return invalid(format!("alpha must be positive, got {}", self.alpha));
        }
        if !(self.alpha_min >= 0.0 && self.alpha_min <= 1.0) {
            return invalid(format!("alpha floor must be in [0, 1], got {}", self.alpha_min));
        }
        if !(self.margin >= 1.0) {
            return invalid(format!("margin must be at least 1, got {}", self.margin));
        }
        if !(self.escape_radius > 0.0) {
            return invalid(format!(
                "escape radius must be positive, got {}",
                self.escape_radius
            ));
        }
        if self.threads == 0 {
            return invalid("need at least one thread".to_string());
        }
        Ok(())
    }
}
