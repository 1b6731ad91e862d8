#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Polynomial strange attractors
//!
//! Take a map from a point in two, three, or more dimensions to another
//! point, where each new coordinate is a quadratic or cubic polynomial
//! in the old ones, and iterate it.  For almost every choice of
//! coefficients the orbit either flies off to infinity or settles down
//! onto a point or a short cycle.  For a few percent of choices it does
//! neither: it wanders forever over a bounded, intricately folded set,
//! a strange attractor.
//!
//! This crate finds those few percent by rejection sampling (a short
//! orbit must stay inside a radius and must spread over enough cells of
//! a coarse grid), then renders the winners by running ten million
//! steps and depositing a little color for every point, weighted
//! towards the slow-moving parts of the orbit and shaded by depth.
//!
//! The stages, leaf first:
//!
//! - `terms` and `map`: the polynomial map
//! - `orbit`: iterating it
//! - `kernel`: the hot loops, behind a swappable interface
//! - `planes`: fitting an image window around a cloud of points
//! - `density`: the coarse-grid acceptance test
//! - `search`: rejection sampling
//! - `seed`: attractors as printable strings
//! - `render` and `output`: pictures
//! - `basin`: escape-time pictures of the maps the search rejects
//! - `cli`: argument checks shared by the binaries

pub mod basin;
pub mod cli;
pub mod config;
pub mod density;
pub mod errors;
pub mod kernel;
pub mod map;
pub mod orbit;
pub mod output;
pub mod planes;
pub mod render;
pub mod search;
pub mod seed;
pub mod terms;

pub use config::Config;
pub use errors::AttractorError;
pub use kernel::{kernel_for, Kernel, ReferenceKernel, ThreadedKernel};
pub use map::PolynomialMap;
pub use orbit::{run_orbit, Orbit, OrbitStatus};
pub use render::{render_attractor, Image};
pub use search::{search, search_parallel, Verdict};
pub use terms::Order;
