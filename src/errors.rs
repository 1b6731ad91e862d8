// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The things that can go wrong inside one attractor's pipeline run.
//!
//! Note that escaping orbits, points that land outside the frame, and
//! constant axes are *not* errors.  An escape is a search verdict
//! (see `search::Verdict`), an out-of-frame point is dropped where it
//! lands, and a zero-width axis is floored to `planes::RANGE_EPSILON`.

use failure::Fail;

/// Errors raised by the attractor library.
#[derive(Debug, Fail)]
pub enum AttractorError {
    /// The coefficient vector does not hold one block of basis weights
    /// per output coordinate.
    #[fail(
        display = "expected {} coefficients ({} dimensions x {} terms), got {}",
        expected, dimension, terms, found
    )]
    CoefficientCount {
        /// The length the map needed.
        expected: usize,
        /// The map's dimension.
        dimension: usize,
        /// The basis length for that dimension and order.
        terms: usize,
        /// The length we were handed.
        found: usize,
    },

    /// Dimension outside of what the pipeline can project and label.
    #[fail(display = "dimension must be between 2 and 10, got {}", _0)]
    InvalidDimension(usize),

    /// A seed string that can't be turned back into coefficients.
    #[fail(display = "invalid seed: {}", _0)]
    InvalidSeed(String),

    /// A configuration value that makes no sense.
    #[fail(display = "invalid configuration: {}", _0)]
    InvalidConfig(String),

    /// A coordinate went to NaN or infinity while iterating.
    #[fail(display = "orbit overflowed after {} steps", _0)]
    Overflow(usize),

    /// Asked to rasterize an orbit with fewer than two points.
    #[fail(display = "orbit is too short to rasterize ({} points)", _0)]
    EmptyOrbit(usize),

    /// The image encoder or the filesystem refused our output.
    #[fail(display = "could not write image: {}", _0)]
    Image(String),
}

impl From<image::ImageError> for AttractorError {
    fn from(err: image::ImageError) -> Self {
        AttractorError::Image(err.to_string())
    }
}

impl From<std::io::Error> for AttractorError {
    fn from(err: std::io::Error) -> Self {
        AttractorError::Image(err.to_string())
    }
}

/// Shorthand used throughout the library.
pub type Result<T> = std::result::Result<T, AttractorError>;
