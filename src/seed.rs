// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seeds: attractors as printable strings.
//!
//! Searched coefficients live on a grid of tenths between -1.2 and 1.2,
//! twenty-five values in all, so each one fits in a letter: 'A' is
//! -1.2, 'M' is 0.0, 'Y' is 1.2.  A seed is one letter per coefficient,
//! in coefficient order.

use num::clamp;

use crate::errors::{AttractorError, Result};
use crate::map::PolynomialMap;
use crate::terms::Order;

/// Largest coefficient magnitude, in grid steps.
pub const GRID_LIMIT: i32 = 12;
/// Grid steps per unit.
pub const GRID_SCALE: f64 = 10.0;

const OFFSET: f64 = 7.7;
const FIRST: u8 = b'A';
const LAST: u8 = b'Y';

/// The coefficient for a grid position in `-GRID_LIMIT..=GRID_LIMIT`.
/// Sampling and decoding both go through here so they agree bit for
/// bit.
#[inline]
pub fn grid_value(step: i32) -> f64 {
    f64::from(step) / GRID_SCALE
}

/// Encodes coefficients as letters.  Values between grid points snap to
/// the nearest one and values beyond +/-1.2 clamp to the ends, so this
/// is only an exact inverse of `decode` for on-grid coefficients.
pub fn encode(coefficients: &[f64]) -> String {
    coefficients
        .iter()
        .map(|c| {
            let code = ((c + OFFSET) * GRID_SCALE).round();
            clamp(code, f64::from(FIRST), f64::from(LAST)) as u8 as char
        })
        .collect()
}

/// Decodes a seed back into coefficients.
pub fn decode(seed: &str) -> Result<Vec<f64>> {
    seed.bytes()
        .map(|b| {
            if b < FIRST || b > LAST {
                return Err(AttractorError::InvalidSeed(format!(
                    "seeds may only contain the letters A-Y, found {:?}",
                    b as char
                )));
            }
            Ok(grid_value(i32::from(b - FIRST) - GRID_LIMIT))
        })
        .collect()
}

/// Decodes a seed into a map of the given shape.  The seed's length
/// must match the shape exactly.
pub fn map_from_seed(seed: &str, dimension: usize, order: Order) -> Result<PolynomialMap> {
    let coefficients = decode(seed)?;
    PolynomialMap::new(dimension, order, coefficients).map_err(|e| match e {
        AttractorError::CoefficientCount { expected, .. } => AttractorError::InvalidSeed(format!(
            "a {}-dimensional {} seed is {} letters long, got {}",
            dimension,
            order,
            expected,
            seed.len()
        )),
        other => other,
    })
}

/// The seed of a map.
pub fn seed_of(map: &PolynomialMap) -> String {
    encode(map.coefficients())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: &str = "ODPUMUHYVHMSYKLVJQHGPHEGIJKPFCFPQIFAUNOKFJFCSJGQUCFFKLYESOQL";

    #[test]
    fn letters_span_the_grid() {
        assert_eq!(encode(&[-1.2, 0.0, 1.2]), "AMY");
        assert_eq!(decode("AMY").unwrap(), vec![-1.2, 0.0, 1.2]);
    }

    #[test]
    fn grid_values_survive_the_trip() {
        let grid: Vec<f64> = (-GRID_LIMIT..=GRID_LIMIT).map(grid_value).collect();
        let seed = encode(&grid);
        assert_eq!(seed, "ABCDEFGHIJKLMNOPQRSTUVWXY");
        assert_eq!(decode(&seed).unwrap(), grid);
    }

    #[test]
    fn known_seed_round_trips() {
        let c = decode(KNOWN).unwrap();
        assert_eq!(c.len(), 60);
        assert_eq!(c[0], grid_value(2));
        assert_eq!(encode(&c), KNOWN);
    }

    #[test]
    fn off_grid_values_snap_and_clamp() {
        assert_eq!(encode(&[0.04, 0.06, -7.0, 3.0]), "MNAY");
    }

    #[test]
    fn bad_letters_are_rejected() {
        assert!(decode("ABZ").is_err());
        assert!(decode("abc").is_err());
        assert!(decode("AB C").is_err());
    }

    #[test]
    fn seed_length_must_match_shape() {
        assert!(map_from_seed(KNOWN, 3, Order::Cubic).is_ok());
        assert!(map_from_seed(KNOWN, 4, Order::Quadratic).is_ok());
        match map_from_seed(&KNOWN[..59], 3, Order::Cubic) {
            Err(AttractorError::InvalidSeed(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn maps_report_their_seed() {
        let pm = map_from_seed(KNOWN, 3, Order::Cubic).unwrap();
        assert_eq!(seed_of(&pm), KNOWN);
    }
}
