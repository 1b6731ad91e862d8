// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The monomial basis of a polynomial map.
//!
//! Each output coordinate of the map is a weighted sum of these terms,
//! so the order in which they come out is part of the contract with
//! every coefficient vector (and every seed string) ever produced.  For
//! three dimensions the cubic basis reads:
//!
//! ```text
//! 1, x, y, z,
//! xy, xz, yz,
//! xx, yy, zz,
//! xyz, xxy, xxz, yyx, yyz, zzx, zzy,
//! xxx, yyy, zzz
//! ```
//!
//! The general routine below produces exactly that ordering for D=3 and
//! extends it to any dimension: constant, linear terms, distinct
//! pairwise products, squares, and then (cubic only) distinct triple
//! products, squared-times-other products, and cubes.

use std::fmt;
use std::str::FromStr;

/// Highest total degree of the polynomial.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Order {
    /// Terms up to degree two.
    Quadratic,
    /// Terms up to degree three.
    Cubic,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Order::Quadratic => write!(f, "quadratic"),
            Order::Cubic => write!(f, "cubic"),
        }
    }
}

impl FromStr for Order {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quadratic" | "2" => Ok(Order::Quadratic),
            "cubic" | "3" => Ok(Order::Cubic),
            _ => Err(format!("unknown polynomial order '{}'", s)),
        }
    }
}

/// n choose k, small arguments only.
fn choose(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

/// Number of terms in the basis for a given dimension and order.  This
/// is the number of monomials of total degree at most 2 (or 3) in
/// `dimension` variables.
pub fn basis_size(dimension: usize, order: Order) -> usize {
    match order {
        Order::Quadratic => choose(dimension + 2, 2),
        Order::Cubic => choose(dimension + 3, 3),
    }
}

/// Writes the basis for `state` into `out`, which must be exactly
/// `basis_size(state.len(), order)` long.  This sits on the innermost
/// loop of every orbit, so it allocates nothing.
pub fn fill_terms(state: &[f64], order: Order, out: &mut [f64]) {
    let d = state.len();
    debug_assert_eq!(out.len(), basis_size(d, order));

    let mut k = 0;
    let mut push = |v: f64| {
        out[k] = v;
        k += 1;
    };

    push(1.0);
    for &x in state {
        push(x);
    }
    for i in 0..d {
        for j in (i + 1)..d {
            push(state[i] * state[j]);
        }
    }
    for &x in state {
        push(x * x);
    }

    if order == Order::Cubic {
        for i in 0..d {
            for j in (i + 1)..d {
                for l in (j + 1)..d {
                    push(state[i] * state[j] * state[l]);
                }
            }
        }
        for i in 0..d {
            for j in 0..d {
                if i != j {
                    push(state[i] * state[i] * state[j]);
                }
            }
        }
        for &x in state {
            push(x * x * x);
        }
    }
}

/// Allocating convenience wrapper around `fill_terms`.
pub fn terms(state: &[f64], order: Order) -> Vec<f64> {
    let mut out = vec![0.0; basis_size(state.len(), order)];
    fill_terms(state, order, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_sizes_match_monomial_counts() {
        assert_eq!(basis_size(2, Order::Quadratic), 6);
        assert_eq!(basis_size(3, Order::Quadratic), 10);
        assert_eq!(basis_size(3, Order::Cubic), 20);
        assert_eq!(basis_size(4, Order::Cubic), 35);
        assert_eq!(basis_size(8, Order::Cubic), 165);
    }

    #[test]
    fn three_dimensional_cubic_order() {
        let (x, y, z) = (2.0, 3.0, 5.0);
        let expected = vec![
            1.0,
            x,
            y,
            z,
            x * y,
            x * z,
            y * z,
            x * x,
            y * y,
            z * z,
            x * y * z,
            x * x * y,
            x * x * z,
            y * y * x,
            y * y * z,
            z * z * x,
            z * z * y,
            x * x * x,
            y * y * y,
            z * z * z,
        ];
        assert_eq!(terms(&[x, y, z], Order::Cubic), expected);
    }

    #[test]
    fn three_dimensional_quadratic_is_cubic_prefix() {
        let state = [0.3, -0.7, 1.1];
        let quad = terms(&state, Order::Quadratic);
        let cubic = terms(&state, Order::Cubic);
        assert_eq!(quad.len(), 10);
        assert_eq!(&cubic[..10], &quad[..]);
    }

    #[test]
    fn two_dimensional_quadratic_order() {
        let (x, y) = (2.0, 3.0);
        assert_eq!(
            terms(&[x, y], Order::Quadratic),
            vec![1.0, x, y, x * y, x * x, y * y]
        );
    }

    #[test]
    fn every_dimension_fills_its_buffer() {
        for d in 2..=10 {
            let state: Vec<f64> = (0..d).map(|i| i as f64 + 1.0).collect();
            for order in &[Order::Quadratic, Order::Cubic] {
                let t = terms(&state, *order);
                assert_eq!(t.len(), basis_size(d, *order));
                assert!(t.iter().all(|v| *v != 0.0));
            }
        }
    }

    #[test]
    fn order_parses_from_names() {
        assert_eq!("Cubic".parse::<Order>(), Ok(Order::Cubic));
        assert_eq!("quadratic".parse::<Order>(), Ok(Order::Quadratic));
        assert!("quartic".parse::<Order>().is_err());
    }
}
