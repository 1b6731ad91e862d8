// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rejection sampling for strange attractors.
//!
//! Draw every coefficient independently from the grid of tenths in
//! [-1.2, 1.2], run a short orbit from the start state, and throw the
//! candidate away if the orbit leaves the escape radius or goes
//! non-finite.  Survivors still have to pass the density test on their
//! first two axes; most bounded orbits collapse onto a point or a cycle
//! and fail it.  Keep going until enough candidates are accepted.
//!
//! Nothing bounds how long that takes except `Config::max_attempts`.

use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::errors::{AttractorError, Result};
use crate::kernel::Kernel;
use crate::map::PolynomialMap;
use crate::orbit::OrbitStatus;
use crate::seed::{grid_value, seed_of, GRID_LIMIT};
use crate::terms::basis_size;

/// What became of one candidate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Verdict {
    /// Bounded and dense enough; carries the fill percentage.
    Accepted(f64),
    /// Left the escape radius on the given step.
    Escaped(usize),
    /// Went non-finite on the given step.
    Overflow(usize),
    /// Bounded but too sparse; carries the fill percentage, if the
    /// orbit could be placed on the grid at all.
    Sparse(Option<f64>),
}

/// An accepted candidate.
#[derive(Clone, Debug)]
pub struct Found {
    /// The map.
    pub map: PolynomialMap,
    /// Its printable seed.
    pub seed: String,
    /// Percentage of density-grid cells its search orbit filled.
    pub fill: f64,
}

/// The outcome of a search, with a tally of why candidates failed.
#[derive(Clone, Debug, Default)]
pub struct SearchReport {
    /// Accepted candidates, in the order they were found.
    pub found: Vec<Found>,
    /// Candidates tried.
    pub attempts: usize,
    /// Candidates that escaped.
    pub escaped: usize,
    /// Candidates that overflowed.
    pub overflowed: usize,
    /// Candidates that were bounded but too sparse.
    pub sparse: usize,
}

impl SearchReport {
    fn record(&mut self, map: PolynomialMap, verdict: Verdict) {
        match verdict {
            Verdict::Accepted(fill) => {
                let seed = seed_of(&map);
                info!("Found attractor {} ({:.2}% filled)", seed, fill);
                self.found.push(Found { map, seed, fill });
            }
            Verdict::Escaped(_) => self.escaped += 1,
            Verdict::Overflow(_) => self.overflowed += 1,
            Verdict::Sparse(_) => self.sparse += 1,
        }
    }
}

/// Draws `count` coefficients from the grid.
pub fn sample_coefficients<R: Rng>(rng: &mut R, count: usize) -> Vec<f64> {
    let grid = Uniform::new_inclusive(-GRID_LIMIT, GRID_LIMIT);
    (0..count).map(|_| grid_value(grid.sample(rng))).collect()
}

/// Draws a map of the configured shape.
pub fn sample_map<R: Rng>(config: &Config, rng: &mut R) -> Result<PolynomialMap> {
    let count = config.dimension * basis_size(config.dimension, config.order);
    PolynomialMap::new(
        config.dimension,
        config.order,
        sample_coefficients(rng, count),
    )
}

/// Runs the search orbit of one candidate and judges it.
pub fn evaluate(config: &Config, kernel: &dyn Kernel, map: &PolynomialMap) -> Result<Verdict> {
    let orbit = kernel.evaluate_orbit(
        map,
        &config.start,
        config.search_iterations,
        config.escape_radius,
    )?;
    let verdict = match orbit.status() {
        OrbitStatus::Escaped(step) => Verdict::Escaped(step),
        OrbitStatus::Overflow(step) => Verdict::Overflow(step),
        OrbitStatus::Complete => {
            let filter = config.density_filter();
            match filter.fill(&orbit.axis(0), &orbit.axis(1)) {
                Some(fill) if fill > filter.threshold => Verdict::Accepted(fill),
                fill => Verdict::Sparse(fill),
            }
        }
    };
    debug!("candidate {}: {:?}", seed_of(map), verdict);
    Ok(verdict)
}

fn exhausted(config: &Config, attempts: usize) -> bool {
    config.max_attempts.map_or(false, |cap| attempts >= cap)
}

fn summarize(config: &Config, report: &SearchReport) {
    if report.found.len() < config.attractor_count {
        warn!(
            "Search gave up after {} attempts with {} of {} attractors",
            report.attempts,
            report.found.len(),
            config.attractor_count
        );
    }
    info!(
        "Search: {} attempts, {} escaped, {} overflowed, {} too sparse, {} accepted",
        report.attempts,
        report.escaped,
        report.overflowed,
        report.sparse,
        report.found.len()
    );
}

/// Samples candidates on this thread until `config.attractor_count` are
/// accepted or `config.max_attempts` run out.
pub fn search<R: Rng>(config: &Config, kernel: &dyn Kernel, rng: &mut R) -> Result<SearchReport> {
    config.validate()?;
    info!(
        "Searching for attractors | D: {} | {}",
        config.dimension, config.order
    );

    let mut report = SearchReport::default();
    while report.found.len() < config.attractor_count && !exhausted(config, report.attempts) {
        let map = sample_map(config, rng)?;
        report.attempts += 1;
        let verdict = evaluate(config, kernel, &map)?;
        report.record(map, verdict);
    }
    summarize(config, &report);
    Ok(report)
}

/// The RNG for one search worker: reproducible when the configuration
/// fixes a seed, fresh entropy otherwise.
pub fn worker_rng(config: &Config, worker: usize) -> StdRng {
    match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
        None => StdRng::from_entropy(),
    }
}

/// Like `search`, but with `config.threads` workers sampling
/// independently and sharing one report.  Workers stop as soon as the
/// target count is reached or the attempt cap is used up.  A worker may
/// still be judging a candidate when the last slot is claimed; if that
/// candidate is accepted too it is dropped and its attempt uncounted.
/// Every other verdict is tallied, so the tallies always add up to
/// `attempts`.
pub fn search_parallel(config: &Config, kernel: &dyn Kernel) -> Result<SearchReport> {
    config.validate()?;
    if config.threads == 1 {
        return search(config, kernel, &mut worker_rng(config, 0));
    }
    info!(
        "Searching for attractors | D: {} | {} | {} threads",
        config.dimension, config.order, config.threads
    );

    let shared = Arc::new(Mutex::new(SearchReport::default()));
    let failure: Arc<Mutex<Option<AttractorError>>> = Arc::new(Mutex::new(None));

    crossbeam::scope(|spawner| {
        for worker in 0..config.threads {
            let shared = shared.clone();
            let failure = failure.clone();
            spawner.spawn(move |_| {
                let mut rng = worker_rng(config, worker);
                loop {
                    {
                        let mut report = shared.lock().unwrap();
                        let failed = failure.lock().unwrap().is_some();
                        if failed
                            || report.found.len() >= config.attractor_count
                            || exhausted(config, report.attempts)
                        {
                            break;
                        }
                        report.attempts += 1;
                    }
                    let judged = sample_map(config, &mut rng)
                        .and_then(|map| evaluate(config, kernel, &map).map(|v| (map, v)));
                    match judged {
                        Ok((map, verdict)) => {
                            let mut report = shared.lock().unwrap();
                            match verdict {
                                // Finished after the last slot was taken.
                                Verdict::Accepted(_)
                                    if report.found.len() >= config.attractor_count =>
                                {
                                    report.attempts -= 1
                                }
                                _ => report.record(map, verdict),
                            }
                        }
                        Err(e) => {
                            *failure.lock().unwrap() = Some(e);
                            break;
                        }
                    }
                }
            });
        }
    })
    .expect("search thread panicked");

    if let Some(e) = failure.lock().unwrap().take() {
        return Err(e);
    }
    let report = shared.lock().unwrap().clone();
    summarize(config, &report);
    Ok(report)
}
