use std::path::Path;

use attractors::cli::{parse_pair, validate_pair, validate_range};
use attractors::errors::AttractorError;
use attractors::output::write_images;
use attractors::seed::{decode, map_from_seed};
use attractors::{kernel_for, render_attractor, search_parallel, Config, Order, PolynomialMap};
use clap::{value_t, App, Arg, ArgMatches};
use log::{info, warn};

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const DIMENSION: &str = "dimension";
const ORDER: &str = "order";
const SEED: &str = "seed";
const COUNT: &str = "count";
const SEARCH_ITERATIONS: &str = "search-iterations";
const ITERATIONS: &str = "iterations";
const TRANSIENT: &str = "transient";
const ALPHA: &str = "alpha";
const ALPHA_MIN: &str = "alpha-min";
const DENSITY: &str = "density";
const RADIUS: &str = "radius";
const MAX_ATTEMPTS: &str = "max-attempts";
const THREADS: &str = "threads";
const RNG_SEED: &str = "rng-seed";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("attractor")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Finds and renders polynomial strange attractors")
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value(".")
                .help("Directory to write images into"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("3200x1800")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output images"),
        )
        .arg(
            Arg::with_name(DIMENSION)
                .long(DIMENSION)
                .short("d")
                .takes_value(true)
                .default_value("3")
                .validator(|s| {
                    validate_range(
                        &s,
                        2,
                        10,
                        "Could not parse dimension",
                        "Dimension must be between 2 and 10",
                    )
                })
                .help("Coordinates per point"),
        )
        .arg(
            Arg::with_name(ORDER)
                .long(ORDER)
                .takes_value(true)
                .default_value("cubic")
                .possible_values(&["quadratic", "cubic"])
                .help("Polynomial order of the map"),
        )
        .arg(
            Arg::with_name(SEED)
                .long(SEED)
                .takes_value(true)
                .validator(|s| decode(&s).map(|_| ()).map_err(|e| e.to_string()))
                .help("Render this attractor instead of searching"),
        )
        .arg(
            Arg::with_name(COUNT)
                .long(COUNT)
                .short("n")
                .takes_value(true)
                .default_value("5")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1000,
                        "Could not parse attractor count",
                        "Attractor count must be between 1 and 1000",
                    )
                })
                .help("Number of attractors to search for"),
        )
        .arg(
            Arg::with_name(SEARCH_ITERATIONS)
                .long(SEARCH_ITERATIONS)
                .takes_value(true)
                .default_value("2000")
                .validator(|s| {
                    validate_range(
                        &s,
                        100,
                        1_000_000,
                        "Could not parse search iteration count",
                        "Search iteration count must be between 100 and 1000000",
                    )
                })
                .help("Iterations per search candidate"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("10000000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1000,
                        1_000_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1000 and 1000000000",
                    )
                })
                .help("Iterations per render"),
        )
        .arg(
            Arg::with_name(TRANSIENT)
                .long(TRANSIENT)
                .takes_value(true)
                .default_value("0.01")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        0.99,
                        "Could not parse transient fraction",
                        "Transient fraction must be between 0 and 0.99",
                    )
                })
                .help("Fraction of render iterations dropped before plotting"),
        )
        .arg(
            Arg::with_name(ALPHA)
                .long(ALPHA)
                .short("a")
                .takes_value(true)
                .default_value("0.025")
                .validator(|s| {
                    validate_range(
                        &s,
                        1e-9,
                        1.0,
                        "Could not parse alpha",
                        "Alpha must be above 0 and at most 1",
                    )
                })
                .help("Color deposited per point"),
        )
        .arg(
            Arg::with_name(ALPHA_MIN)
                .long(ALPHA_MIN)
                .takes_value(true)
                .default_value("0.25")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        1.0,
                        "Could not parse alpha floor",
                        "Alpha floor must be between 0 and 1",
                    )
                })
                .help("Depth alpha of the farthest points"),
        )
        .arg(
            Arg::with_name(DENSITY)
                .long(DENSITY)
                .takes_value(true)
                .default_value("1.5")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        100.0,
                        "Could not parse density threshold",
                        "Density threshold must be a percentage",
                    )
                })
                .help("Percent of the coarse grid a candidate must fill"),
        )
        .arg(
            Arg::with_name(RADIUS)
                .long(RADIUS)
                .short("r")
                .takes_value(true)
                .default_value("10")
                .validator(|s| {
                    validate_range(
                        &s,
                        1e-9,
                        1e12,
                        "Could not parse escape radius",
                        "Escape radius must be positive",
                    )
                })
                .help("Search candidates leaving this radius are discarded"),
        )
        .arg(
            Arg::with_name(MAX_ATTEMPTS)
                .long(MAX_ATTEMPTS)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        usize::max_value(),
                        "Could not parse attempt cap",
                        "Attempt cap must be at least 1",
                    )
                })
                .help("Give up searching after this many candidates"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in search and render"),
        )
        .arg(
            Arg::with_name(RNG_SEED)
                .long(RNG_SEED)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        u64::max_value(),
                        "Could not parse random seed",
                        "Random seed out of range",
                    )
                })
                .help("Seed the search's random number generator"),
        )
        .get_matches()
}

fn config_from(matches: &ArgMatches) -> Result<Config, failure::Error> {
    let (width, height) = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<usize>(s, 'x'))
        .ok_or_else(|| failure::err_msg("Error parsing image dimensions"))?;
    let dimension = value_t!(matches, DIMENSION, usize)?;
    let order = value_t!(matches, ORDER, Order)?;
    let max_attempts = match matches.value_of(MAX_ATTEMPTS) {
        Some(_) => Some(value_t!(matches, MAX_ATTEMPTS, usize)?),
        None => None,
    };
    let rng_seed = match matches.value_of(RNG_SEED) {
        Some(_) => Some(value_t!(matches, RNG_SEED, u64)?),
        None => None,
    };

    let config = Config {
        search_iterations: value_t!(matches, SEARCH_ITERATIONS, usize)?,
        render_iterations: value_t!(matches, ITERATIONS, usize)?,
        transient_fraction: value_t!(matches, TRANSIENT, f64)?,
        attractor_count: value_t!(matches, COUNT, usize)?,
        max_attempts,
        width,
        height,
        alpha: value_t!(matches, ALPHA, f64)?,
        alpha_min: value_t!(matches, ALPHA_MIN, f64)?,
        density_threshold: value_t!(matches, DENSITY, f64)?,
        escape_radius: value_t!(matches, RADIUS, f64)?,
        threads: value_t!(matches, THREADS, usize)?,
        rng_seed,
        ..Config::for_shape(dimension, order)
    };
    config.validate()?;
    Ok(config)
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let config = config_from(matches)?;
    let directory = Path::new(matches.value_of(OUTPUT).unwrap_or("."));
    let kernel = kernel_for(config.threads);

    let attractors: Vec<(PolynomialMap, String)> = match matches.value_of(SEED) {
        Some(seed) => vec![(
            map_from_seed(seed, config.dimension, config.order)?,
            seed.to_string(),
        )],
        None => search_parallel(&config, &*kernel)?
            .found
            .into_iter()
            .map(|found| (found.map, found.seed))
            .collect(),
    };

    let mut rendered = 0;
    for (i, (map, seed)) in attractors.iter().enumerate() {
        info!("Attractor: {} | {}/{}", seed, i + 1, attractors.len());
        match render_attractor(&config, &*kernel, map) {
            Ok(images) => {
                write_images(
                    directory,
                    config.dimension,
                    seed,
                    config.render_iterations,
                    &images,
                )?;
                rendered += 1;
            }
            Err(AttractorError::Overflow(step)) => {
                warn!("Error during calculation: {} overflowed on step {}", seed, step);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if rendered == 0 {
        return Err(failure::err_msg("no attractor was rendered"));
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
