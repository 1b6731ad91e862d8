use std::path::Path;

use attractors::basin::{find_escaping, BasinRenderer, EscapeWindow};
use attractors::cli::{parse_pair, validate_pair, validate_range};
use attractors::output::{basin_file_name, write_image};
use attractors::search::worker_rng;
use attractors::seed::{decode, map_from_seed};
use attractors::{kernel_for, Config, Order};
use clap::{value_t, App, Arg, ArgMatches};
use log::info;

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const XRANGE: &str = "xrange";
const DIMENSION: &str = "dimension";
const ORDER: &str = "order";
const SEED: &str = "seed";
const COUNT: &str = "count";
const ITERATIONS: &str = "iterations";
const RADIUS: &str = "radius";
const SEARCH: &str = "search";
const SEARCH_RADIUS: &str = "search-radius";
const THREADS: &str = "threads";
const RNG_SEED: &str = "rng-seed";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("basin")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Renders escape-time basins of polynomial maps")
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
                .default_value("1600x900")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output images"),
        )
        .arg(
            Arg::with_name(XRANGE)
                .long(XRANGE)
                .short("x")
                .takes_value(true)
                .default_value("-4,4")
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse horizontal range"))
                .help("Left and right edges of the plane"),
        )
        .arg(
            Arg::with_name(DIMENSION)
                .long(DIMENSION)
                .short("d")
                .takes_value(true)
                .default_value("2")
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
                .default_value("quadratic")
                .possible_values(&["quadratic", "cubic"])
                .help("Polynomial order of the map"),
        )
        .arg(
            Arg::with_name(SEED)
                .long(SEED)
                .takes_value(true)
                .validator(|s| decode(&s).map(|_| ()).map_err(|e| e.to_string()))
                .help("Render this map instead of searching"),
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
                        "Could not parse map count",
                        "Map count must be between 1 and 1000",
                    )
                })
                .help("Number of maps to search for"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("256")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Most steps to follow each pixel's orbit"),
        )
        .arg(
            Arg::with_name(RADIUS)
                .long(RADIUS)
                .short("r")
                .takes_value(true)
                .default_value("100")
                .help("Escape radius while rendering"),
        )
        .arg(
            Arg::with_name(SEARCH)
                .long(SEARCH)
                .takes_value(true)
                .default_value("100,1000")
                .validator(|s| validate_pair::<usize>(&s, ',', "Could not parse search window"))
                .help("Keep maps escaping no sooner than the first step and before the second"),
        )
        .arg(
            Arg::with_name(SEARCH_RADIUS)
                .long(SEARCH_RADIUS)
                .takes_value(true)
                .default_value("1000")
                .help("Escape radius while searching"),
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
                .help("Number of threads to use in solver"),
        )
        .arg(
            Arg::with_name(RNG_SEED)
                .long(RNG_SEED)
                .takes_value(true)
                .help("Seed the search's random number generator"),
        )
        .get_matches()
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let (width, height) = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<usize>(s, 'x'))
        .ok_or_else(|| failure::err_msg("Error parsing image dimensions"))?;
    let (xmin, xmax) = matches
        .value_of(XRANGE)
        .and_then(|s| parse_pair::<f64>(s, ','))
        .ok_or_else(|| failure::err_msg("Error parsing horizontal range"))?;
    let (low, high) = matches
        .value_of(SEARCH)
        .and_then(|s| parse_pair::<usize>(s, ','))
        .ok_or_else(|| failure::err_msg("Error parsing search window"))?;
    let dimension = value_t!(matches, DIMENSION, usize)?;
    let order = value_t!(matches, ORDER, Order)?;
    let threads = value_t!(matches, THREADS, usize)?;
    let rng_seed = match matches.value_of(RNG_SEED) {
        Some(_) => Some(value_t!(matches, RNG_SEED, u64)?),
        None => None,
    };
    let config = Config {
        attractor_count: value_t!(matches, COUNT, usize)?,
        threads,
        rng_seed,
        ..Config::for_shape(dimension, order)
    };
    config.validate()?;

    let renderer = BasinRenderer::new(
        width,
        height,
        xmin,
        xmax,
        value_t!(matches, ITERATIONS, usize)?,
        value_t!(matches, RADIUS, f64)?,
    )?;

    let maps = match matches.value_of(SEED) {
        Some(seed) => vec![(map_from_seed(seed, dimension, order)?, seed.to_string())],
        None => {
            let window = EscapeWindow {
                low,
                high,
                radius: value_t!(matches, SEARCH_RADIUS, f64)?,
            };
            let kernel = kernel_for(threads);
            find_escaping(&config, &*kernel, &mut worker_rng(&config, 0), window)?
                .into_iter()
                .map(|e| (e.map, e.seed))
                .collect()
        }
    };

    let directory = Path::new(matches.value_of(OUTPUT).unwrap_or("."));
    for (map, seed) in &maps {
        info!("Rendering basin of {}", seed);
        let image = renderer.basin(map, threads);
        let path = directory.join(basin_file_name(dimension, seed));
        write_image(&path, &image)?;
        info!("Saved {}", path.display());
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
