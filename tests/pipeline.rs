use attractors::density::DensityFilter;
use attractors::search::{evaluate, Verdict};
use attractors::seed::{map_from_seed, seed_of};
use attractors::terms::{basis_size, Order};
use attractors::{
    render_attractor, run_orbit, Config, Kernel, OrbitStatus, PolynomialMap, ReferenceKernel,
    ThreadedKernel,
};

const KNOWN: [&str; 4] = [
    "ODPUMUHYVHMSYKLVJQHGPHEGIJKPFCFPQIFAUNOKFJFCSJGQUCFFKLYESOQL",
    "KUIGFJAQPTYSSAIWUTSYRXMFFMNVBMLLJTUOGUFXQHQKHCJEVCGODSTIHJEJ",
    "KLYCUAVJBAQBNUDRICOHHKPVIHIBSPIDDHHBJFKLFEOVBTPJWGSGRKCARNBM",
    "PIIGEDYLHLKWHQXFCUPHPRNGSBIYBYSTKDAOGCCONONUGMDKJSRBMFJFJSGK",
];

fn small_render() -> Config {
    Config {
        render_iterations: 20_000,
        width: 64,
        height: 36,
        ..Config::default()
    }
}

#[test]
fn known_attractors_stay_bounded_and_dense() {
    let config = Config::default();
    for seed in KNOWN.iter() {
        let map = map_from_seed(seed, 3, Order::Cubic).unwrap();
        let orbit = run_orbit(&map, &config.start, 2000, 10.0).unwrap();
        assert_eq!(orbit.status(), OrbitStatus::Complete, "{}", seed);
        assert_eq!(orbit.len(), 2000);

        let fill = config
            .density_filter()
            .fill(&orbit.axis(0), &orbit.axis(1))
            .unwrap();
        assert!(fill > 2.0, "{} filled only {}%", seed, fill);

        match evaluate(&config, &ReferenceKernel, &map).unwrap() {
            Verdict::Accepted(f) => assert_eq!(f, fill),
            other => panic!("{} was judged {:?}", seed, other),
        }
    }
}

#[test]
fn a_map_settling_on_a_point_is_rejected() {
    // x' = 1, y' = x, z' = y: everything lands on (1, 1, 1) by step 3.
    let mut c = vec![0.0; 60];
    c[0] = 1.0;
    c[21] = 1.0;
    c[42] = 1.0;
    let map = PolynomialMap::new(3, Order::Cubic, c).unwrap();
    let start = [0.1, 0.1, 0.1];

    let orbit = run_orbit(&map, &start, 2000, 10.0).unwrap();
    assert_eq!(orbit.status(), OrbitStatus::Complete);
    assert_eq!(orbit.last().unwrap(), &[1.0, 1.0, 1.0][..]);
    assert!(!DensityFilter::default().accepts(&orbit.axis(0), &orbit.axis(1)));

    let config = Config {
        start: start.to_vec(),
        ..Config::default()
    };
    match evaluate(&config, &ReferenceKernel, &map).unwrap() {
        Verdict::Sparse(Some(fill)) => assert!(fill < 0.01),
        other => panic!("judged {:?}", other),
    }
}

#[test]
fn seeds_survive_a_trip_through_a_map() {
    for seed in KNOWN.iter() {
        let map = map_from_seed(seed, 3, Order::Cubic).unwrap();
        assert_eq!(&seed_of(&map), seed);
    }
}

#[test]
fn renders_three_planes_of_unit_channels() {
    let config = small_render();
    let map = map_from_seed(KNOWN[0], 3, Order::Cubic).unwrap();
    let images = render_attractor(&config, &ReferenceKernel, &map).unwrap();

    let labels: Vec<&str> = images.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["xy", "xz", "yz"]);
    for image in &images {
        assert_eq!(image.channels.len(), 64 * 36 * 3);
        assert!(image.channels.iter().all(|c| *c >= 0.0 && *c <= 1.0));
        assert!(image.lit_pixels() > 64 * 36 / 100, "{} is nearly blank", image.label);
    }
}

#[test]
fn threaded_render_matches_reference() {
    let config = small_render();
    let map = map_from_seed(KNOWN[0], 3, Order::Cubic).unwrap();
    let reference = render_attractor(&config, &ReferenceKernel, &map).unwrap();
    let threaded = render_attractor(&config, &ThreadedKernel::new(4), &map).unwrap();

    assert_eq!(reference.len(), threaded.len());
    for (r, t) in reference.iter().zip(threaded.iter()) {
        assert_eq!(r.label, t.label);
        for (a, b) in r.channels.iter().zip(t.channels.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}

#[test]
fn kernels_agree_on_orbits() {
    let map = map_from_seed(KNOWN[1], 3, Order::Cubic).unwrap();
    let start = [0.0; 3];
    let a = ReferenceKernel
        .evaluate_orbit(&map, &start, 500, 10.0)
        .unwrap();
    let b = ThreadedKernel::new(3)
        .evaluate_orbit(&map, &start, 500, 10.0)
        .unwrap();
    assert_eq!(a.as_flat(), b.as_flat());
    assert_eq!(a.status(), b.status());
}

/// x' = 1 + y - 1.4 x^2, y' = 0.3 x, and in four dimensions z' = 0.5 y,
/// u' = 0.5 z trailing behind.  Bounded from the origin.
fn henon(dimension: usize) -> PolynomialMap {
    let terms = basis_size(dimension, Order::Quadratic);
    let square_x = 1 + dimension + dimension * (dimension - 1) / 2;
    let mut c = vec![0.0; dimension * terms];
    c[0] = 1.0;
    c[2] = 1.0;
    c[square_x] = -1.4;
    c[terms + 1] = 0.3;
    for axis in 2..dimension {
        c[axis * terms + axis] = 0.5;
    }
    PolynomialMap::new(dimension, Order::Quadratic, c).unwrap()
}

fn render_labels(dimension: usize) -> Vec<String> {
    let config = Config {
        render_iterations: 4000,
        width: 32,
        height: 18,
        ..Config::for_shape(dimension, Order::Quadratic)
    };
    let images = render_attractor(&config, &ReferenceKernel, &henon(dimension)).unwrap();
    for image in &images {
        assert_eq!(image.channels.len(), 32 * 18 * 3);
        assert!(image.channels.iter().all(|c| *c >= 0.0 && *c <= 1.0));
        assert!(image.lit_pixels() > 0, "{} is blank", image.label);
    }
    images.into_iter().map(|i| i.label).collect()
}

#[test]
fn four_dimensions_render_one_plane_per_axis() {
    assert_eq!(render_labels(4), vec!["xy", "yz", "zu", "ux"]);
}

#[test]
fn two_dimensions_render_both_orientations() {
    assert_eq!(render_labels(2), vec!["xy", "yx"]);
}
