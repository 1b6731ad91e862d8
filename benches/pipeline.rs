#[macro_use]
extern crate criterion;

use attractors::render::Rasterizer;
use attractors::seed::map_from_seed;
use attractors::terms::Order;
use attractors::{run_orbit, Config, ReferenceKernel, ThreadedKernel};
use criterion::Criterion;

const KNOWN: &str = "ODPUMUHYVHMSYKLVJQHGPHEGIJKPFCFPQIFAUNOKFJFCSJGQUCFFKLYESOQL";

fn orbit(c: &mut Criterion) {
    let map = map_from_seed(KNOWN, 3, Order::Cubic).unwrap();
    c.bench_function("orbit 100K", move |b| {
        b.iter(|| run_orbit(&map, &[0.0; 3], 100_000, 0.0).unwrap())
    });
}

fn rasterize(c: &mut Criterion) {
    let map = map_from_seed(KNOWN, 3, Order::Cubic).unwrap();
    let orbit = run_orbit(&map, &[0.0; 3], 100_000, 0.0).unwrap();
    let (xs, ys, zs) = (orbit.axis(0), orbit.axis(1), orbit.axis(2));
    let rasterizer = Rasterizer {
        width: 640,
        height: 360,
        ..Rasterizer::from_config(&Config::default())
    };

    let (x1, y1, z1) = (xs.clone(), ys.clone(), zs.clone());
    c.bench_function("rasterize 100K reference", move |b| {
        b.iter(|| {
            rasterizer
                .rasterize(&ReferenceKernel, "xy", &x1, &y1, &z1)
                .unwrap()
        })
    });
    c.bench_function("rasterize 100K threaded", move |b| {
        let kernel = ThreadedKernel::new(4);
        b.iter(|| rasterizer.rasterize(&kernel, "xy", &xs, &ys, &zs).unwrap())
    });
}

criterion_group!(benches, orbit, rasterize);
criterion_main!(benches);
