use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use vaxpool::config::REFERENCE_VACCINATION_ORDER;
use vaxpool::{Simulation, SimulationConfig, Snapshot};

static MAX_DAYS: usize = 100;

fn reference_simulation() -> Simulation {
    let config = SimulationConfig::reference_scenario(REFERENCE_VACCINATION_ORDER.to_vec());
    Simulation::new(&config).expect("reference scenario is valid")
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("step", |bencher| {
        bencher.iter_batched_ref(
            reference_simulation,
            |simulation| black_box(simulation.step()),
            BatchSize::SmallInput,
        );
    });

    c.bench_function("snapshot capture", |bencher| {
        let simulation = reference_simulation();
        bencher.iter(|| black_box(Snapshot::capture(black_box(simulation.groups()))));
    });

    c.bench_function("reference scenario 100 days", |bencher| {
        bencher.iter_with_large_drop(|| {
            let mut simulation = reference_simulation();
            simulation.run(MAX_DAYS)
        });
    });
}

criterion_group!(step_benches, criterion_benchmark);
criterion_main!(step_benches);
