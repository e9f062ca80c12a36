use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use fms_core::{BasisCollection, Complex64, NullSink, Trajectory};
use fms_integrals::{IntegralBackend, VelocityVerlet, VibronicModel};
use fms_spawn::{SpawnConfig, SpawnEngine};

fn bench_spawn(c: &mut Criterion) {
    let backend = IntegralBackend::Vibronic(VibronicModel {
        omega: vec![1.0, 0.7],
        kappa0: vec![-0.6, 0.0],
        kappa1: vec![0.6, 0.1],
        lambda: vec![0.2, 0.05],
        energies: [0.0, 0.05],
        delta: 0.02,
    });
    let propagator = VelocityVerlet::new(backend.clone());
    let trajs = (0..8)
        .map(|i| {
            let x = -1.5 + 0.4 * i as f64;
            Trajectory::new(0, 1, 2, vec![x, 0.0], vec![2.0, 2.0])
                .unwrap()
                .with_momentum(vec![1.0, 0.2])
                .with_amplitude(Complex64::new(0.35, 0.0))
        })
        .collect();
    let basis = BasisCollection::from_trajectories(2, trajs, &backend).unwrap();
    let config = SpawnConfig {
        coupling_threshold: 0.005,
        max_forward_steps: 400,
        ..SpawnConfig::default()
    };

    c.bench_function("spawn_pass_8", |b| {
        b.iter_batched(
            || (basis.clone(), SpawnEngine::new(config.clone())),
            |(mut basis, mut engine)| {
                engine
                    .spawn(&mut basis, &backend, &propagator, &NullSink, 0.05)
                    .unwrap()
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_spawn);
criterion_main!(benches);
