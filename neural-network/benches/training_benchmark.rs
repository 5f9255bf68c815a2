use criterion::{black_box, criterion_group, criterion_main, Criterion};
use neural_network::{batch_gradients, Activation, Network, Optimizer, Propagation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn mnist_sized_network(rng: &mut StdRng) -> Network {
    Network::new(&[784, 128, 10], Activation::Sigmoid, rng).unwrap()
}

fn random_example(rng: &mut StdRng) -> (Vec<f64>, Vec<f64>) {
    let input: Vec<f64> = (0..784).map(|_| rng.random_range(0.0..1.0)).collect();
    let mut target = vec![0.0; 10];
    target[rng.random_range(0..10)] = 1.0;
    (input, target)
}

fn forward_pass(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let network = mnist_sized_network(&mut rng);
    let (input, _) = random_example(&mut rng);
    let mut propagation = Propagation::new(&network);

    c.bench_function("forward_784_128_10", |b| {
        b.iter(|| {
            propagation
                .forward(&network, black_box(&input))
                .unwrap();
        })
    });
}

fn training_step(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut network = mnist_sized_network(&mut rng);
    let (input, target) = random_example(&mut rng);
    let mut propagation = Propagation::new(&network);
    let mut optimizer = Optimizer::Sgd;

    c.bench_function("sgd_step_784_128_10", |b| {
        b.iter(|| {
            propagation
                .forward(&network, black_box(&input))
                .unwrap();
            propagation.backward(&network, black_box(&target)).unwrap();
            optimizer.step(&mut network, &propagation, 0.05).unwrap();
        })
    });
}

fn batch_accumulation(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let network = mnist_sized_network(&mut rng);
    let examples: Vec<(Vec<f64>, Vec<f64>)> = (0..32).map(|_| random_example(&mut rng)).collect();
    let refs: Vec<(&[f64], &[f64])> = examples
        .iter()
        .map(|(input, target)| (input.as_slice(), target.as_slice()))
        .collect();

    c.bench_function("batch_gradients_32_examples", |b| {
        b.iter(|| batch_gradients(black_box(&network), black_box(&refs), 32).unwrap())
    });
}

criterion_group!(benches, forward_pass, training_step, batch_accumulation);
criterion_main!(benches);
