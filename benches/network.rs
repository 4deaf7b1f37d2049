use criterion::{Criterion, black_box, criterion_group, criterion_main};

use digit_net::{Matrix, Network, QuantizedNetwork, Sample};

const SIZES: [usize; 4] = [784, 16, 16, 10];

fn digit_like_sample() -> Sample {
    let input: Vec<f64> = (0..SIZES[0]).map(|i| (i % 17) as f64 / 16.0).collect();
    Sample::labeled(input, 3, SIZES[3]).unwrap()
}

fn network_forward_bench(c: &mut Criterion) {
    let net = Network::new_with_seed(&SIZES, 0).unwrap();
    let sample = digit_like_sample();

    c.bench_function("network_forward_784_16_16_10", |b| {
        b.iter(|| {
            let out = net.feed_forward(black_box(&sample.input)).unwrap();
            black_box(out);
        })
    });
}

fn quantized_forward_bench(c: &mut Criterion) {
    let net = QuantizedNetwork::from_network(&Network::new_with_seed(&SIZES, 0).unwrap());
    let sample = digit_like_sample();

    c.bench_function("quantized_forward_784_16_16_10", |b| {
        b.iter(|| {
            let out = net.feed_forward(black_box(&sample.input)).unwrap();
            black_box(out);
        })
    });
}

fn network_backprop_bench(c: &mut Criterion) {
    let net = Network::new_with_seed(&SIZES, 0).unwrap();
    let sample = digit_like_sample();

    c.bench_function("network_backprop_784_16_16_10", |b| {
        b.iter(|| {
            let grads = net.backprop(black_box(&sample)).unwrap();
            black_box(grads);
        })
    });
}

fn matrix_dot_bench(c: &mut Criterion) {
    let mut k = 0usize;
    let w = Matrix::from_fn(SIZES[1], SIZES[0], |_, _| {
        k += 1;
        (k % 7) as f64 * 0.01
    });
    let x = Matrix::column(&digit_like_sample().input);

    c.bench_function("matrix_dot_16x784_784x1", |b| {
        b.iter(|| {
            let z = black_box(&w).dot(black_box(&x)).unwrap();
            black_box(z);
        })
    });
}

criterion_group!(
    benches,
    network_forward_bench,
    quantized_forward_bench,
    network_backprop_bench,
    matrix_dot_bench
);
criterion_main!(benches);
