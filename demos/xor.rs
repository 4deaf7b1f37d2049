use rand::SeedableRng;
use rand::rngs::StdRng;

use digit_net::{FitConfig, Inference, Network, Sample};

fn main() -> digit_net::Result<()> {
    env_logger::init();

    // XOR with one-hot targets: class 1 when exactly one input is set.
    let train: Vec<Sample> = [
        ([0.0, 0.0], 0),
        ([0.0, 1.0], 1),
        ([1.0, 0.0], 1),
        ([1.0, 1.0], 0),
    ]
    .into_iter()
    .map(|(x, label)| Sample::labeled(x.to_vec(), label, 2))
    .collect::<digit_net::Result<_>>()?;

    // 2 -> 4 -> 2, sigmoid everywhere.
    let mut net = Network::new_with_seed(&[2, 4, 2], 0)?;
    let cfg = FitConfig {
        epochs: 2_000,
        batch_size: 1,
        learning_rate: 3.0,
        seed: Some(0),
    };

    let mut rng = StdRng::seed_from_u64(0);
    let report = net.fit_with_observer(&train, &cfg, &mut rng, |net, epoch| {
        if epoch.epoch % 500 == 0 {
            let acc = net.accuracy(&train).unwrap_or(0.0);
            println!(
                "epoch {:>5}: cost={:.5} accuracy={acc:.2}",
                epoch.epoch, epoch.mean_cost
            );
        }
    })?;

    println!(
        "final_cost_from_fit={:?} train_cost={:.5}",
        report.final_cost(),
        net.mean_cost(&train)?
    );
    for sample in &train {
        let out = net.feed_forward(&sample.input)?;
        println!("x={:?} y={out:.3?} class={}", sample.input, net.classify(&sample.input)?);
    }

    Ok(())
}
