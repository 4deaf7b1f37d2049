use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use digit_net::{FitConfig, Inference, Network, QuantizedNetwork, Sample};

/// Which quadrant of the unit square a point falls in.
fn quadrant_samples(n: usize, rng: &mut StdRng) -> digit_net::Result<Vec<Sample>> {
    (0..n)
        .map(|_| {
            let x: f64 = rng.gen_range(0.0..1.0);
            let y: f64 = rng.gen_range(0.0..1.0);
            let label = usize::from(x >= 0.5) * 2 + usize::from(y >= 0.5);
            Sample::labeled(vec![x, y], label, 4)
        })
        .collect()
}

fn main() -> digit_net::Result<()> {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(1);
    let train = quadrant_samples(400, &mut rng)?;
    let test = quadrant_samples(100, &mut rng)?;

    let mut net = Network::new_with_seed(&[2, 8, 4], 1)?;
    net.fit(
        &train,
        &FitConfig {
            epochs: 200,
            seed: Some(1),
            ..FitConfig::default()
        },
    )?;

    std::fs::create_dir_all("target")
        .map_err(|e| digit_net::Error::Io(format!("failed to create target/: {e}")))?;
    let path = "target/quadrants.bin";
    net.save(path)?;

    let exact = Network::load(path)?;
    let coarse = QuantizedNetwork::load(path)?;
    for (name, acc, cost) in [
        ("f64", exact.accuracy(&test)?, exact.mean_cost(&test)?),
        ("0.01", coarse.accuracy(&test)?, coarse.mean_cost(&test)?),
    ] {
        println!("{name:>5}: accuracy={acc:.3} cost={cost:.5}");
    }

    Ok(())
}
