//! Parameter initialization.

use std::f64::consts::PI;

use rand::Rng;

/// Draws from `N(mean, std_dev^2)` using the Box–Muller transform.
///
/// Both uniforms are taken from `(0, 1]` so the logarithm stays finite.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1 = 1.0 - rng.gen_range(0.0..1.0);
    let u2 = 1.0 - rng.gen_range(0.0..1.0);
    let std_normal = (-2.0 * f64::ln(u1)).sqrt() * (2.0 * PI * u2).sin();
    mean + std_dev * std_normal
}

/// Standard normal draw, the default for every weight and bias.
#[inline]
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    gaussian(rng, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn seeded_draws_are_deterministic() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..16 {
            assert_eq!(standard_normal(&mut a), standard_normal(&mut b));
        }
    }

    #[test]
    fn sample_moments_are_close_to_standard_normal() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();

        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;

        assert!(draws.iter().all(|x| x.is_finite()));
        assert!(mean.abs() < 0.05, "mean={mean}");
        assert!((var - 1.0).abs() < 0.05, "var={var}");
    }

    #[test]
    fn gaussian_shifts_and_scales() {
        let mut a = StdRng::seed_from_u64(3);
        let mut b = StdRng::seed_from_u64(3);
        let z = standard_normal(&mut a);
        let x = gaussian(&mut b, 5.0, 2.0);
        assert!((x - (5.0 + 2.0 * z)).abs() < 1e-12);
    }
}
