//! The win-probability model: a Gaussian point-margin assumption over two projected totals.

/// Converts two projected point totals into a pair of win probabilities summing to exactly 1.
///
/// The point margin is assumed normally distributed around the projected margin with standard
/// deviation `sigma` per team, so `P(home) = Φ(margin / (σ√2))`. A non-positive `sigma`
/// degenerates to a deterministic winner.
pub fn estimate(home_points: f64, away_points: f64, sigma: f64) -> (f64, f64) {
    let margin = home_points - away_points;
    if sigma <= 0.0 {
        return if margin > 0.0 {
            (1.0, 0.0)
        } else if margin < 0.0 {
            (0.0, 1.0)
        } else {
            (0.5, 0.5)
        };
    }

    let z = margin / (std::f64::consts::SQRT_2 * sigma);
    let home_prob = (0.5 * (1.0 + erf(z))).clamp(0.0, 1.0);
    (home_prob, 1.0 - home_prob)
}

/// Gaussian error function, Abramowitz & Stegun 7.1.26. Maximum absolute error 1.5e-7,
/// well inside the model's tolerance.
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    #[test]
    fn probabilities_sum_to_one() {
        for (home, away) in [(100.0, 100.0), (132.5, 88.25), (61.0, 140.0), (0.0, 0.0)] {
            let (home_prob, away_prob) = estimate(home, away, 18.0);
            assert_f64_near!(1.0, home_prob + away_prob);
            assert!((0.0..=1.0).contains(&home_prob));
        }
    }

    #[test]
    fn home_probability_increases_with_margin() {
        let mut last = 0.0;
        for margin in [-60.0, -25.0, -5.0, 0.0, 5.0, 25.0, 60.0] {
            let (home_prob, _) = estimate(100.0 + margin, 100.0, 18.0);
            assert!(
                home_prob > last,
                "margin {margin} produced {home_prob}, not above {last}"
            );
            last = home_prob;
        }
    }

    #[test]
    fn even_matchup_is_a_coin_flip() {
        let (home_prob, away_prob) = estimate(105.0, 105.0, 18.0);
        assert_f64_near!(0.5, home_prob);
        assert_f64_near!(0.5, away_prob);
    }

    #[test]
    fn degenerate_sigma_is_deterministic() {
        assert_eq!((1.0, 0.0), estimate(101.0, 100.0, 0.0));
        assert_eq!((0.0, 1.0), estimate(99.5, 100.0, 0.0));
        assert_eq!((0.5, 0.5), estimate(100.0, 100.0, 0.0));
        assert_eq!((1.0, 0.0), estimate(101.0, 100.0, -3.0));
    }

    #[test]
    fn larger_sigma_flattens_towards_even() {
        let (narrow, _) = estimate(120.0, 100.0, 10.0);
        let (wide, _) = estimate(120.0, 100.0, 40.0);
        assert!(narrow > wide);
        assert!(wide > 0.5);

        let (narrow_dog, _) = estimate(100.0, 120.0, 10.0);
        let (wide_dog, _) = estimate(100.0, 120.0, 40.0);
        assert!(narrow_dog < wide_dog);
        assert!(wide_dog < 0.5);
    }

    #[test]
    fn erf_matches_reference_values() {
        assert_float_absolute_eq!(0.0, erf(0.0), 1e-7);
        assert_float_absolute_eq!(0.8427008, erf(1.0), 1e-6);
        assert_float_absolute_eq!(-0.8427008, erf(-1.0), 1e-6);
        assert_float_absolute_eq!(0.9953223, erf(2.0), 1e-6);
        assert_float_absolute_eq!(0.5204999, erf(0.5), 1e-6);
    }
}
