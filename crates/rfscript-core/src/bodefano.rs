//! Bode-Fano return-loss integral and bound
//!
//! The Bode-Fano criterion limits how much reflection can be traded for
//! bandwidth: integral of -ln|Gamma| over angular frequency is fixed by the
//! load, so concentrating it into a target band bounds the best achievable
//! in-band return loss. Return loss is reported in positive dB throughout.

use num_complex::Complex64;

use crate::constants::NEAR_ZERO;
use crate::frequency::Frequency;
use crate::networks::DropReason;

/// dB per neper: 20 / ln(10)
const DB_PER_NEPER: f64 = 20.0 / std::f64::consts::LN_10;

/// Bode-Fano integral and bound computations
pub struct BodeFano;

impl BodeFano {
    /// Integrate -ln|Gamma(f)| over angular frequency across the samples
    /// inside `[f_start, f_stop]` (trapezoidal quadrature, non-uniform grid)
    ///
    /// Needs at least two in-band samples; |Gamma| is floored at `NEAR_ZERO`.
    pub fn integrate_return_loss(
        frequency: &Frequency,
        gamma: &[Complex64],
        f_start: f64,
        f_stop: f64,
    ) -> Result<f64, DropReason> {
        let keep = frequency.crop_indices(f_start, f_stop);
        if keep.len() < 2 {
            return Err(DropReason::EmptyFrequencyRange);
        }

        let f = frequency.f();
        let mut integral = 0.0;
        for pair in keep.windows(2) {
            let (i, j) = (pair[0], pair[1]);
            let dw = 2.0 * std::f64::consts::PI * (f[j] - f[i]);
            let a = -gamma[i].norm().max(NEAR_ZERO).ln();
            let b = -gamma[j].norm().max(NEAR_ZERO).ln();
            integral += 0.5 * (a + b) * dw;
        }
        Ok(integral)
    }

    /// Average return loss in dB implied by an integral over `band`
    pub fn average_db(integral: f64, band: &Frequency) -> Result<f64, DropReason> {
        let span = 2.0 * std::f64::consts::PI * band.span();
        if span <= 0.0 {
            return Err(DropReason::EmptyFrequencyRange);
        }
        Ok(DB_PER_NEPER * integral / span)
    }

    /// Best achievable return loss in dB when the whole integral is
    /// concentrated uniformly into the target band
    ///
    /// The band is the target window already clipped to the available
    /// samples, so the bound and `average_db` use the same span rule and the
    /// bound can never be stricter than the measured in-band average.
    pub fn bound_db(integral: f64, target_band: &Frequency) -> Result<f64, DropReason> {
        // same concentration rule, different integral
        Self::average_db(integral, target_band)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn constant_gamma(mag: f64, n: usize) -> (Frequency, Vec<Complex64>) {
        let freq = Frequency::linear(1e9, 2e9, n);
        let gamma = vec![Complex64::new(mag, 0.0); n];
        (freq, gamma)
    }

    #[test]
    fn test_constant_reflection_average() {
        // |Gamma| = 0.1 everywhere: average RL must be exactly 20 dB
        let (freq, gamma) = constant_gamma(0.1, 11);
        let integral =
            BodeFano::integrate_return_loss(&freq, &gamma, 0.0, f64::INFINITY).unwrap();
        let avg = BodeFano::average_db(integral, &freq).unwrap();
        assert_relative_eq!(avg, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bound_equals_average_on_same_band() {
        let (freq, gamma) = constant_gamma(0.25, 21);
        let integral = BodeFano::integrate_return_loss(&freq, &gamma, 1e9, 2e9).unwrap();
        let avg = BodeFano::average_db(integral, &freq).unwrap();
        let bound = BodeFano::bound_db(integral, &freq).unwrap();
        assert_relative_eq!(avg, bound, epsilon = 1e-12);
    }

    #[test]
    fn test_narrower_target_band_raises_bound() {
        // concentrating the same integral into half the bandwidth doubles
        // the achievable return loss
        let (freq, gamma) = constant_gamma(0.5, 101);
        let integral =
            BodeFano::integrate_return_loss(&freq, &gamma, 0.0, f64::INFINITY).unwrap();
        let full = BodeFano::bound_db(integral, &freq).unwrap();
        let half_band = Frequency::linear(1e9, 1.5e9, 51);
        let half = BodeFano::bound_db(integral, &half_band).unwrap();
        assert_relative_eq!(half, 2.0 * full, epsilon = 1e-9);
    }

    #[test]
    fn test_single_pole_closed_form() {
        // For a parallel RC load the total integral is pi/(R*C); spread over
        // a target band dw the bound is (20/ln10) * pi / (R*C*dw)
        let r = 50.0;
        let c = 1e-12;
        let integral = std::f64::consts::PI / (r * c);
        let band = Frequency::linear(1e9, 2e9, 2);
        let dw = 2.0 * std::f64::consts::PI * 1e9;
        let expected = (20.0 / std::f64::consts::LN_10) * integral / dw;
        let bound = BodeFano::bound_db(integral, &band).unwrap();
        assert_relative_eq!(bound, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_needs_two_samples() {
        let (freq, gamma) = constant_gamma(0.5, 5);
        assert!(matches!(
            BodeFano::integrate_return_loss(&freq, &gamma, 1.4e9, 1.45e9),
            Err(DropReason::EmptyFrequencyRange)
        ));
    }
}
