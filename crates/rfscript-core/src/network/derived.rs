//! Derived stability metrics
//!
//! K (Rollett) and µ/µ' (Edwards-Sinsky) per-frequency factors for 2-ports.

use num_complex::Complex64;

use super::core::Network;
use crate::constants::NEAR_ZERO;
use crate::networks::DropReason;

impl Network {
    /// Determinant of the 2x2 S-matrix at a frequency index
    pub(crate) fn delta(&self, f: usize) -> Complex64 {
        self.s[[f, 0, 0]] * self.s[[f, 1, 1]] - self.s[[f, 0, 1]] * self.s[[f, 1, 0]]
    }

    /// Rollett stability factor K per frequency
    ///
    /// K = (1 - |S11|^2 - |S22|^2 + |D|^2) / (2 |S12 S21|); K > 1 together
    /// with |D| < 1 indicates unconditional stability.
    pub fn stability_k(&self) -> Result<Vec<f64>, DropReason> {
        if self.nports() != 2 {
            return Err(DropReason::WrongPortCount {
                have: self.nports(),
                want: "2",
            });
        }

        Ok((0..self.nfreq())
            .map(|f| {
                let s11 = self.s[[f, 0, 0]];
                let s12 = self.s[[f, 0, 1]];
                let s21 = self.s[[f, 1, 0]];
                let s22 = self.s[[f, 1, 1]];
                let delta = self.delta(f);

                let denom = (2.0 * s12.norm() * s21.norm()).max(NEAR_ZERO);
                (1.0 - s11.norm_sqr() - s22.norm_sqr() + delta.norm_sqr()) / denom
            })
            .collect())
    }

    /// Edwards-Sinsky µ (order 1) or µ' (order 2) stability factor
    ///
    /// µ  = (1 - |S11|^2) / (|S22 - D conj(S11)| + |S12 S21|)
    /// µ' = (1 - |S22|^2) / (|S11 - D conj(S22)| + |S12 S21|)
    ///
    /// Values > 1 indicate unconditional stability.
    pub fn stability_mu(&self, order: u8) -> Result<Vec<f64>, DropReason> {
        if self.nports() != 2 {
            return Err(DropReason::WrongPortCount {
                have: self.nports(),
                want: "2",
            });
        }

        Ok((0..self.nfreq())
            .map(|f| {
                let s11 = self.s[[f, 0, 0]];
                let s12 = self.s[[f, 0, 1]];
                let s21 = self.s[[f, 1, 0]];
                let s22 = self.s[[f, 1, 1]];
                let delta = self.delta(f);

                let (refl, other) = match order {
                    1 => (s11, s22),
                    _ => (s22, s11),
                };
                let denom =
                    ((other - delta * refl.conj()).norm() + (s12 * s21).norm()).max(NEAR_ZERO);
                (1.0 - refl.norm_sqr()) / denom
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::Frequency;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array3};

    fn amplifier_like() -> Network {
        let freq = Frequency::linear(1e9, 2e9, 2);
        let mut s = Array3::<Complex64>::zeros((2, 2, 2));
        for f in 0..2 {
            s[[f, 0, 0]] = Complex64::new(0.3, -0.1);
            s[[f, 0, 1]] = Complex64::new(0.05, 0.02);
            s[[f, 1, 0]] = Complex64::new(2.5, 1.0);
            s[[f, 1, 1]] = Complex64::new(0.4, 0.1);
        }
        Network::new(
            "amp.s2p",
            freq,
            s,
            Array1::from_elem(2, Complex64::new(50.0, 0.0)),
        )
    }

    #[test]
    fn test_k_matches_formula() {
        let ntwk = amplifier_like();
        let k = ntwk.stability_k().unwrap();

        let s11 = ntwk.s[[0, 0, 0]];
        let s12 = ntwk.s[[0, 0, 1]];
        let s21 = ntwk.s[[0, 1, 0]];
        let s22 = ntwk.s[[0, 1, 1]];
        let delta = s11 * s22 - s12 * s21;
        let expected = (1.0 - s11.norm_sqr() - s22.norm_sqr() + delta.norm_sqr())
            / (2.0 * (s12 * s21).norm());

        assert_relative_eq!(k[0], expected, epsilon = 1e-12);
        assert_relative_eq!(k[1], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_mu_orders_differ() {
        let ntwk = amplifier_like();
        let mu1 = ntwk.stability_mu(1).unwrap();
        let mu2 = ntwk.stability_mu(2).unwrap();
        assert!((mu1[0] - mu2[0]).abs() > 1e-6);
    }

    #[test]
    fn test_k_rejects_1port() {
        let freq = Frequency::linear(1e9, 1e9, 1);
        let s = Array3::<Complex64>::zeros((1, 1, 1));
        let ntwk = Network::new(
            "load.s1p",
            freq,
            s,
            Array1::from_elem(1, Complex64::new(50.0, 0.0)),
        );
        assert!(ntwk.stability_k().is_err());
    }
}
