//! Two-port stability circles
//!
//! Standard load/source stability-circle geometry from the S-parameters and
//! the determinant D = S11*S22 - S12*S21 at one frequency sample.

use num_complex::Complex64;

use crate::constants::NEAR_ZERO;
use crate::network::Network;
use crate::networks::DropReason;

/// A stability circle in the reflection-coefficient plane
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityCircle {
    /// Circle center in the Gamma plane
    pub center: Complex64,
    /// Circle radius
    pub radius: f64,
    /// True when the stable region lies inside the circle
    pub stable_inside: bool,
    /// The frequency sample the circle was evaluated at, in Hz
    pub frequency_hz: f64,
}

impl StabilityCircle {
    /// Compute the stability circle at the sample nearest `frequency_hz`
    ///
    /// `port` 1 selects the input (source-plane) circle, anything else the
    /// output (load-plane) circle.
    pub fn compute(
        network: &Network,
        frequency_hz: f64,
        port: usize,
    ) -> Result<Self, DropReason> {
        if network.nports() != 2 {
            return Err(DropReason::WrongPortCount {
                have: network.nports(),
                want: "2",
            });
        }
        let fi = network
            .frequency
            .nearest(frequency_hz)
            .ok_or(DropReason::EmptyFrequencyRange)?;

        let s11 = network.s[[fi, 0, 0]];
        let s12 = network.s[[fi, 0, 1]];
        let s21 = network.s[[fi, 1, 0]];
        let s22 = network.s[[fi, 1, 1]];
        let delta = s11 * s22 - s12 * s21;

        // the circle lives in the plane of the port it constrains; the
        // opposite port's reflection decides whether the origin is stable
        let (own, opposite) = if port == 1 { (s11, s22) } else { (s22, s11) };

        let denom = own.norm_sqr() - delta.norm_sqr();
        if denom.abs() < NEAR_ZERO {
            return Err(DropReason::Singular);
        }

        let center = (own - delta * opposite.conj()).conj() / denom;
        let radius = ((s12 * s21).norm() / denom).abs();

        // matched termination (Gamma = 0) is stable iff |S_opposite| < 1;
        // the stable region is inside the circle iff that agrees with the
        // origin lying inside it
        let origin_stable = opposite.norm() < 1.0;
        let origin_inside = center.norm() < radius;
        let stable_inside = origin_stable == origin_inside;

        Ok(Self {
            center,
            radius,
            stable_inside,
            frequency_hz: network.frequency.f()[fi],
        })
    }

    /// Sample `n` points around the circle boundary for plotting
    pub fn points(&self, n: usize) -> (Vec<f64>, Vec<f64>) {
        let n = n.max(2);
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let phi = 2.0 * std::f64::consts::PI * i as f64 / (n - 1) as f64;
            x.push(self.center.re + self.radius * phi.cos());
            y.push(self.center.im + self.radius * phi.sin());
        }
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::Frequency;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array3};

    fn two_port(s11: f64, s22: f64, s21: f64, s12: f64) -> Network {
        let freq = Frequency::linear(1e9, 2e9, 2);
        let mut s = Array3::<Complex64>::zeros((2, 2, 2));
        for f in 0..2 {
            s[[f, 0, 0]] = Complex64::new(s11, 0.0);
            s[[f, 1, 1]] = Complex64::new(s22, 0.0);
            s[[f, 1, 0]] = Complex64::new(s21, 0.0);
            s[[f, 0, 1]] = Complex64::new(s12, 0.0);
        }
        Network::new(
            "amp.s2p",
            freq,
            s,
            Array1::from_elem(2, Complex64::new(50.0, 0.0)),
        )
    }

    #[test]
    fn test_circle_geometry_matches_formulas() {
        let ntwk = two_port(0.4, 0.5, 2.0, 0.1);
        let circle = StabilityCircle::compute(&ntwk, 1e9, 2).unwrap();

        let s11 = Complex64::new(0.4, 0.0);
        let s22 = Complex64::new(0.5, 0.0);
        let delta = s11 * s22 - Complex64::new(0.1 * 2.0, 0.0);
        let denom = s22.norm_sqr() - delta.norm_sqr();
        let expected_center = (s22 - delta * s11.conj()).conj() / denom;
        let expected_radius = (0.2 / denom).abs();

        assert_relative_eq!(circle.center.re, expected_center.re, epsilon = 1e-12);
        assert_relative_eq!(circle.radius, expected_radius, epsilon = 1e-12);
    }

    #[test]
    fn test_stable_outside_for_well_matched_amp() {
        // |S11| < 1 and a circle far from the origin: stable region is the
        // outside (where the matched load lives)
        let ntwk = two_port(0.2, 0.3, 3.0, 0.05);
        let circle = StabilityCircle::compute(&ntwk, 1e9, 2).unwrap();
        assert!(circle.center.norm() > circle.radius);
        assert!(!circle.stable_inside);
    }

    #[test]
    fn test_points_close_the_polygon() {
        let ntwk = two_port(0.4, 0.5, 2.0, 0.1);
        let circle = StabilityCircle::compute(&ntwk, 1e9, 1).unwrap();
        let (x, y) = circle.points(101);
        assert_eq!(x.len(), 101);
        assert_relative_eq!(x[0], x[100], epsilon = 1e-9);
        assert_relative_eq!(y[0], y[100], epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_1port() {
        let freq = Frequency::linear(1e9, 1e9, 1);
        let s = Array3::<Complex64>::zeros((1, 1, 1));
        let ntwk = Network::new(
            "load.s1p",
            freq,
            s,
            Array1::from_elem(1, Complex64::new(50.0, 0.0)),
        );
        assert!(StabilityCircle::compute(&ntwk, 1e9, 2).is_err());
    }
}
