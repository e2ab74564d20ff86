//! Lumped and distributed element attachment
//!
//! Each element is expressed as a 2-port in the attachment port's reference
//! impedance and cascaded onto the network. Valid for 1-ports and 2-ports;
//! attaching at port 2 of a 1-port is rejected.

use ndarray::{Array1, Array3};
use num_complex::Complex64;

use super::core::Network;
use crate::constants::NEAR_ZERO;
use crate::networks::DropReason;

/// Lumped element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lumped {
    Resistor,
    Inductor,
    Capacitor,
}

/// How the element is wired into the signal path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Series,
    Shunt,
}

impl Lumped {
    /// Series impedance of the element at angular frequency `w`
    fn impedance(&self, value: f64, w: f64) -> Complex64 {
        match self {
            Lumped::Resistor => Complex64::new(value, 0.0),
            Lumped::Inductor => Complex64::new(0.0, w * value),
            Lumped::Capacitor => {
                if (w * value).abs() < NEAR_ZERO {
                    // open circuit at DC
                    Complex64::new(1.0 / NEAR_ZERO, 0.0)
                } else {
                    Complex64::new(0.0, -1.0 / (w * value))
                }
            }
        }
    }
}

/// S-matrix of a series impedance Z in reference impedance z0
fn series_element(z: Complex64, z0: Complex64) -> [[Complex64; 2]; 2] {
    let denom = z + 2.0 * z0;
    let s11 = z / denom;
    let s21 = 2.0 * z0 / denom;
    [[s11, s21], [s21, s11]]
}

/// S-matrix of a shunt impedance Z in reference impedance z0
fn shunt_element(z: Complex64, z0: Complex64) -> [[Complex64; 2]; 2] {
    // a vanishing impedance is a short to ground: total reflection
    if z.norm() < NEAR_ZERO {
        let refl = Complex64::new(-1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        return [[refl, zero], [zero, refl]];
    }
    // y = Y * z0 (normalized admittance)
    let y = z0 / z;
    let denom = y + 2.0;
    let s11 = -y / denom;
    let s21 = Complex64::new(2.0, 0.0) / denom;
    [[s11, s21], [s21, s11]]
}

impl Network {
    /// Cascade a per-frequency element 2-port onto the given 0-based port
    fn attach(
        &self,
        port: usize,
        element: impl Fn(f64, Complex64) -> [[Complex64; 2]; 2],
    ) -> Result<Network, DropReason> {
        let nports = self.nports();
        if nports != 1 && nports != 2 {
            return Err(DropReason::WrongPortCount {
                have: nports,
                want: "1 or 2",
            });
        }
        if port >= nports {
            return Err(DropReason::MissingPort {
                port: port + 1,
                nports,
            });
        }

        let z0 = self.z0_port(port);
        let nfreq = self.nfreq();
        let mut elem_s = Array3::<Complex64>::zeros((nfreq, 2, 2));
        for (fi, &f) in self.frequency.f().iter().enumerate() {
            let m = element(f, z0);
            elem_s[[fi, 0, 0]] = m[0][0];
            elem_s[[fi, 0, 1]] = m[0][1];
            elem_s[[fi, 1, 0]] = m[1][0];
            elem_s[[fi, 1, 1]] = m[1][1];
        }
        let elem = Network::new(
            self.name.clone(),
            self.frequency.clone(),
            elem_s,
            Array1::from_elem(2, z0),
        );

        // port 1: element faces the outside world; port 2: network first
        let mut result = if port == 0 {
            elem.cascade(self)?
        } else {
            self.cascade(&elem)?
        };
        result.name = self.name.clone();
        Ok(result)
    }

    /// Attach a lumped element (series or shunt) at the 1-based port
    pub fn add_lumped(
        &self,
        kind: Lumped,
        topology: Topology,
        value: f64,
        port: usize,
    ) -> Result<Network, DropReason> {
        if port == 0 {
            return Err(DropReason::MissingPort {
                port: 0,
                nports: self.nports(),
            });
        }
        self.attach(port - 1, |f, z0| {
            let w = 2.0 * std::f64::consts::PI * f;
            let z = kind.impedance(value, w);
            match topology {
                Topology::Series => series_element(z, z0),
                Topology::Shunt => shunt_element(z, z0),
            }
        })
    }

    /// Attach a transmission-line stub at the 1-based port
    ///
    /// `degrees` is the electrical length at `frequency_hz`; `z0_line` is the
    /// line's characteristic impedance (the port's own reference impedance
    /// when None); `loss` is the real part of the propagation constant,
    /// accumulated over the line at the reference frequency and scaled
    /// linearly with frequency like the phase.
    pub fn add_tl(
        &self,
        degrees: f64,
        frequency_hz: f64,
        z0_line: Option<f64>,
        loss: f64,
        port: usize,
    ) -> Result<Network, DropReason> {
        if port == 0 {
            return Err(DropReason::MissingPort {
                port: 0,
                nports: self.nports(),
            });
        }
        if frequency_hz.abs() < NEAR_ZERO {
            return Err(DropReason::Singular);
        }
        let theta_ref = degrees.to_radians();

        self.attach(port - 1, |f, z0_port| {
            let zl = match z0_line {
                Some(z) => Complex64::new(z, 0.0),
                None => z0_port,
            };
            let scale = f / frequency_hz;
            // gamma*l = (alpha + j*beta)*l, both scaling linearly in f
            let gl = Complex64::new(loss * scale, theta_ref * scale);
            let exp_neg = (-gl).exp();
            let exp_neg2 = (-2.0 * gl).exp();

            let gamma0 = (zl - z0_port) / (zl + z0_port);
            let denom = Complex64::new(1.0, 0.0) - gamma0 * gamma0 * exp_neg2;
            let s11 = gamma0 * (Complex64::new(1.0, 0.0) - exp_neg2) / denom;
            let s21 = (Complex64::new(1.0, 0.0) - gamma0 * gamma0) * exp_neg / denom;
            [[s11, s21], [s21, s11]]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::Frequency;
    use approx::assert_relative_eq;

    fn thru(nfreq: usize) -> Network {
        let freq = Frequency::linear(1e9, nfreq as f64 * 1e9, nfreq);
        let mut s = Array3::<Complex64>::zeros((nfreq, 2, 2));
        for f in 0..nfreq {
            s[[f, 0, 1]] = Complex64::new(1.0, 0.0);
            s[[f, 1, 0]] = Complex64::new(1.0, 0.0);
        }
        Network::new(
            "thru.s2p",
            freq,
            s,
            Array1::from_elem(2, Complex64::new(50.0, 0.0)),
        )
    }

    #[test]
    fn test_series_resistor_on_thru() {
        // 50 ohm series R in 50 ohm system: S11 = 50/150 = 1/3, S21 = 100/150 = 2/3
        let ntwk = thru(2)
            .add_lumped(Lumped::Resistor, Topology::Series, 50.0, 1)
            .unwrap();
        assert_relative_eq!(ntwk.s[[0, 0, 0]].re, 1.0 / 3.0, epsilon = 1e-10);
        assert_relative_eq!(ntwk.s[[0, 1, 0]].re, 2.0 / 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_shunt_resistor_on_thru() {
        // 50 ohm shunt R in 50 ohm system: y = 1, S11 = -1/3, S21 = 2/3
        let ntwk = thru(1)
            .add_lumped(Lumped::Resistor, Topology::Shunt, 50.0, 2)
            .unwrap();
        assert_relative_eq!(ntwk.s[[0, 1, 1]].re, -1.0 / 3.0, epsilon = 1e-10);
        assert_relative_eq!(ntwk.s[[0, 1, 0]].re, 2.0 / 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_matched_line_is_pure_delay() {
        // matched 90 degree line at 1 GHz: S11 = 0, S21 = exp(-j*pi/2) = -j
        let ntwk = thru(1).add_tl(90.0, 1e9, None, 0.0, 1).unwrap();
        assert_relative_eq!(ntwk.s[[0, 0, 0]].norm(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(ntwk.s[[0, 1, 0]].re, 0.0, epsilon = 1e-10);
        assert_relative_eq!(ntwk.s[[0, 1, 0]].im, -1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_impedance_shunt_is_a_short() {
        // 0 ohm shunt R shorts the port: S11 = -1, S21 = 0, never NaN
        let freq = Frequency::from_hz(vec![0.0, 1e9]);
        let mut s = Array3::<Complex64>::zeros((2, 2, 2));
        for f in 0..2 {
            s[[f, 0, 1]] = Complex64::new(1.0, 0.0);
            s[[f, 1, 0]] = Complex64::new(1.0, 0.0);
        }
        let dc_thru = Network::new(
            "thru.s2p",
            freq,
            s,
            Array1::from_elem(2, Complex64::new(50.0, 0.0)),
        );

        let shorted = dc_thru
            .add_lumped(Lumped::Resistor, Topology::Shunt, 0.0, 1)
            .unwrap();
        assert_relative_eq!(shorted.s[[0, 0, 0]].re, -1.0, epsilon = 1e-12);
        assert_relative_eq!(shorted.s[[0, 1, 0]].norm(), 0.0, epsilon = 1e-12);

        // a shunt inductor is the same short at the 0 Hz sample, and stays
        // finite everywhere else
        let choked = dc_thru
            .add_lumped(Lumped::Inductor, Topology::Shunt, 1e-9, 1)
            .unwrap();
        assert_relative_eq!(choked.s[[0, 0, 0]].re, -1.0, epsilon = 1e-12);
        for f in 0..2 {
            for i in 0..2 {
                for j in 0..2 {
                    assert!(choked.s[[f, i, j]].re.is_finite());
                    assert!(choked.s[[f, i, j]].im.is_finite());
                }
            }
        }
    }

    #[test]
    fn test_element_on_3port_rejected() {
        let freq = Frequency::linear(1e9, 1e9, 1);
        let s = Array3::<Complex64>::zeros((1, 3, 3));
        let ntwk = Network::new(
            "x.s3p",
            freq,
            s,
            Array1::from_elem(3, Complex64::new(50.0, 0.0)),
        );
        assert!(matches!(
            ntwk.add_lumped(Lumped::Capacitor, Topology::Shunt, 1e-12, 1),
            Err(DropReason::WrongPortCount { have: 3, .. })
        ));
    }
}
