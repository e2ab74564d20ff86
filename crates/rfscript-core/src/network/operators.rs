//! Network-theory operations: cascade, flip, invert, half
//!
//! Cascading uses the signal-flow-graph composition; inversion goes through
//! T-parameters so that `cascade(n, n.invert())` is the identity, which is
//! what de-embedding relies on.

use ndarray::Array3;
use num_complex::Complex64;

use super::core::Network;
use crate::constants::{NEAR_ZERO, SYMMETRY_TOL};
use crate::networks::DropReason;

/// 2x2 S to T (transfer/chain scattering) at one frequency
fn s2t(s: [[Complex64; 2]; 2]) -> Result<[[Complex64; 2]; 2], DropReason> {
    let s21 = s[1][0];
    if s21.norm() < NEAR_ZERO {
        return Err(DropReason::Singular);
    }
    let det = s[0][0] * s[1][1] - s[0][1] * s[1][0];
    Ok([
        [-det / s21, s[0][0] / s21],
        [-s[1][1] / s21, Complex64::new(1.0, 0.0) / s21],
    ])
}

/// 2x2 T back to S at one frequency
fn t2s(t: [[Complex64; 2]; 2]) -> Result<[[Complex64; 2]; 2], DropReason> {
    let t22 = t[1][1];
    if t22.norm() < NEAR_ZERO {
        return Err(DropReason::Singular);
    }
    let det = t[0][0] * t[1][1] - t[0][1] * t[1][0];
    Ok([
        [t[0][1] / t22, det / t22],
        [Complex64::new(1.0, 0.0) / t22, -t[1][0] / t22],
    ])
}

impl Network {
    /// S-matrix at one frequency index as a 2x2 array (2-ports only)
    pub(crate) fn s2x2(&self, f: usize) -> [[Complex64; 2]; 2] {
        [
            [self.s[[f, 0, 0]], self.s[[f, 0, 1]]],
            [self.s[[f, 1, 0]], self.s[[f, 1, 1]]],
        ]
    }

    /// Cascade with another network (self ** other)
    ///
    /// Connects port 2 of self to port 1 of other. Self must be a 2-port;
    /// other may be a 2-port (result is a 2-port) or a 1-port termination
    /// (result is the 1-port reflection seen through self).
    pub fn cascade(&self, other: &Network) -> Result<Network, DropReason> {
        if self.nports() != 2 {
            return Err(DropReason::WrongPortCount {
                have: self.nports(),
                want: "2",
            });
        }
        if self.frequency != other.frequency {
            return Err(DropReason::FrequencyMismatch);
        }

        let nfreq = self.nfreq();
        let name = format!("{}**{}", self.name, other.name);

        match other.nports() {
            2 => {
                let mut s = Array3::<Complex64>::zeros((nfreq, 2, 2));
                for f in 0..nfreq {
                    let a = self.s2x2(f);
                    let b = other.s2x2(f);

                    // signal flow graph composition
                    let denom = Complex64::new(1.0, 0.0) - a[1][1] * b[0][0];
                    if denom.norm() < NEAR_ZERO {
                        return Err(DropReason::Singular);
                    }
                    s[[f, 0, 0]] = a[0][0] + (a[0][1] * a[1][0] * b[0][0]) / denom;
                    s[[f, 0, 1]] = (a[0][1] * b[0][1]) / denom;
                    s[[f, 1, 0]] = (a[1][0] * b[1][0]) / denom;
                    s[[f, 1, 1]] = b[1][1] + (b[0][1] * b[1][0] * a[1][1]) / denom;
                }
                let z0 = ndarray::Array1::from_vec(vec![self.z0[0], other.z0[1]]);
                Ok(Network::new(name, self.frequency.clone(), s, z0))
            }
            1 => {
                let mut s = Array3::<Complex64>::zeros((nfreq, 1, 1));
                for f in 0..nfreq {
                    let a = self.s2x2(f);
                    let gamma = other.s[[f, 0, 0]];
                    let denom = Complex64::new(1.0, 0.0) - a[1][1] * gamma;
                    if denom.norm() < NEAR_ZERO {
                        return Err(DropReason::Singular);
                    }
                    s[[f, 0, 0]] = a[0][0] + (a[0][1] * a[1][0] * gamma) / denom;
                }
                let z0 = ndarray::Array1::from_vec(vec![self.z0[0]]);
                Ok(Network::new(name, self.frequency.clone(), s, z0))
            }
            n => Err(DropReason::WrongPortCount {
                have: n,
                want: "1 or 2",
            }),
        }
    }

    /// Flip the ports of a 2-port network (swap port 1 and port 2)
    pub fn flip(&self) -> Result<Network, DropReason> {
        if self.nports() != 2 {
            return Err(DropReason::WrongPortCount {
                have: self.nports(),
                want: "2",
            });
        }

        let nfreq = self.nfreq();
        let mut s = Array3::<Complex64>::zeros((nfreq, 2, 2));
        for f in 0..nfreq {
            // new[i,j] = old[1-i, 1-j]
            s[[f, 0, 0]] = self.s[[f, 1, 1]];
            s[[f, 0, 1]] = self.s[[f, 1, 0]];
            s[[f, 1, 0]] = self.s[[f, 0, 1]];
            s[[f, 1, 1]] = self.s[[f, 0, 0]];
        }
        let z0 = ndarray::Array1::from_vec(vec![self.z0[1], self.z0[0]]);

        Ok(Network::new(
            self.name.clone(),
            self.frequency.clone(),
            s,
            z0,
        ))
    }

    /// Port inversion for de-embedding: `cascade(n, n.invert())` = identity
    pub fn invert(&self) -> Result<Network, DropReason> {
        if self.nports() != 2 {
            return Err(DropReason::WrongPortCount {
                have: self.nports(),
                want: "2",
            });
        }

        let nfreq = self.nfreq();
        let mut s = Array3::<Complex64>::zeros((nfreq, 2, 2));
        for f in 0..nfreq {
            let t = s2t(self.s2x2(f))?;

            let det = t[0][0] * t[1][1] - t[0][1] * t[1][0];
            if det.norm() < NEAR_ZERO {
                return Err(DropReason::Singular);
            }
            let inv_det = Complex64::new(1.0, 0.0) / det;
            let t_inv = [
                [t[1][1] * inv_det, -t[0][1] * inv_det],
                [-t[1][0] * inv_det, t[0][0] * inv_det],
            ];

            let si = t2s(t_inv)?;
            s[[f, 0, 0]] = si[0][0];
            s[[f, 0, 1]] = si[0][1];
            s[[f, 1, 0]] = si[1][0];
            s[[f, 1, 1]] = si[1][1];
        }

        Ok(Network::new(
            self.name.clone(),
            self.frequency.clone(),
            s,
            self.z0.clone(),
        ))
    }

    /// Electrical half of a symmetric reciprocal 2-port (2xTHRU de-embedding)
    ///
    /// For a network B that is a symmetric 2-port A cascaded with itself:
    /// `A11 = B11 / (1 + B21)` and `A21 = sqrt(B21 * (1 - A11^2))`.
    /// Members that are not symmetric and reciprocal within `SYMMETRY_TOL`
    /// are rejected.
    pub fn half(&self) -> Result<Network, DropReason> {
        if self.nports() != 2 {
            return Err(DropReason::WrongPortCount {
                have: self.nports(),
                want: "2",
            });
        }

        let nfreq = self.nfreq();
        let mut s = Array3::<Complex64>::zeros((nfreq, 2, 2));
        for f in 0..nfreq {
            let m = self.s2x2(f);
            let scale = m[0][0].norm().max(m[1][0].norm()).max(1e-12);
            if (m[0][0] - m[1][1]).norm() > SYMMETRY_TOL * scale.max(1.0) {
                return Err(DropReason::NotSymmetric);
            }
            if (m[0][1] - m[1][0]).norm() > SYMMETRY_TOL * scale.max(1.0) {
                return Err(DropReason::NotReciprocal);
            }

            let one = Complex64::new(1.0, 0.0);
            let denom = one + m[1][0];
            if denom.norm() < NEAR_ZERO {
                return Err(DropReason::Singular);
            }
            let a11 = m[0][0] / denom;
            let a21 = (m[1][0] * (one - a11 * a11)).sqrt();

            s[[f, 0, 0]] = a11;
            s[[f, 1, 1]] = a11;
            s[[f, 0, 1]] = a21;
            s[[f, 1, 0]] = a21;
        }

        Ok(Network::new(
            self.name.clone(),
            self.frequency.clone(),
            s,
            self.z0.clone(),
        ))
    }
}
