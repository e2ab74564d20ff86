//! Core Network struct and accessors

use ndarray::{Array1, Array3};
use num_complex::Complex64;

use crate::frequency::Frequency;
use crate::networks::DropReason;

/// An N-port electrical network
#[derive(Debug, Clone)]
pub struct Network {
    /// Display name (typically derived from the source filename)
    pub name: String,
    /// Frequency data
    pub frequency: Frequency,
    /// S-parameter data [nfreq, nports, nports]
    pub s: Array3<Complex64>,
    /// Reference impedance (per port)
    pub z0: Array1<Complex64>,
}

impl Network {
    /// Create a new Network from S-parameters
    pub fn new(
        name: impl Into<String>,
        frequency: Frequency,
        s: Array3<Complex64>,
        z0: Array1<Complex64>,
    ) -> Self {
        Self {
            name: name.into(),
            frequency,
            s,
            z0,
        }
    }

    /// Get the number of ports
    #[inline]
    pub fn nports(&self) -> usize {
        self.s.shape()[1]
    }

    /// Get the number of frequency points
    #[inline]
    pub fn nfreq(&self) -> usize {
        self.s.shape()[0]
    }

    /// Reference impedance of a 0-based port
    #[inline]
    pub fn z0_port(&self, port: usize) -> Complex64 {
        self.z0[port]
    }

    /// Restrict the frequency axis to `[f_start, f_end]`, inclusive
    ///
    /// Fails with `EmptyFrequencyRange` when no sample survives.
    pub fn crop_f(&self, f_start: f64, f_end: f64) -> Result<Network, DropReason> {
        let keep = self.frequency.crop_indices(f_start, f_end);
        if keep.is_empty() {
            return Err(DropReason::EmptyFrequencyRange);
        }

        let nports = self.nports();
        let s = Array3::from_shape_fn((keep.len(), nports, nports), |(f, i, j)| {
            self.s[[keep[f], i, j]]
        });

        Ok(Network::new(
            self.name.clone(),
            self.frequency.take(&keep),
            s,
            self.z0.clone(),
        ))
    }

    /// One S-parameter trace across frequency (0-based ports)
    ///
    /// Fails with `MissingPort` when either index is out of range.
    pub fn s_trace(&self, egress: usize, ingress: usize) -> Result<Vec<Complex64>, DropReason> {
        let nports = self.nports();
        if egress >= nports || ingress >= nports {
            return Err(DropReason::MissingPort {
                port: egress.max(ingress) + 1,
                nports,
            });
        }
        Ok((0..self.nfreq()).map(|f| self.s[[f, egress, ingress]]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_port() -> Network {
        let freq = Frequency::linear(1e9, 4e9, 4);
        let s = Array3::<Complex64>::zeros((4, 2, 2));
        let z0 = Array1::from_elem(2, Complex64::new(50.0, 0.0));
        Network::new("test.s2p", freq, s, z0)
    }

    #[test]
    fn test_network_creation() {
        let ntwk = two_port();
        assert_eq!(ntwk.nports(), 2);
        assert_eq!(ntwk.nfreq(), 4);
        assert_eq!(ntwk.z0_port(0).re, 50.0);
    }

    #[test]
    fn test_crop_f() {
        let ntwk = two_port();
        let cropped = ntwk.crop_f(2e9, 3e9).unwrap();
        assert_eq!(cropped.nfreq(), 2);
        assert_eq!(cropped.frequency.start(), 2e9);

        // idempotent: cropping again to the same or wider bounds is a no-op
        let again = cropped.crop_f(1e9, 4e9).unwrap();
        assert_eq!(again.nfreq(), 2);

        assert!(matches!(
            ntwk.crop_f(10e9, 20e9),
            Err(DropReason::EmptyFrequencyRange)
        ));
    }

    #[test]
    fn test_s_trace_missing_port() {
        let ntwk = two_port();
        assert!(ntwk.s_trace(0, 1).is_ok());
        assert!(matches!(
            ntwk.s_trace(2, 0),
            Err(DropReason::MissingPort { port: 3, nports: 2 })
        ));
    }
}
