//! Frequency module - represents a sampled frequency axis
//!
//! All frequencies are stored in Hz, ascending. Cropping returns the
//! inclusive index window so callers can slice their own per-frequency data.

/// A sampled frequency axis in Hz
#[derive(Debug, Clone, PartialEq)]
pub struct Frequency {
    /// Frequency vector in Hz, ascending
    f: Vec<f64>,
}

impl Frequency {
    /// Create from a frequency vector in Hz
    pub fn from_hz(f: Vec<f64>) -> Self {
        Self { f }
    }

    /// Create a linear sweep (mainly for tests and synthetic networks)
    pub fn linear(start_hz: f64, stop_hz: f64, npoints: usize) -> Self {
        let f = if npoints <= 1 {
            vec![start_hz]
        } else {
            let step = (stop_hz - start_hz) / (npoints - 1) as f64;
            (0..npoints).map(|i| start_hz + i as f64 * step).collect()
        };
        Self { f }
    }

    /// Get the frequency vector in Hz
    #[inline]
    pub fn f(&self) -> &[f64] {
        &self.f
    }

    /// Number of frequency points
    #[inline]
    pub fn npoints(&self) -> usize {
        self.f.len()
    }

    /// Start frequency in Hz
    #[inline]
    pub fn start(&self) -> f64 {
        *self.f.first().unwrap_or(&0.0)
    }

    /// Stop frequency in Hz
    #[inline]
    pub fn stop(&self) -> f64 {
        *self.f.last().unwrap_or(&0.0)
    }

    /// Frequency span in Hz
    #[inline]
    pub fn span(&self) -> f64 {
        self.stop() - self.start()
    }

    /// Indices of the samples inside `[f_start, f_end]`, inclusive
    pub fn crop_indices(&self, f_start: f64, f_end: f64) -> Vec<usize> {
        self.f
            .iter()
            .enumerate()
            .filter(|(_, &f)| f >= f_start && f <= f_end)
            .map(|(i, _)| i)
            .collect()
    }

    /// Index of the sample closest to `f_hz`, or None when empty
    pub fn nearest(&self, f_hz: f64) -> Option<usize> {
        self.f
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - f_hz).abs().total_cmp(&(*b - f_hz).abs())
            })
            .map(|(i, _)| i)
    }

    /// New axis restricted to the given sample indices
    pub fn take(&self, indices: &[usize]) -> Frequency {
        Frequency {
            f: indices.iter().map(|&i| self.f[i]).collect(),
        }
    }
}
