//! SParams - scalar-per-frequency complex traces
//!
//! A trace batch derived from a `Networks` collection. Arithmetic between
//! two batches pairs traces positionally and requires identical frequency
//! axes; arithmetic with a numeric constant broadcasts.

use log::debug;
use num_complex::Complex64;

use crate::constants::NEAR_ZERO;
use crate::error::ExprError;
use crate::frequency::Frequency;
use crate::networks::DroppedMember;
use crate::plot::PlotRequest;

/// One labelled complex trace over a frequency axis
#[derive(Debug, Clone, PartialEq)]
pub struct SParam {
    pub label: String,
    pub frequency: Frequency,
    pub values: Vec<Complex64>,
}

impl SParam {
    pub fn new(label: impl Into<String>, frequency: Frequency, values: Vec<Complex64>) -> Self {
        Self {
            label: label.into(),
            frequency,
            values,
        }
    }

    /// Build from real values (stability factors, dB averages, ...)
    pub fn from_real(label: impl Into<String>, frequency: Frequency, values: Vec<f64>) -> Self {
        let values = values.into_iter().map(|v| Complex64::new(v, 0.0)).collect();
        Self::new(label, frequency, values)
    }

    /// True when every sample has a negligible imaginary part
    fn is_real(&self) -> bool {
        self.values.iter().all(|v| v.im.abs() < NEAR_ZERO)
    }
}

/// Arithmetic operation selector for the named trace arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arith {
    Add,
    Sub,
    Mul,
    Div,
}

impl Arith {
    fn apply(self, a: Complex64, b: Complex64) -> Complex64 {
        match self {
            Arith::Add => a + b,
            Arith::Sub => a - b,
            Arith::Mul => a * b,
            Arith::Div => a / b,
        }
    }
}

/// A batch of traces bound to the frequency axes of their origin networks
///
/// Like `Networks`, a batch carries the record of members that could not
/// contribute a trace; later transforms pass the record through unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SParams {
    traces: Vec<SParam>,
    dropped: Vec<DroppedMember>,
}

impl SParams {
    pub fn from_traces(traces: Vec<SParam>) -> Self {
        Self {
            traces,
            dropped: Vec::new(),
        }
    }

    pub fn from_parts(traces: Vec<SParam>, dropped: Vec<DroppedMember>) -> Self {
        Self { traces, dropped }
    }

    #[inline]
    pub fn traces(&self) -> &[SParam] {
        &self.traces
    }

    /// Members that produced no trace in the operation this batch came from
    #[inline]
    pub fn dropped(&self) -> &[DroppedMember] {
        &self.dropped
    }

    fn map_values(&self, f: impl Fn(Complex64) -> Complex64) -> SParams {
        let traces = self
            .traces
            .iter()
            .map(|t| {
                SParam::new(
                    t.label.clone(),
                    t.frequency.clone(),
                    t.values.iter().map(|&v| f(v)).collect(),
                )
            })
            .collect();
        SParams {
            traces,
            dropped: self.dropped.clone(),
        }
    }

    /// Convert magnitudes to decibels: 20*log10(|x|)
    pub fn db(&self) -> SParams {
        self.map_values(|v| Complex64::new(20.0 * v.norm().log10(), 0.0))
    }

    /// Element-wise magnitude
    pub fn abs(&self) -> SParams {
        self.map_values(|v| Complex64::new(v.norm(), 0.0))
    }

    /// Element-wise reciprocal (the `~` operator)
    ///
    /// A zero sample makes the result undefined and fails the script.
    pub fn reciprocal(&self) -> Result<SParams, ExprError> {
        for t in &self.traces {
            if t.values.iter().any(|v| v.norm() < NEAR_ZERO) {
                return Err(ExprError::Numeric(format!(
                    "reciprocal of a zero sample in \"{}\"",
                    t.label
                )));
            }
        }
        Ok(self.map_values(|v| Complex64::new(1.0, 0.0) / v))
    }

    /// Restrict every trace to `[f_start, f_end]`; an empty intersection
    /// yields an empty trace, not an error
    pub fn crop_f(&self, f_start: f64, f_end: f64) -> SParams {
        let traces = self
            .traces
            .iter()
            .map(|t| {
                let keep = t.frequency.crop_indices(f_start, f_end);
                SParam::new(
                    t.label.clone(),
                    t.frequency.take(&keep),
                    keep.iter().map(|&i| t.values[i]).collect(),
                )
            })
            .collect();
        SParams {
            traces,
            dropped: self.dropped.clone(),
        }
    }

    /// Named trace arithmetic: traces pair positionally, axes must match
    fn binary(&self, other: &SParams, op: Arith) -> Result<SParams, ExprError> {
        if self.traces.len() != other.traces.len() {
            debug!(
                "trace arithmetic pairs {} with {} traces; extras ignored",
                self.traces.len(),
                other.traces.len()
            );
        }
        let mut traces = Vec::new();
        for (a, b) in self.traces.iter().zip(other.traces.iter()) {
            if a.frequency != b.frequency {
                return Err(ExprError::AxisMismatch {
                    left: format!("\"{}\" ({} points)", a.label, a.frequency.npoints()),
                    right: format!("\"{}\" ({} points)", b.label, b.frequency.npoints()),
                });
            }
            let values = a
                .values
                .iter()
                .zip(b.values.iter())
                .map(|(&x, &y)| op.apply(x, y))
                .collect();
            traces.push(SParam::new(
                format!("({} {} {})", a.label, op_symbol(op), b.label),
                a.frequency.clone(),
                values,
            ));
        }
        let mut dropped = self.dropped.clone();
        dropped.extend(other.dropped.iter().cloned());
        Ok(SParams { traces, dropped })
    }

    pub fn add(&self, other: &SParams) -> Result<SParams, ExprError> {
        self.binary(other, Arith::Add)
    }

    pub fn subtract(&self, other: &SParams) -> Result<SParams, ExprError> {
        self.binary(other, Arith::Sub)
    }

    pub fn multiply(&self, other: &SParams) -> Result<SParams, ExprError> {
        self.binary(other, Arith::Mul)
    }

    pub fn divide(&self, other: &SParams) -> Result<SParams, ExprError> {
        self.binary(other, Arith::Div)
    }

    /// Scalar arithmetic; `scalar_left` selects `c op trace` vs `trace op c`
    pub fn scalar(&self, c: f64, op_name: &str, scalar_left: bool) -> Result<SParams, ExprError> {
        let op = match op_name {
            "+" => Arith::Add,
            "-" => Arith::Sub,
            "*" => Arith::Mul,
            "/" => Arith::Div,
            other => {
                return Err(ExprError::Numeric(format!(
                    "unsupported scalar operation '{}'",
                    other
                )))
            }
        };
        let c = Complex64::new(c, 0.0);
        Ok(self.map_values(|v| {
            if scalar_left {
                op.apply(c, v)
            } else {
                op.apply(v, c)
            }
        }))
    }

    /// Build the plot requests for this batch
    ///
    /// y values are the real part for purely real traces (after `db()` or
    /// `abs()`), the magnitude otherwise. A supplied label overrides the
    /// per-trace labels.
    pub fn plot_requests(&self, label: Option<&str>, style: &str) -> Vec<PlotRequest> {
        self.traces
            .iter()
            .map(|t| {
                let y = if t.is_real() {
                    t.values.iter().map(|v| v.re).collect()
                } else {
                    t.values.iter().map(|v| v.norm()).collect()
                };
                PlotRequest {
                    x: t.frequency.f().to_vec(),
                    y,
                    label: label.unwrap_or(&t.label).to_string(),
                    style: style.to_string(),
                }
            })
            .collect()
    }
}

fn op_symbol(op: Arith) -> &'static str {
    match op {
        Arith::Add => "+",
        Arith::Sub => "-",
        Arith::Mul => "*",
        Arith::Div => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn trace(label: &str, values: Vec<f64>) -> SParams {
        let freq = Frequency::linear(1e9, values.len() as f64 * 1e9, values.len());
        SParams::from_traces(vec![SParam::from_real(label, freq, values)])
    }

    #[test]
    fn test_db_matches_manual_conversion() {
        let sp = trace("S11", vec![0.1, 0.5]);
        let db = sp.db();
        let manual: Vec<f64> = sp.traces()[0]
            .values
            .iter()
            .map(|v| 20.0 * v.norm().log10())
            .collect();
        for (got, want) in db.traces()[0].values.iter().zip(manual.iter()) {
            assert_relative_eq!(got.re, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_axis_mismatch_is_error() {
        let a = trace("a", vec![1.0, 2.0]);
        let b = trace("b", vec![1.0, 2.0, 3.0]);
        assert!(matches!(a.add(&b), Err(ExprError::AxisMismatch { .. })));
    }

    #[test]
    fn test_add_commutative_on_matched_axes() {
        let a = trace("a", vec![1.0, 2.0]);
        let b = trace("b", vec![0.5, -1.0]);
        let ab = a.add(&b).unwrap();
        let ba = b.add(&a).unwrap();
        for (x, y) in ab.traces()[0].values.iter().zip(ba.traces()[0].values.iter()) {
            assert_relative_eq!(x.re, y.re, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reciprocal_of_zero_fails() {
        let sp = trace("z", vec![1.0, 0.0]);
        assert!(matches!(sp.reciprocal(), Err(ExprError::Numeric(_))));
        assert!(trace("ok", vec![1.0, 2.0]).reciprocal().is_ok());
    }

    #[test]
    fn test_crop_empty_intersection_is_empty() {
        let sp = trace("a", vec![1.0, 2.0]);
        let cropped = sp.crop_f(10e9, 20e9);
        assert_eq!(cropped.traces().len(), 1);
        assert!(cropped.traces()[0].values.is_empty());
    }

    #[test]
    fn test_scalar_division_direction() {
        let sp = trace("a", vec![2.0, 4.0]);
        let left = sp.scalar(8.0, "/", true).unwrap(); // 8 / trace
        assert_relative_eq!(left.traces()[0].values[0].re, 4.0, epsilon = 1e-12);
        let right = sp.scalar(2.0, "/", false).unwrap(); // trace / 2
        assert_relative_eq!(right.traces()[0].values[1].re, 2.0, epsilon = 1e-12);
    }
}
