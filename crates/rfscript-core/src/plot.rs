//! Plot callback contract
//!
//! The engine never renders anything; it hands `PlotRequest`s to a host
//! callback in the order the script produced them.

/// One requested trace: x axis, real y values, label and a line-style
/// string following the conventional "-", ":", "--", "o-" vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub label: String,
    pub style: String,
}

/// Host-supplied plot callback: `(x_values, y_values, label, style)`
pub type PlotFn<'a> = dyn FnMut(&[f64], &[f64], &str, &str) + 'a;
