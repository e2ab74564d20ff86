//! The line-oriented script evaluator
//!
//! A script is a sequence of expression statements, one per line. Empty
//! lines and `#` comments are skipped; the rest are parsed against the fixed
//! grammar and evaluated strictly in order against a scope that is built for
//! the call and discarded afterwards. The first failing line aborts.

mod ast;
mod eval;
mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use eval::Value;
pub use parser::parse_statement;

use log::debug;

use crate::error::ExprError;
use crate::files::LoadedSParamFile;
use crate::plot::PlotFn;

use eval::{Failure, Scope};

/// Entry point for script evaluation
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    /// Evaluate a script against the loaded network pools
    ///
    /// `available` is the full pool the host has loaded, `selected` the
    /// subset currently selected; the selection functions (`nw`, `nws`,
    /// `sel_nws`) all draw from `selected`. Both pools are read-only. Plot
    /// requests are forwarded to `plot_fn` in the order the script produces
    /// them; side effects of lines before a failing line are the host's to
    /// keep or discard.
    pub fn eval(
        code: &str,
        available: &[LoadedSParamFile],
        selected: &[LoadedSParamFile],
        plot_fn: &mut PlotFn<'_>,
    ) -> Result<(), ExprError> {
        debug!(
            "evaluating script: {} available, {} selected networks",
            available.len(),
            selected.len()
        );

        let mut scope = Scope::new(selected, plot_fn);

        for (line_no, raw_line) in code.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = line_no + 1;
            debug!("line {}: {}", line_no, line);

            let expr = parse_statement(line).map_err(|message| ExprError::Evaluation {
                line_no,
                line: line.to_string(),
                message,
            })?;

            match scope.eval(&expr) {
                Ok(_) => {}
                Err(Failure::Typed(e)) => return Err(e),
                Err(Failure::Message(message)) => {
                    return Err(ExprError::Evaluation {
                        line_no,
                        line: line.to_string(),
                        message,
                    })
                }
            }
        }

        Ok(())
    }
}
