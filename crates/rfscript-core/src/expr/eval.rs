//! Evaluation of parsed expressions against the closed DSL registry
//!
//! No general-purpose execution: only the functions, methods and operators
//! enumerated here resolve. The scope is rebuilt for every evaluation and
//! holds nothing but the selected-network pool and the plot sink.

use std::collections::VecDeque;

use crate::error::ExprError;
use crate::files::LoadedSParamFile;
use crate::network::{Lumped, Topology};
use crate::networks::Networks;
use crate::plot::{PlotFn, PlotRequest};
use crate::select::select_networks;
use crate::sparams::SParams;

use super::ast::{BinaryOp, Expr, UnaryOp};

/// A value the DSL can hold between operations
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Str(String),
    Networks(Networks),
    SParams(SParams),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Networks(_) => "Networks",
            Value::SParams(_) => "SParams",
        }
    }
}

/// Evaluation failure: either an already-typed engine error that must
/// propagate unmodified, or a plain message the evaluator will wrap into
/// `ExprError::Evaluation` with the offending line attached.
pub(super) enum Failure {
    Typed(ExprError),
    Message(String),
}

impl From<ExprError> for Failure {
    fn from(e: ExprError) -> Self {
        Failure::Typed(e)
    }
}

fn fail<T>(message: impl Into<String>) -> Result<T, Failure> {
    Err(Failure::Message(message.into()))
}

/// Single-use evaluation scope
pub(super) struct Scope<'a, 'p> {
    selected: &'a [LoadedSParamFile],
    plot: &'a mut PlotFn<'p>,
}

impl<'a, 'p> Scope<'a, 'p> {
    pub(super) fn new(selected: &'a [LoadedSParamFile], plot: &'a mut PlotFn<'p>) -> Self {
        Self { selected, plot }
    }

    fn emit(&mut self, requests: Vec<PlotRequest>) {
        for r in requests {
            (self.plot)(&r.x, &r.y, &r.label, &r.style);
        }
    }

    pub(super) fn eval(&mut self, expr: &Expr) -> Result<Value, Failure> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Ident(name) => fail(format!("name '{}' is not defined", name)),
            Expr::Attr { base, name } => self.eval_attr(base, name),
            Expr::Call {
                target,
                args,
                kwargs,
            } => self.eval_call(target, args, kwargs),
            Expr::Unary { op, operand } => self.eval_unary(*op, operand),
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right),
        }
    }

    fn eval_attr(&mut self, base: &Expr, name: &str) -> Result<Value, Failure> {
        if let Expr::Ident(base_name) = base {
            if base_name == "math" {
                return match name {
                    "pi" => Ok(Value::Number(std::f64::consts::PI)),
                    "e" => Ok(Value::Number(std::f64::consts::E)),
                    "tau" => Ok(Value::Number(std::f64::consts::TAU)),
                    "inf" => Ok(Value::Number(f64::INFINITY)),
                    _ => fail(format!("math has no constant '{}'", name)),
                };
            }
        }
        fail(format!("'{}' is only valid as a method call", name))
    }

    fn eval_call(
        &mut self,
        target: &Expr,
        args: &[Expr],
        kwargs: &[(String, Expr)],
    ) -> Result<Value, Failure> {
        match target {
            Expr::Ident(name) => {
                let args = self.eval_args(args, kwargs)?;
                self.call_function(name, args)
            }
            Expr::Attr { base, name } => {
                if let Expr::Ident(base_name) = base.as_ref() {
                    if base_name == "math" {
                        let args = self.eval_args(args, kwargs)?;
                        return call_math(name, args);
                    }
                }
                let receiver = self.eval(base)?;
                let args = self.eval_args(args, kwargs)?;
                match receiver {
                    Value::Networks(nws) => self.call_networks_method(nws, name, args),
                    Value::SParams(sp) => self.call_sparams_method(sp, name, args),
                    other => fail(format!(
                        "{} has no method '{}'",
                        other.type_name(),
                        name
                    )),
                }
            }
            other => fail(format!("{:?} is not callable", other)),
        }
    }

    fn eval_args(&mut self, args: &[Expr], kwargs: &[(String, Expr)]) -> Result<Args, Failure> {
        let mut pos = VecDeque::with_capacity(args.len());
        for a in args {
            pos.push_back(self.eval(a)?);
        }
        let mut kw = Vec::with_capacity(kwargs.len());
        for (name, e) in kwargs {
            kw.push((name.clone(), self.eval(e)?));
        }
        Ok(Args { pos, kw })
    }

    fn call_function(&mut self, name: &str, mut args: Args) -> Result<Value, Failure> {
        match name {
            "nw" => {
                let pattern = args.string("pattern")?;
                args.finish(name)?;
                let nws = select_networks(self.selected, Some(&pattern), true)?;
                Ok(Value::Networks(nws))
            }
            "nws" | "sel_nws" | "Networks" => {
                let pattern = args.opt_string("pattern")?;
                args.finish(name)?;
                let nws = select_networks(self.selected, pattern.as_deref(), false)?;
                Ok(Value::Networks(nws))
            }
            "SParams" => fail("SParams cannot be constructed directly; derive one with s()"),
            _ => fail(format!("unknown function '{}'", name)),
        }
    }

    fn call_networks_method(
        &mut self,
        nws: Networks,
        name: &str,
        mut args: Args,
    ) -> Result<Value, Failure> {
        match name {
            "s" => {
                let egress = args.port("egress_port")?;
                let ingress = args.port("ingress_port")?;
                args.finish(name)?;
                Ok(Value::SParams(nws.s(egress, ingress)))
            }
            "invert" => {
                args.finish(name)?;
                Ok(Value::Networks(nws.invert()))
            }
            "flip" => {
                args.finish(name)?;
                Ok(Value::Networks(nws.flip()))
            }
            "half" => {
                args.finish(name)?;
                Ok(Value::Networks(nws.half()))
            }
            "k" => {
                args.finish(name)?;
                Ok(Value::SParams(nws.k()))
            }
            "mu" => {
                let order = args.number_or("order", 1.0)?;
                args.finish(name)?;
                if order != 1.0 && order != 2.0 {
                    return Err(ExprError::Numeric(format!(
                        "mu order must be 1 or 2, got {}",
                        order
                    ))
                    .into());
                }
                Ok(Value::SParams(nws.mu(order as u8)?))
            }
            "crop_f" => {
                let f_start = args.number_or("f_start", f64::NEG_INFINITY)?;
                let f_end = args.number_or("f_end", f64::INFINITY)?;
                args.finish(name)?;
                Ok(Value::Networks(nws.crop_f(f_start, f_end)))
            }
            "add_sr" | "add_sl" | "add_sc" | "add_pr" | "add_pl" | "add_pc" => {
                let value = args.number("value")?;
                let port = args.port_or("port", 1)?;
                args.finish(name)?;
                let topology = if name.as_bytes()[4] == b's' {
                    Topology::Series
                } else {
                    Topology::Shunt
                };
                let kind = match name.as_bytes()[5] {
                    b'r' => Lumped::Resistor,
                    b'l' => Lumped::Inductor,
                    _ => Lumped::Capacitor,
                };
                Ok(Value::Networks(nws.add_lumped(kind, topology, value, port)))
            }
            "add_tl" => {
                let degrees = args.number("degrees")?;
                let frequency_hz = args.number_or("frequency_hz", 1e9)?;
                let z0 = args.opt_number("z0")?;
                let loss = args.number_or("loss", 0.0)?;
                let port = args.port_or("port", 1)?;
                args.finish(name)?;
                Ok(Value::Networks(
                    nws.add_tl(degrees, frequency_hz, z0, loss, port),
                ))
            }
            "rl_avg" => {
                let f_start = args.number_or("f_start_hz", f64::NEG_INFINITY)?;
                let f_stop = args.number_or("f_stop_hz", f64::INFINITY)?;
                args.finish(name)?;
                Ok(Value::SParams(nws.rl_avg(f_start, f_stop)))
            }
            "rl_opt" => {
                let fi0 = args.number_or("f_integrate_start_hz", f64::NEG_INFINITY)?;
                let fi1 = args.number_or("f_integrate_stop_hz", f64::INFINITY)?;
                let ft0 = args.number_or("f_target_start_hz", f64::NEG_INFINITY)?;
                let ft1 = args.number_or("f_target_stop_hz", f64::INFINITY)?;
                args.finish(name)?;
                Ok(Value::SParams(nws.rl_opt(fi0, fi1, ft0, ft1)))
            }
            "plot_stab" => {
                let frequency_hz = args.number("frequency_hz")?;
                let port = args.port_or("port", 2)?;
                let n_points = args.number_or("n_points", 101.0)? as usize;
                let label = args.opt_string("label")?;
                let style = args.string_or("style", "-")?;
                args.finish(name)?;
                let (requests, out) =
                    nws.plot_stab(frequency_hz, port, n_points, label.as_deref(), &style);
                self.emit(requests);
                Ok(Value::Networks(out))
            }
            "cascade" => {
                let other = args.networks("other")?;
                args.finish(name)?;
                Ok(Value::Networks(nws.cascade(&other)))
            }
            _ => fail(format!("Networks has no method '{}'", name)),
        }
    }

    fn call_sparams_method(
        &mut self,
        sp: SParams,
        name: &str,
        mut args: Args,
    ) -> Result<Value, Failure> {
        match name {
            "plot" => {
                let label = args.opt_string("label")?;
                let style = args.string_or("style", "-")?;
                args.finish(name)?;
                let requests = sp.plot_requests(label.as_deref(), &style);
                self.emit(requests);
                Ok(Value::SParams(sp))
            }
            "db" => {
                args.finish(name)?;
                Ok(Value::SParams(sp.db()))
            }
            "abs" => {
                args.finish(name)?;
                Ok(Value::SParams(sp.abs()))
            }
            "crop_f" => {
                let f_start = args.number_or("f_start", f64::NEG_INFINITY)?;
                let f_end = args.number_or("f_end", f64::INFINITY)?;
                args.finish(name)?;
                Ok(Value::SParams(sp.crop_f(f_start, f_end)))
            }
            _ => fail(format!("SParams has no method '{}'", name)),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<Value, Failure> {
        let value = self.eval(operand)?;
        match (op, value) {
            (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
            (UnaryOp::Neg, Value::SParams(sp)) => {
                Ok(Value::SParams(sp.scalar(-1.0, "*", true)?))
            }
            (UnaryOp::Invert, Value::Networks(nws)) => Ok(Value::Networks(nws.invert())),
            (UnaryOp::Invert, Value::SParams(sp)) => Ok(Value::SParams(sp.reciprocal()?)),
            (op, v) => fail(format!(
                "unary {} is not defined for {}",
                unary_symbol(op),
                v.type_name()
            )),
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value, Failure> {
        let l = self.eval(left)?;
        let r = self.eval(right)?;
        let sym = binary_symbol(op);

        match (l, r) {
            (Value::Number(a), Value::Number(b)) => {
                if op == BinaryOp::Div && b == 0.0 {
                    return Err(ExprError::Numeric("division by zero".to_string()).into());
                }
                Ok(Value::Number(match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Pow => a.powf(b),
                }))
            }
            (Value::Networks(a), Value::Networks(b)) => match op {
                BinaryOp::Pow => Ok(Value::Networks(a.cascade(&b))),
                _ => fail(format!("'{}' is not defined for Networks", sym)),
            },
            (Value::SParams(a), Value::SParams(b)) => {
                let result = match op {
                    BinaryOp::Add => a.add(&b)?,
                    BinaryOp::Sub => a.subtract(&b)?,
                    BinaryOp::Mul => a.multiply(&b)?,
                    BinaryOp::Div => a.divide(&b)?,
                    BinaryOp::Pow => return fail("'**' is not defined for SParams"),
                };
                Ok(Value::SParams(result))
            }
            (Value::SParams(a), Value::Number(c)) => match op {
                BinaryOp::Pow => fail("'**' is not defined for SParams"),
                BinaryOp::Div if c == 0.0 => {
                    Err(ExprError::Numeric("division by zero".to_string()).into())
                }
                _ => Ok(Value::SParams(a.scalar(c, sym, false)?)),
            },
            (Value::Number(c), Value::SParams(a)) => match op {
                BinaryOp::Pow => fail("'**' is not defined for SParams"),
                _ => Ok(Value::SParams(a.scalar(c, sym, true)?)),
            },
            (l, r) => fail(format!(
                "'{}' is not defined between {} and {}",
                sym,
                l.type_name(),
                r.type_name()
            )),
        }
    }
}

/// Positional + keyword argument cursor with defaults
struct Args {
    pos: VecDeque<Value>,
    kw: Vec<(String, Value)>,
}

impl Args {
    /// Next positional argument, or the keyword of that name
    fn take(&mut self, name: &str) -> Option<Value> {
        if let Some(v) = self.pos.pop_front() {
            return Some(v);
        }
        self.kw
            .iter()
            .position(|(k, _)| k == name)
            .map(|i| self.kw.remove(i).1)
    }

    fn number(&mut self, name: &str) -> Result<f64, Failure> {
        match self.take(name) {
            Some(Value::Number(n)) => Ok(n),
            Some(v) => fail(format!("argument '{}' must be a number, got {}", name, v.type_name())),
            None => fail(format!("missing argument '{}'", name)),
        }
    }

    fn number_or(&mut self, name: &str, default: f64) -> Result<f64, Failure> {
        match self.take(name) {
            Some(Value::Number(n)) => Ok(n),
            Some(v) => fail(format!("argument '{}' must be a number, got {}", name, v.type_name())),
            None => Ok(default),
        }
    }

    fn opt_number(&mut self, name: &str) -> Result<Option<f64>, Failure> {
        match self.take(name) {
            Some(Value::Number(n)) => Ok(Some(n)),
            Some(v) => fail(format!("argument '{}' must be a number, got {}", name, v.type_name())),
            None => Ok(None),
        }
    }

    fn port(&mut self, name: &str) -> Result<usize, Failure> {
        let n = self.number(name)?;
        to_port(n, name)
    }

    fn port_or(&mut self, name: &str, default: usize) -> Result<usize, Failure> {
        match self.take(name) {
            Some(Value::Number(n)) => to_port(n, name),
            Some(v) => fail(format!("argument '{}' must be a port number, got {}", name, v.type_name())),
            None => Ok(default),
        }
    }

    fn string(&mut self, name: &str) -> Result<String, Failure> {
        match self.take(name) {
            Some(Value::Str(s)) => Ok(s),
            Some(v) => fail(format!("argument '{}' must be a string, got {}", name, v.type_name())),
            None => fail(format!("missing argument '{}'", name)),
        }
    }

    fn string_or(&mut self, name: &str, default: &str) -> Result<String, Failure> {
        match self.take(name) {
            Some(Value::Str(s)) => Ok(s),
            Some(v) => fail(format!("argument '{}' must be a string, got {}", name, v.type_name())),
            None => Ok(default.to_string()),
        }
    }

    fn opt_string(&mut self, name: &str) -> Result<Option<String>, Failure> {
        match self.take(name) {
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(v) => fail(format!("argument '{}' must be a string, got {}", name, v.type_name())),
            None => Ok(None),
        }
    }

    fn networks(&mut self, name: &str) -> Result<Networks, Failure> {
        match self.take(name) {
            Some(Value::Networks(n)) => Ok(n),
            Some(v) => fail(format!("argument '{}' must be Networks, got {}", name, v.type_name())),
            None => fail(format!("missing argument '{}'", name)),
        }
    }

    /// Reject unexpected leftovers so typos do not pass silently
    fn finish(self, method: &str) -> Result<(), Failure> {
        if !self.pos.is_empty() {
            return fail(format!("too many arguments to '{}'", method));
        }
        if let Some((name, _)) = self.kw.first() {
            return fail(format!("unknown keyword argument '{}' to '{}'", name, method));
        }
        Ok(())
    }
}

fn to_port(n: f64, name: &str) -> Result<usize, Failure> {
    if n.fract() != 0.0 || n < 1.0 {
        return fail(format!("argument '{}' must be a positive integer port", name));
    }
    Ok(n as usize)
}

fn call_math(name: &str, mut args: Args) -> Result<Value, Failure> {
    let x = args.number("x")?;
    let result = match name {
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "sqrt" => x.sqrt(),
        "exp" => x.exp(),
        "log" => x.ln(),
        "log10" => x.log10(),
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        "radians" => x.to_radians(),
        "degrees" => x.to_degrees(),
        _ => return fail(format!("math has no function '{}'", name)),
    };
    args.finish(name)?;
    Ok(Value::Number(result))
}

fn unary_symbol(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Neg => "-",
        UnaryOp::Invert => "~",
    }
}

fn binary_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Pow => "**",
    }
}
