//! Expression AST for the scripting surface
//!
//! The grammar is deliberately closed: literals, identifiers, attribute and
//! method access, calls with positional and keyword arguments, and the
//! operators the network algebra defines. Nothing else parses.

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// String literal
    Str(String),
    /// Bare identifier
    Ident(String),
    /// Attribute access: `base.name`
    Attr { base: Box<Expr>, name: String },
    /// Call of a function or method target
    Call {
        target: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    /// Unary operation
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operation
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// `**`: cascade on collections, power on numbers
    Pow,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    /// `~`: invert on collections, reciprocal on traces
    Invert,
}
