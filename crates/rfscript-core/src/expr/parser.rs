//! Recursive-descent parser for one script line
//!
//! Precedence, lowest to highest: `+ -`, `* /`, unary `- ~`, `**`
//! (right-associative, binding tighter than unary on its left), postfix
//! call/attribute access. This mirrors the Python expression syntax the
//! scripts are written in.

use super::ast::{BinaryOp, Expr, UnaryOp};

/// Parse a single expression statement; the whole line must be consumed
pub fn parse_statement(input: &str) -> Result<Expr, String> {
    let mut parser = LineParser::new(input);
    parser.skip_whitespace();
    let expr = parser.parse_additive()?;
    parser.skip_whitespace();
    if parser.pos < parser.input.len() {
        Err(format!(
            "unexpected input at column {}: \"{}\"",
            parser.pos + 1,
            &parser.input[parser.pos..]
        ))
    } else {
        Ok(expr)
    }
}

struct LineParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> LineParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.as_bytes().get(self.pos).map(|&b| b as char)
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
        }
    }

    fn check_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_multiplicative()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('+') => BinaryOp::Add,
                Some('-') => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            // careful: '**' belongs to the power level
            let op = match self.peek() {
                Some('*') if !self.check_str("**") => BinaryOp::Mul,
                Some('/') => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        self.skip_whitespace();
        let op = match self.peek() {
            Some('-') => Some(UnaryOp::Neg),
            Some('~') => Some(UnaryOp::Invert),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, String> {
        let base = self.parse_postfix()?;
        self.skip_whitespace();
        if self.check_str("**") {
            self.advance();
            self.advance();
            // right-associative; the right side may carry its own unary ops
            let exp = self.parse_unary()?;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                left: Box::new(base),
                right: Box::new(exp),
            });
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, String> {
        let mut expr = self.parse_primary()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('.') if !self.next_is_digit() => {
                    self.advance();
                    let name = self.parse_name()?;
                    expr = Expr::Attr {
                        base: Box::new(expr),
                        name,
                    };
                }
                Some('(') => {
                    let (args, kwargs) = self.parse_call_args()?;
                    expr = Expr::Call {
                        target: Box::new(expr),
                        args,
                        kwargs,
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn next_is_digit(&self) -> bool {
        self.input
            .as_bytes()
            .get(self.pos + 1)
            .map(|b| b.is_ascii_digit())
            .unwrap_or(false)
    }

    fn parse_call_args(&mut self) -> Result<(Vec<Expr>, Vec<(String, Expr)>), String> {
        self.advance(); // consume '('
        let mut args = Vec::new();
        let mut kwargs: Vec<(String, Expr)> = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.advance();
            return Ok((args, kwargs));
        }

        loop {
            self.skip_whitespace();

            // keyword argument: IDENT '=' (but not '==')
            let checkpoint = self.pos;
            let keyword = if self.peek().map(is_ident_start).unwrap_or(false) {
                let name = self.parse_name()?;
                self.skip_whitespace();
                if self.peek() == Some('=') && !self.check_str("==") {
                    self.advance();
                    Some(name)
                } else {
                    self.pos = checkpoint;
                    None
                }
            } else {
                None
            };

            let value = self.parse_additive()?;
            match keyword {
                Some(name) => kwargs.push((name, value)),
                None => {
                    if !kwargs.is_empty() {
                        return Err("positional argument after keyword argument".to_string());
                    }
                    args.push(value);
                }
            }

            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.advance(),
                Some(')') => {
                    self.advance();
                    return Ok((args, kwargs));
                }
                _ => return Err("expected ',' or ')' in argument list".to_string()),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                self.advance();
                let expr = self.parse_additive()?;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err("expected ')'".to_string());
                }
                self.advance();
                Ok(expr)
            }
            Some('\'') | Some('"') => self.parse_string(),
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(),
            Some(c) if is_ident_start(c) => {
                let name = self.parse_name()?;
                Ok(Expr::Ident(name))
            }
            Some(c) => Err(format!("unexpected character '{}'", c)),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn parse_string(&mut self) -> Result<Expr, String> {
        let quote = self.peek().unwrap_or('"');
        self.advance();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let s = self.input[start..self.pos].to_string();
                self.advance();
                return Ok(Expr::Str(s));
            }
            self.advance();
        }
        Err("unterminated string literal".to_string())
    }

    fn parse_number(&mut self) -> Result<Expr, String> {
        let start = self.pos;
        let mut has_dot = false;
        let mut has_exp = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.' && !has_dot && !has_exp {
                has_dot = true;
                self.advance();
            } else if (c == 'e' || c == 'E') && !has_exp && self.pos > start {
                has_exp = true;
                self.advance();
                if self.peek() == Some('+') || self.peek() == Some('-') {
                    self.advance();
                }
            } else {
                break;
            }
        }

        let text = &self.input[start..self.pos];
        text.parse::<f64>()
            .map(Expr::Number)
            .map_err(|_| format!("invalid number \"{}\"", text))
    }

    fn parse_name(&mut self) -> Result<String, String> {
        self.skip_whitespace();
        let start = self.pos;
        match self.peek() {
            Some(c) if is_ident_start(c) => self.advance(),
            _ => return Err("expected identifier".to_string()),
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        Ok(self.input[start..self.pos].to_string())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chained_method_calls() {
        let expr = parse_statement("nws(\"Amp.s2p\").s(2,1).plot(\"IL\")").unwrap();
        // outermost node is the plot() call
        match expr {
            Expr::Call { target, args, .. } => {
                assert_eq!(args, vec![Expr::Str("IL".to_string())]);
                assert!(matches!(*target, Expr::Attr { .. }));
            }
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn test_power_precedence_and_associativity() {
        // a ** b ** c parses as a ** (b ** c)
        let expr = parse_statement("2 ** 3 ** 2").unwrap();
        match expr {
            Expr::Binary {
                op: BinaryOp::Pow,
                left,
                right,
            } => {
                assert_eq!(*left, Expr::Number(2.0));
                assert!(matches!(
                    *right,
                    Expr::Binary {
                        op: BinaryOp::Pow,
                        ..
                    }
                ));
            }
            other => panic!("unexpected AST: {:?}", other),
        }

        // '*' must not swallow the first char of '**'
        let expr = parse_statement("2 * 3 ** 2").unwrap();
        assert!(matches!(
            expr,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_unary_invert_binds_to_postfix() {
        let expr = parse_statement("~nws(\"Thru\")").unwrap();
        match expr {
            Expr::Unary {
                op: UnaryOp::Invert,
                operand,
            } => assert!(matches!(*operand, Expr::Call { .. })),
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn test_keyword_arguments() {
        let expr = parse_statement("n.add_tl(90, frequency_hz=2e9, loss=0.1)").unwrap();
        match expr {
            Expr::Call { args, kwargs, .. } => {
                assert_eq!(args.len(), 1);
                assert_eq!(kwargs.len(), 2);
                assert_eq!(kwargs[0].0, "frequency_hz");
                assert_eq!(kwargs[0].1, Expr::Number(2e9));
            }
            other => panic!("unexpected AST: {:?}", other),
        }
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(parse_statement("1.5e9").unwrap(), Expr::Number(1.5e9));
        assert_eq!(parse_statement("400e-15").unwrap(), Expr::Number(400e-15));
        assert_eq!(parse_statement(".5").unwrap(), Expr::Number(0.5));
    }

    #[test]
    fn test_attribute_vs_float_dot() {
        // "1.5" is a float, "math.pi" an attribute
        assert!(matches!(
            parse_statement("math.pi").unwrap(),
            Expr::Attr { .. }
        ));
    }

    #[test]
    fn test_rejects_garbage_and_assignment() {
        assert!(parse_statement("x = 1").is_err());
        assert!(parse_statement("nws(").is_err());
        assert!(parse_statement("\"open").is_err());
        assert!(parse_statement("1 +").is_err());
        assert!(parse_statement("foo(a=1, 2)").is_err());
    }
}
