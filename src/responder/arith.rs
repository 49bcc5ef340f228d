//! Safe arithmetic evaluation for spans matched out of chat text.
//!
//! Input is tokenized against a closed alphabet (digits, `.`, `+ - * / % ^`,
//! parentheses, whitespace) and parsed into an [`Expr`] tree whose only node
//! kinds are numbers, unary `+`/`-` and the six binary operators. Anything
//! else is rejected before evaluation starts.

/// Maximum parenthesis / unary nesting accepted by the parser.
const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinOp {
    pub fn symbol(self) -> char {
        match self {
            BinOp::Add => '+',
            BinOp::Sub => '-',
            BinOp::Mul => '*',
            BinOp::Div => '/',
            BinOp::Mod => '%',
            BinOp::Pow => '^',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn binary(op: BinOp, lhs: f64, rhs: f64) -> Self {
        Expr::Binary(op, Box::new(Expr::Num(lhs)), Box::new(Expr::Num(rhs)))
    }

    /// Evaluate the tree. Division or modulo by zero and non-finite results
    /// are errors rather than `inf`/`NaN`.
    pub fn eval(&self) -> Result<f64, ArithError> {
        let value = match self {
            Expr::Num(n) => *n,
            Expr::Unary(UnaryOp::Plus, inner) => inner.eval()?,
            Expr::Unary(UnaryOp::Neg, inner) => -inner.eval()?,
            Expr::Binary(op, lhs, rhs) => {
                let a = lhs.eval()?;
                let b = rhs.eval()?;
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => {
                        if b == 0.0 {
                            return Err(ArithError::DivisionByZero);
                        }
                        a / b
                    }
                    BinOp::Mod => {
                        if b == 0.0 {
                            return Err(ArithError::DivisionByZero);
                        }
                        // Floored modulo: the result takes the divisor's sign.
                        a - b * (a / b).floor()
                    }
                    BinOp::Pow => a.powf(b),
                }
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(ArithError::NonFinite)
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArithError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("malformed number {0:?}")]
    BadNumber(String),
    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),
    #[error("expression ended early")]
    UnexpectedEnd,
    #[error("expression nested too deeply")]
    TooDeep,
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Op(char),
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ArithError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &input[start..end];
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ArithError::BadNumber(literal.to_string()))?;
                tokens.push(Token::Num(value));
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            other => return Err(ArithError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser:
///
/// ```text
/// expr  := term (('+' | '-') term)*
/// term  := unary (('*' | '/' | '%') unary)*
/// unary := ('+' | '-') unary | power
/// power := atom ('^' unary)?
/// atom  := NUMBER | '(' expr ')'
/// ```
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn descend(&mut self) -> Result<(), ArithError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ArithError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, ArithError> {
        let mut lhs = self.term()?;
        while let Some(Token::Op(c @ ('+' | '-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            let op = if c == '+' { BinOp::Add } else { BinOp::Sub };
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ArithError> {
        let mut lhs = self.unary()?;
        while let Some(Token::Op(c @ ('*' | '/' | '%'))) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            let op = match c {
                '*' => BinOp::Mul,
                '/' => BinOp::Div,
                _ => BinOp::Mod,
            };
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ArithError> {
        match self.peek() {
            Some(Token::Op(c @ ('+' | '-'))) => {
                self.pos += 1;
                self.descend()?;
                let inner = self.unary()?;
                self.depth -= 1;
                let op = if c == '+' { UnaryOp::Plus } else { UnaryOp::Neg };
                Ok(Expr::Unary(op, Box::new(inner)))
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, ArithError> {
        let base = self.atom()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.pos += 1;
            self.descend()?;
            let exponent = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, ArithError> {
        let at = self.pos;
        match self.next() {
            Some(Token::Num(n)) => Ok(Expr::Num(n)),
            Some(Token::LParen) => {
                self.descend()?;
                let inner = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(_) => Err(ArithError::UnexpectedToken(self.pos - 1)),
                    None => Err(ArithError::UnexpectedEnd),
                }
            }
            Some(_) => Err(ArithError::UnexpectedToken(at)),
            None => Err(ArithError::UnexpectedEnd),
        }
    }
}

/// Parse an expression into an operator tree.
pub fn parse(input: &str) -> Result<Expr, ArithError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ArithError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(ArithError::UnexpectedToken(parser.pos));
    }
    Ok(expr)
}

/// Parse and evaluate in one step.
pub fn evaluate(input: &str) -> Result<f64, ArithError> {
    parse(input)?.eval()
}

/// Integers print without decimals, everything else rounded to 6 places.
pub fn format_number(value: f64) -> String {
    let rounded = if value.fract() == 0.0 {
        value
    } else {
        (value * 1e6).round() / 1e6
    };

    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respects_precedence() {
        assert_eq!(evaluate("2+3*4").unwrap(), 14.0);
        assert_eq!(evaluate("(2+3)*4").unwrap(), 20.0);
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate("2 ^ 3 ^ 2").unwrap(), 512.0);
    }

    #[test]
    fn power_binds_tighter_than_unary_minus() {
        assert_eq!(evaluate("-2^2").unwrap(), -4.0);
        assert_eq!(evaluate("2^-1").unwrap(), 0.5);
    }

    #[test]
    fn modulo_is_floored() {
        assert_eq!(evaluate("7 % 3").unwrap(), 1.0);
        assert_eq!(evaluate("-7 % 3").unwrap(), 2.0);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(evaluate("10 / 0"), Err(ArithError::DivisionByZero));
        assert_eq!(evaluate("5 % 0"), Err(ArithError::DivisionByZero));
    }

    #[test]
    fn rejects_anything_outside_the_grammar() {
        assert!(matches!(
            evaluate("2 + x"),
            Err(ArithError::UnexpectedChar('x'))
        ));
        assert!(matches!(evaluate("2 +"), Err(ArithError::UnexpectedEnd)));
        assert!(matches!(evaluate("(2 + 3"), Err(ArithError::UnexpectedEnd)));
        assert!(matches!(evaluate("2 3"), Err(ArithError::UnexpectedToken(_))));
        assert!(matches!(evaluate("1.2.3"), Err(ArithError::BadNumber(_))));
        assert_eq!(evaluate("   "), Err(ArithError::Empty));
    }

    #[test]
    fn overflow_is_rejected() {
        assert_eq!(evaluate("10 ^ 400"), Err(ArithError::NonFinite));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let input = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(evaluate(&input), Err(ArithError::TooDeep));
    }

    #[test]
    fn formats_integers_and_decimals() {
        assert_eq!(format_number(19.0), "19");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(10.0 / 3.0), "3.333333");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
    }
}
