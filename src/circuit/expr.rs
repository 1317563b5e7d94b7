//! Gate parameter expressions.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := '-' unary | '+' unary | atom
//! atom   := number | 'pi' | '(' expr ')'
//! ```

use std::f64::consts::PI;
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// Deepest nesting of parentheses and unary signs accepted.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("unexpected character '{0}' in expression")]
    UnexpectedChar(char),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("trailing input after expression")]
    Trailing,

    #[error("expression nested too deeply")]
    TooDeep,
}

/// Evaluate `input` to a number. `pi` is the only constant.
pub fn evaluate(input: &str) -> Result<f64, ExprError> {
    let mut parser = Parser {
        chars: input.chars().peekable(),
        depth: 0,
    };
    let value = parser.expr()?;
    parser.skip_whitespace();
    if parser.chars.peek().is_some() {
        return Err(ExprError::Trailing);
    }
    Ok(value)
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    depth: usize,
}

impl Parser<'_> {
    fn nested(&mut self, parse: fn(&mut Self) -> Result<f64, ExprError>) -> Result<f64, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.chars.peek().copied()
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.chars.next();
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.unary()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.chars.next();
            let rhs = self.unary()?;
            value = if op == '*' { value * rhs } else { value / rhs };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, ExprError> {
        match self.peek() {
            Some('-') => {
                self.chars.next();
                Ok(-self.nested(Self::unary)?)
            }
            Some('+') => {
                self.chars.next();
                self.nested(Self::unary)
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<f64, ExprError> {
        match self.peek() {
            Some('(') => {
                self.chars.next();
                let value = self.nested(Self::expr)?;
                match self.peek() {
                    Some(')') => {
                        self.chars.next();
                        Ok(value)
                    }
                    Some(c) => Err(ExprError::UnexpectedChar(c)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(c) = self.chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
                    ident.push(c);
                }
                match ident.as_str() {
                    "pi" => Ok(PI),
                    _ => Err(ExprError::UnknownIdentifier(ident)),
                }
            }
            Some(c) => Err(ExprError::UnexpectedChar(c)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<f64, ExprError> {
        let mut text = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_digit() || *c == '.') {
            text.push(c);
        }
        if let Some(e) = self.chars.next_if(|c| *c == 'e' || *c == 'E') {
            text.push(e);
            if let Some(sign) = self.chars.next_if(|c| *c == '+' || *c == '-') {
                text.push(sign);
            }
            while let Some(c) = self.chars.next_if(|c| c.is_ascii_digit()) {
                text.push(c);
            }
        }
        text.parse().map_err(|_| ExprError::InvalidNumber(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(evaluate("3"), Ok(3.0));
        assert_eq!(evaluate(" 0.25 "), Ok(0.25));
        assert_eq!(evaluate("1e-3"), Ok(0.001));
    }

    #[test]
    fn test_pi_and_precedence() {
        assert_eq!(evaluate("pi"), Ok(PI));
        assert_eq!(evaluate("pi/2"), Ok(PI / 2.0));
        assert_eq!(evaluate("1 + 2 * 3"), Ok(7.0));
        assert_eq!(evaluate("(1 + 2) * 3"), Ok(9.0));
        assert_eq!(evaluate("-pi/4"), Ok(-PI / 4.0));
        assert_eq!(evaluate("-(1 - 3)"), Ok(2.0));
        assert_eq!(evaluate("3*pi/4"), Ok(3.0 * PI / 4.0));
    }

    #[test]
    fn test_errors() {
        assert_eq!(evaluate(""), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("(1"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("1 2"), Err(ExprError::Trailing));
        assert_eq!(evaluate("tau"), Err(ExprError::UnknownIdentifier("tau".to_string())));
        assert_eq!(evaluate("1 ^ 2"), Err(ExprError::Trailing));
        assert_eq!(evaluate("* 2"), Err(ExprError::UnexpectedChar('*')));
        assert!(matches!(evaluate("1.2.3"), Err(ExprError::InvalidNumber(_))));
    }

    #[test]
    fn test_nesting_limit() {
        let parens = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(evaluate(&parens), Ok(1.0));

        let too_deep = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(evaluate(&too_deep), Err(ExprError::TooDeep));

        let signs = format!("{}1", "-".repeat(100_000));
        assert_eq!(evaluate(&signs), Err(ExprError::TooDeep));
    }
}
