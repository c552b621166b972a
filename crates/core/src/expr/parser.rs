//! Recursive-descent parser for LaTeX-flavoured answers.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! statement := sum ('=' sum)?
//! sum       := product (('+' | '-') product)*
//! product   := unary (('*' | '/' | \cdot | \times | \div) unary | power)*
//! unary     := ('-' | '+') unary | power
//! power     := atom ('^' exponent)?
//! exponent  := ('-' | '+') exponent | power
//! atom      := number | name | group | \frac group group | \sqrt [n]? group
//!            | function argument | \pi
//! ```
//!
//! A `power` directly following another factor is implicit multiplication, so
//! `2x^2(x+1)` is `2 * x^2 * (x+1)`.

use super::ast::{Combine, Expr, Func};
use super::rational::Rational;
use super::token::{Token, TokenKind, tokenize_complete};
use super::{MAX_DEPTH, MAX_INPUT_LEN, ParseError};

/// Parse a complete answer string.
///
/// # Errors
///
/// Returns `ParseError` for empty input, unknown characters or commands, unbalanced
/// groups, trailing input, and more than one `=`. Input longer than
/// [`MAX_INPUT_LEN`] bytes or nested deeper than [`MAX_DEPTH`] is rejected.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    if input.len() > MAX_INPUT_LEN {
        return Err(ParseError::TooLong { len: input.len() });
    }
    let tokens = tokenize_complete(input)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parser = Parser {
        tokens: &tokens,
        cursor: 0,
        len: input.len(),
        depth: 0,
    };
    let expr = parser.statement()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(ParseError::UnexpectedToken {
            found: tok.lexeme.to_owned(),
            at: tok.span.start,
        }),
    }
}

struct Parser<'t, 's> {
    tokens: &'t [Token<'s>],
    cursor: usize,
    len: usize,
    depth: usize,
}

impl<'s> Parser<'_, 's> {
    fn peek(&self) -> Option<&Token<'s>> {
        self.tokens.get(self.cursor)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<&Token<'s>> {
        let tok = self.tokens.get(self.cursor);
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn next_or_end(&mut self) -> Result<Token<'s>, ParseError> {
        let len = self.len;
        self.bump().cloned().ok_or(ParseError::UnexpectedEnd { at: len })
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<(), ParseError> {
        let tok = self.next_or_end()?;
        if tok.kind == kind {
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected,
                found: tok.lexeme.to_owned(),
                at: tok.span.start,
            })
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            let at = self.peek().map_or(self.len, |t| t.span.start);
            return Err(ParseError::TooDeep { at });
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn peek_command(&self) -> Option<&'s str> {
        self.peek()
            .filter(|t| t.kind == TokenKind::Command)
            .map(|t| {
                let lexeme: &'s str = t.lexeme;
                &lexeme[1..]
            })
    }

    fn statement(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.sum()?;
        if self.peek_kind() == Some(TokenKind::Eq) {
            self.bump();
            let rhs = self.sum()?;
            return Ok(Expr::binary(Expr::Equation, lhs, rhs));
        }
        Ok(lhs)
    }

    fn sum(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.product()?;
        loop {
            let make: Combine = match self.peek_kind() {
                Some(TokenKind::Add) => Expr::Add,
                Some(TokenKind::Sub) => Expr::Sub,
                _ => return Ok(lhs),
            };
            self.bump();
            let rhs = self.product()?;
            lhs = Expr::binary(make, lhs, rhs);
        }
    }

    fn product(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let explicit: Option<Combine> = match (self.peek_kind(), self.peek_command()) {
                (Some(TokenKind::Mul), _) | (_, Some("cdot" | "times" | "ast")) => Some(Expr::Mul),
                (Some(TokenKind::Div), _) | (_, Some("div")) => Some(Expr::Div),
                _ => None,
            };

            if let Some(make) = explicit {
                self.bump();
                let rhs = self.unary()?;
                lhs = Expr::binary(make, lhs, rhs);
            } else if self.starts_atom() {
                let rhs = self.power()?;
                lhs = Expr::binary(Expr::Mul, lhs, rhs);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Sub) => {
                self.bump();
                Ok(Expr::Neg(Box::new(self.nested(|p| p.unary())?)))
            }
            Some(TokenKind::Add) => {
                self.bump();
                self.nested(|p| p.unary())
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.atom()?;
        if self.peek_kind() == Some(TokenKind::Exp) {
            self.bump();
            let exponent = self.nested(|p| p.exponent())?;
            return Ok(Expr::binary(Expr::Pow, base, exponent));
        }
        Ok(base)
    }

    fn exponent(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Sub) => {
                self.bump();
                Ok(Expr::Neg(Box::new(self.nested(|p| p.exponent())?)))
            }
            Some(TokenKind::Add) => {
                self.bump();
                self.nested(|p| p.exponent())
            }
            _ => self.power(),
        }
    }

    fn starts_atom(&self) -> bool {
        match self.peek_kind() {
            Some(
                TokenKind::Number
                | TokenKind::Name
                | TokenKind::OpenParen
                | TokenKind::OpenBrace
                | TokenKind::OpenBracket,
            ) => true,
            Some(TokenKind::Command) => !matches!(
                self.peek_command(),
                Some("cdot" | "times" | "ast" | "div")
            ),
            _ => false,
        }
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        self.nested(|p| p.atom_inner())
    }

    fn atom_inner(&mut self) -> Result<Expr, ParseError> {
        let tok = self.next_or_end()?;
        match tok.kind {
            TokenKind::Number => Rational::from_decimal(tok.lexeme)
                .map(Expr::Number)
                .ok_or(ParseError::InvalidNumber {
                    lexeme: tok.lexeme.to_owned(),
                    at: tok.span.start,
                }),
            TokenKind::Name => self.named(tok.lexeme, tok.span.start),
            TokenKind::Command => self.named(&tok.lexeme[1..], tok.span.start),
            TokenKind::OpenParen => self.group_tail(TokenKind::CloseParen, "')'"),
            TokenKind::OpenBrace => self.group_tail(TokenKind::CloseBrace, "'}'"),
            TokenKind::OpenBracket => self.group_tail(TokenKind::CloseBracket, "']'"),
            _ => Err(ParseError::UnexpectedToken {
                found: tok.lexeme.to_owned(),
                at: tok.span.start,
            }),
        }
    }

    /// Rest of a bracketed group after its opening token.
    fn group_tail(&mut self, close: TokenKind, expected: &'static str) -> Result<Expr, ParseError> {
        let inner = self.sum()?;
        self.expect(close, expected)?;
        Ok(inner)
    }

    /// Argument of `\frac`, `\sqrt` or a function: a braced group, a parenthesized
    /// group, or a single power such as `\sin x^2`.
    fn argument(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::OpenBrace | TokenKind::OpenParen | TokenKind::OpenBracket) => {
                self.atom()
            }
            _ => self.power(),
        }
    }

    fn named(&mut self, name: &str, at: usize) -> Result<Expr, ParseError> {
        if let Some(func) = Func::from_name(name) {
            let arg = self.argument()?;
            return Ok(Expr::Call(func, Box::new(arg)));
        }

        match name {
            "frac" | "dfrac" | "tfrac" => {
                let num = self.argument()?;
                let den = self.argument()?;
                Ok(Expr::binary(Expr::Div, num, den))
            }
            "sqrt" => {
                let index = if self.peek_kind() == Some(TokenKind::OpenBracket) {
                    self.bump();
                    self.group_tail(TokenKind::CloseBracket, "']'")?
                } else {
                    Expr::Number(Rational::integer(2))
                };
                let radicand = self.argument()?;
                let exponent = Expr::binary(Expr::Div, Expr::Number(Rational::ONE), index);
                Ok(Expr::binary(Expr::Pow, radicand, exponent))
            }
            "exp" => {
                let arg = self.argument()?;
                Ok(Expr::binary(Expr::Pow, Expr::Symbol("e".into()), arg))
            }
            "pi" => Ok(Expr::Symbol("pi".into())),
            _ if name.chars().count() == 1 => Ok(Expr::Symbol(name.to_owned())),
            _ => Err(ParseError::UnknownCommand {
                name: name.to_owned(),
                at,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: i128) -> Expr {
        Expr::Number(Rational::integer(n))
    }

    fn sym(s: &str) -> Expr {
        Expr::Symbol(s.into())
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(
            parse("1 + 2 * 3 - 4").unwrap(),
            Expr::binary(
                Expr::Sub,
                Expr::binary(Expr::Add, num(1), Expr::binary(Expr::Mul, num(2), num(3))),
                num(4),
            )
        );
        assert_eq!(
            parse("2^3^2").unwrap(),
            Expr::binary(Expr::Pow, num(2), Expr::binary(Expr::Pow, num(3), num(2)))
        );
    }

    #[test]
    fn negation_binds_looser_than_power() {
        assert_eq!(
            parse("-x^2").unwrap(),
            Expr::Neg(Box::new(Expr::binary(Expr::Pow, sym("x"), num(2))))
        );
        assert_eq!(
            parse("x^-1").unwrap(),
            Expr::binary(Expr::Pow, sym("x"), Expr::Neg(Box::new(num(1))))
        );
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(
            parse("2x^2").unwrap(),
            Expr::binary(Expr::Mul, num(2), Expr::binary(Expr::Pow, sym("x"), num(2)))
        );
        assert_eq!(
            parse("xy").unwrap(),
            Expr::binary(Expr::Mul, sym("x"), sym("y"))
        );
        assert_eq!(
            parse("3(x+1)").unwrap(),
            Expr::binary(Expr::Mul, num(3), Expr::binary(Expr::Add, sym("x"), num(1)))
        );
    }

    #[test]
    fn latex_constructs() {
        assert_eq!(
            parse(r"\frac{x}{2}").unwrap(),
            Expr::binary(Expr::Div, sym("x"), num(2))
        );
        assert_eq!(
            parse(r"x^{10}").unwrap(),
            Expr::binary(Expr::Pow, sym("x"), num(10))
        );
        assert_eq!(
            parse(r"3 \cdot x").unwrap(),
            Expr::binary(Expr::Mul, num(3), sym("x"))
        );
        assert_eq!(
            parse(r"\sin(x)").unwrap(),
            Expr::Call(Func::Sin, Box::new(sym("x")))
        );
        assert_eq!(parse("cos x").unwrap(), Expr::Call(Func::Cos, Box::new(sym("x"))));
    }

    #[test]
    fn sqrt_becomes_fractional_power() {
        assert_eq!(
            parse(r"\sqrt[3]{x}").unwrap(),
            Expr::binary(
                Expr::Pow,
                sym("x"),
                Expr::binary(Expr::Div, Expr::Number(Rational::ONE), num(3)),
            )
        );
    }

    #[test]
    fn equation_at_top_level() {
        assert_eq!(
            parse("x = 4").unwrap(),
            Expr::binary(Expr::Equation, sym("x"), num(4))
        );
        assert!(matches!(
            parse("x = 4 = y"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(parse("(x = 4)").is_err());
    }

    #[test]
    fn malformed_input_is_an_error_not_a_panic() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert!(matches!(parse("(x + 1"), Err(ParseError::UnexpectedEnd { .. })));
        assert!(matches!(parse("x +"), Err(ParseError::UnexpectedEnd { .. })));
        assert!(matches!(parse(r"\foo{x}"), Err(ParseError::UnknownCommand { .. })));
        assert!(matches!(parse("(x]"), Err(ParseError::Expected { .. })));
        assert!(matches!(parse("*2"), Err(ParseError::UnexpectedToken { .. })));
        assert!(parse("???").is_err());
    }

    #[test]
    fn nesting_is_bounded() {
        let parens = format!("{}x{}", "(".repeat(300), ")".repeat(300));
        assert!(matches!(parse(&parens), Err(ParseError::TooDeep { .. })));

        let negations = format!("{}x", "-".repeat(500));
        assert!(matches!(parse(&negations), Err(ParseError::TooDeep { .. })));

        let tower = format!("{}x", "x^".repeat(500));
        assert!(matches!(parse(&tower), Err(ParseError::TooDeep { .. })));

        let shallow = format!("{}x{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(parse(&shallow).unwrap(), sym("x"));
    }

    #[test]
    fn long_input_is_rejected_before_tokenizing() {
        let long = "x".repeat(MAX_INPUT_LEN + 1);
        assert_eq!(
            parse(&long),
            Err(ParseError::TooLong {
                len: MAX_INPUT_LEN + 1
            })
        );
    }

    #[test]
    fn oversized_number_is_rejected() {
        let huge = "9".repeat(60);
        assert!(matches!(parse(&huge), Err(ParseError::InvalidNumber { .. })));
    }
}
