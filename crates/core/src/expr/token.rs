use logos::Logos;
use std::ops::Range;

use super::ParseError;

/// The different kinds of tokens produced by the tokenizer.
#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    #[regex(r"[0-9]+(\.[0-9]+)?|\.[0-9]+")]
    Number,

    #[regex(r"[a-zA-Z]+")]
    Name,

    #[regex(r"\\[a-zA-Z]+")]
    Command,

    /// `\,`, `\;`, `\:`, `\!` and `\ `.
    #[regex(r"\\[,;:! ]")]
    Spacing,

    #[token("+")]
    Add,

    #[token("-")]
    #[token("\u{2212}")]
    Sub,

    #[token("*")]
    #[token("\u{b7}")]
    #[token("\u{d7}")]
    Mul,

    #[token("/")]
    #[token("\u{f7}")]
    Div,

    #[token("^")]
    #[token("**")]
    Exp,

    #[token("=")]
    Eq,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    #[token("{")]
    OpenBrace,

    #[token("}")]
    CloseBrace,

    #[token("[")]
    OpenBracket,

    #[token("]")]
    CloseBracket,
}

/// A token produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'source> {
    /// The region of the source that this token originated from.
    pub span: Range<usize>,

    pub kind: TokenKind,

    /// The raw lexeme.
    pub lexeme: &'source str,
}

/// Names that read as a single word instead of a product of single-letter variables.
pub(crate) const WORDS: &[&str] = &["sin", "cos", "tan", "ln", "log", "exp", "sqrt", "pi"];

/// LaTeX commands that only affect layout.
const LAYOUT_COMMANDS: &[&str] = &["left", "right", "displaystyle", "textstyle", "big", "Big"];

/// Tokenize the whole input up front so the parser can look ahead freely.
///
/// Layout-only tokens are dropped here. Multi-letter names that are not known words
/// are split into one token per letter, so `xy` reads as `x` times `y`.
///
/// # Errors
///
/// Returns `ParseError::UnexpectedChar` on any character the lexer does not know.
pub fn tokenize_complete(input: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();

    while let Some(kind) = lexer.next() {
        let span = lexer.span();
        let lexeme = lexer.slice();
        let Ok(kind) = kind else {
            let ch = lexeme.chars().next().unwrap_or('?');
            return Err(ParseError::UnexpectedChar { ch, at: span.start });
        };

        match kind {
            TokenKind::Spacing => {}
            TokenKind::Command if LAYOUT_COMMANDS.contains(&&lexeme[1..]) => {}
            TokenKind::Name if !WORDS.contains(&lexeme) => {
                for (offset, ch) in lexeme.char_indices() {
                    let start = span.start + offset;
                    let end = start + ch.len_utf8();
                    tokens.push(Token {
                        span: start..end,
                        kind,
                        lexeme: &input[start..end],
                    });
                }
            }
            _ => tokens.push(Token { span, kind, lexeme }),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<(TokenKind, &str)> {
        tokenize_complete(input)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.lexeme))
            .collect()
    }

    #[test]
    fn basic_expr() {
        assert_eq!(
            kinds("1 + 2.5"),
            [
                (TokenKind::Number, "1"),
                (TokenKind::Add, "+"),
                (TokenKind::Number, "2.5"),
            ]
        );
    }

    #[test]
    fn splits_unknown_names_into_letters() {
        assert_eq!(
            kinds("xy"),
            [(TokenKind::Name, "x"), (TokenKind::Name, "y")]
        );
        assert_eq!(kinds("sin"), [(TokenKind::Name, "sin")]);
    }

    #[test]
    fn drops_layout_commands() {
        assert_eq!(
            kinds(r"\left( x \right)\,"),
            [
                (TokenKind::OpenParen, "("),
                (TokenKind::Name, "x"),
                (TokenKind::CloseParen, ")"),
            ]
        );
    }

    #[test]
    fn latex_fraction() {
        assert_eq!(
            kinds(r"\frac{1}{2}"),
            [
                (TokenKind::Command, r"\frac"),
                (TokenKind::OpenBrace, "{"),
                (TokenKind::Number, "1"),
                (TokenKind::CloseBrace, "}"),
                (TokenKind::OpenBrace, "{"),
                (TokenKind::Number, "2"),
                (TokenKind::CloseBrace, "}"),
            ]
        );
    }

    #[test]
    fn unknown_characters_fail() {
        assert_eq!(
            tokenize_complete("???"),
            Err(ParseError::UnexpectedChar { ch: '?', at: 0 })
        );
    }
}
