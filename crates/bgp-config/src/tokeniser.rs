//! Tokeniser for the neighbor configuration file.
//!
//! The grammar is whitespace-insensitive: words, quoted strings, braces,
//! brackets and semicolons. `#` starts a comment running to the end of the
//! line. Every token carries the line and column it started on so parse
//! errors can point at the offending text.

use std::fmt;

/// Position of a token in the source text (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    /// Line number.
    pub line: usize,
    /// Column number, counted in characters.
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "line {}, column {}", self.line, self.column)
    }
}

/// Lexical token kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word such as `neighbor` or `10.0.0.1`.
    Word(String),
    /// Double-quoted string with the quotes removed.
    Quoted(String),
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `;`
    Semicolon,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(word) => formatter.write_str(word),
            Self::Quoted(text) => write!(formatter, "\"{text}\""),
            Self::OpenBrace => formatter.write_str("{"),
            Self::CloseBrace => formatter.write_str("}"),
            Self::OpenBracket => formatter.write_str("["),
            Self::CloseBracket => formatter.write_str("]"),
            Self::Semicolon => formatter.write_str(";"),
        }
    }
}

/// A token and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind and text.
    pub kind: TokenKind,
    /// Start position.
    pub location: Location,
}

/// Raised when a quoted string never terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnterminatedString {
    /// Position of the opening quote.
    pub location: Location,
}

/// Splits configuration text into located tokens.
///
/// # Errors
///
/// Returns [`UnterminatedString`] when a `"` has no matching close quote on
/// the same line.
pub fn tokenise(source: &str) -> Result<Vec<Token>, UnterminatedString> {
    let mut tokens = Vec::new();
    for (index, line) in source.lines().enumerate() {
        tokenise_line(line, index + 1, &mut tokens)?;
    }
    Ok(tokens)
}

fn tokenise_line(
    line: &str,
    line_number: usize,
    tokens: &mut Vec<Token>,
) -> Result<(), UnterminatedString> {
    let mut chars = line.chars().enumerate().peekable();
    while let Some((index, current)) = chars.next() {
        let location = Location {
            line: line_number,
            column: index + 1,
        };
        let kind = match current {
            '#' => break,
            c if c.is_whitespace() => continue,
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            ';' => TokenKind::Semicolon,
            '"' => {
                let mut text = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == '"' {
                        closed = true;
                        break;
                    }
                    text.push(next);
                }
                if !closed {
                    return Err(UnterminatedString { location });
                }
                TokenKind::Quoted(text)
            }
            first => {
                let mut word = String::from(first);
                while let Some((_, next)) = chars.peek() {
                    if next.is_whitespace() || "{}[];#\"".contains(*next) {
                        break;
                    }
                    word.push(*next);
                    chars.next();
                }
                TokenKind::Word(word)
            }
        };
        tokens.push(Token { kind, location });
    }
    Ok(())
}
