//! Parser for the list literals embedded in the results `athletes` column
//!
//! The column holds a repr-style rendering of a list of tuples:
//! ```text
//! [('Jane Doe', 'https://olympics.com/en/athletes/jane-doe'), ("Ann O'Neil", '/ath/2')]
//! ```
//! Supported grammar: lists and tuples (trailing comma allowed), single- or
//! double-quoted strings with backslash escapes, integers and floats, and the
//! `None` / `True` / `False` constants. Anything else is a parse error.

use std::fmt;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    /// Numeric literal, kept as written.
    Number(String),
    Str(String),
    /// List or tuple.
    Seq(Vec<Literal>),
}

impl Literal {
    /// Text of a scalar; `None` for the `None` constant and for sequences.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Str(s) | Self::Number(s) => Some(s),
            Self::Bool(true) => Some("True".to_string()),
            Self::Bool(false) => Some("False".to_string()),
            Self::None | Self::Seq(_) => None,
        }
    }
}

/// Error with the byte offset where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralError {
    pub offset: usize,
    pub message: &'static str,
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.offset)
    }
}

impl std::error::Error for LiteralError {}

/// Deepest bracket nesting accepted before parsing gives up.
pub const MAX_DEPTH: usize = 64;

/// Parse one complete literal; trailing non-whitespace is an error.
pub fn parse_literal(input: &str) -> Result<Literal, LiteralError> {
    let mut p = Parser {
        src: input,
        pos: 0,
        depth: 0,
    };
    let value = p.value()?;
    p.skip_ws();
    if p.pos != input.len() {
        return Err(p.error("unexpected trailing input"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn error(&self, message: &'static str) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        self.skip_ws();
        match self.peek() {
            Some('[') => self.seq('[', ']'),
            Some('(') => self.seq('(', ')'),
            Some(q @ ('\'' | '"')) => self.string(q).map(Literal::Str),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.constant(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn seq(&mut self, open: char, close: char) -> Result<Literal, LiteralError> {
        debug_assert_eq!(self.peek(), Some(open));
        if self.depth == MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let items = self.seq_items(close);
        self.depth -= 1;
        items.map(Literal::Seq)
    }

    fn seq_items(&mut self, close: char) -> Result<Vec<Literal>, LiteralError> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(items),
                Some(_) => return Err(self.error("expected ',' or closing bracket")),
                None => return Err(self.error("unterminated sequence")),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        self.bump();
        let mut out = String::new();
        loop {
            let c = self.bump().ok_or_else(|| self.error("unterminated string"))?;
            match c {
                c if c == quote => return Ok(out),
                '\n' => return Err(self.error("newline in string")),
                '\\' => self.escape(&mut out)?,
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let c = self.bump().ok_or_else(|| self.error("unterminated escape"))?;
        match c {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0'..='7' => out.push(self.octal_char(c)),
            'x' => out.push(self.hex_char(2)?),
            'u' => out.push(self.hex_char(4)?),
            'U' => out.push(self.hex_char(8)?),
            // Unknown escapes keep the backslash
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    /// Up to three octal digits, the first already consumed.
    fn octal_char(&mut self, first: char) -> char {
        let mut code = first.to_digit(8).unwrap_or(0);
        for _ in 0..2 {
            match self.peek().and_then(|c| c.to_digit(8)) {
                Some(d) => {
                    code = code * 8 + d;
                    self.pos += 1;
                }
                None => break,
            }
        }
        // At most 0o777, always a valid scalar value
        char::from_u32(code).unwrap_or('\0')
    }

    fn hex_char(&mut self, digits: usize) -> Result<char, LiteralError> {
        let end = self.pos + digits;
        let hex = self
            .src
            .get(self.pos..end)
            .ok_or_else(|| self.error("truncated hex escape"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid hex escape"))?;
        let c = char::from_u32(code).ok_or_else(|| self.error("invalid code point"))?;
        self.pos = end;
        Ok(c)
    }

    fn number(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.' | '_') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.src[start..self.pos];
        let cleaned: String = text.chars().filter(|&c| c != '_').collect();
        let valid = cleaned.parse::<i64>().is_ok()
            || (cleaned.parse::<f64>().is_ok()
                && !cleaned.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E'));
        if !valid {
            self.pos = start;
            return Err(self.error("invalid number"));
        }
        Ok(Literal::Number(cleaned))
    }

    fn constant(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        match &self.src[start..self.pos] {
            "None" => Ok(Literal::None),
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            _ => {
                self.pos = start;
                Err(self.error("unknown name"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Literal {
        Literal::Str(v.to_string())
    }

    #[test]
    fn list_of_tuples() {
        let v = parse_literal("[('Jane Doe', '/ath/1'), ('John Roe', '/ath/2')]").unwrap();
        assert_eq!(
            v,
            Literal::Seq(vec![
                Literal::Seq(vec![s("Jane Doe"), s("/ath/1")]),
                Literal::Seq(vec![s("John Roe"), s("/ath/2")]),
            ])
        );
    }

    #[test]
    fn empty_list_and_trailing_comma() {
        assert_eq!(parse_literal("[]").unwrap(), Literal::Seq(vec![]));
        assert_eq!(
            parse_literal("[('a',), ]").unwrap(),
            Literal::Seq(vec![Literal::Seq(vec![s("a")])])
        );
    }

    #[test]
    fn double_quoted_with_apostrophe() {
        let v = parse_literal(r#"[("Ann O'Neil", '/ath/3')]"#).unwrap();
        assert_eq!(
            v,
            Literal::Seq(vec![Literal::Seq(vec![s("Ann O'Neil"), s("/ath/3")])])
        );
    }

    #[test]
    fn escapes() {
        assert_eq!(parse_literal(r"'O\'Brien'").unwrap(), s("O'Brien"));
        assert_eq!(parse_literal(r"'Zo\xe9'").unwrap(), s("Zoé"));
        assert_eq!(parse_literal(r"'Åsa'").unwrap(), s("Åsa"));
        assert_eq!(parse_literal(r"'a\\b'").unwrap(), s(r"a\b"));
        assert_eq!(parse_literal(r"'a\qb'").unwrap(), s(r"a\qb"));
    }

    #[test]
    fn octal_escapes() {
        assert_eq!(parse_literal(r"'a\012b'").unwrap(), s("a\nb"));
        assert_eq!(parse_literal(r"'a\0b'").unwrap(), s("a\0b"));
        assert_eq!(parse_literal(r"'\101\1011'").unwrap(), s("AA1"));
        assert_eq!(parse_literal(r"'\08'").unwrap(), s("\u{0}8"));
        assert_eq!(parse_literal(r"'\777'").unwrap(), s("\u{1ff}"));
    }

    #[test]
    fn nesting_limit() {
        let ok = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_literal(&ok).is_ok());

        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert_eq!(parse_literal(&deep).unwrap_err().message, "nesting too deep");

        let err = parse_literal(&"[".repeat(200_000)).unwrap_err();
        assert_eq!(err.message, "nesting too deep");
        assert_eq!(err.offset, MAX_DEPTH);
    }

    #[test]
    fn unicode_passthrough() {
        assert_eq!(parse_literal("'Łukasz Żuk'").unwrap(), s("Łukasz Żuk"));
    }

    #[test]
    fn numbers_and_constants() {
        assert_eq!(
            parse_literal("[1, -2.5, 1e3, None, True, False]").unwrap(),
            Literal::Seq(vec![
                Literal::Number("1".into()),
                Literal::Number("-2.5".into()),
                Literal::Number("1e3".into()),
                Literal::None,
                Literal::Bool(true),
                Literal::Bool(false),
            ])
        );
    }

    #[test]
    fn malformed_inputs_error() {
        for bad in [
            "[('a', 'b')",
            "[('a' 'b')]",
            "['unterminated]",
            "[nan]",
            "[1abc]",
            "[('a', 'b')] trailing",
            "[{'a': 1}]",
            "",
        ] {
            assert!(parse_literal(bad).is_err(), "should reject {bad:?}");
        }
    }

    #[test]
    fn error_reports_offset() {
        let err = parse_literal("[1, ?]").unwrap_err();
        assert_eq!(err.offset, 4);
        assert!(err.to_string().contains("byte 4"));
    }

    #[test]
    fn into_text() {
        assert_eq!(s("x").into_text(), Some("x".into()));
        assert_eq!(Literal::Number("7".into()).into_text(), Some("7".into()));
        assert_eq!(Literal::None.into_text(), None);
        assert_eq!(Literal::Seq(vec![]).into_text(), None);
    }
}
