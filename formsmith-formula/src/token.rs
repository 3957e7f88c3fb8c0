//! Formula lexer.
//!
//! Byte-oriented scanner producing the token stream for the recursive
//! descent parser. Identifiers are `[A-Za-z_][A-Za-z0-9_]*`, longest-match,
//! so a generated field id (`field_<ulid>`) lexes as a single reference.

use crate::error::{FormulaError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Number(f64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    LParen,
    RParen,
    Eof,
}

impl Tok {
    /// Token description used in parse error messages.
    pub fn describe(&self) -> String {
        match self {
            Tok::Number(n) => format!("number {n}"),
            Tok::Str(_) => "string literal".to_string(),
            Tok::Ident(name) => format!("identifier '{name}'"),
            Tok::Plus => "'+'".to_string(),
            Tok::Minus => "'-'".to_string(),
            Tok::Star => "'*'".to_string(),
            Tok::Slash => "'/'".to_string(),
            Tok::Lt => "'<'".to_string(),
            Tok::Le => "'<='".to_string(),
            Tok::Gt => "'>'".to_string(),
            Tok::Ge => "'>='".to_string(),
            Tok::EqEq => "'=='".to_string(),
            Tok::NotEq => "'!='".to_string(),
            Tok::LParen => "'('".to_string(),
            Tok::RParen => "')'".to_string(),
            Tok::Eof => "end of formula".to_string(),
        }
    }
}

pub struct Lexer<'a> {
    s: &'a [u8],
    i: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            s: src.as_bytes(),
            i: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.s.get(self.i).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.i += 1;
        }
    }

    fn is_ident_start(b: u8) -> bool {
        matches!(b, b'a'..=b'z' | b'A'..=b'Z' | b'_')
    }

    fn is_ident_cont(b: u8) -> bool {
        Self::is_ident_start(b) || b.is_ascii_digit()
    }

    fn lex_ident(&mut self) -> String {
        let start = self.i;
        while let Some(b) = self.peek() {
            if Self::is_ident_cont(b) {
                self.i += 1;
            } else {
                break;
            }
        }
        // Identifier bytes are ASCII by construction.
        String::from_utf8_lossy(&self.s[start..self.i]).into_owned()
    }

    fn lex_number(&mut self) -> Result<f64> {
        let start = self.i;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.i += 1;
        }
        if self.peek() == Some(b'.') && matches!(self.s.get(self.i + 1), Some(b) if b.is_ascii_digit())
        {
            self.i += 1;
            while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                self.i += 1;
            }
        }
        let text = std::str::from_utf8(&self.s[start..self.i])
            .map_err(|_| FormulaError::parse("invalid number literal"))?;
        text.parse::<f64>()
            .map_err(|_| FormulaError::parse(format!("invalid number literal '{text}'")))
    }

    fn lex_string(&mut self) -> Result<String> {
        // Opening quote already consumed. Content bytes are collected raw
        // and decoded once at the closing quote, so multi-byte UTF-8
        // sequences pass through intact (continuation bytes can never be
        // mistaken for '"' or '\\').
        let mut out: Vec<u8> = Vec::new();
        loop {
            match self.bump() {
                None => return Err(FormulaError::parse("unterminated string literal")),
                Some(b'"') => {
                    return String::from_utf8(out)
                        .map_err(|_| FormulaError::parse("invalid UTF-8 in string literal"));
                }
                Some(b'\\') => match self.bump() {
                    Some(b'"') => out.push(b'"'),
                    Some(b'\\') => out.push(b'\\'),
                    Some(b'n') => out.push(b'\n'),
                    Some(b't') => out.push(b'\t'),
                    other => {
                        return Err(FormulaError::parse(format!(
                            "invalid escape sequence '\\{}'",
                            other.map(|b| b as char).unwrap_or(' ')
                        )))
                    }
                },
                Some(b) => out.push(b),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Tok> {
        self.skip_ws();
        let Some(b) = self.peek() else {
            return Ok(Tok::Eof);
        };

        if Self::is_ident_start(b) {
            return Ok(Tok::Ident(self.lex_ident()));
        }
        if b.is_ascii_digit() {
            return Ok(Tok::Number(self.lex_number()?));
        }

        self.i += 1;
        match b {
            b'"' => Ok(Tok::Str(self.lex_string()?)),
            b'+' => Ok(Tok::Plus),
            b'-' => Ok(Tok::Minus),
            b'*' => Ok(Tok::Star),
            b'/' => Ok(Tok::Slash),
            b'(' => Ok(Tok::LParen),
            b')' => Ok(Tok::RParen),
            b'<' => {
                if self.peek() == Some(b'=') {
                    self.i += 1;
                    Ok(Tok::Le)
                } else {
                    Ok(Tok::Lt)
                }
            }
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.i += 1;
                    Ok(Tok::Ge)
                } else {
                    Ok(Tok::Gt)
                }
            }
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.i += 1;
                    Ok(Tok::EqEq)
                } else {
                    Err(FormulaError::parse("'=' is not an operator; use '=='"))
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.i += 1;
                    Ok(Tok::NotEq)
                } else {
                    Err(FormulaError::parse("'!' is not an operator; use '!='"))
                }
            }
            other => Err(FormulaError::parse(format!(
                "unexpected character '{}'",
                other as char
            ))),
        }
    }
}

/// Lex a whole formula into tokens, ending with [`Tok::Eof`].
pub fn tokenize(src: &str) -> Result<Vec<Tok>> {
    let mut lexer = Lexer::new(src);
    let mut toks = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let done = tok == Tok::Eof;
        toks.push(tok);
        if done {
            return Ok(toks);
        }
    }
}
