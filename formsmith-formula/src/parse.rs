//! Recursive descent parser for the formula grammar.
//!
//! ```text
//! comparison := additive (("<"|"<="|">"|">="|"=="|"!=") additive)*
//! additive   := term (("+"|"-") term)*
//! term       := unary (("*"|"/") unary)*
//! unary      := "-" unary | primary
//! primary    := NUMBER | STRING | IDENT | "(" comparison ")"
//! ```

use crate::ast::{BinOp, Expr};
use crate::error::{FormulaError, Result};
use crate::token::{tokenize, Tok};

/// Parse a formula into an expression tree.
pub fn parse(src: &str) -> Result<Expr> {
    let toks = tokenize(src)?;
    let mut parser = Parser { toks, i: 0 };
    let expr = parser.comparison()?;
    match parser.peek() {
        Tok::Eof => Ok(expr),
        other => Err(FormulaError::parse(format!(
            "unexpected {} after expression",
            other.describe()
        ))),
    }
}

struct Parser {
    toks: Vec<Tok>,
    i: usize,
}

impl Parser {
    fn peek(&self) -> &Tok {
        // tokenize always appends Eof, so the index never runs past the end.
        &self.toks[self.i.min(self.toks.len() - 1)]
    }

    fn bump(&mut self) -> Tok {
        let tok = self.toks[self.i.min(self.toks.len() - 1)].clone();
        if self.i < self.toks.len() - 1 {
            self.i += 1;
        }
        tok
    }

    fn eat(&mut self, expected: &Tok) -> Result<()> {
        if self.peek() == expected {
            self.bump();
            Ok(())
        } else {
            Err(FormulaError::parse(format!(
                "expected {}, found {}",
                expected.describe(),
                self.peek().describe()
            )))
        }
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                Tok::Lt => BinOp::Lt,
                Tok::Le => BinOp::Le,
                Tok::Gt => BinOp::Gt,
                Tok::Ge => BinOp::Ge,
                Tok::EqEq => BinOp::Eq,
                Tok::NotEq => BinOp::Ne,
                _ => return Ok(lhs),
            };
            self.bump();
            let rhs = self.additive()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Tok::Plus => BinOp::Add,
                Tok::Minus => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.bump();
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn term(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Tok::Star => BinOp::Mul,
                Tok::Slash => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.bump();
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.peek() == &Tok::Minus {
            self.bump();
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.bump() {
            Tok::Number(n) => Ok(Expr::Number(n)),
            Tok::Str(s) => Ok(Expr::Text(s)),
            Tok::Ident(name) => Ok(Expr::Ref(name)),
            Tok::LParen => {
                let inner = self.comparison()?;
                self.eat(&Tok::RParen)?;
                Ok(inner)
            }
            other => Err(FormulaError::parse(format!(
                "expected a value, found {}",
                other.describe()
            ))),
        }
    }
}
