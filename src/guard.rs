//! Guard expressions for conditional blocks
//!
//! `#ifdef NAME` and `#ifndef NAME` become [`Guard::Defined`] and its negation.
//! `#if` and `#elif` take a small expression language:
//!
//! ```text
//! expr    := and ("||" and)*
//! and     := unary ("&&" unary)*
//! unary   := "!" unary | primary
//! primary := "defined" "(" NAME ")" | "(" expr ")" | operand (("==" | "!=") operand)?
//! operand := NAME | NUMBER
//! ```

use std::collections::BTreeMap;

/// Read access to the symbols visible to guards
pub trait SymbolTable {
    /// Value of a defined symbol, or `None` if it is undefined
    fn lookup(&self, name: &str) -> Option<&str>;
}

impl SymbolTable for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Name(String),
    Number(i64),
}

impl Operand {
    /// Text the operand stands for: a defined name's value, else its own spelling
    fn resolve<S: SymbolTable + ?Sized>(&self, symbols: &S) -> String {
        match self {
            Operand::Name(name) => symbols
                .lookup(name)
                .map(str::to_string)
                .unwrap_or_else(|| name.clone()),
            Operand::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
}

/// Boolean condition over the symbol table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// `defined(NAME)` / `#ifdef NAME`
    Defined(String),
    /// Bare operand: a name defined to something other than `""` or `"0"`, or a non-zero number
    Truthy(Operand),
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    Not(Box<Guard>),
    And(Box<Guard>, Box<Guard>),
    Or(Box<Guard>, Box<Guard>),
}

impl Guard {
    pub fn defined(name: impl Into<String>) -> Self {
        Guard::Defined(name.into())
    }

    pub fn not_defined(name: impl Into<String>) -> Self {
        Guard::Not(Box::new(Guard::Defined(name.into())))
    }

    /// Parse an `#if` expression
    pub fn parse(expr: &str) -> Result<Guard, String> {
        let tokens = tokenize(expr)?;
        if tokens.is_empty() {
            return Err("empty condition".to_string());
        }
        let mut parser = ExprParser { tokens, pos: 0 };
        let guard = parser.parse_or()?;
        match parser.peek() {
            None => Ok(guard),
            Some(token) => Err(format!("unexpected '{}' in condition", token.text())),
        }
    }

    pub fn evaluate<S: SymbolTable + ?Sized>(&self, symbols: &S) -> bool {
        match self {
            Guard::Defined(name) => symbols.lookup(name).is_some(),
            Guard::Truthy(Operand::Name(name)) => {
                matches!(symbols.lookup(name), Some(v) if !v.is_empty() && v != "0")
            }
            Guard::Truthy(Operand::Number(n)) => *n != 0,
            Guard::Compare { left, op, right } => {
                let equal = left.resolve(symbols) == right.resolve(symbols);
                match op {
                    CompareOp::Eq => equal,
                    CompareOp::Ne => !equal,
                }
            }
            Guard::Not(inner) => !inner.evaluate(symbols),
            Guard::And(a, b) => a.evaluate(symbols) && b.evaluate(symbols),
            Guard::Or(a, b) => a.evaluate(symbols) || b.evaluate(symbols),
        }
    }

    /// Symbol names the guard refers to, in order of appearance
    ///
    /// The right-hand side of a comparison is normally a literal
    /// (`MOZ_UPDATE_CHANNEL == release`) and is not reported.
    pub fn referenced_symbols(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_symbols(&mut names);
        names
    }

    fn collect_symbols<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Guard::Defined(name) | Guard::Truthy(Operand::Name(name)) => names.push(name),
            Guard::Truthy(Operand::Number(_)) => {}
            Guard::Compare { left, .. } => {
                if let Operand::Name(name) = left {
                    names.push(name);
                }
            }
            Guard::Not(inner) => inner.collect_symbols(names),
            Guard::And(a, b) | Guard::Or(a, b) => {
                a.collect_symbols(names);
                b.collect_symbols(names);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ExprToken {
    Name(String),
    Number(i64),
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    LeftParen,
    RightParen,
}

impl ExprToken {
    fn text(&self) -> String {
        match self {
            ExprToken::Name(name) => name.clone(),
            ExprToken::Number(n) => n.to_string(),
            ExprToken::Bang => "!".to_string(),
            ExprToken::AndAnd => "&&".to_string(),
            ExprToken::OrOr => "||".to_string(),
            ExprToken::EqEq => "==".to_string(),
            ExprToken::NotEq => "!=".to_string(),
            ExprToken::LeftParen => "(".to_string(),
            ExprToken::RightParen => ")".to_string(),
        }
    }
}

fn tokenize(expr: &str) -> Result<Vec<ExprToken>, String> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(ExprToken::LeftParen);
            }
            ')' => {
                chars.next();
                tokens.push(ExprToken::RightParen);
            }
            '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(ExprToken::NotEq);
                } else {
                    tokens.push(ExprToken::Bang);
                }
            }
            '&' | '|' | '=' => {
                chars.next();
                if chars.next_if_eq(&c).is_none() {
                    return Err(format!("expected '{}{}' in condition", c, c));
                }
                tokens.push(match c {
                    '&' => ExprToken::AndAnd,
                    '|' => ExprToken::OrOr,
                    _ => ExprToken::EqEq,
                });
            }
            '0'..='9' => {
                let mut digits = String::new();
                while let Some(d) = chars.next_if(|d| d.is_ascii_digit()) {
                    digits.push(d);
                }
                let n = digits
                    .parse::<i64>()
                    .map_err(|_| format!("number out of range in condition: {}", digits))?;
                tokens.push(ExprToken::Number(n));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(d) = chars.next_if(|d| d.is_ascii_alphanumeric() || *d == '_') {
                    name.push(d);
                }
                tokens.push(ExprToken::Name(name));
            }
            other => return Err(format!("unexpected character '{}' in condition", other)),
        }
    }

    Ok(tokens)
}

struct ExprParser {
    tokens: Vec<ExprToken>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&ExprToken> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<ExprToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: ExprToken) -> Result<(), String> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(format!(
                "expected '{}' in condition, got '{}'",
                expected.text(),
                token.text()
            )),
            None => Err(format!(
                "expected '{}' in condition, got end of line",
                expected.text()
            )),
        }
    }

    fn parse_or(&mut self) -> Result<Guard, String> {
        let mut guard = self.parse_and()?;
        while self.peek() == Some(&ExprToken::OrOr) {
            self.next();
            let rhs = self.parse_and()?;
            guard = Guard::Or(Box::new(guard), Box::new(rhs));
        }
        Ok(guard)
    }

    fn parse_and(&mut self) -> Result<Guard, String> {
        let mut guard = self.parse_unary()?;
        while self.peek() == Some(&ExprToken::AndAnd) {
            self.next();
            let rhs = self.parse_unary()?;
            guard = Guard::And(Box::new(guard), Box::new(rhs));
        }
        Ok(guard)
    }

    fn parse_unary(&mut self) -> Result<Guard, String> {
        if self.peek() == Some(&ExprToken::Bang) {
            self.next();
            let inner = self.parse_unary()?;
            return Ok(Guard::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Guard, String> {
        match self.next() {
            Some(ExprToken::LeftParen) => {
                let guard = self.parse_or()?;
                self.expect(ExprToken::RightParen)?;
                Ok(guard)
            }
            Some(ExprToken::Name(name)) if name == "defined" => {
                self.expect(ExprToken::LeftParen)?;
                let symbol = match self.next() {
                    Some(ExprToken::Name(symbol)) => symbol,
                    _ => return Err("expected symbol name inside defined()".to_string()),
                };
                self.expect(ExprToken::RightParen)?;
                Ok(Guard::Defined(symbol))
            }
            Some(ExprToken::Name(name)) => self.parse_comparison(Operand::Name(name)),
            Some(ExprToken::Number(n)) => self.parse_comparison(Operand::Number(n)),
            Some(token) => Err(format!("unexpected '{}' in condition", token.text())),
            None => Err("unexpected end of condition".to_string()),
        }
    }

    fn parse_comparison(&mut self, left: Operand) -> Result<Guard, String> {
        let op = match self.peek() {
            Some(ExprToken::EqEq) => CompareOp::Eq,
            Some(ExprToken::NotEq) => CompareOp::Ne,
            _ => return Ok(Guard::Truthy(left)),
        };
        self.next();
        let right = match self.next() {
            Some(ExprToken::Name(name)) => Operand::Name(name),
            Some(ExprToken::Number(n)) => Operand::Number(n),
            Some(token) => return Err(format!("expected operand, got '{}'", token.text())),
            None => return Err("expected operand, got end of line".to_string()),
        };
        Ok(Guard::Compare { left, op, right })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defined() {
        let table = symbols(&[("XP_MACOSX", "1")]);
        assert!(Guard::defined("XP_MACOSX").evaluate(&table));
        assert!(!Guard::defined("XP_WIN").evaluate(&table));
        assert!(Guard::not_defined("XP_WIN").evaluate(&table));
    }

    #[test]
    fn test_parse_defined_call() {
        let guard = Guard::parse("defined(XP_UNIX) && !defined(XP_MACOSX)").unwrap();
        assert!(guard.evaluate(&symbols(&[("XP_UNIX", "1")])));
        assert!(!guard.evaluate(&symbols(&[("XP_UNIX", "1"), ("XP_MACOSX", "1")])));
        assert!(!guard.evaluate(&symbols(&[])));
    }

    #[test]
    fn test_truthiness() {
        let guard = Guard::parse("MOZ_UPDATE_CHANNEL_BETA").unwrap();
        assert!(guard.evaluate(&symbols(&[("MOZ_UPDATE_CHANNEL_BETA", "1")])));
        assert!(!guard.evaluate(&symbols(&[("MOZ_UPDATE_CHANNEL_BETA", "0")])));
        assert!(!guard.evaluate(&symbols(&[("MOZ_UPDATE_CHANNEL_BETA", "")])));
        assert!(!guard.evaluate(&symbols(&[])));
        assert!(Guard::parse("1").unwrap().evaluate(&symbols(&[])));
        assert!(!Guard::parse("0").unwrap().evaluate(&symbols(&[])));
    }

    #[test]
    fn test_comparison() {
        let guard = Guard::parse("MOZ_UPDATE_CHANNEL == release").unwrap();
        assert!(guard.evaluate(&symbols(&[("MOZ_UPDATE_CHANNEL", "release")])));
        assert!(!guard.evaluate(&symbols(&[("MOZ_UPDATE_CHANNEL", "nightly")])));

        let guard = Guard::parse("MOZ_WIDGET_GTK != 2").unwrap();
        assert!(guard.evaluate(&symbols(&[("MOZ_WIDGET_GTK", "3")])));
        assert!(!guard.evaluate(&symbols(&[("MOZ_WIDGET_GTK", "2")])));
    }

    #[test]
    fn test_precedence_and_parentheses() {
        // && binds tighter than ||
        let guard = Guard::parse("A || B && C").unwrap();
        assert!(guard.evaluate(&symbols(&[("A", "1")])));
        assert!(!guard.evaluate(&symbols(&[("B", "1")])));

        let guard = Guard::parse("(A || B) && C").unwrap();
        assert!(!guard.evaluate(&symbols(&[("A", "1")])));
        assert!(guard.evaluate(&symbols(&[("A", "1"), ("C", "1")])));
    }

    #[test]
    fn test_referenced_symbols() {
        let guard = Guard::parse("defined(A) && (B == C || !D)").unwrap();
        assert_eq!(guard.referenced_symbols(), vec!["A", "B", "D"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Guard::parse("").is_err());
        assert!(Guard::parse("A &").is_err());
        assert!(Guard::parse("(A").is_err());
        assert!(Guard::parse("defined(").is_err());
        assert!(Guard::parse("A B").is_err());
        assert!(Guard::parse("A == ").is_err());
        assert!(Guard::parse("A $ B").is_err());
    }
}
