//! Lexer for tokenizing default preference manifests
//!
//! This module converts manifest text into tokens. Besides the JavaScript-like
//! `pref(...)` statements it recognizes preprocessor lines: a line whose first
//! non-blank character is `#` followed by a lowercase word is a directive
//! (`#ifdef XP_MACOSX`); any other `#` line is a comment. Line and column
//! numbers are tracked for error reporting.

use crate::error::{Error, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Token types produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier (e.g., pref, sticky_pref, lock_pref)
    Identifier(String),
    /// String value with escape sequences already processed
    String(String),
    /// Integer literal
    Integer(i64),
    /// Floating point literal (never a valid preference value)
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Null value
    Null,
    /// Preprocessor directive: `#name args`
    Directive { name: String, args: String },
    /// Left parenthesis
    LeftParen,
    /// Right parenthesis
    RightParen,
    /// Comma
    Comma,
    /// Semicolon
    Semicolon,
    /// End of input
    Eof,
}

/// Lexer for tokenizing preference manifests
pub struct Lexer<'a> {
    /// Input character iterator
    chars: Peekable<Chars<'a>>,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Only blanks seen so far on the current line
    at_line_start: bool,
    /// Position where the last returned token started
    token_line: usize,
    token_column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
            at_line_start: true,
            token_line: 1,
            token_column: 1,
        }
    }

    /// Line and column where the most recently returned token starts
    pub fn token_position(&self) -> (usize, usize) {
        (self.token_line, self.token_column)
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments()?;

        self.token_line = self.line;
        self.token_column = self.column;

        let c = match self.chars.peek() {
            Some(&c) => c,
            None => return Ok(Token::Eof),
        };

        match c {
            '(' => {
                self.advance();
                Ok(Token::LeftParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RightParen)
            }
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            ';' => {
                self.advance();
                Ok(Token::Semicolon)
            }
            '#' if self.at_line_start => self.lex_directive(),
            '"' | '\'' => self.lex_string(c),
            '-' | '0'..='9' => self.lex_number(),
            'a'..='z' | 'A'..='Z' | '_' => self.lex_identifier(),
            _ => Err(self.error(format!("Unexpected character: '{}'", c))),
        }
    }

    fn error(&self, message: String) -> Error {
        Error::Lexer {
            message,
            line: self.line,
            column: self.column,
        }
    }

    /// Advance to the next character, keeping line/column in sync
    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.at_line_start = true;
        } else {
            self.column += 1;
            if c != ' ' && c != '\t' && c != '\r' {
                self.at_line_start = false;
            }
        }
        Some(c)
    }

    /// Character after the next one, without consuming anything
    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn skip_to_end_of_line(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip whitespace, `//` and `/* */` comments, and `#` comment lines
    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            while let Some(&c) = self.chars.peek() {
                if c.is_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }

            let first = self.chars.peek().copied();
            match (first, self.peek_second()) {
                (Some('/'), Some('/')) => self.skip_to_end_of_line(),
                (Some('/'), Some('*')) => {
                    let start_line = self.line;
                    let start_col = self.column;
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.chars.peek() == Some(&'/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(Error::Lexer {
                                    message: "Unterminated block comment".to_string(),
                                    line: start_line,
                                    column: start_col,
                                })
                            }
                        }
                    }
                }
                // `#` not followed by a directive word is a comment line
                (Some('#'), next)
                    if self.at_line_start && !next.is_some_and(|n| n.is_ascii_lowercase()) =>
                {
                    self.skip_to_end_of_line()
                }
                _ => return Ok(()),
            }
        }
    }

    /// Lex a directive line: `#name` followed by optional arguments
    fn lex_directive(&mut self) -> Result<Token> {
        // Skip '#'
        self.advance();

        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphabetic() {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let mut args = String::new();
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            args.push(c);
            self.advance();
        }

        Ok(Token::Directive {
            name,
            args: args.trim().to_string(),
        })
    }

    /// Lex an identifier (e.g., pref, true, false, null)
    fn lex_identifier(&mut self) -> Result<Token> {
        let mut ident = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "true" => Ok(Token::Boolean(true)),
            "false" => Ok(Token::Boolean(false)),
            "null" => Ok(Token::Null),
            _ => Ok(Token::Identifier(ident)),
        }
    }

    /// Read exactly `count` hex digits
    fn read_hex(&mut self, count: usize, kind: char) -> Result<u32> {
        let mut hex = String::new();
        for _ in 0..count {
            match self.chars.peek() {
                Some(&c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.advance();
                }
                _ => break,
            }
        }
        if hex.len() != count {
            return Err(self.error(format!("Incomplete escape: \\{}{}", kind, hex)));
        }
        u32::from_str_radix(&hex, 16)
            .map_err(|_| self.error(format!("Invalid escape: \\{}{}", kind, hex)))
    }

    /// Decode the rest of a `\uNNNN` escape, joining surrogate pairs
    fn lex_unicode_escape(&mut self) -> Result<char> {
        let first = self.read_hex(4, 'u')?;
        if (0xD800..0xDC00).contains(&first) {
            let mut ahead = self.chars.clone();
            if ahead.next() == Some('\\') && ahead.next() == Some('u') {
                self.advance();
                self.advance();
                let second = self.read_hex(4, 'u')?;
                if (0xDC00..0xE000).contains(&second) {
                    let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
                    return Ok(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                }
                return Err(self.error(format!(
                    "Invalid surrogate pair: \\u{:04X}\\u{:04X}",
                    first, second
                )));
            }
        }
        // Lone surrogates become the replacement character
        Ok(char::from_u32(first).unwrap_or('\u{FFFD}'))
    }

    /// Lex a string literal delimited by `quote`
    fn lex_string(&mut self, quote: char) -> Result<Token> {
        let start_line = self.line;
        let start_col = self.column;

        // Skip opening quote
        self.advance();

        let mut result = String::new();

        loop {
            match self.advance() {
                Some(c) if c == quote => return Ok(Token::String(result)),
                Some('\\') => match self.advance() {
                    Some('"') => result.push('"'),
                    Some('\'') => result.push('\''),
                    Some('\\') => result.push('\\'),
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some('b') => result.push('\x08'),
                    Some('f') => result.push('\x0c'),
                    Some('0') => {
                        // \0 followed by another 0 would be an octal escape
                        if self.chars.peek() == Some(&'0') {
                            return Err(self.error(
                                "Octal escape sequences are not supported. Use \\x00 instead."
                                    .to_string(),
                            ));
                        }
                        result.push('\x00');
                    }
                    Some('x') => {
                        let byte = self.read_hex(2, 'x')?;
                        result.push(char::from_u32(byte).unwrap_or('\u{FFFD}'));
                    }
                    Some('u') => {
                        let c = self.lex_unicode_escape()?;
                        result.push(c);
                    }
                    Some(c) => {
                        return Err(self.error(format!("Invalid escape sequence: \\{}", c)));
                    }
                    None => {
                        return Err(self.error(
                            "Unexpected end of input in escape sequence".to_string(),
                        ));
                    }
                },
                Some(c) => result.push(c),
                None => {
                    return Err(Error::Lexer {
                        message: "Unterminated string literal".to_string(),
                        line: start_line,
                        column: start_col,
                    });
                }
            }
        }
    }

    /// Lex a number: an integer, or a float (including scientific notation)
    fn lex_number(&mut self) -> Result<Token> {
        let start_col = self.column;

        let mut num_str = String::new();
        let mut is_float = false;

        if self.chars.peek() == Some(&'-') {
            num_str.push('-');
            self.advance();
        }

        let mut has_digit = false;
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                num_str.push(c);
                self.advance();
                has_digit = true;
            } else {
                break;
            }
        }

        if self.chars.peek() == Some(&'.') {
            is_float = true;
            num_str.push('.');
            self.advance();

            while let Some(&c) = self.chars.peek() {
                if c.is_ascii_digit() {
                    num_str.push(c);
                    self.advance();
                    has_digit = true;
                } else {
                    break;
                }
            }
        }

        if !has_digit {
            return Err(self.error(format!("Expected digits after '{}'", num_str)));
        }

        if let Some(&('e' | 'E')) = self.chars.peek() {
            is_float = true;
            num_str.push('e');
            self.advance();

            if let Some(&sign @ ('+' | '-')) = self.chars.peek() {
                num_str.push(sign);
                self.advance();
            }

            let mut has_exp_digit = false;
            while let Some(&c) = self.chars.peek() {
                if c.is_ascii_digit() {
                    num_str.push(c);
                    self.advance();
                    has_exp_digit = true;
                } else {
                    break;
                }
            }

            if !has_exp_digit {
                return Err(
                    self.error("Missing exponent digits in scientific notation".to_string())
                );
            }
        }

        if is_float {
            return num_str.parse::<f64>().map(Token::Float).map_err(|_| Error::Lexer {
                message: format!("Failed to parse number: {}", num_str),
                line: self.line,
                column: start_col,
            });
        }

        num_str.parse::<i64>().map(Token::Integer).map_err(|_| Error::Lexer {
            message: format!("Integer literal out of range: {}", num_str),
            line: self.line,
            column: start_col,
        })
    }
}
