//! Parser for default preference manifests
//!
//! This module provides a recursive descent parser that turns manifest text
//! into a [`Manifest`] tree. Build flags play no part here: every branch of
//! every conditional block is parsed and kept.
//!
//! # Format
//!
//! ```text
//! #filter substitution
//! pref("preference.name", value);
//! sticky_pref("preference.name", value);
//! lock_pref("preference.name", value);
//!
//! #ifdef XP_MACOSX
//! pref("toolbar.customization.usesheet", true);
//! #else
//! pref("toolbar.customization.usesheet", false);
//! #endif
//! ```
//!
//! # Example
//!
//! ```rust
//! use defprefs::{parse_manifest, Item};
//!
//! let manifest = parse_manifest(r#"
//!     pref("a.b", 1);
//!     #ifdef X
//!     pref("a.b", 2);
//!     #endif
//! "#)?;
//!
//! assert_eq!(manifest.items.len(), 2);
//! assert!(matches!(manifest.items[1], Item::Conditional(_)));
//! # Ok::<(), defprefs::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::guard::Guard;
use crate::lexer::{Lexer, Token};
use crate::manifest::{Branch, Conditional, Declaration, Filter, Item, Manifest};
use crate::types::{DeclaredValue, PrefKind};

/// Parse manifest text into a declaration tree
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    let mut parser = Parser::new(content)?;
    parser.parse()
}

/// Parse a manifest file directly from a path
pub fn parse_manifest_file(path: &std::path::Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)?;
    parse_manifest(&content)
}

/// Conditional block whose `#endif` has not been seen yet
struct OpenBlock {
    branches: Vec<Branch>,
    /// Guard of the branch being filled; `None` once `#else` was seen
    guard: Option<Guard>,
    guard_line: usize,
    items: Vec<Item>,
    line: usize,
    column: usize,
}

impl OpenBlock {
    /// Close the branch being filled and start a new one
    fn close_branch(&mut self, next_guard: Option<Guard>, line: usize) {
        let items = std::mem::take(&mut self.items);
        if let Some(guard) = self.guard.take() {
            self.branches.push(Branch {
                guard,
                items,
                line: self.guard_line,
            });
        }
        self.guard = next_guard;
        self.guard_line = line;
    }

    fn finish(mut self) -> Conditional {
        if self.guard.is_some() {
            self.close_branch(None, 0);
            Conditional {
                branches: self.branches,
                otherwise: Vec::new(),
            }
        } else {
            Conditional {
                branches: self.branches,
                otherwise: self.items,
            }
        }
    }
}

/// Parser for preference manifests
struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Current lookahead token
    current: Token,
    /// Position of the lookahead token
    line: usize,
    column: usize,
    root: Vec<Item>,
    open: Vec<OpenBlock>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    fn new(input: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        let (line, column) = lexer.token_position();
        Ok(Parser {
            lexer,
            current,
            line,
            column,
            root: Vec::new(),
            open: Vec::new(),
        })
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parser {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    /// Parse the entire input
    fn parse(&mut self) -> Result<Manifest> {
        loop {
            match &self.current {
                Token::Eof => break,
                Token::Directive { .. } => self.parse_directive()?,
                _ => {
                    let declaration = self.parse_statement()?;
                    self.push_item(Item::Pref(declaration));
                }
            }
        }

        if let Some(block) = self.open.first() {
            return Err(Error::Parser {
                line: block.line,
                column: block.column,
                message: "Conditional block is never closed with #endif".to_string(),
            });
        }

        Ok(Manifest::new(std::mem::take(&mut self.root)))
    }

    fn push_item(&mut self, item: Item) {
        match self.open.last_mut() {
            Some(block) => block.items.push(item),
            None => self.root.push(item),
        }
    }

    /// Parse a single statement: kind "(" key "," value ")" ";"
    fn parse_statement(&mut self) -> Result<Declaration> {
        let line = self.line;
        let kind = self.parse_pref_kind()?;
        self.expect_token(Token::LeftParen)?;
        let key = self.expect_string()?;
        self.expect_token(Token::Comma)?;
        let value = self.parse_value()?;
        self.expect_token(Token::RightParen)?;
        self.expect_token(Token::Semicolon)?;

        Ok(Declaration {
            key,
            value,
            kind,
            line,
        })
    }

    /// Parse the pref function name and return the corresponding PrefKind
    fn parse_pref_kind(&mut self) -> Result<PrefKind> {
        let kind = match &self.current {
            Token::Identifier(ident) => match ident.as_str() {
                "pref" => PrefKind::Default,
                "sticky_pref" => PrefKind::Sticky,
                "lock_pref" => PrefKind::Locked,
                "user_pref" => {
                    return Err(self.error("user_pref() is not allowed in a defaults manifest"))
                }
                _ => {
                    return Err(self.error(format!(
                        "Unknown pref function '{}'. Expected pref, sticky_pref, or lock_pref",
                        ident
                    )))
                }
            },
            token => {
                return Err(self.error(format!(
                    "Expected pref function name (pref, sticky_pref, lock_pref), got {:?}",
                    token
                )))
            }
        };
        self.advance()?;
        Ok(kind)
    }

    /// Parse a value literal
    fn parse_value(&mut self) -> Result<DeclaredValue> {
        let value = match &mut self.current {
            Token::String(s) => DeclaredValue::String(std::mem::take(s)),
            Token::Integer(n) => DeclaredValue::Integer(*n),
            Token::Float(n) => DeclaredValue::Float(*n),
            Token::Boolean(b) => DeclaredValue::Bool(*b),
            Token::Null => DeclaredValue::Null,
            Token::Eof => return Err(self.error("Unexpected end of input")),
            token => {
                let message = format!("Expected value, got {:?}", token);
                return Err(self.error(message));
            }
        };
        self.advance()?;
        Ok(value)
    }

    /// Expect a specific token and consume it
    fn expect_token(&mut self, expected: Token) -> Result<()> {
        if self.current == expected {
            return self.advance();
        }
        match &self.current {
            Token::Eof => Err(self.error("Unexpected end of input")),
            token => Err(self.error(format!("Expected {:?}, got {:?}", expected, token))),
        }
    }

    /// Expect a string token and return its value
    fn expect_string(&mut self) -> Result<String> {
        match &mut self.current {
            Token::String(s) => {
                let s = std::mem::take(s);
                self.advance()?;
                Ok(s)
            }
            Token::Eof => Err(self.error("Unexpected end of input")),
            token => {
                let message = format!("Expected string, got {:?}", token);
                Err(self.error(message))
            }
        }
    }

    /// Advance to the next token
    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        let (line, column) = self.lexer.token_position();
        self.line = line;
        self.column = column;
        Ok(())
    }

    fn parse_directive(&mut self) -> Result<()> {
        let (name, args) = match std::mem::replace(&mut self.current, Token::Eof) {
            Token::Directive { name, args } => (name, args),
            other => {
                self.current = other;
                return Err(self.error("Expected directive"));
            }
        };
        let line = self.line;
        let column = self.column;

        match name.as_str() {
            "ifdef" | "ifndef" | "if" => {
                let guard = self.parse_guard(&name, &args)?;
                self.open.push(OpenBlock {
                    branches: Vec::new(),
                    guard: Some(guard),
                    guard_line: line,
                    items: Vec::new(),
                    line,
                    column,
                });
            }
            "elifdef" | "elifndef" | "elif" => {
                let guard = self.parse_guard(&name, &args)?;
                let block = self.current_block(&name)?;
                if block.guard.is_none() {
                    return Err(self.error(format!("#{} after #else", name)));
                }
                block.close_branch(Some(guard), line);
            }
            "else" => {
                let block = self.current_block(&name)?;
                if block.guard.is_none() {
                    return Err(self.error("Duplicate #else in conditional block"));
                }
                block.close_branch(None, line);
            }
            "endif" => {
                let block = match self.open.pop() {
                    Some(block) => block,
                    None => return Err(self.error("#endif without matching #if")),
                };
                self.push_item(Item::Conditional(block.finish()));
            }
            "define" => {
                let (symbol, value) = match args.split_once(char::is_whitespace) {
                    Some((symbol, value)) => (symbol, value.trim()),
                    None => (args.as_str(), ""),
                };
                let symbol = self.expect_symbol(&name, symbol)?;
                self.push_item(Item::Define {
                    name: symbol,
                    value: value.to_string(),
                    line,
                });
            }
            "undef" => {
                let symbol = self.expect_symbol(&name, &args)?;
                self.push_item(Item::Undef { name: symbol, line });
            }
            "filter" | "unfilter" => {
                let mut filters = Vec::new();
                for filter_name in args.split_whitespace() {
                    match Filter::from_name(filter_name) {
                        Some(filter) => filters.push(filter),
                        None => {
                            return Err(self.error(format!("Unknown filter '{}'", filter_name)))
                        }
                    }
                }
                if filters.is_empty() {
                    return Err(self.error(format!("#{} requires a filter name", name)));
                }
                self.push_item(Item::Filter {
                    filters,
                    enabled: name == "filter",
                    line,
                });
            }
            "error" => self.push_item(Item::Error {
                message: args,
                line,
            }),
            _ => return Err(self.error(format!("Unknown directive '#{}'", name))),
        }

        self.advance()
    }

    fn current_block(&mut self, directive: &str) -> Result<&mut OpenBlock> {
        let error = self.error(format!("#{} without matching #if", directive));
        self.open.last_mut().ok_or(error)
    }

    fn parse_guard(&self, directive: &str, args: &str) -> Result<Guard> {
        match directive {
            "ifdef" | "elifdef" => Ok(Guard::defined(self.expect_symbol(directive, args)?)),
            "ifndef" | "elifndef" => Ok(Guard::not_defined(self.expect_symbol(directive, args)?)),
            _ => Guard::parse(args).map_err(|message| self.error(message)),
        }
    }

    fn expect_symbol(&self, directive: &str, args: &str) -> Result<String> {
        let valid = !args.is_empty()
            && !args.starts_with(|c: char| c.is_ascii_digit())
            && args.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(args.to_string())
        } else if args.is_empty() {
            Err(self.error(format!("#{} requires a symbol name", directive)))
        } else {
            Err(self.error(format!("Invalid symbol name '{}' in #{}", args, directive)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_pref(input: &str) -> Declaration {
        let manifest = parse_manifest(input).unwrap();
        assert_eq!(manifest.items.len(), 1);
        match manifest.items.into_iter().next() {
            Some(Item::Pref(declaration)) => declaration,
            other => panic!("Expected pref, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_string() {
        let decl = single_pref(r#"pref("browser.chromeURL","chrome://browser/content/");"#);
        assert_eq!(decl.key, "browser.chromeURL");
        assert_eq!(
            decl.value,
            DeclaredValue::String("chrome://browser/content/".to_string())
        );
        assert_eq!(decl.kind, PrefKind::Default);
        assert_eq!(decl.line, 1);
    }

    #[test]
    fn test_parse_boolean_and_integer() {
        assert_eq!(
            single_pref(r#"pref("extensions.logging.enabled", false);"#).value,
            DeclaredValue::Bool(false)
        );
        assert_eq!(
            single_pref(r#"pref("extensions.blocklist.interval", 86400);"#).value,
            DeclaredValue::Integer(86400)
        );
        assert_eq!(
            single_pref(r#"pref("browser.link.open_newwindow.override.external", -1);"#).value,
            DeclaredValue::Integer(-1)
        );
    }

    #[test]
    fn test_parse_float_and_null_are_kept_for_resolution() {
        assert_eq!(
            single_pref(r#"pref("a.b", 2.5);"#).value,
            DeclaredValue::Float(2.5)
        );
        assert_eq!(
            single_pref(r#"pref("a.b", null);"#).value,
            DeclaredValue::Null
        );
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!(
            single_pref(r#"sticky_pref("a.b", 1);"#).kind,
            PrefKind::Sticky
        );
        assert_eq!(
            single_pref(r#"lock_pref("a.b", 1);"#).kind,
            PrefKind::Locked
        );
    }

    #[test]
    fn test_user_pref_rejected() {
        let result = parse_manifest(r#"user_pref("a.b", 1);"#);
        assert!(matches!(result, Err(Error::Parser { line: 1, column: 1, .. })));
    }

    #[test]
    fn test_parse_line_numbers() {
        let manifest = parse_manifest("\n// comment\npref(\"a\", 1);\n\n  pref(\"b\", 2);").unwrap();
        let lines: Vec<usize> = manifest
            .items
            .iter()
            .map(|item| match item {
                Item::Pref(d) => d.line,
                _ => 0,
            })
            .collect();
        assert_eq!(lines, vec![3, 5]);
    }

    #[test]
    fn test_parse_ifdef_else() {
        let input = r#"
#ifdef XP_MACOSX
pref("toolbar.customization.usesheet", true);
#else
pref("toolbar.customization.usesheet", false);
#endif
"#;
        let manifest = parse_manifest(input).unwrap();
        assert_eq!(manifest.items.len(), 1);
        match &manifest.items[0] {
            Item::Conditional(block) => {
                assert_eq!(block.branches.len(), 1);
                assert_eq!(block.branches[0].guard, Guard::defined("XP_MACOSX"));
                assert_eq!(block.branches[0].items.len(), 1);
                assert_eq!(block.branches[0].line, 2);
                assert_eq!(block.otherwise.len(), 1);
            }
            other => panic!("Expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_and_define() {
        let input = r#"
#ifdef XP_UNIX
#ifndef XP_MACOSX
#define UNIX_BUT_NOT_MAC
#endif
#endif
"#;
        let manifest = parse_manifest(input).unwrap();
        let outer = match &manifest.items[0] {
            Item::Conditional(block) => block,
            other => panic!("Expected conditional, got {:?}", other),
        };
        let inner = match &outer.branches[0].items[0] {
            Item::Conditional(block) => block,
            other => panic!("Expected conditional, got {:?}", other),
        };
        assert_eq!(inner.branches[0].guard, Guard::not_defined("XP_MACOSX"));
        assert_eq!(
            inner.branches[0].items[0],
            Item::Define {
                name: "UNIX_BUT_NOT_MAC".to_string(),
                value: String::new(),
                line: 4
            }
        );
    }

    #[test]
    fn test_parse_elif_chain() {
        let input = r#"
#if defined(XP_WIN)
pref("a", 1);
#elifdef XP_MACOSX
pref("a", 2);
#elif XP_UNIX && !DEBUG
pref("a", 3);
#else
pref("a", 4);
#endif
"#;
        let manifest = parse_manifest(input).unwrap();
        match &manifest.items[0] {
            Item::Conditional(block) => {
                assert_eq!(block.branches.len(), 3);
                assert_eq!(block.otherwise.len(), 1);
            }
            other => panic!("Expected conditional, got {:?}", other),
        }
        assert_eq!(manifest.declaration_count(), 4);
    }

    #[test]
    fn test_parse_define_with_value_and_filters() {
        let input = "#define AB_CD en-US\n#filter substitution emptyLines\n#unfilter substitution\n#undef AB_CD\n";
        let manifest = parse_manifest(input).unwrap();
        assert_eq!(
            manifest.items,
            vec![
                Item::Define {
                    name: "AB_CD".to_string(),
                    value: "en-US".to_string(),
                    line: 1
                },
                Item::Filter {
                    filters: vec![Filter::Substitution, Filter::Cosmetic],
                    enabled: true,
                    line: 2
                },
                Item::Filter {
                    filters: vec![Filter::Substitution],
                    enabled: false,
                    line: 3
                },
                Item::Undef {
                    name: "AB_CD".to_string(),
                    line: 4
                },
            ]
        );
    }

    #[test]
    fn test_structural_errors() {
        assert!(parse_manifest("#endif\n").is_err());
        assert!(parse_manifest("#else\n").is_err());
        assert!(parse_manifest("#ifdef X\n#else\n#else\n#endif\n").is_err());
        assert!(parse_manifest("#ifdef X\n#else\n#elif Y\n#endif\n").is_err());
        assert!(parse_manifest("#ifdef\n#endif\n").is_err());
        assert!(parse_manifest("#ifdef 1X\n#endif\n").is_err());
        assert!(parse_manifest("#if A &&\n#endif\n").is_err());
        assert!(parse_manifest("#filter bogus\n").is_err());
        assert!(parse_manifest("#include other.js\n").is_err());
    }

    #[test]
    fn test_unterminated_block_reports_opening_line() {
        let result = parse_manifest("pref(\"a\", 1);\n#ifdef X\npref(\"b\", 2);\n");
        assert!(matches!(result, Err(Error::Parser { line: 2, column: 1, .. })));
    }

    #[test]
    fn test_malformed_statements() {
        assert!(parse_manifest(r#"pref("test", "value")"#).is_err());
        assert!(parse_manifest(r#"pref("test", "value);"#).is_err());
        assert!(parse_manifest(r#"pref("test" "value");"#).is_err());
        assert!(parse_manifest(r#"pref(test, 1);"#).is_err());
        assert!(parse_manifest(r#"setpref("test", 1);"#).is_err());
        assert!(parse_manifest(r#"pref("test", );"#).is_err());
    }

    #[test]
    fn test_commented_out_pref_is_ignored() {
        let manifest = parse_manifest(r#"//pref("app.update.url.override", "");"#).unwrap();
        assert!(manifest.items.is_empty());
    }

    #[test]
    fn test_error_directive_is_kept() {
        let manifest = parse_manifest("#ifdef OLD\n#error old builds are unsupported\n#endif\n").unwrap();
        match &manifest.items[0] {
            Item::Conditional(block) => assert_eq!(
                block.branches[0].items[0],
                Item::Error {
                    message: "old builds are unsupported".to_string(),
                    line: 2
                }
            ),
            other => panic!("Expected conditional, got {:?}", other),
        }
    }
}
