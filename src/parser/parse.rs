//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: declaration specifiers, declarators, struct/enum/typedef
//! - `statements`: Parsing statements (if, while, for, etc.)
//! - `expressions`: Parsing expressions with precedence climbing
//!
//! # Typedef names
//!
//! C cannot be parsed without knowing which identifiers name types. The
//! parser borrows a [`TypeNames`] set shared by every file of a program:
//! headers are parsed first so their typedefs are visible to `.c` files, and
//! `Ident Ident` / `Ident * Ident` at the start of a declaration adds the
//! leading identifier when nothing else has declared it.

use crate::parser::ast::*;
use crate::parser::lexer::{Lexer, Token};
use rustc_hash::FxHashSet;
use thiserror::Error;

/// Identifiers known to name types
pub type TypeNames = FxHashSet<String>;

/// Parser error type
#[derive(Debug, Error)]
#[error("{path}:{}:{}: {message}", .location.line, .location.column)]
pub struct ParseError {
    pub path: String,
    pub message: String,
    pub location: SourceLocation,
}

/// Recursive descent parser for one C translation unit
pub struct Parser<'a> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) file: FileId,
    pub(crate) path: String,
    pub(crate) type_names: &'a mut TypeNames,
}

impl<'a> Parser<'a> {
    pub fn new(
        source: &str,
        file: FileId,
        path: &str,
        type_names: &'a mut TypeNames,
    ) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize().map_err(|err| ParseError {
            path: path.to_string(),
            message: err.message,
            location: err.location,
        })?;
        Ok(Self {
            tokens,
            position: 0,
            file,
            path: path.to_string(),
            type_names,
        })
    }

    /// Parse the entire translation unit (top-level declarations)
    pub fn parse_translation_unit(&mut self) -> Result<TranslationUnit, ParseError> {
        let mut unit = TranslationUnit::default();

        while !self.is_at_end() {
            // stray semicolons after function bodies are legal noise
            if self.match_token(&Token::Semicolon(self.current_location())) {
                continue;
            }
            let items = self.parse_external_declaration()?;
            unit.items.extend(items);
        }

        Ok(unit)
    }

    // ===== Helper methods =====

    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        self.error_at(message, self.current_location())
    }

    pub(crate) fn error_at(&self, message: impl Into<String>, location: SourceLocation) -> ParseError {
        ParseError {
            path: self.path.clone(),
            message: message.into(),
            location,
        }
    }

    pub(crate) fn span(&self, start: SourceLocation) -> Span {
        Span {
            file: self.file,
            start,
        }
    }

    /// Keywords that can only begin a type or declaration
    pub(crate) fn is_type_keyword(&self) -> bool {
        matches!(
            self.peek(),
            Token::Int(_)
                | Token::Char(_)
                | Token::Void(_)
                | Token::Short(_)
                | Token::Long(_)
                | Token::Float(_)
                | Token::Double(_)
                | Token::Signed(_)
                | Token::Unsigned(_)
                | Token::Struct(_)
                | Token::Union(_)
                | Token::Enum(_)
                | Token::Const(_)
                | Token::Volatile(_)
        )
    }

    pub(crate) fn is_storage_keyword(&self) -> bool {
        matches!(
            self.peek(),
            Token::Typedef(_)
                | Token::Static(_)
                | Token::Extern(_)
                | Token::Register(_)
                | Token::Auto(_)
                | Token::Inline(_)
        )
    }

    /// Can the current token start a type name (casts, sizeof)?
    pub(crate) fn is_type_start(&self) -> bool {
        if self.is_type_keyword() {
            return true;
        }
        matches!(self.peek(), Token::Ident(name, _) if self.type_names.contains(name))
    }

    /// Can the current token start a block-scope declaration?
    pub(crate) fn is_declaration_start(&self) -> bool {
        self.is_type_keyword() || self.is_storage_keyword() || self.ident_names_type()
    }

    /// Is the identifier under the cursor a type name, either known or by
    /// the `Ident Ident` / `Ident * Ident` shape?
    pub(crate) fn ident_names_type(&self) -> bool {
        let Token::Ident(name, _) = self.peek() else {
            return false;
        };
        if self.type_names.contains(name) {
            return true;
        }
        let mut n = 1;
        while matches!(self.peek_ahead(n), Some(Token::Star(_))) {
            n += 1;
        }
        if !matches!(self.peek_ahead(n), Some(Token::Ident(..))) {
            return false;
        }
        if n == 1 {
            return true;
        }
        // `a * b` needs a declarator terminator after it to count
        matches!(
            self.peek_ahead(n + 1),
            Some(
                Token::Semicolon(_)
                    | Token::Comma(_)
                    | Token::Eq(_)
                    | Token::LBracket(_)
                    | Token::LParen(_)
                    | Token::RParen(_)
            )
        )
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.tokens[self.position].clone()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("{}, found {}", message, self.peek())))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LParen(self.current_location()),
            &format!("Expected '(' {ctx}"),
        )
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LBrace(self.current_location()),
            &format!("Expected '{{' {ctx}"),
        )
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RBrace(self.current_location()),
            &format!("Expected '}}' {ctx}"),
        )
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            &format!("Expected ';' {ctx}"),
        )
    }

    pub(crate) fn expect_colon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::Colon(self.current_location()),
            &format!("Expected ':' {ctx}"),
        )
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(self.error(format!("Expected identifier, found {}", self.peek())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> TranslationUnit {
        let mut names = TypeNames::default();
        let mut parser = Parser::new(source, FileId(0), "test.c", &mut names).unwrap();
        parser.parse_translation_unit().unwrap()
    }

    #[test]
    fn test_parse_simple_function() {
        let unit = parse("int main(void) { return 0; }");

        assert_eq!(unit.items.len(), 1);
        match &unit.items[0] {
            TopLevel::Decl(decl) => {
                assert_eq!(decl.name, "main");
                assert_eq!(decl.kind, DeclKind::Function);
                assert_eq!(decl.params, ParamList::Void);
                assert_eq!(decl.decl_type.base, BaseType::Primitive("int".to_string()));
                assert_eq!(decl.body.as_ref().unwrap().stmts.len(), 1);
            }
            _ => panic!("Expected function definition"),
        }
    }

    #[test]
    fn test_parse_if_statement() {
        let unit = parse("int main() { if (x > 0) return 1; else return 0; }");
        assert_eq!(unit.items.len(), 1);
    }

    #[test]
    fn test_heuristic_registers_type_name() {
        let mut names = TypeNames::default();
        let mut parser =
            Parser::new("Prog *firstp;\nvoid f(void) { (Prog*)0; }", FileId(0), "a.c", &mut names)
                .unwrap();
        let unit = parser.parse_translation_unit().unwrap();
        assert_eq!(unit.items.len(), 2);
        assert!(names.contains("Prog"));
    }

    #[test]
    fn test_error_carries_path_and_position() {
        let mut names = TypeNames::default();
        let mut parser = Parser::new("int f(void) {\n\treturn 0\n}", FileId(3), "asm.c", &mut names)
            .unwrap();
        let err = parser.parse_translation_unit().unwrap_err();
        assert_eq!(err.path, "asm.c");
        assert_eq!(err.location.line, 3);
        assert!(err.to_string().starts_with("asm.c:3:"));
    }
}
