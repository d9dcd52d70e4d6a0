//! Statement parsing implementation
//!
//! This module handles parsing of all C statement types:
//!
//! - Block-scope declarations: `Prog *p, *q;`, `static int n = 1;`
//! - Control flow: `if`, `while`, `for`, `do-while`, `switch`
//! - Labels: `case X:`, `default:`, `name:`
//! - Jump statements: `return`, `break`, `continue`, `goto`
//! - Compound statements: `{ ... }`
//! - Expression and empty statements
//!
//! # Grammar
//!
//! ```text
//! statement ::= declaration | if_stmt | while_stmt | for_stmt
//!             | do_while_stmt | switch_stmt | return_stmt | case_label
//!             | default_label | label | goto_stmt | break_stmt
//!             | continue_stmt | block | expr_stmt | ";"
//! ```
//!
//! `case` and `default` are parsed as standalone statements so the body of a
//! `switch` is an ordinary statement and fall-through prints back unchanged.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser<'_> {
    /// Parse a brace-enclosed block, braces included
    pub(crate) fn parse_compound(&mut self) -> Result<Block, ParseError> {
        let location = self.current_location();
        self.expect_lbrace("to open block")?;

        let mut stmts = Vec::new();
        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            stmts.push(self.parse_statement()?);
        }

        self.expect_rbrace("after block")?;
        Ok(Block { stmts, location })
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();

        if self.match_token(&Token::Return(loc)) {
            return self.parse_return_statement();
        }

        if self.match_token(&Token::If(loc)) {
            return self.parse_if_statement();
        }

        if self.match_token(&Token::While(loc)) {
            return self.parse_while_statement();
        }

        if self.match_token(&Token::Do(loc)) {
            return self.parse_do_while_statement();
        }

        if self.match_token(&Token::For(loc)) {
            return self.parse_for_statement();
        }

        if self.match_token(&Token::Switch(loc)) {
            return self.parse_switch_statement();
        }

        if self.match_token(&Token::Case(loc)) {
            let value = self.parse_conditional()?;
            self.expect_colon("after case value")?;
            return Ok(Stmt::Case {
                value,
                location: loc,
            });
        }

        if self.match_token(&Token::Default(loc)) {
            self.expect_colon("after 'default'")?;
            return Ok(Stmt::Default { location: loc });
        }

        if self.match_token(&Token::Break(loc)) {
            self.expect_semicolon("after 'break'")?;
            return Ok(Stmt::Break { location: loc });
        }

        if self.match_token(&Token::Continue(loc)) {
            self.expect_semicolon("after 'continue'")?;
            return Ok(Stmt::Continue { location: loc });
        }

        if self.match_token(&Token::Goto(loc)) {
            let label = self.expect_identifier()?;
            self.expect_semicolon("after 'goto'")?;
            return Ok(Stmt::Goto {
                label,
                location: loc,
            });
        }

        if self.check(&Token::LBrace(loc)) {
            return Ok(Stmt::Block(self.parse_compound()?));
        }

        if self.match_token(&Token::Semicolon(loc)) {
            return Ok(Stmt::Empty { location: loc });
        }

        // Check for label: identifier followed by colon
        if matches!(self.peek(), Token::Ident(..))
            && matches!(self.peek_ahead(1), Some(Token::Colon(_)))
        {
            let name = self.expect_identifier()?;
            self.expect_colon("after label")?;
            return Ok(Stmt::Label {
                name,
                location: loc,
            });
        }

        if self.is_declaration_start() {
            return self.parse_local_declaration();
        }

        // Otherwise, it's an expression statement
        let expr = self.parse_expression()?;
        self.expect_semicolon("after expression")?;
        Ok(Stmt::Expr {
            expr,
            location: loc,
        })
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.previous_location();

        let expr = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.expect_semicolon("after return")?;

        Ok(Stmt::Return {
            expr,
            location: loc,
        })
    }

    /// Parse if statement
    fn parse_if_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after if condition")?;

        let then_branch = Box::new(self.parse_statement()?);

        let else_branch = if self.match_token(&Token::Else(self.current_location())) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after while condition")?;

        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::While {
            condition,
            body,
            location: loc,
        })
    }

    /// Parse do-while statement
    fn parse_do_while_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.previous_location();

        let body = Box::new(self.parse_statement()?);

        self.expect_token(
            &Token::While(self.current_location()),
            "Expected 'while' after do body",
        )?;
        self.expect_lparen("after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after do-while condition")?;
        self.expect_semicolon("after do-while")?;

        Ok(Stmt::DoWhile {
            body,
            condition,
            location: loc,
        })
    }

    /// Parse for statement
    fn parse_for_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'for'")?;

        // Init (optional)
        let init = if self.match_token(&Token::Semicolon(self.current_location())) {
            None
        } else if self.is_declaration_start() {
            // Declaration includes semicolon, so don't expect another
            Some(Box::new(self.parse_local_declaration()?))
        } else {
            let init_loc = self.current_location();
            let expr = self.parse_expression()?;
            self.expect_semicolon("after for init")?;
            Some(Box::new(Stmt::Expr {
                expr,
                location: init_loc,
            }))
        };

        // Condition (optional)
        let condition = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_semicolon("after for condition")?;

        // Increment (optional)
        let increment = if self.check(&Token::RParen(self.current_location())) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.expect_rparen("after for clauses")?;

        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::For {
            init,
            condition,
            increment,
            body,
            location: loc,
        })
    }

    /// Parse switch statement
    fn parse_switch_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'switch'")?;
        let expr = self.parse_expression()?;
        self.expect_rparen("after switch expression")?;

        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::Switch {
            expr,
            body,
            location: loc,
        })
    }

    /// Parse a block-scope declaration, semicolon included. Struct bodies
    /// declared inside functions are not kept.
    pub(crate) fn parse_local_declaration(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        let mut nested = Vec::new();
        let spec = self.parse_decl_specifiers(&mut nested)?;

        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(Stmt::Empty { location });
        }

        let mut vars = Vec::new();
        loop {
            let declarator = self.parse_declarator(&spec.base, false)?;
            let at = declarator.location;
            let name = declarator
                .name
                .ok_or_else(|| self.error_at("Expected variable name", at))?;

            if spec.is_typedef {
                self.type_names.insert(name);
            } else {
                let init = if self.match_token(&Token::Eq(self.current_location())) {
                    Some(self.parse_initializer()?)
                } else {
                    None
                };
                vars.push(LocalVar {
                    name,
                    var_type: declarator.decl_type,
                    params: declarator.params,
                    init,
                });
            }

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_semicolon("after variable declaration")?;

        if vars.is_empty() {
            return Ok(Stmt::Empty { location });
        }
        Ok(Stmt::Decl {
            storage: spec.storage,
            vars,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::{Parser, TypeNames};

    fn body_of(source: &str) -> Vec<Stmt> {
        let mut names = TypeNames::default();
        names.insert("Prog".to_string());
        let mut parser = Parser::new(source, FileId(0), "span.c", &mut names).unwrap();
        let unit = parser.parse_translation_unit().unwrap();
        match unit.items.into_iter().next() {
            Some(TopLevel::Decl(Decl { body: Some(block), .. })) => block.stmts,
            _ => panic!("Expected function definition"),
        }
    }

    #[test]
    fn test_switch_with_case_labels() {
        let stmts = body_of(
            "void f(int o) { switch(o) { case 1: case 2: o++; break; default: o = 0; } }",
        );

        let Stmt::Switch { body, .. } = &stmts[0] else {
            panic!("Expected switch");
        };
        let Stmt::Block(block) = body.as_ref() else {
            panic!("Expected switch body block");
        };
        assert!(matches!(block.stmts[0], Stmt::Case { .. }));
        assert!(matches!(block.stmts[1], Stmt::Case { .. }));
        assert!(matches!(block.stmts[2], Stmt::Expr { .. }));
        assert!(matches!(block.stmts[3], Stmt::Break { .. }));
        assert!(matches!(block.stmts[4], Stmt::Default { .. }));
    }

    #[test]
    fn test_local_declarations_and_prototypes() {
        let stmts = body_of("void f(void) { Prog *p, *q; static int n = 1; void g(int); g(n); }");

        assert!(matches!(&stmts[0], Stmt::Decl { vars, .. } if vars.len() == 2));
        assert!(matches!(&stmts[1], Stmt::Decl { storage: Storage::Static, .. }));
        assert!(matches!(&stmts[2], Stmt::Decl { vars, .. } if vars[0].params.is_some()));
        assert!(matches!(&stmts[3], Stmt::Expr { .. }));
    }

    #[test]
    fn test_goto_labels_and_empty_statements() {
        let stmts = body_of("void f(void) { loop: ; goto loop; for(;;) ; }");

        assert!(matches!(&stmts[0], Stmt::Label { name, .. } if name == "loop"));
        assert!(matches!(stmts[1], Stmt::Empty { .. }));
        assert!(matches!(&stmts[2], Stmt::Goto { label, .. } if label == "loop"));
        assert!(matches!(
            &stmts[3],
            Stmt::For { init: None, condition: None, increment: None, .. }
        ));
    }

    #[test]
    fn test_for_with_declaration_init() {
        let stmts = body_of("void f(void) { for(int i = 0; i < 4; i++) {} }");
        assert!(matches!(
            &stmts[0],
            Stmt::For { init: Some(init), .. } if matches!(init.as_ref(), Stmt::Decl { .. })
        ));
    }
}
