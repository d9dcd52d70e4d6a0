//! Expression parsing implementation
//!
//! This module handles parsing of C expressions using precedence climbing
//! for binary operators and recursive descent for other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: numbers, characters, strings (adjacent strings stay separate pieces)
//! - Name references, left unresolved until the program is linked
//! - Comma, assignment and compound assignment (`+=` ... `>>=`)
//! - Binary operators: arithmetic, comparison, logical, bitwise
//! - Unary operators: `-`, `+`, `!`, `~`, `&`, `*`, `++`, `--`
//! - Postfix: `[]`, `.`, `->`, `()`, `++`, `--`; calls accept any callee
//! - Ternary: `? :`
//! - Type casts: `(type)expr`
//! - `sizeof` on types and expressions
//!
//! Parentheses are kept as [`Expr::Paren`] nodes so printing reproduces them.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser<'_> {
    /// Parse expression (top-level entry point, comma operator included)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_assignment()?;

        while self.match_token(&Token::Comma(self.current_location())) {
            let location = self.previous_location();
            let right = self.parse_assignment()?;
            left = Expr::Comma {
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    /// Parse assignment or ternary (right-associative)
    pub(crate) fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_conditional()?;

        let loc = self.current_location();
        let op = match self.peek() {
            Token::Eq(_) => None,
            Token::PlusEq(_) => Some(BinOp::Add),
            Token::MinusEq(_) => Some(BinOp::Sub),
            Token::StarEq(_) => Some(BinOp::Mul),
            Token::SlashEq(_) => Some(BinOp::Div),
            Token::PercentEq(_) => Some(BinOp::Mod),
            Token::AmpEq(_) => Some(BinOp::BitAnd),
            Token::PipeEq(_) => Some(BinOp::BitOr),
            Token::CaretEq(_) => Some(BinOp::BitXor),
            Token::LtLtEq(_) => Some(BinOp::BitShl),
            Token::GtGtEq(_) => Some(BinOp::BitShr),
            _ => return Ok(expr),
        };
        self.advance();

        let rhs = Box::new(self.parse_assignment()?);
        Ok(Expr::Assign {
            op,
            lhs: Box::new(expr),
            rhs,
            location: loc,
        })
    }

    /// Parse ternary: condition ? then_expr : else_expr
    pub(crate) fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_logical_or()?;

        if self.match_token(&Token::Question(self.current_location())) {
            let loc = self.previous_location();
            let then_expr = Box::new(self.parse_expression()?);
            self.expect_colon("in ternary expression")?;
            let else_expr = Box::new(self.parse_conditional()?);

            return Ok(Expr::Ternary {
                condition: Box::new(expr),
                then_expr,
                else_expr,
                location: loc,
            });
        }

        Ok(expr)
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.match_token(&Token::OrOr(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_logical_and()?);
            left = Expr::Binary {
                op: BinOp::Or,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitwise_or()?;

        while self.match_token(&Token::AndAnd(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_bitwise_or()?);
            left = Expr::Binary {
                op: BinOp::And,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse bitwise OR (|)
    fn parse_bitwise_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitwise_xor()?;

        while self.match_token(&Token::Pipe(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_bitwise_xor()?);
            left = Expr::Binary {
                op: BinOp::BitOr,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse bitwise XOR (^)
    fn parse_bitwise_xor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitwise_and()?;

        while self.match_token(&Token::Caret(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_bitwise_and()?);
            left = Expr::Binary {
                op: BinOp::BitXor,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse bitwise AND (&)
    fn parse_bitwise_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;

        while self.match_token(&Token::Amp(self.current_location())) {
            let loc = self.previous_location();
            let right = Box::new(self.parse_equality()?);
            left = Expr::Binary {
                op: BinOp::BitAnd,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse equality (== !=)
    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_relational()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::EqEq(loc)) {
                BinOp::Eq
            } else if self.match_token(&Token::NotEq(loc)) {
                BinOp::Ne
            } else {
                break;
            };

            let right = Box::new(self.parse_relational()?);
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_shift()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Lt(loc)) {
                BinOp::Lt
            } else if self.match_token(&Token::Le(loc)) {
                BinOp::Le
            } else if self.match_token(&Token::Gt(loc)) {
                BinOp::Gt
            } else if self.match_token(&Token::Ge(loc)) {
                BinOp::Ge
            } else {
                break;
            };

            let right = Box::new(self.parse_shift()?);
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse bitwise shift (<< >>)
    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::LtLt(loc)) {
                BinOp::BitShl
            } else if self.match_token(&Token::GtGt(loc)) {
                BinOp::BitShr
            } else {
                break;
            };

            let right = Box::new(self.parse_additive()?);
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Plus(loc)) {
                BinOp::Add
            } else if self.match_token(&Token::Minus(loc)) {
                BinOp::Sub
            } else {
                break;
            };

            let right = Box::new(self.parse_multiplicative()?);
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_cast()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Star(loc)) {
                BinOp::Mul
            } else if self.match_token(&Token::Slash(loc)) {
                BinOp::Div
            } else if self.match_token(&Token::Percent(loc)) {
                BinOp::Mod
            } else {
                break;
            };

            let right = Box::new(self.parse_cast()?);
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Is the parenthesis under the cursor the start of a type name?
    fn paren_starts_type(&mut self) -> bool {
        if !self.check(&Token::LParen(self.current_location())) {
            return false;
        }
        let saved_pos = self.position;
        self.advance();
        let is_type = self.is_type_start();
        self.position = saved_pos;
        is_type
    }

    /// Parse cast: (Type*)expr
    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        if self.paren_starts_type() {
            let loc = self.current_location();
            self.advance(); // consume '('
            let target_type = self.parse_type_name()?;
            self.expect_rparen("after cast type")?;
            let expr = Box::new(self.parse_cast()?);

            return Ok(Expr::Cast {
                target_type,
                expr,
                location: loc,
            });
        }

        self.parse_unary()
    }

    /// Parse unary (! ~ - + & * ++ -- sizeof)
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        let op = match self.peek() {
            Token::Bang(_) => Some(UnOp::Not),
            Token::Tilde(_) => Some(UnOp::BitNot),
            Token::Minus(_) => Some(UnOp::Neg),
            Token::Plus(_) => Some(UnOp::Plus),
            Token::Amp(_) => Some(UnOp::AddrOf),
            Token::Star(_) => Some(UnOp::Deref),
            Token::PlusPlus(_) => Some(UnOp::PreInc),
            Token::MinusMinus(_) => Some(UnOp::PreDec),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            // ++/-- bind to a unary operand; the others to a cast expression
            let operand = if matches!(op, UnOp::PreInc | UnOp::PreDec) {
                self.parse_unary()?
            } else {
                self.parse_cast()?
            };
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                location: loc,
            });
        }

        if self.match_token(&Token::Sizeof(loc)) {
            if self.paren_starts_type() {
                self.advance(); // consume '('
                let target_type = self.parse_type_name()?;
                self.expect_rparen("after sizeof type")?;
                return Ok(Expr::SizeofType {
                    target_type,
                    location: loc,
                });
            }

            let expr = Box::new(self.parse_unary()?);
            return Ok(Expr::SizeofExpr {
                expr,
                location: loc,
            });
        }

        self.parse_postfix()
    }

    /// Parse postfix (++ -- [] . -> ())
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let loc = self.current_location();

            if self.match_token(&Token::PlusPlus(loc)) {
                expr = Expr::Unary {
                    op: UnOp::PostInc,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else if self.match_token(&Token::MinusMinus(loc)) {
                expr = Expr::Unary {
                    op: UnOp::PostDec,
                    operand: Box::new(expr),
                    location: loc,
                };
            } else if self.match_token(&Token::LBracket(loc)) {
                let index = Box::new(self.parse_expression()?);
                self.expect_token(
                    &Token::RBracket(self.current_location()),
                    "Expected ']' after array index",
                )?;
                expr = Expr::Index {
                    array: Box::new(expr),
                    index,
                    location: loc,
                };
            } else if self.match_token(&Token::Dot(loc)) {
                let member = self.expect_identifier()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    member,
                    arrow: false,
                    location: loc,
                };
            } else if self.match_token(&Token::Arrow(loc)) {
                let member = self.expect_identifier()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    member,
                    arrow: true,
                    location: loc,
                };
            } else if self.match_token(&Token::LParen(loc)) {
                let args = self.parse_argument_list()?;
                self.expect_rparen("after function arguments")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    location: loc,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse argument list: (expr, expr, ...)
    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_assignment()?);

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(args)
    }

    /// Parse primary (literals, names, parenthesized expressions)
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        match self.peek_token() {
            Token::Number(text, loc) => {
                self.advance();
                Ok(Expr::Number(text, loc))
            }
            Token::CharLiteral(text, loc) => {
                self.advance();
                Ok(Expr::CharLiteral(text, loc))
            }
            Token::StringLiteral(first, loc) => {
                self.advance();
                let mut pieces = vec![first];
                while let Token::StringLiteral(next, _) = self.peek_token() {
                    self.advance();
                    pieces.push(next);
                }
                Ok(Expr::StringLiteral(pieces, loc))
            }
            Token::Ident(text, location) => {
                self.advance();
                Ok(Expr::Name {
                    text,
                    binding: Binding::Unresolved,
                    location,
                })
            }
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                Ok(Expr::Paren(Box::new(expr), loc))
            }
            other => Err(self.error_at(format!("Unexpected token: {}", other), loc)),
        }
    }
}
