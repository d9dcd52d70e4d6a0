//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Preprocessor directives (including backslash-continued lines) and comments
//! are skipped. Literals keep their raw spelling so the printer reproduces them
//! byte for byte.

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals (raw spelling; quotes stripped for chars and strings)
    Number(String, SourceLocation),
    CharLiteral(String, SourceLocation),
    StringLiteral(String, SourceLocation),

    Ident(String, SourceLocation),

    // Type keywords
    Int(SourceLocation),
    Char(SourceLocation),
    Void(SourceLocation),
    Short(SourceLocation),
    Long(SourceLocation),
    Float(SourceLocation),
    Double(SourceLocation),
    Signed(SourceLocation),
    Unsigned(SourceLocation),
    Struct(SourceLocation),
    Union(SourceLocation),
    Enum(SourceLocation),

    // Storage classes and qualifiers
    Typedef(SourceLocation),
    Static(SourceLocation),
    Extern(SourceLocation),
    Register(SourceLocation),
    Auto(SourceLocation),
    Const(SourceLocation),
    Volatile(SourceLocation),
    Inline(SourceLocation),

    // Statement keywords
    If(SourceLocation),
    Else(SourceLocation),
    While(SourceLocation),
    Do(SourceLocation),
    For(SourceLocation),
    Switch(SourceLocation),
    Case(SourceLocation),
    Default(SourceLocation),
    Break(SourceLocation),
    Continue(SourceLocation),
    Return(SourceLocation),
    Goto(SourceLocation),
    Sizeof(SourceLocation),

    // Arithmetic
    Plus(SourceLocation),    // +
    Minus(SourceLocation),   // -
    Star(SourceLocation),    // *
    Slash(SourceLocation),   // /
    Percent(SourceLocation), // %

    // Comparison
    EqEq(SourceLocation),  // ==
    NotEq(SourceLocation), // !=
    Lt(SourceLocation),    // <
    Le(SourceLocation),    // <=
    Gt(SourceLocation),    // >
    Ge(SourceLocation),    // >=

    // Logical
    AndAnd(SourceLocation), // &&
    OrOr(SourceLocation),   // ||
    Bang(SourceLocation),   // !

    // Bitwise
    Amp(SourceLocation),   // &
    Pipe(SourceLocation),  // |
    Caret(SourceLocation), // ^
    Tilde(SourceLocation), // ~
    LtLt(SourceLocation),  // <<
    GtGt(SourceLocation),  // >>

    // Assignment
    Eq(SourceLocation),        // =
    PlusEq(SourceLocation),    // +=
    MinusEq(SourceLocation),   // -=
    StarEq(SourceLocation),    // *=
    SlashEq(SourceLocation),   // /=
    PercentEq(SourceLocation), // %=
    AmpEq(SourceLocation),     // &=
    PipeEq(SourceLocation),    // |=
    CaretEq(SourceLocation),   // ^=
    LtLtEq(SourceLocation),    // <<=
    GtGtEq(SourceLocation),    // >>=

    PlusPlus(SourceLocation),   // ++
    MinusMinus(SourceLocation), // --

    Dot(SourceLocation),      // .
    Arrow(SourceLocation),    // ->
    Ellipsis(SourceLocation), // ...

    Question(SourceLocation), // ?
    Colon(SourceLocation),    // :

    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    LBracket(SourceLocation),  // [
    RBracket(SourceLocation),  // ]
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,

    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::Number(_, loc)
            | Token::CharLiteral(_, loc)
            | Token::StringLiteral(_, loc)
            | Token::Ident(_, loc)
            | Token::Int(loc)
            | Token::Char(loc)
            | Token::Void(loc)
            | Token::Short(loc)
            | Token::Long(loc)
            | Token::Float(loc)
            | Token::Double(loc)
            | Token::Signed(loc)
            | Token::Unsigned(loc)
            | Token::Struct(loc)
            | Token::Union(loc)
            | Token::Enum(loc)
            | Token::Typedef(loc)
            | Token::Static(loc)
            | Token::Extern(loc)
            | Token::Register(loc)
            | Token::Auto(loc)
            | Token::Const(loc)
            | Token::Volatile(loc)
            | Token::Inline(loc)
            | Token::If(loc)
            | Token::Else(loc)
            | Token::While(loc)
            | Token::Do(loc)
            | Token::For(loc)
            | Token::Switch(loc)
            | Token::Case(loc)
            | Token::Default(loc)
            | Token::Break(loc)
            | Token::Continue(loc)
            | Token::Return(loc)
            | Token::Goto(loc)
            | Token::Sizeof(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::Slash(loc)
            | Token::Percent(loc)
            | Token::EqEq(loc)
            | Token::NotEq(loc)
            | Token::Lt(loc)
            | Token::Le(loc)
            | Token::Gt(loc)
            | Token::Ge(loc)
            | Token::AndAnd(loc)
            | Token::OrOr(loc)
            | Token::Bang(loc)
            | Token::Amp(loc)
            | Token::Pipe(loc)
            | Token::Caret(loc)
            | Token::Tilde(loc)
            | Token::LtLt(loc)
            | Token::GtGt(loc)
            | Token::Eq(loc)
            | Token::PlusEq(loc)
            | Token::MinusEq(loc)
            | Token::StarEq(loc)
            | Token::SlashEq(loc)
            | Token::PercentEq(loc)
            | Token::AmpEq(loc)
            | Token::PipeEq(loc)
            | Token::CaretEq(loc)
            | Token::LtLtEq(loc)
            | Token::GtGtEq(loc)
            | Token::PlusPlus(loc)
            | Token::MinusMinus(loc)
            | Token::Dot(loc)
            | Token::Arrow(loc)
            | Token::Ellipsis(loc)
            | Token::Question(loc)
            | Token::Colon(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Eof(loc) => *loc,
        }
    }

    /// Keyword or punctuation spelling, for diagnostics
    fn spelling(&self) -> &'static str {
        match self {
            Token::Number(..) => "number",
            Token::CharLiteral(..) => "char literal",
            Token::StringLiteral(..) => "string literal",
            Token::Ident(..) => "identifier",
            Token::Int(_) => "int",
            Token::Char(_) => "char",
            Token::Void(_) => "void",
            Token::Short(_) => "short",
            Token::Long(_) => "long",
            Token::Float(_) => "float",
            Token::Double(_) => "double",
            Token::Signed(_) => "signed",
            Token::Unsigned(_) => "unsigned",
            Token::Struct(_) => "struct",
            Token::Union(_) => "union",
            Token::Enum(_) => "enum",
            Token::Typedef(_) => "typedef",
            Token::Static(_) => "static",
            Token::Extern(_) => "extern",
            Token::Register(_) => "register",
            Token::Auto(_) => "auto",
            Token::Const(_) => "const",
            Token::Volatile(_) => "volatile",
            Token::Inline(_) => "inline",
            Token::If(_) => "if",
            Token::Else(_) => "else",
            Token::While(_) => "while",
            Token::Do(_) => "do",
            Token::For(_) => "for",
            Token::Switch(_) => "switch",
            Token::Case(_) => "case",
            Token::Default(_) => "default",
            Token::Break(_) => "break",
            Token::Continue(_) => "continue",
            Token::Return(_) => "return",
            Token::Goto(_) => "goto",
            Token::Sizeof(_) => "sizeof",
            Token::Plus(_) => "+",
            Token::Minus(_) => "-",
            Token::Star(_) => "*",
            Token::Slash(_) => "/",
            Token::Percent(_) => "%",
            Token::EqEq(_) => "==",
            Token::NotEq(_) => "!=",
            Token::Lt(_) => "<",
            Token::Le(_) => "<=",
            Token::Gt(_) => ">",
            Token::Ge(_) => ">=",
            Token::AndAnd(_) => "&&",
            Token::OrOr(_) => "||",
            Token::Bang(_) => "!",
            Token::Amp(_) => "&",
            Token::Pipe(_) => "|",
            Token::Caret(_) => "^",
            Token::Tilde(_) => "~",
            Token::LtLt(_) => "<<",
            Token::GtGt(_) => ">>",
            Token::Eq(_) => "=",
            Token::PlusEq(_) => "+=",
            Token::MinusEq(_) => "-=",
            Token::StarEq(_) => "*=",
            Token::SlashEq(_) => "/=",
            Token::PercentEq(_) => "%=",
            Token::AmpEq(_) => "&=",
            Token::PipeEq(_) => "|=",
            Token::CaretEq(_) => "^=",
            Token::LtLtEq(_) => "<<=",
            Token::GtGtEq(_) => ">>=",
            Token::PlusPlus(_) => "++",
            Token::MinusMinus(_) => "--",
            Token::Dot(_) => ".",
            Token::Arrow(_) => "->",
            Token::Ellipsis(_) => "...",
            Token::Question(_) => "?",
            Token::Colon(_) => ":",
            Token::LParen(_) => "(",
            Token::RParen(_) => ")",
            Token::LBrace(_) => "{",
            Token::RBrace(_) => "}",
            Token::LBracket(_) => "[",
            Token::RBracket(_) => "]",
            Token::Semicolon(_) => ";",
            Token::Comma(_) => ",",
            Token::Eof(_) => "end of file",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n, _) => write!(f, "number {}", n),
            Token::CharLiteral(c, _) => write!(f, "char literal '{}'", c),
            Token::StringLiteral(s, _) => write!(f, "string literal \"{}\"", s),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Eof(_) => write!(f, "end of file"),
            other => write!(f, "'{}'", other.spelling()),
        }
    }
}

/// Lexer error type
#[derive(Debug, Error)]
#[error("Lexer error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    at_line_start: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            at_line_start: true,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            if self.at_line_start && self.peek() == Some('#') {
                self.skip_preprocessor_directive();
                continue;
            }

            self.at_line_start = false;
            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        let token = match ch {
            '"' => return self.quoted('"', loc).map(|s| Token::StringLiteral(s, loc)),
            '\'' => return self.quoted('\'', loc).map(|s| Token::CharLiteral(s, loc)),
            '0'..='9' => self.number_literal(ch, loc),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal(ch, loc)
            }
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(ch, loc),

            '+' => {
                if self.eat('+') {
                    Token::PlusPlus(loc)
                } else if self.eat('=') {
                    Token::PlusEq(loc)
                } else {
                    Token::Plus(loc)
                }
            }
            '-' => {
                if self.eat('-') {
                    Token::MinusMinus(loc)
                } else if self.eat('=') {
                    Token::MinusEq(loc)
                } else if self.eat('>') {
                    Token::Arrow(loc)
                } else {
                    Token::Minus(loc)
                }
            }
            '*' => {
                if self.eat('=') {
                    Token::StarEq(loc)
                } else {
                    Token::Star(loc)
                }
            }
            '/' => {
                if self.eat('=') {
                    Token::SlashEq(loc)
                } else {
                    Token::Slash(loc)
                }
            }
            '%' => {
                if self.eat('=') {
                    Token::PercentEq(loc)
                } else {
                    Token::Percent(loc)
                }
            }
            '=' => {
                if self.eat('=') {
                    Token::EqEq(loc)
                } else {
                    Token::Eq(loc)
                }
            }
            '!' => {
                if self.eat('=') {
                    Token::NotEq(loc)
                } else {
                    Token::Bang(loc)
                }
            }
            '<' => {
                if self.eat('=') {
                    Token::Le(loc)
                } else if self.eat('<') {
                    if self.eat('=') {
                        Token::LtLtEq(loc)
                    } else {
                        Token::LtLt(loc)
                    }
                } else {
                    Token::Lt(loc)
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::Ge(loc)
                } else if self.eat('>') {
                    if self.eat('=') {
                        Token::GtGtEq(loc)
                    } else {
                        Token::GtGt(loc)
                    }
                } else {
                    Token::Gt(loc)
                }
            }
            '&' => {
                if self.eat('&') {
                    Token::AndAnd(loc)
                } else if self.eat('=') {
                    Token::AmpEq(loc)
                } else {
                    Token::Amp(loc)
                }
            }
            '|' => {
                if self.eat('|') {
                    Token::OrOr(loc)
                } else if self.eat('=') {
                    Token::PipeEq(loc)
                } else {
                    Token::Pipe(loc)
                }
            }
            '^' => {
                if self.eat('=') {
                    Token::CaretEq(loc)
                } else {
                    Token::Caret(loc)
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_ahead(1) == Some('.') {
                    self.advance();
                    self.advance();
                    Token::Ellipsis(loc)
                } else {
                    Token::Dot(loc)
                }
            }
            '~' => Token::Tilde(loc),
            '?' => Token::Question(loc),
            ':' => Token::Colon(loc),
            '(' => Token::LParen(loc),
            ')' => Token::RParen(loc),
            '{' => Token::LBrace(loc),
            '}' => Token::RBrace(loc),
            '[' => Token::LBracket(loc),
            ']' => Token::RBracket(loc),
            ';' => Token::Semicolon(loc),
            ',' => Token::Comma(loc),

            _ => {
                return Err(LexError {
                    message: format!("Unexpected character: '{}'", ch),
                    location: loc,
                })
            }
        };

        Ok(token)
    }

    /// Raw body of a quoted literal; escapes are kept verbatim
    fn quoted(&mut self, quote: char, loc: SourceLocation) -> Result<String, LexError> {
        let mut raw = String::new();

        while let Some(ch) = self.peek() {
            if ch == quote {
                self.advance();
                return Ok(raw);
            }
            if ch == '\n' {
                break;
            }
            raw.push(ch);
            self.advance();
            if ch == '\\' {
                let escaped = self.advance().ok_or_else(|| LexError {
                    message: "Unexpected end of file in literal".to_string(),
                    location: self.current_location(),
                })?;
                raw.push(escaped);
            }
        }

        Err(LexError {
            message: if quote == '"' {
                "Unterminated string literal".to_string()
            } else {
                "Unterminated character literal".to_string()
            },
            location: loc,
        })
    }

    /// Numeric literal: decimal, octal, hex, floats and suffixes, kept raw
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Token {
        let mut raw = String::new();
        raw.push(first);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' {
                raw.push(ch);
                self.advance();
                // exponent sign: 1e-5, 0x1p+3
                let is_hex = raw.starts_with("0x") || raw.starts_with("0X");
                let exponent = if is_hex {
                    matches!(ch, 'p' | 'P')
                } else {
                    matches!(ch, 'e' | 'E')
                };
                if exponent && matches!(self.peek(), Some('+') | Some('-')) {
                    if let Some(sign) = self.advance() {
                        raw.push(sign);
                    }
                }
            } else {
                break;
            }
        }

        Token::Number(raw, loc)
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "int" => Token::Int(loc),
            "char" => Token::Char(loc),
            "void" => Token::Void(loc),
            "short" => Token::Short(loc),
            "long" => Token::Long(loc),
            "float" => Token::Float(loc),
            "double" => Token::Double(loc),
            "signed" => Token::Signed(loc),
            "unsigned" => Token::Unsigned(loc),
            "struct" => Token::Struct(loc),
            "union" => Token::Union(loc),
            "enum" => Token::Enum(loc),
            "typedef" => Token::Typedef(loc),
            "static" => Token::Static(loc),
            "extern" => Token::Extern(loc),
            "register" => Token::Register(loc),
            "auto" => Token::Auto(loc),
            "const" => Token::Const(loc),
            "volatile" => Token::Volatile(loc),
            "inline" => Token::Inline(loc),
            "if" => Token::If(loc),
            "else" => Token::Else(loc),
            "while" => Token::While(loc),
            "do" => Token::Do(loc),
            "for" => Token::For(loc),
            "switch" => Token::Switch(loc),
            "case" => Token::Case(loc),
            "default" => Token::Default(loc),
            "break" => Token::Break(loc),
            "continue" => Token::Continue(loc),
            "return" => Token::Return(loc),
            "goto" => Token::Goto(loc),
            "sizeof" => Token::Sizeof(loc),
            _ => Token::Ident(ident, loc),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some('\n') => {
                    self.advance();
                    self.at_line_start = true;
                }
                Some(' ') | Some('\t') | Some('\r') | Some('\x0c') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...), leaving the newline in place
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Skip a preprocessor directive, honouring backslash continuations
    fn skip_preprocessor_directive(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\\' && self.peek_ahead(1) == Some('\n') {
                self.advance();
                self.advance();
                continue;
            }
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("void span(void) { return; }");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Void(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "span"));
        assert!(matches!(tokens[2], Token::LParen(_)));
        assert!(matches!(tokens[3], Token::Void(_)));
        assert!(matches!(tokens[4], Token::RParen(_)));
        assert!(matches!(tokens[5], Token::LBrace(_)));
        assert!(matches!(tokens[6], Token::Return(_)));
        assert!(matches!(tokens[7], Token::Semicolon(_)));
        assert!(matches!(tokens[8], Token::RBrace(_)));
        assert!(matches!(tokens[9], Token::Eof(_)));
    }

    #[test]
    fn test_operators() {
        let mut lexer = Lexer::new("++ -- += <<= >>= |= -> ... == !=");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::PlusPlus(_)));
        assert!(matches!(tokens[1], Token::MinusMinus(_)));
        assert!(matches!(tokens[2], Token::PlusEq(_)));
        assert!(matches!(tokens[3], Token::LtLtEq(_)));
        assert!(matches!(tokens[4], Token::GtGtEq(_)));
        assert!(matches!(tokens[5], Token::PipeEq(_)));
        assert!(matches!(tokens[6], Token::Arrow(_)));
        assert!(matches!(tokens[7], Token::Ellipsis(_)));
        assert!(matches!(tokens[8], Token::EqEq(_)));
        assert!(matches!(tokens[9], Token::NotEq(_)));
    }

    #[test]
    fn test_literals_stay_raw() {
        let mut lexer = Lexer::new(r#"0x1fUL 1e-5 '\n' "a\tb""#);
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Number(ref s, _) if s == "0x1fUL"));
        assert!(matches!(tokens[1], Token::Number(ref s, _) if s == "1e-5"));
        assert!(matches!(tokens[2], Token::CharLiteral(ref s, _) if s == "\\n"));
        assert!(matches!(tokens[3], Token::StringLiteral(ref s, _) if s == "a\\tb"));
    }

    #[test]
    fn test_comments() {
        let mut lexer = Lexer::new("int x; // comment\nint y; /* block\ncomment */ int z;");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[3], Token::Int(_)));
        assert!(matches!(tokens[4], Token::Ident(ref s, _) if s == "y"));
        assert!(matches!(tokens[6], Token::Int(_)));
        assert!(matches!(tokens[7], Token::Ident(ref s, _) if s == "z"));
    }

    #[test]
    fn test_preprocessor_skip() {
        let mut lexer = Lexer::new("#include <u.h>\n#define X(a) \\\n\t(a+1)\nint x;");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
        assert_eq!(tokens[0].location().line, 4);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let mut lexer = Lexer::new("\"abc\n");
        let err = lexer.tokenize().unwrap_err();
        assert!(err.message.contains("Unterminated"));
    }
}
