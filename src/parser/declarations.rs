//! Declaration parsing implementation
//!
//! This module handles parsing of declarations at file and block scope:
//!
//! - Declaration specifiers: storage class, qualifiers, base type
//! - `struct`/`union` and `enum` specifiers, with or without bodies
//! - Declarators: pointers, arrays, function parameter lists and
//!   pointer-to-function declarators
//! - Function definitions, prototypes, data declarations and typedefs
//!
//! # Grammar
//!
//! ```text
//! declaration  ::= specifiers (declarator ("=" initializer)?) ("," ...)* ";"
//!                | specifiers declarator block
//! specifiers   ::= (storage | qualifier | type_word | struct_spec | enum_spec | typedef_name)+
//! declarator   ::= "*"* (identifier | "(" "*"+ identifier? dims ")" "(" params ")") params? dims
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

/// Storage class plus base type shared by every declarator of a declaration
pub(crate) struct DeclSpec {
    pub storage: Storage,
    pub is_typedef: bool,
    pub base: Type,
}

/// One parsed declarator, before it is turned into a declaration
pub(crate) struct Declarator {
    pub name: Option<String>,
    pub decl_type: Type,
    /// Present when the declarator declares a function
    pub params: Option<ParamList>,
    pub location: SourceLocation,
}

impl Parser<'_> {
    /// Parse one file-scope declaration. Struct, union and enum bodies met
    /// along the way come back as extra items ahead of the declarations.
    pub(crate) fn parse_external_declaration(&mut self) -> Result<Vec<TopLevel>, ParseError> {
        let mut items = Vec::new();
        let spec = self.parse_decl_specifiers(&mut items)?;

        // `struct Foo { ... };` or `enum { A, B };`
        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(items);
        }

        let mut first = true;
        loop {
            let declarator = self.parse_declarator(&spec.base, false)?;
            let location = declarator.location;
            let name = declarator
                .name
                .ok_or_else(|| self.error_at("Expected declarator name", location))?;

            if spec.is_typedef {
                self.type_names.insert(name.clone());
                let mut target = declarator.decl_type;
                if let Some(params) = declarator.params {
                    target.fn_pointer = Some(Box::new(FnPointer { depth: 0, params }));
                }
                // typedef struct { ... } Name;
                if target.base == BaseType::Struct(String::new()) {
                    target.base = BaseType::Struct(name.clone());
                    for item in items.iter_mut().rev() {
                        if let TopLevel::Type(TypeItem::Struct { name: tag @ None, .. }) = item {
                            *tag = Some(name.clone());
                            break;
                        }
                    }
                }
                items.push(TopLevel::Type(TypeItem::Typedef {
                    name,
                    target,
                    location,
                }));
            } else if let Some(params) = declarator.params {
                let body = if first && self.check(&Token::LBrace(self.current_location())) {
                    Some(self.parse_compound()?)
                } else {
                    None
                };
                let is_definition = body.is_some();

                items.push(TopLevel::Decl(Decl {
                    name,
                    kind: DeclKind::Function,
                    storage: spec.storage,
                    decl_type: declarator.decl_type,
                    params,
                    body,
                    init: None,
                    span: self.span(location),
                }));

                if is_definition {
                    return Ok(items);
                }
            } else {
                let init = if self.match_token(&Token::Eq(self.current_location())) {
                    Some(self.parse_initializer()?)
                } else {
                    None
                };

                items.push(TopLevel::Decl(Decl {
                    name,
                    kind: DeclKind::Data,
                    storage: spec.storage,
                    decl_type: declarator.decl_type,
                    params: ParamList::Unspecified,
                    body: None,
                    init,
                    span: self.span(location),
                }));
            }

            first = false;
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_semicolon("after declaration")?;
        Ok(items)
    }

    /// Parse declaration specifiers. Type definitions found inside them
    /// (struct bodies, enumerations) are appended to `types`.
    pub(crate) fn parse_decl_specifiers(
        &mut self,
        types: &mut Vec<TopLevel>,
    ) -> Result<DeclSpec, ParseError> {
        let start = self.current_location();
        let mut storage = Storage::Default;
        let mut is_typedef = false;
        let mut is_const = false;
        let mut words: Vec<&'static str> = Vec::new();
        let mut base: Option<BaseType> = None;

        loop {
            let word = match self.peek_token() {
                Token::Typedef(_) => {
                    is_typedef = true;
                    None
                }
                Token::Static(_) => {
                    storage = Storage::Static;
                    None
                }
                Token::Extern(_) => {
                    storage = Storage::Extern;
                    None
                }
                Token::Register(_) => {
                    storage = Storage::Register;
                    None
                }
                Token::Auto(_) | Token::Inline(_) | Token::Volatile(_) => None,
                Token::Const(_) => {
                    is_const = true;
                    None
                }
                Token::Void(_) => {
                    base = Some(BaseType::Void);
                    None
                }
                Token::Int(_) => Some("int"),
                Token::Char(_) => Some("char"),
                Token::Short(_) => Some("short"),
                Token::Long(_) => Some("long"),
                Token::Float(_) => Some("float"),
                Token::Double(_) => Some("double"),
                Token::Signed(_) => Some("signed"),
                Token::Unsigned(_) => Some("unsigned"),
                Token::Struct(_) | Token::Union(_) => {
                    base = Some(self.parse_struct_specifier(types)?);
                    continue;
                }
                Token::Enum(_) => {
                    base = Some(self.parse_enum_specifier(types)?);
                    continue;
                }
                Token::Ident(name, _) if base.is_none() && words.is_empty() => {
                    if !self.ident_starts_specifier(&name) {
                        break;
                    }
                    self.type_names.insert(name.clone());
                    base = Some(BaseType::Named(name));
                    None
                }
                _ => break,
            };
            if let Some(word) = word {
                words.push(word);
            }
            self.advance();
        }

        let base = match (base, words.is_empty()) {
            (Some(base), true) => base,
            (None, false) => BaseType::Primitive(words.join(" ")),
            (Some(_), false) => {
                return Err(self.error_at("Conflicting type specifiers", start));
            }
            (None, true) => {
                return Err(self.error(format!("Expected type, found {}", self.peek())));
            }
        };

        let mut base = Type::new(base);
        base.is_const = is_const;
        Ok(DeclSpec {
            storage,
            is_typedef,
            base,
        })
    }

    /// With no type seen yet, a leading identifier is a typedef name unless
    /// it is directly followed by something only a declarator name takes.
    fn ident_starts_specifier(&self, name: &str) -> bool {
        if self.type_names.contains(name) {
            return true;
        }
        !matches!(
            self.peek_ahead(1),
            Some(
                Token::Semicolon(_)
                    | Token::Eq(_)
                    | Token::Comma(_)
                    | Token::LBracket(_)
                    | Token::LParen(_)
                    | Token::RParen(_)
                    | Token::Colon(_)
            )
        )
    }

    /// Parse `struct Tag`, `struct Tag { ... }` or `struct { ... }`
    fn parse_struct_specifier(&mut self, types: &mut Vec<TopLevel>) -> Result<BaseType, ParseError> {
        let location = self.current_location();
        let is_union = matches!(self.advance(), Token::Union(_));

        let tag = if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Some(name)
        } else {
            None
        };

        if self.match_token(&Token::LBrace(self.current_location())) {
            let fields = self.parse_struct_fields(types)?;
            self.expect_rbrace("after struct fields")?;
            types.push(TopLevel::Type(TypeItem::Struct {
                name: tag.clone(),
                fields,
                is_union,
                location,
            }));
        } else if tag.is_none() {
            return Err(self.error("Expected struct name or '{'"));
        }

        let tag = tag.unwrap_or_default();
        Ok(if is_union {
            BaseType::Union(tag)
        } else {
            BaseType::Struct(tag)
        })
    }

    /// Parse struct fields up to (not including) the closing brace
    fn parse_struct_fields(&mut self, types: &mut Vec<TopLevel>) -> Result<Vec<Field>, ParseError> {
        let mut fields = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            let spec = self.parse_decl_specifiers(types)?;

            // unnamed member: `union { ... };` or an embedded `Lock;`
            if self.match_token(&Token::Semicolon(self.current_location())) {
                continue;
            }

            loop {
                let declarator = self.parse_declarator(&spec.base, false)?;
                // bit-field width
                if self.match_token(&Token::Colon(self.current_location())) {
                    self.parse_conditional()?;
                }
                let mut field_type = declarator.decl_type;
                if let Some(params) = declarator.params {
                    field_type.fn_pointer = Some(Box::new(FnPointer { depth: 0, params }));
                }
                if let Some(name) = declarator.name {
                    fields.push(Field { name, field_type });
                }
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
            }
            self.expect_semicolon("after struct field")?;
        }

        Ok(fields)
    }

    /// Parse `enum Tag`, `enum Tag { ... }` or `enum { ... }`. Every
    /// enumerant becomes a file-scope declaration of its own.
    fn parse_enum_specifier(&mut self, types: &mut Vec<TopLevel>) -> Result<BaseType, ParseError> {
        let location = self.current_location();
        self.advance(); // consume 'enum'

        let tag = if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Some(name)
        } else {
            None
        };

        if self.match_token(&Token::LBrace(self.current_location())) {
            let enumerant_type = Type::new(BaseType::Primitive("int".to_string()));
            let mut names = Vec::new();
            let mut decls = Vec::new();

            while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
                let at = self.current_location();
                let name = self.expect_identifier()?;
                let init = if self.match_token(&Token::Eq(self.current_location())) {
                    Some(self.parse_conditional()?)
                } else {
                    None
                };
                names.push(name.clone());
                decls.push(TopLevel::Decl(Decl {
                    name,
                    kind: DeclKind::Enumerant,
                    storage: Storage::Default,
                    decl_type: enumerant_type.clone(),
                    params: ParamList::Unspecified,
                    body: None,
                    init,
                    span: self.span(at),
                }));
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
            }
            self.expect_rbrace("after enumerants")?;

            types.push(TopLevel::Type(TypeItem::Enum {
                name: tag.clone(),
                enumerants: names,
                location,
            }));
            types.extend(decls);
        } else if tag.is_none() {
            return Err(self.error("Expected enum name or '{'"));
        }

        Ok(BaseType::Enum(tag.unwrap_or_default()))
    }

    /// Parse a declarator on top of `base`. With `abstract_ok` the name may
    /// be left out, as in prototypes and casts.
    pub(crate) fn parse_declarator(
        &mut self,
        base: &Type,
        abstract_ok: bool,
    ) -> Result<Declarator, ParseError> {
        let mut decl_type = base.clone();

        loop {
            if self.match_token(&Token::Star(self.current_location())) {
                decl_type.pointer_depth += 1;
            } else if !self.match_token(&Token::Const(self.current_location()))
                && !self.match_token(&Token::Volatile(self.current_location()))
            {
                break;
            }
        }

        let location = self.current_location();

        // void (*name[N])(params)
        if self.check(&Token::LParen(location))
            && matches!(self.peek_ahead(1), Some(Token::Star(_)))
        {
            self.advance();
            let mut depth = 0;
            while self.match_token(&Token::Star(self.current_location())) {
                depth += 1;
            }
            let location = self.current_location();
            let name = self.declarator_name(abstract_ok)?;
            self.parse_array_dims(&mut decl_type)?;
            self.expect_rparen("in function pointer declarator")?;
            self.expect_lparen("before function pointer parameters")?;
            let params = self.parse_parameter_list()?;
            decl_type.fn_pointer = Some(Box::new(FnPointer { depth, params }));

            return Ok(Declarator {
                name,
                decl_type,
                params: None,
                location,
            });
        }

        let name = self.declarator_name(abstract_ok)?;

        let params = if self.match_token(&Token::LParen(self.current_location())) {
            Some(self.parse_parameter_list()?)
        } else {
            None
        };

        self.parse_array_dims(&mut decl_type)?;

        Ok(Declarator {
            name,
            decl_type,
            params,
            location,
        })
    }

    fn declarator_name(&mut self, abstract_ok: bool) -> Result<Option<String>, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(Some(name))
        } else if abstract_ok {
            Ok(None)
        } else {
            Err(self.error(format!("Expected identifier, found {}", self.peek())))
        }
    }

    /// Parse `[N]` suffixes; `[]` records an unsized dimension
    fn parse_array_dims(&mut self, decl_type: &mut Type) -> Result<(), ParseError> {
        while self.match_token(&Token::LBracket(self.current_location())) {
            if self.match_token(&Token::RBracket(self.current_location())) {
                decl_type.array_dims.push(None);
            } else {
                let size = self.parse_conditional()?;
                decl_type.array_dims.push(Some(size));
                self.expect_token(
                    &Token::RBracket(self.current_location()),
                    "Expected ']' after array size",
                )?;
            }
        }
        Ok(())
    }

    /// Parse a parameter list after its opening parenthesis, consuming the
    /// closing one.
    pub(crate) fn parse_parameter_list(&mut self) -> Result<ParamList, ParseError> {
        if self.match_token(&Token::RParen(self.current_location())) {
            return Ok(ParamList::Unspecified);
        }

        // (void) means no parameters in C
        if self.check(&Token::Void(self.current_location()))
            && matches!(self.peek_ahead(1), Some(Token::RParen(_)))
        {
            self.advance();
            self.advance();
            return Ok(ParamList::Void);
        }

        let mut params = Vec::new();
        let mut variadic = false;
        loop {
            if self.match_token(&Token::Ellipsis(self.current_location())) {
                variadic = true;
                break;
            }

            let mut nested = Vec::new();
            let spec = self.parse_decl_specifiers(&mut nested)?;
            let declarator = self.parse_declarator(&spec.base, true)?;
            let mut param_type = declarator.decl_type;
            if let Some(params) = declarator.params {
                param_type.fn_pointer = Some(Box::new(FnPointer { depth: 0, params }));
            }
            params.push(Param {
                name: declarator.name,
                param_type,
            });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_rparen("after parameters")?;
        Ok(ParamList::List { params, variadic })
    }

    /// Parse a type name as used by casts and `sizeof`
    pub(crate) fn parse_type_name(&mut self) -> Result<Type, ParseError> {
        let mut nested = Vec::new();
        let spec = self.parse_decl_specifiers(&mut nested)?;
        let declarator = self.parse_declarator(&spec.base, true)?;
        if declarator.name.is_some() {
            return Err(self.error_at("Unexpected name in type", declarator.location));
        }
        Ok(declarator.decl_type)
    }

    /// Parse an initializer: an expression or a braced list
    pub(crate) fn parse_initializer(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();
        if !self.match_token(&Token::LBrace(location)) {
            return self.parse_assignment();
        }

        let mut items = Vec::new();
        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            items.push(self.parse_initializer()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_rbrace("after initializer list")?;

        Ok(Expr::InitList { items, location })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::{Parser, TypeNames};

    fn parse_with(source: &str, names: &mut TypeNames) -> Vec<TopLevel> {
        let mut parser = Parser::new(source, FileId(0), "l.h", names).unwrap();
        parser.parse_translation_unit().unwrap().items
    }

    fn decls(items: &[TopLevel]) -> Vec<&Decl> {
        items
            .iter()
            .filter_map(|item| match item {
                TopLevel::Decl(decl) => Some(decl),
                TopLevel::Type(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_multiple_declarators_and_initializers() {
        let mut names = TypeNames::default();
        let items = parse_with("static int a, *b, c[4] = { 1, 2, 3, 4 };", &mut names);
        let decls = decls(&items);

        assert_eq!(decls.len(), 3);
        assert!(decls.iter().all(|d| d.storage == Storage::Static));
        assert_eq!(decls[1].decl_type.pointer_depth, 1);
        assert_eq!(decls[2].decl_type.array_dims.len(), 1);
        assert!(matches!(decls[2].init, Some(Expr::InitList { ref items, .. }) if items.len() == 4));
    }

    #[test]
    fn test_typedef_and_struct() {
        let mut names = TypeNames::default();
        let items = parse_with(
            "typedef struct Link Link;\nstruct Link { int goarm; Prog *curp; char *(*name)(int); };",
            &mut names,
        );

        assert!(names.contains("Link"));
        let fields = items.iter().find_map(|item| match item {
            TopLevel::Type(TypeItem::Struct { name, fields, .. }) if name.as_deref() == Some("Link") => {
                Some(fields)
            }
            _ => None,
        });
        let fields = fields.expect("struct Link");
        let field_names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(field_names, vec!["goarm", "curp", "name"]);
        assert!(fields[2].field_type.fn_pointer.is_some());
    }

    #[test]
    fn test_anonymous_struct_takes_typedef_name() {
        let mut names = TypeNames::default();
        let items = parse_with("typedef struct { int x; } Optab;", &mut names);
        assert!(matches!(
            &items[0],
            TopLevel::Type(TypeItem::Struct { name: Some(tag), .. }) if tag == "Optab"
        ));
        assert!(names.contains("Optab"));
    }

    #[test]
    fn test_enumerants_become_declarations() {
        let mut names = TypeNames::default();
        let items = parse_with("enum { C_NONE, C_REG = 4, C_RSP, };", &mut names);
        let decls = decls(&items);

        let enumerants: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(enumerants, vec!["C_NONE", "C_REG", "C_RSP"]);
        assert!(decls.iter().all(|d| d.kind == DeclKind::Enumerant));
        assert!(decls[1].init.is_some());
    }

    #[test]
    fn test_prototypes_and_parameter_lists() {
        let mut names = TypeNames::default();
        names.insert("Prog".to_string());
        let items = parse_with(
            "void span(void);\nint asmout(Prog*, int);\nvoid diag(char*, ...);\nvoid old();",
            &mut names,
        );
        let decls = decls(&items);

        assert_eq!(decls[0].params, ParamList::Void);
        assert_eq!(decls[1].params.params().len(), 2);
        assert_eq!(decls[1].params.params()[0].name, None);
        assert!(matches!(decls[2].params, ParamList::List { variadic: true, .. }));
        assert_eq!(decls[3].params, ParamList::Unspecified);
        assert!(decls.iter().all(|d| d.body.is_none() && d.is_function()));
    }

    #[test]
    fn test_function_pointer_table() {
        let mut names = TypeNames::default();
        let items = parse_with("void (*handlers[4])(int);", &mut names);
        let decls = decls(&items);

        assert_eq!(decls[0].name, "handlers");
        assert_eq!(decls[0].kind, DeclKind::Data);
        let fp = decls[0].decl_type.fn_pointer.as_ref().unwrap();
        assert_eq!(fp.depth, 1);
        assert_eq!(decls[0].decl_type.array_dims.len(), 1);
    }
}
