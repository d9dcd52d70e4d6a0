// AST definitions for the C front end

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Index of a source file inside a [`crate::program::Program`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

/// Stable identity of a file-scope declaration.
///
/// Names change during refactoring; ids never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Originating file and position of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub file: FileId,
    pub start: SourceLocation,
}

/// Base types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    Void,
    /// Keyword spelled types: `int`, `unsigned long`, `double`, ...
    Primitive(String),
    Struct(String),
    Union(String),
    Enum(String),
    /// A typedef name such as `Prog` or `uchar`
    Named(String),
}

/// Pointer-to-function part of a declarator: `void (*name)(Link*, Prog*)`
#[derive(Debug, Clone, PartialEq)]
pub struct FnPointer {
    /// Stars inside the parentheses; 0 for a plain function type
    pub depth: usize,
    pub params: ParamList,
}

/// Type representation with const qualifier, pointers, and arrays
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub base: BaseType,
    pub is_const: bool,
    pub pointer_depth: usize, // 0 = not pointer, 1 = *, 2 = **, etc.
    pub array_dims: Vec<Option<Expr>>, // None for `[]`
    /// When set, `pointer_depth` belongs to the return type and
    /// `array_dims` sit inside the parentheses
    pub fn_pointer: Option<Box<FnPointer>>,
}

impl Type {
    pub fn new(base: BaseType) -> Self {
        Type {
            base,
            is_const: false,
            pointer_depth: 0,
            array_dims: Vec::new(),
            fn_pointer: None,
        }
    }

    pub fn named(name: &str) -> Self {
        Type::new(BaseType::Named(name.to_string()))
    }

    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn with_pointer(mut self) -> Self {
        self.pointer_depth += 1;
        self
    }

    pub fn with_array(mut self, size: Option<Expr>) -> Self {
        self.array_dims.push(size);
        self
    }

    pub fn is_void(&self) -> bool {
        self.base == BaseType::Void
            && self.pointer_depth == 0
            && self.array_dims.is_empty()
            && self.fn_pointer.is_none()
    }
}

/// Storage class; `Static` is the file-local visibility the staticizer sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Storage {
    #[default]
    Default,
    Static,
    Extern,
    Register,
}

impl Storage {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Storage::Default => None,
            Storage::Static => Some("static"),
            Storage::Extern => Some("extern"),
            Storage::Register => Some("register"),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    BitShl,
    BitShr,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitShl => "<<",
            BinOp::BitShr => ">>",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,     // -x
    Plus,    // +x
    Not,     // !x
    BitNot,  // ~x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
    Deref,   // *x
    AddrOf,  // &x
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Plus => "+",
            UnOp::Not => "!",
            UnOp::BitNot => "~",
            UnOp::PreInc | UnOp::PostInc => "++",
            UnOp::PreDec | UnOp::PostDec => "--",
            UnOp::Deref => "*",
            UnOp::AddrOf => "&",
        }
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, UnOp::PostInc | UnOp::PostDec)
    }
}

/// What a name reference denotes after resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binding {
    /// Not (yet) resolved, or resolved to nothing we track: a library symbol
    #[default]
    Unresolved,
    /// A parameter or block-scope variable
    Local,
    /// A file-scope declaration
    Global(DeclId),
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<String>,
    pub param_type: Type,
}

/// Parameter list of a function declarator
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParamList {
    /// `f()`
    #[default]
    Unspecified,
    /// `f(void)`
    Void,
    List { params: Vec<Param>, variadic: bool },
}

impl ParamList {
    pub fn params(&self) -> &[Param] {
        match self {
            ParamList::List { params, .. } => params,
            _ => &[],
        }
    }
}

/// Struct or union field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: Type,
}

/// File-scope type definitions. They are parsed so field lists and typedef
/// names are known, but they are never tracked or emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeItem {
    Struct {
        name: Option<String>,
        fields: Vec<Field>,
        is_union: bool,
        location: SourceLocation,
    },
    Enum {
        name: Option<String>,
        enumerants: Vec<String>,
        location: SourceLocation,
    },
    Typedef {
        name: String,
        target: Type,
        location: SourceLocation,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Function,
    Data,
    Enumerant,
}

/// A file-scope declaration: the unit the catalog tracks
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub name: String,
    pub kind: DeclKind,
    pub storage: Storage,
    /// Return type for functions, object type otherwise
    pub decl_type: Type,
    pub params: ParamList,
    pub body: Option<Block>,
    pub init: Option<Expr>,
    pub span: Span,
}

impl Decl {
    pub fn is_function(&self) -> bool {
        self.kind == DeclKind::Function
    }

    /// Definitions own storage in the output: function bodies and data that
    /// is not a bare `extern` declaration.
    pub fn is_definition(&self) -> bool {
        match self.kind {
            DeclKind::Function => self.body.is_some(),
            DeclKind::Data => self.storage != Storage::Extern || self.init.is_some(),
            DeclKind::Enumerant => false,
        }
    }
}

/// One top-level item of a translation unit, as produced by the parser
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevel {
    Decl(Decl),
    Type(TypeItem),
}

/// A parsed source file
#[derive(Debug, Clone, Default)]
pub struct TranslationUnit {
    pub items: Vec<TopLevel>,
}

/// Brace-enclosed statement list
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub location: SourceLocation,
}

/// Block-scope variable (or prototype) declarator
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    pub name: String,
    pub var_type: Type,
    pub params: Option<ParamList>,
    pub init: Option<Expr>,
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Decl {
        storage: Storage,
        vars: Vec<LocalVar>,
        location: SourceLocation,
    },
    Expr {
        expr: Expr,
        location: SourceLocation,
    },
    Return {
        expr: Option<Expr>,
        location: SourceLocation,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        location: SourceLocation,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
        location: SourceLocation,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    Switch {
        expr: Expr,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    Case {
        value: Expr,
        location: SourceLocation,
    },
    Default {
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Goto {
        label: String,
        location: SourceLocation,
    },
    Label {
        name: String,
        location: SourceLocation,
    },
    Block(Block),
    Empty {
        location: SourceLocation,
    },
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A name reference. `text` is the literal spelling that gets printed,
    /// which rewrites may replace with arbitrary text (`ctxt->curtext`).
    Name {
        text: String,
        binding: Binding,
        location: SourceLocation,
    },
    Number(String, SourceLocation),
    CharLiteral(String, SourceLocation),
    /// Adjacent literals are kept as separate raw pieces
    StringLiteral(Vec<String>, SourceLocation),
    Paren(Box<Expr>, SourceLocation),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Assign {
        op: Option<BinOp>,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        location: SourceLocation,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Ternary {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
        location: SourceLocation,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        location: SourceLocation,
    },
    Index {
        array: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },
    Member {
        object: Box<Expr>,
        member: String,
        arrow: bool,
        location: SourceLocation,
    },
    Cast {
        target_type: Type,
        expr: Box<Expr>,
        location: SourceLocation,
    },
    SizeofType {
        target_type: Type,
        location: SourceLocation,
    },
    SizeofExpr {
        expr: Box<Expr>,
        location: SourceLocation,
    },
    Comma {
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    InitList {
        items: Vec<Expr>,
        location: SourceLocation,
    },
}

impl Expr {
    /// A bare reference to `text`, as inserted by rewrites
    pub fn name(text: &str, binding: Binding) -> Self {
        Expr::Name {
            text: text.to_string(),
            binding,
            location: SourceLocation::default(),
        }
    }

    /// The name this expression denotes, looking through parentheses
    pub fn as_name(&self) -> Option<(&str, Binding)> {
        match self {
            Expr::Name { text, binding, .. } => Some((text, *binding)),
            Expr::Paren(inner, _) => inner.as_name(),
            _ => None,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::Number(_, loc)
            | Expr::CharLiteral(_, loc)
            | Expr::StringLiteral(_, loc)
            | Expr::Paren(_, loc) => *loc,
            Expr::Name { location, .. }
            | Expr::Binary { location, .. }
            | Expr::Assign { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Ternary { location, .. }
            | Expr::Call { location, .. }
            | Expr::Index { location, .. }
            | Expr::Member { location, .. }
            | Expr::Cast { location, .. }
            | Expr::SizeofType { location, .. }
            | Expr::SizeofExpr { location, .. }
            | Expr::Comma { location, .. }
            | Expr::InitList { location, .. } => *location,
        }
    }
}
