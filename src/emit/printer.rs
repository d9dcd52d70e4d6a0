//! C pretty printer in Plan 9 style
//!
//! Tabs for indentation, no space between a keyword and its parenthesis,
//! and the return type of a function definition on its own line.

use crate::parser::ast::*;

/// `static int f(int, Prog*);`
pub fn prototype(decl: &Decl) -> String {
    let mut p = Printer::new();
    p.storage(decl.storage);
    let head = format!("{}({})", decl.name, params(&decl.params, false));
    p.out.push_str(&declarator(&decl.decl_type, &head));
    p.out.push_str(";\n");
    p.finish()
}

/// Full function definition, ending with the closing brace and a newline
pub fn function(decl: &Decl) -> String {
    let mut p = Printer::new();
    p.storage(decl.storage);
    let head = format!("{}({})", decl.name, params(&decl.params, true));
    if decl.decl_type.fn_pointer.is_some() {
        p.out.push_str(&declarator(&decl.decl_type, &head));
    } else {
        p.out.push_str(&declarator(&decl.decl_type, ""));
        p.out.push('\n');
        p.out.push_str(&head);
    }
    p.out.push_str("\n{\n");
    if let Some(body) = &decl.body {
        p.stmts(&body.stmts, 1);
    }
    p.out.push_str("}\n");
    p.finish()
}

/// Data definition with its initializer
pub fn data(decl: &Decl) -> String {
    let mut p = Printer::new();
    p.storage(decl.storage);
    p.out.push_str(&declarator(&decl.decl_type, &decl.name));
    if let Some(init) = &decl.init {
        p.out.push_str(" = ");
        p.initializer(init);
    }
    p.out.push_str(";\n");
    p.finish()
}

/// Abstract type name, as used in casts and `sizeof`
pub fn type_name(ty: &Type) -> String {
    declarator(ty, "")
}

pub fn expr(e: &Expr) -> String {
    let mut p = Printer::new();
    p.expr(e);
    p.finish()
}

fn base_name(ty: &Type) -> String {
    let base = match &ty.base {
        BaseType::Void => "void".to_string(),
        BaseType::Primitive(name) | BaseType::Named(name) => name.clone(),
        BaseType::Struct(tag) => format!("struct {}", tag),
        BaseType::Union(tag) => format!("union {}", tag),
        BaseType::Enum(tag) => format!("enum {}", tag),
    };
    if ty.is_const {
        format!("const {}", base)
    } else {
        base
    }
}

/// Everything a declarator adds around `name`: stars, dimensions and the
/// function-pointer parentheses. Shared by all declarators of one statement.
fn declarator_tail(ty: &Type, name: &str) -> String {
    let mut inner = String::new();
    match &ty.fn_pointer {
        None => {
            inner.push_str(&"*".repeat(ty.pointer_depth));
            inner.push_str(name);
            dims(&mut inner, &ty.array_dims);
        }
        Some(fp) => {
            inner.push_str(&"*".repeat(ty.pointer_depth));
            inner.push('(');
            inner.push_str(&"*".repeat(fp.depth));
            inner.push_str(name);
            dims(&mut inner, &ty.array_dims);
            inner.push_str(")(");
            inner.push_str(&params(&fp.params, !name.is_empty()));
            inner.push(')');
        }
    }
    inner
}

fn declarator(ty: &Type, name: &str) -> String {
    let base = base_name(ty);
    let tail = declarator_tail(ty, name);
    if tail.is_empty() {
        base
    } else if name.is_empty() && ty.fn_pointer.is_none() {
        format!("{}{}", base, tail)
    } else {
        format!("{} {}", base, tail)
    }
}

fn dims(out: &mut String, array_dims: &[Option<Expr>]) {
    for dim in array_dims {
        out.push('[');
        if let Some(size) = dim {
            out.push_str(&expr(size));
        }
        out.push(']');
    }
}

fn params(list: &ParamList, named: bool) -> String {
    match list {
        ParamList::Unspecified => String::new(),
        ParamList::Void => "void".to_string(),
        ParamList::List { params, variadic } => {
            let mut parts: Vec<String> = params
                .iter()
                .map(|param| {
                    let name = if named { param.name.as_deref() } else { None };
                    declarator(&param.param_type, name.unwrap_or(""))
                })
                .collect();
            if *variadic {
                parts.push("...".to_string());
            }
            parts.join(", ")
        }
    }
}

struct Printer {
    out: String,
}

impl Printer {
    fn new() -> Self {
        Printer { out: String::new() }
    }

    fn finish(self) -> String {
        self.out
    }

    fn tabs(&mut self, indent: usize) {
        for _ in 0..indent {
            self.out.push('\t');
        }
    }

    fn storage(&mut self, storage: Storage) {
        if let Some(keyword) = storage.keyword() {
            self.out.push_str(keyword);
            self.out.push(' ');
        }
    }

    fn stmts(&mut self, stmts: &[Stmt], indent: usize) {
        for stmt in stmts {
            self.stmt(stmt, indent);
        }
    }

    /// Body of `if`, `while`, `for`, `do` and `switch`. Returns true when a
    /// block was printed and the closing brace still needs its newline.
    fn clause(&mut self, body: &Stmt, indent: usize) -> bool {
        match body {
            Stmt::Block(block) => {
                self.out.push_str(" {\n");
                self.stmts(&block.stmts, indent + 1);
                self.tabs(indent);
                self.out.push('}');
                true
            }
            _ => {
                self.out.push('\n');
                self.stmt(body, indent + 1);
                false
            }
        }
    }

    fn close(&mut self, open: bool) {
        if open {
            self.out.push('\n');
        }
    }

    fn stmt(&mut self, stmt: &Stmt, indent: usize) {
        match stmt {
            Stmt::Case { value, .. } => {
                self.tabs(indent.saturating_sub(1));
                self.out.push_str("case ");
                self.expr(value);
                self.out.push_str(":\n");
            }
            Stmt::Default { .. } => {
                self.tabs(indent.saturating_sub(1));
                self.out.push_str("default:\n");
            }
            Stmt::Label { name, .. } => {
                self.out.push_str(name);
                self.out.push_str(":\n");
            }
            _ => {
                self.tabs(indent);
                self.statement(stmt, indent);
            }
        }
    }

    /// A statement whose indentation is already written
    fn statement(&mut self, stmt: &Stmt, indent: usize) {
        match stmt {
            Stmt::Decl { storage, vars, .. } => {
                self.local_decl(*storage, vars);
                self.out.push_str(";\n");
            }
            Stmt::Expr { expr, .. } => {
                self.expr(expr);
                self.out.push_str(";\n");
            }
            Stmt::Return { expr, .. } => {
                self.out.push_str("return");
                if let Some(value) = expr {
                    self.out.push(' ');
                    self.expr(value);
                }
                self.out.push_str(";\n");
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.if_chain(condition, then_branch, else_branch.as_deref(), indent),
            Stmt::While {
                condition, body, ..
            } => {
                self.out.push_str("while(");
                self.expr(condition);
                self.out.push(')');
                let open = self.clause(body, indent);
                self.close(open);
            }
            Stmt::DoWhile {
                body, condition, ..
            } => {
                self.out.push_str("do");
                if self.clause(body, indent) {
                    self.out.push(' ');
                } else {
                    self.tabs(indent);
                }
                self.out.push_str("while(");
                self.expr(condition);
                self.out.push_str(");\n");
            }
            Stmt::For {
                init,
                condition,
                increment,
                body,
                ..
            } => {
                self.out.push_str("for(");
                match init.as_deref() {
                    Some(Stmt::Decl { storage, vars, .. }) => self.local_decl(*storage, vars),
                    Some(Stmt::Expr { expr, .. }) => self.expr(expr),
                    _ => {}
                }
                self.out.push(';');
                if let Some(cond) = condition {
                    self.out.push(' ');
                    self.expr(cond);
                }
                self.out.push(';');
                if let Some(inc) = increment {
                    self.out.push(' ');
                    self.expr(inc);
                }
                self.out.push(')');
                let open = self.clause(body, indent);
                self.close(open);
            }
            Stmt::Switch { expr, body, .. } => {
                self.out.push_str("switch(");
                self.expr(expr);
                self.out.push(')');
                let open = self.clause(body, indent);
                self.close(open);
            }
            Stmt::Break { .. } => self.out.push_str("break;\n"),
            Stmt::Continue { .. } => self.out.push_str("continue;\n"),
            Stmt::Goto { label, .. } => {
                self.out.push_str("goto ");
                self.out.push_str(label);
                self.out.push_str(";\n");
            }
            Stmt::Block(block) => {
                self.out.push_str("{\n");
                self.stmts(&block.stmts, indent + 1);
                self.tabs(indent);
                self.out.push_str("}\n");
            }
            Stmt::Empty { .. } => self.out.push_str(";\n"),
            Stmt::Case { .. } | Stmt::Default { .. } | Stmt::Label { .. } => {
                self.stmt(stmt, indent)
            }
        }
    }

    fn if_chain(&mut self, condition: &Expr, then: &Stmt, otherwise: Option<&Stmt>, indent: usize) {
        self.out.push_str("if(");
        self.expr(condition);
        self.out.push(')');
        let open = self.clause(then, indent);
        let Some(otherwise) = otherwise else {
            self.close(open);
            return;
        };
        if open {
            self.out.push_str(" else");
        } else {
            self.tabs(indent);
            self.out.push_str("else");
        }
        match otherwise {
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.out.push(' ');
                self.if_chain(condition, then_branch, else_branch.as_deref(), indent);
            }
            _ => {
                let open = self.clause(otherwise, indent);
                self.close(open);
            }
        }
    }

    /// `static Prog *p, *q = nil` without the semicolon
    fn local_decl(&mut self, storage: Storage, vars: &[LocalVar]) {
        self.storage(storage);
        for (i, var) in vars.iter().enumerate() {
            let name = match &var.params {
                Some(list) => format!("{}({})", var.name, params(list, true)),
                None => var.name.clone(),
            };
            if i == 0 {
                self.out.push_str(&declarator(&var.var_type, &name));
            } else {
                self.out.push_str(", ");
                self.out.push_str(&declarator_tail(&var.var_type, &name));
            }
            if let Some(init) = &var.init {
                self.out.push_str(" = ");
                self.initializer(init);
            }
        }
    }

    /// Initializer lists holding nested lists get one element per line
    fn initializer(&mut self, init: &Expr) {
        match init {
            Expr::InitList { items, .. }
                if items.iter().any(|item| matches!(item, Expr::InitList { .. })) =>
            {
                self.out.push_str("{\n");
                for item in items {
                    self.out.push('\t');
                    self.expr(item);
                    self.out.push_str(",\n");
                }
                self.out.push('}');
            }
            _ => self.expr(init),
        }
    }

    fn expr(&mut self, e: &Expr) {
        match e {
            Expr::Name { text, .. } => self.out.push_str(text),
            Expr::Number(raw, _) => self.out.push_str(raw),
            Expr::CharLiteral(raw, _) => {
                self.out.push('\'');
                self.out.push_str(raw);
                self.out.push('\'');
            }
            Expr::StringLiteral(pieces, _) => {
                for (i, piece) in pieces.iter().enumerate() {
                    if i > 0 {
                        self.out.push(' ');
                    }
                    self.out.push('"');
                    self.out.push_str(piece);
                    self.out.push('"');
                }
            }
            Expr::Paren(inner, _) => {
                self.out.push('(');
                self.expr(inner);
                self.out.push(')');
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                self.expr(left);
                self.out.push(' ');
                self.out.push_str(op.symbol());
                self.out.push(' ');
                self.expr(right);
            }
            Expr::Assign { op, lhs, rhs, .. } => {
                self.expr(lhs);
                self.out.push(' ');
                if let Some(op) = op {
                    self.out.push_str(op.symbol());
                }
                self.out.push_str("= ");
                self.expr(rhs);
            }
            Expr::Unary { op, operand, .. } => {
                if op.is_postfix() {
                    self.expr(operand);
                    self.out.push_str(op.symbol());
                } else {
                    let inner = expr(operand);
                    self.out.push_str(op.symbol());
                    // `- -x` and `& &x` must not fuse into `--x` and `&&x`
                    let clash = match op {
                        UnOp::Neg => inner.starts_with('-'),
                        UnOp::Plus => inner.starts_with('+'),
                        UnOp::AddrOf => inner.starts_with('&'),
                        _ => false,
                    };
                    if clash {
                        self.out.push(' ');
                    }
                    self.out.push_str(&inner);
                }
            }
            Expr::Ternary {
                condition,
                then_expr,
                else_expr,
                ..
            } => {
                self.expr(condition);
                self.out.push_str(" ? ");
                self.expr(then_expr);
                self.out.push_str(" : ");
                self.expr(else_expr);
            }
            Expr::Call { callee, args, .. } => {
                self.expr(callee);
                self.out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(arg);
                }
                self.out.push(')');
            }
            Expr::Index { array, index, .. } => {
                self.expr(array);
                self.out.push('[');
                self.expr(index);
                self.out.push(']');
            }
            Expr::Member {
                object,
                member,
                arrow,
                ..
            } => {
                self.expr(object);
                self.out.push_str(if *arrow { "->" } else { "." });
                self.out.push_str(member);
            }
            Expr::Cast {
                target_type, expr, ..
            } => {
                self.out.push('(');
                self.out.push_str(&type_name(target_type));
                self.out.push(')');
                self.expr(expr);
            }
            Expr::SizeofType { target_type, .. } => {
                self.out.push_str("sizeof(");
                self.out.push_str(&type_name(target_type));
                self.out.push(')');
            }
            Expr::SizeofExpr { expr, .. } => {
                self.out.push_str("sizeof");
                if !matches!(**expr, Expr::Paren(..)) {
                    self.out.push(' ');
                }
                self.expr(expr);
            }
            Expr::Comma { left, right, .. } => {
                self.expr(left);
                self.out.push_str(", ");
                self.expr(right);
            }
            Expr::InitList { items, .. } => {
                if items.is_empty() {
                    self.out.push_str("{}");
                    return;
                }
                self.out.push_str("{ ");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(item);
                }
                self.out.push_str(" }");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Program;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Program {
        Program::parse(&[("a.c".to_string(), source.to_string())], &["Prog".to_string()])
            .unwrap()
    }

    fn decl<'a>(program: &'a Program, name: &str) -> &'a Decl {
        program
            .decl_ids()
            .map(|id| program.decl(id))
            .find(|d| d.name == name)
            .unwrap()
    }

    #[test]
    fn test_prototype_strips_parameter_names() {
        let program = parse("static Prog*\nappendp(Prog *p, int n, ...)\n{\n\treturn p;\n}\n");
        assert_eq!(
            prototype(decl(&program, "appendp")),
            "static Prog *appendp(Prog*, int, ...);\n"
        );
    }

    #[test]
    fn test_function_in_plan9_style() {
        let source = "int\nf(Prog *p, int n)\n{\n\
                      \tint i, *q;\n\
                      \tfor(i = 0; i < n; i++) {\n\
                      \t\tif(p == 0)\n\
                      \t\t\tbreak;\n\
                      \t\telse if(i > 2) {\n\
                      \t\t\tcontinue;\n\
                      \t\t} else\n\
                      \t\t\tn--;\n\
                      \t}\n\
                      \tswitch(n) {\n\
                      \tcase 1:\n\
                      \t\treturn -(-n);\n\
                      \tdefault:\n\
                      \t\tbreak;\n\
                      \t}\n\
                      \tdo\n\
                      \t\tn = n - 1;\n\
                      \twhile(n > 0);\n\
                      out:\n\
                      \treturn sizeof(Prog) + sizeof n;\n\
                      }\n";
        let program = parse(source);
        assert_eq!(function(decl(&program, "f")), source);
    }

    #[test]
    fn test_data_with_nested_initializers() {
        let program = parse("int tab[][2] = { { 1, 2 }, { 3, 4 } };\nchar *s = \"a\" \"b\";\n");
        assert_eq!(
            data(decl(&program, "tab")),
            "int tab[][2] = {\n\t{ 1, 2 },\n\t{ 3, 4 },\n};\n"
        );
        assert_eq!(data(decl(&program, "s")), "char *s = \"a\" \"b\";\n");
    }

    #[test]
    fn test_function_pointer_declarators() {
        let program = parse("void (*handlers[4])(Prog*, int) = { 0 };\n");
        assert_eq!(
            data(decl(&program, "handlers")),
            "void (*handlers[4])(Prog*, int) = { 0 };\n"
        );
    }

    #[test]
    fn test_unary_operators_do_not_fuse() {
        let program = parse("int g;\nvoid f(void) { g = - -g; g = -(-g); }\n");
        let text = function(decl(&program, "f"));
        assert!(text.contains("g = - -g;"));
        assert!(text.contains("g = -(-g);"));
    }

    #[test]
    fn test_cast_and_member_access() {
        let program = parse("void f(Prog *p) { ((Prog*)p)->link = (void*)0; p->as++; }\n");
        let text = function(decl(&program, "f"));
        assert!(text.contains("\t((Prog*)p)->link = (void*)0;\n"));
        assert!(text.contains("\tp->as++;\n"));
    }
}
