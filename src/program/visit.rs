//! Pre-order expression walks over function bodies and data initializers
//!
//! The callback sees a node before its children. The mutable walk descends
//! into whatever the callback leaves in place, so arguments inserted into a
//! call are visited too.

use crate::parser::ast::*;

/// Visit every expression of a declaration's body and initializer
pub fn walk_decl<F: FnMut(&Expr)>(decl: &Decl, f: &mut F) {
    if let Some(body) = &decl.body {
        walk_block(body, f);
    }
    if let Some(init) = &decl.init {
        walk_expr(init, f);
    }
}

pub fn walk_decl_mut<F: FnMut(&mut Expr)>(decl: &mut Decl, f: &mut F) {
    if let Some(body) = &mut decl.body {
        walk_block_mut(body, f);
    }
    if let Some(init) = &mut decl.init {
        walk_expr_mut(init, f);
    }
}

pub fn walk_block<F: FnMut(&Expr)>(block: &Block, f: &mut F) {
    for stmt in &block.stmts {
        walk_stmt(stmt, f);
    }
}

pub fn walk_block_mut<F: FnMut(&mut Expr)>(block: &mut Block, f: &mut F) {
    for stmt in &mut block.stmts {
        walk_stmt_mut(stmt, f);
    }
}

pub fn walk_stmt<F: FnMut(&Expr)>(stmt: &Stmt, f: &mut F) {
    match stmt {
        Stmt::Decl { vars, .. } => {
            for var in vars {
                for dim in var.var_type.array_dims.iter().flatten() {
                    walk_expr(dim, f);
                }
                if let Some(init) = &var.init {
                    walk_expr(init, f);
                }
            }
        }
        Stmt::Expr { expr, .. } | Stmt::Case { value: expr, .. } => walk_expr(expr, f),
        Stmt::Return { expr, .. } => {
            if let Some(expr) = expr {
                walk_expr(expr, f);
            }
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            walk_expr(condition, f);
            walk_stmt(then_branch, f);
            if let Some(else_branch) = else_branch {
                walk_stmt(else_branch, f);
            }
        }
        Stmt::While { condition, body, .. } | Stmt::DoWhile { body, condition, .. } => {
            walk_expr(condition, f);
            walk_stmt(body, f);
        }
        Stmt::For {
            init,
            condition,
            increment,
            body,
            ..
        } => {
            if let Some(init) = init {
                walk_stmt(init, f);
            }
            for expr in [condition, increment].into_iter().flatten() {
                walk_expr(expr, f);
            }
            walk_stmt(body, f);
        }
        Stmt::Switch { expr, body, .. } => {
            walk_expr(expr, f);
            walk_stmt(body, f);
        }
        Stmt::Block(block) => walk_block(block, f),
        Stmt::Default { .. }
        | Stmt::Break { .. }
        | Stmt::Continue { .. }
        | Stmt::Goto { .. }
        | Stmt::Label { .. }
        | Stmt::Empty { .. } => {}
    }
}

pub fn walk_stmt_mut<F: FnMut(&mut Expr)>(stmt: &mut Stmt, f: &mut F) {
    match stmt {
        Stmt::Decl { vars, .. } => {
            for var in vars {
                for dim in var.var_type.array_dims.iter_mut().flatten() {
                    walk_expr_mut(dim, f);
                }
                if let Some(init) = &mut var.init {
                    walk_expr_mut(init, f);
                }
            }
        }
        Stmt::Expr { expr, .. } | Stmt::Case { value: expr, .. } => walk_expr_mut(expr, f),
        Stmt::Return { expr, .. } => {
            if let Some(expr) = expr {
                walk_expr_mut(expr, f);
            }
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            walk_expr_mut(condition, f);
            walk_stmt_mut(then_branch, f);
            if let Some(else_branch) = else_branch {
                walk_stmt_mut(else_branch, f);
            }
        }
        Stmt::While { condition, body, .. } | Stmt::DoWhile { body, condition, .. } => {
            walk_expr_mut(condition, f);
            walk_stmt_mut(body, f);
        }
        Stmt::For {
            init,
            condition,
            increment,
            body,
            ..
        } => {
            if let Some(init) = init {
                walk_stmt_mut(init, f);
            }
            for expr in [condition, increment].into_iter().flatten() {
                walk_expr_mut(expr, f);
            }
            walk_stmt_mut(body, f);
        }
        Stmt::Switch { expr, body, .. } => {
            walk_expr_mut(expr, f);
            walk_stmt_mut(body, f);
        }
        Stmt::Block(block) => walk_block_mut(block, f),
        Stmt::Default { .. }
        | Stmt::Break { .. }
        | Stmt::Continue { .. }
        | Stmt::Goto { .. }
        | Stmt::Label { .. }
        | Stmt::Empty { .. } => {}
    }
}

/// Visit block-scope `extern` declarations and prototypes. These name a
/// file-scope symbol rather than introduce a local.
pub fn walk_global_locals_mut<F: FnMut(&mut LocalVar)>(block: &mut Block, f: &mut F) {
    for stmt in &mut block.stmts {
        global_locals_in_stmt(stmt, f);
    }
}

fn global_locals_in_stmt<F: FnMut(&mut LocalVar)>(stmt: &mut Stmt, f: &mut F) {
    match stmt {
        Stmt::Decl { storage, vars, .. } => {
            for var in vars {
                if *storage == Storage::Extern || var.params.is_some() {
                    f(var);
                }
            }
        }
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            global_locals_in_stmt(then_branch, f);
            if let Some(else_branch) = else_branch {
                global_locals_in_stmt(else_branch, f);
            }
        }
        Stmt::While { body, .. } | Stmt::DoWhile { body, .. } | Stmt::Switch { body, .. } => {
            global_locals_in_stmt(body, f)
        }
        Stmt::For { init, body, .. } => {
            if let Some(init) = init {
                global_locals_in_stmt(init, f);
            }
            global_locals_in_stmt(body, f);
        }
        Stmt::Block(block) => walk_global_locals_mut(block, f),
        _ => {}
    }
}

pub fn walk_expr<F: FnMut(&Expr)>(expr: &Expr, f: &mut F) {
    f(expr);
    match expr {
        Expr::Name { .. }
        | Expr::Number(..)
        | Expr::CharLiteral(..)
        | Expr::StringLiteral(..)
        | Expr::SizeofType { .. } => {}
        Expr::Paren(inner, _)
        | Expr::Unary { operand: inner, .. }
        | Expr::Member { object: inner, .. }
        | Expr::Cast { expr: inner, .. }
        | Expr::SizeofExpr { expr: inner, .. } => walk_expr(inner, f),
        Expr::Binary { left, right, .. }
        | Expr::Comma { left, right, .. }
        | Expr::Assign {
            lhs: left,
            rhs: right,
            ..
        }
        | Expr::Index {
            array: left,
            index: right,
            ..
        } => {
            walk_expr(left, f);
            walk_expr(right, f);
        }
        Expr::Ternary {
            condition,
            then_expr,
            else_expr,
            ..
        } => {
            walk_expr(condition, f);
            walk_expr(then_expr, f);
            walk_expr(else_expr, f);
        }
        Expr::Call { callee, args, .. } => {
            walk_expr(callee, f);
            for arg in args {
                walk_expr(arg, f);
            }
        }
        Expr::InitList { items, .. } => {
            for item in items {
                walk_expr(item, f);
            }
        }
    }
}

pub fn walk_expr_mut<F: FnMut(&mut Expr)>(expr: &mut Expr, f: &mut F) {
    f(expr);
    match expr {
        Expr::Name { .. }
        | Expr::Number(..)
        | Expr::CharLiteral(..)
        | Expr::StringLiteral(..)
        | Expr::SizeofType { .. } => {}
        Expr::Paren(inner, _)
        | Expr::Unary { operand: inner, .. }
        | Expr::Member { object: inner, .. }
        | Expr::Cast { expr: inner, .. }
        | Expr::SizeofExpr { expr: inner, .. } => walk_expr_mut(inner, f),
        Expr::Binary { left, right, .. }
        | Expr::Comma { left, right, .. }
        | Expr::Assign {
            lhs: left,
            rhs: right,
            ..
        }
        | Expr::Index {
            array: left,
            index: right,
            ..
        } => {
            walk_expr_mut(left, f);
            walk_expr_mut(right, f);
        }
        Expr::Ternary {
            condition,
            then_expr,
            else_expr,
            ..
        } => {
            walk_expr_mut(condition, f);
            walk_expr_mut(then_expr, f);
            walk_expr_mut(else_expr, f);
        }
        Expr::Call { callee, args, .. } => {
            walk_expr_mut(callee, f);
            for arg in args {
                walk_expr_mut(arg, f);
            }
        }
        Expr::InitList { items, .. } => {
            for item in items {
                walk_expr_mut(item, f);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Program;

    #[test]
    fn test_walk_is_preorder() {
        let program = Program::parse(
            &[("a.c".to_string(), "void f(int a) { g(a + 1, b[2]); }".to_string())],
            &[],
        )
        .unwrap();
        let id = program.decl_ids().next().unwrap();

        let mut seen = Vec::new();
        walk_decl(program.decl(id), &mut |e| {
            seen.push(match e {
                Expr::Name { text, .. } => text.clone(),
                Expr::Number(n, _) => n.clone(),
                Expr::Call { .. } => "call".to_string(),
                Expr::Binary { .. } => "+".to_string(),
                Expr::Index { .. } => "[]".to_string(),
                _ => "?".to_string(),
            });
        });
        assert_eq!(seen, vec!["call", "g", "+", "a", "1", "[]", "b", "2"]);
    }
}
