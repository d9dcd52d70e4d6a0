//! Name resolution
//!
//! Binds every name reference to a parameter or block-scope variable, to a
//! file-scope declaration, or to nothing (a library symbol). Block-scope
//! prototypes and `extern` declarations name the file-scope symbol and do
//! not shadow it.

use super::Program;
use crate::parser::ast::*;
use rustc_hash::{FxHashMap, FxHashSet};

struct Resolver<'a> {
    globals: &'a FxHashMap<String, DeclId>,
    scopes: Vec<FxHashSet<String>>,
}

impl Resolver<'_> {
    fn lookup(&self, name: &str) -> Binding {
        if self.scopes.iter().any(|scope| scope.contains(name)) {
            Binding::Local
        } else if let Some(id) = self.globals.get(name) {
            Binding::Global(*id)
        } else {
            Binding::Unresolved
        }
    }

    fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    fn block(&mut self, block: &mut Block) {
        self.scopes.push(FxHashSet::default());
        for stmt in &mut block.stmts {
            self.stmt(stmt);
        }
        self.scopes.pop();
    }

    fn stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Decl { storage, vars, .. } => {
                for var in vars {
                    for dim in var.var_type.array_dims.iter_mut().flatten() {
                        self.expr(dim);
                    }
                    if let Some(init) = &mut var.init {
                        self.expr(init);
                    }
                    if var.params.is_none() && *storage != Storage::Extern {
                        self.declare(&var.name);
                    }
                }
            }
            Stmt::Expr { expr, .. } | Stmt::Case { value: expr, .. } => self.expr(expr),
            Stmt::Return { expr, .. } => {
                if let Some(expr) = expr {
                    self.expr(expr);
                }
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.expr(condition);
                self.stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.stmt(else_branch);
                }
            }
            Stmt::While { condition, body, .. } | Stmt::DoWhile { body, condition, .. } => {
                self.expr(condition);
                self.stmt(body);
            }
            Stmt::For {
                init,
                condition,
                increment,
                body,
                ..
            } => {
                self.scopes.push(FxHashSet::default());
                if let Some(init) = init {
                    self.stmt(init);
                }
                for expr in [condition, increment].into_iter().flatten() {
                    self.expr(expr);
                }
                self.stmt(body);
                self.scopes.pop();
            }
            Stmt::Switch { expr, body, .. } => {
                self.expr(expr);
                self.stmt(body);
            }
            Stmt::Block(block) => self.block(block),
            Stmt::Default { .. }
            | Stmt::Break { .. }
            | Stmt::Continue { .. }
            | Stmt::Goto { .. }
            | Stmt::Label { .. }
            | Stmt::Empty { .. } => {}
        }
    }

    fn expr(&self, expr: &mut Expr) {
        super::visit::walk_expr_mut(expr, &mut |e| {
            if let Expr::Name { text, binding, .. } = e {
                *binding = self.lookup(text);
            }
        });
    }
}

/// Resolve every name reference of every live declaration
pub fn resolve(program: &mut Program) {
    let globals: FxHashMap<String, DeclId> = program
        .decl_ids()
        .map(|id| (program.decl(id).name.clone(), id))
        .collect();
    let ids: Vec<DeclId> = program.decl_ids().collect();

    for id in ids {
        let decl = program.decl_mut(id);
        let mut resolver = Resolver {
            globals: &globals,
            scopes: vec![FxHashSet::default()],
        };

        for param in decl.params.params() {
            if let Some(name) = &param.name {
                resolver.declare(name);
            }
        }
        if let Some(body) = &mut decl.body {
            resolver.block(body);
        }
        if let Some(init) = &mut decl.init {
            resolver.expr(init);
        }
    }
}
