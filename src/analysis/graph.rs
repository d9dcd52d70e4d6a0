//! Dependency graph between tracked symbols
//!
//! `forward[f]` holds the symbols the body of `f` references by name, by
//! address or by direct call; `reverse` is its transpose. Every mutation goes
//! through [`Graph::add_edge`] or [`Graph::remove_edge`] so both sides stay
//! in step.

use super::catalog::Catalog;
use crate::parser::ast::*;
use crate::program::{visit, Program};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

static EMPTY: BTreeSet<DeclId> = BTreeSet::new();

#[derive(Debug, Clone, Default)]
pub struct Graph {
    forward: FxHashMap<DeclId, BTreeSet<DeclId>>,
    reverse: FxHashMap<DeclId, BTreeSet<DeclId>>,
}

/// The tracked symbol an expression denotes: a bare name, the operand of
/// `&`, or the callee of a direct call.
fn referenced(expr: &Expr, catalog: &Catalog) -> Option<DeclId> {
    let target = match expr {
        Expr::Name { .. } => expr.as_name(),
        Expr::Unary {
            op: UnOp::AddrOf,
            operand,
            ..
        } => operand.as_name(),
        Expr::Call { callee, .. } => callee.as_name(),
        _ => None,
    };
    match target {
        Some((_, Binding::Global(id))) if catalog.contains(id) => Some(id),
        _ => None,
    }
}

/// Symbols referenced from the body of `decl`. Only function bodies
/// count; initializers of data are outside any function.
fn references(decl: &Decl, catalog: &Catalog) -> BTreeSet<DeclId> {
    let mut found = BTreeSet::new();
    if let Some(body) = &decl.body {
        visit::walk_block(body, &mut |expr| {
            if let Some(id) = referenced(expr, catalog) {
                found.insert(id);
            }
        });
    }
    found
}

impl Graph {
    /// Build the graph over every catalog symbol
    pub fn build(program: &Program, catalog: &Catalog) -> Self {
        let mut graph = Graph::default();
        for &id in catalog.symbols() {
            graph.forward.entry(id).or_default();
            graph.reverse.entry(id).or_default();
        }
        for &id in catalog.symbols() {
            for to in references(program.decl(id), catalog) {
                graph.add_edge(id, to);
            }
        }
        graph
    }

    pub fn add_edge(&mut self, from: DeclId, to: DeclId) {
        self.forward.entry(from).or_default().insert(to);
        self.reverse.entry(to).or_default().insert(from);
    }

    pub fn remove_edge(&mut self, from: DeclId, to: DeclId) {
        if let Some(set) = self.forward.get_mut(&from) {
            set.remove(&to);
        }
        if let Some(set) = self.reverse.get_mut(&to) {
            set.remove(&from);
        }
    }

    pub fn forward(&self, id: DeclId) -> &BTreeSet<DeclId> {
        self.forward.get(&id).unwrap_or(&EMPTY)
    }

    pub fn reverse(&self, id: DeclId) -> &BTreeSet<DeclId> {
        self.reverse.get(&id).unwrap_or(&EMPTY)
    }

    /// Symbols reachable from `roots` over forward edges, roots included
    pub fn reachable(&self, roots: &[DeclId]) -> FxHashSet<DeclId> {
        let mut visited: FxHashSet<DeclId> = FxHashSet::default();
        let mut worklist: Vec<DeclId> = Vec::new();

        for &root in roots {
            if visited.insert(root) {
                worklist.push(root);
            }
        }
        while let Some(id) = worklist.pop() {
            for &next in self.forward(id) {
                if visited.insert(next) {
                    worklist.push(next);
                }
            }
        }
        visited
    }

    /// Drop every node and edge touching a symbol outside `keep`
    pub fn retain(&mut self, keep: &FxHashSet<DeclId>) {
        for sets in [&mut self.forward, &mut self.reverse] {
            sets.retain(|id, _| keep.contains(id));
            for set in sets.values_mut() {
                set.retain(|id| keep.contains(id));
            }
        }
    }

    /// Recompute the forward edges of `id` from its current body
    pub fn rescan(&mut self, program: &Program, catalog: &Catalog, id: DeclId) {
        let now = references(program.decl(id), catalog);
        let before = self.forward(id).clone();
        for &gone in before.difference(&now) {
            self.remove_edge(id, gone);
        }
        for &added in now.difference(&before) {
            self.add_edge(id, added);
        }
    }

    /// Is `reverse` exactly the transpose of `forward`?
    pub fn is_symmetric(&self) -> bool {
        let forward_ok = self.forward.iter().all(|(from, tos)| {
            tos.iter()
                .all(|to| self.reverse.get(to).is_some_and(|set| set.contains(from)))
        });
        let reverse_ok = self.reverse.iter().all(|(to, froms)| {
            froms
                .iter()
                .all(|from| self.forward.get(from).is_some_and(|set| set.contains(to)))
        });
        forward_ok && reverse_ok
    }

    pub fn nodes(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.forward.keys().copied()
    }

    pub fn edge_count(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(source: &str) -> (Program, Catalog, Graph) {
        let program = Program::parse(&[("a.c".to_string(), source.to_string())], &[]).unwrap();
        let catalog = Catalog::index(&program);
        let graph = Graph::build(&program, &catalog);
        (program, catalog, graph)
    }

    #[test]
    fn test_edges_for_names_addresses_and_calls() {
        let (_, catalog, graph) = setup(
            "int g;\nint h(void) { return 0; }\nvoid k(void) { }\n\
             void f(void) { int *p; p = &g; h(); fn(k); printf(\"x\"); }\n",
        );
        let id = |n: &str| catalog.lookup(n).unwrap();

        let expected: BTreeSet<DeclId> = [id("g"), id("h"), id("k")].into_iter().collect();
        assert_eq!(graph.forward(id("f")), &expected);
        assert!(graph.reverse(id("g")).contains(&id("f")));
        assert!(graph.forward(id("g")).is_empty());
        assert!(graph.is_symmetric());
    }

    #[test]
    fn test_initializers_add_no_edges() {
        let (_, catalog, graph) = setup("void f(void) { }\nvoid (*tab[])(void) = { f };\n");
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.reverse(catalog.lookup("f").unwrap()).is_empty());
    }

    #[test]
    fn test_cycles_terminate_and_retain_is_symmetric() {
        let (_, catalog, mut graph) = setup(
            "void b(void);\nvoid a(void) { b(); }\nvoid b(void) { a(); }\nvoid c(void) { a(); }\n",
        );
        let id = |n: &str| catalog.lookup(n).unwrap();

        let live = graph.reachable(&[id("a")]);
        assert_eq!(live.len(), 2);
        assert!(!live.contains(&id("c")));

        graph.retain(&live);
        assert!(graph.is_symmetric());
        assert!(graph.reverse(id("a")).iter().all(|f| live.contains(f)));
    }
}
