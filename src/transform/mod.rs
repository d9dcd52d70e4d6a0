//! Whole-program transformations
//!
//! [`Refactor`] owns the program together with the three indices derived
//! from it. Each pass keeps all of them consistent, so any stage can be
//! emitted between passes.

pub mod extract;
pub mod rename;
pub mod rewrite;
pub mod sentinel;
pub mod staticize;
pub mod thread;

use crate::analysis::{Catalog, FileTable, Graph};
use crate::parser::ast::DeclId;
use crate::program::Program;
pub use rewrite::{Pattern, RewriteRule};
pub use thread::ThreadReport;

#[derive(Debug, Clone)]
pub struct Refactor {
    pub program: Program,
    pub catalog: Catalog,
    pub graph: Graph,
    pub files: FileTable,
}

impl Refactor {
    pub fn new(program: Program) -> Self {
        let catalog = Catalog::index(&program);
        let graph = Graph::build(&program, &catalog);
        let files = FileTable::build(&program, &catalog);
        Refactor {
            program,
            catalog,
            graph,
            files,
        }
    }

    /// Apply `rules` to each of `targets` and refresh the graph edges of
    /// every declaration that changed
    pub fn apply_rules(&mut self, rules: &[RewriteRule], targets: &[DeclId]) -> usize {
        let mut total = 0;
        for &id in targets {
            let count = rewrite::rewrite_decl(self.program.decl_mut(id), rules);
            if count > 0 {
                self.graph.rescan(&self.program, &self.catalog, id);
            }
            total += count;
        }
        total
    }

    /// Live symbols, in program order
    pub fn live(&self) -> Vec<DeclId> {
        self.catalog.symbols().to_vec()
    }
}
