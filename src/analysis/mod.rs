//! Program-wide indices: the symbol catalog, the dependency graph and the
//! file table. All three hold [`DeclId`](crate::parser::ast::DeclId)s,
//! never copies of declarations.

pub mod catalog;
pub mod filetab;
pub mod graph;

pub use catalog::Catalog;
pub use filetab::FileTable;
pub use graph::Graph;
