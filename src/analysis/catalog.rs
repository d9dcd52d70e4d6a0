//! Symbol catalog: file-scope declarations by name and identity

use crate::errors::{RefactorError, Result};
use crate::parser::ast::DeclId;
use crate::program::Program;
use rustc_hash::{FxHashMap, FxHashSet};

/// Exactly one entry per name at any time
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    by_name: FxHashMap<String, DeclId>,
    live: FxHashSet<DeclId>,
    /// Program order, for deterministic iteration
    symlist: Vec<DeclId>,
}

impl Catalog {
    /// Index the top-level declarations of `program`. Declarations inside
    /// function bodies are never part of the program's item list.
    pub fn index(program: &Program) -> Self {
        let mut catalog = Catalog::default();
        for id in program.decl_ids() {
            catalog.by_name.insert(program.decl(id).name.clone(), id);
            catalog.live.insert(id);
            catalog.symlist.push(id);
        }
        catalog
    }

    pub fn lookup(&self, name: &str) -> Option<DeclId> {
        self.by_name.get(name).copied()
    }

    /// Look up a configured name; a miss is a configuration error
    pub fn require(&self, name: &str, context: &'static str) -> Result<DeclId> {
        self.lookup(name)
            .ok_or_else(|| RefactorError::unknown(name, context))
    }

    pub fn contains(&self, id: DeclId) -> bool {
        self.live.contains(&id)
    }

    pub fn symbols(&self) -> &[DeclId] {
        &self.symlist
    }

    pub fn len(&self) -> usize {
        self.symlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symlist.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = (&str, DeclId)> + '_ {
        self.by_name.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Keep only the symbols in `keep`
    pub fn retain(&mut self, keep: &FxHashSet<DeclId>) {
        self.symlist.retain(|id| keep.contains(id));
        self.live.retain(|id| keep.contains(id));
        self.by_name.retain(|_, id| keep.contains(id));
    }

    /// Move entries from old names to new names. All old keys are removed
    /// before any new key is inserted, so swaps and chains behave.
    pub fn rename(&mut self, moves: &[(String, String)]) {
        let moved: Vec<(DeclId, &str)> = moves
            .iter()
            .filter_map(|(old, new)| self.by_name.remove(old).map(|id| (id, new.as_str())))
            .collect();
        for (id, new) in moved {
            self.by_name.insert(new.to_string(), id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(source: &str) -> Catalog {
        let program = Program::parse(&[("a.c".to_string(), source.to_string())], &[]).unwrap();
        Catalog::index(&program)
    }

    #[test]
    fn test_index_in_program_order() {
        let catalog = catalog("int a;\nvoid f(void) { int local; }\nenum { K };\n");
        let names: Vec<&str> = ["a", "f", "K"].to_vec();
        for (i, name) in names.iter().enumerate() {
            assert_eq!(catalog.lookup(name), Some(catalog.symbols()[i]));
        }
        assert_eq!(catalog.len(), 3);
        assert!(catalog.lookup("local").is_none());
    }

    #[test]
    fn test_rename_swap_is_atomic() {
        let mut catalog = catalog("int a;\nint b;\n");
        let a = catalog.lookup("a").unwrap();
        let b = catalog.lookup("b").unwrap();

        catalog.rename(&[
            ("a".to_string(), "b".to_string()),
            ("b".to_string(), "a".to_string()),
        ]);

        assert_eq!(catalog.lookup("b"), Some(a));
        assert_eq!(catalog.lookup("a"), Some(b));
    }

    #[test]
    fn test_require_reports_context() {
        let catalog = catalog("int a;\n");
        let err = catalog.require("zz", "start symbol").unwrap_err();
        assert!(matches!(err, RefactorError::UnknownSymbol { ref name, .. } if name == "zz"));
    }
}
