//! File table: originating file → symbols declared there

use super::catalog::Catalog;
use crate::parser::ast::{DeclId, FileId};
use crate::program::Program;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct FileTable {
    files: BTreeMap<FileId, BTreeSet<DeclId>>,
}

impl FileTable {
    pub fn build(program: &Program, catalog: &Catalog) -> Self {
        let mut files: BTreeMap<FileId, BTreeSet<DeclId>> = BTreeMap::new();
        for &id in catalog.symbols() {
            files.entry(program.decl(id).span.file).or_default().insert(id);
        }
        FileTable { files }
    }

    pub fn symbols_in(&self, file: FileId) -> impl Iterator<Item = DeclId> + '_ {
        self.files.get(&file).into_iter().flatten().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, &BTreeSet<DeclId>)> {
        self.files.iter().map(|(file, syms)| (*file, syms))
    }

    pub fn retain(&mut self, keep: &FxHashSet<DeclId>) {
        for syms in self.files.values_mut() {
            syms.retain(|id| keep.contains(id));
        }
    }

    /// Total symbols across all files
    pub fn len(&self) -> usize {
        self.files.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
