//! Program-wide symbol renaming

use super::{Refactor, RewriteRule};
use crate::errors::{RefactorError, Result};
use crate::program::visit;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use tracing::{debug, info};

impl Refactor {
    /// Rename symbols and every reference to them. The whole mapping is
    /// checked before anything changes. Returns the number of rewritten
    /// references.
    pub fn rename(&mut self, mapping: &BTreeMap<String, String>) -> Result<usize> {
        let mut targets: FxHashSet<&str> = FxHashSet::default();
        let mut moves = Vec::with_capacity(mapping.len());

        for (old, new) in mapping {
            let id = self.catalog.require(old, "rename")?;
            let taken = self
                .catalog
                .lookup(new)
                .is_some_and(|other| other != id && !mapping.contains_key(new));
            if taken || !targets.insert(new.as_str()) {
                return Err(RefactorError::RenameCollision {
                    from: old.clone(),
                    to: new.clone(),
                });
            }
            moves.push((id, old.clone(), new.clone()));
        }

        for (id, old, new) in &moves {
            debug!(from = %old, to = %new, "renamed");
            self.program.decl_mut(*id).name = new.clone();
        }
        let pairs: Vec<(String, String)> = moves
            .into_iter()
            .map(|(_, old, new)| (old, new))
            .collect();
        self.catalog.rename(&pairs);

        let rules: Vec<RewriteRule> = mapping
            .iter()
            .map(|(old, new)| RewriteRule::name(old, new, false))
            .collect();
        let live = self.live();
        let rewritten = self.apply_rules(&rules, &live);

        // block-scope `extern` and prototype declarations follow their symbol
        for &id in &live {
            if let Some(body) = &mut self.program.decl_mut(id).body {
                visit::walk_global_locals_mut(body, &mut |var| {
                    if let Some(new) = mapping.get(&var.name) {
                        var.name = new.clone();
                    }
                });
            }
        }

        info!(symbols = pairs.len(), references = rewritten, "renamed");
        Ok(rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::printer;
    use crate::program::Program;

    fn refactor(source: &str) -> Refactor {
        let program = Program::parse(&[("a.c".to_string(), source.to_string())], &[]).unwrap();
        Refactor::new(program)
    }

    fn mapping(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_rename_moves_key_and_references() {
        let mut r = refactor("void span(void) { }\nvoid f(int span) { span++; }\nvoid g(void) { span(); }\n");
        let id = r.catalog.lookup("span").unwrap();

        r.rename(&mapping(&[("span", "span7")])).unwrap();

        assert!(r.catalog.lookup("span").is_none());
        assert_eq!(r.catalog.lookup("span7"), Some(id));
        assert_eq!(r.program.decl(id).name, "span7");

        let g = r.catalog.lookup("g").unwrap();
        assert!(printer::function(r.program.decl(g)).contains("span7();"));
        // the parameter that shares the name is left alone
        let f = r.catalog.lookup("f").unwrap();
        assert!(printer::function(r.program.decl(f)).contains("span++;"));

        for &sym in r.catalog.symbols() {
            visit::walk_decl(r.program.decl(sym), &mut |e| {
                if let Some((text, binding)) = e.as_name() {
                    assert!(!(text == "span" && binding == crate::parser::ast::Binding::Global(id)));
                }
            });
        }
        assert!(r.graph.is_symmetric());
    }

    #[test]
    fn test_block_extern_follows_the_rename() {
        let mut r = refactor(
            "int g = 1;\nvoid h(void) { }\n\
             void f(void) { extern int g; void h(void); g++; h(); }\n",
        );
        let g = r.catalog.lookup("g").unwrap();
        let f = r.catalog.lookup("f").unwrap();
        assert!(r.graph.forward(f).contains(&g));

        r.extract(&["f".to_string()]).unwrap();
        assert_eq!(r.catalog.lookup("g"), Some(g));

        r.rename(&mapping(&[("g", "glob"), ("h", "helper")])).unwrap();
        let text = printer::function(r.program.decl(f));
        assert!(text.contains("extern int glob;"), "{}", text);
        assert!(text.contains("glob++;"), "{}", text);
        assert!(text.contains("helper();"), "{}", text);
        assert!(!text.contains("int g;"), "{}", text);
        assert!(r.graph.forward(f).contains(&g));
    }

    #[test]
    fn test_chains_do_not_compose() {
        let mut r = refactor("int a;\nint b;\nint f(void) { return a - b; }\n");
        let a = r.catalog.lookup("a").unwrap();
        let b = r.catalog.lookup("b").unwrap();

        r.rename(&mapping(&[("a", "b"), ("b", "c")])).unwrap();

        assert_eq!(r.catalog.lookup("b"), Some(a));
        assert_eq!(r.catalog.lookup("c"), Some(b));
        assert!(r.catalog.lookup("a").is_none());
        let f = r.catalog.lookup("f").unwrap();
        assert!(printer::function(r.program.decl(f)).contains("return b - c;"));
    }

    #[test]
    fn test_collisions_and_unknown_keys_are_fatal() {
        let mut r = refactor("int a;\nint b;\n");
        let err = r.rename(&mapping(&[("a", "b")])).unwrap_err();
        assert!(matches!(err, RefactorError::RenameCollision { .. }));
        assert_eq!(r.program.decl(r.catalog.lookup("a").unwrap()).name, "a");

        let err = r.rename(&mapping(&[("zz", "y")])).unwrap_err();
        assert!(matches!(err, RefactorError::UnknownSymbol { .. }));

        let err = r.rename(&mapping(&[("a", "x"), ("b", "x")])).unwrap_err();
        assert!(matches!(err, RefactorError::RenameCollision { .. }));
    }
}
