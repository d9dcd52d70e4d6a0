//! Demote definitions to file-local visibility

use super::Refactor;
use crate::emit::FileRouting;
use crate::parser::ast::{DeclId, Storage};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

impl Refactor {
    /// Make every definition `static` unless a function routed to another
    /// destination file references it or it is a start symbol. Returns the
    /// number of symbols changed.
    pub fn staticize(&mut self, routing: &FileRouting, start: &[String]) -> usize {
        // symbol → destinations of the functions that reference it
        let mut used_from: FxHashMap<DeclId, FxHashSet<&str>> = FxHashMap::default();
        for (file, syms) in self.files.iter() {
            let dest = routing.destination(file);
            for &user in syms {
                for &target in self.graph.forward(user) {
                    used_from.entry(target).or_default().insert(dest);
                }
            }
        }

        let mut changed = 0;
        for &id in self.catalog.symbols() {
            let decl = self.program.decl(id);
            if !decl.is_definition()
                || decl.storage == Storage::Static
                || start.contains(&decl.name)
            {
                continue;
            }
            let home = routing.destination(decl.span.file);
            let exported = used_from
                .get(&id)
                .is_some_and(|dests| dests.iter().any(|&dest| dest != home));
            if exported {
                continue;
            }
            debug!(symbol = %decl.name, file = home, "staticized");
            self.program.decl_mut(id).storage = Storage::Static;
            changed += 1;
        }

        info!(changed, "staticized");
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RefactorConfig;
    use crate::program::Program;

    fn setup() -> (Refactor, FileRouting) {
        let sources = vec![
            (
                "a.c".to_string(),
                "int shared;\nint mine;\nextern int elsewhere;\n\
                 void helper(void) { mine++; }\n\
                 void entry(void) { helper(); shared++; elsewhere++; }\n"
                    .to_string(),
            ),
            ("b.c".to_string(), "void other(void) { shared = 0; entry(); }\n".to_string()),
            ("c.c".to_string(), "void sibling(void) { helper(); }\n".to_string()),
        ];
        let program = Program::parse(&sources, &[]).unwrap();
        let mut config = RefactorConfig::default();
        config.files = [("a.c", "x.c"), ("b.c", "y.c"), ("c.c", "x.c")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let routing = FileRouting::new(program.files(), &config);
        (Refactor::new(program), routing)
    }

    fn storage(r: &Refactor, name: &str) -> Storage {
        r.program.decl(r.catalog.lookup(name).unwrap()).storage
    }

    #[test]
    fn test_only_cross_destination_uses_export() {
        let (mut r, routing) = setup();
        r.staticize(&routing, &["other".to_string()]);

        // used from y.c
        assert_eq!(storage(&r, "shared"), Storage::Default);
        assert_eq!(storage(&r, "entry"), Storage::Default);
        // used from c.c, which lands in the same destination
        assert_eq!(storage(&r, "helper"), Storage::Static);
        assert_eq!(storage(&r, "mine"), Storage::Static);
        assert_eq!(storage(&r, "sibling"), Storage::Static);
        // start symbol
        assert_eq!(storage(&r, "other"), Storage::Default);
        // declarations are not definitions
        assert_eq!(storage(&r, "elsewhere"), Storage::Extern);
    }

    #[test]
    fn test_static_symbols_have_no_foreign_users() {
        let (mut r, routing) = setup();
        r.staticize(&routing, &[]);

        for &id in r.catalog.symbols() {
            let decl = r.program.decl(id);
            if decl.storage != Storage::Static {
                continue;
            }
            let home = routing.destination(decl.span.file);
            for &user in r.graph.reverse(id) {
                assert_eq!(routing.destination(r.program.decl(user).span.file), home);
            }
        }
    }
}
