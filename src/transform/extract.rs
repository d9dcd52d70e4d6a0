//! Reachability extraction

use super::Refactor;
use crate::errors::Result;
use crate::parser::ast::DeclId;
use tracing::{debug, info};

impl Refactor {
    /// Prune everything not reachable from `start` out of the program and
    /// all indices. Returns the number of symbols removed.
    pub fn extract(&mut self, start: &[String]) -> Result<usize> {
        let roots = start
            .iter()
            .map(|name| self.catalog.require(name, "start symbol"))
            .collect::<Result<Vec<DeclId>>>()?;

        let live = self.graph.reachable(&roots);
        let before = self.catalog.len();

        for &id in self.catalog.symbols() {
            if !live.contains(&id) {
                debug!(symbol = %self.program.decl(id).name, "pruned");
            }
        }

        self.catalog.retain(&live);
        self.graph.retain(&live);
        self.files.retain(&live);
        self.program.retain_decls(&live);

        let pruned = before - self.catalog.len();
        info!(live = self.catalog.len(), pruned, "extracted");
        Ok(pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RefactorError;
    use crate::program::Program;

    fn refactor(source: &str) -> Refactor {
        let program = Program::parse(&[("a.c".to_string(), source.to_string())], &[]).unwrap();
        Refactor::new(program)
    }

    const SOURCE: &str = "int used;\nint unused;\n\
                          void leaf(void) { used++; }\n\
                          void root(void) { leaf(); }\n\
                          void orphan(void) { unused++; root(); }\n";

    #[test]
    fn test_live_set_is_reachable_set() {
        let mut r = refactor(SOURCE);
        let roots = vec![r.catalog.lookup("root").unwrap()];
        let reachable = r.graph.reachable(&roots);

        let pruned = r.extract(&["root".to_string()]).unwrap();
        assert_eq!(pruned, 2);

        for (name, id) in r.catalog.names() {
            assert!(reachable.contains(&id), "{} should have been pruned", name);
        }
        assert_eq!(r.catalog.len(), reachable.len());
        assert_eq!(r.program.decl_ids().count(), reachable.len());
        assert_eq!(r.files.len(), reachable.len());
        assert!(r.graph.nodes().all(|id| reachable.contains(&id)));
        assert!(r.graph.is_symmetric());
        assert!(r.catalog.lookup("orphan").is_none());
        assert!(r.catalog.lookup("unused").is_none());
    }

    #[test]
    fn test_block_extern_keeps_its_global() {
        let mut r = refactor("int g = 1;\nint spare;\nvoid f(void) { extern int g; g++; }\n");
        let g = r.catalog.lookup("g").unwrap();

        let pruned = r.extract(&["f".to_string()]).unwrap();
        assert_eq!(pruned, 1);
        assert_eq!(r.catalog.lookup("g"), Some(g));
        assert!(r.catalog.lookup("spare").is_none());
        assert!(r.graph.is_symmetric());
    }

    #[test]
    fn test_unknown_start_symbol_is_fatal() {
        let mut r = refactor(SOURCE);
        let err = r.extract(&["nosuch".to_string()]).unwrap_err();
        assert!(matches!(err, RefactorError::UnknownSymbol { .. }));
        // nothing was pruned
        assert_eq!(r.catalog.len(), 5);
    }
}
