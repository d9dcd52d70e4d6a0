//! Literal substitution of name references
//!
//! A rule replaces the printed text of a matching `Name` node. Rules are
//! applied in a single pre-order pass, so each node is rewritten at most
//! once and a chain `a -> b, b -> c` never turns `a` into `c`.

use crate::parser::ast::{Binding, Decl, DeclId, Expr};
use crate::program::visit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Any non-local reference spelled this way, tracked or not
    Name(String),
    /// References resolved to this declaration
    Symbol(DeclId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub pattern: Pattern,
    pub replacement: String,
    /// Rewritten references stop denoting the symbol, which drops the
    /// graph edge on the next rescan
    pub detach: bool,
}

impl RewriteRule {
    pub fn name(from: &str, to: &str, detach: bool) -> Self {
        RewriteRule {
            pattern: Pattern::Name(from.to_string()),
            replacement: to.to_string(),
            detach,
        }
    }

    pub fn symbol(id: DeclId, to: &str, detach: bool) -> Self {
        RewriteRule {
            pattern: Pattern::Symbol(id),
            replacement: to.to_string(),
            detach,
        }
    }

    fn matches(&self, text: &str, binding: Binding) -> bool {
        match &self.pattern {
            Pattern::Name(name) => binding != Binding::Local && text == name,
            Pattern::Symbol(id) => binding == Binding::Global(*id),
        }
    }
}

/// Rewrite the body and initializer of `decl`. When several rules match a
/// reference the last one wins. Returns the number of rewritten nodes.
pub fn rewrite_decl(decl: &mut Decl, rules: &[RewriteRule]) -> usize {
    if rules.is_empty() {
        return 0;
    }
    let mut count = 0;
    visit::walk_decl_mut(decl, &mut |expr| {
        let Expr::Name { text, binding, .. } = expr else {
            return;
        };
        if let Some(rule) = rules.iter().rev().find(|r| r.matches(text, *binding)) {
            *text = rule.replacement.clone();
            if rule.detach {
                *binding = Binding::Unresolved;
            }
            count += 1;
        }
    });
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::printer;
    use crate::program::Program;

    fn setup(source: &str) -> Program {
        Program::parse(&[("a.c".to_string(), source.to_string())], &[]).unwrap()
    }

    fn find(program: &Program, name: &str) -> DeclId {
        program
            .decl_ids()
            .find(|&id| program.decl(id).name == name)
            .unwrap()
    }

    #[test]
    fn test_last_matching_rule_wins() {
        let mut program = setup("int g;\nint f(void) { return g; }\n");
        let g = find(&program, "g");
        let f = find(&program, "f");

        let rules = [
            RewriteRule::name("g", "first", false),
            RewriteRule::symbol(g, "second", true),
        ];
        assert_eq!(rewrite_decl(program.decl_mut(f), &rules), 1);
        assert!(printer::function(program.decl(f)).contains("return second;"));

        let mut program = setup("int g;\nint f(void) { return g; }\n");
        let rules = [
            RewriteRule::symbol(g, "second", true),
            RewriteRule::name("g", "first", false),
        ];
        rewrite_decl(program.decl_mut(f), &rules);
        assert!(printer::function(program.decl(f)).contains("return first;"));
    }

    #[test]
    fn test_locals_are_never_rewritten() {
        let mut program = setup("int g;\nint f(int g) { return g; }\n");
        let f = find(&program, "f");

        let rules = [RewriteRule::name("g", "h", false)];
        assert_eq!(rewrite_decl(program.decl_mut(f), &rules), 0);
    }

    #[test]
    fn test_no_chaining_and_detach() {
        let mut program = setup("int a;\nint b;\nint f(void) { return a + b; }\n");
        let f = find(&program, "f");

        let rules = [
            RewriteRule::name("a", "b", true),
            RewriteRule::name("b", "c", false),
        ];
        assert_eq!(rewrite_decl(program.decl_mut(f), &rules), 2);
        assert!(printer::function(program.decl(f)).contains("return b + c;"));

        let mut bindings = Vec::new();
        visit::walk_decl(program.decl(f), &mut |e| {
            if let Some((text, binding)) = e.as_name() {
                bindings.push((text.to_string(), binding));
            }
        });
        assert_eq!(bindings[0], ("b".to_string(), Binding::Unresolved));
        assert!(matches!(bindings[1].1, Binding::Global(_)));
    }
}
