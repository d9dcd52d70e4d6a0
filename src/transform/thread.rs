//! Parameter threading
//!
//! Globals that move into a context structure are replaced by accessor
//! expressions on a new leading parameter. Every function that touches one
//! of them, and transitively every caller of such a function, takes the
//! parameter and passes it on.

use super::{Refactor, RewriteRule};
use crate::config::{RefactorConfig, ThreadSpec};
use crate::errors::{RefactorError, Result};
use crate::parser::ast::*;
use crate::program::{visit, Program};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use std::fs;
use tracing::{debug, info, warn};

/// What one threading stage did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadReport {
    pub param: String,
    pub seeds: usize,
    /// Functions that gained the parameter, sorted
    pub functions: Vec<String>,
    pub call_sites: usize,
    pub references: usize,
}

/// Field names of the struct named by `spec.fields_of`, read from its
/// header. Empty when the thread names no field source.
pub fn field_seeds(spec: &ThreadSpec, config: &RefactorConfig) -> Result<Vec<String>> {
    let Some(source) = &spec.fields_of else {
        return Ok(Vec::new());
    };
    let path = config.resolve(&source.header);
    let text = fs::read_to_string(&path).map_err(|e| RefactorError::io(&path, e))?;
    let header = Program::parse(
        &[(path.display().to_string(), text)],
        &config.type_names,
    )?;
    let fields = header
        .struct_fields(&source.struct_name)
        .ok_or_else(|| RefactorError::MissingStruct {
            name: source.struct_name.clone(),
            header: path.clone(),
        })?;
    debug!(
        name = %source.struct_name,
        fields = fields.len(),
        "loaded field seeds"
    );
    Ok(fields.iter().map(|f| f.name.clone()).collect())
}

impl Refactor {
    /// Thread `spec.param` through every function that needs it. `fields`
    /// are extra seed names, usually from [`field_seeds`]; those not live
    /// in the program are ignored.
    pub fn thread(&mut self, spec: &ThreadSpec, fields: &[String]) -> Result<ThreadReport> {
        let mut seeds: Vec<(DeclId, String)> = Vec::new();
        for (name, accessor) in &spec.seeds {
            let id = self.catalog.require(name, "thread seed")?;
            seeds.push((id, accessor.clone()));
        }
        for field in fields {
            if spec.seeds.contains_key(field) {
                continue;
            }
            if let Some(id) = self.catalog.lookup(field) {
                seeds.push((id, spec.accessor(field)));
            }
        }

        let exempt = spec
            .exempt
            .iter()
            .map(|name| self.catalog.require(name, "thread exemption"))
            .collect::<Result<FxHashSet<DeclId>>>()?;

        let closure = self.closure(&seeds, &exempt);

        for &id in &closure {
            add_param(self.program.decl_mut(id), spec);
        }
        let call_sites = self.pass_param(spec, &closure, &exempt);

        let rules: Vec<RewriteRule> = seeds
            .iter()
            .map(|(id, accessor)| RewriteRule::symbol(*id, accessor, true))
            .collect();
        let members: Vec<DeclId> = closure.iter().copied().collect();
        let references = self.apply_rules(&rules, &members);

        let mut functions: Vec<String> = closure
            .iter()
            .map(|&id| self.program.decl(id).name.clone())
            .collect();
        functions.sort();

        info!(
            param = %spec.param,
            seeds = seeds.len(),
            functions = functions.len(),
            call_sites,
            references,
            "threaded"
        );
        Ok(ThreadReport {
            param: spec.param.clone(),
            seeds: seeds.len(),
            functions,
            call_sites,
            references,
        })
    }

    /// Functions referencing a seed, plus all their transitive callers,
    /// minus the exempt ones
    fn closure(&self, seeds: &[(DeclId, String)], exempt: &FxHashSet<DeclId>) -> BTreeSet<DeclId> {
        let mut closure: BTreeSet<DeclId> = BTreeSet::new();
        let mut worklist: Vec<DeclId> = Vec::new();

        for (seed, _) in seeds {
            for &user in self.graph.reverse(*seed) {
                worklist.push(user);
            }
        }
        while let Some(id) = worklist.pop() {
            if exempt.contains(&id) || !self.program.decl(id).is_function() {
                continue;
            }
            if closure.insert(id) {
                worklist.extend(self.graph.reverse(id).iter().copied());
            }
        }
        closure
    }

    /// Insert the parameter as first argument of every direct call to a
    /// closure member. Returns the number of calls rewritten.
    fn pass_param(
        &mut self,
        spec: &ThreadSpec,
        closure: &BTreeSet<DeclId>,
        exempt: &FxHashSet<DeclId>,
    ) -> usize {
        let mut total = 0;
        for id in self.live() {
            let caller = self.program.decl_mut(id);
            let Some(body) = &mut caller.body else {
                continue;
            };
            let mut count = 0;
            visit::walk_block_mut(body, &mut |expr| {
                let Expr::Call { callee, args, .. } = expr else {
                    return;
                };
                if let Some((_, Binding::Global(target))) = callee.as_name() {
                    if closure.contains(&target) {
                        args.insert(0, Expr::name(&spec.param, Binding::Local));
                        count += 1;
                    }
                }
            });
            if count > 0 && (exempt.contains(&id) || !closure.contains(&id)) {
                warn!(
                    caller = %caller.name,
                    param = %spec.param,
                    calls = count,
                    "passing parameter from a function that does not take it"
                );
            }
            total += count;
        }
        total
    }
}

/// Prepend the parameter; `(void)` and `()` lists are replaced outright
fn add_param(decl: &mut Decl, spec: &ThreadSpec) {
    let mut param_type = Type::named(&spec.param_type);
    param_type.pointer_depth = spec.pointer_depth;
    let param = Param {
        name: Some(spec.param.clone()),
        param_type,
    };
    match &mut decl.params {
        ParamList::List { params, .. } => params.insert(0, param),
        other => {
            *other = ParamList::List {
                params: vec![param],
                variadic: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldSource;
    use crate::emit::printer;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    const CHAIN: &str = "int counter;\n\
                         void c(void) { counter++; }\n\
                         void b(int x) { c(); }\n\
                         void a(void) { b(1); d(); }\n\
                         void d(void) { }\n";

    fn refactor(source: &str) -> Refactor {
        let program = Program::parse(&[("a.c".to_string(), source.to_string())], &[]).unwrap();
        Refactor::new(program)
    }

    fn spec(seeds: &[(&str, &str)], exempt: &[&str]) -> ThreadSpec {
        ThreadSpec {
            seeds: seeds
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            exempt: exempt.iter().map(|s| s.to_string()).collect(),
            ..ThreadSpec::default()
        }
    }

    fn text(r: &Refactor, name: &str) -> String {
        printer::function(r.program.decl(r.catalog.lookup(name).unwrap()))
    }

    #[test]
    fn test_parameter_reaches_transitive_callers() {
        let mut r = refactor(CHAIN);
        let report = r
            .thread(&spec(&[("counter", "ctxt->counter")], &[]), &[])
            .unwrap();

        assert_eq!(report.functions, vec!["a", "b", "c"]);
        assert_eq!(report.call_sites, 2);
        assert_eq!(report.references, 1);

        assert!(text(&r, "c").starts_with("void\nc(Link *ctxt)\n"));
        assert!(text(&r, "c").contains("\tctxt->counter++;\n"));
        assert!(text(&r, "b").starts_with("void\nb(Link *ctxt, int x)\n"));
        assert!(text(&r, "b").contains("\tc(ctxt);\n"));
        assert!(text(&r, "a").contains("\tb(ctxt, 1);\n\td();\n"));
        assert_eq!(text(&r, "d"), "void\nd(void)\n{\n}\n");

        // the accessor no longer denotes the global
        let counter = r.catalog.lookup("counter").unwrap();
        assert!(r.graph.reverse(counter).is_empty());
        assert!(r.graph.is_symmetric());
    }

    #[test]
    fn test_exempt_functions_keep_their_signature() {
        let mut r = refactor(CHAIN);
        let report = r
            .thread(&spec(&[("counter", "ctxt->counter")], &["a"]), &[])
            .unwrap();

        assert_eq!(report.functions, vec!["b", "c"]);
        assert!(text(&r, "a").starts_with("void\na(void)\n"));
        // the call is still rewritten
        assert!(text(&r, "a").contains("b(ctxt, 1);"));
    }

    #[test]
    fn test_mutual_recursion_threads_both_sides() {
        let mut r = refactor(
            "int pc;\n\
             void a(int n) { if(n > 0) b(n - 1); }\n\
             void b(int n) { pc++; a(n); }\n\
             void top(void) { a(3); }\n",
        );
        let report = r.thread(&spec(&[("pc", "ctxt->pc")], &[]), &[]).unwrap();

        assert_eq!(report.functions, vec!["a", "b", "top"]);
        assert_eq!(report.call_sites, 3);
        assert!(text(&r, "a").starts_with("void\na(Link *ctxt, int n)\n"));
        assert!(text(&r, "a").contains("b(ctxt, n - 1);"));
        assert!(text(&r, "b").starts_with("void\nb(Link *ctxt, int n)\n"));
        assert!(text(&r, "b").contains("\tctxt->pc++;\n\ta(ctxt, n);\n"));
        assert!(text(&r, "top").contains("a(ctxt, 3);"));
        assert!(r.graph.is_symmetric());
    }

    #[test]
    fn test_exemption_stops_propagation() {
        let mut r = refactor(
            "int counter;\n\
             void c(void) { counter++; }\n\
             void diag(void) { c(); }\n\
             void caller(void) { diag(); }\n",
        );
        let report = r
            .thread(&spec(&[("counter", "ctxt->counter")], &["diag"]), &[])
            .unwrap();

        assert_eq!(report.functions, vec!["c"]);
        assert!(text(&r, "diag").starts_with("void\ndiag(void)\n"));
        assert!(text(&r, "diag").contains("c(ctxt);"));
        assert_eq!(text(&r, "caller"), "void\ncaller(void)\n{\n\tdiag();\n}\n");
    }

    #[test]
    fn test_successive_passes_stack_leading_arguments() {
        let mut r = refactor(
            "int pc;\nint size;\n\
             void asmout(int n) { size += n; pc++; }\n\
             void span(int n) { asmout(n); if(n > 0) span(n - 1); }\n",
        );
        let cursym = ThreadSpec {
            param: "cursym".to_string(),
            param_type: "LSym".to_string(),
            ..spec(&[("size", "cursym->size")], &[])
        };
        let first = r.thread(&cursym, &[]).unwrap();
        assert_eq!(first.functions, vec!["asmout", "span"]);

        let second = r.thread(&spec(&[("pc", "ctxt->pc")], &[]), &[]).unwrap();
        assert_eq!(second.functions, vec!["asmout", "span"]);

        let asmout = text(&r, "asmout");
        assert!(asmout.starts_with("void\nasmout(Link *ctxt, LSym *cursym, int n)\n"));
        assert!(asmout.contains("\tcursym->size += n;\n\tctxt->pc++;\n"));
        let span = text(&r, "span");
        assert!(span.contains("\tasmout(ctxt, cursym, n);\n"));
        assert!(span.contains("span(ctxt, cursym, n - 1);"));
        assert!(r.graph.is_symmetric());
    }

    #[test]
    fn test_unknown_seed_or_exemption_is_fatal() {
        let mut r = refactor(CHAIN);
        let err = r.thread(&spec(&[("nosuch", "x")], &[]), &[]).unwrap_err();
        assert!(matches!(err, RefactorError::UnknownSymbol { .. }));

        let err = r
            .thread(&spec(&[("counter", "x")], &["nosuch"]), &[])
            .unwrap_err();
        assert!(matches!(err, RefactorError::UnknownSymbol { .. }));
    }

    #[test]
    fn test_field_seeds_from_header() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("link.h"),
            "typedef struct Link Link;\nstruct Link {\n\tint counter;\n\tchar *name;\n};\n",
        )
        .unwrap();

        let mut config = RefactorConfig::default();
        config.root = dir.path().to_path_buf();
        let mut spec = spec(&[], &[]);
        spec.fields_of = Some(FieldSource {
            struct_name: "Link".to_string(),
            header: PathBuf::from("link.h"),
        });

        let fields = field_seeds(&spec, &config).unwrap();
        assert_eq!(fields, vec!["counter", "name"]);

        let mut r = refactor(CHAIN);
        let report = r.thread(&spec, &fields).unwrap();
        assert_eq!(report.seeds, 1);
        assert!(text(&r, "c").contains("ctxt->counter++;"));

        spec.fields_of = Some(FieldSource {
            struct_name: "Missing".to_string(),
            header: PathBuf::from("link.h"),
        });
        assert!(matches!(
            field_seeds(&spec, &config),
            Err(RefactorError::MissingStruct { .. })
        ));
    }
}
