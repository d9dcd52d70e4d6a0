//! Whole-program model
//!
//! Translation units are linked into one [`Program`]: an arena of file-scope
//! declarations addressed by [`DeclId`] plus the ordered list of top-level
//! items. Re-declarations of a name share a single id, so a prototype in a
//! header and the definition in a `.c` file are the same symbol.

pub mod resolve;
pub mod visit;

use crate::parser::ast::*;
use crate::parser::{ParseError, Parser, TypeNames};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

/// One top-level item in program order
#[derive(Debug, Clone)]
pub enum Item {
    Decl(DeclId),
    Type { file: FileId, def: TypeItem },
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    /// Input file names, indexed by [`FileId`]
    files: Vec<String>,
    decls: Vec<Decl>,
    items: Vec<Item>,
}

/// Header files parse first so their typedefs are known to `.c` files
fn is_header(name: &str) -> bool {
    name.ends_with(".h")
}

impl Program {
    /// Parse and link `(name, text)` sources, then resolve every name
    /// reference.
    pub fn parse(sources: &[(String, String)], type_names: &[String]) -> Result<Self, ParseError> {
        let mut names: TypeNames = type_names.iter().cloned().collect();

        let mut ordered: Vec<&(String, String)> = sources.iter().collect();
        ordered.sort_by_key(|(name, _)| !is_header(name));

        let mut files = Vec::new();
        let mut units = Vec::new();
        for (name, text) in ordered {
            let file = FileId(files.len() as u32);
            let mut parser = Parser::new(text, file, name, &mut names)?;
            let unit = parser.parse_translation_unit()?;
            debug!(file = %name, items = unit.items.len(), "parsed");
            files.push(name.clone());
            units.push(unit);
        }

        let mut program = Program::link(files, units)?;
        resolve::resolve(&mut program);
        Ok(program)
    }

    /// Merge translation units. Unit `i` must come from `files[i]`. Two
    /// files defining the same name when either definition is `static`
    /// cannot share one symbol and fail the link.
    pub fn link(files: Vec<String>, units: Vec<TranslationUnit>) -> Result<Self, ParseError> {
        let mut decls: Vec<Decl> = Vec::new();
        let mut slots: Vec<Option<Item>> = Vec::new();
        let mut by_name: FxHashMap<String, (DeclId, usize)> = FxHashMap::default();

        for (index, unit) in units.into_iter().enumerate() {
            let file = FileId(index as u32);
            for item in unit.items {
                let decl = match item {
                    TopLevel::Type(def) => {
                        slots.push(Some(Item::Type { file, def }));
                        continue;
                    }
                    TopLevel::Decl(decl) => decl,
                };

                match by_name.get(&decl.name).copied() {
                    None => {
                        let id = DeclId(decls.len() as u32);
                        by_name.insert(decl.name.clone(), (id, slots.len()));
                        decls.push(decl);
                        slots.push(Some(Item::Decl(id)));
                    }
                    Some((id, slot)) => {
                        let existing = &mut decls[id.index()];
                        if merge(existing, decl, &files)? {
                            // definitions take their place in program order
                            slots[slot] = None;
                            by_name.insert(existing.name.clone(), (id, slots.len()));
                            slots.push(Some(Item::Decl(id)));
                        }
                    }
                }
            }
        }

        Ok(Program {
            files,
            decls,
            items: slots.into_iter().flatten().collect(),
        })
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn file_name(&self, file: FileId) -> &str {
        &self.files[file.0 as usize]
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Live declaration ids in program order
    pub fn decl_ids(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.items.iter().filter_map(|item| match item {
            Item::Decl(id) => Some(*id),
            Item::Type { .. } => None,
        })
    }

    /// Drop declarations not in `keep` from the item list. Their arena
    /// slots stay so ids remain valid.
    pub fn retain_decls(&mut self, keep: &FxHashSet<DeclId>) {
        self.items.retain(|item| match item {
            Item::Decl(id) => keep.contains(id),
            Item::Type { .. } => true,
        });
    }

    /// Fields of the struct (or union) with tag or typedef name `name`
    pub fn struct_fields(&self, name: &str) -> Option<&[Field]> {
        let mut tag = name;
        for item in &self.items {
            if let Item::Type {
                def: TypeItem::Typedef { name: alias, target, .. },
                ..
            } = item
            {
                if alias == name {
                    if let BaseType::Struct(t) | BaseType::Union(t) = &target.base {
                        tag = t;
                    }
                }
            }
        }

        self.items.iter().find_map(|item| match item {
            Item::Type {
                def: TypeItem::Struct { name: Some(n), fields, .. },
                ..
            } if n == tag && !fields.is_empty() => Some(fields.as_slice()),
            _ => None,
        })
    }
}

/// Fold a re-declaration into the existing declaration. Returns true when
/// `incoming` was a definition that replaced the existing contents.
fn merge(existing: &mut Decl, incoming: Decl, files: &[String]) -> Result<bool, ParseError> {
    let sticky_static = existing.storage == Storage::Static || incoming.storage == Storage::Static;
    let has_contents = |d: &Decl| d.body.is_some() || d.init.is_some();

    let replaced = if has_contents(&incoming) {
        if has_contents(existing) {
            if sticky_static && existing.span.file != incoming.span.file {
                return Err(ParseError {
                    path: files[incoming.span.file.0 as usize].clone(),
                    message: format!(
                        "static '{}' is also defined in {}",
                        incoming.name,
                        files[existing.span.file.0 as usize]
                    ),
                    location: incoming.span.start,
                });
            }
            warn!(
                symbol = %incoming.name,
                file = %files[incoming.span.file.0 as usize],
                "duplicate definition skipped"
            );
            false
        } else {
            *existing = incoming;
            true
        }
    } else if incoming.is_definition() && !existing.is_definition() {
        // tentative definition after an extern declaration
        *existing = incoming;
        true
    } else {
        if existing.params == ParamList::Unspecified && incoming.params != ParamList::Unspecified {
            existing.params = incoming.params;
        }
        false
    };

    if sticky_static {
        existing.storage = Storage::Static;
    }
    Ok(replaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(files: &[(&str, &str)]) -> Vec<(String, String)> {
        files
            .iter()
            .map(|(n, t)| (n.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn test_prototype_and_definition_share_an_id() {
        let program = Program::parse(
            &sources(&[
                ("span.c", "void span(void) { asmout(0); }\n"),
                ("l.h", "void span(void);\nvoid asmout(int);\n"),
                ("asmout.c", "void asmout(int o) { }\n"),
            ]),
            &[],
        )
        .unwrap();

        let ids: Vec<DeclId> = program.decl_ids().collect();
        assert_eq!(ids.len(), 2);
        // headers parse first; definitions move the symbol to its .c file
        assert_eq!(program.files()[0], "l.h");
        let span = program.decl(ids[0]);
        assert_eq!(span.name, "span");
        assert_eq!(program.file_name(span.span.file), "span.c");
        assert!(span.body.is_some());
    }

    #[test]
    fn test_static_is_sticky_and_duplicates_are_skipped() {
        let program = Program::parse(
            &sources(&[
                ("a.c", "static int n;\nint n = 1;\nint n = 2;\n"),
            ]),
            &[],
        )
        .unwrap();

        let ids: Vec<DeclId> = program.decl_ids().collect();
        assert_eq!(ids.len(), 1);
        let n = program.decl(ids[0]);
        assert_eq!(n.storage, Storage::Static);
        assert!(matches!(n.init, Some(Expr::Number(ref v, _)) if v == "1"));
    }

    #[test]
    fn test_static_defined_in_two_files_fails() {
        let err = Program::parse(
            &sources(&[
                ("a.c", "static void put(void) { }\nvoid f(void) { put(); }\n"),
                ("b.c", "static void put(void) { }\nvoid g(void) { put(); }\n"),
            ]),
            &[],
        )
        .unwrap_err();
        assert_eq!(err.path, "b.c");
        assert!(err.message.contains("put"));
        assert!(err.message.contains("a.c"));

        // a static definition alongside a prototype elsewhere still links
        let program = Program::parse(
            &sources(&[
                ("l.h", "void put(void);\n"),
                ("a.c", "static void put(void) { }\n"),
            ]),
            &[],
        )
        .unwrap();
        assert_eq!(program.decl_ids().count(), 1);
    }

    #[test]
    fn test_struct_fields_through_typedef() {
        let program = Program::parse(
            &sources(&[(
                "link.h",
                "typedef struct Link Link;\nstruct Link { int goarm; Prog* curp; };\n",
            )]),
            &["Prog".to_string()],
        )
        .unwrap();

        let fields = program.struct_fields("Link").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].name, "curp");
        assert!(program.struct_fields("Missing").is_none());
    }

    #[test]
    fn test_retain_keeps_arena_ids() {
        let mut program =
            Program::parse(&sources(&[("a.c", "int a = 1;\nint b = 2;\n")]), &[]).unwrap();
        let ids: Vec<DeclId> = program.decl_ids().collect();

        let keep: FxHashSet<DeclId> = [ids[1]].into_iter().collect();
        program.retain_decls(&keep);

        assert_eq!(program.decl_ids().collect::<Vec<_>>(), vec![ids[1]]);
        assert_eq!(program.decl(ids[1]).name, "b");
    }
}
