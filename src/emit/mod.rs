//! Emission: route declarations to destination files and print them
//!
//! Each destination file is the build marker, a provenance line and the
//! include preamble (source files only), then three sections: prototypes of
//! every function with a body, data with initializers, function bodies.

pub mod diff;
pub mod printer;
pub mod stage;

use crate::analysis::Catalog;
use crate::config::RefactorConfig;
use crate::parser::ast::{DeclKind, FileId};
use crate::program::Program;
use std::collections::BTreeMap;
use std::path::Path;

pub fn is_header(name: &str) -> bool {
    name.ends_with(".h")
}

/// Input file → destination file, for every parsed file
#[derive(Debug, Clone)]
pub struct FileRouting {
    /// Indexed by [`FileId`]
    destinations: Vec<String>,
    /// Destination → base names of its inputs, sorted
    inputs: BTreeMap<String, Vec<String>>,
}

impl FileRouting {
    /// Files the configuration does not map (or maps to an empty name) go
    /// to the overflow source or overflow header.
    pub fn new(files: &[String], config: &RefactorConfig) -> Self {
        let mut destinations = Vec::with_capacity(files.len());
        let mut inputs: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for file in files {
            let dest = match config.files.get(file) {
                Some(dest) if !dest.is_empty() => dest.clone(),
                _ if is_header(file) => config.overflow_header.clone(),
                _ => config.overflow_source.clone(),
            };
            let base = Path::new(file)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.clone());
            inputs.entry(dest.clone()).or_default().push(base);
            destinations.push(dest);
        }
        for names in inputs.values_mut() {
            names.sort();
        }

        FileRouting {
            destinations,
            inputs,
        }
    }

    pub fn destination(&self, file: FileId) -> &str {
        &self.destinations[file.0 as usize]
    }

    /// Every destination, sorted
    pub fn destinations(&self) -> impl Iterator<Item = &str> {
        self.inputs.keys().map(String::as_str)
    }

    pub fn inputs(&self, dest: &str) -> &[String] {
        self.inputs.get(dest).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Default)]
struct Sections {
    protos: String,
    data: String,
    funcs: String,
}

/// Print the live program, one text per destination file
pub fn emit(
    program: &Program,
    catalog: &Catalog,
    routing: &FileRouting,
    config: &RefactorConfig,
) -> BTreeMap<String, String> {
    let mut sections: BTreeMap<&str, Sections> = routing
        .destinations()
        .map(|dest| (dest, Sections::default()))
        .collect();

    for &id in catalog.symbols() {
        let decl = program.decl(id);
        let dest = routing.destination(decl.span.file);
        let Some(out) = sections.get_mut(dest) else {
            continue;
        };
        match decl.kind {
            DeclKind::Function if decl.body.is_some() => {
                out.protos.push_str(&printer::prototype(decl));
                out.funcs.push_str(&printer::function(decl));
                out.funcs.push('\n');
            }
            DeclKind::Data if decl.init.is_some() => {
                out.data.push_str(&printer::data(decl));
                out.data.push('\n');
            }
            _ => {}
        }
    }

    sections
        .into_iter()
        .map(|(dest, s)| {
            let mut text = String::new();
            text.push_str(&config.build_marker);
            text.push_str("\n\n");
            if !is_header(dest) {
                text.push_str("// From ");
                for input in routing.inputs(dest) {
                    text.push_str(input);
                    text.push(' ');
                }
                text.push_str("\n\n");
                text.push_str(&config.preamble);
                text.push('\n');
            }
            text.push_str(&s.protos);
            text.push('\n');
            text.push_str(&s.data);
            text.push_str(&s.funcs);
            (dest.to_string(), text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> RefactorConfig {
        let mut config = RefactorConfig::default();
        config.files = [("a.c", "out.c"), ("b.c", "out.c")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config.preamble = "#include <u.h>\n".to_string();
        config
    }

    #[test]
    fn test_routing_with_overflow() {
        let files: Vec<String> = ["a.c", "b.c", "extra.c", "dat.h"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let routing = FileRouting::new(&files, &config());

        assert_eq!(routing.destination(FileId(0)), "out.c");
        assert_eq!(routing.destination(FileId(2)), "zzz.c");
        assert_eq!(routing.destination(FileId(3)), "l.h");
        assert_eq!(routing.inputs("out.c"), &["a.c".to_string(), "b.c".to_string()]);
        assert_eq!(routing.destinations().collect::<Vec<_>>(), vec!["l.h", "out.c", "zzz.c"]);
    }

    #[test]
    fn test_emit_layout() {
        let sources = vec![
            (
                "a.c".to_string(),
                "enum { K = 1 };\nint tab[2] = { 1, 2 };\nint plain;\n\
                 static int\nf(int x)\n{\n\treturn x;\n}\n"
                    .to_string(),
            ),
            ("b.c".to_string(), "void g(void) { f(1); }\n".to_string()),
        ];
        let program = Program::parse(&sources, &[]).unwrap();
        let catalog = Catalog::index(&program);
        let config = config();
        let routing = FileRouting::new(program.files(), &config);

        let out = emit(&program, &catalog, &routing, &config);
        let expected = "//+build ignore\n\n\
             // From a.c b.c \n\n\
             #include <u.h>\n\n\
             static int f(int);\n\
             void g(void);\n\
             \n\
             int tab[2] = { 1, 2 };\n\n\
             static int\nf(int x)\n{\n\treturn x;\n}\n\n\
             void\ng(void)\n{\n\tf(1);\n}\n\n";
        assert_eq!(out["out.c"], expected);
    }

    #[test]
    fn test_emit_is_idempotent() {
        let sources = vec![("a.c".to_string(), "void f(void) { }\n".to_string())];
        let program = Program::parse(&sources, &[]).unwrap();
        let catalog = Catalog::index(&program);
        let config = config();
        let routing = FileRouting::new(program.files(), &config);

        assert_eq!(
            emit(&program, &catalog, &routing, &config),
            emit(&program, &catalog, &routing, &config)
        );
    }
}
