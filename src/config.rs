//! Run configuration
//!
//! [`RefactorConfig::default`] is the arm64 port: it turns the Plan 9 `7l`
//! linker into liblink form. A JSON file can replace it wholesale; every
//! field is optional there and falls back to the default value.

use crate::errors::{RefactorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the struct whose fields become parameter seeds is declared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSource {
    pub struct_name: String,
    /// Header to parse, relative to the source root unless absolute
    pub header: PathBuf,
}

/// One parameter-threading stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadSpec {
    /// Parameter name, also the leading argument at call sites
    pub param: String,
    /// Typedef name of the parameter type
    pub param_type: String,
    pub pointer_depth: usize,
    /// Global symbol → replacement text inside threaded functions
    pub seeds: BTreeMap<String, String>,
    /// Every live global named like a field of this struct is a seed
    /// with accessor `param->name`
    pub fields_of: Option<FieldSource>,
    /// Functions never given the parameter
    pub exempt: Vec<String>,
}

impl Default for ThreadSpec {
    fn default() -> Self {
        Self {
            param: "ctxt".to_string(),
            param_type: "Link".to_string(),
            pointer_depth: 1,
            seeds: BTreeMap::new(),
            fields_of: None,
            exempt: Vec::new(),
        }
    }
}

impl ThreadSpec {
    /// `param->field`
    pub fn accessor(&self, field: &str) -> String {
        format!("{}->{}", self.param, field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefactorConfig {
    /// Directory holding the input files
    pub root: PathBuf,
    /// Directory receiving `l.N` stages and patches
    pub output: PathBuf,
    /// Input file (relative to `root`) → destination file
    pub files: BTreeMap<String, String>,
    pub overflow_source: String,
    pub overflow_header: String,
    /// Entry symbols; also exempt from staticizing
    pub start: Vec<String>,
    pub rename: BTreeMap<String, String>,
    pub threads: Vec<ThreadSpec>,
    /// Legacy sentinel name → replacement text
    pub sentinels: BTreeMap<String, String>,
    /// Typedef names known before any file is parsed
    pub type_names: Vec<String>,
    pub preamble: String,
    pub build_marker: String,
    /// Program used to produce patches, invoked as `<cmd> -urp old new`
    pub diff_command: String,
}

impl Default for RefactorConfig {
    fn default() -> Self {
        let strings = |pairs: &[(&str, &str)]| -> BTreeMap<String, String> {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };

        let files = strings(&[
            ("l.h", "l.h"),
            ("sub.c", "xxx.c"),
            ("mod.c", "xxx.c"),
            ("list.c", "list7.c"),
            ("noop.c", "obj7.c"),
            ("elf.c", "xxx.c"),
            ("pass.c", "obj7.c"),
            ("pobj.c", "xxx.c"),
            ("asm.c", "asm7.c"),
            ("optab.c", "asm7.c"),
            ("obj.c", "obj7.c"),
            ("span.c", "asm7.c"),
            ("asmout.c", "asm7.c"),
        ]);

        let start = ["span", "asmout", "chipfloat", "follow", "noops", "listinit", "buildop"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rename = strings(&[
            ("span", "span7"),
            ("chipfloat", "chipfloat7"),
            ("listinit", "listinit7"),
            ("noops", "addstacksplit"),
        ]);

        let threads = vec![
            ThreadSpec {
                param: "cursym".to_string(),
                param_type: "LSym".to_string(),
                pointer_depth: 1,
                seeds: strings(&[("curtext", "cursym->text"), ("firstp", "cursym->text")]),
                fields_of: None,
                // liblink's diag has its own calling convention
                exempt: vec!["diag".to_string()],
            },
            ThreadSpec {
                param: "ctxt".to_string(),
                param_type: "Link".to_string(),
                pointer_depth: 1,
                seeds: BTreeMap::new(),
                fields_of: Some(FieldSource {
                    struct_name: "Link".to_string(),
                    header: PathBuf::from("../../../include/link.h"),
                }),
                exempt: vec!["diag".to_string()],
            },
        ];

        let type_names = [
            "uchar", "ushort", "uint", "ulong", "vlong", "uvlong", "schar", "Rune", "Biobuf",
            "va_list",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let root = std::env::var_os("GOROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/usr/local/go"))
            .join("src/cmd/7l");

        Self {
            root,
            output: PathBuf::from("."),
            files,
            overflow_source: "zzz.c".to_string(),
            overflow_header: "l.h".to_string(),
            start,
            rename,
            threads,
            sentinels: strings(&[("P", "nil"), ("S", "nil")]),
            type_names,
            preamble: "#include <u.h>\n#include <libc.h>\n#include <bio.h>\n#include <link.h>\n#include \"../cmd/7l/7.out.h\"\n".to_string(),
            build_marker: "//+build ignore".to_string(),
            diff_command: "diff".to_string(),
        }
    }
}

impl RefactorConfig {
    /// Load a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| RefactorError::io(path, e))?;
        let config: RefactorConfig = serde_json::from_str(&text)
            .map_err(|e| RefactorError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() {
            return Err(RefactorError::Config("no input files".to_string()));
        }
        if self.start.is_empty() {
            return Err(RefactorError::Config("empty start set".to_string()));
        }
        for spec in &self.threads {
            if spec.param.is_empty() || spec.param_type.is_empty() {
                return Err(RefactorError::Config(
                    "thread entry needs a parameter name and type".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Absolute path of an input file
    pub fn source_path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Resolve a path that is relative to the source root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_arm64_port() {
        let config = RefactorConfig::default();
        assert!(config.root.ends_with("src/cmd/7l"));
        assert_eq!(config.files.get("span.c").map(String::as_str), Some("asm7.c"));
        assert_eq!(config.rename.get("noops").map(String::as_str), Some("addstacksplit"));
        assert_eq!(config.threads.len(), 2);
        assert_eq!(config.threads[0].param, "cursym");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(
            &path,
            r#"{ "root": "/src", "files": { "a.c": "out.c" }, "start": ["main"],
                 "threads": [ { "param": "ctxt", "seeds": { "g": "ctxt->g" } } ] }"#,
        )
        .unwrap();

        let config = RefactorConfig::load(&path).unwrap();
        assert_eq!(config.root, PathBuf::from("/src"));
        assert_eq!(config.overflow_source, "zzz.c");
        assert_eq!(config.threads[0].param_type, "Link");
        assert_eq!(config.threads[0].accessor("g"), "ctxt->g");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(RefactorConfig::load(&path), Err(RefactorError::Config(_))));
    }
}
