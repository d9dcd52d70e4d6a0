//! Patches between recorded stages

use super::stage::stage_dir;
use crate::errors::{RefactorError, Result};
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// See [`patch_name`]
    pub name: String,
    pub from: usize,
    pub to: usize,
    pub text: String,
}

/// `d<from><to>.patch`, with a dash between the indices once either has
/// two digits so `(1, 10)` and `(11, 0)` never share a name
pub fn patch_name(from: usize, to: usize) -> String {
    if from < 10 && to < 10 {
        format!("d{}{}.patch", from, to)
    } else {
        format!("d{}-{}.patch", from, to)
    }
}

/// Unified diff of stage `from` against stage `to`, both under `root`
pub fn diff_stages(command: &str, root: &Path, from: usize, to: usize) -> Result<String> {
    let output = Command::new(command)
        .arg("-urp")
        .arg(stage_dir(from))
        .arg(stage_dir(to))
        .current_dir(root)
        .output()
        .map_err(|e| RefactorError::Diff(format!("{}: {}", command, e)))?;

    // diff exits 1 when the trees differ
    match output.status.code() {
        Some(0) | Some(1) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
        _ => Err(RefactorError::Diff(format!(
            "{} {} {}: {}",
            command,
            stage_dir(from),
            stage_dir(to),
            String::from_utf8_lossy(&output.stderr).trim()
        ))),
    }
}

/// Write a patch for each consecutive pair of the first `stages` stages and
/// one cumulative patch from the first to the last
pub fn write_patches(command: &str, root: &Path, stages: usize) -> Result<Vec<Patch>> {
    let mut pairs: Vec<(usize, usize)> = (1..stages).map(|i| (i - 1, i)).collect();
    if stages > 2 {
        pairs.push((0, stages - 1));
    }

    let mut patches = Vec::with_capacity(pairs.len());
    for (from, to) in pairs {
        let text = diff_stages(command, root, from, to)?;
        let name = patch_name(from, to);
        let path = root.join(&name);
        fs::write(&path, &text).map_err(|e| RefactorError::io(&path, e))?;
        debug!(patch = %name, bytes = text.len(), "wrote patch");
        patches.push(Patch {
            name,
            from,
            to,
            text,
        });
    }
    Ok(patches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::stage::StageRecorder;
    use std::collections::BTreeMap;

    fn have_diff() -> bool {
        Command::new("diff").arg("--version").output().is_ok()
    }

    fn files(text: &str) -> BTreeMap<String, String> {
        [("a.c".to_string(), text.to_string())].into_iter().collect()
    }

    #[test]
    fn test_pairwise_and_cumulative_patches() {
        if !have_diff() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let mut stages = StageRecorder::new(dir.path());
        stages.record("a", files("one\n")).unwrap();
        stages.record("b", files("one\n")).unwrap();
        stages.record("c", files("three\n")).unwrap();

        let patches = write_patches("diff", dir.path(), stages.len()).unwrap();
        let names: Vec<&str> = patches.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["d01.patch", "d12.patch", "d02.patch"]);

        assert!(patches[0].text.is_empty());
        assert!(patches[1].text.contains("-one"));
        assert!(patches[1].text.contains("+three"));
        assert!(dir.path().join("d02.patch").exists());
    }

    #[test]
    fn test_long_runs_get_unambiguous_names() {
        assert_eq!(patch_name(3, 4), "d34.patch");
        assert_eq!(patch_name(9, 10), "d9-10.patch");
        assert_eq!(patch_name(0, 11), "d0-11.patch");
        assert_ne!(patch_name(1, 10), patch_name(11, 0));
    }

    #[test]
    fn test_missing_command_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = diff_stages("no-such-diff-program", dir.path(), 0, 1).unwrap_err();
        assert!(matches!(err, RefactorError::Diff(_)));
    }
}
