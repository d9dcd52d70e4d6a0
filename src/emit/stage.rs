//! Stage recording
//!
//! Every emission becomes a numbered snapshot, written to `l.<n>` under the
//! output root. Snapshots are append-only and never change once recorded.

use crate::errors::{RefactorError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The emitted program after one transformation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub index: usize,
    /// Name of the stage that produced it: `extract`, `rename`, ...
    pub label: String,
    /// Destination file → contents
    pub files: BTreeMap<String, String>,
}

impl Snapshot {
    /// Directory name of this stage
    pub fn dir_name(&self) -> String {
        stage_dir(self.index)
    }

    pub fn size(&self) -> usize {
        self.files.values().map(String::len).sum()
    }
}

pub fn stage_dir(index: usize) -> String {
    format!("l.{}", index)
}

#[derive(Debug)]
pub struct StageRecorder {
    root: PathBuf,
    snapshots: Vec<Snapshot>,
}

impl StageRecorder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StageRecorder {
            root: root.into(),
            snapshots: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `files` to the next stage directory, replacing whatever a
    /// previous run left there
    pub fn record(&mut self, label: &str, files: BTreeMap<String, String>) -> Result<&Snapshot> {
        let snapshot = Snapshot {
            index: self.snapshots.len(),
            label: label.to_string(),
            files,
        };

        let dir = self.root.join(snapshot.dir_name());
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| RefactorError::io(&dir, e))?;
        }
        fs::create_dir_all(&dir).map_err(|e| RefactorError::io(&dir, e))?;
        for (name, text) in &snapshot.files {
            let path = dir.join(name);
            fs::write(&path, text).map_err(|e| RefactorError::io(&path, e))?;
        }
        debug!(
            stage = snapshot.index,
            label,
            files = snapshot.files.len(),
            bytes = snapshot.size(),
            "recorded"
        );

        self.snapshots.push(snapshot);
        Ok(&self.snapshots[self.snapshots.len() - 1])
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn into_snapshots(self) -> Vec<Snapshot> {
        self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_stages_are_numbered_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut stages = StageRecorder::new(dir.path());

        stages.record("extract", files(&[("a.c", "one\n")])).unwrap();
        let second = stages.record("rename", files(&[("a.c", "two\n")])).unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.dir_name(), "l.1");

        assert_eq!(fs::read_to_string(dir.path().join("l.0/a.c")).unwrap(), "one\n");
        assert_eq!(fs::read_to_string(dir.path().join("l.1/a.c")).unwrap(), "two\n");
        assert_eq!(stages.len(), 2);
        assert_eq!(stages.get(0).unwrap().label, "extract");
    }

    #[test]
    fn test_stale_stage_contents_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("l.0")).unwrap();
        fs::write(dir.path().join("l.0/stale.c"), "old").unwrap();

        let mut stages = StageRecorder::new(dir.path());
        stages.record("extract", files(&[("a.c", "new\n")])).unwrap();

        assert!(!dir.path().join("l.0/stale.c").exists());
        assert!(dir.path().join("l.0/a.c").exists());
    }
}
