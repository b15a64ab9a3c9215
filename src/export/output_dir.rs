use crate::error::{Result, ScoreWdError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What to do when the working directory already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ExistingDirectoryPolicy {
    /// Keep existing files; exports overwrite files with the same name.
    #[default]
    #[serde(rename = "reuse")]
    #[value(name = "reuse")]
    ReuseExisting,
    /// Delete the directory and everything in it before exporting.
    #[serde(rename = "clear")]
    #[value(name = "clear")]
    ClearAndRecreate,
}

impl ExistingDirectoryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExistingDirectoryPolicy::ReuseExisting => "reuse",
            ExistingDirectoryPolicy::ClearAndRecreate => "clear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryState {
    Absent,
    Existing { entries: usize },
}

pub struct OutputDirectory {
    path: PathBuf,
    policy: ExistingDirectoryPolicy,
}

impl OutputDirectory {
    pub fn new(path: PathBuf, policy: ExistingDirectoryPolicy) -> Self {
        Self { path, policy }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> ExistingDirectoryPolicy {
        self.policy
    }

    /// Inspect the path without modifying anything.
    pub fn inspect(&self) -> Result<DirectoryState> {
        match fs::metadata(&self.path) {
            Ok(metadata) if metadata.is_dir() => {
                let entries = fs::read_dir(&self.path)?.count();
                Ok(DirectoryState::Existing { entries })
            }
            Ok(_) => Err(ScoreWdError::OutputPathConflict {
                path: self.path.display().to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DirectoryState::Absent),
            Err(e) => Err(ScoreWdError::Io(e)),
        }
    }

    /// Apply the policy and make sure the directory exists.
    pub fn prepare(&self) -> Result<DirectoryState> {
        let state = self.inspect()?;

        if let DirectoryState::Existing { entries } = state {
            if self.policy == ExistingDirectoryPolicy::ClearAndRecreate {
                tracing::info!(
                    path = %self.path.display(),
                    entries,
                    "Clearing existing output directory"
                );
                fs::remove_dir_all(&self.path)?;
            }
        }

        fs::create_dir_all(&self.path)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_directory_with_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("song.mscz.wd");
        let output = OutputDirectory::new(path.clone(), ExistingDirectoryPolicy::ReuseExisting);

        assert_eq!(output.prepare().unwrap(), DirectoryState::Absent);
        assert!(path.is_dir());
    }

    #[test]
    fn test_file_in_the_way_is_conflict() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("song.mscz.wd");
        fs::write(&path, b"not a directory").unwrap();

        for policy in [
            ExistingDirectoryPolicy::ReuseExisting,
            ExistingDirectoryPolicy::ClearAndRecreate,
        ] {
            let output = OutputDirectory::new(path.clone(), policy);
            assert!(matches!(
                output.prepare(),
                Err(ScoreWdError::OutputPathConflict { .. })
            ));
            assert!(path.is_file());
        }
    }

    #[test]
    fn test_reuse_keeps_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("song.mscz.wd");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("notes.txt"), b"keep me").unwrap();

        let output = OutputDirectory::new(path.clone(), ExistingDirectoryPolicy::ReuseExisting);
        assert_eq!(
            output.prepare().unwrap(),
            DirectoryState::Existing { entries: 1 }
        );
        assert!(path.join("notes.txt").exists());
    }

    #[test]
    fn test_clear_removes_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("song.mscz.wd");
        fs::create_dir_all(path.join("old")).unwrap();
        fs::write(path.join("stale.svg"), b"stale").unwrap();

        let output =
            OutputDirectory::new(path.clone(), ExistingDirectoryPolicy::ClearAndRecreate);
        output.prepare().unwrap();

        assert!(path.is_dir());
        assert_eq!(fs::read_dir(&path).unwrap().count(), 0);
    }

    #[test]
    fn test_inspect_has_no_side_effects() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("song.mscz.wd");
        let output = OutputDirectory::new(path.clone(), ExistingDirectoryPolicy::ClearAndRecreate);

        assert_eq!(output.inspect().unwrap(), DirectoryState::Absent);
        assert!(!path.exists());
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(ExistingDirectoryPolicy::default().as_str(), "reuse");
        assert_eq!(ExistingDirectoryPolicy::ClearAndRecreate.as_str(), "clear");
    }
}
