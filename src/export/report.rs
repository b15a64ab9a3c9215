use crate::error::Result;
use crate::export::ExistingDirectoryPolicy;
use crate::tool::ExpectedOutput;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactRecord {
    pub step: usize,
    pub artifact: String,
    pub mode: String,
    pub files: Vec<PathBuf>,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub source: PathBuf,
    pub output_directory: PathBuf,
    pub existing_directory: ExistingDirectoryPolicy,
    pub artifacts: Vec<ArtifactRecord>,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub warnings: Vec<String>,
}

impl ExportReport {
    pub fn new(
        source: PathBuf,
        output_directory: PathBuf,
        existing_directory: ExistingDirectoryPolicy,
    ) -> Self {
        Self {
            source,
            output_directory,
            existing_directory,
            artifacts: Vec::new(),
            started_at: Utc::now(),
            duration: Duration::ZERO,
            warnings: Vec::new(),
        }
    }

    pub fn add_warning<S: Into<String>>(&mut self, warning: S) {
        self.warnings.push(warning.into());
    }

    /// Every file written, in step order.
    pub fn written_files(&self) -> Vec<&Path> {
        self.artifacts
            .iter()
            .flat_map(|record| record.files.iter().map(PathBuf::as_path))
            .collect()
    }

    pub fn file_count(&self) -> usize {
        self.artifacts.iter().map(|record| record.files.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

/// Files matching a step's outputs as they were before the step ran.
#[derive(Debug, Default)]
pub struct ArtifactSnapshot {
    files: HashMap<PathBuf, FileStamp>,
}

impl ArtifactSnapshot {
    pub fn capture(output_directory: &Path, expected: &ExpectedOutput) -> Result<Self> {
        if !output_directory.is_dir() {
            return Ok(Self::default());
        }
        Ok(Self {
            files: matching_files(output_directory, expected)?.into_iter().collect(),
        })
    }

    fn unchanged(&self, path: &Path, stamp: &FileStamp) -> bool {
        self.files.get(path) == Some(stamp)
    }
}

/// Find the files a step wrote to `output_directory`.
///
/// Besides the exact target this picks up `<stem>-<N>.<ext>` (multi-page SVG) and,
/// for job-list steps, anything named `<prefix>...<suffix>`. Files whose size and
/// modification time are the same as in `before` are left out.
pub fn discover_artifacts(
    output_directory: &Path,
    expected: &ExpectedOutput,
    before: &ArtifactSnapshot,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for (path, stamp) in matching_files(output_directory, expected)? {
        if before.unchanged(&path, &stamp) {
            tracing::debug!(path = %path.display(), "Skipping file left over from an earlier run");
            continue;
        }
        files.push(path);
    }
    Ok(files)
}

fn matching_files(
    output_directory: &Path,
    expected: &ExpectedOutput,
) -> Result<Vec<(PathBuf, FileStamp)>> {
    let primary_name = expected
        .primary_path()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut patterns = Vec::new();
    if let Some(numbered) = numbered_sibling_pattern(&primary_name) {
        patterns.push(numbered);
    }
    if let ExpectedOutput::Pattern { prefix, suffix, .. } = expected {
        let pattern = format!("^{}.+{}$", regex::escape(prefix), regex::escape(suffix));
        if let Ok(regex) = Regex::new(&pattern) {
            patterns.push(regex);
        }
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(output_directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if name == primary_name || patterns.iter().any(|regex| regex.is_match(&name)) {
            let metadata = entry.metadata().map_err(std::io::Error::from)?;
            let stamp = FileStamp {
                modified: metadata.modified().ok(),
                len: metadata.len(),
            };
            files.push((entry.into_path(), stamp));
        }
    }

    Ok(files)
}

fn numbered_sibling_pattern(file_name: &str) -> Option<Regex> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Regex::new(&format!(
        r"^{}-\d+\.{}$",
        regex::escape(stem),
        regex::escape(extension)
    ))
    .ok()
}
