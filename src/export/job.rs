use crate::error::{Result, ScoreWdError};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// One entry of a `--job` file: `{"in": "...", "out": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    #[serde(rename = "in")]
    pub input: String,
    pub out: Vec<JobOutput>,
}

/// A plain output path, or a `[prefix, suffix]` pair the tool expands once per part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobOutput {
    Path(String),
    Pattern(String, String),
}

impl JobDescriptor {
    pub fn with_track_pattern(
        input: &Path,
        primary: &Path,
        pattern_prefix: &Path,
        pattern_suffix: &str,
    ) -> Self {
        Self {
            input: input.to_string_lossy().into_owned(),
            out: vec![
                JobOutput::Path(primary.to_string_lossy().into_owned()),
                JobOutput::Pattern(
                    pattern_prefix.to_string_lossy().into_owned(),
                    pattern_suffix.to_string(),
                ),
            ],
        }
    }
}

/// Job list written to a temporary file, removed on drop if `remove` is never called.
pub struct JobFile {
    file: NamedTempFile,
}

impl JobFile {
    pub fn create(directory: Option<&Path>, jobs: &[JobDescriptor]) -> Result<Self> {
        let content = serde_json::to_vec_pretty(jobs)?;

        let mut builder = Builder::new();
        builder.prefix("scorewd-job-").suffix(".json");
        let created = match directory {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };

        let mut file = created.map_err(|e| ScoreWdError::TemporaryFile {
            path: directory
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| std::env::temp_dir().display().to_string()),
            source: e,
        })?;

        let path = file.path().display().to_string();
        file.write_all(&content)
            .and_then(|_| file.flush())
            .map_err(|e| ScoreWdError::TemporaryFile { path, source: e })?;

        tracing::debug!(path = %file.path().display(), jobs = jobs.len(), "Wrote job file");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now and report whether that worked.
    pub fn remove(self) -> Result<()> {
        let path = self.file.path().display().to_string();
        self.file
            .close()
            .map_err(|e| ScoreWdError::TemporaryFile { path, source: e })
    }
}
