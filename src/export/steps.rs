use crate::config::ExportConfig;
use crate::tool::{ExpectedOutput, ToolInvocation};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the metadata artifact is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataMode {
    /// `--export-to meta.metajson` (MuseScore 3 and older)
    Direct,
    /// `--score-meta` with stdout captured (MuseScore 4)
    Capture,
}

/// How the audio artifact is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AudioMode {
    /// `--export-to audio.ogg`
    Direct,
    /// `--job` file with a per-part track pattern
    JobList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvocationMode {
    DirectExport,
    ScoreMetaCapture,
    JobListExport { prefix: String, suffix: String },
}

impl InvocationMode {
    pub fn name(&self) -> &'static str {
        match self {
            InvocationMode::DirectExport => "direct-export",
            InvocationMode::ScoreMetaCapture => "score-meta-capture",
            InvocationMode::JobListExport { .. } => "job-list-export",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportStep {
    pub artifact_name: String,
    pub output_file_name: String,
    pub invocation_mode: InvocationMode,
    pub description: String,
}

impl ExportStep {
    pub fn new(
        artifact_name: &str,
        output_file_name: &str,
        invocation_mode: InvocationMode,
        description: &str,
    ) -> Self {
        Self {
            artifact_name: artifact_name.to_string(),
            output_file_name: output_file_name.to_string(),
            invocation_mode,
            description: description.to_string(),
        }
    }

    pub fn target_path(&self, output_directory: &Path) -> PathBuf {
        output_directory.join(&self.output_file_name)
    }

    /// Files this step is expected to leave behind; independent of the executable.
    pub fn expected_output(&self, output_directory: &Path) -> ExpectedOutput {
        let path = self.target_path(output_directory);
        match &self.invocation_mode {
            InvocationMode::DirectExport => ExpectedOutput::File { path },
            InvocationMode::ScoreMetaCapture => ExpectedOutput::Captured { path },
            InvocationMode::JobListExport { prefix, suffix } => ExpectedOutput::Pattern {
                primary: path,
                prefix: prefix.clone(),
                suffix: suffix.clone(),
            },
        }
    }

    /// Build the invocation for this step. `job_file` is only read in job-list mode.
    pub fn invocation(
        &self,
        executable: &Path,
        source: &Path,
        output_directory: &Path,
        job_file: &Path,
    ) -> ToolInvocation {
        let target = self.target_path(output_directory);
        match &self.invocation_mode {
            InvocationMode::DirectExport => ToolInvocation::export_to(executable, source, &target),
            InvocationMode::ScoreMetaCapture => {
                ToolInvocation::score_meta(executable, source, &target)
            }
            InvocationMode::JobListExport { prefix, suffix } => {
                ToolInvocation::job(executable, job_file, &target, prefix, suffix)
            }
        }
    }
}

/// The fixed, ordered list of artifacts produced for one score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    steps: Vec<ExportStep>,
}

impl ExportPlan {
    pub fn from_config(config: &ExportConfig) -> Self {
        let metadata_mode = match config.metadata {
            MetadataMode::Direct => InvocationMode::DirectExport,
            MetadataMode::Capture => InvocationMode::ScoreMetaCapture,
        };

        let audio_mode = match config.audio {
            AudioMode::Direct => InvocationMode::DirectExport,
            AudioMode::JobList => InvocationMode::JobListExport {
                prefix: config.audio_track_prefix.clone(),
                suffix: config.audio_track_suffix.clone(),
            },
        };

        Self {
            steps: vec![
                ExportStep::new("metadata", "meta.metajson", metadata_mode, "metadata"),
                ExportStep::new(
                    "graphics",
                    "graphic.svg",
                    InvocationMode::DirectExport,
                    "SVG graphics",
                ),
                ExportStep::new("audio", "audio.ogg", audio_mode, "OGG audio"),
                ExportStep::new(
                    "measures",
                    "measures.mpos",
                    InvocationMode::DirectExport,
                    "measure positions",
                ),
                ExportStep::new(
                    "segments",
                    "segments.spos",
                    InvocationMode::DirectExport,
                    "segment positions",
                ),
            ],
        }
    }

    pub fn steps(&self) -> &[ExportStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[cfg(test)]
    pub fn file_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .map(|step| step.output_file_name.as_str())
            .collect()
    }
}

impl Default for ExportPlan {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}
