use crate::error::{Result, ScoreWdError};
use crate::export::{AudioMode, ExistingDirectoryPolicy, MetadataMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub tool: ToolConfig,
    pub output: OutputConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Notation editor executable; a bare name is looked up on PATH.
    pub executable: PathBuf,
    /// Per-invocation limit in seconds, 0 disables it.
    pub timeout: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub score_extension: String,
    pub directory_suffix: String,
    pub existing_directory: ExistingDirectoryPolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    pub metadata: MetadataMode,
    pub audio: AudioMode,
    pub audio_track_prefix: String,
    pub audio_track_suffix: String,
    pub job_directory: Option<PathBuf>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("musescore"),
            timeout: 0, // wait as long as the editor needs
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            score_extension: ".mscz".to_string(),
            directory_suffix: ".wd".to_string(),
            existing_directory: ExistingDirectoryPolicy::ReuseExisting,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            metadata: MetadataMode::Direct,
            audio: AudioMode::Direct,
            audio_track_prefix: "audio-".to_string(),
            audio_track_suffix: ".ogg".to_string(),
            job_directory: None, // system temp dir
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ScoreWdError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ScoreWdError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ScoreWdError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["scorewd.toml", "scorewd.config.toml", ".scorewd.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref executable) = cli_args.executable {
            self.tool.executable = executable.clone();
        }

        if let Some(timeout) = cli_args.timeout {
            self.tool.timeout = timeout;
        }

        if let Some(policy) = cli_args.existing_directory {
            self.output.existing_directory = policy;
        }

        if let Some(metadata) = cli_args.metadata {
            self.export.metadata = metadata;
        }

        if let Some(audio) = cli_args.audio {
            self.export.audio = audio;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tool.executable.as_os_str().is_empty() {
            return Err(ScoreWdError::Config {
                message: "Tool executable must not be empty".to_string(),
            });
        }

        let extension = &self.output.score_extension;
        if extension.len() < 2 || !extension.starts_with('.') {
            return Err(ScoreWdError::Config {
                message: format!(
                    "Score extension must start with a dot and name a suffix, got '{}'",
                    extension
                ),
            });
        }

        let suffix = &self.output.directory_suffix;
        if suffix.is_empty() || suffix.contains('/') || suffix.contains('\\') {
            return Err(ScoreWdError::Config {
                message: format!(
                    "Directory suffix must be non-empty and contain no path separators, got '{}'",
                    suffix
                ),
            });
        }

        if self.export.audio_track_suffix.is_empty() {
            return Err(ScoreWdError::Config {
                message: "Audio track suffix must not be empty".to_string(),
            });
        }

        if let Some(ref job_directory) = self.export.job_directory {
            if !job_directory.is_dir() {
                return Err(ScoreWdError::Config {
                    message: format!(
                        "Job directory does not exist: {}",
                        job_directory.display()
                    ),
                });
            }
        }

        Ok(())
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        match self.tool.timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub executable: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub existing_directory: Option<ExistingDirectoryPolicy>,
    pub metadata: Option<MetadataMode>,
    pub audio: Option<AudioMode>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_executable(mut self, executable: Option<PathBuf>) -> Self {
        self.executable = executable;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_existing_directory(mut self, policy: Option<ExistingDirectoryPolicy>) -> Self {
        self.existing_directory = policy;
        self
    }

    pub fn with_metadata(mut self, metadata: Option<MetadataMode>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_audio(mut self, audio: Option<AudioMode>) -> Self {
        self.audio = audio;
        self
    }
}
