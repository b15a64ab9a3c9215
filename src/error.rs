use crate::tool::ExitOutcome;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreWdError {
    #[error("No score file given")]
    MissingArgument,

    #[error("Score file must have {expected} extension: {path}")]
    InvalidExtension { path: String, expected: String },

    #[error("Cannot find file {path}")]
    SourceNotFound { path: String },

    #[error("Output path exists and is not a directory: {path}")]
    OutputPathConflict { path: String },

    #[error("Step {step} ({artifact}) failed: {status}")]
    ToolInvocationFailed {
        step: usize,
        artifact: String,
        status: ExitOutcome,
        captured_output: String,
    },

    #[error("Failed to launch {executable}")]
    ToolLaunch {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Temporary job file error: {path}")]
    TemporaryFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize job descriptor: {0}")]
    JobSerialization(#[from] serde_json::Error),

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

impl ScoreWdError {
    /// Process exit code reported by the `scorewd` binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            ScoreWdError::OutputPathConflict { .. } => 1,
            ScoreWdError::Config { .. } => 2,
            ScoreWdError::MissingArgument => 3,
            ScoreWdError::InvalidExtension { .. } => 4,
            ScoreWdError::SourceNotFound { .. } => 5,
            ScoreWdError::ToolInvocationFailed { .. } | ScoreWdError::ToolLaunch { .. } => 6,
            ScoreWdError::TemporaryFile { .. }
            | ScoreWdError::JobSerialization(_)
            | ScoreWdError::Io(_) => 8,
            ScoreWdError::Cancelled => 130,
        }
    }

    /// True for errors raised before the external tool is ever started.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ScoreWdError::MissingArgument
                | ScoreWdError::InvalidExtension { .. }
                | ScoreWdError::SourceNotFound { .. }
                | ScoreWdError::OutputPathConflict { .. }
        )
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for ScoreWdError {
    fn user_message(&self) -> String {
        match self {
            ScoreWdError::MissingArgument => "Usage: scorewd <score-file>".to_string(),
            ScoreWdError::InvalidExtension { expected, .. } => {
                format!("Score file must have {} extension.", expected)
            }
            ScoreWdError::SourceNotFound { path } => format!("Cannot find file {}", path),
            ScoreWdError::OutputPathConflict { path } => {
                format!("Output path exists and is a regular file: {}", path)
            }
            ScoreWdError::ToolInvocationFailed {
                step,
                artifact,
                status,
                captured_output,
            } => {
                let tail = output_tail(captured_output, 20);
                if tail.is_empty() {
                    format!("Step {} ({}) failed: {}", step, artifact, status)
                } else {
                    format!(
                        "Step {} ({}) failed: {}\n{}",
                        step, artifact, status, tail
                    )
                }
            }
            ScoreWdError::ToolLaunch { executable, source } => {
                format!("Could not start {}: {}", executable, source)
            }
            ScoreWdError::TemporaryFile { path, source } => {
                format!("Temporary job file {}: {}", path, source)
            }
            ScoreWdError::Config { message } => format!("Configuration error: {}", message),
            ScoreWdError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ScoreWdError::MissingArgument => Some(
                "Pass the path of a score file, e.g. scorewd song.mscz".to_string(),
            ),
            ScoreWdError::OutputPathConflict { .. } => Some(
                "Remove or rename the file that blocks the working directory, then run again."
                    .to_string(),
            ),
            ScoreWdError::ToolInvocationFailed { status, .. } => match status {
                ExitOutcome::TimedOut(_) => Some(
                    "The export took longer than the configured timeout. Increase it with --timeout or set 0 to disable."
                        .to_string(),
                ),
                _ => Some(
                    "Check that the score opens in the notation editor and that the executable version supports this export mode."
                        .to_string(),
                ),
            },
            ScoreWdError::ToolLaunch { .. } => Some(
                "Set the executable with --executable, the SCOREWD_EXECUTABLE environment variable, or [tool] executable in the configuration file."
                    .to_string(),
            ),
            ScoreWdError::Config { .. } => Some(
                "Check your configuration file syntax. Use --generate-config to write a fresh sample."
                    .to_string(),
            ),
            ScoreWdError::TemporaryFile { .. } => Some(
                "Ensure the temporary directory exists and is writable.".to_string(),
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ScoreWdError {
    fn from(error: toml::de::Error) -> Self {
        ScoreWdError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoreWdError>;

fn output_tail(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.trim_end().lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
