use crate::config::{CliOverrides, Config};
use crate::error::{Result, ScoreWdError};
use crate::export::{AudioMode, ExistingDirectoryPolicy, MetadataMode};
use crate::ui::OutputMode;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "scorewd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Export the web-display artifacts of a music score")]
#[command(
    long_about = "scorewd drives an external notation tool to export a score's metadata, \
                  SVG graphics, OGG audio and position indexes into a working directory \
                  named after the score (<score-file>.wd)."
)]
#[command(before_help = "🎼 scorewd - Score Web-Display Exporter")]
#[command(after_help = "EXAMPLES:\n  \
    scorewd song.mscz\n  \
    scorewd song.mscz --existing clear\n  \
    scorewd song.mscz --metadata capture --audio job-list\n  \
    scorewd song.mscz --executable /opt/mscore/bin/mscore4 --timeout 300\n  \
    scorewd song.mscz --dry-run")]
pub struct Cli {
    /// Score file to export (must carry the configured extension, .mscz by default)
    pub score_file: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Notation tool executable
    #[arg(short = 'x', long, env = "SCOREWD_EXECUTABLE")]
    pub executable: Option<PathBuf>,

    /// What to do with an existing working directory
    #[arg(long, value_enum)]
    pub existing: Option<ExistingDirectoryPolicy>,

    /// How the metadata artifact is produced
    #[arg(long, value_enum)]
    pub metadata: Option<MetadataMode>,

    /// How the audio artifact is produced
    #[arg(long, value_enum)]
    pub audio: Option<AudioMode>,

    /// Per-invocation timeout in seconds (0 disables)
    #[arg(long, help = "Kill the notation tool after this many seconds (0 = no limit)")]
    pub timeout: Option<u64>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Validate the score and print the planned tool invocations")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// One JSON object per line
    Json,
    /// Plain text output
    Plain,
}

impl From<&OutputFormat> for OutputMode {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_executable(self.executable.clone())
            .with_timeout(self.timeout)
            .with_existing_directory(self.existing)
            .with_metadata(self.metadata)
            .with_audio(self.audio)
    }

    /// The score argument, or `MissingArgument` when it was omitted.
    pub fn require_score_file(&self) -> Result<&Path> {
        self.score_file
            .as_deref()
            .ok_or(ScoreWdError::MissingArgument)
    }

    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from(&self.output_format)
    }

    /// The progress bar would garble JSON and plain output.
    pub fn show_progress(&self) -> bool {
        matches!(self.output_format, OutputFormat::Human) && !self.quiet
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
