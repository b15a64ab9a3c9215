pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod tool;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExportConfig, OutputConfig, ToolConfig};
pub use error::{Result, ScoreWdError, UserFriendlyError};

// Core functionality re-exports
pub use export::{
    AudioMode, ExistingDirectoryPolicy, ExportPlan, ExportPreview, ExportReport, ExportSettings,
    MetadataMode, Orchestrator, StepPhase, StepProgress,
};
pub use tool::{ExitOutcome, ExternalTool, ProcessTool, ToolInvocation};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use tokio::task;

/// Main library interface for scorewd functionality
pub struct ScoreWd {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl ScoreWd {
    /// Create a new instance; installs the Ctrl+C handler.
    pub fn new(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        show_progress: bool,
    ) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(show_progress);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create a new instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(false);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;

        Self::new(
            config,
            cli_args.output_mode(),
            cli_args.verbosity_level(),
            cli_args.quiet,
            cli_args.show_progress(),
        )
    }

    /// Export every artifact of `source_path` with the configured notation tool.
    pub async fn export_score(&self, source_path: &Path) -> Result<ExportReport> {
        self.shutdown.check_shutdown()?;

        self.output_formatter
            .start_operation(&format!("Exporting {}", source_path.display()));

        self.output_formatter.debug(&format!(
            "Notation tool: {} (timeout: {})",
            self.config.tool.executable.display(),
            match self.config.tool.timeout {
                0 => "none".to_string(),
                secs => format!("{}s", secs),
            }
        ));

        let settings = ExportSettings::from_config(&self.config);
        let step_progress = self
            .progress_manager
            .create_step_progress(settings.plan.len() as u64);

        let progress_callback = {
            let pb = step_progress.clone();
            let formatter = self.output_formatter.clone();
            let print_steps = !self.progress_manager.is_enabled();
            move |progress: &StepProgress| {
                ui::progress::update_step_progress(&pb, progress);
                if print_steps && progress.phase == StepPhase::Started {
                    formatter.step_started(progress);
                }
            }
        };

        let orchestrator = Orchestrator::new(settings)
            .with_progress(progress_callback)
            .with_running_flag(self.shutdown.running_flag());

        let tool = ProcessTool::new(self.config.tool.executable.clone())
            .with_timeout(self.config.tool_timeout())
            .with_running_flag(self.shutdown.running_flag());

        let source = source_path.to_path_buf();
        let result = task::spawn_blocking(move || orchestrator.run(&source, &tool))
            .await
            .map_err(|e| {
                ScoreWdError::Io(std::io::Error::other(format!("Export task failed: {}", e)))
            })?;

        match result {
            Ok(report) => {
                ui::progress::finish_progress_with_summary(
                    &step_progress,
                    &format!("Exported {} files", report.file_count()),
                    report.duration,
                );
                Ok(report)
            }
            Err(e) => {
                step_progress.finish_and_clear();
                Err(e)
            }
        }
    }

    /// Validate `source_path` and compute the planned invocations without touching the disk.
    pub fn preview(&self, source_path: &Path) -> Result<ExportPreview> {
        let orchestrator = Orchestrator::new(ExportSettings::from_config(&self.config));
        orchestrator.preview(source_path, &self.config.tool.executable)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &ScoreWdError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}
