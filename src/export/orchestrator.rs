use crate::config::Config;
use crate::error::{Result, ScoreWdError};
use crate::export::job::{JobDescriptor, JobFile};
use crate::export::output_dir::{DirectoryState, ExistingDirectoryPolicy, OutputDirectory};
use crate::export::report::{discover_artifacts, ArtifactRecord, ArtifactSnapshot, ExportReport};
use crate::export::request::ExportRequest;
use crate::export::steps::{ExportPlan, ExportStep, InvocationMode};
use crate::tool::{ExitOutcome, ExternalTool, ToolInvocation, ToolOutput};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Placeholder shown for the job file in dry-run plans.
const PLANNED_JOB_FILE: &str = "<job-file>.json";

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub score_extension: String,
    pub directory_suffix: String,
    pub existing_directory: ExistingDirectoryPolicy,
    pub plan: ExportPlan,
    pub job_directory: Option<PathBuf>,
}

impl ExportSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            score_extension: config.output.score_extension.clone(),
            directory_suffix: config.output.directory_suffix.clone(),
            existing_directory: config.output.existing_directory,
            plan: ExportPlan::from_config(&config.export),
            job_directory: config.export.job_directory.clone(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Started,
    Finished { files: usize },
}

#[derive(Debug, Clone)]
pub struct StepProgress<'a> {
    pub index: usize,
    pub total: usize,
    pub step: &'a ExportStep,
    pub phase: StepPhase,
}

/// What a run would do, computed without side effects.
#[derive(Debug, Clone)]
pub struct ExportPreview {
    pub request: ExportRequest,
    pub directory_state: DirectoryState,
    pub existing_directory: ExistingDirectoryPolicy,
    pub invocations: Vec<ToolInvocation>,
}

pub struct Orchestrator {
    settings: ExportSettings,
    progress_callback: Option<Box<dyn Fn(&StepProgress) + Send + Sync>>,
    running: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            settings,
            progress_callback: None,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&StepProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    pub fn request_for<P: AsRef<Path>>(&self, source_path: P) -> Result<ExportRequest> {
        ExportRequest::new(
            source_path,
            &self.settings.score_extension,
            &self.settings.directory_suffix,
        )
    }

    /// Validate everything `run` would validate and list the planned invocations.
    pub fn preview<P: AsRef<Path>>(&self, source_path: P, executable: &Path) -> Result<ExportPreview> {
        let request = self.request_for(source_path)?;
        let output = OutputDirectory::new(
            request.output_directory.clone(),
            self.settings.existing_directory,
        );
        let directory_state = output.inspect()?;

        let invocations = self
            .settings
            .plan
            .steps()
            .iter()
            .map(|step| {
                step.invocation(
                    executable,
                    &request.source_path,
                    &request.output_directory,
                    Path::new(PLANNED_JOB_FILE),
                )
            })
            .collect();

        Ok(ExportPreview {
            request,
            directory_state,
            existing_directory: self.settings.existing_directory,
            invocations,
        })
    }

    /// Export every artifact of `source_path` into its working directory.
    ///
    /// Stops at the first failing step; files written by earlier steps stay on disk.
    pub fn run<P: AsRef<Path>>(&self, source_path: P, tool: &dyn ExternalTool) -> Result<ExportReport> {
        let started = Instant::now();
        let request = self.request_for(source_path)?;

        let output = OutputDirectory::new(
            request.output_directory.clone(),
            self.settings.existing_directory,
        );
        output.prepare()?;

        tracing::info!(
            source = %request.source_path.display(),
            output = %request.output_directory.display(),
            policy = output.policy().as_str(),
            "Starting export"
        );

        let mut report = ExportReport::new(
            request.source_path.clone(),
            request.output_directory.clone(),
            output.policy(),
        );

        let total = self.settings.plan.len();
        for (offset, step) in self.settings.plan.steps().iter().enumerate() {
            let index = offset + 1;
            self.check_running()?;
            self.notify(index, total, step, StepPhase::Started);

            let expected = step.expected_output(&request.output_directory);
            let before = ArtifactSnapshot::capture(&request.output_directory, &expected)?;

            let step_started = Instant::now();
            self.execute_step(index, step, &request, tool, &mut report)?;

            let files = discover_artifacts(&request.output_directory, &expected, &before)?;
            if files.is_empty() {
                report.add_warning(format!(
                    "Step {} ({}) finished but wrote no {} file",
                    index, step.artifact_name, step.output_file_name
                ));
            }

            self.notify(index, total, step, StepPhase::Finished { files: files.len() });
            report.artifacts.push(ArtifactRecord {
                step: index,
                artifact: step.artifact_name.clone(),
                mode: step.invocation_mode.name().to_string(),
                files,
                duration: step_started.elapsed(),
            });
        }

        report.duration = started.elapsed();
        tracing::info!(
            files = report.file_count(),
            duration_ms = report.duration.as_millis() as u64,
            "Export completed"
        );

        Ok(report)
    }

    fn execute_step(
        &self,
        index: usize,
        step: &ExportStep,
        request: &ExportRequest,
        tool: &dyn ExternalTool,
        report: &mut ExportReport,
    ) -> Result<()> {
        match &step.invocation_mode {
            InvocationMode::DirectExport => {
                let invocation = step.invocation(
                    tool.executable(),
                    &request.source_path,
                    &request.output_directory,
                    Path::new(PLANNED_JOB_FILE),
                );
                self.invoke_checked(index, step, tool, &invocation)?;
                Ok(())
            }
            InvocationMode::ScoreMetaCapture => {
                let invocation = step.invocation(
                    tool.executable(),
                    &request.source_path,
                    &request.output_directory,
                    Path::new(PLANNED_JOB_FILE),
                );
                let output = self.invoke_checked(index, step, tool, &invocation)?;
                let text = String::from_utf8_lossy(&output.stdout);
                fs::write(invocation.expected_output.primary_path(), text.as_bytes())?;
                Ok(())
            }
            InvocationMode::JobListExport { prefix, suffix } => {
                let target = step.target_path(&request.output_directory);
                let job = JobDescriptor::with_track_pattern(
                    &request.source_path,
                    &target,
                    &request.output_directory.join(prefix),
                    suffix,
                );
                let job_file = JobFile::create(self.settings.job_directory.as_deref(), &[job])?;

                let invocation = step.invocation(
                    tool.executable(),
                    &request.source_path,
                    &request.output_directory,
                    job_file.path(),
                );
                let result = self.invoke_checked(index, step, tool, &invocation);

                let job_path = job_file.path().display().to_string();
                if let Err(cleanup_error) = job_file.remove() {
                    tracing::warn!(path = %job_path, error = %cleanup_error, "Failed to remove job file");
                    if result.is_ok() {
                        report.add_warning(format!(
                            "Could not remove temporary job file {}",
                            job_path
                        ));
                    }
                }

                result.map(|_| ())
            }
        }
    }

    fn invoke_checked(
        &self,
        index: usize,
        step: &ExportStep,
        tool: &dyn ExternalTool,
        invocation: &ToolInvocation,
    ) -> Result<ToolOutput> {
        tracing::debug!(step = index, command = %invocation.display_command(), "Running step");
        let output = tool.invoke(&invocation.arguments)?;
        if output.success() {
            return Ok(output);
        }

        match output.outcome {
            ExitOutcome::Cancelled => Err(ScoreWdError::Cancelled),
            outcome => {
                tracing::error!(step = index, artifact = %step.artifact_name, outcome = %outcome, "Step failed");
                // Captured stdout is the artifact itself, only stderr explains the failure.
                let captured_output = if invocation.captures_stdout() {
                    String::from_utf8_lossy(&output.stderr).into_owned()
                } else {
                    output.captured_output()
                };
                Err(ScoreWdError::ToolInvocationFailed {
                    step: index,
                    artifact: step.artifact_name.clone(),
                    status: outcome,
                    captured_output,
                })
            }
        }
    }

    fn check_running(&self) -> Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(ScoreWdError::Cancelled);
        }
        Ok(())
    }

    fn notify(&self, index: usize, total: usize, step: &ExportStep, phase: StepPhase) {
        if let Some(ref callback) = self.progress_callback {
            callback(&StepProgress {
                index,
                total,
                step,
                phase,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::export::{AudioMode, MetadataMode};
    use std::collections::BTreeSet;
    use std::ffi::OsString;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Writes `<file name> from <source>` into every target, like a deterministic editor.
    struct FakeTool {
        calls: Mutex<Vec<Vec<OsString>>>,
        fail_on_call: Option<(usize, i32)>,
        writes_files: bool,
        job_files: Mutex<Vec<(PathBuf, String)>>,
    }

    impl FakeTool {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on_call: None,
                writes_files: true,
                job_files: Mutex::new(Vec::new()),
            }
        }

        /// Succeeds on every call without writing anything.
        fn silent() -> Self {
            Self {
                writes_files: false,
                ..Self::new()
            }
        }

        fn failing_on(call: usize, code: i32) -> Self {
            Self {
                fail_on_call: Some((call, code)),
                ..Self::new()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl ExternalTool for FakeTool {
        fn executable(&self) -> &Path {
            Path::new("fake-musescore")
        }

        fn invoke(&self, args: &[OsString]) -> Result<ToolOutput> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(args.to_vec());
                calls.len()
            };

            let finished = |code: i32, stdout: Vec<u8>| ToolOutput {
                outcome: ExitOutcome::Exited(code),
                stdout,
                stderr: if code == 0 { Vec::new() } else { b"render failed".to_vec() },
                elapsed: Duration::from_millis(1),
            };

            if let Some((failing_call, code)) = self.fail_on_call {
                if failing_call == call {
                    return Ok(finished(code, Vec::new()));
                }
            }

            if !self.writes_files {
                return Ok(finished(0, Vec::new()));
            }

            match args[0].to_str().unwrap() {
                "--export-to" => {
                    let target = PathBuf::from(&args[1]);
                    let content = format!(
                        "{} from {}",
                        target.file_name().unwrap().to_string_lossy(),
                        Path::new(&args[2]).display()
                    );
                    fs::write(&target, content).unwrap();
                    Ok(finished(0, Vec::new()))
                }
                "--score-meta" => Ok(finished(0, b"{\"title\":\"Fake\",\"pages\":2}".to_vec())),
                "--job" => {
                    let job_path = PathBuf::from(&args[1]);
                    let content = fs::read_to_string(&job_path).unwrap();
                    self.job_files
                        .lock()
                        .unwrap()
                        .push((job_path, content.clone()));

                    let jobs: Vec<JobDescriptor> = serde_json::from_str(&content).unwrap();
                    for output in &jobs[0].out {
                        match output {
                            crate::export::job::JobOutput::Path(path) => {
                                fs::write(path, b"mix").unwrap();
                            }
                            crate::export::job::JobOutput::Pattern(prefix, suffix) => {
                                fs::write(format!("{}Piano{}", prefix, suffix), b"piano").unwrap();
                            }
                        }
                    }
                    Ok(finished(0, Vec::new()))
                }
                other => panic!("unexpected flag {}", other),
            }
        }
    }

    fn score_in(dir: &TempDir) -> PathBuf {
        let score = dir.path().join("song.mscz");
        fs::write(&score, b"PK fake score").unwrap();
        score
    }

    fn settings(policy: ExistingDirectoryPolicy) -> ExportSettings {
        ExportSettings {
            existing_directory: policy,
            ..ExportSettings::default()
        }
    }

    fn dir_listing(path: &Path) -> BTreeSet<String> {
        fs::read_dir(path)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_successful_run_writes_all_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);
        let tool = FakeTool::new();

        let report = Orchestrator::new(ExportSettings::default())
            .run(&score, &tool)
            .unwrap();

        let output_dir = temp_dir.path().join("song.mscz.wd");
        assert_eq!(report.output_directory, output_dir);
        assert_eq!(report.artifacts.len(), 5);
        assert_eq!(report.file_count(), 5);
        assert!(report.warnings.is_empty());
        assert_eq!(tool.call_count(), 5);
        assert_eq!(
            report.written_files()[1],
            output_dir.join("graphic.svg").as_path()
        );
    }

    #[test]
    fn test_invalid_extension_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let score = temp_dir.path().join("song.mid");
        fs::write(&score, b"midi").unwrap();
        let tool = FakeTool::new();

        let result = Orchestrator::new(ExportSettings::default()).run(&score, &tool);

        assert!(matches!(result, Err(ScoreWdError::InvalidExtension { .. })));
        assert!(!temp_dir.path().join("song.mid.wd").exists());
        assert_eq!(tool.call_count(), 0);
    }

    #[test]
    fn test_missing_source_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let tool = FakeTool::new();
        let orchestrator = Orchestrator::new(ExportSettings::default());

        let missing = temp_dir.path().join("missing.mscz");
        assert!(matches!(
            orchestrator.run(&missing, &tool),
            Err(ScoreWdError::SourceNotFound { .. })
        ));
        assert!(!temp_dir.path().join("missing.mscz.wd").exists());

        let folder = temp_dir.path().join("folder.mscz");
        fs::create_dir(&folder).unwrap();
        assert!(matches!(
            orchestrator.run(&folder, &tool),
            Err(ScoreWdError::SourceNotFound { .. })
        ));
        assert!(!temp_dir.path().join("folder.mscz.wd").exists());
        assert_eq!(tool.call_count(), 0);
    }

    #[test]
    fn test_conflicting_file_never_invokes_tool() {
        let temp_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);
        fs::write(temp_dir.path().join("song.mscz.wd"), b"in the way").unwrap();
        let tool = FakeTool::new();

        let result =
            Orchestrator::new(settings(ExistingDirectoryPolicy::ClearAndRecreate)).run(&score, &tool);

        assert!(matches!(result, Err(ScoreWdError::OutputPathConflict { .. })));
        assert_eq!(tool.call_count(), 0);
        assert!(temp_dir.path().join("song.mscz.wd").is_file());
    }

    #[test]
    fn test_clear_policy_leaves_exactly_the_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);
        let output_dir = temp_dir.path().join("song.mscz.wd");
        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join("stale.txt"), b"old").unwrap();
        fs::write(output_dir.join("graphic-7.svg"), b"old page").unwrap();

        let orchestrator = Orchestrator::new(settings(ExistingDirectoryPolicy::ClearAndRecreate));
        orchestrator.run(&score, &FakeTool::new()).unwrap();

        let expected: BTreeSet<String> = ExportPlan::default()
            .file_names()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(dir_listing(&output_dir), expected);
    }

    #[test]
    fn test_reuse_policy_keeps_unrelated_files() {
        let temp_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);
        let output_dir = temp_dir.path().join("song.mscz.wd");
        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join("notes.txt"), b"mine").unwrap();
        fs::write(output_dir.join("audio.ogg"), b"old audio").unwrap();

        Orchestrator::new(settings(ExistingDirectoryPolicy::ReuseExisting))
            .run(&score, &FakeTool::new())
            .unwrap();

        let listing = dir_listing(&output_dir);
        assert!(listing.contains("notes.txt"));
        assert_eq!(listing.len(), 6);
        assert_eq!(
            fs::read_to_string(output_dir.join("audio.ogg")).unwrap(),
            format!("audio.ogg from {}", score.display())
        );
    }

    #[test]
    fn test_reused_leftovers_are_not_reported_as_written() {
        let temp_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);
        let output_dir = temp_dir.path().join("song.mscz.wd");
        fs::create_dir(&output_dir).unwrap();
        for name in ExportPlan::default().file_names() {
            fs::write(output_dir.join(name), b"from last week").unwrap();
        }
        fs::write(output_dir.join("graphic-2.svg"), b"old page").unwrap();

        let report = Orchestrator::new(settings(ExistingDirectoryPolicy::ReuseExisting))
            .run(&score, &FakeTool::silent())
            .unwrap();

        assert_eq!(report.file_count(), 0);
        assert_eq!(report.warnings.len(), 5);
        assert!(report.warnings[1].contains("graphic.svg"));
    }

    #[test]
    fn test_reuse_reports_only_rewritten_files() {
        let temp_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);
        let output_dir = temp_dir.path().join("song.mscz.wd");
        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join("graphic.svg"), b"old").unwrap();
        fs::write(output_dir.join("graphic-3.svg"), b"old third page").unwrap();

        let report = Orchestrator::new(settings(ExistingDirectoryPolicy::ReuseExisting))
            .run(&score, &FakeTool::new())
            .unwrap();

        assert_eq!(report.file_count(), 5);
        assert_eq!(report.artifacts[1].files, vec![output_dir.join("graphic.svg")]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_failure_on_second_step_stops_the_run() {
        let temp_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);
        let tool = FakeTool::failing_on(2, 42);

        let result = Orchestrator::new(ExportSettings::default()).run(&score, &tool);

        match result {
            Err(ScoreWdError::ToolInvocationFailed {
                step,
                artifact,
                status,
                captured_output,
            }) => {
                assert_eq!(step, 2);
                assert_eq!(artifact, "graphics");
                assert_eq!(status, ExitOutcome::Exited(42));
                assert_eq!(captured_output, "render failed");
            }
            other => panic!("expected ToolInvocationFailed, got {:?}", other),
        }
        assert_eq!(tool.call_count(), 2);

        // Step 1 output stays, nothing after step 2 was attempted.
        let output_dir = temp_dir.path().join("song.mscz.wd");
        assert!(output_dir.join("meta.metajson").exists());
        assert!(!output_dir.join("audio.ogg").exists());
    }

    #[test]
    fn test_capture_mode_writes_stdout_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);
        let tool = FakeTool::new();
        let mut settings = ExportSettings::default();
        settings.plan = ExportPlan::from_config(&ExportConfig {
            metadata: MetadataMode::Capture,
            ..ExportConfig::default()
        });

        Orchestrator::new(settings).run(&score, &tool).unwrap();

        let meta = fs::read_to_string(temp_dir.path().join("song.mscz.wd/meta.metajson")).unwrap();
        assert_eq!(meta, "{\"title\":\"Fake\",\"pages\":2}");
        assert_eq!(tool.calls.lock().unwrap()[0][0], OsString::from("--score-meta"));
    }

    #[test]
    fn test_job_list_file_is_removed_after_success() {
        let temp_dir = TempDir::new().unwrap();
        let job_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);
        let tool = FakeTool::new();

        let mut settings = ExportSettings::default();
        settings.job_directory = Some(job_dir.path().to_path_buf());
        settings.plan = ExportPlan::from_config(&ExportConfig {
            audio: AudioMode::JobList,
            ..ExportConfig::default()
        });

        let report = Orchestrator::new(settings).run(&score, &tool).unwrap();

        let job_files = tool.job_files.lock().unwrap();
        assert_eq!(job_files.len(), 1);
        let (job_path, content) = &job_files[0];
        assert!(!job_path.exists());
        assert_eq!(fs::read_dir(job_dir.path()).unwrap().count(), 0);
        assert!(content.contains("\"in\""));

        let audio = &report.artifacts[2];
        assert_eq!(audio.mode, "job-list-export");
        assert_eq!(audio.files.len(), 2);
    }

    #[test]
    fn test_job_list_file_is_removed_after_failure() {
        let temp_dir = TempDir::new().unwrap();
        let job_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);
        let tool = FakeTool::failing_on(3, 1);

        let mut settings = ExportSettings::default();
        settings.job_directory = Some(job_dir.path().to_path_buf());
        settings.plan = ExportPlan::from_config(&ExportConfig {
            audio: AudioMode::JobList,
            ..ExportConfig::default()
        });

        let result = Orchestrator::new(settings).run(&score, &tool);

        assert!(matches!(
            result,
            Err(ScoreWdError::ToolInvocationFailed { step: 3, .. })
        ));
        assert_eq!(fs::read_dir(job_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_clear_policy_runs_are_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);
        let output_dir = temp_dir.path().join("song.mscz.wd");
        let orchestrator = Orchestrator::new(settings(ExistingDirectoryPolicy::ClearAndRecreate));

        let snapshot = |dir: &Path| -> Vec<(String, Vec<u8>)> {
            let mut files: Vec<_> = fs::read_dir(dir)
                .unwrap()
                .map(|e| {
                    let e = e.unwrap();
                    (
                        e.file_name().to_string_lossy().into_owned(),
                        fs::read(e.path()).unwrap(),
                    )
                })
                .collect();
            files.sort();
            files
        };

        orchestrator.run(&score, &FakeTool::new()).unwrap();
        let first = snapshot(&output_dir);
        orchestrator.run(&score, &FakeTool::new()).unwrap();
        let second = snapshot(&output_dir);

        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cleared_running_flag_cancels_before_first_step() {
        let temp_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);
        let tool = FakeTool::new();
        let running = Arc::new(AtomicBool::new(false));

        let result = Orchestrator::new(ExportSettings::default())
            .with_running_flag(running)
            .run(&score, &tool);

        assert!(matches!(result, Err(ScoreWdError::Cancelled)));
        assert_eq!(tool.call_count(), 0);
    }

    #[test]
    fn test_progress_callback_sees_every_step() {
        let temp_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        Orchestrator::new(ExportSettings::default())
            .with_progress(move |progress| {
                if progress.phase == StepPhase::Started {
                    sink.lock()
                        .unwrap()
                        .push((progress.index, progress.step.artifact_name.clone()));
                }
            })
            .run(&score, &FakeTool::new())
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], (1, "metadata".to_string()));
        assert_eq!(seen[4], (5, "segments".to_string()));
    }

    #[test]
    fn test_preview_has_no_side_effects() {
        let temp_dir = TempDir::new().unwrap();
        let score = score_in(&temp_dir);

        let preview = Orchestrator::new(ExportSettings::default())
            .preview(&score, Path::new("musescore"))
            .unwrap();

        assert_eq!(preview.directory_state, DirectoryState::Absent);
        assert_eq!(preview.invocations.len(), 5);
        assert!(!temp_dir.path().join("song.mscz.wd").exists());
    }
}
