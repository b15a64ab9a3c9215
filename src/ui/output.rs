use crate::error::{ScoreWdError, UserFriendlyError};
use crate::export::{DirectoryState, ExistingDirectoryPolicy, ExportPreview, ExportReport, StepProgress};
use crate::ui::progress::format_duration;
use console::{style, Emoji};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    /// Newline-delimited JSON: every line on stdout is one object with a `type` field.
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static MUSIC: Emoji = Emoji("🎼 ", "* ");

#[derive(Debug, Clone)]
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => console::colors_enabled() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    /// One line per step, used when no progress bar is drawn.
    pub fn step_started(&self, progress: &StepProgress) {
        if !self.should_show_message(0) {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                let counter = format!("[{}/{}]", progress.index, progress.total);
                if self.use_colors {
                    println!(
                        "  {} Generating {}",
                        style(counter).dim(),
                        style(&progress.step.description).cyan()
                    );
                } else {
                    println!("  {} Generating {}", counter, progress.step.description);
                }
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "step",
                    "step": progress.index,
                    "total": progress.total,
                    "artifact": progress.step.artifact_name,
                    "mode": progress.step.invocation_mode.name(),
                    "timestamp": chrono::Utc::now().to_rfc3339()
                }));
            }
            OutputMode::Plain => {
                println!(
                    "STEP {}/{}: {}",
                    progress.index, progress.total, progress.step.artifact_name
                );
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &ScoreWdError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_export_report(&self, report: &ExportReport) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_report(report);
                }
            }
            OutputMode::Json => self.print_json_object(&report_json(report)),
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_export_preview(&self, preview: &ExportPreview) {
        match self.mode {
            OutputMode::Human => self.print_human_preview(preview),
            OutputMode::Json => {
                let invocations: Vec<_> = preview
                    .invocations
                    .iter()
                    .enumerate()
                    .map(|(index, invocation)| {
                        serde_json::json!({
                            "step": index + 1,
                            "command": invocation.display_command(),
                            "expected_output": invocation.expected_output,
                        })
                    })
                    .collect();

                let plan = serde_json::json!({
                    "type": "plan",
                    "source": preview.request.source_path,
                    "output_directory": preview.request.output_directory,
                    "existing_directory": preview.existing_directory,
                    "directory_action": directory_action(preview.directory_state, preview.existing_directory),
                    "invocations": invocations,
                });
                self.print_json_object(&plan);
            }
            OutputMode::Plain => {
                println!("PLAN: {}", preview.request.source_path.display());
                println!("Output: {}", preview.request.output_directory.display());
                println!(
                    "Directory: {}",
                    directory_action(preview.directory_state, preview.existing_directory)
                );
                for (index, invocation) in preview.invocations.iter().enumerate() {
                    println!("{}: {}", index + 1, invocation.display_command());
                }
            }
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{}{}", MUSIC, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_human_report(&self, report: &ExportReport) {
        println!();
        self.print_separator();

        if self.use_colors {
            println!("{}{}", CHECKMARK, style("Score export completed!").green().bold());
        } else {
            println!("✓ Score export completed!");
        }

        println!();
        println!("  Source:     {}", report.source.display());
        println!(
            "  Output:     {}",
            self.highlight(report.output_directory.display().to_string())
        );
        println!(
            "  Files:      {}",
            self.highlight(report.file_count().to_string())
        );
        println!(
            "  Time taken: {}",
            self.highlight(format_duration(report.duration))
        );

        let files = written_file_lines(report);
        if !files.is_empty() {
            println!();
            for file in files {
                println!("  {}", file);
            }
        }

        if self.verbose_level >= 1 {
            println!();
            for record in &report.artifacts {
                println!(
                    "  {}. {} ({}, {} files, {})",
                    record.step,
                    record.artifact,
                    record.mode,
                    record.files.len(),
                    format_duration(record.duration)
                );
            }
        }

        if !report.warnings.is_empty() {
            println!();
            for warning in &report.warnings {
                self.warning(warning);
            }
        }

        self.print_separator();
    }

    fn print_plain_report(&self, report: &ExportReport) {
        println!("COMPLETED: {}", report.source.display());
        println!("Output: {}", report.output_directory.display());
        for file in written_file_lines(report) {
            println!("File: {}", file);
        }
        println!("Duration: {}", format_duration(report.duration));
        for warning in &report.warnings {
            println!("WARNING: {}", warning);
        }
    }

    fn print_human_preview(&self, preview: &ExportPreview) {
        self.print_header("Export plan (dry run)");

        println!("Score:     {}", preview.request.source_path.display());
        println!("Output:    {}", preview.request.output_directory.display());
        println!(
            "Directory: {}",
            directory_action(preview.directory_state, preview.existing_directory)
        );
        println!();

        for (index, invocation) in preview.invocations.iter().enumerate() {
            let command = invocation.display_command();
            if self.use_colors {
                println!("  {} {}", style(format!("{}.", index + 1)).dim(), command);
            } else {
                println!("  {}. {}", index + 1, command);
            }
        }
        println!();
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn directory_action(state: DirectoryState, policy: ExistingDirectoryPolicy) -> String {
    match (state, policy) {
        (DirectoryState::Absent, _) => "will be created".to_string(),
        (DirectoryState::Existing { entries }, ExistingDirectoryPolicy::ReuseExisting) => {
            format!("exists with {} entries, will be reused", entries)
        }
        (DirectoryState::Existing { entries }, ExistingDirectoryPolicy::ClearAndRecreate) => {
            format!("exists with {} entries, will be cleared", entries)
        }
    }
}

/// Full path of every written file, in step order.
fn written_file_lines(report: &ExportReport) -> Vec<String> {
    report
        .written_files()
        .iter()
        .map(|path| path.display().to_string())
        .collect()
}

fn report_json(report: &ExportReport) -> serde_json::Value {
    let mut value = serde_json::to_value(report).unwrap_or_else(|_| serde_json::json!({}));
    if let Some(object) = value.as_object_mut() {
        object.insert("type".to_string(), serde_json::json!("report"));
    }
    value
}
