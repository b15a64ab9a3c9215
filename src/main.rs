use clap::Parser;
use scorewd::logging::{init_logging, level_for_verbosity};
use scorewd::{Cli, OutputFormatter, ScoreWd, ScoreWdError, UserFriendlyError};
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();
    init_logging(level_for_verbosity(cli.verbose, cli.quiet));

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let score_file = match cli.require_score_file() {
        Ok(path) => path.to_path_buf(),
        Err(e) => {
            print_startup_error(&cli, &e);
            return e.exit_code();
        }
    };

    let scorewd = match ScoreWd::from_cli(&cli) {
        Ok(scorewd) => scorewd,
        Err(e) => {
            print_startup_error(&cli, &e);
            return e.exit_code();
        }
    };

    if cli.dry_run {
        return handle_dry_run(&scorewd, &score_file);
    }

    match scorewd.export_score(&score_file).await {
        Ok(report) => {
            scorewd.output_formatter().print_export_report(&report);
            0
        }
        Err(e) => {
            tracing::debug!(error = ?e, precondition = e.is_precondition(), "Export failed");
            scorewd.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("scorewd.toml"));

    if config_path.exists() {
        let error = ScoreWdError::Config {
            message: format!(
                "Refusing to overwrite existing file {}",
                config_path.display()
            ),
        };
        print_startup_error(cli, &error);
        return error.exit_code();
    }

    match ScoreWd::generate_sample_config(&config_path) {
        Ok(()) => {
            println!(
                "Generated sample configuration file: {}",
                config_path.display()
            );
            println!("\nTo use this configuration:");
            println!(
                "  scorewd <score-file> --config {}",
                config_path.display()
            );
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!(
                "Failed to generate configuration file: {}",
                e.user_message()
            );
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            e.exit_code()
        }
    }
}

fn handle_dry_run(scorewd: &ScoreWd, score_file: &Path) -> i32 {
    let formatter = scorewd.output_formatter();

    match scorewd.preview(score_file) {
        Ok(preview) => {
            formatter.print_export_preview(&preview);
            formatter.success("Export plan is valid");
            formatter.info("Run without --dry-run to perform the export");
            0
        }
        Err(e) => {
            scorewd.handle_error(&e);
            e.exit_code()
        }
    }
}

fn print_startup_error(cli: &Cli, error: &ScoreWdError) {
    let formatter = OutputFormatter::new(cli.output_mode(), 0, false);
    formatter.print_user_friendly_error(error);
}
