use crate::export::{StepPhase, StepProgress};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    pub fn create_step_progress(&self, total_steps: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new(total_steps));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} steps {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb.set_message("Preparing export...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn clear(&self) {
        if self.enabled {
            self.multi_progress.clear().ok();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

pub fn update_step_progress(pb: &ProgressBar, progress: &StepProgress) {
    match progress.phase {
        StepPhase::Started => {
            pb.set_position((progress.index - 1) as u64);
            pb.set_message(format!("Generating {}", progress.step.description));
        }
        StepPhase::Finished { .. } => {
            pb.set_position(progress.index as u64);
        }
    }
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    let final_message = format!("{} (completed in {})", message, format_duration(duration));
    pb.finish_with_message(final_message);
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportPlan;

    #[test]
    fn test_progress_manager_creation() {
        let manager = ProgressManager::new(true);
        assert!(manager.is_enabled());

        let disabled_manager = ProgressManager::new(false);
        assert!(!disabled_manager.is_enabled());
    }

    #[test]
    fn test_disabled_progress_bars() {
        let manager = ProgressManager::new(false);
        let pb = manager.create_step_progress(5);
        assert!(pb.is_hidden());
    }

    #[test]
    fn test_step_updates_position() {
        let manager = ProgressManager::new(false);
        let pb = manager.create_step_progress(5);
        let plan = ExportPlan::default();

        let started = StepProgress {
            index: 2,
            total: 5,
            step: &plan.steps()[1],
            phase: StepPhase::Started,
        };
        update_step_progress(&pb, &started);
        assert_eq!(pb.position(), 1);
        assert_eq!(pb.message(), "Generating SVG graphics");

        let finished = StepProgress {
            phase: StepPhase::Finished { files: 1 },
            ..started
        };
        update_step_progress(&pb, &finished);
        assert_eq!(pb.position(), 2);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }
}
