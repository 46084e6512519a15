//! Progress reporting with indicatif bars and spinners

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use verdict_application::ProgressNotifier;
use verdict_domain::DebateStage;

/// Reports progress with a fan-out bar and per-stage spinners
pub struct ProgressReporter {
    multi: MultiProgress,
    fanout_bar: Mutex<Option<ProgressBar>>,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            fanout_bar: Mutex::new(None),
            spinner: Mutex::new(None),
        }
    }

    fn fanout_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} {elapsed:.dim}")
            .unwrap()
    }

    fn start_spinner(&self, prefix: String, message: String) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(prefix);
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(pb);
        }
    }

    fn finish_spinner(&self, success: bool) {
        let Ok(mut slot) = self.spinner.lock() else {
            return;
        };
        if let Some(pb) = slot.take() {
            let mark = if success { "v".green() } else { "x".red() };
            pb.finish_with_message(format!("{} {}", pb.message(), mark));
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_fanout_start(&self, total: usize) {
        let pb = self.multi.add(ProgressBar::new(total as u64));
        pb.set_style(Self::fanout_style());
        pb.set_prefix("Querying");
        pb.set_message("Starting...");
        if let Ok(mut slot) = self.fanout_bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_backend_complete(&self, label: &str, success: bool) {
        if let Ok(slot) = self.fanout_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), label)
            } else {
                format!("{} {}", "x".red(), label)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_fanout_complete(&self) {
        if let Ok(mut slot) = self.fanout_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(format!("{}", "done".green()));
        }
    }

    fn on_stage_start(&self, stage: &DebateStage, model: &str) {
        self.start_spinner(stage.label(), model.to_string());
    }

    fn on_stage_complete(&self, _stage: &DebateStage, success: bool) {
        self.finish_spinner(success);
    }

    fn on_judge_start(&self, model: &str) {
        self.start_spinner("Judge".to_string(), model.to_string());
    }

    fn on_judge_complete(&self, success: bool) {
        self.finish_spinner(success);
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_fanout_start(&self, total: usize) {
        eprintln!("{} {} ({} backends)", "->".cyan(), "Querying".bold(), total);
    }

    fn on_backend_complete(&self, label: &str, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), label);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), label);
        }
    }

    fn on_fanout_complete(&self) {
        eprintln!();
    }

    fn on_stage_start(&self, stage: &DebateStage, model: &str) {
        eprintln!("{} {} ({})", "->".cyan(), stage.label().bold(), model);
    }

    fn on_stage_complete(&self, _stage: &DebateStage, success: bool) {
        if !success {
            eprintln!("  {} stage failed", "x".red());
        }
    }

    fn on_judge_start(&self, model: &str) {
        eprintln!("{} {} ({})", "->".cyan(), "Judge".bold(), model);
    }
}
