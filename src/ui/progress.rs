use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn visible() -> bool {
    console::Term::stdout().is_term() && !crate::output::is_quiet()
}

/// Bar tracking rows written during a seed
pub struct SeedProgress {
    pb: ProgressBar,
}

impl SeedProgress {
    pub fn new() -> Self {
        let pb = if visible() {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} codes {msg}") {
            pb.set_style(style);
        }
        Self { pb }
    }

    pub fn update(&self, written: usize, total: usize) {
        self.pb.set_length(total as u64);
        self.pb.set_position(written as u64);
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Default for SeedProgress {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        if visible() {
            pb.enable_steady_tick(Duration::from_millis(100));
        } else {
            pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        }
        Self { pb }
    }

    pub fn set_message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}
