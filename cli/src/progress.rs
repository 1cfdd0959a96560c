use cryptool_core::stream::ProgressObserver;
use cryptool_core::types::StreamError;
use indicatif::{ProgressBar, ProgressStyle};

/// Byte progress bar on stderr.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(operation: &str) -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} {operation} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}})"
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }
}

impl ProgressObserver for BarProgress {
    fn on_start(&self, total: Option<u64>) {
        match total {
            Some(n) => self.bar.set_length(n),
            None => self.bar.set_style(ProgressStyle::default_spinner()),
        }
    }

    fn on_bytes(&self, n: u64) {
        self.bar.inc(n);
    }

    fn on_done(&self) {
        self.bar.finish();
    }

    fn on_failed(&self, _err: &StreamError) {
        self.bar.abandon();
    }
}
