//! "Work in progress" display around long-running stages.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub trait ProgressIndicator {
    fn begin(&self, message: &str);
    fn end(&self);
}

/// Keeps an indicator running for as long as the guard lives.
///
/// `end` runs on drop, so the indicator is cleared whether the guarded work
/// returns normally, returns an error or unwinds.
#[must_use = "the indicator ends as soon as the guard is dropped"]
pub struct InProgress<'a> {
    indicator: &'a dyn ProgressIndicator,
}

impl<'a> InProgress<'a> {
    pub fn start(indicator: &'a dyn ProgressIndicator, message: &str) -> Self {
        indicator.begin(message);
        Self { indicator }
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.indicator.end();
    }
}

/// Terminal spinner on stderr.
pub struct SpinnerIndicator {
    bar: ProgressBar,
}

impl SpinnerIndicator {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { bar }
    }
}

impl Default for SpinnerIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressIndicator for SpinnerIndicator {
    fn begin(&self, message: &str) {
        self.bar.reset_elapsed();
        self.bar.set_message(message.to_string());
        self.bar.enable_steady_tick(Duration::from_millis(120));
    }

    fn end(&self) {
        self.bar.finish_and_clear();
    }
}

/// Shows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentIndicator;

impl ProgressIndicator for SilentIndicator {
    fn begin(&self, _message: &str) {}
    fn end(&self) {}
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        panic::{AssertUnwindSafe, catch_unwind},
    };

    use super::*;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<String>>);

    impl ProgressIndicator for Recorder {
        fn begin(&self, message: &str) {
            self.0.borrow_mut().push(format!("begin:{message}"));
        }
        fn end(&self) {
            self.0.borrow_mut().push("end".into());
        }
    }

    fn guarded(recorder: &Recorder, fail: bool) -> Result<(), String> {
        let _guard = InProgress::start(recorder, "training");
        if fail {
            return Err("boom".into());
        }
        Ok(())
    }

    #[test]
    fn ends_on_success_and_error() {
        let recorder = Recorder::default();
        assert!(guarded(&recorder, false).is_ok());
        assert!(guarded(&recorder, true).is_err());
        assert_eq!(
            *recorder.0.borrow(),
            vec!["begin:training", "end", "begin:training", "end"]
        );
    }

    #[test]
    fn ends_on_panic() {
        let recorder = Recorder::default();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _guard = InProgress::start(&recorder, "training");
            panic!("model blew up");
        }));
        assert!(result.is_err());
        assert_eq!(recorder.0.borrow().last().map(String::as_str), Some("end"));
    }

    #[test]
    fn spinner_clears() {
        let spinner = SpinnerIndicator {
            bar: ProgressBar::hidden(),
        };
        {
            let _guard = InProgress::start(&spinner, "working");
        }
        assert!(spinner.bar.is_finished());
    }
}
