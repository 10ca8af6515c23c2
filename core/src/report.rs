//! Progress and result reporting.
//!
//! Evaluation pipelines receive a [Reporter] instead of printing directly, so the same pipeline can log, stay
//! silent in tests, or feed another front end.

use log::{debug, info};

use crate::statistics::ErrorStatistics;

/// Receives progress messages and results of an evaluation run
pub trait Reporter {
    /// A free-form progress message
    fn progress(&self, message: &str);
    /// Statistics of a single segment
    fn segment(&self, label: &str, statistics: &ErrorStatistics);
    /// Statistics of the pooled segments
    fn combined(&self, label: &str, statistics: &ErrorStatistics);
}

/// Reports through the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn progress(&self, message: &str) {
        info!("{}", message);
    }
    fn segment(&self, label: &str, statistics: &ErrorStatistics) {
        info!("{} mean: {:.6}", label, statistics.mean);
        debug!("{}: {}", label, statistics);
    }
    fn combined(&self, label: &str, statistics: &ErrorStatistics) {
        info!("APE statistics for {}: {}", label, statistics);
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn progress(&self, _message: &str) {}
    fn segment(&self, _label: &str, _statistics: &ErrorStatistics) {}
    fn combined(&self, _label: &str, _statistics: &ErrorStatistics) {}
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn progress(&self, message: &str) {
        (**self).progress(message)
    }
    fn segment(&self, label: &str, statistics: &ErrorStatistics) {
        (**self).segment(label, statistics)
    }
    fn combined(&self, label: &str, statistics: &ErrorStatistics) {
        (**self).combined(label, statistics)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every call, for asserting on what a pipeline reported.
    #[derive(Default)]
    pub(crate) struct RecordingReporter {
        pub messages: RefCell<Vec<String>>,
    }

    impl Reporter for RecordingReporter {
        fn progress(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
        fn segment(&self, label: &str, statistics: &ErrorStatistics) {
            self.messages
                .borrow_mut()
                .push(format!("segment {} {}", label, statistics.mean));
        }
        fn combined(&self, label: &str, statistics: &ErrorStatistics) {
            self.messages
                .borrow_mut()
                .push(format!("combined {} {}", label, statistics.rmse));
        }
    }

    #[test]
    fn test_recording_through_reference() {
        let recorder = RecordingReporter::default();
        let stats = ErrorStatistics::from_errors(&[1.0, 3.0]).unwrap();
        fn run<R: Reporter>(reporter: R, stats: &ErrorStatistics) {
            reporter.progress("loading");
            reporter.segment("A", stats);
        }
        run(&recorder, &stats);
        let messages = recorder.messages.borrow();
        assert_eq!(messages.as_slice(), ["loading", "segment A 2"]);
    }

    #[test]
    fn test_log_and_silent_reporters_do_not_panic() {
        let stats = ErrorStatistics::from_errors(&[0.5]).unwrap();
        for reporter in [&LogReporter as &dyn Reporter, &SilentReporter] {
            reporter.progress("calculating APE");
            reporter.segment("A", &stats);
            reporter.combined("AB", &stats);
        }
    }
}
