use std::sync::Mutex;

/// Receives coarse progress notifications, as a percentage in `[0, 100]`.
///
/// The values received during a run never decrease, and the last value of a
/// successful run is 100.
pub trait ProgressReporter: Sync {
    fn report(&self, percent: f64);
}

/// Ignores all the notifications.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _percent: f64) {}
}

/// Keeps all the notifications in memory.
#[derive(Default)]
pub struct RecordingProgress {
    values: Mutex<Vec<f64>>,
}

impl RecordingProgress {
    pub fn new() -> RecordingProgress {
        RecordingProgress::default()
    }

    pub fn values(&self) -> Vec<f64> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, percent: f64) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(percent);
    }
}

pub(crate) const STRUCTURED_PROJECTED: f64 = 30.0;
pub(crate) const STRUCTURED_SERIALIZED: f64 = 40.0;
pub(crate) const STRUCTURED_WRITTEN: f64 = 50.0;
pub(crate) const QUALITATIVE_START: f64 = 70.0;
pub(crate) const DONE: f64 = 100.0;

/// Forwards checkpoints to a reporter, dropping any value that would go backwards.
pub(crate) struct ProgressTracker<'a> {
    reporter: &'a dyn ProgressReporter,
    // (last reported value, completed respondents)
    state: Mutex<(f64, usize)>,
    num_respondents: usize,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(reporter: &'a dyn ProgressReporter, num_respondents: usize) -> Self {
        ProgressTracker {
            reporter,
            state: Mutex::new((0.0, 0)),
            num_respondents,
        }
    }

    pub(crate) fn checkpoint(&self, percent: f64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Self::advance(self.reporter, &mut state.0, percent);
    }

    /// Called by the workers. The count and the notification are updated under the same
    /// lock, so that concurrent completions are reported in order.
    pub(crate) fn respondent_done(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.1 += 1;
        let span = DONE - QUALITATIVE_START;
        let percent = QUALITATIVE_START + span * (state.1 as f64) / (self.num_respondents.max(1) as f64);
        Self::advance(self.reporter, &mut state.0, percent);
    }

    fn advance(reporter: &dyn ProgressReporter, last: &mut f64, percent: f64) {
        let p = percent.clamp(0.0, DONE);
        if p >= *last {
            *last = p;
            reporter.report(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_goes_backwards() {
        let rec = RecordingProgress::new();
        let tracker = ProgressTracker::new(&rec, 2);
        tracker.checkpoint(STRUCTURED_WRITTEN);
        tracker.checkpoint(STRUCTURED_PROJECTED);
        tracker.checkpoint(QUALITATIVE_START);
        tracker.respondent_done();
        tracker.respondent_done();
        tracker.checkpoint(DONE);
        assert_eq!(rec.values(), vec![50.0, 70.0, 85.0, 100.0, 100.0]);
    }

    #[test]
    fn clamps_to_range() {
        let rec = RecordingProgress::new();
        let tracker = ProgressTracker::new(&rec, 1);
        tracker.checkpoint(250.0);
        assert_eq!(rec.values(), vec![100.0]);
    }
}
