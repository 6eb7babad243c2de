use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc, Arc,
    },
    thread,
    time::Duration,
};

use crate::error::FilterError;

/// Default polling period of a [`ProgressMonitor`].
pub const DEFAULT_MONITOR_PERIOD: Duration = Duration::from_millis(250);

/// Shared, lock-free progress counter of a filter invocation.
///
/// The counter reserves one extra unit that is only completed by [`FilterProgress::finish`],
/// so [`FilterProgress::fraction`] stays below 1.0 until the invocation is done.
#[derive(Debug, Default)]
pub struct FilterProgress {
    done: AtomicUsize,
    total: AtomicUsize,
}

impl FilterProgress {
    /// Create a new idle progress counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting towards `units` work units.
    pub fn reset(&self, units: usize) {
        self.done.store(0, Ordering::Relaxed);
        self.total.store(units + 1, Ordering::Relaxed);
    }

    /// Record `units` finished work units.
    pub fn advance(&self, units: usize) {
        self.done.fetch_add(units, Ordering::Relaxed);
    }

    /// Mark the invocation as done.
    pub fn finish(&self) {
        let total = self.total.load(Ordering::Relaxed);
        self.done.store(total, Ordering::Relaxed);
    }

    /// The completed fraction in `[0, 1]`, 1.0 only once finished.
    pub fn fraction(&self) -> f64 {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        let done = self.done.load(Ordering::Relaxed).min(total);
        done as f64 / total as f64
    }

    /// Whether [`FilterProgress::finish`] was called since the last reset.
    pub fn is_finished(&self) -> bool {
        let total = self.total.load(Ordering::Relaxed);
        total > 0 && self.done.load(Ordering::Relaxed) >= total
    }
}

/// Background thread that periodically reports the progress of a filter.
///
/// Stopping the monitor never affects the filter it observes. The monitor is stopped
/// when dropped.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use rasterfir_filter::progress::{FilterProgress, ProgressMonitor};
///
/// let progress = Arc::new(FilterProgress::new());
/// let monitor = ProgressMonitor::start(progress.clone(), |fraction| {
///     println!("{:.0}%", fraction * 100.0);
/// }).unwrap();
/// // ... run a filter sharing `progress` ...
/// monitor.terminate();
/// ```
#[derive(Debug)]
pub struct ProgressMonitor {
    stop: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ProgressMonitor {
    /// Start a monitor polling every [`DEFAULT_MONITOR_PERIOD`].
    pub fn start<F>(progress: Arc<FilterProgress>, callback: F) -> Result<Self, FilterError>
    where
        F: FnMut(f64) + Send + 'static,
    {
        Self::with_period(progress, DEFAULT_MONITOR_PERIOD, callback)
    }

    /// Start a monitor that logs the progress through [`log::info!`].
    pub fn logging(progress: Arc<FilterProgress>) -> Result<Self, FilterError> {
        Self::start(progress, |fraction| {
            log::info!("filter progress: {:.1}%", fraction * 100.0)
        })
    }

    /// Start a monitor with a custom polling period.
    ///
    /// # Arguments
    ///
    /// * `progress` - The progress counter to observe.
    /// * `period` - The time between two reports.
    /// * `callback` - Receives the completed fraction on every report.
    pub fn with_period<F>(
        progress: Arc<FilterProgress>,
        period: Duration,
        mut callback: F,
    ) -> Result<Self, FilterError>
    where
        F: FnMut(f64) + Send + 'static,
    {
        let (stop, stopped) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("rasterfir-progress".into())
            .spawn(move || loop {
                match stopped.recv_timeout(period) {
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        // 1.0 is only reached once finished
                        let fraction = progress.fraction();
                        if fraction < 1.0 {
                            callback(fraction);
                        }
                    }
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(FilterError::MonitorSpawn)?;

        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Stop the monitor and wait for its thread to exit.
    pub fn terminate(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            // the thread may already be gone
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("progress monitor callback panicked");
            }
        }
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_fraction_stays_below_one() {
        let progress = FilterProgress::new();
        assert_eq!(progress.fraction(), 0.0);

        progress.reset(4);
        progress.advance(2);
        assert_eq!(progress.fraction(), 0.4);
        progress.advance(2);
        assert!(progress.fraction() < 1.0);
        assert!(!progress.is_finished());

        progress.finish();
        assert_eq!(progress.fraction(), 1.0);
        assert!(progress.is_finished());

        progress.reset(1);
        assert_eq!(progress.fraction(), 0.0);
    }

    #[test]
    fn test_monitor_reports() -> Result<(), FilterError> {
        let progress = Arc::new(FilterProgress::new());
        progress.reset(9);
        progress.advance(3);

        let (tx, rx) = mpsc::channel();
        let monitor =
            ProgressMonitor::with_period(progress.clone(), Duration::from_millis(5), move |f| {
                let _ = tx.send(f);
            })?;

        let fraction = rx.recv_timeout(Duration::from_secs(5)).ok();
        monitor.terminate();

        assert_eq!(fraction, Some(0.3));
        Ok(())
    }

    #[test]
    fn test_monitor_skips_finished_state() -> Result<(), FilterError> {
        let progress = Arc::new(FilterProgress::new());
        progress.reset(2);
        progress.finish();

        let (tx, rx) = mpsc::channel();
        let monitor =
            ProgressMonitor::with_period(progress.clone(), Duration::from_millis(1), move |f| {
                let _ = tx.send(f);
            })?;
        thread::sleep(Duration::from_millis(20));
        monitor.terminate();

        assert_eq!(rx.try_iter().count(), 0);
        Ok(())
    }

    #[test]
    fn test_logging_monitor() -> Result<(), FilterError> {
        let progress = Arc::new(FilterProgress::new());
        let monitor = ProgressMonitor::logging(progress.clone())?;
        progress.reset(1);
        progress.finish();
        drop(monitor);
        assert!(progress.is_finished());
        Ok(())
    }

    #[test]
    fn test_monitor_terminates_without_reports() -> Result<(), FilterError> {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = reports.clone();
        let monitor = ProgressMonitor::with_period(
            Arc::new(FilterProgress::new()),
            Duration::from_secs(60),
            move |f| sink.lock().unwrap().push(f),
        )?;
        monitor.terminate();
        assert!(reports.lock().unwrap().is_empty());
        Ok(())
    }
}
