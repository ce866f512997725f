//! Elapsed-session time, computed on demand.
//!
//! There is no background tick: the stopwatch stores a monotonic start
//! instant plus the accumulated pause duration and computes elapsed time
//! lazily whenever it is read.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct Stopwatch {
    start: Option<Instant>,
    paused_at: Option<Instant>,
    pause_total: Duration,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.start.is_some() && self.paused_at.is_none()
    }

    /// Starts the stopwatch, or continues it after a pause.
    pub fn resume(&mut self) {
        let now = Instant::now();
        match self.start {
            None => self.start = Some(now),
            Some(_) => {
                if let Some(paused_at) = self.paused_at.take() {
                    self.pause_total += now - paused_at;
                }
            }
        }
    }

    pub fn pause(&mut self) {
        if self.is_running() {
            self.paused_at = Some(Instant::now());
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Time spent running, excluding pauses.
    pub fn elapsed(&self) -> Duration {
        match (self.start, self.paused_at) {
            (None, _) => Duration::ZERO,
            (Some(start), Some(paused_at)) => paused_at - start - self.pause_total,
            (Some(start), None) => start.elapsed() - self.pause_total,
        }
    }

    pub fn time_display(&self) -> String {
        format_mm_ss(self.elapsed())
    }
}

/// Formats a duration as `MM:SS`; minutes keep counting past the hour.
pub fn format_mm_ss(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_unstarted_reads_zero() {
        let stopwatch = Stopwatch::new();
        assert!(!stopwatch.is_running());
        assert_eq!(stopwatch.elapsed(), Duration::ZERO);
        assert_eq!(stopwatch.time_display(), "00:00");
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let mut stopwatch = Stopwatch::new();
        stopwatch.resume();
        sleep(Duration::from_millis(20));
        stopwatch.pause();

        let frozen = stopwatch.elapsed();
        assert!(frozen >= Duration::from_millis(20));
        sleep(Duration::from_millis(20));
        assert_eq!(stopwatch.elapsed(), frozen);
    }

    #[test]
    fn test_resume_excludes_pause_time() {
        let mut stopwatch = Stopwatch::new();
        stopwatch.resume();
        sleep(Duration::from_millis(10));
        stopwatch.pause();
        sleep(Duration::from_millis(50));
        stopwatch.resume();
        sleep(Duration::from_millis(10));

        let elapsed = stopwatch.elapsed();
        assert!(elapsed >= Duration::from_millis(20));
        assert!(elapsed < Duration::from_millis(50));
    }

    #[test]
    fn test_reset() {
        let mut stopwatch = Stopwatch::new();
        stopwatch.resume();
        sleep(Duration::from_millis(10));
        stopwatch.reset();
        assert_eq!(stopwatch.elapsed(), Duration::ZERO);
        assert!(!stopwatch.is_running());
    }

    #[test]
    fn test_format() {
        assert_eq!(format_mm_ss(Duration::from_secs(0)), "00:00");
        assert_eq!(format_mm_ss(Duration::from_secs(59)), "00:59");
        assert_eq!(format_mm_ss(Duration::from_secs(60)), "01:00");
        assert_eq!(format_mm_ss(Duration::from_secs(3600 + 90)), "61:30");
    }
}
