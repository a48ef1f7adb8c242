//! Aggregate progress for bulk uploads.

use std::fmt;
use std::time::{Duration, Instant};

/// Added to elapsed time so throughput never divides by zero.
const ELAPSED_EPSILON: Duration = Duration::from_millis(1);

/// Cumulative counts for one bulk upload call.
#[derive(Debug, Clone)]
pub struct UploadStatus {
    total_count: usize,
    current_count: usize,
    start: Instant,
    reported_progress: u32,
}

impl UploadStatus {
    pub fn new(total_count: usize) -> Self {
        Self::started_at(total_count, Instant::now())
    }

    fn started_at(total_count: usize, start: Instant) -> Self {
        Self {
            total_count,
            current_count: 0,
            start,
            reported_progress: 0,
        }
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn current_count(&self) -> usize {
        self.current_count
    }

    pub fn update(&mut self, count: usize) {
        self.current_count = self.current_count.saturating_add(count);
    }

    /// Floor of `current / total * 100`.
    pub fn percentage(&self) -> u32 {
        if self.total_count == 0 {
            return 0;
        }
        let percentage = self.current_count.saturating_mul(100) / self.total_count;
        u32::try_from(percentage).unwrap_or(u32::MAX)
    }

    /// Returns a report only when the percentage went up since the last call.
    pub fn progress(&mut self) -> Option<ProgressReport> {
        self.progress_at(Instant::now())
    }

    fn progress_at(&mut self, now: Instant) -> Option<ProgressReport> {
        let percentage = self.percentage();
        let report = (percentage > self.reported_progress).then(|| {
            let elapsed = now.saturating_duration_since(self.start) + ELAPSED_EPSILON;
            let speed = self.current_count as f64 / elapsed.as_secs_f64();
            let remaining = self.total_count.saturating_sub(self.current_count);
            let eta = if speed > 0.0 {
                Duration::from_secs_f64(remaining as f64 / speed)
            } else {
                Duration::ZERO
            };

            ProgressReport {
                percentage,
                current_count: self.current_count,
                total_count: self.total_count,
                elapsed,
                speed,
                eta,
            }
        });
        self.reported_progress = percentage;
        report
    }
}

/// A throughput/ETA snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub percentage: u32,
    pub current_count: usize,
    pub total_count: usize,
    pub elapsed: Duration,
    /// Files per second
    pub speed: f64,
    pub eta: Duration,
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Progress {}% - {}/{} - elapsed {} - speed: {:.2} img / s, ETA: {}",
            self.percentage,
            self.current_count,
            self.total_count,
            HumanDuration(self.elapsed),
            self.speed,
            HumanDuration(self.eta),
        )
    }
}

/// `H:MM:SS` with microseconds appended when present.
struct HumanDuration(Duration);

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        write!(f, "{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)?;
        let micros = self.0.subsec_micros();
        if micros > 0 {
            write!(f, ".{micros:06}")?;
        }
        Ok(())
    }
}
