use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::time::{Duration, Instant};

/// Processing times kept for the rolling average.
pub const PROCESSING_WINDOW: usize = 30;
/// Frames between current-FPS refreshes.
pub const FPS_REFRESH_FRAMES: usize = 60;
/// Frame rate that counts as 100% efficiency.
pub const TARGET_FPS: f64 = 30.0;

/// Assessment of the session's throughput against [`TARGET_FPS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PerformanceGrade {
    Excellent,
    VeryGood,
    Good,
    NeedsOptimization,
}

impl PerformanceGrade {
    pub fn from_efficiency(efficiency_pct: f64) -> Self {
        if efficiency_pct > 90.0 {
            Self::Excellent
        } else if efficiency_pct > 75.0 {
            Self::VeryGood
        } else if efficiency_pct > 60.0 {
            Self::Good
        } else {
            Self::NeedsOptimization
        }
    }
}

impl fmt::Display for PerformanceGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excellent => write!(f, "excellent"),
            Self::VeryGood => write!(f, "very good"),
            Self::Good => write!(f, "good"),
            Self::NeedsOptimization => write!(f, "needs optimization"),
        }
    }
}

/// Snapshot produced by [`SessionMetrics::summary`].
#[derive(Clone, Debug, PartialEq)]
pub struct MetricsSummary {
    pub runtime: Duration,
    pub total_frames: usize,
    pub unique_classes: usize,
    /// Windowed FPS, or overall FPS when no window has completed yet.
    pub current_fps: f64,
    pub avg_processing_ms: f64,
    /// 0 until the first FPS window completes.
    pub efficiency_pct: f64,
    pub grade: PerformanceGrade,
}

impl MetricsSummary {
    pub fn runtime_minutes(&self) -> f64 {
        self.runtime.as_secs_f64() / 60.0
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Runtime: {:.2} minutes", self.runtime_minutes()),
            format!("Frames processed: {}", self.total_frames),
            format!("FPS: {:.2}", self.current_fps),
            format!("Average processing: {:.1} ms", self.avg_processing_ms),
            format!("Efficiency: {:.1}% ({})", self.efficiency_pct, self.grade),
            format!("Unique classes: {}", self.unique_classes),
        ]
    }
}

/// Lightweight per-session performance accounting.
pub struct SessionMetrics {
    started: Instant,
    total_frames: usize,
    classes: BTreeSet<String>,
    processing_times: VecDeque<Duration>,
    window_started: Instant,
    current_fps: f64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(started: Instant) -> Self {
        Self {
            started,
            total_frames: 0,
            classes: BTreeSet::new(),
            processing_times: VecDeque::with_capacity(PROCESSING_WINDOW),
            window_started: started,
            current_fps: 0.0,
        }
    }

    pub fn record_frame(&mut self, processing_time: Duration) {
        self.record_frame_at(processing_time, Instant::now());
    }

    pub fn record_frame_at(&mut self, processing_time: Duration, now: Instant) {
        self.total_frames += 1;

        if self.total_frames % FPS_REFRESH_FRAMES == 0 {
            let elapsed = now.saturating_duration_since(self.window_started);
            if !elapsed.is_zero() {
                self.current_fps = FPS_REFRESH_FRAMES as f64 / elapsed.as_secs_f64();
                self.window_started = now;
            }
        }

        if self.processing_times.len() == PROCESSING_WINDOW {
            self.processing_times.pop_front();
        }
        self.processing_times.push_back(processing_time);
    }

    pub fn record_detection(&mut self, class_name: &str) {
        if !self.classes.contains(class_name) {
            self.classes.insert(class_name.to_string());
        }
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn summary(&self) -> MetricsSummary {
        self.summary_at(Instant::now())
    }

    pub fn summary_at(&self, now: Instant) -> MetricsSummary {
        let runtime = now.saturating_duration_since(self.started);
        let avg_processing_ms = if self.processing_times.is_empty() {
            0.0
        } else {
            let total: Duration = self.processing_times.iter().sum();
            total.as_secs_f64() * 1000.0 / self.processing_times.len() as f64
        };
        let overall_fps = if runtime.is_zero() {
            0.0
        } else {
            self.total_frames as f64 / runtime.as_secs_f64()
        };
        let efficiency_pct = if self.current_fps > 0.0 {
            (self.current_fps / TARGET_FPS * 100.0).min(100.0)
        } else {
            0.0
        };

        MetricsSummary {
            runtime,
            total_frames: self.total_frames,
            unique_classes: self.classes.len(),
            current_fps: if self.current_fps > 0.0 {
                self.current_fps
            } else {
                overall_fps
            },
            avg_processing_ms,
            efficiency_pct,
            grade: PerformanceGrade::from_efficiency(efficiency_pct),
        }
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[rstest]
    #[case::top(100.0, PerformanceGrade::Excellent)]
    #[case::just_above_90(90.5, PerformanceGrade::Excellent)]
    #[case::exactly_90(90.0, PerformanceGrade::VeryGood)]
    #[case::exactly_75(75.0, PerformanceGrade::Good)]
    #[case::exactly_60(60.0, PerformanceGrade::NeedsOptimization)]
    #[case::zero(0.0, PerformanceGrade::NeedsOptimization)]
    fn test_grade_thresholds(#[case] efficiency: f64, #[case] expected: PerformanceGrade) {
        assert_eq!(PerformanceGrade::from_efficiency(efficiency), expected);
    }

    #[test]
    fn test_fps_refreshes_every_window() {
        let t0 = Instant::now();
        let mut metrics = SessionMetrics::started_at(t0);
        for i in 1..=60u64 {
            metrics.record_frame_at(ms(5), t0 + ms(i * 50));
        }
        // 60 frames in 3 s
        let summary = metrics.summary_at(t0 + Duration::from_secs(3));
        assert_relative_eq!(summary.current_fps, 20.0, epsilon = 1e-9);
        assert_relative_eq!(summary.efficiency_pct, 20.0 / 30.0 * 100.0, epsilon = 1e-9);
        assert_eq!(summary.grade, PerformanceGrade::Good);
    }

    #[test]
    fn test_efficiency_is_capped() {
        let t0 = Instant::now();
        let mut metrics = SessionMetrics::started_at(t0);
        for i in 1..=60u64 {
            metrics.record_frame_at(ms(1), t0 + ms(i * 10));
        }
        let summary = metrics.summary_at(t0 + ms(600));
        assert_relative_eq!(summary.current_fps, 100.0, epsilon = 1e-9);
        assert_relative_eq!(summary.efficiency_pct, 100.0);
        assert_eq!(summary.grade, PerformanceGrade::Excellent);
    }

    #[test]
    fn test_overall_fps_before_first_window() {
        let t0 = Instant::now();
        let mut metrics = SessionMetrics::started_at(t0);
        for i in 1..=10u64 {
            metrics.record_frame_at(ms(4), t0 + ms(i * 100));
        }
        let summary = metrics.summary_at(t0 + Duration::from_secs(2));
        assert_relative_eq!(summary.current_fps, 5.0, epsilon = 1e-9);
        assert_relative_eq!(summary.efficiency_pct, 0.0);
        assert_eq!(summary.grade, PerformanceGrade::NeedsOptimization);
    }

    #[test]
    fn test_processing_average_uses_recent_window() {
        let t0 = Instant::now();
        let mut metrics = SessionMetrics::started_at(t0);
        for _ in 0..10 {
            metrics.record_frame_at(ms(100), t0);
        }
        for _ in 0..PROCESSING_WINDOW {
            metrics.record_frame_at(ms(10), t0);
        }
        let summary = metrics.summary_at(t0 + Duration::from_secs(1));
        assert_eq!(summary.total_frames, 40);
        assert_relative_eq!(summary.avg_processing_ms, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unique_classes() {
        let mut metrics = SessionMetrics::new();
        metrics.record_detection("sponge");
        metrics.record_detection("coral");
        metrics.record_detection("sponge");
        assert_eq!(metrics.summary().unique_classes, 2);
        assert_eq!(metrics.classes().collect::<Vec<_>>(), vec!["coral", "sponge"]);
    }

    #[test]
    fn test_empty_summary() {
        let t0 = Instant::now();
        let metrics = SessionMetrics::started_at(t0);
        let summary = metrics.summary_at(t0);
        assert_eq!(summary.total_frames, 0);
        assert_relative_eq!(summary.current_fps, 0.0);
        assert_relative_eq!(summary.avg_processing_ms, 0.0);
    }

    #[test]
    fn test_summary_lines() {
        let summary = MetricsSummary {
            runtime: Duration::from_secs(90),
            total_frames: 1200,
            unique_classes: 3,
            current_fps: 28.5,
            avg_processing_ms: 12.25,
            efficiency_pct: 95.0,
            grade: PerformanceGrade::Excellent,
        };
        let lines = summary.lines();
        assert_eq!(lines[0], "Runtime: 1.50 minutes");
        assert!(lines.contains(&"Efficiency: 95.0% (excellent)".to_string()));
        assert!(lines.contains(&"Unique classes: 3".to_string()));
    }
}
