//! Frame timing utilities

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Frame time statistics over the retained history
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FrameStats {
    /// Frames drawn since the clock was created
    pub frame_count: u64,
    /// Frames that exceeded the frame budget
    pub slow_frames: u64,
    /// Frames that were skipped by the rate limiter
    pub throttled_frames: u64,
    /// Average draw time in milliseconds
    pub avg_ms: f32,
    /// Worst draw time in milliseconds
    pub max_ms: f32,
}

/// Rate limiter and draw-time tracker for the render loop
pub struct FrameClock {
    min_interval: Duration,
    budget: Duration,
    last_frame: Option<Instant>,
    frame_count: u64,
    slow_frames: u64,
    throttled_frames: u64,
    /// Ring buffer of recent draw durations
    history: VecDeque<Duration>,
    capacity: usize,
}

impl FrameClock {
    /// Create a new frame clock
    ///
    /// # Arguments
    /// * `min_interval` - Minimum time between two drawn frames
    /// * `budget` - Draw time above which a frame counts as slow
    pub fn new(min_interval: Duration, budget: Duration) -> Self {
        Self {
            min_interval,
            budget,
            last_frame: None,
            frame_count: 0,
            slow_frames: 0,
            throttled_frames: 0,
            history: VecDeque::with_capacity(120),
            capacity: 120,
        }
    }

    /// Returns true and stamps the frame start if enough time has passed since the last frame.
    pub fn try_begin(&mut self) -> bool {
        self.try_begin_at(Instant::now())
    }

    fn try_begin_at(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_frame {
            if now.duration_since(last) < self.min_interval {
                self.throttled_frames += 1;
                return false;
            }
        }
        self.last_frame = Some(now);
        true
    }

    /// Record how long a drawn frame took. Returns true if it blew the budget.
    pub fn record(&mut self, draw_time: Duration) -> bool {
        self.frame_count += 1;
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(draw_time);

        let slow = draw_time > self.budget;
        if slow {
            self.slow_frames += 1;
        }
        slow
    }

    /// Frame budget
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Get rolling statistics
    pub fn stats(&self) -> FrameStats {
        let count = self.history.len();
        let total: Duration = self.history.iter().sum();
        let avg_ms = if count == 0 {
            0.0
        } else {
            total.as_secs_f32() * 1000.0 / count as f32
        };
        let max_ms = self
            .history
            .iter()
            .max()
            .map(|d| d.as_secs_f32() * 1000.0)
            .unwrap_or(0.0);

        FrameStats {
            frame_count: self.frame_count,
            slow_frames: self.slow_frames,
            throttled_frames: self.throttled_frames,
            avg_ms,
            max_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_always_allowed() {
        let mut clock = FrameClock::new(Duration::from_millis(16), Duration::from_millis(16));
        assert!(clock.try_begin());
    }

    #[test]
    fn test_rate_limit() {
        let mut clock = FrameClock::new(Duration::from_millis(16), Duration::from_millis(16));
        let start = Instant::now();

        assert!(clock.try_begin_at(start));
        assert!(!clock.try_begin_at(start + Duration::from_millis(5)));
        assert!(clock.try_begin_at(start + Duration::from_millis(17)));
        assert_eq!(clock.stats().throttled_frames, 1);
    }

    #[test]
    fn test_zero_interval_never_throttles() {
        let mut clock = FrameClock::new(Duration::ZERO, Duration::from_millis(16));
        for _ in 0..10 {
            assert!(clock.try_begin());
        }
    }

    #[test]
    fn test_slow_frames_counted() {
        let mut clock = FrameClock::new(Duration::ZERO, Duration::from_millis(16));
        assert!(!clock.record(Duration::from_millis(10)));
        assert!(clock.record(Duration::from_millis(30)));

        let stats = clock.stats();
        assert_eq!(stats.frame_count, 2);
        assert_eq!(stats.slow_frames, 1);
        assert!((stats.avg_ms - 20.0).abs() < 0.01);
        assert!((stats.max_ms - 30.0).abs() < 0.01);
    }

    #[test]
    fn test_history_wraps() {
        let mut clock = FrameClock::new(Duration::ZERO, Duration::from_secs(1));
        for _ in 0..200 {
            clock.record(Duration::from_millis(1));
        }
        let stats = clock.stats();
        assert_eq!(stats.frame_count, 200);
        assert!((stats.avg_ms - 1.0).abs() < 0.01);
    }
}
