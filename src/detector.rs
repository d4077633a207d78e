//! Generation-Completion Detector
//!
//! The chat page emits no completion event, only a visible "Generating
//! answer..." cue. This module polls that cue as a small state machine:
//!
//! ```text
//! idle ──indicator seen──────────▶ generating ──gone twice──▶ complete
//!   │                                   │
//!   └──not seen within grace──▶ complete └──budget spent──▶ timed_out
//!   └──page stalled past budget──▶ timed_out
//! ```
//!
//! All waiting is `tokio::time::sleep`, so sibling invocations keep running.

use std::time::Duration;

use serde::Serialize;
use tokio::time::{Instant, sleep, timeout};
use tracing::debug;

use crate::driver::GenerationProbe;
use crate::utils::AskError;
use crate::utils::constants::{DEFAULT_DEBOUNCE_MS, DEFAULT_GRACE_WINDOW_MS, DEFAULT_POLL_INTERVAL_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    Idle,
    Generating,
    Complete,
    TimedOut,
}

impl GenerationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, GenerationState::Complete | GenerationState::TimedOut)
    }
}

/// Tunables for the polling loop.
#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
    /// How long to wait for the indicator to appear at all
    pub grace_window: Duration,
    /// Delay between indicator checks; sub-second
    pub poll_interval: Duration,
    /// Delay before re-checking an indicator that just vanished
    pub debounce: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            grace_window: Duration::from_millis(DEFAULT_GRACE_WINDOW_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

pub struct CompletionDetector {
    config: DetectorConfig,
    state: GenerationState,
}

impl CompletionDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            state: GenerationState::Idle,
        }
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    fn transition(&mut self, next: GenerationState) {
        debug_assert!(
            !self.state.is_terminal(),
            "transition out of terminal state {:?}",
            self.state
        );
        debug!("Generation state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Sleep one poll interval, never past `limit`.
    async fn pause_until(&self, limit: Instant) {
        let remaining = limit.saturating_duration_since(Instant::now());
        sleep(self.config.poll_interval.min(remaining)).await;
    }

    /// One indicator reading, bounded by `deadline`. `None` when the page did
    /// not answer before the budget ran out.
    async fn check<P>(&self, probe: &mut P, deadline: Instant) -> Result<Option<bool>, AskError>
    where
        P: GenerationProbe + ?Sized,
    {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, probe.generating()).await {
            Ok(reading) => reading.map(Some),
            Err(_) => {
                debug!("Indicator check still pending at the deadline");
                Ok(None)
            }
        }
    }

    /// Drive `probe` until the answer is final or `budget` is spent.
    ///
    /// Returns the terminal state, `Complete` or `TimedOut`. Probe failures
    /// are propagated unchanged. The grace window never exceeds half the
    /// budget, so a page without an indicator always finishes early.
    pub async fn run<P>(&mut self, probe: &mut P, budget: Duration) -> Result<GenerationState, AskError>
    where
        P: GenerationProbe + ?Sized,
    {
        let started = Instant::now();
        let deadline = started + budget;
        let grace_deadline = started + self.config.grace_window.min(budget / 2);

        while self.state == GenerationState::Idle {
            match self.check(probe, deadline).await? {
                None => self.transition(GenerationState::TimedOut),
                Some(true) => self.transition(GenerationState::Generating),
                Some(false) if Instant::now() >= grace_deadline => {
                    debug!(
                        "Indicator never appeared within {}ms; treating answer as complete",
                        grace_deadline.duration_since(started).as_millis()
                    );
                    self.transition(GenerationState::Complete);
                }
                Some(false) => self.pause_until(grace_deadline).await,
            }
        }

        while self.state == GenerationState::Generating {
            let now = Instant::now();
            if now >= deadline {
                self.transition(GenerationState::TimedOut);
                break;
            }

            match self.check(probe, deadline).await? {
                None => {
                    self.transition(GenerationState::TimedOut);
                    break;
                }
                Some(true) => {
                    self.pause_until(deadline).await;
                    continue;
                }
                Some(false) => {}
            }

            // Debounce: a layout flicker can hide the indicator for one frame.
            sleep(self.config.debounce.min(deadline.saturating_duration_since(Instant::now()))).await;
            match self.check(probe, deadline).await? {
                None => self.transition(GenerationState::TimedOut),
                Some(false) => self.transition(GenerationState::Complete),
                Some(true) => {}
            }
        }

        debug!(
            "Detector finished in {}ms with {:?}",
            started.elapsed().as_millis(),
            self.state
        );
        Ok(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Indicator visible during `[appear_after, appear_after + visible_for)`.
    struct Scripted {
        start: Instant,
        appear_after: Option<Duration>,
        visible_for: Option<Duration>,
        checks: usize,
    }

    impl Scripted {
        fn new(appear_after: Option<Duration>, visible_for: Option<Duration>) -> Self {
            Self {
                start: Instant::now(),
                appear_after,
                visible_for,
                checks: 0,
            }
        }
    }

    #[async_trait]
    impl GenerationProbe for Scripted {
        async fn generating(&mut self) -> Result<bool, AskError> {
            self.checks += 1;
            let elapsed = self.start.elapsed();
            let Some(appear) = self.appear_after else {
                return Ok(false);
            };
            if elapsed < appear {
                return Ok(false);
            }
            Ok(match self.visible_for {
                Some(len) => elapsed < appear + len,
                None => true,
            })
        }
    }

    /// Visible, then one hidden reading, then visible again until `until`.
    struct Flicker {
        start: Instant,
        flickered: bool,
        until: Duration,
    }

    #[async_trait]
    impl GenerationProbe for Flicker {
        async fn generating(&mut self) -> Result<bool, AskError> {
            if self.start.elapsed() >= Duration::from_secs(1) && !self.flickered {
                self.flickered = true;
                return Ok(false);
            }
            Ok(self.start.elapsed() < self.until)
        }
    }

    fn config() -> DetectorConfig {
        DetectorConfig {
            grace_window: Duration::from_secs(2),
            poll_interval: Duration::from_millis(500),
            debounce: Duration::from_millis(750),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn missing_indicator_completes_after_grace_window() {
        let mut detector = CompletionDetector::new(config());
        let mut probe = Scripted::new(None, None);
        let started = Instant::now();

        let state = detector.run(&mut probe, Duration::from_secs(60)).await.unwrap();

        assert_eq!(state, GenerationState::Complete);
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn indicator_disappearing_completes_early() {
        let mut detector = CompletionDetector::new(config());
        let mut probe = Scripted::new(Some(Duration::ZERO), Some(Duration::from_secs(3)));
        let started = Instant::now();

        let state = detector.run(&mut probe, Duration::from_secs(60)).await.unwrap();

        assert_eq!(state, GenerationState::Complete);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_secs(5), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn late_indicator_within_grace_is_tracked() {
        let mut detector = CompletionDetector::new(config());
        let mut probe = Scripted::new(Some(Duration::from_secs(1)), Some(Duration::from_secs(4)));
        let started = Instant::now();

        let state = detector.run(&mut probe, Duration::from_secs(60)).await.unwrap();

        assert_eq!(state, GenerationState::Complete);
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_indicator_times_out_at_budget() {
        let mut detector = CompletionDetector::new(config());
        let mut probe = Scripted::new(Some(Duration::ZERO), None);
        let started = Instant::now();

        let state = detector.run(&mut probe, Duration::from_secs(10)).await.unwrap();

        assert_eq!(state, GenerationState::TimedOut);
        assert_eq!(detector.state(), GenerationState::TimedOut);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_millis(10_600), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn single_hidden_reading_is_debounced() {
        let mut detector = CompletionDetector::new(config());
        let mut probe = Flicker {
            start: Instant::now(),
            flickered: false,
            until: Duration::from_secs(6),
        };
        let started = Instant::now();

        let state = detector.run(&mut probe, Duration::from_secs(60)).await.unwrap();

        assert_eq!(state, GenerationState::Complete);
        assert!(probe.flickered);
        assert!(started.elapsed() >= Duration::from_secs(6));
    }

    /// Every reading stalls for `delay` before reporting the indicator.
    struct Stalled {
        delay: Duration,
    }

    #[async_trait]
    impl GenerationProbe for Stalled {
        async fn generating(&mut self) -> Result<bool, AskError> {
            sleep(self.delay).await;
            Ok(true)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_page_times_out_at_budget() {
        let mut detector = CompletionDetector::new(config());
        let mut probe = Stalled {
            delay: Duration::from_secs(30),
        };
        let started = Instant::now();

        let state = detector.run(&mut probe, Duration::from_secs(10)).await.unwrap();

        assert_eq!(state, GenerationState::TimedOut);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_millis(10_100), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn grace_window_is_capped_by_budget() {
        let mut detector = CompletionDetector::new(DetectorConfig {
            grace_window: Duration::from_secs(30),
            ..config()
        });
        let mut probe = Scripted::new(None, None);
        let started = Instant::now();

        let state = detector.run(&mut probe, Duration::from_secs(10)).await.unwrap();

        assert_eq!(state, GenerationState::Complete);
        assert!(started.elapsed() <= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn checks_are_paced_by_poll_interval() {
        let mut detector = CompletionDetector::new(config());
        let mut probe = Scripted::new(Some(Duration::ZERO), None);

        detector.run(&mut probe, Duration::from_secs(10)).await.unwrap();

        // ~2 checks per second over a 10s budget, not a busy loop
        assert!(probe.checks <= 25, "checks {}", probe.checks);
    }
}
