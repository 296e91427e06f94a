// Scroll-to-index controller for virtualized lists.
// Retries failed scrolls with exponential backoff and allows one scroll in flight.

use std::time::{Duration, Instant};

use thiserror::Error;

/// Attempts made before a scroll is abandoned.
pub const MAX_SCROLL_ATTEMPTS: u32 = 5;
/// Delay before the first retry; doubles on each further failure.
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);
/// How long to hold the lock when the list gives no completion signal.
pub const SETTLE_DELAY: Duration = Duration::from_millis(400);

/// Where the target item should land in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Start,
    #[default]
    Center,
    End,
}

/// How a list acknowledged a scroll command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAck {
    /// The list is already at the target.
    Completed,
    /// The list is animating and will not report completion by itself.
    Animating,
}

/// Why a list could not scroll to an index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrollError {
    #[error("list has not been laid out yet")]
    NotLaidOut,
    #[error("item {index} has not been measured")]
    Unmeasured { index: usize },
    #[error("index {index} out of bounds for {len} items")]
    OutOfBounds { index: usize, len: usize },
}

/// A list that can be asked to bring an item into view.
///
/// Only index-based scrolling is exposed. Offset arithmetic drifts from the
/// real item position whenever rendered widths are not uniform.
pub trait VirtualList {
    fn scroll_to_index(&mut self, index: usize, align: Align) -> Result<ScrollAck, ScrollError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollState {
    #[default]
    Idle,
    Scrolling {
        target: usize,
        attempt: u32,
        next_attempt_at: Instant,
    },
    Settling {
        target: usize,
        until: Instant,
    },
}

/// Whether a scroll request was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    Accepted,
    /// Another scroll is in flight; requests are not queued.
    Dropped,
}

/// Something observable that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEvent {
    Landed(usize),
    Retrying {
        target: usize,
        attempt: u32,
        delay: Duration,
    },
    GaveUp(usize),
}

/// State machine `Idle -> Scrolling -> (Settling) -> Idle`.
#[derive(Debug, Clone)]
pub struct ScrollController {
    state: ScrollState,
    max_attempts: u32,
    base_delay: Duration,
    settle_delay: Duration,
}

impl Default for ScrollController {
    fn default() -> Self {
        Self {
            state: ScrollState::Idle,
            max_attempts: MAX_SCROLL_ATTEMPTS,
            base_delay: RETRY_BASE_DELAY,
            settle_delay: SETTLE_DELAY,
        }
    }
}

impl ScrollController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ScrollState::Idle)
    }

    /// Target of the scroll in flight, if any.
    pub fn target(&self) -> Option<usize> {
        match self.state {
            ScrollState::Idle => None,
            ScrollState::Scrolling { target, .. } | ScrollState::Settling { target, .. } => {
                Some(target)
            }
        }
    }

    /// Delay before retrying after the given failed attempt (1-based).
    pub fn backoff_delay(&self, failed_attempt: u32) -> Duration {
        let exp = failed_attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exp)
    }

    /// Ask for a scroll to `target`. The first attempt runs on the next tick.
    pub fn request(&mut self, target: usize, now: Instant) -> ScrollRequest {
        if !self.is_idle() {
            tracing::debug!(index = target, in_flight = ?self.target(), "scroll request dropped");
            return ScrollRequest::Dropped;
        }

        self.state = ScrollState::Scrolling {
            target,
            attempt: 0,
            next_attempt_at: now,
        };
        ScrollRequest::Accepted
    }

    /// Drive the state machine. Call from the event loop.
    pub fn tick(&mut self, now: Instant, list: &mut impl VirtualList) -> Option<ScrollEvent> {
        match self.state {
            ScrollState::Idle => None,
            ScrollState::Settling { target, until } => {
                if now >= until {
                    self.state = ScrollState::Idle;
                    Some(ScrollEvent::Landed(target))
                } else {
                    None
                }
            }
            ScrollState::Scrolling {
                target,
                attempt,
                next_attempt_at,
            } => {
                if now < next_attempt_at {
                    return None;
                }
                let attempt = attempt + 1;

                match list.scroll_to_index(target, Align::Center) {
                    Ok(ScrollAck::Completed) => {
                        self.state = ScrollState::Idle;
                        Some(ScrollEvent::Landed(target))
                    }
                    Ok(ScrollAck::Animating) => {
                        self.state = ScrollState::Settling {
                            target,
                            until: now + self.settle_delay,
                        };
                        None
                    }
                    Err(e) if attempt >= self.max_attempts => {
                        tracing::warn!(index = target, attempt, error = %e, "giving up on scroll");
                        self.state = ScrollState::Idle;
                        Some(ScrollEvent::GaveUp(target))
                    }
                    Err(e) => {
                        let delay = self.backoff_delay(attempt);
                        tracing::debug!(index = target, attempt, error = %e, ?delay, "scroll failed, retrying");
                        self.state = ScrollState::Scrolling {
                            target,
                            attempt,
                            next_attempt_at: now + delay,
                        };
                        Some(ScrollEvent::Retrying {
                            target,
                            attempt,
                            delay,
                        })
                    }
                }
            }
        }
    }

    /// Completion signal from the list, ending a settle early.
    pub fn on_scroll_complete(&mut self) -> Option<ScrollEvent> {
        match self.state {
            ScrollState::Settling { target, .. } => {
                self.state = ScrollState::Idle;
                Some(ScrollEvent::Landed(target))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// List that fails a fixed number of times before scrolling.
    struct FlakyList {
        failures_left: u32,
        ack: ScrollAck,
        position: Option<usize>,
        calls: Vec<usize>,
    }

    impl FlakyList {
        fn new(failures: u32, ack: ScrollAck) -> Self {
            Self {
                failures_left: failures,
                ack,
                position: None,
                calls: Vec::new(),
            }
        }
    }

    impl VirtualList for FlakyList {
        fn scroll_to_index(&mut self, index: usize, align: Align) -> Result<ScrollAck, ScrollError> {
            assert_eq!(align, Align::Center);
            self.calls.push(index);
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(ScrollError::Unmeasured { index });
            }
            self.position = Some(index);
            Ok(self.ack)
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_backoff_doubles() {
        let c = ScrollController::new();
        assert_eq!(c.backoff_delay(1), ms(50));
        assert_eq!(c.backoff_delay(2), ms(100));
        assert_eq!(c.backoff_delay(3), ms(200));
        assert_eq!(c.backoff_delay(4), ms(400));
    }

    #[test]
    fn test_retries_until_success() {
        let start = Instant::now();
        let mut c = ScrollController::new();
        let mut list = FlakyList::new(3, ScrollAck::Completed);

        assert_eq!(c.request(10050, start), ScrollRequest::Accepted);

        assert!(matches!(
            c.tick(start, &mut list),
            Some(ScrollEvent::Retrying { attempt: 1, .. })
        ));
        // Too early for the next attempt
        assert_eq!(c.tick(start + ms(10), &mut list), None);
        assert!(matches!(
            c.tick(start + ms(50), &mut list),
            Some(ScrollEvent::Retrying { attempt: 2, .. })
        ));
        assert!(matches!(
            c.tick(start + ms(150), &mut list),
            Some(ScrollEvent::Retrying { attempt: 3, .. })
        ));
        assert_eq!(
            c.tick(start + ms(350), &mut list),
            Some(ScrollEvent::Landed(10050))
        );

        assert_eq!(list.position, Some(10050));
        assert_eq!(list.calls, vec![10050; 4]);
        assert!(c.is_idle());
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let start = Instant::now();
        let mut c = ScrollController::new();
        let mut list = FlakyList::new(10, ScrollAck::Completed);

        c.request(7, start);
        let mut now = start;
        let mut last = None;
        for _ in 0..100 {
            if let Some(event) = c.tick(now, &mut list) {
                last = Some(event);
                if c.is_idle() {
                    break;
                }
            }
            now += ms(10);
        }

        assert_eq!(last, Some(ScrollEvent::GaveUp(7)));
        assert_eq!(list.calls.len(), MAX_SCROLL_ATTEMPTS as usize);
        assert_eq!(list.position, None);
    }

    #[test]
    fn test_request_dropped_while_in_flight() {
        let start = Instant::now();
        let mut c = ScrollController::new();
        let mut list = FlakyList::new(1, ScrollAck::Completed);

        c.request(1, start);
        c.tick(start, &mut list);
        assert_eq!(c.request(2, start + ms(5)), ScrollRequest::Dropped);
        assert_eq!(c.target(), Some(1));

        assert_eq!(c.tick(start + ms(50), &mut list), Some(ScrollEvent::Landed(1)));
        assert_eq!(c.request(2, start + ms(60)), ScrollRequest::Accepted);
    }

    #[test]
    fn test_animating_list_settles_on_timer() {
        let start = Instant::now();
        let mut c = ScrollController::new();
        let mut list = FlakyList::new(0, ScrollAck::Animating);

        c.request(3, start);
        assert_eq!(c.tick(start, &mut list), None);
        assert!(matches!(c.state(), ScrollState::Settling { target: 3, .. }));
        assert_eq!(c.request(4, start + ms(100)), ScrollRequest::Dropped);

        assert_eq!(c.tick(start + ms(399), &mut list), None);
        assert_eq!(c.tick(start + SETTLE_DELAY, &mut list), Some(ScrollEvent::Landed(3)));
        assert!(c.is_idle());
    }

    #[test]
    fn test_completion_signal_releases_lock_early() {
        let start = Instant::now();
        let mut c = ScrollController::new();
        let mut list = FlakyList::new(0, ScrollAck::Animating);

        c.request(3, start);
        c.tick(start, &mut list);
        assert_eq!(c.on_scroll_complete(), Some(ScrollEvent::Landed(3)));
        assert!(c.is_idle());
        assert_eq!(c.on_scroll_complete(), None);
    }
}
