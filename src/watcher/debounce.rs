use std::time::Duration;

use tokio::time::Instant;

use crate::DebounceConfig;

/// What a settle check decided for the current burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleDecision {
    /// Nothing buffered
    Idle,
    /// The burst is complete and must be pushed
    Settled {
        events: u64,
        since_first: Duration,
        since_last: Duration,
    },
    /// Still churning, check again at the given instant
    Reschedule(Instant),
}

/// Change signals buffered since the last push.
#[derive(Debug, Clone, Default)]
pub struct DebounceState {
    /// Bursts settled so far, never reset
    rounds: u64,
    events: u64,
    burst_start: Option<Instant>,
    last_event: Option<Instant>,
}

impl DebounceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> u64 {
        self.events
    }

    pub fn is_idle(&self) -> bool {
        self.events == 0
    }

    pub fn record_event(
        &mut self,
        now: Instant,
    ) {
        if self.burst_start.is_none() {
            self.burst_start = Some(now);
        }
        self.last_event = Some(now);
        self.events += 1;
    }

    /// Earliest instant at which the burst may settle: the quiet period after
    /// the last event, clamped to the burst cap.
    pub fn next_deadline(
        &self,
        config: &DebounceConfig,
    ) -> Option<Instant> {
        let start = self.burst_start?;
        let last = self.last_event?;
        Some((last + config.debounce_after()).min(start + config.debounce_max()))
    }

    pub fn evaluate(
        &self,
        now: Instant,
        config: &DebounceConfig,
    ) -> SettleDecision {
        let (Some(start), Some(last)) = (self.burst_start, self.last_event) else {
            return SettleDecision::Idle;
        };
        if self.events == 0 {
            return SettleDecision::Idle;
        }

        let since_first = now.saturating_duration_since(start);
        let since_last = now.saturating_duration_since(last);
        if since_first >= config.debounce_max() || since_last >= config.debounce_after() {
            return SettleDecision::Settled {
                events: self.events,
                since_first,
                since_last,
            };
        }

        match self.next_deadline(config) {
            Some(deadline) => SettleDecision::Reschedule(deadline),
            None => SettleDecision::Idle,
        }
    }

    /// Closes the current burst and returns its 1-based round number.
    pub fn complete_burst(&mut self) -> u64 {
        self.rounds += 1;
        self.events = 0;
        self.burst_start = None;
        self.last_event = None;
        self.rounds
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }
}
