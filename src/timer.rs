use std::time::Duration;

/// What a running countdown reports for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerEvent {
    Tick { remaining: Duration },
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Idle,
    Running,
    Stopped,
    Expired,
}

/// A tick-driven countdown.
///
/// `Expired` is reported exactly once per `start`, and never after `stop`.
#[derive(Debug, Clone)]
pub struct Countdown {
    duration: Duration,
    remaining: Duration,
    state: TimerState,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            duration: Duration::ZERO,
            remaining: Duration::ZERO,
            state: TimerState::Idle,
        }
    }

    /// (Re)start from `duration`, discarding any previous run.
    pub fn start(&mut self, duration: Duration) {
        self.duration = duration;
        self.remaining = duration;
        self.state = TimerState::Running;
    }

    /// Freeze the countdown. Calling it again, or on an idle or expired
    /// timer, does nothing.
    pub fn stop(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Stopped;
        }
    }

    pub fn tick(&mut self, dt: Duration) -> Option<TimerEvent> {
        if self.state != TimerState::Running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            self.state = TimerState::Expired;
            Some(TimerEvent::Expired)
        } else {
            Some(TimerEvent::Tick {
                remaining: self.remaining,
            })
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn has_expired(&self) -> bool {
        self.state == TimerState::Expired
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time spent since `start`, up to the stop or expiry point.
    pub fn elapsed(&self) -> Duration {
        self.duration.saturating_sub(self.remaining)
    }
}
