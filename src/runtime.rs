use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// What the game loop reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizEvent {
    Key(KeyEvent),
    Resize,
    /// Wall time since the previous tick, or since the last `catch_up`
    Tick(Duration),
}

/// Where key and resize events come from
pub trait InputSource {
    /// Wait up to `timeout` for the next input event.
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError>;
}

/// Terminal input, read on a helper thread so the loop can keep its own time
pub struct TerminalInput {
    rx: Receiver<QuizEvent>,
}

impl TerminalInput {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            let forwarded = match event::read() {
                // windows reports releases too
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => tx.send(QuizEvent::Key(key)),
                Ok(Event::Resize(_, _)) => tx.send(QuizEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl InputSource for TerminalInput {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Input fed through a channel, for playing without a terminal
pub struct ChannelInput {
    rx: Receiver<QuizEvent>,
}

impl ChannelInput {
    pub fn new(rx: Receiver<QuizEvent>) -> Self {
        Self { rx }
    }
}

impl InputSource for ChannelInput {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Interleaves input with ticks on a fixed schedule.
///
/// A tick is due every `interval`. Once it is due it is returned before any
/// further input, so a steady stream of keys cannot hold the clock back.
/// Each tick carries the wall time since the previous one, which is what
/// the session timers consume.
pub struct EventLoop<I: InputSource> {
    input: I,
    interval: Duration,
    next_tick: Instant,
    last_tick: Instant,
}

impl<I: InputSource> EventLoop<I> {
    pub fn new(input: I, interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            input,
            interval,
            next_tick: now + interval,
            last_tick: now,
        }
    }

    /// Block until the next input event or the tick deadline, whichever is first.
    pub fn step(&mut self) -> QuizEvent {
        let wait = self.next_tick.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            match self.input.recv_timeout(wait) {
                Ok(ev) => return ev,
                Err(RecvTimeoutError::Timeout) => {}
                // input is gone, keep pacing ticks anyway
                Err(RecvTimeoutError::Disconnected) => {
                    thread::sleep(self.next_tick.saturating_duration_since(Instant::now()))
                }
            }
        }

        let dt = self.catch_up();
        self.next_tick = self.last_tick + self.interval;
        QuizEvent::Tick(dt)
    }

    /// Wall time since the last tick, marking now as the new reference point.
    /// Call before acting on input whose timing matters.
    pub fn catch_up(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now - self.last_tick;
        self.last_tick = now;
        dt
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
