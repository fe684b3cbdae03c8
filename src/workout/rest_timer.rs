// ABOUTME: Rest countdown between sets with pause, resume, and +/-15 second adjustment
// ABOUTME: Pure timer state plus a tokio driver task that ticks once per second and signals completion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

//! # Rest Timer
//!
//! [`RestTimer`] is the countdown itself and has no notion of wall time: the
//! caller feeds it ticks. [`RestTimerHandle`] drives one on a one-second
//! `tokio` interval, accepts commands, publishes snapshots on a `watch`
//! channel and events on an `mpsc` channel. When the countdown reaches zero
//! it emits [`RestTimerEvent::Completed`], fires the optional
//! [`CompletionSignal`] and the driver task ends. Dropping the handle cancels
//! the task.

use crate::constants::timer::{ADJUST_STEP_SECS, TICK_SECS};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Countdown state, advanced by explicit ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestTimer {
    duration_secs: u64,
    remaining_secs: u64,
    paused: bool,
}

impl RestTimer {
    /// Running countdown from `duration_secs`
    #[must_use]
    pub const fn new(duration_secs: u64) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            paused: false,
        }
    }

    /// Seconds left
    #[must_use]
    pub const fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Length of the countdown, grown by positive adjustments past it
    #[must_use]
    pub const fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Whether ticks are currently ignored
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the countdown reached zero
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Fraction of the countdown elapsed, 0.0 to 1.0
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 1.0;
        }
        1.0 - self.remaining_secs as f64 / self.duration_secs as f64
    }

    /// Advance one second; returns true on the tick that reaches zero
    pub fn tick(&mut self) -> bool {
        if self.paused || self.is_finished() {
            return false;
        }
        self.remaining_secs -= 1;
        self.is_finished()
    }

    /// Stop counting down
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Continue counting down
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Add or remove seconds, never going below zero
    ///
    /// Returns true if this adjustment finished the countdown.
    pub fn adjust(&mut self, delta_secs: i64) -> bool {
        if self.is_finished() {
            return false;
        }
        let magnitude = delta_secs.unsigned_abs();
        self.remaining_secs = if delta_secs >= 0 {
            self.remaining_secs.saturating_add(magnitude)
        } else {
            self.remaining_secs.saturating_sub(magnitude)
        };
        self.duration_secs = self.duration_secs.max(self.remaining_secs);
        self.is_finished()
    }

    /// +15 seconds
    pub fn add_time(&mut self) -> bool {
        self.adjust(ADJUST_STEP_SECS)
    }

    /// -15 seconds
    pub fn subtract_time(&mut self) -> bool {
        self.adjust(-ADJUST_STEP_SECS)
    }
}

/// Notification fired once when a countdown completes (vibration, sound, ...)
pub trait CompletionSignal: Send + Sync {
    /// Called from the driver task on completion
    fn signal(&self);
}

/// Events published by a running [`RestTimerHandle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestTimerEvent {
    /// One second elapsed
    Tick {
        /// Seconds left
        remaining_secs: u64,
    },
    /// Countdown paused
    Paused,
    /// Countdown resumed
    Resumed,
    /// Remaining time changed by the user
    Adjusted {
        /// Seconds left
        remaining_secs: u64,
    },
    /// Reached zero; the timer closes itself
    Completed,
    /// Dismissed before reaching zero
    Skipped,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Pause,
    Resume,
    Adjust(i64),
    Skip,
}

/// A countdown running on its own task
pub struct RestTimerHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<RestTimer>,
    task: JoinHandle<()>,
}

impl RestTimerHandle {
    /// Start counting down from `duration_secs`
    ///
    /// Returns the handle and the event stream. Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(
        duration_secs: u64,
        on_complete: Option<Arc<dyn CompletionSignal>>,
    ) -> (Self, mpsc::UnboundedReceiver<RestTimerEvent>) {
        let timer = RestTimer::new(duration_secs);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(timer);

        let task = tokio::spawn(drive(timer, command_rx, event_tx, state_tx, on_complete));
        (
            Self {
                commands: command_tx,
                state: state_rx,
                task,
            },
            event_rx,
        )
    }

    /// Latest timer state
    #[must_use]
    pub fn snapshot(&self) -> RestTimer {
        *self.state.borrow()
    }

    /// Receiver of timer state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RestTimer> {
        self.state.clone()
    }

    /// Whether the driver task has ended (completed, skipped or cancelled)
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }

    fn send(&self, command: Command) {
        // The task may already have completed; commands are then moot
        let _ = self.commands.send(command);
    }

    /// Pause the countdown
    pub fn pause(&self) {
        self.send(Command::Pause);
    }

    /// Resume the countdown
    pub fn resume(&self) {
        self.send(Command::Resume);
    }

    /// Add or remove seconds
    pub fn adjust(&self, delta_secs: i64) {
        self.send(Command::Adjust(delta_secs));
    }

    /// +15 seconds
    pub fn add_time(&self) {
        self.adjust(ADJUST_STEP_SECS);
    }

    /// -15 seconds
    pub fn subtract_time(&self) {
        self.adjust(-ADJUST_STEP_SECS);
    }

    /// Dismiss the timer without completing it
    pub fn skip(&self) {
        self.send(Command::Skip);
    }
}

impl Drop for RestTimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn tick_period() -> Duration {
    Duration::from_secs(TICK_SECS)
}

async fn drive(
    mut timer: RestTimer,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<RestTimerEvent>,
    state: watch::Sender<RestTimer>,
    on_complete: Option<Arc<dyn CompletionSignal>>,
) {
    let mut ticker = interval_at(Instant::now() + tick_period(), tick_period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let completed = loop {
        if timer.is_finished() {
            break true;
        }
        tokio::select! {
            _ = ticker.tick() => {
                if timer.is_paused() {
                    continue;
                }
                let done = timer.tick();
                state.send_replace(timer);
                if done {
                    break true;
                }
                let _ = events.send(RestTimerEvent::Tick { remaining_secs: timer.remaining_secs() });
            }
            command = commands.recv() => {
                let event = match command {
                    None => break false,
                    Some(Command::Skip) => {
                        let _ = events.send(RestTimerEvent::Skipped);
                        break false;
                    }
                    Some(Command::Pause) => {
                        timer.pause();
                        RestTimerEvent::Paused
                    }
                    Some(Command::Resume) => {
                        timer.resume();
                        // A full second until the next decrement
                        ticker.reset();
                        RestTimerEvent::Resumed
                    }
                    Some(Command::Adjust(delta)) => {
                        if timer.adjust(delta) {
                            state.send_replace(timer);
                            break true;
                        }
                        RestTimerEvent::Adjusted { remaining_secs: timer.remaining_secs() }
                    }
                };
                state.send_replace(timer);
                let _ = events.send(event);
            }
        }
    };

    if completed {
        debug!("Rest timer completed");
        let _ = events.send(RestTimerEvent::Completed);
        if let Some(signal) = on_complete {
            signal.signal();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_reaches_zero_once() {
        let mut timer = RestTimer::new(2);
        assert!(!timer.tick());
        assert!(timer.tick());
        assert!(timer.is_finished());
        assert!(!timer.tick());
        assert_eq!(timer.remaining_secs(), 0);
    }

    #[test]
    fn test_pause_ignores_ticks() {
        let mut timer = RestTimer::new(10);
        timer.pause();
        timer.tick();
        assert_eq!(timer.remaining_secs(), 10);
        timer.resume();
        timer.tick();
        assert_eq!(timer.remaining_secs(), 9);
    }

    #[test]
    fn test_adjust_clamps_at_zero_and_completes() {
        let mut timer = RestTimer::new(20);
        assert!(!timer.add_time());
        assert_eq!(timer.remaining_secs(), 35);
        assert_eq!(timer.duration_secs(), 35);
        timer.adjust(-30);
        assert_eq!(timer.remaining_secs(), 5);
        assert!(timer.subtract_time());
        assert_eq!(timer.remaining_secs(), 0);
    }

    #[test]
    fn test_progress() {
        let mut timer = RestTimer::new(4);
        timer.tick();
        assert!((timer.progress() - 0.25).abs() < f64::EPSILON);
        assert!((RestTimer::new(0).progress() - 1.0).abs() < f64::EPSILON);
    }
}
