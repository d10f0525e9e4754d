//! Control loop owning the pending set and the quiescence timer
//!
//! One dedicated thread runs [`ControlLoop::run`]. It is the only writer of
//! the pending set and the timer; every other party talks to it through the
//! command and stop channels. Each iteration waits for exactly one of
//! {command, timer expiry, stop} and applies it fully before waiting again.
//!
//! ```text
//!             add ──────────────► Armed ◄─── add
//!   Idle ◄── remove (emptied) ───   │
//!     ▲                             │ flush | timer expiry
//!     └──────── drain + dispatch ◄──┘
//! ```

use crate::dispatch::Dispatcher;
use crate::pending::PendingSet;
use crate::timer::QuiescenceTimer;
use crossbeam_channel::{select, Receiver};
use std::time::Duration;
use tracing::{debug, trace};

/// Message sent from a handle to its control loop
pub(crate) enum Command<T> {
    Add { key: String, item: T },
    Remove(String),
    Flush,
}

/// One event observed by the loop per iteration
pub(crate) enum Event<T> {
    Command(Command<T>),
    Expired,
    Stop,
}

/// Whether the quiescence timer is counting down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopState {
    Idle,
    Armed,
}

/// What caused a batch to be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    Flush,
    Timer,
}

/// Outcome of applying a single event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Continue,
    Exit,
}

pub(crate) struct ControlLoop<T, D> {
    pending: PendingSet<T>,
    timer: QuiescenceTimer,
    dispatcher: D,
}

impl<T, D> ControlLoop<T, D>
where
    D: Dispatcher<T>,
{
    pub(crate) fn new(dispatcher: D, delay: Duration) -> Self {
        Self {
            pending: PendingSet::new(),
            timer: QuiescenceTimer::new(delay),
            dispatcher,
        }
    }

    pub(crate) fn state(&self) -> LoopState {
        if self.timer.is_armed() {
            LoopState::Armed
        } else {
            LoopState::Idle
        }
    }

    #[cfg(test)]
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Serve commands until stopped
    ///
    /// Returns when the stop channel fires or disconnects, or when every
    /// command sender is gone. Items still pending at that point are dropped.
    pub(crate) fn run(mut self, commands: Receiver<Command<T>>, stop: Receiver<()>) {
        debug!(delay = ?self.timer.delay(), "Throttle control loop started");

        loop {
            let event = select! {
                recv(commands) -> msg => match msg {
                    Ok(command) => Event::Command(command),
                    Err(_) => Event::Stop,
                },
                recv(self.timer.deadline()) -> _ => Event::Expired,
                recv(stop) -> _ => Event::Stop,
            };

            if self.apply(event) == Step::Exit {
                break;
            }
        }

        debug!(
            state = ?self.state(),
            dropped = self.pending.len(),
            "Throttle control loop stopped"
        );
    }

    /// Apply one event to the pending set and timer
    pub(crate) fn apply(&mut self, event: Event<T>) -> Step {
        match event {
            Event::Command(Command::Add { key, item }) => {
                trace!(key = %key, "add");
                self.pending.upsert(key, item);
                self.timer.arm();
            }
            Event::Command(Command::Remove(key)) => {
                trace!(key = %key, "remove");
                self.pending.remove(&key);
                if self.pending.is_empty() {
                    self.timer.disarm();
                }
            }
            Event::Command(Command::Flush) => self.deliver(Trigger::Flush),
            Event::Expired => self.deliver(Trigger::Timer),
            Event::Stop => return Step::Exit,
        }
        Step::Continue
    }

    /// Drain everything pending into a batch and hand it off
    ///
    /// Flush delivers even when nothing is pending.
    fn deliver(&mut self, trigger: Trigger) {
        let batch = self.pending.drain();
        self.timer.disarm();
        debug!(size = batch.len(), trigger = ?trigger, "Dispatching batch");
        self.dispatcher.dispatch(batch);
    }
}
