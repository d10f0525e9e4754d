//! Public handle to a running throttle

use crate::config::{DispatchMode, ThrottleConfig};
use crate::control::{Command, ControlLoop};
use crate::dispatch::{Callback, Dispatcher, ThreadDispatcher, TokioDispatcher};
use crate::error::ThrottleError;
use crate::Result;
use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::warn;

/// Delays invoking a callback until `delay` has passed since the last add
///
/// Items are held under string keys; adding under an existing key replaces
/// the earlier item. When the window elapses (or on [`flush`](Self::flush))
/// everything pending is delivered to the callback as one batch on a
/// separate thread or task.
///
/// Every call is a synchronous hand-off: it returns once the control loop
/// has accepted the command, not once a batch has been delivered.
///
/// # Closing
///
/// [`close`](Self::close) stops the loop and discards pending items. Call
/// [`flush`](Self::flush) first to deliver them. Operations on a closed
/// handle fail with [`ThrottleError::Closed`]. Dropping the handle closes it.
pub struct GroupThrottle<T> {
    commands: Sender<Command<T>>,
    stop: Mutex<Option<Sender<()>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    delay: Duration,
}

impl<T: Send + 'static> GroupThrottle<T> {
    /// Create a throttle delivering batches on dedicated threads
    ///
    /// A zero `delay` is accepted: each add then delivers on the loop's next
    /// turn.
    pub fn new<F>(callback: F, delay: Duration) -> Result<Self>
    where
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        Self::with_dispatcher(ThreadDispatcher::new(callback), delay)
    }

    /// Create a throttle delivering batches as blocking tasks on `runtime`
    pub fn on_runtime<F>(callback: F, delay: Duration, runtime: tokio::runtime::Handle) -> Result<Self>
    where
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        Self::with_dispatcher(TokioDispatcher::new(callback, runtime), delay)
    }

    /// Create a throttle as described by `config`
    ///
    /// [`DispatchMode::Tokio`] binds to the current Tokio runtime and fails
    /// with [`ThrottleError::NoRuntime`] when called outside one.
    pub fn from_config<F>(callback: F, config: &ThrottleConfig) -> Result<Self>
    where
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        Self::from_shared(Arc::new(callback), config)
    }

    pub(crate) fn from_shared(callback: Callback<T>, config: &ThrottleConfig) -> Result<Self> {
        match config.dispatch {
            DispatchMode::Thread => {
                Self::with_dispatcher(ThreadDispatcher::from_callback(callback), config.delay())
            }
            DispatchMode::Tokio => {
                let runtime = tokio::runtime::Handle::try_current()
                    .map_err(|_| ThrottleError::NoRuntime)?;
                Self::with_dispatcher(
                    TokioDispatcher::from_callback(callback, runtime),
                    config.delay(),
                )
            }
        }
    }

    /// Create a throttle with a custom batch dispatcher
    pub fn with_dispatcher<D>(dispatcher: D, delay: Duration) -> Result<Self>
    where
        D: Dispatcher<T>,
    {
        let (commands_tx, commands_rx) = bounded(0);
        let (stop_tx, stop_rx) = bounded(0);
        let control = ControlLoop::new(dispatcher, delay);

        let worker = thread::Builder::new()
            .name("throttle-control".to_string())
            .spawn(move || control.run(commands_rx, stop_rx))?;

        Ok(Self {
            commands: commands_tx,
            stop: Mutex::new(Some(stop_tx)),
            worker: Mutex::new(Some(worker)),
            delay,
        })
    }

    /// Queue `item` under `key`, replacing any item already pending there
    ///
    /// Restarts the quiescence window.
    pub fn add(&self, key: impl Into<String>, item: T) -> Result<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(ThrottleError::EmptyKey);
        }
        self.send(Command::Add { key, item })
    }

    /// Drop the item pending under `key`; absent keys are ignored
    ///
    /// Never triggers delivery.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.send(Command::Remove(key.to_string()))
    }

    /// Deliver everything pending now
    ///
    /// Always invokes the callback, with an empty batch if nothing is pending.
    pub fn flush(&self) -> Result<()> {
        self.send(Command::Flush)
    }
}

impl<T> GroupThrottle<T> {
    /// Stop the control loop and wait for it to exit
    ///
    /// Pending items are discarded. Batches already dispatched keep running.
    /// Later calls return immediately.
    pub fn close(&self) {
        drop(self.stop.lock().take());

        // Held across the join so a concurrent close also waits for exit
        let mut worker = self.worker.lock();
        if let Some(handle) = worker.take() {
            if handle.join().is_err() {
                warn!("Throttle control loop panicked");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.stop.lock().is_none()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn send(&self, command: Command<T>) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| ThrottleError::Closed)
    }
}

impl<T> Drop for GroupThrottle<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T> std::fmt::Debug for GroupThrottle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupThrottle")
            .field("delay", &self.delay)
            .field("closed", &self.is_closed())
            .finish()
    }
}
