//! Batch delivery off the control loop
//!
//! The control loop hands each drained [`Batch`] to a [`Dispatcher`] and moves
//! on immediately. Dispatches are fire-and-forget: the loop never waits for a
//! callback, and two dispatches may run concurrently and finish in any order.

use crate::pending::Batch;
use std::sync::Arc;
use std::thread;
use tracing::warn;

/// User callback receiving one batch per invocation
pub type Callback<T> = Arc<dyn Fn(Vec<T>) + Send + Sync>;

/// Strategy for running the callback without blocking the control loop
pub trait Dispatcher<T>: Send + 'static {
    /// Start delivery of `batch`; must return without waiting for the callback
    fn dispatch(&self, batch: Batch<T>);
}

impl<T, F> Dispatcher<T> for F
where
    F: Fn(Batch<T>) + Send + 'static,
{
    fn dispatch(&self, batch: Batch<T>) {
        self(batch)
    }
}

/// Runs every batch on its own OS thread
pub struct ThreadDispatcher<T> {
    callback: Callback<T>,
}

impl<T> ThreadDispatcher<T> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    pub fn from_callback(callback: Callback<T>) -> Self {
        Self { callback }
    }
}

impl<T: Send + 'static> Dispatcher<T> for ThreadDispatcher<T> {
    fn dispatch(&self, batch: Batch<T>) {
        let callback = Arc::clone(&self.callback);
        let (tx, rx) = crossbeam_channel::bounded::<Batch<T>>(1);
        let spawned = thread::Builder::new()
            .name("throttle-dispatch".to_string())
            .spawn(move || {
                if let Ok(batch) = rx.recv() {
                    callback(batch.into_vec());
                }
            });

        match spawned {
            Ok(_) => {
                // Receiver is alive in the new thread and the slot is free
                let _ = tx.send(batch);
            }
            Err(e) => {
                warn!("Failed to spawn dispatch thread, delivering inline: {}", e);
                (self.callback)(batch.into_vec());
            }
        }
    }
}

/// Runs every batch as a blocking task on a Tokio runtime
pub struct TokioDispatcher<T> {
    callback: Callback<T>,
    runtime: tokio::runtime::Handle,
}

impl<T> TokioDispatcher<T> {
    pub fn new<F>(callback: F, runtime: tokio::runtime::Handle) -> Self
    where
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
            runtime,
        }
    }

    pub fn from_callback(callback: Callback<T>, runtime: tokio::runtime::Handle) -> Self {
        Self { callback, runtime }
    }
}

impl<T: Send + 'static> Dispatcher<T> for TokioDispatcher<T> {
    fn dispatch(&self, batch: Batch<T>) {
        let callback = Arc::clone(&self.callback);
        // Detached: dropping the JoinHandle does not cancel the task
        drop(self.runtime.spawn_blocking(move || callback(batch.into_vec())));
    }
}
