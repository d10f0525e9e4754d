//! Keyed debounce and coalescing for batched work
//!
//! This crate provides:
//! - A sliding-window throttle: every add restarts the quiescence delay
//! - Keyed replacement: re-adding a key overwrites its pending item
//! - Cancellation of single pending items before delivery
//! - Fire-and-forget batch delivery on threads or a Tokio runtime
//! - A type-erased variant that validates items on add
//!
//! ```no_run
//! use std::time::Duration;
//! use throttle::GroupThrottle;
//!
//! let throttle = GroupThrottle::new(
//!     |paths: Vec<String>| println!("reindex {} paths", paths.len()),
//!     Duration::from_millis(200),
//! )?;
//! throttle.add("src/lib.rs", "src/lib.rs".to_string())?;
//! throttle.flush()?;
//! throttle.close();
//! # Ok::<(), throttle::ThrottleError>(())
//! ```

pub mod config;
mod control;
pub mod dispatch;
pub mod dynamic;
pub mod error;
pub mod handle;
pub mod pending;
pub mod timer;

// Re-exports
pub use config::{DispatchMode, ThrottleConfig};
pub use dispatch::{Callback, Dispatcher, ThreadDispatcher, TokioDispatcher};
pub use dynamic::{AnyThrottle, CallbackShape, ElementType, ErasedCallback, ErasedItem, ParamKind};
pub use error::ThrottleError;
pub use handle::GroupThrottle;
pub use pending::{Batch, PendingSet};
pub use timer::QuiescenceTimer;

/// Result type for throttle operations
pub type Result<T> = std::result::Result<T, ThrottleError>;
