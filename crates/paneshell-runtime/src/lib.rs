#![forbid(unsafe_code)]

//! paneshell runtime
//!
//! Background work and UI-thread timing for the shell.
//!
//! # Key Components
//!
//! - [`TaskPool`] - fixed worker pool with per-tag wait and cooperative cancel
//! - [`CancelToken`] - flag handed to every task
//! - [`StatusController`] - status text formatted on the pool, applied on the UI thread
//! - [`ResizeDebouncer`] - trailing-edge debounce for resize events
//!
//! # Threading
//! Only the pool's workers run off the UI thread. Results come back through
//! `std::sync::mpsc` channels and are applied by the UI thread when it
//! drains them; workers never hold references to UI state.

pub mod cancel;
pub mod debounce;
pub mod pool;
pub mod status;

pub use cancel::{CancelSource, CancelToken};
pub use debounce::{DEFAULT_RESIZE_DELAY, ResizeDebouncer};
pub use pool::{Task, TaskHandle, TaskOutcome, TaskPool, TaskState};
pub use status::{StatusBar, StatusController, StatusEvent};
