#![forbid(unsafe_code)]

//! Tagged worker pool with cooperative cancellation.
//!
//! [`TaskPool`] runs closures on a fixed set of named worker threads. Tasks
//! may carry a string tag; the pool counts active tasks per tag so callers
//! can wait for a whole group ([`TaskPool::await_tag`]) or ask it to stop
//! ([`TaskPool::request_cancel`]).
//!
//! # Invariants
//!
//! - A tag appears in the active map iff it has at least one submitted task
//!   that has not finished or been discarded.
//! - A task's tag count is incremented before it is queued and decremented
//!   after its completion callback returns, so a waiter released by
//!   `await_tag` observes every callback of the group.
//! - Panics in work or in the completion callback are caught and logged;
//!   the worker keeps running.
//! - `submit` never blocks and returns `None` once shutdown has started.
//!
//! # Locking
//!
//! Two mutexes, always taken in this order when nested:
//! 1. the job queue and shutdown flag,
//! 2. the tag counts and cancel flags.
//!
//! # Example
//!
//! ```
//! use paneshell_runtime::pool::{Task, TaskPool};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let pool = TaskPool::with_workers(2).unwrap();
//! let done = Arc::new(AtomicUsize::new(0));
//! for _ in 0..4 {
//!     let done = Arc::clone(&done);
//!     pool.submit(Task::new(move |_| {
//!         done.fetch_add(1, Ordering::SeqCst);
//!     }).tag("batch"));
//! }
//! pool.await_tag("batch");
//! assert_eq!(done.load(Ordering::SeqCst), 4);
//! ```

use std::any::Any;
use std::collections::VecDeque;
use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use paneshell_core::PoolConfig;
use rustc_hash::FxHashMap;
use web_time::{Duration, Instant};

use crate::cancel::{CancelSource, CancelToken};

type Work = Box<dyn FnOnce(&CancelToken) + Send + 'static>;
type Finished = Box<dyn FnOnce(Option<&str>, TaskOutcome) + Send + 'static>;

/// How a task's work function ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Panicked,
}

/// Lifecycle of a submitted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    Queued = 0,
    Running = 1,
    Finished = 2,
    /// Dropped unstarted by [`TaskPool::shutdown`].
    Discarded = 3,
}

impl TaskState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Queued,
            1 => Self::Running,
            2 => Self::Finished,
            _ => Self::Discarded,
        }
    }
}

/// A unit of work, with an optional tag and completion callback.
pub struct Task {
    work: Work,
    tag: Option<String>,
    on_finished: Option<Finished>,
}

impl Task {
    pub fn new<F>(work: F) -> Self
    where
        F: FnOnce(&CancelToken) + Send + 'static,
    {
        Self {
            work: Box::new(work),
            tag: None,
            on_finished: None,
        }
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Called on the worker after `work` returns or panics.
    #[must_use]
    pub fn on_finished<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(Option<&str>, TaskOutcome) + Send + 'static,
    {
        self.on_finished = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("tag", &self.tag)
            .field("has_callback", &self.on_finished.is_some())
            .finish()
    }
}

/// Caller-side view of a submitted task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: u64,
    tag: Option<String>,
    state: Arc<AtomicU8>,
}

impl TaskHandle {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Work and completion callback have both returned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state() == TaskState::Finished
    }
}

struct Job {
    id: u64,
    tag: Option<String>,
    token: CancelToken,
    work: Work,
    on_finished: Option<Finished>,
    state: Arc<AtomicU8>,
}

#[derive(Default)]
struct Queue {
    jobs: VecDeque<Job>,
    shutdown: bool,
}

#[derive(Default)]
struct Tags {
    active: FxHashMap<String, usize>,
    cancel: FxHashMap<String, CancelSource>,
}

impl Tags {
    /// Decrement `tag`, returning whether it reached zero.
    fn release(&mut self, tag: &str) -> bool {
        let remaining = match self.active.get_mut(tag) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => {
                tracing::warn!(target: "paneshell.pool", tag, "release for untracked tag");
                return false;
            }
        };
        if remaining > 0 {
            return false;
        }
        self.active.remove(tag);
        // Cancel requests outlive the group until clear_cancel.
        if self
            .cancel
            .get(tag)
            .is_some_and(|source| !source.is_cancelled())
        {
            self.cancel.remove(tag);
        }
        true
    }
}

struct Shared {
    queue: Mutex<Queue>,
    queue_ready: Condvar,
    tags: Mutex<Tags>,
    tag_idle: Condvar,
    pool_cancel: CancelSource,
    next_id: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            queue: Mutex::new(Queue::default()),
            queue_ready: Condvar::new(),
            tags: Mutex::new(Tags::default()),
            tag_idle: Condvar::new(),
            pool_cancel: CancelSource::new(),
            next_id: AtomicU64::new(0),
        }
    }

    fn lock_queue(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_tags(&self) -> MutexGuard<'_, Tags> {
        self.tags.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn release(&self, tag: &str) {
        if self.lock_tags().release(tag) {
            self.tag_idle.notify_all();
        }
    }
}

/// Fixed-size pool of named worker threads.
pub struct TaskPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool")
            .field("workers", &self.workers.len())
            .field("queued", &self.queued_len())
            .field("shutting_down", &self.is_shutting_down())
            .finish()
    }
}

impl TaskPool {
    /// Spawn `config.max_workers` workers (at least one).
    pub fn new(config: &PoolConfig) -> io::Result<Self> {
        let shared = Arc::new(Shared::new());
        let count = config.max_workers.max(1);
        let mut pool = Self {
            shared,
            workers: Vec::with_capacity(count),
        };
        for index in 0..count {
            let shared = Arc::clone(&pool.shared);
            let spawned = thread::Builder::new()
                .name(format!("{}-{index}", config.thread_name))
                .spawn(move || worker_loop(&shared));
            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(err) => {
                    tracing::error!(
                        target: "paneshell.pool",
                        index,
                        error = %err,
                        "failed to spawn worker"
                    );
                    pool.shutdown();
                    return Err(err);
                }
            }
        }

        tracing::debug!(target: "paneshell.pool", workers = count, "pool started");
        Ok(pool)
    }

    /// Pool with `max_workers` workers and default thread names.
    pub fn with_workers(max_workers: usize) -> io::Result<Self> {
        Self::new(&PoolConfig {
            max_workers,
            ..PoolConfig::default()
        })
    }

    /// Queue `task`. Returns `None` once shutdown has started.
    pub fn submit(&self, task: Task) -> Option<TaskHandle> {
        let Task {
            work,
            tag,
            on_finished,
        } = task;

        let mut queue = self.shared.lock_queue();
        if queue.shutdown {
            tracing::debug!(
                target: "paneshell.pool",
                tag = tag.as_deref().unwrap_or("<untagged>"),
                "submit rejected during shutdown"
            );
            return None;
        }

        let token = match &tag {
            Some(tag) => {
                let mut tags = self.shared.lock_tags();
                *tags.active.entry(tag.clone()).or_insert(0) += 1;
                tags.cancel.entry(tag.clone()).or_default().token()
            }
            None => self.shared.pool_cancel.token(),
        };

        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let state = Arc::new(AtomicU8::new(TaskState::Queued as u8));
        queue.jobs.push_back(Job {
            id,
            tag: tag.clone(),
            token,
            work,
            on_finished,
            state: Arc::clone(&state),
        });
        drop(queue);
        self.shared.queue_ready.notify_one();

        tracing::trace!(
            target: "paneshell.pool",
            task_id = id,
            tag = tag.as_deref().unwrap_or("<untagged>"),
            "task queued"
        );
        Some(TaskHandle { id, tag, state })
    }

    /// Raise the cancel flag for `tag`.
    ///
    /// The flag stays raised, including for tasks submitted later under the
    /// same tag, until [`clear_cancel`](Self::clear_cancel).
    pub fn request_cancel(&self, tag: &str) {
        let mut tags = self.shared.lock_tags();
        tags.cancel.entry(tag.to_string()).or_default().cancel();
        tracing::debug!(
            target: "paneshell.pool",
            tag,
            active = tags.active.get(tag).copied().unwrap_or(0),
            "cancel requested"
        );
    }

    /// Lower the cancel flag for `tag`.
    pub fn clear_cancel(&self, tag: &str) {
        let mut tags = self.shared.lock_tags();
        if tags.active.contains_key(tag) {
            if let Some(source) = tags.cancel.get(tag) {
                source.reset();
            }
        } else {
            tags.cancel.remove(tag);
        }
    }

    #[must_use]
    pub fn is_cancel_requested(&self, tag: &str) -> bool {
        self.shared
            .lock_tags()
            .cancel
            .get(tag)
            .is_some_and(CancelSource::is_cancelled)
    }

    /// Block until `tag` has no active tasks.
    ///
    /// Must not be called from a task carrying the same tag.
    pub fn await_tag(&self, tag: &str) {
        let mut tags = self.shared.lock_tags();
        while tags.active.contains_key(tag) {
            tags = self
                .shared
                .tag_idle
                .wait(tags)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Like [`await_tag`](Self::await_tag) with a deadline. Returns `true`
    /// if the tag drained in time.
    pub fn await_tag_timeout(&self, tag: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut tags = self.shared.lock_tags();
        while tags.active.contains_key(tag) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            tags = self
                .shared
                .tag_idle
                .wait_timeout(tags, remaining)
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
        true
    }

    /// Stop accepting work and cancel what is running.
    ///
    /// Every tracked tag and the pool-wide token are cancelled. Queued jobs
    /// that have not started are dropped without running and their tag
    /// counts released. Running tasks are not waited for; use
    /// [`join`](Self::join) for that. Calling it again is a no-op.
    pub fn shutdown(&self) {
        let discarded = {
            let mut queue = self.shared.lock_queue();
            if queue.shutdown {
                return;
            }
            queue.shutdown = true;
            std::mem::take(&mut queue.jobs)
        };
        self.shared.queue_ready.notify_all();
        self.shared.pool_cancel.cancel();

        let mut woke = false;
        let cancelled_tags = {
            let mut tags = self.shared.lock_tags();
            for source in tags.cancel.values() {
                source.cancel();
            }
            for job in &discarded {
                job.state
                    .store(TaskState::Discarded as u8, Ordering::Release);
                if let Some(tag) = &job.tag {
                    woke |= tags.release(tag);
                }
            }
            tags.cancel.len()
        };
        if woke {
            self.shared.tag_idle.notify_all();
        }

        tracing::info!(
            target: "paneshell.pool",
            discarded = discarded.len(),
            cancelled_tags,
            "pool shutting down"
        );
    }

    /// Shut down and wait for every worker to exit.
    pub fn join(mut self) {
        self.shutdown();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!(target: "paneshell.pool", "worker thread panicked");
            }
        }
    }

    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shared.lock_queue().shutdown
    }

    /// Active (queued or running) tasks under `tag`.
    #[must_use]
    pub fn active_count(&self, tag: &str) -> usize {
        self.shared
            .lock_tags()
            .active
            .get(tag)
            .copied()
            .unwrap_or(0)
    }

    /// Tags with at least one active task, sorted.
    #[must_use]
    pub fn active_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.shared.lock_tags().active.keys().cloned().collect();
        tags.sort_unstable();
        tags
    }

    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.shared.lock_queue().jobs.len()
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        // Workers are detached; they exit once the in-flight task returns.
        self.shutdown();
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut queue = shared.lock_queue();
            loop {
                if let Some(job) = queue.jobs.pop_front() {
                    break job;
                }
                if queue.shutdown {
                    return;
                }
                queue = shared
                    .queue_ready
                    .wait(queue)
                    .unwrap_or_else(|e| e.into_inner());
            }
        };
        run_job(shared, job);
    }
}

fn run_job(shared: &Shared, job: Job) {
    let Job {
        id,
        tag,
        token,
        work,
        on_finished,
        state,
    } = job;
    let tag_label = tag.as_deref().unwrap_or("<untagged>");
    state.store(TaskState::Running as u8, Ordering::Release);

    let outcome = match catch_unwind(AssertUnwindSafe(|| work(&token))) {
        Ok(()) => TaskOutcome::Completed,
        Err(payload) => {
            tracing::error!(
                target: "paneshell.pool",
                task_id = id,
                tag = tag_label,
                panic = %panic_message(payload.as_ref()),
                "task panicked"
            );
            TaskOutcome::Panicked
        }
    };

    if let Some(callback) = on_finished
        && let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback(tag.as_deref(), outcome)))
    {
        tracing::error!(
            target: "paneshell.pool",
            task_id = id,
            tag = tag_label,
            panic = %panic_message(payload.as_ref()),
            "completion callback panicked"
        );
    }

    state.store(TaskState::Finished as u8, Ordering::Release);
    if let Some(tag) = &tag {
        shared.release(tag);
    }
    tracing::trace!(target: "paneshell.pool", task_id = id, tag = tag_label, outcome = ?outcome, "task finished");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
