//! Idle/task queue (spec §5 "Idle task queue"): the single bridge that
//! lets background worker threads (async loaders, the sound driver) hand
//! work back to the main thread. Grounded in
//! `original_source/simulant/idle_task_manager.{h,cpp}`: `add`/`add_once`/
//! `add_timeout`/`add_timeout_once`, `run_sync` blocking a non-main caller
//! until its closure has run, and `execute()` draining both the repeated
//! and once-only task maps each frame.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::ThreadId;
use std::time::{Duration, Instant};

pub type TaskId = u64;

type RepeatedFn = Box<dyn FnMut() -> bool + Send>;
type OnceFn = Box<dyn FnOnce() + Send>;

struct TimedEntry {
    interval: Duration,
    last_fired: Instant,
    callback: RepeatedFn,
}

struct Inner {
    repeated: Vec<(TaskId, RepeatedFn)>,
    timed: Vec<(TaskId, TimedEntry)>,
    once: Vec<(TaskId, OnceFn)>,
    next_id: TaskId,
    generation: u64,
}

/// The main-thread-only work queue (spec §5). Every `add_*` call is safe
/// from any thread; `execute` must only ever be called from the main
/// thread, once per frame.
pub struct IdleTaskQueue {
    inner: Arc<Mutex<Inner>>,
    condvar: Arc<Condvar>,
    main_thread: ThreadId,
}

impl IdleTaskQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                repeated: Vec::new(),
                timed: Vec::new(),
                once: Vec::new(),
                next_id: 0,
                generation: 0,
            })),
            condvar: Arc::new(Condvar::new()),
            main_thread: std::thread::current().id(),
        }
    }

    fn next_id(inner: &mut Inner) -> TaskId {
        let id = inner.next_id;
        inner.next_id += 1;
        id
    }

    /// Runs `f` every `execute()` until it returns `false`.
    pub fn add_repeated(&self, f: impl FnMut() -> bool + Send + 'static) -> TaskId {
        let mut inner = self.inner.lock();
        let id = Self::next_id(&mut inner);
        inner.repeated.push((id, Box::new(f)));
        id
    }

    /// Runs `f` on the first `execute()` at least `interval` after this
    /// call, then reschedules for another `interval` as long as `f`
    /// returns `true` (`TimedTrigger` in the original).
    pub fn add_timed(&self, interval: Duration, f: impl FnMut() -> bool + Send + 'static) -> TaskId {
        let mut inner = self.inner.lock();
        let id = Self::next_id(&mut inner);
        inner.timed.push((
            id,
            TimedEntry {
                interval,
                last_fired: Instant::now(),
                callback: Box::new(f),
            },
        ));
        id
    }

    /// Queues `f` to run exactly once, on the next `execute()`.
    pub fn add_once(&self, f: impl FnOnce() + Send + 'static) -> TaskId {
        let mut inner = self.inner.lock();
        let id = Self::next_id(&mut inner);
        inner.once.push((id, Box::new(f)));
        id
    }

    pub fn remove(&self, id: TaskId) {
        let mut inner = self.inner.lock();
        inner.repeated.retain(|(task_id, _)| *task_id != id);
        inner.timed.retain(|(task_id, _)| *task_id != id);
        inner.once.retain(|(task_id, _)| *task_id != id);
    }

    /// If called from the main thread, runs `f` immediately; otherwise
    /// queues it with [`Self::add_once`] and blocks until an `execute()`
    /// call has run it (`IdleTaskManager::run_sync`'s cross-thread
    /// rendezvous).
    pub fn run_sync(&self, f: impl FnOnce() + Send + 'static) {
        if std::thread::current().id() == self.main_thread {
            f();
            return;
        }

        let generation = self.inner.lock().generation;
        self.add_once(f);
        self.wait_past(generation);
    }

    fn wait_past(&self, generation: u64) {
        let mut guard = self.inner.lock();
        while guard.generation <= generation {
            self.condvar.wait(&mut guard);
        }
    }

    /// Blocks the calling thread until the next `execute()` call completes.
    pub fn wait(&self) {
        let generation = self.inner.lock().generation;
        self.wait_past(generation);
    }

    /// Drains every due task: runs each repeated task, dropping those that
    /// return `false`; runs each timed task whose interval has elapsed,
    /// rescheduling those that return `true`; then runs and clears every
    /// once-only task. Main-thread only (spec §5). Wakes any thread
    /// blocked in [`Self::wait`] or [`Self::run_sync`] once the drain is
    /// complete, mirroring `execute()`'s final `cv_.notify_all()`.
    pub fn execute(&self) {
        let (mut repeated, mut timed, once) = {
            let mut inner = self.inner.lock();
            (
                std::mem::take(&mut inner.repeated),
                std::mem::take(&mut inner.timed),
                std::mem::take(&mut inner.once),
            )
        };

        repeated.retain_mut(|(_, f)| f());

        let now = Instant::now();
        timed.retain_mut(|(_, entry)| {
            if now.duration_since(entry.last_fired) < entry.interval {
                return true;
            }
            entry.last_fired = now;
            (entry.callback)()
        });

        for (_, f) in once {
            f();
        }

        {
            let mut inner = self.inner.lock();
            inner.repeated.extend(repeated);
            inner.timed.extend(timed);
            inner.generation += 1;
        }
        self.condvar.notify_all();
    }

    pub fn pending_count(&self) -> usize {
        let inner = self.inner.lock();
        inner.repeated.len() + inner.timed.len() + inner.once.len()
    }
}

impl Default for IdleTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn repeated_task_runs_until_it_returns_false() {
        let queue = IdleTaskQueue::new();
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        queue.add_repeated(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
            count_clone.load(Ordering::SeqCst) < 3
        });

        queue.execute();
        queue.execute();
        queue.execute();
        queue.execute();

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn once_task_runs_exactly_once() {
        let queue = IdleTaskQueue::new();
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        queue.add_once(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        queue.execute();
        queue.execute();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn removed_task_does_not_run() {
        let queue = IdleTaskQueue::new();
        let ran = Arc::new(AtomicU32::new(0));
        let ran_clone = ran.clone();
        let id = queue.add_once(move || {
            ran_clone.fetch_add(1, Ordering::SeqCst);
        });
        queue.remove(id);
        queue.execute();
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn timed_task_waits_for_its_interval() {
        let queue = IdleTaskQueue::new();
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        queue.add_timed(Duration::from_secs(3600), move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
            false
        });

        queue.execute();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(queue.pending_count(), 1);
    }

    #[test]
    fn run_sync_on_the_main_thread_executes_immediately() {
        let queue = IdleTaskQueue::new();
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        queue.run_sync(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn run_sync_off_the_main_thread_blocks_until_executed() {
        let queue = Arc::new(IdleTaskQueue::new());
        let count = Arc::new(AtomicU32::new(0));

        let worker_queue = queue.clone();
        let worker_count = count.clone();
        let handle = std::thread::spawn(move || {
            worker_queue.run_sync(move || {
                worker_count.fetch_add(1, Ordering::SeqCst);
            });
        });

        // Give the worker a moment to enqueue before draining.
        std::thread::sleep(Duration::from_millis(20));
        queue.execute();
        handle.join().unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
