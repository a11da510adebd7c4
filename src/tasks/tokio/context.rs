use std::sync::{
    Mutex, MutexGuard, PoisonError, RwLock,
    atomic::{AtomicBool, AtomicU32, Ordering},
};

use tokio::sync::Notify;

use crate::tasks::{
    config::QueueConfig, record::TaskRecord, relay::OutputRelay, scheduler::PriorityScheduler,
};

/// State shared between a [`TaskQueue`](crate::tasks::tokio::queue::TaskQueue)
/// handle and its worker loop.
///
/// Pending, finished and current live behind separate locks so queries on one
/// region never wait for the worker mutating another. None of these locks is
/// held across an `.await`.
#[derive(Debug)]
pub(crate) struct QueueContext {
    pub(crate) config: QueueConfig,
    pub(crate) relay: OutputRelay,
    name: RwLock<String>,
    pending: Mutex<PriorityScheduler>,
    finished: Mutex<Vec<TaskRecord>>,
    current: Mutex<Option<TaskRecord>>,
    running: AtomicBool,
    stop_requested: AtomicBool,
    process_id: AtomicU32,
    stopped: Notify,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl QueueContext {
    pub(crate) fn new(name: impl Into<String>, config: QueueConfig) -> Self {
        Self {
            config,
            relay: OutputRelay::new(),
            name: RwLock::new(name.into()),
            pending: Mutex::new(PriorityScheduler::new()),
            finished: Mutex::new(Vec::new()),
            current: Mutex::new(None),
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            process_id: AtomicU32::new(0),
            stopped: Notify::new(),
        }
    }

    pub(crate) fn name(&self) -> String {
        self.name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
    pub(crate) fn set_name(&self, name: impl Into<String>) {
        *self.name.write().unwrap_or_else(PoisonError::into_inner) = name.into();
    }

    pub(crate) fn pending(&self) -> MutexGuard<'_, PriorityScheduler> {
        lock(&self.pending)
    }
    pub(crate) fn finished(&self) -> MutexGuard<'_, Vec<TaskRecord>> {
        lock(&self.finished)
    }
    pub(crate) fn current(&self) -> MutexGuard<'_, Option<TaskRecord>> {
        lock(&self.current)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
    /// Flips Idle -> Running; `false` if the queue was already running.
    pub(crate) fn try_begin_run(&self) -> bool {
        let started = self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if started {
            self.stop_requested.store(false, Ordering::SeqCst);
        }
        started
    }

    pub(crate) fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }
    pub(crate) fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub(crate) fn get_process_id(&self) -> Option<u32> {
        match self.process_id.load(Ordering::SeqCst) {
            0 => None,
            pid => Some(pid),
        }
    }
    pub(crate) fn set_process_id(&self, pid: u32) {
        self.process_id.store(pid, Ordering::SeqCst);
    }
    pub(crate) fn clear_process_id(&self) {
        self.process_id.store(0, Ordering::SeqCst);
    }

    pub(crate) fn pop_pending(&self) -> Option<TaskRecord> {
        self.pending().pop()
    }

    pub(crate) fn set_current(&self, record: TaskRecord) {
        *self.current() = Some(record);
    }
    pub(crate) fn update_current(&self, f: impl FnOnce(&mut TaskRecord)) {
        if let Some(record) = self.current().as_mut() {
            f(record);
        }
    }

    /// Moves `current` to the end of the finished log and clears the stop flag.
    pub(crate) fn retire_current(&self) {
        {
            // current -> finished is the only place two regions are locked
            let mut current = self.current();
            if let Some(record) = current.take() {
                self.finished().push(record);
            }
        }
        self.stop_requested.store(false, Ordering::SeqCst);
    }

    /// Final cleanup of a worker run.
    pub(crate) fn finish_run(&self) {
        self.retire_current();
        self.clear_process_id();
        self.running.store(false, Ordering::SeqCst);
        self.stopped.notify_waiters();
    }

    /// Resolves once no worker loop is running.
    pub(crate) async fn wait_until_stopped(&self) {
        loop {
            // Registered before the check so a concurrent finish_run is not missed
            let notified = self.stopped.notified();
            if !self.is_running() {
                return;
            }
            notified.await;
        }
    }
}
