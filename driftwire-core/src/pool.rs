//! Named executor groups.
//!
//! A [`Group`] is a small pool of OS threads, each driving its own
//! single-threaded Tokio runtime. Spawning onto a group round-robins the
//! future across its workers. Each worker's runtime is kept alive by a
//! `oneshot` receiver it awaits in `block_on`; dropping the matching sender
//! (in [`Group::stop`]) is what lets the worker thread exit.
//!
//! This is the Rust shape of the spec's "named cooperative execution
//! groups" (socket-io / control / handler / timer): splitting pools keeps
//! application handlers from starving socket I/O and vice versa, while each
//! per-connection and registry serializer still just needs *some* live
//! executor behind it — which one is an implementation detail callers don't
//! need to see.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::runtime::{Builder, Handle};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::{CoreError, Result};

struct Worker {
    handle: Handle,
    keepalive: Option<oneshot::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

/// A named pool of single-threaded Tokio runtimes.
pub struct Group {
    name: &'static str,
    workers: Vec<Worker>,
    next: AtomicUsize,
    stopped: AtomicBool,
}

impl Group {
    /// Starts `n_threads` worker threads for a group named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyGroup`] if `n_threads == 0`, or
    /// [`CoreError::WorkerStartFailed`] if a worker thread could not be
    /// spawned.
    pub fn start(name: &'static str, n_threads: usize) -> Result<Self> {
        if n_threads == 0 {
            return Err(CoreError::EmptyGroup(name));
        }

        let mut workers = Vec::with_capacity(n_threads);

        for i in 0..n_threads {
            let (handle_tx, handle_rx) = std::sync::mpsc::channel();
            let (keepalive_tx, keepalive_rx) = oneshot::channel::<()>();

            let thread = std::thread::Builder::new()
                .name(format!("driftwire-{name}-{i}"))
                .spawn(move || {
                    let Ok(rt) = Builder::new_current_thread().enable_all().build() else {
                        return;
                    };
                    let _ = handle_tx.send(rt.handle().clone());
                    // Blocks this OS thread until the group is stopped;
                    // work spawned via `Group::spawn` lands on this
                    // runtime's handle from any thread in the meantime.
                    rt.block_on(async move {
                        let _ = keepalive_rx.await;
                    });
                })
                .map_err(|e| CoreError::WorkerStartFailed(name, e))?;

            let handle = handle_rx.recv().map_err(|_| {
                CoreError::WorkerStartFailed(name, std::io::Error::other("worker runtime failed to start"))
            })?;

            workers.push(Worker { handle, keepalive: Some(keepalive_tx), thread: Some(thread) });
        }

        Ok(Self { name, workers, next: AtomicUsize::new(0), stopped: AtomicBool::new(false) })
    }

    /// This group's configured name (e.g. `"socket-io"`).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Spawns `fut` onto one of this group's workers, chosen round-robin.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::GroupStopped`] if `stop()` was already called.
    pub fn spawn<F>(&self, fut: F) -> Result<JoinHandle<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        if self.stopped.load(Ordering::Acquire) {
            return Err(CoreError::GroupStopped(self.name));
        }
        Ok(self.next_handle().spawn(fut))
    }

    /// The handle a caller would spawn onto next (useful to pin a
    /// per-connection serializer task onto one worker for its lifetime).
    #[must_use]
    pub fn next_handle(&self) -> Handle {
        let i = self.next.fetch_add(1, Ordering::Relaxed) % self.workers.len();
        self.workers[i].handle.clone()
    }

    /// Cancels all pending work in this group by releasing every worker's
    /// keepalive, then waits for the worker threads to exit. Already-running
    /// futures are not interrupted.
    pub fn stop(&mut self) {
        self.stopped.store(true, Ordering::Release);
        for w in &mut self.workers {
            drop(w.keepalive.take());
        }
        for w in &mut self.workers {
            if let Some(t) = w.thread.take() {
                let _ = t.join();
            }
        }
    }
}

impl Drop for Group {
    fn drop(&mut self) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            for w in &mut self.workers {
                drop(w.keepalive.take());
            }
            for w in &mut self.workers {
                if let Some(t) = w.thread.take() {
                    let _ = t.join();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    #[test]
    fn spawn_runs_on_worker() {
        let group = Group::start("test", 2).unwrap();
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let handle = group
            .spawn(async move {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        group.next_handle().block_on(async { handle.await.unwrap() });
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_group_rejected() {
        assert!(matches!(Group::start("empty", 0), Err(CoreError::EmptyGroup("empty"))));
    }

    #[test]
    fn stopped_group_rejects_spawn() {
        let mut group = Group::start("test", 1).unwrap();
        group.stop();
        assert!(matches!(group.spawn(async {}), Err(CoreError::GroupStopped("test"))));
    }
}
