//! Frame queue: hand work from background threads to the traversal thread
//!
//! The scene is not `Send`. Threads that finish background work (asset
//! decoding, network replies) post a closure through a [`FrameSender`]; the
//! engine drains the [`FrameQueue`] once per frame, before the scene update,
//! and runs each job with exclusive access to the scene.

use crate::scene::Scene;
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use thiserror::Error;

/// Work executed on the traversal thread
pub type FrameJob = Box<dyn FnOnce(&mut Scene) + Send>;

/// Default number of jobs the queue holds before senders block
pub const DEFAULT_CAPACITY: usize = 64;

/// Errors returned to job producers
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue is at capacity
    #[error("frame queue is full")]
    Full,

    /// The queue was dropped; the engine has shut down
    #[error("frame queue is closed")]
    Closed,
}

/// Receiving end, owned by the engine loop
pub struct FrameQueue {
    sender: SyncSender<FrameJob>,
    receiver: Receiver<FrameJob>,
    capacity: usize,
}

impl FrameQueue {
    /// Queue holding at most `capacity` jobs (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::sync_channel(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// New producer handle
    pub fn sender(&self) -> FrameSender {
        FrameSender {
            sender: self.sender.clone(),
        }
    }

    /// Run up to `max_jobs` queued jobs against `scene`, oldest first.
    ///
    /// Returns the number of jobs run. Never blocks.
    pub fn drain(&self, scene: &mut Scene, max_jobs: usize) -> usize {
        let mut ran = 0;
        while ran < max_jobs {
            match self.receiver.try_recv() {
                Ok(job) => {
                    job(&mut *scene);
                    ran += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if ran > 0 {
            log::trace!("Ran {} queued jobs", ran);
        }
        ran
    }

    /// Drop every queued job without running it
    pub fn discard(&self) -> usize {
        self.receiver.try_iter().count()
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Cloneable, `Send` producer handle
#[derive(Clone)]
pub struct FrameSender {
    sender: SyncSender<FrameJob>,
}

impl FrameSender {
    /// Queue a job, blocking while the queue is full.
    ///
    /// Only the traversal thread drains the queue, so it must use
    /// [`FrameSender::try_call`] instead: calling this from a job or a
    /// component on a full queue never returns.
    pub fn call<F>(&self, job: F) -> Result<(), QueueError>
    where
        F: FnOnce(&mut Scene) + Send + 'static,
    {
        self.sender
            .send(Box::new(job))
            .map_err(|_| QueueError::Closed)
    }

    /// Queue a job without blocking
    pub fn try_call<F>(&self, job: F) -> Result<(), QueueError>
    where
        F: FnOnce(&mut Scene) + Send + 'static,
    {
        self.sender.try_send(Box::new(job)).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Disconnected(_) => QueueError::Closed,
        })
    }
}
