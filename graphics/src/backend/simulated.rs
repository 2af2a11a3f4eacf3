//! Simulated GPU queue.
//!
//! [`SimulatedQueue`] runs a worker thread that plays the GPU. Submissions are
//! sent to the worker over a channel and processed in order; each fence
//! signal is retired no earlier than `latency` after it was submitted. With a
//! latency longer than the CPU's frame time the CPU runs ahead until the ring
//! of frame slots is full, and then waits on the oldest slot's fence.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::command::CommandList;
use crate::error::GraphicsError;
use crate::scheduler::Fence;

use super::{GpuQueue, validate_lists};

enum Job {
    Execute { draws: usize },
    Signal { fence: Fence, value: u64, due: Instant },
}

/// A queue backed by a worker thread with fixed completion latency.
#[derive(Debug)]
pub struct SimulatedQueue {
    latency: Duration,
    sender: Mutex<Option<Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedQueue {
    /// Start the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Internal`] if the thread cannot be spawned.
    pub fn new(latency: Duration) -> Result<Self, GraphicsError> {
        let (sender, receiver) = mpsc::channel();
        let worker = std::thread::Builder::new()
            .name("ripple-gpu-queue".to_string())
            .spawn(move || run_worker(receiver))
            .map_err(|e| GraphicsError::Internal(format!("failed to spawn GPU queue: {e}")))?;

        log::debug!("SimulatedQueue: started with {:?} latency", latency);

        Ok(Self {
            latency,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Completion latency applied to each signal.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    fn send(&self, job: Job) -> Result<(), GraphicsError> {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return Err(GraphicsError::DeviceLost);
        };
        sender.send(job).map_err(|_| GraphicsError::DeviceLost)
    }
}

fn run_worker(receiver: Receiver<Job>) {
    let mut draws = 0usize;
    for job in receiver {
        match job {
            Job::Execute { draws: count } => draws += count,
            Job::Signal { fence, value, due } => {
                let now = Instant::now();
                if due > now {
                    std::thread::sleep(due - now);
                }
                log::trace!("SimulatedQueue: retired fence value {}", value);
                fence.signal(value);
            }
        }
    }
    log::debug!("SimulatedQueue: worker exiting after {} draws", draws);
}

impl GpuQueue for SimulatedQueue {
    fn name(&self) -> &'static str {
        "Simulated"
    }

    fn execute_command_lists(&self, lists: &[&CommandList]) -> Result<(), GraphicsError> {
        let draws = validate_lists(lists)?;
        self.send(Job::Execute { draws })
    }

    fn signal(&self, fence: &Fence, value: u64) -> Result<(), GraphicsError> {
        self.send(Job::Signal {
            fence: fence.clone(),
            value,
            due: Instant::now() + self.latency,
        })
    }
}

impl Drop for SimulatedQueue {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain queued jobs and exit.
        self.sender.lock().take();
        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                log::error!("SimulatedQueue: worker thread panicked");
            }
        }
    }
}
