//! Consumer-thread harness that pumps a queue until shutdown.

use crate::queue::BoundedWorkQueue;
use std::io;
use std::panic;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Owns a consumer thread draining one [`BoundedWorkQueue`].
///
/// The thread blocks in [`BoundedWorkQueue::dequeue`] and runs the handler
/// once per item; it exits when the queue's halt flag is observed.
pub struct Worker {
    handle: JoinHandle<u64>,
}

impl Worker {
    /// Spawns a named consumer thread over `queue`.
    pub fn spawn<T, F>(name: &str, queue: Arc<BoundedWorkQueue<T>>, mut handler: F) -> io::Result<Self>
    where
        T: Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let handle = thread::Builder::new().name(name.to_owned()).spawn(move || {
            let mut ran = 0u64;
            while let Some(item) = queue.dequeue() {
                handler(item);
                ran += 1;
            }
            log::debug!("worker exiting after {ran} item(s)");
            ran
        })?;
        Ok(Self { handle })
    }

    /// Waits for the consumer thread to observe the halt flag and exit,
    /// returning how many items the handler ran.
    pub fn join(self) -> u64 {
        match self.handle.join() {
            Ok(ran) => ran,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}
