//! Chunk feed: marshals decoded chunks onto the processing thread.
//!
//! The pipeline itself never synchronizes; an I/O thread that produces
//! decoded text hands it to a clonable [`ChunkSender`], and the processing
//! thread drains the queue into the pipeline whenever it is ready.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

use super::driver::Pipeline;

/// Producer handle for an I/O thread.
#[derive(Debug, Clone)]
pub struct ChunkSender {
    tx: Sender<String>,
}

impl ChunkSender {
    /// Queue a decoded chunk for processing.
    ///
    /// Returns `false` if the feed has been dropped.
    pub fn send(&self, chunk: impl Into<String>) -> bool {
        self.tx.send(chunk.into()).is_ok()
    }
}

/// Receiving end of the chunk queue, owned by the processing thread.
#[derive(Debug)]
pub struct ChunkFeed {
    tx: Sender<String>,
    rx: Receiver<String>,
}

impl ChunkFeed {
    /// Create an empty feed.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A clonable producer handle for I/O threads.
    pub fn sender(&self) -> ChunkSender {
        ChunkSender {
            tx: self.tx.clone(),
        }
    }

    /// Number of chunks currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no chunks are queued.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Run every queued chunk through the pipeline, in arrival order.
    ///
    /// Returns the number of chunks processed. Never blocks.
    pub fn drain_into(&self, pipeline: &mut Pipeline) -> usize {
        let mut processed = 0;
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => {
                    pipeline.process_chunk(&chunk);
                    processed += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return processed,
            }
        }
    }
}

impl Default for ChunkFeed {
    fn default() -> Self {
        Self::new()
    }
}
