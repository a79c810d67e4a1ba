//! Sources of cell identity batches.
//!
//! Platforms either push batches whenever the radio reports a change or have
//! to be polled. Both are hidden behind [`UpdateSource`] so the session never
//! cares which kind it is talking to.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error};

use crate::{error::SourceError, model::RawCellRecord};

pub type Batch = Vec<RawCellRecord>;

/// Callback receiving every batch delivered by a source.
pub type UpdateHandler = Arc<dyn Fn(Batch) + Send + Sync>;

pub trait UpdateSource: Send + Sync {
    /// Starts delivering batches to `handler`. May deliver before returning.
    fn subscribe(&self, handler: UpdateHandler) -> Result<(), SourceError>;

    /// Asks for a fresh batch.
    fn request_update(&self) -> Result<(), SourceError>;
}

/// Polled source that replays recorded batches.
///
/// The first batch is delivered on subscription, every update request
/// delivers the next one. Once exhausted it keeps delivering empty batches.
pub struct ReplaySource {
    state: Mutex<ReplayState>,
    denied: bool,
}

struct ReplayState {
    batches: VecDeque<Batch>,
    handler: Option<UpdateHandler>,
}

impl ReplaySource {
    pub fn new(batches: impl IntoIterator<Item = Batch>) -> Self {
        Self {
            state: Mutex::new(ReplayState {
                batches: batches.into_iter().collect(),
                handler: None,
            }),
            denied: false,
        }
    }

    /// A source whose platform refuses every subscription.
    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn remaining(&self) -> usize {
        self.lock().batches.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ReplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver_next(&self) -> Result<(), SourceError> {
        // the handler runs without our lock held
        let (handler, batch) = {
            let mut state = self.lock();
            let handler = state.handler.clone().ok_or(SourceError::NotSubscribed)?;
            (handler, state.batches.pop_front().unwrap_or_default())
        };
        debug!(records = batch.len(), "replaying batch");
        handler(batch);
        Ok(())
    }
}

impl UpdateSource for ReplaySource {
    fn subscribe(&self, handler: UpdateHandler) -> Result<(), SourceError> {
        if self.denied {
            return Err(SourceError::Security(
                "cell info access revoked".to_string(),
            ));
        }
        self.lock().handler = Some(handler);
        self.deliver_next()
    }

    fn request_update(&self) -> Result<(), SourceError> {
        if self.denied {
            return Err(SourceError::Security(
                "cell info access revoked".to_string(),
            ));
        }
        self.deliver_next()
    }
}

/// Push source fed through a tokio channel.
///
/// Whoever holds the sender decides when batches arrive. Must be subscribed
/// from within a tokio runtime.
pub struct ChannelSource {
    receiver: Mutex<Option<mpsc::Receiver<Batch>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ChannelSource {
    pub fn new(capacity: usize) -> (Self, mpsc::Sender<Batch>) {
        let (tx, rx) = mpsc::channel(capacity);
        let source = Self {
            receiver: Mutex::new(Some(rx)),
            task: Mutex::new(None),
        };
        (source, tx)
    }

    /// Waits until every sender is gone and all batches have been handled.
    pub async fn closed(&self) {
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!("cell info forwarding task failed: {e}");
            }
        }
    }
}

impl UpdateSource for ChannelSource {
    fn subscribe(&self, handler: UpdateHandler) -> Result<(), SourceError> {
        let mut rx = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(SourceError::AlreadySubscribed)?;

        let task = tokio::spawn(async move {
            while let Some(batch) = rx.recv().await {
                debug!(records = batch.len(), "received batch");
                handler(batch);
            }
            debug!("cell info channel closed");
        });
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
        Ok(())
    }

    fn request_update(&self) -> Result<(), SourceError> {
        Ok(())
    }
}
