//! Collection session: owns the tower store and routes incoming batches
//! through normalization, validation and deduplication.
//!
//! The session is either idle or collecting. Starting subscribes to the
//! update source, and from then on the start action only refreshes. There is
//! no way back to idle.
//!
//! Every batch pass runs under the store lock together with the observer
//! notification it causes, and [`Session::clear`] takes the same lock. A
//! batch that started before a clear can therefore never reappear after it.
//!
//! `start` and `refresh` are serialized by a separate control lock, which is
//! held while the source is called. Sources may deliver from inside
//! `subscribe`, so a batch pass can run while the control lock is held, never
//! the other way round.

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use chrono::Utc;
use tracing::{debug, error, info, trace, warn};

use crate::{
    error::ExportError,
    export,
    filter::is_valid,
    model::{CellTower, RawCellRecord},
    normalize::normalize,
    permission::PermissionGate,
    source::{Batch, UpdateHandler, UpdateSource},
    status::Status,
    store::TowerStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Collecting,
}

/// Change notifications emitted by a session.
///
/// Called while the session's store is locked. Implementations may read
/// [`Session::state`] but must not call anything that touches the store.
pub trait SessionObserver: Send + Sync {
    /// The full, ordered contents of the store after a change.
    fn snapshot_changed(&self, towers: &[CellTower]);

    /// A condition that should be shown instead of data.
    fn status(&self, status: Status);
}

/// Outcome of feeding one batch into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ingested {
    /// The batch had no records, the store was left alone.
    Empty,
    Applied { added: usize },
}

struct Control {
    subscribed: bool,
}

pub struct Session<S, G> {
    source: S,
    gate: Arc<G>,
    control: Mutex<Control>,
    // readable without the control lock, only written while holding it
    collecting: AtomicBool,
    pipeline: Arc<Pipeline>,
}

/// Shared between the session and the handler given to the source.
struct Pipeline {
    store: Mutex<TowerStore>,
    observer: Arc<dyn SessionObserver>,
}

impl Pipeline {
    fn lock(&self) -> MutexGuard<'_, TowerStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ingest(&self, batch: &[RawCellRecord]) -> Ingested {
        debug!(records = batch.len(), "cell info batch");
        if batch.is_empty() {
            self.observer.status(Status::NoCellInfoAvailable);
            return Ingested::Empty;
        }

        let mut store = self.lock();
        let mut added = 0;
        for record in batch {
            match normalize(record).filter(is_valid) {
                Some(tower) => {
                    if store.try_insert(tower) {
                        added += 1;
                    }
                }
                None => trace!(?record, "ignoring cell record"),
            }
        }
        self.observer.snapshot_changed(store.snapshot());
        Ingested::Applied { added }
    }
}

impl<S, G> Session<S, G>
where
    S: UpdateSource,
    G: PermissionGate + 'static,
{
    pub fn new(source: S, gate: G, observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            source,
            gate: Arc::new(gate),
            control: Mutex::new(Control { subscribed: false }),
            collecting: AtomicBool::new(false),
            pipeline: Arc::new(Pipeline {
                store: Mutex::new(TowerStore::new()),
                observer,
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.collecting.load(Ordering::Acquire) {
            SessionState::Collecting
        } else {
            SessionState::Idle
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The start/refresh toggle.
    ///
    /// When idle this begins collecting and subscribes to the source, when
    /// already collecting it is the same as [`Session::refresh`].
    pub fn start(&self) -> Result<(), Status> {
        let mut control = self.control();
        check_permissions(&*self.gate)?;

        match self.state() {
            SessionState::Idle => {
                info!("starting cell info collection");
                self.collecting.store(true, Ordering::Release);
                self.subscribe(&mut control)
            }
            SessionState::Collecting => self.refresh_locked(&mut control),
        }
    }

    /// Asks the source for fresh data. Does nothing while idle.
    pub fn refresh(&self) -> Result<(), Status> {
        let mut control = self.control();
        if self.state() == SessionState::Idle {
            debug!("refresh ignored, collection has not been started");
            return Ok(());
        }
        check_permissions(&*self.gate)?;
        self.refresh_locked(&mut control)
    }

    /// Feeds one batch straight into the store, bypassing source, gate and
    /// state.
    #[cfg(test)]
    fn ingest(&self, batch: &[RawCellRecord]) -> Ingested {
        self.pipeline.ingest(batch)
    }

    /// Forgets every collected tower. Allowed in any state.
    pub fn clear(&self) {
        let mut store = self.pipeline.lock();
        store.clear();
        self.pipeline.observer.snapshot_changed(store.snapshot());
        info!("cell tower data cleared");
    }

    pub fn snapshot(&self) -> Vec<CellTower> {
        self.pipeline.lock().snapshot().to_vec()
    }

    pub fn len(&self) -> usize {
        self.pipeline.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipeline.lock().is_empty()
    }

    /// Writes the export text to `sink`.
    pub fn export_to(&self, sink: &mut impl Write) -> Result<(), ExportError> {
        let towers = self.snapshot();
        export::write_to(sink, &towers).inspect_err(|e| error!("error saving data: {e}"))
    }

    /// Writes the export into a new file inside `dir`.
    ///
    /// Failures are logged and reported once as [`Status::ExportFailed`].
    pub fn save(&self, dir: &Path) -> Result<PathBuf, Status> {
        let towers = self.snapshot();
        export::save(dir, &towers, Utc::now()).map_err(|e| {
            error!("error saving data: {e}");
            self.pipeline.observer.status(Status::ExportFailed);
            Status::ExportFailed
        })
    }

    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn refresh_locked(&self, control: &mut Control) -> Result<(), Status> {
        // an earlier subscription attempt failed, try again
        if !control.subscribed {
            return self.subscribe(control);
        }
        self.source.request_update().map_err(|e| {
            warn!("failed to refresh cell info: {e}");
            Status::ErrorRetrievingCellInfo
        })
    }

    fn subscribe(&self, control: &mut Control) -> Result<(), Status> {
        let pipeline = self.pipeline.clone();
        let gate = self.gate.clone();
        let handler: UpdateHandler = Arc::new(move |batch: Batch| {
            // grants may be revoked while the subscription is active
            if let Err(status) = check_permissions(&*gate) {
                pipeline.observer.status(status);
                return;
            }
            if let Ingested::Applied { added } = pipeline.ingest(&batch) {
                debug!(added, "cell towers added");
            }
        });

        match self.source.subscribe(handler) {
            Ok(()) => {
                control.subscribed = true;
                Ok(())
            }
            Err(e) => {
                warn!("failed to subscribe to cell info: {e}");
                Err(Status::ErrorRetrievingCellInfo)
            }
        }
    }
}

fn check_permissions(gate: &dyn PermissionGate) -> Result<(), Status> {
    if gate.grants().allows_collection() {
        Ok(())
    } else {
        warn!("cell info permissions not granted");
        Err(Status::PermissionsDenied)
    }
}
