//! Append-only feedback log, model store and the learner tying them together.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::model::{DelayModel, ModelSnapshot};
use super::types::{ExecutedRoute, FeedbackRecord, PerformanceSummary};
use crate::error::Result;

/// Append-only sequence of [`FeedbackRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct FeedbackLog {
    records: Vec<FeedbackRecord>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: FeedbackRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FeedbackRecord] {
        &self.records
    }

    /// Records for one route, oldest first.
    pub fn for_route<'a>(&'a self, route_id: &'a str) -> impl Iterator<Item = &'a FeedbackRecord> + 'a {
        self.records.iter().filter(move |r| r.route_id() == route_id)
    }

    /// Looks a record up by its key.
    pub fn get(&self, route_id: &str, timestamp: DateTime<Utc>) -> Option<&FeedbackRecord> {
        self.records
            .iter()
            .find(|r| r.route_id() == route_id && r.timestamp() == timestamp)
    }

    pub fn summary(&self) -> PerformanceSummary {
        PerformanceSummary::from_records(&self.records)
    }
}

/// Holds the latest [`ModelSnapshot`].
///
/// Readers clone an `Arc` under a short read lock; publishing swaps the
/// pointer. A solve never waits on training.
#[derive(Debug, Default)]
pub struct ModelStore {
    current: RwLock<Option<Arc<ModelSnapshot>>>,
    next_version: AtomicU64,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The newest snapshot, if any model has been trained.
    pub fn latest(&self) -> Option<Arc<ModelSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wraps `model` in a new version and makes it current.
    pub fn publish(&self, model: DelayModel) -> Arc<ModelSnapshot> {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(ModelSnapshot {
            version,
            trained_at: Utc::now(),
            model,
        });
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        // A slower concurrent retrain must not replace a newer snapshot.
        if slot.as_ref().map_or(true, |s| s.version < version) {
            *slot = Some(Arc::clone(&snapshot));
        }
        snapshot
    }
}

/// Ingests execution outcomes and retrains the delay model on demand.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use u_fleet::feedback::{ExecutedRoute, FeedbackLearner};
///
/// let learner = Arc::new(FeedbackLearner::new());
/// assert!(learner.latest_model().is_none());
///
/// for (d, est, actual) in [(1_000.0, 600.0, 700.0), (3_000.0, 1_500.0, 1_650.0)] {
///     learner.ingest(&ExecutedRoute {
///         route_id: "V1".into(),
///         planned_stops: vec!["A".into()],
///         executed_stops: vec!["A".into()],
///         estimated_time: est,
///         actual_time: actual,
///         distance: d,
///     });
/// }
///
/// let snapshot = learner.retrain_in_background().join().unwrap().unwrap();
/// assert_eq!(snapshot.version, 1);
/// assert_eq!(learner.latest_model().unwrap().version, 1);
/// ```
#[derive(Debug, Default)]
pub struct FeedbackLearner {
    log: Mutex<FeedbackLog>,
    store: ModelStore,
}

impl FeedbackLearner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the outcome of `executed`, stamped now.
    pub fn ingest(&self, executed: &ExecutedRoute) -> FeedbackRecord {
        self.ingest_at(executed, Utc::now())
    }

    /// Appends the outcome of `executed` with an explicit timestamp.
    pub fn ingest_at(&self, executed: &ExecutedRoute, timestamp: DateTime<Utc>) -> FeedbackRecord {
        let record = FeedbackRecord::from_execution(executed, timestamp);
        debug!(
            route = %record.route_id(),
            delay = record.delay(),
            deviations = record.deviation_count(),
            "feedback ingested"
        );
        self.lock_log().append(record.clone());
        record
    }

    /// Copy of every record, oldest first.
    pub fn records(&self) -> Vec<FeedbackRecord> {
        self.lock_log().records().to_vec()
    }

    pub fn summary(&self) -> PerformanceSummary {
        self.lock_log().summary()
    }

    /// Fits a model on the current log and publishes it.
    ///
    /// The log lock is held only while copying records.
    ///
    /// # Errors
    /// [`FleetError::Input`](crate::error::FleetError::Input) when the log is empty.
    pub fn retrain(&self) -> Result<Arc<ModelSnapshot>> {
        let records = self.records();
        let model = DelayModel::fit(&records)?;
        let snapshot = self.store.publish(model);
        info!(
            version = snapshot.version,
            samples = snapshot.model.samples,
            mae = snapshot.model.mae,
            "delay model retrained"
        );
        Ok(snapshot)
    }

    /// Runs [`retrain`](Self::retrain) on a new thread.
    pub fn retrain_in_background(self: &Arc<Self>) -> JoinHandle<Result<Arc<ModelSnapshot>>> {
        let learner = Arc::clone(self);
        thread::spawn(move || learner.retrain())
    }

    /// The snapshot a solve should use; `None` means default estimates.
    pub fn latest_model(&self) -> Option<Arc<ModelSnapshot>> {
        self.store.latest()
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, FeedbackLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
