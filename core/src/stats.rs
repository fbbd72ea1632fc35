//! Dashboard statistics — the persisted activity record
//!
//! A single JSON file holds the counters the dashboard displays. The store
//! owns the record behind a mutex and rewrites the whole file after every
//! mutation. There is no transactional guarantee: a crash between mutation
//! and write loses that update.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StatsError;

/// Activity counters displayed on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsRecord {
    /// Analysis tasks executed
    pub tasks_executed: u64,
    /// Decisions made by the agent
    pub decisions_made: u64,
    /// Tasks that ended with the issue resolved
    pub issues_resolved: u64,
    /// Resolved/executed ratio as a percentage; 0 when nothing has run
    pub success_rate: f64,
}

impl StatsRecord {
    /// Recompute the derived rate from the counters
    ///
    /// This is the single success-rate policy: a plain ratio, recomputed
    /// after every merge. Rates submitted by clients are never trusted.
    fn recompute_rate(&mut self) {
        self.success_rate = if self.tasks_executed > 0 {
            self.issues_resolved as f64 / self.tasks_executed as f64 * 100.0
        } else {
            0.0
        };
    }
}

/// Partial record merged into the current counters
///
/// Unknown fields (including a client-supplied `success_rate`) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsDelta {
    pub tasks_executed: Option<u64>,
    pub decisions_made: Option<u64>,
    pub issues_resolved: Option<u64>,
}

impl StatsDelta {
    /// Delta for one completed analyzer task
    pub fn task(resolved: bool) -> Self {
        Self {
            tasks_executed: Some(1),
            decisions_made: Some(1),
            issues_resolved: Some(u64::from(resolved)),
        }
    }
}

/// File-backed store for the dashboard statistics
///
/// Mutations are serialized through an internal mutex so concurrent request
/// handlers cannot lose updates. The lock is never held across an await.
pub struct StatsStore {
    path: PathBuf,
    record: Mutex<StatsRecord>,
}

impl StatsStore {
    /// Open a store backed by `path`
    ///
    /// A missing file yields zeroed defaults. Unreadable or malformed
    /// content also yields defaults — the file is left untouched until the
    /// next successful mutation. This permissive policy is deliberate and
    /// load-bearing for deployments that hand-edit the file.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<StatsRecord>(&content) {
                Ok(record) => {
                    debug!("Loaded stats from {}", path.display());
                    record
                }
                Err(e) => {
                    warn!(
                        "Malformed stats file {} ({}), starting from defaults",
                        path.display(),
                        e
                    );
                    StatsRecord::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StatsRecord::default(),
            Err(e) => {
                warn!(
                    "Could not read stats file {} ({}), starting from defaults",
                    path.display(),
                    e
                );
                StatsRecord::default()
            }
        };

        Self {
            path,
            record: Mutex::new(record),
        }
    }

    /// Current snapshot, no side effects
    pub fn snapshot(&self) -> StatsRecord {
        self.lock().clone()
    }

    /// Add each present counter, recompute the rate, persist, return the
    /// updated record
    ///
    /// The in-memory record is updated even when persistence fails; the
    /// caller decides whether a `Persist` error is fatal for its request.
    pub fn merge(&self, delta: &StatsDelta) -> Result<StatsRecord, StatsError> {
        let mut record = self.lock();
        record.tasks_executed += delta.tasks_executed.unwrap_or(0);
        record.decisions_made += delta.decisions_made.unwrap_or(0);
        record.issues_resolved += delta.issues_resolved.unwrap_or(0);
        record.recompute_rate();
        let updated = record.clone();
        // Persist under the lock so concurrent merges cannot write stale
        // records over newer ones.
        self.persist(&updated)?;
        Ok(updated)
    }

    /// Zero every counter, persist, return the zeroed record
    pub fn reset(&self) -> Result<StatsRecord, StatsError> {
        let mut record = self.lock();
        *record = StatsRecord::default();
        let zeroed = record.clone();
        self.persist(&zeroed)?;
        Ok(zeroed)
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StatsRecord> {
        // A poisoned lock only means a panic elsewhere; the record itself
        // is always in a consistent state.
        match self.record.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, record: &StatsRecord) -> Result<(), StatsError> {
        let content = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, content).map_err(|source| StatsError::Persist {
            path: self.path.clone(),
            source,
        })?;
        debug!("Persisted stats to {}", self.path.display());
        Ok(())
    }
}
