//! Optimistic flag toggles on the admin scholarship table.
//!
//! A toggle is two-phase: `begin_toggle` flips the row and marks it updating,
//! then the returned `PendingToggle` is either committed or rolled back. A
//! pending toggle that is dropped unsettled rolls back, so a cancelled request
//! never leaves a row stuck in the updating state.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, warn};

use crate::admin::AdminApi;
use crate::errors::ClientError;
use crate::models::admin::{AdminScholarship, FlagUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Flag {
    Active,
    Featured,
}

impl Flag {
    pub fn name(&self) -> &'static str {
        match self {
            Flag::Active => "is_active",
            Flag::Featured => "is_featured",
        }
    }

    fn get(&self, row: &AdminScholarship) -> bool {
        match self {
            Flag::Active => row.is_active,
            Flag::Featured => row.is_featured,
        }
    }

    fn set(&self, row: &mut AdminScholarship, value: bool) {
        match self {
            Flag::Active => row.is_active = value,
            Flag::Featured => row.is_featured = value,
        }
    }

    fn update(&self, value: bool) -> FlagUpdate {
        match self {
            Flag::Active => FlagUpdate {
                is_active: Some(value),
                is_featured: None,
            },
            Flag::Featured => FlagUpdate {
                is_active: None,
                is_featured: Some(value),
            },
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToggleError {
    #[error("scholarship {0} is not in the list")]
    NotFound(String),

    #[error("scholarship {0} is already being updated")]
    RowBusy(String),
}

impl From<ToggleError> for ClientError {
    fn from(e: ToggleError) -> Self {
        match e {
            ToggleError::NotFound(_) => ClientError::Validation(e.to_string()),
            ToggleError::RowBusy(_) => ClientError::Busy(e.to_string()),
        }
    }
}

#[derive(Default)]
struct TableInner {
    rows: Vec<AdminScholarship>,
    updating: HashSet<String>,
}

/// Rows of the admin console plus the per-row updating markers.
#[derive(Clone, Default)]
pub struct ScholarshipTable {
    inner: Arc<Mutex<TableInner>>,
}

impl ScholarshipTable {
    pub fn new(rows: Vec<AdminScholarship>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TableInner {
                rows,
                updating: HashSet::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TableInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn replace(&self, rows: Vec<AdminScholarship>) {
        self.lock().rows = rows;
    }

    pub fn rows(&self) -> Vec<AdminScholarship> {
        self.lock().rows.clone()
    }

    pub fn row(&self, id: &str) -> Option<AdminScholarship> {
        self.lock().rows.iter().find(|r| r.id == id).cloned()
    }

    pub fn is_updating(&self, id: &str) -> bool {
        self.lock().updating.contains(id)
    }

    /// Phase one: flip the flag locally and mark the row updating.
    pub fn begin_toggle(&self, id: &str, flag: Flag) -> Result<PendingToggle, ToggleError> {
        let mut inner = self.lock();
        if inner.updating.contains(id) {
            return Err(ToggleError::RowBusy(id.to_string()));
        }
        let row = inner
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ToggleError::NotFound(id.to_string()))?;

        let previous = flag.get(row);
        flag.set(row, !previous);
        inner.updating.insert(id.to_string());
        debug!(id, flag = flag.name(), value = !previous, "toggle pending");

        Ok(PendingToggle {
            table: self.clone(),
            id: id.to_string(),
            flag,
            previous,
            settled: false,
        })
    }
}

#[must_use = "a pending toggle rolls back when dropped"]
pub struct PendingToggle {
    table: ScholarshipTable,
    id: String,
    flag: Flag,
    previous: bool,
    settled: bool,
}

impl PendingToggle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn flag(&self) -> Flag {
        self.flag
    }

    pub fn new_value(&self) -> bool {
        !self.previous
    }

    /// Body of the partial update: only the toggled field.
    pub fn update(&self) -> FlagUpdate {
        self.flag.update(self.new_value())
    }

    pub fn commit(mut self) -> bool {
        self.settle(false);
        self.new_value()
    }

    pub fn rollback(mut self) {
        self.settle(true);
    }

    fn settle(&mut self, restore: bool) {
        let mut inner = self.table.lock();
        if restore {
            if let Some(row) = inner.rows.iter_mut().find(|r| r.id == self.id) {
                self.flag.set(row, self.previous);
            }
        }
        inner.updating.remove(&self.id);
        self.settled = true;
    }
}

impl Drop for PendingToggle {
    fn drop(&mut self) {
        if !self.settled {
            warn!(id = %self.id, flag = self.flag.name(), "toggle dropped before settling; rolled back");
            self.settle(true);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub id: String,
    pub flag: Flag,
    pub value: bool,
}

/// Sends the partial update for one toggle. On failure the row is restored.
pub async fn toggle_flag(
    api: &dyn AdminApi,
    table: &ScholarshipTable,
    id: &str,
    flag: Flag,
) -> Result<ToggleOutcome, ClientError> {
    let pending = table.begin_toggle(id, flag)?;
    match api.update_flags(id, &pending.update()).await {
        Ok(()) => Ok(ToggleOutcome {
            id: id.to_string(),
            flag,
            value: pending.commit(),
        }),
        Err(e) => {
            pending.rollback();
            let err = ClientError::from(e);
            warn!(id, flag = flag.name(), "toggle failed, rolled back: {err}");
            Err(err)
        }
    }
}
