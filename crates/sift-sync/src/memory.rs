//! In-memory relational store.
//!
//! A small transactional store used to exercise the sync engine without a
//! database: typed tables keep rows in insertion order, writes are staged
//! until [`MemoryDatabase::commit`], and every commit notifies the
//! registered [`CommitListener`]s with the ordered change list. Queries
//! implement [`RelationalQuery`], so a `QueryProxy` can wrap them.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use sift_core::{Change, CommitListener, Error, Operation, Record, RelationalQuery, Result};

type Apply = Box<dyn FnOnce() -> Result<()> + Send>;

struct Pending {
    table: usize,
    key: String,
    change: Change,
    apply: Apply,
}

/// A set of tables sharing one transaction and one set of listeners.
#[derive(Default)]
pub struct MemoryDatabase {
    pending: Mutex<Vec<Pending>>,
    listeners: RwLock<Vec<Arc<dyn CommitListener>>>,
    next_table: AtomicUsize,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a table of `R` rows bound to this database.
    pub fn table<R>(self: &Arc<Self>) -> MemoryTable<R>
    where
        R: Record + Clone + 'static,
    {
        MemoryTable {
            db: Arc::clone(self),
            id: self.next_table.fetch_add(1, AtomicOrdering::Relaxed),
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a listener notified after every commit.
    pub fn subscribe(&self, listener: Arc<dyn CommitListener>) -> Result<()> {
        self.listeners
            .write()
            .map_err(|_| Error::store("listener list is poisoned"))?
            .push(listener);
        Ok(())
    }

    /// Number of staged changes.
    pub fn pending_len(&self) -> usize {
        self.lock_pending().map(|p| p.len()).unwrap_or(0)
    }

    /// Apply every staged change, then notify listeners in registration
    /// order.
    ///
    /// Rows are committed before listeners run; a listener error is returned
    /// to the caller and stops later listeners. If a row change cannot be
    /// applied, the error is returned and no listener is notified.
    pub fn commit(&self) -> Result<usize> {
        let staged = std::mem::take(&mut *self.lock_pending()?);
        if staged.is_empty() {
            return Ok(0);
        }

        let mut changes = Vec::with_capacity(staged.len());
        for pending in staged {
            (pending.apply)()?;
            changes.push(pending.change);
        }
        log::debug!("Committed {} changes", changes.len());

        let listeners = self
            .listeners
            .read()
            .map_err(|_| Error::store("listener list is poisoned"))?
            .clone();
        for listener in listeners {
            listener.on_commit(&changes)?;
        }

        Ok(changes.len())
    }

    /// Discard every staged change.
    pub fn rollback(&self) -> Result<()> {
        self.lock_pending()?.clear();
        Ok(())
    }

    fn lock_pending(&self) -> Result<MutexGuard<'_, Vec<Pending>>> {
        self.pending
            .lock()
            .map_err(|_| Error::store("transaction state is poisoned"))
    }
}

impl fmt::Debug for MemoryDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDatabase")
            .field("pending", &self.pending_len())
            .finish()
    }
}

/// Rows of one record type, in insertion order.
pub struct MemoryTable<R> {
    db: Arc<MemoryDatabase>,
    id: usize,
    rows: Arc<RwLock<Vec<R>>>,
}

impl<R> Clone for MemoryTable<R> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            id: self.id,
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<R> MemoryTable<R>
where
    R: Record + Clone + 'static,
{
    /// Stage an insert.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if a row with the same primary key exists,
    /// committed or staged earlier in this transaction.
    pub fn insert(&self, row: R) -> Result<()> {
        let key = key_of(&row)?;
        let rows = Arc::clone(&self.rows);
        let staged = row.clone();
        self.stage(key, Change::new(Arc::new(row), Operation::Insert), |_| -> Apply {
            Box::new(move || {
                write_rows(&rows)?.push(staged);
                Ok(())
            })
        })
    }

    /// Stage a replacement of the row with `row`'s primary key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if no row has that key, counting writes
    /// staged earlier in this transaction.
    pub fn update(&self, row: R) -> Result<()> {
        let key = key_of(&row)?;
        let rows = Arc::clone(&self.rows);
        let staged = row.clone();
        self.stage(key, Change::new(Arc::new(row), Operation::Update), |key| -> Apply {
            Box::new(move || {
                let mut rows = write_rows(&rows)?;
                let slot = rows
                    .iter_mut()
                    .find(|r| r.primary_key_string().as_deref() == Some(key.as_str()))
                    .ok_or_else(|| Error::store(format!("no row with primary key '{key}'")))?;
                *slot = staged;
                Ok(())
            })
        })
    }

    /// Stage removal of the row with `primary_key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if no row has that key, counting writes
    /// staged earlier in this transaction.
    pub fn delete(&self, primary_key: &str) -> Result<()> {
        let mut pending = self.db.lock_pending()?;
        let record: Arc<dyn Record> = match self.staged_state(&pending, primary_key) {
            Some(Some(record)) => record,
            Some(None) => return Err(missing(primary_key)),
            None => Arc::new(self.get(primary_key)?.ok_or_else(|| missing(primary_key))?),
        };

        let rows = Arc::clone(&self.rows);
        let key = primary_key.to_string();
        let retained = key.clone();
        pending.push(Pending {
            table: self.id,
            key,
            change: Change::new(record, Operation::Delete),
            apply: Box::new(move || {
                write_rows(&rows)?
                    .retain(|r| r.primary_key_string().as_deref() != Some(retained.as_str()));
                Ok(())
            }),
        });
        Ok(())
    }

    /// Committed row with `primary_key`.
    pub fn get(&self, primary_key: &str) -> Result<Option<R>> {
        Ok(self
            .read()?
            .iter()
            .find(|r| r.primary_key_string().as_deref() == Some(primary_key))
            .cloned())
    }

    /// Number of committed rows.
    pub fn len(&self) -> usize {
        self.read().map(|rows| rows.len()).unwrap_or(0)
    }

    /// Whether no rows are committed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every committed row, in insertion order.
    pub fn all(&self) -> Result<Vec<R>> {
        Ok(self.read()?.clone())
    }

    /// Query over this table with no predicates.
    pub fn query(&self) -> MemoryQuery<R> {
        MemoryQuery {
            rows: Arc::clone(&self.rows),
            predicates: Vec::new(),
            order: None,
        }
    }

    /// Validate an insert or update against the rows this transaction
    /// would leave behind, then stage it.
    fn stage<F>(&self, key: String, change: Change, apply: F) -> Result<()>
    where
        F: FnOnce(String) -> Apply,
    {
        let mut pending = self.db.lock_pending()?;
        let exists = match self.staged_state(&pending, &key) {
            Some(latest) => latest.is_some(),
            None => self.get(&key)?.is_some(),
        };

        match (change.operation, exists) {
            (Operation::Insert, true) => {
                return Err(Error::store(format!("duplicate primary key '{key}'")));
            }
            (Operation::Update, false) => return Err(missing(&key)),
            _ => {}
        }

        pending.push(Pending {
            table: self.id,
            key: key.clone(),
            change,
            apply: apply(key),
        });
        Ok(())
    }

    /// The latest staged write to `key` in this table: `None` if the
    /// transaction has not touched it, `Some(None)` if it was deleted, and
    /// `Some(Some(record))` otherwise.
    fn staged_state(&self, pending: &[Pending], key: &str) -> Option<Option<Arc<dyn Record>>> {
        pending
            .iter()
            .rev()
            .find(|p| p.table == self.id && p.key == key)
            .map(|p| match p.change.operation {
                Operation::Delete => None,
                Operation::Insert | Operation::Update => Some(Arc::clone(&p.change.record)),
            })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<R>>> {
        self.rows
            .read()
            .map_err(|_| Error::store("table is poisoned"))
    }
}

fn write_rows<R>(rows: &RwLock<Vec<R>>) -> Result<RwLockWriteGuard<'_, Vec<R>>> {
    rows.write().map_err(|_| Error::store("table is poisoned"))
}

fn missing(key: &str) -> Error {
    Error::store(format!("no row with primary key '{key}'"))
}

impl<R> fmt::Debug for MemoryTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTable")
            .field("rows", &self.rows.read().map(|r| r.len()).unwrap_or(0))
            .finish()
    }
}

type Predicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;
type Comparator<R> = Arc<dyn Fn(&R, &R) -> Ordering + Send + Sync>;

/// A composable query over a [`MemoryTable`].
///
/// Predicates accumulate; rows come back in insertion order unless an
/// ordering is set.
pub struct MemoryQuery<R> {
    rows: Arc<RwLock<Vec<R>>>,
    predicates: Vec<Predicate<R>>,
    order: Option<Comparator<R>>,
}

impl<R> Clone for MemoryQuery<R> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            predicates: self.predicates.clone(),
            order: self.order.clone(),
        }
    }
}

impl<R: Record + Clone + 'static> MemoryQuery<R> {
    /// Keep only rows matching `predicate`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    /// Native ordering for [`fetch`](RelationalQuery::fetch).
    pub fn order_by<F>(mut self, compare: F) -> Self
    where
        F: Fn(&R, &R) -> Ordering + Send + Sync + 'static,
    {
        self.order = Some(Arc::new(compare));
        self
    }
}

impl<R: Record + Clone + 'static> RelationalQuery for MemoryQuery<R> {
    type Row = R;

    fn filter_primary_keys(self, keys: &HashSet<String>) -> Self {
        let keys = keys.clone();
        self.filter(move |row| {
            row.primary_key_string()
                .is_some_and(|key| keys.contains(&key))
        })
    }

    fn filter_none(self) -> Self {
        self.filter(|_| false)
    }

    fn fetch(&self) -> Result<Vec<R>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| Error::store("table is poisoned"))?;
        let mut out: Vec<R> = rows
            .iter()
            .filter(|row| self.predicates.iter().all(|p| p(*row)))
            .cloned()
            .collect();
        if let Some(compare) = &self.order {
            out.sort_by(|a, b| compare(a, b));
        }
        Ok(out)
    }
}

impl<R> fmt::Debug for MemoryQuery<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryQuery")
            .field("predicates", &self.predicates.len())
            .field("ordered", &self.order.is_some())
            .finish()
    }
}

fn key_of<R: Record>(row: &R) -> Result<String> {
    row.primary_key_string().ok_or_else(|| {
        Error::store(format!(
            "{} row has no primary key value",
            row.record_type().name()
        ))
    })
}

// ============================================================================
// Tests
// ============================================================================
