//! Statements submitted together for combined execution.

use std::sync::Arc;

use async_trait::async_trait;
use scylla::statement::batch::{Batch as ScyllaBatch, BatchType};

use crate::connection::Connection;
use crate::errors::{Error, InvalidBatchKind};
use crate::session::split_applied;
use crate::value::{Arguments, RowMap};

/// The kind of a [`Batch`]. The ordinals are the CQL protocol values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BatchKind {
    /// Batched statements are applied atomically, through the batch log.
    Logged = 0,
    /// Batched statements are not applied atomically across partitions.
    Unlogged = 1,
    /// Batch of counter updates.
    Counter = 2,
}

impl From<BatchKind> for BatchType {
    fn from(kind: BatchKind) -> Self {
        match kind {
            BatchKind::Logged => BatchType::Logged,
            BatchKind::Unlogged => BatchType::Unlogged,
            BatchKind::Counter => BatchType::Counter,
        }
    }
}

impl TryFrom<u8> for BatchKind {
    type Error = InvalidBatchKind;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Logged),
            1 => Ok(Self::Unlogged),
            2 => Ok(Self::Counter),
            _ => Err(InvalidBatchKind(value)),
        }
    }
}

/// Batch is an ordered collection of CQL statements executed as one unit,
/// with the atomicity the database guarantees for its [`BatchKind`].
#[async_trait]
pub trait Batch: Send + Sync {
    /// Adds the statement with `arguments` to the batch.
    fn add(&mut self, statement: &str, arguments: Arguments);

    /// Executes the batch.
    async fn exec(&self) -> Result<(), Error>;

    /// Executes the batch as a lightweight transaction. Returns an empty
    /// vector if the batch was applied; otherwise returns the current values
    /// of the conditional rows.
    async fn exec_tx(&self) -> Result<Vec<RowMap>, Error>;
}

/// [`Batch`] executed through the driver.
pub struct DriverBatch {
    connection: Arc<dyn Connection>,
    batch: ScyllaBatch,
    values: Vec<Arguments>,
}

impl DriverBatch {
    pub(crate) fn new(connection: Arc<dyn Connection>, kind: BatchKind) -> Self {
        Self {
            connection,
            batch: ScyllaBatch::new(kind.into()),
            values: Vec::new(),
        }
    }
}

#[async_trait]
impl Batch for DriverBatch {
    fn add(&mut self, statement: &str, arguments: Arguments) {
        self.batch.append_statement(statement);
        self.values.push(arguments);
    }

    async fn exec(&self) -> Result<(), Error> {
        self.connection.batch(&self.batch, &self.values).await?;
        Ok(())
    }

    async fn exec_tx(&self) -> Result<Vec<RowMap>, Error> {
        let page = self.connection.batch(&self.batch, &self.values).await?;
        let (applied, rows) = split_applied(&page.columns, page.rows)?;
        Ok(if applied { Vec::new() } else { rows })
    }
}
