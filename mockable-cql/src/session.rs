//! `Session` is the entry point of the crate.
//! It holds a connection to the cluster, runs CQL statements and builds
//! [`Query`] and [`Batch`] objects.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use scylla::client::session::Session as ScyllaSession;
use scylla::cluster::metadata::ColumnType;
use tracing::debug;

use crate::batch::{Batch, BatchKind, DriverBatch};
use crate::config::ClusterConfig;
use crate::connection::{Connection, SessionHandle};
use crate::errors::Error;
use crate::iterator::RowIterator;
use crate::metadata;
use crate::query::{DriverQuery, Query};
use crate::value::{to_row_map, Arguments, CqlValue, RowMap, RowValues, APPLIED_COLUMN};

/// Session is a Cassandra connection. The `scan*` and `exec` methods run CQL
/// statements, [`columns`](Session::columns) and [`tables`](Session::tables)
/// provide simple schema metadata.
///
/// The convenience methods are shorthands for building a [`Query`] with
/// [`Session::query`], executing it once and releasing it.
///
/// Code depending on `dyn Session` can be unit-tested with the
/// `MockSession` type generated under the `mock` feature.
#[async_trait]
pub trait Session: Send + Sync {
    /// Returns a new [`Batch`] of the given kind.
    fn batch(&self, kind: BatchKind) -> Box<dyn Batch>;

    /// Closes the session. Objects created from it fail with
    /// [`Error::SessionClosed`] from then on.
    fn close(&self);

    /// Returns a map from column names to types for `keyspace` and `table`.
    ///
    /// Schema changes made outside of this session may not be reflected
    /// until the driver refreshes its metadata.
    fn columns(&self, keyspace: &str, table: &str)
        -> Result<HashMap<String, ColumnType<'static>>, Error>;

    /// Executes the statement with `arguments`, discarding any results.
    async fn exec(&self, statement: &str, arguments: Arguments) -> Result<(), Error>;

    /// Executes the statement with `arguments` and copies the first result
    /// row into `results`. Fails with [`Error::NotFound`] if no rows were returned.
    async fn scan(
        &self,
        statement: &str,
        results: &mut RowValues,
        arguments: Arguments,
    ) -> Result<(), Error>;

    /// Executes the statement with `arguments` and returns an iterator over
    /// the results. Use it when the result may be large or paged.
    async fn scan_iterator(&self, statement: &str, arguments: Arguments) -> Box<dyn RowIterator>;

    /// Executes the statement with `arguments` and inserts the first result
    /// row into `results`. Fails with [`Error::NotFound`] if no rows were returned.
    async fn scan_map(
        &self,
        statement: &str,
        results: &mut RowMap,
        arguments: Arguments,
    ) -> Result<(), Error>;

    /// Executes the statement with `arguments` and returns all the result rows.
    ///
    /// The whole result is kept in memory.
    async fn scan_map_slice(&self, statement: &str, arguments: Arguments)
        -> Result<Vec<RowMap>, Error>;

    /// Executes the statement with `arguments` as a lightweight transaction.
    /// If the statement is not applied, the current values of the conditional
    /// columns are put in `results`. Returns whether the statement was applied.
    async fn scan_map_tx(
        &self,
        statement: &str,
        results: &mut RowMap,
        arguments: Arguments,
    ) -> Result<bool, Error>;

    /// Returns the table names of `keyspace`, sorted.
    fn tables(&self, keyspace: &str) -> Result<Vec<String>, Error>;

    /// Returns a new [`Query`] for the statement and `arguments`.
    /// It can be configured further before it is executed.
    fn query(&self, statement: &str, arguments: Arguments) -> Box<dyn Query>;
}

/// [`Session`] delegating to a driver [`scylla::client::session::Session`].
#[derive(Clone)]
pub struct DriverSession {
    handle: SessionHandle,
    connection: Arc<dyn Connection>,
}

impl std::fmt::Debug for DriverSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverSession")
            .field("closed", &self.handle.get().is_err())
            .finish()
    }
}

impl DriverSession {
    /// Wraps an already established driver session.
    ///
    /// # Example
    /// ```rust
    /// # use std::error::Error;
    /// # async fn check_only_compiles() -> Result<(), Box<dyn Error>> {
    /// use mockable_cql::{DriverSession, Session};
    /// use scylla::client::session_builder::SessionBuilder;
    ///
    /// let driver = SessionBuilder::new().known_node("127.0.0.1:9042").build().await?;
    /// let session = DriverSession::new(driver);
    /// session.exec("INSERT INTO ks.t (a) VALUES (1)", vec![]).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(session: impl Into<Arc<ScyllaSession>>) -> Self {
        let handle = SessionHandle::new(session.into());
        Self {
            connection: Arc::new(handle.clone()),
            handle,
        }
    }

    /// Establishes a session configured by `config`.
    pub async fn connect(config: ClusterConfig) -> Result<Self, Error> {
        config.connect().await
    }

    /// Returns the wrapped driver session, or [`Error::SessionClosed`].
    pub fn driver_session(&self) -> Result<Arc<ScyllaSession>, Error> {
        self.handle.get()
    }

    fn new_query(&self, statement: &str, arguments: Arguments) -> DriverQuery {
        DriverQuery::new(self.connection.clone(), statement, arguments)
    }
}

/// Returns a new session connected to `hosts` with default settings.
///
/// The driver speaks CQL native protocol version 4. An empty host list is
/// rejected by the driver with
/// [`NewSessionError::EmptyKnownNodesList`](scylla::errors::NewSessionError::EmptyKnownNodesList).
pub async fn new_simple_session(
    hosts: impl IntoIterator<Item = impl AsRef<str>>,
) -> Result<DriverSession, Error> {
    ClusterConfig::new(hosts).connect().await
}

#[async_trait]
impl Session for DriverSession {
    fn batch(&self, kind: BatchKind) -> Box<dyn Batch> {
        Box::new(DriverBatch::new(self.connection.clone(), kind))
    }

    fn close(&self) {
        debug!("Closing session");
        self.handle.close();
    }

    fn columns(
        &self,
        keyspace: &str,
        table: &str,
    ) -> Result<HashMap<String, ColumnType<'static>>, Error> {
        let cluster_state = self.handle.get()?.get_cluster_state();
        metadata::columns(&cluster_state, keyspace, table)
    }

    async fn exec(&self, statement: &str, arguments: Arguments) -> Result<(), Error> {
        self.new_query(statement, arguments).exec().await
    }

    async fn scan(
        &self,
        statement: &str,
        results: &mut RowValues,
        arguments: Arguments,
    ) -> Result<(), Error> {
        self.new_query(statement, arguments).scan(results).await
    }

    async fn scan_iterator(&self, statement: &str, arguments: Arguments) -> Box<dyn RowIterator> {
        self.new_query(statement, arguments).iter().await
    }

    async fn scan_map(
        &self,
        statement: &str,
        results: &mut RowMap,
        arguments: Arguments,
    ) -> Result<(), Error> {
        self.new_query(statement, arguments).map_scan(results).await
    }

    async fn scan_map_slice(
        &self,
        statement: &str,
        arguments: Arguments,
    ) -> Result<Vec<RowMap>, Error> {
        self.new_query(statement, arguments)
            .iter()
            .await
            .slice_map()
            .await
    }

    async fn scan_map_tx(
        &self,
        statement: &str,
        results: &mut RowMap,
        arguments: Arguments,
    ) -> Result<bool, Error> {
        map_scan_tx(&self.new_query(statement, arguments), results).await
    }

    fn tables(&self, keyspace: &str) -> Result<Vec<String>, Error> {
        let cluster_state = self.handle.get()?.get_cluster_state();
        metadata::tables(&cluster_state, keyspace)
    }

    fn query(&self, statement: &str, arguments: Arguments) -> Box<dyn Query> {
        Box::new(self.new_query(statement, arguments))
    }
}

/// Runs `query` as a lightweight transaction. The current values are copied
/// into `results` only if it was not applied.
pub(crate) async fn map_scan_tx(query: &dyn Query, results: &mut RowMap) -> Result<bool, Error> {
    let mut row = RowMap::new();
    query.map_scan(&mut row).await?;
    let applied = take_applied(&mut row)?;
    if !applied {
        results.extend(row);
    }
    Ok(applied)
}

/// Removes the `[applied]` column from a lightweight transaction result row.
pub(crate) fn take_applied(row: &mut RowMap) -> Result<bool, Error> {
    match row.remove(APPLIED_COLUMN) {
        Some(Some(CqlValue::Boolean(applied))) => Ok(applied),
        _ => Err(Error::NotConditional),
    }
}

/// Converts the rows of a lightweight transaction result, reporting whether it was applied.
pub(crate) fn split_applied(
    columns: &[String],
    rows: Vec<RowValues>,
) -> Result<(bool, Vec<RowMap>), Error> {
    let mut maps = rows
        .into_iter()
        .map(|row| to_row_map(columns, row))
        .collect::<Vec<_>>();
    let applied = match maps.first_mut() {
        Some(first) => take_applied(first)?,
        None => return Err(Error::NotFound),
    };
    for map in maps.iter_mut().skip(1) {
        map.remove(APPLIED_COLUMN);
    }
    Ok((applied, maps))
}
