//! Errors returned by the capability traits and their live implementations.
//!
//! Failures coming from the driver are wrapped without modification, so
//! callers can still match on the driver's own error types. Only a handful
//! of conditions are synthesized by this crate:
//! - [`Error::NotFound`] when a first-row scan sees no rows,
//! - [`Error::InvalidKeyspace`] and [`Error::InvalidTable`] from schema introspection,
//! - [`Error::NotConditional`] when a lightweight transaction result lacks `[applied]`,
//! - [`Error::SessionClosed`] and [`Error::QueryReleased`] on use after close/release.

use scylla::deserialize::DeserializationError;
use scylla::errors::{ExecutionError, NewSessionError};
use scylla::response::query_result::{IntoRowsResultError, RowsError};
use thiserror::Error;

/// Error returned by [`Session`](crate::Session), [`Query`](crate::Query),
/// [`RowIterator`](crate::RowIterator) and [`Batch`](crate::Batch) operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The driver failed to establish a session.
    #[error(transparent)]
    NewSession(#[from] NewSessionError),

    /// The driver failed to execute a request.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The response could not be interpreted as rows.
    #[error("Failed to read rows from the response: {0}")]
    IntoRows(#[from] IntoRowsResultError),

    /// The rows in the response failed the type check.
    #[error(transparent)]
    Rows(#[from] RowsError),

    /// A row failed to deserialize.
    #[error("Failed to deserialize a row: {0}")]
    Deserialization(#[from] DeserializationError),

    /// A first-row scan was executed, but the result contained no rows.
    #[error("No rows were returned")]
    NotFound,

    /// Schema introspection was asked about a keyspace that does not exist.
    #[error("Keyspace {0} invalid")]
    InvalidKeyspace(String),

    /// Schema introspection was asked about a table that does not exist.
    #[error("Table {keyspace}.{table} invalid")]
    InvalidTable {
        /// Keyspace that was searched.
        keyspace: String,
        /// Table that was not found in it.
        table: String,
    },

    /// A lightweight transaction returned no boolean `[applied]` column.
    #[error("The result of a conditional statement has no boolean [applied] column")]
    NotConditional,

    /// The session this object was created from has been closed.
    #[error("Session is closed")]
    SessionClosed,

    /// The query has been released and cannot be executed anymore.
    #[error("Query has been released")]
    QueryReleased,
}

/// Returned when converting an unknown ordinal into a [`BatchKind`](crate::BatchKind).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Unknown batch kind: {0}")]
pub struct InvalidBatchKind(pub u8);
