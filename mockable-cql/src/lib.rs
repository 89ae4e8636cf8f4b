//! Mockable access to [Cassandra](https://cassandra.apache.org/) and [Scylla](https://scylladb.com)
//! clusters, built on the [`scylla`] driver.
//!
//! The crate describes what an application does with a cluster as four
//! object-safe traits:
//! * [`Session`] runs statements, builds queries and batches and answers schema questions,
//! * [`Query`] is one statement with its arguments and settings,
//! * [`RowIterator`] walks the rows of a result, page by page,
//! * [`Batch`] groups statements executed together.
//!
//! Each has a live implementation delegating to the driver ([`DriverSession`],
//! [`DriverQuery`], [`DriverRowIterator`], [`DriverBatch`]) and, with the
//! `mock` feature, an expectation-driven double in [`mock`].
//! Application code depends on `dyn Session` and receives either.
//!
//! # Connecting
//! ```rust,no_run
//! use mockable_cql::{new_simple_session, CqlValue, RowMap, Session};
//! use std::error::Error;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn Error>> {
//!     let session = new_simple_session(["127.0.0.1:9042"]).await?;
//!
//!     session
//!         .exec(
//!             "INSERT INTO ks.users (id, name) VALUES (?, ?)",
//!             vec![Some(CqlValue::Int(1)), Some(CqlValue::Text("alex".to_owned()))],
//!         )
//!         .await?;
//!
//!     let mut row = RowMap::new();
//!     session
//!         .scan_map("SELECT name FROM ks.users WHERE id = ?", &mut row, vec![Some(CqlValue::Int(1))])
//!         .await?;
//!     println!("{:?}", row["name"]);
//!
//!     session.close();
//!     Ok(())
//! }
//! ```
//!
//! # Values
//! Statement arguments and result columns are [`Value`]s: the driver's
//! [`CqlValue`], or `None` for CQL null. Arguments bind positionally to the
//! `?` markers of the statement.
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod batch;
mod config;
mod connection;
mod errors;
mod iterator;
mod metadata;
mod query;
mod session;
mod value;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use batch::{Batch, BatchKind, DriverBatch};
pub use config::{ClusterConfig, HOSTS_ENV};
pub use errors::{Error, InvalidBatchKind};
pub use iterator::{DriverRowIterator, RowIterator};
pub use query::{DriverQuery, Query, QueryExt};
pub use session::{new_simple_session, DriverSession, Session};
pub use value::{Arguments, CqlValue, PageState, RowMap, RowValues, Value};

/// Consistency levels accepted by [`Query::set_consistency`] and [`ClusterConfig::consistency`].
pub use scylla::statement::Consistency;
