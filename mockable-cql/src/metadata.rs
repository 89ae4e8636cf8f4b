//! Schema introspection over the driver's cluster metadata snapshot.

use std::collections::HashMap;

use itertools::Itertools;
use scylla::cluster::metadata::{ColumnType, Keyspace, Strategy};
use scylla::cluster::ClusterState;
use tracing::debug;

use crate::errors::Error;

/// Fields of a keyspace that tell an existing keyspace from a missing one.
///
/// A keyspace reported with none of them set is treated as missing. This
/// also rejects a real keyspace with durable writes disabled, no explicit
/// replication and no tables.
#[derive(Debug, PartialEq, Eq)]
struct KeyspaceShape<'a> {
    durable_writes: bool,
    strategy_class: &'a str,
    strategy_options: usize,
    tables: usize,
}

impl<'a> KeyspaceShape<'a> {
    fn of(keyspace: &'a Keyspace) -> Self {
        let (strategy_class, strategy_options) = strategy_shape(&keyspace.strategy);
        Self {
            // Not exposed by the driver.
            durable_writes: false,
            strategy_class,
            strategy_options,
            tables: keyspace.tables.len(),
        }
    }

    fn looks_missing(&self) -> bool {
        !self.durable_writes
            && self.strategy_class.is_empty()
            && self.strategy_options == 0
            && self.tables == 0
    }
}

/// Class name and number of options of a replication strategy.
fn strategy_shape(strategy: &Strategy) -> (&str, usize) {
    match strategy {
        Strategy::SimpleStrategy { .. } => ("SimpleStrategy", 1),
        Strategy::NetworkTopologyStrategy {
            datacenter_repfactors,
        } => ("NetworkTopologyStrategy", datacenter_repfactors.len()),
        Strategy::LocalStrategy => ("LocalStrategy", 0),
        Strategy::Other { name, data } => (name.as_str(), data.len()),
        #[allow(unreachable_patterns)]
        _ => ("", 0),
    }
}

fn keyspace<'a>(cluster_state: &'a ClusterState, name: &str) -> Result<&'a Keyspace, Error> {
    let invalid = || {
        debug!(keyspace = name, "Keyspace not found in metadata");
        Error::InvalidKeyspace(name.to_owned())
    };
    let keyspace = cluster_state.get_keyspace(name).ok_or_else(invalid)?;
    if KeyspaceShape::of(keyspace).looks_missing() {
        return Err(invalid());
    }
    Ok(keyspace)
}

pub(crate) fn columns(
    cluster_state: &ClusterState,
    keyspace_name: &str,
    table_name: &str,
) -> Result<HashMap<String, ColumnType<'static>>, Error> {
    let table = keyspace(cluster_state, keyspace_name)?
        .tables
        .get(table_name)
        .ok_or_else(|| Error::InvalidTable {
            keyspace: keyspace_name.to_owned(),
            table: table_name.to_owned(),
        })?;

    Ok(table
        .columns
        .iter()
        .map(|(name, column)| (name.clone(), column.typ.clone()))
        .collect())
}

pub(crate) fn tables(cluster_state: &ClusterState, keyspace_name: &str) -> Result<Vec<String>, Error> {
    Ok(keyspace(cluster_state, keyspace_name)?
        .tables
        .keys()
        .cloned()
        .sorted()
        .collect())
}
