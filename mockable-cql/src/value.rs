//! Values exchanged with the capability traits.
//!
//! CQL columns are typed at runtime, so rows are exposed as [`Value`]s: the
//! driver's [`CqlValue`] sum type wrapped in an `Option`, with `None` standing
//! for CQL `null`. Callers have to know which variant to expect in each column.

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use scylla::response::PagingState;
pub use scylla::value::CqlValue;

/// A single, possibly null, column value.
pub type Value = Option<CqlValue>;

/// Positional destination slots for a scanned row.
pub type RowValues = Vec<Value>;

/// Column-name-keyed destination for a scanned row.
pub type RowMap = HashMap<String, Value>;

/// Positional values bound to the `?` markers of a statement, in order.
pub type Arguments = Vec<Value>;

/// Name of the column reporting the outcome of a lightweight transaction.
pub(crate) const APPLIED_COLUMN: &str = "[applied]";

/// Opaque paging continuation token.
///
/// Obtained from [`RowIterator::page_state`](crate::RowIterator::page_state)
/// and fed back through [`Query::set_page_state`](crate::Query::set_page_state)
/// to resume iteration where the previous page ended. An empty token means
/// "start from the beginning".
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct PageState(Bytes);

impl PageState {
    /// Token pointing at the beginning of the result.
    pub fn start() -> Self {
        Self::default()
    }

    /// Raw bytes of the token.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True if the token points at the beginning of the result.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn to_paging_state(&self) -> PagingState {
        if self.is_empty() {
            PagingState::start()
        } else {
            PagingState::new_from_raw_bytes(self.as_bytes())
        }
    }

    pub(crate) fn from_paging_state(state: &PagingState) -> Self {
        state
            .as_bytes_slice()
            .map(|raw| Self(Bytes::copy_from_slice(raw)))
            .unwrap_or_default()
    }
}

impl fmt::Debug for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PageState").field(&self.0.len()).finish()
    }
}

impl From<Vec<u8>> for PageState {
    fn from(raw: Vec<u8>) -> Self {
        Self(raw.into())
    }
}

impl From<&[u8]> for PageState {
    fn from(raw: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(raw))
    }
}

impl From<Bytes> for PageState {
    fn from(raw: Bytes) -> Self {
        Self(raw)
    }
}

impl From<PageState> for Vec<u8> {
    fn from(state: PageState) -> Self {
        state.0.to_vec()
    }
}

/// Copies `row` positionally into `results`, replacing its previous contents.
pub(crate) fn copy_positional(row: RowValues, results: &mut RowValues) {
    results.clear();
    results.extend(row);
}

/// Inserts each column of `row` into `results` under its column name.
pub(crate) fn copy_named(columns: &[String], row: RowValues, results: &mut RowMap) {
    results.extend(columns.iter().cloned().zip(row));
}

/// Builds a fresh map out of a row.
pub(crate) fn to_row_map(columns: &[String], row: RowValues) -> RowMap {
    let mut map = RowMap::with_capacity(columns.len());
    copy_named(columns, row, &mut map);
    map
}
