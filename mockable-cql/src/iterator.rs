//! Cursor over the rows returned by an executed query.

use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::sync::Arc;

use async_trait::async_trait;
use scylla::response::query_result::{IntoRowsResultError, QueryResult};
use scylla::response::PagingStateResponse;
use scylla::statement::unprepared::Statement;
use scylla::value::Row;
use tracing::trace;

use crate::connection::Connection;
use crate::errors::Error;
use crate::value::{copy_named, copy_positional, to_row_map, Arguments, PageState, RowMap, RowValues};

/// Iterates the result rows of a CQL query.
///
/// A `RowIterator` is single-owner: it is advanced by one task at a time and
/// must be closed exactly once. Failures met while advancing are not returned
/// by [`scan`](RowIterator::scan)/[`scan_map`](RowIterator::scan_map); they are
/// kept and surfaced by [`close`](RowIterator::close).
///
/// # Example
/// ```rust
/// # use mockable_cql::{RowIterator, RowMap};
/// # async fn check_only_compiles(mut iterator: Box<dyn RowIterator>) -> Result<(), mockable_cql::Error> {
/// let mut row = RowMap::new();
/// while iterator.scan_map(&mut row).await {
///     println!("id = {:?}", row["id"]);
/// }
/// iterator.close()?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait RowIterator: Send {
    /// Copies the next row positionally into `results`.
    ///
    /// Returns whether a row was copied; `false` means the rows are exhausted
    /// or a failure occurred, which [`close`](RowIterator::close) reports.
    async fn scan(&mut self, results: &mut RowValues) -> bool;

    /// Inserts the next row into `results`, keyed by column name.
    ///
    /// Returns whether a row was copied.
    async fn scan_map(&mut self, results: &mut RowMap) -> bool;

    /// Detects whether the current page is exhausted and the next advance will
    /// fetch a further page.
    fn will_switch_page(&self) -> bool;

    /// Returns the paging state received with the most recently fetched page.
    /// It can be used by a subsequent query to resume paging from this point.
    fn page_state(&self) -> PageState;

    /// Drains the remaining rows, then closes the iterator.
    async fn slice_map(&mut self) -> Result<Vec<RowMap>, Error>;

    /// Closes the iterator, returning the first failure met during iteration.
    fn close(&mut self) -> Result<(), Error>;
}

/// One page of a result.
#[derive(Debug, Default)]
pub(crate) struct Page {
    pub(crate) columns: Arc<[String]>,
    pub(crate) rows: Vec<RowValues>,
    /// Continuation of the result, `None` if this is the last page.
    pub(crate) next: Option<PageState>,
}

impl Page {
    /// Reads a page out of a driver response. Responses without rows
    /// (e.g. to an `INSERT`) become an empty final page.
    pub(crate) fn from_response(
        result: QueryResult,
        paging_state_response: PagingStateResponse,
    ) -> Result<Self, Error> {
        let rows_result = match result.into_rows_result() {
            Ok(rows_result) => rows_result,
            Err(IntoRowsResultError::ResultNotRows(_)) => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };

        let columns: Arc<[String]> = rows_result
            .column_specs()
            .iter()
            .map(|spec| spec.name().to_owned())
            .collect();
        let rows = rows_result
            .rows::<Row>()?
            .map(|row| row.map(|row| row.columns))
            .collect::<Result<Vec<_>, _>>()?;
        let next = match paging_state_response.into_paging_control_flow() {
            ControlFlow::Continue(state) => Some(PageState::from_paging_state(&state)),
            ControlFlow::Break(()) => None,
        };

        Ok(Self {
            columns,
            rows,
            next,
        })
    }
}

/// Source of result pages for [`DriverRowIterator`].
#[async_trait]
pub(crate) trait PageFetcher: Send + Sync {
    async fn fetch(&self, state: &PageState) -> Result<Page, Error>;
}

/// Fetches pages of an unprepared statement through a [`Connection`].
pub(crate) struct StatementPages {
    pub(crate) connection: Arc<dyn Connection>,
    pub(crate) statement: Statement,
    pub(crate) arguments: Arguments,
}

#[async_trait]
impl PageFetcher for StatementPages {
    async fn fetch(&self, state: &PageState) -> Result<Page, Error> {
        self.connection
            .fetch_page(&self.statement, &self.arguments, state)
            .await
    }
}

/// [`RowIterator`] reading pages from the driver.
///
/// The first page is fetched when the iterator is created. With automatic
/// paging enabled, the following pages are fetched as the rows of the
/// previous one are consumed.
pub struct DriverRowIterator {
    fetcher: Box<dyn PageFetcher>,
    auto_paging: bool,
    columns: Arc<[String]>,
    rows: VecDeque<RowValues>,
    next: Option<PageState>,
    page_state: PageState,
    error: Option<Error>,
    closed: bool,
}

impl DriverRowIterator {
    pub(crate) async fn start(
        fetcher: Box<dyn PageFetcher>,
        state: PageState,
        auto_paging: bool,
    ) -> Self {
        let mut iterator = Self {
            fetcher,
            auto_paging,
            columns: Arc::from(Vec::new()),
            rows: VecDeque::new(),
            next: None,
            page_state: PageState::start(),
            error: None,
            closed: false,
        };
        iterator.fetch(&state).await;
        iterator
    }

    /// An iterator that yields no rows and reports `error` on close.
    pub(crate) fn failed(error: Error) -> Self {
        struct NoPages;

        #[async_trait]
        impl PageFetcher for NoPages {
            async fn fetch(&self, _state: &PageState) -> Result<Page, Error> {
                Ok(Page::default())
            }
        }

        Self {
            fetcher: Box::new(NoPages),
            auto_paging: false,
            columns: Arc::from(Vec::new()),
            rows: VecDeque::new(),
            next: None,
            page_state: PageState::start(),
            error: Some(error),
            closed: false,
        }
    }

    async fn fetch(&mut self, state: &PageState) {
        match self.fetcher.fetch(state).await {
            Ok(page) => {
                trace!(rows = page.rows.len(), last = page.next.is_none(), "Received page");
                self.columns = page.columns;
                self.rows = page.rows.into();
                self.page_state = page.next.clone().unwrap_or_default();
                self.next = page.next;
            }
            Err(err) => {
                self.rows.clear();
                self.next = None;
                self.error = Some(err);
            }
        }
    }

    async fn advance(&mut self) -> Option<RowValues> {
        if self.closed || self.error.is_some() {
            return None;
        }
        // Pages may legally be empty while more of them follow.
        while self.rows.is_empty() && self.auto_paging {
            let Some(next) = self.next.take() else {
                break;
            };
            self.fetch(&next).await;
        }
        self.rows.pop_front()
    }
}

#[async_trait]
impl RowIterator for DriverRowIterator {
    async fn scan(&mut self, results: &mut RowValues) -> bool {
        match self.advance().await {
            Some(row) => {
                copy_positional(row, results);
                true
            }
            None => false,
        }
    }

    async fn scan_map(&mut self, results: &mut RowMap) -> bool {
        match self.advance().await {
            Some(row) => {
                copy_named(&self.columns, row, results);
                true
            }
            None => false,
        }
    }

    fn will_switch_page(&self) -> bool {
        !self.closed && self.auto_paging && self.rows.is_empty() && self.next.is_some()
    }

    fn page_state(&self) -> PageState {
        self.page_state.clone()
    }

    async fn slice_map(&mut self) -> Result<Vec<RowMap>, Error> {
        let mut maps = Vec::new();
        while let Some(row) = self.advance().await {
            maps.push(to_row_map(&self.columns, row));
        }
        self.close()?;
        Ok(maps)
    }

    fn close(&mut self) -> Result<(), Error> {
        self.closed = true;
        self.rows.clear();
        self.next = None;
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
