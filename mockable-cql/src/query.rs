//! A single parameterizable, re-executable CQL statement.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scylla::statement::unprepared::Statement;
use scylla::statement::Consistency;
use tracing::warn;

use crate::connection::Connection;
use crate::errors::Error;
use crate::iterator::{DriverRowIterator, Page, PageFetcher, RowIterator, StatementPages};
use crate::value::{copy_named, copy_positional, Arguments, PageState, RowMap, RowValues};

/// Query represents a CQL statement together with its bound arguments.
///
/// Settings are applied with the `set_*` methods, or fluently through
/// [`QueryExt`], and must all be made before the query is executed.
/// A query is released exactly once, after which it cannot be executed.
#[async_trait]
pub trait Query: Send + Sync {
    /// Sets the consistency level for this query. If no consistency level
    /// has been set, the default consistency level of the session is used.
    fn set_consistency(&mut self, consistency: Consistency);

    /// Tells the iterator to fetch the result in pages of `page_size` rows.
    ///
    /// Setting the page size too low might decrease the performance.
    fn set_page_size(&mut self, page_size: i32);

    /// Sets the deadline of each request sent for this query. `None` falls
    /// back to the session's default.
    ///
    /// The driver enforces the timeout. Dropping the future of an execution
    /// cancels it.
    fn set_request_timeout(&mut self, timeout: Option<Duration>);

    /// Sets the paging state to resume paging from a specific point.
    ///
    /// This disables automatic paging for this query: [`Query::iter`] fetches
    /// exactly one page, and the state has to be passed again for every
    /// subsequent page.
    fn set_page_state(&mut self, state: PageState);

    /// Executes the query without returning any rows.
    async fn exec(&self) -> Result<(), Error>;

    /// Executes the query and returns an iterator over all the results.
    async fn iter(&self) -> Box<dyn RowIterator>;

    /// Executes the query, inserts the columns of the first selected row into
    /// `results` and discards the rest. Returns [`Error::NotFound`] if no rows
    /// were selected.
    async fn map_scan(&self, results: &mut RowMap) -> Result<(), Error>;

    /// Executes the query, copies the columns of the first selected row into
    /// `results` and discards the rest. Returns [`Error::NotFound`] if no rows
    /// were selected.
    async fn scan(&self, results: &mut RowValues) -> Result<(), Error>;

    /// Releases the query. A released query cannot be executed again.
    fn release(&mut self);
}

/// Chainable configuration of boxed queries.
///
/// # Example
/// ```rust
/// # use mockable_cql::{QueryExt as _, Session};
/// # use scylla::statement::Consistency;
/// # async fn check_only_compiles(session: &dyn Session) -> Result<(), mockable_cql::Error> {
/// let mut query = session
///     .query("SELECT id, name FROM ks.users", vec![])
///     .consistency(Consistency::One)
///     .page_size(100);
/// let mut iterator = query.iter().await;
/// # iterator.close()?;
/// query.release();
/// # Ok(())
/// # }
/// ```
pub trait QueryExt: Sized {
    /// See [`Query::set_consistency`].
    fn consistency(self, consistency: Consistency) -> Self;
    /// See [`Query::set_page_size`].
    fn page_size(self, page_size: i32) -> Self;
    /// See [`Query::set_request_timeout`].
    fn request_timeout(self, timeout: Option<Duration>) -> Self;
    /// See [`Query::set_page_state`].
    fn page_state(self, state: PageState) -> Self;
}

impl<Q: Query + ?Sized> QueryExt for Box<Q> {
    fn consistency(mut self, consistency: Consistency) -> Self {
        self.set_consistency(consistency);
        self
    }

    fn page_size(mut self, page_size: i32) -> Self {
        self.set_page_size(page_size);
        self
    }

    fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.set_request_timeout(timeout);
        self
    }

    fn page_state(mut self, state: PageState) -> Self {
        self.set_page_state(state);
        self
    }
}

/// [`Query`] executed through the driver as an unprepared statement.
///
/// Statements with bound arguments are prepared by the driver behind
/// the scenes on first execution.
pub struct DriverQuery {
    connection: Arc<dyn Connection>,
    statement: Option<Statement>,
    arguments: Arguments,
    page_state: Option<PageState>,
}

impl DriverQuery {
    pub(crate) fn new(connection: Arc<dyn Connection>, statement: &str, arguments: Arguments) -> Self {
        Self {
            connection,
            statement: Some(Statement::new(statement)),
            arguments,
            page_state: None,
        }
    }

    fn statement(&self) -> Result<&Statement, Error> {
        self.statement.as_ref().ok_or(Error::QueryReleased)
    }

    fn with_statement(&mut self, configure: impl FnOnce(&mut Statement)) {
        match self.statement.as_mut() {
            Some(statement) => configure(statement),
            None => warn!("Ignoring configuration of a released query"),
        }
    }

    fn pages(&self) -> Result<StatementPages, Error> {
        Ok(StatementPages {
            connection: self.connection.clone(),
            statement: self.statement()?.clone(),
            arguments: self.arguments.clone(),
        })
    }

    /// Fetches the first page the query would iterate.
    async fn first_page(&self) -> Result<Page, Error> {
        let state = self.page_state.clone().unwrap_or_default();
        self.pages()?.fetch(&state).await
    }
}

#[async_trait]
impl Query for DriverQuery {
    fn set_consistency(&mut self, consistency: Consistency) {
        self.with_statement(|statement| statement.set_consistency(consistency));
    }

    fn set_page_size(&mut self, page_size: i32) {
        if page_size <= 0 {
            warn!(page_size, "Ignoring nonpositive page size");
            return;
        }
        self.with_statement(|statement| statement.set_page_size(page_size));
    }

    fn set_request_timeout(&mut self, timeout: Option<Duration>) {
        self.with_statement(|statement| statement.set_request_timeout(timeout));
    }

    fn set_page_state(&mut self, state: PageState) {
        self.page_state = Some(state);
    }

    async fn exec(&self) -> Result<(), Error> {
        self.connection
            .execute(self.statement()?, &self.arguments)
            .await
    }

    async fn iter(&self) -> Box<dyn RowIterator> {
        let pages = match self.pages() {
            Ok(pages) => pages,
            Err(err) => return Box::new(DriverRowIterator::failed(err)),
        };
        let (state, auto_paging) = match &self.page_state {
            Some(state) => (state.clone(), false),
            None => (PageState::start(), true),
        };
        Box::new(DriverRowIterator::start(Box::new(pages), state, auto_paging).await)
    }

    async fn map_scan(&self, results: &mut RowMap) -> Result<(), Error> {
        let page = self.first_page().await?;
        let row = page.rows.into_iter().next().ok_or(Error::NotFound)?;
        copy_named(&page.columns, row, results);
        Ok(())
    }

    async fn scan(&self, results: &mut RowValues) -> Result<(), Error> {
        let page = self.first_page().await?;
        let row = page.rows.into_iter().next().ok_or(Error::NotFound)?;
        copy_positional(row, results);
        Ok(())
    }

    fn release(&mut self) {
        self.statement = None;
        self.arguments.clear();
    }
}
