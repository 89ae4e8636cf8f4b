//! The boundary between the live implementations and the driver.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use scylla::client::session::Session as ScyllaSession;
use scylla::response::PagingStateResponse;
use scylla::statement::batch::Batch as ScyllaBatch;
use scylla::statement::unprepared::Statement;
use tracing::trace;

use crate::errors::Error;
use crate::iterator::Page;
use crate::value::{Arguments, PageState};

/// Requests the live queries and batches send to the cluster.
#[async_trait]
pub(crate) trait Connection: Send + Sync {
    /// Executes the statement, discarding any rows.
    async fn execute(&self, statement: &Statement, arguments: &Arguments) -> Result<(), Error>;

    /// Fetches the page of the statement's result starting at `state`.
    async fn fetch_page(
        &self,
        statement: &Statement,
        arguments: &Arguments,
        state: &PageState,
    ) -> Result<Page, Error>;

    /// Executes the batch and returns the rows of its result.
    async fn batch(&self, batch: &ScyllaBatch, values: &[Arguments]) -> Result<Page, Error>;
}

/// Driver session shared by a [`DriverSession`](crate::DriverSession) and
/// everything created from it.
///
/// Closing empties the slot, which every clone observes.
#[derive(Clone)]
pub(crate) struct SessionHandle(Arc<ArcSwapOption<ScyllaSession>>);

impl SessionHandle {
    pub(crate) fn new(session: Arc<ScyllaSession>) -> Self {
        Self(Arc::new(ArcSwapOption::from(Some(session))))
    }

    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self(Arc::new(ArcSwapOption::empty()))
    }

    pub(crate) fn get(&self) -> Result<Arc<ScyllaSession>, Error> {
        self.0.load_full().ok_or(Error::SessionClosed)
    }

    pub(crate) fn close(&self) {
        self.0.store(None);
    }
}

#[async_trait]
impl Connection for SessionHandle {
    async fn execute(&self, statement: &Statement, arguments: &Arguments) -> Result<(), Error> {
        let session = self.get()?;
        trace!(statement = statement.contents.as_str(), "Executing query");
        session.query_unpaged(statement.clone(), arguments).await?;
        Ok(())
    }

    async fn fetch_page(
        &self,
        statement: &Statement,
        arguments: &Arguments,
        state: &PageState,
    ) -> Result<Page, Error> {
        let session = self.get()?;
        trace!(
            statement = statement.contents.as_str(),
            resumed = !state.is_empty(),
            "Fetching page"
        );
        let (result, paging_state_response) = session
            .query_single_page(statement.clone(), arguments, state.to_paging_state())
            .await?;
        Page::from_response(result, paging_state_response)
    }

    async fn batch(&self, batch: &ScyllaBatch, values: &[Arguments]) -> Result<Page, Error> {
        let session = self.get()?;
        trace!(
            statements = values.len(),
            batch_type = ?batch.get_type(),
            "Executing batch"
        );
        let result = session.batch(batch, values).await?;
        Page::from_response(result, PagingStateResponse::NoMorePages)
    }
}
