//! Expectation-driven doubles of the capability traits.
//!
//! Code written against `dyn Session` can be unit-tested without a cluster
//! by programming a [`MockSession`] to hand out [`MockQuery`],
//! [`MockRowIterator`] and [`MockBatch`] objects.
//! See `demos/mocking.rs` for a complete walkthrough.
#![allow(missing_docs)]

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use scylla::cluster::metadata::ColumnType;
use scylla::statement::Consistency;

use crate::batch::{Batch, BatchKind};
use crate::errors::Error;
use crate::iterator::RowIterator;
use crate::query::Query;
use crate::session::Session;
use crate::value::{Arguments, PageState, RowMap, RowValues};

mock! {
    pub Session {}

    #[async_trait]
    impl Session for Session {
        fn batch(&self, kind: BatchKind) -> Box<dyn Batch>;
        fn close(&self);
        fn columns(&self, keyspace: &str, table: &str)
            -> Result<HashMap<String, ColumnType<'static>>, Error>;
        async fn exec(&self, statement: &str, arguments: Arguments) -> Result<(), Error>;
        async fn scan(
            &self,
            statement: &str,
            results: &mut RowValues,
            arguments: Arguments,
        ) -> Result<(), Error>;
        async fn scan_iterator(&self, statement: &str, arguments: Arguments) -> Box<dyn RowIterator>;
        async fn scan_map(
            &self,
            statement: &str,
            results: &mut RowMap,
            arguments: Arguments,
        ) -> Result<(), Error>;
        async fn scan_map_slice(&self, statement: &str, arguments: Arguments)
            -> Result<Vec<RowMap>, Error>;
        async fn scan_map_tx(
            &self,
            statement: &str,
            results: &mut RowMap,
            arguments: Arguments,
        ) -> Result<bool, Error>;
        fn tables(&self, keyspace: &str) -> Result<Vec<String>, Error>;
        fn query(&self, statement: &str, arguments: Arguments) -> Box<dyn Query>;
    }
}

mock! {
    pub Query {}

    #[async_trait]
    impl Query for Query {
        fn set_consistency(&mut self, consistency: Consistency);
        fn set_page_size(&mut self, page_size: i32);
        fn set_request_timeout(&mut self, timeout: Option<Duration>);
        fn set_page_state(&mut self, state: PageState);
        async fn exec(&self) -> Result<(), Error>;
        async fn iter(&self) -> Box<dyn RowIterator>;
        async fn map_scan(&self, results: &mut RowMap) -> Result<(), Error>;
        async fn scan(&self, results: &mut RowValues) -> Result<(), Error>;
        fn release(&mut self);
    }
}

mock! {
    pub RowIterator {}

    #[async_trait]
    impl RowIterator for RowIterator {
        async fn scan(&mut self, results: &mut RowValues) -> bool;
        async fn scan_map(&mut self, results: &mut RowMap) -> bool;
        fn will_switch_page(&self) -> bool;
        fn page_state(&self) -> PageState;
        async fn slice_map(&mut self) -> Result<Vec<RowMap>, Error>;
        fn close(&mut self) -> Result<(), Error>;
    }
}

mock! {
    pub Batch {}

    #[async_trait]
    impl Batch for Batch {
        fn add(&mut self, statement: &str, arguments: Arguments);
        async fn exec(&self) -> Result<(), Error>;
        async fn exec_tx(&self) -> Result<Vec<RowMap>, Error>;
    }
}
