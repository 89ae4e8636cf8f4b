//! Unit testing code that talks to a cluster, without a cluster.
//!
//! `count_owners` only knows about `dyn Session`, so it runs the same
//! against a live `DriverSession` and against the `MockSession` below.

use anyhow::Result;
use mockable_cql::mock::{MockRowIterator, MockSession};
use mockable_cql::{CqlValue, Error, RowIterator, RowMap, Session};
use mockall::Sequence;
use std::collections::HashMap;

async fn count_owners(session: &dyn Session) -> Result<HashMap<String, usize>, Error> {
    let mut iterator = session
        .scan_iterator("SELECT owner FROM examples_ks.lwt", vec![])
        .await;
    let mut counts = HashMap::new();
    let mut row = RowMap::new();
    while iterator.scan_map(&mut row).await {
        if let Some(Some(CqlValue::Text(owner))) = row.get("owner") {
            *counts.entry(owner.clone()).or_default() += 1;
        }
    }
    iterator.close()?;
    Ok(counts)
}

fn owner_rows(owners: &'static [&'static str]) -> MockRowIterator {
    let mut seq = Sequence::new();
    let mut iterator = MockRowIterator::new();
    for owner in owners {
        iterator
            .expect_scan_map()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |row| {
                row.insert("owner".to_owned(), Some(CqlValue::Text(owner.to_string())));
                true
            });
    }
    iterator
        .expect_scan_map()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| false);
    iterator
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut iterator = owner_rows(&["alex", "kim", "alex"]);
    iterator.expect_close().times(1).returning(|| Ok(()));

    let mut session = MockSession::new();
    session
        .expect_scan_iterator()
        .withf(|statement, _| statement.starts_with("SELECT owner"))
        .return_once(move |_, _| Box::new(iterator) as Box<dyn RowIterator>);

    let counts = count_owners(&session).await?;
    assert_eq!(counts["alex"], 2);
    assert_eq!(counts["kim"], 1);
    println!("Owners: {:?}", counts);

    // Failures met while paging are reported by close.
    let mut iterator = owner_rows(&[]);
    iterator
        .expect_close()
        .times(1)
        .returning(|| Err(Error::SessionClosed));
    let mut session = MockSession::new();
    session
        .expect_scan_iterator()
        .return_once(move |_, _| Box::new(iterator) as Box<dyn RowIterator>);

    let err = count_owners(&session).await.unwrap_err();
    println!("Failed as expected: {}", err);

    Ok(())
}
