use std::time::Duration;

use assert_matches::assert_matches;
use mockable_cql::{Consistency, CqlValue, Error, QueryExt as _, RowMap, RowValues, Session};

use crate::utils::{connect, create_keyspace};

#[tokio::test]
#[ntest::timeout(60000)]
async fn configured_query_can_be_executed_repeatedly() {
    let session = connect().await;
    let ks = create_keyspace(&session).await;
    session
        .exec(&format!("CREATE TABLE {ks}.kv (k int PRIMARY KEY, v bigint)"), vec![])
        .await
        .unwrap();

    let mut insert = session
        .query(
            &format!("INSERT INTO {ks}.kv (k, v) VALUES (?, ?)"),
            vec![Some(CqlValue::Int(1)), Some(CqlValue::BigInt(10))],
        )
        .consistency(Consistency::One)
        .request_timeout(Some(Duration::from_secs(10)));
    insert.exec().await.unwrap();
    insert.exec().await.unwrap();
    insert.release();
    assert_matches!(insert.exec().await, Err(Error::QueryReleased));

    let select = session
        .query(
            &format!("SELECT k, v FROM {ks}.kv WHERE k = ?"),
            vec![Some(CqlValue::Int(1))],
        )
        .consistency(Consistency::One);

    let mut row = RowValues::new();
    select.scan(&mut row).await.unwrap();
    assert_eq!(row, vec![Some(CqlValue::Int(1)), Some(CqlValue::BigInt(10))]);

    let mut map = RowMap::new();
    select.map_scan(&mut map).await.unwrap();
    assert_eq!(map["v"], Some(CqlValue::BigInt(10)));

    let mut iterator = select.iter().await;
    assert!(iterator.scan(&mut row).await);
    assert!(!iterator.scan(&mut row).await);
    iterator.close().unwrap();
}

#[tokio::test]
#[ntest::timeout(60000)]
async fn driver_errors_surface_on_close() {
    let session = connect().await;

    let mut iterator = session
        .scan_iterator("SELECT * FROM no_such_keyspace.no_such_table", vec![])
        .await;
    assert!(!iterator.scan_map(&mut RowMap::new()).await);
    assert_matches!(iterator.close(), Err(Error::Execution(_)));

    assert_matches!(
        session.exec("NOT A STATEMENT", vec![]).await,
        Err(Error::Execution(_))
    );
}
