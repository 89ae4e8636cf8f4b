use assert_matches::assert_matches;
use mockable_cql::{BatchKind, CqlValue, Error, RowMap, Session};

use crate::utils::{connect, create_keyspace};

#[tokio::test]
#[ntest::timeout(60000)]
async fn logged_batch_applies_every_statement() {
    let session = connect().await;
    let ks = create_keyspace(&session).await;
    session
        .exec(&format!("CREATE TABLE {ks}.users (id int PRIMARY KEY, name text)"), vec![])
        .await
        .unwrap();

    let mut batch = session.batch(BatchKind::Logged);
    batch.add(
        &format!("INSERT INTO {ks}.users (id, name) VALUES (?, ?)"),
        vec![Some(CqlValue::Int(1)), Some(CqlValue::Text("alex".to_owned()))],
    );
    batch.add(&format!("INSERT INTO {ks}.users (id, name) VALUES (2, 'kim')"), vec![]);
    batch.exec().await.unwrap();

    let rows = session
        .scan_map_slice(&format!("SELECT id FROM {ks}.users"), vec![])
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
#[ntest::timeout(60000)]
async fn counter_batch_updates_counters() {
    let session = connect().await;
    let ks = create_keyspace(&session).await;
    session
        .exec(&format!("CREATE TABLE {ks}.hits (id int PRIMARY KEY, n counter)"), vec![])
        .await
        .unwrap();

    let mut batch = session.batch(BatchKind::Counter);
    for _ in 0..3 {
        batch.add(&format!("UPDATE {ks}.hits SET n = n + 1 WHERE id = 1"), vec![]);
    }
    batch.exec().await.unwrap();

    let mut row = RowMap::new();
    session
        .scan_map(&format!("SELECT n FROM {ks}.hits WHERE id = 1"), &mut row, vec![])
        .await
        .unwrap();
    assert_eq!(row["n"], Some(CqlValue::Counter(scylla::value::Counter(3))));
}

#[tokio::test]
#[ntest::timeout(60000)]
async fn conditional_batch_reports_current_values() {
    let session = connect().await;
    let ks = create_keyspace(&session).await;
    session
        .exec(
            &format!("CREATE TABLE {ks}.t (p int, c int, v text, PRIMARY KEY (p, c))"),
            vec![],
        )
        .await
        .unwrap();
    let insert = format!("INSERT INTO {ks}.t (p, c, v) VALUES (0, ?, ?) IF NOT EXISTS");

    let mut batch = session.batch(BatchKind::Logged);
    batch.add(&insert, vec![Some(CqlValue::Int(1)), Some(CqlValue::Text("a".to_owned()))]);
    assert_eq!(batch.exec_tx().await.unwrap(), Vec::<RowMap>::new());

    let mut batch = session.batch(BatchKind::Logged);
    batch.add(&insert, vec![Some(CqlValue::Int(1)), Some(CqlValue::Text("b".to_owned()))]);
    let current = batch.exec_tx().await.unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0]["v"], Some(CqlValue::Text("a".to_owned())));
    assert!(!current[0].contains_key("[applied]"));

    let mut batch = session.batch(BatchKind::Unlogged);
    batch.add(&format!("INSERT INTO {ks}.t (p, c, v) VALUES (0, 2, 'c')"), vec![]);
    assert_matches!(batch.exec_tx().await, Err(Error::NotFound));
}
