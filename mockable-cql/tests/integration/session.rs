use assert_matches::assert_matches;
use mockable_cql::{CqlValue, Error, RowMap, RowValues, Session};

use crate::utils::{connect, create_keyspace};

async fn create_users(session: &dyn Session, ks: &str) {
    session
        .exec(
            &format!("CREATE TABLE {ks}.users (id int PRIMARY KEY, name text)"),
            vec![],
        )
        .await
        .unwrap();
}

#[tokio::test]
#[ntest::timeout(60000)]
async fn scans_return_the_first_row() {
    let session = connect().await;
    let ks = create_keyspace(&session).await;
    create_users(&session, &ks).await;

    for (id, name) in [(1, "alex"), (2, "kim")] {
        session
            .exec(
                &format!("INSERT INTO {ks}.users (id, name) VALUES (?, ?)"),
                vec![Some(CqlValue::Int(id)), Some(CqlValue::Text(name.to_owned()))],
            )
            .await
            .unwrap();
    }

    let mut row = RowValues::new();
    session
        .scan(
            &format!("SELECT id, name FROM {ks}.users WHERE id = ?"),
            &mut row,
            vec![Some(CqlValue::Int(2))],
        )
        .await
        .unwrap();
    assert_eq!(
        row,
        vec![Some(CqlValue::Int(2)), Some(CqlValue::Text("kim".to_owned()))]
    );

    // Several rows match; only the first one is copied.
    let mut first = vec![None; 4];
    session
        .scan(&format!("SELECT name FROM {ks}.users"), &mut first, vec![])
        .await
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_matches!(first[0], Some(CqlValue::Text(_)));

    let mut map = RowMap::new();
    session
        .scan_map(
            &format!("SELECT id, name FROM {ks}.users WHERE id = ?"),
            &mut map,
            vec![Some(CqlValue::Int(1))],
        )
        .await
        .unwrap();
    assert_eq!(map["name"], Some(CqlValue::Text("alex".to_owned())));

    let mut rows = session
        .scan_map_slice(&format!("SELECT id, name FROM {ks}.users"), vec![])
        .await
        .unwrap();
    rows.sort_by_key(|row| match row["id"] {
        Some(CqlValue::Int(id)) => id,
        _ => i32::MAX,
    });
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["name"], Some(CqlValue::Text("kim".to_owned())));

    assert_matches!(
        session
            .scan_map(
                &format!("SELECT id, name FROM {ks}.users WHERE id = 3"),
                &mut RowMap::new(),
                vec![],
            )
            .await,
        Err(Error::NotFound)
    );
}

#[tokio::test]
#[ntest::timeout(60000)]
async fn null_columns_are_none() {
    let session = connect().await;
    let ks = create_keyspace(&session).await;
    create_users(&session, &ks).await;

    session
        .exec(
            &format!("INSERT INTO {ks}.users (id, name) VALUES (?, ?)"),
            vec![Some(CqlValue::Int(1)), None],
        )
        .await
        .unwrap();

    let mut map = RowMap::new();
    session
        .scan_map(&format!("SELECT name FROM {ks}.users WHERE id = 1"), &mut map, vec![])
        .await
        .unwrap();
    assert_eq!(map, RowMap::from([("name".to_owned(), None)]));
}

#[tokio::test]
#[ntest::timeout(60000)]
async fn lightweight_transactions_report_current_values() {
    let session = connect().await;
    let ks = create_keyspace(&session).await;
    create_users(&session, &ks).await;
    let insert = format!("INSERT INTO {ks}.users (id, name) VALUES (1, ?) IF NOT EXISTS");

    let mut current = RowMap::new();
    let applied = session
        .scan_map_tx(&insert, &mut current, vec![Some(CqlValue::Text("alex".to_owned()))])
        .await
        .unwrap();
    assert!(applied);
    assert!(current.is_empty());

    let applied = session
        .scan_map_tx(&insert, &mut current, vec![Some(CqlValue::Text("kim".to_owned()))])
        .await
        .unwrap();
    assert!(!applied);
    assert_eq!(current["name"], Some(CqlValue::Text("alex".to_owned())));
    assert!(!current.contains_key("[applied]"));

    assert_matches!(
        session
            .scan_map_tx(
                &format!("SELECT id FROM {ks}.users WHERE id = 1"),
                &mut RowMap::new(),
                vec![],
            )
            .await,
        Err(Error::NotConditional)
    );
}

#[tokio::test]
#[ntest::timeout(60000)]
async fn closed_session_rejects_operations() {
    let session = connect().await;
    let query = session.query("SELECT release_version FROM system.local", vec![]);
    let clone = session.clone();

    session.close();

    assert_matches!(
        clone
            .exec("SELECT release_version FROM system.local", vec![])
            .await,
        Err(Error::SessionClosed)
    );
    assert_matches!(query.exec().await, Err(Error::SessionClosed));
    assert_matches!(session.tables("system"), Err(Error::SessionClosed));
}
