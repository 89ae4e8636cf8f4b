use assert_matches::assert_matches;
use mockable_cql::{Error, Session};
use scylla::cluster::metadata::{ColumnType, NativeType};

use crate::utils::{connect, create_keyspace, refresh_schema};

#[tokio::test]
#[ntest::timeout(60000)]
async fn tables_and_columns_describe_the_schema() {
    let session = connect().await;
    let ks = create_keyspace(&session).await;
    session
        .exec(&format!("CREATE TABLE {ks}.users (id int PRIMARY KEY, name text)"), vec![])
        .await
        .unwrap();
    session
        .exec(&format!("CREATE TABLE {ks}.events (id bigint PRIMARY KEY)"), vec![])
        .await
        .unwrap();
    refresh_schema(&session).await;

    assert_eq!(session.tables(&ks).unwrap(), vec!["events", "users"]);

    let columns = session.columns(&ks, "users").unwrap();
    assert_eq!(columns.len(), 2);
    assert_matches!(columns["id"], ColumnType::Native(NativeType::Int));
    assert_matches!(columns["name"], ColumnType::Native(NativeType::Text));

    assert_matches!(
        session.columns(&ks, "missing"),
        Err(Error::InvalidTable { keyspace, table }) if keyspace == ks && table == "missing"
    );
}

#[tokio::test]
#[ntest::timeout(60000)]
async fn missing_keyspace_is_invalid() {
    let session = connect().await;

    assert_matches!(
        session.tables("no_such_keyspace"),
        Err(Error::InvalidKeyspace(ks)) if ks == "no_such_keyspace"
    );
    assert_matches!(
        session.columns("no_such_keyspace", "t"),
        Err(Error::InvalidKeyspace(_))
    );
}
