use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use mockable_cql::{ClusterConfig, DriverSession, Session};

pub(crate) fn setup_tracing() {
    let _ = tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(tracing_subscriber::fmt::TestWriter::new())
        .try_init();
}

static UNIQUE_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub(crate) fn unique_keyspace_name() -> String {
    let cnt = UNIQUE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let name = format!(
        "test_mockable_{}_{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs(),
        cnt
    );
    println!("Unique name: {}", name);
    name
}

/// Connects to the cluster at `SCYLLA_URI`.
pub(crate) async fn connect() -> DriverSession {
    setup_tracing();
    ClusterConfig::from_env()
        .connection_timeout(Duration::from_secs(3))
        .connect()
        .await
        .expect("Failed to connect to the cluster at SCYLLA_URI")
}

/// Creates a fresh keyspace and returns its name.
pub(crate) async fn create_keyspace(session: &DriverSession) -> String {
    let ks = unique_keyspace_name();
    session
        .exec(
            &format!(
                "CREATE KEYSPACE IF NOT EXISTS {ks} WITH REPLICATION = \
                 {{'class' : 'SimpleStrategy', 'replication_factor' : 1}}"
            ),
            vec![],
        )
        .await
        .unwrap();
    ks
}

/// Makes the driver's schema snapshot reflect the DDL executed so far.
pub(crate) async fn refresh_schema(session: &DriverSession) {
    session
        .driver_session()
        .unwrap()
        .refresh_metadata()
        .await
        .unwrap();
}
