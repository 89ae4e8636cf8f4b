use std::sync::Arc;

use anyhow::Result;
use futures::future::try_join_all;
use mockable_cql::{
    ClusterConfig, CqlValue, PageState, QueryExt as _, RowMap, RowValues, Session,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = ClusterConfig::from_env();
    info!("Connecting to {:?} ...", config.hosts());
    let session: Arc<dyn Session> = Arc::new(config.connect().await?);

    session.exec("CREATE KEYSPACE IF NOT EXISTS examples_ks WITH REPLICATION = {'class' : 'SimpleStrategy', 'replication_factor' : 1}", vec![]).await?;
    session
        .exec(
            "CREATE TABLE IF NOT EXISTS examples_ks.select_paging (a int, b int, c text, primary key (a, b))",
            vec![],
        )
        .await?;

    // Sessions are shared between tasks behind an Arc.
    try_join_all((0..16_i32).map(|i| {
        let session = Arc::clone(&session);
        async move {
            session
                .exec(
                    "INSERT INTO examples_ks.select_paging (a, b, c) VALUES (?, ?, 'abc')",
                    vec![Some(CqlValue::Int(i)), Some(CqlValue::Int(2 * i))],
                )
                .await
        }
    }))
    .await?;

    // Iterate through select result with automatic paging
    let mut iterator = session
        .query("SELECT a, b, c FROM examples_ks.select_paging", vec![])
        .page_size(5)
        .iter()
        .await;
    let mut row = RowMap::new();
    while iterator.scan_map(&mut row).await {
        println!("a, b, c: {:?}, {:?}, {:?}", row["a"], row["b"], row["c"]);
        if iterator.will_switch_page() {
            println!("-- fetching the next page --");
        }
    }
    iterator.close()?;

    // Fetch one page at a time, resuming from the returned paging state
    let mut state = PageState::start();
    loop {
        let query = session
            .query("SELECT a, b, c FROM examples_ks.select_paging", vec![])
            .page_size(6)
            .page_state(state);
        let mut iterator = query.iter().await;
        let mut row = RowValues::new();
        let mut rows = 0;
        while iterator.scan(&mut row).await {
            rows += 1;
        }
        state = iterator.page_state();
        iterator.close()?;
        println!("Paging state: {:?} ({} rows)", state, rows);
        if state.is_empty() {
            break;
        }
    }

    let everything = session
        .scan_map_slice("SELECT a FROM examples_ks.select_paging", vec![])
        .await?;
    println!("{} rows in total", everything.len());

    session.close();
    println!("Ok.");

    Ok(())
}
