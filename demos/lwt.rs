use anyhow::Result;
use mockable_cql::{new_simple_session, BatchKind, CqlValue, RowMap, Session};
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let uri = env::var("SCYLLA_URI").unwrap_or_else(|_| "127.0.0.1:9042".to_string());
    info!("Connecting to {} ...", uri);
    let session = new_simple_session([uri]).await?;

    session.exec("CREATE KEYSPACE IF NOT EXISTS examples_ks WITH REPLICATION = {'class' : 'SimpleStrategy', 'replication_factor' : 1}", vec![]).await?;
    session
        .exec(
            "CREATE TABLE IF NOT EXISTS examples_ks.lwt (id int, seq int, owner text, primary key (id, seq))",
            vec![],
        )
        .await?;

    let claim = "INSERT INTO examples_ks.lwt (id, seq, owner) VALUES (1, 1, ?) IF NOT EXISTS";
    for owner in ["alex", "kim"] {
        let mut current = RowMap::new();
        let applied = session
            .scan_map_tx(
                claim,
                &mut current,
                vec![Some(CqlValue::Text(owner.to_owned()))],
            )
            .await?;
        if applied {
            println!("{owner} claimed the row");
        } else {
            println!("{owner} lost, the row belongs to {:?}", current["owner"]);
        }
    }

    // Conditional batches must stay within one partition.
    let mut batch = session.batch(BatchKind::Logged);
    batch.add(
        "INSERT INTO examples_ks.lwt (id, seq, owner) VALUES (1, 2, 'kim') IF NOT EXISTS",
        vec![],
    );
    batch.add(
        "UPDATE examples_ks.lwt SET owner = 'kim' WHERE id = 1 AND seq = 1 IF owner = 'kim'",
        vec![],
    );
    let current = batch.exec_tx().await?;
    if current.is_empty() {
        println!("Batch applied");
    } else {
        for row in current {
            println!("Batch not applied, current row: {:?}", row);
        }
    }

    let tables = session.tables("examples_ks")?;
    println!("Tables of examples_ks: {:?}", tables);
    println!("Columns of examples_ks.lwt: {:?}", session.columns("examples_ks", "lwt")?);

    session.close();
    println!("Ok.");

    Ok(())
}
