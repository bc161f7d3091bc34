use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kabar_cluster::embedder::Embedder;
use kabar_cluster::ClusterEngine;
use kabar_common::Config;
use kabar_store::{migrate, PgNewsStore};

/// Assign news articles to issues by embedding similarity.
#[derive(Parser)]
#[command(name = "kabar-cluster")]
struct Args {
    /// News ids to cluster, processed in the given order.
    #[arg(required = true)]
    news_ids: Vec<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("kabar_cluster=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    config.log_redacted();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await?;
    migrate::migrate(&pool).await?;

    let store = PgNewsStore::new(pool);
    let embedder = Embedder::new(&config);
    let engine = ClusterEngine::new(store, embedder);

    let outcomes = engine.cluster(&args.news_ids).await?;
    for outcome in &outcomes {
        info!(
            news_id = outcome.news_id,
            issue_id = outcome.issue_id,
            mode = %outcome.mode,
            similarity = outcome.similarity,
            "Clustered"
        );
    }
    info!(
        requested = args.news_ids.len(),
        clustered = outcomes.len(),
        skipped = args.news_ids.len() - outcomes.len(),
        "Done"
    );

    Ok(())
}
