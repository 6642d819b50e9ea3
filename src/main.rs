use anyhow::Context;
use clap::Parser;
use shardkv::config::{ClusterConfig, NodeArgs};
use shardkv::router::{ShardRouter, build_router};
use shardkv::storage::{DiskEngine, MemoryEngine, StorageEngine};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = NodeArgs::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    // 1. Shard table:
    let config = ClusterConfig::load(&args.config_file)
        .with_context(|| format!("Error parsing config {}", args.config_file.display()))?;
    let table = config
        .shard_table(&args.shard)
        .context("Error parsing shards config")?;

    tracing::info!(
        "Shard {:?} is index {} of {}",
        table.current_name(),
        table.current_index(),
        table.count()
    );
    for idx in 0..table.count() {
        tracing::info!("  - shard {} at {}", idx, table.address_of(idx).unwrap_or("?"));
    }

    // 2. Storage layer:
    let storage: Arc<dyn StorageEngine> = match (&args.db_path, args.in_memory) {
        (_, true) => {
            tracing::warn!("Running in memory: data will not survive a restart");
            Arc::new(MemoryEngine::new())
        }
        (Some(path), false) => Arc::new(
            DiskEngine::open(path)
                .with_context(|| format!("Could not open database {}", path.display()))?,
        ),
        (None, false) => anyhow::bail!("Must provide --db-path or --in-memory"),
    };

    // 3. HTTP Router:
    let forward_timeout = args.forward_timeout(&config);
    tracing::info!("Forwarding timeout: {:?}", forward_timeout);
    let router = Arc::new(ShardRouter::new(table, storage, forward_timeout));
    let app = build_router(router);

    // 4. Start HTTP server:
    tracing::info!("Starting server at http://{}", args.http_addr);
    let listener = tokio::net::TcpListener::bind(args.http_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
