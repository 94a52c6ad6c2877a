use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use competition_ingest::{
    config::aws_sdk_config, server, IngestConfig, Ingestor, S3BlobStore, SqsPublisher,
};
use gleam_client::GleamClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("competition_ingest=info".parse()?)
                .add_directive("gleam_client=info".parse()?),
        )
        .init();

    let config = IngestConfig::from_env()?;

    let gleam = GleamClient::with_timeout(config.fetch_timeout)?;
    let aws = aws_sdk_config().await;
    let publisher = Arc::new(SqsPublisher::from_sdk_config(
        &aws,
        config.persistor_queue_url.clone(),
    ));

    let mut ingestor = Ingestor::new(&config, gleam, publisher);
    if config.blacklist.is_some() {
        ingestor = ingestor.with_blob_store(Arc::new(S3BlobStore::from_sdk_config(&aws)));
    }

    let app = server::router(Arc::new(ingestor));

    let addr = format!("{}:{}", config.host, config.port);
    info!("Competition ingestor listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
