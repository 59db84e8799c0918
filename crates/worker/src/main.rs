use aesthete_core::EngineConfig;
use aesthete_pipeline::{AnalysisService, MemoryCacheStore, PipelineConfig};
use aesthete_worker::FileMeasurementProvider;
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: aesthete-worker <photo> <measurements.json> [locale]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aesthete_worker=debug,aesthete_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let photo_path = args.next().context(USAGE)?;
    let measurements_path = args.next().context(USAGE)?;
    let locale = args.next().unwrap_or_else(|| "en".to_string());

    let config = PipelineConfig::from_env()?;
    let engine = EngineConfig::standard()?;
    tracing::info!(
        upstream_timeout_secs = config.upstream_timeout_secs,
        schema_version = config.schema_version,
        "Worker starting",
    );

    let photo = tokio::fs::read(&photo_path)
        .await
        .with_context(|| format!("failed to read photo {photo_path}"))?;

    let service = AnalysisService::new(
        FileMeasurementProvider::new(measurements_path),
        MemoryCacheStore::new(),
        engine,
        config,
    );
    let options = service.default_options(&locale);

    let outcome = service.analyze(&photo, &options).await?;
    println!("{}", serde_json::to_string_pretty(&outcome.response)?);

    Ok(())
}
