//! Correspondence builder entry point.
//!
//! Configured from the environment; exits non-zero when the build fails,
//! in which case nothing was committed.

use std::process::ExitCode;

use fluxredir_builder::{
    log_level_from_env, BuildResult, BuildReport, BuilderConfig, CorrespondenceBuilder,
    MySqlLegacySource,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("fluxredir-builder: {}", e);
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Correspondence build failed; nothing was committed");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let level = log_level_from_env()?;
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "fluxredir_builder={level},fluxredir_core={level},warn"
        ))
    })?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()?;
    Ok(())
}

async fn run() -> BuildResult<BuildReport> {
    let config = BuilderConfig::from_env()?;
    tracing::info!(
        fluxbb_host = %config.legacy.host,
        fluxbb_db = %config.legacy.database,
        discourse_host = %config.discourse.host,
        discourse_db = %config.discourse.dbname,
        schema = %config.schema.name(),
        reset = config.options.reset,
        allow_unmatched = config.options.allow_unmatched,
        "Starting correspondence build"
    );

    let source = MySqlLegacySource::from_config(&config.legacy)?;
    let pool = config.discourse.create_pool()?;
    let mut conn = pool.get().await?;
    let client: &mut tokio_postgres::Client = &mut conn;

    let builder = CorrespondenceBuilder::new(config.schema.clone(), config.options);
    let result = builder.run(client, &source).await;

    source.close().await;
    pool.close();
    result
}
