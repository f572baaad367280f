use anyhow::Context;
use clap::Parser;
use profile_engine::utils::{logger, validation::Validate};
use profile_engine::{
    AppConfig, CliConfig, EventDispatcher, InMemoryReviewStore, InMemoryStudentStore,
    InMemoryTagStore, LoggingPublisher, StudentService,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting profile-engine");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let store = InMemoryStudentStore::from_json_file(&cli.students)
        .with_context(|| format!("failed to load students from {}", cli.students.display()))?;
    if store.is_empty().await {
        tracing::warn!("⚠️ No students loaded from {}", cli.students.display());
    }

    let (dispatcher, handle) = EventDispatcher::start(
        Arc::new(LoggingPublisher::new()),
        &config.broker,
        &config.dispatcher,
    );
    let service = StudentService::new(
        Arc::new(store),
        Arc::new(InMemoryReviewStore::default()),
        Arc::new(InMemoryTagStore::default()),
        dispatcher,
        &config.service,
    );

    let result = service.recommended_teammates(&cli.student_id).await;

    drop(service);
    handle.join().await;

    let teammates = match result {
        Ok(teammates) => teammates,
        Err(e) => {
            tracing::error!("❌ Recommendation failed: {} ({:?})", e, e.kind());
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };

    println!("Recommended teammates for {}:", cli.student_id);
    if teammates.is_empty() {
        println!("  (none)");
    }
    for (rank, teammate) in teammates.iter().enumerate() {
        println!(
            "  {}. {} {} <{}> [{}]",
            rank + 1,
            teammate.first_name,
            teammate.last_name,
            teammate.email,
            teammate.id
        );
    }

    Ok(())
}
