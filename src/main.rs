//! Baby Checklist Entry Point
//!
//! Loads the checklist from the configured store and prints it.
//! `--memory` runs against an in-process store seeded with nothing.

use std::path::PathBuf;
use std::sync::Arc;

use baby_checklist::{
    AppConfig, AutosaveController, AutosaveSettings, HttpRecordStore, MemoryRecordStore,
    RecordStore, ReconcileStrategy,
};

fn log_dir() -> PathBuf {
    match std::env::var("CHECKLIST_LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => std::env::temp_dir().join("baby-checklist"),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = rolling_logger::init_logger(log_dir(), "BabyChecklist") {
        eprintln!("Logger init failed: {}", e);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = AppConfig::from_env();
    let store: Arc<dyn RecordStore> = if args.iter().any(|a| a == "--memory") {
        log::info!("Using in-memory store");
        Arc::new(MemoryRecordStore::new())
    } else {
        log::info!(
            "Using {} ({} data, {:?})",
            config.collection_url(),
            config.data_source.as_str(),
            config.environment
        );
        Arc::new(HttpRecordStore::new(config))
    };

    let mut settings = AutosaveSettings::default();
    if args.iter().any(|a| a == "--headers") {
        settings.strategy = ReconcileStrategy::with_default_headers();
    }

    let controller = AutosaveController::new(store, settings);
    let connection = controller.load().await;
    let snapshot = controller.snapshot().await;

    for item in snapshot.items() {
        if item.is_header() {
            println!("\n{}", item.item);
        } else {
            let mark = if item.completed { "x" } else { " " };
            println!(
                "  [{}] {:<40} {:<8} {:<14} {}",
                mark,
                item.item,
                item.priority.as_str(),
                item.status.as_str(),
                item.estimated_cost
            );
        }
    }

    let items = snapshot.items().filter(|i| !i.is_header()).count();
    log::info!("Loaded {} items ({:?})", items, connection);
    let _ = rolling_logger::info(&format!("Checklist ready: {} items, {:?}", items, connection));
}
