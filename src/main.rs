//! Command-line entry point: scans one screenshot and prints the extracted
//! records as JSON lines, one per completed event.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use gearscan::catalog::Catalog;
use gearscan::config::ScanConfig;
use gearscan::error::ScanError;
use gearscan::ocr::tesseract::TesseractEngine;
use gearscan::pipeline::{Orchestrator, ScanEvent};

#[derive(Parser, Debug)]
#[command(
    name = "gearscan",
    about = "Extract equipment stats from game screenshots"
)]
struct Args {
    /// Screenshot to scan
    image: PathBuf,

    /// Scan configuration (JSON); defaults are used when absent
    #[arg(long, default_value = "gearscan.json")]
    config: PathBuf,

    /// Item/character/weapon catalog (JSON)
    #[arg(long, default_value = "catalog.json")]
    catalog: PathBuf,

    /// Tesseract executable to invoke
    #[arg(long, default_value = "tesseract")]
    tesseract: PathBuf,

    /// Verbose pipeline logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        "gearscan=debug"
    } else {
        "gearscan=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .init();

    let img = image::open(&args.image)
        .map_err(|_| ScanError::NotAnImage(args.image.display().to_string()))?
        .to_rgba8();

    let catalog = Catalog::from_json_file(&args.catalog)
        .with_context(|| format!("loading catalog {}", args.catalog.display()))?;
    let config = ScanConfig::load_or_default(&args.config);

    let engine = Arc::new(TesseractEngine::with_executable(args.tesseract));
    let orchestrator = Orchestrator::new(engine, Arc::new(catalog), config);

    let (mut events, handle) = orchestrator.scan(img);
    while let Some(event) = events.recv().await {
        match event {
            ScanEvent::Slot(slot) => {
                let line = serde_json::json!({
                    "slot": slot.slot_index,
                    "item": slot.item,
                });
                println!("{line}");
            }
            ScanEvent::Character { name } => {
                println!("{}", serde_json::json!({ "character": name }));
            }
            ScanEvent::Weapon { name } => {
                println!("{}", serde_json::json!({ "weapon": name }));
            }
        }
    }
    handle.join().await;

    Ok(())
}
