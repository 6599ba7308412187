use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::{env, fs};

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use contextdb_chunk::strategy::StrategyPolicy;
use contextdb_core::config::{expand_path, Config};
use contextdb_core::settings::{KEY_DIMENSION, KEY_MODEL, KEY_PROVIDER};
use contextdb_core::traits::{DocumentRepository, SettingsStore};
use contextdb_core::types::{Document, DocumentStatus};
use contextdb_core::Result;
use contextdb_embed::BackendFactory;
use contextdb_index::QdrantIndex;
use contextdb_pipeline::LifecycleManager;

/// Embedding settings from `CONTEXTDB_EMBEDDING_*` env vars, defaulting to
/// the deterministic stub backend so the CLI works with no services up.
struct EnvSettings;

#[async_trait]
impl SettingsStore for EnvSettings {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let var = format!("CONTEXTDB_{}", key.to_uppercase());
        if let Ok(value) = env::var(&var) {
            return Ok(Some(value));
        }
        Ok(match key {
            k if k == KEY_PROVIDER => Some("stub".to_string()),
            k if k == KEY_MODEL => Some("stub".to_string()),
            k if k == KEY_DIMENSION => Some("384".to_string()),
            _ => None,
        })
    }
}

/// The real persistence layer belongs to the host application; the CLI just
/// mirrors statuses in memory so the summary can report them.
#[derive(Default)]
struct InMemoryRepository {
    statuses: Mutex<HashMap<String, DocumentStatus>>,
}

#[async_trait]
impl DocumentRepository for InMemoryRepository {
    async fn update_status(&self, document_id: &str, status: DocumentStatus) -> Result<()> {
        self.statuses
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(document_id.to_string(), status);
        Ok(())
    }

    async fn update_chunk_count(&self, _document_id: &str, _chunk_count: usize) -> Result<()> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(dir) = args.iter().find(|a| !a.starts_with('-')) else {
        eprintln!("Usage: contextdb-ingest <directory>");
        eprintln!("Ingests every .txt/.md file under <directory> into the vector index.");
        std::process::exit(1);
    };
    let dir = expand_path(dir);

    let config = Config::load()?;
    let repository = Arc::new(InMemoryRepository::default());
    let manager = Arc::new(LifecycleManager::new(
        Arc::new(EnvSettings),
        Arc::new(BackendFactory::new(config.embedding.clone())),
        Arc::new(QdrantIndex::new(&config.index)?),
        Arc::clone(&repository) as Arc<dyn DocumentRepository>,
        StrategyPolicy::from_config(&config.chunking),
        Duration::from_secs(config.ingest.deadline_secs),
    ));

    let mut documents = Vec::new();
    for entry in WalkDir::new(&dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        let is_text = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("txt") | Some("md")
        );
        if !entry.file_type().is_file() || !is_text {
            continue;
        }
        let content = fs::read_to_string(path)?;
        let id = path.to_string_lossy().to_string();
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| id.clone());
        documents.push(Document::new(id, title, content));
    }
    if documents.is_empty() {
        println!("No .txt or .md files found under {}", dir.display());
        return Ok(());
    }

    println!("contextdb-ingest");
    println!("================");
    println!("Directory: {}", dir.display());
    println!("Documents: {}", documents.len());

    let bar = ProgressBar::new(documents.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} {msg}",
    )?);

    let mut indexed = 0usize;
    let mut chunks = 0usize;
    let mut failed = 0usize;
    for document in documents {
        bar.set_message(document.title.clone());
        match manager.process(&document).await {
            Ok(report) => {
                indexed += 1;
                chunks += report.chunk_count;
            }
            Err(e) => {
                failed += 1;
                bar.println(format!("failed: {} ({e})", document.title));
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!("\nIndexed {indexed} documents ({chunks} chunks), {failed} failed");
    println!("To search: cargo run --bin contextdb-search '<query>' {}", dir.display());
    Ok(())
}
