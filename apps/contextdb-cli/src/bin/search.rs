use std::sync::Arc;
use std::{env, fs};

use async_trait::async_trait;
use walkdir::WalkDir;

use contextdb_core::config::{expand_path, Config};
use contextdb_core::settings::{KEY_DIMENSION, KEY_MODEL, KEY_PROVIDER};
use contextdb_core::traits::SettingsStore;
use contextdb_core::types::{Document, DocumentStatus};
use contextdb_core::Result;
use contextdb_embed::BackendFactory;
use contextdb_index::QdrantIndex;
use contextdb_retrieve::RetrievalEngine;

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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with('-')).collect();
    if positional.len() < 2 {
        eprintln!("Usage: contextdb-search <query> <directory> [--limit N] [--hybrid]");
        eprintln!("Searches documents previously ingested from <directory>.");
        std::process::exit(1);
    }
    let query = positional[0];
    let dir = expand_path(positional[1]);
    let hybrid = args.iter().any(|a| a == "--hybrid");
    let mut limit = 5usize;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--limit" {
            match args.get(i + 1).and_then(|v| v.parse().ok()) {
                Some(n) => {
                    limit = n;
                    i += 1;
                }
                None => {
                    eprintln!("Error: --limit requires a number");
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    // Scope mirrors what contextdb-ingest indexed from the same directory.
    let mut scope = Vec::new();
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
        let mut document = Document::new(id, title, content);
        document.status = DocumentStatus::Ready;
        scope.push(document);
    }

    let config = Config::load()?;
    let engine = RetrievalEngine::new(
        Arc::new(EnvSettings),
        Arc::new(BackendFactory::new(config.embedding.clone())),
        Arc::new(QdrantIndex::new(&config.index)?),
        config.retrieval.clone(),
    );

    let context = if hybrid {
        engine.retrieve_hybrid(query, &scope, limit).await?
    } else {
        engine.retrieve(query, &scope, limit).await?
    };

    if context.augmented {
        println!("{}", context.prompt);
        println!("\nSources:");
        for title in &context.citations {
            println!("  - {title}");
        }
    } else {
        println!("No relevant context found; query passed through unchanged:");
        println!("{}", context.prompt);
    }
    Ok(())
}
