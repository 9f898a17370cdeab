//! Landed CLI: price a product list against a catalog file
use anyhow::{bail, Context, Result};
use landed_batch::{BatchConfig, BatchReport, BatchRunner, CallCounter, CatalogFile, InMemorySource};
use landed_core::RawProductRecord;
use landed_stages::PricingEngine;
use std::path::Path;
use std::sync::Arc;

/// Overrides `batch.concurrency` from the catalog file
pub const CONCURRENCY_ENV: &str = "LANDED_CONCURRENCY";

pub fn load_catalog(path: &Path) -> Result<CatalogFile> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    CatalogFile::from_yaml(&yaml).with_context(|| format!("parsing catalog {}", path.display()))
}

pub fn load_products(path: &Path) -> Result<Vec<RawProductRecord>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading products {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing products {}", path.display()))
}

/// Apply a `LANDED_CONCURRENCY` value, if one was set
pub fn apply_concurrency_override(config: &mut BatchConfig, value: Option<&str>) -> Result<()> {
    let Some(raw) = value else {
        return Ok(());
    };
    let concurrency: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be a positive integer, got {:?}", CONCURRENCY_ENV, raw))?;
    if concurrency == 0 {
        bail!("{} must be at least 1", CONCURRENCY_ENV);
    }
    config.concurrency = concurrency;
    Ok(())
}

/// Evaluate every product in `products` against `catalog`.
pub async fn price_all(
    catalog: CatalogFile,
    products: Vec<RawProductRecord>,
    concurrency: Option<&str>,
) -> Result<BatchReport> {
    let (engine, mut batch, catalog) = catalog.into_parts()?;
    apply_concurrency_override(&mut batch, concurrency)?;

    let ids: Vec<String> = products.iter().map(|p| p.product_id.clone()).collect();
    let source = InMemorySource::new(products);
    let counter = batch
        .rate_limit
        .map(|limit| Arc::new(CallCounter::new(limit.max_calls, std::time::Duration::from_millis(limit.window_ms))));

    let mut runner = BatchRunner::new(
        Arc::new(PricingEngine::new(engine)),
        Arc::new(catalog),
        Arc::new(source),
        batch,
    );
    if let Some(counter) = counter {
        runner = runner.with_call_counter(counter);
    }

    let report = runner
        .run_with_progress(ids, |p| {
            tracing::debug!(completed = p.completed, total = p.total, failed = p.failed, "progress")
        })
        .await;
    Ok(report)
}

pub async fn run(catalog_path: &Path, products_path: &Path) -> Result<BatchReport> {
    let catalog = load_catalog(catalog_path)?;
    let products = load_products(products_path)?;
    tracing::info!(products = products.len(), catalog = %catalog_path.display(), "loaded inputs");

    let concurrency = std::env::var(CONCURRENCY_ENV).ok();
    price_all(catalog, products, concurrency.as_deref()).await
}
