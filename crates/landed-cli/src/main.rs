//! Binary entrypoint: `landed-cli <catalog.yaml> <products.json>`
use anyhow::{bail, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [catalog, products] = args.as_slice() else {
        bail!("usage: landed-cli <catalog.yaml> <products.json>");
    };

    let report = landed_cli::run(&PathBuf::from(catalog), &PathBuf::from(products)).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
