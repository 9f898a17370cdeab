//! Runs the bundled fixtures end to end

use landed_batch::{BatchConfig, FailureReason, ItemOutcome};
use landed_cli::{apply_concurrency_override, load_catalog, load_products, price_all, run};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../testing/fixtures")
        .join(name)
}

#[test]
fn test_fixtures_load() {
    let catalog = load_catalog(&fixture("catalog.yaml")).unwrap();
    assert_eq!(catalog.batch.concurrency, 4);
    assert_eq!(catalog.engine.volumetric_divisor, 5000.0);
    assert_eq!(catalog.policies.len(), 2);

    let products = load_products(&fixture("products.json")).unwrap();
    assert_eq!(products.len(), 5);
}

#[test]
fn test_missing_file_names_path() {
    let err = load_catalog(&fixture("absent.yaml")).unwrap_err();
    assert!(format!("{:#}", err).contains("absent.yaml"));
}

#[tokio::test(start_paused = true)]
async fn test_fixture_batch() {
    let catalog = load_catalog(&fixture("catalog.yaml")).unwrap();
    let products = load_products(&fixture("products.json")).unwrap();
    let report = price_all(catalog, products, None).await.unwrap();

    assert_eq!(report.total, 5);
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.profitable, 2);

    match report.outcome("plush-au") {
        Some(ItemOutcome::Evaluated { ddp_result, profitable, .. }) => {
            assert!(*profitable);
            // JP→AU agreement: special rate of zero
            assert_eq!(ddp_result.duty_usd.value(), 0.0);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert_eq!(report.count(FailureReason::InsufficientProfit), 1);
    assert_eq!(report.unprofitable_records()[0].product_id, "figure-suggested");
    assert_eq!(report.count(FailureReason::NoMatchingPolicy), 1);
    // Missing hs_code is rejected at the record boundary
    assert_eq!(report.count(FailureReason::CalculationError), 1);
}

#[tokio::test(start_paused = true)]
async fn test_run_reads_both_files() {
    let report = run(&fixture("catalog.yaml"), &fixture("products.json")).await.unwrap();
    assert_eq!(report.total, 5);
}

#[tokio::test(start_paused = true)]
async fn test_bad_override_rejected() {
    let catalog = load_catalog(&fixture("catalog.yaml")).unwrap();
    let products = load_products(&fixture("products.json")).unwrap();
    assert!(price_all(catalog, products, Some("many")).await.is_err());
}

#[test]
fn test_concurrency_override() {
    let mut config = BatchConfig::default();
    apply_concurrency_override(&mut config, None).unwrap();
    assert_eq!(config.concurrency, 5);

    apply_concurrency_override(&mut config, Some(" 12 ")).unwrap();
    assert_eq!(config.concurrency, 12);

    assert!(apply_concurrency_override(&mut config, Some("0")).is_err());
    assert!(apply_concurrency_override(&mut config, Some("-3")).is_err());
}
