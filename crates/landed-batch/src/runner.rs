//! Bounded-concurrency batch evaluation
//!
//! Every item takes a semaphore permit, fetches its record (retrying
//! transient errors with exponential backoff), and is evaluated by the
//! shared engine, all under one per-item timeout. Outcomes are collected
//! as tasks finish and keyed by product id.

use crate::cancel::CancelHandle;
use crate::catalog::PricingCatalog;
use crate::config::BatchConfig;
use crate::limiter::CallCounter;
use crate::report::{BatchProgress, BatchReport, FailureReason, ItemOutcome};
use crate::source::{ProductSource, SourceError};
use chrono::Utc;
use landed_core::ProductFacts;
use landed_stages::PricingEngine;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub struct BatchRunner<S> {
    engine: Arc<PricingEngine>,
    catalog: Arc<PricingCatalog>,
    source: Arc<S>,
    config: BatchConfig,
    counter: Option<Arc<CallCounter>>,
    cancel: CancelHandle,
}

/// Everything one item task needs, cloned per task
struct ItemJob<S> {
    product_id: String,
    engine: Arc<PricingEngine>,
    catalog: Arc<PricingCatalog>,
    source: Arc<S>,
    config: BatchConfig,
    counter: Option<Arc<CallCounter>>,
    cancel: CancelHandle,
}

impl<S: ProductSource> BatchRunner<S> {
    pub fn new(
        engine: Arc<PricingEngine>,
        catalog: Arc<PricingCatalog>,
        source: Arc<S>,
        config: BatchConfig,
    ) -> Self {
        Self {
            engine,
            catalog,
            source,
            config,
            counter: None,
            cancel: CancelHandle::new(),
        }
    }

    pub fn with_call_counter(mut self, counter: Arc<CallCounter>) -> Self {
        self.counter = Some(counter);
        self
    }

    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub async fn run(&self, product_ids: Vec<String>) -> BatchReport {
        self.run_with_progress(product_ids, |_| {}).await
    }

    pub async fn run_with_progress<F>(&self, product_ids: Vec<String>, mut on_progress: F) -> BatchReport
    where
        F: FnMut(BatchProgress),
    {
        let started_at = Utc::now();
        let mut pending = BTreeSet::new();
        let mut ordered = Vec::with_capacity(product_ids.len());
        for id in product_ids {
            if pending.insert(id.clone()) {
                ordered.push(id);
            } else {
                tracing::warn!(product = %id, "duplicate product id skipped");
            }
        }

        let total = ordered.len();
        let concurrency = self.config.effective_concurrency();
        tracing::info!(total, concurrency, "batch started");

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut tasks = JoinSet::new();
        for product_id in ordered {
            let job = ItemJob {
                product_id,
                engine: Arc::clone(&self.engine),
                catalog: Arc::clone(&self.catalog),
                source: Arc::clone(&self.source),
                config: self.config.clone(),
                counter: self.counter.clone(),
                cancel: self.cancel.clone(),
            };
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return ItemOutcome::failed(job.product_id, FailureReason::Cancelled, "batch closed")
                    }
                };
                job.run().await
            });
        }

        let mut outcomes = BTreeMap::new();
        let mut progress = BatchProgress {
            total,
            completed: 0,
            succeeded: 0,
            failed: 0,
        };

        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(error = %e, "item task did not complete");
                    continue;
                }
            };
            pending.remove(outcome.product_id());
            record(&mut progress, &outcome);
            on_progress(progress);
            outcomes.insert(outcome.product_id().to_string(), outcome);
        }

        // Tasks that panicked leave their id behind.
        for product_id in pending {
            let outcome = ItemOutcome::failed(
                product_id.clone(),
                FailureReason::CalculationError,
                "item task aborted",
            );
            record(&mut progress, &outcome);
            on_progress(progress);
            outcomes.insert(product_id, outcome);
        }

        let report = BatchReport::build(started_at, outcomes, self.cancel.is_cancelled());
        tracing::info!(
            batch_id = %report.batch_id,
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            profitable = report.profitable,
            cancelled = report.cancelled,
            "batch finished"
        );
        report
    }
}

fn record(progress: &mut BatchProgress, outcome: &ItemOutcome) {
    progress.completed += 1;
    if outcome.is_failed() {
        progress.failed += 1;
    } else {
        progress.succeeded += 1;
    }
}

impl<S: ProductSource> ItemJob<S> {
    async fn run(self) -> ItemOutcome {
        if self.cancel.is_cancelled() {
            return ItemOutcome::failed(&self.product_id, FailureReason::Cancelled, "cancelled before start");
        }

        let outcome = match tokio::time::timeout(self.config.item_timeout(), self.process()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    product = %self.product_id,
                    timeout_ms = self.config.item_timeout_ms,
                    "item timed out"
                );
                ItemOutcome::failed(
                    &self.product_id,
                    FailureReason::TimedOut,
                    format!("no result within {} ms", self.config.item_timeout_ms),
                )
            }
        };

        // Set while this item still holds its permit, so nothing queued
        // behind it can start.
        if outcome.is_failed() && !self.config.continue_on_error {
            self.cancel.cancel();
        }
        outcome
    }

    async fn process(&self) -> ItemOutcome {
        let facts = match self.fetch_with_retry().await {
            Ok(facts) => facts,
            Err(outcome) => return outcome,
        };

        let inputs = match self.catalog.inputs_for(&facts.request) {
            Ok(inputs) => inputs,
            Err(e) => return ItemOutcome::failed(&self.product_id, e.reason().into(), e.to_string()),
        };

        match self.engine.evaluate_traced(inputs, Some(self.product_id.as_str())) {
            Ok((result, _traces)) => ItemOutcome::Evaluated {
                product_id: self.product_id.clone(),
                profitable: result.success,
                ddp_result: result.ddp_result,
                ddu_result: result.ddu_result,
                policy_used: result.policy_used,
            },
            Err(e) => ItemOutcome::failed(&self.product_id, e.reason().into(), e.to_string()),
        }
    }

    async fn fetch_with_retry(&self) -> Result<ProductFacts, ItemOutcome> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            let error = match self.fetch_once().await {
                Ok(facts) => return Ok(facts),
                Err(e) => e,
            };

            attempt += 1;
            if !error.is_transient() || attempt >= max_attempts {
                return Err(fetch_failure(&self.product_id, error, attempt));
            }

            let delay = self.config.backoff(attempt - 1);
            tracing::warn!(
                product = %self.product_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "transient fetch error, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn fetch_once(&self) -> Result<ProductFacts, SourceError> {
        if let Some(counter) = &self.counter {
            if !counter.try_acquire() {
                return Err(SourceError::transient(&self.product_id, "call budget exhausted for this window"));
            }
        }
        self.source.fetch(&self.product_id).await
    }
}

fn fetch_failure(product_id: &str, error: SourceError, attempts: u32) -> ItemOutcome {
    let reason = match &error {
        SourceError::Record(_) => FailureReason::CalculationError,
        SourceError::Unavailable { .. } => FailureReason::SourceUnavailable,
    };
    ItemOutcome::failed(product_id, reason, format!("{} (after {} attempts)", error, attempts))
}
