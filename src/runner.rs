//! Load-test execution.
//!
//! Runs `iterations` sequential rounds; within a round, every request in the
//! spec is attempted exactly `concurrency` times. All of a round's attempts
//! are drained from a shared work queue by a fixed pool of `concurrency`
//! workers, so no more than `concurrency` requests are ever in flight
//! regardless of how many distinct requests are under test. A new round does
//! not start until the previous round's attempts have all completed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::dispatch;
use crate::metrics::{self, AggregateMetrics, Attempt, PerRequestMetrics};
use crate::request::ResolvedRequest;
use crate::validation::{self, ValidationError};

/// One load-test invocation: the resolved requests to drive (indexed by
/// position), and the concurrency/iteration budget. Constructed per call,
/// never persisted.
#[derive(Debug, Clone)]
pub struct LoadTestSpec {
    pub requests: Vec<ResolvedRequest>,
    pub concurrency: usize,
    pub iterations: usize,
}

/// Result of a load test: the raw attempts, aggregate metrics, per-request
/// metrics, and the peak number of attempts observed in flight at once.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadTestReport {
    pub attempts: Vec<Attempt>,
    pub aggregate: AggregateMetrics,
    pub per_request: Vec<PerRequestMetrics>,
    pub peak_concurrency: usize,
}

/// Work items for one round: each request index repeated `concurrency`
/// times. Workers claim items by advancing an atomic cursor.
fn round_work_items(request_count: usize, concurrency: usize) -> Vec<usize> {
    (0..request_count)
        .flat_map(|index| std::iter::repeat(index).take(concurrency))
        .collect()
}

/// Run a load test.
///
/// The spec is validated first; on failure nothing is dispatched and the
/// error is returned synchronously. Individual attempt failures never abort
/// the run; they are recorded on the report and counted at aggregation.
pub async fn run(
    client: &reqwest::Client,
    spec: LoadTestSpec,
) -> Result<LoadTestReport, ValidationError> {
    validation::validate_spec(&spec)?;

    let LoadTestSpec {
        requests,
        concurrency,
        iterations,
    } = spec;

    info!(
        requests = requests.len(),
        concurrency, iterations, "Starting load test"
    );

    let requests = Arc::new(requests);
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut attempts: Vec<Attempt> =
        Vec::with_capacity(requests.len() * concurrency * iterations);
    let started = Instant::now();

    for round in 0..iterations {
        let items = Arc::new(round_work_items(requests.len(), concurrency));
        let cursor = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(concurrency);
        for worker_id in 0..concurrency {
            let client = client.clone();
            let requests = Arc::clone(&requests);
            let items = Arc::clone(&items);
            let cursor = Arc::clone(&cursor);
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);

            handles.push(tokio::spawn(async move {
                let mut local = Vec::new();
                loop {
                    let slot = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(&request_index) = items.get(slot) else {
                        break;
                    };

                    let now_in_flight = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now_in_flight, Ordering::SeqCst);

                    let attempt =
                        dispatch::run_attempt(&client, &requests[request_index], request_index)
                            .await;

                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    local.push(attempt);
                }

                debug!(worker_id, attempts = local.len(), "Worker drained round queue");
                local
            }));
        }

        // Round barrier: join every worker before the next round starts.
        for handle in handles {
            match handle.await {
                Ok(worker_attempts) => attempts.extend(worker_attempts),
                Err(e) => error!(error = %e, "Worker task failed"),
            }
        }

        debug!(
            round = round + 1,
            iterations,
            total_attempts = attempts.len(),
            "Round complete"
        );
    }

    let wall_clock = started.elapsed();
    let aggregate = metrics::aggregate(&attempts, wall_clock);
    let per_request = metrics::per_request(&requests, &attempts, wall_clock);
    let peak_concurrency = peak.load(Ordering::SeqCst);

    info!(
        total_requests = aggregate.total_requests,
        failed_requests = aggregate.failed_requests,
        wall_clock_ms = wall_clock.as_millis() as u64,
        peak_concurrency,
        "Load test complete"
    );

    Ok(LoadTestReport {
        attempts,
        aggregate,
        per_request,
        peak_concurrency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::HttpMethod;

    #[test]
    fn work_items_cover_each_request_concurrency_times() {
        let items = round_work_items(2, 3);
        assert_eq!(items, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn work_items_empty_for_no_requests() {
        assert!(round_work_items(0, 5).is_empty());
    }

    #[tokio::test]
    async fn invalid_spec_is_rejected_before_any_dispatch() {
        let client = reqwest::Client::new();
        let spec = LoadTestSpec {
            requests: vec![ResolvedRequest {
                method: HttpMethod::Get,
                // Unreachable on purpose: validation must fire first, so the
                // call returns without attempting a connection.
                url: "not a url".to_string(),
                headers: vec![],
                body: None,
            }],
            concurrency: 1,
            iterations: 1,
        };

        let err = run(&client, spec).await.unwrap_err();
        assert!(matches!(err, ValidationError::InvalidUrl { index: 0, .. }));
    }

    #[tokio::test]
    async fn out_of_bounds_concurrency_is_rejected() {
        let client = reqwest::Client::new();
        let spec = LoadTestSpec {
            requests: vec![ResolvedRequest {
                method: HttpMethod::Get,
                url: "https://api.example.com".to_string(),
                headers: vec![],
                body: None,
            }],
            concurrency: 101,
            iterations: 1,
        };

        assert!(matches!(
            run(&client, spec).await.unwrap_err(),
            ValidationError::OutOfRange { .. }
        ));
    }
}
