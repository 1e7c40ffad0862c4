//! Load-test result aggregation.
//!
//! Attempts are the raw per-dispatch outcomes; everything else here is
//! derived from the attempt list in one pass after the run completes.
//! Metrics are recomputed, never incrementally mutated, so the figures can
//! never drift from the attempts that back them. Aggregation is a pure
//! function of the list, independent of attempt completion order.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::request::{HttpMethod, ResolvedRequest};

/// Outcome of one dispatch attempt during a load test.
///
/// `status` is 0 when no response was received. A non-2xx status is not a
/// dispatch failure; success/failure is decided at aggregation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub request_index: usize,
    pub status: u16,
    pub elapsed_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Attempt {
    /// An attempt counts as failed when the response was an error status or
    /// the dispatch itself failed.
    pub fn is_failure(&self) -> bool {
        self.status >= 400 || self.error.is_some()
    }
}

/// Statistics derived from a set of attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub avg_response_time_ms: f64,
    pub min_response_time_ms: u64,
    pub max_response_time_ms: u64,
    pub error_rate_percent: f64,
    pub throughput_per_second: f64,
}

/// Aggregate statistics scoped to one request in the spec, plus its method
/// and URL for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerRequestMetrics {
    pub request_index: usize,
    pub method: HttpMethod,
    pub url: String,

    #[serde(flatten)]
    pub metrics: AggregateMetrics,
}

/// Compute aggregate metrics over all attempts.
///
/// `wall_clock` is the duration from the start of the first round to the end
/// of the last; throughput is attempts per wall-clock second (0 when the
/// duration is 0).
pub fn aggregate(attempts: &[Attempt], wall_clock: Duration) -> AggregateMetrics {
    compute(attempts.iter(), wall_clock)
}

/// Compute per-request metrics: one entry per request in the spec, scoped to
/// the attempts that share its index.
pub fn per_request(
    requests: &[ResolvedRequest],
    attempts: &[Attempt],
    wall_clock: Duration,
) -> Vec<PerRequestMetrics> {
    requests
        .iter()
        .enumerate()
        .map(|(index, request)| PerRequestMetrics {
            request_index: index,
            method: request.method,
            url: request.url.clone(),
            metrics: compute(
                attempts.iter().filter(|a| a.request_index == index),
                wall_clock,
            ),
        })
        .collect()
}

fn compute<'a>(
    attempts: impl Iterator<Item = &'a Attempt>,
    wall_clock: Duration,
) -> AggregateMetrics {
    let mut total = 0usize;
    let mut failed = 0usize;
    let mut elapsed_sum = 0u64;
    let mut min: Option<u64> = None;
    let mut max: Option<u64> = None;

    for attempt in attempts {
        total += 1;
        if attempt.is_failure() {
            failed += 1;
        }
        elapsed_sum += attempt.elapsed_ms;
        min = Some(min.map_or(attempt.elapsed_ms, |m| m.min(attempt.elapsed_ms)));
        max = Some(max.map_or(attempt.elapsed_ms, |m| m.max(attempt.elapsed_ms)));
    }

    let wall_secs = wall_clock.as_secs_f64();

    AggregateMetrics {
        total_requests: total,
        successful_requests: total - failed,
        failed_requests: failed,
        avg_response_time_ms: if total > 0 {
            elapsed_sum as f64 / total as f64
        } else {
            0.0
        },
        min_response_time_ms: min.unwrap_or(0),
        max_response_time_ms: max.unwrap_or(0),
        error_rate_percent: if total > 0 {
            (failed as f64 / total as f64) * 100.0
        } else {
            0.0
        },
        throughput_per_second: if wall_secs > 0.0 {
            total as f64 / wall_secs
        } else {
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(index: usize, status: u16, elapsed_ms: u64) -> Attempt {
        Attempt {
            request_index: index,
            status,
            elapsed_ms,
            error: None,
        }
    }

    fn failed(index: usize, elapsed_ms: u64, message: &str) -> Attempt {
        Attempt {
            request_index: index,
            status: 0,
            elapsed_ms,
            error: Some(message.to_string()),
        }
    }

    fn requests(count: usize) -> Vec<ResolvedRequest> {
        (0..count)
            .map(|i| ResolvedRequest {
                method: HttpMethod::Get,
                url: format!("https://api.example.com/{}", i),
                headers: vec![],
                body: None,
            })
            .collect()
    }

    #[test]
    fn aggregates_basic_figures() {
        let attempts = vec![ok(0, 200, 100), ok(0, 200, 300), ok(0, 500, 200)];

        let m = aggregate(&attempts, Duration::from_secs(2));
        assert_eq!(m.total_requests, 3);
        assert_eq!(m.failed_requests, 1);
        assert_eq!(m.successful_requests, 2);
        assert_eq!(m.avg_response_time_ms, 200.0);
        assert_eq!(m.min_response_time_ms, 100);
        assert_eq!(m.max_response_time_ms, 300);
        assert!((m.error_rate_percent - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(m.throughput_per_second, 1.5);
    }

    #[test]
    fn status_400_and_above_counts_as_failed() {
        let attempts = vec![ok(0, 399, 10), ok(0, 400, 10), ok(0, 404, 10), ok(0, 503, 10)];

        let m = aggregate(&attempts, Duration::from_secs(1));
        assert_eq!(m.failed_requests, 3);
        assert_eq!(m.successful_requests, 1);
    }

    #[test]
    fn dispatch_error_counts_as_failed_even_with_low_status() {
        let attempts = vec![ok(0, 200, 10), failed(0, 10, "connection refused")];

        let m = aggregate(&attempts, Duration::from_secs(1));
        assert_eq!(m.failed_requests, 1);
    }

    #[test]
    fn empty_attempt_list_yields_zeros() {
        let m = aggregate(&[], Duration::from_secs(1));
        assert_eq!(m.total_requests, 0);
        assert_eq!(m.avg_response_time_ms, 0.0);
        assert_eq!(m.min_response_time_ms, 0);
        assert_eq!(m.max_response_time_ms, 0);
        assert_eq!(m.error_rate_percent, 0.0);
        assert_eq!(m.throughput_per_second, 0.0);
    }

    #[test]
    fn zero_wall_clock_yields_zero_throughput() {
        let m = aggregate(&[ok(0, 200, 5)], Duration::ZERO);
        assert_eq!(m.throughput_per_second, 0.0);
    }

    #[test]
    fn all_failures_give_one_hundred_percent_error_rate() {
        let attempts = vec![
            failed(0, 5, "timeout"),
            failed(0, 6, "timeout"),
            failed(1, 7, "connection refused"),
        ];

        let m = aggregate(&attempts, Duration::from_secs(1));
        assert_eq!(m.error_rate_percent, 100.0);
        assert_eq!(m.successful_requests, 0);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let mut attempts = vec![
            ok(0, 200, 120),
            ok(1, 404, 80),
            failed(0, 30, "timeout"),
            ok(1, 200, 240),
            ok(0, 201, 60),
        ];

        let baseline = aggregate(&attempts, Duration::from_secs(3));
        let baseline_per = per_request(&requests(2), &attempts, Duration::from_secs(3));

        // Rotate through several permutations; every figure must be identical.
        for _ in 0..attempts.len() {
            attempts.rotate_left(1);
            assert_eq!(aggregate(&attempts, Duration::from_secs(3)), baseline);
            assert_eq!(
                per_request(&requests(2), &attempts, Duration::from_secs(3)),
                baseline_per
            );
        }
        attempts.reverse();
        assert_eq!(aggregate(&attempts, Duration::from_secs(3)), baseline);
    }

    #[test]
    fn per_request_scopes_attempts_by_index() {
        let attempts = vec![
            ok(0, 200, 100),
            ok(1, 500, 50),
            ok(0, 200, 300),
            failed(1, 20, "timeout"),
        ];

        let per = per_request(&requests(2), &attempts, Duration::from_secs(1));
        assert_eq!(per.len(), 2);

        assert_eq!(per[0].request_index, 0);
        assert_eq!(per[0].metrics.total_requests, 2);
        assert_eq!(per[0].metrics.failed_requests, 0);
        assert_eq!(per[0].metrics.avg_response_time_ms, 200.0);

        assert_eq!(per[1].metrics.total_requests, 2);
        assert_eq!(per[1].metrics.failed_requests, 2);
        assert_eq!(per[1].metrics.error_rate_percent, 100.0);
    }

    #[test]
    fn per_request_includes_entry_for_request_with_no_attempts() {
        let per = per_request(&requests(2), &[ok(0, 200, 10)], Duration::from_secs(1));
        assert_eq!(per.len(), 2);
        assert_eq!(per[1].metrics.total_requests, 0);
        assert_eq!(per[1].metrics.avg_response_time_ms, 0.0);
    }

    #[test]
    fn attempt_serializes_camel_case_and_omits_missing_error() {
        let json = serde_json::to_string(&ok(2, 200, 42)).unwrap();
        assert!(json.contains(r#""requestIndex":2"#));
        assert!(json.contains(r#""elapsedMs":42"#));
        assert!(!json.contains("error"));

        let json = serde_json::to_string(&failed(0, 5, "boom")).unwrap();
        assert!(json.contains(r#""error":"boom""#));
    }

    #[test]
    fn metrics_serialize_camel_case() {
        let m = aggregate(&[ok(0, 200, 10)], Duration::from_secs(1));
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("totalRequests"));
        assert!(json.contains("avgResponseTimeMs"));
        assert!(json.contains("errorRatePercent"));
        assert!(json.contains("throughputPerSecond"));
    }
}
