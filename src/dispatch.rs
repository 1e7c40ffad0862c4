//! HTTP dispatch of resolved requests.
//!
//! Two call sites share this module: the single "send request" path, which
//! returns the full response for display, and the load-test runner, which
//! turns every outcome (response or transport failure) into an [`Attempt`].
//! The per-request timeout is carried by the client built in
//! [`crate::client`].

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error};

use crate::errors::CategorizedError;
use crate::metrics::Attempt;
use crate::request::ResolvedRequest;

/// Errors surfaced by the single-send path.
///
/// Load-test attempts never return these; their failures are recorded as
/// data on the [`Attempt`] instead.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Request failed: {0}")]
    Send(CategorizedError),

    #[error("Failed to read response body: {0}")]
    Body(CategorizedError),
}

/// Full response from a single send, for display and history persistence.
#[derive(Debug, Clone)]
pub struct ResponseSummary {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub elapsed_ms: u64,
}

/// Build a reqwest request from a resolved request.
///
/// Header pairs with an empty key are skipped. An empty body string is
/// treated as no body.
fn build_request(client: &reqwest::Client, request: &ResolvedRequest) -> reqwest::RequestBuilder {
    let mut builder = client.request(request.method.to_reqwest(), &request.url);

    for header in &request.headers {
        if header.key.is_empty() {
            continue;
        }
        builder = builder.header(&header.key, &header.value);
    }

    if let Some(body) = request.body.as_deref() {
        if !body.is_empty() {
            builder = builder.body(body.to_string());
        }
    }

    builder
}

/// Dispatch a resolved request once and return the full response.
pub async fn send_once(
    client: &reqwest::Client,
    request: &ResolvedRequest,
) -> Result<ResponseSummary, DispatchError> {
    debug!(method = %request.method, url = %request.url, "Sending request");
    let start = Instant::now();

    let response = build_request(client, request)
        .send()
        .await
        .map_err(|e| DispatchError::Send(CategorizedError::from_reqwest(&e)))?;

    let status = response.status().as_u16();
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    let body = response
        .text()
        .await
        .map_err(|e| DispatchError::Body(CategorizedError::from_reqwest(&e)))?;

    let elapsed_ms = start.elapsed().as_millis() as u64;
    debug!(status, elapsed_ms, "Request completed");

    Ok(ResponseSummary {
        status,
        headers,
        body,
        elapsed_ms,
    })
}

/// Dispatch one load-test attempt. Never fails: transport and timeout
/// failures are recorded on the returned [`Attempt`] with a categorized
/// error message, and a status of 0 when no response was received.
pub async fn run_attempt(
    client: &reqwest::Client,
    request: &ResolvedRequest,
    request_index: usize,
) -> Attempt {
    let start = Instant::now();

    match build_request(client, request).send().await {
        Ok(mut response) => {
            let status = response.status().as_u16();

            // Consume the response body in chunks without buffering it; at
            // high concurrency unread bodies pile up in memory.
            while let Ok(Some(_chunk)) = response.chunk().await {}

            let elapsed_ms = start.elapsed().as_millis() as u64;
            debug!(
                request_index,
                url = %request.url,
                status,
                elapsed_ms,
                "Attempt completed"
            );

            Attempt {
                request_index,
                status,
                elapsed_ms,
                error: None,
            }
        }
        Err(e) => {
            let elapsed_ms = start.elapsed().as_millis() as u64;
            let categorized = CategorizedError::from_reqwest(&e);
            error!(
                request_index,
                url = %request.url,
                error = %categorized,
                elapsed_ms,
                "Attempt failed"
            );

            Attempt {
                request_index,
                status: categorized.status_code.unwrap_or(0),
                elapsed_ms,
                error: Some(categorized.to_string()),
            }
        }
    }
}
