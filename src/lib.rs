//! Core engine for APIRequester Pro: request templating and load testing.
//!
//! Two subsystems make up the crate:
//!
//! - [`template`]: resolves `{{variable}}` placeholders in a request's URL,
//!   header values, and body against an environment's variable list, with
//!   chained substitution and cycle detection.
//! - [`runner`]: drives resolved requests under a bounded worker pool for a
//!   configured number of rounds and aggregates latency/error statistics.
//!
//! Supporting modules cover the data model ([`environment`], [`request`]),
//! pre-dispatch validation ([`validation`]), HTTP client construction
//! ([`client`]), single-request dispatch ([`dispatch`]), and result
//! aggregation ([`metrics`]). The surrounding application (persistence,
//! authentication, UI) calls into this crate in-process; there is no wire
//! protocol here.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod environment;
pub mod errors;
pub mod metrics;
pub mod request;
pub mod runner;
pub mod template;
pub mod utils;
pub mod validation;

pub use environment::{Environment, EnvironmentStore, Variable};
pub use metrics::{AggregateMetrics, Attempt, PerRequestMetrics};
pub use request::{HeaderPair, HttpMethod, RequestTemplate, ResolvedRequest};
pub use runner::{LoadTestReport, LoadTestSpec};
pub use template::{resolve, ResolutionError, ResolverOptions};
pub use validation::ValidationError;
