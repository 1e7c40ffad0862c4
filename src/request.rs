//! Request template and resolved request types.
//!
//! A `RequestTemplate` is the user-authored shape of a request: its URL,
//! header values, and body may contain `{{variable}}` placeholders. The
//! resolver consumes a template plus an environment's variables and produces
//! a `ResolvedRequest` with the same structure but guaranteed placeholder-free
//! text fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP methods supported by templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Convert to the reqwest method type for dispatch.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown HTTP method string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported HTTP method: '{0}'. Expected GET, POST, PUT, DELETE, or PATCH")]
pub struct InvalidMethod(pub String);

impl FromStr for HttpMethod {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            other => Err(InvalidMethod(other.to_string())),
        }
    }
}

/// A single header as an ordered key/value pair.
///
/// Header values may contain placeholders; header keys never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPair {
    pub key: String,
    pub value: String,
}

impl HeaderPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A request template as authored by the user.
///
/// The resolver treats this as read-only input; resolution returns a new
/// `ResolvedRequest` and never mutates the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTemplate {
    pub method: HttpMethod,

    /// Target URL; may contain `{{variable}}` placeholders.
    pub url: String,

    /// Ordered header pairs; values may contain placeholders.
    #[serde(default)]
    pub headers: Vec<HeaderPair>,

    /// Optional body text. Expected to parse as JSON once resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// A request whose URL, header values, and body are free of placeholders.
///
/// Produced only by successful resolution; consumed immediately by dispatch.
/// Not persisted in this form (callers persist the template plus outcome).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    pub url: String,

    #[serde(default)]
    pub headers: Vec<HeaderPair>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}
