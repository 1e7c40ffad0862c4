//! Placeholder resolution for request templates.
//!
//! Substitutes `{{variable}}` placeholders in a template's URL, header
//! values, and body against an environment's variable list. Substitution
//! runs to a fixed point so a variable's value may itself contain further
//! placeholders (chained resolution). Two failure modes are kept distinct:
//! a circular reference (the pass cap is hit while substitutions keep
//! happening) and plainly undefined variables (placeholders survive after
//! the text has stabilized).

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::environment::Variable;
use crate::request::{RequestTemplate, ResolvedRequest};

/// Default cap on substitution passes before declaring a circular reference.
pub const DEFAULT_MAX_PASSES: usize = 10;

/// Tuning knobs for the resolver.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Maximum substitution passes across all fields before resolution is
    /// declared circular. The cap turns an unbounded loop into a
    /// deterministic failure.
    pub max_passes: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Errors that can occur during template resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Maximum substitution passes ({max_passes}) reached while resolving placeholders. Possible circular reference in variables")]
    CircularReference { max_passes: usize },

    #[error("The following variables are unresolved: {}. Please define them in the selected environment", .names.join(", "))]
    UnresolvedVariables { names: Vec<String> },
}

impl ResolutionError {
    /// The unresolved variable names, when that is what failed.
    pub fn unresolved_names(&self) -> Option<&[String]> {
        match self {
            ResolutionError::UnresolvedVariables { names } => Some(names),
            ResolutionError::CircularReference { .. } => None,
        }
    }
}

/// Pattern used to detect leftover placeholders after substitution has
/// stabilized. Deliberately looser than the substitution match: it also
/// captures tokens like `{{ key }}` that substitution never touches, so they
/// are reported back to the user rather than silently sent on the wire.
fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern is valid"))
}

/// Resolve a template's placeholders against an environment's variables.
///
/// The template is read-only input; on success a new [`ResolvedRequest`] is
/// returned with all three text fields (URL, header values, body) fully
/// substituted and the method and header keys untouched.
///
/// Substitution only matches the exact literal `{{key}}`; no whitespace is
/// tolerated inside the braces. A key with no matching variable is left in
/// place during a pass, which is what allows one variable's value to contain
/// another placeholder.
///
/// # Example
/// ```
/// use apirequester_core::environment::Variable;
/// use apirequester_core::request::{HttpMethod, RequestTemplate};
/// use apirequester_core::template::{resolve, ResolverOptions};
///
/// let template = RequestTemplate {
///     method: HttpMethod::Get,
///     url: "{{base}}/users".to_string(),
///     headers: vec![],
///     body: None,
/// };
/// let variables = vec![Variable::new("base", "https://api.example.com")];
///
/// let resolved = resolve(&template, &variables, &ResolverOptions::default()).unwrap();
/// assert_eq!(resolved.url, "https://api.example.com/users");
/// ```
pub fn resolve(
    template: &RequestTemplate,
    variables: &[Variable],
    options: &ResolverOptions,
) -> Result<ResolvedRequest, ResolutionError> {
    let mut url = template.url.clone();
    let mut headers = template.headers.clone();
    let mut body = template.body.clone();

    // Iterate to a fixed point: a pass that performs no substitution means
    // the text is stable. Tracking per-substitution change (rather than
    // comparing whole-pass text) matters for cycles like a -> {{b}},
    // b -> {{a}}: the text comes back identical after a full pass, but
    // substitutions never stop, and that must surface as circular.
    let mut stabilized = false;
    for pass in 0..options.max_passes {
        let mut changed = substitute_field(&mut url, variables);
        for header in headers.iter_mut() {
            changed |= substitute_field(&mut header.value, variables);
        }
        if let Some(body_text) = body.as_mut() {
            changed |= substitute_field(body_text, variables);
        }

        if !changed {
            debug!(passes = pass + 1, url = %url, "Template substitution stabilized");
            stabilized = true;
            break;
        }
    }

    if !stabilized {
        return Err(ResolutionError::CircularReference {
            max_passes: options.max_passes,
        });
    }

    let mut unresolved: Vec<String> = Vec::new();
    collect_unresolved(&url, &mut unresolved);
    for header in &headers {
        collect_unresolved(&header.value, &mut unresolved);
    }
    if let Some(body_text) = &body {
        collect_unresolved(body_text, &mut unresolved);
    }

    if !unresolved.is_empty() {
        return Err(ResolutionError::UnresolvedVariables { names: unresolved });
    }

    Ok(ResolvedRequest {
        method: template.method,
        url,
        headers,
        body,
    })
}

/// Replace every occurrence of each variable's `{{key}}` placeholder in one
/// field. Returns true if any substitution happened.
fn substitute_field(field: &mut String, variables: &[Variable]) -> bool {
    let mut changed = false;
    for variable in variables {
        let placeholder = format!("{{{{{}}}}}", variable.key);
        if field.contains(&placeholder) {
            *field = field.replace(&placeholder, &variable.value);
            changed = true;
        }
    }
    changed
}

/// Collect leftover placeholder names from a field, deduplicated, preserving
/// first-occurrence order.
fn collect_unresolved(field: &str, names: &mut Vec<String>) {
    for capture in placeholder_pattern().captures_iter(field) {
        let name = capture[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
}
