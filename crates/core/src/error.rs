//! Crate-wide error taxonomy.
//!
//! Every upstream adapter and pipeline maps its failures into
//! [`ResearchError`]; the orchestrator is the only place that turns these
//! into user-facing text, so wording lives there, not here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResearchError>;

#[derive(Debug, Error)]
pub enum ResearchError {
    /// Caller-supplied input failed validation before dispatch.
    #[error("invalid input: {0}")]
    InputInvalid(String),

    /// The requested package/repo/status page/docs could not be located.
    #[error("{0}")]
    NotFound(String),

    /// The upstream did not answer at all (connect failure, DNS, reset).
    #[error("{upstream} is unavailable: {detail}")]
    UpstreamUnavailable { upstream: String, detail: String },

    /// The upstream did not answer within its deadline.
    #[error("{upstream} timed out")]
    UpstreamTimeout { upstream: String },

    /// The upstream refused the request (401/403).
    #[error("{upstream} refused the request (HTTP {status})")]
    UpstreamForbidden { upstream: String, status: u16 },

    /// The upstream answered with a shape we cannot interpret.
    #[error("{upstream} returned unexpected data")]
    UpstreamMalformed {
        upstream: String,
        /// Short, safe excerpt of the offending payload.
        excerpt: String,
    },

    /// HTTP 429 from the upstream.
    #[error("{upstream} rate limited the request")]
    RateLimited {
        upstream: String,
        retry_after_secs: Option<u64>,
    },

    /// Catch-all for bugs and unclassified failures.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResearchError {
    /// Classify a `reqwest` failure against a named upstream.
    pub fn from_reqwest(upstream: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::UpstreamTimeout {
                upstream: upstream.to_string(),
            };
        }
        if let Some(status) = err.status() {
            let code = status.as_u16();
            return match code {
                401 | 403 => Self::UpstreamForbidden {
                    upstream: upstream.to_string(),
                    status: code,
                },
                404 => Self::NotFound(format!("{upstream} returned 404")),
                429 => Self::RateLimited {
                    upstream: upstream.to_string(),
                    retry_after_secs: None,
                },
                _ => Self::UpstreamUnavailable {
                    upstream: upstream.to_string(),
                    detail: format!("HTTP {code}"),
                },
            };
        }
        Self::UpstreamUnavailable {
            upstream: upstream.to_string(),
            detail: err.to_string(),
        }
    }

    /// Whether a retry could plausibly succeed (connect/timeout failures).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable { .. } | Self::UpstreamTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_covers_transport_failures_only() {
        let unavailable = ResearchError::UpstreamUnavailable {
            upstream: "searxng".into(),
            detail: "connection refused".into(),
        };
        let forbidden = ResearchError::UpstreamForbidden {
            upstream: "github".into(),
            status: 403,
        };
        assert!(unavailable.is_retryable());
        assert!(!forbidden.is_retryable());
        assert!(!ResearchError::NotFound("x".into()).is_retryable());
    }
}
