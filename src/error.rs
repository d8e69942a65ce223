//! Error taxonomy for the monitoring pipeline.
//!
//! Config and startup-auth failures are fatal; everything else is recoverable
//! at per-source, per-monitor or per-receiver granularity and must never
//! terminate the loop.

use thiserror::Error;

/// Fatal configuration failure, raised before the loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Per-source fetch failure. Recoverable: the affected monitors keep their
/// previous state for the cycle and the sweep continues.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Credentials rejected by the data source. Fatal only when it happens
    /// for every source on the very first sweep.
    #[error("authentication rejected by the data source (HTTP {status})")]
    Auth { status: u16 },
    #[error("data source returned HTTP {status}")]
    Http { status: u16, retriable: bool },
    /// Network-level failure, including bounded-timeout expiry.
    #[error("request to the data source failed: {0}")]
    Transport(String),
    /// The batched response did not align positionally with the request.
    #[error("data source returned {got} value ranges for {want} requested ranges")]
    Shape { want: usize, got: usize },
}

impl FetchError {
    pub fn is_auth(&self) -> bool {
        matches!(self, FetchError::Auth { .. })
    }

    pub fn is_retriable(&self) -> bool {
        match self {
            FetchError::Auth { .. } => false,
            FetchError::Http { retriable, .. } => *retriable,
            FetchError::Transport(_) => true,
            FetchError::Shape { .. } => false,
        }
    }
}

/// A cell value that is not a number after decimal-comma substitution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {raw:?} as a number")]
pub struct ParseError {
    pub raw: String,
}

/// Per-monitor evaluation failure wrapping the first normalization failure
/// encountered. The monitor is treated as unsatisfied for the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value #{index} in range is not numeric: {source}")]
pub struct EvaluateError {
    /// Position of the offending value in the flattened value set.
    pub index: usize,
    #[source]
    pub source: ParseError,
}

/// Per-receiver SMS failure. Recoverable: logged, remaining receivers still
/// get their message.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("sms request failed: {0}")]
    Request(String),
    #[error("sms rejected with status {status}: {reason}")]
    Rejected { status: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_auth_classification() {
        let auth = FetchError::Auth { status: 403 };
        assert!(auth.is_auth());
        assert!(!auth.is_retriable());

        let server = FetchError::Http { status: 503, retriable: true };
        assert!(!server.is_auth());
        assert!(server.is_retriable());

        let client = FetchError::Http { status: 404, retriable: false };
        assert!(!client.is_retriable());

        assert!(FetchError::Transport("timed out".to_string()).is_retriable());
        assert!(!FetchError::Shape { want: 2, got: 1 }.is_retriable());
    }

    #[test]
    fn test_evaluate_error_reports_offending_value() {
        let err = EvaluateError {
            index: 1,
            source: ParseError { raw: "abc".to_string() },
        };
        let text = err.to_string();
        assert!(text.contains("#1"));
        assert!(err.source.to_string().contains("abc"));
    }
}
