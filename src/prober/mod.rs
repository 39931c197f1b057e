//! Resource probing
//!
//! A prober performs exactly one asynchronous load attempt against a
//! resource identifier and reports the image's true intrinsic dimensions or
//! a typed failure. Retry, backoff, and deadline handling live in the
//! analyzer; the prober itself is single-shot and side-effect free beyond
//! the transient load.

pub mod http;

pub use http::HttpProber;

use async_trait::async_trait;
use thiserror::Error;

/// Intrinsic pixel dimensions of a probed image
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IntrinsicSize {
    pub width: u32,
    pub height: u32,
}

/// Probe failure taxonomy
///
/// All three kinds are recovered locally by the analyzer's retry state
/// machine and never surface to callers as errors; `CrossOrigin` triggers
/// the attempt-exempt anonymous downgrade.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("network error: {0}")]
    Network(String),

    #[error("cross-origin access denied: {0}")]
    CrossOrigin(String),

    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),
}

impl ProbeError {
    /// Stable label for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::CrossOrigin(_) => "cors",
            Self::InvalidDimensions(_) => "invalid_dimensions",
        }
    }
}

/// Single-attempt asynchronous resource prober
///
/// `allow_cross_origin=true` requests a cross-origin-enabled load; probers
/// must report a rejected grant as `ProbeError::CrossOrigin` so the
/// analyzer can downgrade to an anonymous attempt without spending retry
/// budget.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceProber: Send + Sync {
    async fn probe(
        &self,
        resource: &str,
        allow_cross_origin: bool,
    ) -> Result<IntrinsicSize, ProbeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_labels() {
        assert_eq!(ProbeError::Network("timeout".into()).kind(), "network");
        assert_eq!(ProbeError::CrossOrigin("no grant".into()).kind(), "cors");
        assert_eq!(
            ProbeError::InvalidDimensions("0x0".into()).kind(),
            "invalid_dimensions"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ProbeError::Network("connection refused".into());
        assert_eq!(err.to_string(), "network error: connection refused");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProbeError>();
    }
}
