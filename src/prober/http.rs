//! HTTP resource prober
//!
//! Loads an image over HTTP(S) and decodes its intrinsic dimensions from
//! the image header, without keeping pixels or writing any cache.
//!
//! # Cross-origin mode
//!
//! With `allow_cross_origin=true` the request carries an `Origin` header
//! and the response must grant access via `Access-Control-Allow-Origin`
//! (`*` or the exact origin); a missing or mismatched grant is reported as
//! `ProbeError::CrossOrigin`. With `allow_cross_origin=false` the request
//! is anonymous and the grant check is skipped.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use image::io::Reader as ImageReader;
use reqwest::header::{HeaderMap, ORIGIN};

use super::{IntrinsicSize, ProbeError, ResourceProber};
use crate::config::{ConfigError, ProbeConfig};

/// Prober backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    origin: String,
}

impl HttpProber {
    /// Create a prober from probe configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Probe` if the HTTP client cannot be created
    /// (e.g., TLS configuration issues).
    pub fn new(config: &ProbeConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ConfigError::Probe(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            origin: config.origin.clone(),
        })
    }
}

#[async_trait]
impl ResourceProber for HttpProber {
    async fn probe(
        &self,
        resource: &str,
        allow_cross_origin: bool,
    ) -> Result<IntrinsicSize, ProbeError> {
        let mut request = self.client.get(resource);
        if allow_cross_origin {
            request = request.header(ORIGIN, self.origin.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProbeError::Network(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ProbeError::Network(format!(
                "unexpected status: {}",
                response.status()
            )));
        }

        if allow_cross_origin && !cross_origin_granted(response.headers(), &self.origin) {
            return Err(ProbeError::CrossOrigin(format!(
                "no access grant for origin {}",
                self.origin
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProbeError::Network(format!("failed to read body: {e}")))?;

        read_intrinsic_size(&bytes)
    }
}

/// Check whether the response grants cross-origin access to `origin`
fn cross_origin_granted(headers: &HeaderMap, origin: &str) -> bool {
    match headers
        .get("access-control-allow-origin")
        .and_then(|v| v.to_str().ok())
    {
        Some("*") => true,
        Some(value) => value == origin,
        None => false,
    }
}

/// Decode intrinsic dimensions from the image header.
///
/// Never trusts hinted or placeholder sizes: dimensions come from the
/// encoded header itself, and degenerate values are rejected.
fn read_intrinsic_size(data: &[u8]) -> Result<IntrinsicSize, ProbeError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ProbeError::InvalidDimensions(format!("unreadable payload: {e}")))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ProbeError::InvalidDimensions(format!("undecodable image header: {e}")))?;

    if width == 0 || height == 0 {
        return Err(ProbeError::InvalidDimensions(format!(
            "degenerate size {width}x{height}"
        )));
    }

    Ok(IntrinsicSize { width, height })
}
