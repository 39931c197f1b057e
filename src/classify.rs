//! Geometric and quality classification of probed images
//!
//! Pure, total classification: any positive intrinsic dimensions map to an
//! aspect-ratio family, a quality tier, and a compression-needed flag. The
//! policy resolver consumes the result; nothing here performs I/O.

use serde::{Deserialize, Serialize};

use crate::constants::{
    COMPRESSION_PIXELS, HIGH_TIER_PIXELS, LANDSCAPE_RATIO, MEDIUM_TIER_PIXELS, PORTRAIT_RATIO,
    ULTRA_TALL_RATIO, ULTRA_WIDE_RATIO,
};
use crate::prober::IntrinsicSize;

/// Aspect-ratio family of a source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectFamily {
    UltraWide,
    Landscape,
    Square,
    Portrait,
    UltraTall,
}

impl AspectFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UltraWide => "ultrawide",
            Self::Landscape => "landscape",
            Self::Square => "square",
            Self::Portrait => "portrait",
            Self::UltraTall => "ultratall",
        }
    }
}

/// Coarse resolution tier by total pixel count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    High,
    Medium,
    Low,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Classification of a successfully probed image
///
/// Immutable once computed; derived purely from intrinsic dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Width divided by height
    pub aspect_ratio: f64,
    /// Aspect-ratio family
    pub family: AspectFamily,
    /// Resolution tier
    pub quality: QualityTier,
    /// Whether the source exceeds the compression pixel budget
    pub compression_needed: bool,
}

/// Classify intrinsic dimensions into family, tier, and compression need
///
/// Family bands are evaluated in order with strict comparisons, so the
/// threshold values themselves fall into the next band down (ratio 2.5 is
/// landscape, not ultra-wide). Tier thresholds are strict as well
/// (exactly 1920x1080 worth of pixels is medium, not high).
pub fn classify(size: IntrinsicSize) -> Classification {
    let aspect_ratio = size.width as f64 / size.height as f64;

    let family = if aspect_ratio > ULTRA_WIDE_RATIO {
        AspectFamily::UltraWide
    } else if aspect_ratio < ULTRA_TALL_RATIO {
        AspectFamily::UltraTall
    } else if aspect_ratio > LANDSCAPE_RATIO {
        AspectFamily::Landscape
    } else if aspect_ratio < PORTRAIT_RATIO {
        AspectFamily::Portrait
    } else {
        AspectFamily::Square
    };

    let pixels = size.width as u64 * size.height as u64;

    let quality = if pixels > HIGH_TIER_PIXELS {
        QualityTier::High
    } else if pixels > MEDIUM_TIER_PIXELS {
        QualityTier::Medium
    } else {
        QualityTier::Low
    };

    Classification {
        aspect_ratio,
        family,
        quality,
        compression_needed: pixels > COMPRESSION_PIXELS,
    }
}
