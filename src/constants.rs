// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.
// Using constants instead of magic numbers improves maintainability
// and makes it easier to understand and modify defaults.

// =============================================================================
// Analysis defaults
// =============================================================================

/// Default maximum probe attempts per analysis
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base backoff delay in milliseconds
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Default maximum backoff delay in milliseconds (cap for exponential growth)
pub const DEFAULT_MAX_DELAY_MS: u64 = 8000;

/// Default wall-clock deadline for one analysis in milliseconds
pub const DEFAULT_DEADLINE_MS: u64 = 15000;

// =============================================================================
// Probe defaults
// =============================================================================

/// Default per-request timeout for the HTTP prober in seconds
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Viewport defaults
// =============================================================================

/// Default target render width in CSS pixels
pub const DEFAULT_TARGET_WIDTH: u32 = 375;

/// Default target aspect ratio (16:9)
pub const DEFAULT_TARGET_ASPECT: f64 = 16.0 / 9.0;

/// Aspect-ratio delta above which a source needs optimization
pub const ASPECT_TOLERANCE: f64 = 0.03;

// =============================================================================
// Classification thresholds
// =============================================================================

/// Aspect ratio above which an image is ultra-wide
pub const ULTRA_WIDE_RATIO: f64 = 2.5;

/// Aspect ratio below which an image is ultra-tall
pub const ULTRA_TALL_RATIO: f64 = 0.4;

/// Aspect ratio above which an image is landscape
pub const LANDSCAPE_RATIO: f64 = 1.3;

/// Aspect ratio below which an image is portrait
pub const PORTRAIT_RATIO: f64 = 0.8;

/// Pixel count above which an image is high quality (>1920x1080 equivalent)
pub const HIGH_TIER_PIXELS: u64 = 2_073_600;

/// Pixel count above which an image is medium quality (>1280x720 equivalent)
pub const MEDIUM_TIER_PIXELS: u64 = 921_600;

/// Pixel count above which an image needs compression (>1200x1200 equivalent)
pub const COMPRESSION_PIXELS: u64 = 1_440_000;
