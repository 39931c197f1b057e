//! Render policy resolution
//!
//! Maps a classification (or its absence) onto the rendering configuration
//! consumed by the display layer: crop strategy, anchor point, and target
//! dimensions normalized to the product's fixed-aspect viewport.
//!
//! The crop decision is intentionally fixed at cover/center regardless of
//! the computed aspect family; classification richness only feeds the
//! `optimized` flag and downstream quality hints.

use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::config::ViewportConfig;
use crate::constants::ASPECT_TOLERANCE;

/// How the source image is fit into the target frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Crop to fill target dimensions (default)
    #[default]
    Cover,
    /// Scale to fit within dimensions, preserving aspect ratio
    Contain,
    /// Stretch to fill exactly (may distort)
    Fill,
}

impl FitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::Fill => "fill",
        }
    }
}

/// Anchor point for cropping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    #[default]
    Center,
}

impl Anchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Center => "center",
        }
    }
}

/// Resolved rendering configuration handed to the caller
///
/// Never mutated after creation; callers that need a different policy
/// request a new analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderPolicy {
    pub fit: FitMode,
    pub anchor: Anchor,
    pub target_width: u32,
    pub target_height: u32,
    /// Whether the source deviated from the target aspect enough to need
    /// optimization (diagnostic/telemetry signal, not a crop decision)
    pub optimized: bool,
}

/// Resolver from classification to render policy for one viewport
#[derive(Debug, Clone)]
pub struct PolicyResolver {
    viewport: ViewportConfig,
}

impl PolicyResolver {
    pub fn new(viewport: ViewportConfig) -> Self {
        Self { viewport }
    }

    /// Target height for the viewport frame, rounded to whole pixels
    fn target_height(&self) -> u32 {
        (self.viewport.target_width as f64 / self.viewport.target_aspect).round() as u32
    }

    /// Resolve a policy from an optional classification
    ///
    /// Without a classification (probe never succeeded) this is exactly the
    /// fallback policy. With one, fit and anchor stay cover/center and the
    /// target frame stays viewport-normalized; only `optimized` varies.
    pub fn resolve(&self, classification: Option<&Classification>) -> RenderPolicy {
        match classification {
            None => self.fallback(),
            Some(c) => {
                let delta = (c.aspect_ratio - self.viewport.target_aspect).abs();
                RenderPolicy {
                    optimized: delta > ASPECT_TOLERANCE,
                    ..self.fallback()
                }
            }
        }
    }

    /// The safe, always-available policy for analyses that never complete
    pub fn fallback(&self) -> RenderPolicy {
        RenderPolicy {
            fit: FitMode::Cover,
            anchor: Anchor::Center,
            target_width: self.viewport.target_width,
            target_height: self.target_height(),
            optimized: false,
        }
    }
}

impl Default for PolicyResolver {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::prober::IntrinsicSize;

    #[test]
    fn test_fallback_policy_exact_values() {
        let resolver = PolicyResolver::default();
        let policy = resolver.fallback();

        assert_eq!(policy.fit, FitMode::Cover);
        assert_eq!(policy.anchor, Anchor::Center);
        assert_eq!(policy.target_width, 375);
        assert_eq!(policy.target_height, 211); // round(375 / (16/9))
        assert!(!policy.optimized);
    }

    #[test]
    fn test_resolve_without_classification_is_fallback() {
        let resolver = PolicyResolver::default();
        assert_eq!(resolver.resolve(None), resolver.fallback());
    }

    #[test]
    fn test_matching_aspect_not_optimized() {
        // 1920x1080 is exactly the target aspect
        let resolver = PolicyResolver::default();
        let c = classify(IntrinsicSize {
            width: 1920,
            height: 1080,
        });
        let policy = resolver.resolve(Some(&c));

        assert!(!policy.optimized);
        assert_eq!(policy.target_width, 375);
        assert_eq!(policy.target_height, 211);
    }

    #[test]
    fn test_portrait_source_optimized_but_still_cover_center() {
        let resolver = PolicyResolver::default();
        let c = classify(IntrinsicSize {
            width: 1000,
            height: 2000,
        });
        let policy = resolver.resolve(Some(&c));

        assert!(policy.optimized);
        assert_eq!(policy.fit, FitMode::Cover);
        assert_eq!(policy.anchor, Anchor::Center);
    }

    #[test]
    fn test_delta_within_tolerance_not_optimized() {
        let resolver = PolicyResolver::default();
        // 16/9 + 0.02 stays inside the 0.03 tolerance
        let mut c = classify(IntrinsicSize {
            width: 1920,
            height: 1080,
        });
        c.aspect_ratio = 16.0 / 9.0 + 0.02;
        assert!(!resolver.resolve(Some(&c)).optimized);

        c.aspect_ratio = 16.0 / 9.0 + 0.05;
        assert!(resolver.resolve(Some(&c)).optimized);
    }

    #[test]
    fn test_target_frame_independent_of_source_resolution() {
        let resolver = PolicyResolver::default();
        for (w, h) in [(8000u32, 1000u32), (100, 4000), (640, 480)] {
            let c = classify(IntrinsicSize {
                width: w,
                height: h,
            });
            let policy = resolver.resolve(Some(&c));
            assert_eq!(
                (policy.target_width, policy.target_height),
                (375, 211),
                "target frame must stay viewport-normalized for {}x{}",
                w,
                h
            );
        }
    }

    #[test]
    fn test_fit_mode_as_str() {
        assert_eq!(FitMode::Cover.as_str(), "cover");
        assert_eq!(FitMode::Contain.as_str(), "contain");
        assert_eq!(Anchor::Center.as_str(), "center");
    }
}
