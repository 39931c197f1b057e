// Engine Prometheus metrics
//
// Counters for the analysis pipeline:
// - Analyses started and outcomes by kind
// - Probe failures by failure kind
// - Cross-origin downgrades and deadline expirations

use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global metrics registry for the analysis engine
pub struct EngineMetrics {
    /// Total number of analyses started
    pub analyses: IntCounter,

    /// Terminal outcomes by kind (resolved, fallback, error, superseded)
    pub outcomes: IntCounterVec,

    /// Probe failures by kind (network, cors, invalid_dimensions)
    pub probe_failures: IntCounterVec,

    /// Cross-origin denials downgraded to anonymous probes
    pub cors_downgrades: IntCounter,

    /// Analyses terminated by the wall-clock deadline
    pub deadline_exceeded: IntCounter,
}

/// Global singleton instance of metrics
static METRICS: OnceLock<EngineMetrics> = OnceLock::new();

impl EngineMetrics {
    /// Initialize and return the global metrics instance
    ///
    /// Registration happens once; subsequent calls return the same
    /// instance.
    pub fn global() -> &'static Self {
        METRICS.get_or_init(|| {
            let analyses = register_int_counter!(
                "framefit_analyses_total",
                "Total number of analyses started"
            )
            .expect("Failed to register analyses_total metric");

            let outcomes = register_int_counter_vec!(
                "framefit_outcomes_total",
                "Terminal analysis outcomes by kind",
                &["outcome"] // resolved, fallback, error, superseded
            )
            .expect("Failed to register outcomes_total metric");

            let probe_failures = register_int_counter_vec!(
                "framefit_probe_failures_total",
                "Probe failures by kind",
                &["kind"] // network, cors, invalid_dimensions
            )
            .expect("Failed to register probe_failures_total metric");

            let cors_downgrades = register_int_counter!(
                "framefit_cors_downgrades_total",
                "Cross-origin denials retried anonymously"
            )
            .expect("Failed to register cors_downgrades_total metric");

            let deadline_exceeded = register_int_counter!(
                "framefit_deadline_exceeded_total",
                "Analyses terminated by the wall-clock deadline"
            )
            .expect("Failed to register deadline_exceeded_total metric");

            EngineMetrics {
                analyses,
                outcomes,
                probe_failures,
                cors_downgrades,
                deadline_exceeded,
            }
        })
    }

    /// Render all registered metrics in the Prometheus text format
    pub fn render() -> String {
        let encoder = TextEncoder::new();
        let families = prometheus::gather();
        let mut buffer = Vec::new();
        if encoder.encode(&families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_returns_same_instance() {
        let a = EngineMetrics::global() as *const EngineMetrics;
        let b = EngineMetrics::global() as *const EngineMetrics;
        assert_eq!(a, b);
    }

    #[test]
    fn test_counters_increment() {
        let metrics = EngineMetrics::global();
        let before = metrics.analyses.get();
        metrics.analyses.inc();
        assert_eq!(metrics.analyses.get(), before + 1);

        metrics.outcomes.with_label_values(&["resolved"]).inc();
        assert!(metrics.outcomes.with_label_values(&["resolved"]).get() >= 1);
    }

    #[test]
    fn test_render_contains_metric_names() {
        let metrics = EngineMetrics::global();
        metrics.analyses.inc();
        metrics.probe_failures.with_label_values(&["network"]).inc();

        let output = EngineMetrics::render();
        assert!(output.contains("framefit_analyses_total"));
        assert!(output.contains("framefit_probe_failures_total"));
    }
}
