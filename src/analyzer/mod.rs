//! Analysis controller: bounded retry, hard deadline, cancellation
//!
//! Wraps a [`ResourceProber`](crate::prober::ResourceProber) with the
//! retry/timeout state machine and hands successful probes through the
//! classifier to the policy resolver. The contract is that every
//! invocation terminates with a usable render policy: on exhausted retries
//! or an elapsed deadline the caller still receives the fallback policy.
//!
//! State machine per invocation:
//! - **Probing** → **Loaded** on a successful probe
//! - **Probing** → **Probing** (attempt + 1) on failure with budget left,
//!   after an exponential backoff delay
//! - **Probing** → **Probing** (same attempt, anonymous) on a cross-origin
//!   denial, immediately and without spending budget
//! - **Probing** → **Exhausted** when the attempt budget is spent
//! - any state → deadline fallback when the wall clock runs out; the
//!   deadline spans the whole invocation and is not reset by retries
//!
//! Each `analyze()` call bumps a generation counter; a run that resumes
//! from a suspension point with a stale generation terminates as
//! [`AnalysisOutcome::Superseded`] and its result is never delivered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{sleep, timeout_at, Instant};

use crate::classify::{classify, Classification};
use crate::config::EngineConfig;
use crate::metrics::EngineMetrics;
use crate::policy::{PolicyResolver, RenderPolicy};
use crate::prober::{IntrinsicSize, ProbeError, ResourceProber};
use crate::retry::RetryPolicy;

/// Terminal outcome of one analysis invocation
///
/// `Resolved`, `Fallback`, and `Error` all carry a render policy, so the
/// display layer never blocks on a failed analysis. `Superseded` is what an
/// invocation resolves to after a newer `analyze()` call took over its
/// slot; callers drop it without surfacing anything.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Probe succeeded; classification and derived policy
    Resolved {
        classification: Classification,
        policy: RenderPolicy,
    },
    /// No classification available (empty ref or deadline); safe policy
    Fallback { policy: RenderPolicy },
    /// Retry budget exhausted; last probe failure plus the safe policy
    Error {
        reason: ProbeError,
        policy: RenderPolicy,
    },
    /// Discarded in favor of a newer invocation
    Superseded,
}

impl AnalysisOutcome {
    /// The render policy carried by this outcome, if any
    pub fn policy(&self) -> Option<&RenderPolicy> {
        match self {
            Self::Resolved { policy, .. } | Self::Fallback { policy } | Self::Error { policy, .. } => {
                Some(policy)
            }
            Self::Superseded => None,
        }
    }

    /// Stable label for metrics and structured logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Resolved { .. } => "resolved",
            Self::Fallback { .. } => "fallback",
            Self::Error { .. } => "error",
            Self::Superseded => "superseded",
        }
    }
}

/// Probe loop state; one value owned per invocation
///
/// The `Probing` variant is the live retry state (attempt counter plus the
/// cross-origin downgrade flag); the other variants are terminal.
#[derive(Debug)]
enum ProbeState {
    Probing { attempt: u32, cross_origin: bool },
    Loaded(IntrinsicSize),
    Exhausted(ProbeError),
    Superseded,
}

/// Analysis engine for one caller slot
///
/// Holds no cross-request state beyond the generation counter and the
/// last-supplied resource for [`retry`](Self::retry). Independent slots
/// (one per on-screen image) each get their own analyzer.
pub struct ImageAnalyzer<P> {
    prober: P,
    retry: RetryPolicy,
    deadline: Duration,
    resolver: PolicyResolver,
    generation: AtomicU64,
    last_ref: Mutex<Option<String>>,
}

impl<P: ResourceProber> ImageAnalyzer<P> {
    pub fn new(prober: P, config: &EngineConfig) -> Self {
        Self {
            prober,
            retry: config.analysis.to_retry_policy(),
            deadline: config.analysis.deadline(),
            resolver: PolicyResolver::new(config.viewport.clone()),
            generation: AtomicU64::new(0),
            last_ref: Mutex::new(None),
        }
    }

    pub fn resolver(&self) -> &PolicyResolver {
        &self.resolver
    }

    /// Analyze a resource and resolve a render policy
    ///
    /// Primary entry point. Cancellable by re-invocation: a newer call on
    /// the same analyzer supersedes this one at its next suspension point.
    pub async fn analyze(&self, resource: &str) -> AnalysisOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let metrics = EngineMetrics::global();
        metrics.analyses.inc();

        // "No image supplied" short-circuit: fallback, not an error, and
        // the prober is never invoked.
        if resource.is_empty() {
            *self.last_ref.lock() = None;
            tracing::debug!("no resource supplied, resolving to fallback policy");
            return self.finish(AnalysisOutcome::Fallback {
                policy: self.resolver.fallback(),
            });
        }
        *self.last_ref.lock() = Some(resource.to_string());

        let deadline = Instant::now() + self.deadline;
        let outcome = match timeout_at(deadline, self.probe_loop(resource, generation)).await {
            Ok(ProbeState::Loaded(size)) => {
                let classification = classify(size);
                let policy = self.resolver.resolve(Some(&classification));
                tracing::debug!(
                    resource,
                    width = size.width,
                    height = size.height,
                    family = classification.family.as_str(),
                    quality = classification.quality.as_str(),
                    optimized = policy.optimized,
                    "analysis resolved"
                );
                AnalysisOutcome::Resolved {
                    classification,
                    policy,
                }
            }
            Ok(ProbeState::Exhausted(reason)) => {
                tracing::warn!(
                    resource,
                    max_attempts = self.retry.max_attempts,
                    error = %reason,
                    "retry budget exhausted, resolving to fallback policy"
                );
                AnalysisOutcome::Error {
                    reason,
                    policy: self.resolver.fallback(),
                }
            }
            Ok(ProbeState::Superseded) | Ok(ProbeState::Probing { .. }) => {
                AnalysisOutcome::Superseded
            }
            Err(_elapsed) => {
                if self.is_stale(generation) {
                    AnalysisOutcome::Superseded
                } else {
                    metrics.deadline_exceeded.inc();
                    tracing::warn!(
                        resource,
                        deadline_ms = self.deadline.as_millis() as u64,
                        "analysis deadline elapsed, resolving to fallback policy"
                    );
                    AnalysisOutcome::Fallback {
                        policy: self.resolver.fallback(),
                    }
                }
            }
        };

        self.finish(outcome)
    }

    /// Re-run the analysis for the last-supplied resource
    ///
    /// Manual "try again" affordance for callers that received a fallback
    /// or error outcome. Without a prior resource this resolves to the
    /// fallback policy like an empty ref.
    pub async fn retry(&self) -> AnalysisOutcome {
        let last = self.last_ref.lock().clone();
        match last {
            Some(resource) => self.analyze(&resource).await,
            None => self.analyze("").await,
        }
    }

    /// Drive the probe state machine to a terminal state
    async fn probe_loop(&self, resource: &str, generation: u64) -> ProbeState {
        let mut state = ProbeState::Probing {
            attempt: 0,
            cross_origin: true,
        };
        loop {
            state = match state {
                ProbeState::Probing {
                    attempt,
                    cross_origin,
                } => {
                    self.probe_step(resource, generation, attempt, cross_origin)
                        .await
                }
                terminal => return terminal,
            };
        }
    }

    /// One probe attempt and the transition out of it
    ///
    /// Backoff is slept on the failure transition, before the next counted
    /// attempt is scheduled; entering `Probing` itself never delays. That
    /// keeps the cross-origin downgrade (same attempt, anonymous) immediate
    /// even when it happens on a late attempt.
    async fn probe_step(
        &self,
        resource: &str,
        generation: u64,
        attempt: u32,
        cross_origin: bool,
    ) -> ProbeState {
        tracing::debug!(resource, attempt, cross_origin, "probing resource");
        let result = self.prober.probe(resource, cross_origin).await;
        if self.is_stale(generation) {
            return ProbeState::Superseded;
        }

        match result {
            Ok(size) => ProbeState::Loaded(size),
            Err(ProbeError::CrossOrigin(msg)) if cross_origin => {
                // Configuration fix, not a transient fault: rerun the same
                // attempt anonymously, immediately, budget untouched.
                EngineMetrics::global().cors_downgrades.inc();
                tracing::info!(
                    resource,
                    attempt,
                    error = %msg,
                    "cross-origin access denied, retrying anonymously"
                );
                ProbeState::Probing {
                    attempt,
                    cross_origin: false,
                }
            }
            Err(err) => {
                EngineMetrics::global()
                    .probe_failures
                    .with_label_values(&[err.kind()])
                    .inc();
                tracing::warn!(resource, attempt, error = %err, "probe attempt failed");
                let completed = attempt + 1;
                if !self.retry.has_budget(completed) {
                    return ProbeState::Exhausted(err);
                }

                let delay = self.retry.backoff_duration(completed);
                if !delay.is_zero() {
                    sleep(delay).await;
                    if self.is_stale(generation) {
                        return ProbeState::Superseded;
                    }
                }
                ProbeState::Probing {
                    attempt: completed,
                    cross_origin,
                }
            }
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    fn finish(&self, outcome: AnalysisOutcome) -> AnalysisOutcome {
        EngineMetrics::global()
            .outcomes
            .with_label_values(&[outcome.label()])
            .inc();
        outcome
    }
}
