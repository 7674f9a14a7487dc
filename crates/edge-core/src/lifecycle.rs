//! Request lifecycle tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Lifecycle phases for a request passing through the edge pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Route decision made.
    Routed,
    /// Variant resolution finished (successfully or degraded).
    VariantResolved,
    /// Forwarded request answered by the origin.
    OriginResponded,
}

impl LifecyclePhase {
    /// Mark name used in the timing context.
    pub fn mark_name(&self) -> &'static str {
        match self {
            Self::Routed => "routed",
            Self::VariantResolved => "variant_resolved",
            Self::OriginResponded => "origin_responded",
        }
    }
}

/// Timing context for observability.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<String, Instant>,
}

impl TimingContext {
    /// Create a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
        }
    }

    /// Record a timing mark.
    pub fn mark(&mut self, name: &str) {
        self.marks.insert(name.to_string(), Instant::now());
    }

    /// Record that a lifecycle phase was reached.
    pub fn mark_phase(&mut self, phase: &LifecyclePhase) {
        self.mark(phase.mark_name());
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time spent between two marks.
    pub fn between(&self, from: &str, to: &str) -> Option<Duration> {
        let from = self.marks.get(from)?;
        let to = self.marks.get(to)?;
        Some(to.saturating_duration_since(*from))
    }

    /// Time spent between two phases, if both were reached.
    pub fn between_phases(&self, from: &LifecyclePhase, to: &LifecyclePhase) -> Option<Duration> {
        self.between(from.mark_name(), to.mark_name())
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}
