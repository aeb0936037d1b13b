//! Raw trace to typed steps, including incremental refresh of growing traces.

use super::step::Step;
use crate::types::RawStep;

/// Interpret raw records into typed steps.
///
/// Total: unrecognized kinds are filtered out, order is preserved, and the
/// output never has more entries than the input. Each record maps
/// independently, so extending the input only ever extends the output.
pub fn interpret(raw: &[RawStep]) -> Vec<Step> {
    warn_on_unordered(raw);
    raw.iter().filter_map(Step::from_raw).collect()
}

/// Project typed steps back to raw records.
pub fn project(steps: &[Step]) -> Vec<RawStep> {
    steps.iter().map(Step::to_raw).collect()
}

fn warn_on_unordered(raw: &[RawStep]) {
    let out_of_order = raw
        .windows(2)
        .any(|pair| matches!((pair[0].order, pair[1].order), (Some(a), Some(b)) if b < a));
    if out_of_order {
        tracing::warn!("step `order` fields disagree with arrival order; keeping arrival order");
    }
}

/// Cached interpretation of a trace that may still be growing.
///
/// [`TraceView::refresh`] re-interprets only the raw records appended since
/// the previous call. If any already-consumed record changed, or the input
/// shrank, it falls back to a full rebuild, so the result always equals
/// [`interpret`] over the same input.
#[derive(Debug, Clone, Default)]
pub struct TraceView {
    steps: Vec<Step>,
    seen: Vec<RawStep>,
}

impl TraceView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(raw: &[RawStep]) -> Self {
        let mut view = Self::new();
        view.refresh(raw);
        view
    }

    /// Bring the view up to date with `raw`; returns how many steps were added.
    pub fn refresh(&mut self, raw: &[RawStep]) -> usize {
        if !self.prefix_unchanged(raw) {
            tracing::debug!(
                previous = self.seen.len(),
                incoming = raw.len(),
                "trace prefix changed; rebuilding"
            );
            self.steps.clear();
            self.seen.clear();
        }

        let before = self.steps.len();
        let tail = &raw[self.seen.len()..];
        self.steps.extend(interpret(tail));
        self.seen.extend_from_slice(tail);
        self.steps.len() - before
    }

    fn prefix_unchanged(&self, raw: &[RawStep]) -> bool {
        raw.starts_with(&self.seen)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of raw records consumed so far.
    pub fn consumed(&self) -> usize {
        self.seen.len()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
