use tracing::{span, Level, Span};

/// Spans for helper actions; one per public call.
#[derive(Debug, Clone, Default)]
pub struct ActionTracer;

impl ActionTracer {
    pub fn span(&self, action: &str) -> Span {
        span!(Level::INFO, "appium.action", action = action)
    }

    pub fn lifecycle(&self, stage: &str) -> Span {
        span!(Level::INFO, "appium.session", stage = stage)
    }
}
