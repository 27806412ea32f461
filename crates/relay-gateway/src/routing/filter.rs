//! Event type filter for the `events` webhook

use relay_common::WebhookConfig;
use std::collections::HashSet;

/// Result of filtering one event type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// Event passes the filter
    Forward,
    /// Event type is on the exclude list
    Excluded,
    /// Include list is set and does not name this event type
    NotIncluded,
}

/// Include/exclude lists of event type names
///
/// Exclude is checked first; empty lists allow everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    include: HashSet<String>,
    exclude: HashSet<String>,
}

impl EventFilter {
    /// Create a filter from include and exclude lists
    #[must_use]
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Filter that forwards every event type
    #[must_use]
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Decide whether an event type is forwarded
    #[must_use]
    pub fn evaluate(&self, event_type: &str) -> FilterDecision {
        if self.exclude.contains(event_type) {
            return FilterDecision::Excluded;
        }
        if !self.include.is_empty() && !self.include.contains(event_type) {
            return FilterDecision::NotIncluded;
        }
        FilterDecision::Forward
    }
}

impl From<&WebhookConfig> for EventFilter {
    fn from(config: &WebhookConfig) -> Self {
        Self::new(config.include.iter().cloned(), config.exclude.iter().cloned())
    }
}
