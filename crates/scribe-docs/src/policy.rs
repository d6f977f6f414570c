//! Sampling policy.

use serde::{Deserialize, Serialize};

/// Sampling interval used when no layer sets one.
pub const DEFAULT_SAMPLING_INTERVAL: f64 = 1.0;

/// How a sample that the current schema rejects is folded in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    /// Intersect with the current schema, keeping only shared requirements.
    Combine,
    /// Add the sample's schema as another union member.
    #[default]
    Individual,
}

/// One layer of sampling settings. Unset fields defer to the next layer.
///
/// Layers resolve per route, then per instance, then to the built-in
/// defaults (interval `1.0`, no count limit, [`SamplingMode::Individual`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingPolicy {
    /// Probability, in `[0, 1]`, that a response is inspected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
    /// Stop inspecting once this many samples were folded in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u64>,
    /// How rejected samples are folded in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<SamplingMode>,
}

impl SamplingPolicy {
    /// A layer that sets nothing.
    pub const fn unset() -> Self {
        Self {
            interval: None,
            max_count: None,
            mode: None,
        }
    }

    /// Set the interval.
    #[must_use]
    pub fn with_interval(mut self, interval: f64) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the count limit.
    #[must_use]
    pub fn with_max_count(mut self, max_count: u64) -> Self {
        self.max_count = Some(max_count);
        self
    }

    /// Set the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: SamplingMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Fill unset fields from `fallback`.
    #[must_use]
    pub fn or(self, fallback: &Self) -> Self {
        Self {
            interval: self.interval.or(fallback.interval),
            max_count: self.max_count.or(fallback.max_count),
            mode: self.mode.or(fallback.mode),
        }
    }

    /// Effective interval.
    pub fn interval(&self) -> f64 {
        self.interval.unwrap_or(DEFAULT_SAMPLING_INTERVAL)
    }

    /// Effective count limit; `None` is unlimited.
    pub const fn max_count(&self) -> Option<u64> {
        self.max_count
    }

    /// Effective mode.
    pub fn mode(&self) -> SamplingMode {
        self.mode.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = SamplingPolicy::unset();
        assert!((policy.interval() - 1.0).abs() < f64::EPSILON);
        assert_eq!(policy.max_count(), None);
        assert_eq!(policy.mode(), SamplingMode::Individual);
    }

    #[test]
    fn test_route_layer_wins() {
        let instance = SamplingPolicy::unset()
            .with_interval(0.5)
            .with_max_count(10)
            .with_mode(SamplingMode::Combine);
        let route = SamplingPolicy::unset().with_max_count(3);

        let effective = route.or(&instance);
        assert_eq!(effective.max_count(), Some(3));
        assert!((effective.interval() - 0.5).abs() < f64::EPSILON);
        assert_eq!(effective.mode(), SamplingMode::Combine);
    }

    #[test]
    fn test_mode_serialization() {
        assert_eq!(serde_json::to_string(&SamplingMode::Combine).unwrap(), "\"combine\"");
        let policy: SamplingPolicy = serde_json::from_str(r#"{"mode": "individual", "interval": 0.25}"#).unwrap();
        assert_eq!(policy.mode, Some(SamplingMode::Individual));
        assert_eq!(policy.max_count, None);
    }
}
