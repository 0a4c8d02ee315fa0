//! Trip matcher configuration.

use crate::text::ResolverConfig;

/// Configuration for [`TripMatcher`](super::TripMatcher).
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherConfig {
    /// Stop resolution settings used when text containment finds nothing.
    pub resolver: ResolverConfig,

    /// Retry an empty search with origin and destination resolved to known
    /// stop names. Only takes effect with a similarity floor above zero.
    pub resolve_unmatched: bool,
}

impl MatcherConfig {
    /// Set the minimum similarity accepted when resolving stop names.
    pub fn with_similarity_floor(mut self, floor: f64) -> Self {
        self.resolver = self.resolver.with_similarity_floor(floor);
        self
    }

    /// Enable or disable the resolved-name retry.
    pub fn with_resolve_unmatched(mut self, enabled: bool) -> Self {
        self.resolve_unmatched = enabled;
        self
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            resolve_unmatched: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MatcherConfig::default();
        assert_eq!(config.resolver.similarity_floor, 0.0);
        assert!(!config.resolve_unmatched);
    }

    #[test]
    fn builders() {
        let config = MatcherConfig::default()
            .with_similarity_floor(0.6)
            .with_resolve_unmatched(true);
        assert_eq!(config.resolver.similarity_floor, 0.6);
        assert!(config.resolve_unmatched);
    }
}
