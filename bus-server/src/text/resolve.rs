//! Free-text stop identity resolution.
//!
//! Riders type stop names however they like. Resolution tries substring
//! containment on the normalised forms first and falls back to approximate
//! similarity, returning the best-scoring canonical name.

use serde::{Deserialize, Serialize};

use super::normalize::normalize;
use super::similarity::similarity;

/// Configuration for stop resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Minimum similarity for a fuzzy match to be accepted.
    ///
    /// The default of 0 accepts the best candidate however weak it is.
    pub similarity_floor: f64,
}

impl ResolverConfig {
    /// Set the minimum accepted similarity.
    pub fn with_similarity_floor(mut self, floor: f64) -> Self {
        self.similarity_floor = floor;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            similarity_floor: 0.0,
        }
    }
}

/// How a query was resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchMethod {
    /// Query and candidate contain one another after normalisation.
    Containment,
    /// Best similarity score among all candidates.
    Similarity(f64),
}

/// A resolved canonical name.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub name: String,
    pub method: MatchMethod,
}

/// A named set of stops (e.g. a town and its surrounding stops).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// Stop names in display order, without duplicates.
    pub stop_names: Vec<String>,
}

impl Group {
    /// Create a group, dropping repeated stop names.
    pub fn new(name: impl Into<String>, stops: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut stop_names: Vec<String> = Vec::new();
        for stop in stops {
            let stop = stop.into();
            if !stop_names.contains(&stop) {
                stop_names.push(stop);
            }
        }
        Self {
            name: name.into(),
            stop_names,
        }
    }

    fn contains_normalized(&self, query: &str) -> bool {
        self.stop_names
            .iter()
            .any(|s| contains_either(&normalize(s), query))
    }

    fn has_stop(&self, name: &str) -> bool {
        self.stop_names.iter().any(|s| s == name)
    }
}

/// Either string contains the other. Empty candidates never match.
fn contains_either(candidate: &str, query: &str) -> bool {
    !candidate.is_empty() && (candidate.contains(query) || query.contains(candidate))
}

/// Resolves free-text stop names to canonical ones.
#[derive(Debug, Clone, Default)]
pub struct StopResolver {
    config: ResolverConfig,
}

impl StopResolver {
    /// Create a resolver with the given configuration.
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolve `query` against canonical `candidates`.
    ///
    /// The first containment hit in iteration order wins. Otherwise the
    /// candidate with the strictly highest similarity is returned, earlier
    /// candidates winning ties. Returns `None` for a blank query, when no
    /// candidate shares anything with the query, or when the best score is
    /// under the configured floor.
    ///
    /// A zero score never counts as a match, even with no floor. Callers
    /// keep the text they were given instead of snapping to an arbitrary
    /// first candidate.
    pub fn resolve<'a, I>(&self, query: &str, candidates: I) -> Option<Resolution>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let query = normalize(query);
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(&'a str, f64)> = None;
        for candidate in candidates {
            let normalized = normalize(candidate);
            if contains_either(&normalized, &query) {
                return Some(Resolution {
                    name: candidate.to_string(),
                    method: MatchMethod::Containment,
                });
            }

            let score = similarity(&normalized, &query);
            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((candidate, score));
            }
        }

        let (name, score) = best?;
        if score < self.config.similarity_floor {
            return None;
        }
        Some(Resolution {
            name: name.to_string(),
            method: MatchMethod::Similarity(score),
        })
    }

    /// Find the group a free-text stop belongs to.
    ///
    /// Groups whose stop lists contain the query are preferred; otherwise the
    /// query is resolved against `stop_names` and the group holding the
    /// resolved stop is returned.
    pub fn resolve_group<'g, 'a, I>(
        &self,
        query: &str,
        groups: &'g [Group],
        stop_names: I,
    ) -> Option<&'g Group>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let normalized = normalize(query);
        if normalized.is_empty() {
            return None;
        }

        if let Some(group) = groups.iter().find(|g| g.contains_normalized(&normalized)) {
            return Some(group);
        }

        let resolved = self.resolve(query, stop_names)?;
        groups.iter().find(|g| g.has_stop(&resolved.name))
    }
}
