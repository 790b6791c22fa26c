//! Engine failure classification.
//!
//! Engines fail with free-form text. The classifier reduces each failure to a
//! short category tag by scanning an engine's rules in declared order; the
//! first matching rule wins and text matching nothing falls back to
//! [`FALLBACK_TAG`]. Every classification bumps a per-engine, per-tag count
//! owned by the classifier instance.

pub mod normalize;
pub mod rules;

pub use normalize::normalize;
pub use rules::{CategoryRule, FALLBACK_TAG, RuleSpec, builtin_rules, tellurium_rules};

use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

use crate::Error;

/// Result of classifying one failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub tag: String,
    /// Normalized failure text.
    pub text: String,
}

#[derive(Debug, Clone, Default)]
struct EngineCategories {
    rules: Vec<CategoryRule>,
    counts: HashMap<String, u64>,
}

impl EngineCategories {
    /// Distinct tags in declared order, followed by the fallback tag.
    fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::with_capacity(self.rules.len() + 1);
        for rule in &self.rules {
            if !tags.contains(&rule.tag()) {
                tags.push(rule.tag());
            }
        }
        if !tags.contains(&FALLBACK_TAG) {
            tags.push(FALLBACK_TAG);
        }
        tags
    }
}

/// Per-engine rule registry with running counts.
#[derive(Debug, Clone, Default)]
pub struct ErrorClassifier {
    engines: BTreeMap<String, EngineCategories>,
}

impl ErrorClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the rule set for an engine.
    ///
    /// An empty rule set is valid: every failure is tagged `other`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if any pattern fails to compile; the
    /// registry is left unchanged in that case.
    pub fn register(&mut self, engine: &str, specs: &[RuleSpec]) -> Result<(), Error> {
        let rules = specs.iter().map(CategoryRule::compile).collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(engine, rules = rules.len(), "registered category rules");
        self.engines
            .insert(engine.to_string(), EngineCategories { rules, counts: HashMap::new() });
        Ok(())
    }

    pub fn is_registered(&self, engine: &str) -> bool {
        self.engines.contains_key(engine)
    }

    /// Names of all registered engines.
    pub fn engines(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }

    /// Classify a failure and record it.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEngine` if no rules were registered for `engine`.
    pub fn classify(&mut self, engine: &str, error: &dyn Display) -> Result<Classification, Error> {
        let categories = self
            .engines
            .get_mut(engine)
            .ok_or_else(|| Error::UnknownEngine(engine.to_string()))?;

        let text = normalize(error);
        let tag = categories
            .rules
            .iter()
            .find(|rule| rule.matches(&text))
            .map_or(FALLBACK_TAG, |rule| rule.tag())
            .to_string();

        *categories.counts.entry(tag.clone()).or_insert(0) += 1;
        tracing::debug!(engine, tag = %tag, "classified engine failure");

        Ok(Classification { tag, text })
    }

    /// Running count for one tag; zero for tags never seen.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEngine` if the engine is not registered.
    pub fn count(&self, engine: &str, tag: &str) -> Result<u64, Error> {
        let categories = self
            .engines
            .get(engine)
            .ok_or_else(|| Error::UnknownEngine(engine.to_string()))?;
        Ok(categories.counts.get(tag).copied().unwrap_or(0))
    }

    /// All tag counts for an engine, in declared tag order then `other`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEngine` if the engine is not registered.
    pub fn counts(&self, engine: &str) -> Result<Vec<(String, u64)>, Error> {
        let categories = self
            .engines
            .get(engine)
            .ok_or_else(|| Error::UnknownEngine(engine.to_string()))?;
        Ok(categories
            .tags()
            .into_iter()
            .map(|tag| (tag.to_string(), categories.counts.get(tag).copied().unwrap_or(0)))
            .collect())
    }

    /// Total failures classified for an engine.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEngine` if the engine is not registered.
    pub fn total(&self, engine: &str) -> Result<u64, Error> {
        Ok(self.counts(engine)?.iter().map(|(_, n)| n).sum())
    }

    /// Compact `tag=count` breakdown of the non-zero counts, e.g. `algebraic=2 other=1`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEngine` if the engine is not registered.
    pub fn breakdown(&self, engine: &str) -> Result<String, Error> {
        Ok(self
            .counts(engine)?
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .map(|(tag, n)| format!("{tag}={n}"))
            .collect::<Vec<_>>()
            .join(" "))
    }
}
